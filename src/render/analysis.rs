//! Light inline markup for free-form analysis text
//!
//! - line breaks become `<br>`
//! - heading-like prefixes (`Capitalised words:`) are bolded
//! - `- ` bullets become `• `, numbered items are normalised to `N. `

use super::escape_html;

/// Format analysis text as inline HTML
pub fn format_analysis(text: &str) -> String {
    text.lines()
        .map(format_line)
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Same formatting rules, without markup, for terminal output
pub fn format_analysis_plain(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| match list_item(line) {
            Some(ListItem::Bullet(rest)) => format!("• {}", rest),
            Some(ListItem::Numbered(number, rest)) => format!("{}. {}", number, rest),
            None => line.trim_end().to_string(),
        })
        .collect()
}

fn format_line(line: &str) -> String {
    let line = line.trim_end();

    match list_item(line) {
        Some(ListItem::Bullet(rest)) => return format!("• {}", escape_html(rest)),
        Some(ListItem::Numbered(number, rest)) => {
            return format!("{}. {}", number, escape_html(rest));
        }
        None => {}
    }

    if let Some(split) = heading_end(line) {
        let (heading, rest) = line.split_at(split);
        return format!("<strong>{}</strong>{}", escape_html(heading), escape_html(rest));
    }

    escape_html(line)
}

enum ListItem<'a> {
    Bullet(&'a str),
    Numbered(&'a str, &'a str),
}

fn list_item(line: &str) -> Option<ListItem<'_>> {
    if let Some(rest) = line.strip_prefix('-') {
        if rest.starts_with(char::is_whitespace) {
            return Some(ListItem::Bullet(rest.trim_start()));
        }
        return None;
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(ListItem::Numbered(&line[..digits], rest.trim_start()))
}

/// Byte offset just past the colon of a heading prefix: an uppercase ASCII
/// letter followed by one or more letters or spaces, then `:`
fn heading_end(line: &str) -> Option<usize> {
    let colon = line.find(':')?;
    let head = &line[..colon];

    let mut chars = head.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    let rest = chars.as_str();
    if rest.is_empty()
        || !rest
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        return None;
    }
    Some(colon + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_breaks() {
        assert_eq!(format_analysis("one\ntwo"), "one<br>two");
    }

    #[test]
    fn test_headings_are_bold_on_every_line() {
        assert_eq!(
            format_analysis("Summary: contains milk\nRisk Level: high"),
            "<strong>Summary:</strong> contains milk<br><strong>Risk Level:</strong> high"
        );
    }

    #[test]
    fn test_not_headings() {
        assert_eq!(format_analysis("lowercase: no"), "lowercase: no");
        assert_eq!(format_analysis("A: too short"), "A: too short");
        assert_eq!(format_analysis("Dose 2x: daily"), "Dose 2x: daily");
        assert_eq!(format_analysis("No colon here"), "No colon here");
    }

    #[test]
    fn test_list_items() {
        assert_eq!(
            format_analysis("Warnings:\n- peanuts\n-  soy\n1.  Avoid\n12. Read labels"),
            "<strong>Warnings:</strong><br>• peanuts<br>• soy<br>1. Avoid<br>12. Read labels"
        );
    }

    #[test]
    fn test_dash_without_space_is_text() {
        assert_eq!(format_analysis("-5 degrees"), "-5 degrees");
        assert_eq!(format_analysis("3.5 grams"), "3.5 grams");
    }

    #[test]
    fn test_markup_in_text_is_escaped() {
        assert_eq!(
            format_analysis("Note: <script>alert(1)</script>"),
            "<strong>Note:</strong> &lt;script&gt;alert(1)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_plain_formatting() {
        assert_eq!(
            format_analysis_plain("Tips:\n- eat\n2.  sleep"),
            vec!["Tips:", "• eat", "2. sleep"]
        );
    }
}
