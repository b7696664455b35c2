//! HTML to visible text

use scraper::{ElementRef, Html, Selector};

/// Elements whose text never renders
const INVISIBLE: [&str; 4] = ["script", "style", "noscript", "template"];

/// Extract the visible text of a document's body, one text run per line
///
/// Falls back to the whole document when there is no `<body>`. Runs of
/// whitespace-only text are dropped.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    match body {
        Some(body) => collect_text(body),
        None => collect_text(document.root_element()),
    }
}

fn collect_text(root: ElementRef<'_>) -> String {
    let mut lines = Vec::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let line = text.trim();
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Truncate to at most `max_chars` characters, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_from_body() {
        let html = r#"<html><head><title>Jídelna</title></head>
            <body>
              <h1>STŘEDA 19.11.2025</h1>
              <ul><li>Polévka gulášová <b>45,-</b></li><li>Svíčková 145 Kč</li></ul>
            </body></html>"#;

        let text = visible_text(html);
        assert_eq!(
            text,
            "STŘEDA 19.11.2025\nPolévka gulášová\n45,-\nSvíčková 145 Kč"
        );
        assert!(!text.contains("Jídelna"), "head content is not body text");
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let html = r#"<body>
            <script>var menu = "secret";</script>
            <style>.x { color: red }</style>
            <noscript>Enable JS</noscript>
            <p>Řízek</p>
        </body>"#;

        assert_eq!(visible_text(html), "Řízek");
    }

    #[test]
    fn test_visible_text_without_markup() {
        assert_eq!(visible_text("plain menu text"), "plain menu text");
        assert_eq!(visible_text(""), "");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("ščřžý", 3), "ščř");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
