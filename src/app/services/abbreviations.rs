//! Inline abbreviation expansion.
//!
//! A trigger key looks at the identifier-like run of characters right before
//! the caret and, if that exact token is in the table for the file kind,
//! replaces it with the expansion. There is no nesting or operator grammar:
//! `ul>li` is not an abbreviation.

use crate::app::domain::FileKind;

/// Result of a successful expansion: the whole new text and the caret offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    pub caret: usize,
}

const MARKUP_SPECIAL: &[(&str, &str)] = &[
    ("a", r#"<a href=""></a>"#),
    ("img", r#"<img src="" alt="">"#),
    ("input", r#"<input type="" name="">"#),
    ("link", r#"<link rel="stylesheet" href="">"#),
    ("script", r#"<script src=""></script>"#),
    ("meta", r#"<meta name="" content="">"#),
    ("br", "<br>"),
    ("hr", "<hr>"),
    (
        "html:5",
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    <title></title>\n</head>\n<body>\n\n</body>\n</html>",
    ),
];

const MARKUP_TAGS: &[&str] = &[
    "div", "span", "p", "section", "article", "header", "footer", "nav", "main", "aside", "ul",
    "ol", "li", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "em", "button", "label", "form",
    "table", "thead", "tbody", "tr", "td", "th", "textarea", "select", "option", "title", "pre",
    "code", "small", "blockquote", "figure", "canvas",
];

const STYLE_TABLE: &[(&str, &str)] = &[
    ("m", "margin: ;"),
    ("mt", "margin-top: ;"),
    ("mr", "margin-right: ;"),
    ("mb", "margin-bottom: ;"),
    ("ml", "margin-left: ;"),
    ("p", "padding: ;"),
    ("pt", "padding-top: ;"),
    ("pr", "padding-right: ;"),
    ("pb", "padding-bottom: ;"),
    ("pl", "padding-left: ;"),
    ("w", "width: ;"),
    ("h", "height: ;"),
    ("c", "color: ;"),
    ("bg", "background: ;"),
    ("bgc", "background-color: ;"),
    ("bd", "border: ;"),
    ("br", "border-radius: ;"),
    ("fs", "font-size: ;"),
    ("fw", "font-weight: ;"),
    ("ff", "font-family: ;"),
    ("ta", "text-align: ;"),
    ("ta:c", "text-align: center;"),
    ("d", "display: ;"),
    ("d:b", "display: block;"),
    ("d:f", "display: flex;"),
    ("d:g", "display: grid;"),
    ("d:n", "display: none;"),
    ("jc", "justify-content: ;"),
    ("jc:c", "justify-content: center;"),
    ("ai", "align-items: ;"),
    ("ai:c", "align-items: center;"),
    ("pos", "position: ;"),
    ("pos:r", "position: relative;"),
    ("pos:a", "position: absolute;"),
    ("t", "top: ;"),
    ("r", "right: ;"),
    ("b", "bottom: ;"),
    ("l", "left: ;"),
    ("z", "z-index: ;"),
    ("op", "opacity: ;"),
];

const SCRIPT_TABLE: &[(&str, &str)] = &[
    ("cl", "console.log();"),
    ("ce", "console.error();"),
    ("fn", "function () {\n    \n}"),
    ("af", "() => {\n    \n}"),
    ("qs", "document.querySelector('')"),
    ("qsa", "document.querySelectorAll('')"),
    ("gid", "document.getElementById('')"),
    ("ael", "addEventListener('', () => {\n    \n});"),
    ("sto", "setTimeout(() => {\n    \n}, 0);"),
    ("for", "for (let i = 0; i < ; i++) {\n    \n}"),
];

fn is_token_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | ':' | '-')
}

fn lookup_pair(table: &[(&str, &'static str)], token: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(abbr, _)| *abbr == token)
        .map(|(_, expansion)| *expansion)
}

/// Exact lookup of `token` in the table for `kind`.
pub fn lookup(kind: FileKind, token: &str) -> Option<String> {
    match kind {
        FileKind::Markup => lookup_pair(MARKUP_SPECIAL, token)
            .map(str::to_string)
            .or_else(|| {
                MARKUP_TAGS
                    .iter()
                    .find(|tag| **tag == token)
                    .map(|tag| format!("<{tag}></{tag}>"))
            }),
        FileKind::Style => lookup_pair(STYLE_TABLE, token).map(str::to_string),
        FileKind::Script => lookup_pair(SCRIPT_TABLE, token).map(str::to_string),
    }
}

/// Byte offset where the token ending at `caret` starts.
fn token_start(text: &str, caret: usize) -> usize {
    let mut start = caret;
    for (idx, ch) in text[..caret].char_indices().rev() {
        if !is_token_char(ch) {
            break;
        }
        start = idx;
    }
    start
}

/// Where the caret should land inside a freshly inserted expansion.
///
/// Preference order: inside the first empty quote pair, after the first
/// `>` of an empty tag gap, after the first `: ` of a `property: ;` gap,
/// otherwise at the end.
pub fn caret_offset(expansion: &str) -> usize {
    let quoted = [expansion.find("\"\""), expansion.find("''")]
        .into_iter()
        .flatten()
        .min();
    if let Some(pos) = quoted {
        return pos + 1;
    }
    if let Some(pos) = expansion.find("><") {
        return pos + 1;
    }
    if let Some(pos) = expansion.find(": ;") {
        return pos + 2;
    }
    expansion.len()
}

/// Try to expand the abbreviation that ends at `caret` (a byte offset).
pub fn expand(text: &str, caret: usize, kind: FileKind) -> Option<Expansion> {
    if caret > text.len() || !text.is_char_boundary(caret) {
        return None;
    }
    let start = token_start(text, caret);
    if start == caret {
        return None;
    }
    let token = &text[start..caret];
    let replacement = lookup(kind, token)?;

    let mut new_text = String::with_capacity(text.len() + replacement.len());
    new_text.push_str(&text[..start]);
    new_text.push_str(&replacement);
    new_text.push_str(&text[caret..]);

    Some(Expansion {
        caret: start + caret_offset(&replacement),
        text: new_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_tag() {
        let exp = expand("div", 3, FileKind::Markup).unwrap();
        assert_eq!(exp.text, "<div></div>");
        assert_eq!(exp.caret, 5);
    }

    #[test]
    fn test_expand_prefers_attribute_slot() {
        let exp = expand("  a", 3, FileKind::Markup).unwrap();
        assert_eq!(exp.text, r#"  <a href=""></a>"#);
        assert_eq!(&exp.text[..exp.caret], r#"  <a href=""#);
    }

    #[test]
    fn test_expand_keeps_surrounding_text() {
        let text = "<body>\nul\n</body>";
        let exp = expand(text, 9, FileKind::Markup).unwrap();
        assert_eq!(exp.text, "<body>\n<ul></ul>\n</body>");
        assert_eq!(&exp.text[exp.caret..], "</ul>\n</body>");
    }

    #[test]
    fn test_expand_css_property_gap() {
        let exp = expand("h1 {\n    m", 10, FileKind::Style).unwrap();
        assert_eq!(exp.text, "h1 {\n    margin: ;");
        assert_eq!(&exp.text[exp.caret..], ";");
    }

    #[test]
    fn test_expand_token_with_colon() {
        let exp = expand("d:f", 3, FileKind::Style).unwrap();
        assert_eq!(exp.text, "display: flex;");
        assert_eq!(exp.caret, exp.text.len());
    }

    #[test]
    fn test_expand_script_quotes() {
        let exp = expand("qs", 2, FileKind::Script).unwrap();
        assert_eq!(exp.text, "document.querySelector('')");
        assert_eq!(&exp.text[exp.caret..], "')");
    }

    #[test]
    fn test_unknown_token_is_not_expanded() {
        assert!(expand("blink", 5, FileKind::Markup).is_none());
        assert!(expand("div", 3, FileKind::Script).is_none());
    }

    #[test]
    fn test_no_token_before_caret() {
        assert!(expand("div ", 4, FileKind::Markup).is_none());
        assert!(expand("", 0, FileKind::Markup).is_none());
    }

    #[test]
    fn test_token_is_exact_not_suffix() {
        // "xdiv" is the token, and it is not in the table.
        assert!(expand("xdiv", 4, FileKind::Markup).is_none());
    }

    #[test]
    fn test_caret_out_of_range() {
        assert!(expand("div", 7, FileKind::Markup).is_none());
        assert!(expand("é", 1, FileKind::Markup).is_none());
    }

    #[test]
    fn test_multibyte_prefix() {
        let text = "café p";
        let exp = expand(text, text.len(), FileKind::Markup).unwrap();
        assert_eq!(exp.text, "café <p></p>");
        assert_eq!(&exp.text[exp.caret..], "</p>");
    }
}
