use std::path::{Component, Path};
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::app::domain::FileKind;
use crate::app::infrastructure::error::{AppError, Result};

static TAG_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());
static LEADING_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s+").unwrap());
static CSS_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\{\s*").unwrap());
static CSS_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\}\s*").unwrap());
static JS_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\s*").unwrap());
static JS_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\s*").unwrap());
static SEMICOLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";\s*").unwrap());

/// Normalize a user-entered file or folder name.
///
/// Names are trimmed; empty names and names with path separators are rejected
/// because the tree addresses entries by `folder/name`. `.` and `..` are
/// rejected too since exported files are written under their folder name.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidName("name is empty".to_string()));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(AppError::InvalidName(format!("{trimmed} contains a path separator")));
    }
    let mut parts = Path::new(trimmed).components();
    if !matches!((parts.next(), parts.next()), (Some(Component::Normal(_)), None)) {
        return Err(AppError::InvalidName(format!("{trimmed} is not a plain name")));
    }
    Ok(trimmed.to_string())
}

/// Very small whitespace formatter. It only re-flows braces, semicolons and
/// tag boundaries; it does not parse the language.
pub fn format_code(kind: FileKind, text: &str) -> String {
    let formatted = match kind {
        FileKind::Markup => {
            let step = TAG_GAP.replace_all(text, ">\n<");
            LEADING_WS.replace_all(&step, "\n  ").into_owned()
        }
        FileKind::Style => {
            let step = CSS_OPEN.replace_all(text, " {\n  ");
            let step = SEMICOLON.replace_all(&step, ";\n  ");
            CSS_CLOSE.replace_all(&step, "\n}\n\n").into_owned()
        }
        FileKind::Script => {
            let step = JS_OPEN.replace_all(text, " {\n  ");
            let step = SEMICOLON.replace_all(&step, ";\n  ");
            JS_CLOSE.replace_all(&step, "\n}\n\n").into_owned()
        }
    };
    formatted.trim_end().to_string()
}
