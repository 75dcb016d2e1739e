use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// The three file categories a project can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FileKind {
    #[serde(rename = "html")]
    Markup,
    #[serde(rename = "css")]
    Style,
    #[serde(rename = "js")]
    Script,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [FileKind::Markup, FileKind::Style, FileKind::Script];

    /// Name of the file embedded in the preview for this kind.
    pub fn default_name(self) -> &'static str {
        match self {
            FileKind::Markup => "index.html",
            FileKind::Style => "style.css",
            FileKind::Script => "script.js",
        }
    }

    /// Content given to newly created files of this kind.
    pub fn template(self) -> &'static str {
        match self {
            FileKind::Markup => MARKUP_TEMPLATE,
            FileKind::Style => STYLE_TEMPLATE,
            FileKind::Script => SCRIPT_TEMPLATE,
        }
    }

    /// Human readable language name, shown in the status bar.
    pub fn label(self) -> &'static str {
        match self {
            FileKind::Markup => "HTML",
            FileKind::Style => "CSS",
            FileKind::Script => "JavaScript",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            FileKind::Markup => "text/html",
            FileKind::Style => "text/css",
            FileKind::Script => "text/javascript",
        }
    }

    /// syntect syntax name used for highlighting.
    pub fn syntax_name(self) -> &'static str {
        match self {
            FileKind::Markup => "HTML",
            FileKind::Style => "CSS",
            FileKind::Script => "JavaScript",
        }
    }

    /// Canonical extension, appended to names typed without one.
    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Markup => "html",
            FileKind::Style => "css",
            FileKind::Script => "js",
        }
    }

    pub fn from_extension(ext: &str) -> Option<FileKind> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(FileKind::Markup),
            "css" => Some(FileKind::Style),
            "js" | "mjs" => Some(FileKind::Script),
            _ => None,
        }
    }

    /// Classify a file name by its extension.
    ///
    /// Returns `None` when the name has no extension or an unsupported one.
    pub fn from_file_name(name: &str) -> Option<FileKind> {
        let ext = Path::new(name).extension()?.to_str()?;
        Self::from_extension(ext)
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of a project file: its kind plus a name unique within that kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileKey {
    pub kind: FileKind,
    pub name: String,
}

impl FileKey {
    pub fn new(kind: FileKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn default_for(kind: FileKind) -> Self {
        Self::new(kind, kind.default_name())
    }

    pub fn is_default(&self) -> bool {
        self.name == self.kind.default_name()
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

const MARKUP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>New HTML File</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <h1>Hello World</h1>

    <script src="script.js"></script>
</body>
</html>"#;

const STYLE_TEMPLATE: &str = r#"/* Styles for the new CSS file */
body {
    font-family: Arial, sans-serif;
    margin: 0;
    padding: 20px;
    background-color: #f5f5f5;
    color: #333;
}

h1 {
    color: #2188ff;
}"#;

const SCRIPT_TEMPLATE: &str = r#"// JavaScript for the new file
document.addEventListener('DOMContentLoaded', function() {
    console.log('New JavaScript file loaded!');

    // Your code here
});"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(FileKind::from_file_name("about.html"), Some(FileKind::Markup));
        assert_eq!(FileKind::from_file_name("legacy.HTM"), Some(FileKind::Markup));
        assert_eq!(FileKind::from_file_name("theme.css"), Some(FileKind::Style));
        assert_eq!(FileKind::from_file_name("app.js"), Some(FileKind::Script));
        assert_eq!(FileKind::from_file_name("notes.txt"), None);
        assert_eq!(FileKind::from_file_name("Makefile"), None);
        assert_eq!(FileKind::from_file_name(".css"), None);
        for kind in FileKind::ALL {
            assert_eq!(FileKind::from_extension(kind.extension()), Some(kind));
        }
    }

    #[test]
    fn test_default_keys() {
        let key = FileKey::default_for(FileKind::Style);
        assert_eq!(key.name, "style.css");
        assert!(key.is_default());
        assert!(!FileKey::new(FileKind::Style, "theme.css").is_default());
    }

    #[test]
    fn test_kind_serializes_as_short_tag() {
        let json = serde_json::to_string(&FileKey::new(FileKind::Script, "a.js")).unwrap();
        assert_eq!(json, r#"{"kind":"js","name":"a.js"}"#);
    }
}
