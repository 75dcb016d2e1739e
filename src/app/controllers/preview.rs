use crate::app::domain::{FileKind, ProjectStore};
use crate::app::infrastructure::error::Result;

/// Displays a generated HTML document in an isolated surface.
pub trait PreviewSink {
    fn publish(&mut self, document: &str) -> Result<()>;

    /// Bring the preview to the user's attention (manual run).
    fn reveal(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Compose the single preview document from the three sources.
///
/// Style goes into a head-level `<style>` block; the markup body is followed
/// by a `<script>` block holding the script.
pub fn compose_document(markup: &str, style: &str, script: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<style>{style}</style>\n</head>\n<body>\n{markup}\n<script>{script}</script>\n</body>\n</html>\n"
    )
}

pub struct PreviewRenderer {
    sink: Box<dyn PreviewSink>,
    pub auto_reload: bool,
    last_document: Option<String>,
    render_count: u64,
}

impl PreviewRenderer {
    pub fn new(sink: Box<dyn PreviewSink>, auto_reload: bool) -> Self {
        Self {
            sink,
            auto_reload,
            last_document: None,
            render_count: 0,
        }
    }

    /// Compose from the default file of each kind and publish a new document.
    ///
    /// The caller flushes the active surface first.
    pub fn render(&mut self, store: &ProjectStore) -> Result<()> {
        let document = compose_document(
            store.default_content(FileKind::Markup),
            store.default_content(FileKind::Style),
            store.default_content(FileKind::Script),
        );
        self.sink.publish(&document)?;
        self.render_count += 1;
        tracing::debug!("Preview rendered ({} bytes, #{})", document.len(), self.render_count);
        self.last_document = Some(document);
        Ok(())
    }

    pub fn reveal(&mut self) -> Result<()> {
        self.sink.reveal()
    }

    pub fn toggle_auto_reload(&mut self) -> bool {
        self.auto_reload = !self.auto_reload;
        self.auto_reload
    }

    pub fn last_document(&self) -> Option<&str> {
        self.last_document.as_deref()
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::infrastructure::error::AppError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<String>>>);

    impl PreviewSink for SharedSink {
        fn publish(&mut self, document: &str) -> Result<()> {
            self.0.borrow_mut().push(document.to_string());
            Ok(())
        }
    }

    struct BrokenSink;

    impl PreviewSink for BrokenSink {
        fn publish(&mut self, _document: &str) -> Result<()> {
            Err(AppError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_compose_structure_order() {
        let doc = compose_document("<h1>Hi</h1>", "h1{color:red}", "console.log(1)");
        let head_end = doc.find("</head>").unwrap();
        let style = doc.find("<style>h1{color:red}</style>").unwrap();
        let body = doc.find("<body>").unwrap();
        let markup = doc.find("<h1>Hi</h1>").unwrap();
        let script = doc.find("<script>console.log(1)</script>").unwrap();
        assert!(style < head_end);
        assert!(head_end < body && body < markup);
        assert!(markup < script);
    }

    #[test]
    fn test_render_uses_default_files_only() {
        let mut store = ProjectStore::new();
        store.set_content(FileKind::Markup, "index.html", "<h1>Hi</h1>");
        store.set_content(FileKind::Style, "style.css", "h1{color:red}");
        store.set_content(FileKind::Script, "script.js", "console.log(1)");
        store.create_file(FileKind::Markup, "about.html", "<h1>About</h1>").unwrap();

        let sink = SharedSink::default();
        let mut renderer = PreviewRenderer::new(Box::new(sink.clone()), true);
        renderer.render(&store).unwrap();

        let published = sink.0.borrow();
        assert_eq!(published.len(), 1);
        assert!(published[0].contains("<h1>Hi</h1>"));
        assert!(!published[0].contains("About"));
        assert_eq!(renderer.render_count(), 1);
    }

    #[test]
    fn test_failed_publish_is_reported() {
        let store = ProjectStore::new();
        let mut renderer = PreviewRenderer::new(Box::new(BrokenSink), false);
        assert!(renderer.render(&store).is_err());
        assert_eq!(renderer.render_count(), 0);
        assert!(renderer.last_document().is_none());
    }

    #[test]
    fn test_toggle_auto_reload() {
        let mut renderer = PreviewRenderer::new(Box::new(SharedSink::default()), true);
        assert!(!renderer.toggle_auto_reload());
        assert!(renderer.toggle_auto_reload());
    }
}
