//! Clipboard capability used by edit boxes

/// System clipboard access.
///
/// Failures are not reported; a clipboard that cannot be read returns `None`.
pub trait Clipboard {
    fn set_text(&mut self, text: &str);
    fn get_text(&mut self) -> Option<String>;
}

/// Process-local clipboard, used when no platform clipboard is bound
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Some(text.into()),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) {
        self.contents = Some(text.to_string());
    }

    fn get_text(&mut self) -> Option<String> {
        self.contents.clone()
    }
}
