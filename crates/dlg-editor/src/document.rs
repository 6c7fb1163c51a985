//! The text document a session reads scenes from and writes them back to.

use crate::error::DocumentError;

/// A text document owned by the host editor.
///
/// `set_text` replaces the whole text atomically: either the new text is
/// visible afterwards or, on error, the old text is.
pub trait TextDocument {
    fn text(&self) -> String;

    fn set_text(&mut self, text: &str) -> Result<(), DocumentError>;
}

/// An in-memory document that records every successful write.
#[derive(Debug, Default, Clone)]
pub struct MemoryDocument {
    text: String,
    writes: Vec<String>,
    reject_writes: bool,
}

impl MemoryDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Change the text the way a user typing in the text editor would. This
    /// is not recorded as a write.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Texts written through [`TextDocument::set_text`], oldest first.
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Make subsequent writes fail (e.g. a read-only file).
    pub fn set_reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }
}

impl TextDocument for MemoryDocument {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) -> Result<(), DocumentError> {
        if self.reject_writes {
            return Err(DocumentError::Rejected("document is read-only".into()));
        }
        self.text = text.to_string();
        self.writes.push(self.text.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_edits_are_not_writes() {
        let mut doc = MemoryDocument::new("{}");
        doc.edit("{ }");
        assert_eq!(doc.text(), "{ }");
        assert_eq!(doc.write_count(), 0);
    }

    #[test]
    fn rejected_write_keeps_old_text() {
        let mut doc = MemoryDocument::new("old");
        doc.set_reject_writes(true);
        assert!(doc.set_text("new").is_err());
        assert_eq!(doc.text(), "old");
        assert!(doc.writes().is_empty());
    }
}
