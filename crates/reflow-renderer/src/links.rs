//! Reference-style link registry.
//!
//! Inline links are emitted as `[content][label]` and their definitions are
//! deferred to the end of the document. Labels are `prefix + index`, where the
//! prefix namespaces one render session so several rendered documents can be
//! concatenated without label collisions.

use crate::buffer::OutputBuffer;

/// One link seen during a render session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkEntry {
    /// Link destination.
    pub target: String,
    /// Optional link title.
    pub title: Option<String>,
    /// Rendered link text.
    pub content: String,
    /// Zero-based position in first-reference order.
    pub index: usize,
}

/// Append-only, first-seen ordered sequence of links.
#[derive(Clone, Debug)]
pub struct LinkRegistry {
    entries: Vec<LinkEntry>,
    prefix: String,
}

impl LinkRegistry {
    /// Create an empty registry whose labels start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            prefix: prefix.into(),
        }
    }

    /// Label namespace of this session.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Append a link and return its index.
    pub fn register(&mut self, target: &str, title: Option<&str>, content: &str) -> usize {
        let index = self.entries.len();
        self.entries.push(LinkEntry {
            target: target.to_owned(),
            title: title.filter(|t| !t.is_empty()).map(str::to_owned),
            content: content.to_owned(),
            index,
        });
        index
    }

    /// Reference label for the entry at `index`.
    pub fn label(&self, index: usize) -> String {
        format!("{}{index}", self.prefix)
    }

    /// Registered links in first-reference order.
    pub fn entries(&self) -> &[LinkEntry] {
        &self.entries
    }

    /// Number of registered links.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no link has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write one `[label]: target "title"` line per entry, in order.
    pub fn write_definitions(&self, out: &mut OutputBuffer) {
        for entry in &self.entries {
            write!(out, "[{}{}]: {}", self.prefix, entry.index, entry.target);
            if let Some(title) = &entry.title {
                write!(out, " \"{title}\"");
            }
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_assigns_sequential_indexes() {
        let mut links = LinkRegistry::new("doc-");
        assert_eq!(links.register("http://a", None, "a"), 0);
        assert_eq!(links.register("http://b", Some("B"), "b"), 1);
        assert_eq!(links.register("http://a", None, "a again"), 2);
        assert_eq!(links.len(), 3);
        assert_eq!(links.entries()[1].title.as_deref(), Some("B"));
        assert_eq!(links.label(2), "doc-2");
    }

    #[test]
    fn test_empty_title_is_dropped() {
        let mut links = LinkRegistry::new("p");
        links.register("http://x", Some(""), "x");
        assert_eq!(links.entries()[0].title, None);
    }

    #[test]
    fn test_write_definitions_in_order() {
        let mut links = LinkRegistry::new("doc-");
        links.register("http://x", None, "x");
        links.register("http://y", Some("Why"), "y");

        let mut out = OutputBuffer::new();
        links.write_definitions(&mut out);
        assert_eq!(
            out.as_str(),
            "[doc-0]: http://x\n[doc-1]: http://y \"Why\"\n"
        );
    }

    #[test]
    fn test_write_definitions_empty_registry() {
        let links = LinkRegistry::new("doc-");
        let mut out = OutputBuffer::new();
        links.write_definitions(&mut out);
        assert!(out.is_empty());
        assert!(links.is_empty());
    }
}
