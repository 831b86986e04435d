//! Markdown echo backend.
//!
//! Re-serialises a parsed document as Markdown so several documents can be
//! modified and merged before being emitted again. Inline links become
//! reference-style links whose definitions are written at the end of the
//! document, labelled with a per-session prefix.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use reflow_config::EchoConfig;

use crate::backend::{Children, RenderBackend};
use crate::buffer::OutputBuffer;
use crate::error::RenderError;
use crate::links::LinkRegistry;
use crate::list::{ItemFlags, ListKind, ListState};

/// Line start inside a block item that needs continuation indent.
static CONTINUATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n(\S+)").unwrap());

/// Blank line between a line ending in `:` and a code fence.
static COLON_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\n\n(\s*)```").unwrap());

/// Markdown echo backend.
///
/// One instance renders exactly one document: it owns the link registry and
/// list counters of that session.
#[derive(Debug)]
pub struct EchoBackend {
    links: LinkRegistry,
    lists: ListState,
}

impl EchoBackend {
    /// Create a backend with a fresh random link prefix.
    pub fn new() -> Self {
        Self::with_link_prefix(format!("{}-", Uuid::new_v4().simple()))
    }

    /// Create a backend using a caller-supplied link prefix.
    pub fn with_link_prefix(prefix: impl Into<String>) -> Self {
        Self {
            links: LinkRegistry::new(prefix),
            lists: ListState::new(),
        }
    }

    /// Create a backend from configuration.
    ///
    /// Falls back to a random prefix when none is configured.
    pub fn from_config(config: &EchoConfig) -> Self {
        match &config.link_prefix {
            Some(prefix) => Self::with_link_prefix(prefix.clone()),
            None => Self::new(),
        }
    }

    /// Label namespace of this session.
    pub fn link_prefix(&self) -> &str {
        self.links.prefix()
    }

    /// Links registered so far.
    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }
}

impl Default for EchoBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Indent continuation lines of a multi-line block item.
///
/// Also pulls a code fence up against a preceding line that ends in `:`,
/// so `Example:` followed by a fence does not gain a blank line.
fn indent_block_item(text: &str) -> Cow<'_, str> {
    if !text.contains('\n') {
        return Cow::Borrowed(text);
    }
    let indented = CONTINUATION_RE.replace_all(text, "\n   $1");
    if COLON_FENCE_RE.is_match(&indented) {
        return Cow::Owned(COLON_FENCE_RE.replace_all(&indented, ":\n$1```").into_owned());
    }
    indented
}

impl RenderBackend for EchoBackend {
    const NAME: &'static str = "echo";

    fn list(
        &mut self,
        out: &mut OutputBuffer,
        children: &mut Children<'_, Self>,
        _kind: ListKind,
    ) -> Result<(), RenderError> {
        self.lists.open();
        let produced = children(self, out);
        self.lists.close();

        if produced? {
            out.push('\n');
        }
        Ok(())
    }

    fn list_item(
        &mut self,
        out: &mut OutputBuffer,
        text: &str,
        flags: ItemFlags,
    ) -> Result<(), RenderError> {
        if flags.beginning_of_list {
            self.lists.reset();
        }

        let mut body = Cow::Borrowed(text);
        if flags.contains_block {
            let mut indented = indent_block_item(text).into_owned();
            indented.push('\n');
            body = Cow::Owned(indented);
        }

        match flags.kind {
            ListKind::Ordered => {
                let ordinal = self.lists.next_ordinal();
                write!(out, "{ordinal}. ");
            }
            ListKind::Definition => out.push_str("- "),
            ListKind::Term | ListKind::Unordered => out.push_str("* "),
        }
        out.push_str(&body);
        out.push('\n');
        Ok(())
    }

    fn link(
        &mut self,
        out: &mut OutputBuffer,
        link: &str,
        title: Option<&str>,
        content: &str,
    ) -> Result<(), RenderError> {
        let index = self.links.register(link, title, content);
        write!(out, "[{content}][{}]", self.links.label(index));
        Ok(())
    }

    fn document_footer(&mut self, out: &mut OutputBuffer) -> Result<(), RenderError> {
        tracing::debug!(
            prefix = self.links.prefix(),
            links = self.links.len(),
            "Writing link definitions"
        );
        self.links.write_definitions(out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(backend: &mut EchoBackend, out: &mut OutputBuffer, text: &str, flags: ItemFlags) {
        backend.list_item(out, text, flags).unwrap();
    }

    #[test]
    fn test_unordered_items() {
        let mut backend = EchoBackend::with_link_prefix("p-");
        let mut out = OutputBuffer::new();
        let flags = ItemFlags::new(ListKind::Unordered);
        item(&mut backend, &mut out, "a", flags.beginning_of_list(true));
        item(&mut backend, &mut out, "b", flags);
        assert_eq!(out.as_str(), "* a\n* b\n");
    }

    #[test]
    fn test_ordered_items_restart_at_beginning_of_list() {
        let mut backend = EchoBackend::with_link_prefix("p-");
        let mut out = OutputBuffer::new();
        let flags = ItemFlags::new(ListKind::Ordered);
        item(&mut backend, &mut out, "a", flags.beginning_of_list(true));
        item(&mut backend, &mut out, "b", flags);
        item(&mut backend, &mut out, "c", flags.beginning_of_list(true));
        assert_eq!(out.as_str(), "1. a\n2. b\n1. c\n");
    }

    #[test]
    fn test_definition_and_term_markers() {
        let mut backend = EchoBackend::with_link_prefix("p-");
        let mut out = OutputBuffer::new();
        item(&mut backend, &mut out, "term", ItemFlags::new(ListKind::Term));
        item(&mut backend, &mut out, "meaning", ItemFlags::new(ListKind::Definition));
        assert_eq!(out.as_str(), "* term\n- meaning\n");
    }

    #[test]
    fn test_block_item_continuation_indent() {
        let mut backend = EchoBackend::with_link_prefix("p-");
        let mut out = OutputBuffer::new();
        let flags = ItemFlags::new(ListKind::Unordered).contains_block(true);
        item(&mut backend, &mut out, "first\n\nsecond", flags);
        assert_eq!(out.as_str(), "* first\n\n   second\n\n");
    }

    #[test]
    fn test_block_item_colon_before_fence() {
        assert_eq!(
            indent_block_item("Example:\n\n```sh\nls\n```"),
            "Example:\n   ```sh\n   ls\n   ```"
        );
    }

    #[test]
    fn test_single_line_block_item_unchanged() {
        assert!(matches!(indent_block_item("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_links_are_numbered_in_order() {
        let mut backend = EchoBackend::with_link_prefix("doc-");
        let mut out = OutputBuffer::new();
        backend.link(&mut out, "http://x", None, "click").unwrap();
        out.push(' ');
        backend
            .link(&mut out, "http://y", Some("Why"), "here")
            .unwrap();
        assert_eq!(out.as_str(), "[click][doc-0] [here][doc-1]");

        let mut footer = OutputBuffer::new();
        backend.document_footer(&mut footer).unwrap();
        assert_eq!(
            footer.as_str(),
            "[doc-0]: http://x\n[doc-1]: http://y \"Why\"\n"
        );
    }

    #[test]
    fn test_random_prefixes_differ_per_session() {
        let a = EchoBackend::new();
        let b = EchoBackend::new();
        assert_ne!(a.link_prefix(), b.link_prefix());
        assert!(a.link_prefix().ends_with('-'));
    }

    #[test]
    fn test_from_config() {
        let config = EchoConfig {
            link_prefix: Some("merged-".to_owned()),
        };
        assert_eq!(EchoBackend::from_config(&config).link_prefix(), "merged-");

        let generated = EchoBackend::from_config(&EchoConfig::default());
        assert_eq!(generated.link_prefix().len(), 33);
    }
}
