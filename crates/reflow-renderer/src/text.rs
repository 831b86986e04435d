//! Plain-text backend.
//!
//! Degrades a document to unformatted prose for chat messages or email.
//! Headings are underlined Setext style, links are spelled out as
//! `text (target)`, and paragraphs are soft-wrapped on a best-effort basis
//! when a maximum line length is configured.

use reflow_config::TextConfig;

use crate::backend::{Children, RenderBackend};
use crate::buffer::OutputBuffer;
use crate::error::RenderError;
use crate::list::ItemFlags;
use crate::wrap::wrap;

/// Plain-text render backend.
#[derive(Clone, Debug, Default)]
pub struct TextBackend {
    maximum_line_length: i64,
}

impl TextBackend {
    /// Create a backend wrapping paragraphs at `maximum_line_length` bytes.
    ///
    /// Zero or a negative value disables wrapping.
    pub fn new(maximum_line_length: i64) -> Self {
        Self {
            maximum_line_length,
        }
    }

    /// Create a backend from configuration.
    pub fn from_config(config: &TextConfig) -> Self {
        Self::new(config.maximum_line_length)
    }

    /// Configured wrap width; zero or less means no wrapping.
    pub fn maximum_line_length(&self) -> i64 {
        self.maximum_line_length
    }
}

impl RenderBackend for TextBackend {
    const NAME: &'static str = "text";

    fn header(
        &mut self,
        out: &mut OutputBuffer,
        children: &mut Children<'_, Self>,
        level: u8,
        _id: Option<&str>,
    ) -> Result<(), RenderError> {
        let mark = out.mark();
        if !children(self, out)? {
            out.truncate(mark);
            return Ok(());
        }

        let length = out.len_since(mark);
        out.push('\n');
        out.push_repeated(if level == 1 { '=' } else { '-' }, length);
        out.push_str("\n\n");
        Ok(())
    }

    fn list_item(
        &mut self,
        out: &mut OutputBuffer,
        text: &str,
        _flags: ItemFlags,
    ) -> Result<(), RenderError> {
        out.push_str("- ");
        out.push_str(text);
        out.push('\n');
        Ok(())
    }

    fn paragraph(
        &mut self,
        out: &mut OutputBuffer,
        children: &mut Children<'_, Self>,
    ) -> Result<(), RenderError> {
        let mark = out.mark();
        if !children(self, out)? {
            out.truncate(mark);
            return Ok(());
        }

        if self.maximum_line_length > 0 {
            let body = out.split_off(mark);
            out.push_str(&wrap(&body, self.maximum_line_length));
        }

        out.push_str("\n\n");
        Ok(())
    }

    fn double_emphasis(&mut self, out: &mut OutputBuffer, text: &str) -> Result<(), RenderError> {
        out.push_str(text);
        Ok(())
    }

    fn emphasis(&mut self, out: &mut OutputBuffer, text: &str) -> Result<(), RenderError> {
        out.push_str(text);
        Ok(())
    }

    fn link(
        &mut self,
        out: &mut OutputBuffer,
        link: &str,
        _title: Option<&str>,
        content: &str,
    ) -> Result<(), RenderError> {
        write!(out, "{content} ({link})");
        Ok(())
    }

    fn raw_html_tag(&mut self, out: &mut OutputBuffer, tag: &str) -> Result<(), RenderError> {
        out.push_str(tag);
        Ok(())
    }

    fn entity(&mut self, out: &mut OutputBuffer, entity: &str) -> Result<(), RenderError> {
        out.push_str(&html_escape::decode_html_entities(entity));
        Ok(())
    }

    fn normal_text(&mut self, out: &mut OutputBuffer, text: &str) -> Result<(), RenderError> {
        if text.contains('\n') {
            out.push_str(&text.replace('\n', " "));
        } else {
            out.push_str(text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListKind;
    use pretty_assertions::assert_eq;

    fn children(
        text: &'static str,
    ) -> impl FnMut(&mut TextBackend, &mut OutputBuffer) -> Result<bool, RenderError> {
        move |backend, out| {
            backend.normal_text(out, text)?;
            Ok(!text.is_empty())
        }
    }

    #[test]
    fn test_level_one_heading_underlined_with_equals() {
        let mut out = OutputBuffer::new();
        TextBackend::new(0)
            .header(&mut out, &mut children("Title"), 1, None)
            .unwrap();
        assert_eq!(out.as_str(), "Title\n=====\n\n");
    }

    #[test]
    fn test_lower_heading_underlined_with_dashes() {
        let mut out = OutputBuffer::new();
        TextBackend::new(0)
            .header(&mut out, &mut children("Setup"), 3, None)
            .unwrap();
        assert_eq!(out.as_str(), "Setup\n-----\n\n");
    }

    #[test]
    fn test_empty_heading_produces_nothing() {
        let mut out = OutputBuffer::new();
        TextBackend::new(0)
            .header(&mut out, &mut children(""), 1, None)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_heading_is_never_wrapped() {
        let mut out = OutputBuffer::new();
        TextBackend::new(4)
            .header(&mut out, &mut children("Long heading text"), 2, None)
            .unwrap();
        assert_eq!(
            out.as_str(),
            "Long heading text\n-----------------\n\n"
        );
    }

    #[test]
    fn test_paragraph_wraps() {
        let mut out = OutputBuffer::new();
        out.push_str("keep this line intact\n\n");
        TextBackend::new(6)
            .paragraph(&mut out, &mut children("aaaa bbbb cccc"))
            .unwrap();
        assert_eq!(
            out.as_str(),
            "keep this line intact\n\naaaa\nbbbb\ncccc\n\n"
        );
    }

    #[test]
    fn test_paragraph_without_wrapping() {
        let mut out = OutputBuffer::new();
        TextBackend::new(0)
            .paragraph(&mut out, &mut children("aaaa bbbb cccc"))
            .unwrap();
        assert_eq!(out.as_str(), "aaaa bbbb cccc\n\n");
    }

    #[test]
    fn test_empty_paragraph_produces_nothing() {
        let mut out = OutputBuffer::new();
        TextBackend::new(6)
            .paragraph(&mut out, &mut children(""))
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_inline_markup_is_stripped() {
        let mut backend = TextBackend::new(0);
        let mut out = OutputBuffer::new();
        backend.double_emphasis(&mut out, "bold").unwrap();
        out.push(' ');
        backend.emphasis(&mut out, "italic").unwrap();
        out.push(' ');
        backend.link(&mut out, "http://x", Some("t"), "click").unwrap();
        out.push(' ');
        backend.raw_html_tag(&mut out, "<kbd>").unwrap();
        assert_eq!(out.as_str(), "bold italic click (http://x) <kbd>");
    }

    #[test]
    fn test_entities_are_decoded() {
        let mut out = OutputBuffer::new();
        let mut backend = TextBackend::new(0);
        backend.entity(&mut out, "&amp;").unwrap();
        backend.entity(&mut out, "&lt;").unwrap();
        backend.entity(&mut out, "&#169;").unwrap();
        assert_eq!(out.as_str(), "&<©");
    }

    #[test]
    fn test_text_newlines_collapse() {
        let mut out = OutputBuffer::new();
        TextBackend::new(0)
            .normal_text(&mut out, "one\ntwo\nthree")
            .unwrap();
        assert_eq!(out.as_str(), "one two three");
    }

    #[test]
    fn test_list_items_use_dash() {
        let mut out = OutputBuffer::new();
        let mut backend = TextBackend::new(0);
        backend
            .list_item(&mut out, "a", ItemFlags::new(ListKind::Ordered))
            .unwrap();
        backend
            .list_item(&mut out, "b", ItemFlags::new(ListKind::Unordered))
            .unwrap();
        assert_eq!(out.as_str(), "- a\n- b\n");
    }

    #[test]
    fn test_code_span_borrows_default() {
        let mut out = OutputBuffer::new();
        TextBackend::new(0).code_span(&mut out, "cargo").unwrap();
        assert_eq!(out.as_str(), "`cargo`");
    }

    #[test]
    fn test_from_config() {
        let config = TextConfig {
            maximum_line_length: 72,
        };
        assert_eq!(TextBackend::from_config(&config).maximum_line_length(), 72);
    }
}
