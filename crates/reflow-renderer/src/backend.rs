//! Render backend trait: one handler per syntactic construct.
//!
//! The tree walker invokes exactly one method per construct, depth first.
//! Default method bodies carry the shared behaviour (Markdown re-serialisation
//! for the simple constructs, [`RenderError::UnsupportedConstruct`] for the
//! ones without defined output); backends override only what differs.
//! [`list_item`](RenderBackend::list_item) and [`link`](RenderBackend::link)
//! have no sensible stateless default and must always be implemented.

use pulldown_cmark::{Alignment, Options};

use crate::buffer::OutputBuffer;
use crate::error::{Construct, RenderError};
use crate::list::{ItemFlags, ListKind};

/// Deferred rendering of a construct's children.
///
/// Renders the children into the given buffer and reports whether any
/// output was produced.
pub type Children<'a, B> =
    dyn FnMut(&mut B, &mut OutputBuffer) -> Result<bool, RenderError> + 'a;

/// Kind of autolink found in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoLinkKind {
    /// `<https://example.com>`
    Normal,
    /// `<user@example.com>`
    Email,
}

/// Backend trait for format-specific rendering of each construct.
pub trait RenderBackend: Sized {
    /// Backend name used in errors and logs.
    const NAME: &'static str;

    /// Optional parser features requested by this backend.
    ///
    /// Both shipped backends request none.
    fn flags(&self) -> Options {
        Options::empty()
    }

    /// Render a fenced or indented code block.
    fn block_code(
        &mut self,
        out: &mut OutputBuffer,
        text: &str,
        lang: Option<&str>,
    ) -> Result<(), RenderError> {
        out.push_str("```");
        if let Some(lang) = lang {
            out.push_str(lang);
        }
        out.push('\n');
        out.push_str(text);
        out.push_str("```\n");
        Ok(())
    }

    fn block_quote(&mut self, _out: &mut OutputBuffer, _text: &str) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::BlockQuote, Self::NAME))
    }

    fn block_html(&mut self, _out: &mut OutputBuffer, _text: &str) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::BlockHtml, Self::NAME))
    }

    /// Render a heading as `#`-prefixed ATX text.
    ///
    /// Empty headings leave no output at all.
    fn header(
        &mut self,
        out: &mut OutputBuffer,
        children: &mut Children<'_, Self>,
        level: u8,
        _id: Option<&str>,
    ) -> Result<(), RenderError> {
        let mark = out.mark();
        out.push_repeated('#', usize::from(level));
        out.push(' ');

        if !children(self, out)? {
            out.truncate(mark);
            return Ok(());
        }

        out.push_str("\n\n");
        Ok(())
    }

    fn hrule(&mut self, _out: &mut OutputBuffer) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::HorizontalRule, Self::NAME))
    }

    /// Render a list; a list that produced items is followed by a newline.
    fn list(
        &mut self,
        out: &mut OutputBuffer,
        children: &mut Children<'_, Self>,
        _kind: ListKind,
    ) -> Result<(), RenderError> {
        if children(self, out)? {
            out.push('\n');
        }
        Ok(())
    }

    /// Render one list item from its already rendered content.
    fn list_item(
        &mut self,
        out: &mut OutputBuffer,
        text: &str,
        flags: ItemFlags,
    ) -> Result<(), RenderError>;

    /// Render a paragraph, followed by a blank line.
    ///
    /// Empty paragraphs leave no output at all.
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

        out.push_str("\n\n");
        Ok(())
    }

    /// Render a table from its rendered header and body rows.
    fn table(
        &mut self,
        out: &mut OutputBuffer,
        header: &str,
        body: &str,
        _columns: &[Alignment],
    ) -> Result<(), RenderError> {
        out.push_str(header);
        out.push_str(body);
        out.push('\n');
        Ok(())
    }

    fn table_row(&mut self, out: &mut OutputBuffer, text: &str) -> Result<(), RenderError> {
        out.push_str(text.trim());
        out.push('\n');
        Ok(())
    }

    fn table_header_cell(
        &mut self,
        out: &mut OutputBuffer,
        text: &str,
        _align: Alignment,
    ) -> Result<(), RenderError> {
        out.push_str(text);
        out.push('\t');
        Ok(())
    }

    fn table_cell(
        &mut self,
        out: &mut OutputBuffer,
        text: &str,
        _align: Alignment,
    ) -> Result<(), RenderError> {
        out.push_str(text);
        out.push('\t');
        Ok(())
    }

    fn footnotes(
        &mut self,
        _out: &mut OutputBuffer,
        _children: &mut Children<'_, Self>,
    ) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::Footnotes, Self::NAME))
    }

    fn footnote_item(
        &mut self,
        _out: &mut OutputBuffer,
        _name: &str,
        _text: &str,
    ) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::FootnoteItem, Self::NAME))
    }

    fn title_block(&mut self, _out: &mut OutputBuffer, _text: &str) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::TitleBlock, Self::NAME))
    }

    fn auto_link(
        &mut self,
        _out: &mut OutputBuffer,
        _link: &str,
        _kind: AutoLinkKind,
    ) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::AutoLink, Self::NAME))
    }

    fn code_span(&mut self, out: &mut OutputBuffer, text: &str) -> Result<(), RenderError> {
        out.push('`');
        out.push_str(text);
        out.push('`');
        Ok(())
    }

    fn double_emphasis(&mut self, out: &mut OutputBuffer, text: &str) -> Result<(), RenderError> {
        out.push_str("**");
        out.push_str(text);
        out.push_str("**");
        Ok(())
    }

    fn emphasis(&mut self, out: &mut OutputBuffer, text: &str) -> Result<(), RenderError> {
        out.push('_');
        out.push_str(text);
        out.push('_');
        Ok(())
    }

    /// Render an image as `![alt](link "title")`.
    fn image(
        &mut self,
        out: &mut OutputBuffer,
        link: &str,
        title: Option<&str>,
        alt: &str,
    ) -> Result<(), RenderError> {
        write!(out, "![{alt}]({link}");
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            write!(out, " \"{title}\"");
        }
        out.push(')');
        Ok(())
    }

    fn line_break(&mut self, out: &mut OutputBuffer) -> Result<(), RenderError> {
        out.push('\n');
        Ok(())
    }

    /// Render an inline link from its already rendered content.
    fn link(
        &mut self,
        out: &mut OutputBuffer,
        link: &str,
        title: Option<&str>,
        content: &str,
    ) -> Result<(), RenderError>;

    fn raw_html_tag(&mut self, _out: &mut OutputBuffer, _tag: &str) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::RawHtmlTag, Self::NAME))
    }

    fn triple_emphasis(&mut self, _out: &mut OutputBuffer, _text: &str) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::TripleEmphasis, Self::NAME))
    }

    fn strike_through(&mut self, _out: &mut OutputBuffer, _text: &str) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::StrikeThrough, Self::NAME))
    }

    fn footnote_ref(
        &mut self,
        _out: &mut OutputBuffer,
        _reference: &str,
        _id: usize,
    ) -> Result<(), RenderError> {
        Err(RenderError::unsupported(Construct::FootnoteRef, Self::NAME))
    }

    fn entity(&mut self, out: &mut OutputBuffer, entity: &str) -> Result<(), RenderError> {
        out.push_str(entity);
        Ok(())
    }

    fn normal_text(&mut self, out: &mut OutputBuffer, text: &str) -> Result<(), RenderError> {
        out.push_str(text);
        Ok(())
    }

    /// Called once before the traversal starts.
    fn document_header(&mut self, _out: &mut OutputBuffer) -> Result<(), RenderError> {
        Ok(())
    }

    /// Called once after the traversal completes.
    fn document_footer(&mut self, _out: &mut OutputBuffer) -> Result<(), RenderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Backend relying on every default.
    struct Plain;

    impl RenderBackend for Plain {
        const NAME: &'static str = "plain";

        fn list_item(
            &mut self,
            out: &mut OutputBuffer,
            text: &str,
            _flags: ItemFlags,
        ) -> Result<(), RenderError> {
            out.push_str(text);
            Ok(())
        }

        fn link(
            &mut self,
            out: &mut OutputBuffer,
            _link: &str,
            _title: Option<&str>,
            content: &str,
        ) -> Result<(), RenderError> {
            out.push_str(content);
            Ok(())
        }
    }

    fn text_children(
        text: &'static str,
    ) -> impl FnMut(&mut Plain, &mut OutputBuffer) -> Result<bool, RenderError> {
        move |_, out| {
            out.push_str(text);
            Ok(!text.is_empty())
        }
    }

    #[test]
    fn test_header_levels() {
        let mut out = OutputBuffer::new();
        Plain.header(&mut out, &mut text_children("Usage"), 3, None).unwrap();
        assert_eq!(out.as_str(), "### Usage\n\n");
    }

    #[test]
    fn test_empty_header_rolls_back() {
        let mut out = OutputBuffer::new();
        out.push_str("before\n\n");
        Plain.header(&mut out, &mut text_children(""), 2, None).unwrap();
        assert_eq!(out.as_str(), "before\n\n");
    }

    #[test]
    fn test_empty_paragraph_rolls_back() {
        let mut out = OutputBuffer::new();
        Plain.paragraph(&mut out, &mut text_children("")).unwrap();
        assert!(out.is_empty());

        Plain.paragraph(&mut out, &mut text_children("body")).unwrap();
        assert_eq!(out.as_str(), "body\n\n");
    }

    #[test]
    fn test_empty_list_adds_nothing() {
        let mut out = OutputBuffer::new();
        Plain
            .list(&mut out, &mut text_children(""), ListKind::Unordered)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_block_code() {
        let mut out = OutputBuffer::new();
        Plain.block_code(&mut out, "fn main() {}\n", Some("rust")).unwrap();
        assert_eq!(out.as_str(), "```rust\nfn main() {}\n```\n");

        let mut out = OutputBuffer::new();
        Plain.block_code(&mut out, "plain\n", None).unwrap();
        assert_eq!(out.as_str(), "```\nplain\n```\n");
    }

    #[test]
    fn test_inline_formatters() {
        let mut out = OutputBuffer::new();
        Plain.code_span(&mut out, "x").unwrap();
        Plain.double_emphasis(&mut out, "b").unwrap();
        Plain.emphasis(&mut out, "i").unwrap();
        Plain.entity(&mut out, "&amp;").unwrap();
        Plain.line_break(&mut out).unwrap();
        assert_eq!(out.as_str(), "`x`**b**_i_&amp;\n");
    }

    #[test]
    fn test_image_with_and_without_title() {
        let mut out = OutputBuffer::new();
        Plain.image(&mut out, "a.png", None, "Alt").unwrap();
        out.push(' ');
        Plain.image(&mut out, "b.png", Some("Title"), "Alt").unwrap();
        assert_eq!(out.as_str(), "![Alt](a.png) ![Alt](b.png \"Title\")");
    }

    #[test]
    fn test_table_defaults() {
        let mut row = OutputBuffer::new();
        Plain.table_header_cell(&mut row, "A", Alignment::None).unwrap();
        Plain.table_header_cell(&mut row, "B", Alignment::Left).unwrap();

        let mut header = OutputBuffer::new();
        Plain.table_row(&mut header, row.as_str()).unwrap();

        let mut out = OutputBuffer::new();
        Plain.table(&mut out, header.as_str(), "1\t2\n", &[]).unwrap();
        assert_eq!(out.as_str(), "A\tB\n1\t2\n\n");
    }

    #[test]
    fn test_unsupported_defaults() {
        let mut out = OutputBuffer::new();
        let err = Plain.hrule(&mut out).unwrap_err();
        assert_eq!(
            err,
            RenderError::unsupported(Construct::HorizontalRule, "plain")
        );
        assert!(Plain.block_quote(&mut out, "q").is_err());
        assert!(Plain.raw_html_tag(&mut out, "<b>").is_err());
        assert!(Plain.strike_through(&mut out, "s").is_err());
        assert!(Plain.footnote_ref(&mut out, "n", 1).is_err());
        assert!(
            Plain
                .auto_link(&mut out, "https://x", AutoLinkKind::Normal)
                .is_err()
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_flags_request_nothing() {
        assert_eq!(Plain.flags(), Options::empty());
    }
}
