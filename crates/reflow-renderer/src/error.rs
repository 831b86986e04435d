//! Error types for rendering.

use std::fmt;

/// Syntactic construct reported by the parser, one per dispatch slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Construct {
    BlockCode,
    BlockQuote,
    BlockHtml,
    Header,
    HorizontalRule,
    List,
    ListItem,
    Paragraph,
    Table,
    TableRow,
    TableHeaderCell,
    TableCell,
    Footnotes,
    FootnoteItem,
    TitleBlock,
    AutoLink,
    CodeSpan,
    DoubleEmphasis,
    Emphasis,
    Image,
    LineBreak,
    Link,
    RawHtmlTag,
    TripleEmphasis,
    StrikeThrough,
    FootnoteRef,
    Entity,
    NormalText,
    DocumentHeader,
    DocumentFooter,
    /// Inline or display math (parser extension, no dispatch slot).
    Math,
    /// Superscript (parser extension, no dispatch slot).
    Superscript,
    /// Subscript (parser extension, no dispatch slot).
    Subscript,
}

impl Construct {
    /// Stable lowercase name used in messages and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlockCode => "block code",
            Self::BlockQuote => "block quote",
            Self::BlockHtml => "block html",
            Self::Header => "header",
            Self::HorizontalRule => "horizontal rule",
            Self::List => "list",
            Self::ListItem => "list item",
            Self::Paragraph => "paragraph",
            Self::Table => "table",
            Self::TableRow => "table row",
            Self::TableHeaderCell => "table header cell",
            Self::TableCell => "table cell",
            Self::Footnotes => "footnotes",
            Self::FootnoteItem => "footnote item",
            Self::TitleBlock => "title block",
            Self::AutoLink => "autolink",
            Self::CodeSpan => "code span",
            Self::DoubleEmphasis => "double emphasis",
            Self::Emphasis => "emphasis",
            Self::Image => "image",
            Self::LineBreak => "line break",
            Self::Link => "link",
            Self::RawHtmlTag => "raw html tag",
            Self::TripleEmphasis => "triple emphasis",
            Self::StrikeThrough => "strikethrough",
            Self::FootnoteRef => "footnote reference",
            Self::Entity => "entity",
            Self::NormalText => "normal text",
            Self::DocumentHeader => "document header",
            Self::DocumentFooter => "document footer",
            Self::Math => "math",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
        }
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error that aborts a render session.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RenderError {
    /// The backend has no behaviour defined for this construct.
    ///
    /// Returned instead of silently dropping content; the host decides
    /// whether to abort or substitute a fallback.
    #[error("{backend} backend does not support {construct}")]
    UnsupportedConstruct {
        /// Construct that was reached.
        construct: Construct,
        /// Name of the backend that rejected it.
        backend: &'static str,
    },
}

impl RenderError {
    /// Create an [`UnsupportedConstruct`](Self::UnsupportedConstruct) error.
    #[must_use]
    pub fn unsupported(construct: Construct, backend: &'static str) -> Self {
        Self::UnsupportedConstruct { construct, backend }
    }
}
