//! Stateful Markdown re-rendering engine with pluggable backends.
//!
//! A [`MarkdownRenderer`] walks a pulldown-cmark document depth first and
//! calls one [`RenderBackend`] method per construct. Two backends ship with
//! the crate:
//! - [`EchoBackend`]: re-serialises the document as Markdown, turning inline
//!   links into reference-style links namespaced per render session, so
//!   several documents can be merged before being emitted again
//! - [`TextBackend`]: degrades the document to plain prose for chat or email,
//!   with best-effort line wrapping
//!
//! Constructs a backend has no output for abort the render with
//! [`RenderError::UnsupportedConstruct`] instead of being dropped.
//!
//! # Example
//!
//! ```
//! use reflow_renderer::{EchoBackend, MarkdownRenderer, TextBackend};
//!
//! let markdown = "# Hello\n\nSee [the docs](https://example.com).";
//!
//! let echoed = MarkdownRenderer::new(EchoBackend::with_link_prefix("a-"))
//!     .render_markdown(markdown)
//!     .unwrap();
//! assert_eq!(
//!     echoed.output,
//!     "# Hello\n\nSee [the docs][a-0].\n\n[a-0]: https://example.com\n"
//! );
//!
//! let plain = MarkdownRenderer::new(TextBackend::new(0))
//!     .render_markdown(markdown)
//!     .unwrap();
//! assert_eq!(
//!     plain.output,
//!     "Hello\n=====\n\nSee the docs (https://example.com).\n\n"
//! );
//! ```

mod backend;
mod buffer;
mod echo;
mod error;
mod links;
mod list;
mod renderer;
mod text;
mod walk;
mod wrap;

pub use backend::{AutoLinkKind, Children, RenderBackend};
pub use buffer::{Mark, OutputBuffer};
pub use echo::EchoBackend;
pub use error::{Construct, RenderError};
pub use links::{LinkEntry, LinkRegistry};
pub use list::{ItemFlags, ListKind, ListState};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use text::TextBackend;
pub use wrap::wrap;
