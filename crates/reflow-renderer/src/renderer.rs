//! Render session: one backend, one buffer, one traversal.

use pulldown_cmark::{Event, Options, Parser};

use crate::backend::RenderBackend;
use crate::buffer::OutputBuffer;
use crate::error::RenderError;
use crate::walk::{Document, Walker};

/// Result of rendering markdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered output text.
    pub output: String,
}

/// Markdown renderer driving a [`RenderBackend`] over one document.
///
/// Rendering consumes the renderer, so the backend state (link registry,
/// list counters) belongs to exactly one traversal. Build a new renderer for
/// every document; concatenating their outputs is safe because each session
/// namespaces its own link labels.
pub struct MarkdownRenderer<B: RenderBackend> {
    backend: B,
    output: OutputBuffer,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a renderer for a freshly constructed backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            output: OutputBuffer::with_capacity(4096),
        }
    }

    /// Parser options requested by the backend.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        self.backend.flags()
    }

    /// Create a parser configured with the backend's options.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Parse and render markdown text.
    ///
    /// Character references reach the backend's `entity` handler as written
    /// in the source.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedConstruct`] if the document contains
    /// a construct the backend cannot render.
    pub fn render_markdown(self, markdown: &str) -> Result<RenderResult, RenderError> {
        let parser = self.create_parser(markdown);
        tracing::debug!(backend = B::NAME, input_len = markdown.len(), "Rendering markdown");
        let document = Document::build_with_source(markdown, parser.into_offset_iter());
        self.render_document(&document)
    }

    /// Render a stream of parser events.
    ///
    /// Without the source text, character references arrive already decoded
    /// and are rendered as normal text.
    ///
    /// # Errors
    ///
    /// Stops at the first construct the backend rejects and returns its
    /// [`RenderError`]; no partial output is returned.
    pub fn render<'a, I>(self, events: I) -> Result<RenderResult, RenderError>
    where
        I: Iterator<Item = Event<'a>>,
    {
        let document = Document::build(events);
        self.render_document(&document)
    }

    fn render_document(mut self, document: &Document<'_>) -> Result<RenderResult, RenderError> {
        match self.run(document) {
            Ok(()) => {
                tracing::debug!(
                    backend = B::NAME,
                    output_len = self.output.len(),
                    "Rendered document"
                );
                Ok(RenderResult {
                    output: self.output.into_string(),
                })
            }
            Err(err) => {
                tracing::warn!(backend = B::NAME, error = %err, "Render aborted");
                Err(err)
            }
        }
    }

    fn run(&mut self, document: &Document<'_>) -> Result<(), RenderError> {
        self.backend.document_header(&mut self.output)?;
        Walker::default().render_document(&mut self.backend, &mut self.output, document)?;
        self.backend.document_footer(&mut self.output)
    }
}
