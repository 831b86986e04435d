//! Depth-first dispatch of pulldown-cmark events to a [`RenderBackend`].
//!
//! pulldown-cmark yields a flat stream of start/end events, while backends
//! expect one call per construct with either a children callback (headings,
//! paragraphs, lists, footnotes) or the children already rendered (inline
//! markup, list items, table cells). Events are folded into a small tree
//! first, then walked.
//!
//! pulldown-cmark decodes character references into plain text. When the
//! source is available, text whose source is an entity is kept as an entity
//! node so backends see it through their `entity` handler.

use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Tag};

use crate::backend::{AutoLinkKind, RenderBackend};
use crate::buffer::OutputBuffer;
use crate::error::{Construct, RenderError};
use crate::list::{ItemFlags, ListKind};

/// Node of the folded event tree.
#[derive(Debug)]
pub(crate) enum Node<'a> {
    Element { tag: Tag<'a>, children: Vec<Node<'a>> },
    Leaf(Event<'a>),
    /// Character reference as written in the source, e.g. `&lt;`.
    Entity(&'a str),
}

impl Node<'_> {
    fn is_block(&self) -> bool {
        match self {
            Node::Element { tag, .. } => matches!(
                tag,
                Tag::Paragraph
                    | Tag::Heading { .. }
                    | Tag::BlockQuote(_)
                    | Tag::CodeBlock(_)
                    | Tag::HtmlBlock
                    | Tag::List(_)
                    | Tag::DefinitionList
                    | Tag::Table(_)
                    | Tag::FootnoteDefinition(_)
                    | Tag::MetadataBlock(_)
            ),
            Node::Leaf(event) => matches!(event, Event::Rule | Event::DisplayMath(_)),
            Node::Entity(_) => false,
        }
    }
}

/// Folded document: body plus footnote definitions, which render last.
#[derive(Debug, Default)]
pub(crate) struct Document<'a> {
    pub(crate) body: Vec<Node<'a>>,
    pub(crate) footnotes: Vec<(CowStr<'a>, Vec<Node<'a>>)>,
}

impl<'a> Document<'a> {
    /// Fold an event stream into a tree.
    ///
    /// Unbalanced start events are closed at the end of the stream.
    pub(crate) fn build<I>(events: I) -> Self
    where
        I: Iterator<Item = Event<'a>>,
    {
        Self::fold(events.map(Node::Leaf))
    }

    /// Fold an offset event stream, keeping entities as written in `source`.
    pub(crate) fn build_with_source<I>(source: &'a str, events: I) -> Self
    where
        I: Iterator<Item = (Event<'a>, Range<usize>)>,
    {
        Self::fold(events.map(|(event, range)| match event {
            Event::Text(text) => match entity_source(source, range, &text) {
                Some(entity) => Node::Entity(entity),
                None => Node::Leaf(Event::Text(text)),
            },
            other => Node::Leaf(other),
        }))
    }

    fn fold<I>(nodes: I) -> Self
    where
        I: Iterator<Item = Node<'a>>,
    {
        let mut stack: Vec<(Tag<'a>, Vec<Node<'a>>)> = Vec::new();
        let mut root = Vec::new();

        for node in nodes {
            match node {
                Node::Leaf(Event::Start(tag)) => stack.push((tag, Vec::new())),
                Node::Leaf(Event::End(_)) => {
                    if let Some((tag, children)) = stack.pop() {
                        attach(&mut stack, &mut root, Node::Element { tag, children });
                    }
                }
                other => attach(&mut stack, &mut root, other),
            }
        }
        while let Some((tag, children)) = stack.pop() {
            attach(&mut stack, &mut root, Node::Element { tag, children });
        }

        let mut document = Self::default();
        for node in root {
            match node {
                Node::Element {
                    tag: Tag::FootnoteDefinition(label),
                    children,
                } => document.footnotes.push((label, children)),
                other => document.body.push(other),
            }
        }
        document
    }
}

/// Source text of a decoded character reference, if `range` holds one.
fn entity_source<'s>(source: &'s str, range: Range<usize>, decoded: &str) -> Option<&'s str> {
    source
        .get(range)
        .filter(|raw| raw.len() > 2 && raw.starts_with('&') && raw.ends_with(';'))
        .filter(|raw| *raw != decoded)
}

/// Append `node` to the innermost open element, or to the root.
fn attach<'a>(stack: &mut [(Tag<'a>, Vec<Node<'a>>)], root: &mut Vec<Node<'a>>, node: Node<'a>) {
    match stack.last_mut() {
        Some((_, parent)) => parent.push(node),
        None => root.push(node),
    }
}

/// Tree walker holding traversal-only state.
#[derive(Debug, Default)]
pub(crate) struct Walker {
    /// Footnote labels in first-reference order.
    footnote_refs: Vec<String>,
}

impl Walker {
    /// Render the document body, then the footnote block if any.
    pub(crate) fn render_document<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        document: &Document<'_>,
    ) -> Result<(), RenderError> {
        self.render_nodes(backend, out, &document.body)?;

        if !document.footnotes.is_empty() {
            let footnotes = &document.footnotes;
            backend.footnotes(out, &mut |b: &mut B, o: &mut OutputBuffer| {
                self.render_footnote_items(b, o, footnotes)
            })?;
        }
        Ok(())
    }

    fn render_nodes<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        nodes: &[Node<'_>],
    ) -> Result<bool, RenderError> {
        let mark = out.mark();
        for node in nodes {
            self.render_node(backend, out, node)?;
        }
        Ok(out.wrote_since(mark))
    }

    /// Render nodes into a scratch buffer and return the text.
    fn render_to_string<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        nodes: &[Node<'_>],
    ) -> Result<String, RenderError> {
        let mut scratch = OutputBuffer::new();
        self.render_nodes(backend, &mut scratch, nodes)?;
        Ok(scratch.into_string())
    }

    fn render_node<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        node: &Node<'_>,
    ) -> Result<(), RenderError> {
        match node {
            Node::Leaf(event) => self.render_leaf(backend, out, event),
            Node::Element { tag, children } => self.render_element(backend, out, tag, children),
            Node::Entity(entity) => backend.entity(out, entity),
        }
    }

    fn render_leaf<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        event: &Event<'_>,
    ) -> Result<(), RenderError> {
        match event {
            Event::Text(text) => backend.normal_text(out, text),
            Event::Code(code) => backend.code_span(out, code),
            Event::Html(html) => backend.block_html(out, html),
            Event::InlineHtml(html) => backend.raw_html_tag(out, html),
            Event::SoftBreak => backend.normal_text(out, "\n"),
            Event::HardBreak => backend.line_break(out),
            Event::Rule => backend.hrule(out),
            Event::TaskListMarker(checked) => {
                backend.normal_text(out, if *checked { "[x] " } else { "[ ] " })
            }
            Event::FootnoteReference(label) => {
                let id = self.footnote_id(label);
                backend.footnote_ref(out, label, id)
            }
            Event::InlineMath(_) | Event::DisplayMath(_) => {
                Err(RenderError::unsupported(Construct::Math, B::NAME))
            }
            // Folded into elements by `Document::build`.
            Event::Start(_) | Event::End(_) => Ok(()),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn render_element<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        tag: &Tag<'_>,
        children: &[Node<'_>],
    ) -> Result<(), RenderError> {
        match tag {
            Tag::Paragraph => backend.paragraph(out, &mut |b: &mut B, o: &mut OutputBuffer| {
                self.render_nodes(b, o, children)
            }),
            Tag::Heading { level, id, .. } => backend.header(
                out,
                &mut |b: &mut B, o: &mut OutputBuffer| self.render_nodes(b, o, children),
                heading_level_to_num(*level),
                id.as_deref(),
            ),
            Tag::BlockQuote(_) => {
                let text = self.render_to_string(backend, children)?;
                backend.block_quote(out, &text)
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info.split_whitespace().next(),
                    CodeBlockKind::Indented => None,
                };
                backend.block_code(out, &plain_text(children), lang)
            }
            Tag::HtmlBlock => backend.block_html(out, &plain_text(children)),
            Tag::List(start) => {
                let kind = if start.is_some() {
                    ListKind::Ordered
                } else {
                    ListKind::Unordered
                };
                backend.list(
                    out,
                    &mut |b: &mut B, o: &mut OutputBuffer| self.render_items(b, o, children, kind),
                    kind,
                )
            }
            Tag::DefinitionList => backend.list(
                out,
                &mut |b: &mut B, o: &mut OutputBuffer| {
                    self.render_items(b, o, children, ListKind::Definition)
                },
                ListKind::Definition,
            ),
            Tag::Item => self.render_item(
                backend,
                out,
                children,
                ItemFlags::new(ListKind::Unordered).beginning_of_list(true),
            ),
            Tag::DefinitionListTitle => self.render_item(
                backend,
                out,
                children,
                ItemFlags::new(ListKind::Term).beginning_of_list(true),
            ),
            Tag::DefinitionListDefinition => self.render_item(
                backend,
                out,
                children,
                ItemFlags::new(ListKind::Definition).beginning_of_list(true),
            ),
            Tag::FootnoteDefinition(label) => {
                let text = self.render_to_string(backend, children)?;
                backend.footnote_item(out, label, &text)
            }
            Tag::Table(alignments) => self.render_table(backend, out, alignments, children),
            Tag::TableHead | Tag::TableRow | Tag::TableCell => {
                self.render_nodes(backend, out, children).map(|_| ())
            }
            Tag::Emphasis => {
                if let Some(inner) = sole_child(children, |t| matches!(t, Tag::Strong)) {
                    let text = self.render_to_string(backend, inner)?;
                    return backend.triple_emphasis(out, &text);
                }
                let text = self.render_to_string(backend, children)?;
                backend.emphasis(out, &text)
            }
            Tag::Strong => {
                if let Some(inner) = sole_child(children, |t| matches!(t, Tag::Emphasis)) {
                    let text = self.render_to_string(backend, inner)?;
                    return backend.triple_emphasis(out, &text);
                }
                let text = self.render_to_string(backend, children)?;
                backend.double_emphasis(out, &text)
            }
            Tag::Strikethrough => {
                let text = self.render_to_string(backend, children)?;
                backend.strike_through(out, &text)
            }
            Tag::Superscript => Err(RenderError::unsupported(Construct::Superscript, B::NAME)),
            Tag::Subscript => Err(RenderError::unsupported(Construct::Subscript, B::NAME)),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => match link_type {
                LinkType::Autolink => backend.auto_link(out, dest_url, AutoLinkKind::Normal),
                LinkType::Email => backend.auto_link(out, dest_url, AutoLinkKind::Email),
                _ => {
                    let content = self.render_to_string(backend, children)?;
                    backend.link(out, dest_url, non_empty(title), &content)
                }
            },
            Tag::Image {
                dest_url, title, ..
            } => backend.image(out, dest_url, non_empty(title), &plain_text(children)),
            Tag::MetadataBlock(_) => backend.title_block(out, &plain_text(children)),
        }
    }

    /// Render the items of one list, flagging the first as its beginning.
    fn render_items<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        items: &[Node<'_>],
        list_kind: ListKind,
    ) -> Result<bool, RenderError> {
        let mark = out.mark();
        let mut first = true;

        for node in items {
            let kind = match node {
                Node::Element { tag: Tag::Item, .. } => list_kind,
                Node::Element {
                    tag: Tag::DefinitionListTitle,
                    ..
                } => ListKind::Term,
                Node::Element {
                    tag: Tag::DefinitionListDefinition,
                    ..
                } => ListKind::Definition,
                other => {
                    self.render_node(backend, out, other)?;
                    continue;
                }
            };
            let Node::Element { children, .. } = node else {
                continue;
            };

            let flags = ItemFlags::new(kind).beginning_of_list(first);
            self.render_item(backend, out, children, flags)?;
            first = false;
        }

        Ok(out.wrote_since(mark))
    }

    /// Render an item's children and hand them to the backend.
    ///
    /// Trailing newlines are stripped; a block following inline content is
    /// put on its own line.
    fn render_item<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        children: &[Node<'_>],
        flags: ItemFlags,
    ) -> Result<(), RenderError> {
        let contains_block = children.iter().any(Node::is_block);
        let mut scratch = OutputBuffer::new();

        for child in children {
            if child.is_block() && !scratch.is_empty() && !scratch.as_str().ends_with('\n') {
                scratch.push('\n');
            }
            self.render_node(backend, &mut scratch, child)?;
        }

        let text = scratch.as_str().trim_end_matches('\n');
        backend.list_item(out, text, flags.contains_block(contains_block))
    }

    fn render_table<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        alignments: &[Alignment],
        sections: &[Node<'_>],
    ) -> Result<(), RenderError> {
        let mut header = OutputBuffer::new();
        let mut body = OutputBuffer::new();

        for section in sections {
            let Node::Element { tag, children } = section else {
                continue;
            };
            match tag {
                Tag::TableHead => {
                    let row = self.render_cells(backend, children, alignments, true)?;
                    backend.table_row(&mut header, &row)?;
                }
                Tag::TableRow => {
                    let row = self.render_cells(backend, children, alignments, false)?;
                    backend.table_row(&mut body, &row)?;
                }
                _ => {}
            }
        }

        backend.table(out, header.as_str(), body.as_str(), alignments)
    }

    fn render_cells<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        cells: &[Node<'_>],
        alignments: &[Alignment],
        head: bool,
    ) -> Result<String, RenderError> {
        let mut row = OutputBuffer::new();
        for (column, cell) in cells.iter().enumerate() {
            let Node::Element { children, .. } = cell else {
                continue;
            };
            let text = self.render_to_string(backend, children)?;
            let align = alignments.get(column).copied().unwrap_or(Alignment::None);
            if head {
                backend.table_header_cell(&mut row, &text, align)?;
            } else {
                backend.table_cell(&mut row, &text, align)?;
            }
        }
        Ok(row.into_string())
    }

    fn render_footnote_items<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        out: &mut OutputBuffer,
        footnotes: &[(CowStr<'_>, Vec<Node<'_>>)],
    ) -> Result<bool, RenderError> {
        let mark = out.mark();
        for (label, children) in footnotes {
            let text = self.render_to_string(backend, children)?;
            backend.footnote_item(out, label, &text)?;
        }
        Ok(out.wrote_since(mark))
    }

    /// One-based footnote number in first-reference order.
    fn footnote_id(&mut self, label: &str) -> usize {
        if let Some(position) = self.footnote_refs.iter().position(|l| l == label) {
            return position + 1;
        }
        self.footnote_refs.push(label.to_owned());
        self.footnote_refs.len()
    }
}

/// Children of the only child of `children`, if that child matches `want`.
fn sole_child<'n, 'a>(
    children: &'n [Node<'a>],
    want: fn(&Tag<'_>) -> bool,
) -> Option<&'n [Node<'a>]> {
    match children {
        [Node::Element { tag, children }] if want(tag) => Some(children),
        _ => None,
    }
}

/// Concatenated text of a subtree, without markup.
fn plain_text(nodes: &[Node<'_>]) -> String {
    let mut text = String::new();
    collect_text(nodes, &mut text);
    text
}

fn collect_text(nodes: &[Node<'_>], text: &mut String) {
    for node in nodes {
        match node {
            Node::Leaf(Event::Text(s) | Event::Code(s) | Event::Html(s) | Event::InlineHtml(s)) => {
                text.push_str(s);
            }
            Node::Leaf(Event::SoftBreak | Event::HardBreak) => text.push('\n'),
            Node::Leaf(_) => {}
            Node::Entity(entity) => text.push_str(entity),
            Node::Element { children, .. } => collect_text(children, text),
        }
    }
}

fn non_empty<'s>(value: &'s CowStr<'_>) -> Option<&'s str> {
    Some(&**value).filter(|v| !v.is_empty())
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
