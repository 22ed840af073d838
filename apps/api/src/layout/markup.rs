//! Markup engine: turns a markdown fragment into a positioned visual tree.
//!
//! Parsing is CommonMark plus the GFM extensions the preview enables (tables,
//! strikethrough, task lists) with every soft break rendered as a hard break. The same
//! `MarkupOptions` value must drive both measurement and final rendering, otherwise
//! measured heights and rendered heights drift apart and page breaks land in the wrong place.
//!
//! Layout runs in two phases:
//! - `LayoutPass::Flow` stacks blocks and wraps text; tables get provisional single-line
//!   rows and images are not sized yet.
//! - `LayoutPass::Settle` resolves table column widths from their content and sizes images.
//!
//! Reading a height after only the flow pass under-measures any fragment that contains a
//! table or an image.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::layout::font_metrics::{get_metrics, FontFamily};

// ────────────────────────────────────────────────────────────────────────────
// Stylesheet
// ────────────────────────────────────────────────────────────────────────────

const BASE_SIZE: f32 = 16.0;
const BODY_LINE_HEIGHT: f32 = 1.5;
const HEADING_LINE_HEIGHT: f32 = 1.25;
const CODE_SIZE: f32 = 14.0;
const CODE_LINE_HEIGHT: f32 = 1.45;
const CODE_PADDING: f32 = 12.0;
const PARAGRAPH_GAP: f32 = 16.0;
const LIST_ITEM_GAP: f32 = 4.0;
const LIST_INDENT: f32 = 24.0;
const QUOTE_INDENT: f32 = 16.0;
const QUOTE_BAR_WIDTH: f32 = 3.0;
const RULE_GAP: f32 = 24.0;
const CELL_PADDING: f32 = 6.0;
const MIN_COLUMN_WIDTH: f32 = 40.0;
const IMAGE_PLACEHOLDER_SIZE: f32 = 150.0;

const TEXT_COLOR: [u8; 3] = [17, 24, 39];
const MUTED_COLOR: [u8; 3] = [107, 114, 128];

/// Heading font sizes for h1..h6, as multiples of the base size.
const HEADING_SCALE: [f32; 6] = [2.0, 1.5, 1.25, 1.0, 0.875, 0.85];

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

/// Syntax extensions enabled for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// Render every newline inside a paragraph as a line break.
    pub newline_breaks: bool,
}

impl MarkupOptions {
    /// The preview's syntax set: GFM extensions plus newline breaks.
    pub fn preview() -> Self {
        MarkupOptions {
            tables: true,
            strikethrough: true,
            task_lists: true,
            newline_breaks: true,
        }
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self::preview()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Visual tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub family: FontFamily,
    pub size: f32,
    pub line_height: f32,
    pub bold: bool,
    pub color: [u8; 3],
}

impl TextStyle {
    fn body() -> Self {
        TextStyle {
            family: FontFamily::Sans,
            size: BASE_SIZE,
            line_height: BASE_SIZE * BODY_LINE_HEIGHT,
            bold: false,
            color: TEXT_COLOR,
        }
    }

    fn heading(level: u8) -> Self {
        let index = usize::from(level.clamp(1, 6)) - 1;
        let size = BASE_SIZE * HEADING_SCALE[index];
        TextStyle {
            family: FontFamily::Sans,
            size,
            line_height: size * HEADING_LINE_HEIGHT,
            bold: true,
            color: TEXT_COLOR,
        }
    }

    fn code() -> Self {
        TextStyle {
            family: FontFamily::Mono,
            size: CODE_SIZE,
            line_height: CODE_SIZE * CODE_LINE_HEIGHT,
            bold: false,
            color: TEXT_COLOR,
        }
    }

    fn muted(self) -> Self {
        TextStyle {
            color: MUTED_COLOR,
            ..self
        }
    }

    fn bold(self) -> Self {
        TextStyle { bold: true, ..self }
    }

    /// Width of `text` in this style. Bold text runs about 5% wider.
    pub fn measure(&self, text: &str) -> f32 {
        let width = get_metrics(self.family).measure_px(text, self.size);
        if self.bold {
            width * 1.05
        } else {
            width
        }
    }

    fn wrap(&self, text: &str, max_width: f32) -> Vec<String> {
        let width = if self.bold { max_width / 1.05 } else { max_width };
        get_metrics(self.family).wrap(text, self.size, width)
    }
}

/// One printed line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecorationKind {
    Rule,
    CodeBackground,
    QuoteBar,
    TableBorder,
    ImagePlaceholder,
}

/// A non-text box painted behind or around text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The rendered form of a fragment: boxes positioned relative to the content origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualTree {
    pub width: f32,
    pub height: f32,
    pub lines: Vec<LineBox>,
    pub decorations: Vec<Decoration>,
}

// ────────────────────────────────────────────────────────────────────────────
// Block nodes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Heading { level: u8, text: String },
    /// Line breaks inside the paragraph are kept as `'\n'`.
    Paragraph { text: String },
    Code { text: String },
    ListItem { depth: usize, marker: String, text: String },
    /// First row is the header row.
    Table { rows: Vec<Vec<String>> },
    Rule,
    Image { alt: String },
}

/// A block node plus the number of block quotes enclosing it.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub node: Node,
    pub quote_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPass {
    Flow,
    Settle,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Parses and lays out markdown. Stateless apart from its options.
#[derive(Debug, Clone, Default)]
pub struct MarkupEngine {
    options: MarkupOptions,
}

impl MarkupEngine {
    pub fn new(options: MarkupOptions) -> Self {
        MarkupEngine { options }
    }

    /// Fully renders a fragment at `width`: parse, flow, settle.
    pub fn render(&self, fragment: &str, width: f32) -> VisualTree {
        self.layout(&self.parse(fragment), width, LayoutPass::Settle)
    }

    pub fn parse(&self, fragment: &str) -> Vec<BlockNode> {
        let parser = Parser::new_ext(fragment, self.options.parser_options());
        let mut builder = NodeBuilder::new(self.options.newline_breaks);
        for event in parser {
            builder.handle(event);
        }
        builder.finish()
    }

    pub fn layout(&self, nodes: &[BlockNode], width: f32, pass: LayoutPass) -> VisualTree {
        let mut flow = Flow::new(width.max(0.0));
        for block in nodes {
            flow.place(block, pass);
        }
        flow.finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Event → node builder
// ────────────────────────────────────────────────────────────────────────────

struct NodeBuilder {
    newline_breaks: bool,
    nodes: Vec<BlockNode>,
    text: String,
    quote_depth: usize,
    heading: Option<u8>,
    in_code: bool,
    /// One entry per open list: the next ordinal for ordered lists.
    lists: Vec<Option<u64>>,
    /// Marker of the innermost list item whose first line has not been emitted yet.
    item_marker: Option<String>,
    table: Option<Vec<Vec<String>>>,
    row: Vec<String>,
    cell: Option<String>,
    image_alt: Option<String>,
}

impl NodeBuilder {
    fn new(newline_breaks: bool) -> Self {
        NodeBuilder {
            newline_breaks,
            nodes: Vec::new(),
            text: String::new(),
            quote_depth: 0,
            heading: None,
            in_code: false,
            lists: Vec::new(),
            item_marker: None,
            table: None,
            row: Vec::new(),
            cell: None,
            image_alt: None,
        }
    }

    fn sink(&mut self) -> &mut String {
        if let Some(alt) = self.image_alt.as_mut() {
            alt
        } else if let Some(cell) = self.cell.as_mut() {
            cell
        } else {
            &mut self.text
        }
    }

    fn emit(&mut self, node: Node) {
        self.nodes.push(BlockNode {
            node,
            quote_depth: self.quote_depth,
        });
    }

    /// Emits buffered inline text as a paragraph or as the current list item's line.
    fn flush_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        let text = text.trim_matches(|c: char| c == ' ' || c == '\n').to_string();
        if self.lists.is_empty() {
            if !text.is_empty() {
                self.emit(Node::Paragraph { text });
            }
            return;
        }
        if text.is_empty() && self.item_marker.is_none() {
            return;
        }
        let marker = self.item_marker.take().unwrap_or_default();
        let depth = self.lists.len();
        self.emit(Node::ListItem { depth, marker, text });
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.sink().push_str(&text),
            Event::Code(code) => self.sink().push_str(&code),
            Event::SoftBreak => {
                let brk = if self.newline_breaks { '\n' } else { ' ' };
                self.sink().push(brk);
            }
            Event::HardBreak => self.sink().push('\n'),
            Event::Rule => {
                self.flush_text();
                self.emit(Node::Rule);
            }
            Event::TaskListMarker(checked) => {
                self.item_marker = Some(if checked { "☑" } else { "☐" }.to_string());
            }
            Event::FootnoteReference(label) => {
                let reference = format!("[{label}]");
                self.sink().push_str(&reference);
            }
            // Raw HTML is not rendered.
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_text();
                self.heading = Some(heading_level(level));
            }
            Tag::BlockQuote { .. } => {
                self.flush_text();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush_text();
                self.in_code = true;
            }
            Tag::List(start) => {
                // A nested list ends the parent item's first line.
                self.flush_text();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_text();
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}.");
                        *next += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                self.item_marker = Some(marker);
            }
            Tag::Table(_) => {
                self.flush_text();
                self.table = Some(Vec::new());
            }
            Tag::TableHead | Tag::TableRow => self.row.clear(),
            Tag::TableCell => self.cell = Some(String::new()),
            Tag::Image { .. } => self.image_alt = Some(String::new()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush_text(),
            TagEnd::Heading(_) => {
                let text = std::mem::take(&mut self.text).trim().to_string();
                let level = self.heading.take().unwrap_or(1);
                self.emit(Node::Heading { level, text });
            }
            TagEnd::BlockQuote { .. } => {
                self.flush_text();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                let text = std::mem::take(&mut self.text);
                let text = text.strip_suffix('\n').unwrap_or(&text).to_string();
                self.in_code = false;
                self.emit(Node::Code { text });
            }
            TagEnd::List(_) => {
                self.flush_text();
                self.lists.pop();
                self.item_marker = None;
            }
            TagEnd::Item => self.flush_text(),
            TagEnd::TableCell => {
                if let Some(cell) = self.cell.take() {
                    self.row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let row = std::mem::take(&mut self.row);
                if let Some(table) = self.table.as_mut() {
                    table.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(rows) = self.table.take() {
                    self.emit(Node::Table { rows });
                }
            }
            TagEnd::Image => {
                let alt = self.image_alt.take().unwrap_or_default();
                // An image inside a table cell stays inline as its alt text.
                if let Some(cell) = self.cell.as_mut() {
                    cell.push_str(&alt);
                } else {
                    self.flush_text();
                    self.emit(Node::Image { alt });
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<BlockNode> {
        if self.in_code {
            let text = std::mem::take(&mut self.text);
            self.emit(Node::Code { text });
        }
        self.flush_text();
        self.nodes
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block flow
// ────────────────────────────────────────────────────────────────────────────

struct Flow {
    tree: VisualTree,
    y: f32,
    /// Bottom margin of the previous block; collapses with the next top margin.
    pending_gap: Option<f32>,
}

impl Flow {
    fn new(width: f32) -> Self {
        Flow {
            tree: VisualTree {
                width,
                ..VisualTree::default()
            },
            y: 0.0,
            pending_gap: None,
        }
    }

    fn open_block(&mut self, before: f32, after: f32) -> f32 {
        if let Some(gap) = self.pending_gap {
            self.y += gap.max(before);
        }
        self.pending_gap = Some(after);
        self.y
    }

    fn push_lines(&mut self, text: &str, style: TextStyle, x: f32, max_width: f32) {
        for segment in text.split('\n') {
            let mut lines = style.wrap(segment, max_width);
            if lines.is_empty() {
                lines.push(String::new());
            }
            for line in lines {
                self.tree.lines.push(LineBox {
                    x,
                    y: self.y,
                    width: style.measure(&line),
                    height: style.line_height,
                    text: line,
                    style,
                });
                self.y += style.line_height;
            }
        }
    }

    fn decorate(&mut self, kind: DecorationKind, x: f32, y: f32, width: f32, height: f32) {
        self.tree.decorations.push(Decoration {
            kind,
            x,
            y,
            width,
            height,
        });
    }

    fn place(&mut self, block: &BlockNode, pass: LayoutPass) {
        let quote_indent = QUOTE_INDENT * block.quote_depth as f32;
        let x0 = quote_indent;
        let width = (self.tree.width - quote_indent).max(0.0);
        let base = if block.quote_depth > 0 {
            TextStyle::body().muted()
        } else {
            TextStyle::body()
        };

        let start_y = match &block.node {
            Node::Heading { level, text } => {
                let style = TextStyle::heading(*level);
                let top = self.open_block(style.size * 0.75, style.size * 0.5);
                self.push_lines(text, style, x0, width);
                top
            }
            Node::Paragraph { text } => {
                let top = self.open_block(PARAGRAPH_GAP, PARAGRAPH_GAP);
                self.push_lines(text, base, x0, width);
                top
            }
            Node::Code { text } => {
                let style = TextStyle::code();
                let top = self.open_block(PARAGRAPH_GAP, PARAGRAPH_GAP);
                self.y += CODE_PADDING;
                // Preformatted: one line box per source line, never wrapped.
                for line in text.split('\n') {
                    self.tree.lines.push(LineBox {
                        x: x0 + CODE_PADDING,
                        y: self.y,
                        width: style.measure(line),
                        height: style.line_height,
                        text: line.to_string(),
                        style,
                    });
                    self.y += style.line_height;
                }
                self.y += CODE_PADDING;
                self.decorate(DecorationKind::CodeBackground, x0, top, width, self.y - top);
                top
            }
            Node::ListItem { depth, marker, text } => {
                let indent = LIST_INDENT * *depth as f32;
                let top = self.open_block(LIST_ITEM_GAP, LIST_ITEM_GAP);
                if !marker.is_empty() {
                    self.tree.lines.push(LineBox {
                        x: (x0 + indent - base.measure(marker) - 6.0).max(x0),
                        y: top,
                        width: base.measure(marker),
                        height: base.line_height,
                        text: marker.clone(),
                        style: base,
                    });
                }
                self.push_lines(text, base, x0 + indent, (width - indent).max(0.0));
                top
            }
            Node::Table { rows } => {
                let top = self.open_block(PARAGRAPH_GAP, PARAGRAPH_GAP);
                self.place_table(rows, base, x0, width, pass);
                top
            }
            Node::Rule => {
                let top = self.open_block(RULE_GAP, RULE_GAP);
                self.decorate(DecorationKind::Rule, x0, top, width, 1.0);
                self.y += 1.0;
                top
            }
            Node::Image { alt } => {
                let top = self.open_block(PARAGRAPH_GAP, PARAGRAPH_GAP);
                // Unsized until the settle pass.
                if pass == LayoutPass::Settle {
                    let size = IMAGE_PLACEHOLDER_SIZE.min(width);
                    self.decorate(DecorationKind::ImagePlaceholder, x0, top, size, size);
                    if !alt.is_empty() {
                        let style = base.muted();
                        let label = style.wrap(alt, (size - 8.0).max(0.0)).into_iter().next();
                        if let Some(label) = label {
                            self.tree.lines.push(LineBox {
                                x: x0 + 4.0,
                                y: top + 4.0,
                                width: style.measure(&label),
                                height: style.line_height,
                                text: label,
                                style,
                            });
                        }
                    }
                    self.y += size;
                }
                top
            }
        };

        if block.quote_depth > 0 {
            self.decorate(
                DecorationKind::QuoteBar,
                quote_indent - QUOTE_INDENT + 2.0,
                start_y,
                QUOTE_BAR_WIDTH,
                self.y - start_y,
            );
        }
    }

    fn place_table(
        &mut self,
        rows: &[Vec<String>],
        base: TextStyle,
        x0: f32,
        width: f32,
        pass: LayoutPass,
    ) {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let column_widths = match pass {
            LayoutPass::Flow => vec![width / columns as f32; columns],
            LayoutPass::Settle => settle_columns(rows, columns, base, width),
        };

        for (r, row) in rows.iter().enumerate() {
            let style = if r == 0 { base.bold() } else { base };
            let row_top = self.y;
            let mut cell_lines: Vec<Vec<String>> = Vec::with_capacity(columns);
            for c in 0..columns {
                let text = row.get(c).map(String::as_str).unwrap_or("");
                let lines = match pass {
                    // Provisional: one unwrapped line per cell.
                    LayoutPass::Flow => vec![text.to_string()],
                    LayoutPass::Settle => {
                        let mut lines =
                            style.wrap(text, (column_widths[c] - 2.0 * CELL_PADDING).max(0.0));
                        if lines.is_empty() {
                            lines.push(String::new());
                        }
                        lines
                    }
                };
                cell_lines.push(lines);
            }
            let line_count = cell_lines.iter().map(Vec::len).max().unwrap_or(1);
            let row_height = line_count as f32 * style.line_height + 2.0 * CELL_PADDING;

            let mut x = x0;
            for (c, lines) in cell_lines.into_iter().enumerate() {
                for (i, line) in lines.into_iter().enumerate() {
                    self.tree.lines.push(LineBox {
                        x: x + CELL_PADDING,
                        y: row_top + CELL_PADDING + i as f32 * style.line_height,
                        width: style.measure(&line),
                        height: style.line_height,
                        text: line,
                        style,
                    });
                }
                self.decorate(DecorationKind::TableBorder, x, row_top, column_widths[c], row_height);
                x += column_widths[c];
            }
            self.y = row_top + row_height;
        }
    }

    fn finish(self) -> VisualTree {
        VisualTree {
            height: self.y,
            ..self.tree
        }
    }
}

/// Column widths proportional to each column's widest unwrapped cell, shrunk to fit
/// `width` when the natural widths are too wide.
fn settle_columns(rows: &[Vec<String>], columns: usize, base: TextStyle, width: f32) -> Vec<f32> {
    let mut natural = vec![MIN_COLUMN_WIDTH; columns];
    for (r, row) in rows.iter().enumerate() {
        let style = if r == 0 { base.bold() } else { base };
        for (c, cell) in row.iter().enumerate() {
            let w = style.measure(cell) + 2.0 * CELL_PADDING;
            natural[c] = natural[c].max(w);
        }
    }
    let total: f32 = natural.iter().sum();
    if total <= width || total <= 0.0 {
        natural
    } else {
        natural.iter().map(|w| w / total * width).collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> MarkupEngine {
        MarkupEngine::new(MarkupOptions::preview())
    }

    fn kinds(nodes: &[BlockNode]) -> Vec<&Node> {
        nodes.iter().map(|n| &n.node).collect()
    }

    #[test]
    fn test_parse_heading_and_paragraph() {
        let nodes = engine().parse("# Title\n\nHello *world*");
        assert_eq!(
            kinds(&nodes),
            vec![
                &Node::Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                &Node::Paragraph {
                    text: "Hello world".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_soft_breaks_become_line_breaks() {
        let nodes = engine().parse("one\ntwo");
        assert_eq!(
            kinds(&nodes),
            vec![&Node::Paragraph {
                text: "one\ntwo".to_string()
            }]
        );

        let plain = MarkupEngine::new(MarkupOptions {
            newline_breaks: false,
            ..MarkupOptions::preview()
        });
        assert_eq!(
            kinds(&plain.parse("one\ntwo")),
            vec![&Node::Paragraph {
                text: "one two".to_string()
            }]
        );
    }

    #[test]
    fn test_trailing_double_space_is_hard_break() {
        let plain = MarkupEngine::new(MarkupOptions {
            newline_breaks: false,
            ..MarkupOptions::preview()
        });
        assert_eq!(
            kinds(&plain.parse("one  \ntwo")),
            vec![&Node::Paragraph {
                text: "one\ntwo".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_lists_and_task_markers() {
        let nodes = engine().parse("1. first\n2. second\n\n- [x] done\n- [ ] todo\n  - nested");
        let items: Vec<(usize, String, String)> = nodes
            .iter()
            .filter_map(|n| match &n.node {
                Node::ListItem { depth, marker, text } => {
                    Some((*depth, marker.clone(), text.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            items,
            vec![
                (1, "1.".to_string(), "first".to_string()),
                (1, "2.".to_string(), "second".to_string()),
                (1, "☑".to_string(), "done".to_string()),
                (1, "☐".to_string(), "todo".to_string()),
                (2, "•".to_string(), "nested".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_table_rows() {
        let nodes = engine().parse("| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |");
        assert_eq!(
            kinds(&nodes),
            vec![&Node::Table {
                rows: vec![
                    vec!["a".to_string(), "b".to_string()],
                    vec!["1".to_string(), "2".to_string()],
                    vec!["3".to_string(), "4".to_string()],
                ]
            }]
        );
    }

    #[test]
    fn test_tables_disabled_parse_as_text() {
        let no_tables = MarkupEngine::new(MarkupOptions {
            tables: false,
            ..MarkupOptions::preview()
        });
        let nodes = no_tables.parse("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(nodes
            .iter()
            .all(|n| !matches!(n.node, Node::Table { .. })));
    }

    #[test]
    fn test_parse_quote_code_rule_image() {
        let nodes = engine().parse("> quoted\n\n```js\nlet a;\n```\n\n---\n\n![alt text](x.png)");
        assert_eq!(nodes[0].quote_depth, 1);
        assert_eq!(
            kinds(&nodes)[1..],
            [
                &Node::Code {
                    text: "let a;".to_string()
                },
                &Node::Rule,
                &Node::Image {
                    alt: "alt text".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unterminated_code_fence_still_renders() {
        let nodes = engine().parse("```\nfn main() {}\n");
        assert!(matches!(nodes[0].node, Node::Code { .. }));
    }

    #[test]
    fn test_empty_fragment_has_zero_height() {
        let tree = engine().render("", 700.0);
        assert_eq!(tree.height, 0.0);
        assert!(tree.lines.is_empty());
    }

    #[test]
    fn test_height_grows_with_blocks() {
        let one = engine().render("para one", 700.0).height;
        let two = engine().render("para one\n\npara two", 700.0).height;
        assert_eq!(one, 24.0);
        // second line + collapsed paragraph gap
        assert_eq!(two, 24.0 + 16.0 + 24.0);
    }

    #[test]
    fn test_narrow_width_wraps_into_more_lines() {
        let text = "lorem ipsum dolor sit amet ".repeat(10);
        let wide = engine().render(&text, 700.0).height;
        let narrow = engine().render(&text, 200.0).height;
        assert!(narrow > wide);
    }

    #[test]
    fn test_flow_pass_under_measures_images_and_tables() {
        let engine = engine();
        let nodes = engine.parse(
            "![img](a.png)\n\n| h | h |\n|---|---|\n| a long cell that surely wraps when narrow | b |",
        );
        let flow = engine.layout(&nodes, 240.0, LayoutPass::Flow).height;
        let settled = engine.layout(&nodes, 240.0, LayoutPass::Settle).height;
        assert!(settled > flow, "settle {settled} should exceed flow {flow}");
    }

    #[test]
    fn test_settled_table_columns_fit_width() {
        let tree = engine().render(
            "| one | two |\n|---|---|\n| some fairly long text here | and more long text here |",
            200.0,
        );
        let right_edge = tree
            .decorations
            .iter()
            .filter(|d| d.kind == DecorationKind::TableBorder)
            .map(|d| d.x + d.width)
            .fold(0.0_f32, f32::max);
        assert!(right_edge <= 200.0 + 1e-3);
    }

    #[test]
    fn test_code_background_spans_code_lines() {
        let tree = engine().render("```\na\nb\nc\n```", 500.0);
        let bg = tree
            .decorations
            .iter()
            .find(|d| d.kind == DecorationKind::CodeBackground)
            .expect("code background");
        assert_eq!(tree.lines.len(), 3);
        assert!((bg.height - (3.0 * CODE_SIZE * CODE_LINE_HEIGHT + 2.0 * CODE_PADDING)).abs() < 1e-3);
    }
}
