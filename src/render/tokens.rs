//! Markdown token tree for the rich renderer, built from pulldown-cmark
//! events.
//!
//! Inline content is flattened into styled [`Span`]s. Links keep their
//! visible text and gain a trailing ` (url)` span. A paragraph holding
//! nothing but one image becomes [`Block::Image`]; images elsewhere
//! contribute their alt text. Lists keep one level of nesting: items of
//! deeper lists are flattened into the nested level.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// A run of inline text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

pub type Inline = Vec<Span>;

/// Concatenated text of a span sequence, styles dropped.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub start: u64,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: Inline,
    /// The item's nested list; its own items never carry a sublist.
    pub sublist: Option<List>,
}

/// One top-level Markdown block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: Inline },
    Paragraph(Inline),
    List(List),
    Code(String),
    /// Quoted content, one entry per quoted paragraph.
    Blockquote(Vec<Inline>),
    Rule,
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Image { src: String, alt: String },
}

/// Parse Markdown (GFM tables and strikethrough enabled) into blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut events = Parser::new_ext(markdown, options);
    let mut blocks = Vec::new();
    while let Some(event) = events.next() {
        if let Some(block) = block_from(event, &mut events) {
            blocks.push(block);
        }
    }
    blocks
}

fn block_from<'a>(event: Event<'a>, events: &mut impl Iterator<Item = Event<'a>>) -> Option<Block> {
    match event {
        Event::Start(Tag::Heading { level, .. }) => {
            let text = collect_inline(events, |end| matches!(end, TagEnd::Heading { .. }));
            Some(Block::Heading {
                level: level as u8,
                text: text.into_spans(),
            })
        }
        Event::Start(Tag::Paragraph) => {
            let content = collect_inline(events, |end| matches!(end, TagEnd::Paragraph));
            Some(content.into_paragraph())
        }
        Event::Start(Tag::List(start)) => Some(Block::List(collect_list(start, events, 0))),
        Event::Start(Tag::CodeBlock(_)) => Some(Block::Code(collect_code(events))),
        Event::Start(Tag::BlockQuote { .. }) => Some(Block::Blockquote(collect_quote(events))),
        Event::Start(Tag::Table(_)) => Some(collect_table(events)),
        Event::Rule => Some(Block::Rule),
        Event::Start(_) => {
            skip_container(events);
            None
        }
        _ => None,
    }
}

/// Piece of inline content: styled text, or an image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InlineItem {
    Text(Span),
    Image { src: String, alt: String },
}

#[derive(Debug, Default)]
struct InlineCollector {
    items: Vec<InlineItem>,
    bold: u32,
    italic: u32,
    links: Vec<String>,
    /// Open image: its source and the alt text gathered so far.
    image: Option<(String, String)>,
}

impl InlineCollector {
    fn feed(&mut self, event: Event<'_>) {
        match event {
            Event::Text(text) => self.push_text(&text, false),
            Event::Code(text) => self.push_text(&text, true),
            Event::SoftBreak | Event::HardBreak => self.push_text(" ", false),
            Event::TaskListMarker(done) => self.push_text(if done { "[x] " } else { "[ ] " }, false),
            Event::Start(Tag::Strong) => self.bold += 1,
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => self.italic += 1,
            Event::End(TagEnd::Emphasis) => self.italic = self.italic.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. }) => self.links.push(dest_url.to_string()),
            Event::End(TagEnd::Link) => {
                if let Some(url) = self.links.pop() {
                    self.items.push(InlineItem::Text(Span::plain(format!(" ({url})"))));
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((src, alt)) = self.image.take() {
                    self.items.push(InlineItem::Image { src, alt });
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str, code: bool) {
        if let Some((_, alt)) = &mut self.image {
            alt.push_str(text);
            return;
        }
        let span = Span {
            text: text.to_string(),
            bold: self.bold > 0,
            italic: self.italic > 0,
            code,
        };
        // Merge with the previous span when the style is unchanged.
        if let Some(InlineItem::Text(last)) = self.items.last_mut() {
            if (last.bold, last.italic, last.code) == (span.bold, span.italic, span.code) {
                last.text.push_str(&span.text);
                return;
            }
        }
        self.items.push(InlineItem::Text(span));
    }

    fn into_spans(self) -> Inline {
        self.items
            .into_iter()
            .map(|item| match item {
                InlineItem::Text(span) => span,
                InlineItem::Image { alt, .. } => Span::plain(alt),
            })
            .collect()
    }

    fn into_paragraph(self) -> Block {
        let mut visible = self.items.iter().filter(|item| match item {
            InlineItem::Text(span) => !span.text.trim().is_empty(),
            InlineItem::Image { .. } => true,
        });
        if let (Some(InlineItem::Image { src, alt }), None) = (visible.next(), visible.next()) {
            return Block::Image {
                src: src.clone(),
                alt: alt.clone(),
            };
        }
        Block::Paragraph(self.into_spans())
    }
}

fn collect_inline<'a>(
    events: &mut impl Iterator<Item = Event<'a>>,
    is_end: impl Fn(&TagEnd) -> bool,
) -> InlineCollector {
    let mut collector = InlineCollector::default();
    for event in events.by_ref() {
        if let Event::End(end) = &event {
            if is_end(end) {
                break;
            }
        }
        collector.feed(event);
    }
    collector
}

fn collect_list<'a>(
    start: Option<u64>,
    events: &mut impl Iterator<Item = Event<'a>>,
    depth: usize,
) -> List {
    let mut items = Vec::new();
    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::Item) => items.extend(collect_item(events, depth)),
            Event::End(TagEnd::List(_)) => break,
            _ => {}
        }
    }
    List {
        ordered: start.is_some(),
        start: start.unwrap_or(1),
        items,
    }
}

/// One list item, followed by any items flattened out of lists nested
/// deeper than the supported level.
fn collect_item<'a>(events: &mut impl Iterator<Item = Event<'a>>, depth: usize) -> Vec<ListItem> {
    let mut collector = InlineCollector::default();
    let mut sublist: Option<List> = None;
    let mut flattened = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::End(TagEnd::Item) => break,
            Event::Start(Tag::List(start)) => {
                let nested = collect_list(start, events, depth + 1);
                if depth == 0 {
                    match &mut sublist {
                        Some(existing) => existing.items.extend(nested.items),
                        None => sublist = Some(nested),
                    }
                } else {
                    flattened.extend(nested.items);
                }
            }
            Event::End(TagEnd::Paragraph) => collector.push_text(" ", false),
            Event::Start(Tag::Paragraph) => {}
            other => collector.feed(other),
        }
    }

    let mut text = collector.into_spans();
    trim_spans(&mut text);
    let mut out = vec![ListItem { text, sublist }];
    out.extend(flattened);
    out
}

fn collect_code<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> String {
    let mut code = String::new();
    for event in events.by_ref() {
        match event {
            Event::Text(text) => code.push_str(&text),
            Event::End(TagEnd::CodeBlock) => break,
            _ => {}
        }
    }
    if code.ends_with('\n') {
        code.pop();
    }
    code
}

/// Flatten a blockquote into paragraphs of inline text. Nested quotes,
/// lists and code inside the quote contribute their text.
fn collect_quote<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> Vec<Inline> {
    let mut paragraphs = Vec::new();
    let mut collector = InlineCollector::default();
    let mut depth = 0usize;

    for event in events.by_ref() {
        match event {
            Event::Start(Tag::BlockQuote { .. }) => depth += 1,
            Event::End(TagEnd::BlockQuote { .. }) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading { .. } | TagEnd::Item | TagEnd::CodeBlock,
            ) => {
                let mut spans = std::mem::take(&mut collector).into_spans();
                trim_spans(&mut spans);
                if !spans.is_empty() {
                    paragraphs.push(spans);
                }
            }
            other => collector.feed(other),
        }
    }

    let mut rest = collector.into_spans();
    trim_spans(&mut rest);
    if !rest.is_empty() {
        paragraphs.push(rest);
    }
    paragraphs
}

fn collect_table<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> Block {
    let mut header = Vec::new();
    let mut rows = Vec::new();
    let mut row = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::TableCell) => {
                let cell = collect_inline(events, |end| matches!(end, TagEnd::TableCell));
                row.push(plain_text(&cell.into_spans()).trim().to_string());
            }
            Event::End(TagEnd::TableHead) => header = std::mem::take(&mut row),
            Event::End(TagEnd::TableRow) => rows.push(std::mem::take(&mut row)),
            Event::End(TagEnd::Table) => break,
            _ => {}
        }
    }
    Block::Table { header, rows }
}

/// Consume events up to the end of a container we do not render.
fn skip_container<'a>(events: &mut impl Iterator<Item = Event<'a>>) {
    let mut depth = 0usize;
    for event in events.by_ref() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            _ => {}
        }
    }
}

/// Trim leading whitespace of the first span and trailing whitespace of
/// the last, dropping spans that end up empty.
fn trim_spans(spans: &mut Inline) {
    if let Some(first) = spans.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = spans.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    spans.retain(|s| !s.text.is_empty());
}
