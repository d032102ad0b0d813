//! Markdown → [`Block`] conversion.
//!
//! Walks `pulldown_cmark` events and builds the small block/inline model the
//! renderer understands. Fenced code blocks tagged `choice` become
//! [`Block::Choice`] prompts, one option per non-empty line.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{Block, Inline, ListItem};

/// Info string that turns a fenced code block into a choice prompt.
pub const CHOICE_FENCE: &str = "choice";

/// Parse markdown content into blocks.
pub fn parse(content: &str) -> Vec<Block> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut b = Builder::default();
    for event in Parser::new_ext(content, opts) {
        b.handle(event);
    }
    b.blocks
}

enum FrameKind {
    Root,
    Strong,
    Emphasis,
    Strikethrough,
    Link(String),
}

/// An inline container being filled.
struct Frame {
    kind: FrameKind,
    children: Vec<Inline>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

struct ListFrame {
    ordered: bool,
    items: Vec<ListItem>,
    current: Vec<ListItem>,
}

struct CodeFrame {
    language: Option<String>,
    text: String,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    frames: Vec<Frame>,
    lists: Vec<ListFrame>,
    code: Option<CodeFrame>,
    quote_depth: usize,
}

impl Builder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => self.push_inline(Inline::Code(c.to_string())),
            Event::SoftBreak => self.push_inline(Inline::Text(" ".into())),
            Event::HardBreak => self.push_inline(Inline::Text("\n".into())),
            Event::Rule => self.blocks.push(Block::HorizontalRule),
            _ => {} // HTML, footnotes, math
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.in_container() {
                    // Loose list items and multi-paragraph quotes share one inline run.
                    if self.frames.last().is_some_and(|f| !f.children.is_empty()) {
                        self.push_inline(Inline::Text("\n".into()));
                    }
                } else {
                    self.frames.push(Frame::new(FrameKind::Root));
                }
            }
            Tag::Heading { .. } => self.frames.push(Frame::new(FrameKind::Root)),
            Tag::BlockQuote(_) => {
                self.quote_depth += 1;
                if self.quote_depth == 1 {
                    self.frames.push(Frame::new(FrameKind::Root));
                }
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string)
                        .filter(|l| !l.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeFrame {
                    language,
                    text: String::new(),
                });
            }
            Tag::List(start) => self.lists.push(ListFrame {
                ordered: start.is_some(),
                items: Vec::new(),
                current: Vec::new(),
            }),
            Tag::Item => {
                if let Some(list) = self.lists.last_mut() {
                    list.current.push(ListItem::default());
                }
                self.frames.push(Frame::new(FrameKind::Root));
            }
            Tag::Emphasis => self.frames.push(Frame::new(FrameKind::Emphasis)),
            Tag::Strong => self.frames.push(Frame::new(FrameKind::Strong)),
            Tag::Strikethrough => self.frames.push(Frame::new(FrameKind::Strikethrough)),
            Tag::Link { dest_url, .. } => {
                self.frames
                    .push(Frame::new(FrameKind::Link(dest_url.to_string())));
            }
            _ => {} // Tables, images, definitions
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.in_container() {
                    let inlines = self.pop_root();
                    self.blocks.push(Block::Paragraph { inlines });
                }
            }
            TagEnd::Heading(level) => {
                let inlines = self.pop_root();
                self.blocks.push(Block::Heading {
                    level: heading_depth(level),
                    inlines,
                });
            }
            TagEnd::BlockQuote(_) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    let inlines = self.pop_root();
                    self.blocks.push(Block::BlockQuote { inlines });
                }
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.blocks.push(code_block(code));
                }
            }
            TagEnd::Item => {
                let inlines = self.pop_root();
                if let Some(list) = self.lists.last_mut() {
                    if let Some(mut item) = list.current.pop() {
                        item.inlines = inlines;
                        list.items.push(item);
                    }
                }
            }
            TagEnd::List(_) => {
                let Some(done) = self.lists.pop() else { return };
                let parent = self
                    .lists
                    .last_mut()
                    .and_then(|parent| parent.current.last_mut());
                match parent {
                    Some(item) => item.children.extend(done.items),
                    None => self.blocks.push(Block::List {
                        ordered: done.ordered,
                        items: done.items,
                    }),
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                if let Some(frame) = self.frames.pop() {
                    let inline = match frame.kind {
                        FrameKind::Strong => Inline::Bold(frame.children),
                        FrameKind::Emphasis => Inline::Italic(frame.children),
                        FrameKind::Strikethrough => Inline::Strikethrough(frame.children),
                        FrameKind::Link(url) => Inline::Link {
                            text: frame.children,
                            url,
                        },
                        FrameKind::Root => {
                            // Unbalanced event stream; put the frame back untouched.
                            self.frames.push(Frame {
                                kind: FrameKind::Root,
                                children: frame.children,
                            });
                            return;
                        }
                    };
                    self.push_inline(inline);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, t: CowStr<'_>) {
        if let Some(code) = self.code.as_mut() {
            code.text.push_str(&t);
        } else {
            self.push_inline(Inline::Text(t.to_string()));
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if let (Some(Inline::Text(prev)), Inline::Text(next)) = (frame.children.last_mut(), &inline)
        {
            prev.push_str(next);
            return;
        }
        frame.children.push(inline);
    }

    fn pop_root(&mut self) -> Vec<Inline> {
        self.frames.pop().map(|f| f.children).unwrap_or_default()
    }

    /// Inside a list item or block quote, paragraphs don't form blocks of their own.
    fn in_container(&self) -> bool {
        self.quote_depth > 0 || self.lists.last().is_some_and(|l| !l.current.is_empty())
    }
}

fn code_block(code: CodeFrame) -> Block {
    if code.language.as_deref() == Some(CHOICE_FENCE) {
        let options = code
            .text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        return Block::Choice { options };
    }
    Block::CodeBlock {
        language: code.language,
        code: code.text.trim_end_matches('\n').to_string(),
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
