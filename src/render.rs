//! Chapter markup to styled terminal lines.
//!
//! The renderer is a depth-first walk over the parsed tree. Inherited state
//! (heading level, quote/code flags, list depth) travels in a [`StyleContext`]
//! that is copied on descent, so sibling subtrees never observe each other's
//! flags. Output accumulates as ratatui lines; the completed-line count doubles
//! as the cursor for h2/h3 anchor capture, so anchors always index the line the
//! heading's own text lands on.
//!
//! Rendering is total: markup that cannot be parsed, or that parses to nothing
//! visible, degrades to plain-text extraction with no anchors.

use crate::markup::{self, Node, Tag};
use crate::theme::Theme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::mem;

/// Styled text plus the landmark offsets extracted while producing it.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct RenderedChapter {
    /// Display lines, ready for a scrolled paragraph widget.
    pub lines: Vec<Line<'static>>,
    /// Strictly increasing offsets into `lines`, one per h2/h3 heading.
    pub heading_anchors: Vec<usize>,
}

impl RenderedChapter {
    #[must_use]
    /// Number of display lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn is_blank(&self) -> bool {
        self.lines.iter().all(line_is_blank)
    }
}

/// Inherited rendering state, copied on descent into each element.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct StyleContext {
    /// 0 outside headings, 1-6 inside `h1`..`h6`.
    pub heading_level: u8,
    /// Inside a `blockquote`.
    pub in_blockquote: bool,
    /// Inside a `pre` block (whitespace preserved).
    pub in_pre: bool,
    /// Inside `code` or `pre`.
    pub in_code: bool,
    /// Inside `em`/`i`.
    pub in_emphasis: bool,
    /// Inside `strong`/`b`.
    pub in_strong: bool,
    /// Nesting depth of `ul`/`ol` lists.
    pub list_depth: usize,
    /// Inside an `li` (suppresses paragraph spacing).
    pub in_list_item: bool,
}

/// Renders chapter markup at the given column width.
///
/// Deterministic: the same (markup, theme, width) triple always produces the
/// same lines and anchors. A width of 0 is treated as unknown and defaults
/// to 80 columns.
#[must_use]
pub fn render(chapter_markup: &str, theme: &Theme, width: u16) -> RenderedChapter {
    let width = effective_width(width);

    match markup::parse(chapter_markup) {
        Ok(doc) => {
            let mut renderer = Renderer::new(theme, width);
            renderer.node(&doc, StyleContext::default());
            let rendered = renderer.finish();
            if rendered.is_blank() {
                render_fallback(chapter_markup, theme)
            } else {
                rendered
            }
        }
        Err(_) => render_fallback(chapter_markup, theme),
    }
}

/// Renders a plain-text chapter: word-wrapped body text, no markup, no
/// anchors.
#[must_use]
pub fn render_plain(text: &str, theme: &Theme, width: u16) -> RenderedChapter {
    let width = effective_width(width);
    let style = Style::default().fg(theme.text());

    let lines = wrap_text(text, width)
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                Line::default()
            } else {
                Line::from(Span::styled(line.to_string(), style))
            }
        })
        .collect();

    RenderedChapter {
        lines,
        heading_anchors: Vec::new(),
    }
}

/// Plain-text degradation for unparsable or visually empty markup.
fn render_fallback(chapter_markup: &str, theme: &Theme) -> RenderedChapter {
    let text = markup::strip_markup(chapter_markup);
    let style = Style::default().fg(theme.text());

    let lines = text
        .lines()
        .map(|line| {
            if line.is_empty() {
                Line::default()
            } else {
                Line::from(Span::styled(line.to_string(), style))
            }
        })
        .collect();

    RenderedChapter {
        lines,
        heading_anchors: Vec::new(),
    }
}

struct Renderer<'a> {
    theme: &'a Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    anchors: Vec<usize>,
}

impl<'a> Renderer<'a> {
    fn new(theme: &'a Theme, width: usize) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            current: Vec::new(),
            anchors: Vec::new(),
        }
    }

    /// Completes the current line. `self.lines.len()` is therefore always the
    /// offset the next emitted text will start on.
    fn newline(&mut self) {
        let spans = mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn paragraph_break(&mut self) {
        self.newline();
        self.newline();
    }

    fn node(&mut self, node: &Node, ctx: StyleContext) {
        match node {
            Node::Document(children) => {
                for child in children {
                    self.node(child, ctx);
                }
            }
            Node::Element { tag, children } => self.element(*tag, children, ctx),
            Node::Text(text) => self.text(text, ctx),
        }
    }

    fn element(&mut self, tag: Tag, children: &[Node], ctx: StyleContext) {
        let mut child_ctx = ctx;

        match tag {
            Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::H5 | Tag::H6 => {
                self.paragraph_break();
                // Anchor before any heading text is appended.
                if matches!(tag, Tag::H2 | Tag::H3) {
                    self.anchors.push(self.lines.len());
                }
                child_ctx.heading_level = tag.heading_level().unwrap_or(0);
            }
            Tag::P => {
                // Paragraphs inside list items get no extra spacing.
                if !ctx.in_list_item {
                    self.paragraph_break();
                }
            }
            Tag::Blockquote => {
                self.paragraph_break();
                child_ctx.in_blockquote = true;
            }
            Tag::Pre => {
                self.paragraph_break();
                child_ctx.in_pre = true;
                child_ctx.in_code = true;
            }
            Tag::Code => {
                if !ctx.in_pre {
                    child_ctx.in_code = true;
                }
            }
            Tag::Em => child_ctx.in_emphasis = true,
            Tag::Strong => child_ctx.in_strong = true,
            Tag::Br => {
                self.newline();
                return;
            }
            Tag::Hr => {
                self.paragraph_break();
                let rule = "─".repeat(self.width.min(80));
                self.current
                    .push(Span::styled(rule, Style::default().fg(self.theme.muted())));
                self.paragraph_break();
                return;
            }
            Tag::Ul | Tag::Ol => {
                self.newline();
                child_ctx.list_depth += 1;
            }
            Tag::Li => {
                self.newline();
                let indent = "  ".repeat(ctx.list_depth.saturating_sub(1));
                self.current.push(Span::raw(format!("{indent}• ")));
                child_ctx.in_list_item = true;
            }
            Tag::Div | Tag::Span | Tag::A | Tag::Other => {}
        }

        for child in children {
            self.node(child, child_ctx);
        }

        match tag {
            Tag::H1
            | Tag::H2
            | Tag::H3
            | Tag::H4
            | Tag::H5
            | Tag::H6
            | Tag::Blockquote
            | Tag::Pre
            | Tag::Ul
            | Tag::Ol => self.newline(),
            _ => {}
        }
    }

    fn text(&mut self, raw: &str, ctx: StyleContext) {
        let source = if ctx.in_pre { raw } else { raw.trim() };
        if source.is_empty() {
            return;
        }

        let mut style = Style::default().fg(self.theme.text());
        let mut text;

        if ctx.heading_level > 0 {
            style = Style::default()
                .fg(self.theme.heading())
                .add_modifier(Modifier::BOLD);
            let marker = "#".repeat(usize::from(ctx.heading_level));
            text = wrap_text(&format!("{marker} {source}"), self.width);
        } else {
            text = source.to_string();
        }

        if ctx.in_blockquote {
            self.quote_text(&text);
            return;
        }

        if ctx.in_code {
            style = Style::default()
                .fg(self.theme.code_text())
                .bg(self.theme.code_bg());
            if ctx.in_pre {
                text = wrap_text(&text, self.width.saturating_sub(2).max(40));
            }
            self.append_padded(&text, style);
            return;
        }

        text = wrap_text(&text, self.width);
        if ctx.heading_level == 0 {
            text = justify(&text, self.width);
        }
        if ctx.in_emphasis {
            style = Style::default()
                .fg(self.theme.emphasis())
                .add_modifier(Modifier::ITALIC);
        }
        if ctx.in_strong {
            style = Style::default()
                .fg(self.theme.strong())
                .add_modifier(Modifier::BOLD);
        }

        self.append_text(&text, style);
    }

    /// Blockquote emission: narrower wrap, left border marker, no
    /// justification, blank wrapped lines skipped.
    fn quote_text(&mut self, text: &str) {
        let width = self.width.saturating_sub(4).max(40);
        let wrapped = wrap_text(text, width);
        let wrapped_lines: Vec<&str> = wrapped.split('\n').collect();

        let border = Style::default().fg(self.theme.quote_border());
        let body = Style::default()
            .fg(self.theme.muted())
            .add_modifier(Modifier::ITALIC);

        for (i, line) in wrapped_lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            self.current.push(Span::styled("┃ ", border));
            self.current.push(Span::styled((*line).to_string(), body));
            if i < wrapped_lines.len() - 1 {
                self.newline();
            }
        }
    }

    /// Appends code text with one column of horizontal padding per line.
    fn append_padded(&mut self, text: &str, style: Style) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.newline();
            }
            self.current.push(Span::styled(format!(" {line} "), style));
        }
    }

    fn append_text(&mut self, text: &str, style: Style) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.newline();
            }
            if !line.is_empty() {
                self.current.push(Span::styled(line.to_string(), style));
            }
        }
    }

    fn finish(mut self) -> RenderedChapter {
        if !self.current.is_empty() {
            self.newline();
        }

        // Trailing blanks carry no content and no anchor can point at one.
        let keep = self.anchors.last().map_or(0, |a| a + 1);
        while self.lines.len() > keep && self.lines.last().is_some_and(line_is_blank) {
            self.lines.pop();
        }

        RenderedChapter {
            lines: self.lines,
            heading_anchors: self.anchors,
        }
    }
}

/// Full-justifies word-wrapped text to `width` columns.
///
/// Lines pass through unchanged when any of these hold: last line of the
/// block, single-line block, at most one word, or trimmed length under 75% of
/// the width. Otherwise the missing columns are distributed across the word
/// gaps, left gaps first.
#[must_use]
pub fn justify(text: &str, width: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut justified: Vec<String> = Vec::with_capacity(lines.len());

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            justified.push(String::new());
            continue;
        }

        let is_last = i == lines.len() - 1;
        let words: Vec<&str> = line.split_whitespace().collect();
        let line_len = line.chars().count();

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let threshold = (width as f64 * 0.75) as usize;
        if is_last || lines.len() == 1 || words.len() <= 1 || line_len < threshold {
            justified.push(line.to_string());
            continue;
        }

        let word_len: usize = words.iter().map(|w| w.chars().count()).sum();
        let gaps = words.len() - 1;
        if width < word_len + gaps {
            // Not enough room to justify.
            justified.push(line.to_string());
            continue;
        }
        let total_spaces = width - word_len;

        let base = total_spaces / gaps;
        let extra = total_spaces % gaps;

        let mut out = String::with_capacity(width);
        for (j, word) in words.iter().enumerate() {
            out.push_str(word);
            if j < words.len() - 1 {
                out.push_str(&" ".repeat(base));
                if j < extra {
                    out.push(' ');
                }
            }
        }
        justified.push(out);
    }

    justified.join("\n")
}

fn effective_width(width: u16) -> usize {
    if width == 0 {
        80
    } else {
        usize::from(width)
    }
}

fn wrap_text(text: &str, width: usize) -> String {
    textwrap::wrap(text, width.max(1)).join("\n")
}

fn line_is_blank(line: &Line<'_>) -> bool {
    line.spans.iter().all(|span| span.content.trim().is_empty())
}

#[cfg(test)]
#[path = "tests/render.rs"]
mod tests;
