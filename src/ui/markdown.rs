//! Markdown rendering for assistant replies
//!
//! Replies are short markdown documents (headings, lists, fenced C++). They
//! are turned into pre-wrapped, styled lines so the modal can scroll by line.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use textwrap::core::display_width;

use crate::syntax::highlight_block;
use crate::theme::Theme;

/// Render `markdown` into lines no wider than `width`
pub fn render(markdown: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut renderer = Renderer::new(width.max(10), theme);

    for event in Parser::new_ext(markdown, options) {
        renderer.event(event);
    }
    renderer.flush();

    // No trailing blank lines
    while renderer.lines.last().is_some_and(|line| line.width() == 0) {
        renderer.lines.pop();
    }
    renderer.lines
}

struct Renderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,

    /// Inline run of the current block
    spans: Vec<Span<'static>>,
    /// Inline style stack (emphasis, strong, links, headings)
    styles: Vec<Style>,

    /// One entry per open list: the next number for ordered lists
    lists: Vec<Option<u64>>,
    /// Bullet waiting for the first line of a list item
    bullet: Option<String>,
    quote_depth: usize,

    /// Fenced code being collected: language and text
    code: Option<(Option<String>, String)>,
}

impl<'t> Renderer<'t> {
    fn new(width: usize, theme: &'t Theme) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            styles: vec![Style::default().fg(theme.fg_primary)],
            lists: Vec::new(),
            bullet: None,
            quote_depth: 0,
            code: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let style = f(self.style());
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn event(&mut self, event: Event) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                self.flush();
                self.blank();
                let accent = self.theme.accent_primary;
                self.push_style(|s| s.fg(accent).add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush();
                self.pop_style();
                self.blank();
            }

            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }

            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, code)) = self.code.take() {
                    self.lines.extend(highlight_block(
                        code.trim_end(),
                        language.as_deref(),
                        self.theme,
                    ));
                    self.blank();
                }
            }

            Event::Start(Tag::List(first)) => {
                self.flush();
                self.lists.push(first);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.bullet = Some(format!("{}{}", "  ".repeat(depth), marker));
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::TaskListMarker(done) => {
                let mark = if done { "[x] " } else { "[ ] " };
                self.spans.push(Span::styled(mark, self.style()));
            }

            Event::Start(Tag::BlockQuote(_)) => {
                self.flush();
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }

            Event::Start(Tag::Emphasis) => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Event::Start(Tag::Strong) => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Event::Start(Tag::Strikethrough) => {
                self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT))
            }
            Event::Start(Tag::Link { .. }) => {
                let info = self.theme.info;
                self.push_style(|s| s.fg(info).add_modifier(Modifier::UNDERLINED));
            }
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link) => {
                self.pop_style()
            }

            Event::Text(text) => match self.code.as_mut() {
                Some((_, code)) => code.push_str(&text),
                None => self.spans.push(Span::styled(text.to_string(), self.style())),
            },
            Event::Code(code) => {
                let style = Style::default().fg(self.theme.syntax_string).bg(self.theme.bg_tertiary);
                self.spans.push(Span::styled(code.to_string(), style));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.spans.push(Span::styled(html.to_string(), self.style()));
            }
            Event::SoftBreak => self.spans.push(Span::styled(" ", self.style())),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(self.width),
                    Style::default().fg(self.theme.border),
                )));
            }
            _ => {}
        }
    }

    /// Wrap the pending inline run into lines
    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }

        let quote = "│ ".repeat(self.quote_depth);
        let bullet = self.bullet.take().unwrap_or_default();
        let hanging = " ".repeat(display_width(&bullet));
        let depth_indent = if bullet.is_empty() {
            "  ".repeat(self.lists.len())
        } else {
            String::new()
        };

        let first = format!("{quote}{depth_indent}{bullet}");
        let rest = format!("{quote}{depth_indent}{hanging}");
        let spans = std::mem::take(&mut self.spans);
        let prefix_style = Style::default().fg(self.theme.fg_muted);

        self.lines.extend(wrap_spans(spans, self.width, (&first, &rest), prefix_style));
    }
}

/// Greedy word wrap over styled spans
///
/// `prefixes` are the first-line and continuation prefixes. Whitespace is
/// never emitted at the start or end of a line. Words longer than a line are
/// split by character.
pub fn wrap_spans(
    spans: Vec<Span<'static>>,
    width: usize,
    prefixes: (&str, &str),
    prefix_style: Style,
) -> Vec<Line<'static>> {
    let (first, rest) = prefixes;
    let mut out = LineBuilder::new(rest, prefix_style);
    out.begin(first);

    for span in spans {
        for token in split_words(&span.content) {
            let token_width = display_width(token);

            if token.chars().all(char::is_whitespace) {
                if !out.at_start() {
                    out.pending = Some((token.to_string(), span.style, token_width));
                }
                continue;
            }

            let pending_width = out.pending.as_ref().map_or(0, |(_, _, w)| *w);
            if out.used + pending_width + token_width > width && !out.at_start() {
                out.break_line();
            }
            out.flush_pending();

            if out.used + token_width <= width {
                out.push(token.to_string(), span.style, token_width);
                continue;
            }

            // Hard split an overlong word
            let mut chunk = String::new();
            let mut chunk_width = 0;
            for c in token.chars() {
                let w = display_width(c.encode_utf8(&mut [0; 4]));
                if out.used + chunk_width + w > width && (chunk_width > 0 || !out.at_start()) {
                    if !chunk.is_empty() {
                        out.push(std::mem::take(&mut chunk), span.style, chunk_width);
                    }
                    chunk_width = 0;
                    out.break_line();
                }
                chunk.push(c);
                chunk_width += w;
            }
            if !chunk.is_empty() {
                out.push(chunk, span.style, chunk_width);
            }
        }
    }

    out.finish()
}

/// Accumulates wrapped lines for [`wrap_spans`]
struct LineBuilder<'p> {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    /// Columns used on the current line, prefix included
    used: usize,
    /// Width of the current line's prefix
    start: usize,
    /// Whitespace held back until the next word shows it is not trailing
    pending: Option<(String, Style, usize)>,
    rest: &'p str,
    prefix_style: Style,
}

impl<'p> LineBuilder<'p> {
    fn new(rest: &'p str, prefix_style: Style) -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            used: 0,
            start: 0,
            pending: None,
            rest,
            prefix_style,
        }
    }

    fn begin(&mut self, prefix: &str) {
        self.start = display_width(prefix);
        self.used = self.start;
        if !prefix.is_empty() {
            self.current.push(Span::styled(prefix.to_string(), self.prefix_style));
        }
    }

    fn at_start(&self) -> bool {
        self.used == self.start
    }

    fn push(&mut self, text: String, style: Style, width: usize) {
        self.current.push(Span::styled(text, style));
        self.used += width;
    }

    fn flush_pending(&mut self) {
        if let Some((text, style, width)) = self.pending.take() {
            if !self.at_start() {
                self.push(text, style, width);
            }
        }
    }

    fn break_line(&mut self) {
        self.pending = None;
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
        let rest = self.rest;
        self.begin(rest);
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.lines.push(Line::from(self.current));
        self.lines
    }
}

/// Split into alternating runs of whitespace and non-whitespace
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|s| s != space) {
            tokens.push(&text[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect()).collect()
    }

    #[test]
    fn split_words_alternates() {
        assert_eq!(split_words("sort  the array"), vec!["sort", "  ", "the", " ", "array"]);
        assert_eq!(split_words(" x"), vec![" ", "x"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn paragraph_wraps_at_width() {
        let theme = Theme::default();
        let lines = render("Sort the tickets and use a multiset for lookups.", 20, &theme);
        let text = text(&lines);
        assert!(text.len() > 1);
        assert!(text.iter().all(|l| display_width(l) <= 20), "{text:?}");
        assert_eq!(text.join(" ").split_whitespace().count(), 9);
    }

    #[test]
    fn heading_is_bold_accent() {
        let theme = Theme::default();
        let lines = render("## Strategy:\n\nUse two pointers.", 40, &theme);
        assert_eq!(text(&lines)[0], "Strategy:");
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.accent_primary));
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(text(&lines)[2], "Use two pointers.");
    }

    #[test]
    fn lists_get_markers() {
        let theme = Theme::default();
        let lines = render("- first\n- second\n\n1. one\n2. two", 40, &theme);
        assert_eq!(text(&lines), vec!["• first", "• second", "", "1. one", "2. two"]);
    }

    #[test]
    fn list_items_wrap_under_their_text() {
        let theme = Theme::default();
        let lines = render("- alpha beta gamma delta", 14, &theme);
        assert_eq!(text(&lines), vec!["• alpha beta", "  gamma delta"]);
    }

    #[test]
    fn fenced_code_is_highlighted_per_line() {
        let theme = Theme::default();
        let lines = render("Code:\n\n```cpp\nint main() {\n  return 0;\n}\n```\n", 40, &theme);
        let text = text(&lines);
        assert_eq!(text, vec!["Code:", "", "int main() {", "  return 0;", "}"]);
        assert_eq!(lines[2].spans[0].style.bg, Some(theme.bg_secondary));
    }

    #[test]
    fn inline_code_is_styled() {
        let theme = Theme::default();
        let lines = render("Use `long long` here.", 40, &theme);
        let code: String = lines[0]
            .spans
            .iter()
            .filter(|s| s.style.fg == Some(theme.syntax_string))
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(code, "long long");
        assert_eq!(text(&lines), vec!["Use long long here."]);
    }

    #[test]
    fn plain_error_text_passes_through() {
        let theme = Theme::default();
        let message = "Error: The model blocked the response. Reason: SAFETY.";
        assert_eq!(text(&render(message, 80, &theme)), vec![message]);
    }

    #[test]
    fn overlong_words_are_split() {
        let lines = wrap_spans(vec![Span::raw("abcdefghij")], 4, ("", ""), Style::default());
        assert_eq!(text(&lines), vec!["abcd", "efgh", "ij"]);
    }
}
