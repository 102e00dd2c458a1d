//! Syntax highlighting using syntect
//!
//! Approach code is C++, but AI replies can fence any language, so the
//! lookup accepts the usual aliases and falls back to a keyword tokenizer
//! when syntect has no grammar for the block.

use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::theme::Theme;

/// Global syntax set with all default syntaxes
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Global theme set
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const SYNTECT_THEME: &str = "base16-ocean.dark";

const CPP_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "class", "const", "constexpr", "continue", "default", "delete", "do",
    "else", "enum", "for", "if", "include", "namespace", "new", "return", "sizeof", "static",
    "struct", "switch", "template", "this", "typedef", "typename", "using", "while", "true",
    "false", "nullptr",
];

const CPP_TYPES: &[&str] = &[
    "int", "long", "short", "char", "bool", "double", "float", "void", "unsigned", "signed",
    "size_t", "string", "vector", "set", "map", "multiset", "pair", "std",
];

/// Map common language names/aliases to syntect syntax names
fn normalize_language(lang: &str) -> String {
    let base = lang.split(',').next().unwrap_or(lang).trim().to_lowercase();
    let name = match base.as_str() {
        "cpp" | "c++" | "cxx" | "cc" | "hpp" => "C++",
        "c" | "h" => "C",
        "py" | "python" | "python3" => "Python",
        "java" => "Java",
        "rs" | "rust" => "Rust",
        "js" | "javascript" => "JavaScript",
        "go" | "golang" => "Go",
        "sh" | "bash" | "shell" | "console" => "Bourne Again Shell (bash)",
        _ => return base,
    };
    name.to_string()
}

/// Find the syntax definition for a given language
fn find_syntax(language: Option<&str>) -> Option<&'static SyntaxReference> {
    let lang = language?;
    let normalized = normalize_language(lang);

    SYNTAX_SET
        .find_syntax_by_name(&normalized)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(&normalized))
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(lang))
}

/// Convert a syntect color to a ratatui color
fn syntect_to_ratatui_color(color: syntect::highlighting::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

fn convert_style(style: syntect::highlighting::Style, theme: &Theme) -> Style {
    let mut converted =
        Style::default().fg(syntect_to_ratatui_color(style.foreground)).bg(theme.bg_secondary);

    if style.font_style.contains(FontStyle::BOLD) {
        converted = converted.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        converted = converted.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        converted = converted.add_modifier(Modifier::UNDERLINED);
    }
    converted
}

/// Highlight a whole code block, one `Line` per source line
///
/// Parse state carries across lines so multi-line comments and raw strings
/// are coloured correctly.
pub fn highlight_block(code: &str, language: Option<&str>, theme: &Theme) -> Vec<Line<'static>> {
    let syntax = find_syntax(language);
    let syntect_theme = THEME_SET.themes.get(SYNTECT_THEME);

    let (Some(syntax), Some(syntect_theme)) = (syntax, syntect_theme) else {
        return code.lines().map(|line| Line::from(highlight_basic(line, theme))).collect();
    };

    let mut highlighter = HighlightLines::new(syntax, syntect_theme);
    let mut lines = Vec::new();

    for source in LinesWithEndings::from(code) {
        let spans = match highlighter.highlight_line(source, &SYNTAX_SET) {
            Ok(ranges) => ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    (!text.is_empty())
                        .then(|| Span::styled(text.to_string(), convert_style(style, theme)))
                })
                .collect(),
            Err(e) => {
                tracing::debug!("syntect failed on line, using basic highlighting: {}", e);
                highlight_basic(source.trim_end_matches(['\n', '\r']), theme)
            }
        };
        lines.push(Line::from(spans));
    }

    lines
}

/// Keyword-based highlighting as fallback
fn highlight_basic(line: &str, theme: &Theme) -> Vec<Span<'static>> {
    let base_style = Style::default().fg(theme.fg_primary).bg(theme.bg_secondary);

    if line.trim_start().starts_with('#') {
        return vec![Span::styled(
            line.to_string(),
            Style::default().fg(theme.syntax_keyword).bg(theme.bg_secondary),
        )];
    }

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => {
                flush_word(&mut current, &mut spans, base_style, theme);
                let mut literal = String::from(c);
                let mut escaped = false;
                for ch in chars.by_ref() {
                    literal.push(ch);
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == c {
                        break;
                    }
                }
                spans.push(Span::styled(
                    literal,
                    Style::default().fg(theme.syntax_string).bg(theme.bg_secondary),
                ));
            }
            '/' if chars.peek() == Some(&'/') => {
                flush_word(&mut current, &mut spans, base_style, theme);
                let comment: String = std::iter::once(c).chain(chars.by_ref()).collect();
                spans.push(Span::styled(
                    comment,
                    Style::default().fg(theme.syntax_comment).bg(theme.bg_secondary),
                ));
            }
            c if c.is_alphanumeric() || c == '_' => current.push(c),
            _ => {
                flush_word(&mut current, &mut spans, base_style, theme);
                let style = if "+-*/%=<>!&|^~?:;,.()[]{}".contains(c) {
                    Style::default().fg(theme.syntax_operator).bg(theme.bg_secondary)
                } else {
                    base_style
                };
                spans.push(Span::styled(c.to_string(), style));
            }
        }
    }
    flush_word(&mut current, &mut spans, base_style, theme);

    if spans.is_empty() {
        spans.push(Span::styled(line.to_string(), base_style));
    }
    spans
}

/// Emit the pending identifier or number with keyword/type/number styling
fn flush_word(word: &mut String, spans: &mut Vec<Span<'static>>, base: Style, theme: &Theme) {
    if word.is_empty() {
        return;
    }

    let style = if word.starts_with(|c: char| c.is_ascii_digit()) {
        Style::default().fg(theme.syntax_number).bg(theme.bg_secondary)
    } else if CPP_KEYWORDS.contains(&word.as_str()) {
        Style::default().fg(theme.syntax_keyword).bg(theme.bg_secondary).add_modifier(Modifier::BOLD)
    } else if CPP_TYPES.contains(&word.as_str()) {
        Style::default().fg(theme.syntax_type).bg(theme.bg_secondary)
    } else {
        base
    };

    spans.push(Span::styled(std::mem::take(word), style));
}
