//! One-pass source normalization.
//!
//! Strips comments and blanks string literal contents so later stages can
//! match on code alone. Both the structural parser and the pattern
//! matcher consume the same [`NormalizedSource`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// A Python block header: `def f(x):`, `for i in range(n):`, `else:`.
static PY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(?:async\s+)?def\s+\w+\s*\(.*|class\s+\w+.*|(?:for|while|if|elif|with)\b[^{;]*|else|try|finally|except\b[^{;]*)\s*:\s*(?:#.*)?$",
    )
    .unwrap()
});

/// How `//`, `/*` and `'` are read, decided once per input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentSyntax {
    /// Python-like: `#` comments, `//` is floor division, `'` always quotes
    Hash,
    /// C-like: `//` and `/* */` comments, `'` may open a lifetime or label
    Slash,
    /// No telltale either way; `//` between two operands stays code
    #[default]
    Mixed,
}

impl CommentSyntax {
    pub fn detect(source: &str) -> Self {
        if source.lines().any(|line| PY_HEADER.is_match(line)) {
            CommentSyntax::Hash
        } else if source.contains('{') || source.contains(';') {
            CommentSyntax::Slash
        } else {
            CommentSyntax::Mixed
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLine {
    /// 1-based line number in the original text
    pub number: usize,
    /// Code with comments removed and literals blanked, trimmed
    pub code: String,
    /// Leading whitespace width of the original line (tabs count as 4)
    pub indent: usize,
}

impl NormalizedLine {
    pub fn is_blank(&self) -> bool {
        self.code.is_empty()
    }

    pub fn opens(&self) -> usize {
        self.code.matches('{').count()
    }

    pub fn closes(&self) -> usize {
        self.code.matches('}').count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedSource {
    pub lines: Vec<NormalizedLine>,
    pub syntax: CommentSyntax,
    identifiers: HashSet<String>,
    lowered: String,
}

impl NormalizedSource {
    pub fn new(source: &str) -> Self {
        let syntax = CommentSyntax::detect(source);
        let mut stripper = Stripper::new(syntax);
        let lines: Vec<NormalizedLine> = source
            .lines()
            .enumerate()
            .map(|(idx, raw)| NormalizedLine {
                number: idx + 1,
                code: stripper.strip_line(raw).trim().to_string(),
                indent: indent_width(raw),
            })
            .collect();

        let lowered = lines
            .iter()
            .map(|l| l.code.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("\n");
        let identifiers = lowered
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|tok| tok.chars().next().is_some_and(|c| !c.is_ascii_digit()))
            .map(str::to_string)
            .collect();

        Self {
            lines,
            syntax,
            identifiers,
            lowered,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(NormalizedLine::is_blank)
    }

    /// Lower-cased code of every line joined by newlines.
    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    /// Whether a lower-cased identifier occurs anywhere in the code.
    pub fn has_identifier(&self, ident: &str) -> bool {
        self.identifiers.contains(ident)
    }

    pub fn has_any_identifier(&self, idents: &[&str]) -> bool {
        idents.iter().any(|i| self.has_identifier(i))
    }

    /// Lower-cased code for an inclusive range of line indices.
    pub fn lowered_range(&self, start: usize, end: usize) -> String {
        self.lines
            .get(start..=end.min(self.lines.len().saturating_sub(1)))
            .unwrap_or_default()
            .iter()
            .map(|l| l.code.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn indent_width(raw: &str) -> usize {
    raw.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Comment and literal stripper carrying block-comment state across lines.
#[derive(Debug, Default)]
struct Stripper {
    syntax: CommentSyntax,
    in_block_comment: bool,
    in_triple_quote: Option<char>,
}

impl Stripper {
    fn new(syntax: CommentSyntax) -> Self {
        Self {
            syntax,
            ..Self::default()
        }
    }

    fn opens_line_comment(&self, chars: &[char], i: usize) -> bool {
        match self.syntax {
            CommentSyntax::Hash => false,
            CommentSyntax::Slash => true,
            CommentSyntax::Mixed => !between_operands(chars, i, 2),
        }
    }

    fn strip_line(&mut self, raw: &str) -> String {
        let chars: Vec<char> = raw.chars().collect();
        let mut out = String::with_capacity(raw.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if self.in_block_comment {
                if c == '*' && next == Some('/') {
                    self.in_block_comment = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }

            if let Some(q) = self.in_triple_quote {
                if is_triple(&chars, i, q) {
                    self.in_triple_quote = None;
                    out.push(q);
                    i += 3;
                } else {
                    i += 1;
                }
                continue;
            }

            match c {
                '/' if next == Some('/') && self.opens_line_comment(&chars, i) => break,
                '/' if next == Some('/') => {
                    out.push_str("//");
                    i += 2;
                }
                '/' if next == Some('*') && self.syntax != CommentSyntax::Hash => {
                    self.in_block_comment = true;
                    i += 2;
                }
                '#' => break,
                '"' | '\'' if is_triple(&chars, i, c) => {
                    self.in_triple_quote = Some(c);
                    out.push(c);
                    i += 3;
                }
                '"' => {
                    out.push_str("\"\"");
                    i = skip_literal(&chars, i + 1, '"');
                }
                '\'' if self.syntax == CommentSyntax::Hash
                    || is_char_literal(&chars, i)
                    || !is_lifetime_or_label(&chars, i) =>
                {
                    out.push_str("''");
                    i = skip_literal(&chars, i + 1, '\'');
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }

        out
    }
}

fn is_triple(chars: &[char], i: usize, q: char) -> bool {
    chars.get(i) == Some(&q) && chars.get(i + 1) == Some(&q) && chars.get(i + 2) == Some(&q)
}

fn is_char_literal(chars: &[char], i: usize) -> bool {
    match chars.get(i + 1) {
        Some('\\') => chars.get(i + 3) == Some(&'\'') || chars.get(i + 4) == Some(&'\''),
        Some(_) => chars.get(i + 2) == Some(&'\''),
        None => false,
    }
}

/// A `'` that names a lifetime (`&'a`, `<'a>`) or loop label rather than
/// opening a string.
fn is_lifetime_or_label(chars: &[char], i: usize) -> bool {
    if !chars
        .get(i + 1)
        .is_some_and(|c| c.is_alphabetic() || *c == '_')
    {
        return false;
    }
    let end = (i + 1..chars.len())
        .find(|&j| !(chars[j].is_alphanumeric() || chars[j] == '_'))
        .unwrap_or(chars.len());
    let after = chars.get(end).copied();
    if after == Some('\'') {
        return false;
    }
    if !chars[end..].contains(&'\'') {
        return true;
    }
    match previous_non_space(chars, i) {
        Some('<' | '&' | '+' | ':') => true,
        Some(',') => matches!(after, Some(',' | '>')),
        _ => false,
    }
}

fn previous_non_space(chars: &[char], i: usize) -> Option<char> {
    chars[..i].iter().rev().find(|c| !c.is_whitespace()).copied()
}

/// Whether the operator of `width` chars at `i` sits between two operands,
/// as in `(lo + hi) // 2` or `n //= 2`.
fn between_operands(chars: &[char], i: usize, width: usize) -> bool {
    let before = previous_non_space(chars, i)
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | ')' | ']'));
    let after = chars[(i + width).min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '(' | '[' | '='));
    before && after
}

/// Index just past the closing quote, or end of line when unterminated.
fn skip_literal(chars: &[char], mut i: usize, quote: char) -> usize {
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}
