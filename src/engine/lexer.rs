// ── Emotebank: Reference Lexer ─────────────────────────────────────────────
//
// Splits message text into a flat token stream. At each scan position the
// first matching class wins:
//   1. code span     : 1–3 backticks … same run, may span lines, never scanned
//   2. escaped ref   : `\:name:` or `\;name;`
//   3. custom ref    : `<:name:id>` / `<a:name:id>`, id 17+ digits
//   4. bare ref      : `:name:` or `;name;` (same delimiter on both sides)
//   5. text          : any single remaining character
//
// Rule 5 matches every character, so tokenizing cannot fail and every byte of
// the input lands in exactly one token.

use regex::{CaptureMatches, Captures, Regex};
use std::sync::LazyLock;

// The regex crate has no backreferences, so each code-span width and each
// delimiter gets its own alternative. Alternation is leftmost-first, which
// gives the priority order above.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?sx)
        (?P<code>```.+?```|``.+?``|`.+?`)
        | (?P<escaped>\\(?::(?P<esc_colon>\w{2,32}):|;(?P<esc_semi>\w{2,32});))
        | (?P<custom><(?P<animated>a?):(?P<custom_name>\w{2,32}):(?P<custom_id>\d{17,})>)
        | (?P<bare>:(?P<bare_colon>\w{2,32}):|;(?P<bare_semi>\w{2,32});)
        | (?P<text>.)
        ",
    )
    .expect("token pattern is valid")
});

/// One lexed token. Every variant keeps the exact source slice in `raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'t> {
    Code { raw: &'t str },
    EscapedRef { raw: &'t str, name: &'t str },
    CustomRef { raw: &'t str, animated: bool, name: &'t str, id: &'t str },
    BareRef { raw: &'t str, name: &'t str },
    Text { raw: &'t str },
}

impl<'t> Token<'t> {
    /// Source text covered by this token.
    pub fn raw(&self) -> &'t str {
        match *self {
            Token::Code { raw }
            | Token::EscapedRef { raw, .. }
            | Token::CustomRef { raw, .. }
            | Token::BareRef { raw, .. }
            | Token::Text { raw } => raw,
        }
    }

    /// Referenced name for the three reference kinds.
    pub fn reference_name(&self) -> Option<&'t str> {
        match *self {
            Token::EscapedRef { name, .. } | Token::CustomRef { name, .. } | Token::BareRef { name, .. } => {
                Some(name)
            }
            Token::Code { .. } | Token::Text { .. } => None,
        }
    }

    fn from_captures(caps: &Captures<'t>) -> Self {
        let raw = caps.get(0).map_or("", |m| m.as_str());
        let group = |name: &str| caps.name(name).map(|m| m.as_str());

        if caps.name("code").is_some() {
            Token::Code { raw }
        } else if caps.name("escaped").is_some() {
            let name = group("esc_colon").or_else(|| group("esc_semi")).unwrap_or_default();
            Token::EscapedRef { raw, name }
        } else if caps.name("custom").is_some() {
            Token::CustomRef {
                raw,
                animated: group("animated").is_some_and(|a| !a.is_empty()),
                name: group("custom_name").unwrap_or_default(),
                id: group("custom_id").unwrap_or_default(),
            }
        } else if caps.name("bare").is_some() {
            let name = group("bare_colon").or_else(|| group("bare_semi")).unwrap_or_default();
            Token::BareRef { raw, name }
        } else {
            Token::Text { raw }
        }
    }
}

/// Lazy, single-pass token iterator over one message.
pub struct Lexer<'t> {
    matches: CaptureMatches<'static, 't>,
}

impl<'t> Lexer<'t> {
    pub fn new(text: &'t str) -> Self {
        Self { matches: TOKEN_PATTERN.captures_iter(text) }
    }
}

impl<'t> Iterator for Lexer<'t> {
    type Item = Token<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.matches.next().map(|caps| Token::from_captures(&caps))
    }
}

/// Tokenize `text`.
pub fn tokenize(text: &str) -> Lexer<'_> {
    Lexer::new(text)
}
