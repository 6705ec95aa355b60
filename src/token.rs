//! Structured tokens and the tokenizer for the bracketed L-System notation.
//!
//! Symbol strings look like `F(10)[//Ar(2,10)][+(45)Af(1,10)]`: a single
//! character (or `A` plus a rule tag) optionally followed by a parenthesised,
//! comma-separated parameter list.

use crate::error::{GrapeError, GrapeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule selector of an `A<tag>` non-terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    /// Root internode (`r`).
    Root,
    /// Secondary axis (`f`).
    Secondary,
    /// Tip that fans out into pedicels (`e`).
    Tip,
    /// Pedicel carrying a berry (`p`).
    Pedicel,
    /// Face `c` of the four-slot azimuth cycle.
    FaceC,
    /// Face `v`.
    FaceV,
    /// Face `b`.
    FaceB,
    /// Face `n`.
    FaceN,
}

impl Tag {
    pub const ALL: [Tag; 8] = [
        Tag::Root,
        Tag::Secondary,
        Tag::Tip,
        Tag::Pedicel,
        Tag::FaceC,
        Tag::FaceV,
        Tag::FaceB,
        Tag::FaceN,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'r' => Tag::Root,
            'f' => Tag::Secondary,
            'e' => Tag::Tip,
            'p' => Tag::Pedicel,
            'c' => Tag::FaceC,
            'v' => Tag::FaceV,
            'b' => Tag::FaceB,
            'n' => Tag::FaceN,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Tag::Root => 'r',
            Tag::Secondary => 'f',
            Tag::Tip => 'e',
            Tag::Pedicel => 'p',
            Tag::FaceC => 'c',
            Tag::FaceV => 'v',
            Tag::FaceB => 'b',
            Tag::FaceN => 'n',
        }
    }

    /// Position in [`Tag::ALL`], used to index rule tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Every symbol the notation knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Draw forward (`F`).
    Forward,
    /// Berry attachment marker (`S`).
    Berry,
    /// Oriented, tapering segment (`E`). Rewritten by the grammar.
    Segment,
    /// Parameterised non-terminal (`A<tag>`).
    Module(Tag),
    /// Bend around the bend axis (`+`).
    BendLeft,
    /// Bend the other way (`-`).
    BendRight,
    /// Roll around the heading (`/`).
    RollLeft,
    /// Roll the other way (`_`).
    RollRight,
    /// Pitch down (`&`).
    PitchDown,
    /// Pitch up (`^`).
    PitchUp,
    /// Save the cursor (`[`).
    Push,
    /// Restore the cursor (`]`).
    Pop,
    /// Swallow the next token (`%`).
    Skip,
    /// Set the current width (`!`).
    Width,
}

impl Symbol {
    /// Symbols that must be rewritten away before interpretation.
    pub fn is_nonterminal(self) -> bool {
        matches!(self, Symbol::Module(_) | Symbol::Segment)
    }

    fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'F' => Symbol::Forward,
            'S' => Symbol::Berry,
            'E' => Symbol::Segment,
            '+' => Symbol::BendLeft,
            '-' => Symbol::BendRight,
            '/' => Symbol::RollLeft,
            '_' => Symbol::RollRight,
            '&' => Symbol::PitchDown,
            '^' => Symbol::PitchUp,
            '[' => Symbol::Push,
            ']' => Symbol::Pop,
            '%' => Symbol::Skip,
            '!' => Symbol::Width,
            _ => return None,
        })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Symbol::Forward => 'F',
            Symbol::Berry => 'S',
            Symbol::Segment => 'E',
            Symbol::Module(tag) => return write!(f, "A{}", tag.as_char()),
            Symbol::BendLeft => '+',
            Symbol::BendRight => '-',
            Symbol::RollLeft => '/',
            Symbol::RollRight => '_',
            Symbol::PitchDown => '&',
            Symbol::PitchUp => '^',
            Symbol::Push => '[',
            Symbol::Pop => ']',
            Symbol::Skip => '%',
            Symbol::Width => '!',
        };
        write!(f, "{c}")
    }
}

/// A symbol together with its numeric parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: Symbol,
    pub params: Vec<f32>,
}

impl Token {
    pub fn new(symbol: Symbol, params: &[f32]) -> Self {
        Self {
            symbol,
            params: params.to_vec(),
        }
    }

    /// A token without parameters.
    pub fn bare(symbol: Symbol) -> Self {
        Self {
            symbol,
            params: Vec::new(),
        }
    }

    /// Shorthand for an `A<tag>(params)` non-terminal.
    pub fn module(tag: Tag, params: &[f32]) -> Self {
        Self::new(Symbol::Module(tag), params)
    }

    pub fn is_nonterminal(&self) -> bool {
        self.symbol.is_nonterminal()
    }

    /// Parameter `idx`, or `default` if absent.
    pub fn param_or(&self, idx: usize, default: f32) -> f32 {
        self.params.get(idx).copied().unwrap_or(default)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{p}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Serializes a token sequence back into the textual notation.
pub fn tokens_to_string(tokens: &[Token]) -> String {
    tokens.iter().map(Token::to_string).collect()
}

/// Tokenizes a symbol string.
///
/// Whitespace between tokens and around parameters is ignored. Unknown
/// characters, dangling `A`, unterminated or empty parameter lists and
/// non-numeric parameters are all hard errors. `NaN` and infinities count as
/// non-numeric.
pub fn parse_tokens(text: &str) -> GrapeResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        let symbol = if c == 'A' {
            match chars.next() {
                Some((_, t)) => match Tag::from_char(t) {
                    Some(tag) => Symbol::Module(tag),
                    None => {
                        return Err(GrapeError::parse(
                            offset,
                            format!("unknown rule tag '{t}' after 'A'"),
                        ));
                    }
                },
                None => return Err(GrapeError::parse(offset, "dangling 'A' without tag")),
            }
        } else {
            Symbol::from_char(c)
                .ok_or_else(|| GrapeError::parse(offset, format!("unknown symbol '{c}'")))?
        };

        let mut params = Vec::new();
        if let Some(&(open, '(')) = chars.peek() {
            chars.next();
            let start = open + 1;
            let mut end = None;
            for (i, ch) in chars.by_ref() {
                if ch == ')' {
                    end = Some(i);
                    break;
                }
            }
            let end = end.ok_or_else(|| GrapeError::parse(open, "unterminated parameter list"))?;
            params = parse_params(&text[start..end], start)?;
        }

        tokens.push(Token { symbol, params });
    }

    Ok(tokens)
}

fn parse_params(body: &str, base: usize) -> GrapeResult<Vec<f32>> {
    let mut params = Vec::new();
    let mut offset = base;
    for field in body.split(',') {
        let trimmed = field.trim();
        let value = trimmed
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| GrapeError::InvalidNumber {
                offset,
                text: trimmed.to_string(),
            })?;
        params.push(value);
        offset += field.len() + 1;
    }
    Ok(params)
}
