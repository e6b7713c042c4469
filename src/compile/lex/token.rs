use crate::region::Region;
use std::fmt::Display;

/// Types emitted by the Lexer.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// Raw text outside of any tag.
    Raw(Region),
    /// A tag other than a comment or delimiter change.
    Tag(Tag),
}

/// A tag read from source text.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Tag {
    pub sigil: Sigil,
    /// The trimmed name inside the tag.
    pub name: Region,
    /// The whole tag, delimiters included.
    pub region: Region,
    /// Whitespace in front of a standalone tag, empty otherwise.
    pub indent: Region,
    /// The 1-based line the tag begins on.
    pub line: usize,
}

/// The character after the open delimiter that decides what a tag does.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Sigil {
    /// No sigil, `{{name}}`.
    Escaped,
    /// `{{&name}}` or `{{{name}}}`.
    Raw,
    /// `{{#name}}`
    Section,
    /// `{{^name}}`
    Inverted,
    /// `{{/name}}`
    Close,
    /// `{{>name}}`
    Partial,
    /// `{{!comment}}`
    Comment,
    /// `{{=<% %>=}}`
    Delimiter,
}

impl Sigil {
    /// Return the Sigil that begins with the given character.
    ///
    /// `None` means the character is the start of a name.
    pub fn from_char(c: char) -> Option<Self> {
        let sigil = match c {
            '&' => Sigil::Raw,
            '#' => Sigil::Section,
            '^' => Sigil::Inverted,
            '/' => Sigil::Close,
            '>' => Sigil::Partial,
            '!' => Sigil::Comment,
            '=' => Sigil::Delimiter,
            _ => return None,
        };

        Some(sigil)
    }

    /// Return true if a tag with this Sigil may stand alone on its line.
    ///
    /// Variables always produce output, so they never do.
    pub fn is_standalone(&self) -> bool {
        !matches!(self, Sigil::Escaped | Sigil::Raw)
    }
}

impl Display for Sigil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sigil::Escaped => write!(f, "variable"),
            Sigil::Raw => write!(f, "raw variable"),
            Sigil::Section => write!(f, "section (#)"),
            Sigil::Inverted => write!(f, "inverted section (^)"),
            Sigil::Close => write!(f, "close (/)"),
            Sigil::Partial => write!(f, "partial (>)"),
            Sigil::Comment => write!(f, "comment (!)"),
            Sigil::Delimiter => write!(f, "delimiter (=)"),
        }
    }
}
