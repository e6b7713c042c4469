use crate::compile::{Delimiters, Scope};

/// The tag tree of a compiled template.
///
/// Comments and delimiter changes never appear here, they are consumed
/// while lexing.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    /// Literal text, written unchanged.
    Text(String),
    /// Render a variable, `{{name}}` or `{{{name}}}`.
    Variable(Variable),
    /// A section or inverted section.
    Section(Section),
    /// Render another template in place.
    Partial(Partial),
}

/// A variable tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Dotted name, or `.` for the current item.
    pub name: String,
    /// False for `{{{name}}}` and `{{&name}}`.
    pub escaped: bool,
    /// The delimiters in effect at the tag, used when a lambda asks to
    /// render text.
    pub delimiters: Delimiters,
    /// The 1-based line of the tag.
    pub line: usize,
}

/// A `{{#name}}` or `{{^name}}` block and everything up to its close tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    /// True for `{{^name}}`.
    pub inverted: bool,
    pub scope: Scope,
    /// The unrendered text between the open and close tags.
    ///
    /// This is what a lambda receives.
    pub raw: String,
    /// The delimiters in effect at the open tag, used to compile the text
    /// a lambda asks to render.
    pub delimiters: Delimiters,
    /// The 1-based line of the open tag.
    pub line: usize,
}

/// A `{{>name}}` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    pub name: String,
    /// Whitespace placed in front of every line of the partial.
    pub indent: String,
    pub line: usize,
}
