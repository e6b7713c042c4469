//! Stache parser.
//!
//! Utilizes a Lexer to receive tokens, which it uses to construct the tag
//! tree of a template. Sections are matched with an explicit stack of open
//! blocks, so deeply nested or malformed input produces an error rather than
//! exhausting the call stack.
pub mod scope;
pub mod tree;

mod block;

use crate::{
    compile::{
        lex::{
            token::{Sigil, Tag, Token},
            Lexer,
        },
        parse::{
            block::Block,
            tree::{Partial, Section, Tree, Variable},
        },
        Delimiters, Scope,
    },
    log::{Error, ErrorKind},
};
use tracing::trace;

/// The deepest that sections may be nested.
///
/// Rendering and dropping a tree recurse once per level, so the limit keeps
/// both well inside the call stack.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<'source> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source>,
}

impl<'source> Parser<'source> {
    /// Create a new Parser over the given source, beginning with the given
    /// [`Delimiters`].
    #[inline]
    pub fn new(source: &'source str, delimiters: Delimiters) -> Self {
        Self {
            lexer: Lexer::new(source, delimiters),
        }
    }

    /// Compile the source into a [`Scope`] containing the tag tree.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a tag is malformed, or sections are not
    /// closed in the order they were opened.
    pub fn compile(mut self) -> Result<Scope, Error> {
        let source = self.lexer.source;
        let mut root = Scope::new();
        let mut blocks: Vec<Block> = vec![];

        while let Some(token) = self.lexer.next()? {
            let tree = match token {
                Token::Raw(region) => Tree::Text(source[region].to_string()),
                Token::Tag(tag) => match tag.sigil {
                    Sigil::Escaped | Sigil::Raw => Tree::Variable(Variable {
                        name: source[tag.name].to_string(),
                        escaped: tag.sigil == Sigil::Escaped,
                        delimiters: self.lexer.delimiters().clone(),
                        line: tag.line,
                    }),
                    Sigil::Partial => Tree::Partial(Partial {
                        name: source[tag.name].to_string(),
                        indent: source[tag.indent].to_string(),
                        line: tag.line,
                    }),
                    Sigil::Section | Sigil::Inverted => {
                        if blocks.len() == MAX_DEPTH {
                            return Err(Error::new(ErrorKind::NestingTooDeep(MAX_DEPTH))
                                .with_line(tag.line)
                                .with_pointer(source, tag.region)
                                .with_help("close some sections before opening another"));
                        }
                        blocks.push(Block {
                            name: source[tag.name].to_string(),
                            inverted: tag.sigil == Sigil::Inverted,
                            line: tag.line,
                            delimiters: self.lexer.delimiters().clone(),
                            region: tag.region,
                            scope: Scope::new(),
                        });
                        continue;
                    }
                    Sigil::Close => self.close(blocks.pop(), tag)?,
                    Sigil::Comment | Sigil::Delimiter => continue,
                },
            };

            match blocks.last_mut() {
                Some(block) => block.scope.data.push(tree),
                None => root.data.push(tree),
            }
        }

        if let Some(block) = blocks.first() {
            return Err(Error::new(ErrorKind::UnclosedSection(block.name.clone()))
                .with_line(block.line)
                .with_pointer(source, block.region)
                .with_help(format!(
                    "close the section with `{}/{}{}`",
                    block.delimiters.open(),
                    block.name,
                    block.delimiters.close()
                )));
        }
        trace!(nodes = root.data.len(), "compiled template");

        Ok(root)
    }

    /// Close the innermost open block with the given close tag.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if no block is open, or the close tag names a
    /// different block.
    fn close(&self, block: Option<Block>, tag: Tag) -> Result<Tree, Error> {
        let source = self.lexer.source;
        let name = &source[tag.name];

        let Some(block) = block else {
            return Err(Error::new(ErrorKind::UnmatchedCloseTag)
                .with_line(tag.line)
                .with_pointer(source, tag.region)
                .with_help(format!("no section named `{name}` is open")));
        };
        if block.name != name {
            return Err(Error::new(ErrorKind::InterleavedClosingTag(name.to_string()))
                .with_line(tag.line)
                .with_pointer(source, tag.region)
                .with_help(format!(
                    "the innermost open section is `{}`, opened on line {}",
                    block.name, block.line
                )));
        }

        Ok(Tree::Section(Section {
            name: block.name,
            inverted: block.inverted,
            scope: block.scope,
            raw: source[block.region.end..tag.region.begin].to_string(),
            delimiters: block.delimiters,
            line: block.line,
        }))
    }
}
