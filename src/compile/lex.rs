pub mod token;

use crate::{
    compile::{
        lex::token::{Sigil, Tag, Token},
        Delimiters,
    },
    log::{error_empty_tag, error_malformed_delimiter, error_unmatched_open, Error},
    region::Region,
};
use morel::Finder;
use tracing::trace;

pub type LexResult = Result<Option<Token>, Error>;

/// Provides methods to read a source string as [`Token`] instances.
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Position within source.
    cursor: usize,
    /// The 1-based line at the cursor.
    line: usize,
    /// Position of the beginning of the line at the cursor.
    line_begin: usize,
    /// The delimiters currently in effect.
    delimiters: Delimiters,
    /// Compiled [`Finder`] instance used to search for the current
    /// delimiters in the source text.
    ///
    /// Rebuilt whenever a delimiter tag changes them.
    finder: Finder,
    /// Temporary storage for a [`Token`] that will be read
    /// on the following call to `.next`
    buffer: Option<Token>,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] from the given source and starting [`Delimiters`].
    #[inline]
    pub fn new(source: &'source str, delimiters: Delimiters) -> Self {
        Self {
            source,
            cursor: 0,
            line: 1,
            line_begin: 0,
            finder: Finder::new(delimiters.to_syntax()),
            delimiters,
            buffer: None,
        }
    }

    /// Return the [`Delimiters`] in effect at the last returned tag.
    #[inline]
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Return the next [`Token`].
    ///
    /// Comments and delimiter changes are consumed without producing a
    /// [`Token`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a tag is malformed.
    pub fn next(&mut self) -> LexResult {
        loop {
            // Always prefer taking from the buffer when possible.
            if let Some(next) = self.buffer.take() {
                return Ok(Some(next));
            }
            let from = self.cursor;
            if from >= self.source.len() {
                return Ok(None);
            }

            let begin = match self.find(from, &self.delimiters.open) {
                Some(begin) => begin,
                None => {
                    self.cursor = self.source.len();
                    self.line += count_lines(&self.source[from..]);

                    return Ok(Some(Token::Raw((from..self.source.len()).into())));
                }
            };

            let (text_end, tag) = self.lex_tag(from, begin)?;
            if text_end > from {
                self.buffer = tag.map(Token::Tag);

                return Ok(Some(Token::Raw((from..text_end).into())));
            }
            if let Some(tag) = tag {
                return Ok(Some(Token::Tag(tag)));
            }
        }
    }

    /// Read the tag that begins at `begin` and move the cursor past it.
    ///
    /// Returns the end of the text preceding the tag, which is the beginning
    /// of the line when the tag stands alone, and the tag itself unless it is
    /// a comment or delimiter change.
    fn lex_tag(&mut self, from: usize, begin: usize) -> Result<(usize, Option<Tag>), Error> {
        let line = self.line + count_lines(&self.source[from..begin]);
        let line_begin = self.source[from..begin]
            .rfind('\n')
            .map_or(self.line_begin, |n| from + n + 1);
        let open_end = begin + self.delimiters.open.len();
        let is_triple = self.source[open_end..].starts_with('{');
        let (body_begin, close) = if is_triple {
            (open_end + 1, self.delimiters.close_raw())
        } else {
            (open_end, self.delimiters.close.clone())
        };

        let Some(body_end) = self.find(body_begin, &close) else {
            let region = Region::new(begin..self.source.len());
            return Err(error_unmatched_open(self.source, region, line));
        };
        let end = body_end + close.len();
        let region = Region::new(begin..end);
        let body = trim(self.source, Region::new(body_begin..body_end));

        let (sigil, name) = if is_triple {
            (Sigil::Raw, body)
        } else {
            match body.literal(self.source).chars().next() {
                Some(c) => match Sigil::from_char(c) {
                    Some(sigil) => {
                        let after = Region::new(body.begin + c.len_utf8()..body.end);
                        (sigil, trim(self.source, after))
                    }
                    None => (Sigil::Escaped, body),
                },
                None => return Err(error_empty_tag(self.source, region, line)),
            }
        };
        if name.is_empty() && !sigil.is_standalone() {
            return Err(error_empty_tag(self.source, region, line));
        }

        let delimiters = match sigil {
            Sigil::Delimiter => Some(self.lex_delimiters(body, region, line)?),
            _ => None,
        };

        self.cursor = end;
        self.line = line + count_lines(region.literal(self.source));
        self.line_begin = region
            .literal(self.source)
            .rfind('\n')
            .map_or(line_begin, |n| begin + n + 1);
        let mut text_end = begin;
        let mut indent = Region::new(begin..begin);

        if sigil.is_standalone() && line_begin >= from {
            if let Some(next) = self.standalone(line_begin, begin, end) {
                text_end = line_begin;
                indent = Region::new(line_begin..begin);
                let lines = count_lines(&self.source[end..next]);
                if lines > 0 {
                    self.line += lines;
                    self.line_begin = next;
                }
                self.cursor = next;
            }
        }

        if let Some(delimiters) = delimiters {
            trace!(
                open = delimiters.open(),
                close = delimiters.close(),
                line,
                "changed delimiters"
            );
            self.finder = Finder::new(delimiters.to_syntax());
            self.delimiters = delimiters;
        }

        let tag = match sigil {
            Sigil::Comment | Sigil::Delimiter => None,
            _ => Some(Tag {
                sigil,
                name,
                region,
                indent,
                line,
            }),
        };

        Ok((text_end, tag))
    }

    /// Read the new [`Delimiters`] from the body of a delimiter tag,
    /// such as `=<% %>=`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the body is missing the trailing `=`, or does
    /// not contain exactly two delimiters.
    fn lex_delimiters(
        &self,
        body: Region,
        region: Region,
        line: usize,
    ) -> Result<Delimiters, Error> {
        let malformed = || error_malformed_delimiter(self.source, region, line);

        let text = body.literal(self.source);
        if text.len() < 2 || !text.ends_with('=') {
            return Err(malformed());
        }

        let parts: Vec<&str> = text[1..text.len() - 1].split_whitespace().collect();
        match parts[..] {
            [open, close] => Delimiters::new(open, close).map_err(|_| malformed()),
            _ => Err(malformed()),
        }
    }

    /// Determine if the tag between `begin` and `end` is the only thing on
    /// its line, other than spaces and tabs.
    ///
    /// Returns the position after the line ending when it is.
    fn standalone(&self, line_begin: usize, begin: usize, end: usize) -> Option<usize> {
        let is_blank = |c: char| c == ' ' || c == '\t';

        if !self.source[line_begin..begin].chars().all(is_blank) {
            return None;
        }

        let rest = &self.source[end..];
        let trailing = rest.len() - rest.trim_start_matches(is_blank).len();
        let after = &rest[trailing..];
        let next = end + trailing;

        if after.is_empty() {
            Some(next)
        } else if after.starts_with("\r\n") {
            Some(next + 2)
        } else if after.starts_with('\n') {
            Some(next + 1)
        } else {
            None
        }
    }

    /// Return the position of the next occurrence of `target` at or after
    /// `from`.
    fn find(&self, from: usize, target: &str) -> Option<usize> {
        let mut at = from;
        while at < self.source.len() {
            let (_, begin, _) = self.finder.next(self.source, at)?;
            if self.source[begin..].starts_with(target) {
                return Some(begin);
            }
            // Another marker matched here, step over its first character.
            at = begin + self.source[begin..].chars().next().map_or(1, char::len_utf8);
        }

        None
    }
}

/// Return the [`Region`] with leading and trailing whitespace removed.
fn trim(source: &str, region: Region) -> Region {
    let text = region.literal(source);
    let start = region.begin + (text.len() - text.trim_start().len());
    let end = region.begin + text.trim_end().len();

    if start >= end {
        Region::new(start..start)
    } else {
        Region::new(start..end)
    }
}

/// Return the number of line feeds in the text.
fn count_lines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}
