mod lex;
mod parse;
mod template;

pub(crate) use crate::compile::parse::Parser;
pub use crate::compile::{
    parse::{scope::Scope, tree},
    template::Template,
};

use crate::{
    log::{Error, ErrorKind},
    Engine,
};
use morel::Syntax;

/// Compile a [`Template`] from the given text.
///
/// Provides a shortcut to quickly compile a `Template` without creating
/// an `Engine`.
///
/// # Examples
///
/// ```
/// use stache::compile;
///
/// let template = compile("hello {{ name }}");
/// assert!(template.is_ok())
/// ```
pub fn compile(text: &str) -> Result<Template, Error> {
    Engine::default().compile(text)
}

/// Markers recognized by the Lexer.
#[derive(Debug, PartialEq, Clone, Copy)]
enum Marker {
    /// Beginning of a tag, `{{` by default.
    Open,
    /// End of a tag, `}}` by default.
    Close,
    /// End of a triple mustache tag, `}}}` by default.
    CloseRaw,
}

impl From<Marker> for usize {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Open => 0,
            Marker::Close => 1,
            Marker::CloseRaw => 2,
        }
    }
}

/// The pair of strings that open and close a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub(crate) open: String,
    pub(crate) close: String,
}

impl Delimiters {
    /// Create a new pair of [`Delimiters`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if either delimiter is empty or contains whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Delimiters;
    ///
    /// assert!(Delimiters::new("<%", "%>").is_ok());
    /// assert!(Delimiters::new("<%", "").is_err());
    /// ```
    pub fn new<S, T>(open: S, close: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let (open, close) = (open.into(), close.into());
        let is_valid = |s: &str| !s.is_empty() && !s.contains(char::is_whitespace);
        if !is_valid(&open) || !is_valid(&close) {
            return Err(Error::new(ErrorKind::MalformedDelimiter).with_help(format!(
                "`{open}` and `{close}` must be non-empty and contain no whitespace"
            )));
        }

        Ok(Self { open, close })
    }

    /// Return the open delimiter.
    pub fn open(&self) -> &str {
        &self.open
    }

    /// Return the close delimiter.
    pub fn close(&self) -> &str {
        &self.close
    }

    /// Return the text that ends a triple mustache tag.
    pub(crate) fn close_raw(&self) -> String {
        ["}", &self.close].concat()
    }

    /// Return a Syntax that searches for these delimiters.
    pub(crate) fn to_syntax(&self) -> Syntax {
        let mut markers = vec![(Marker::Open.into(), self.open.clone())];
        // The same text may both open and close a tag, such as `|`.
        if self.close != self.open {
            markers.push((Marker::Close.into(), self.close.clone()));
        }
        let close_raw = self.close_raw();
        if close_raw != self.open {
            markers.push((Marker::CloseRaw.into(), close_raw));
        }

        Syntax::new(markers)
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".into(),
            close: "}}".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compile, Delimiters};
    use crate::log::ErrorKind;

    #[test]
    fn test_delimiters_new() {
        let delimiters = Delimiters::new("<%", "%>").unwrap();

        assert_eq!(delimiters.open(), "<%");
        assert_eq!(delimiters.close(), "%>");
        assert_eq!(delimiters.close_raw(), "}%>");
    }

    #[test]
    fn test_delimiters_invalid() {
        for (open, close) in [("", "}}"), ("{{", ""), ("{ {", "}}")] {
            let error = Delimiters::new(open, close).unwrap_err();

            assert_eq!(error.kind(), &ErrorKind::MalformedDelimiter);
        }
    }

    #[test]
    fn test_compile() {
        assert!(compile("hello {{name}}").is_ok());
        assert!(compile("hello {{name").is_err());
    }
}
