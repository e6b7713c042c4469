use super::{Pointer, RED, RESET};
use crate::{log::Visual, region::Region};
use std::fmt::{Debug, Display, Formatter, Result};

/// The condition an [`Error`] describes.
///
/// Compilation produces the tag related kinds, rendering produces the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A tag with no sigil and no name, such as `{{}}`.
    EmptyTag,
    /// An open delimiter with no matching close delimiter.
    UnmatchedOpenTag,
    /// A close tag with no open section.
    UnmatchedCloseTag,
    /// A close tag that does not match the innermost open section.
    InterleavedClosingTag(String),
    /// A section that is still open at the end of the template.
    UnclosedSection(String),
    /// A delimiter change tag that could not be understood.
    MalformedDelimiter,
    /// Sections nested deeper than the given limit.
    NestingTooDeep(usize),
    /// A variable that could not be resolved while missing variables are errors.
    MissingVariable(String),
    /// A partial that the provider could not find.
    PartialNotFound(String),
    /// A partial name that could escape the provider's directories.
    UnsafePartialName(String),
    /// A partial was requested but the template has no provider.
    NoPartialProvider,
    /// Reading a template or partial failed.
    Io,
    /// Writing rendered output failed.
    Write,
    /// A value could not be converted into template data.
    Serialize,
    /// An error raised by user code, such as a lambda or a record method.
    Custom(String),
}

impl ErrorKind {
    /// Return true if this kind is produced while compiling a template.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            ErrorKind::EmptyTag
                | ErrorKind::UnmatchedOpenTag
                | ErrorKind::UnmatchedCloseTag
                | ErrorKind::InterleavedClosingTag(_)
                | ErrorKind::UnclosedSection(_)
                | ErrorKind::MalformedDelimiter
                | ErrorKind::NestingTooDeep(_)
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ErrorKind::EmptyTag => write!(f, "empty tag"),
            ErrorKind::UnmatchedOpenTag => write!(f, "unmatched open tag"),
            ErrorKind::UnmatchedCloseTag => write!(f, "unmatched close tag"),
            ErrorKind::InterleavedClosingTag(name) => write!(f, "interleaved closing tag: {name}"),
            ErrorKind::UnclosedSection(name) => {
                write!(f, "Section {name} has no closing tag: {name}")
            }
            ErrorKind::MalformedDelimiter => write!(f, "malformed delimiter tag"),
            ErrorKind::NestingTooDeep(limit) => {
                write!(f, "sections nested deeper than {limit} levels")
            }
            ErrorKind::MissingVariable(name) => write!(f, "missing variable: {name}"),
            ErrorKind::PartialNotFound(name) => write!(f, "partial not found: {name}"),
            ErrorKind::UnsafePartialName(name) => write!(f, "unsafe partial name: {name}"),
            ErrorKind::NoPartialProvider => write!(f, "no partial provider configured"),
            ErrorKind::Io => write!(f, "io failure"),
            ErrorKind::Write => write!(f, "write failure"),
            ErrorKind::Serialize => write!(f, "unserializable value"),
            ErrorKind::Custom(reason) => write!(f, "{reason}"),
        }
    }
}

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use stache::{Error, Region};
///
/// Error::build("lookup failed")
///     .with_pointer("{{#user}}{{name}}{{/user}}", Region::new(9..17))
///     .with_name("profile.mustache")
///     .with_help("the user record has no `name` field");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: lookup failed
///   --> profile.mustache:1:10
///    |
///  1 | {{#user}}{{name}}{{/user}}
///    |          ^^^^^^^^
///    |
///   = help: the user record has no `name` field
/// ```
pub struct Error {
    /// Describes the cause of the [`Error`].
    kind: ErrorKind,
    /// The 1-based line of the template that the [`Error`] comes from.
    line: Option<usize>,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the Template that the [`Error`] comes from.
    name: Option<String>,
    /// Output rendered before the [`Error`] stopped rendering.
    output: Option<String>,
    /// The underlying cause, such as an I/O failure.
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new [`Error`] of the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Error {
            kind,
            line: None,
            visual: None,
            help: None,
            name: None,
            output: None,
            source: None,
        }
    }

    /// Create a new [`Error`] with the given reason text.
    ///
    /// This is the way lambdas and record methods report their own failures,
    /// which abort rendering and reach the caller unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Error;
    ///
    /// Error::build("upstream service unavailable")
    ///     .with_help("retry the render later");
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error::new(ErrorKind::Custom(reason.into()))
    }

    /// Set the line of the template that the [`Error`] is related to.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);

        self
    }

    /// Set the name text, which is the name of the [`Template`][`crate::Template`]
    /// that the [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.visual = Some(Box::new(Pointer::new(source, region.into())));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Attach the output that was rendered before the [`Error`] occurred.
    pub fn with_output(mut self, output: String) -> Self {
        self.output = Some(output);

        self
    }

    /// Set the underlying cause of the [`Error`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));

        self
    }

    /// Return the kind of the [`Error`].
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Return the 1-based template line that the [`Error`] is related to.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Return the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the `Template` that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the output rendered before the [`Error`] stopped rendering.
    ///
    /// Only errors returned from [`Template::render`][`crate::Template::render`]
    /// and its layout variant carry output.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("line", &self.line)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .field("source", &self.source)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if f.alternate() {
            write!(f, "{RED}error{RESET}: ")?;
        }
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        write!(f, "{}", self.kind)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if f.alternate() {
            match &self.visual {
                Some(visual) => {
                    return visual.display(f, self.name.as_deref(), self.help.as_deref())
                }
                None => {
                    if let Some(help) = &self.help {
                        write!(f, "\n  = help: {help}")?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.line == other.line && self.help == other.help
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};
    use std::error::Error as _;

    #[test]
    fn test_display_with_line() {
        let error = Error::new(ErrorKind::InterleavedClosingTag("a".into())).with_line(1);

        assert_eq!(error.to_string(), "line 1: interleaved closing tag: a");
    }

    #[test]
    fn test_display_unclosed_section() {
        let error = Error::new(ErrorKind::UnclosedSection("A".into())).with_line(3);

        assert_eq!(error.to_string(), "line 3: Section A has no closing tag: A");
    }

    #[test]
    fn test_display_custom() {
        assert_eq!(Error::build("test err").to_string(), "test err");
    }

    #[test]
    fn test_alternate_includes_pointer_and_help() {
        let error = Error::new(ErrorKind::EmptyTag)
            .with_line(1)
            .with_pointer("hello {{}}", 6..10)
            .with_name("greeting")
            .with_help("tags need a name");
        let printed = format!("{error:#}");

        assert!(printed.contains("line 1: empty tag"));
        assert!(printed.contains("--> greeting:1:7"));
        assert!(printed.contains("help: tags need a name"));
    }

    #[test]
    fn test_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = Error::new(ErrorKind::Io).with_source(io);

        assert!(error.source().is_some());
        assert_eq!(error.to_string(), "io failure: denied");
    }

    #[test]
    fn test_is_parse() {
        assert!(ErrorKind::EmptyTag.is_parse());
        assert!(!ErrorKind::MissingVariable("x".into()).is_parse());
    }
}
