use crate::{
    compile::{Delimiters, Parser, Template},
    escape::{Escape, Marshal},
    log::{Error, ErrorKind},
    partial::PartialProvider,
    value::Value,
};
use std::{
    fmt::{Debug, Formatter},
    fs,
    path::Path,
    sync::Arc,
};
use tracing::debug;

/// Holds the configuration that templates are compiled and rendered with.
///
/// Every [`Template`] keeps a copy of the `Engine` that compiled it, and
/// partials are compiled with that same configuration.
#[derive(Clone, Default)]
pub struct Engine {
    /// How variable output is escaped.
    escape: Escape,
    /// When true, a variable that cannot be resolved is an error.
    errors: bool,
    /// Source of the templates named by partial tags.
    partials: Option<Arc<dyn PartialProvider>>,
    /// Replaces the default JSON marshaling in [`Escape::Json`] mode.
    marshal: Option<Marshal>,
    /// The delimiters a template begins with.
    delimiters: Delimiters,
}

impl Engine {
    /// Create a new [`Engine`] with HTML escaping, `{{ }}` delimiters, no
    /// partials and missing variables rendered as nothing.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the [`Escape`] mode.
    ///
    /// Returns the `Engine`, so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{Engine, Escape};
    ///
    /// let engine = Engine::new().with_escape(Escape::Json);
    /// ```
    #[inline]
    pub fn with_escape(mut self, escape: Escape) -> Self {
        self.set_escape(escape);

        self
    }

    /// Set the [`Escape`] mode.
    #[inline]
    pub fn set_escape(&mut self, escape: Escape) {
        self.escape = escape;
    }

    /// Choose whether a variable that cannot be resolved is an error.
    ///
    /// Returns the `Engine`, so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{Engine, Store};
    ///
    /// let template = Engine::new().with_errors(true).compile_must("{{missing}}");
    /// let result = template.render(&[Store::new().into()]);
    ///
    /// assert!(result.is_err());
    /// ```
    #[inline]
    pub fn with_errors(mut self, errors: bool) -> Self {
        self.set_errors(errors);

        self
    }

    /// Choose whether a variable that cannot be resolved is an error.
    #[inline]
    pub fn set_errors(&mut self, errors: bool) {
        self.errors = errors;
    }

    /// Set the [`PartialProvider`] that partial tags are loaded from.
    ///
    /// Returns the `Engine`, so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{Engine, StaticProvider};
    ///
    /// let provider = StaticProvider::new().with("greeting", "hello {{name}}");
    /// let engine = Engine::new().with_partials(provider);
    /// ```
    #[inline]
    pub fn with_partials<P>(mut self, provider: P) -> Self
    where
        P: PartialProvider + 'static,
    {
        self.set_partials(provider);

        self
    }

    /// Set the [`PartialProvider`] that partial tags are loaded from.
    #[inline]
    pub fn set_partials<P>(&mut self, provider: P)
    where
        P: PartialProvider + 'static,
    {
        self.partials = Some(Arc::new(provider));
    }

    /// Set a marshal function, which is given the first chance to write every
    /// value in [`Escape::Json`] mode.
    ///
    /// Returning `None` from the function falls back to the default marshaling.
    ///
    /// Returns the `Engine`, so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{Engine, Escape, Value};
    ///
    /// let engine = Engine::new()
    ///     .with_escape(Escape::Json)
    ///     .with_marshal(|value: &Value| match value {
    ///         Value::Bool(true) => Some("yes".to_string()),
    ///         _ => None,
    ///     });
    /// ```
    #[inline]
    pub fn with_marshal<F>(mut self, marshal: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.set_marshal(marshal);

        self
    }

    /// Set a marshal function used in [`Escape::Json`] mode.
    #[inline]
    pub fn set_marshal<F>(&mut self, marshal: F)
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.marshal = Some(Arc::new(marshal));
    }

    /// Set the [`Delimiters`] that templates compiled by this `Engine` begin
    /// with.
    ///
    /// Partials always begin with the default `{{ }}`.
    ///
    /// Returns the `Engine`, so additional methods may be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{Delimiters, Engine};
    ///
    /// let engine = Engine::new().with_delimiters(Delimiters::new("<%", "%>").unwrap());
    /// let template = engine.compile_must("hello <% name %>");
    /// ```
    #[inline]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.set_delimiters(delimiters);

        self
    }

    /// Set the [`Delimiters`] that templates compiled by this `Engine` begin
    /// with.
    #[inline]
    pub fn set_delimiters(&mut self, delimiters: Delimiters) {
        self.delimiters = delimiters;
    }

    /// Compile a new [`Template`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when compilation fails, which means the source
    /// contains a malformed tag or unbalanced sections.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Engine;
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile("hello, {{ name }}!");
    /// assert!(template.is_ok());
    /// ```
    #[inline]
    pub fn compile(&self, text: &str) -> Result<Template, Error> {
        let scope = Parser::new(text, self.delimiters.clone()).compile()?;

        Ok(Template::new(scope, self.clone()))
    }

    /// Compile a new [`Template`].
    ///
    /// # Panics
    ///
    /// Panics when compilation fails, which means the source contains a
    /// malformed tag or unbalanced sections.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Engine;
    ///
    /// let engine = Engine::default();
    /// let template = engine.compile_must("hello, {{ name }}!");
    /// ```
    #[inline]
    pub fn compile_must(&self, text: &str) -> Template {
        match self.compile(text) {
            Ok(template) => template,
            Err(error) => panic!("{error:#}"),
        }
    }

    /// Read and compile the file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] of kind [`ErrorKind::Io`] when the file cannot be
    /// read, or the compilation error otherwise. Either is named after the
    /// path.
    pub fn compile_file<P>(&self, path: P) -> Result<Template, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let name = path.display().to_string();
        debug!(path = %name, "compiling template file");

        let text = fs::read_to_string(path).map_err(|error| {
            Error::new(ErrorKind::Io)
                .with_source(error)
                .with_name(&name)
                .with_help(format!("failed to read template file `{name}`"))
        })?;

        self.compile(&text).map_err(|error| error.with_name(name))
    }

    /// Compile the text of a partial, which always begins with the default
    /// [`Delimiters`].
    pub(crate) fn compile_partial(&self, text: &str) -> Result<Template, Error> {
        self.compile_fragment(text, &Delimiters::default())
    }

    /// Compile a fragment that a lambda asked to render, with the delimiters
    /// of the section the lambda was called from.
    pub(crate) fn compile_fragment(
        &self,
        text: &str,
        delimiters: &Delimiters,
    ) -> Result<Template, Error> {
        let scope = Parser::new(text, delimiters.clone()).compile()?;

        Ok(Template::new(scope, self.clone()))
    }

    #[inline]
    pub(crate) fn escape(&self) -> Escape {
        self.escape
    }

    #[inline]
    pub(crate) fn errors(&self) -> bool {
        self.errors
    }

    #[inline]
    pub(crate) fn partials(&self) -> Option<&Arc<dyn PartialProvider>> {
        self.partials.as_ref()
    }

    #[inline]
    pub(crate) fn marshal(&self) -> Option<&Marshal> {
        self.marshal.as_ref()
    }
}

impl Debug for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("escape", &self.escape)
            .field("errors", &self.errors)
            .field("partials", &self.partials)
            .field("marshal", &self.marshal.as_ref().map(|_| "Fn"))
            .field("delimiters", &self.delimiters)
            .finish()
    }
}
