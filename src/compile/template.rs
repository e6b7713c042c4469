use crate::{
    compile::Scope,
    log::Error,
    pipe::IoWriter,
    render::Renderer,
    tag::{self, Tag},
    value::{Map, Value},
    Engine,
};
use std::io;
use tracing::debug;

/// A compiled [`Template`] that can be rendered any number of times.
///
/// Keeps a copy of the [`Engine`] it was compiled with, which decides how
/// output is escaped and where partials come from.
#[derive(Debug, Clone)]
pub struct Template {
    /// The tag tree generated during compilation.
    scope: Scope,
    /// Configuration used to render this template and its partials.
    engine: Engine,
}

impl Template {
    #[inline]
    pub(crate) fn new(scope: Scope, engine: Engine) -> Self {
        Self { scope, engine }
    }

    /// Return the tag tree of the [`Template`].
    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Return the [`Engine`] the [`Template`] was compiled with.
    #[inline]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Render the [`Template`] against the given roots.
    ///
    /// Roots are searched from last to first, so the last root wins when two
    /// of them define the same name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a variable is missing while the engine treats
    /// that as an error, a partial cannot be loaded, or a lambda or record
    /// method fails. The output rendered before the failure is available
    /// through [`Error::output`].
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{compile, Store};
    ///
    /// let template = compile("hello, {{ name }}!").unwrap();
    /// let output = template.render(&[Store::new().with_must("name", "taylor").into()]);
    ///
    /// assert_eq!(output.unwrap(), "hello, taylor!");
    /// ```
    pub fn render(&self, roots: &[Value]) -> Result<String, Error> {
        debug!(roots = roots.len(), "rendering template");
        let mut buffer = String::new();

        match Renderer::new(self, roots).render(&mut buffer) {
            Ok(()) => Ok(buffer),
            Err(error) => Err(error.with_output(buffer)),
        }
    }

    /// Render the [`Template`] into the given writer.
    ///
    /// Output is streamed, so anything rendered before a failure has already
    /// been written.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] under the same conditions as [`Template::render`],
    /// or one of kind [`ErrorKind::Write`][`crate::ErrorKind::Write`] when the
    /// writer fails.
    pub fn render_to<W>(&self, writer: &mut W, roots: &[Value]) -> Result<(), Error>
    where
        W: io::Write + ?Sized,
    {
        debug!(roots = roots.len(), "rendering template to writer");
        let mut writer = IoWriter::new(writer);

        Renderer::new(self, roots)
            .render(&mut writer)
            .map_err(|error| writer.take_error(error))
    }

    /// Render the [`Template`], then render `layout` with the output available
    /// as `content`.
    ///
    /// The layout sees the same roots, with `content` searched before any of
    /// them.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if rendering either template fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::compile;
    ///
    /// let body = compile("Hello World").unwrap();
    /// let layout = compile("Header {{content}} Footer").unwrap();
    ///
    /// assert_eq!(body.render_in_layout(&layout, &[]).unwrap(), "Header Hello World Footer");
    /// ```
    pub fn render_in_layout(&self, layout: &Template, roots: &[Value]) -> Result<String, Error> {
        let content = self.render(roots)?;

        layout.render(&with_content(roots, content))
    }

    /// Render the [`Template`] inside `layout`, writing the result into the
    /// given writer.
    ///
    /// The body is rendered in full before anything is written.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if rendering either template fails, or the writer
    /// fails.
    pub fn render_in_layout_to<W>(
        &self,
        writer: &mut W,
        layout: &Template,
        roots: &[Value],
    ) -> Result<(), Error>
    where
        W: io::Write + ?Sized,
    {
        let content = self.render(roots)?;

        layout.render_to(writer, &with_content(roots, content))
    }

    /// Return the top-level tags of the [`Template`].
    ///
    /// Text is not included.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{compile, Kind};
    ///
    /// let template = compile("hello {{#people}}{{name}}{{/people}}").unwrap();
    /// let tags = template.tags();
    ///
    /// assert_eq!(tags.len(), 1);
    /// assert_eq!(tags[0].kind(), Kind::Section);
    /// assert_eq!(tags[0].tags()[0].name(), "name");
    /// ```
    pub fn tags(&self) -> Vec<Tag<'_>> {
        tag::collect(&self.scope.data)
    }
}

/// Clone the roots and append a final frame holding the rendered body.
fn with_content(roots: &[Value], content: String) -> Vec<Value> {
    let mut frame = Map::new();
    frame.insert("content".to_string(), Value::String(content));

    let mut roots = roots.to_vec();
    roots.push(Value::Mapping(frame));

    roots
}

#[cfg(test)]
mod tests {
    use crate::{compile, log::ErrorKind, Engine, Escape, Store, Value};
    use serde_json::json;
    use std::io;

    #[test]
    fn test_render_to() {
        let template = compile("hello {{name}}").unwrap();
        let mut buffer = Vec::new();
        template
            .render_to(&mut buffer, &[json!({"name": "world"}).into()])
            .unwrap();

        assert_eq!(buffer, b"hello world");
    }

    #[test]
    fn test_render_keeps_partial_output() {
        let template = Engine::new()
            .with_errors(true)
            .compile_must("before {{missing}} after");
        let error = template.render(&[Store::new().into()]).unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::MissingVariable("missing".into()));
        assert_eq!(error.output(), Some("before "));
    }

    #[test]
    fn test_render_to_streams_partial_output() {
        let template = Engine::new()
            .with_errors(true)
            .compile_must("before {{missing}} after");
        let mut buffer = Vec::new();
        let error = template
            .render_to(&mut buffer, &[Store::new().into()])
            .unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::MissingVariable("missing".into()));
        assert_eq!(buffer, b"before ");
    }

    struct Closed;

    impl io::Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_to_failing_writer() {
        let template = compile("hello").unwrap();
        let error = template.render_to(&mut Closed, &[]).unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::Write);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_render_in_layout() {
        let tests = [
            ("Header {{content}} Footer", "Hello World", json!(null), "Header Hello World Footer"),
            (
                "Header {{content}} Footer",
                "Hello {{s}}",
                json!({"s": "World"}),
                "Header Hello World Footer",
            ),
            (
                "Header {{content}} Footer",
                "Hello {{content}}",
                json!({"content": "World"}),
                "Header Hello World Footer",
            ),
            (
                "Header {{extra}} {{content}} Footer",
                "Hello {{content}}",
                json!({"content": "World", "extra": "extra"}),
                "Header extra Hello World Footer",
            ),
            (
                "Header {{content}} {{content}} Footer",
                "Hello {{content}}",
                json!({"content": "World"}),
                "Header Hello World Hello World Footer",
            ),
        ];

        for (layout, body, data, expected) in tests {
            let layout = compile(layout).unwrap();
            let body = compile(body).unwrap();
            let roots = [Value::from(data)];

            assert_eq!(body.render_in_layout(&layout, &roots).unwrap(), expected);

            let mut buffer = Vec::new();
            body.render_in_layout_to(&mut buffer, &layout, &roots)
                .unwrap();
            assert_eq!(String::from_utf8(buffer).unwrap(), expected);
        }
    }

    #[test]
    fn test_layout_escapes_content() {
        let layout = Engine::new().compile_must("<main>{{content}}</main>");
        let body = Engine::new()
            .with_escape(Escape::Raw)
            .compile_must("<p>{{text}}</p>");
        let roots = [json!({"text": "hi"}).into()];

        assert_eq!(
            body.render_in_layout(&layout, &roots).unwrap(),
            "<main>&lt;p&gt;hi&lt;/p&gt;</main>"
        );
    }

    #[test]
    fn test_template_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<crate::Template>();
    }
}
