use crate::{
    escape::{self, Escape, Marshal},
    log::{error_write, Error, ErrorKind},
    value::Value,
};
use std::{
    fmt::{self, Arguments, Write},
    io,
};

/// Wraps some underlying buffer by providing methods that write values to it
/// with the configured escaping.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
    escape: Escape,
    marshal: Option<&'buffer Marshal>,
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(
        buffer: &'buffer mut (dyn Write + 'buffer),
        escape: Escape,
        marshal: Option<&'buffer Marshal>,
    ) -> Self {
        Self {
            buffer,
            escape,
            marshal,
        }
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// In [`Escape::Json`] mode the value is always marshaled, even when
    /// `escaped` is false.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the value cannot be marshaled, or the write
    /// fails.
    pub fn write_value(&mut self, value: &Value, escaped: bool) -> Result<(), Error> {
        match self.escape {
            Escape::Json => self.write_json(value),
            Escape::Html if escaped => match value.dereference().and_then(Value::as_str) {
                Some(string) => escape::html(self.buffer, string).map_err(|_| error_write()),
                None => {
                    escape::html(self.buffer, &value.to_string()).map_err(|_| error_write())
                }
            },
            _ => write!(self.buffer, "{value}").map_err(|_| error_write()),
        }
    }

    /// Write text produced by a lambda in a variable position.
    ///
    /// The text is escaped as a string would be when `escaped` is true.
    pub fn write_text(&mut self, text: &str, escaped: bool) -> Result<(), Error> {
        let result = match self.escape {
            Escape::Html if escaped => escape::html(self.buffer, text),
            Escape::Json if escaped => escape::json(self.buffer, text),
            _ => self.buffer.write_str(text),
        };

        result.map_err(|_| error_write())
    }

    /// Marshal the value, giving the custom marshal function the first chance
    /// at every value.
    fn write_json(&mut self, value: &Value) -> Result<(), Error> {
        if let Some(text) = self.marshal.and_then(|marshal| marshal(value)) {
            return self.buffer.write_str(&text).map_err(|_| error_write());
        }

        escape::marshal(self.buffer, value)
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> fmt::Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> fmt::Result {
        Write::write_fmt(self.buffer, args)
    }
}

/// Adapts an [`io::Write`] so a [`Pipe`] can stream into it.
///
/// The first I/O failure is kept, so it can be reported instead of the
/// opaque formatting error.
pub(crate) struct IoWriter<'a, W>
where
    W: io::Write + ?Sized,
{
    inner: &'a mut W,
    error: Option<io::Error>,
}

impl<'a, W> IoWriter<'a, W>
where
    W: io::Write + ?Sized,
{
    pub fn new(inner: &'a mut W) -> Self {
        Self { inner, error: None }
    }

    /// Replace a write error with the stored I/O failure, if there is one.
    pub fn take_error(&mut self, error: Error) -> Error {
        match self.error.take() {
            Some(source) if error.kind() == &ErrorKind::Write => error.with_source(source),
            _ => error,
        }
    }
}

impl<W> Write for IoWriter<'_, W>
where
    W: io::Write + ?Sized,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|error| {
            self.error = Some(error);
            fmt::Error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{IoWriter, Pipe};
    use crate::{
        escape::{Escape, Marshal},
        log::ErrorKind,
        value::Value,
    };
    use serde_json::json;
    use std::{fmt::Write, io, sync::Arc};

    fn write(value: &Value, escape: Escape, escaped: bool) -> String {
        let mut buffer = String::new();
        Pipe::new(&mut buffer, escape, None)
            .write_value(value, escaped)
            .unwrap();

        buffer
    }

    #[test]
    fn test_write_html() {
        let value = Value::from("<a href=\"\">");

        assert_eq!(write(&value, Escape::Html, true), "&lt;a href=&#34;&#34;&gt;");
        assert_eq!(write(&value, Escape::Html, false), "<a href=\"\">");
        assert_eq!(write(&value, Escape::Raw, true), "<a href=\"\">");
    }

    #[test]
    fn test_write_stringified() {
        let value = Value::from(json!({"list": [1, 2], "flag": true}));

        assert_eq!(write(&value, Escape::Raw, true), "{flag: true, list: [1, 2]}");
        assert_eq!(write(&Value::Null, Escape::Html, true), "");
    }

    #[test]
    fn test_write_json() {
        let value = Value::from(json!({"b": 1, "a": "x"}));

        assert_eq!(write(&value, Escape::Json, true), r#"{"a":"x","b":1}"#);
        assert_eq!(write(&value, Escape::Json, false), r#"{"a":"x","b":1}"#);
        assert_eq!(write(&Value::from("a\"b"), Escape::Json, true), r#"a\"b"#);
    }

    #[test]
    fn test_write_custom_marshal() {
        let marshal: Marshal = Arc::new(|value: &Value| match value {
            Value::Sequence(items) => Some(
                items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("-"),
            ),
            _ => None,
        });
        let mut buffer = String::new();
        let mut pipe = Pipe::new(&mut buffer, Escape::Json, Some(&marshal));
        pipe.write_value(&Value::from(vec!["one", "two"]), true)
            .unwrap();
        pipe.write_str(" ").unwrap();
        pipe.write_value(&Value::from(json!({"k": 1})), true)
            .unwrap();

        assert_eq!(buffer, r#"one-two {"k":1}"#);
    }

    #[test]
    fn test_write_text() {
        let mut buffer = String::new();
        let mut pipe = Pipe::new(&mut buffer, Escape::Html, None);
        pipe.write_text("<b>", true).unwrap();
        pipe.write_text("<b>", false).unwrap();

        assert_eq!(buffer, "&lt;b&gt;<b>");
    }

    struct Failing;

    impl io::Write for Failing {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_io_writer_keeps_error() {
        let mut sink = Failing;
        let mut writer = IoWriter::new(&mut sink);
        let error = Pipe::new(&mut writer, Escape::Raw, None)
            .write_value(&Value::from("text"), true)
            .unwrap_err();
        let error = writer.take_error(error);

        assert_eq!(error.kind(), &ErrorKind::Write);
        assert!(std::error::Error::source(&error).is_some());
    }
}
