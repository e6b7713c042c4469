//! Output escaping modes and the helpers that implement them.

use crate::{
    log::{error_write, Error, ErrorKind},
    value::Value,
};
use std::{fmt::Write, sync::Arc};

/// A marshal function turns a [`Value`] into JSON text.
///
/// Returning `None` declines the value, and the default marshaling is used.
pub type Marshal = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// Describes how variable output is escaped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Output is written unchanged.
    Raw,
    /// Output is escaped for inclusion in HTML.
    #[default]
    Html,
    /// Strings are escaped for inclusion inside a JSON string, every other
    /// value is marshaled as JSON.
    Json,
}

/// Write the text with `&`, `"`, `<` and `>` replaced by HTML entities.
///
/// # Examples
///
/// ```
/// let mut buffer = String::new();
/// stache::escape::html(&mut buffer, "<b>\"Tom & Jerry\"</b>").unwrap();
///
/// assert_eq!(buffer, "&lt;b&gt;&#34;Tom &amp; Jerry&#34;&lt;/b&gt;");
/// ```
pub fn html<W>(buffer: &mut W, text: &str) -> std::fmt::Result
where
    W: Write + ?Sized,
{
    let mut last = 0;
    for (index, char) in text.char_indices() {
        let entity = match char {
            '&' => "&amp;",
            '"' => "&#34;",
            '<' => "&lt;",
            '>' => "&gt;",
            _ => continue,
        };
        buffer.write_str(&text[last..index])?;
        buffer.write_str(entity)?;
        last = index + char.len_utf8();
    }

    buffer.write_str(&text[last..])
}

/// Write the text escaped for use inside a JSON string, without surrounding
/// quotes.
///
/// # Examples
///
/// ```
/// let mut buffer = String::new();
/// stache::escape::json(&mut buffer, "say \"hi\"\n").unwrap();
///
/// assert_eq!(buffer, r#"say \"hi\"\n"#);
/// ```
pub fn json<W>(buffer: &mut W, text: &str) -> std::fmt::Result
where
    W: Write + ?Sized,
{
    let mut last = 0;
    for (index, char) in text.char_indices() {
        let short = match char {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\t' => "\\t",
            '\n' => "\\n",
            '\r' => "\\r",
            '\u{8}' => "\\b",
            '\u{c}' => "\\f",
            control if control < ' ' => "",
            _ => continue,
        };
        buffer.write_str(&text[last..index])?;
        if short.is_empty() {
            write!(buffer, "\\u{:04x}", char as u32)?;
        } else {
            buffer.write_str(short)?;
        }
        last = index + char.len_utf8();
    }

    buffer.write_str(&text[last..])
}

/// Write the value as compact JSON with sorted keys.
///
/// Strings are written escaped but unquoted, the same as [`json`].
///
/// # Errors
///
/// Returns an [`Error`] if the value cannot be serialized or the write fails.
///
/// # Examples
///
/// ```
/// use stache::Value;
/// use serde_json::json;
///
/// let mut buffer = String::new();
/// let value = Value::from(json!({"b": "beta", "a": [1, 2]}));
/// stache::escape::marshal(&mut buffer, &value).unwrap();
///
/// assert_eq!(buffer, r#"{"a":[1,2],"b":"beta"}"#);
/// ```
pub fn marshal<W>(buffer: &mut W, value: &Value) -> Result<(), Error>
where
    W: Write + ?Sized,
{
    if let Some(string) = value.dereference().and_then(Value::as_str) {
        return json(buffer, string).map_err(|_| error_write());
    }

    let text = serde_json::to_string(value)
        .map_err(|error| Error::new(ErrorKind::Serialize).with_source(error))?;

    buffer.write_str(&text).map_err(|_| error_write())
}
