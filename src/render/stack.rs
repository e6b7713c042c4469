use crate::{log::Error, value::Value};
use std::borrow::Cow;
use tracing::trace;

/// The layered context a template is rendered against.
///
/// Names are searched from the most recently pushed frame down to the first
/// root.
#[derive(Debug)]
pub struct Stack<'root> {
    frames: Vec<Cow<'root, Value>>,
}

impl<'root> Stack<'root> {
    /// Create a new [`Stack`] with one frame per root, in order.
    ///
    /// The last root is searched first.
    #[inline]
    pub fn new(roots: &'root [Value]) -> Self {
        Self {
            frames: roots.iter().map(Cow::Borrowed).collect(),
        }
    }

    /// Push a new frame onto the [`Stack`].
    #[inline]
    pub fn push(&mut self, value: Value) {
        self.frames.push(Cow::Owned(value));
    }

    /// Remove the top frame from the [`Stack`].
    #[inline]
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Return the top frame.
    #[inline]
    pub fn top(&self) -> Option<&Value> {
        self.frames.last().map(AsRef::as_ref)
    }

    /// Resolve a dotted name.
    ///
    /// The first segment is searched for frame by frame, the rest are looked
    /// up only inside the value found. `.` is the top frame itself.
    ///
    /// # Errors
    ///
    /// Propagates an [`Error`] returned by a record method.
    pub fn resolve(&self, name: &str) -> Result<Option<Value>, Error> {
        if name == "." {
            return Ok(self.top().cloned().and_then(into_target));
        }

        let mut segments = name.split('.');
        let first = segments.next().unwrap_or_default();

        let mut current = None;
        for frame in self.frames.iter().rev() {
            if let Some(value) = lookup(frame, first)? {
                current = Some(value);
                break;
            }
        }
        let Some(mut current) = current else {
            trace!(key = name, "unresolved name");
            return Ok(None);
        };

        for segment in segments {
            match lookup(&current, segment)? {
                Some(value) => current = value,
                None => {
                    trace!(key = name, segment, "unresolved segment");
                    return Ok(None);
                }
            }
        }

        Ok(into_target(current))
    }
}

/// Look up a single name inside a value.
///
/// Mapping keys are checked first, then record fields, then record methods.
/// References are followed, and a null reference has nothing inside it.
fn lookup(value: &Value, key: &str) -> Result<Option<Value>, Error> {
    match value.dereference() {
        Some(Value::Mapping(mapping)) => Ok(mapping.get(key).cloned()),
        Some(Value::Record(record)) => {
            if let Some(field) = record.field(key) {
                return Ok(Some(field));
            }
            match record.method(key) {
                Some(Ok(Value::Null)) | None => Ok(None),
                Some(result) => result.map(Some),
            }
        }
        _ => Ok(None),
    }
}

/// Follow references, producing `None` for a null reference.
fn into_target(value: Value) -> Option<Value> {
    match value {
        Value::Reference(_) => value.dereference().cloned(),
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::Stack;
    use crate::{
        log::{Error, ErrorKind},
        value::{Record, Value},
    };
    use serde_json::json;

    #[derive(Debug)]
    struct User {
        name: &'static str,
    }

    impl Record for User {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "Name" => Some(self.name.into()),
                _ => None,
            }
        }

        fn method(&self, name: &str) -> Option<Result<Value, Error>> {
            match name {
                "Func1" => Some(Ok(self.name.into())),
                "Func4" => Some(Ok(Value::Null)),
                "Fail" => Some(Err(Error::build("method failed"))),
                _ => None,
            }
        }
    }

    fn text(value: Option<Value>) -> Option<String> {
        value.map(|value| value.to_string())
    }

    #[test]
    fn test_resolve_order() {
        let roots = [
            Value::from(json!({"name": "first", "only": "root"})),
            Value::from(json!({"name": "second"})),
        ];
        let mut stack = Stack::new(&roots);

        assert_eq!(text(stack.resolve("name").unwrap()), Some("second".into()));
        assert_eq!(text(stack.resolve("only").unwrap()), Some("root".into()));

        stack.push(json!({"name": "pushed"}).into());
        assert_eq!(text(stack.resolve("name").unwrap()), Some("pushed".into()));

        stack.pop();
        assert_eq!(text(stack.resolve("name").unwrap()), Some("second".into()));
    }

    #[test]
    fn test_resolve_dotted_no_fallback() {
        let roots = [Value::from(json!({
            "a": {"b": {}},
            "b": {"c": "ERROR"},
        }))];
        let mut stack = Stack::new(&roots);
        stack.push(json!({"b": {}}).into());

        assert!(stack.resolve("b.c").unwrap().is_none());
        assert_eq!(text(stack.resolve("a.b").unwrap()), Some("{}".into()));
    }

    #[test]
    fn test_resolve_implicit_iterator() {
        let roots = [Value::from("Rob")];
        let stack = Stack::new(&roots);

        assert_eq!(text(stack.resolve(".").unwrap()), Some("Rob".into()));
    }

    #[test]
    fn test_resolve_record() {
        let roots = [Value::record(User { name: "Mike" })];
        let stack = Stack::new(&roots);

        assert_eq!(text(stack.resolve("Name").unwrap()), Some("Mike".into()));
        assert_eq!(text(stack.resolve("Func1").unwrap()), Some("Mike".into()));
        assert!(stack.resolve("Func4").unwrap().is_none());
        assert!(stack.resolve("dne").unwrap().is_none());

        let error = stack.resolve("Fail").unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::Custom("method failed".into()));
    }

    #[test]
    fn test_resolve_reference() {
        let roots = [Value::from(json!({"user": null}))];
        let mut stack = Stack::new(&roots);
        stack.push(
            Value::Mapping(
                [
                    ("user".to_string(), Value::reference(json!({"name": "Joe"}))),
                    ("none".to_string(), Value::Reference(None)),
                ]
                .into_iter()
                .collect(),
            ),
        );

        assert_eq!(text(stack.resolve("user.name").unwrap()), Some("Joe".into()));
        assert!(stack.resolve("none").unwrap().is_none());
        assert!(stack.resolve("none.name").unwrap().is_none());
    }
}
