use crate::log::{Error, ErrorKind};
use serde::{Serialize, Serializer};
use serde_json::Number;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Debug, Display, Formatter},
    sync::Arc,
};

/// Key/value storage used by [`Value::Mapping`], ordered by key.
pub type Map = BTreeMap<String, Value>;

/// The render callback handed to a [`Lambda`].
///
/// Calling it renders the given template text against the current context
/// and returns the output.
pub type Render<'a> = dyn FnMut(&str) -> Result<String, Error> + 'a;

type LambdaFn = dyn Fn(&str, &mut Render<'_>) -> Result<String, Error> + Send + Sync;

/// Data that a [`Template`][`crate::Template`] can be rendered with.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Bytes(Vec<u8>),
    Sequence(Vec<Value>),
    Mapping(Map),
    /// A host object exposing fields and zero-argument methods.
    Record(Arc<dyn Record>),
    Lambda(Lambda),
    /// A shared pointer to another value, which may be null.
    Reference(Option<Arc<Value>>),
}

impl Value {
    /// Convert any serializable type into a [`Value`].
    ///
    /// Structs and maps become [`Value::Mapping`], sequences become
    /// [`Value::Sequence`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the value cannot be serialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde::Serialize;
    /// use stache::Value;
    ///
    /// #[derive(Serialize)]
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// let value = Value::from_serialize(&User { name: "Mike".into() });
    ///
    /// assert!(value.is_ok());
    /// ```
    pub fn from_serialize<T>(value: &T) -> Result<Self, Error>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value)
            .map(Value::from)
            .map_err(|error| Error::new(ErrorKind::Serialize).with_source(error))
    }

    /// Wrap a [`Record`] implementation.
    pub fn record<R>(record: R) -> Self
    where
        R: Record + 'static,
    {
        Value::Record(Arc::new(record))
    }

    /// Wrap a closure as a [`Lambda`].
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Value;
    ///
    /// let bold = Value::lambda(|text, render| Ok(format!("<b>{}</b>", render(text)?)));
    /// ```
    pub fn lambda<F>(function: F) -> Self
    where
        F: Fn(&str, &mut Render<'_>) -> Result<String, Error> + Send + Sync + 'static,
    {
        Value::Lambda(Lambda::new(function))
    }

    /// Create a [`Value::Reference`] that points to the given value.
    pub fn reference<T>(value: T) -> Self
    where
        T: Into<Value>,
    {
        Value::Reference(Some(Arc::new(value.into())))
    }

    /// Return the string slice if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(string) => Some(string),
            _ => None,
        }
    }

    /// Follow references until a value that is not a reference is found.
    ///
    /// Returns `None` for a null reference.
    pub fn dereference(&self) -> Option<&Value> {
        let mut current = self;
        while let Value::Reference(target) = current {
            current = target.as_deref()?;
        }

        Some(current)
    }
}

/// A host object that templates can read from.
///
/// Every method has a default, so implementations only provide what they
/// expose.
///
/// # Examples
///
/// ```
/// use stache::{Error, Record, Value};
///
/// #[derive(Debug)]
/// struct User {
///     name: String,
/// }
///
/// impl Record for User {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "Name" => Some(self.name.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn method(&self, name: &str) -> Option<Result<Value, Error>> {
///         match name {
///             "Greeting" => Some(Ok(format!("hi {}", self.name).into())),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record: Debug + Send + Sync {
    /// Return the named field.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Call the named zero-argument method.
    ///
    /// `None` means there is no such method. A method that returns
    /// [`Value::Null`] produced nothing and is treated as absent.
    fn method(&self, _name: &str) -> Option<Result<Value, Error>> {
        None
    }

    /// Return true if this record is the zero value of its type.
    ///
    /// Zero records are falsy.
    fn is_zero(&self) -> bool {
        false
    }

    /// Return a representation used when the record is serialized.
    fn to_json(&self) -> Option<Value> {
        None
    }
}

/// A function value that receives unrendered section text.
#[derive(Clone)]
pub struct Lambda(Arc<LambdaFn>);

impl Lambda {
    /// Create a new [`Lambda`] from the given closure.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&str, &mut Render<'_>) -> Result<String, Error> + Send + Sync + 'static,
    {
        Self(Arc::new(function))
    }

    /// Invoke the [`Lambda`] with the raw text and a render callback.
    pub fn call(&self, text: &str, render: &mut Render<'_>) -> Result<String, Error> {
        (self.0)(text, render)
    }
}

impl Debug for Lambda {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda")
    }
}

/// Writes the value the way variables print it: lists as `[a, b]`, mappings
/// as `{k: v}`, and `Null` as nothing.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Lambda(_) | Value::Reference(None) => Ok(()),
            Value::Bool(bool) => write!(f, "{bool}"),
            Value::Number(number) => write!(f, "{number}"),
            Value::String(string) => write!(f, "{string}"),
            Value::Bytes(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Value::Sequence(sequence) => {
                write!(f, "[")?;
                let mut iter = sequence.iter();
                if let Some(item) = iter.next() {
                    write!(f, "{item}")?;
                    for item in iter {
                        write!(f, ", {item}")?;
                    }
                }
                write!(f, "]")
            }
            Value::Mapping(mapping) => {
                write!(f, "{{")?;
                let mut iter = mapping.iter();
                if let Some((key, value)) = iter.next() {
                    write!(f, "{key}: {value}")?;
                    for (key, value) in iter {
                        write!(f, ", {key}: {value}")?;
                    }
                }
                write!(f, "}}")
            }
            Value::Record(record) => match record.to_json() {
                Some(value) => write!(f, "{value}"),
                None => Ok(()),
            },
            Value::Reference(Some(target)) => write!(f, "{target}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null | Value::Lambda(_) | Value::Reference(None) => serializer.serialize_unit(),
            Value::Bool(bool) => serializer.serialize_bool(*bool),
            Value::Number(number) => number.serialize(serializer),
            Value::String(string) => serializer.serialize_str(string),
            Value::Bytes(bytes) => serializer.collect_seq(bytes),
            Value::Sequence(sequence) => serializer.collect_seq(sequence),
            Value::Mapping(mapping) => serializer.collect_map(mapping),
            Value::Record(record) => match record.to_json() {
                Some(value) => value.serialize(serializer),
                None => serializer.serialize_unit(),
            },
            Value::Reference(Some(target)) => target.serialize(serializer),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(bool) => Value::Bool(bool),
            serde_json::Value::Number(number) => Value::Number(number),
            serde_json::Value::String(string) => Value::String(string),
            serde_json::Value::Array(array) => {
                Value::Sequence(array.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => Value::Mapping(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and become [`Value::Null`].
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::from(f64::from(value))
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T> From<BTreeMap<String, T>> for Value
where
    T: Into<Value>,
{
    fn from(value: BTreeMap<String, T>) -> Self {
        Value::Mapping(
            value
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl<T> From<HashMap<String, T>> for Value
where
    T: Into<Value>,
{
    fn from(value: HashMap<String, T>) -> Self {
        Value::Mapping(
            value
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl From<Lambda> for Value {
    fn from(value: Lambda) -> Self {
        Value::Lambda(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, Value};
    use serde::Serialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug)]
    struct Point;

    impl Record for Point {
        fn to_json(&self) -> Option<Value> {
            Some(json!({"y": 2, "x": 1}).into())
        }
    }

    #[test]
    fn test_from_serialize_struct() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
            age: u32,
        }

        let value = Value::from_serialize(&User {
            name: "Mike",
            age: 30,
        })
        .unwrap();

        match value {
            Value::Mapping(mapping) => {
                assert_eq!(mapping["name"].as_str(), Some("Mike"));
                assert!(matches!(mapping["age"], Value::Number(_)));
            }
            _ => panic!("expected mapping"),
        }
    }

    #[test]
    fn test_display() {
        let value: Value = json!({"b": [1, 2], "a": null}).into();

        assert_eq!(value.to_string(), "{a: , b: [1, 2]}");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_serialize_sorted() {
        let mut map = HashMap::new();
        map.insert("zeta".to_string(), 1);
        map.insert("alpha".to_string(), 2);

        let text = serde_json::to_string(&Value::from(map)).unwrap();

        assert_eq!(text, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn test_serialize_record() {
        let text = serde_json::to_string(&Value::record(Point)).unwrap();

        assert_eq!(text, r#"{"x":1,"y":2}"#);
    }

    #[test]
    fn test_serialize_lambda_and_reference() {
        let value = Value::from(vec![
            Value::lambda(|text, _| Ok(text.to_string())),
            Value::Reference(None),
            Value::reference("a"),
        ]);

        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[null,null,"a"]"#);
    }

    #[test]
    fn test_dereference() {
        let value = Value::reference(Value::reference(7));

        assert!(matches!(value.dereference(), Some(Value::Number(_))));
        assert!(Value::Reference(None).dereference().is_none());
    }

    #[test]
    fn test_non_finite_float() {
        assert!(matches!(Value::from(f64::NAN), Value::Null));
    }
}
