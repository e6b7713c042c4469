use crate::{
    log::Error,
    value::{Map, Value},
};
use serde::Serialize;

/// Builds a mapping that a [`Template`][`crate::Template`] can be rendered with.
///
/// Plain data is inserted through [`serde`], while records and lambdas, which
/// have no serialized form, are inserted as a [`Value`].
#[derive(Debug, Default, Clone)]
pub struct Store {
    data: Map,
}

impl Store {
    /// Create a new [`Store`].
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Store;
    ///
    /// let store = Store::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self { data: Map::new() }
    }

    /// Serialize the value and insert it under the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Store;
    ///
    /// let mut store = Store::new();
    /// let result = store.insert("name", "Mike");
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let key = key.into();
        let value = Value::from_serialize(&value)
            .map_err(|error| error.with_help(format!("value for `{key}` is unserializable")))?;
        self.data.insert(key, value);

        Ok(())
    }

    /// Serialize the value and insert it under the given key.
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Store;
    ///
    /// let mut store = Store::new();
    /// store.insert_must("name", "Mike");
    /// ```
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        if let Err(error) = self.insert(key, value) {
            panic!("{error}");
        }
    }

    /// Insert a [`Value`] under the given key without serializing it.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::{Store, Value};
    ///
    /// let mut store = Store::new();
    /// store.insert_value("upper", Value::lambda(|text, _| Ok(text.to_uppercase())));
    /// ```
    #[inline]
    pub fn insert_value<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Into<Value>,
    {
        self.data.insert(key.into(), value.into());
    }

    /// Serialize the value and insert it under the given key.
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Store;
    ///
    /// let store = Store::new().with("name", "Mike");
    ///
    /// assert!(store.is_ok());
    /// ```
    #[inline]
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Serialize the value and insert it under the given key.
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Insert a [`Value`] under the given key without serializing it.
    ///
    /// Returns the `Store`, so additional methods may be chained.
    #[inline]
    pub fn with_value<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Into<Value>,
    {
        self.insert_value(key, value);

        self
    }

    /// Returns a reference to the [`Value`] corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use stache::Store;
    ///
    /// let store = Store::new().with_must("name", "Mike");
    /// let result = store.get("name");
    ///
    /// assert_eq!(result.and_then(|value| value.as_str()), Some("Mike"));
    /// ```
    #[inline]
    pub fn get(&self, index: &str) -> Option<&Value> {
        self.data.get(index)
    }
}

impl From<Store> for Value {
    fn from(store: Store) -> Self {
        Value::Mapping(store.data)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Store, Value};
    use std::collections::HashMap;

    #[test]
    fn test_store_insert() {
        let mut store = Store::new();
        store.insert_must("one", "two");

        assert!(store.get("one").is_some_and(|t| t.as_str() == Some("two")));
    }

    #[test]
    fn test_store_insert_fluent() {
        assert!(Store::new()
            .with_must("three", "four")
            .get("three")
            .is_some_and(|t| t.as_str() == Some("four")))
    }

    #[test]
    fn test_store_insert_unserializable() {
        let mut map = HashMap::new();
        map.insert(vec![1], "key is not a string");

        assert!(Store::new().insert("bad", map).is_err());
    }

    #[test]
    fn test_store_into_value() {
        let store = Store::new()
            .with_must("name", "Mike")
            .with_value("lambda", Value::lambda(|text, _| Ok(text.to_string())));

        match Value::from(store) {
            Value::Mapping(mapping) => {
                assert!(matches!(mapping["lambda"], Value::Lambda(_)));
                assert_eq!(mapping["name"].as_str(), Some("Mike"));
            }
            _ => panic!("expected mapping"),
        }
    }
}
