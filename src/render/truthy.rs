use crate::value::Value;

/// Return true if the given [`Value`] is truthy.
///
/// `None` is an absent value and is falsy. Strings that contain only
/// whitespace are falsy, while any mapping is truthy, even an empty one.
pub fn is_truthy(value: Option<&Value>) -> bool {
    let Some(value) = value.and_then(Value::dereference) else {
        return false;
    };

    match value {
        Value::Null => false,
        Value::Bool(bool) => *bool,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(string) => !string.trim().is_empty(),
        Value::Bytes(bytes) => !bytes.is_empty(),
        Value::Sequence(sequence) => !sequence.is_empty(),
        Value::Mapping(_) | Value::Lambda(_) | Value::Reference(_) => true,
        Value::Record(record) => !record.is_zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::is_truthy;
    use crate::value::{Map, Record, Value};
    use serde_json::json;

    #[derive(Debug)]
    struct Settings {
        allow: bool,
    }

    impl Record for Settings {
        fn is_zero(&self) -> bool {
            !self.allow
        }
    }

    #[test]
    fn test_falsy() {
        let falsy = [
            Value::Null,
            Value::from(false),
            Value::from(0),
            Value::from(0.0),
            Value::from(""),
            Value::from("\t"),
            Value::from("  \n"),
            Value::Bytes(vec![]),
            Value::Sequence(vec![]),
            Value::Reference(None),
            Value::reference(false),
            Value::record(Settings { allow: false }),
        ];

        assert!(!is_truthy(None));
        for value in falsy {
            assert!(!is_truthy(Some(&value)), "{value:?}");
        }
    }

    #[test]
    fn test_truthy() {
        let truthy = [
            Value::from(true),
            Value::from(-1),
            Value::from(0.5),
            Value::from("Rob"),
            Value::from(json!([0])),
            Value::Mapping(Map::new()),
            Value::reference("x"),
            Value::lambda(|text, _| Ok(text.to_string())),
            Value::record(Settings { allow: true }),
        ];

        for value in truthy {
            assert!(is_truthy(Some(&value)), "{value:?}");
        }
    }
}
