/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Keys must be literals. Any other token tree is converted with
/// [`to_value`](crate::to_value), falling back to `null` if that fails; wrap negative
/// numbers and other multi-token expressions in parentheses.
///
/// ```rust
/// use serde_pivot::{json, Value};
///
/// let value = json!({ "id": 7, "tags": ["a", null], "ratio": (-0.5) });
/// assert_eq!(value.to_string(), r#"{id: 7, tags: ["a", null], ratio: -0.5}"#);
/// ```
#[macro_export]
macro_rules! json {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::List($crate::List::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List($crate::List::from(vec![$($crate::json!($elem)),*]))
    };

    ({}) => {
        $crate::Value::Map($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {
        $crate::Value::Map(
            vec![$(($key.to_string(), $crate::json!($value))),*]
                .into_iter()
                .collect::<$crate::Map>(),
        )
    };

    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    };
}
