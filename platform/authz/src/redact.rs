use serde_json::Value;

/// Copy of `data` with every truthy value at one of `paths` replaced by
/// `word`. Paths are dot separated; numeric segments index arrays.
pub fn redact(data: &Value, paths: &[String], word: &str) -> Value {
    let mut copy = data.clone();
    for path in paths {
        if let Some(slot) = lookup_mut(&mut copy, path) {
            if is_truthy(slot) {
                *slot = Value::String(word.to_string());
            }
        }
    }
    copy
}

fn lookup_mut<'a>(value: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |index| items.get_mut(index)),
        _ => None,
    })
}

/// `false`, `0`, `""` and `null` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
