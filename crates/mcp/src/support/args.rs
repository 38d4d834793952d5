#![forbid(unsafe_code)]

use super::ai::ai_error;
use serde_json::Value;

pub(crate) type ArgsMap = serde_json::Map<String, Value>;

pub(crate) fn args_object(args: &Value) -> Result<&ArgsMap, Value> {
    args.as_object()
        .ok_or_else(|| ai_error("INVALID_INPUT", "arguments must be an object"))
}

pub(crate) fn require_string(args: &ArgsMap, key: &str) -> Result<String, Value> {
    let Some(v) = args.get(key).and_then(|v| v.as_str()) else {
        return Err(ai_error("INVALID_INPUT", &format!("{key} is required")));
    };
    Ok(v.to_string())
}

pub(crate) fn require_nonempty_string(args: &ArgsMap, key: &str) -> Result<String, Value> {
    let value = require_string(args, key)?;
    if value.trim().is_empty() {
        return Err(ai_error("INVALID_INPUT", &format!("{key} must not be empty")));
    }
    Ok(value)
}

pub(crate) fn optional_string(args: &ArgsMap, key: &str) -> Result<Option<String>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::String(v) => Ok(Some(v.to_string())),
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a string"),
        )),
    }
}

pub(crate) fn require_bool(args: &ArgsMap, key: &str) -> Result<bool, Value> {
    match args.get(key) {
        Some(Value::Bool(v)) => Ok(*v),
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} is required and must be a boolean"),
        )),
    }
}

pub(crate) fn optional_bool(args: &ArgsMap, key: &str) -> Result<Option<bool>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Bool(v) => Ok(Some(*v)),
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a boolean"),
        )),
    }
}

pub(crate) fn optional_usize(args: &ArgsMap, key: &str) -> Result<Option<usize>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_u64() {
            Some(v) => Ok(Some(v as usize)),
            None => Err(ai_error(
                "INVALID_INPUT",
                &format!("{key} must be a non-negative integer"),
            )),
        },
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be an integer"),
        )),
    }
}

pub(crate) fn require_string_list(args: &ArgsMap, key: &str) -> Result<Vec<String>, Value> {
    let Some(Value::Array(items)) = args.get(key) else {
        return Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} is required and must be an array of strings"),
        ));
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Some(v) = item.as_str() else {
            return Err(ai_error(
                "INVALID_INPUT",
                &format!("{key} must contain only strings"),
            ));
        };
        out.push(v.to_string());
    }
    Ok(out)
}
