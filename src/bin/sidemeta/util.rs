use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};

use SideMeta::{AttrWarning, Record};

/// "key=value" → (key, value). Value: JSON if it parses, else a plain string.
pub fn parse_field(arg: &str) -> Result<(String, Value)> {
    let (k, v) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("field must be key=value, got '{}'", arg))?;
    let k = k.trim();
    if k.is_empty() {
        return Err(anyhow!("empty field name in '{}'", arg));
    }
    let value = serde_json::from_str::<Value>(v).unwrap_or_else(|_| Value::String(v.to_string()));
    Ok((k.to_string(), value))
}

pub fn parse_fields_json(s: &str) -> Result<Map<String, Value>> {
    let v: Value = serde_json::from_str(s).context("parse fields json")?;
    match v {
        Value::Object(m) => Ok(m),
        _ => Err(anyhow!("fields json must be an object")),
    }
}

pub fn apply_fields(rec: &mut Record, fields: Map<String, Value>) {
    for (k, v) in fields {
        rec.set(&k, v);
    }
}

pub fn print_warnings(warnings: &[AttrWarning]) {
    for w in warnings {
        println!("warning: {}", w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_parse_as_json_or_string() {
        assert_eq!(parse_field("n=3").unwrap(), ("n".into(), Value::from(3)));
        assert_eq!(parse_field("c=H264").unwrap(), ("c".into(), Value::from("H264")));
        assert_eq!(parse_field("e=").unwrap(), ("e".into(), Value::from("")));
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn fields_json_must_be_object() {
        assert_eq!(parse_fields_json(r#"{"a":1}"#).unwrap().len(), 1);
        assert!(parse_fields_json("[1]").is_err());
    }
}
