//! JSON syntax of the tree form.
//!
//! Each element is an object: `"#name"` holds the element name, `"#text"`
//! its text content, `"#nodes"` its children, every other key an attribute.
//! Canonical decimal integers and booleans are emitted as JSON scalars.

use serde_json::{Map, Value};

use super::Element;
use crate::error::TreeError;

const NAME_KEY: &str = "#name";
const TEXT_KEY: &str = "#text";
const NODES_KEY: &str = "#nodes";

pub fn to_value(element: &Element) -> Value {
    let mut map = Map::new();
    map.insert(NAME_KEY.into(), Value::String(element.name.clone()));
    for (k, v) in &element.attributes {
        map.insert(k.clone(), scalar(v));
    }
    if let Some(text) = &element.text {
        map.insert(TEXT_KEY.into(), Value::String(text.clone()));
    }
    if !element.children.is_empty() {
        map.insert(
            NODES_KEY.into(),
            Value::Array(element.children.iter().map(to_value).collect()),
        );
    }
    Value::Object(map)
}

fn scalar(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    match text.parse::<u64>() {
        Ok(n) if n.to_string() == text => Value::from(n),
        _ => Value::String(text.to_string()),
    }
}

pub fn to_string(root: &Element) -> Result<String, TreeError> {
    serde_json::to_string_pretty(&to_value(root))
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| TreeError::Syntax(format!("JSON: {e}")))
}

pub fn from_value(value: &Value) -> Result<Element, TreeError> {
    let map = value
        .as_object()
        .ok_or_else(|| TreeError::Syntax("JSON: element is not an object".into()))?;
    let name = map
        .get(NAME_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| TreeError::Syntax("JSON: object without \"#name\"".into()))?;

    let mut element = Element::new(name);
    for (key, v) in map {
        match key.as_str() {
            NAME_KEY => {}
            TEXT_KEY => {
                let text = v.as_str().ok_or_else(|| {
                    TreeError::Syntax(format!("JSON: \"#text\" of <{name}> is not a string"))
                })?;
                element.text = Some(text.to_string());
            }
            NODES_KEY => {
                let nodes = v.as_array().ok_or_else(|| {
                    TreeError::Syntax(format!("JSON: \"#nodes\" of <{name}> is not an array"))
                })?;
                element.children = nodes.iter().map(from_value).collect::<Result<_, _>>()?;
            }
            attr => {
                let text = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => {
                        return Err(TreeError::invalid_value(name, attr, &v.to_string(), "scalar"));
                    }
                };
                element.attributes.push((attr.to_string(), text));
            }
        }
    }
    Ok(element)
}

pub fn parse(text: &str) -> Result<Element, TreeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| TreeError::Syntax(format!("JSON: {e}")))?;
    from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_are_typed() {
        let mut e = Element::new("content_availability_descriptor");
        e.set_bool("retention_mode", false);
        e.set_int("retention_state", 5);
        e.set_hex("id", 10, 16);
        let v = to_value(&e);
        assert_eq!(v["retention_mode"], Value::Bool(false));
        assert_eq!(v["retention_state"], Value::from(5u64));
        assert_eq!(v["id"], Value::String("0x000A".into()));
    }

    #[test]
    fn round_trip_keeps_order() {
        let mut root = Element::new("descriptor_list");
        let c = root.add_child("x");
        c.set_int("b", 1);
        c.set_attr("a", "007");
        c.add_hex_child("data", &[1, 2]);
        let text = to_string(&root).unwrap();
        assert_eq!(parse(&text).unwrap(), root);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(parse("[]").is_err());
        assert!(parse("{\"a\": 1}").is_err());
        assert!(parse("{\"#name\": \"x\", \"a\": [1]}").is_err());
        assert!(parse("{\"#name\": \"x\", \"#nodes\": {}}").is_err());
    }
}
