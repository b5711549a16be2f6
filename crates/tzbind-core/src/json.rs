//! JSON form of value trees
//!
//! Node RPCs exchange trees as JSON:
//!
//! - `{"int": "42"}` (decimal string)
//! - `{"string": "text"}`
//! - `{"bytes": "00ff"}` (hex)
//! - `[ … ]` for sequences
//! - `{"prim": "Pair", "args": [ … ], "annots": [ … ]}` for applications

use crate::error::{BindError, Result};
use crate::prim::{OpCode, Prim};
use num_bigint::BigInt;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

impl Prim {
    /// Convert to the JSON form
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(v) => json!({ "int": v.to_string() }),
            Self::String(s) => json!({ "string": s }),
            Self::Bytes(b) => json!({ "bytes": hex::encode(b) }),
            Self::Seq(children) => Value::Array(children.iter().map(Self::to_json).collect()),
            Self::App { op, args, annots } => {
                let mut obj = Map::new();
                obj.insert("prim".to_string(), Value::String(op.name().to_string()));
                if !args.is_empty() {
                    obj.insert(
                        "args".to_string(),
                        Value::Array(args.iter().map(Self::to_json).collect()),
                    );
                }
                if !annots.is_empty() {
                    obj.insert("annots".to_string(), json!(annots));
                }
                Value::Object(obj)
            }
        }
    }

    /// Parse the JSON form
    pub fn from_json(value: &Value) -> Result<Self> {
        let bad = |what: &str| BindError::InvalidEncoding(format!("json tree: {}", what));
        match value {
            Value::Array(items) => items.iter().map(Self::from_json).collect::<Result<_>>().map(Self::Seq),
            Value::Object(obj) => {
                if let Some(v) = obj.get("int") {
                    let text = v.as_str().ok_or_else(|| bad("int must be a string"))?;
                    return text
                        .parse::<BigInt>()
                        .map(Self::Int)
                        .map_err(|e| bad(&format!("int '{}': {}", text, e)));
                }
                if let Some(v) = obj.get("string") {
                    return v
                        .as_str()
                        .map(Self::string)
                        .ok_or_else(|| bad("string must be a string"));
                }
                if let Some(v) = obj.get("bytes") {
                    let text = v.as_str().ok_or_else(|| bad("bytes must be a string"))?;
                    return hex::decode(text)
                        .map(Self::Bytes)
                        .map_err(|e| bad(&format!("bytes '{}': {}", text, e)));
                }
                let name = obj
                    .get("prim")
                    .and_then(Value::as_str)
                    .ok_or_else(|| bad("object is not a tree node"))?;
                let op = OpCode::from_name(name).ok_or_else(|| bad(&format!("unknown prim '{}'", name)))?;
                let args = match obj.get("args") {
                    Some(Value::Array(items)) => {
                        items.iter().map(Self::from_json).collect::<Result<Vec<_>>>()?
                    }
                    Some(_) => return Err(bad("args must be an array")),
                    None => Vec::new(),
                };
                let annots = match obj.get("annots") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|a| a.as_str().map(str::to_string).ok_or_else(|| bad("annots must be strings")))
                        .collect::<Result<Vec<_>>>()?,
                    Some(_) => return Err(bad("annots must be an array")),
                    None => Vec::new(),
                };
                Ok(Self::App { op, args, annots })
            }
            _ => Err(bad("expected object or array")),
        }
    }
}

impl Serialize for Prim {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Prim {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codec;

    #[test]
    fn test_parse_node_response() {
        let text = r#"{"prim":"Pair","args":[{"bytes":"00ff"},[{"int":"-12"},{"string":"x"}]],"annots":["%p"]}"#;
        let prim: Prim = serde_json::from_str(text).unwrap();
        assert_eq!(
            prim,
            Prim::App {
                op: OpCode::Pair,
                args: vec![
                    Prim::bytes(vec![0x00, 0xff]),
                    Prim::seq(vec![Prim::int(-12), Prim::string("x")])
                ],
                annots: vec!["%p".to_string()],
            }
        );
        let reparsed: Prim = serde_json::from_str(&serde_json::to_string(&prim).unwrap()).unwrap();
        assert_eq!(reparsed, prim);
    }

    #[test]
    fn test_int_beyond_machine_width() {
        let text = r#"{"int":"340282366920938463463374607431768211456"}"#;
        let prim: Prim = serde_json::from_str(text).unwrap();
        assert_eq!(prim, Prim::Int(BigInt::from(1u8) << 128));
        assert_eq!(serde_json::to_string(&prim).unwrap(), text);
    }

    #[test]
    fn test_code_round_trips() {
        let text = r#"[{"prim":"DROP"},{"prim":"UNIT"}]"#;
        let prim: Prim = serde_json::from_str(text).unwrap();
        assert_eq!(
            prim,
            Prim::seq(vec![
                Prim::app(OpCode::IDrop, vec![]),
                Prim::app(OpCode::IUnit, vec![])
            ])
        );
        let lambda = crate::codec::Lambda::decode(&prim).unwrap();
        let back = lambda.encode(true).unwrap().to_json();
        assert_eq!(back.to_string(), text);
    }

    #[test]
    fn test_rejects_unknown_prim() {
        let err = serde_json::from_str::<Prim>(r#"{"prim":"NOPE"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown prim"), "{}", err);
    }
}
