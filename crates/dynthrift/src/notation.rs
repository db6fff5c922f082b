//! Typed JSON notation for dynamic values.
//!
//! Every value is a single-key object naming its variant, so the wire type
//! never has to be guessed from JSON:
//!
//! ```text
//! {"bool": true}
//! {"string": "x"}
//! {"enum": 3}
//! {"list": {"elem": "string", "values": [{"string": "a"}]}}
//! {"map": {"key": "string", "value": "bool", "entries": [[{"string": "k"}, {"bool": true}]]}}
//! {"struct": [{"id": 1, "name": "n", "value": {"enum": 7}}]}
//! ```
//!
//! Call arguments are an object from field id to value: `{"1": {"string": "ID"}}`.

use std::collections::{BTreeMap, BTreeSet};

use dynthrift::protocol::TType;
use dynthrift::value::{FieldKey, Request, Response, Value};
use serde::{Deserialize, Serialize};

use crate::exit::{CliError, CliResult, USAGE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    Bool(bool),
    String(String),
    Enum(i32),
    List(ListNotation),
    Map(MapNotation),
    Struct(Vec<FieldNotation>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListNotation {
    pub elem: String,
    pub values: Vec<Notation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapNotation {
    pub key: String,
    pub value: String,
    pub entries: Vec<(Notation, Notation)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldNotation {
    pub id: i16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub value: Notation,
}

impl Notation {
    /// Convert to a [`Value`], checking that every element matches the
    /// declared container types.
    pub fn into_value(self) -> CliResult<Value> {
        Ok(match self {
            Notation::Bool(value) => Value::Bool(value),
            Notation::String(value) => Value::String(value),
            Notation::Enum(value) => Value::Enum(value),
            Notation::List(list) => {
                let elem = parse_ttype(&list.elem)?;
                let mut items = Vec::with_capacity(list.values.len());
                for (index, item) in list.values.into_iter().enumerate() {
                    let item = typed(item.into_value()?, elem, || format!("list element {index}"))?;
                    items.push(item);
                }
                Value::list(elem, items)
            }
            Notation::Map(map) => {
                let key_type = parse_ttype(&map.key)?;
                let value_type = parse_ttype(&map.value)?;
                let mut entries = Vec::with_capacity(map.entries.len());
                for (index, (key, value)) in map.entries.into_iter().enumerate() {
                    let key = typed(key.into_value()?, key_type, || format!("map key {index}"))?;
                    let value =
                        typed(value.into_value()?, value_type, || format!("map value {index}"))?;
                    entries.push((key, value));
                }
                Value::map(key_type, value_type, entries)
            }
            Notation::Struct(fields) => {
                let mut seen = BTreeSet::new();
                let mut converted = Vec::with_capacity(fields.len());
                for field in fields {
                    if !seen.insert(field.id) {
                        return Err(CliError::new(
                            USAGE,
                            format!("struct field id {} appears more than once", field.id),
                        ));
                    }
                    let key = FieldKey::new(field.id, field.name);
                    converted.push((key, field.value.into_value()?));
                }
                Value::structure(converted)
            }
        })
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(value) => Notation::Bool(*value),
            Value::String(value) => Notation::String(value.clone()),
            Value::Enum(value) => Notation::Enum(*value),
            Value::List(list) => Notation::List(ListNotation {
                elem: list.elem_type().name().to_string(),
                values: list.iter().map(Notation::from_value).collect(),
            }),
            Value::Map(map) => {
                let mut entries: Vec<(&Value, &Value)> = map.iter().collect();
                entries.sort_by_cached_key(|(key, _)| key.to_string());
                Notation::Map(MapNotation {
                    key: map.key_type().name().to_string(),
                    value: map.value_type().name().to_string(),
                    entries: entries
                        .into_iter()
                        .map(|(key, value)| {
                            (Notation::from_value(key), Notation::from_value(value))
                        })
                        .collect(),
                })
            }
            Value::Struct(value) => Notation::Struct(
                value
                    .iter()
                    .map(|(key, value)| FieldNotation {
                        id: key.id,
                        name: key.name.clone(),
                        value: Notation::from_value(value),
                    })
                    .collect(),
            ),
        }
    }
}

/// Parse call arguments written as `{"<field id>": <value>, ...}`.
pub fn parse_args(json: &str) -> CliResult<Request> {
    let fields: BTreeMap<String, Notation> = serde_json::from_str(json)
        .map_err(|err| CliError::new(USAGE, format!("arguments are not valid notation: {err}")))?;

    let mut request = Request::new();
    for (key, notation) in fields {
        let id: i16 = key.trim().parse().map_err(|_| {
            CliError::new(USAGE, format!("argument key {key:?} is not a field id"))
        })?;
        request.add(id, notation.into_value()?);
    }
    Ok(request)
}

pub fn response_notation(response: &Response) -> BTreeMap<i16, Notation> {
    response
        .values()
        .iter()
        .map(|(&id, value)| (id, Notation::from_value(value)))
        .collect()
}

fn parse_ttype(name: &str) -> CliResult<TType> {
    name.parse::<TType>()
        .map_err(|err| CliError::new(USAGE, err.to_string()))
}

fn typed<F: FnOnce() -> String>(value: Value, expected: TType, what: F) -> CliResult<Value> {
    if value.ttype() == expected {
        return Ok(value);
    }
    Err(CliError::new(
        USAGE,
        format!("{} is {}, declared {expected}", what(), value.type_name()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notation(json: &str) -> Notation {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_simple_args() {
        let request = parse_args(r#"{"1": {"string": "ID"}}"#).unwrap();
        assert_eq!(request.len(), 1);
        assert_eq!(request.values().get(&1), Some(&Value::from("ID")));
    }

    #[test]
    fn parses_nested_containers() {
        let value = notation(
            r#"{"map": {"key": "string", "value": "struct", "entries": [
                [{"string": "inner"}, {"struct": [
                    {"id": 2, "value": {"enum": 7}},
                    {"id": 1, "name": "leaf", "value": {"list": {"elem": "bool", "values": [{"bool": true}]}}}
                ]}]
            ]}}"#,
        )
        .into_value()
        .unwrap();

        let leaf = Value::structure([
            (
                FieldKey::new(1, "leaf"),
                Value::list(TType::Bool, [Value::Bool(true)]),
            ),
            (FieldKey::unnamed(2), Value::Enum(7)),
        ]);
        let expected = Value::map(TType::String, TType::Struct, [(Value::from("inner"), leaf)]);
        assert_eq!(value, expected);
    }

    #[test]
    fn rejects_element_type_mismatch() {
        let err = notation(r#"{"list": {"elem": "bool", "values": [{"bool": true}, {"string": "x"}]}}"#)
            .into_value()
            .unwrap_err();
        assert_eq!(err.code, USAGE);
        assert_eq!(err.message, "list element 1 is string, declared bool");
    }

    #[test]
    fn rejects_unknown_type_name() {
        let err = notation(r#"{"list": {"elem": "text", "values": []}}"#)
            .into_value()
            .unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn accepts_type_aliases() {
        let value = notation(r#"{"list": {"elem": "enum", "values": [{"enum": 1}]}}"#)
            .into_value()
            .unwrap();
        assert_eq!(value, Value::list(TType::I32, [Value::Enum(1)]));
    }

    #[test]
    fn rejects_duplicate_struct_ids() {
        let err = notation(
            r#"{"struct": [{"id": 1, "value": {"bool": true}}, {"id": 1, "value": {"bool": false}}]}"#,
        )
        .into_value()
        .unwrap_err();
        assert!(err.message.contains("more than once"));
    }

    #[test]
    fn rejects_bad_argument_keys() {
        assert_eq!(parse_args(r#"{"one": {"bool": true}}"#).unwrap_err().code, USAGE);
        assert_eq!(parse_args(r#"{"1": true}"#).unwrap_err().code, USAGE);
        assert_eq!(parse_args("not json").unwrap_err().code, USAGE);
    }

    #[test]
    fn renders_values_deterministically() {
        let map = Value::map(
            TType::String,
            TType::Bool,
            [
                (Value::from("key 2"), Value::Bool(false)),
                (Value::from("key 1"), Value::Bool(true)),
            ],
        );
        let json = serde_json::to_string(&Notation::from_value(&map)).unwrap();
        assert_eq!(
            json,
            r#"{"map":{"key":"string","value":"bool","entries":[[{"string":"key 1"},{"bool":true}],[{"string":"key 2"},{"bool":false}]]}}"#
        );
    }

    #[test]
    fn response_notation_round_trips() {
        let mut response = Response::new();
        response.add(0, Value::from("Success: ID"));
        response.add(
            1,
            Value::structure([(FieldKey::unnamed(1), Value::Enum(6))]),
        );

        let json = serde_json::to_string(&response_notation(&response)).unwrap();
        assert_eq!(
            json,
            r#"{"0":{"string":"Success: ID"},"1":{"struct":[{"id":1,"value":{"enum":6}}]}}"#
        );

        let request = parse_args(&json).unwrap();
        assert_eq!(request.values(), response.values());
    }
}
