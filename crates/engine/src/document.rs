//! Order-preserving JSON document model.
//!
//! RFC 8259 calls an object an "unordered collection", and most decoders
//! (serde_json's `Value` included) are free to lose member order. The
//! inspection view must show the budget's fields in the order the service
//! emitted them, so the budget object is decoded into an explicit
//! member sequence instead. Names are not required to be unique.
//!
//! Classification is purely cosmetic; the exported artifact is always the
//! untouched raw payload.

use std::fmt;

use chrono::NaiveDate;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, SeqAccess, Visitor},
    ser::SerializeMap,
};

use crate::error::ResultEngine;

/// A decoded JSON value with object member order retained.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<DocValue>),
    Object(OrderedObject),
}

/// Ordered sequence of `(name, value)` members of one JSON object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedObject(pub Vec<Member>);

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub value: DocValue,
}

impl OrderedObject {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Member names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|member| member.name.as_str())
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for DocValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DocValueVisitor)
    }
}

struct DocValueVisitor;

impl<'de> Visitor<'de> for DocValueVisitor {
    type Value = DocValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DocValue::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DocValue::Number(v as f64))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DocValue::Number(v as f64))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DocValue::Number(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DocValue::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DocValue::String(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(DocValue::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(DocValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut members = Vec::new();
        while let Some((name, value)) = map.next_entry::<String, DocValue>()? {
            members.push(Member { name, value });
        }
        Ok(DocValue::Object(OrderedObject(members)))
    }
}

impl Serialize for DocValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Number(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Array(items) => items.serialize(serializer),
            Self::Object(obj) => obj.serialize(serializer),
        }
    }
}

impl Serialize for OrderedObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for member in &self.0 {
            map.serialize_entry(&member.name, &member.value)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct DetailWrapper {
    data: DetailData,
}

#[derive(Deserialize)]
struct DetailData {
    budget: DocValue,
}

/// Decodes the top-level `data.budget` object with member order preserved.
pub fn decode_budget_object(raw: &[u8]) -> ResultEngine<OrderedObject> {
    let wrapper: DetailWrapper = serde_json::from_slice(raw)?;
    match wrapper.data.budget {
        DocValue::Object(obj) => Ok(obj),
        _ => Err(<serde_json::Error as serde::de::Error>::custom("data.budget is not an object").into()),
    }
}

/// Converts a `YYYY-MM-DD` date to a short `Mon YYYY` label.
///
/// Anything that does not parse is returned unchanged.
pub fn format_month_year(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Maps a decoded value to a short display descriptor.
///
/// Pure and deterministic: classifying the same value twice yields the same
/// string.
pub fn classify(value: &DocValue) -> String {
    match value {
        DocValue::Object(obj) => match obj.0.as_slice() {
            [member] => format!("{}: {}", member.name, classify(&member.value)),
            members => format!("{{record {} fields}}", members.len()),
        },
        DocValue::Array(items) => classify_array(items),
        DocValue::String(raw) => format_month_year(raw),
        DocValue::Number(num) => {
            if num.fract() == 0.0 && num.is_finite() {
                // Formatting, not an integer cast: values past i64 range
                // must keep their magnitude.
                format!("{num:.0}")
            } else {
                format!("{num}")
            }
        }
        DocValue::Bool(v) => v.to_string(),
        DocValue::Null => "null".to_string(),
    }
}

fn classify_array(items: &[DocValue]) -> String {
    let rows = matches!(items.first(), Some(DocValue::Object(_)));
    match (items, rows) {
        ([only], _) => classify(only),
        (items, true) => format!("[table {} rows]", items.len()),
        (items, false) => format!("[list {} items]", items.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> OrderedObject {
        decode_budget_object(raw.as_bytes()).unwrap()
    }

    #[test]
    fn preserves_member_order() {
        let raw = r#"{"data":{"budget":{"zeta":1,"alpha":2,"monkey":3,"beta":4}}}"#;
        let obj = decode(raw);
        let names: Vec<&str> = obj.names().collect();
        assert_eq!(names, ["zeta", "alpha", "monkey", "beta"]);
    }

    #[test]
    fn order_survives_a_full_round_trip() {
        let raw = r#"{"data":{"budget":{"b":null,"a":[1,2],"c":{"x":true},"a":"dup"}}}"#;
        let first = decode(raw);

        // Re-encode the ordered object and decode it again; member order,
        // duplicates included, must be reproduced exactly.
        let encoded = serde_json::to_vec(&first).unwrap();
        let second: DocValue = serde_json::from_slice(&encoded).unwrap();
        let DocValue::Object(second) = second else {
            panic!("re-encoded value is not an object");
        };

        let first_names: Vec<&str> = first.names().collect();
        let second_names: Vec<&str> = second.names().collect();
        assert_eq!(first_names, ["b", "a", "c", "a"]);
        assert_eq!(first_names, second_names);
    }

    #[test]
    fn rejects_non_object_budget() {
        let raw = r#"{"data":{"budget":[1,2,3]}}"#;
        assert!(decode_budget_object(raw.as_bytes()).is_err());
    }

    #[test]
    fn classifies_records_tables_and_lists() {
        let raw = r#"{"data":{"budget":{
            "record":{"a":1,"b":2,"c":3},
            "table":[{"a":1},{"a":2}],
            "list":[1,2,3],
            "single_row":[{"inner":5}],
            "single_item":[7],
            "empty":[]
        }}}"#;
        let obj = decode(raw);
        let tokens: Vec<String> = obj.members().map(|m| classify(&m.value)).collect();
        assert_eq!(
            tokens,
            [
                "{record 3 fields}",
                "[table 2 rows]",
                "[list 3 items]",
                "inner: 5",
                "7",
                "[list 0 items]",
            ]
        );
    }

    #[test]
    fn single_member_object_renders_inline() {
        let value = DocValue::Object(OrderedObject(vec![Member {
            name: "iso_code".to_string(),
            value: DocValue::String("EUR".to_string()),
        }]));
        assert_eq!(classify(&value), "iso_code: EUR");
    }

    #[test]
    fn dates_become_month_year_labels() {
        assert_eq!(classify(&DocValue::String("2024-06-01".to_string())), "Jun 2024");
        assert_eq!(
            classify(&DocValue::String("not a date".to_string())),
            "not a date"
        );
    }

    #[test]
    fn integral_numbers_drop_the_decimal_point() {
        assert_eq!(classify(&DocValue::Number(42.0)), "42");
        assert_eq!(classify(&DocValue::Number(-3.0)), "-3");
        assert_eq!(classify(&DocValue::Number(2.5)), "2.5");
    }

    #[test]
    fn integral_numbers_past_i64_range_keep_their_magnitude() {
        assert_eq!(classify(&DocValue::Number(1e19)), "10000000000000000000");
        assert_eq!(classify(&DocValue::Number(-1e19)), "-10000000000000000000");
    }

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(classify(&DocValue::Bool(true)), "true");
        assert_eq!(classify(&DocValue::Bool(false)), "false");
        assert_eq!(classify(&DocValue::Null), "null");
    }

    #[test]
    fn classification_is_idempotent() {
        let raw = r#"{"data":{"budget":{"months":[{"m":1},{"m":2}],"first_month":"2020-01-01"}}}"#;
        let obj = decode(raw);
        for member in obj.members() {
            assert_eq!(classify(&member.value), classify(&member.value));
        }
    }
}
