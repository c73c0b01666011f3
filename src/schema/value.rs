//! Attribute values exchanged between schemas, handlers and snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute map keyed by schema field name.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A single schema attribute value.
///
/// Mirrors the JSON data model; nested blocks are lists of maps. The
/// untagged representation lets whole attribute maps serialize straight
/// into `result_output_file` snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<AttrValue>),
    Map(AttrMap),
}

impl AttrValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 零值判定（`get_ok` 语义）：Null、false、0、空串、空集合都算零值。
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::Float(x) => *x == 0.0,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// List of strings, if every element is a string.
    #[must_use]
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        let items = self.as_list()?;
        items
            .iter()
            .map(|v| v.as_str().map(ToString::to_string))
            .collect()
    }

    /// Map of strings, if every entry is a string. 标签这类
    /// `map(string)` 字段用它取值。
    #[must_use]
    pub fn as_string_map(&self) -> Option<BTreeMap<String, String>> {
        let map = self.as_map()?;
        map.iter()
            .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }
}

/// First entry of a block-list attribute inside a block map.
///
/// 嵌套块在数据模型里是"map 列表"，单项块取第一项。
#[must_use]
pub fn first_block<'a>(map: &'a AttrMap, name: &str) -> Option<&'a AttrMap> {
    map.get(name)?.as_list()?.first()?.as_map()
}

/// String field of a block entry, `None` when absent or null.
#[must_use]
pub fn block_string(map: &AttrMap, name: &str) -> Option<String> {
    map.get(name)
        .filter(|v| !v.is_null())?
        .as_str()
        .map(ToString::to_string)
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for AttrValue {
    fn from(v: u64) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(v: Vec<AttrValue>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v.into_iter().map(AttrValue::String).collect())
    }
}

impl From<BTreeMap<String, String>> for AttrValue {
    fn from(v: BTreeMap<String, String>) -> Self {
        Self::Map(v.into_iter().map(|(k, s)| (k, Self::String(s))).collect())
    }
}

impl From<Vec<AttrMap>> for AttrValue {
    fn from(v: Vec<AttrMap>) -> Self {
        Self::List(v.into_iter().map(AttrValue::Map).collect())
    }
}

impl From<AttrMap> for AttrValue {
    fn from(v: AttrMap) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_untagged_round_trip() {
        let mut map = AttrMap::new();
        map.insert("domain".into(), AttrValue::from("example.com"));
        map.insert("project_id".into(), AttrValue::from(0_i64));
        map.insert("switch".into(), AttrValue::from(true));
        map.insert(
            "urls".into(),
            AttrValue::from(vec!["http://a".to_string(), "http://b".to_string()]),
        );

        let json = serde_json::to_string(&map).unwrap();
        let back: AttrMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn deserialize_json_scalars() {
        assert_eq!(serde_json::from_str::<AttrValue>("3").unwrap(), AttrValue::Int(3));
        assert_eq!(
            serde_json::from_str::<AttrValue>("3.5").unwrap(),
            AttrValue::Float(3.5)
        );
        assert_eq!(
            serde_json::from_str::<AttrValue>("true").unwrap(),
            AttrValue::Bool(true)
        );
        assert_eq!(
            serde_json::from_str::<AttrValue>("null").unwrap(),
            AttrValue::Null
        );
    }

    #[test]
    fn zero_values() {
        assert!(AttrValue::Null.is_zero());
        assert!(AttrValue::Bool(false).is_zero());
        assert!(AttrValue::Int(0).is_zero());
        assert!(AttrValue::String(String::new()).is_zero());
        assert!(AttrValue::List(vec![]).is_zero());

        assert!(!AttrValue::Bool(true).is_zero());
        assert!(!AttrValue::Int(7).is_zero());
        assert!(!AttrValue::from("x").is_zero());
    }

    #[test]
    fn string_list_accessor() {
        let v = AttrValue::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(v.as_string_list(), Some(vec!["a".to_string(), "b".to_string()]));

        let mixed = AttrValue::List(vec![AttrValue::from("a"), AttrValue::Int(1)]);
        assert_eq!(mixed.as_string_list(), None);
    }

    #[test]
    fn string_map_accessor() {
        let mut tags = BTreeMap::new();
        tags.insert("env".to_string(), "prod".to_string());
        let v = AttrValue::from(tags.clone());
        assert_eq!(v.as_string_map(), Some(tags));

        let mut mixed = AttrMap::new();
        mixed.insert("count".into(), AttrValue::Int(3));
        assert_eq!(AttrValue::Map(mixed).as_string_map(), None);
    }

    #[test]
    fn option_into_null() {
        let v: AttrValue = Option::<String>::None.into();
        assert!(v.is_null());
        let v: AttrValue = Some(42_i64).into();
        assert_eq!(v, AttrValue::Int(42));
    }
}
