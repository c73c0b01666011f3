//! Declarative field schemas: types, flags, defaults and validators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::value::{AttrMap, AttrValue};

/// Wire-level type of a schema field.
///
/// Nested blocks are declared as [`FieldType::List`] with a block element
/// (single blocks additionally cap `max_items` at 1); [`FieldType::Map`]
/// is reserved for string maps such as `tags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    String,
    List,
    /// Unordered collection; change detection ignores element order.
    Set,
    Map,
}

impl FieldType {
    pub(crate) fn expects(self) -> &'static str {
        match self {
            Self::Bool => "a boolean",
            Self::Int => "an integer",
            Self::Float => "a float",
            Self::String => "a string",
            Self::List => "a list",
            Self::Set => "a set",
            Self::Map => "a string map",
        }
    }
}

/// Declarative value validator attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// String byte length within `min..=max`.
    StringLength { min: usize, max: usize },
    /// Integer within `min..=max`.
    IntRange { min: i64, max: i64 },
    /// String drawn from a fixed vocabulary.
    AllowedValues(&'static [&'static str]),
    /// Integer TCP/UDP port (1..=65535).
    Port,
    /// String port or `start-end` port span.
    PortRange,
    /// String IPv4/IPv6 address.
    Ip,
}

impl Validation {
    #[must_use]
    pub fn string_length(min: usize, max: usize) -> Self {
        Self::StringLength { min, max }
    }

    #[must_use]
    pub fn int_range(min: i64, max: i64) -> Self {
        Self::IntRange { min, max }
    }

    #[must_use]
    pub fn allowed(values: &'static [&'static str]) -> Self {
        Self::AllowedValues(values)
    }

    fn check_port(field: &str, value: i64) -> Result<(), SchemaError> {
        if (1..=65_535).contains(&value) {
            Ok(())
        } else {
            Err(SchemaError::InvalidValue {
                field: field.to_string(),
                detail: format!("port {value} outside 1-65535"),
            })
        }
    }

    pub(crate) fn apply(&self, field: &str, value: &AttrValue) -> Result<(), SchemaError> {
        match self {
            Self::StringLength { min, max } => {
                let s = value.as_str().unwrap_or_default();
                if s.len() < *min || s.len() > *max {
                    return Err(SchemaError::InvalidValue {
                        field: field.to_string(),
                        detail: format!("length {} outside {min}-{max}", s.len()),
                    });
                }
                Ok(())
            }
            Self::IntRange { min, max } => {
                let n = value.as_int().unwrap_or_default();
                if n < *min || n > *max {
                    return Err(SchemaError::InvalidValue {
                        field: field.to_string(),
                        detail: format!("value {n} outside {min}-{max}"),
                    });
                }
                Ok(())
            }
            Self::AllowedValues(allowed) => {
                let s = value.as_str().unwrap_or_default();
                if allowed.contains(&s) {
                    Ok(())
                } else {
                    Err(SchemaError::InvalidValue {
                        field: field.to_string(),
                        detail: format!("'{s}' not in {allowed:?}"),
                    })
                }
            }
            Self::Port => Self::check_port(field, value.as_int().unwrap_or_default()),
            Self::PortRange => {
                let s = value.as_str().unwrap_or_default();
                let (start, end) = match s.split_once('-') {
                    Some((a, b)) => (a, b),
                    None => (s, s),
                };
                let parse = |p: &str| {
                    p.parse::<i64>().map_err(|_| SchemaError::InvalidValue {
                        field: field.to_string(),
                        detail: format!("'{s}' is not a port or port range"),
                    })
                };
                let (start, end) = (parse(start)?, parse(end)?);
                Self::check_port(field, start)?;
                Self::check_port(field, end)?;
                if start > end {
                    return Err(SchemaError::InvalidValue {
                        field: field.to_string(),
                        detail: format!("range '{s}' is reversed"),
                    });
                }
                Ok(())
            }
            Self::Ip => {
                let s = value.as_str().unwrap_or_default();
                if s.parse::<std::net::IpAddr>().is_ok() {
                    Ok(())
                } else {
                    Err(SchemaError::InvalidValue {
                        field: field.to_string(),
                        detail: format!("'{s}' is not an IP address"),
                    })
                }
            }
        }
    }
}

/// Element declaration for list/set fields.
#[derive(Debug, Clone)]
pub enum Elem {
    /// Scalar elements, optionally validated.
    Scalar(FieldSchema),
    /// Nested block elements with their own schema.
    Block(Schema),
}

/// Declaration of one schema field.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub field_type: FieldType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing this field forces resource replacement.
    pub force_new: bool,
    /// Never echoed back by reads or logs.
    pub sensitive: bool,
    pub default: Option<AttrValue>,
    pub validations: Vec<Validation>,
    pub elem: Option<Box<Elem>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub description: &'static str,
}

impl FieldSchema {
    fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            validations: Vec::new(),
            elem: None,
            min_items: None,
            max_items: None,
            description: "",
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::of(FieldType::String)
    }

    #[must_use]
    pub fn int() -> Self {
        Self::of(FieldType::Int)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::of(FieldType::Bool)
    }

    #[must_use]
    pub fn float() -> Self {
        Self::of(FieldType::Float)
    }

    /// String-to-string map (tags).
    #[must_use]
    pub fn string_map() -> Self {
        Self::of(FieldType::Map)
    }

    #[must_use]
    pub fn list(elem: FieldSchema) -> Self {
        let mut f = Self::of(FieldType::List);
        f.elem = Some(Box::new(Elem::Scalar(elem)));
        f
    }

    #[must_use]
    pub fn set(elem: FieldSchema) -> Self {
        let mut f = Self::of(FieldType::Set);
        f.elem = Some(Box::new(Elem::Scalar(elem)));
        f
    }

    /// List of nested blocks.
    #[must_use]
    pub fn block_list(block: Schema) -> Self {
        let mut f = Self::of(FieldType::List);
        f.elem = Some(Box::new(Elem::Block(block)));
        f
    }

    /// Unordered collection of nested blocks.
    #[must_use]
    pub fn block_set(block: Schema) -> Self {
        let mut f = Self::of(FieldType::Set);
        f.elem = Some(Box::new(Elem::Block(block)));
        f
    }

    /// Single nested block (list capped at one element).
    #[must_use]
    pub fn block(block: Schema) -> Self {
        Self::block_list(block).max_items(1)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    #[must_use]
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<AttrValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn validate(mut self, validation: Validation) -> Self {
        self.validations.push(validation);
        self
    }

    #[must_use]
    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    #[must_use]
    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    #[must_use]
    pub fn desc(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Shape check only: the value's type matches the declaration.
    pub(crate) fn check_type(&self, field: &str, value: &AttrValue) -> Result<(), SchemaError> {
        if value.is_null() {
            return Ok(());
        }
        let mismatch = || SchemaError::TypeMismatch {
            field: field.to_string(),
            expected: self.field_type.expects(),
        };
        match self.field_type {
            FieldType::Bool => value.as_bool().map(|_| ()).ok_or_else(mismatch),
            FieldType::Int => value.as_int().map(|_| ()).ok_or_else(mismatch),
            FieldType::Float => value.as_float().map(|_| ()).ok_or_else(mismatch),
            FieldType::String => value.as_str().map(|_| ()).ok_or_else(mismatch),
            FieldType::Map => {
                let map = value.as_map().ok_or_else(mismatch)?;
                for (key, v) in map {
                    if v.as_str().is_none() {
                        return Err(SchemaError::TypeMismatch {
                            field: format!("{field}.{key}"),
                            expected: "a string",
                        });
                    }
                }
                Ok(())
            }
            FieldType::List | FieldType::Set => {
                let items = value.as_list().ok_or_else(mismatch)?;
                match self.elem.as_deref() {
                    Some(Elem::Scalar(elem)) => {
                        for (i, item) in items.iter().enumerate() {
                            elem.check_type(&format!("{field}.{i}"), item)?;
                        }
                    }
                    Some(Elem::Block(block)) => {
                        for (i, item) in items.iter().enumerate() {
                            let map = item.as_map().ok_or_else(|| SchemaError::TypeMismatch {
                                field: format!("{field}.{i}"),
                                expected: "a block",
                            })?;
                            block.check_types(&format!("{field}.{i}"), map)?;
                        }
                    }
                    None => {}
                }
                Ok(())
            }
        }
    }

    /// Full check: shape, item counts, validators, nested blocks.
    pub(crate) fn check_value(&self, field: &str, value: &AttrValue) -> Result<(), SchemaError> {
        if value.is_null() {
            return Ok(());
        }
        self.check_type(field, value)?;

        if let Some(items) = value.as_list() {
            if let Some(min) = self.min_items
                && items.len() < min
            {
                return Err(SchemaError::InvalidValue {
                    field: field.to_string(),
                    detail: format!("needs at least {min} items, got {}", items.len()),
                });
            }
            if let Some(max) = self.max_items
                && items.len() > max
            {
                return Err(SchemaError::InvalidValue {
                    field: field.to_string(),
                    detail: format!("allows at most {max} items, got {}", items.len()),
                });
            }
            match self.elem.as_deref() {
                Some(Elem::Scalar(elem)) => {
                    for (i, item) in items.iter().enumerate() {
                        for v in &elem.validations {
                            v.apply(&format!("{field}.{i}"), item)?;
                        }
                    }
                }
                Some(Elem::Block(block)) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Some(map) = item.as_map() {
                            block.validate_config_at(&format!("{field}.{i}"), map)?;
                        }
                    }
                }
                None => {}
            }
        }

        for v in &self.validations {
            v.apply(field, value)?;
        }
        Ok(())
    }
}

/// Field declarations for one resource or data source.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<String, FieldSchema>,
}

impl Schema {
    #[must_use]
    pub fn new(fields: impl IntoIterator<Item = (&'static str, FieldSchema)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, f)| (name.to_string(), f))
                .collect(),
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSchema)> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate a caller-supplied configuration against the declarations.
    pub fn validate_config(&self, config: &AttrMap) -> Result<(), SchemaError> {
        self.validate_config_at("", config)
    }

    fn prefixed(prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }

    pub(crate) fn validate_config_at(&self, prefix: &str, config: &AttrMap) -> Result<(), SchemaError> {
        for key in config.keys() {
            if !self.fields.contains_key(key) {
                return Err(SchemaError::UnknownField(Self::prefixed(prefix, key)));
            }
        }
        for (name, field) in &self.fields {
            let path = Self::prefixed(prefix, name);
            match config.get(name) {
                None | Some(AttrValue::Null) => {
                    if field.required {
                        return Err(SchemaError::MissingRequired(path));
                    }
                }
                Some(value) => {
                    if field.computed && !field.required && !field.optional {
                        return Err(SchemaError::InvalidValue {
                            field: path,
                            detail: "attribute is read-only".to_string(),
                        });
                    }
                    field.check_value(&path, value)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn check_types(&self, prefix: &str, config: &AttrMap) -> Result<(), SchemaError> {
        for (key, value) in config {
            let path = Self::prefixed(prefix, key);
            let Some(field) = self.fields.get(key) else {
                return Err(SchemaError::UnknownField(path));
            };
            field.check_type(&path, value)?;
        }
        Ok(())
    }

    /// Fill declared defaults for absent optional fields, recursing into
    /// present blocks.
    pub fn apply_defaults(&self, config: &mut AttrMap) {
        for (name, field) in &self.fields {
            let absent = config.get(name).is_none_or(AttrValue::is_null);
            if absent {
                if let Some(default) = &field.default {
                    config.insert(name.clone(), default.clone());
                }
                continue;
            }
            if let Some(Elem::Block(block)) = field.elem.as_deref()
                && let Some(AttrValue::List(items)) = config.get_mut(name)
            {
                for item in items {
                    if let AttrValue::Map(map) = item {
                        block.apply_defaults(map);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new([
            ("domain", FieldSchema::string().required().force_new()),
            (
                "service_type",
                FieldSchema::string()
                    .required()
                    .validate(Validation::allowed(&["web", "download", "media"])),
            ),
            (
                "project_id",
                FieldSchema::int().optional().default_value(0_i64),
            ),
            (
                "ttl",
                FieldSchema::int()
                    .optional()
                    .validate(Validation::int_range(60, 604_800)),
            ),
            ("status", FieldSchema::string().computed()),
            (
                "origin",
                FieldSchema::block(Schema::new([
                    (
                        "origin_list",
                        FieldSchema::list(FieldSchema::string()).required(),
                    ),
                    ("server_name", FieldSchema::string().optional()),
                ]))
                .required(),
            ),
        ])
    }

    fn valid_config() -> AttrMap {
        let mut origin = AttrMap::new();
        origin.insert(
            "origin_list".into(),
            AttrValue::from(vec!["1.2.3.4".to_string()]),
        );
        let mut config = AttrMap::new();
        config.insert("domain".into(), "www.example.com".into());
        config.insert("service_type".into(), "web".into());
        config.insert("origin".into(), AttrValue::List(vec![AttrValue::Map(origin)]));
        config
    }

    #[test]
    fn valid_config_passes() {
        assert!(sample_schema().validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn missing_required_rejected() {
        let mut config = valid_config();
        config.remove("domain");
        let err = sample_schema().validate_config(&config);
        assert!(
            matches!(err, Err(SchemaError::MissingRequired(ref f)) if f == "domain"),
            "got {err:?}"
        );
    }

    #[test]
    fn unknown_field_rejected() {
        let mut config = valid_config();
        config.insert("bogus".into(), AttrValue::Int(1));
        let err = sample_schema().validate_config(&config);
        assert!(matches!(err, Err(SchemaError::UnknownField(ref f)) if f == "bogus"));
    }

    #[test]
    fn computed_field_rejected_in_config() {
        let mut config = valid_config();
        config.insert("status".into(), "online".into());
        let err = sample_schema().validate_config(&config);
        assert!(
            matches!(err, Err(SchemaError::InvalidValue { ref field, .. }) if field == "status"),
            "got {err:?}"
        );
    }

    #[test]
    fn allowed_values_enforced() {
        let mut config = valid_config();
        config.insert("service_type".into(), "ftp".into());
        assert!(sample_schema().validate_config(&config).is_err());
    }

    #[test]
    fn int_range_enforced() {
        let mut config = valid_config();
        config.insert("ttl".into(), AttrValue::Int(10));
        assert!(sample_schema().validate_config(&config).is_err());
        config.insert("ttl".into(), AttrValue::Int(600));
        assert!(sample_schema().validate_config(&config).is_ok());
    }

    #[test]
    fn type_mismatch_reported_with_path() {
        let mut config = valid_config();
        config.insert("domain".into(), AttrValue::Int(5));
        let err = sample_schema().validate_config(&config);
        assert!(
            matches!(err, Err(SchemaError::TypeMismatch { ref field, .. }) if field == "domain"),
            "got {err:?}"
        );
    }

    #[test]
    fn block_max_items_enforced() {
        let mut config = valid_config();
        let origin = config.get("origin").cloned().unwrap();
        let AttrValue::List(mut items) = origin else {
            unreachable!()
        };
        items.push(items[0].clone());
        config.insert("origin".into(), AttrValue::List(items));
        assert!(sample_schema().validate_config(&config).is_err());
    }

    #[test]
    fn block_missing_required_reported_nested() {
        let mut config = valid_config();
        config.insert(
            "origin".into(),
            AttrValue::List(vec![AttrValue::Map(AttrMap::new())]),
        );
        let err = sample_schema().validate_config(&config);
        assert!(
            matches!(err, Err(SchemaError::MissingRequired(ref f)) if f == "origin.0.origin_list"),
            "got {err:?}"
        );
    }

    #[test]
    fn defaults_applied_once() {
        let mut config = valid_config();
        sample_schema().apply_defaults(&mut config);
        assert_eq!(config.get("project_id"), Some(&AttrValue::Int(0)));
        // 用户显式设置时不覆盖
        config.insert("project_id".into(), AttrValue::Int(7));
        sample_schema().apply_defaults(&mut config);
        assert_eq!(config.get("project_id"), Some(&AttrValue::Int(7)));
    }

    // ---- Validation ----

    #[test]
    fn port_validation() {
        assert!(Validation::Port.apply("s_port", &AttrValue::Int(80)).is_ok());
        assert!(Validation::Port.apply("s_port", &AttrValue::Int(0)).is_err());
        assert!(
            Validation::Port
                .apply("s_port", &AttrValue::Int(70_000))
                .is_err()
        );
    }

    #[test]
    fn port_range_validation() {
        for ok in ["80", "80-90", "1-65535"] {
            assert!(
                Validation::PortRange.apply("ports", &AttrValue::from(ok)).is_ok(),
                "'{ok}' should pass"
            );
        }
        for bad in ["0", "90-80", "a-b", "80-"] {
            assert!(
                Validation::PortRange.apply("ports", &AttrValue::from(bad)).is_err(),
                "'{bad}' should fail"
            );
        }
    }

    #[test]
    fn ip_validation() {
        assert!(Validation::Ip.apply("ip", &AttrValue::from("1.2.3.4")).is_ok());
        assert!(Validation::Ip.apply("ip", &AttrValue::from("2001:db8::1")).is_ok());
        assert!(Validation::Ip.apply("ip", &AttrValue::from("not-an-ip")).is_err());
    }

    #[test]
    fn string_length_validation() {
        let v = Validation::string_length(1, 32);
        assert!(v.apply("name", &AttrValue::from("policy")).is_ok());
        assert!(v.apply("name", &AttrValue::from("")).is_err());
        assert!(v.apply("name", &AttrValue::from("x".repeat(33).as_str())).is_err());
    }
}
