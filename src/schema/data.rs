//! Per-operation view over a resource's configuration and state.

use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::schema::field::{FieldType, Schema};
use crate::schema::value::{AttrMap, AttrValue};

/// Attribute access for one CRUD invocation.
///
/// Handlers read the desired configuration through the `get_*` family and
/// record observed attributes through [`ResourceData::set`]. The identifier
/// travels separately: an empty ID after a read means the remote object is
/// gone and state should be discarded.
#[derive(Debug, Clone)]
pub struct ResourceData {
    resource_type: &'static str,
    schema: Schema,
    id: String,
    /// State as it was before the operation; drives change detection.
    prior: AttrMap,
    /// Desired configuration, validated with defaults applied.
    config: AttrMap,
    /// Attributes written back by the handler.
    state: AttrMap,
}

impl ResourceData {
    /// Create-path view: configuration is validated against the schema and
    /// defaults are filled in. There is no prior state yet.
    pub fn new(
        resource_type: &'static str,
        schema: Schema,
        mut config: AttrMap,
    ) -> Result<Self, SchemaError> {
        schema.validate_config(&config)?;
        schema.apply_defaults(&mut config);
        Ok(Self {
            resource_type,
            schema,
            id: String::new(),
            prior: AttrMap::new(),
            config,
            state: AttrMap::new(),
        })
    }

    /// Update-path view: prior state is kept for [`ResourceData::has_change`].
    pub fn with_state(
        resource_type: &'static str,
        schema: Schema,
        id: impl Into<String>,
        prior: AttrMap,
        mut config: AttrMap,
    ) -> Result<Self, SchemaError> {
        schema.validate_config(&config)?;
        schema.apply_defaults(&mut config);
        Ok(Self {
            resource_type,
            schema,
            id: id.into(),
            prior,
            config,
            state: AttrMap::new(),
        })
    }

    /// Read/delete/import view built from trusted stored state.
    #[must_use]
    pub fn from_state(
        resource_type: &'static str,
        schema: Schema,
        id: impl Into<String>,
        state: AttrMap,
    ) -> Self {
        Self {
            resource_type,
            schema,
            id: id.into(),
            prior: state.clone(),
            config: state.clone(),
            state,
        }
    }

    #[must_use]
    pub fn resource_type(&self) -> &'static str {
        self.resource_type
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Setting the empty string marks the resource as no longer existing.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.id.is_empty()
    }

    // ---- 读取配置 ----

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.config.get(name).filter(|v| !v.is_null())
    }

    /// Go 风格的 GetOk：零值（false、0、""、空集合）视同未设置。
    #[must_use]
    pub fn get_ok(&self, name: &str) -> Option<&AttrValue> {
        self.config.get(name).filter(|v| !v.is_zero())
    }

    #[must_use]
    pub fn get_string(&self, name: &str) -> String {
        self.get(name)
            .and_then(AttrValue::as_str)
            .unwrap_or_default()
            .to_string()
    }

    #[must_use]
    pub fn get_int(&self, name: &str) -> i64 {
        self.get(name).and_then(AttrValue::as_int).unwrap_or_default()
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(AttrValue::as_bool).unwrap_or_default()
    }

    #[must_use]
    pub fn get_float(&self, name: &str) -> f64 {
        self.get(name).and_then(AttrValue::as_float).unwrap_or_default()
    }

    #[must_use]
    pub fn get_list(&self, name: &str) -> Vec<AttrValue> {
        self.get(name)
            .and_then(AttrValue::as_list)
            .map(<[AttrValue]>::to_vec)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_string_list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(AttrValue::as_string_list)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get_string_map(&self, name: &str) -> BTreeMap<String, String> {
        self.get(name)
            .and_then(AttrValue::as_map)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First (and only) entry of a single-block field, if configured.
    #[must_use]
    pub fn get_block(&self, name: &str) -> Option<&AttrMap> {
        self.get(name)
            .and_then(AttrValue::as_list)
            .and_then(<[AttrValue]>::first)
            .and_then(AttrValue::as_map)
    }

    #[must_use]
    pub fn get_ok_string(&self, name: &str) -> Option<String> {
        self.get_ok(name)
            .and_then(AttrValue::as_str)
            .map(ToString::to_string)
    }

    #[must_use]
    pub fn get_ok_int(&self, name: &str) -> Option<i64> {
        self.get_ok(name).and_then(AttrValue::as_int)
    }

    #[must_use]
    pub fn get_ok_bool(&self, name: &str) -> Option<bool> {
        self.get_ok(name).and_then(AttrValue::as_bool)
    }

    // ---- 回写状态 ----

    /// Record an observed attribute. The value must match the declared shape.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<(), SchemaError> {
        let value = value.into();
        let Some(field) = self.schema.field(name) else {
            return Err(SchemaError::UnknownField(name.to_string()));
        };
        field.check_type(name, &value)?;
        self.state.insert(name.to_string(), value);
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> &AttrMap {
        &self.state
    }

    /// Stored state after the operation, keyed by attribute name.
    #[must_use]
    pub fn into_state(self) -> AttrMap {
        self.state
    }

    // ---- 变更检测 ----

    /// Old and new value of an attribute, for handlers that diff instead
    /// of overwrite (tag maps, set membership).
    #[must_use]
    pub fn get_change(&self, name: &str) -> (AttrValue, AttrValue) {
        let prior = self.prior.get(name).cloned().unwrap_or(AttrValue::Null);
        let config = self.config.get(name).cloned().unwrap_or(AttrValue::Null);
        (prior, config)
    }

    /// Whether the desired configuration differs from the prior state.
    ///
    /// Set 类型字段忽略元素顺序。
    #[must_use]
    pub fn has_change(&self, name: &str) -> bool {
        let (prior, config) = self.get_change(name);
        if self
            .schema
            .field(name)
            .is_some_and(|f| f.field_type == FieldType::Set)
        {
            return Self::as_multiset(&prior) != Self::as_multiset(&config);
        }
        prior != config
    }

    /// Any of the named attributes changed.
    #[must_use]
    pub fn has_changes(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has_change(n))
    }

    fn as_multiset(value: &AttrValue) -> Vec<String> {
        let mut items: Vec<String> = value
            .as_list()
            .map(|items| {
                items
                    .iter()
                    .map(|v| serde_json::to_string(v).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        items.sort_unstable();
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::FieldSchema;

    fn record_schema() -> Schema {
        Schema::new([
            ("domain", FieldSchema::string().required().force_new()),
            ("record_type", FieldSchema::string().required()),
            ("value", FieldSchema::string().required()),
            ("ttl", FieldSchema::int().optional().default_value(600_i64)),
            ("weight", FieldSchema::int().optional()),
            ("remark", FieldSchema::string().optional()),
            ("status", FieldSchema::string().computed()),
            (
                "origin_list",
                FieldSchema::set(FieldSchema::string()).optional(),
            ),
        ])
    }

    fn record_config() -> AttrMap {
        let mut config = AttrMap::new();
        config.insert("domain".into(), "example.com".into());
        config.insert("record_type".into(), "A".into());
        config.insert("value".into(), "1.2.3.4".into());
        config
    }

    #[test]
    fn new_applies_defaults() {
        let d = ResourceData::new("test_record", record_schema(), record_config()).unwrap();
        assert_eq!(d.get_int("ttl"), 600);
        assert_eq!(d.get_string("domain"), "example.com");
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = record_config();
        config.remove("value");
        assert!(ResourceData::new("test_record", record_schema(), config).is_err());
    }

    #[test]
    fn get_ok_skips_zero_values() {
        let mut config = record_config();
        config.insert("weight".into(), AttrValue::Int(0));
        config.insert("remark".into(), "".into());
        let d = ResourceData::new("test_record", record_schema(), config).unwrap();
        assert!(d.get_ok("weight").is_none());
        assert!(d.get_ok("remark").is_none());
        assert_eq!(d.get_ok_string("value").as_deref(), Some("1.2.3.4"));
        // get 仍返回显式零值
        assert_eq!(d.get_int("weight"), 0);
    }

    #[test]
    fn set_checks_shape_and_records_state() {
        let mut d = ResourceData::new("test_record", record_schema(), record_config()).unwrap();
        d.set("status", "ENABLE").unwrap();
        assert!(d.set("status", 3_i64).is_err());
        assert!(d.set("no_such_field", "x").is_err());
        assert_eq!(
            d.state().get("status"),
            Some(&AttrValue::String("ENABLE".into()))
        );
    }

    #[test]
    fn set_id_empty_marks_absent() {
        let mut d = ResourceData::from_state(
            "test_record",
            record_schema(),
            "example.com#123",
            AttrMap::new(),
        );
        assert!(d.is_present());
        d.set_id("");
        assert!(!d.is_present());
    }

    #[test]
    fn from_state_reads_stored_attributes() {
        let mut state = AttrMap::new();
        state.insert("domain".into(), "example.com".into());
        state.insert("ttl".into(), AttrValue::Int(300));
        let d = ResourceData::from_state("test_record", record_schema(), "id-1", state);
        assert_eq!(d.get_string("domain"), "example.com");
        assert_eq!(d.get_int("ttl"), 300);
    }

    #[test]
    fn has_change_compares_prior_and_config() {
        let mut prior = record_config();
        prior.insert("ttl".into(), AttrValue::Int(600));
        let mut config = record_config();
        config.insert("ttl".into(), AttrValue::Int(300));
        let d = ResourceData::with_state("test_record", record_schema(), "id-1", prior, config)
            .unwrap();
        assert!(d.has_change("ttl"));
        assert!(!d.has_change("domain"));
        assert!(d.has_changes(&["domain", "ttl"]));
        assert!(!d.has_changes(&["domain", "value"]));
    }

    #[test]
    fn get_change_returns_both_sides() {
        let mut prior = record_config();
        prior.insert("ttl".into(), AttrValue::Int(600));
        let mut config = record_config();
        config.insert("ttl".into(), AttrValue::Int(300));
        let d = ResourceData::with_state("test_record", record_schema(), "id-1", prior, config)
            .unwrap();
        assert_eq!(
            d.get_change("ttl"),
            (AttrValue::Int(600), AttrValue::Int(300))
        );
        // 两侧都没有的字段回 Null
        assert_eq!(
            d.get_change("remark"),
            (AttrValue::Null, AttrValue::Null)
        );
    }

    #[test]
    fn set_fields_ignore_order() {
        let mut prior = record_config();
        prior.insert(
            "origin_list".into(),
            AttrValue::from(vec!["a.com".to_string(), "b.com".to_string()]),
        );
        let mut config = record_config();
        config.insert(
            "origin_list".into(),
            AttrValue::from(vec!["b.com".to_string(), "a.com".to_string()]),
        );
        let d = ResourceData::with_state("test_record", record_schema(), "id-1", prior, config)
            .unwrap();
        assert!(!d.has_change("origin_list"));
    }
}
