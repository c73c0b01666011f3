//! 事件规则资源：`tencentcloud_eb_event_rule`，ID 形如 `eb-xxx#rule-xxx`。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    FieldSchema, ResourceData, Schema, build_composite_id, split_composite_id,
};
use crate::traits::Resource;

use super::service::EbService;
use super::types::{CreateRuleRequest, UpdateRuleRequest};

pub struct EbEventRuleResource;

/// 事件匹配模式必须是合法 JSON，提前拦截明显的笔误。
fn check_event_pattern(type_name: &str, pattern: &str) -> Result<()> {
    serde_json::from_str::<serde_json::Value>(pattern).map_err(|e| {
        ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "event_pattern".to_string(),
            detail: format!("not valid JSON: {e}"),
        }
    })?;
    Ok(())
}

#[async_trait]
impl Resource for EbEventRuleResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_eb_event_rule"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "event_bus_id",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("Event bus the rule is attached to."),
            ),
            (
                "rule_name",
                FieldSchema::string().required().desc("Rule name."),
            ),
            (
                "event_pattern",
                FieldSchema::string()
                    .required()
                    .desc("Event match pattern as a JSON string."),
            ),
            (
                "enable",
                FieldSchema::boolean()
                    .optional()
                    .default_value(true)
                    .desc("Whether the rule is enabled."),
            ),
            (
                "description",
                FieldSchema::string().optional().desc("Rule description."),
            ),
            (
                "rule_id",
                FieldSchema::string()
                    .computed()
                    .desc("Rule ID assigned by the platform."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let event_bus_id = d.get_string("event_bus_id");
        let event_pattern = d.get_string("event_pattern");
        check_event_pattern(self.type_name(), &event_pattern)?;

        let req = CreateRuleRequest {
            event_bus_id: event_bus_id.clone(),
            rule_name: d.get_string("rule_name"),
            event_pattern,
            enable: Some(d.get_bool("enable")),
            description: d.get_ok_string("description"),
        };
        let service = EbService::new(conn);
        let rule_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service.create_rule(&req).await.map_err(retry_error)
        })
        .await?;
        d.set_id(build_composite_id(&[&event_bus_id, &rule_id]));

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 2)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (event_bus_id, rule_id) = (parts[0].clone(), parts[1].clone());

        let service = EbService::new(conn);
        let rule = match retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .get_rule(&event_bus_id, &rule_id)
                .await
                .map_err(retry_error)
        })
        .await
        {
            Ok(rule) => rule,
            Err(ProviderError::ResourceNotFound { .. }) => {
                log::warn!("[eb] rule {rule_id} on {event_bus_id} not found, clearing state");
                d.set_id("");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        d.set("event_bus_id", event_bus_id)?;
        d.set("rule_id", rule_id)?;
        if let Some(rule_name) = rule.rule_name {
            d.set("rule_name", rule_name)?;
        }
        if let Some(event_pattern) = rule.event_pattern {
            d.set("event_pattern", event_pattern)?;
        }
        if let Some(enable) = rule.enable {
            d.set("enable", enable)?;
        }
        if let Some(description) = rule.description {
            d.set("description", description)?;
        }
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        if d.has_change("event_bus_id") {
            return Err(ProviderError::UnsupportedOperation {
                product: self.type_name().to_string(),
                detail: "argument `event_bus_id` cannot be changed".to_string(),
            });
        }
        let parts = split_composite_id(d.id(), 2)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (event_bus_id, rule_id) = (parts[0].clone(), parts[1].clone());

        if d.has_changes(&["rule_name", "event_pattern", "enable", "description"]) {
            let event_pattern = d.get_string("event_pattern");
            check_event_pattern(self.type_name(), &event_pattern)?;

            let req = UpdateRuleRequest {
                event_bus_id,
                rule_id,
                rule_name: Some(d.get_string("rule_name")),
                event_pattern: Some(event_pattern),
                enable: Some(d.get_bool("enable")),
                description: d.get_ok_string("description"),
            };
            let service = EbService::new(conn);
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service.update_rule(&req).await.map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 2)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (event_bus_id, rule_id) = (parts[0].clone(), parts[1].clone());

        let service = EbService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            match service.delete_rule(&event_bus_id, &rule_id).await {
                Ok(()) | Err(ProviderError::ResourceNotFound { .. }) => Ok(()),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrMap, AttrValue};

    #[test]
    fn pattern_must_be_json() {
        assert!(check_event_pattern("tencentcloud_eb_event_rule", "{not json").is_err());
        assert!(
            check_event_pattern(
                "tencentcloud_eb_event_rule",
                r#"{"source":"apigw.cloud.tencent"}"#
            )
            .is_ok()
        );
    }

    #[test]
    fn enable_defaults_to_true() {
        let mut config = AttrMap::new();
        config.insert("event_bus_id".to_string(), AttrValue::from("eb-abc123"));
        config.insert("rule_name".to_string(), AttrValue::from("tf-rule"));
        config.insert("event_pattern".to_string(), AttrValue::from("{}"));
        let d = ResourceData::new(
            "tencentcloud_eb_event_rule",
            EbEventRuleResource.schema(),
            config,
        )
        .unwrap();
        assert!(d.get_bool("enable"));
    }
}
