//! 大禹四层转发规则资源：`tencentcloud_dayu_l4_rule`，
//! ID 形如 `bgpip#bgpip-00000001#rule-000000001`。
//!
//! 四层规则没有状态机，规则、健康检查、会话保持各走各的接口；只有
//! 删除要轮询到规则消失为止。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation, block_string,
    build_composite_id, split_composite_id,
};
use crate::traits::Resource;

use super::service::DayuService;
use super::types::{L4HealthConfig, L4RuleEntry, RuleSource};
use super::{LB_TYPE_WEIGHT, RESOURCE_TYPE_BGPIP, RESOURCE_TYPE_NET};

pub struct DayuL4RuleResource;

const SOURCE_TYPE_HOST: i64 = 1;

fn source_schema() -> Schema {
    Schema::new([
        (
            "source",
            FieldSchema::string()
                .required()
                .desc("Source address or domain forwarded to."),
        ),
        (
            "weight",
            FieldSchema::int()
                .required()
                .validate(Validation::int_range(0, 100))
                .desc("Forwarding weight of the source."),
        ),
    ])
}

/// 主机回源只能走 TCP。
fn check_source_protocol(type_name: &str, d: &ResourceData) -> Result<()> {
    if d.get_int("source_type") == SOURCE_TYPE_HOST && d.get_string("protocol") != "TCP" {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "protocol".to_string(),
            detail: "only `TCP` is supported when `source_type` is 1 (host source)".to_string(),
        });
    }
    Ok(())
}

fn check_health(type_name: &str, d: &ResourceData) -> Result<()> {
    if !d.get_bool("health_check_switch") {
        return Ok(());
    }
    if d.get_list("source_list").len() < 2 {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "health_check_switch".to_string(),
            detail: "health check needs at least two entries in `source_list`".to_string(),
        });
    }
    if d.get_int("health_check_timeout") > d.get_int("health_check_interval") {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "health_check_timeout".to_string(),
            detail: "must not exceed `health_check_interval`".to_string(),
        });
    }
    Ok(())
}

fn check_session(type_name: &str, d: &ResourceData) -> Result<()> {
    if d.get_bool("session_switch") && d.get_ok_int("session_time").is_none() {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "session_time".to_string(),
            detail: "required when `session_switch` is true".to_string(),
        });
    }
    Ok(())
}

fn build_sources(d: &ResourceData) -> Vec<RuleSource> {
    d.get_list("source_list")
        .iter()
        .filter_map(AttrValue::as_map)
        .map(|entry| RuleSource {
            source: block_string(entry, "source"),
            weight: entry.get("weight").and_then(AttrValue::as_int),
        })
        .collect()
}

fn build_rule_entry(d: &ResourceData) -> L4RuleEntry {
    L4RuleEntry {
        protocol: Some(d.get_string("protocol")),
        source_port: Some(d.get_int("s_port")),
        virtual_port: Some(d.get_int("d_port")),
        source_type: Some(d.get_int("source_type")),
        rule_name: Some(d.get_string("name")),
        source_list: Some(build_sources(d)),
        lb_type: Some(LB_TYPE_WEIGHT),
        ..L4RuleEntry::default()
    }
}

fn build_health_config(d: &ResourceData) -> L4HealthConfig {
    L4HealthConfig {
        protocol: d.get_string("protocol"),
        virtual_port: d.get_int("d_port"),
        enable: i64::from(d.get_bool("health_check_switch")),
        time_out: d.get_int("health_check_timeout"),
        interval: d.get_int("health_check_interval"),
        kick_num: d.get_int("health_check_unhealth_num"),
        alive_num: d.get_int("health_check_health_num"),
    }
}

#[async_trait]
impl Resource for DayuL4RuleResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_dayu_l4_rule"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "resource_type",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .validate(Validation::allowed(&[RESOURCE_TYPE_BGPIP, RESOURCE_TYPE_NET]))
                    .desc("Type of the protection instance the rule belongs to."),
            ),
            (
                "resource_id",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("ID of the protection instance."),
            ),
            (
                "name",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("Rule name, unique within the instance."),
            ),
            (
                "protocol",
                FieldSchema::string()
                    .required()
                    .validate(Validation::allowed(&["TCP", "UDP"]))
                    .desc("Forwarding protocol."),
            ),
            (
                "s_port",
                FieldSchema::int()
                    .required()
                    .validate(Validation::Port)
                    .desc("Source port forwarded to."),
            ),
            (
                "d_port",
                FieldSchema::int()
                    .required()
                    .validate(Validation::Port)
                    .desc("Port the protection instance listens on."),
            ),
            (
                "source_type",
                FieldSchema::int()
                    .required()
                    .force_new()
                    .validate(Validation::int_range(1, 2))
                    .desc("Source kind: 1 host source, 2 IP source."),
            ),
            (
                "source_list",
                FieldSchema::block_set(source_schema())
                    .required()
                    .min_items(1)
                    .max_items(20)
                    .desc("Weighted sources forwarded to."),
            ),
            (
                "session_switch",
                FieldSchema::boolean()
                    .optional()
                    .default_value(false)
                    .desc("Whether session persistence is enabled."),
            ),
            (
                "session_time",
                FieldSchema::int()
                    .optional()
                    .computed()
                    .validate(Validation::int_range(1, 300))
                    .desc("Session persistence duration in seconds."),
            ),
            (
                "health_check_switch",
                FieldSchema::boolean()
                    .optional()
                    .computed()
                    .desc("Whether the health check is enabled."),
            ),
            (
                "health_check_interval",
                FieldSchema::int()
                    .optional()
                    .computed()
                    .validate(Validation::int_range(10, 60))
                    .desc("Probe interval in seconds."),
            ),
            (
                "health_check_timeout",
                FieldSchema::int()
                    .optional()
                    .computed()
                    .validate(Validation::int_range(2, 60))
                    .desc("Probe response timeout in seconds."),
            ),
            (
                "health_check_health_num",
                FieldSchema::int()
                    .optional()
                    .computed()
                    .validate(Validation::int_range(2, 10))
                    .desc("Consecutive successes before a source counts healthy."),
            ),
            (
                "health_check_unhealth_num",
                FieldSchema::int()
                    .optional()
                    .computed()
                    .validate(Validation::int_range(2, 10))
                    .desc("Consecutive failures before a source is kicked."),
            ),
            (
                "rule_id",
                FieldSchema::string()
                    .computed()
                    .desc("Rule ID assigned by the platform."),
            ),
            (
                "lb_type",
                FieldSchema::int()
                    .computed()
                    .desc("Load balancing mode reported by the platform."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        check_source_protocol(self.type_name(), d)?;
        check_health(self.type_name(), d)?;
        check_session(self.type_name(), d)?;

        let resource_type = d.get_string("resource_type");
        let resource_id = d.get_string("resource_id");
        let rule = build_rule_entry(d);

        let service = DayuService::new(conn);
        let rule_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .create_l4_rule(&resource_type, &resource_id, rule.clone())
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set_id(build_composite_id(&[&resource_type, &resource_id, &rule_id]));

        let health = build_health_config(d);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .set_l4_health(&resource_type, &resource_id, health.clone())
                .await
                .map_err(retry_error)
        })
        .await?;

        let session_on = d.get_bool("session_switch");
        let session_time = d.get_int("session_time");
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .set_l4_session(&resource_type, &resource_id, &rule_id, session_on, session_time)
                .await
                .map_err(retry_error)
        })
        .await?;

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 3)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (resource_type, resource_id, rule_id) =
            (parts[0].clone(), parts[1].clone(), parts[2].clone());

        let service = DayuService::new(conn);
        let found = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_l4_rule(&resource_type, &resource_id, &rule_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        let Some((rule, health)) = found else {
            d.set_id("");
            return Ok(());
        };

        d.set("resource_type", resource_type)?;
        d.set("resource_id", resource_id)?;
        d.set("rule_id", rule_id)?;
        if let Some(protocol) = rule.protocol {
            d.set("protocol", protocol)?;
        }
        if let Some(name) = rule.rule_name {
            d.set("name", name)?;
        }
        if let Some(s_port) = rule.source_port {
            d.set("s_port", s_port)?;
        }
        if let Some(d_port) = rule.virtual_port {
            d.set("d_port", d_port)?;
        }
        if let Some(source_type) = rule.source_type {
            d.set("source_type", source_type)?;
        }
        if let Some(lb_type) = rule.lb_type {
            d.set("lb_type", lb_type)?;
        }
        if let Some(keep_time) = rule.keep_time {
            d.set("session_time", keep_time)?;
        }
        d.set("session_switch", rule.keep_enable.unwrap_or_default() > 0)?;

        let sources: Vec<AttrMap> = rule
            .source_list
            .unwrap_or_default()
            .into_iter()
            .map(|s| {
                let mut entry = AttrMap::new();
                if let Some(source) = s.source {
                    entry.insert("source".to_string(), AttrValue::from(source));
                }
                if let Some(weight) = s.weight {
                    entry.insert("weight".to_string(), AttrValue::from(weight));
                }
                entry
            })
            .collect();
        d.set("source_list", sources)?;

        match health {
            Some(health) => {
                d.set("health_check_switch", health.enable.unwrap_or_default() > 0)?;
                if let Some(time_out) = health.time_out {
                    d.set("health_check_timeout", time_out)?;
                }
                if let Some(interval) = health.interval {
                    d.set("health_check_interval", interval)?;
                }
                if let Some(kick_num) = health.kick_num {
                    d.set("health_check_unhealth_num", kick_num)?;
                }
                if let Some(alive_num) = health.alive_num {
                    d.set("health_check_health_num", alive_num)?;
                }
            }
            None => d.set("health_check_switch", false)?,
        }
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        for arg in ["resource_type", "resource_id", "name", "source_type"] {
            if d.has_change(arg) {
                return Err(ProviderError::UnsupportedOperation {
                    product: self.type_name().to_string(),
                    detail: format!("argument `{arg}` cannot be changed"),
                });
            }
        }
        let parts = split_composite_id(d.id(), 3)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (resource_type, resource_id, rule_id) =
            (parts[0].clone(), parts[1].clone(), parts[2].clone());

        let service = DayuService::new(conn);

        if d.has_changes(&["protocol", "s_port", "d_port", "source_list"]) {
            check_source_protocol(self.type_name(), d)?;
            let mut rule = build_rule_entry(d);
            rule.rule_id = Some(rule_id.clone());
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_l4_rule(&resource_type, &resource_id, rule.clone())
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        // d_port 变了健康检查里的 VirtualPort 也要跟着重下发
        if d.has_changes(&[
            "health_check_switch",
            "health_check_interval",
            "health_check_timeout",
            "health_check_unhealth_num",
            "health_check_health_num",
            "d_port",
        ]) {
            check_health(self.type_name(), d)?;
            let health = build_health_config(d);
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .set_l4_health(&resource_type, &resource_id, health.clone())
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        if d.has_changes(&["session_switch", "session_time"]) {
            check_session(self.type_name(), d)?;
            let session_on = d.get_bool("session_switch");
            let session_time = d.get_int("session_time");
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .set_l4_session(
                        &resource_type,
                        &resource_id,
                        &rule_id,
                        session_on,
                        session_time,
                    )
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 3)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (resource_type, resource_id, rule_id) =
            (parts[0].clone(), parts[1].clone(), parts[2].clone());

        let service = DayuService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            match service
                .delete_l4_rule(&resource_type, &resource_id, &rule_id)
                .await
            {
                Ok(()) | Err(ProviderError::ResourceNotFound { .. }) => Ok(()),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await?;

        retry::within(READ_RETRY_TIMEOUT, || async {
            match service
                .describe_l4_rule(&resource_type, &resource_id, &rule_id)
                .await
            {
                Ok(None) => Ok(()),
                Ok(Some(_)) => Err(Retry::not_ready(
                    "dayu",
                    format!("rule {rule_id} is still deleting"),
                )),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(addr: &str, weight: i64) -> AttrValue {
        let mut entry = AttrMap::new();
        entry.insert("source".to_string(), AttrValue::from(addr));
        entry.insert("weight".to_string(), AttrValue::from(weight));
        AttrValue::Map(entry)
    }

    fn base_config() -> AttrMap {
        let mut config = AttrMap::new();
        config.insert("resource_type".to_string(), AttrValue::from("bgpip"));
        config.insert("resource_id".to_string(), AttrValue::from("bgpip-00000001"));
        config.insert("name".to_string(), AttrValue::from("tf-rule"));
        config.insert("protocol".to_string(), AttrValue::from("TCP"));
        config.insert("s_port".to_string(), AttrValue::from(80));
        config.insert("d_port".to_string(), AttrValue::from(800));
        config.insert("source_type".to_string(), AttrValue::from(2));
        config.insert(
            "source_list".to_string(),
            AttrValue::List(vec![source("1.1.1.1", 50), source("2.2.2.2", 50)]),
        );
        config
    }

    fn data(config: AttrMap) -> ResourceData {
        ResourceData::new(
            "tencentcloud_dayu_l4_rule",
            DayuL4RuleResource.schema(),
            config,
        )
        .unwrap()
    }

    #[test]
    fn host_source_requires_tcp() {
        let mut config = base_config();
        config.insert("source_type".to_string(), AttrValue::from(1));
        config.insert("protocol".to_string(), AttrValue::from("UDP"));
        let d = data(config.clone());
        assert!(check_source_protocol("tencentcloud_dayu_l4_rule", &d).is_err());

        config.insert("protocol".to_string(), AttrValue::from("TCP"));
        let d = data(config);
        assert!(check_source_protocol("tencentcloud_dayu_l4_rule", &d).is_ok());
    }

    #[test]
    fn session_time_required_when_switch_on() {
        let mut config = base_config();
        config.insert("session_switch".to_string(), AttrValue::from(true));
        let d = data(config.clone());
        assert!(check_session("tencentcloud_dayu_l4_rule", &d).is_err());

        config.insert("session_time".to_string(), AttrValue::from(300));
        let d = data(config);
        assert!(check_session("tencentcloud_dayu_l4_rule", &d).is_ok());
    }

    #[test]
    fn health_timeout_must_not_exceed_interval() {
        let mut config = base_config();
        config.insert("health_check_switch".to_string(), AttrValue::from(true));
        config.insert("health_check_interval".to_string(), AttrValue::from(10));
        config.insert("health_check_timeout".to_string(), AttrValue::from(30));
        let d = data(config.clone());
        assert!(check_health("tencentcloud_dayu_l4_rule", &d).is_err());

        config.insert("health_check_timeout".to_string(), AttrValue::from(5));
        let d = data(config);
        assert!(check_health("tencentcloud_dayu_l4_rule", &d).is_ok());
    }

    #[test]
    fn rule_entry_maps_port_directions() {
        let entry = build_rule_entry(&data(base_config()));
        assert_eq!(entry.source_port, Some(80));
        assert_eq!(entry.virtual_port, Some(800));
        assert_eq!(entry.lb_type, Some(LB_TYPE_WEIGHT));
        let sources = entry.source_list.unwrap();
        assert_eq!(sources[0].source.as_deref(), Some("1.1.1.1"));
        assert_eq!(sources[0].weight, Some(50));
    }

    #[test]
    fn source_weight_range_enforced() {
        let mut config = base_config();
        config.insert(
            "source_list".to_string(),
            AttrValue::List(vec![source("1.1.1.1", 200)]),
        );
        assert!(
            ResourceData::new(
                "tencentcloud_dayu_l4_rule",
                DayuL4RuleResource.schema(),
                config,
            )
            .is_err()
        );
    }
}
