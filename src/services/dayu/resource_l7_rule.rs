//! 大禹七层转发规则资源：`tencentcloud_dayu_l7_rule`，
//! ID 形如 `bgpip#bgpip-00000001#rule-000000001`。
//!
//! 规则、健康检查、CC 开关是三个独立接口，每步下发后都要轮询规则
//! 状态机收敛，乱序下发会被平台拒绝。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{
    self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error, retry_error_with,
};
use crate::schema::{
    FieldSchema, ResourceData, Schema, Validation, build_composite_id, split_composite_id,
};
use crate::traits::Resource;

use super::service::DayuService;
use super::types::{L7HealthConfig, L7RuleEntry, RuleSource};
use super::{
    CERT_TYPE_HOSTED, CERT_TYPE_NONE, HEALTH_STATUS_DONE, HEALTH_STATUS_FAIL, L7_PROTOCOL_HTTP,
    L7_PROTOCOL_HTTPS, LB_TYPE_WEIGHT, RESOURCE_TYPE_BGPIP, RULE_STATUS_DEL_DONE,
    RULE_STATUS_DEL_FAIL, RULE_STATUS_SET_DONE, RULE_STATUS_SET_FAIL, RULE_STATUS_SSL_WAIT,
};

pub struct DayuL7RuleResource;

/// 轮询规则状态机时在等哪件事。
#[derive(Clone, Copy)]
enum RuleCheck {
    Create,
    Modify,
    Delete,
    Health,
    Switch(bool),
}

/// https 规则必须带托管证书。
fn check_https_ssl(type_name: &str, d: &ResourceData) -> Result<()> {
    if d.get_string("protocol") == L7_PROTOCOL_HTTPS && d.get_ok_string("ssl_id").is_none() {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "ssl_id".to_string(),
            detail: "required when `protocol` is `https`".to_string(),
        });
    }
    Ok(())
}

/// 健康探测要在多个回源之间摘除坏源，单回源没有意义，平台也会拒绝。
fn check_health_sources(type_name: &str, d: &ResourceData) -> Result<()> {
    if d.get_bool("health_check_switch") && d.get_string_list("source_list").len() < 2 {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "health_check_switch".to_string(),
            detail: "health check needs at least two entries in `source_list`".to_string(),
        });
    }
    Ok(())
}

fn build_rule_entry(d: &ResourceData) -> L7RuleEntry {
    let protocol = d.get_string("protocol");
    let (cert_type, ssl_id) = if protocol == L7_PROTOCOL_HTTPS {
        (CERT_TYPE_HOSTED, d.get_ok_string("ssl_id"))
    } else {
        (CERT_TYPE_NONE, None)
    };
    L7RuleEntry {
        protocol: Some(protocol),
        domain: Some(d.get_string("domain")),
        rule_name: Some(d.get_string("name")),
        source_type: Some(d.get_int("source_type")),
        source_list: Some(
            d.get_string_list("source_list")
                .into_iter()
                .map(|source| RuleSource {
                    source: Some(source),
                    // 七层不支持权重，固定置 0
                    weight: Some(0),
                })
                .collect(),
        ),
        cert_type: Some(cert_type),
        ssl_id,
        lb_type: Some(LB_TYPE_WEIGHT),
        ..L7RuleEntry::default()
    }
}

/// 健康检查配置没有增量语义，关闭时也要全量下发（零值生效）。
fn build_health_config(d: &ResourceData) -> L7HealthConfig {
    L7HealthConfig {
        protocol: d.get_string("protocol"),
        domain: d.get_string("domain"),
        enable: i64::from(d.get_bool("health_check_switch")),
        interval: d.get_int("health_check_interval"),
        kick_num: d.get_int("health_check_unhealth_num"),
        alive_num: d.get_int("health_check_health_num"),
        method: d.get_string("health_check_method"),
        status_code: d.get_int("health_check_code"),
        url: d.get_string("health_check_path"),
    }
}

async fn wait_for_rule(
    service: &DayuService,
    business: &str,
    resource_id: &str,
    rule_id: &str,
    check: RuleCheck,
) -> Result<()> {
    retry::within(READ_RETRY_TIMEOUT * 5, || async {
        let found = match service
            .describe_l7_rule(business, resource_id, rule_id)
            .await
        {
            Ok(found) => found,
            Err(e) => return Err(retry_error(e)),
        };
        let Some((rule, health)) = found else {
            // 删除等的就是规则消失，其它检查下规则必须还在
            return match check {
                RuleCheck::Delete => Ok(()),
                _ => Err(Retry::Fatal(ProviderError::ResourceNotFound {
                    product: "dayu".to_string(),
                    resource_id: rule_id.to_string(),
                    raw_message: None,
                })),
            };
        };
        let status = rule.status.unwrap_or_default();
        match check {
            RuleCheck::Create | RuleCheck::Modify => match status {
                RULE_STATUS_SET_DONE => Ok(()),
                RULE_STATUS_SET_FAIL => Err(Retry::Fatal(ProviderError::TaskFailed {
                    product: "dayu".to_string(),
                    task_id: rule_id.to_string(),
                    detail: "rule dispatch failed".to_string(),
                })),
                RULE_STATUS_SSL_WAIT => Err(Retry::not_ready(
                    "dayu",
                    format!("rule {rule_id} is waiting for its certificate"),
                )),
                _ => Err(Retry::not_ready(
                    "dayu",
                    format!("rule {rule_id} status is {status}"),
                )),
            },
            RuleCheck::Delete => match status {
                RULE_STATUS_DEL_DONE => Ok(()),
                RULE_STATUS_DEL_FAIL => Err(Retry::Fatal(ProviderError::TaskFailed {
                    product: "dayu".to_string(),
                    task_id: rule_id.to_string(),
                    detail: "rule delete failed".to_string(),
                })),
                _ => Err(Retry::not_ready(
                    "dayu",
                    format!("rule {rule_id} is still deleting"),
                )),
            },
            RuleCheck::Health => match health.and_then(|h| h.status) {
                Some(HEALTH_STATUS_DONE) => Ok(()),
                Some(HEALTH_STATUS_FAIL) => Err(Retry::Fatal(ProviderError::TaskFailed {
                    product: "dayu".to_string(),
                    task_id: rule_id.to_string(),
                    detail: "health check config dispatch failed".to_string(),
                })),
                _ => Err(Retry::not_ready(
                    "dayu",
                    format!("rule {rule_id} health config is still dispatching"),
                )),
            },
            RuleCheck::Switch(on) => {
                let want = i64::from(on);
                let seen = if rule.protocol.as_deref() == Some(L7_PROTOCOL_HTTPS) {
                    rule.cc_enable
                } else {
                    rule.cc_status
                };
                if seen == Some(want) {
                    Ok(())
                } else {
                    Err(Retry::not_ready(
                        "dayu",
                        format!("rule {rule_id} CC protection switch is still flipping"),
                    ))
                }
            }
        }
    })
    .await
}

#[async_trait]
impl Resource for DayuL7RuleResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_dayu_l7_rule"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "resource_type",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .validate(Validation::allowed(&[RESOURCE_TYPE_BGPIP]))
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
                    .desc("Rule name."),
            ),
            (
                "domain",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .validate(Validation::string_length(1, 80))
                    .desc("Forwarded domain."),
            ),
            (
                "protocol",
                FieldSchema::string()
                    .required()
                    .validate(Validation::allowed(&[L7_PROTOCOL_HTTP, L7_PROTOCOL_HTTPS]))
                    .desc("Forwarding protocol."),
            ),
            (
                "switch",
                FieldSchema::boolean()
                    .optional()
                    .default_value(false)
                    .desc("Whether CC protection is enabled for the rule."),
            ),
            (
                "source_type",
                FieldSchema::int()
                    .required()
                    .validate(Validation::int_range(1, 2))
                    .desc("Source kind: 1 host source, 2 IP source."),
            ),
            (
                "source_list",
                FieldSchema::set(FieldSchema::string())
                    .required()
                    .min_items(1)
                    .max_items(16)
                    .desc("Source addresses or domains forwarded to."),
            ),
            (
                "ssl_id",
                FieldSchema::string()
                    .optional()
                    .desc("SSL certificate ID, required for https rules."),
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
                "health_check_code",
                FieldSchema::int()
                    .optional()
                    .computed()
                    .validate(Validation::int_range(1, 31))
                    .desc("Bitmask of HTTP status classes counted healthy."),
            ),
            (
                "health_check_path",
                FieldSchema::string()
                    .optional()
                    .computed()
                    .desc("Probed path."),
            ),
            (
                "health_check_method",
                FieldSchema::string()
                    .optional()
                    .computed()
                    .validate(Validation::allowed(&["HEAD", "GET"]))
                    .desc("Probe HTTP method."),
            ),
            (
                "rule_id",
                FieldSchema::string()
                    .computed()
                    .desc("Rule ID assigned by the platform."),
            ),
            (
                "status",
                FieldSchema::int()
                    .computed()
                    .desc("Rule dispatch status."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        check_https_ssl(self.type_name(), d)?;
        check_health_sources(self.type_name(), d)?;

        let resource_type = d.get_string("resource_type");
        let resource_id = d.get_string("resource_id");
        let protocol = d.get_string("protocol");
        let rule = build_rule_entry(d);

        let service = DayuService::new(conn);
        let rule_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .create_l7_rule(&resource_type, &resource_id, rule.clone())
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set_id(build_composite_id(&[&resource_type, &resource_id, &rule_id]));
        wait_for_rule(&service, &resource_type, &resource_id, &rule_id, RuleCheck::Create).await?;

        let health = build_health_config(d);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .set_l7_health(&resource_type, &resource_id, health.clone())
                .await
                .map_err(retry_error)
        })
        .await?;
        wait_for_rule(&service, &resource_type, &resource_id, &rule_id, RuleCheck::Health).await?;

        // 开关接口偶发 InternalError，虽然不在白名单也值得再试
        let switch_on = d.get_bool("switch");
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .set_l7_cc_switch(&resource_type, &resource_id, &rule_id, &protocol, switch_on)
                .await
                .map_err(|e| retry_error_with(e, &["InternalError"]))
        })
        .await?;
        wait_for_rule(
            &service,
            &resource_type,
            &resource_id,
            &rule_id,
            RuleCheck::Switch(switch_on),
        )
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
                .describe_l7_rule(&resource_type, &resource_id, &rule_id)
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
        if let Some(domain) = rule.domain {
            d.set("domain", domain)?;
        }
        if let Some(name) = rule.rule_name {
            d.set("name", name)?;
        }
        if let Some(ssl_id) = rule.ssl_id {
            d.set("ssl_id", ssl_id)?;
        }
        if let Some(source_type) = rule.source_type {
            d.set("source_type", source_type)?;
        }
        if let Some(status) = rule.status {
            d.set("status", status)?;
        }
        let sources: Vec<String> = rule
            .source_list
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.source)
            .collect();
        d.set("source_list", sources)?;

        // CC 开关按协议取不同字段
        let switch_on = if rule.protocol.as_deref() == Some(L7_PROTOCOL_HTTPS) {
            rule.cc_enable.unwrap_or_default() > 0
        } else {
            rule.cc_status.unwrap_or_default() > 0
        };
        d.set("switch", switch_on)?;
        if let Some(protocol) = rule.protocol {
            d.set("protocol", protocol)?;
        }

        match health {
            Some(health) => {
                d.set("health_check_switch", health.enable.unwrap_or_default() > 0)?;
                if let Some(interval) = health.interval {
                    d.set("health_check_interval", interval)?;
                }
                if let Some(kick_num) = health.kick_num {
                    d.set("health_check_unhealth_num", kick_num)?;
                }
                if let Some(alive_num) = health.alive_num {
                    d.set("health_check_health_num", alive_num)?;
                }
                if let Some(method) = health.method {
                    d.set("health_check_method", method)?;
                }
                if let Some(code) = health.status_code {
                    d.set("health_check_code", code)?;
                }
                if let Some(url) = health.url {
                    d.set("health_check_path", url)?;
                }
            }
            None => d.set("health_check_switch", false)?,
        }
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        for arg in ["resource_type", "resource_id", "name", "domain"] {
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
        let protocol = d.get_string("protocol");

        if d.has_changes(&["protocol", "source_type", "source_list", "ssl_id"]) {
            check_https_ssl(self.type_name(), d)?;
            let mut rule = build_rule_entry(d);
            rule.rule_id = Some(rule_id.clone());
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_l7_rule(&resource_type, &resource_id, rule.clone())
                    .await
                    .map_err(retry_error)
            })
            .await?;
            wait_for_rule(&service, &resource_type, &resource_id, &rule_id, RuleCheck::Modify)
                .await?;
        }

        if d.has_changes(&[
            "health_check_switch",
            "health_check_interval",
            "health_check_path",
            "health_check_method",
            "health_check_unhealth_num",
            "health_check_health_num",
            "health_check_code",
        ]) {
            check_health_sources(self.type_name(), d)?;
            let health = build_health_config(d);
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .set_l7_health(&resource_type, &resource_id, health.clone())
                    .await
                    .map_err(retry_error)
            })
            .await?;
            wait_for_rule(&service, &resource_type, &resource_id, &rule_id, RuleCheck::Health)
                .await?;
        }

        if d.has_change("switch") {
            let switch_on = d.get_bool("switch");
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .set_l7_cc_switch(&resource_type, &resource_id, &rule_id, &protocol, switch_on)
                    .await
                    .map_err(|e| retry_error_with(e, &["InternalError"]))
            })
            .await?;
            wait_for_rule(
                &service,
                &resource_type,
                &resource_id,
                &rule_id,
                RuleCheck::Switch(switch_on),
            )
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
                .delete_l7_rule(&resource_type, &resource_id, &rule_id)
                .await
            {
                Ok(()) | Err(ProviderError::ResourceNotFound { .. }) => Ok(()),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await?;
        wait_for_rule(&service, &resource_type, &resource_id, &rule_id, RuleCheck::Delete).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrMap, AttrValue};

    fn base_config() -> AttrMap {
        let mut config = AttrMap::new();
        config.insert("resource_type".to_string(), AttrValue::from("bgpip"));
        config.insert("resource_id".to_string(), AttrValue::from("bgpip-00000001"));
        config.insert("name".to_string(), AttrValue::from("tf-rule"));
        config.insert("domain".to_string(), AttrValue::from("www.example.com"));
        config.insert("protocol".to_string(), AttrValue::from("http"));
        config.insert("source_type".to_string(), AttrValue::from(2));
        config.insert(
            "source_list".to_string(),
            AttrValue::from(vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()]),
        );
        config
    }

    fn data(config: AttrMap) -> ResourceData {
        ResourceData::new(
            "tencentcloud_dayu_l7_rule",
            DayuL7RuleResource.schema(),
            config,
        )
        .unwrap()
    }

    #[test]
    fn https_requires_ssl_id() {
        let mut config = base_config();
        config.insert("protocol".to_string(), AttrValue::from("https"));
        let d = data(config.clone());
        assert!(check_https_ssl("tencentcloud_dayu_l7_rule", &d).is_err());

        config.insert("ssl_id".to_string(), AttrValue::from("ssl-1"));
        let d = data(config);
        assert!(check_https_ssl("tencentcloud_dayu_l7_rule", &d).is_ok());
    }

    #[test]
    fn health_check_needs_multiple_sources() {
        let mut config = base_config();
        config.insert(
            "source_list".to_string(),
            AttrValue::from(vec!["1.1.1.1".to_string()]),
        );
        config.insert("health_check_switch".to_string(), AttrValue::from(true));
        let d = data(config);
        assert!(check_health_sources("tencentcloud_dayu_l7_rule", &d).is_err());

        let mut config = base_config();
        config.insert("health_check_switch".to_string(), AttrValue::from(true));
        let d = data(config);
        assert!(check_health_sources("tencentcloud_dayu_l7_rule", &d).is_ok());
    }

    #[test]
    fn rule_entry_carries_hosted_cert_only_for_https() {
        let mut config = base_config();
        config.insert("protocol".to_string(), AttrValue::from("https"));
        config.insert("ssl_id".to_string(), AttrValue::from("ssl-1"));
        let entry = build_rule_entry(&data(config));
        assert_eq!(entry.cert_type, Some(CERT_TYPE_HOSTED));
        assert_eq!(entry.ssl_id.as_deref(), Some("ssl-1"));
        let sources = entry.source_list.unwrap();
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| s.weight == Some(0)));

        let entry = build_rule_entry(&data(base_config()));
        assert_eq!(entry.cert_type, Some(CERT_TYPE_NONE));
        assert!(entry.ssl_id.is_none());
    }

    #[test]
    fn cc_switch_defaults_to_off() {
        let d = data(base_config());
        assert!(!d.get_bool("switch"));
    }

    #[test]
    fn disabled_health_config_still_sends_zero_values() {
        let health = build_health_config(&data(base_config()));
        assert_eq!(health.enable, 0);
        assert_eq!(health.interval, 0);
        assert_eq!(health.url, "");
    }

    #[test]
    fn protocol_vocabulary_enforced() {
        let mut config = base_config();
        config.insert("protocol".to_string(), AttrValue::from("tcp"));
        assert!(
            ResourceData::new(
                "tencentcloud_dayu_l7_rule",
                DayuL7RuleResource.schema(),
                config,
            )
            .is_err()
        );
    }
}
