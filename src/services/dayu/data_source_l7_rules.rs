//! 七层规则列表数据源：`tencentcloud_dayu_l7_rules`。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::Result;
use crate::retry::{self, READ_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation, data_resource_id_hash,
    write_result_output,
};
use crate::traits::DataSource;

use super::service::DayuService;
use super::types::{L7RuleEntry, L7RuleHealth};
use super::{L7_PROTOCOL_HTTPS, RESOURCE_TYPE_BGPIP};

pub struct DayuL7RulesDataSource;

fn flatten_rule(rule: L7RuleEntry, health: Option<&L7RuleHealth>) -> AttrMap {
    let mut m = AttrMap::new();
    // CC 开关的来源字段按协议分家
    let switch_on = if rule.protocol.as_deref() == Some(L7_PROTOCOL_HTTPS) {
        rule.cc_enable.unwrap_or_default() > 0
    } else {
        rule.cc_status.unwrap_or_default() > 0
    };
    m.insert("switch".to_string(), AttrValue::from(switch_on));
    if let Some(protocol) = rule.protocol {
        m.insert("protocol".to_string(), AttrValue::from(protocol));
    }
    if let Some(domain) = rule.domain {
        m.insert("domain".to_string(), AttrValue::from(domain));
    }
    if let Some(rule_id) = rule.rule_id {
        m.insert("rule_id".to_string(), AttrValue::from(rule_id));
    }
    if let Some(name) = rule.rule_name {
        m.insert("name".to_string(), AttrValue::from(name));
    }
    if let Some(ssl_id) = rule.ssl_id {
        m.insert("ssl_id".to_string(), AttrValue::from(ssl_id));
    }
    if let Some(source_type) = rule.source_type {
        m.insert("source_type".to_string(), AttrValue::from(source_type));
    }
    if let Some(status) = rule.status {
        m.insert("status".to_string(), AttrValue::from(status));
    }
    let sources: Vec<String> = rule
        .source_list
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| s.source)
        .collect();
    m.insert("source_list".to_string(), AttrValue::from(sources));

    match health {
        Some(h) => {
            m.insert(
                "health_check_switch".to_string(),
                AttrValue::from(h.enable.unwrap_or_default() > 0),
            );
            if let Some(interval) = h.interval {
                m.insert(
                    "health_check_interval".to_string(),
                    AttrValue::from(interval),
                );
            }
            if let Some(kick_num) = h.kick_num {
                m.insert(
                    "health_check_unhealth_num".to_string(),
                    AttrValue::from(kick_num),
                );
            }
            if let Some(alive_num) = h.alive_num {
                m.insert(
                    "health_check_health_num".to_string(),
                    AttrValue::from(alive_num),
                );
            }
            if let Some(method) = &h.method {
                m.insert(
                    "health_check_method".to_string(),
                    AttrValue::from(method.clone()),
                );
            }
            if let Some(code) = h.status_code {
                m.insert("health_check_code".to_string(), AttrValue::from(code));
            }
            if let Some(url) = &h.url {
                m.insert("health_check_path".to_string(), AttrValue::from(url.clone()));
            }
        }
        None => {
            m.insert("health_check_switch".to_string(), AttrValue::from(false));
        }
    }
    m
}

#[async_trait]
impl DataSource for DayuL7RulesDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_dayu_l7_rules"
    }

    fn schema(&self) -> Schema {
        let rule = Schema::new([
            ("domain", FieldSchema::string().computed()),
            ("protocol", FieldSchema::string().computed()),
            ("rule_id", FieldSchema::string().computed()),
            ("name", FieldSchema::string().computed()),
            ("ssl_id", FieldSchema::string().computed()),
            ("source_type", FieldSchema::int().computed()),
            (
                "source_list",
                FieldSchema::list(FieldSchema::string()).computed(),
            ),
            ("status", FieldSchema::int().computed()),
            ("switch", FieldSchema::boolean().computed()),
            ("health_check_switch", FieldSchema::boolean().computed()),
            ("health_check_interval", FieldSchema::int().computed()),
            ("health_check_health_num", FieldSchema::int().computed()),
            ("health_check_unhealth_num", FieldSchema::int().computed()),
            ("health_check_code", FieldSchema::int().computed()),
            ("health_check_path", FieldSchema::string().computed()),
            ("health_check_method", FieldSchema::string().computed()),
        ]);
        Schema::new([
            (
                "resource_type",
                FieldSchema::string()
                    .required()
                    .validate(Validation::allowed(&[RESOURCE_TYPE_BGPIP]))
                    .desc("Type of the protection instance."),
            ),
            (
                "resource_id",
                FieldSchema::string()
                    .required()
                    .desc("ID of the protection instance."),
            ),
            (
                "domain",
                FieldSchema::string()
                    .optional()
                    .desc("Domain to filter the rules by."),
            ),
            (
                "rule_id",
                FieldSchema::string()
                    .optional()
                    .desc("Rule ID to filter the rules by."),
            ),
            (
                "result_output_file",
                FieldSchema::string()
                    .optional()
                    .desc("Used to save results."),
            ),
            (
                "list",
                FieldSchema::block_list(rule)
                    .computed()
                    .desc("List of layer 7 rules."),
            ),
        ])
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let resource_type = d.get_string("resource_type");
        let resource_id = d.get_string("resource_id");
        let domain = d.get_ok_string("domain");
        let wanted_rule = d.get_ok_string("rule_id");

        let service = DayuService::new(conn);
        let (rules, healths) = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .list_l7_rules(&resource_type, &resource_id, domain.as_deref())
                .await
                .map_err(retry_error)
        })
        .await?;

        let mut ids = vec![resource_id.clone()];
        let mut items = Vec::new();
        for rule in rules {
            if let Some(wanted) = &wanted_rule {
                if rule.rule_id.as_deref() != Some(wanted.as_str()) {
                    continue;
                }
            }
            let health = rule
                .rule_id
                .as_deref()
                .and_then(|id| healths.iter().find(|h| h.rule_id.as_deref() == Some(id)));
            if let Some(id) = &rule.rule_id {
                ids.push(id.clone());
            }
            items.push(flatten_rule(rule, health));
        }

        if let Some(path) = d.get_ok_string("result_output_file") {
            write_result_output(&path, &items)?;
        }
        d.set("list", items)?;
        d.set_id(data_resource_id_hash(&ids));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dayu::types::RuleSource;

    #[test]
    fn switch_reads_protocol_specific_field() {
        let http = L7RuleEntry {
            protocol: Some("http".to_string()),
            cc_status: Some(1),
            cc_enable: Some(0),
            ..L7RuleEntry::default()
        };
        let https = L7RuleEntry {
            protocol: Some("https".to_string()),
            cc_status: Some(1),
            cc_enable: Some(0),
            ..L7RuleEntry::default()
        };
        assert_eq!(
            flatten_rule(http, None).get("switch"),
            Some(&AttrValue::from(true))
        );
        assert_eq!(
            flatten_rule(https, None).get("switch"),
            Some(&AttrValue::from(false))
        );
    }

    #[test]
    fn flatten_collects_sources_and_health() {
        let rule = L7RuleEntry {
            protocol: Some("http".to_string()),
            domain: Some("www.example.com".to_string()),
            rule_id: Some("rule-1".to_string()),
            rule_name: Some("web".to_string()),
            source_list: Some(vec![
                RuleSource {
                    source: Some("1.1.1.1".to_string()),
                    weight: Some(0),
                },
                RuleSource {
                    source: Some("2.2.2.2".to_string()),
                    weight: Some(0),
                },
            ]),
            ..L7RuleEntry::default()
        };
        let health = L7RuleHealth {
            rule_id: Some("rule-1".to_string()),
            enable: Some(1),
            interval: Some(30),
            kick_num: Some(3),
            alive_num: Some(2),
            method: Some("GET".to_string()),
            status_code: Some(26),
            url: Some("/".to_string()),
            status: Some(1),
        };
        let m = flatten_rule(rule, Some(&health));
        assert_eq!(
            m.get("source_list"),
            Some(&AttrValue::from(vec![
                "1.1.1.1".to_string(),
                "2.2.2.2".to_string()
            ]))
        );
        assert_eq!(
            m.get("health_check_switch"),
            Some(&AttrValue::from(true))
        );
        assert_eq!(m.get("health_check_unhealth_num"), Some(&AttrValue::from(3)));
        assert_eq!(m.get("health_check_health_num"), Some(&AttrValue::from(2)));
    }

    #[test]
    fn missing_health_reports_disabled_check() {
        let m = flatten_rule(L7RuleEntry::default(), None);
        assert_eq!(
            m.get("health_check_switch"),
            Some(&AttrValue::from(false))
        );
        assert!(!m.contains_key("health_check_interval"));
    }

    #[test]
    fn resource_type_vocabulary_enforced() {
        let mut config = AttrMap::new();
        config.insert("resource_type".to_string(), AttrValue::from("bgp"));
        config.insert("resource_id".to_string(), AttrValue::from("bgpip-000001"));
        assert!(
            ResourceData::new(
                "tencentcloud_dayu_l7_rules",
                DayuL7RulesDataSource.schema(),
                config,
            )
            .is_err()
        );
    }
}
