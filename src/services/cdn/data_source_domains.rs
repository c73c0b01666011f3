//! 加速域名列表数据源：`tencentcloud_cdn_domains`。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::Result;
use crate::retry::{self, READ_RETRY_TIMEOUT, retry_error, retry_error_with};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation, data_resource_id_hash,
    write_result_output,
};
use crate::traits::DataSource;

use super::service::CdnService;
use super::types::{DetailDomain, DomainFilter};
use super::{DOMAIN_PAGE_SIZE, SWITCH_OFF, switch_value};

pub struct CdnDomainsDataSource;

fn domain_schema() -> Schema {
    Schema::new([
        ("domain", FieldSchema::string().computed()),
        ("service_type", FieldSchema::string().computed()),
        ("area", FieldSchema::string().computed()),
        ("project_id", FieldSchema::int().computed()),
        ("status", FieldSchema::string().computed()),
        ("cname", FieldSchema::string().computed()),
        ("create_time", FieldSchema::string().computed()),
        ("full_url_cache", FieldSchema::boolean().computed()),
        ("range_origin_switch", FieldSchema::string().computed()),
        ("ipv6_access_switch", FieldSchema::string().computed()),
        ("follow_redirect_switch", FieldSchema::string().computed()),
        ("https_switch", FieldSchema::string().computed()),
        ("origin_type", FieldSchema::string().computed()),
        (
            "origin_list",
            FieldSchema::list(FieldSchema::string()).computed(),
        ),
        ("backup_origin_type", FieldSchema::string().computed()),
        (
            "backup_origin_list",
            FieldSchema::list(FieldSchema::string()).computed(),
        ),
    ])
}

#[async_trait]
impl DataSource for CdnDomainsDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_cdn_domains"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "domain",
                FieldSchema::string()
                    .optional()
                    .desc("Acceleration domain name to query."),
            ),
            (
                "service_type",
                FieldSchema::string()
                    .optional()
                    .validate(Validation::allowed(&["web", "download", "media"]))
                    .desc("Service type filter."),
            ),
            (
                "full_url_cache",
                FieldSchema::boolean()
                    .optional()
                    .desc("Filter by whether full-path cache is enabled."),
            ),
            (
                "https_switch",
                FieldSchema::string()
                    .optional()
                    .validate(Validation::allowed(&["on", "off"]))
                    .desc("Filter by HTTPS configuration switch."),
            ),
            (
                "offset",
                FieldSchema::int().optional().desc("Paging offset."),
            ),
            (
                "limit",
                FieldSchema::int()
                    .optional()
                    .desc("Number of domain names returned, up to 100 per page."),
            ),
            (
                "result_output_file",
                FieldSchema::string()
                    .optional()
                    .desc("Used to save results."),
            ),
            (
                "domain_list",
                FieldSchema::block_list(domain_schema())
                    .computed()
                    .desc("Detail list of acceleration domains."),
            ),
        ])
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = CdnService::new(conn);
        let filters = build_filters(d);
        let offset = d.get_ok_int("offset").unwrap_or(0);
        let limit = d.get_ok_int("limit").unwrap_or(DOMAIN_PAGE_SIZE);

        let names = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .list_domains(filters.clone(), offset, limit)
                .await
                .map_err(retry_error)
        })
        .await?;

        // 明细按域名并发拉取，配置接口偶发 InternalError 时继续等
        let details = retry::within(READ_RETRY_TIMEOUT, || async {
            futures::future::try_join_all(
                names.iter().map(|name| service.describe_domain_config(name)),
            )
            .await
            .map_err(|e| retry_error_with(e, &["InternalError"]))
        })
        .await?;

        let domain_list: Vec<AttrMap> = details
            .into_iter()
            .flatten()
            .map(flatten_domain)
            .collect();

        if let Some(path) = d.get_ok_string("result_output_file") {
            write_result_output(&path, &domain_list)?;
        }
        d.set("domain_list", domain_list)?;
        d.set_id(data_resource_id_hash(&names));
        Ok(())
    }
}

fn build_filters(d: &ResourceData) -> Option<Vec<DomainFilter>> {
    let mut filters = Vec::new();
    if let Some(domain) = d.get_ok_string("domain") {
        filters.push(DomainFilter {
            name: "domain".to_string(),
            value: vec![domain],
            fuzzy: None,
        });
    }
    if let Some(service_type) = d.get_ok_string("service_type") {
        filters.push(DomainFilter {
            name: "serviceType".to_string(),
            value: vec![service_type],
            fuzzy: None,
        });
    }
    // 过滤器走 on/off 字面值，false 不能丢
    if let Some(cache) = d.get("full_url_cache").and_then(AttrValue::as_bool) {
        filters.push(DomainFilter {
            name: "fullUrlCache".to_string(),
            value: vec![switch_value(cache).to_string()],
            fuzzy: None,
        });
    }
    if let Some(https) = d.get_ok_string("https_switch") {
        filters.push(DomainFilter {
            name: "httpsSwitch".to_string(),
            value: vec![https],
            fuzzy: None,
        });
    }
    (!filters.is_empty()).then_some(filters)
}

fn flatten_domain(detail: DetailDomain) -> AttrMap {
    let mut m = AttrMap::new();
    if let Some(domain) = detail.domain {
        m.insert("domain".to_string(), AttrValue::from(domain));
    }
    if let Some(service_type) = detail.service_type {
        m.insert("service_type".to_string(), AttrValue::from(service_type));
    }
    if let Some(area) = detail.area {
        m.insert("area".to_string(), AttrValue::from(area));
    }
    if let Some(project_id) = detail.project_id {
        m.insert("project_id".to_string(), AttrValue::from(project_id));
    }
    if let Some(status) = detail.status {
        m.insert("status".to_string(), AttrValue::from(status));
    }
    if let Some(cname) = detail.cname {
        m.insert("cname".to_string(), AttrValue::from(cname));
    }
    if let Some(create_time) = detail.create_time {
        m.insert("create_time".to_string(), AttrValue::from(create_time));
    }
    let full_url_cache = detail
        .cache_key
        .as_ref()
        .and_then(|c| c.full_url_cache.as_deref())
        != Some(SWITCH_OFF);
    m.insert("full_url_cache".to_string(), AttrValue::Bool(full_url_cache));
    if let Some(switch) = detail.range_origin_pull.and_then(|s| s.switch) {
        m.insert("range_origin_switch".to_string(), AttrValue::from(switch));
    }
    if let Some(switch) = detail.ipv6_access.and_then(|s| s.switch) {
        m.insert("ipv6_access_switch".to_string(), AttrValue::from(switch));
    }
    if let Some(switch) = detail.follow_redirect.and_then(|s| s.switch) {
        m.insert("follow_redirect_switch".to_string(), AttrValue::from(switch));
    }
    if let Some(switch) = detail.https.and_then(|h| h.switch) {
        m.insert("https_switch".to_string(), AttrValue::from(switch));
    }
    if let Some(origin) = detail.origin {
        if let Some(origin_type) = origin.origin_type {
            m.insert("origin_type".to_string(), AttrValue::from(origin_type));
        }
        if let Some(origins) = origin.origins {
            m.insert("origin_list".to_string(), AttrValue::from(origins));
        }
        if let Some(backup_type) = origin.backup_origin_type {
            m.insert("backup_origin_type".to_string(), AttrValue::from(backup_type));
        }
        if let Some(backups) = origin.backup_origins {
            m.insert("backup_origin_list".to_string(), AttrValue::from(backups));
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cdn::types::{CacheKey, Https, Origin};

    #[test]
    fn service_type_filter_vocabulary_enforced() {
        let mut config = AttrMap::new();
        config.insert("service_type".into(), "ftp".into());
        assert!(
            ResourceData::new(
                "tencentcloud_cdn_domains",
                CdnDomainsDataSource.schema(),
                config
            )
            .is_err()
        );
    }

    #[test]
    fn filters_map_bool_to_switch_literal() {
        let mut config = AttrMap::new();
        config.insert("full_url_cache".into(), AttrValue::Bool(false));
        config.insert("https_switch".into(), "on".into());
        let d = ResourceData::new(
            "tencentcloud_cdn_domains",
            CdnDomainsDataSource.schema(),
            config,
        )
        .unwrap();

        let filters = build_filters(&d).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].name, "fullUrlCache");
        assert_eq!(filters[0].value, vec!["off".to_string()]);
        assert_eq!(filters[1].name, "httpsSwitch");
    }

    #[test]
    fn no_inputs_means_no_filters() {
        let d = ResourceData::new(
            "tencentcloud_cdn_domains",
            CdnDomainsDataSource.schema(),
            AttrMap::new(),
        )
        .unwrap();
        assert!(build_filters(&d).is_none());
    }

    #[test]
    fn flatten_derives_switch_attributes() {
        let detail = DetailDomain {
            domain: Some("www.example.com".to_string()),
            service_type: Some("web".to_string()),
            cache_key: Some(CacheKey {
                full_url_cache: Some("off".to_string()),
            }),
            https: Some(Https {
                switch: Some("on".to_string()),
                ..Https::default()
            }),
            origin: Some(Origin {
                origin_type: Some("ip".to_string()),
                origins: Some(vec!["203.0.113.10".to_string()]),
                ..Origin::default()
            }),
            ..DetailDomain::default()
        };

        let m = flatten_domain(detail);
        assert_eq!(m.get("full_url_cache"), Some(&AttrValue::Bool(false)));
        assert_eq!(m.get("https_switch"), Some(&AttrValue::from("on")));
        assert_eq!(m.get("origin_type"), Some(&AttrValue::from("ip")));
        assert!(!m.contains_key("status"));
    }
}
