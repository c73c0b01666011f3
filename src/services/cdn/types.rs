//! CDN API 线上结构体
//!
//! 域名配置在请求与响应里共用同一批嵌套对象，字段全部可缺省，结构体
//! 同时派生 `Serialize`/`Deserialize` 双向使用。

use serde::{Deserialize, Serialize};

// ============ 域名配置公共对象 ============

/// 只有一个 `Switch` 字段的配置块（Range 回源、IPv6、301/302 跟随等）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SwitchConfig {
    #[serde(rename = "Switch", default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
}

impl SwitchConfig {
    pub fn new(switch: impl Into<String>) -> Self {
        Self {
            switch: Some(switch.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CacheKey {
    #[serde(
        rename = "FullUrlCache",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub full_url_cache: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Origin {
    #[serde(rename = "OriginType", default, skip_serializing_if = "Option::is_none")]
    pub origin_type: Option<String>,
    #[serde(rename = "Origins", default, skip_serializing_if = "Option::is_none")]
    pub origins: Option<Vec<String>>,
    #[serde(rename = "ServerName", default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(
        rename = "CosPrivateAccess",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cos_private_access: Option<String>,
    #[serde(
        rename = "OriginPullProtocol",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub origin_pull_protocol: Option<String>,
    #[serde(
        rename = "BackupOriginType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub backup_origin_type: Option<String>,
    #[serde(
        rename = "BackupOrigins",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub backup_origins: Option<Vec<String>>,
    #[serde(
        rename = "BackupServerName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub backup_server_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Https {
    #[serde(rename = "Switch", default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
    #[serde(rename = "Http2", default, skip_serializing_if = "Option::is_none")]
    pub http2: Option<String>,
    #[serde(
        rename = "OcspStapling",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ocsp_stapling: Option<String>,
    #[serde(rename = "Spdy", default, skip_serializing_if = "Option::is_none")]
    pub spdy: Option<String>,
    #[serde(
        rename = "VerifyClient",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub verify_client: Option<String>,
    #[serde(rename = "CertInfo", default, skip_serializing_if = "Option::is_none")]
    pub cert_info: Option<ServerCert>,
    #[serde(
        rename = "ClientCertInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub client_cert_info: Option<ClientCert>,
}

/// 服务端证书。证书内容与私钥只在上行出现，平台回读时只给摘要字段。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ServerCert {
    #[serde(rename = "CertId", default, skip_serializing_if = "Option::is_none")]
    pub cert_id: Option<String>,
    #[serde(rename = "CertName", default, skip_serializing_if = "Option::is_none")]
    pub cert_name: Option<String>,
    #[serde(
        rename = "Certificate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub certificate: Option<String>,
    #[serde(rename = "PrivateKey", default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(rename = "Message", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "DeployTime", default, skip_serializing_if = "Option::is_none")]
    pub deploy_time: Option<String>,
    #[serde(rename = "ExpireTime", default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ClientCert {
    #[serde(
        rename = "Certificate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub certificate: Option<String>,
    #[serde(rename = "CertName", default, skip_serializing_if = "Option::is_none")]
    pub cert_name: Option<String>,
    #[serde(rename = "DeployTime", default, skip_serializing_if = "Option::is_none")]
    pub deploy_time: Option<String>,
    #[serde(rename = "ExpireTime", default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ForceRedirect {
    #[serde(rename = "Switch", default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
    #[serde(
        rename = "RedirectType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_type: Option<String>,
    #[serde(
        rename = "RedirectStatusCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_status_code: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RequestHeader {
    #[serde(rename = "Switch", default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<String>,
    #[serde(
        rename = "HeaderRules",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub header_rules: Option<Vec<HttpHeaderPathRule>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct HttpHeaderPathRule {
    #[serde(rename = "HeaderMode", default, skip_serializing_if = "Option::is_none")]
    pub header_mode: Option<String>,
    #[serde(rename = "HeaderName", default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(
        rename = "HeaderValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub header_value: Option<String>,
    #[serde(rename = "RuleType", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(rename = "RulePaths", default, skip_serializing_if = "Option::is_none")]
    pub rule_paths: Option<Vec<String>>,
}

// ============ AddCdnDomain ============

#[derive(Debug, Serialize)]
pub(crate) struct AddCdnDomainRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "ServiceType")]
    pub service_type: String,
    #[serde(rename = "ProjectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(rename = "Area", skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(rename = "Origin")]
    pub origin: Origin,
    #[serde(rename = "CacheKey", skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<CacheKey>,
    #[serde(rename = "RangeOriginPull", skip_serializing_if = "Option::is_none")]
    pub range_origin_pull: Option<SwitchConfig>,
    #[serde(rename = "Ipv6Access", skip_serializing_if = "Option::is_none")]
    pub ipv6_access: Option<SwitchConfig>,
    #[serde(rename = "FollowRedirect", skip_serializing_if = "Option::is_none")]
    pub follow_redirect: Option<SwitchConfig>,
    #[serde(rename = "Https", skip_serializing_if = "Option::is_none")]
    pub https: Option<Https>,
    #[serde(rename = "ForceRedirect", skip_serializing_if = "Option::is_none")]
    pub force_redirect: Option<ForceRedirect>,
    #[serde(rename = "RequestHeader", skip_serializing_if = "Option::is_none")]
    pub request_header: Option<RequestHeader>,
}

// ============ UpdateDomainConfig ============

/// 更新只携带发生变化的配置组，其余字段留空表示保持现状。
#[derive(Debug, Default, Serialize)]
pub(crate) struct UpdateDomainConfigRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "ProjectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(rename = "Area", skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(rename = "Origin", skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    #[serde(rename = "CacheKey", skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<CacheKey>,
    #[serde(rename = "RangeOriginPull", skip_serializing_if = "Option::is_none")]
    pub range_origin_pull: Option<SwitchConfig>,
    #[serde(rename = "Ipv6Access", skip_serializing_if = "Option::is_none")]
    pub ipv6_access: Option<SwitchConfig>,
    #[serde(rename = "FollowRedirect", skip_serializing_if = "Option::is_none")]
    pub follow_redirect: Option<SwitchConfig>,
    #[serde(rename = "Https", skip_serializing_if = "Option::is_none")]
    pub https: Option<Https>,
    #[serde(rename = "ForceRedirect", skip_serializing_if = "Option::is_none")]
    pub force_redirect: Option<ForceRedirect>,
    #[serde(rename = "RequestHeader", skip_serializing_if = "Option::is_none")]
    pub request_header: Option<RequestHeader>,
}

// ============ DescribeDomains / DescribeDomainsConfig ============

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DomainFilter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: Vec<String>,
    #[serde(rename = "Fuzzy", skip_serializing_if = "Option::is_none")]
    pub fuzzy: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeDomainsRequest {
    #[serde(rename = "Offset", skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(rename = "Limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(rename = "Filters", skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<DomainFilter>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeDomainsResponse {
    #[serde(rename = "Domains", default)]
    pub domains: Option<Vec<BriefDomain>>,
    #[serde(rename = "TotalNumber", default)]
    pub total_number: Option<i64>,
}

/// `DescribeDomains` 的简要条目，列表阶段只取域名，详情另查。
#[derive(Debug, Deserialize)]
pub(crate) struct BriefDomain {
    #[serde(rename = "Domain", default)]
    pub domain: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeDomainsConfigRequest {
    #[serde(rename = "Offset", skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(rename = "Limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(rename = "Filters", skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<DomainFilter>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeDomainsConfigResponse {
    #[serde(rename = "Domains", default)]
    pub domains: Option<Vec<DetailDomain>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DetailDomain {
    #[serde(rename = "Domain", default)]
    pub domain: Option<String>,
    #[serde(rename = "Cname", default)]
    pub cname: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "CreateTime", default)]
    pub create_time: Option<String>,
    #[serde(rename = "ServiceType", default)]
    pub service_type: Option<String>,
    #[serde(rename = "ProjectId", default)]
    pub project_id: Option<i64>,
    #[serde(rename = "Area", default)]
    pub area: Option<String>,
    #[serde(rename = "Origin", default)]
    pub origin: Option<Origin>,
    #[serde(rename = "CacheKey", default)]
    pub cache_key: Option<CacheKey>,
    #[serde(rename = "RangeOriginPull", default)]
    pub range_origin_pull: Option<SwitchConfig>,
    #[serde(rename = "Ipv6Access", default)]
    pub ipv6_access: Option<SwitchConfig>,
    #[serde(rename = "FollowRedirect", default)]
    pub follow_redirect: Option<SwitchConfig>,
    #[serde(rename = "RequestHeader", default)]
    pub request_header: Option<RequestHeader>,
    #[serde(rename = "Https", default)]
    pub https: Option<Https>,
    #[serde(rename = "ForceRedirect", default)]
    pub force_redirect: Option<ForceRedirect>,
}

// ============ StartCdnDomain / StopCdnDomain / DeleteCdnDomain ============

#[derive(Debug, Serialize)]
pub(crate) struct DomainActionRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
}

// ============ PushUrlsCache / DescribePushTasks ============

#[derive(Debug, Serialize)]
pub(crate) struct PushUrlsCacheRequest {
    #[serde(rename = "Urls")]
    pub urls: Vec<String>,
    #[serde(rename = "Area", skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(rename = "Layer", skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(rename = "ParseM3U8", skip_serializing_if = "Option::is_none")]
    pub parse_m3u8: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PushUrlsCacheResponse {
    #[serde(rename = "TaskId")]
    pub task_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribePushTasksRequest {
    #[serde(rename = "TaskId")]
    pub task_id: String,
    #[serde(rename = "Offset", skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(rename = "Limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribePushTasksResponse {
    #[serde(rename = "PushLogs", default)]
    pub push_logs: Option<Vec<PushTask>>,
    #[serde(rename = "TotalCount", default)]
    pub total_count: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PushTask {
    #[serde(rename = "TaskId", default)]
    pub task_id: Option<String>,
    #[serde(rename = "Url", default)]
    pub url: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Percent", default)]
    pub percent: Option<i64>,
    #[serde(rename = "CreateTime", default)]
    pub create_time: Option<String>,
    #[serde(rename = "UpdateTime", default)]
    pub update_time: Option<String>,
    #[serde(rename = "Area", default)]
    pub area: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_domain_skips_absent_blocks() {
        let req = AddCdnDomainRequest {
            domain: "www.example.com".to_string(),
            service_type: "web".to_string(),
            project_id: Some(0),
            area: None,
            origin: Origin {
                origin_type: Some("ip".to_string()),
                origins: Some(vec!["203.0.113.10".to_string()]),
                ..Origin::default()
            },
            cache_key: Some(CacheKey {
                full_url_cache: Some("on".to_string()),
            }),
            range_origin_pull: Some(SwitchConfig::new("on")),
            ipv6_access: None,
            follow_redirect: None,
            https: None,
            force_redirect: None,
            request_header: None,
        };
        let payload = serde_json::to_value(&req).unwrap();
        assert_eq!(payload["Domain"], "www.example.com");
        assert_eq!(payload["Origin"]["OriginType"], "ip");
        assert_eq!(payload["CacheKey"]["FullUrlCache"], "on");
        assert!(payload.get("Https").is_none());
        assert!(payload.get("Area").is_none());
        assert!(payload["Origin"].get("ServerName").is_none());
    }

    #[test]
    fn update_request_serializes_only_set_groups() {
        let req = UpdateDomainConfigRequest {
            domain: "www.example.com".to_string(),
            https: Some(Https {
                switch: Some("on".to_string()),
                cert_info: Some(ServerCert {
                    cert_id: Some("cert-1".to_string()),
                    ..ServerCert::default()
                }),
                ..Https::default()
            }),
            ..UpdateDomainConfigRequest::default()
        };
        let payload = serde_json::to_value(&req).unwrap();
        assert_eq!(payload["Https"]["Switch"], "on");
        assert_eq!(payload["Https"]["CertInfo"]["CertId"], "cert-1");
        assert!(payload.get("Origin").is_none());
        assert!(payload.get("CacheKey").is_none());
    }

    #[test]
    fn detail_domain_parses_wire_payload() {
        let raw = r#"{
            "Domains": [{
                "Domain": "www.example.com",
                "Cname": "www.example.com.cdn.dnsv1.com",
                "Status": "online",
                "CreateTime": "2024-05-01 10:00:00",
                "ServiceType": "web",
                "ProjectId": 0,
                "Area": "mainland",
                "Origin": {
                    "OriginType": "domain",
                    "Origins": ["origin.example.com"],
                    "ServerName": "origin.example.com",
                    "OriginPullProtocol": "follow"
                },
                "CacheKey": {"FullUrlCache": "off"},
                "RangeOriginPull": {"Switch": "on"},
                "Https": {
                    "Switch": "on",
                    "Http2": "on",
                    "CertInfo": {"CertId": "cert-1", "CertName": "example"}
                },
                "ForceRedirect": {
                    "Switch": "on",
                    "RedirectType": "https",
                    "RedirectStatusCode": 301
                }
            }]
        }"#;
        let resp: DescribeDomainsConfigResponse = serde_json::from_str(raw).unwrap();
        let detail = resp.domains.unwrap().remove(0);
        assert_eq!(detail.status.as_deref(), Some("online"));
        assert_eq!(
            detail.cache_key.as_ref().unwrap().full_url_cache.as_deref(),
            Some("off")
        );
        let origin = detail.origin.unwrap();
        assert_eq!(
            origin.origins.as_deref(),
            Some(&["origin.example.com".to_string()][..])
        );
        let redirect = detail.force_redirect.unwrap();
        assert_eq!(redirect.redirect_status_code, Some(301));
        // 未回传的配置块保持缺省
        assert!(detail.request_header.is_none());
        assert!(detail.ipv6_access.is_none());
    }

    #[test]
    fn brief_domains_parse_wire_payload() {
        let raw = r#"{
            "TotalNumber": 2,
            "Domains": [{"Domain": "img.example.com"}, {"Domain": "js.example.com"}]
        }"#;
        let resp: DescribeDomainsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.total_number, Some(2));
        let domains = resp.domains.unwrap();
        assert_eq!(domains[0].domain.as_deref(), Some("img.example.com"));
    }

    #[test]
    fn push_tasks_parse_wire_payload() {
        let raw = r#"{
            "TotalCount": 2,
            "PushLogs": [
                {"TaskId": "task-1", "Url": "http://www.example.com/a.jpg",
                 "Status": "process", "Percent": 35,
                 "CreateTime": "2024-05-01 10:00:00", "Area": "mainland"},
                {"TaskId": "task-1", "Url": "http://www.example.com/b.jpg",
                 "Status": "done", "Percent": 100,
                 "CreateTime": "2024-05-01 10:00:00", "Area": "mainland"}
            ]
        }"#;
        let resp: DescribePushTasksResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.total_count, Some(2));
        let logs = resp.push_logs.unwrap();
        assert_eq!(logs[0].status.as_deref(), Some("process"));
        assert_eq!(logs[1].percent, Some(100));
        assert!(logs[0].update_time.is_none());
    }
}
