//! 加速域名资源：`tencentcloud_cdn_domain`，ID 就是域名。
//!
//! 域名建站与配置变更都是异步的，平台把过渡期表示为 `processing`
//! 状态，写操作后都要等状态落定再继续。

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ErrorCollector, ProviderError, Result};
use crate::retry::{
    self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error, retry_error_with,
};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation, block_string, first_block,
};
use crate::services::tag::{TagService, build_tag_resource_name, diff_tags};
use crate::traits::Resource;

use super::service::CdnService;
use super::types::{
    AddCdnDomainRequest, CacheKey, ClientCert, DetailDomain, ForceRedirect, Https,
    HttpHeaderPathRule, Origin, RequestHeader, ServerCert, SwitchConfig, UpdateDomainConfigRequest,
};
use super::{
    DOMAIN_STATUS_ONLINE, DOMAIN_STATUS_PROCESSING, SWITCH_OFF, TAG_RESOURCE_PREFIX,
    TAG_SERVICE_TYPE, switch_value,
};

/// 码的家族前缀在重试白名单里，但这两类配置失败重试无法恢复
const CODE_CONFIG_ERROR: &str = "FailedOperation.CdnConfigError";
const CODE_HOST_EXISTS: &str = "ResourceInUse.CdnHostExists";

pub struct CdnDomainResource;

fn origin_schema() -> Schema {
    Schema::new([
        (
            "origin_type",
            FieldSchema::string()
                .required()
                .validate(Validation::allowed(&[
                    "domain", "cos", "ip", "ipv6", "ip_ipv6",
                ]))
                .desc("Master origin server type."),
        ),
        (
            "origin_list",
            FieldSchema::list(FieldSchema::string())
                .required()
                .desc("Master origin server list, IPs or domain names."),
        ),
        (
            "server_name",
            FieldSchema::string()
                .optional()
                .computed()
                .desc("Host header used when accessing the master origin server."),
        ),
        (
            "cos_private_access",
            FieldSchema::string()
                .optional()
                .default_value("off")
                .desc("Whether access to private COS buckets is allowed when origin_type is cos."),
        ),
        (
            "origin_pull_protocol",
            FieldSchema::string()
                .optional()
                .default_value("http")
                .validate(Validation::allowed(&["http", "follow", "https"]))
                .desc("Origin-pull protocol configuration."),
        ),
        (
            "backup_origin_type",
            FieldSchema::string()
                .optional()
                .validate(Validation::allowed(&["domain", "ip"]))
                .desc("Backup origin server type."),
        ),
        (
            "backup_origin_list",
            FieldSchema::list(FieldSchema::string())
                .optional()
                .desc("Backup origin server list."),
        ),
        (
            "backup_server_name",
            FieldSchema::string()
                .optional()
                .desc("Host header used when accessing the backup origin server."),
        ),
    ])
}

fn server_certificate_schema() -> Schema {
    Schema::new([
        (
            "certificate_id",
            FieldSchema::string().optional().desc("Server certificate ID."),
        ),
        (
            "certificate_name",
            FieldSchema::string().computed().desc("Server certificate name."),
        ),
        (
            "certificate_content",
            FieldSchema::string()
                .optional()
                .desc("Server certificate information, complete certificate chain."),
        ),
        (
            "private_key",
            FieldSchema::string()
                .optional()
                .desc("Server key information for an uploaded certificate."),
        ),
        (
            "message",
            FieldSchema::string().optional().desc("Certificate remarks."),
        ),
        (
            "deploy_time",
            FieldSchema::string().computed().desc("Deploy time of the certificate."),
        ),
        (
            "expire_time",
            FieldSchema::string().computed().desc("Expire time of the certificate."),
        ),
    ])
}

fn client_certificate_schema() -> Schema {
    Schema::new([
        (
            "certificate_content",
            FieldSchema::string()
                .required()
                .desc("Client certificate, PEM format."),
        ),
        (
            "certificate_name",
            FieldSchema::string().computed().desc("Client certificate name."),
        ),
        (
            "deploy_time",
            FieldSchema::string().computed().desc("Deploy time of the certificate."),
        ),
        (
            "expire_time",
            FieldSchema::string().computed().desc("Expire time of the certificate."),
        ),
    ])
}

fn force_redirect_schema() -> Schema {
    Schema::new([
        (
            "switch",
            FieldSchema::string()
                .optional()
                .default_value("off")
                .validate(Validation::allowed(&["on", "off"]))
                .desc("Forced redirect configuration switch."),
        ),
        (
            "redirect_type",
            FieldSchema::string()
                .optional()
                .default_value("http")
                .validate(Validation::allowed(&["http", "https"]))
                .desc("Forced redirect type."),
        ),
        (
            "redirect_status_code",
            FieldSchema::int()
                .optional()
                .default_value(302_i64)
                .validate(Validation::int_range(301, 302))
                .desc("Forced redirect status code, 301 or 302."),
        ),
    ])
}

fn https_schema() -> Schema {
    Schema::new([
        (
            "https_switch",
            FieldSchema::string()
                .required()
                .validate(Validation::allowed(&["on", "off"]))
                .desc("HTTPS configuration switch."),
        ),
        (
            "http2_switch",
            FieldSchema::string()
                .optional()
                .default_value("off")
                .validate(Validation::allowed(&["on", "off"]))
                .desc("HTTP2 configuration switch."),
        ),
        (
            "ocsp_stapling_switch",
            FieldSchema::string()
                .optional()
                .default_value("off")
                .validate(Validation::allowed(&["on", "off"]))
                .desc("OCSP configuration switch."),
        ),
        (
            "spdy_switch",
            FieldSchema::string()
                .optional()
                .default_value("off")
                .validate(Validation::allowed(&["on", "off"]))
                .desc("Spdy configuration switch, for allow-listed accounts."),
        ),
        (
            "verify_client",
            FieldSchema::string()
                .optional()
                .default_value("off")
                .validate(Validation::allowed(&["on", "off"]))
                .desc("Client certificate authentication feature."),
        ),
        (
            "server_certificate_config",
            FieldSchema::block(server_certificate_schema())
                .optional()
                .desc("Server certificate configuration."),
        ),
        (
            "client_certificate_config",
            FieldSchema::block(client_certificate_schema())
                .optional()
                .desc("Client certificate configuration."),
        ),
        (
            "force_redirect",
            FieldSchema::block(force_redirect_schema())
                .optional()
                .computed()
                .desc("Configuration of forced HTTP or HTTPS redirects."),
        ),
    ])
}

fn header_rule_schema() -> Schema {
    Schema::new([
        (
            "header_mode",
            FieldSchema::string()
                .required()
                .validate(Validation::allowed(&["add", "set", "del"]))
                .desc("HTTP header setting method."),
        ),
        (
            "header_name",
            FieldSchema::string()
                .required()
                .validate(Validation::string_length(1, 100))
                .desc("HTTP header name."),
        ),
        (
            "header_value",
            FieldSchema::string()
                .required()
                .validate(Validation::string_length(1, 1000))
                .desc("HTTP header value."),
        ),
        (
            "rule_type",
            FieldSchema::string()
                .required()
                .validate(Validation::allowed(&["all", "file", "directory", "path"]))
                .desc("Rule type deciding which requests the header applies to."),
        ),
        (
            "rule_paths",
            FieldSchema::list(FieldSchema::string())
                .required()
                .desc("Matching content under the rule type."),
        ),
    ])
}

fn request_header_schema() -> Schema {
    Schema::new([
        (
            "switch",
            FieldSchema::string()
                .optional()
                .default_value("off")
                .validate(Validation::allowed(&["on", "off"]))
                .desc("Custom request header configuration switch."),
        ),
        (
            "header_rules",
            FieldSchema::block_list(header_rule_schema())
                .optional()
                .desc("Custom request header configuration rules."),
        ),
    ])
}

#[async_trait]
impl Resource for CdnDomainResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_cdn_domain"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "domain",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("Name of the acceleration domain."),
            ),
            (
                "service_type",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .validate(Validation::allowed(&["web", "download", "media"]))
                    .desc("Acceleration domain name service type."),
            ),
            (
                "project_id",
                FieldSchema::int()
                    .optional()
                    .default_value(0_i64)
                    .desc("The project CDN belongs to, default to 0."),
            ),
            (
                "area",
                FieldSchema::string()
                    .optional()
                    .validate(Validation::allowed(&["mainland", "overseas", "global"]))
                    .desc("Domain name acceleration region."),
            ),
            (
                "full_url_cache",
                FieldSchema::boolean()
                    .optional()
                    .default_value(true)
                    .desc("Whether to enable full-path cache."),
            ),
            (
                "range_origin_switch",
                FieldSchema::string()
                    .optional()
                    .default_value("on")
                    .validate(Validation::allowed(&["on", "off"]))
                    .desc("Sharding back to source configuration switch."),
            ),
            (
                "ipv6_access_switch",
                FieldSchema::string()
                    .optional()
                    .default_value("off")
                    .validate(Validation::allowed(&["on", "off"]))
                    .desc("IPv6 access configuration switch, only available in mainland."),
            ),
            (
                "follow_redirect_switch",
                FieldSchema::string()
                    .optional()
                    .default_value("off")
                    .validate(Validation::allowed(&["on", "off"]))
                    .desc("301/302 redirect following switch."),
            ),
            (
                "origin",
                FieldSchema::block(origin_schema())
                    .required()
                    .desc("Origin server configuration."),
            ),
            (
                "https_config",
                FieldSchema::block(https_schema())
                    .optional()
                    .computed()
                    .desc("HTTPS acceleration configuration."),
            ),
            (
                "request_header",
                FieldSchema::block(request_header_schema())
                    .optional()
                    .computed()
                    .desc("Request header configuration."),
            ),
            (
                "tags",
                FieldSchema::string_map().optional().desc("Tags of the CDN domain."),
            ),
            (
                "status",
                FieldSchema::string().computed().desc("Acceleration service status."),
            ),
            (
                "cname",
                FieldSchema::string().computed().desc("CNAME address of the domain name."),
            ),
            (
                "create_time",
                FieldSchema::string().computed().desc("Creation time of the domain name."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = CdnService::new(conn);
        let domain = d.get_string("domain");
        let req = build_add_request(d)?;

        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service.add_domain(&req).await.map_err(classify_config_write)
        })
        .await?;
        d.set_id(&domain);

        wait_until_settled(&service, &domain).await?;

        let tags = d.get_string_map("tags");
        if !tags.is_empty() {
            let resource_name = build_tag_resource_name(
                TAG_SERVICE_TYPE,
                TAG_RESOURCE_PREFIX,
                conn.region(),
                &domain,
            );
            let tag_service = TagService::new(conn);
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                tag_service
                    .modify_tags(&resource_name, &tags, &[])
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = CdnService::new(conn);
        let domain = d.id().to_string();
        let detail = match retry::within(READ_RETRY_TIMEOUT * 5, || async {
            service
                .describe_domain_config(&domain)
                .await
                .map_err(|e| retry_error_with(e, &["InternalError"]))
        })
        .await
        {
            Ok(detail) => detail,
            Err(ProviderError::ResourceNotFound { .. }) => {
                d.set_id("");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let Some(detail) = detail else {
            d.set_id("");
            return Ok(());
        };

        // 配置组各自回填，单组失败不挡其余属性
        let mut collector = ErrorCollector::new(self.type_name());
        collector.record(flatten_basic(d, &domain, &detail));
        collector.record(flatten_origin(d, detail.origin.as_ref()));
        collector.record(flatten_request_header(d, detail.request_header.as_ref()));
        collector.record(flatten_https(d, &detail));

        let tag_service = TagService::new(conn);
        let tags = retry::within(READ_RETRY_TIMEOUT, || async {
            tag_service
                .describe_resource_tags(TAG_SERVICE_TYPE, TAG_RESOURCE_PREFIX, &domain)
                .await
                .map_err(retry_error)
        })
        .await;
        collector.record(tags.and_then(|t| d.set("tags", t).map_err(Into::into)));

        collector.finish()
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        for arg in ["domain", "service_type"] {
            if d.has_change(arg) {
                return Err(ProviderError::UnsupportedOperation {
                    product: self.type_name().to_string(),
                    detail: format!("argument `{arg}` cannot be changed"),
                });
            }
        }

        let service = CdnService::new(conn);
        let domain = d.id().to_string();
        let mut req = UpdateDomainConfigRequest {
            domain: domain.clone(),
            ..UpdateDomainConfigRequest::default()
        };
        let mut changed = false;

        if d.has_change("project_id") {
            req.project_id = Some(d.get_int("project_id"));
            changed = true;
        }
        if d.has_change("area") {
            req.area = d.get_ok_string("area");
            changed = true;
        }
        if d.has_change("full_url_cache") {
            req.cache_key = Some(CacheKey {
                full_url_cache: Some(switch_value(d.get_bool("full_url_cache")).to_string()),
            });
            changed = true;
        }
        if d.has_change("range_origin_switch") {
            req.range_origin_pull = Some(SwitchConfig::new(d.get_string("range_origin_switch")));
            changed = true;
        }
        if d.has_change("ipv6_access_switch") {
            req.ipv6_access = Some(SwitchConfig::new(d.get_string("ipv6_access_switch")));
            changed = true;
        }
        if d.has_change("follow_redirect_switch") {
            req.follow_redirect = Some(SwitchConfig::new(d.get_string("follow_redirect_switch")));
            changed = true;
        }
        if d.has_change("origin") {
            req.origin = Some(required_origin(d)?);
            changed = true;
        }
        if d.has_change("request_header") {
            req.request_header = d.get_block("request_header").map(build_request_header);
            changed = true;
        }
        if d.has_change("https_config")
            && let Some(config) = d.get_block("https_config")
        {
            req.https = Some(build_https(config));
            req.force_redirect = build_force_redirect(config);
            changed = true;
        }

        if changed {
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .update_domain_config(&req)
                    .await
                    .map_err(classify_config_write)
            })
            .await?;
            wait_until_settled(&service, &domain).await?;
        }

        if d.has_change("tags") {
            let (old, new) = d.get_change("tags");
            let old = old.as_string_map().unwrap_or_default();
            let new = new.as_string_map().unwrap_or_default();
            let (replace, delete) = diff_tags(&old, &new);
            let resource_name = build_tag_resource_name(
                TAG_SERVICE_TYPE,
                TAG_RESOURCE_PREFIX,
                conn.region(),
                &domain,
            );
            let tag_service = TagService::new(conn);
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                tag_service
                    .modify_tags(&resource_name, &replace, &delete)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = CdnService::new(conn);
        let domain = d.id().to_string();

        let tags = d.get_string_map("tags");
        if !tags.is_empty() {
            let resource_name = build_tag_resource_name(
                TAG_SERVICE_TYPE,
                TAG_RESOURCE_PREFIX,
                conn.region(),
                &domain,
            );
            let tag_service = TagService::new(conn);
            let delete_keys: Vec<String> = tags.into_keys().collect();
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                tag_service
                    .modify_tags(&resource_name, &BTreeMap::new(), &delete_keys)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        let detail = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_domain_config(&domain)
                .await
                .map_err(|e| retry_error_with(e, &["InternalError"]))
        })
        .await?;
        let Some(detail) = detail else {
            return Ok(());
        };

        // 在线域名要先下线才能删除
        if detail.status.as_deref() == Some(DOMAIN_STATUS_ONLINE) {
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service.stop_domain(&domain).await.map_err(retry_error)
            })
            .await?;
            wait_until_settled(&service, &domain).await?;
        }

        retry::within(WRITE_RETRY_TIMEOUT, || async {
            match service.delete_domain(&domain).await {
                Ok(()) | Err(ProviderError::ResourceNotFound { .. }) => Ok(()),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await
    }
}

/// 配置不合法、域名已被其他账号接入，直接终止写入重试。
fn classify_config_write(err: ProviderError) -> Retry {
    if matches!(err.api_code(), Some(CODE_CONFIG_ERROR | CODE_HOST_EXISTS)) {
        return Retry::Fatal(err);
    }
    retry_error(err)
}

/// 等域名离开 `processing`，预算是读超时的五倍。
async fn wait_until_settled(service: &CdnService, domain: &str) -> Result<()> {
    retry::within(READ_RETRY_TIMEOUT * 5, || async {
        let detail = match service.describe_domain_config(domain).await {
            Ok(detail) => detail,
            Err(e) => return Err(retry_error_with(e, &["InternalError"])),
        };
        match detail.as_ref().and_then(|c| c.status.as_deref()) {
            Some(DOMAIN_STATUS_PROCESSING) => Err(Retry::not_ready(
                "cdn",
                format!("domain {domain} is still processing"),
            )),
            _ => Ok(()),
        }
    })
    .await
}

fn required_origin(d: &ResourceData) -> Result<Origin> {
    d.get_block("origin")
        .map(build_origin)
        .ok_or_else(|| ProviderError::InvalidParameter {
            product: "cdn".to_string(),
            param: "origin".to_string(),
            detail: "origin block is required".to_string(),
        })
}

fn build_add_request(d: &ResourceData) -> Result<AddCdnDomainRequest> {
    let https_block = d.get_block("https_config");
    Ok(AddCdnDomainRequest {
        domain: d.get_string("domain"),
        service_type: d.get_string("service_type"),
        project_id: Some(d.get_int("project_id")),
        area: d.get_ok_string("area"),
        origin: required_origin(d)?,
        cache_key: Some(CacheKey {
            full_url_cache: Some(switch_value(d.get_bool("full_url_cache")).to_string()),
        }),
        range_origin_pull: d.get_ok_string("range_origin_switch").map(SwitchConfig::new),
        ipv6_access: d.get_ok_string("ipv6_access_switch").map(SwitchConfig::new),
        follow_redirect: d
            .get_ok_string("follow_redirect_switch")
            .map(SwitchConfig::new),
        https: https_block.map(build_https),
        force_redirect: https_block.and_then(build_force_redirect),
        request_header: d.get_block("request_header").map(build_request_header),
    })
}

fn build_origin(block: &AttrMap) -> Origin {
    Origin {
        origin_type: block_string(block, "origin_type"),
        origins: block.get("origin_list").and_then(AttrValue::as_string_list),
        server_name: block_string(block, "server_name").filter(|s| !s.is_empty()),
        cos_private_access: block_string(block, "cos_private_access").filter(|s| !s.is_empty()),
        origin_pull_protocol: block_string(block, "origin_pull_protocol")
            .filter(|s| !s.is_empty()),
        backup_origin_type: block_string(block, "backup_origin_type").filter(|s| !s.is_empty()),
        backup_origins: block
            .get("backup_origin_list")
            .and_then(AttrValue::as_string_list)
            .filter(|l| !l.is_empty()),
        backup_server_name: block_string(block, "backup_server_name").filter(|s| !s.is_empty()),
    }
}

fn build_https(config: &AttrMap) -> Https {
    let cert_info = first_block(config, "server_certificate_config").map(|server| ServerCert {
        cert_id: block_string(server, "certificate_id").filter(|s| !s.is_empty()),
        certificate: block_string(server, "certificate_content").filter(|s| !s.is_empty()),
        private_key: block_string(server, "private_key").filter(|s| !s.is_empty()),
        message: block_string(server, "message").filter(|s| !s.is_empty()),
        ..ServerCert::default()
    });
    let client_cert_info = first_block(config, "client_certificate_config").map(|client| {
        ClientCert {
            certificate: block_string(client, "certificate_content"),
            ..ClientCert::default()
        }
    });
    Https {
        switch: block_string(config, "https_switch"),
        http2: block_string(config, "http2_switch").filter(|s| !s.is_empty()),
        ocsp_stapling: block_string(config, "ocsp_stapling_switch"),
        spdy: block_string(config, "spdy_switch"),
        verify_client: block_string(config, "verify_client"),
        cert_info,
        client_cert_info,
    }
}

/// 强制跳转在数据模型里挂在 `https_config` 下，上行时是顶层对象。
fn build_force_redirect(config: &AttrMap) -> Option<ForceRedirect> {
    let block = first_block(config, "force_redirect")?;
    Some(ForceRedirect {
        switch: block_string(block, "switch").filter(|s| !s.is_empty()),
        redirect_type: block_string(block, "redirect_type").filter(|s| !s.is_empty()),
        redirect_status_code: block
            .get("redirect_status_code")
            .and_then(AttrValue::as_int)
            .filter(|c| *c != 0),
    })
}

fn build_request_header(block: &AttrMap) -> RequestHeader {
    let header_rules = block.get("header_rules").and_then(AttrValue::as_list).map(|items| {
        items
            .iter()
            .filter_map(AttrValue::as_map)
            .map(|rule| HttpHeaderPathRule {
                header_mode: block_string(rule, "header_mode"),
                header_name: block_string(rule, "header_name"),
                header_value: block_string(rule, "header_value"),
                rule_type: block_string(rule, "rule_type"),
                rule_paths: rule.get("rule_paths").and_then(AttrValue::as_string_list),
            })
            .collect::<Vec<_>>()
    });
    RequestHeader {
        switch: block_string(block, "switch"),
        header_rules: header_rules.filter(|rules| !rules.is_empty()),
    }
}

fn flatten_basic(d: &mut ResourceData, domain: &str, detail: &DetailDomain) -> Result<()> {
    d.set("domain", domain)?;
    if let Some(service_type) = &detail.service_type {
        d.set("service_type", service_type.clone())?;
    }
    if let Some(project_id) = detail.project_id {
        d.set("project_id", project_id)?;
    }
    if let Some(area) = &detail.area {
        d.set("area", area.clone())?;
    }
    if let Some(status) = &detail.status {
        d.set("status", status.clone())?;
    }
    if let Some(cname) = &detail.cname {
        d.set("cname", cname.clone())?;
    }
    if let Some(create_time) = &detail.create_time {
        d.set("create_time", create_time.clone())?;
    }
    if let Some(switch) = detail.range_origin_pull.as_ref().and_then(|s| s.switch.clone()) {
        d.set("range_origin_switch", switch)?;
    }
    if let Some(switch) = detail.ipv6_access.as_ref().and_then(|s| s.switch.clone()) {
        d.set("ipv6_access_switch", switch)?;
    }
    if let Some(switch) = detail.follow_redirect.as_ref().and_then(|s| s.switch.clone()) {
        d.set("follow_redirect_switch", switch)?;
    }
    let full_url_cache = detail
        .cache_key
        .as_ref()
        .and_then(|c| c.full_url_cache.as_deref())
        != Some(SWITCH_OFF);
    d.set("full_url_cache", full_url_cache)?;
    Ok(())
}

fn flatten_origin(d: &mut ResourceData, origin: Option<&Origin>) -> Result<()> {
    let Some(origin) = origin else {
        return Ok(());
    };
    let mut block = AttrMap::new();
    if let Some(origin_type) = &origin.origin_type {
        block.insert("origin_type".to_string(), AttrValue::from(origin_type.clone()));
    }
    if let Some(origins) = &origin.origins {
        block.insert("origin_list".to_string(), AttrValue::from(origins.clone()));
    }
    if let Some(server_name) = &origin.server_name {
        block.insert("server_name".to_string(), AttrValue::from(server_name.clone()));
    }
    if let Some(access) = &origin.cos_private_access {
        block.insert("cos_private_access".to_string(), AttrValue::from(access.clone()));
    }
    if let Some(protocol) = &origin.origin_pull_protocol {
        block.insert(
            "origin_pull_protocol".to_string(),
            AttrValue::from(protocol.clone()),
        );
    }
    if let Some(backup_type) = &origin.backup_origin_type {
        block.insert(
            "backup_origin_type".to_string(),
            AttrValue::from(backup_type.clone()),
        );
    }
    if let Some(backups) = &origin.backup_origins {
        block.insert(
            "backup_origin_list".to_string(),
            AttrValue::from(backups.clone()),
        );
    }
    if let Some(backup_name) = &origin.backup_server_name {
        block.insert(
            "backup_server_name".to_string(),
            AttrValue::from(backup_name.clone()),
        );
    }
    d.set("origin", vec![block])?;
    Ok(())
}

fn flatten_request_header(d: &mut ResourceData, header: Option<&RequestHeader>) -> Result<()> {
    let Some(header) = header else {
        return Ok(());
    };
    let mut block = AttrMap::new();
    if let Some(switch) = &header.switch {
        block.insert("switch".to_string(), AttrValue::from(switch.clone()));
    }
    if let Some(rules) = &header.header_rules
        && !rules.is_empty()
    {
        let flattened: Vec<AttrMap> = rules
            .iter()
            .map(|rule| {
                let mut map = AttrMap::new();
                if let Some(mode) = &rule.header_mode {
                    map.insert("header_mode".to_string(), AttrValue::from(mode.clone()));
                }
                if let Some(name) = &rule.header_name {
                    map.insert("header_name".to_string(), AttrValue::from(name.clone()));
                }
                if let Some(value) = &rule.header_value {
                    map.insert("header_value".to_string(), AttrValue::from(value.clone()));
                }
                if let Some(rule_type) = &rule.rule_type {
                    map.insert("rule_type".to_string(), AttrValue::from(rule_type.clone()));
                }
                if let Some(paths) = &rule.rule_paths {
                    map.insert("rule_paths".to_string(), AttrValue::from(paths.clone()));
                }
                map
            })
            .collect();
        block.insert("header_rules".to_string(), AttrValue::from(flattened));
    }
    d.set("request_header", vec![block])?;
    Ok(())
}

fn flatten_https(d: &mut ResourceData, detail: &DetailDomain) -> Result<()> {
    let Some(https) = detail.https.as_ref() else {
        return Ok(());
    };

    // 证书内容与私钥平台不回传，沿用本地config里的旧值
    let prior = d.get_block("https_config").cloned().unwrap_or_default();
    let prior_server = first_block(&prior, "server_certificate_config")
        .cloned()
        .unwrap_or_default();
    let prior_client = first_block(&prior, "client_certificate_config")
        .cloned()
        .unwrap_or_default();

    let mut block = AttrMap::new();
    if let Some(switch) = &https.switch {
        block.insert("https_switch".to_string(), AttrValue::from(switch.clone()));
    }
    if let Some(http2) = &https.http2 {
        block.insert("http2_switch".to_string(), AttrValue::from(http2.clone()));
    }
    if let Some(ocsp) = &https.ocsp_stapling {
        block.insert("ocsp_stapling_switch".to_string(), AttrValue::from(ocsp.clone()));
    }
    if let Some(spdy) = &https.spdy {
        block.insert("spdy_switch".to_string(), AttrValue::from(spdy.clone()));
    }
    if let Some(verify) = &https.verify_client {
        block.insert("verify_client".to_string(), AttrValue::from(verify.clone()));
    }

    if let Some(cert) = &https.cert_info
        && cert.cert_name.is_some()
    {
        let mut server = AttrMap::new();
        if let Some(cert_id) = &cert.cert_id {
            server.insert("certificate_id".to_string(), AttrValue::from(cert_id.clone()));
        }
        if let Some(cert_name) = &cert.cert_name {
            server.insert(
                "certificate_name".to_string(),
                AttrValue::from(cert_name.clone()),
            );
        }
        if let Some(content) = prior_server.get("certificate_content") {
            server.insert("certificate_content".to_string(), content.clone());
        }
        if let Some(key) = prior_server.get("private_key") {
            server.insert("private_key".to_string(), key.clone());
        }
        if let Some(message) = &cert.message {
            server.insert("message".to_string(), AttrValue::from(message.clone()));
        }
        if let Some(deploy_time) = &cert.deploy_time {
            server.insert("deploy_time".to_string(), AttrValue::from(deploy_time.clone()));
        }
        if let Some(expire_time) = &cert.expire_time {
            server.insert("expire_time".to_string(), AttrValue::from(expire_time.clone()));
        }
        block.insert(
            "server_certificate_config".to_string(),
            AttrValue::from(vec![server]),
        );
    }

    if let Some(cert) = &https.client_cert_info
        && cert.cert_name.is_some()
    {
        let mut client = AttrMap::new();
        if let Some(content) = prior_client.get("certificate_content") {
            client.insert("certificate_content".to_string(), content.clone());
        }
        if let Some(cert_name) = &cert.cert_name {
            client.insert(
                "certificate_name".to_string(),
                AttrValue::from(cert_name.clone()),
            );
        }
        if let Some(deploy_time) = &cert.deploy_time {
            client.insert("deploy_time".to_string(), AttrValue::from(deploy_time.clone()));
        }
        if let Some(expire_time) = &cert.expire_time {
            client.insert("expire_time".to_string(), AttrValue::from(expire_time.clone()));
        }
        block.insert(
            "client_certificate_config".to_string(),
            AttrValue::from(vec![client]),
        );
    }

    if let Some(redirect) = &detail.force_redirect {
        let mut map = AttrMap::new();
        if let Some(switch) = &redirect.switch {
            map.insert("switch".to_string(), AttrValue::from(switch.clone()));
        }
        if let Some(redirect_type) = &redirect.redirect_type {
            map.insert("redirect_type".to_string(), AttrValue::from(redirect_type.clone()));
        }
        if let Some(code) = redirect.redirect_status_code {
            map.insert("redirect_status_code".to_string(), AttrValue::from(code));
        }
        block.insert("force_redirect".to_string(), AttrValue::from(vec![map]));
    }

    d.set("https_config", vec![block])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AttrMap {
        let mut origin = AttrMap::new();
        origin.insert("origin_type".into(), "ip".into());
        origin.insert(
            "origin_list".into(),
            AttrValue::from(vec!["203.0.113.10".to_string()]),
        );
        let mut config = AttrMap::new();
        config.insert("domain".into(), "www.example.com".into());
        config.insert("service_type".into(), "web".into());
        config.insert(
            "origin".into(),
            AttrValue::List(vec![AttrValue::Map(origin)]),
        );
        config
    }

    fn resource_data(config: AttrMap) -> ResourceData {
        ResourceData::new(
            "tencentcloud_cdn_domain",
            CdnDomainResource.schema(),
            config,
        )
        .unwrap()
    }

    #[test]
    fn origin_block_is_required() {
        let mut config = base_config();
        config.remove("origin");
        assert!(
            ResourceData::new(
                "tencentcloud_cdn_domain",
                CdnDomainResource.schema(),
                config
            )
            .is_err()
        );
    }

    #[test]
    fn service_type_vocabulary_enforced() {
        let mut config = base_config();
        config.insert("service_type".into(), "ftp".into());
        assert!(
            ResourceData::new(
                "tencentcloud_cdn_domain",
                CdnDomainResource.schema(),
                config
            )
            .is_err()
        );
    }

    #[test]
    fn add_request_applies_schema_defaults() {
        let d = resource_data(base_config());
        let req = build_add_request(&d).unwrap();
        // full_url_cache 默认 true，range 回源默认开
        assert_eq!(req.cache_key.unwrap().full_url_cache.as_deref(), Some("on"));
        assert_eq!(req.range_origin_pull.unwrap().switch.as_deref(), Some("on"));
        assert_eq!(req.project_id, Some(0));
        assert_eq!(
            req.origin.origins.as_deref(),
            Some(&["203.0.113.10".to_string()][..])
        );
        assert_eq!(req.origin.origin_pull_protocol.as_deref(), Some("http"));
        assert!(req.https.is_none());
        assert!(req.request_header.is_none());
    }

    #[test]
    fn add_request_carries_https_and_force_redirect() {
        let mut config = base_config();
        let mut server = AttrMap::new();
        server.insert("certificate_id".into(), "cert-1".into());
        let mut redirect = AttrMap::new();
        redirect.insert("switch".into(), "on".into());
        redirect.insert("redirect_type".into(), "https".into());
        redirect.insert("redirect_status_code".into(), AttrValue::Int(301));
        let mut https = AttrMap::new();
        https.insert("https_switch".into(), "on".into());
        https.insert(
            "server_certificate_config".into(),
            AttrValue::List(vec![AttrValue::Map(server)]),
        );
        https.insert(
            "force_redirect".into(),
            AttrValue::List(vec![AttrValue::Map(redirect)]),
        );
        config.insert(
            "https_config".into(),
            AttrValue::List(vec![AttrValue::Map(https)]),
        );

        let d = resource_data(config);
        let req = build_add_request(&d).unwrap();
        let https = req.https.unwrap();
        assert_eq!(https.switch.as_deref(), Some("on"));
        // 块内默认值在校验阶段填好
        assert_eq!(https.http2.as_deref(), Some("off"));
        assert_eq!(https.cert_info.unwrap().cert_id.as_deref(), Some("cert-1"));
        // 强制跳转从 https_config 下提到请求顶层
        let redirect = req.force_redirect.unwrap();
        assert_eq!(redirect.redirect_type.as_deref(), Some("https"));
        assert_eq!(redirect.redirect_status_code, Some(301));
    }

    #[test]
    fn config_error_is_fatal_in_write_retries() {
        let config_error = ProviderError::RetryableOperation {
            product: "cdn".into(),
            raw_code: "FailedOperation.CdnConfigError".into(),
            raw_message: "invalid origin".into(),
        };
        assert!(matches!(
            classify_config_write(config_error),
            Retry::Fatal(_)
        ));

        let host_exists = ProviderError::RetryableOperation {
            product: "cdn".into(),
            raw_code: "ResourceInUse.CdnHostExists".into(),
            raw_message: "domain already onboarded".into(),
        };
        assert!(matches!(classify_config_write(host_exists), Retry::Fatal(_)));

        let busy = ProviderError::RetryableOperation {
            product: "cdn".into(),
            raw_code: "FailedOperation".into(),
            raw_message: "busy".into(),
        };
        assert!(matches!(
            classify_config_write(busy),
            Retry::Retryable(_)
        ));
    }

    #[test]
    fn https_flatten_keeps_local_certificate_secrets() {
        let mut server = AttrMap::new();
        server.insert("certificate_content".into(), "PEM".into());
        server.insert("private_key".into(), "KEY".into());
        let mut https = AttrMap::new();
        https.insert("https_switch".into(), "on".into());
        https.insert(
            "server_certificate_config".into(),
            AttrValue::List(vec![AttrValue::Map(server)]),
        );
        let mut config = base_config();
        config.insert(
            "https_config".into(),
            AttrValue::List(vec![AttrValue::Map(https)]),
        );
        let mut d = resource_data(config);

        let detail = DetailDomain {
            https: Some(Https {
                switch: Some("on".to_string()),
                cert_info: Some(ServerCert {
                    cert_id: Some("cert-1".to_string()),
                    cert_name: Some("example".to_string()),
                    ..ServerCert::default()
                }),
                ..Https::default()
            }),
            ..DetailDomain::default()
        };
        flatten_https(&mut d, &detail).unwrap();

        let state = d.state().get("https_config").unwrap();
        let block = state.as_list().unwrap()[0].as_map().unwrap();
        let server = first_block(block, "server_certificate_config").unwrap();
        assert_eq!(
            server.get("certificate_content"),
            Some(&AttrValue::from("PEM"))
        );
        assert_eq!(server.get("private_key"), Some(&AttrValue::from("KEY")));
        assert_eq!(
            server.get("certificate_name"),
            Some(&AttrValue::from("example"))
        );
    }
}
