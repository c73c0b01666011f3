//! `DNSPod` API 请求/响应结构

use serde::{Deserialize, Serialize};

// ============ 域名 ============

#[derive(Debug, Serialize)]
pub(crate) struct CreateDomainRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "GroupId", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeDomainRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
}

/// `ModifyDomainStatus` 的 Status 取值是 `enable`/`disable`，
/// 与查询返回的 `ENABLE`/`PAUSE` 不同。
#[derive(Debug, Serialize)]
pub(crate) struct ModifyDomainStatusRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyDomainRemarkRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Remark")]
    pub remark: String,
}

/// Response payload for `DescribeDomain`.
#[derive(Debug, Deserialize)]
pub(crate) struct DescribeDomainResponse {
    #[serde(rename = "DomainInfo")]
    pub domain_info: DomainInfo,
}

/// Nested domain information in `DescribeDomain`.
#[derive(Debug, Deserialize)]
pub(crate) struct DomainInfo {
    #[serde(rename = "Domain", default)]
    pub domain: Option<String>,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "GroupId", default)]
    pub group_id: Option<i64>,
    #[serde(rename = "Remark", default)]
    pub remark: Option<String>,
    #[serde(rename = "CreatedOn", default)]
    pub created_on: Option<String>,
    #[serde(rename = "SlaveDNS", default)]
    pub slave_dns: Option<String>,
}

// ============ 记录 ============

#[derive(Debug, Serialize)]
pub(crate) struct CreateRecordRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "SubDomain", skip_serializing_if = "Option::is_none")]
    pub sub_domain: Option<String>,
    #[serde(rename = "RecordType")]
    pub record_type: String,
    #[serde(rename = "RecordLine")]
    pub record_line: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "MX", skip_serializing_if = "Option::is_none")]
    pub mx: Option<i64>,
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(rename = "Weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Response payload for `CreateRecord`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateRecordResponse {
    #[serde(rename = "RecordId")]
    pub record_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeRecordRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "RecordId")]
    pub record_id: i64,
}

/// Response payload for `DescribeRecord`.
#[derive(Debug, Deserialize)]
pub(crate) struct DescribeRecordResponse {
    #[serde(rename = "RecordInfo")]
    pub record_info: RecordInfo,
}

/// Nested record information in `DescribeRecord`.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordInfo {
    #[serde(rename = "SubDomain")]
    pub sub_domain: String,
    #[serde(rename = "RecordType")]
    pub record_type: String,
    #[serde(rename = "RecordLine")]
    pub record_line: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "TTL")]
    pub ttl: i64,
    #[serde(rename = "MX", default)]
    pub mx: Option<i64>,
    #[serde(rename = "Weight", default)]
    pub weight: Option<i64>,
    /// 1 启用 / 0 暂停
    #[serde(rename = "Enabled")]
    pub enabled: i64,
    #[serde(rename = "MonitorStatus", default)]
    pub monitor_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyRecordRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "RecordId")]
    pub record_id: i64,
    #[serde(rename = "SubDomain", skip_serializing_if = "Option::is_none")]
    pub sub_domain: Option<String>,
    #[serde(rename = "RecordType")]
    pub record_type: String,
    #[serde(rename = "RecordLine")]
    pub record_line: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "MX", skip_serializing_if = "Option::is_none")]
    pub mx: Option<i64>,
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(rename = "Weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyRecordStatusRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "RecordId")]
    pub record_id: i64,
    #[serde(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteRecordRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "RecordId")]
    pub record_id: i64,
}

/// 列表接口的子域名参数拼写是 `Subdomain`，与 `CreateRecord` 的
/// `SubDomain` 不一致，平台如此。
#[derive(Debug, Serialize)]
pub(crate) struct DescribeRecordListRequest {
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Subdomain", skip_serializing_if = "Option::is_none")]
    pub sub_domain: Option<String>,
    #[serde(rename = "RecordType", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(rename = "Keyword", skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(rename = "Offset")]
    pub offset: i64,
    #[serde(rename = "Limit")]
    pub limit: i64,
}

/// Response payload for `DescribeRecordList`.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordListResponse {
    #[serde(rename = "RecordList", default)]
    pub record_list: Option<Vec<RecordItem>>,
    #[serde(rename = "RecordCountInfo", default)]
    pub record_count_info: Option<RecordCountInfo>,
}

/// Record count metadata from `DescribeRecordList`.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordCountInfo {
    #[serde(rename = "TotalCount", default)]
    pub total_count: Option<i64>,
}

/// Record item returned by `DescribeRecordList`.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordItem {
    #[serde(rename = "RecordId")]
    pub record_id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "Line")]
    pub line: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "TTL")]
    pub ttl: i64,
    #[serde(rename = "MX", default)]
    pub mx: Option<i64>,
    #[serde(rename = "Weight", default)]
    pub weight: Option<i64>,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "UpdatedOn", default)]
    pub updated_on: Option<String>,
    #[serde(rename = "MonitorStatus", default)]
    pub monitor_status: Option<String>,
}
