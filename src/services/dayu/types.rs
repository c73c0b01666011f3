//! 大禹 API 线上结构体
//!
//! 经典接口把业务结果包在 `Success` 信封里，状态码恒为 200；字段大小写
//! 也不统一（`DPortStart` 与 `DportStart` 并存），rename 按平台原样写。

use serde::{Deserialize, Serialize};

// ============ Success 信封 ============

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SuccessCode {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

/// 只带信封、没有业务载荷的响应。
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SuccessResponse {
    #[serde(rename = "Success", default)]
    pub success: Option<SuccessCode>,
}

// ============ 四层/七层共用对象 ============

/// 回源地址项，四层带权重，七层权重恒为 0。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RuleSource {
    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "Weight", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

// ============ 七层转发规则 ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct L7RuleEntry {
    #[serde(rename = "Protocol", default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(rename = "Domain", default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(rename = "RuleId", default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(rename = "RuleName", default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(rename = "SSLId", default, skip_serializing_if = "Option::is_none")]
    pub ssl_id: Option<String>,
    #[serde(rename = "CertType", default, skip_serializing_if = "Option::is_none")]
    pub cert_type: Option<i64>,
    #[serde(rename = "LbType", default, skip_serializing_if = "Option::is_none")]
    pub lb_type: Option<i64>,
    #[serde(rename = "SourceType", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<i64>,
    #[serde(rename = "SourceList", default, skip_serializing_if = "Option::is_none")]
    pub source_list: Option<Vec<RuleSource>>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    // CC 防护开关按协议分家：http 看 CCStatus，https 看 CCEnable
    #[serde(rename = "CCStatus", default, skip_serializing_if = "Option::is_none")]
    pub cc_status: Option<i64>,
    #[serde(rename = "CCEnable", default, skip_serializing_if = "Option::is_none")]
    pub cc_enable: Option<i64>,
}

/// 七层规则的健康检查视图，跟规则列表一起返回，按 `RuleId` 对齐。
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct L7RuleHealth {
    #[serde(rename = "RuleId", default)]
    pub rule_id: Option<String>,
    #[serde(rename = "Enable", default)]
    pub enable: Option<i64>,
    #[serde(rename = "Interval", default)]
    pub interval: Option<i64>,
    #[serde(rename = "KickNum", default)]
    pub kick_num: Option<i64>,
    #[serde(rename = "AliveNum", default)]
    pub alive_num: Option<i64>,
    #[serde(rename = "Method", default)]
    pub method: Option<String>,
    #[serde(rename = "StatusCode", default)]
    pub status_code: Option<i64>,
    #[serde(rename = "Url", default)]
    pub url: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<i64>,
}

/// 下发七层健康检查用的载荷，关闭时也要全量下发（`Enable` 置 0）。
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct L7HealthConfig {
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "Enable")]
    pub enable: i64,
    #[serde(rename = "Interval")]
    pub interval: i64,
    #[serde(rename = "KickNum")]
    pub kick_num: i64,
    #[serde(rename = "AliveNum")]
    pub alive_num: i64,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "StatusCode")]
    pub status_code: i64,
    #[serde(rename = "Url")]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateL7RulesRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Rules")]
    pub rules: Vec<L7RuleEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyL7RulesRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Rule")]
    pub rule: L7RuleEntry,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeL7RulesRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Domain", skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(rename = "Offset")]
    pub offset: i64,
    #[serde(rename = "Limit")]
    pub limit: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DescribeL7RulesResponse {
    #[serde(rename = "Rules", default)]
    pub rules: Option<Vec<L7RuleEntry>>,
    #[serde(rename = "Healths", default)]
    pub healths: Option<Vec<L7RuleHealth>>,
    #[serde(rename = "Total", default)]
    pub total: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteL7RulesRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "RuleIdList")]
    pub rule_id_list: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateL7HealthConfigRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "HealthConfig")]
    pub health_config: Vec<L7HealthConfig>,
}

/// http 规则的 CC 防护开关。
#[derive(Debug, Serialize)]
pub(crate) struct ModifyCCHostProtectionRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
    #[serde(rename = "Method")]
    pub method: String,
}

/// https 规则用告警阈值当 CC 开关。
#[derive(Debug, Serialize)]
pub(crate) struct ModifyCCThresholdRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "Threshold")]
    pub threshold: i64,
}

// ============ 四层转发规则 ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct L4RuleEntry {
    #[serde(rename = "Protocol", default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(rename = "SourcePort", default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<i64>,
    #[serde(rename = "VirtualPort", default, skip_serializing_if = "Option::is_none")]
    pub virtual_port: Option<i64>,
    #[serde(rename = "SourceType", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<i64>,
    #[serde(rename = "SourceList", default, skip_serializing_if = "Option::is_none")]
    pub source_list: Option<Vec<RuleSource>>,
    #[serde(rename = "RuleId", default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(rename = "RuleName", default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(rename = "LbType", default, skip_serializing_if = "Option::is_none")]
    pub lb_type: Option<i64>,
    #[serde(rename = "KeepTime", default, skip_serializing_if = "Option::is_none")]
    pub keep_time: Option<i64>,
    #[serde(rename = "KeepEnable", default, skip_serializing_if = "Option::is_none")]
    pub keep_enable: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct L4RuleHealth {
    #[serde(rename = "RuleId", default)]
    pub rule_id: Option<String>,
    #[serde(rename = "Enable", default)]
    pub enable: Option<i64>,
    #[serde(rename = "TimeOut", default)]
    pub time_out: Option<i64>,
    #[serde(rename = "Interval", default)]
    pub interval: Option<i64>,
    #[serde(rename = "KickNum", default)]
    pub kick_num: Option<i64>,
    #[serde(rename = "AliveNum", default)]
    pub alive_num: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct L4HealthConfig {
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "VirtualPort")]
    pub virtual_port: i64,
    #[serde(rename = "Enable")]
    pub enable: i64,
    #[serde(rename = "TimeOut")]
    pub time_out: i64,
    #[serde(rename = "Interval")]
    pub interval: i64,
    #[serde(rename = "KickNum")]
    pub kick_num: i64,
    #[serde(rename = "AliveNum")]
    pub alive_num: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateL4RulesRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Rules")]
    pub rules: Vec<L4RuleEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyL4RulesRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Rule")]
    pub rule: L4RuleEntry,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeL4RulesRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Offset")]
    pub offset: i64,
    #[serde(rename = "Limit")]
    pub limit: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DescribeL4RulesResponse {
    #[serde(rename = "Rules", default)]
    pub rules: Option<Vec<L4RuleEntry>>,
    #[serde(rename = "Healths", default)]
    pub healths: Option<Vec<L4RuleHealth>>,
    #[serde(rename = "Total", default)]
    pub total: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteL4RulesRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "RuleIdList")]
    pub rule_id_list: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateL4HealthConfigRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "HealthConfig")]
    pub health_config: Vec<L4HealthConfig>,
}

/// 会话保持开关与时长走独立接口。
#[derive(Debug, Serialize)]
pub(crate) struct ModifyL4KeepTimeRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
    #[serde(rename = "KeepEnable")]
    pub keep_enable: i64,
    #[serde(rename = "KeepTime")]
    pub keep_time: i64,
}

// ============ DDoS 高级策略 ============

/// 丢弃选项，布尔量在线上全是 0/1 整数。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct DdosPolicyDropOption {
    #[serde(rename = "DropTcp", default, skip_serializing_if = "Option::is_none")]
    pub drop_tcp: Option<i64>,
    #[serde(rename = "DropUdp", default, skip_serializing_if = "Option::is_none")]
    pub drop_udp: Option<i64>,
    #[serde(rename = "DropIcmp", default, skip_serializing_if = "Option::is_none")]
    pub drop_icmp: Option<i64>,
    #[serde(rename = "DropOther", default, skip_serializing_if = "Option::is_none")]
    pub drop_other: Option<i64>,
    #[serde(rename = "DropAbroad", default, skip_serializing_if = "Option::is_none")]
    pub drop_abroad: Option<i64>,
    #[serde(rename = "CheckSyncConn", default, skip_serializing_if = "Option::is_none")]
    pub check_sync_conn: Option<i64>,
    #[serde(rename = "SdNewLimit", default, skip_serializing_if = "Option::is_none")]
    pub sd_new_limit: Option<i64>,
    #[serde(rename = "DstNewLimit", default, skip_serializing_if = "Option::is_none")]
    pub dst_new_limit: Option<i64>,
    #[serde(rename = "SdConnLimit", default, skip_serializing_if = "Option::is_none")]
    pub sd_conn_limit: Option<i64>,
    #[serde(rename = "DstConnLimit", default, skip_serializing_if = "Option::is_none")]
    pub dst_conn_limit: Option<i64>,
    #[serde(rename = "BadConnThreshold", default, skip_serializing_if = "Option::is_none")]
    pub bad_conn_threshold: Option<i64>,
    #[serde(rename = "NullConnEnable", default, skip_serializing_if = "Option::is_none")]
    pub null_conn_enable: Option<i64>,
    #[serde(rename = "ConnTimeout", default, skip_serializing_if = "Option::is_none")]
    pub conn_timeout: Option<i64>,
    #[serde(rename = "SynRate", default, skip_serializing_if = "Option::is_none")]
    pub syn_rate: Option<i64>,
    #[serde(rename = "SynLimit", default, skip_serializing_if = "Option::is_none")]
    pub syn_limit: Option<i64>,
    #[serde(rename = "DTcpMbpsLimit", default, skip_serializing_if = "Option::is_none")]
    pub d_tcp_mbps_limit: Option<i64>,
    #[serde(rename = "DUdpMbpsLimit", default, skip_serializing_if = "Option::is_none")]
    pub d_udp_mbps_limit: Option<i64>,
    #[serde(rename = "DIcmpMbpsLimit", default, skip_serializing_if = "Option::is_none")]
    pub d_icmp_mbps_limit: Option<i64>,
    #[serde(rename = "DOtherMbpsLimit", default, skip_serializing_if = "Option::is_none")]
    pub d_other_mbps_limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct DdosPolicyPortLimit {
    #[serde(rename = "Protocol", default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(rename = "DPortStart", default, skip_serializing_if = "Option::is_none")]
    pub d_port_start: Option<i64>,
    #[serde(rename = "DPortEnd", default, skip_serializing_if = "Option::is_none")]
    pub d_port_end: Option<i64>,
    #[serde(rename = "SPortStart", default, skip_serializing_if = "Option::is_none")]
    pub s_port_start: Option<i64>,
    #[serde(rename = "SPortEnd", default, skip_serializing_if = "Option::is_none")]
    pub s_port_end: Option<i64>,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    // 0 目的端口 1 源端口 2 目的端口（按源端口过滤时平台忽略 D 段）
    #[serde(rename = "Kind", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct IpBlackWhite {
    #[serde(rename = "Ip", default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub ip_type: Option<String>,
}

/// 特征过滤，注意这里的端口字段是 `DportStart` 小写 p，与端口限制不同。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct DdosPolicyPacketFilter {
    #[serde(rename = "Protocol", default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(rename = "DportStart", default, skip_serializing_if = "Option::is_none")]
    pub d_port_start: Option<i64>,
    #[serde(rename = "DportEnd", default, skip_serializing_if = "Option::is_none")]
    pub d_port_end: Option<i64>,
    #[serde(rename = "SportStart", default, skip_serializing_if = "Option::is_none")]
    pub s_port_start: Option<i64>,
    #[serde(rename = "SportEnd", default, skip_serializing_if = "Option::is_none")]
    pub s_port_end: Option<i64>,
    #[serde(rename = "PktlenMin", default, skip_serializing_if = "Option::is_none")]
    pub pktlen_min: Option<i64>,
    #[serde(rename = "PktlenMax", default, skip_serializing_if = "Option::is_none")]
    pub pktlen_max: Option<i64>,
    #[serde(rename = "MatchBegin", default, skip_serializing_if = "Option::is_none")]
    pub match_begin: Option<String>,
    #[serde(rename = "MatchType", default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(rename = "Str", default, skip_serializing_if = "Option::is_none")]
    pub match_str: Option<String>,
    #[serde(rename = "Depth", default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    #[serde(rename = "Offset", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(rename = "IsNot", default, skip_serializing_if = "Option::is_none")]
    pub is_not: Option<i64>,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct WaterPrintPolicy {
    #[serde(rename = "TcpPortList", default, skip_serializing_if = "Option::is_none")]
    pub tcp_port_list: Option<Vec<String>>,
    #[serde(rename = "UdpPortList", default, skip_serializing_if = "Option::is_none")]
    pub udp_port_list: Option<Vec<String>>,
    #[serde(rename = "Offset", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(rename = "RemoveSwitch", default, skip_serializing_if = "Option::is_none")]
    pub remove_switch: Option<i64>,
    #[serde(rename = "OpenStatus", default, skip_serializing_if = "Option::is_none")]
    pub open_status: Option<i64>,
}

/// 策略详情。请求侧 `DropOptions` 要传数组，响应里却是单个对象。
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DdosPolicy {
    #[serde(rename = "PolicyId", default)]
    pub policy_id: Option<String>,
    #[serde(rename = "PolicyName", default)]
    pub policy_name: Option<String>,
    #[serde(rename = "CreateTime", default)]
    pub create_time: Option<String>,
    #[serde(rename = "SceneId", default)]
    pub scene_id: Option<String>,
    #[serde(rename = "DropOptions", default)]
    pub drop_options: Option<DdosPolicyDropOption>,
    #[serde(rename = "PortLimits", default)]
    pub port_limits: Option<Vec<DdosPolicyPortLimit>>,
    #[serde(rename = "PacketFilters", default)]
    pub packet_filters: Option<Vec<DdosPolicyPacketFilter>>,
    #[serde(rename = "IpBlackWhiteLists", default)]
    pub ip_black_white_lists: Option<Vec<IpBlackWhite>>,
    #[serde(rename = "WaterPrint", default)]
    pub water_print: Option<Vec<WaterPrintPolicy>>,
    #[serde(rename = "BoundResources", default)]
    pub bound_resources: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateDdosPolicyRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "DropOptions")]
    pub drop_options: Vec<DdosPolicyDropOption>,
    #[serde(rename = "PortLimits")]
    pub port_limits: Vec<DdosPolicyPortLimit>,
    #[serde(rename = "IpAllowDenys")]
    pub ip_allow_denys: Vec<IpBlackWhite>,
    #[serde(rename = "PacketFilters")]
    pub packet_filters: Vec<DdosPolicyPacketFilter>,
    #[serde(rename = "WaterPrint")]
    pub water_print: Vec<WaterPrintPolicy>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateDdosPolicyResponse {
    #[serde(rename = "PolicyId", default)]
    pub policy_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeDdosPolicyRequest {
    #[serde(rename = "Business")]
    pub business: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DescribeDdosPolicyResponse {
    #[serde(rename = "DDosPolicyList", default)]
    pub ddos_policy_list: Option<Vec<DdosPolicy>>,
}

/// 修改策略没有增量语义，五个分组每次都要全量重传。
#[derive(Debug, Serialize)]
pub(crate) struct ModifyDdosPolicyRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "PolicyId")]
    pub policy_id: String,
    #[serde(rename = "DropOptions")]
    pub drop_options: Vec<DdosPolicyDropOption>,
    #[serde(rename = "PortLimits")]
    pub port_limits: Vec<DdosPolicyPortLimit>,
    #[serde(rename = "IpAllowDenys")]
    pub ip_allow_denys: Vec<IpBlackWhite>,
    #[serde(rename = "PacketFilters")]
    pub packet_filters: Vec<DdosPolicyPacketFilter>,
    #[serde(rename = "WaterPrint")]
    pub water_print: Vec<WaterPrintPolicy>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyDdosPolicyNameRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "PolicyId")]
    pub policy_id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteDdosPolicyRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "PolicyId")]
    pub policy_id: String,
}

/// 策略绑定/解绑共用一个动作，`Method` 区分方向。
#[derive(Debug, Serialize)]
pub(crate) struct ModifyResBindDdosPolicyRequest {
    #[serde(rename = "Business")]
    pub business: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "PolicyId")]
    pub policy_id: String,
    #[serde(rename = "Method")]
    pub method: String,
}
