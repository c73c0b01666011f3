//! 大禹（经典版 DDoS 高防）模块。
//!
//! 经典接口风格与新版产品差别很大：业务结果包在 `Success` 信封里、
//! 列表接口对不存在的防护实例报 `InvalidParameterValue`、创建接口不回
//! 规则 ID 需要按域名/名称回查。服务层把这些怪癖收敛掉，资源层只看
//! 正常的 Result。

mod data_source_l7_rules;
mod resource_ddos_policy;
mod resource_ddos_policy_attachment;
mod resource_l4_rule;
mod resource_l7_rule;
mod service;
mod types;

use crate::client::Endpoint;

pub use data_source_l7_rules::DayuL7RulesDataSource;
pub use resource_ddos_policy::DayuDdosPolicyResource;
pub use resource_ddos_policy_attachment::DayuDdosPolicyAttachmentResource;
pub use resource_l4_rule::DayuL4RuleResource;
pub use resource_l7_rule::DayuL7RuleResource;

pub(crate) const ENDPOINT: Endpoint = Endpoint {
    service: "dayu",
    host: "dayu.tencentcloudapi.com",
    version: "2018-07-09",
};

// ============ Business 取值（防护套餐类型） ============

pub(crate) const RESOURCE_TYPE_BGPIP: &str = "bgpip";
pub(crate) const RESOURCE_TYPE_BGP: &str = "bgp";
pub(crate) const RESOURCE_TYPE_BGP_MULTIP: &str = "bgp-multip";
pub(crate) const RESOURCE_TYPE_NET: &str = "net";

// ============ 规则状态机 ============

// 0 生效，2 下发失败，3 已删除，5 删除失败，6/7 下发/删除中，8 等证书
pub(crate) const RULE_STATUS_SET_DONE: i64 = 0;
pub(crate) const RULE_STATUS_SET_FAIL: i64 = 2;
pub(crate) const RULE_STATUS_DEL_DONE: i64 = 3;
pub(crate) const RULE_STATUS_DEL_FAIL: i64 = 5;
pub(crate) const RULE_STATUS_SSL_WAIT: i64 = 8;

// 健康检查配置状态：0 配置中，1 生效，2 失败
pub(crate) const HEALTH_STATUS_DONE: i64 = 1;
pub(crate) const HEALTH_STATUS_FAIL: i64 = 2;

// ============ 七层规则协议与 CC 开关 ============

pub(crate) const L7_PROTOCOL_HTTP: &str = "http";
pub(crate) const L7_PROTOCOL_HTTPS: &str = "https";

// https 规则没有独立的 CC 开关接口，用告警阈值 0/非 0 代替
pub(crate) const CC_THRESHOLD_OFF: i64 = 0;
pub(crate) const CC_THRESHOLD_ON: i64 = 2;

// 证书来源：0 未开 HTTPS，2 平台托管证书
pub(crate) const CERT_TYPE_NONE: i64 = 0;
pub(crate) const CERT_TYPE_HOSTED: i64 = 2;

/// 负载均衡方式，经典版固定按权重转发。
pub(crate) const LB_TYPE_WEIGHT: i64 = 1;

// IP 黑白名单在线上是一张表，靠 Type 字段区分
pub(crate) const IP_TYPE_BLACK: &str = "black";
pub(crate) const IP_TYPE_WHITE: &str = "white";

// ============ 其它 ============

/// 经典列表接口的固定翻页步长。
pub(crate) const RULE_PAGE_SIZE: i64 = 20;

/// 信封里的成功码。
pub(crate) const SUCCESS_CODE: &str = "Success";

/// 经典接口对不存在的防护实例/策略统一报这个码，等价于查空。
pub(crate) const CODE_ABSENT: &str = "InvalidParameterValue";
