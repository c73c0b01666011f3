//! 腾讯云 CDN 产品模块

mod data_source_domains;
mod resource_domain;
mod resource_url_push;
mod service;
mod types;

use crate::client::Endpoint;

pub use data_source_domains::CdnDomainsDataSource;
pub use resource_domain::CdnDomainResource;
pub use resource_url_push::CdnUrlPushResource;

pub(crate) const ENDPOINT: Endpoint = Endpoint {
    service: "cdn",
    host: "cdn.tencentcloudapi.com",
    version: "2018-06-06",
};

/// 域名状态
pub(crate) const DOMAIN_STATUS_ONLINE: &str = "online";
pub(crate) const DOMAIN_STATUS_PROCESSING: &str = "processing";

/// 配置开关取值
pub(crate) const SWITCH_ON: &str = "on";
pub(crate) const SWITCH_OFF: &str = "off";

/// 预热任务进行中的状态值
pub(crate) const PUSH_STATUS_IN_PROGRESS: &str = "process";

/// `DescribeDomains` 单页条数
pub(crate) const DOMAIN_PAGE_SIZE: i64 = 100;

/// 标签 qcs 资源名的产品段与前缀段
pub(crate) const TAG_SERVICE_TYPE: &str = "cdn";
pub(crate) const TAG_RESOURCE_PREFIX: &str = "domain";

/// `on`/`off` 映射，CDN 配置项大多用这对取值表示布尔。
pub(crate) fn switch_value(on: bool) -> &'static str {
    if on { SWITCH_ON } else { SWITCH_OFF }
}
