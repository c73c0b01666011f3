//! 新版 Anti-DDoS 模块。
//!
//! 特征过滤规则的创建接口不回配置 ID，只能拉全量列表按字段比对找回，
//! 所以资源是全量 `force_new` 的：改任何字段都重建。

mod resource_packet_filter_config;
mod service;
mod types;

use crate::client::Endpoint;

pub use resource_packet_filter_config::AntiddosPacketFilterConfigResource;

pub(crate) const ENDPOINT: Endpoint = Endpoint {
    service: "antiddos",
    host: "antiddos.tencentcloudapi.com",
    version: "2020-03-09",
};

pub(crate) const CONFIG_PAGE_SIZE: i64 = 20;
