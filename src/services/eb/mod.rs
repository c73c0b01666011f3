//! 腾讯云 EventBridge（`eb`）产品模块

mod data_source_event_buses;
mod resource_event_bus;
mod resource_event_rule;
mod resource_event_transform;
mod service;
mod types;

use crate::client::Endpoint;

pub use data_source_event_buses::EbEventBusesDataSource;
pub use resource_event_bus::EbEventBusResource;
pub use resource_event_rule::EbEventRuleResource;
pub use resource_event_transform::EbEventTransformResource;

pub(crate) const ENDPOINT: Endpoint = Endpoint {
    service: "eb",
    host: "eb.tencentcloudapi.com",
    version: "2021-04-16",
};

/// `ListEventBuses` 单页最大条数
pub(crate) const LIST_PAGE_SIZE: i64 = 20;
