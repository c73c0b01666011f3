//! 腾讯云 `DNSPod` 产品模块

mod data_source_records;
mod resource_domain;
mod resource_record;
mod service;
mod types;

use crate::client::Endpoint;

pub use data_source_records::DnspodRecordsDataSource;
pub use resource_domain::DnspodDomainResource;
pub use resource_record::DnspodRecordResource;

pub(crate) const ENDPOINT: Endpoint = Endpoint {
    service: "dnspod",
    host: "dnspod.tencentcloudapi.com",
    version: "2021-03-23",
};

/// `DescribeRecordList` 单页最大记录数
pub(crate) const MAX_PAGE_SIZE: i64 = 100;
