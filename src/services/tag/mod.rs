//! 标签横切模块
//!
//! 标签不是独立资源：支持打标的产品资源在自己的 CRUD 流程里调用这里的
//! 服务，资源以 `qcs::<产品>:<地域>:uin/:<前缀>/<ID>` 名字挂标签。

mod service;
mod types;

use crate::client::Endpoint;

pub(crate) use service::{TagService, build_tag_resource_name, diff_tags};

pub(crate) const ENDPOINT: Endpoint = Endpoint {
    service: "tag",
    host: "tag.tencentcloudapi.com",
    version: "2018-08-13",
};

/// `DescribeResourceTagsByResourceIds` 单页条数
pub(crate) const TAG_PAGE_SIZE: i64 = 20;
