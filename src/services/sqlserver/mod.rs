//! 云数据库 SQL Server 模块。
//!
//! 购买接口走订单流：下单只回订单号，要拿订单号查 DescribeOrders 换出
//! 实例 ID 和流程 ID，再轮询 DescribeFlowStatus 等流程落地。变配同样
//! 异步，下发后轮询实例规格直到和目标一致。

mod data_source_instances;
mod resource_basic_instance;
mod resource_instance;
mod service;
mod types;

use crate::client::Endpoint;

pub use data_source_instances::SqlserverInstancesDataSource;
pub use resource_basic_instance::SqlserverBasicInstanceResource;
pub use resource_instance::SqlserverInstanceResource;

pub(crate) const ENDPOINT: Endpoint = Endpoint {
    service: "sqlserver",
    host: "sqlserver.tencentcloudapi.com",
    version: "2018-03-28",
};

// ============ 计费 ============

pub(crate) const CHARGE_TYPE_PREPAID: &str = "PREPAID";
pub(crate) const CHARGE_TYPE_POSTPAID: &str = "POSTPAID_BY_HOUR";
/// 下单参数里的按量计费拼写和资源属性不一致。
pub(crate) const CHARGE_PARAM_POSTPAID: &str = "POSTPAID";
pub(crate) const PAY_MODE_PREPAID: i64 = 1;

pub(crate) fn charge_param(charge_type: &str) -> &'static str {
    if charge_type == CHARGE_TYPE_PREPAID {
        CHARGE_TYPE_PREPAID
    } else {
        CHARGE_PARAM_POSTPAID
    }
}

// ============ 实例状态 ============

pub(crate) const STATUS_RUNNING: i64 = 2;
// 4 隔离中、6 已回收、8 已下线，这三种状态当实例不存在处理
pub(crate) const STATUS_GONE: &[i64] = &[4, 6, 8];

// ============ 流程状态 ============

pub(crate) const FLOW_SUCCESS: i64 = 0;
pub(crate) const FLOW_FAIL: i64 = 1;
pub(crate) const FLOW_RUNNING: i64 = 2;

// ============ 词表 ============

pub(crate) const HA_TYPE_DUAL: &str = "DUAL";
pub(crate) const HA_TYPE_CLUSTER: &str = "CLUSTER";

pub(crate) const MACHINE_TYPE_PREMIUM: &str = "CLOUD_PREMIUM";
pub(crate) const MACHINE_TYPE_SSD: &str = "CLOUD_SSD";

pub(crate) const INSTANCE_PAGE_SIZE: i64 = 100;

pub(crate) const TAG_SERVICE_TYPE: &str = "sqlserver";
pub(crate) const TAG_RESOURCE_PREFIX: &str = "instance";
