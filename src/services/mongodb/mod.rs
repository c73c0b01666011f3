//! 云数据库 MongoDB 模块。
//!
//! 购买接口直接回实例 ID，但实例要在初始化和流程中两个过渡态里泡一阵，
//! 查询层把这段等待吞掉，上层拿到的实例一定已经出了过渡态。删除是
//! 三步走：退还（包年包月）或隔离（按量），再下线，最后等实例从列表
//! 里彻底消失。

mod data_source_instances;
mod resource_instance;
mod resource_sharding_instance;
mod service;
mod types;

use crate::client::Endpoint;

pub use data_source_instances::MongodbInstancesDataSource;
pub use resource_instance::MongodbInstanceResource;
pub use resource_sharding_instance::MongodbShardingInstanceResource;

pub(crate) const ENDPOINT: Endpoint = Endpoint {
    service: "mongodb",
    host: "mongodb.tencentcloudapi.com",
    version: "2019-07-25",
};

// ============ 计费 ============

pub(crate) const CHARGE_TYPE_PREPAID: &str = "PREPAID";
pub(crate) const CHARGE_TYPE_POSTPAID: &str = "POSTPAID_BY_HOUR";
pub(crate) const PAY_MODE_PREPAID: i64 = 1;

/// 续费方式在续费接口里是字符串枚举，资源属性用 0/1/2 表示。
pub(crate) fn renew_flag_param(flag: i64) -> &'static str {
    match flag {
        1 => "NOTIFY_AND_AUTO_RENEW",
        2 => "DISABLE_NOTIFY_AND_MANUAL_RENEW",
        _ => "NOTIFY_AND_MANUAL_RENEW",
    }
}

// ============ 集群形态 ============

// 购买接口收字符串，实例详情和列表过滤器用数字
pub(crate) const CLUSTER_TYPE_REPLSET: &str = "REPLSET";
pub(crate) const CLUSTER_TYPE_SHARD: &str = "SHARD";
pub(crate) const CLUSTER_CODE_REPLSET: i64 = 0;
pub(crate) const CLUSTER_CODE_SHARD: i64 = 1;

// 数据源入参用的小写词表
pub(crate) const CLUSTER_FILTER_REPLSET: &str = "replset";
pub(crate) const CLUSTER_FILTER_SHARD: &str = "shard";

// ============ 机型 ============

pub(crate) const MACHINE_TYPE_GIO: &str = "GIO";
pub(crate) const MACHINE_TYPE_TGIO: &str = "TGIO";
pub(crate) const MACHINE_TYPE_HIO: &str = "HIO";
pub(crate) const MACHINE_TYPE_HIO10G: &str = "HIO10G";

/// 老机型别名折算成现行名字，下单和回读共用一个口径。
pub(crate) fn canonical_machine_type(machine: &str) -> &str {
    match machine {
        MACHINE_TYPE_GIO => MACHINE_TYPE_HIO,
        MACHINE_TYPE_TGIO => MACHINE_TYPE_HIO10G,
        other => other,
    }
}

// ============ 实例状态 ============

pub(crate) const STATUS_INITIAL: i64 = 0;
pub(crate) const STATUS_PROCESSING: i64 = 1;
// -2 已隔离，当实例不存在处理
pub(crate) const STATUS_ISOLATED: i64 = -2;

// ============ 其他 ============

// 正式实例。购买接口的 Clone 参数还能填克隆、备份恢复等形态
pub(crate) const INSTANCE_TYPE_FORMAL: i64 = 1;

/// 4.0 WiredTiger 版。该版本不支持绑定安全组。
pub(crate) const ENGINE_VERSION_4_WT: &str = "MONGO_40_WT";

/// 异步任务状态字符串。
pub(crate) const TASK_SUCCESS: &str = "success";
pub(crate) const TASK_FAILED: &str = "failed";

/// 重置密码作用的管理账号。
pub(crate) const DEFAULT_MONGO_USER: &str = "mongouser";

pub(crate) const INSTANCE_PAGE_SIZE: i64 = 100;

pub(crate) const TAG_SERVICE_TYPE: &str = "mongodb";
pub(crate) const TAG_RESOURCE_PREFIX: &str = "instance";
