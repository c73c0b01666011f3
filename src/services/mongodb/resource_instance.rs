//! 副本集实例资源：`tencentcloud_mongodb_instance`，ID 就是实例 ID。
//!
//! 购买接口带不了实例名，拿到 ID 后要单独补一刀改名。实例详情里的
//! 内存和磁盘是整实例的 MB 口径，回读时除回 GB 再落状态。

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{FieldSchema, ResourceData, Schema, Validation};
use crate::services::tag::{TagService, build_tag_resource_name, diff_tags};
use crate::traits::Resource;

use super::service::MongodbService;
use super::types::{CreateInstanceRequest, InstanceDetail};
use super::{
    CHARGE_TYPE_POSTPAID, CHARGE_TYPE_PREPAID, CLUSTER_TYPE_REPLSET, DEFAULT_MONGO_USER,
    ENGINE_VERSION_4_WT, INSTANCE_TYPE_FORMAL, PAY_MODE_PREPAID, TAG_RESOURCE_PREFIX,
    TAG_SERVICE_TYPE, canonical_machine_type,
};

pub struct MongodbInstanceResource;

/// 副本集和分片集群共用的属性面。
pub(super) fn shared_instance_fields() -> Vec<(&'static str, FieldSchema)> {
    vec![
        (
            "instance_name",
            FieldSchema::string()
                .required()
                .desc("Name of the Mongodb instance."),
        ),
        (
            "memory",
            FieldSchema::int()
                .required()
                .desc("Memory size. The minimum value is 2, and unit is GB. Memory and volume must be upgraded or degraded simultaneously."),
        ),
        (
            "volume",
            FieldSchema::int()
                .required()
                .desc("Disk size. The minimum value is 25, and unit is GB. Memory and volume must be upgraded or degraded simultaneously."),
        ),
        (
            "engine_version",
            FieldSchema::string()
                .required()
                .force_new()
                .desc("Version of the Mongodb, and available values include `MONGO_36_WT` (MongoDB 3.6 WiredTiger Edition), `MONGO_40_WT` (MongoDB 4.0 WiredTiger Edition) and `MONGO_42_WT` (MongoDB 4.2 WiredTiger Edition)."),
        ),
        (
            "machine_type",
            FieldSchema::string()
                .required()
                .force_new()
                .desc("Type of Mongodb instance, and available values include `HIO`(or `GIO` which will be deprecated, represents high IO) and `HIO10G`(or `TGIO` which will be deprecated, represents 10-gigabit high IO)."),
        ),
        (
            "available_zone",
            FieldSchema::string()
                .required()
                .force_new()
                .desc("The available zone of the Mongodb."),
        ),
        (
            "vpc_id",
            FieldSchema::string()
                .optional()
                .force_new()
                .desc("ID of the VPC."),
        ),
        (
            "subnet_id",
            FieldSchema::string()
                .optional()
                .force_new()
                .desc("ID of the subnet within this VPC. The value is required if `vpc_id` is set."),
        ),
        (
            "project_id",
            FieldSchema::int()
                .optional()
                .default_value(0)
                .desc("ID of the project which the instance belongs."),
        ),
        (
            "security_groups",
            FieldSchema::set(FieldSchema::string())
                .optional()
                .desc("ID of the security group."),
        ),
        (
            "password",
            FieldSchema::string()
                .optional()
                .sensitive()
                .desc("Password of this Mongodb account."),
        ),
        (
            "charge_type",
            FieldSchema::string()
                .optional()
                .force_new()
                .default_value(CHARGE_TYPE_POSTPAID)
                .validate(Validation::allowed(&[CHARGE_TYPE_PREPAID, CHARGE_TYPE_POSTPAID]))
                .desc("The charge type of instance. Valid values are `PREPAID` and `POSTPAID_BY_HOUR`. Default value is `POSTPAID_BY_HOUR`."),
        ),
        (
            "prepaid_period",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(1, 36))
                .desc("The tenancy (time unit is month) of the prepaid instance. Valid values are 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 24, 36. NOTE: it only works when charge_type is set to `PREPAID`."),
        ),
        (
            "auto_renew_flag",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 2))
                .desc("Auto renew flag. Valid values are `0`(NOTIFY_AND_MANUAL_RENEW), `1`(NOTIFY_AND_AUTO_RENEW) and `2`(DISABLE_NOTIFY_AND_MANUAL_RENEW). Default value is `0`. NOTE: it only works when charge_type is set to `PREPAID`."),
        ),
        (
            "tags",
            FieldSchema::string_map()
                .optional()
                .desc("The tags of the Mongodb. Key name `project` is system reserved and can't be used."),
        ),
        (
            "status",
            FieldSchema::int().computed().desc(
                "Status of the Mongodb instance, and available values include pending initialization(expressed with 0), processing(expressed with 1), running(expressed with 2) and expired(expressed with -2).",
            ),
        ),
        (
            "vip",
            FieldSchema::string().computed().desc("IP of the Mongodb instance."),
        ),
        (
            "vport",
            FieldSchema::int().computed().desc("IP port of the Mongodb instance."),
        ),
        (
            "create_time",
            FieldSchema::string()
                .computed()
                .desc("Creation time of the Mongodb instance."),
        ),
    ]
}

/// 购买报文的公共部分。密码平台侧必填，但导入的实例拿不回来，schema
/// 里只能标可选，这里在下单前补检查。
pub(super) fn build_create_request(
    d: &ResourceData,
    type_name: &str,
) -> Result<CreateInstanceRequest> {
    let password = d.get_string("password");
    if password.is_empty() {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "password".to_string(),
            detail: "cannot be empty when creating".to_string(),
        });
    }
    let vpc_id = d.get_ok_string("vpc_id");
    let subnet_id = d.get_ok_string("subnet_id");
    if vpc_id.is_some() != subnet_id.is_some() {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "vpc_id".to_string(),
            detail: "`vpc_id` and `subnet_id` have to be set together".to_string(),
        });
    }
    let machine_type = d.get_string("machine_type");
    let mut req = CreateInstanceRequest {
        goods_num: 1,
        memory: d.get_int("memory"),
        volume: d.get_int("volume"),
        mongo_version: d.get_string("engine_version"),
        zone: d.get_string("available_zone"),
        machine_code: canonical_machine_type(&machine_type).to_string(),
        password,
        instance_type: INSTANCE_TYPE_FORMAL,
        project_id: d.get_int("project_id"),
        vpc_id,
        subnet_id,
        ..CreateInstanceRequest::default()
    };
    let security_groups = d.get_string_list("security_groups");
    if !security_groups.is_empty() {
        req.security_group = Some(security_groups);
    }
    Ok(req)
}

/// MONGO_40_WT 不支持绑定安全组，下单前拦住。
pub(super) fn check_security_group_support(d: &ResourceData, type_name: &str) -> Result<()> {
    if d.get_string("engine_version") == ENGINE_VERSION_4_WT
        && !d.get_string_list("security_groups").is_empty()
    {
        return Err(ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "security_groups".to_string(),
            detail: format!("not supported when `engine_version` is `{ENGINE_VERSION_4_WT}`"),
        });
    }
    Ok(())
}

/// 下单。计费方式决定走按量还是包年包月动作，包年包月必须带购买周期，
/// 按量反过来不许带。
pub(super) async fn submit_purchase(
    service: &MongodbService,
    d: &ResourceData,
    type_name: &str,
    mut req: CreateInstanceRequest,
) -> Result<String> {
    if d.get_string("charge_type") == CHARGE_TYPE_PREPAID {
        let Some(period) = d.get_ok_int("prepaid_period") else {
            return Err(ProviderError::InvalidParameter {
                product: type_name.to_string(),
                param: "prepaid_period".to_string(),
                detail: "required for a PREPAID instance".to_string(),
            });
        };
        req.period = Some(period);
        req.auto_renew_flag = Some(d.get_int("auto_renew_flag"));
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .create_prepaid_instance(&req)
                .await
                .map_err(retry_error)
        })
        .await
    } else {
        if d.get_ok_int("prepaid_period").is_some() || d.get_ok_int("auto_renew_flag").is_some() {
            return Err(ProviderError::InvalidParameter {
                product: type_name.to_string(),
                param: "prepaid_period".to_string(),
                detail: "`prepaid_period` and `auto_renew_flag` don't make sense for a POSTPAID_BY_HOUR instance".to_string(),
            });
        }
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .create_postpaid_instance(&req)
                .await
                .map_err(retry_error)
        })
        .await
    }
}

/// 购买回 ID 后实例还在初始化，等它出过渡态、补上实例名，再绑标签。
pub(super) async fn finish_creation(
    conn: &Connection,
    service: &MongodbService,
    d: &ResourceData,
    instance_id: &str,
) -> Result<()> {
    if service.describe_instance_by_id(instance_id).await?.is_none() {
        return Err(ProviderError::ResourceNotFound {
            product: "mongodb".to_string(),
            resource_id: instance_id.to_string(),
            raw_message: None,
        });
    }
    let name = d.get_string("instance_name");
    retry::within(WRITE_RETRY_TIMEOUT, || async {
        service
            .modify_instance_name(instance_id, &name)
            .await
            .map_err(retry_error)
    })
    .await?;

    let tags = d.get_string_map("tags");
    if !tags.is_empty() {
        let resource_name = build_tag_resource_name(
            TAG_SERVICE_TYPE,
            TAG_RESOURCE_PREFIX,
            conn.region(),
            instance_id,
        );
        let tag_service = TagService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            tag_service
                .modify_tags(&resource_name, &tags, &[])
                .await
                .map_err(retry_error)
        })
        .await?;
    }
    Ok(())
}

/// 标签直接长在实例详情上，`project` 键是平台系统标签要滤掉。
pub(super) fn instance_tags(detail: &InstanceDetail) -> BTreeMap<String, String> {
    detail
        .tags
        .iter()
        .filter_map(|tag| {
            let key = tag.tag_key.clone()?;
            let value = tag.tag_value.clone()?;
            (key != "project").then_some((key, value))
        })
        .collect()
}

/// 两种形态共用的回读字段。内存和磁盘口径两边不同，各自处理。
pub(super) fn fill_instance_basics(d: &mut ResourceData, detail: &InstanceDetail) -> Result<()> {
    d.set("instance_name", detail.instance_name.clone().unwrap_or_default())?;
    d.set("engine_version", detail.mongo_version.clone().unwrap_or_default())?;
    let machine = detail.machine_type.clone().unwrap_or_default();
    d.set("machine_type", canonical_machine_type(&machine).to_string())?;
    d.set("available_zone", detail.zone.clone().unwrap_or_default())?;
    d.set("vpc_id", detail.vpc_id.clone().unwrap_or_default())?;
    d.set("subnet_id", detail.subnet_id.clone().unwrap_or_default())?;
    d.set("project_id", detail.project_id.unwrap_or_default())?;
    d.set("status", detail.status.unwrap_or_default())?;
    d.set("vip", detail.vip.clone().unwrap_or_default())?;
    d.set("vport", detail.vport.unwrap_or_default())?;
    d.set("create_time", detail.create_time.clone().unwrap_or_default())?;
    if detail.pay_mode == Some(PAY_MODE_PREPAID) {
        d.set("charge_type", CHARGE_TYPE_PREPAID)?;
        d.set("auto_renew_flag", detail.auto_renew_flag.unwrap_or_default())?;
    } else {
        d.set("charge_type", CHARGE_TYPE_POSTPAID)?;
    }
    d.set("tags", instance_tags(detail))?;
    Ok(())
}

/// 等变配落地。详情里的内存和磁盘是整实例 MB 口径，除回 GB（分片
/// 集群再按分片数摊）后和目标比对，状态位不可靠所以直接盯数值。
pub(super) async fn wait_for_spec(
    service: &MongodbService,
    instance_id: &str,
    memory: i64,
    volume: i64,
    shards: i64,
) -> Result<()> {
    let divisor = 1024 * shards.max(1);
    retry::within(READ_RETRY_TIMEOUT * 20, || async {
        let detail = service
            .describe_instance_by_id(instance_id)
            .await
            .map_err(retry_error)?
            .ok_or_else(|| {
                Retry::Fatal(ProviderError::ResourceNotFound {
                    product: "mongodb".to_string(),
                    resource_id: instance_id.to_string(),
                    raw_message: None,
                })
            })?;
        let memory_now = detail.memory.unwrap_or_default() / divisor;
        let volume_now = detail.volume.unwrap_or_default() / divisor;
        if memory_now != memory || volume_now != volume {
            return Err(Retry::not_ready(
                "mongodb",
                format!(
                    "instance {instance_id} still reports {memory_now}GB memory and {volume_now}GB volume"
                ),
            ));
        }
        Ok(())
    })
    .await
}

/// 改名、换项目、重置密码、换安全组、续费方式和标签，两种形态共用。
pub(super) async fn apply_common_updates(
    conn: &Connection,
    service: &MongodbService,
    d: &ResourceData,
    instance_id: &str,
) -> Result<()> {
    if d.has_change("instance_name") {
        let name = d.get_string("instance_name");
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .modify_instance_name(instance_id, &name)
                .await
                .map_err(retry_error)
        })
        .await?;
    }

    if d.has_change("project_id") {
        let project_id = d.get_int("project_id");
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .modify_instance_project(instance_id, project_id)
                .await
                .map_err(retry_error)
        })
        .await?;
    }

    if d.has_change("password") {
        let password = d.get_string("password");
        service
            .reset_instance_password(instance_id, DEFAULT_MONGO_USER, &password)
            .await?;
    }

    if d.has_change("security_groups") {
        let groups = d.get_string_list("security_groups");
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .modify_security_groups(instance_id, groups.clone())
                .await
                .map_err(retry_error)
        })
        .await?;
    }

    if d.has_change("auto_renew_flag") {
        service
            .modify_auto_renew_flag(
                instance_id,
                d.get_int("prepaid_period"),
                d.get_int("auto_renew_flag"),
            )
            .await?;
    }

    if d.has_change("tags") {
        let (old, new) = d.get_change("tags");
        let old = old.as_string_map().unwrap_or_default();
        let new = new.as_string_map().unwrap_or_default();
        let (replace, delete) = diff_tags(&old, &new);
        let resource_name = build_tag_resource_name(
            TAG_SERVICE_TYPE,
            TAG_RESOURCE_PREFIX,
            conn.region(),
            instance_id,
        );
        let tag_service = TagService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            tag_service
                .modify_tags(&resource_name, &replace, &delete)
                .await
                .map_err(retry_error)
        })
        .await?;
    }
    Ok(())
}

/// 注销实例：包年包月走退还，按量走隔离，然后下线并等它消失。
pub(super) async fn retire_instance(
    service: &MongodbService,
    detail: &InstanceDetail,
) -> Result<()> {
    if detail.pay_mode == Some(PAY_MODE_PREPAID) {
        service.terminate_instance(&detail.instance_id).await?;
    } else {
        service.isolate_instance(&detail.instance_id).await?;
    }
    service.offline_isolated_instance(&detail.instance_id).await
}

#[async_trait]
impl Resource for MongodbInstanceResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_mongodb_instance"
    }

    fn schema(&self) -> Schema {
        let extra = [(
            "node_num",
            FieldSchema::int()
                .optional()
                .default_value(3)
                .desc("The number of nodes in each replica set. Default value: 3."),
        )];
        Schema::new(shared_instance_fields().into_iter().chain(extra))
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = MongodbService::new(conn);
        check_security_group_support(d, self.type_name())?;

        let mut req = build_create_request(d, self.type_name())?;
        req.cluster_type = CLUSTER_TYPE_REPLSET.to_string();
        req.replicate_set_num = 1;
        req.node_num = d.get_int("node_num");

        let instance_id = submit_purchase(&service, d, self.type_name(), req).await?;
        d.set_id(&instance_id);

        finish_creation(conn, &service, d, &instance_id).await?;
        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = MongodbService::new(conn);
        let instance_id = d.id().to_string();

        let Some(detail) = service.describe_instance_by_id(&instance_id).await? else {
            d.set_id("");
            return Ok(());
        };

        fill_instance_basics(d, &detail)?;
        d.set("memory", detail.memory.unwrap_or_default() / 1024)?;
        d.set("volume", detail.volume.unwrap_or_default() / 1024)?;
        d.set("node_num", detail.secondary_num.unwrap_or_default() + 1)?;

        let security_groups = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_security_groups(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set("security_groups", security_groups)?;

        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        for arg in [
            "charge_type",
            "engine_version",
            "machine_type",
            "available_zone",
            "vpc_id",
            "subnet_id",
            "prepaid_period",
            "node_num",
        ] {
            if d.has_change(arg) {
                return Err(ProviderError::UnsupportedOperation {
                    product: self.type_name().to_string(),
                    detail: format!("argument `{arg}` cannot be changed"),
                });
            }
        }

        let service = MongodbService::new(conn);
        let instance_id = d.id().to_string();

        if d.has_changes(&["memory", "volume"]) {
            let memory = d.get_int("memory");
            let volume = d.get_int("volume");
            service.upgrade_instance(&instance_id, memory, volume).await?;
            wait_for_spec(&service, &instance_id, memory, volume, 1).await?;
        }

        apply_common_updates(conn, &service, d, &instance_id).await?;
        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = MongodbService::new(conn);
        let instance_id = d.id().to_string();

        let Some(detail) = service.describe_instance_by_id(&instance_id).await? else {
            return Ok(());
        };
        retire_instance(&service, &detail).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrMap, AttrValue};
    use crate::services::mongodb::types::TagInfo;

    fn minimal_config() -> AttrMap {
        let mut config = AttrMap::new();
        config.insert("instance_name".to_string(), AttrValue::from("tf-mongo"));
        config.insert("memory".to_string(), AttrValue::from(4));
        config.insert("volume".to_string(), AttrValue::from(100));
        config.insert(
            "engine_version".to_string(),
            AttrValue::from("MONGO_40_WT"),
        );
        config.insert("machine_type".to_string(), AttrValue::from("HIO10G"));
        config.insert(
            "available_zone".to_string(),
            AttrValue::from("ap-guangzhou-2"),
        );
        config
    }

    #[test]
    fn defaults_cover_charge_and_topology() {
        let d = ResourceData::new(
            "tencentcloud_mongodb_instance",
            MongodbInstanceResource.schema(),
            minimal_config(),
        )
        .unwrap();
        assert_eq!(d.get_string("charge_type"), CHARGE_TYPE_POSTPAID);
        assert_eq!(d.get_int("node_num"), 3);
        assert_eq!(d.get_int("project_id"), 0);
    }

    #[test]
    fn charge_type_vocabulary_enforced() {
        let mut config = minimal_config();
        config.insert("charge_type".to_string(), AttrValue::from("MONTHLY"));
        let result = ResourceData::new(
            "tencentcloud_mongodb_instance",
            MongodbInstanceResource.schema(),
            config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn legacy_machine_aliases_normalize() {
        assert_eq!(canonical_machine_type("GIO"), "HIO");
        assert_eq!(canonical_machine_type("TGIO"), "HIO10G");
        assert_eq!(canonical_machine_type("HIO10G"), "HIO10G");
    }

    #[test]
    fn immutable_fields_force_replacement() {
        let schema = MongodbInstanceResource.schema();
        for name in [
            "engine_version",
            "machine_type",
            "available_zone",
            "vpc_id",
            "subnet_id",
            "charge_type",
        ] {
            let field = schema.field(name).unwrap();
            assert!(field.force_new, "{name} should force replacement");
        }
    }

    #[test]
    fn reserved_project_tag_filtered() {
        let detail = InstanceDetail {
            tags: vec![
                TagInfo {
                    tag_key: Some("project".to_string()),
                    tag_value: Some("default".to_string()),
                },
                TagInfo {
                    tag_key: Some("team".to_string()),
                    tag_value: Some("db".to_string()),
                },
                TagInfo {
                    tag_key: None,
                    tag_value: Some("orphan".to_string()),
                },
            ],
            ..empty_detail()
        };
        let tags = instance_tags(&detail);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("team").map(String::as_str), Some("db"));
    }

    fn empty_detail() -> InstanceDetail {
        serde_json::from_str("{}").unwrap()
    }
}
