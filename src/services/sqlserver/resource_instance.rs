//! 高可用实例资源：`tencentcloud_sqlserver_instance`，ID 就是实例 ID。
//!
//! 下单接口带不了实例名，创建拿到 ID 后要单独补一刀改名。换 VPC/子网
//! 是在线迁移，平台回流程 ID，等流程结束才算换完。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{AttrValue, FieldSchema, ResourceData, Schema, Validation};
use crate::services::tag::{TagService, build_tag_resource_name, diff_tags};
use crate::traits::Resource;

use super::service::SqlserverService;
use super::types::{
    CreateDbInstancesRequest, DbInstance, ModifyMaintenanceSpanRequest, UpgradeDbInstanceRequest,
};
use super::{
    CHARGE_TYPE_POSTPAID, CHARGE_TYPE_PREPAID, HA_TYPE_CLUSTER, HA_TYPE_DUAL, PAY_MODE_PREPAID,
    TAG_RESOURCE_PREFIX, TAG_SERVICE_TYPE, charge_param,
};

pub struct SqlserverInstanceResource;

/// 高可用与基础版共用的属性面。基础版换绑网络没有在线迁移只能重建，
/// 购买周期也带默认值，用 `basic` 区分这两处差异。
pub(super) fn shared_instance_fields(basic: bool) -> Vec<(&'static str, FieldSchema)> {
    let mut period = FieldSchema::int()
        .optional()
        .validate(Validation::int_range(1, 48))
        .desc("Purchase instance period in month. The value does not exceed 48.");
    if basic {
        period = period.default_value(1);
    }
    let mut fields = vec![
        (
            "name",
            FieldSchema::string()
                .required()
                .validate(Validation::string_length(1, 60))
                .desc("Name of the SQL Server instance."),
        ),
        (
            "charge_type",
            FieldSchema::string()
                .optional()
                .force_new()
                .default_value(CHARGE_TYPE_POSTPAID)
                .validate(Validation::allowed(&[CHARGE_TYPE_PREPAID, CHARGE_TYPE_POSTPAID]))
                .desc("Pay type of the SQL Server instance. Available values `PREPAID`, `POSTPAID_BY_HOUR`."),
        ),
        ("period", period),
        (
            "auto_renew",
            FieldSchema::int().optional().desc(
                "Automatic renewal sign. 0 for normal renewal, 1 for automatic renewal. Only valid when purchasing a prepaid instance.",
            ),
        ),
        (
            "auto_voucher",
            FieldSchema::int()
                .optional()
                .default_value(0)
                .desc("Whether to use the voucher automatically; 1 for yes, 0 for no, the default is 0."),
        ),
        (
            "voucher_ids",
            FieldSchema::set(FieldSchema::string())
                .optional()
                .desc("An array of voucher IDs, currently only one can be used for a single order."),
        ),
        ("vpc_id", FieldSchema::string().optional().desc("ID of VPC.")),
        (
            "subnet_id",
            FieldSchema::string().optional().desc("ID of subnet."),
        ),
        (
            "memory",
            FieldSchema::int()
                .required()
                .desc("Memory size (in GB). Allowed value must be larger than `memory` that data source `tencentcloud_sqlserver_specinfos` provides."),
        ),
        (
            "storage",
            FieldSchema::int()
                .required()
                .desc("Disk size (in GB). Allowed value must be a multiple of 10."),
        ),
        (
            "engine_version",
            FieldSchema::string()
                .optional()
                .force_new()
                .default_value("2008R2")
                .desc("Version of the SQL Server database engine. Allowed values are `2008R2`(SQL Server 2008 Enterprise), `2012SP3`(SQL Server 2012 Enterprise), `2016SP1`(SQL Server 2016 Enterprise), `201602`(SQL Server 2016 Standard) and `2017`(SQL Server 2017 Enterprise). Default is `2008R2`."),
        ),
        (
            "availability_zone",
            FieldSchema::string()
                .optional()
                .computed()
                .force_new()
                .desc("Availability zone."),
        ),
        (
            "security_groups",
            FieldSchema::set(FieldSchema::string())
                .optional()
                .desc("Security group bound to the instance."),
        ),
        (
            "project_id",
            FieldSchema::int()
                .optional()
                .computed()
                .desc("Project ID, default value is 0."),
        ),
        (
            "maintenance_week_set",
            FieldSchema::set(FieldSchema::int())
                .optional()
                .computed()
                .desc("A list of integer indicates weekly maintenance. For example, [2, 7] presents do weekly maintenance on every Tuesday and Sunday."),
        ),
        (
            "maintenance_start_time",
            FieldSchema::string()
                .optional()
                .computed()
                .desc("Start time of the maintenance in one day, format like `HH:mm`."),
        ),
        (
            "maintenance_time_span",
            FieldSchema::int()
                .optional()
                .computed()
                .desc("The timespan of maintenance in one day, unit is hour."),
        ),
        (
            "tags",
            FieldSchema::string_map()
                .optional()
                .desc("The tags of the SQL Server instance."),
        ),
        (
            "vip",
            FieldSchema::string().computed().desc("IP for private access."),
        ),
        (
            "vport",
            FieldSchema::int().computed().desc("Port for private access."),
        ),
        (
            "create_time",
            FieldSchema::string()
                .computed()
                .desc("Create time of the SQL Server instance."),
        ),
        (
            "status",
            FieldSchema::int().computed().desc(
                "Status of the SQL Server instance. 1 for applying, 2 for running, 4 for isolated, 9 for expanding.",
            ),
        ),
    ];
    if basic {
        for (name, field) in &mut fields {
            if matches!(*name, "vpc_id" | "subnet_id") {
                field.force_new = true;
            }
        }
    }
    fields
}

fn ha_type_from_flag(flag: &str) -> Option<&'static str> {
    match flag {
        "MIRROR" => Some(HA_TYPE_DUAL),
        "ALWAYSON" => Some(HA_TYPE_CLUSTER),
        _ => None,
    }
}

pub(super) fn maintenance_week_set(d: &ResourceData) -> Vec<i64> {
    d.get_list("maintenance_week_set")
        .iter()
        .filter_map(AttrValue::as_int)
        .collect()
}

/// 两种形态共用的回读字段。计费方式的回填口径两边不同，各自处理。
pub(super) fn fill_instance_basics(d: &mut ResourceData, instance: &DbInstance) -> Result<()> {
    d.set("project_id", instance.project_id.unwrap_or_default())?;
    d.set("availability_zone", instance.zone.clone().unwrap_or_default())?;
    d.set("vpc_id", instance.uniq_vpc_id.clone().unwrap_or_default())?;
    d.set("subnet_id", instance.uniq_subnet_id.clone().unwrap_or_default())?;
    d.set("name", instance.name.clone().unwrap_or_default())?;
    d.set("engine_version", instance.version.clone().unwrap_or_default())?;
    d.set("create_time", instance.create_time.clone().unwrap_or_default())?;
    d.set("status", instance.status.unwrap_or_default())?;
    d.set("memory", instance.memory.unwrap_or_default())?;
    d.set("storage", instance.storage.unwrap_or_default())?;
    d.set("vip", instance.vip.clone().unwrap_or_default())?;
    d.set("vport", instance.vport.unwrap_or_default())?;
    Ok(())
}

/// 安全组没有差量接口，先把旧的全部摘掉再挂新的。
pub(super) async fn sync_security_groups(
    service: &SqlserverService,
    d: &ResourceData,
    instance_id: &str,
) -> Result<()> {
    let (old, new) = d.get_change("security_groups");
    let old = old.as_string_list().unwrap_or_default();
    let new = new.as_string_list().unwrap_or_default();
    for sg_id in &old {
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .remove_security_group(instance_id, sg_id)
                .await
                .map_err(retry_error)
        })
        .await?;
    }
    for sg_id in &new {
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .add_security_group(instance_id, sg_id)
                .await
                .map_err(retry_error)
        })
        .await?;
    }
    Ok(())
}

pub(super) async fn apply_maintenance_span(
    service: &SqlserverService,
    d: &ResourceData,
    instance_id: &str,
) -> Result<()> {
    let weekly = maintenance_week_set(d);
    let req = ModifyMaintenanceSpanRequest {
        instance_id: instance_id.to_string(),
        weekly: (!weekly.is_empty()).then_some(weekly),
        start_time: d.get_ok_string("maintenance_start_time"),
        span: d.get_ok_int("maintenance_time_span"),
    };
    retry::within(WRITE_RETRY_TIMEOUT, || async {
        service
            .modify_maintenance_span(&req)
            .await
            .map_err(retry_error)
    })
    .await
}

#[async_trait]
impl Resource for SqlserverInstanceResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_sqlserver_instance"
    }

    fn schema(&self) -> Schema {
        let extra = [
            (
                "multi_zones",
                FieldSchema::boolean()
                    .optional()
                    .force_new()
                    .default_value(false)
                    .desc("Indicate whether to deploy across availability zones."),
            ),
            (
                "ha_type",
                FieldSchema::string()
                    .optional()
                    .force_new()
                    .default_value(HA_TYPE_DUAL)
                    .validate(Validation::allowed(&[HA_TYPE_DUAL, HA_TYPE_CLUSTER]))
                    .desc("Instance type. `DUAL` (dual-server high availability), `CLUSTER` (cluster). Default is `DUAL`."),
            ),
            (
                "ro_flag",
                FieldSchema::string().computed().desc(
                    "Readonly flag. `RO` (read-only instance), `MASTER` (primary instance with read-only instances). If it is left empty, it refers to an instance which is not read-only and has no RO group.",
                ),
            ),
        ];
        Schema::new(shared_instance_fields(false).into_iter().chain(extra))
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = SqlserverService::new(conn);
        let name = d.get_string("name");
        let charge_type = d.get_string("charge_type");

        let mut req = CreateDbInstancesRequest {
            zone: d.get_string("availability_zone"),
            memory: d.get_int("memory"),
            storage: d.get_int("storage"),
            subnet_id: d.get_string("subnet_id"),
            vpc_id: d.get_string("vpc_id"),
            db_version: d.get_string("engine_version"),
            ha_type: d.get_string("ha_type"),
            multi_zones: d.get_bool("multi_zones"),
            instance_charge_type: charge_param(&charge_type).to_string(),
            auto_voucher: d.get_int("auto_voucher"),
            security_group_list: d.get_string_list("security_groups"),
            goods_num: 1,
            ..CreateDbInstancesRequest::default()
        };
        if charge_type == CHARGE_TYPE_PREPAID {
            req.auto_renew_flag = Some(d.get_int("auto_renew"));
            req.period = d.get_ok_int("period");
        }
        if let Some(project_id) = d.get_ok_int("project_id") {
            req.project_id = Some(project_id);
        }
        let voucher_ids = d.get_string_list("voucher_ids");
        if !voucher_ids.is_empty() {
            req.voucher_ids = Some(voucher_ids);
        }
        let weekly = maintenance_week_set(d);
        if !weekly.is_empty() {
            req.weekly = Some(weekly);
        }
        req.start_time = d.get_ok_string("maintenance_start_time");
        req.span = d.get_ok_int("maintenance_time_span");

        // 只重试下单本身，订单换实例的等待在服务层自带轮询
        let deal = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .create_instance_order(&req)
                .await
                .map_err(retry_error)
        })
        .await?;
        let instance_id = service.instance_from_deal(&deal).await?;
        d.set_id(&instance_id);

        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .modify_instance_name(&instance_id, &name)
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
                &instance_id,
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

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = SqlserverService::new(conn);
        let instance_id = d.id().to_string();

        let instance = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_instance_by_id(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        let Some(instance) = instance else {
            d.set_id("");
            return Ok(());
        };

        fill_instance_basics(d, &instance)?;
        d.set("ro_flag", instance.ro_flag.clone().unwrap_or_default())?;
        if let Some(ha_type) = instance.ha_flag.as_deref().and_then(ha_type_from_flag) {
            d.set("ha_type", ha_type)?;
        }
        if instance.pay_mode == Some(PAY_MODE_PREPAID) {
            d.set("charge_type", CHARGE_TYPE_PREPAID)?;
            // 没写进配置就不回填，避免导入后多出一个没人要的差异
            if d.get_ok_int("auto_renew").is_some() {
                d.set("auto_renew", instance.renew_flag.unwrap_or_default())?;
            }
        } else {
            d.set("charge_type", CHARGE_TYPE_POSTPAID)?;
        }

        let security_groups = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_security_groups(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set("security_groups", security_groups)?;

        let span = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_maintenance_span(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        let weekly: Vec<AttrValue> = span.weekly.iter().copied().map(AttrValue::from).collect();
        d.set("maintenance_week_set", weekly)?;
        d.set("maintenance_start_time", span.start_time)?;
        d.set("maintenance_time_span", span.span)?;

        let tag_service = TagService::new(conn);
        let tags = retry::within(READ_RETRY_TIMEOUT, || async {
            tag_service
                .describe_resource_tags(TAG_SERVICE_TYPE, TAG_RESOURCE_PREFIX, &instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set("tags", tags)?;

        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        for arg in [
            "charge_type",
            "engine_version",
            "ha_type",
            "multi_zones",
            "availability_zone",
        ] {
            if d.has_change(arg) {
                return Err(ProviderError::UnsupportedOperation {
                    product: self.type_name().to_string(),
                    detail: format!("argument `{arg}` cannot be changed"),
                });
            }
        }

        let service = SqlserverService::new(conn);
        let instance_id = d.id().to_string();

        if d.has_changes(&["memory", "storage", "auto_voucher", "voucher_ids"]) {
            let auto_voucher = d.get_int("auto_voucher");
            let voucher_ids = d.get_string_list("voucher_ids");
            let req = UpgradeDbInstanceRequest {
                instance_id: instance_id.clone(),
                memory: d.get_int("memory"),
                storage: d.get_int("storage"),
                cpu: None,
                auto_voucher: (auto_voucher != 0).then_some(auto_voucher),
                voucher_ids: (!voucher_ids.is_empty()).then_some(voucher_ids),
            };
            service.upgrade_instance(&req).await?;
        }

        if d.has_change("name") {
            let name = d.get_string("name");
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_instance_name(&instance_id, &name)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        if d.has_change("security_groups") {
            sync_security_groups(&service, d, &instance_id).await?;
        }

        if d.has_changes(&["vpc_id", "subnet_id"]) {
            let vpc_id = d.get_string("vpc_id");
            let subnet_id = d.get_string("subnet_id");
            let flow_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_instance_network(&instance_id, &vpc_id, &subnet_id)
                    .await
                    .map_err(retry_error)
            })
            .await?;
            service.wait_for_flow(flow_id).await?;
        }

        if d.has_change("project_id") {
            let project_id = d.get_int("project_id");
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_instance_project(&instance_id, project_id)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        if d.has_changes(&[
            "maintenance_week_set",
            "maintenance_start_time",
            "maintenance_time_span",
        ]) {
            apply_maintenance_span(&service, d, &instance_id).await?;
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
                &instance_id,
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

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = SqlserverService::new(conn);
        let instance_id = d.id().to_string();

        let instance = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_instance_by_id(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        if instance.is_none() {
            return Ok(());
        }

        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .terminate_instance(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;

        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .delete_instance(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttrMap;

    fn minimal_config() -> AttrMap {
        let mut config = AttrMap::new();
        config.insert("name".to_string(), AttrValue::from("tf-sqlserver"));
        config.insert("memory".to_string(), AttrValue::from(4));
        config.insert("storage".to_string(), AttrValue::from(100));
        config
    }

    #[test]
    fn defaults_cover_engine_and_topology() {
        let d = ResourceData::new(
            "tencentcloud_sqlserver_instance",
            SqlserverInstanceResource.schema(),
            minimal_config(),
        )
        .unwrap();
        assert_eq!(d.get_string("charge_type"), CHARGE_TYPE_POSTPAID);
        assert_eq!(d.get_string("engine_version"), "2008R2");
        assert_eq!(d.get_string("ha_type"), HA_TYPE_DUAL);
        assert!(!d.get_bool("multi_zones"));
        assert_eq!(d.get_int("auto_voucher"), 0);
    }

    #[test]
    fn charge_type_vocabulary_enforced() {
        let mut config = minimal_config();
        config.insert("charge_type".to_string(), AttrValue::from("MONTHLY"));
        let result = ResourceData::new(
            "tencentcloud_sqlserver_instance",
            SqlserverInstanceResource.schema(),
            config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn ha_flag_maps_to_declared_vocabulary() {
        assert_eq!(ha_type_from_flag("MIRROR"), Some(HA_TYPE_DUAL));
        assert_eq!(ha_type_from_flag("ALWAYSON"), Some(HA_TYPE_CLUSTER));
        assert_eq!(ha_type_from_flag("SOMETHING"), None);
    }

    #[test]
    fn basic_variant_locks_network_fields() {
        for (name, field) in shared_instance_fields(true) {
            if matches!(name, "vpc_id" | "subnet_id") {
                assert!(field.force_new, "{name} should force replacement");
            }
        }
        for (name, field) in shared_instance_fields(false) {
            if matches!(name, "vpc_id" | "subnet_id") {
                assert!(!field.force_new, "{name} should stay mutable");
            }
        }
    }

    #[test]
    fn prepaid_order_carries_renew_and_period() {
        let mut config = minimal_config();
        config.insert("charge_type".to_string(), AttrValue::from(CHARGE_TYPE_PREPAID));
        config.insert("period".to_string(), AttrValue::from(6));
        config.insert("auto_renew".to_string(), AttrValue::from(1));
        let d = ResourceData::new(
            "tencentcloud_sqlserver_instance",
            SqlserverInstanceResource.schema(),
            config,
        )
        .unwrap();
        assert_eq!(d.get_ok_int("period"), Some(6));
        assert_eq!(d.get_int("auto_renew"), 1);
    }
}
