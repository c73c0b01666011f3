//! 基础版实例资源：`tencentcloud_sqlserver_basic_instance`。
//!
//! 和高可用实例同一条订单流水线，差别在机型参数、CPU 规格，以及一串
//! 只能重建的属性：基础版换绑 VPC/子网没有在线迁移。删除要走
//! 退还、销毁、回收三连，最后等实例从列表里消失。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{AttrValue, FieldSchema, ResourceData, Schema, Validation};
use crate::services::tag::{TagService, build_tag_resource_name, diff_tags};
use crate::traits::Resource;

use super::resource_instance::{
    apply_maintenance_span, fill_instance_basics, maintenance_week_set, shared_instance_fields,
    sync_security_groups,
};
use super::service::SqlserverService;
use super::types::{CreateBasicDbInstancesRequest, UpgradeDbInstanceRequest};
use super::{
    CHARGE_TYPE_POSTPAID, CHARGE_TYPE_PREPAID, MACHINE_TYPE_PREMIUM, MACHINE_TYPE_SSD,
    PAY_MODE_PREPAID, TAG_RESOURCE_PREFIX, TAG_SERVICE_TYPE, charge_param,
};

pub struct SqlserverBasicInstanceResource;

/// 按量付费没有续费概念，固定回 0；包年包月不填按自动续费处理。
fn auto_renew_flag(d: &ResourceData, charge_type: &str) -> i64 {
    if charge_type == CHARGE_TYPE_PREPAID {
        d.get_ok_int("auto_renew").unwrap_or(1)
    } else {
        0
    }
}

#[async_trait]
impl Resource for SqlserverBasicInstanceResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_sqlserver_basic_instance"
    }

    fn schema(&self) -> Schema {
        let extra = [
            (
                "cpu",
                FieldSchema::int()
                    .required()
                    .desc("The CPU number of the SQL Server basic instance."),
            ),
            (
                "machine_type",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .validate(Validation::allowed(&[MACHINE_TYPE_PREMIUM, MACHINE_TYPE_SSD]))
                    .desc("The host type of the purchased instance, `CLOUD_PREMIUM` for virtual machine high-performance cloud disk, `CLOUD_SSD` for virtual machine SSD cloud disk."),
            ),
        ];
        Schema::new(shared_instance_fields(true).into_iter().chain(extra))
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = SqlserverService::new(conn);
        let name = d.get_string("name");
        let charge_type = d.get_string("charge_type");

        let mut req = CreateBasicDbInstancesRequest {
            zone: d.get_string("availability_zone"),
            cpu: d.get_int("cpu"),
            memory: d.get_int("memory"),
            storage: d.get_int("storage"),
            subnet_id: d.get_string("subnet_id"),
            vpc_id: d.get_string("vpc_id"),
            machine_type: d.get_string("machine_type"),
            instance_charge_type: charge_param(&charge_type).to_string(),
            db_version: d.get_string("engine_version"),
            period: d.get_int("period"),
            auto_renew_flag: auto_renew_flag(d, &charge_type),
            auto_voucher: d.get_int("auto_voucher"),
            voucher_ids: d.get_string_list("voucher_ids"),
            security_group_list: d.get_string_list("security_groups"),
            goods_num: 1,
            ..CreateBasicDbInstancesRequest::default()
        };
        if let Some(project_id) = d.get_ok_int("project_id") {
            req.project_id = Some(project_id);
        }
        let weekly = maintenance_week_set(d);
        if !weekly.is_empty() {
            req.weekly = Some(weekly);
        }
        req.start_time = d.get_ok_string("maintenance_start_time");
        req.span = d.get_ok_int("maintenance_time_span");

        // 基础版售罄概率高，下单多给几轮重试
        let deal = retry::within(WRITE_RETRY_TIMEOUT * 3, || async {
            service
                .create_basic_instance_order(&req)
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
        d.set("cpu", instance.cpu.unwrap_or_default())?;
        d.set("machine_type", instance.machine_type.clone().unwrap_or_default())?;
        if instance.pay_mode == Some(PAY_MODE_PREPAID) {
            d.set("charge_type", CHARGE_TYPE_PREPAID)?;
            d.set("auto_renew", instance.renew_flag.unwrap_or_default())?;
        } else {
            d.set("charge_type", CHARGE_TYPE_POSTPAID)?;
            d.set("auto_renew", 0)?;
        }

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

        let security_groups = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_security_groups(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set("security_groups", security_groups)?;

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
            "vpc_id",
            "subnet_id",
            "engine_version",
            "availability_zone",
            "machine_type",
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
        let charge_type = d.get_string("charge_type");

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

        if d.has_changes(&["memory", "storage", "cpu", "auto_voucher"]) {
            let auto_voucher = d.get_int("auto_voucher");
            let voucher_ids = d.get_string_list("voucher_ids");
            let req = UpgradeDbInstanceRequest {
                instance_id: instance_id.clone(),
                memory: d.get_int("memory"),
                storage: d.get_int("storage"),
                cpu: Some(d.get_int("cpu")),
                auto_voucher: Some(auto_voucher),
                // 代金券只在自动抵扣开着的时候生效
                voucher_ids: (auto_voucher == 1 && !voucher_ids.is_empty())
                    .then_some(voucher_ids),
            };
            service.upgrade_instance(&req).await?;
        }

        if d.has_change("security_groups") {
            sync_security_groups(&service, d, &instance_id).await?;
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

        if charge_type == CHARGE_TYPE_PREPAID && d.has_change("auto_renew") {
            let renew_flag = d.get_int("auto_renew");
            retry::within(WRITE_RETRY_TIMEOUT * 2, || async {
                service
                    .modify_renew_flag(&instance_id, renew_flag)
                    .await
                    .map_err(retry_error)
            })
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
        let Some(instance) = instance else {
            return Ok(());
        };
        if instance.pay_mode == Some(PAY_MODE_PREPAID) {
            return Err(ProviderError::UnsupportedOperation {
                product: self.type_name().to_string(),
                detail: "prepaid instances cannot be deleted here, terminate them in the console"
                    .to_string(),
            });
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
        .await?;

        service.recycle_instance(&instance_id).await?;

        // 销毁是异步的，等实例从列表里彻底消失
        retry::within(READ_RETRY_TIMEOUT, || async {
            let instance = service
                .describe_instance_by_id(&instance_id)
                .await
                .map_err(retry_error)?;
            if instance.is_some() {
                return Err(Retry::not_ready(
                    "sqlserver",
                    format!("instance {instance_id} is still visible after delete"),
                ));
            }
            Ok(())
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
        config.insert("name".to_string(), AttrValue::from("tf-basic"));
        config.insert("cpu".to_string(), AttrValue::from(2));
        config.insert("memory".to_string(), AttrValue::from(4));
        config.insert("storage".to_string(), AttrValue::from(100));
        config.insert(
            "machine_type".to_string(),
            AttrValue::from(MACHINE_TYPE_PREMIUM),
        );
        config
    }

    fn data_for(config: AttrMap) -> ResourceData {
        ResourceData::new(
            "tencentcloud_sqlserver_basic_instance",
            SqlserverBasicInstanceResource.schema(),
            config,
        )
        .unwrap()
    }

    #[test]
    fn period_defaults_to_one_month() {
        let d = data_for(minimal_config());
        assert_eq!(d.get_int("period"), 1);
    }

    #[test]
    fn machine_type_vocabulary_enforced() {
        let mut config = minimal_config();
        config.insert("machine_type".to_string(), AttrValue::from("CLOUD_BASIC"));
        let result = ResourceData::new(
            "tencentcloud_sqlserver_basic_instance",
            SqlserverBasicInstanceResource.schema(),
            config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn postpaid_never_renews() {
        let d = data_for(minimal_config());
        assert_eq!(auto_renew_flag(&d, CHARGE_TYPE_POSTPAID), 0);
    }

    #[test]
    fn prepaid_defaults_to_auto_renew() {
        let mut config = minimal_config();
        config.insert(
            "charge_type".to_string(),
            AttrValue::from(CHARGE_TYPE_PREPAID),
        );
        let d = data_for(config);
        assert_eq!(auto_renew_flag(&d, CHARGE_TYPE_PREPAID), 1);
    }

    #[test]
    fn machine_and_network_force_replacement() {
        let schema = SqlserverBasicInstanceResource.schema();
        for name in ["machine_type", "vpc_id", "subnet_id", "charge_type"] {
            let field = schema.field(name).unwrap();
            assert!(field.force_new, "{name} should force replacement");
        }
    }
}
