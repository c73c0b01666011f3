//! 实例列表数据源：`tencentcloud_sqlserver_instances`。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::Result;
use crate::retry::{self, READ_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, data_resource_id_hash,
    write_result_output,
};
use crate::traits::DataSource;

use super::service::{InstanceFilter, SqlserverService};
use super::types::DbInstance;
use super::{CHARGE_TYPE_POSTPAID, CHARGE_TYPE_PREPAID, PAY_MODE_PREPAID};

pub struct SqlserverInstancesDataSource;

fn flatten_instance(instance: DbInstance) -> AttrMap {
    let charge_type = if instance.pay_mode == Some(PAY_MODE_PREPAID) {
        CHARGE_TYPE_PREPAID
    } else {
        CHARGE_TYPE_POSTPAID
    };
    let mut m = AttrMap::new();
    m.insert("id".to_string(), AttrValue::from(instance.instance_id));
    m.insert("charge_type".to_string(), AttrValue::from(charge_type));
    if let Some(name) = instance.name {
        m.insert("name".to_string(), AttrValue::from(name));
    }
    if let Some(zone) = instance.zone {
        m.insert("availability_zone".to_string(), AttrValue::from(zone));
    }
    if let Some(version) = instance.version {
        m.insert("engine_version".to_string(), AttrValue::from(version));
    }
    if let Some(project_id) = instance.project_id {
        m.insert("project_id".to_string(), AttrValue::from(project_id));
    }
    if let Some(vpc_id) = instance.uniq_vpc_id {
        m.insert("vpc_id".to_string(), AttrValue::from(vpc_id));
    }
    if let Some(subnet_id) = instance.uniq_subnet_id {
        m.insert("subnet_id".to_string(), AttrValue::from(subnet_id));
    }
    if let Some(memory) = instance.memory {
        m.insert("memory".to_string(), AttrValue::from(memory));
    }
    if let Some(storage) = instance.storage {
        m.insert("storage".to_string(), AttrValue::from(storage));
    }
    if let Some(used_storage) = instance.used_storage {
        m.insert("used_storage".to_string(), AttrValue::from(used_storage));
    }
    if let Some(status) = instance.status {
        m.insert("status".to_string(), AttrValue::from(status));
    }
    if let Some(vip) = instance.vip {
        m.insert("vip".to_string(), AttrValue::from(vip));
    }
    if let Some(vport) = instance.vport {
        m.insert("vport".to_string(), AttrValue::from(vport));
    }
    if let Some(create_time) = instance.create_time {
        m.insert("create_time".to_string(), AttrValue::from(create_time));
    }
    if let Some(ro_flag) = instance.ro_flag {
        m.insert("ro_flag".to_string(), AttrValue::from(ro_flag));
    }
    m
}

#[async_trait]
impl DataSource for SqlserverInstancesDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_sqlserver_instances"
    }

    fn schema(&self) -> Schema {
        let instance = Schema::new([
            ("id", FieldSchema::string().computed()),
            ("name", FieldSchema::string().computed()),
            ("charge_type", FieldSchema::string().computed()),
            ("engine_version", FieldSchema::string().computed()),
            ("project_id", FieldSchema::int().computed()),
            ("vpc_id", FieldSchema::string().computed()),
            ("subnet_id", FieldSchema::string().computed()),
            ("memory", FieldSchema::int().computed()),
            ("storage", FieldSchema::int().computed()),
            ("used_storage", FieldSchema::int().computed()),
            ("availability_zone", FieldSchema::string().computed()),
            ("status", FieldSchema::int().computed()),
            ("vip", FieldSchema::string().computed()),
            ("vport", FieldSchema::int().computed()),
            ("create_time", FieldSchema::string().computed()),
            ("ro_flag", FieldSchema::string().computed()),
        ]);
        Schema::new([
            (
                "id",
                FieldSchema::string()
                    .optional()
                    .desc("ID of the SQL Server instance to be queried."),
            ),
            (
                "name",
                FieldSchema::string()
                    .optional()
                    .desc("Name of the SQL Server instance to be queried."),
            ),
            (
                "project_id",
                FieldSchema::int()
                    .optional()
                    .desc("Project ID of the SQL Server instance to be queried."),
            ),
            (
                "vpc_id",
                FieldSchema::string()
                    .optional()
                    .desc("Vpc ID of the SQL Server instance to be queried."),
            ),
            (
                "subnet_id",
                FieldSchema::string()
                    .optional()
                    .desc("Subnet ID of the SQL Server instance to be queried."),
            ),
            (
                "result_output_file",
                FieldSchema::string()
                    .optional()
                    .desc("Used to save results."),
            ),
            (
                "instance_list",
                FieldSchema::block_list(instance)
                    .computed()
                    .desc("A list of SQL Server instances."),
            ),
        ])
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = SqlserverService::new(conn);
        let filter = InstanceFilter {
            instance_id: d.get_ok_string("id"),
            name: d.get_ok_string("name"),
            project_id: d.get_ok_int("project_id"),
            vpc_id: d.get_ok_string("vpc_id"),
            subnet_id: d.get_ok_string("subnet_id"),
        };

        let instances = retry::within(READ_RETRY_TIMEOUT, || async {
            service.describe_instances(&filter).await.map_err(retry_error)
        })
        .await?;

        let ids: Vec<String> = instances.iter().map(|i| i.instance_id.clone()).collect();
        let instance_list: Vec<AttrMap> = instances.into_iter().map(flatten_instance).collect();

        if let Some(path) = d.get_ok_string("result_output_file") {
            write_result_output(&path, &instance_list)?;
        }
        d.set("instance_list", instance_list)?;
        d.set_id(data_resource_id_hash(&ids));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_maps_pay_mode_to_charge_type() {
        let prepaid = DbInstance {
            instance_id: "mssql-1".to_string(),
            pay_mode: Some(1),
            ..DbInstance::default()
        };
        let postpaid = DbInstance {
            instance_id: "mssql-2".to_string(),
            pay_mode: Some(0),
            ..DbInstance::default()
        };
        assert_eq!(
            flatten_instance(prepaid).get("charge_type"),
            Some(&AttrValue::from(CHARGE_TYPE_PREPAID))
        );
        assert_eq!(
            flatten_instance(postpaid).get("charge_type"),
            Some(&AttrValue::from(CHARGE_TYPE_POSTPAID))
        );
    }

    #[test]
    fn flatten_keeps_only_present_fields() {
        let instance = DbInstance {
            instance_id: "mssql-3".to_string(),
            memory: Some(4),
            used_storage: Some(30),
            ..DbInstance::default()
        };
        let m = flatten_instance(instance);
        assert_eq!(m.get("memory"), Some(&AttrValue::from(4i64)));
        assert_eq!(m.get("used_storage"), Some(&AttrValue::from(30i64)));
        assert!(!m.contains_key("vip"));
        assert!(!m.contains_key("ro_flag"));
    }
}
