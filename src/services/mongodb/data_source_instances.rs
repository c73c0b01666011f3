//! 实例列表数据源：`tencentcloud_mongodb_instances`。
//!
//! 集群形态在查询参数里是字符串（replset/shard），报文里却是数字编码，
//! 这里做一次换算。内存和磁盘沿用整实例 GB 口径，不按分片摊。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::Result;
use crate::retry::{self, READ_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation, data_resource_id_hash,
    write_result_output,
};
use crate::traits::DataSource;

use super::resource_instance::instance_tags;
use super::service::MongodbService;
use super::types::InstanceDetail;
use super::{
    CHARGE_TYPE_POSTPAID, CHARGE_TYPE_PREPAID, CLUSTER_CODE_REPLSET, CLUSTER_CODE_SHARD,
    CLUSTER_FILTER_REPLSET, CLUSTER_FILTER_SHARD, PAY_MODE_PREPAID, canonical_machine_type,
};

pub struct MongodbInstancesDataSource;

fn flatten_instance(detail: InstanceDetail) -> AttrMap {
    let tags = instance_tags(&detail);
    let charge_type = if detail.pay_mode == Some(PAY_MODE_PREPAID) {
        CHARGE_TYPE_PREPAID
    } else {
        CHARGE_TYPE_POSTPAID
    };
    let cluster_type = if detail.cluster_type == Some(CLUSTER_CODE_SHARD) {
        CLUSTER_FILTER_SHARD
    } else {
        CLUSTER_FILTER_REPLSET
    };

    let mut item = AttrMap::new();
    item.insert("instance_id".to_string(), AttrValue::from(detail.instance_id));
    item.insert("charge_type".to_string(), AttrValue::from(charge_type));
    item.insert("cluster_type".to_string(), AttrValue::from(cluster_type));
    item.insert("tags".to_string(), AttrValue::from(tags));
    if let Some(name) = detail.instance_name {
        item.insert("instance_name".to_string(), AttrValue::from(name));
    }
    if let Some(project_id) = detail.project_id {
        item.insert("project_id".to_string(), AttrValue::from(project_id));
    }
    if let Some(zone) = detail.zone {
        item.insert("available_zone".to_string(), AttrValue::from(zone));
    }
    if let Some(vpc_id) = detail.vpc_id {
        item.insert("vpc_id".to_string(), AttrValue::from(vpc_id));
    }
    if let Some(subnet_id) = detail.subnet_id {
        item.insert("subnet_id".to_string(), AttrValue::from(subnet_id));
    }
    if let Some(status) = detail.status {
        item.insert("status".to_string(), AttrValue::from(status));
    }
    if let Some(vip) = detail.vip {
        item.insert("vip".to_string(), AttrValue::from(vip));
    }
    if let Some(vport) = detail.vport {
        item.insert("vport".to_string(), AttrValue::from(vport));
    }
    if let Some(create_time) = detail.create_time {
        item.insert("create_time".to_string(), AttrValue::from(create_time));
    }
    if let Some(version) = detail.mongo_version {
        item.insert("engine_version".to_string(), AttrValue::from(version));
    }
    if let Some(machine) = detail.machine_type {
        item.insert(
            "machine_type".to_string(),
            AttrValue::from(canonical_machine_type(&machine).to_string()),
        );
    }
    if let Some(memory) = detail.memory {
        item.insert("memory".to_string(), AttrValue::from(memory / 1024));
    }
    if let Some(volume) = detail.volume {
        item.insert("volume".to_string(), AttrValue::from(volume / 1024));
    }
    if let Some(shards) = detail.replication_set_num {
        item.insert("shard_quantity".to_string(), AttrValue::from(shards));
    }
    item
}

#[async_trait]
impl DataSource for MongodbInstancesDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_mongodb_instances"
    }

    fn schema(&self) -> Schema {
        let instance_fields = Schema::new([
            (
                "instance_id",
                FieldSchema::string().computed().desc("ID of the Mongodb instance."),
            ),
            (
                "instance_name",
                FieldSchema::string().computed().desc("Name of the Mongodb instance."),
            ),
            (
                "project_id",
                FieldSchema::int()
                    .computed()
                    .desc("ID of the project which the instance belongs."),
            ),
            (
                "cluster_type",
                FieldSchema::string()
                    .computed()
                    .desc("Type of Mongodb cluster, and available values include replica set cluster(expressed with `replset`) and sharding cluster(expressed with `shard`)."),
            ),
            (
                "available_zone",
                FieldSchema::string().computed().desc("The available zone of the Mongodb."),
            ),
            (
                "vpc_id",
                FieldSchema::string().computed().desc("ID of the VPC."),
            ),
            (
                "subnet_id",
                FieldSchema::string()
                    .computed()
                    .desc("ID of the subnet within this VPC."),
            ),
            (
                "status",
                FieldSchema::int().computed().desc(
                    "Status of the Mongodb, and available values include pending initialization(expressed with 0), processing(expressed with 1), running(expressed with 2) and expired(expressed with -2).",
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
            (
                "engine_version",
                FieldSchema::string().computed().desc("Version of the Mongodb engine."),
            ),
            (
                "charge_type",
                FieldSchema::string().computed().desc("The charge type of instance."),
            ),
            (
                "machine_type",
                FieldSchema::string().computed().desc("Type of Mongodb instance."),
            ),
            (
                "memory",
                FieldSchema::int().computed().desc("Memory size in GB."),
            ),
            (
                "volume",
                FieldSchema::int().computed().desc("Disk size in GB."),
            ),
            (
                "shard_quantity",
                FieldSchema::int()
                    .computed()
                    .desc("Number of sharding."),
            ),
            (
                "tags",
                FieldSchema::string_map().computed().desc("The tags of the Mongodb instance."),
            ),
        ]);
        Schema::new([
            (
                "instance_id",
                FieldSchema::string().optional().desc("ID of the Mongodb instance to be queried."),
            ),
            (
                "cluster_type",
                FieldSchema::string()
                    .optional()
                    .validate(Validation::allowed(&[
                        CLUSTER_FILTER_REPLSET,
                        CLUSTER_FILTER_SHARD,
                    ]))
                    .desc("Type of Mongodb cluster, and available values include replica set cluster(expressed with `replset`) and sharding cluster(expressed with `shard`)."),
            ),
            (
                "result_output_file",
                FieldSchema::string().optional().desc("Used to store results."),
            ),
            (
                "instance_list",
                FieldSchema::block_list(instance_fields)
                    .computed()
                    .desc("A list of instances. Each element contains the following attributes:"),
            ),
        ])
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = MongodbService::new(conn);
        let instance_id = d.get_ok_string("instance_id");
        let cluster_filter = d.get_ok_string("cluster_type").map(|filter| {
            if filter == CLUSTER_FILTER_SHARD {
                CLUSTER_CODE_SHARD
            } else {
                CLUSTER_CODE_REPLSET
            }
        });

        let details = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_instances(instance_id.as_deref(), cluster_filter)
                .await
                .map_err(retry_error)
        })
        .await?;

        let ids: Vec<String> = details
            .iter()
            .map(|detail| detail.instance_id.clone())
            .collect();
        let items: Vec<AttrMap> = details.into_iter().map(flatten_instance).collect();

        if let Some(path) = d.get_ok_string("result_output_file") {
            write_result_output(&path, &items)?;
        }
        d.set("instance_list", items)?;
        d.set_id(data_resource_id_hash(&ids));
        Ok(())
    }
}
