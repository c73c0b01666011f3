//! 分片集群资源：`tencentcloud_mongodb_sharding_instance`。
//!
//! 和副本集共用一套购买与回读骨架，差别在拓扑：分片数、每片节点数、
//! mongos 规格，以及多可用区部署。详情里的内存和磁盘是整集群口径，
//! 回读时要按分片数摊回单片的 GB 数。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, retry_error};
use crate::schema::{FieldSchema, ResourceData, Schema, Validation};
use crate::traits::Resource;

use super::resource_instance::{
    apply_common_updates, build_create_request, check_security_group_support, fill_instance_basics,
    finish_creation, retire_instance, shared_instance_fields, submit_purchase, wait_for_spec,
};
use super::service::MongodbService;
use super::CLUSTER_TYPE_SHARD;

pub struct MongodbShardingInstanceResource;

#[async_trait]
impl Resource for MongodbShardingInstanceResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_mongodb_sharding_instance"
    }

    fn schema(&self) -> Schema {
        let extra = [
            (
                "shard_quantity",
                FieldSchema::int()
                    .required()
                    .force_new()
                    .validate(Validation::int_range(2, 20))
                    .desc("Number of sharding."),
            ),
            (
                "nodes_per_shard",
                FieldSchema::int()
                    .required()
                    .force_new()
                    .validate(Validation::int_range(3, 5))
                    .desc("Number of nodes per shard, at least 3(one master and two slaves)."),
            ),
            (
                "mongos_cpu",
                FieldSchema::int()
                    .optional()
                    .desc("Number of mongos cpu."),
            ),
            (
                "mongos_memory",
                FieldSchema::int()
                    .optional()
                    .desc("Mongos memory size in GB."),
            ),
            (
                "mongos_node_num",
                FieldSchema::int()
                    .optional()
                    .desc("Number of mongos."),
            ),
            (
                "availability_zone_list",
                FieldSchema::list(FieldSchema::string())
                    .optional()
                    .computed()
                    .force_new()
                    .desc("A list of nodes deployed in multiple availability zones. It needs to be set together with `hidden_zone`. For data consistency, the number of availability zones must be an odd number."),
            ),
            (
                "hidden_zone",
                FieldSchema::string()
                    .optional()
                    .computed()
                    .force_new()
                    .desc("The availability zone to which the hidden node belongs. It needs to be set together with `availability_zone_list`."),
            ),
        ];
        Schema::new(shared_instance_fields().into_iter().chain(extra))
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = MongodbService::new(conn);
        check_security_group_support(d, self.type_name())?;

        // 多可用区部署要整套一起给：节点可用区列表和隐藏节点可用区。
        let zone_list = d.get_string_list("availability_zone_list");
        let hidden_zone = d.get_ok_string("hidden_zone");
        if zone_list.is_empty() != hidden_zone.is_none() {
            return Err(ProviderError::InvalidParameter {
                product: self.type_name().to_string(),
                param: "availability_zone_list".to_string(),
                detail: "`availability_zone_list` and `hidden_zone` have to be set together"
                    .to_string(),
            });
        }

        let mut req = build_create_request(d, self.type_name())?;
        req.cluster_type = CLUSTER_TYPE_SHARD.to_string();
        req.replicate_set_num = d.get_int("shard_quantity");
        req.node_num = d.get_int("nodes_per_shard");
        req.mongos_cpu = d.get_ok_int("mongos_cpu");
        req.mongos_memory = d.get_ok_int("mongos_memory");
        req.mongos_node_num = d.get_ok_int("mongos_node_num");
        if !zone_list.is_empty() {
            req.availability_zone_list = Some(zone_list);
        }
        req.hidden_zone = hidden_zone;

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
        let shards = detail.replication_set_num.unwrap_or_default().max(1);
        d.set("shard_quantity", shards)?;
        d.set("nodes_per_shard", detail.secondary_num.unwrap_or_default() + 1)?;
        d.set("memory", detail.memory.unwrap_or_default() / 1024 / shards)?;
        d.set("volume", detail.volume.unwrap_or_default() / 1024 / shards)?;
        if let Some(cpu) = detail.mongos_cpu_num {
            d.set("mongos_cpu", cpu)?;
        }
        if let Some(memory) = detail.mongos_memory {
            d.set("mongos_memory", memory / 1024)?;
        }
        if let Some(node_num) = detail.mongos_node_num {
            d.set("mongos_node_num", node_num)?;
        }

        let security_groups = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_security_groups(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set("security_groups", security_groups)?;

        // 多可用区形态下从首个分片的节点分布反推出部署面。单可用区
        // 集群只回一个复制组，不用填。
        let replicate_sets = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_node_property(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        if replicate_sets.len() > 1 {
            let mut zones = Vec::new();
            let mut hidden_zone = String::new();
            for node in &replicate_sets[0].nodes {
                let Some(zone) = node.zone.clone() else {
                    continue;
                };
                if node.hidden == Some(true) {
                    hidden_zone = zone.clone();
                }
                zones.push(zone);
            }
            d.set("availability_zone_list", zones)?;
            d.set("hidden_zone", hidden_zone)?;
        }

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
            "shard_quantity",
            "nodes_per_shard",
            "availability_zone_list",
            "hidden_zone",
            "mongos_cpu",
            "mongos_memory",
            "mongos_node_num",
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
            wait_for_spec(
                &service,
                &instance_id,
                memory,
                volume,
                d.get_int("shard_quantity"),
            )
            .await?;
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
