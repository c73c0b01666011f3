//! MongoDB 接口的请求与响应结构。
//!
//! 按量（CreateDBInstanceHour）和包年包月（CreateDBInstance）两个购买
//! 动作报文同形，共用一个请求体，包年包月多出的 Period/AutoRenewFlag
//! 按需跳过。实例详情里内存和磁盘都是整实例的 MB 口径。

use serde::{Deserialize, Serialize};

// ============ 购买 ============

#[derive(Debug, Default, Serialize)]
pub(crate) struct CreateInstanceRequest {
    #[serde(rename = "ReplicateSetNum")]
    pub replicate_set_num: i64,
    #[serde(rename = "NodeNum")]
    pub node_num: i64,
    #[serde(rename = "GoodsNum")]
    pub goods_num: i64,
    #[serde(rename = "ClusterType")]
    pub cluster_type: String,
    #[serde(rename = "Memory")]
    pub memory: i64,
    #[serde(rename = "Volume")]
    pub volume: i64,
    #[serde(rename = "MongoVersion")]
    pub mongo_version: String,
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "MachineCode")]
    pub machine_code: String,
    #[serde(rename = "Password")]
    pub password: String,
    // 平台把正式/克隆标记叫 Clone，正式实例固定传 1
    #[serde(rename = "Clone")]
    pub instance_type: i64,
    #[serde(rename = "ProjectId")]
    pub project_id: i64,
    #[serde(rename = "VpcId", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(rename = "SubnetId", skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(rename = "SecurityGroup", skip_serializing_if = "Option::is_none")]
    pub security_group: Option<Vec<String>>,
    #[serde(rename = "Period", skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    #[serde(rename = "AutoRenewFlag", skip_serializing_if = "Option::is_none")]
    pub auto_renew_flag: Option<i64>,
    #[serde(rename = "MongosCpu", skip_serializing_if = "Option::is_none")]
    pub mongos_cpu: Option<i64>,
    #[serde(rename = "MongosMemory", skip_serializing_if = "Option::is_none")]
    pub mongos_memory: Option<i64>,
    #[serde(rename = "MongosNodeNum", skip_serializing_if = "Option::is_none")]
    pub mongos_node_num: Option<i64>,
    #[serde(rename = "AvailabilityZoneList", skip_serializing_if = "Option::is_none")]
    pub availability_zone_list: Option<Vec<String>>,
    #[serde(rename = "HiddenZone", skip_serializing_if = "Option::is_none")]
    pub hidden_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateInstanceResponse {
    #[serde(rename = "InstanceIds", default)]
    pub instance_ids: Vec<String>,
}

// ============ 查询 ============

#[derive(Debug, Serialize)]
pub(crate) struct DescribeInstancesRequest {
    #[serde(rename = "InstanceIds", skip_serializing_if = "Option::is_none")]
    pub instance_ids: Option<Vec<String>>,
    #[serde(rename = "ClusterType", skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<i64>,
    #[serde(rename = "Offset")]
    pub offset: i64,
    #[serde(rename = "Limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeInstancesResponse {
    #[serde(rename = "InstanceDetails", default)]
    pub instance_details: Vec<InstanceDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InstanceDetail {
    #[serde(rename = "InstanceId", default)]
    pub instance_id: String,
    #[serde(rename = "InstanceName", default)]
    pub instance_name: Option<String>,
    #[serde(rename = "PayMode", default)]
    pub pay_mode: Option<i64>,
    #[serde(rename = "ProjectId", default)]
    pub project_id: Option<i64>,
    #[serde(rename = "ClusterType", default)]
    pub cluster_type: Option<i64>,
    #[serde(rename = "Zone", default)]
    pub zone: Option<String>,
    #[serde(rename = "VpcId", default)]
    pub vpc_id: Option<String>,
    #[serde(rename = "SubnetId", default)]
    pub subnet_id: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<i64>,
    #[serde(rename = "Vip", default)]
    pub vip: Option<String>,
    #[serde(rename = "Vport", default)]
    pub vport: Option<i64>,
    #[serde(rename = "CreateTime", default)]
    pub create_time: Option<String>,
    #[serde(rename = "MongoVersion", default)]
    pub mongo_version: Option<String>,
    #[serde(rename = "Memory", default)]
    pub memory: Option<i64>,
    #[serde(rename = "Volume", default)]
    pub volume: Option<i64>,
    #[serde(rename = "MachineType", default)]
    pub machine_type: Option<String>,
    #[serde(rename = "AutoRenewFlag", default)]
    pub auto_renew_flag: Option<i64>,
    #[serde(rename = "ReplicationSetNum", default)]
    pub replication_set_num: Option<i64>,
    #[serde(rename = "SecondaryNum", default)]
    pub secondary_num: Option<i64>,
    #[serde(rename = "MongosCpuNum", default)]
    pub mongos_cpu_num: Option<i64>,
    #[serde(rename = "MongosMemory", default)]
    pub mongos_memory: Option<i64>,
    #[serde(rename = "MongosNodeNum", default)]
    pub mongos_node_num: Option<i64>,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<TagInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagInfo {
    #[serde(rename = "TagKey", default)]
    pub tag_key: Option<String>,
    #[serde(rename = "TagValue", default)]
    pub tag_value: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeSecurityGroupRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeSecurityGroupResponse {
    #[serde(rename = "Groups", default)]
    pub groups: Vec<SecurityGroupInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SecurityGroupInfo {
    #[serde(rename = "SecurityGroupId", default)]
    pub security_group_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeNodePropertyRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeNodePropertyResponse {
    #[serde(rename = "ReplicateSets", default)]
    pub replicate_sets: Vec<ReplicateSetInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplicateSetInfo {
    #[serde(rename = "Nodes", default)]
    pub nodes: Vec<NodeProperty>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeProperty {
    #[serde(rename = "Zone", default)]
    pub zone: Option<String>,
    #[serde(rename = "Hidden", default)]
    pub hidden: Option<bool>,
}

// ============ 变更 ============

#[derive(Debug, Serialize)]
pub(crate) struct RenameInstanceRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "NewName")]
    pub new_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyInstanceSpecRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "Memory")]
    pub memory: i64,
    #[serde(rename = "Volume")]
    pub volume: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignProjectRequest {
    #[serde(rename = "InstanceIds")]
    pub instance_ids: Vec<String>,
    #[serde(rename = "ProjectId")]
    pub project_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "Password")]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResetPasswordResponse {
    #[serde(rename = "AsyncRequestId", default)]
    pub async_request_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeAsyncRequestInfoRequest {
    #[serde(rename = "AsyncRequestId")]
    pub async_request_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeAsyncRequestInfoResponse {
    #[serde(rename = "Status", default)]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifySecurityGroupsRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "SecurityGroupIds")]
    pub security_group_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenewInstancesRequest {
    #[serde(rename = "InstanceIds")]
    pub instance_ids: Vec<String>,
    #[serde(rename = "InstanceChargePrepaid")]
    pub instance_charge_prepaid: InstanceChargePrepaid,
}

#[derive(Debug, Serialize)]
pub(crate) struct InstanceChargePrepaid {
    #[serde(rename = "Period")]
    pub period: i64,
    #[serde(rename = "RenewFlag")]
    pub renew_flag: String,
}

// ============ 退还与下线 ============

#[derive(Debug, Serialize)]
pub(crate) struct IsolateInstanceRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TerminateInstancesRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OfflineIsolatedInstanceRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hourly_order_omits_prepaid_and_mongos_fields() {
        let req = CreateInstanceRequest {
            replicate_set_num: 1,
            node_num: 3,
            goods_num: 1,
            cluster_type: "REPLSET".to_string(),
            memory: 4,
            volume: 100,
            mongo_version: "MONGO_40_WT".to_string(),
            zone: "ap-guangzhou-2".to_string(),
            machine_code: "HIO10G".to_string(),
            password: "test".to_string(),
            instance_type: 1,
            project_id: 0,
            ..CreateInstanceRequest::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["ClusterType"], "REPLSET");
        assert_eq!(json["Clone"], 1);
        let body = json.as_object().unwrap();
        assert!(!body.contains_key("Period"));
        assert!(!body.contains_key("AutoRenewFlag"));
        assert!(!body.contains_key("MongosCpu"));
        assert!(!body.contains_key("AvailabilityZoneList"));
    }

    #[test]
    fn detail_parses_platform_casing() {
        let raw = r#"{
            "InstanceId": "cmgo-9d0p6umb",
            "InstanceName": "mongo-test",
            "PayMode": 1,
            "ClusterType": 1,
            "MongoVersion": "MONGO_36_WT",
            "Memory": 8192,
            "Volume": 204800,
            "ReplicationSetNum": 2,
            "SecondaryNum": 2,
            "MongosCpuNum": 1,
            "MongosMemory": 2048,
            "Tags": [{"TagKey": "team", "TagValue": "db"}]
        }"#;
        let detail: InstanceDetail = serde_json::from_str(raw).unwrap();
        assert_eq!(detail.instance_id, "cmgo-9d0p6umb");
        assert_eq!(detail.pay_mode, Some(1));
        assert_eq!(detail.mongo_version.as_deref(), Some("MONGO_36_WT"));
        assert_eq!(detail.replication_set_num, Some(2));
        assert_eq!(detail.mongos_memory, Some(2048));
        assert_eq!(detail.tags[0].tag_key.as_deref(), Some("team"));
    }

    #[test]
    fn fresh_purchase_tolerates_missing_ids() {
        let resp: CreateInstanceResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.instance_ids.is_empty());
    }

    #[test]
    fn node_property_carries_zone_and_hidden_flag() {
        let raw = r#"{
            "ReplicateSets": [
                {"Nodes": [
                    {"Zone": "ap-guangzhou-2", "Hidden": false},
                    {"Zone": "ap-guangzhou-3", "Hidden": true}
                ]}
            ]
        }"#;
        let resp: DescribeNodePropertyResponse = serde_json::from_str(raw).unwrap();
        let nodes = &resp.replicate_sets[0].nodes;
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].zone.as_deref(), Some("ap-guangzhou-3"));
        assert_eq!(nodes[1].hidden, Some(true));
    }
}
