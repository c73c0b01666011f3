//! SQL Server 接口的请求与响应结构。
//!
//! 平台字段名带历史包袱：数据库版本是 `DBVersion`，实例列表键是
//! `DBInstances`，只读标记是 `ROFlag`，这里全部用 rename 对齐。

use serde::{Deserialize, Serialize};

// ============ 下单 ============

#[derive(Debug, Default, Serialize)]
pub(crate) struct CreateDbInstancesRequest {
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Memory")]
    pub memory: i64,
    #[serde(rename = "Storage")]
    pub storage: i64,
    #[serde(rename = "InstanceChargeType")]
    pub instance_charge_type: String,
    #[serde(rename = "ProjectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(rename = "GoodsNum")]
    pub goods_num: i64,
    #[serde(rename = "SubnetId")]
    pub subnet_id: String,
    #[serde(rename = "VpcId")]
    pub vpc_id: String,
    #[serde(rename = "Period", skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    #[serde(rename = "AutoVoucher")]
    pub auto_voucher: i64,
    #[serde(rename = "VoucherIds", skip_serializing_if = "Option::is_none")]
    pub voucher_ids: Option<Vec<String>>,
    #[serde(rename = "DBVersion")]
    pub db_version: String,
    #[serde(rename = "AutoRenewFlag", skip_serializing_if = "Option::is_none")]
    pub auto_renew_flag: Option<i64>,
    #[serde(rename = "SecurityGroupList")]
    pub security_group_list: Vec<String>,
    #[serde(rename = "Weekly", skip_serializing_if = "Option::is_none")]
    pub weekly: Option<Vec<i64>>,
    #[serde(rename = "StartTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "Span", skip_serializing_if = "Option::is_none")]
    pub span: Option<i64>,
    #[serde(rename = "HAType")]
    pub ha_type: String,
    #[serde(rename = "MultiZones")]
    pub multi_zones: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateDbInstancesResponse {
    #[serde(rename = "DealNames", default)]
    pub deal_names: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct CreateBasicDbInstancesRequest {
    #[serde(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Cpu")]
    pub cpu: i64,
    #[serde(rename = "Memory")]
    pub memory: i64,
    #[serde(rename = "Storage")]
    pub storage: i64,
    #[serde(rename = "SubnetId")]
    pub subnet_id: String,
    #[serde(rename = "VpcId")]
    pub vpc_id: String,
    #[serde(rename = "MachineType")]
    pub machine_type: String,
    #[serde(rename = "InstanceChargeType")]
    pub instance_charge_type: String,
    #[serde(rename = "ProjectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(rename = "GoodsNum")]
    pub goods_num: i64,
    #[serde(rename = "DBVersion")]
    pub db_version: String,
    #[serde(rename = "Period")]
    pub period: i64,
    #[serde(rename = "AutoRenewFlag")]
    pub auto_renew_flag: i64,
    #[serde(rename = "AutoVoucher")]
    pub auto_voucher: i64,
    #[serde(rename = "VoucherIds")]
    pub voucher_ids: Vec<String>,
    #[serde(rename = "SecurityGroupList")]
    pub security_group_list: Vec<String>,
    #[serde(rename = "Weekly", skip_serializing_if = "Option::is_none")]
    pub weekly: Option<Vec<i64>>,
    #[serde(rename = "StartTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "Span", skip_serializing_if = "Option::is_none")]
    pub span: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateBasicDbInstancesResponse {
    #[serde(rename = "DealName", default)]
    pub deal_name: String,
}

// ============ 订单与流程 ============

#[derive(Debug, Serialize)]
pub(crate) struct DescribeOrdersRequest {
    #[serde(rename = "DealNames")]
    pub deal_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeOrdersResponse {
    #[serde(rename = "Deals", default)]
    pub deals: Vec<DealInfo>,
}

/// 订单详情。实例 ID 和流程 ID 是异步补上的，刚下单时可能都还是空。
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DealInfo {
    #[serde(rename = "InstanceIdSet", default)]
    pub instance_id_set: Vec<String>,
    #[serde(rename = "FlowId", default)]
    pub flow_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeFlowStatusRequest {
    #[serde(rename = "FlowId")]
    pub flow_id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeFlowStatusResponse {
    #[serde(rename = "Status", default)]
    pub status: i64,
}

// ============ 实例查询 ============

#[derive(Debug, Default, Serialize)]
pub(crate) struct DescribeDbInstancesRequest {
    #[serde(rename = "Offset")]
    pub offset: i64,
    #[serde(rename = "Limit")]
    pub limit: i64,
    #[serde(rename = "InstanceIdSet", skip_serializing_if = "Option::is_none")]
    pub instance_id_set: Option<Vec<String>>,
    #[serde(rename = "InstanceNameSet", skip_serializing_if = "Option::is_none")]
    pub instance_name_set: Option<Vec<String>>,
    #[serde(rename = "ProjectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(rename = "VpcId", skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(rename = "SubnetId", skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeDbInstancesResponse {
    #[serde(rename = "DBInstances", default)]
    pub db_instances: Vec<DbInstance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DbInstance {
    #[serde(rename = "InstanceId", default)]
    pub instance_id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "ProjectId", default)]
    pub project_id: Option<i64>,
    #[serde(rename = "Zone", default)]
    pub zone: Option<String>,
    #[serde(rename = "UniqVpcId", default)]
    pub uniq_vpc_id: Option<String>,
    #[serde(rename = "UniqSubnetId", default)]
    pub uniq_subnet_id: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<i64>,
    #[serde(rename = "Vip", default)]
    pub vip: Option<String>,
    #[serde(rename = "Vport", default)]
    pub vport: Option<i64>,
    #[serde(rename = "CreateTime", default)]
    pub create_time: Option<String>,
    #[serde(rename = "PayMode", default)]
    pub pay_mode: Option<i64>,
    #[serde(rename = "Memory", default)]
    pub memory: Option<i64>,
    #[serde(rename = "Storage", default)]
    pub storage: Option<i64>,
    #[serde(rename = "UsedStorage", default)]
    pub used_storage: Option<i64>,
    #[serde(rename = "Version", default)]
    pub version: Option<String>,
    #[serde(rename = "RenewFlag", default)]
    pub renew_flag: Option<i64>,
    #[serde(rename = "ROFlag", default)]
    pub ro_flag: Option<String>,
    #[serde(rename = "HAFlag", default)]
    pub ha_flag: Option<String>,
    #[serde(rename = "Cpu", default)]
    pub cpu: Option<i64>,
    #[serde(rename = "Type", default)]
    pub machine_type: Option<String>,
}

// ============ 实例变更 ============

#[derive(Debug, Serialize)]
pub(crate) struct ModifyDbInstanceNameRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "InstanceName")]
    pub instance_name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyDbInstanceProjectRequest {
    #[serde(rename = "InstanceIdSet")]
    pub instance_id_set: Vec<String>,
    #[serde(rename = "ProjectId")]
    pub project_id: i64,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct UpgradeDbInstanceRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "Memory")]
    pub memory: i64,
    #[serde(rename = "Storage")]
    pub storage: i64,
    #[serde(rename = "Cpu", skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i64>,
    #[serde(rename = "AutoVoucher", skip_serializing_if = "Option::is_none")]
    pub auto_voucher: Option<i64>,
    #[serde(rename = "VoucherIds", skip_serializing_if = "Option::is_none")]
    pub voucher_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyDbInstanceNetworkRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "NewVpcId")]
    pub new_vpc_id: String,
    #[serde(rename = "NewSubnetId")]
    pub new_subnet_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModifyDbInstanceNetworkResponse {
    #[serde(rename = "FlowId", default)]
    pub flow_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct InstanceRenewInfo {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "RenewFlag")]
    pub renew_flag: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyDbInstanceRenewFlagRequest {
    #[serde(rename = "RenewFlags")]
    pub renew_flags: Vec<InstanceRenewInfo>,
}

// ============ 安全组 ============

/// 绑定和解绑动作不同但报文同形，共用一个请求体。
#[derive(Debug, Serialize)]
pub(crate) struct SecurityGroupOpRequest {
    #[serde(rename = "SecurityGroupId")]
    pub security_group_id: String,
    #[serde(rename = "InstanceIdSet")]
    pub instance_id_set: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeDbSecurityGroupsRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeDbSecurityGroupsResponse {
    #[serde(rename = "SecurityGroupSet", default)]
    pub security_group_set: Vec<SecurityGroupItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SecurityGroupItem {
    #[serde(rename = "SecurityGroupId", default)]
    pub security_group_id: String,
}

// ============ 维护窗口 ============

#[derive(Debug, Serialize)]
pub(crate) struct ModifyMaintenanceSpanRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "Weekly", skip_serializing_if = "Option::is_none")]
    pub weekly: Option<Vec<i64>>,
    #[serde(rename = "StartTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "Span", skip_serializing_if = "Option::is_none")]
    pub span: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeMaintenanceSpanRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DescribeMaintenanceSpanResponse {
    #[serde(rename = "Weekly", default)]
    pub weekly: Vec<i64>,
    #[serde(rename = "StartTime", default)]
    pub start_time: String,
    #[serde(rename = "Span", default)]
    pub span: i64,
}

// ============ 退还与销毁 ============

#[derive(Debug, Serialize)]
pub(crate) struct TerminateDbInstanceRequest {
    #[serde(rename = "InstanceIdSet")]
    pub instance_id_set: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteDbInstanceRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecycleDbInstanceRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecycleDbInstanceResponse {
    #[serde(rename = "FlowId", default)]
    pub flow_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_parses_platform_casing() {
        let raw = r#"{
            "InstanceId": "mssql-3l3fgqn7",
            "Name": "demo",
            "UniqVpcId": "vpc-409mvdvv",
            "UniqSubnetId": "subnet-nf9n81ps",
            "Status": 2,
            "PayMode": 1,
            "Memory": 2,
            "Storage": 10,
            "UsedStorage": 3,
            "Version": "2008R2",
            "ROFlag": "RO",
            "HAFlag": "MIRROR",
            "Type": "CLOUD_PREMIUM"
        }"#;
        let instance: DbInstance = serde_json::from_str(raw).unwrap();
        assert_eq!(instance.instance_id, "mssql-3l3fgqn7");
        assert_eq!(instance.uniq_vpc_id.as_deref(), Some("vpc-409mvdvv"));
        assert_eq!(instance.pay_mode, Some(1));
        assert_eq!(instance.ro_flag.as_deref(), Some("RO"));
        assert_eq!(instance.ha_flag.as_deref(), Some("MIRROR"));
        assert_eq!(instance.machine_type.as_deref(), Some("CLOUD_PREMIUM"));
    }

    #[test]
    fn postpaid_order_omits_prepaid_fields() {
        let request = CreateDbInstancesRequest {
            zone: "ap-guangzhou-3".to_string(),
            memory: 2,
            storage: 10,
            instance_charge_type: "POSTPAID".to_string(),
            goods_num: 1,
            db_version: "2008R2".to_string(),
            ha_type: "DUAL".to_string(),
            ..Default::default()
        };
        let encoded = serde_json::to_value(&request).unwrap();
        assert!(encoded.get("Period").is_none());
        assert!(encoded.get("AutoRenewFlag").is_none());
        assert!(encoded.get("VoucherIds").is_none());
        assert_eq!(encoded["DBVersion"], "2008R2");
        assert_eq!(encoded["HAType"], "DUAL");
        assert_eq!(encoded["SecurityGroupList"], serde_json::json!([]));
    }

    #[test]
    fn fresh_order_tolerates_missing_instance_and_flow() {
        let deal: DealInfo = serde_json::from_str(r#"{"DealName": "2020071"}"#).unwrap();
        assert!(deal.instance_id_set.is_empty());
        assert_eq!(deal.flow_id, 0);
    }

    #[test]
    fn instance_list_reads_db_prefixed_key() {
        let raw = r#"{"DBInstances": [{"InstanceId": "mssql-1"}, {"InstanceId": "mssql-2"}]}"#;
        let page: DescribeDbInstancesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(page.db_instances.len(), 2);
        assert_eq!(page.db_instances[1].instance_id, "mssql-2");
    }
}
