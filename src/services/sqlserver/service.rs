//! SQL Server 服务层。
//!
//! 购买走订单流水线：CreateDBInstances 只回订单号，`instance_from_deal`
//! 负责把订单号换成实例 ID 并等创建流程结束。变配、换网络也都是异步
//! 动作，对应方法内部各自轮询到位后才返回。

use crate::client::ApiClient;
use crate::connect::Connection;
use crate::error::{ErrorContext, ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error};

use super::types::{
    CreateBasicDbInstancesRequest, CreateBasicDbInstancesResponse, CreateDbInstancesRequest,
    CreateDbInstancesResponse, DbInstance, DeleteDbInstanceRequest, DescribeDbInstancesRequest,
    DescribeDbInstancesResponse, DescribeDbSecurityGroupsRequest, DescribeDbSecurityGroupsResponse,
    DescribeFlowStatusRequest, DescribeFlowStatusResponse, DescribeMaintenanceSpanRequest,
    DescribeMaintenanceSpanResponse, DescribeOrdersRequest, DescribeOrdersResponse,
    InstanceRenewInfo, ModifyDbInstanceNameRequest, ModifyDbInstanceNetworkRequest,
    ModifyDbInstanceNetworkResponse, ModifyDbInstanceProjectRequest,
    ModifyDbInstanceRenewFlagRequest, ModifyMaintenanceSpanRequest, RecycleDbInstanceRequest,
    RecycleDbInstanceResponse, SecurityGroupOpRequest, TerminateDbInstanceRequest,
    UpgradeDbInstanceRequest,
};
use super::{ENDPOINT, FLOW_FAIL, FLOW_RUNNING, FLOW_SUCCESS, INSTANCE_PAGE_SIZE, STATUS_GONE, STATUS_RUNNING};

/// 实例列表的过滤条件，None 表示对应维度不过滤。
#[derive(Debug, Clone, Default)]
pub(crate) struct InstanceFilter {
    pub instance_id: Option<String>,
    pub name: Option<String>,
    pub project_id: Option<i64>,
    pub vpc_id: Option<String>,
    pub subnet_id: Option<String>,
}

pub(crate) struct SqlserverService {
    client: ApiClient,
}

impl SqlserverService {
    pub fn new(conn: &Connection) -> Self {
        Self {
            client: conn.client(ENDPOINT),
        }
    }

    // ============ 购买 ============

    /// 下单购买高可用实例，返回订单号。订单号必须恰好一个，多了说明
    /// 同一单里混进了别的购买，无法归属。
    pub async fn create_instance_order(&self, req: &CreateDbInstancesRequest) -> Result<String> {
        let resp: CreateDbInstancesResponse = self
            .client
            .request("CreateDBInstances", req, ErrorContext::default())
            .await?;
        let mut deals = resp.deal_names;
        if deals.len() != 1 {
            return Err(ProviderError::ParseError {
                product: "sqlserver".to_string(),
                detail: format!("purchase returned {} deal names, expected exactly one", deals.len()),
            });
        }
        Ok(deals.remove(0))
    }

    /// 下单购买基础版实例，返回订单号。
    pub async fn create_basic_instance_order(
        &self,
        req: &CreateBasicDbInstancesRequest,
    ) -> Result<String> {
        let resp: CreateBasicDbInstancesResponse = self
            .client
            .request("CreateBasicDBInstances", req, ErrorContext::default())
            .await?;
        if resp.deal_name.is_empty() {
            return Err(ProviderError::ParseError {
                product: "sqlserver".to_string(),
                detail: "purchase returned an empty deal name".to_string(),
            });
        }
        Ok(resp.deal_name)
    }

    /// 订单号换实例 ID。订单异步落库，实例 ID 和流程 ID 都要等一会儿
    /// 才挂上来，之后再等创建流程本身跑完。
    pub async fn instance_from_deal(&self, deal_name: &str) -> Result<String> {
        let (instance_id, flow_id) = retry::within(READ_RETRY_TIMEOUT * 5, || async {
            let request = DescribeOrdersRequest {
                deal_names: vec![deal_name.to_string()],
            };
            let response: DescribeOrdersResponse = self
                .client
                .request("DescribeOrders", &request, ErrorContext::default())
                .await
                .map_err(retry_error)?;
            let Some(deal) = response.deals.first() else {
                return Err(Retry::not_ready(
                    "sqlserver",
                    format!("order {deal_name} is not visible yet"),
                ));
            };
            let Some(instance_id) = deal.instance_id_set.first().filter(|id| !id.is_empty())
            else {
                return Err(Retry::not_ready(
                    "sqlserver",
                    format!("order {deal_name} has not produced an instance yet"),
                ));
            };
            if deal.flow_id == 0 {
                return Err(Retry::not_ready(
                    "sqlserver",
                    format!("order {deal_name} has not produced a flow yet"),
                ));
            }
            Ok((instance_id.clone(), deal.flow_id))
        })
        .await?;
        self.wait_for_flow(flow_id).await?;
        Ok(instance_id)
    }

    /// 等流程结束：0 成功，1 失败，2 执行中。失败是终态，直接报错。
    pub async fn wait_for_flow(&self, flow_id: i64) -> Result<()> {
        retry::within(WRITE_RETRY_TIMEOUT * 4, || async {
            let request = DescribeFlowStatusRequest { flow_id };
            let response: DescribeFlowStatusResponse = self
                .client
                .request("DescribeFlowStatus", &request, ErrorContext::default())
                .await
                .map_err(Retry::Fatal)?;
            match response.status {
                FLOW_SUCCESS => Ok(()),
                FLOW_FAIL => Err(Retry::Fatal(ProviderError::TaskFailed {
                    product: "sqlserver".to_string(),
                    task_id: flow_id.to_string(),
                    detail: "flow reported failure".to_string(),
                })),
                FLOW_RUNNING => Err(Retry::not_ready(
                    "sqlserver",
                    format!("flow {flow_id} is still running"),
                )),
                other => Err(Retry::Fatal(ProviderError::ParseError {
                    product: "sqlserver".to_string(),
                    detail: format!("flow {flow_id} reported unknown status {other}"),
                })),
            }
        })
        .await
    }

    // ============ 查询 ============

    /// 按条件翻页拉全实例列表。
    pub async fn describe_instances(&self, filter: &InstanceFilter) -> Result<Vec<DbInstance>> {
        let mut instances = Vec::new();
        let mut offset = 0;
        loop {
            let request = DescribeDbInstancesRequest {
                offset,
                limit: INSTANCE_PAGE_SIZE,
                instance_id_set: filter.instance_id.clone().map(|id| vec![id]),
                instance_name_set: filter.name.clone().map(|name| vec![name]),
                project_id: filter.project_id,
                vpc_id: filter.vpc_id.clone(),
                subnet_id: filter.subnet_id.clone(),
            };
            let page: DescribeDbInstancesResponse = self
                .client
                .request("DescribeDBInstances", &request, ErrorContext::default())
                .await?;
            let fetched = page.db_instances.len() as i64;
            instances.extend(page.db_instances);
            if fetched < INSTANCE_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }
        Ok(instances)
    }

    /// 按 ID 查单个实例。隔离中、已回收、已下线的实例一律当不存在，
    /// 让上层走重建而不是对着僵尸实例发变更。
    pub async fn describe_instance_by_id(&self, instance_id: &str) -> Result<Option<DbInstance>> {
        let filter = InstanceFilter {
            instance_id: Some(instance_id.to_string()),
            ..Default::default()
        };
        let mut matched = self.describe_instances(&filter).await?;
        if matched.len() > 1 {
            return Err(ProviderError::ParseError {
                product: "sqlserver".to_string(),
                detail: format!("{} instances share the id {instance_id}", matched.len()),
            });
        }
        Ok(matched
            .pop()
            .filter(|instance| !instance.status.is_some_and(|s| STATUS_GONE.contains(&s))))
    }

    pub async fn describe_security_groups(&self, instance_id: &str) -> Result<Vec<String>> {
        let request = DescribeDbSecurityGroupsRequest {
            instance_id: instance_id.to_string(),
        };
        let response: DescribeDbSecurityGroupsResponse = self
            .client
            .request(
                "DescribeDBSecurityGroups",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(response
            .security_group_set
            .into_iter()
            .map(|item| item.security_group_id)
            .collect())
    }

    pub async fn describe_maintenance_span(
        &self,
        instance_id: &str,
    ) -> Result<DescribeMaintenanceSpanResponse> {
        let request = DescribeMaintenanceSpanRequest {
            instance_id: instance_id.to_string(),
        };
        self.client
            .request(
                "DescribeMaintenanceSpan",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await
    }

    // ============ 变更 ============

    /// 变配并等规格落地。升配异步生效，实例会短暂离开运行态，这里直接
    /// 轮询到规格和目标一致为止，避免盯着状态位猜阶段。
    pub async fn upgrade_instance(&self, req: &UpgradeDbInstanceRequest) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .request(
                "UpgradeDBInstance",
                req,
                ErrorContext::resource(&req.instance_id),
            )
            .await?;
        let instance_id = req.instance_id.clone();
        retry::within(READ_RETRY_TIMEOUT * 10, || async {
            let instance = self
                .describe_instance_by_id(&instance_id)
                .await
                .map_err(retry_error)?
                .ok_or_else(|| {
                    Retry::Fatal(ProviderError::ResourceNotFound {
                        product: "sqlserver".to_string(),
                        resource_id: instance_id.clone(),
                        raw_message: None,
                    })
                })?;
            let resized = instance.status == Some(STATUS_RUNNING)
                && instance.memory == Some(req.memory)
                && instance.storage == Some(req.storage)
                && req.cpu.map_or(true, |cpu| instance.cpu == Some(cpu));
            if !resized {
                return Err(Retry::not_ready(
                    "sqlserver",
                    format!("instance {instance_id} is still resizing"),
                ));
            }
            Ok(())
        })
        .await
    }

    pub async fn modify_instance_name(&self, instance_id: &str, name: &str) -> Result<()> {
        let request = ModifyDbInstanceNameRequest {
            instance_id: instance_id.to_string(),
            instance_name: name.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request(
                "ModifyDBInstanceName",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    pub async fn modify_instance_project(&self, instance_id: &str, project_id: i64) -> Result<()> {
        let request = ModifyDbInstanceProjectRequest {
            instance_id_set: vec![instance_id.to_string()],
            project_id,
        };
        let _: serde_json::Value = self
            .client
            .request(
                "ModifyDBInstanceProject",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    /// 换 VPC/子网，返回流程 ID，流程由调用方决定等不等。
    pub async fn modify_instance_network(
        &self,
        instance_id: &str,
        vpc_id: &str,
        subnet_id: &str,
    ) -> Result<i64> {
        let request = ModifyDbInstanceNetworkRequest {
            instance_id: instance_id.to_string(),
            new_vpc_id: vpc_id.to_string(),
            new_subnet_id: subnet_id.to_string(),
        };
        let response: ModifyDbInstanceNetworkResponse = self
            .client
            .request(
                "ModifyDBInstanceNetwork",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(response.flow_id)
    }

    pub async fn modify_renew_flag(&self, instance_id: &str, renew_flag: i64) -> Result<()> {
        let request = ModifyDbInstanceRenewFlagRequest {
            renew_flags: vec![InstanceRenewInfo {
                instance_id: instance_id.to_string(),
                renew_flag,
            }],
        };
        let _: serde_json::Value = self
            .client
            .request(
                "ModifyDBInstanceRenewFlag",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    pub async fn modify_maintenance_span(&self, req: &ModifyMaintenanceSpanRequest) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .request(
                "ModifyMaintenanceSpan",
                req,
                ErrorContext::resource(&req.instance_id),
            )
            .await?;
        Ok(())
    }

    pub async fn add_security_group(
        &self,
        instance_id: &str,
        security_group_id: &str,
    ) -> Result<()> {
        let request = SecurityGroupOpRequest {
            security_group_id: security_group_id.to_string(),
            instance_id_set: vec![instance_id.to_string()],
        };
        let _: serde_json::Value = self
            .client
            .request(
                "AssociateSecurityGroups",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    pub async fn remove_security_group(
        &self,
        instance_id: &str,
        security_group_id: &str,
    ) -> Result<()> {
        let request = SecurityGroupOpRequest {
            security_group_id: security_group_id.to_string(),
            instance_id_set: vec![instance_id.to_string()],
        };
        let _: serde_json::Value = self
            .client
            .request(
                "DisassociateSecurityGroups",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    // ============ 退还与销毁 ============

    /// 退还实例，转入隔离状态。
    pub async fn terminate_instance(&self, instance_id: &str) -> Result<()> {
        let request = TerminateDbInstanceRequest {
            instance_id_set: vec![instance_id.to_string()],
        };
        let _: serde_json::Value = self
            .client
            .request(
                "TerminateDBInstance",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    /// 销毁隔离中的实例。
    pub async fn delete_instance(&self, instance_id: &str) -> Result<()> {
        let request = DeleteDbInstanceRequest {
            instance_id: instance_id.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request(
                "DeleteDBInstance",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    /// 回收实例。部分计费形态没有这个动作，平台回 InvalidAction，当
    /// 已回收处理即可。
    pub async fn recycle_instance(&self, instance_id: &str) -> Result<()> {
        let request = RecycleDbInstanceRequest {
            instance_id: instance_id.to_string(),
        };
        let response: Result<RecycleDbInstanceResponse> = self
            .client
            .request(
                "RecycleDBInstance",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await;
        match response {
            Ok(recycled) => {
                if recycled.flow_id != 0 {
                    self.wait_for_flow(recycled.flow_id).await?;
                }
                Ok(())
            }
            Err(e) if e.api_code() == Some("InvalidAction") => Ok(()),
            Err(e) => Err(e),
        }
    }
}
