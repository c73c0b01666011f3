//! MongoDB 服务层。
//!
//! 购买直接回实例 ID，不走订单换实例那套。按 ID 查询内建了过渡态等待：
//! 实例在初始化（0）或流程中（1）时反复重查，出了过渡态才把结果交给
//! 上层，已隔离（-2）当不存在。

use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::ApiClient;
use crate::connect::Connection;
use crate::error::{ErrorContext, ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error};

use super::types::{
    AssignProjectRequest, CreateInstanceRequest, CreateInstanceResponse,
    DescribeAsyncRequestInfoRequest, DescribeAsyncRequestInfoResponse,
    DescribeInstancesRequest, DescribeInstancesResponse, DescribeNodePropertyRequest,
    DescribeNodePropertyResponse, DescribeSecurityGroupRequest, DescribeSecurityGroupResponse,
    InstanceChargePrepaid, InstanceDetail, IsolateInstanceRequest, ModifyInstanceSpecRequest,
    ModifySecurityGroupsRequest, OfflineIsolatedInstanceRequest, RenameInstanceRequest,
    RenewInstancesRequest, ReplicateSetInfo, ResetPasswordRequest, ResetPasswordResponse,
    TerminateInstancesRequest,
};
use super::{
    ENDPOINT, INSTANCE_PAGE_SIZE, STATUS_INITIAL, STATUS_ISOLATED, STATUS_PROCESSING,
    TASK_FAILED, TASK_SUCCESS, renew_flag_param,
};

pub(crate) struct MongodbService {
    client: ApiClient,
}

impl MongodbService {
    pub fn new(conn: &Connection) -> Self {
        Self {
            client: conn.client(ENDPOINT),
        }
    }

    // ============ 购买 ============

    pub async fn create_postpaid_instance(&self, req: &CreateInstanceRequest) -> Result<String> {
        self.place_order("CreateDBInstanceHour", req).await
    }

    pub async fn create_prepaid_instance(&self, req: &CreateInstanceRequest) -> Result<String> {
        self.place_order("CreateDBInstance", req).await
    }

    async fn place_order(
        &self,
        action: &'static str,
        req: &CreateInstanceRequest,
    ) -> Result<String> {
        let resp: CreateInstanceResponse = self
            .client
            .request(action, req, ErrorContext::default())
            .await?;
        let mut ids = resp.instance_ids;
        if ids.is_empty() {
            return Err(ProviderError::ParseError {
                product: "mongodb".to_string(),
                detail: "purchase returned no instance id".to_string(),
            });
        }
        Ok(ids.remove(0))
    }

    // ============ 查询 ============

    /// 按 ID 查实例，等到实例走出初始化/流程中再返回。已隔离的实例当
    /// 不存在，让上层走重建而不是对着它发变更。
    pub async fn describe_instance_by_id(
        &self,
        instance_id: &str,
    ) -> Result<Option<InstanceDetail>> {
        retry::within(READ_RETRY_TIMEOUT * 20, || async {
            let request = DescribeInstancesRequest {
                instance_ids: Some(vec![instance_id.to_string()]),
                cluster_type: None,
                offset: 0,
                limit: INSTANCE_PAGE_SIZE,
            };
            let response: DescribeInstancesResponse = self
                .client
                .request(
                    "DescribeDBInstances",
                    &request,
                    ErrorContext::resource(instance_id),
                )
                .await
                .map_err(Retry::Fatal)?;
            let mut details = response.instance_details;
            let Some(detail) = details.pop() else {
                return Ok(None);
            };
            match detail.status {
                Some(STATUS_INITIAL | STATUS_PROCESSING) => Err(Retry::not_ready(
                    "mongodb",
                    format!("instance {instance_id} is still initializing"),
                )),
                Some(STATUS_ISOLATED) => Ok(None),
                _ => Ok(Some(detail)),
            }
        })
        .await
    }

    /// 按过滤条件翻页拉实例列表，给数据源用。
    pub async fn describe_instances(
        &self,
        instance_id: Option<&str>,
        cluster_type: Option<i64>,
    ) -> Result<Vec<InstanceDetail>> {
        let mut instances = Vec::new();
        let mut offset = 0;
        loop {
            let request = DescribeInstancesRequest {
                instance_ids: instance_id.map(|id| vec![id.to_string()]),
                cluster_type,
                offset,
                limit: INSTANCE_PAGE_SIZE,
            };
            let page: DescribeInstancesResponse = self
                .client
                .request("DescribeDBInstances", &request, ErrorContext::default())
                .await?;
            let fetched = page.instance_details.len() as i64;
            instances.extend(page.instance_details);
            if fetched < INSTANCE_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }
        Ok(instances)
    }

    pub async fn describe_security_groups(&self, instance_id: &str) -> Result<Vec<String>> {
        let request = DescribeSecurityGroupRequest {
            instance_id: instance_id.to_string(),
        };
        let response: DescribeSecurityGroupResponse = self
            .client
            .request(
                "DescribeSecurityGroup",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(response
            .groups
            .into_iter()
            .map(|group| group.security_group_id)
            .collect())
    }

    /// 节点分布。跨可用区实例从这里拿每个节点落在哪个可用区。
    pub async fn describe_node_property(&self, instance_id: &str) -> Result<Vec<ReplicateSetInfo>> {
        let request = DescribeNodePropertyRequest {
            instance_id: instance_id.to_string(),
        };
        let response: DescribeNodePropertyResponse = self
            .client
            .request(
                "DescribeDBInstanceNodeProperty",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(response.replicate_sets)
    }

    // ============ 变更 ============

    /// 变配。受理窗口夹在两类报错之间：先回 InvalidTradeOperation 说明
    /// 单子还没建好要重试，之后转报 StatusAbnormal 说明单子其实已经
    /// 收下并开始执行，按成功处理。规格什么时候真正落地由调用方回读。
    pub async fn upgrade_instance(&self, instance_id: &str, memory: i64, volume: i64) -> Result<()> {
        let request = ModifyInstanceSpecRequest {
            instance_id: instance_id.to_string(),
            memory,
            volume,
        };
        let trade_accepted = AtomicBool::new(false);
        retry::within(WRITE_RETRY_TIMEOUT * 6, || async {
            let response: Result<serde_json::Value> = self
                .client
                .request(
                    "ModifyDBInstanceSpec",
                    &request,
                    ErrorContext::resource(instance_id),
                )
                .await;
            match response {
                Ok(_) => Ok(()),
                Err(e) if e.api_code() == Some("InvalidParameterValue.InvalidTradeOperation") => {
                    trade_accepted.store(true, Ordering::Relaxed);
                    Err(Retry::Retryable(e))
                }
                Err(e)
                    if e.api_code() == Some("InvalidParameterValue.StatusAbnormal")
                        && trade_accepted.load(Ordering::Relaxed) =>
                {
                    Ok(())
                }
                Err(e) => Err(Retry::Fatal(e)),
            }
        })
        .await
    }

    pub async fn modify_instance_name(&self, instance_id: &str, name: &str) -> Result<()> {
        let request = RenameInstanceRequest {
            instance_id: instance_id.to_string(),
            new_name: name.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request(
                "RenameInstance",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    pub async fn modify_instance_project(&self, instance_id: &str, project_id: i64) -> Result<()> {
        let request = AssignProjectRequest {
            instance_ids: vec![instance_id.to_string()],
            project_id,
        };
        let _: serde_json::Value = self
            .client
            .request(
                "AssignProject",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    /// 重置密码。提交后平台回异步任务号，等任务收口才算改完。
    pub async fn reset_instance_password(
        &self,
        instance_id: &str,
        account: &str,
        password: &str,
    ) -> Result<()> {
        let request = ResetPasswordRequest {
            instance_id: instance_id.to_string(),
            user_name: account.to_string(),
            password: password.to_string(),
        };
        let response = retry::within(WRITE_RETRY_TIMEOUT, || async {
            let resp: ResetPasswordResponse = self
                .client
                .request(
                    "ResetDBInstancePassword",
                    &request,
                    ErrorContext::resource(instance_id),
                )
                .await
                .map_err(retry_error)?;
            Ok(resp)
        })
        .await?;
        if !response.async_request_id.is_empty() {
            self.wait_for_async_task(&response.async_request_id).await?;
        }
        Ok(())
    }

    /// 等异步任务收口。失败是终态，其余状态继续等。
    pub async fn wait_for_async_task(&self, async_request_id: &str) -> Result<()> {
        retry::within(READ_RETRY_TIMEOUT * 3, || async {
            let request = DescribeAsyncRequestInfoRequest {
                async_request_id: async_request_id.to_string(),
            };
            let response: DescribeAsyncRequestInfoResponse = self
                .client
                .request("DescribeAsyncRequestInfo", &request, ErrorContext::default())
                .await
                .map_err(retry_error)?;
            match response.status.as_str() {
                TASK_SUCCESS => Ok(()),
                TASK_FAILED => Err(Retry::Fatal(ProviderError::TaskFailed {
                    product: "mongodb".to_string(),
                    task_id: async_request_id.to_string(),
                    detail: "async task reported failure".to_string(),
                })),
                other => Err(Retry::not_ready(
                    "mongodb",
                    format!("async task {async_request_id} is {other}"),
                )),
            }
        })
        .await
    }

    /// 整组替换实例绑定的安全组。
    pub async fn modify_security_groups(
        &self,
        instance_id: &str,
        security_group_ids: Vec<String>,
    ) -> Result<()> {
        let request = ModifySecurityGroupsRequest {
            instance_id: instance_id.to_string(),
            security_group_ids,
        };
        let _: serde_json::Value = self
            .client
            .request(
                "ModifyDBInstanceSecurityGroup",
                &request,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    pub async fn modify_auto_renew_flag(
        &self,
        instance_id: &str,
        period: i64,
        renew_flag: i64,
    ) -> Result<()> {
        let request = RenewInstancesRequest {
            instance_ids: vec![instance_id.to_string()],
            instance_charge_prepaid: InstanceChargePrepaid {
                period,
                renew_flag: renew_flag_param(renew_flag).to_string(),
            },
        };
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            let _: serde_json::Value = self
                .client
                .request(
                    "RenewDBInstances",
                    &request,
                    ErrorContext::resource(instance_id),
                )
                .await
                .map_err(retry_error)?;
            Ok(())
        })
        .await
    }

    // ============ 退还与下线 ============

    /// 隔离按量实例。实例可能还压着别的流程，多给几轮重试。
    pub async fn isolate_instance(&self, instance_id: &str) -> Result<()> {
        let request = IsolateInstanceRequest {
            instance_id: instance_id.to_string(),
        };
        retry::within(WRITE_RETRY_TIMEOUT * 10, || async {
            let _: serde_json::Value = self
                .client
                .request(
                    "IsolateDBInstance",
                    &request,
                    ErrorContext::resource(instance_id),
                )
                .await
                .map_err(retry_error)?;
            Ok(())
        })
        .await
    }

    /// 退还包年包月实例。
    pub async fn terminate_instance(&self, instance_id: &str) -> Result<()> {
        let request = TerminateInstancesRequest {
            instance_id: instance_id.to_string(),
        };
        retry::within(WRITE_RETRY_TIMEOUT * 10, || async {
            let _: serde_json::Value = self
                .client
                .request(
                    "TerminateDBInstances",
                    &request,
                    ErrorContext::resource(instance_id),
                )
                .await
                .map_err(retry_error)?;
            Ok(())
        })
        .await
    }

    /// 下线已隔离的实例，并等它从列表里彻底消失。
    pub async fn offline_isolated_instance(&self, instance_id: &str) -> Result<()> {
        let request = OfflineIsolatedInstanceRequest {
            instance_id: instance_id.to_string(),
        };
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            let _: serde_json::Value = self
                .client
                .request(
                    "OfflineIsolatedDBInstance",
                    &request,
                    ErrorContext::resource(instance_id),
                )
                .await
                .map_err(retry_error)?;
            Ok(())
        })
        .await?;

        retry::within(READ_RETRY_TIMEOUT * 20, || async {
            let check = DescribeInstancesRequest {
                instance_ids: Some(vec![instance_id.to_string()]),
                cluster_type: None,
                offset: 0,
                limit: INSTANCE_PAGE_SIZE,
            };
            let response: DescribeInstancesResponse = self
                .client
                .request(
                    "DescribeDBInstances",
                    &check,
                    ErrorContext::resource(instance_id),
                )
                .await
                .map_err(Retry::Fatal)?;
            if response.instance_details.is_empty() {
                Ok(())
            } else {
                Err(Retry::not_ready(
                    "mongodb",
                    format!("instance {instance_id} is still being taken offline"),
                ))
            }
        })
        .await
    }
}
