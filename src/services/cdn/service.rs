//! CDN API 封装：每个方法对应一次单发调用，重试由资源层负责。

use crate::client::ApiClient;
use crate::connect::Connection;
use crate::error::{ErrorContext, Result};

use super::ENDPOINT;
use super::types::{
    AddCdnDomainRequest, DescribeDomainsConfigRequest, DescribeDomainsConfigResponse,
    DescribeDomainsRequest, DescribeDomainsResponse, DescribePushTasksRequest,
    DescribePushTasksResponse, DetailDomain, DomainActionRequest, DomainFilter, PushTask,
    PushUrlsCacheRequest, PushUrlsCacheResponse, UpdateDomainConfigRequest,
};

pub(crate) struct CdnService {
    client: ApiClient,
}

impl CdnService {
    pub fn new(conn: &Connection) -> Self {
        Self {
            client: conn.client(ENDPOINT),
        }
    }

    pub async fn add_domain(&self, req: &AddCdnDomainRequest) -> Result<()> {
        let ctx = ErrorContext::resource(&req.domain);
        let _: serde_json::Value = self.client.request("AddCdnDomain", req, ctx).await?;
        Ok(())
    }

    pub async fn update_domain_config(&self, req: &UpdateDomainConfigRequest) -> Result<()> {
        let ctx = ErrorContext::resource(&req.domain);
        let _: serde_json::Value = self.client.request("UpdateDomainConfig", req, ctx).await?;
        Ok(())
    }

    /// 按域名精确查询完整配置；域名未接入时返回 `None`。
    pub async fn describe_domain_config(&self, domain: &str) -> Result<Option<DetailDomain>> {
        let req = DescribeDomainsConfigRequest {
            offset: None,
            limit: None,
            filters: Some(vec![DomainFilter {
                name: "domain".to_string(),
                value: vec![domain.to_string()],
                fuzzy: None,
            }]),
        };
        let resp: DescribeDomainsConfigResponse = self
            .client
            .request("DescribeDomainsConfig", &req, ErrorContext::resource(domain))
            .await?;
        Ok(resp.domains.unwrap_or_default().into_iter().next())
    }

    /// 按过滤条件列出接入域名，返回单页域名列表。
    pub async fn list_domains(
        &self,
        filters: Option<Vec<DomainFilter>>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<String>> {
        let req = DescribeDomainsRequest {
            offset: Some(offset),
            limit: Some(limit),
            filters,
        };
        let resp: DescribeDomainsResponse = self
            .client
            .request("DescribeDomains", &req, ErrorContext::default())
            .await?;
        log::debug!(
            "DescribeDomains matched {} domain(s) in total",
            resp.total_number.unwrap_or_default()
        );
        Ok(resp
            .domains
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| d.domain)
            .collect())
    }

    /// 停用加速域名，删除前 `online` 状态的域名要先下线。
    pub async fn stop_domain(&self, domain: &str) -> Result<()> {
        let req = DomainActionRequest {
            domain: domain.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request("StopCdnDomain", &req, ErrorContext::resource(domain))
            .await?;
        Ok(())
    }

    pub async fn delete_domain(&self, domain: &str) -> Result<()> {
        let req = DomainActionRequest {
            domain: domain.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request("DeleteCdnDomain", &req, ErrorContext::resource(domain))
            .await?;
        Ok(())
    }

    /// 提交 URL 预热任务，返回任务 ID。
    pub async fn push_urls(&self, req: &PushUrlsCacheRequest) -> Result<String> {
        let resp: PushUrlsCacheResponse = self
            .client
            .request("PushUrlsCache", req, ErrorContext::default())
            .await?;
        Ok(resp.task_id)
    }

    /// 查询一个预热任务的全部 URL 记录。
    pub async fn describe_push_tasks(&self, task_id: &str) -> Result<Vec<PushTask>> {
        let req = DescribePushTasksRequest {
            task_id: task_id.to_string(),
            offset: None,
            limit: None,
        };
        let resp: DescribePushTasksResponse = self
            .client
            .request("DescribePushTasks", &req, ErrorContext::resource(task_id))
            .await?;
        Ok(resp.push_logs.unwrap_or_default())
    }
}
