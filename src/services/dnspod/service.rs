//! `DNSPod` API 封装：每个方法对应一次单发调用，重试由资源层负责。

use crate::client::ApiClient;
use crate::connect::Connection;
use crate::error::{ErrorContext, ProviderError, Result};

use super::types::{
    CreateDomainRequest, CreateRecordRequest, CreateRecordResponse, DeleteRecordRequest,
    DescribeDomainRequest, DescribeDomainResponse, DescribeRecordListRequest,
    DescribeRecordRequest, DescribeRecordResponse, DomainInfo, ModifyDomainRemarkRequest,
    ModifyDomainStatusRequest, ModifyRecordRequest, ModifyRecordStatusRequest, RecordInfo,
    RecordItem,
};
use super::{ENDPOINT, MAX_PAGE_SIZE};

pub(crate) struct DnspodService {
    client: ApiClient,
}

impl DnspodService {
    pub fn new(conn: &Connection) -> Self {
        Self {
            client: conn.client(ENDPOINT),
        }
    }

    pub async fn create_domain(&self, req: &CreateDomainRequest) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .request("CreateDomain", req, ErrorContext::default())
            .await?;
        Ok(())
    }

    pub async fn describe_domain(&self, domain: &str) -> Result<DomainInfo> {
        let req = DescribeDomainRequest {
            domain: domain.to_string(),
        };
        let resp: DescribeDomainResponse = self
            .client
            .request("DescribeDomain", &req, ErrorContext::resource(domain))
            .await?;
        Ok(resp.domain_info)
    }

    /// `status` 取 `enable` 或 `disable`
    pub async fn modify_domain_status(&self, domain: &str, status: &str) -> Result<()> {
        let req = ModifyDomainStatusRequest {
            domain: domain.to_string(),
            status: status.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request("ModifyDomainStatus", &req, ErrorContext::resource(domain))
            .await?;
        Ok(())
    }

    pub async fn modify_domain_remark(&self, domain: &str, remark: &str) -> Result<()> {
        let req = ModifyDomainRemarkRequest {
            domain: domain.to_string(),
            remark: remark.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request("ModifyDomainRemark", &req, ErrorContext::resource(domain))
            .await?;
        Ok(())
    }

    pub async fn delete_domain(&self, domain: &str) -> Result<()> {
        let req = DescribeDomainRequest {
            domain: domain.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request("DeleteDomain", &req, ErrorContext::resource(domain))
            .await?;
        Ok(())
    }

    pub async fn create_record(&self, req: &CreateRecordRequest) -> Result<i64> {
        let resp: CreateRecordResponse = self
            .client
            .request("CreateRecord", req, ErrorContext::default())
            .await?;
        Ok(resp.record_id)
    }

    pub async fn describe_record(&self, domain: &str, record_id: i64) -> Result<RecordInfo> {
        let req = DescribeRecordRequest {
            domain: domain.to_string(),
            record_id,
        };
        let ctx = ErrorContext::resource(format!("{domain}#{record_id}"));
        let resp: DescribeRecordResponse =
            self.client.request("DescribeRecord", &req, ctx).await?;
        Ok(resp.record_info)
    }

    pub async fn modify_record(&self, req: &ModifyRecordRequest) -> Result<()> {
        let ctx = ErrorContext::resource(format!("{}#{}", req.domain, req.record_id));
        let _: serde_json::Value = self.client.request("ModifyRecord", req, ctx).await?;
        Ok(())
    }

    /// `status` 取 `ENABLE` 或 `DISABLE`
    pub async fn modify_record_status(
        &self,
        domain: &str,
        record_id: i64,
        status: &str,
    ) -> Result<()> {
        let req = ModifyRecordStatusRequest {
            domain: domain.to_string(),
            record_id,
            status: status.to_string(),
        };
        let ctx = ErrorContext::resource(format!("{domain}#{record_id}"));
        let _: serde_json::Value = self.client.request("ModifyRecordStatus", &req, ctx).await?;
        Ok(())
    }

    pub async fn delete_record(&self, domain: &str, record_id: i64) -> Result<()> {
        let req = DeleteRecordRequest {
            domain: domain.to_string(),
            record_id,
        };
        let ctx = ErrorContext::resource(format!("{domain}#{record_id}"));
        let _: serde_json::Value = self.client.request("DeleteRecord", &req, ctx).await?;
        Ok(())
    }

    /// 翻页拉取全部匹配记录；平台在无记录时返回 `ResourceNotFound.*`，
    /// 读作空列表。
    pub async fn describe_all_records(
        &self,
        domain: &str,
        sub_domain: Option<String>,
        record_type: Option<String>,
        keyword: Option<String>,
    ) -> Result<Vec<RecordItem>> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let req = DescribeRecordListRequest {
                domain: domain.to_string(),
                sub_domain: sub_domain.clone(),
                record_type: record_type.clone(),
                keyword: keyword.clone(),
                offset,
                limit: MAX_PAGE_SIZE,
            };
            let page: super::types::RecordListResponse = match self
                .client
                .request("DescribeRecordList", &req, ErrorContext::resource(domain))
                .await
            {
                Ok(page) => page,
                Err(ProviderError::ResourceNotFound { .. }) => break,
                Err(e) => return Err(e),
            };
            let items = page.record_list.unwrap_or_default();
            if items.is_empty() {
                break;
            }
            let fetched = i64::try_from(items.len()).unwrap_or(i64::MAX);
            all.extend(items);
            offset += fetched;
            // TotalCount 缺失时退化为按整页判断是否还有下一页
            let more = match page.record_count_info.and_then(|c| c.total_count) {
                Some(total) => offset < total,
                None => fetched == MAX_PAGE_SIZE,
            };
            if !more {
                break;
            }
        }
        Ok(all)
    }
}
