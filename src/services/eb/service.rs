//! EventBridge API 封装：每个方法对应一次单发调用，重试由资源层负责。

use crate::client::ApiClient;
use crate::connect::Connection;
use crate::error::{ErrorContext, Result};

use super::types::{
    CreateEventBusRequest, CreateEventBusResponse, CreateRuleRequest, CreateRuleResponse,
    CreateTransformationRequest, CreateTransformationResponse, DeleteEventBusRequest,
    DeleteRuleRequest, DeleteTransformationRequest, EventBusItem, Filter, GetEventBusRequest,
    GetEventBusResponse, GetRuleRequest, GetRuleResponse, GetTransformationRequest,
    GetTransformationResponse, ListEventBusesRequest, ListEventBusesResponse, Transformation,
    UpdateEventBusRequest, UpdateRuleRequest, UpdateTransformationRequest,
};
use super::{ENDPOINT, LIST_PAGE_SIZE};

pub(crate) struct EbService {
    client: ApiClient,
}

impl EbService {
    pub fn new(conn: &Connection) -> Self {
        Self {
            client: conn.client(ENDPOINT),
        }
    }

    pub async fn create_event_bus(&self, req: &CreateEventBusRequest) -> Result<String> {
        let resp: CreateEventBusResponse = self
            .client
            .request("CreateEventBus", req, ErrorContext::default())
            .await?;
        Ok(resp.event_bus_id)
    }

    pub async fn get_event_bus(&self, event_bus_id: &str) -> Result<GetEventBusResponse> {
        let req = GetEventBusRequest {
            event_bus_id: event_bus_id.to_string(),
        };
        self.client
            .request("GetEventBus", &req, ErrorContext::resource(event_bus_id))
            .await
    }

    pub async fn update_event_bus(&self, req: &UpdateEventBusRequest) -> Result<()> {
        let ctx = ErrorContext::resource(&req.event_bus_id);
        let _: serde_json::Value = self.client.request("UpdateEventBus", req, ctx).await?;
        Ok(())
    }

    pub async fn delete_event_bus(&self, event_bus_id: &str) -> Result<()> {
        let req = DeleteEventBusRequest {
            event_bus_id: event_bus_id.to_string(),
        };
        let _: serde_json::Value = self
            .client
            .request("DeleteEventBus", &req, ErrorContext::resource(event_bus_id))
            .await?;
        Ok(())
    }

    /// 翻页拉取全部事件集。
    pub async fn list_all_event_buses(
        &self,
        order_by: Option<String>,
        order: Option<String>,
        filters: Option<Vec<Filter>>,
    ) -> Result<Vec<EventBusItem>> {
        let mut all = Vec::new();
        let mut offset = 0;
        loop {
            let req = ListEventBusesRequest {
                order_by: order_by.clone(),
                order: order.clone(),
                filters: filters.clone(),
                limit: LIST_PAGE_SIZE,
                offset,
            };
            let page: ListEventBusesResponse = self
                .client
                .request("ListEventBuses", &req, ErrorContext::default())
                .await?;
            let items = page.event_buses.unwrap_or_default();
            if items.is_empty() {
                break;
            }
            let fetched = i64::try_from(items.len()).unwrap_or(i64::MAX);
            all.extend(items);
            offset += fetched;
            // TotalCount 缺失时退化为按整页判断是否还有下一页
            let more = match page.total_count {
                Some(total) => offset < total,
                None => fetched == LIST_PAGE_SIZE,
            };
            if !more {
                break;
            }
        }
        Ok(all)
    }

    pub async fn create_rule(&self, req: &CreateRuleRequest) -> Result<String> {
        let resp: CreateRuleResponse = self
            .client
            .request("CreateRule", req, ErrorContext::default())
            .await?;
        Ok(resp.rule_id)
    }

    pub async fn get_rule(&self, event_bus_id: &str, rule_id: &str) -> Result<GetRuleResponse> {
        let req = GetRuleRequest {
            event_bus_id: event_bus_id.to_string(),
            rule_id: rule_id.to_string(),
        };
        let ctx = ErrorContext::resource(format!("{event_bus_id}#{rule_id}"));
        self.client.request("GetRule", &req, ctx).await
    }

    pub async fn update_rule(&self, req: &UpdateRuleRequest) -> Result<()> {
        let ctx = ErrorContext::resource(format!("{}#{}", req.event_bus_id, req.rule_id));
        let _: serde_json::Value = self.client.request("UpdateRule", req, ctx).await?;
        Ok(())
    }

    pub async fn delete_rule(&self, event_bus_id: &str, rule_id: &str) -> Result<()> {
        let req = DeleteRuleRequest {
            event_bus_id: event_bus_id.to_string(),
            rule_id: rule_id.to_string(),
        };
        let ctx = ErrorContext::resource(format!("{event_bus_id}#{rule_id}"));
        let _: serde_json::Value = self.client.request("DeleteRule", &req, ctx).await?;
        Ok(())
    }

    pub async fn create_transformation(&self, req: &CreateTransformationRequest) -> Result<String> {
        let resp: CreateTransformationResponse = self
            .client
            .request("CreateTransformation", req, ErrorContext::default())
            .await?;
        Ok(resp.transformation_id)
    }

    /// 查询转换器，返回第一条转换规则；平台按 ID 精确匹配，列表为空
    /// 视为不存在。
    pub async fn get_transformation(
        &self,
        event_bus_id: &str,
        rule_id: &str,
        transformation_id: &str,
    ) -> Result<Option<Transformation>> {
        let req = GetTransformationRequest {
            event_bus_id: event_bus_id.to_string(),
            rule_id: rule_id.to_string(),
            transformation_id: transformation_id.to_string(),
        };
        let ctx = ErrorContext::resource(format!(
            "{event_bus_id}#{rule_id}#{transformation_id}"
        ));
        let resp: GetTransformationResponse =
            self.client.request("GetTransformation", &req, ctx).await?;
        Ok(resp.transformations.unwrap_or_default().into_iter().next())
    }

    pub async fn update_transformation(&self, req: &UpdateTransformationRequest) -> Result<()> {
        let ctx = ErrorContext::resource(format!(
            "{}#{}#{}",
            req.event_bus_id, req.rule_id, req.transformation_id
        ));
        let _: serde_json::Value = self.client.request("UpdateTransformation", req, ctx).await?;
        Ok(())
    }

    pub async fn delete_transformation(
        &self,
        event_bus_id: &str,
        rule_id: &str,
        transformation_id: &str,
    ) -> Result<()> {
        let req = DeleteTransformationRequest {
            event_bus_id: event_bus_id.to_string(),
            rule_id: rule_id.to_string(),
            transformation_id: transformation_id.to_string(),
        };
        let ctx = ErrorContext::resource(format!(
            "{event_bus_id}#{rule_id}#{transformation_id}"
        ));
        let _: serde_json::Value = self
            .client
            .request("DeleteTransformation", &req, ctx)
            .await?;
        Ok(())
    }
}
