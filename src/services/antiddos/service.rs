//! Antiddos API 封装：单发调用，重试由资源层负责。

use crate::client::ApiClient;
use crate::connect::Connection;
use crate::error::{ErrorContext, Result};

use super::types::{
    CreatePacketFilterConfigRequest, DeletePacketFilterConfigRequest,
    DescribeListPacketFilterConfigRequest, DescribeListPacketFilterConfigResponse,
    PacketFilterConfig, PacketFilterRelation,
};
use super::{CONFIG_PAGE_SIZE, ENDPOINT};

pub(crate) struct AntiddosService {
    client: ApiClient,
}

impl AntiddosService {
    pub fn new(conn: &Connection) -> Self {
        Self {
            client: conn.client(ENDPOINT),
        }
    }

    pub async fn create_packet_filter_config(
        &self,
        instance_id: &str,
        config: PacketFilterConfig,
    ) -> Result<()> {
        let req = CreatePacketFilterConfigRequest {
            instance_id: instance_id.to_string(),
            packet_filter_config: config,
        };
        let _: serde_json::Value = self
            .client
            .request(
                "CreatePacketFilterConfig",
                &req,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }

    /// 翻页拉取实例下的全部特征过滤规则。
    pub async fn list_packet_filter_configs(
        &self,
        instance_id: &str,
    ) -> Result<Vec<PacketFilterRelation>> {
        let mut configs: Vec<PacketFilterRelation> = Vec::new();
        let mut offset = 0;
        loop {
            let req = DescribeListPacketFilterConfigRequest {
                offset,
                limit: CONFIG_PAGE_SIZE,
                filter_instance_id: instance_id.to_string(),
            };
            let page: DescribeListPacketFilterConfigResponse = self
                .client
                .request(
                    "DescribeListPacketFilterConfig",
                    &req,
                    ErrorContext::resource(instance_id),
                )
                .await?;
            let fetched = i64::try_from(page.config_list.len()).unwrap_or(i64::MAX);
            configs.extend(page.config_list);
            if fetched < CONFIG_PAGE_SIZE
                || i64::try_from(configs.len()).unwrap_or(i64::MAX) >= page.total
            {
                break;
            }
            offset += CONFIG_PAGE_SIZE;
        }
        Ok(configs)
    }

    /// 删除要回传整条配置，平台按内容定位。
    pub async fn delete_packet_filter_config(
        &self,
        instance_id: &str,
        config: PacketFilterConfig,
    ) -> Result<()> {
        let req = DeletePacketFilterConfigRequest {
            instance_id: instance_id.to_string(),
            packet_filter_config: config,
        };
        let _: serde_json::Value = self
            .client
            .request(
                "DeletePacketFilterConfig",
                &req,
                ErrorContext::resource(instance_id),
            )
            .await?;
        Ok(())
    }
}
