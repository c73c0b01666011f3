//! 事件集资源：`tencentcloud_eb_event_bus`，ID 是平台分配的事件集 ID。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{AttrValue, FieldSchema, ResourceData, Schema};
use crate::traits::Resource;

use super::service::EbService;
use super::types::{CreateEventBusRequest, UpdateEventBusRequest};

pub struct EbEventBusResource;

#[async_trait]
impl Resource for EbEventBusResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_eb_event_bus"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "event_bus_name",
                FieldSchema::string().required().desc("Event bus name."),
            ),
            (
                "description",
                FieldSchema::string()
                    .optional()
                    .desc("Event bus description."),
            ),
            (
                "enable_store",
                FieldSchema::boolean()
                    .optional()
                    .desc("Whether the event store is enabled."),
            ),
            (
                "save_dead_letter",
                FieldSchema::boolean()
                    .optional()
                    .desc("Whether dead-letter messages are kept."),
            ),
            (
                "create_time",
                FieldSchema::string()
                    .computed()
                    .desc("Creation time of the event bus."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = EbService::new(conn);
        let req = CreateEventBusRequest {
            event_bus_name: d.get_string("event_bus_name"),
            description: d.get_ok_string("description"),
            // false 也是显式取值，不能按零值剔除
            save_dead_letter: d.get("save_dead_letter").and_then(AttrValue::as_bool),
            enable_store: d.get("enable_store").and_then(AttrValue::as_bool),
        };
        let event_bus_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service.create_event_bus(&req).await.map_err(retry_error)
        })
        .await?;
        d.set_id(event_bus_id);

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = EbService::new(conn);
        let event_bus_id = d.id().to_string();
        let bus = match retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .get_event_bus(&event_bus_id)
                .await
                .map_err(retry_error)
        })
        .await
        {
            Ok(bus) => bus,
            Err(ProviderError::ResourceNotFound { .. }) => {
                log::warn!("[eb] event bus {event_bus_id} not found, clearing state");
                d.set_id("");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if let Some(name) = bus.event_bus_name {
            d.set("event_bus_name", name)?;
        }
        if let Some(description) = bus.description {
            d.set("description", description)?;
        }
        if let Some(enable_store) = bus.enable_store {
            d.set("enable_store", enable_store)?;
        }
        if let Some(save_dead_letter) = bus.save_dead_letter {
            d.set("save_dead_letter", save_dead_letter)?;
        }
        if let Some(add_time) = bus.add_time {
            d.set("create_time", add_time)?;
        }
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        if d.has_change("event_bus_name") {
            return Err(ProviderError::UnsupportedOperation {
                product: self.type_name().to_string(),
                detail: "argument `event_bus_name` cannot be changed".to_string(),
            });
        }

        if d.has_changes(&["description", "enable_store", "save_dead_letter"]) {
            let service = EbService::new(conn);
            let req = UpdateEventBusRequest {
                event_bus_id: d.id().to_string(),
                description: d.get_ok_string("description"),
                save_dead_letter: d.get("save_dead_letter").and_then(AttrValue::as_bool),
                enable_store: d.get("enable_store").and_then(AttrValue::as_bool),
            };
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service.update_event_bus(&req).await.map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = EbService::new(conn);
        let event_bus_id = d.id().to_string();
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            match service.delete_event_bus(&event_bus_id).await {
                Ok(()) | Err(ProviderError::ResourceNotFound { .. }) => Ok(()),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttrMap;

    #[test]
    fn name_is_required() {
        let err = ResourceData::new(
            "tencentcloud_eb_event_bus",
            EbEventBusResource.schema(),
            AttrMap::new(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn create_time_is_read_only() {
        let mut config = AttrMap::new();
        config.insert("event_bus_name".to_string(), AttrValue::from("tf-bus"));
        config.insert("create_time".to_string(), AttrValue::from("2024-01-01"));
        let err = ResourceData::new(
            "tencentcloud_eb_event_bus",
            EbEventBusResource.schema(),
            config,
        );
        assert!(err.is_err());
    }
}
