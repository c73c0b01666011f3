//! 事件集列表数据源：`tencentcloud_eb_event_buses`。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::Result;
use crate::retry::{self, READ_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation, block_string,
    data_resource_id_hash, write_result_output,
};
use crate::traits::DataSource;

use super::service::EbService;
use super::types::{EventBusItem, Filter};

pub struct EbEventBusesDataSource;

fn flatten_bus(item: EventBusItem) -> AttrMap {
    let mut m = AttrMap::new();
    m.insert("event_bus_id".to_string(), AttrValue::from(item.event_bus_id));
    m.insert(
        "event_bus_name".to_string(),
        AttrValue::from(item.event_bus_name),
    );
    if let Some(description) = item.description {
        m.insert("description".to_string(), AttrValue::from(description));
    }
    if let Some(add_time) = item.add_time {
        m.insert("add_time".to_string(), AttrValue::from(add_time));
    }
    if let Some(mod_time) = item.mod_time {
        m.insert("mod_time".to_string(), AttrValue::from(mod_time));
    }
    if let Some(bus_type) = item.bus_type {
        m.insert("type".to_string(), AttrValue::from(bus_type));
    }
    if let Some(pay_mode) = item.pay_mode {
        m.insert("pay_mode".to_string(), AttrValue::from(pay_mode));
    }
    m
}

#[async_trait]
impl DataSource for EbEventBusesDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_eb_event_buses"
    }

    fn schema(&self) -> Schema {
        let filters = Schema::new([
            (
                "name",
                FieldSchema::string().required().desc("Filter name."),
            ),
            (
                "values",
                FieldSchema::list(FieldSchema::string())
                    .required()
                    .min_items(1)
                    .desc("Filter values."),
            ),
        ]);
        let bus = Schema::new([
            ("event_bus_id", FieldSchema::string().computed()),
            ("event_bus_name", FieldSchema::string().computed()),
            ("description", FieldSchema::string().computed()),
            ("add_time", FieldSchema::string().computed()),
            ("mod_time", FieldSchema::string().computed()),
            ("type", FieldSchema::string().computed()),
            ("pay_mode", FieldSchema::string().computed()),
        ]);
        Schema::new([
            (
                "order_by",
                FieldSchema::string()
                    .optional()
                    .desc("Sort key, e.g. `AddTime`, `ModTime`."),
            ),
            (
                "order",
                FieldSchema::string()
                    .optional()
                    .validate(Validation::allowed(&["ASC", "DESC"]))
                    .desc("Sort direction."),
            ),
            (
                "filters",
                FieldSchema::block_list(filters)
                    .optional()
                    .desc("Filter conditions."),
            ),
            (
                "result_output_file",
                FieldSchema::string()
                    .optional()
                    .desc("Used to save results."),
            ),
            (
                "event_buses",
                FieldSchema::block_list(bus)
                    .computed()
                    .desc("List of event buses."),
            ),
        ])
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = EbService::new(conn);
        let order_by = d.get_ok_string("order_by");
        let order = d.get_ok_string("order");
        let filters: Option<Vec<Filter>> = {
            let entries: Vec<Filter> = d
                .get_list("filters")
                .iter()
                .filter_map(AttrValue::as_map)
                .map(|entry| Filter {
                    name: block_string(entry, "name").unwrap_or_default(),
                    values: entry
                        .get("values")
                        .and_then(AttrValue::as_string_list)
                        .unwrap_or_default(),
                })
                .collect();
            if entries.is_empty() { None } else { Some(entries) }
        };

        let items = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .list_all_event_buses(order_by.clone(), order.clone(), filters.clone())
                .await
                .map_err(retry_error)
        })
        .await?;

        let ids: Vec<String> = items.iter().map(|b| b.event_bus_id.clone()).collect();
        let event_buses: Vec<AttrMap> = items.into_iter().map(flatten_bus).collect();

        if let Some(path) = d.get_ok_string("result_output_file") {
            write_result_output(&path, &event_buses)?;
        }
        d.set("event_buses", event_buses)?;
        d.set_id(data_resource_id_hash(&ids));
        Ok(())
    }
}
