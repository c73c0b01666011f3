//! 记录列表数据源:`tencentcloud_dnspod_records`。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::Result;
use crate::retry::{self, READ_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, data_resource_id_hash,
    write_result_output,
};
use crate::traits::DataSource;

use super::service::DnspodService;
use super::types::RecordItem;

pub struct DnspodRecordsDataSource;

fn flatten_record(item: RecordItem) -> AttrMap {
    let mut m = AttrMap::new();
    m.insert("record_id".to_string(), AttrValue::from(item.record_id));
    m.insert("name".to_string(), AttrValue::from(item.name));
    m.insert("record_type".to_string(), AttrValue::from(item.record_type));
    m.insert("record_line".to_string(), AttrValue::from(item.line));
    m.insert("value".to_string(), AttrValue::from(item.value));
    m.insert("ttl".to_string(), AttrValue::from(item.ttl));
    m.insert("status".to_string(), AttrValue::from(item.status));
    if let Some(mx) = item.mx {
        m.insert("mx".to_string(), AttrValue::from(mx));
    }
    if let Some(weight) = item.weight {
        m.insert("weight".to_string(), AttrValue::from(weight));
    }
    if let Some(updated_on) = item.updated_on {
        m.insert("updated_on".to_string(), AttrValue::from(updated_on));
    }
    if let Some(monitor_status) = item.monitor_status {
        m.insert("monitor_status".to_string(), AttrValue::from(monitor_status));
    }
    m
}

#[async_trait]
impl DataSource for DnspodRecordsDataSource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_dnspod_records"
    }

    fn schema(&self) -> Schema {
        let result = Schema::new([
            ("record_id", FieldSchema::int().computed()),
            ("name", FieldSchema::string().computed()),
            ("record_type", FieldSchema::string().computed()),
            ("record_line", FieldSchema::string().computed()),
            ("value", FieldSchema::string().computed()),
            ("ttl", FieldSchema::int().computed()),
            ("mx", FieldSchema::int().computed()),
            ("weight", FieldSchema::int().computed()),
            ("status", FieldSchema::string().computed()),
            ("updated_on", FieldSchema::string().computed()),
            ("monitor_status", FieldSchema::string().computed()),
        ]);
        Schema::new([
            (
                "domain",
                FieldSchema::string().required().desc("Domain to query."),
            ),
            (
                "sub_domain",
                FieldSchema::string()
                    .optional()
                    .desc("Filter by host record."),
            ),
            (
                "record_type",
                FieldSchema::string()
                    .optional()
                    .desc("Filter by record type."),
            ),
            (
                "keyword",
                FieldSchema::string()
                    .optional()
                    .desc("Keyword matched against host records and values."),
            ),
            (
                "result_output_file",
                FieldSchema::string()
                    .optional()
                    .desc("Used to save results."),
            ),
            (
                "result",
                FieldSchema::block_list(result)
                    .computed()
                    .desc("List of matched records."),
            ),
        ])
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = DnspodService::new(conn);
        let domain = d.get_string("domain");
        let sub_domain = d.get_ok_string("sub_domain");
        let record_type = d.get_ok_string("record_type");
        let keyword = d.get_ok_string("keyword");

        let items = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_all_records(
                    &domain,
                    sub_domain.clone(),
                    record_type.clone(),
                    keyword.clone(),
                )
                .await
                .map_err(retry_error)
        })
        .await?;

        let ids: Vec<String> = items.iter().map(|r| r.record_id.to_string()).collect();
        let result: Vec<AttrMap> = items.into_iter().map(flatten_record).collect();

        if let Some(path) = d.get_ok_string("result_output_file") {
            write_result_output(&path, &result)?;
        }
        d.set("result", result)?;
        d.set_id(data_resource_id_hash(&ids));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_keeps_present_fields_only() {
        let item = RecordItem {
            record_id: 4_094_112,
            name: "www".to_string(),
            record_type: "A".to_string(),
            line: "默认".to_string(),
            value: "1.2.3.4".to_string(),
            ttl: 600,
            mx: None,
            weight: Some(30),
            status: "ENABLE".to_string(),
            updated_on: Some("2024-01-15 12:00:00".to_string()),
            monitor_status: None,
        };
        let m = flatten_record(item);
        assert_eq!(m.get("record_id"), Some(&AttrValue::Int(4_094_112)));
        assert_eq!(m.get("record_line"), Some(&AttrValue::from("默认")));
        assert_eq!(m.get("weight"), Some(&AttrValue::Int(30)));
        assert!(!m.contains_key("mx"));
        assert!(!m.contains_key("monitor_status"));
    }

    #[test]
    fn schema_requires_domain() {
        let err = ResourceData::new(
            "tencentcloud_dnspod_records",
            DnspodRecordsDataSource.schema(),
            AttrMap::new(),
        );
        assert!(err.is_err());
    }
}
