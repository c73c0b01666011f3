//! 解析记录资源：`tencentcloud_dnspod_record`，ID 形如 `example.com#123`。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrValue, FieldSchema, ResourceData, Schema, Validation, build_composite_id,
    split_composite_id,
};
use crate::traits::Resource;

use super::service::DnspodService;
use super::types::{CreateRecordRequest, ModifyRecordRequest};

pub struct DnspodRecordResource;

/// 拆出 `domain#record_id`，第二段必须是数字。
fn parse_record_id(type_name: &str, id: &str) -> Result<(String, i64)> {
    let mut parts =
        split_composite_id(id, 2).map_err(|e| ProviderError::from_schema(type_name, e))?;
    let record_part = parts.pop().unwrap_or_default();
    let domain = parts.pop().unwrap_or_default();
    let record_id = record_part
        .parse()
        .map_err(|_| ProviderError::InvalidParameter {
            product: type_name.to_string(),
            param: "id".to_string(),
            detail: format!("record ID `{record_part}` is not numeric"),
        })?;
    Ok((domain, record_id))
}

#[async_trait]
impl Resource for DnspodRecordResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_dnspod_record"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "domain",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("Domain the record belongs to."),
            ),
            (
                "record_type",
                FieldSchema::string()
                    .required()
                    .desc("Record type, e.g. `A`, `CNAME`, `MX`, `TXT`."),
            ),
            (
                "record_line",
                FieldSchema::string()
                    .optional()
                    .default_value("默认")
                    .desc("Resolution line, defaults to the universal line."),
            ),
            (
                "value",
                FieldSchema::string().required().desc("Record value."),
            ),
            (
                "sub_domain",
                FieldSchema::string()
                    .optional()
                    .default_value("@")
                    .desc("Host record, defaults to `@`."),
            ),
            (
                "mx",
                FieldSchema::int()
                    .optional()
                    .validate(Validation::int_range(1, 20))
                    .desc("MX priority, required when `record_type` is `MX`."),
            ),
            (
                "ttl",
                FieldSchema::int()
                    .optional()
                    .default_value(600_i64)
                    .validate(Validation::int_range(1, 604_800))
                    .desc("TTL of the record in seconds."),
            ),
            (
                "weight",
                FieldSchema::int()
                    .optional()
                    .validate(Validation::int_range(0, 100))
                    .desc("Traffic weight, only for lines that support weighting."),
            ),
            (
                "status",
                FieldSchema::string()
                    .optional()
                    .default_value("ENABLE")
                    .validate(Validation::allowed(&["ENABLE", "DISABLE"]))
                    .desc("Record status. Valid values: `ENABLE`, `DISABLE`."),
            ),
            (
                "monitor_status",
                FieldSchema::string()
                    .computed()
                    .desc("D-monitor status of the record."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let domain = d.get_string("domain");
        if d.get_string("record_type") == "MX" && d.get_ok_int("mx").is_none() {
            return Err(ProviderError::InvalidParameter {
                product: self.type_name().to_string(),
                param: "mx".to_string(),
                detail: "`mx` is required when `record_type` is `MX`".to_string(),
            });
        }

        let req = CreateRecordRequest {
            domain: domain.clone(),
            sub_domain: Some(d.get_string("sub_domain")),
            record_type: d.get_string("record_type"),
            record_line: d.get_string("record_line"),
            value: d.get_string("value"),
            mx: d.get_ok_int("mx"),
            ttl: d.get_ok_int("ttl"),
            // 权重 0 是合法取值，不能按零值剔除
            weight: d.get("weight").and_then(AttrValue::as_int),
            status: Some(d.get_string("status")),
        };

        let service = DnspodService::new(conn);
        let record_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service.create_record(&req).await.map_err(retry_error)
        })
        .await?;
        d.set_id(build_composite_id(&[&domain, &record_id.to_string()]));

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let (domain, record_id) = parse_record_id(self.type_name(), d.id())?;
        let service = DnspodService::new(conn);
        let info = match retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_record(&domain, record_id)
                .await
                .map_err(retry_error)
        })
        .await
        {
            Ok(info) => info,
            Err(ProviderError::ResourceNotFound { .. }) => {
                d.set_id("");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        d.set("domain", domain)?;
        d.set("sub_domain", info.sub_domain)?;
        d.set("record_type", info.record_type)?;
        d.set("record_line", info.record_line)?;
        d.set("value", info.value)?;
        d.set("ttl", info.ttl)?;
        // 非 MX 记录平台回 0
        if let Some(mx) = info.mx
            && mx > 0
        {
            d.set("mx", mx)?;
        }
        if let Some(weight) = info.weight {
            d.set("weight", weight)?;
        }
        d.set(
            "status",
            if info.enabled == 1 { "ENABLE" } else { "DISABLE" },
        )?;
        if let Some(monitor_status) = info.monitor_status {
            d.set("monitor_status", monitor_status)?;
        }
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let (domain, record_id) = parse_record_id(self.type_name(), d.id())?;
        let service = DnspodService::new(conn);

        // 记录内容类变更必须整条重发；只动状态时走轻量接口
        if d.has_changes(&[
            "sub_domain",
            "record_type",
            "record_line",
            "value",
            "mx",
            "ttl",
            "weight",
        ]) {
            let req = ModifyRecordRequest {
                domain: domain.clone(),
                record_id,
                sub_domain: Some(d.get_string("sub_domain")),
                record_type: d.get_string("record_type"),
                record_line: d.get_string("record_line"),
                value: d.get_string("value"),
                mx: d.get_ok_int("mx"),
                ttl: d.get_ok_int("ttl"),
                weight: d.get("weight").and_then(AttrValue::as_int),
                status: Some(d.get_string("status")),
            };
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service.modify_record(&req).await.map_err(retry_error)
            })
            .await?;
        } else if d.has_change("status") {
            let status = d.get_string("status");
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_record_status(&domain, record_id, &status)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let (domain, record_id) = parse_record_id(self.type_name(), d.id())?;
        let service = DnspodService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            match service.delete_record(&domain, record_id).await {
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

    fn base_config() -> AttrMap {
        let mut config = AttrMap::new();
        config.insert("domain".to_string(), AttrValue::from("example.com"));
        config.insert("record_type".to_string(), AttrValue::from("A"));
        config.insert("value".to_string(), AttrValue::from("1.2.3.4"));
        config
    }

    #[test]
    fn defaults_fill_line_host_ttl_status() {
        let d = ResourceData::new(
            "tencentcloud_dnspod_record",
            DnspodRecordResource.schema(),
            base_config(),
        )
        .unwrap();
        assert_eq!(d.get_string("record_line"), "默认");
        assert_eq!(d.get_string("sub_domain"), "@");
        assert_eq!(d.get_int("ttl"), 600);
        assert_eq!(d.get_string("status"), "ENABLE");
    }

    #[test]
    fn ttl_range_is_enforced() {
        let mut config = base_config();
        config.insert("ttl".to_string(), AttrValue::from(0_i64));
        let err = ResourceData::new(
            "tencentcloud_dnspod_record",
            DnspodRecordResource.schema(),
            config,
        );
        assert!(err.is_err());
    }

    #[test]
    fn weight_above_hundred_is_rejected() {
        let mut config = base_config();
        config.insert("weight".to_string(), AttrValue::from(101_i64));
        let err = ResourceData::new(
            "tencentcloud_dnspod_record",
            DnspodRecordResource.schema(),
            config,
        );
        assert!(err.is_err());
    }

    #[test]
    fn parse_record_id_splits_domain_and_number() {
        let (domain, record_id) =
            parse_record_id("tencentcloud_dnspod_record", "example.com#4094112").unwrap();
        assert_eq!(domain, "example.com");
        assert_eq!(record_id, 4_094_112);
    }

    #[test]
    fn parse_record_id_rejects_non_numeric() {
        let err = parse_record_id("tencentcloud_dnspod_record", "example.com#abc");
        assert!(matches!(
            err,
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "id"
        ));
    }

    #[test]
    fn parse_record_id_rejects_missing_separator() {
        let err = parse_record_id("tencentcloud_dnspod_record", "example.com");
        assert!(err.is_err());
    }
}
