//! 事件转换器资源：`tencentcloud_eb_event_transform`，
//! ID 形如 `eb-xxx#rule-xxx#tfm-xxx`。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation, block_string,
    build_composite_id, first_block, split_composite_id,
};
use crate::traits::Resource;

use super::service::EbService;
use super::types::{
    CreateTransformationRequest, EtlFilter, Extraction, OutputStructParam, TextParams, Transform,
    Transformation, UpdateTransformationRequest,
};

pub struct EbEventTransformResource;

/// 把 `transformations` 块拼成线上结构。
fn build_transformation(entry: &AttrMap) -> Transformation {
    let extraction = first_block(entry, "extraction").map(|m| Extraction {
        extraction_input_path: block_string(m, "extraction_input_path").unwrap_or_default(),
        format: block_string(m, "format").unwrap_or_default(),
        text_params: first_block(m, "text_params").map(|tp| TextParams {
            separator: block_string(tp, "separator"),
            regex: block_string(tp, "regex"),
        }),
    });
    let etl_filter = first_block(entry, "etl_filter").map(|m| EtlFilter {
        filter: block_string(m, "filter").unwrap_or_default(),
    });
    let transform = first_block(entry, "transform").map(|m| Transform {
        output_structs: m
            .get("output_structs")
            .and_then(AttrValue::as_list)
            .map(|items| {
                items
                    .iter()
                    .filter_map(AttrValue::as_map)
                    .map(|s| OutputStructParam {
                        key: block_string(s, "key").unwrap_or_default(),
                        value: block_string(s, "value").unwrap_or_default(),
                        value_type: block_string(s, "value_type").unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    });
    Transformation {
        extraction,
        etl_filter,
        transform,
    }
}

/// 把查询到的转换规则摊回嵌套块。
fn flatten_transformation(t: Transformation) -> AttrMap {
    let mut entry = AttrMap::new();
    if let Some(extraction) = t.extraction {
        let mut m = AttrMap::new();
        m.insert(
            "extraction_input_path".to_string(),
            AttrValue::from(extraction.extraction_input_path),
        );
        m.insert("format".to_string(), AttrValue::from(extraction.format));
        if let Some(tp) = extraction.text_params {
            let mut tpm = AttrMap::new();
            if let Some(separator) = tp.separator {
                tpm.insert("separator".to_string(), AttrValue::from(separator));
            }
            if let Some(regex) = tp.regex {
                tpm.insert("regex".to_string(), AttrValue::from(regex));
            }
            m.insert("text_params".to_string(), AttrValue::from(vec![tpm]));
        }
        entry.insert("extraction".to_string(), AttrValue::from(vec![m]));
    }
    if let Some(etl_filter) = t.etl_filter {
        let mut m = AttrMap::new();
        m.insert("filter".to_string(), AttrValue::from(etl_filter.filter));
        entry.insert("etl_filter".to_string(), AttrValue::from(vec![m]));
    }
    if let Some(transform) = t.transform {
        let structs: Vec<AttrMap> = transform
            .output_structs
            .into_iter()
            .map(|s| {
                let mut m = AttrMap::new();
                m.insert("key".to_string(), AttrValue::from(s.key));
                m.insert("value".to_string(), AttrValue::from(s.value));
                m.insert("value_type".to_string(), AttrValue::from(s.value_type));
                m
            })
            .collect();
        let mut m = AttrMap::new();
        m.insert("output_structs".to_string(), AttrValue::from(structs));
        entry.insert("transform".to_string(), AttrValue::from(vec![m]));
    }
    entry
}

#[async_trait]
impl Resource for EbEventTransformResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_eb_event_transform"
    }

    fn schema(&self) -> Schema {
        let text_params = Schema::new([
            (
                "separator",
                FieldSchema::string()
                    .optional()
                    .desc("Separator for TEXT payloads, a single character."),
            ),
            (
                "regex",
                FieldSchema::string()
                    .optional()
                    .desc("Extraction regular expression, up to 128 characters."),
            ),
        ]);
        let extraction = Schema::new([
            (
                "extraction_input_path",
                FieldSchema::string()
                    .required()
                    .desc("JSONPath of the data to extract, `$` for the whole event."),
            ),
            (
                "format",
                FieldSchema::string()
                    .required()
                    .validate(Validation::allowed(&["TEXT", "JSON"]))
                    .desc("Payload format. Valid values: `TEXT`, `JSON`."),
            ),
            (
                "text_params",
                FieldSchema::block(text_params)
                    .optional()
                    .desc("Extra parameters, only for TEXT payloads."),
            ),
        ]);
        let etl_filter = Schema::new([(
            "filter",
            FieldSchema::string()
                .required()
                .desc("Filter expression, same grammar as the rule event pattern."),
        )]);
        let output_structs = Schema::new([
            (
                "key",
                FieldSchema::string()
                    .required()
                    .desc("Key in the output JSON."),
            ),
            (
                "value",
                FieldSchema::string()
                    .required()
                    .desc("JSONPath, constant or built-in keyword."),
            ),
            (
                "value_type",
                FieldSchema::string()
                    .required()
                    .validate(Validation::allowed(&[
                        "STRING",
                        "NUMBER",
                        "BOOLEAN",
                        "NULL",
                        "SYS_VARIABLE",
                        "JSONPATH",
                    ]))
                    .desc("Data type of the value."),
            ),
        ]);
        let transform = Schema::new([(
            "output_structs",
            FieldSchema::block_list(output_structs)
                .required()
                .min_items(1)
                .desc("How each output field is produced."),
        )]);
        let transformations = Schema::new([
            (
                "extraction",
                FieldSchema::block(extraction)
                    .optional()
                    .desc("How data is extracted from the event."),
            ),
            (
                "etl_filter",
                FieldSchema::block(etl_filter)
                    .optional()
                    .desc("How events are filtered."),
            ),
            (
                "transform",
                FieldSchema::block(transform)
                    .optional()
                    .desc("How data is converted."),
            ),
        ]);
        Schema::new([
            (
                "event_bus_id",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("Event bus the transformation belongs to."),
            ),
            (
                "rule_id",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("Rule the transformation is attached to."),
            ),
            (
                "transformations",
                FieldSchema::block_list(transformations)
                    .required()
                    .min_items(1)
                    .max_items(1)
                    .desc("Transformation rules, currently exactly one."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let event_bus_id = d.get_string("event_bus_id");
        let rule_id = d.get_string("rule_id");
        let transformation = d
            .get_block("transformations")
            .map(build_transformation)
            .ok_or_else(|| ProviderError::InvalidParameter {
                product: self.type_name().to_string(),
                param: "transformations".to_string(),
                detail: "block is required".to_string(),
            })?;

        let req = CreateTransformationRequest {
            event_bus_id: event_bus_id.clone(),
            rule_id: rule_id.clone(),
            transformations: vec![transformation],
        };
        let service = EbService::new(conn);
        let transformation_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .create_transformation(&req)
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set_id(build_composite_id(&[
            &event_bus_id,
            &rule_id,
            &transformation_id,
        ]));

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 3)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (event_bus_id, rule_id, transformation_id) =
            (parts[0].clone(), parts[1].clone(), parts[2].clone());

        let service = EbService::new(conn);
        let found = match retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .get_transformation(&event_bus_id, &rule_id, &transformation_id)
                .await
                .map_err(retry_error)
        })
        .await
        {
            Ok(found) => found,
            Err(ProviderError::ResourceNotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        let Some(transformation) = found else {
            log::warn!("[eb] transformation {transformation_id} not found, clearing state");
            d.set_id("");
            return Ok(());
        };

        d.set("event_bus_id", event_bus_id)?;
        d.set("rule_id", rule_id)?;
        d.set(
            "transformations",
            vec![flatten_transformation(transformation)],
        )?;
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        for arg in ["event_bus_id", "rule_id"] {
            if d.has_change(arg) {
                return Err(ProviderError::UnsupportedOperation {
                    product: self.type_name().to_string(),
                    detail: format!("argument `{arg}` cannot be changed"),
                });
            }
        }
        let parts = split_composite_id(d.id(), 3)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (event_bus_id, rule_id, transformation_id) =
            (parts[0].clone(), parts[1].clone(), parts[2].clone());

        if d.has_change("transformations") {
            let transformation = d
                .get_block("transformations")
                .map(build_transformation)
                .ok_or_else(|| ProviderError::InvalidParameter {
                    product: self.type_name().to_string(),
                    param: "transformations".to_string(),
                    detail: "block is required".to_string(),
                })?;
            let req = UpdateTransformationRequest {
                event_bus_id,
                rule_id,
                transformation_id,
                transformations: vec![transformation],
            };
            let service = EbService::new(conn);
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .update_transformation(&req)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 3)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (event_bus_id, rule_id, transformation_id) =
            (parts[0].clone(), parts[1].clone(), parts[2].clone());

        let service = EbService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            match service
                .delete_transformation(&event_bus_id, &rule_id, &transformation_id)
                .await
            {
                Ok(()) | Err(ProviderError::ResourceNotFound { .. }) => Ok(()),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await
    }
}
