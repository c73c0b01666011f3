//! EventBridge API 请求/响应结构

use serde::{Deserialize, Serialize};

// ============ 事件集 ============

#[derive(Debug, Serialize)]
pub(crate) struct CreateEventBusRequest {
    #[serde(rename = "EventBusName")]
    pub event_bus_name: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "SaveDeadLetter", skip_serializing_if = "Option::is_none")]
    pub save_dead_letter: Option<bool>,
    #[serde(rename = "EnableStore", skip_serializing_if = "Option::is_none")]
    pub enable_store: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateEventBusResponse {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetEventBusRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetEventBusResponse {
    #[serde(rename = "EventBusName", default)]
    pub event_bus_name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "AddTime", default)]
    pub add_time: Option<String>,
    #[serde(rename = "SaveDeadLetter", default)]
    pub save_dead_letter: Option<bool>,
    #[serde(rename = "EnableStore", default)]
    pub enable_store: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateEventBusRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "SaveDeadLetter", skip_serializing_if = "Option::is_none")]
    pub save_dead_letter: Option<bool>,
    #[serde(rename = "EnableStore", skip_serializing_if = "Option::is_none")]
    pub enable_store: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteEventBusRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Filter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Values")]
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListEventBusesRequest {
    #[serde(rename = "OrderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(rename = "Order", skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(rename = "Filters", skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(rename = "Limit")]
    pub limit: i64,
    #[serde(rename = "Offset")]
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListEventBusesResponse {
    #[serde(rename = "EventBuses", default)]
    pub event_buses: Option<Vec<EventBusItem>>,
    #[serde(rename = "TotalCount", default)]
    pub total_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventBusItem {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "EventBusName")]
    pub event_bus_name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "AddTime", default)]
    pub add_time: Option<String>,
    #[serde(rename = "ModTime", default)]
    pub mod_time: Option<String>,
    #[serde(rename = "Type", default)]
    pub bus_type: Option<String>,
    #[serde(rename = "PayMode", default)]
    pub pay_mode: Option<String>,
}

// ============ 事件规则 ============

#[derive(Debug, Serialize)]
pub(crate) struct CreateRuleRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "RuleName")]
    pub rule_name: String,
    /// 事件匹配模式，JSON 字符串
    #[serde(rename = "EventPattern")]
    pub event_pattern: String,
    #[serde(rename = "Enable", skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRuleResponse {
    #[serde(rename = "RuleId")]
    pub rule_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetRuleRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetRuleResponse {
    #[serde(rename = "RuleName", default)]
    pub rule_name: Option<String>,
    #[serde(rename = "EventPattern", default)]
    pub event_pattern: Option<String>,
    #[serde(rename = "Enable", default)]
    pub enable: Option<bool>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "AddTime", default)]
    pub add_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateRuleRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
    #[serde(rename = "RuleName", skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(rename = "EventPattern", skip_serializing_if = "Option::is_none")]
    pub event_pattern: Option<String>,
    #[serde(rename = "Enable", skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteRuleRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
}

// ============ 事件转换器 ============

/// 转换规则，创建与查询共用同一结构。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Transformation {
    #[serde(
        rename = "Extraction",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub extraction: Option<Extraction>,
    #[serde(rename = "EtlFilter", default, skip_serializing_if = "Option::is_none")]
    pub etl_filter: Option<EtlFilter>,
    #[serde(rename = "Transform", default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Extraction {
    #[serde(rename = "ExtractionInputPath")]
    pub extraction_input_path: String,
    /// `TEXT` 或 `JSON`
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(
        rename = "TextParams",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub text_params: Option<TextParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TextParams {
    #[serde(rename = "Separator", default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(rename = "Regex", default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EtlFilter {
    #[serde(rename = "Filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Transform {
    #[serde(rename = "OutputStructs")]
    pub output_structs: Vec<OutputStructParam>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct OutputStructParam {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
    /// `STRING`、`NUMBER`、`BOOLEAN`、`NULL`、`SYS_VARIABLE`、`JSONPATH`
    #[serde(rename = "ValueType")]
    pub value_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateTransformationRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
    #[serde(rename = "Transformations")]
    pub transformations: Vec<Transformation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateTransformationResponse {
    #[serde(rename = "TransformationId")]
    pub transformation_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetTransformationRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
    #[serde(rename = "TransformationId")]
    pub transformation_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetTransformationResponse {
    #[serde(rename = "Transformations", default)]
    pub transformations: Option<Vec<Transformation>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateTransformationRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
    #[serde(rename = "TransformationId")]
    pub transformation_id: String,
    #[serde(rename = "Transformations")]
    pub transformations: Vec<Transformation>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteTransformationRequest {
    #[serde(rename = "EventBusId")]
    pub event_bus_id: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
    #[serde(rename = "TransformationId")]
    pub transformation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_bus_skips_absent_options() {
        let req = CreateEventBusRequest {
            event_bus_name: "tf-bus".to_string(),
            description: None,
            save_dead_letter: None,
            enable_store: Some(false),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["EventBusName"], "tf-bus");
        assert_eq!(json["EnableStore"], false);
        assert!(json.get("Description").is_none());
        assert!(json.get("SaveDeadLetter").is_none());
    }

    #[test]
    fn transformation_serializes_nested_blocks() {
        let t = Transformation {
            extraction: Some(Extraction {
                extraction_input_path: "$".to_string(),
                format: "JSON".to_string(),
                text_params: None,
            }),
            etl_filter: None,
            transform: Some(Transform {
                output_structs: vec![OutputStructParam {
                    key: "type".to_string(),
                    value: "connector:ckafka".to_string(),
                    value_type: "STRING".to_string(),
                }],
            }),
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["Extraction"]["ExtractionInputPath"], "$");
        assert_eq!(json["Transform"]["OutputStructs"][0]["Key"], "type");
        assert!(json.get("EtlFilter").is_none());
    }

    #[test]
    fn get_transformation_parses_wire_payload() {
        let raw = r#"{
            "Transformations": [{
                "Extraction": {"ExtractionInputPath": "$.data", "Format": "TEXT",
                               "TextParams": {"Separator": "|"}},
                "EtlFilter": {"Filter": "{\"source\":\"ckafka.cloud.tencent\"}"}
            }]
        }"#;
        let resp: GetTransformationResponse = serde_json::from_str(raw).unwrap();
        let first = &resp.transformations.unwrap()[0];
        let extraction = first.extraction.as_ref().unwrap();
        assert_eq!(extraction.format, "TEXT");
        assert_eq!(extraction.text_params.as_ref().unwrap().separator.as_deref(), Some("|"));
        assert!(first.transform.is_none());
    }

    #[test]
    fn get_rule_tolerates_missing_fields() {
        let resp: GetRuleResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.rule_name.is_none());
        assert!(resp.enable.is_none());
    }

    #[test]
    fn list_buses_page_parses_total() {
        let raw = r#"{
            "EventBuses": [{"EventBusId": "eb-abc123", "EventBusName": "default"}],
            "TotalCount": 37
        }"#;
        let resp: ListEventBusesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.total_count, Some(37));
        assert_eq!(resp.event_buses.unwrap()[0].event_bus_id, "eb-abc123");
    }
}
