//! 标签 API 线上结构体

use serde::{Deserialize, Serialize};

// ============ ModifyResourceTags ============

#[derive(Debug, Serialize)]
pub(crate) struct TagPair {
    #[serde(rename = "TagKey")]
    pub tag_key: String,
    #[serde(rename = "TagValue")]
    pub tag_value: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TagKeyObject {
    #[serde(rename = "TagKey")]
    pub tag_key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifyResourceTagsRequest {
    #[serde(rename = "Resource")]
    pub resource: String,
    #[serde(rename = "ReplaceTags", skip_serializing_if = "Option::is_none")]
    pub replace_tags: Option<Vec<TagPair>>,
    #[serde(rename = "DeleteTags", skip_serializing_if = "Option::is_none")]
    pub delete_tags: Option<Vec<TagKeyObject>>,
}

// ============ DescribeResourceTagsByResourceIds ============

#[derive(Debug, Serialize)]
pub(crate) struct DescribeResourceTagsRequest {
    #[serde(rename = "ServiceType")]
    pub service_type: String,
    #[serde(rename = "ResourcePrefix")]
    pub resource_prefix: String,
    #[serde(rename = "ResourceIds")]
    pub resource_ids: Vec<String>,
    #[serde(rename = "ResourceRegion")]
    pub resource_region: String,
    #[serde(rename = "Offset")]
    pub offset: i64,
    #[serde(rename = "Limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeResourceTagsResponse {
    #[serde(rename = "Tags", default)]
    pub tags: Option<Vec<ResourceTag>>,
    #[serde(rename = "TotalCount", default)]
    pub total_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceTag {
    #[serde(rename = "TagKey")]
    pub tag_key: String,
    #[serde(rename = "TagValue")]
    pub tag_value: String,
    #[serde(rename = "ResourceId", default)]
    pub resource_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_request_skips_absent_groups() {
        let req = ModifyResourceTagsRequest {
            resource: "qcs::cdn:ap-guangzhou:uin/:domain/www.example.com".to_string(),
            replace_tags: Some(vec![TagPair {
                tag_key: "env".to_string(),
                tag_value: "prod".to_string(),
            }]),
            delete_tags: None,
        };
        let payload = serde_json::to_value(&req).unwrap();
        assert_eq!(payload["ReplaceTags"][0]["TagKey"], "env");
        assert!(payload.get("DeleteTags").is_none());
    }

    #[test]
    fn describe_response_parses_wire_payload() {
        let raw = r#"{
            "TotalCount": 1,
            "Tags": [
                {"TagKey": "env", "TagValue": "prod", "ResourceId": "www.example.com"}
            ]
        }"#;
        let resp: DescribeResourceTagsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.total_count, Some(1));
        let tags = resp.tags.unwrap();
        assert_eq!(tags[0].tag_key, "env");
        assert_eq!(tags[0].resource_id.as_deref(), Some("www.example.com"));
    }
}
