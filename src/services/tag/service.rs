//! 标签服务封装与 qcs 资源名、标签差量工具。

use std::collections::BTreeMap;

use crate::client::ApiClient;
use crate::connect::Connection;
use crate::error::{ErrorContext, Result};

use super::types::{
    DescribeResourceTagsRequest, DescribeResourceTagsResponse, ModifyResourceTagsRequest,
    ResourceTag, TagKeyObject, TagPair,
};
use super::{ENDPOINT, TAG_PAGE_SIZE};

/// 标签系统里的资源名，`qcs::<产品>:<地域>:uin/:<前缀>/<ID>`。
///
/// COS 的属主段是 `uid`，其余产品是 `uin`。
pub(crate) fn build_tag_resource_name(service: &str, prefix: &str, region: &str, id: &str) -> String {
    let owner = if service == "cos" { "uid" } else { "uin" };
    format!("qcs::{service}:{region}:{owner}/:{prefix}/{id}")
}

/// 新旧标签集的差量。
///
/// 替换集是整个新集合（平台按键覆盖），删除集是旧有新无的键。
pub(crate) fn diff_tags(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> (BTreeMap<String, String>, Vec<String>) {
    let replace = new.clone();
    let delete = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .cloned()
        .collect();
    (replace, delete)
}

pub(crate) struct TagService {
    client: ApiClient,
}

impl TagService {
    pub fn new(conn: &Connection) -> Self {
        Self {
            client: conn.client(ENDPOINT),
        }
    }

    /// 替换与删除一批标签，两组都为空时不发请求。
    pub async fn modify_tags(
        &self,
        resource_name: &str,
        replace: &BTreeMap<String, String>,
        delete_keys: &[String],
    ) -> Result<()> {
        if replace.is_empty() && delete_keys.is_empty() {
            return Ok(());
        }
        let req = ModifyResourceTagsRequest {
            resource: resource_name.to_string(),
            replace_tags: (!replace.is_empty()).then(|| {
                replace
                    .iter()
                    .map(|(k, v)| TagPair {
                        tag_key: k.clone(),
                        tag_value: v.clone(),
                    })
                    .collect()
            }),
            delete_tags: (!delete_keys.is_empty()).then(|| {
                delete_keys
                    .iter()
                    .map(|k| TagKeyObject { tag_key: k.clone() })
                    .collect()
            }),
        };
        let _: serde_json::Value = self
            .client
            .request(
                "ModifyResourceTags",
                &req,
                ErrorContext::resource(resource_name),
            )
            .await?;
        Ok(())
    }

    /// 查询一个资源当前挂的标签，翻页拉全。
    pub async fn describe_resource_tags(
        &self,
        service_type: &str,
        resource_prefix: &str,
        resource_id: &str,
    ) -> Result<BTreeMap<String, String>> {
        let mut tags = BTreeMap::new();
        let mut offset = 0;
        loop {
            let req = DescribeResourceTagsRequest {
                service_type: service_type.to_string(),
                resource_prefix: resource_prefix.to_string(),
                resource_ids: vec![resource_id.to_string()],
                resource_region: self.client.region().to_string(),
                offset,
                limit: TAG_PAGE_SIZE,
            };
            let page: DescribeResourceTagsResponse = self
                .client
                .request(
                    "DescribeResourceTagsByResourceIds",
                    &req,
                    ErrorContext::resource(resource_id),
                )
                .await?;
            let items = page.tags.unwrap_or_default();
            let fetched = i64::try_from(items.len()).unwrap_or(i64::MAX);
            collect_tags(&mut tags, items, resource_id);
            if fetched < TAG_PAGE_SIZE {
                break;
            }
            offset += TAG_PAGE_SIZE;
        }
        Ok(tags)
    }
}

/// 响应按 ID 再过滤一遍，接口偶尔混回同前缀其他资源的标签。
fn collect_tags(tags: &mut BTreeMap<String, String>, items: Vec<ResourceTag>, resource_id: &str) {
    for item in items {
        if item
            .resource_id
            .as_deref()
            .is_none_or(|id| id == resource_id)
        {
            tags.insert(item.tag_key, item.tag_value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn resource_name_uses_uin_owner() {
        assert_eq!(
            build_tag_resource_name("cdn", "domain", "", "www.example.com"),
            "qcs::cdn::uin/:domain/www.example.com"
        );
        assert_eq!(
            build_tag_resource_name("mongodb", "instance", "ap-guangzhou", "cmgo-1"),
            "qcs::mongodb:ap-guangzhou:uin/:instance/cmgo-1"
        );
    }

    #[test]
    fn cos_resource_name_uses_uid_owner() {
        assert_eq!(
            build_tag_resource_name("cos", "", "ap-guangzhou", "bucket-125"),
            "qcs::cos:ap-guangzhou:uid/:/bucket-125"
        );
    }

    #[test]
    fn diff_replaces_all_new_and_deletes_removed() {
        let old = tag_map(&[("env", "dev"), ("team", "infra")]);
        let new = tag_map(&[("env", "prod"), ("owner", "ops")]);
        let (replace, delete) = diff_tags(&old, &new);
        assert_eq!(replace, new);
        assert_eq!(delete, vec!["team".to_string()]);
    }

    #[test]
    fn diff_of_identical_sets_deletes_nothing() {
        let tags = tag_map(&[("env", "prod")]);
        let (replace, delete) = diff_tags(&tags, &tags);
        assert_eq!(replace, tags);
        assert!(delete.is_empty());
    }

    #[test]
    fn collect_skips_other_resources() {
        let mut tags = BTreeMap::new();
        let items = vec![
            ResourceTag {
                tag_key: "env".to_string(),
                tag_value: "prod".to_string(),
                resource_id: Some("www.example.com".to_string()),
            },
            ResourceTag {
                tag_key: "team".to_string(),
                tag_value: "cdn".to_string(),
                resource_id: Some("other.example.com".to_string()),
            },
            ResourceTag {
                tag_key: "untagged".to_string(),
                tag_value: "yes".to_string(),
                resource_id: None,
            },
        ];
        collect_tags(&mut tags, items, "www.example.com");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("env").map(String::as_str), Some("prod"));
        assert!(!tags.contains_key("team"));
    }
}
