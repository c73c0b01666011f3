//! URL 预热任务：`tencentcloud_cdn_url_push`。
//!
//! 预热不是长驻对象，云端只保留任务历史。ID 是任务号，删除只清
//! 本地状态，`redo` 变化触发重推。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::Result;
use crate::retry::{self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation};
use crate::traits::Resource;

use super::service::CdnService;
use super::types::{PushTask, PushUrlsCacheRequest};
use super::PUSH_STATUS_IN_PROGRESS;

pub struct CdnUrlPushResource;

fn push_history_schema() -> Schema {
    Schema::new([
        ("url", FieldSchema::string().computed().desc("Pushed URL.")),
        (
            "status",
            FieldSchema::string()
                .computed()
                .desc("Push status, one of fail, done, process or invalid."),
        ),
        (
            "percent",
            FieldSchema::int().computed().desc("Push progress in percent."),
        ),
        (
            "create_time",
            FieldSchema::string().computed().desc("Push task creation time."),
        ),
        (
            "update_time",
            FieldSchema::string().computed().desc("Push task update time."),
        ),
        (
            "area",
            FieldSchema::string().computed().desc("Acceleration region of the task."),
        ),
    ])
}

#[async_trait]
impl Resource for CdnUrlPushResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_cdn_url_push"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "urls",
                FieldSchema::list(FieldSchema::string())
                    .required()
                    .force_new()
                    .desc("List of URLs to be pushed to the edge."),
            ),
            (
                "redo",
                FieldSchema::int()
                    .optional()
                    .desc("Change this value to push the same URLs again."),
            ),
            (
                "area",
                FieldSchema::string()
                    .optional()
                    .validate(Validation::allowed(&["mainland", "overseas"]))
                    .desc("Region the URLs are pushed to."),
            ),
            (
                "layer",
                FieldSchema::string()
                    .optional()
                    .desc("Push layer, middle pushes to the intermediate layer only."),
            ),
            (
                "parse_m3u8",
                FieldSchema::boolean()
                    .optional()
                    .desc("Whether to recursively push the TS fragments of m3u8 files."),
            ),
            (
                "task_id",
                FieldSchema::string().computed().desc("Push task ID."),
            ),
            (
                "push_history",
                FieldSchema::block_list(push_history_schema())
                    .computed()
                    .desc("Push task records."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = CdnService::new(conn);
        let req = build_push_request(d);
        let task_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service.push_urls(&req).await.map_err(retry_error)
        })
        .await?;
        d.set_id(&task_id);

        wait_until_push_done(&service, &task_id).await?;
        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = CdnService::new(conn);
        let task_id = d.id().to_string();
        let tasks = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_push_tasks(&task_id)
                .await
                .map_err(retry_error)
        })
        .await?;

        d.set("task_id", task_id.clone())?;
        // 历史会过期清空，空结果不等于资源消失，ID 保留
        let history: Vec<AttrMap> = tasks
            .iter()
            .filter(|t| t.task_id.as_deref().is_none_or(|tid| tid == task_id))
            .map(flatten_push_task)
            .collect();
        d.set("push_history", history)?;
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        if d.has_change("redo") {
            let service = CdnService::new(conn);
            let req = build_push_request(d);
            let task_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
                service.push_urls(&req).await.map_err(retry_error)
            })
            .await?;
            d.set_id(&task_id);
            wait_until_push_done(&service, &task_id).await?;
        }
        self.read(conn, d).await
    }

    async fn delete(&self, _conn: &Connection, d: &mut ResourceData) -> Result<()> {
        // 云端任务记录删不掉，只从本地状态摘除
        log::debug!("discarding cdn url push task {} locally", d.id());
        Ok(())
    }
}

/// 等任务列表里不再有 `process` 状态的记录。
async fn wait_until_push_done(service: &CdnService, task_id: &str) -> Result<()> {
    retry::within(READ_RETRY_TIMEOUT * 5, || async {
        let tasks = service
            .describe_push_tasks(task_id)
            .await
            .map_err(retry_error)?;
        if tasks
            .iter()
            .any(|t| t.status.as_deref() == Some(PUSH_STATUS_IN_PROGRESS))
        {
            return Err(Retry::not_ready(
                "cdn",
                format!("push task {task_id} still running"),
            ));
        }
        Ok(())
    })
    .await
}

fn build_push_request(d: &ResourceData) -> PushUrlsCacheRequest {
    PushUrlsCacheRequest {
        urls: d.get_string_list("urls"),
        area: d.get_ok_string("area"),
        layer: d.get_ok_string("layer"),
        // false 也是显式取值，不能按零值剔除
        parse_m3u8: d.get("parse_m3u8").and_then(AttrValue::as_bool),
    }
}

fn flatten_push_task(task: &PushTask) -> AttrMap {
    let mut map = AttrMap::new();
    if let Some(url) = &task.url {
        map.insert("url".to_string(), AttrValue::from(url.clone()));
    }
    if let Some(status) = &task.status {
        map.insert("status".to_string(), AttrValue::from(status.clone()));
    }
    if let Some(percent) = task.percent {
        map.insert("percent".to_string(), AttrValue::from(percent));
    }
    if let Some(create_time) = &task.create_time {
        map.insert("create_time".to_string(), AttrValue::from(create_time.clone()));
    }
    if let Some(update_time) = &task.update_time {
        map.insert("update_time".to_string(), AttrValue::from(update_time.clone()));
    }
    if let Some(area) = &task.area {
        map.insert("area".to_string(), AttrValue::from(area.clone()));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AttrMap {
        let mut config = AttrMap::new();
        config.insert(
            "urls".into(),
            AttrValue::from(vec!["http://www.example.com/1.jpg".to_string()]),
        );
        config
    }

    #[test]
    fn urls_are_required() {
        assert!(
            ResourceData::new(
                "tencentcloud_cdn_url_push",
                CdnUrlPushResource.schema(),
                AttrMap::new()
            )
            .is_err()
        );
    }

    #[test]
    fn area_vocabulary_enforced() {
        let mut config = base_config();
        config.insert("area".into(), "europe".into());
        assert!(
            ResourceData::new(
                "tencentcloud_cdn_url_push",
                CdnUrlPushResource.schema(),
                config
            )
            .is_err()
        );
    }

    #[test]
    fn push_request_carries_optional_fields() {
        let mut config = base_config();
        config.insert("area".into(), "mainland".into());
        config.insert("parse_m3u8".into(), AttrValue::Bool(false));
        let d = ResourceData::new(
            "tencentcloud_cdn_url_push",
            CdnUrlPushResource.schema(),
            config,
        )
        .unwrap();

        let req = build_push_request(&d);
        assert_eq!(req.urls, vec!["http://www.example.com/1.jpg".to_string()]);
        assert_eq!(req.area.as_deref(), Some("mainland"));
        assert!(req.layer.is_none());
        // 显式 false 必须带上
        assert_eq!(req.parse_m3u8, Some(false));
    }

    #[test]
    fn push_task_flattens_progress() {
        let task = PushTask {
            task_id: Some("15234".to_string()),
            url: Some("http://www.example.com/1.jpg".to_string()),
            status: Some("done".to_string()),
            percent: Some(100),
            create_time: Some("2024-05-01 10:00:00".to_string()),
            update_time: None,
            area: Some("mainland".to_string()),
        };
        let map = flatten_push_task(&task);
        assert_eq!(map.get("status"), Some(&AttrValue::from("done")));
        assert_eq!(map.get("percent"), Some(&AttrValue::Int(100)));
        assert!(!map.contains_key("update_time"));
    }
}
