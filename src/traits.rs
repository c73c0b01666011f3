use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::schema::{ResourceData, Schema};

/// 托管资源 Trait
///
/// 每个资源类型实现一套 CRUD 处理器。处理器从 [`ResourceData`] 读取期望
/// 配置，把远端观察到的属性写回去；ID 专门走 `set_id`，读操作发现对象
/// 已不存在时清空 ID 而不是报错。
#[async_trait]
pub trait Resource: Send + Sync {
    /// 资源类型名，如 `tencentcloud_cdn_domain`
    fn type_name(&self) -> &'static str;

    /// 属性声明
    fn schema(&self) -> Schema;

    /// 创建远端对象，成功后写入 ID 并回读属性
    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()>;

    /// 回读远端状态
    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()>;

    /// 更新可变参数
    ///
    /// 默认实现拒绝更新，适用于所有参数都 `force_new` 的资源。
    async fn update(&self, _conn: &Connection, _d: &mut ResourceData) -> Result<()> {
        Err(ProviderError::UnsupportedOperation {
            product: self.type_name().to_string(),
            detail: "all arguments force replacement, update is not supported".to_string(),
        })
    }

    /// 删除远端对象
    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()>;

    /// 按 ID 导入已有对象，默认实现直接回读
    async fn import(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        self.read(conn, d).await
    }
}

/// 数据源 Trait
///
/// 只读查询。实现方按过滤属性检索远端对象，把结果写入 computed 属性，
/// 并在配置了 `result_output_file` 时落一份 JSON 快照。
#[async_trait]
pub trait DataSource: Send + Sync {
    /// 数据源类型名，如 `tencentcloud_cdn_domains`
    fn type_name(&self) -> &'static str;

    /// 属性声明
    fn schema(&self) -> Schema;

    /// 执行查询并写入结果
    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AttrMap;

    struct FrozenResource;

    #[async_trait]
    impl Resource for FrozenResource {
        fn type_name(&self) -> &'static str {
            "test_frozen"
        }

        fn schema(&self) -> Schema {
            Schema::default()
        }

        async fn create(&self, _conn: &Connection, d: &mut ResourceData) -> Result<()> {
            d.set_id("frozen-1");
            Ok(())
        }

        async fn read(&self, _conn: &Connection, d: &mut ResourceData) -> Result<()> {
            d.set_id("");
            Ok(())
        }

        async fn delete(&self, _conn: &Connection, _d: &mut ResourceData) -> Result<()> {
            Ok(())
        }
    }

    fn test_conn() -> Connection {
        Connection::builder()
            .secret_id("id")
            .secret_key("key")
            .region("ap-guangzhou")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn default_update_is_rejected() {
        let r = FrozenResource;
        let mut d = ResourceData::from_state("test_frozen", r.schema(), "frozen-1", AttrMap::new());
        let err = r.update(&test_conn(), &mut d).await;
        assert!(matches!(
            err,
            Err(ProviderError::UnsupportedOperation { .. })
        ));
    }

    #[tokio::test]
    async fn default_import_delegates_to_read() {
        let r = FrozenResource;
        let mut d = ResourceData::from_state("test_frozen", r.schema(), "frozen-1", AttrMap::new());
        r.import(&test_conn(), &mut d).await.unwrap();
        assert!(!d.is_present());
    }
}
