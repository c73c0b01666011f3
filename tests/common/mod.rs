//! 验收测试共用工具
//!
//! 这些测试会直接操作真实的腾讯云资源，全部 `#[ignore]`，凭证通过
//! `TENCENTCLOUD_SECRET_ID` / `TENCENTCLOUD_SECRET_KEY` 环境变量注入，
//! 区域取 `TENCENTCLOUD_REGION`（缺省 ap-guangzhou）。

#![allow(dead_code)]

use std::env;

use tencentcloud_provider::{AttrMap, Connection, Provider, ResourceData};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 从环境变量构造连接
pub fn connection() -> Option<Connection> {
    let secret_id = env::var("TENCENTCLOUD_SECRET_ID").ok()?;
    let secret_key = env::var("TENCENTCLOUD_SECRET_KEY").ok()?;
    let region = env::var("TENCENTCLOUD_REGION").unwrap_or_else(|_| "ap-guangzhou".to_string());
    Connection::builder()
        .secret_id(secret_id)
        .secret_key(secret_key)
        .region(region)
        .build()
        .ok()
}

/// 生成唯一的测试资源名称
pub fn generate_test_name(prefix: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("{prefix}-{}", &uuid.to_string()[..8])
}

/// 生命周期测试的小状态机：记住上一步写回的状态，串起
/// create → read → update → delete 四步。
pub struct Lifecycle {
    pub provider: Provider,
    type_name: &'static str,
    pub id: String,
    pub state: AttrMap,
}

impl Lifecycle {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            provider: Provider::new(),
            type_name,
            id: String::new(),
            state: AttrMap::new(),
        }
    }

    /// 创建视图：校验配置并套默认值。
    pub fn create_view(&self, config: AttrMap) -> ResourceData {
        let handler = self
            .provider
            .resource(self.type_name)
            .expect("资源类型未注册");
        ResourceData::new(self.type_name, handler.schema(), config).expect("配置应通过校验")
    }

    /// 更新视图：以上一步状态为基线做变更检测。
    pub fn update_view(&self, config: AttrMap) -> ResourceData {
        let handler = self
            .provider
            .resource(self.type_name)
            .expect("资源类型未注册");
        ResourceData::with_state(
            self.type_name,
            handler.schema(),
            self.id.clone(),
            self.state.clone(),
            config,
        )
        .expect("配置应通过校验")
    }

    /// 回读/删除视图：直接信任已存的状态。
    pub fn stored_view(&self) -> ResourceData {
        let handler = self
            .provider
            .resource(self.type_name)
            .expect("资源类型未注册");
        ResourceData::from_state(
            self.type_name,
            handler.schema(),
            self.id.clone(),
            self.state.clone(),
        )
    }

    /// 一步完成后把 ID 和状态存下来，供下一步使用。
    pub fn remember(&mut self, d: ResourceData) {
        self.id = d.id().to_string();
        self.state = d.into_state();
    }
}
