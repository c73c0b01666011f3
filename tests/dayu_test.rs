//! 大禹（经典版高防）资源验收测试
//!
//! 策略类接口只要账号开通了对应产品线就能调；规则数据源需要一个
//! 现存的高防实例。运行方式:
//! ```bash
//! TENCENTCLOUD_SECRET_ID=xxx TENCENTCLOUD_SECRET_KEY=xxx \
//! TEST_DAYU_RESOURCE_TYPE=bgpip TEST_DAYU_RESOURCE_ID=bgpip-000001 \
//!     cargo test --test dayu_test -- --ignored --nocapture --test-threads=1
//! ```

#![cfg(feature = "dayu")]

mod common;

use common::Lifecycle;
use tencentcloud_provider::{AttrMap, AttrValue, Provider, ResourceData};

fn policy_config(resource_type: &str, name: &str) -> AttrMap {
    let mut drop_options = AttrMap::new();
    drop_options.insert("drop_abroad".to_string(), AttrValue::from(true));
    drop_options.insert("null_conn_enable".to_string(), AttrValue::from(true));
    drop_options.insert("conn_timeout".to_string(), AttrValue::from(300_i64));

    let mut config = AttrMap::new();
    config.insert("resource_type".to_string(), AttrValue::from(resource_type));
    config.insert("name".to_string(), AttrValue::from(name));
    config.insert("drop_options".to_string(), AttrValue::from(drop_options));
    config
}

// ============ DDoS 策略 CRUD ============

#[tokio::test]
#[ignore]
async fn test_dayu_ddos_policy_lifecycle() {
    skip_if_no_credentials!(
        "TENCENTCLOUD_SECRET_ID",
        "TENCENTCLOUD_SECRET_KEY",
        "TEST_DAYU_RESOURCE_TYPE"
    );

    let conn = common::connection().expect("创建连接失败");
    let resource_type =
        std::env::var("TEST_DAYU_RESOURCE_TYPE").expect("TEST_DAYU_RESOURCE_TYPE 已检查");
    let mut flow = Lifecycle::new("tencentcloud_dayu_ddos_policy");
    let handler = flow
        .provider
        .resource("tencentcloud_dayu_ddos_policy")
        .expect("dayu 已启用");

    let name = common::generate_test_name("tst-policy");

    // 1. 创建
    let mut d = flow.create_view(policy_config(&resource_type, &name));
    let created = handler.create(&conn, &mut d).await;
    assert!(created.is_ok(), "create 失败: {created:?}");
    assert!(d.id().contains('#'), "复合 ID 缺分隔符: {}", d.id());
    println!("  ✓ 创建成功: id={}", d.id());
    flow.remember(d);

    // 2. 回读
    let mut d = flow.stored_view();
    let read = handler.read(&conn, &mut d).await;
    assert!(read.is_ok(), "read 失败: {read:?}");
    assert!(d.is_present(), "策略应存在");
    assert_eq!(d.state().get("name"), Some(&AttrValue::from(name.clone())));
    flow.remember(d);

    // 3. 改名
    let renamed = common::generate_test_name("tst-policy-v2");
    let mut d = flow.update_view(policy_config(&resource_type, &renamed));
    let updated = handler.update(&conn, &mut d).await;
    assert!(updated.is_ok(), "update 失败: {updated:?}");
    assert_eq!(d.state().get("name"), Some(&AttrValue::from(renamed)));
    println!("  ✓ 改名成功");
    flow.remember(d);

    // 4. 删除并确认消失
    let mut d = flow.stored_view();
    let deleted = handler.delete(&conn, &mut d).await;
    assert!(deleted.is_ok(), "delete 失败: {deleted:?}");

    let mut d = flow.stored_view();
    let verify = handler.read(&conn, &mut d).await;
    assert!(verify.is_ok(), "删除后 read 失败: {verify:?}");
    assert!(!d.is_present(), "删除后策略不应存在");
    println!("✓ DDoS 策略生命周期测试通过");
}

// ============ 数据源 ============

#[tokio::test]
#[ignore]
async fn test_dayu_l7_rules_data_source() {
    skip_if_no_credentials!(
        "TENCENTCLOUD_SECRET_ID",
        "TENCENTCLOUD_SECRET_KEY",
        "TEST_DAYU_RESOURCE_TYPE",
        "TEST_DAYU_RESOURCE_ID"
    );

    let conn = common::connection().expect("创建连接失败");
    let resource_type =
        std::env::var("TEST_DAYU_RESOURCE_TYPE").expect("TEST_DAYU_RESOURCE_TYPE 已检查");
    let resource_id =
        std::env::var("TEST_DAYU_RESOURCE_ID").expect("TEST_DAYU_RESOURCE_ID 已检查");
    let provider = Provider::new();
    let source = provider
        .data_source("tencentcloud_dayu_l7_rules")
        .expect("dayu 已启用");

    let mut config = AttrMap::new();
    config.insert("resource_type".to_string(), AttrValue::from(resource_type));
    config.insert("resource_id".to_string(), AttrValue::from(resource_id));
    let mut d = ResourceData::new(source.type_name(), source.schema(), config)
        .expect("配置应通过校验");

    let result = source.read(&conn, &mut d).await;
    assert!(result.is_ok(), "read 失败: {result:?}");
    assert!(d.is_present(), "数据源应生成 ID");

    let count = d
        .state()
        .get("list")
        .and_then(AttrValue::as_list)
        .map_or(0, <[AttrValue]>::len);
    println!("✓ 数据源测试通过，共 {count} 条七层规则");
}
