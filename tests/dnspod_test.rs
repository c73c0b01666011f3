//! DNSPod 资源验收测试
//!
//! 运行方式:
//! ```bash
//! TENCENTCLOUD_SECRET_ID=xxx TENCENTCLOUD_SECRET_KEY=xxx TEST_DOMAIN=example.com \
//!     cargo test --test dnspod_test -- --ignored --nocapture --test-threads=1
//! ```

#![cfg(feature = "dnspod")]

mod common;

use common::Lifecycle;
use tencentcloud_provider::{AttrMap, AttrValue, Provider, ResourceData};

fn record_config(domain: &str, sub_domain: &str, value: &str) -> AttrMap {
    let mut config = AttrMap::new();
    config.insert("domain".to_string(), AttrValue::from(domain));
    config.insert("sub_domain".to_string(), AttrValue::from(sub_domain));
    config.insert("record_type".to_string(), AttrValue::from("TXT"));
    config.insert("value".to_string(), AttrValue::from(value));
    config
}

// ============ 记录 CRUD ============

#[tokio::test]
#[ignore]
async fn test_dnspod_record_lifecycle() {
    skip_if_no_credentials!(
        "TENCENTCLOUD_SECRET_ID",
        "TENCENTCLOUD_SECRET_KEY",
        "TEST_DOMAIN"
    );

    let conn = common::connection().expect("创建连接失败");
    let domain = std::env::var("TEST_DOMAIN").expect("TEST_DOMAIN 已检查");
    let mut flow = Lifecycle::new("tencentcloud_dnspod_record");
    let handler = flow
        .provider
        .resource("tencentcloud_dnspod_record")
        .expect("dnspod 已启用");

    let sub_domain = common::generate_test_name("_test");

    // 1. 创建
    let mut d = flow.create_view(record_config(&domain, &sub_domain, "acceptance-1"));
    let created = handler.create(&conn, &mut d).await;
    assert!(created.is_ok(), "create 失败: {created:?}");
    assert!(d.id().contains('#'), "复合 ID 缺分隔符: {}", d.id());
    println!("  ✓ 创建成功: id={}", d.id());
    flow.remember(d);

    // 2. 回读
    let mut d = flow.stored_view();
    let read = handler.read(&conn, &mut d).await;
    assert!(read.is_ok(), "read 失败: {read:?}");
    assert!(d.is_present(), "记录应存在");
    println!("  ✓ 回读成功");
    flow.remember(d);

    // 3. 更新记录值
    let mut d = flow.update_view(record_config(&domain, &sub_domain, "acceptance-2"));
    let updated = handler.update(&conn, &mut d).await;
    assert!(updated.is_ok(), "update 失败: {updated:?}");
    assert_eq!(
        d.state().get("value"),
        Some(&AttrValue::from("acceptance-2")),
        "更新后应回读到新值"
    );
    println!("  ✓ 更新成功");
    flow.remember(d);

    // 4. 删除并确认消失
    let mut d = flow.stored_view();
    let deleted = handler.delete(&conn, &mut d).await;
    assert!(deleted.is_ok(), "delete 失败: {deleted:?}");

    let mut d = flow.stored_view();
    let verify = handler.read(&conn, &mut d).await;
    assert!(verify.is_ok(), "删除后 read 失败: {verify:?}");
    assert!(!d.is_present(), "删除后记录不应存在");
    println!("✓ 记录生命周期测试通过");
}

// ============ 数据源 ============

#[tokio::test]
#[ignore]
async fn test_dnspod_records_data_source() {
    skip_if_no_credentials!(
        "TENCENTCLOUD_SECRET_ID",
        "TENCENTCLOUD_SECRET_KEY",
        "TEST_DOMAIN"
    );

    let conn = common::connection().expect("创建连接失败");
    let domain = std::env::var("TEST_DOMAIN").expect("TEST_DOMAIN 已检查");
    let provider = Provider::new();
    let source = provider
        .data_source("tencentcloud_dnspod_records")
        .expect("dnspod 已启用");

    let mut config = AttrMap::new();
    config.insert("domain".to_string(), AttrValue::from(domain));
    let mut d = ResourceData::new(source.type_name(), source.schema(), config)
        .expect("配置应通过校验");

    let result = source.read(&conn, &mut d).await;
    assert!(result.is_ok(), "read 失败: {result:?}");
    assert!(d.is_present(), "数据源应生成 ID");

    let count = d
        .state()
        .get("result")
        .and_then(AttrValue::as_list)
        .map_or(0, <[AttrValue]>::len);
    println!("✓ 数据源测试通过，共 {count} 条记录");
}

// ============ 清理 ============

/// 清理所有残留的测试记录（手动运行）
#[tokio::test]
#[ignore]
async fn test_dnspod_cleanup_test_records() {
    skip_if_no_credentials!(
        "TENCENTCLOUD_SECRET_ID",
        "TENCENTCLOUD_SECRET_KEY",
        "TEST_DOMAIN"
    );

    let conn = common::connection().expect("创建连接失败");
    let domain = std::env::var("TEST_DOMAIN").expect("TEST_DOMAIN 已检查");
    let provider = Provider::new();
    let source = provider
        .data_source("tencentcloud_dnspod_records")
        .expect("dnspod 已启用");
    let handler = provider
        .resource("tencentcloud_dnspod_record")
        .expect("dnspod 已启用");

    let mut config = AttrMap::new();
    config.insert("domain".to_string(), AttrValue::from(domain.clone()));
    config.insert("keyword".to_string(), AttrValue::from("_test-"));
    let mut d = ResourceData::new(source.type_name(), source.schema(), config)
        .expect("配置应通过校验");
    let listed = source.read(&conn, &mut d).await;
    assert!(listed.is_ok(), "list 失败: {listed:?}");

    let mut removed = 0;
    if let Some(records) = d.state().get("result").and_then(AttrValue::as_list) {
        for record in records {
            let Some(map) = record.as_map() else { continue };
            let name = map
                .get("name")
                .and_then(AttrValue::as_str)
                .unwrap_or_default();
            let id = map
                .get("record_id")
                .and_then(AttrValue::as_int)
                .unwrap_or_default();
            if !name.starts_with("_test-") || id == 0 {
                continue;
            }
            let mut view = ResourceData::from_state(
                handler.type_name(),
                handler.schema(),
                format!("{domain}#{id}"),
                AttrMap::new(),
            );
            if handler.delete(&conn, &mut view).await.is_ok() {
                removed += 1;
                println!("  ⚠ 清理残留记录: {name} ({id})");
            }
        }
    }
    println!("✓ 清理完成，共 {removed} 条");
}
