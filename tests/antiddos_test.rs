//! 新版 Anti-DDoS 资源验收测试
//!
//! 特征过滤规则挂在现存的高防实例上，需要通过环境变量指定实例。
//! 运行方式:
//! ```bash
//! TENCENTCLOUD_SECRET_ID=xxx TENCENTCLOUD_SECRET_KEY=xxx \
//! TEST_ANTIDDOS_INSTANCE_ID=bgp-00000001 \
//!     cargo test --test antiddos_test -- --ignored --nocapture --test-threads=1
//! ```

#![cfg(feature = "antiddos")]

mod common;

use common::Lifecycle;
use tencentcloud_provider::{AttrMap, AttrValue};

fn filter_config(instance_id: &str) -> AttrMap {
    let mut filter = AttrMap::new();
    filter.insert("protocol".to_string(), AttrValue::from("tcp"));
    filter.insert("sport_start".to_string(), AttrValue::from(8000_i64));
    filter.insert("sport_end".to_string(), AttrValue::from(8003_i64));
    filter.insert("dport_start".to_string(), AttrValue::from(8080_i64));
    filter.insert("dport_end".to_string(), AttrValue::from(8090_i64));
    filter.insert("pktlen_min".to_string(), AttrValue::from(30_i64));
    filter.insert("pktlen_max".to_string(), AttrValue::from(1400_i64));
    filter.insert("action".to_string(), AttrValue::from("drop"));

    let mut config = AttrMap::new();
    config.insert("instance_id".to_string(), AttrValue::from(instance_id));
    config.insert("packet_filter_config".to_string(), AttrValue::from(filter));
    config
}

// ============ 特征过滤规则 ============

#[tokio::test]
#[ignore]
async fn test_antiddos_packet_filter_config_lifecycle() {
    skip_if_no_credentials!(
        "TENCENTCLOUD_SECRET_ID",
        "TENCENTCLOUD_SECRET_KEY",
        "TEST_ANTIDDOS_INSTANCE_ID"
    );

    let conn = common::connection().expect("创建连接失败");
    let instance_id =
        std::env::var("TEST_ANTIDDOS_INSTANCE_ID").expect("TEST_ANTIDDOS_INSTANCE_ID 已检查");
    let mut flow = Lifecycle::new("tencentcloud_antiddos_packet_filter_config");
    let handler = flow
        .provider
        .resource("tencentcloud_antiddos_packet_filter_config")
        .expect("antiddos 已启用");

    // 1. 创建（平台不回规则 ID，按字段等值在列表里找回）
    let mut d = flow.create_view(filter_config(&instance_id));
    let created = handler.create(&conn, &mut d).await;
    assert!(created.is_ok(), "create 失败: {created:?}");
    assert!(d.id().contains('#'), "复合 ID 缺分隔符: {}", d.id());
    println!("  ✓ 创建成功: id={}", d.id());
    flow.remember(d);

    // 2. 回读
    let mut d = flow.stored_view();
    let read = handler.read(&conn, &mut d).await;
    assert!(read.is_ok(), "read 失败: {read:?}");
    assert!(d.is_present(), "规则应存在");
    let block = d
        .state()
        .get("packet_filter_config")
        .and_then(AttrValue::as_map)
        .expect("应回读到过滤配置");
    assert_eq!(block.get("protocol"), Some(&AttrValue::from("tcp")));
    assert_eq!(block.get("action"), Some(&AttrValue::from("drop")));
    println!("  ✓ 回读成功");
    flow.remember(d);

    // 3. 删除并确认消失（全字段 force-new，没有 update）
    let mut d = flow.stored_view();
    let deleted = handler.delete(&conn, &mut d).await;
    assert!(deleted.is_ok(), "delete 失败: {deleted:?}");

    let mut d = flow.stored_view();
    let verify = handler.read(&conn, &mut d).await;
    assert!(verify.is_ok(), "删除后 read 失败: {verify:?}");
    assert!(!d.is_present(), "删除后规则不应存在");
    println!("✓ 特征过滤规则生命周期测试通过");
}
