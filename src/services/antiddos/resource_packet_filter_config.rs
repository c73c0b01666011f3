//! 特征过滤规则资源：`tencentcloud_antiddos_packet_filter_config`，
//! ID 形如 `bgp-000000xe#ccs-2j7o2transfer`。
//!
//! 创建接口不回配置 ID，回查时按字段逐项比对定位；可选字段下发时
//! 全量带零值，否则比不齐。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, block_string, build_composite_id,
    split_composite_id,
};
use crate::traits::Resource;

use super::service::AntiddosService;
use super::types::{PacketFilterConfig, PacketFilterRelation};

pub struct AntiddosPacketFilterConfigResource;

fn block_int(map: &AttrMap, name: &str) -> i64 {
    map.get(name).and_then(AttrValue::as_int).unwrap_or_default()
}

fn block_text(map: &AttrMap, name: &str) -> String {
    block_string(map, name).unwrap_or_default()
}

fn build_config(d: &ResourceData) -> PacketFilterConfig {
    let Some(block) = d.get_block("packet_filter_config") else {
        return PacketFilterConfig::default();
    };
    PacketFilterConfig {
        id: None,
        protocol: Some(block_text(block, "protocol")),
        sport_start: Some(block_int(block, "sport_start")),
        sport_end: Some(block_int(block, "sport_end")),
        dport_start: Some(block_int(block, "dport_start")),
        dport_end: Some(block_int(block, "dport_end")),
        pktlen_min: Some(block_int(block, "pktlen_min")),
        pktlen_max: Some(block_int(block, "pktlen_max")),
        action: Some(block_text(block, "action")),
        match_begin: Some(block_text(block, "match_begin")),
        match_type: Some(block_text(block, "match_type")),
        match_str: Some(block_text(block, "str")),
        depth: Some(block_int(block, "depth")),
        offset: Some(block_int(block, "offset")),
        is_not: Some(block_int(block, "is_not")),
        match_logic: Some(block_text(block, "match_logic")),
        match_begin2: Some(block_text(block, "match_begin2")),
        match_type2: Some(block_text(block, "match_type2")),
        match_str2: Some(block_text(block, "str2")),
        depth2: Some(block_int(block, "depth2")),
        offset2: Some(block_int(block, "offset2")),
        is_not2: Some(block_int(block, "is_not2")),
        pkt_len_gt: Some(block_int(block, "pkt_len_gt")),
    }
}

/// 字段逐项比对。`match_logic` 与 `match_begin2` 平台会回填，
/// 本地为空时跳过。
fn config_matches(wanted: &PacketFilterConfig, seen: &PacketFilterConfig) -> bool {
    fn text(v: &Option<String>) -> &str {
        v.as_deref().unwrap_or_default()
    }

    let strings = [
        (&wanted.protocol, &seen.protocol),
        (&wanted.action, &seen.action),
        (&wanted.match_begin, &seen.match_begin),
        (&wanted.match_type, &seen.match_type),
        (&wanted.match_str, &seen.match_str),
        (&wanted.match_type2, &seen.match_type2),
        (&wanted.match_str2, &seen.match_str2),
    ];
    if strings.iter().any(|(w, s)| text(w) != text(s)) {
        return false;
    }

    let ints = [
        (wanted.sport_start, seen.sport_start),
        (wanted.sport_end, seen.sport_end),
        (wanted.dport_start, seen.dport_start),
        (wanted.dport_end, seen.dport_end),
        (wanted.pktlen_min, seen.pktlen_min),
        (wanted.pktlen_max, seen.pktlen_max),
        (wanted.depth, seen.depth),
        (wanted.offset, seen.offset),
        (wanted.is_not, seen.is_not),
        (wanted.depth2, seen.depth2),
        (wanted.offset2, seen.offset2),
        (wanted.is_not2, seen.is_not2),
        (wanted.pkt_len_gt, seen.pkt_len_gt),
    ];
    if ints
        .iter()
        .any(|(w, s)| w.unwrap_or_default() != s.unwrap_or_default())
    {
        return false;
    }

    for (w, s) in [
        (&wanted.match_logic, &seen.match_logic),
        (&wanted.match_begin2, &seen.match_begin2),
    ] {
        if !text(w).is_empty() && text(w) != text(s) {
            return false;
        }
    }
    true
}

fn flatten_config(config: &PacketFilterConfig) -> AttrMap {
    let mut m = AttrMap::new();
    let texts = [
        ("protocol", &config.protocol),
        ("action", &config.action),
        ("match_begin", &config.match_begin),
        ("match_type", &config.match_type),
        ("str", &config.match_str),
        ("match_logic", &config.match_logic),
        ("match_begin2", &config.match_begin2),
        ("match_type2", &config.match_type2),
        ("str2", &config.match_str2),
    ];
    for (name, value) in texts {
        if let Some(value) = value {
            m.insert(name.to_string(), AttrValue::from(value.clone()));
        }
    }
    let ints = [
        ("sport_start", config.sport_start),
        ("sport_end", config.sport_end),
        ("dport_start", config.dport_start),
        ("dport_end", config.dport_end),
        ("pktlen_min", config.pktlen_min),
        ("pktlen_max", config.pktlen_max),
        ("depth", config.depth),
        ("offset", config.offset),
        ("is_not", config.is_not),
        ("depth2", config.depth2),
        ("offset2", config.offset2),
        ("is_not2", config.is_not2),
        ("pkt_len_gt", config.pkt_len_gt),
    ];
    for (name, value) in ints {
        if let Some(value) = value {
            m.insert(name.to_string(), AttrValue::from(value));
        }
    }
    m
}

fn find_config(configs: &[PacketFilterRelation], config_id: &str) -> Option<PacketFilterConfig> {
    configs
        .iter()
        .filter_map(|c| c.packet_filter_config.as_ref())
        .find(|c| c.id.as_deref() == Some(config_id))
        .cloned()
}

#[async_trait]
impl Resource for AntiddosPacketFilterConfigResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_antiddos_packet_filter_config"
    }

    fn schema(&self) -> Schema {
        let filter = Schema::new([
            (
                "protocol",
                FieldSchema::string()
                    .required()
                    .desc("Protocol, `tcp`, `udp`, `icmp` or `all`."),
            ),
            (
                "sport_start",
                FieldSchema::int()
                    .required()
                    .desc("Start of the source port range, 0 to 65535."),
            ),
            (
                "sport_end",
                FieldSchema::int()
                    .required()
                    .desc("End of the source port range, no less than the start."),
            ),
            (
                "dport_start",
                FieldSchema::int()
                    .required()
                    .desc("Start of the destination port range."),
            ),
            (
                "dport_end",
                FieldSchema::int()
                    .required()
                    .desc("End of the destination port range."),
            ),
            (
                "pktlen_min",
                FieldSchema::int()
                    .required()
                    .desc("Minimum packet length, 1 to 1500."),
            ),
            (
                "pktlen_max",
                FieldSchema::int()
                    .required()
                    .desc("Maximum packet length, no less than the minimum."),
            ),
            (
                "action",
                FieldSchema::string().required().desc(
                    "Action on matched packets: `drop`, `transmit`, `drop_black`, \
                     `drop_rst`, `drop_black_rst` or `forward`.",
                ),
            ),
            (
                "match_begin",
                FieldSchema::string()
                    .optional()
                    .desc("Where matching starts: `begin_l3`, `begin_l4`, `begin_l5` or `no_match`."),
            ),
            (
                "match_type",
                FieldSchema::string()
                    .optional()
                    .desc("Match kind, `sunday` keyword or `pcre` regular expression."),
            ),
            (
                "str",
                FieldSchema::string()
                    .optional()
                    .desc("Keyword or regular expression to match."),
            ),
            (
                "depth",
                FieldSchema::int()
                    .optional()
                    .desc("Match depth from the start position, 0 to 1500."),
            ),
            (
                "offset",
                FieldSchema::int()
                    .optional()
                    .desc("Offset from the start position, 0 to depth."),
            ),
            (
                "is_not",
                FieldSchema::int()
                    .optional()
                    .desc("Whether the match is negated, 0 includes and 1 excludes."),
            ),
            (
                "match_logic",
                FieldSchema::string()
                    .optional()
                    .computed()
                    .desc("Relation to the second condition, `and`, or `none` when absent."),
            ),
            (
                "match_begin2",
                FieldSchema::string()
                    .optional()
                    .computed()
                    .desc("Where the second match starts, `begin_l5` or `no_match`."),
            ),
            (
                "match_type2",
                FieldSchema::string().optional().desc("Second match kind."),
            ),
            (
                "str2",
                FieldSchema::string()
                    .optional()
                    .desc("Second keyword or regular expression."),
            ),
            (
                "depth2",
                FieldSchema::int().optional().desc("Second match depth."),
            ),
            (
                "offset2",
                FieldSchema::int()
                    .optional()
                    .desc("Offset for the second match."),
            ),
            (
                "is_not2",
                FieldSchema::int()
                    .optional()
                    .desc("Whether the second match is negated."),
            ),
            (
                "pkt_len_gt",
                FieldSchema::int()
                    .optional()
                    .desc("Match packets longer than this value."),
            ),
        ]);
        Schema::new([
            (
                "instance_id",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("ID of the protection instance."),
            ),
            (
                "packet_filter_config",
                FieldSchema::block(filter)
                    .required()
                    .force_new()
                    .desc("Feature filtering rule."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let instance_id = d.get_string("instance_id");
        let wanted = build_config(d);

        let service = AntiddosService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .create_packet_filter_config(&instance_id, wanted.clone())
                .await
                .map_err(retry_error)
        })
        .await?;

        // 回查列表按字段比对找回配置 ID
        let configs = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .list_packet_filter_configs(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        let config_id = configs
            .iter()
            .filter(|c| {
                c.instance_detail_list
                    .first()
                    .and_then(|i| i.instance_id.as_deref())
                    == Some(instance_id.as_str())
            })
            .filter_map(|c| c.packet_filter_config.as_ref())
            .find(|seen| config_matches(&wanted, seen))
            .and_then(|seen| seen.id.clone())
            .ok_or_else(|| ProviderError::ParseError {
                product: "antiddos".to_string(),
                detail: format!(
                    "created packet filter config on {instance_id} did not come back in the list"
                ),
            })?;
        d.set_id(build_composite_id(&[&instance_id, &config_id]));

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 2)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (instance_id, config_id) = (parts[0].clone(), parts[1].clone());

        let service = AntiddosService::new(conn);
        let configs = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .list_packet_filter_configs(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        let Some(config) = find_config(&configs, &config_id) else {
            log::warn!("[antiddos] packet filter config {config_id} on {instance_id} not found, clearing state");
            d.set_id("");
            return Ok(());
        };

        d.set("instance_id", instance_id)?;
        d.set("packet_filter_config", vec![flatten_config(&config)])?;
        Ok(())
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 2)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (instance_id, config_id) = (parts[0].clone(), parts[1].clone());

        let service = AntiddosService::new(conn);
        let configs = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .list_packet_filter_configs(&instance_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        // 列表里已经没有就当删完
        let Some(config) = find_config(&configs, &config_id) else {
            return Ok(());
        };

        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .delete_packet_filter_config(&instance_id, config.clone())
                .await
                .map_err(retry_error)
        })
        .await
    }
}
