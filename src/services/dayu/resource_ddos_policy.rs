//! DDoS 高级策略资源：`tencentcloud_dayu_ddos_policy`，
//! ID 形如 `bgpip#policy-000000001`。
//!
//! 五个配置分组（丢弃选项、端口过滤、特征过滤、IP 黑白名单、水印）
//! 在修改接口上没有增量语义，任何一组变了都要全量重传。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    AttrMap, AttrValue, FieldSchema, ResourceData, Schema, Validation, block_string,
    build_composite_id, split_composite_id,
};
use crate::traits::Resource;

use super::service::DayuService;
use super::types::{
    CreateDdosPolicyRequest, DdosPolicy, DdosPolicyDropOption, DdosPolicyPacketFilter,
    DdosPolicyPortLimit, IpBlackWhite, ModifyDdosPolicyRequest, WaterPrintPolicy,
};
use super::{
    IP_TYPE_BLACK, IP_TYPE_WHITE, RESOURCE_TYPE_BGP, RESOURCE_TYPE_BGPIP,
    RESOURCE_TYPE_BGP_MULTIP, RESOURCE_TYPE_NET,
};

pub struct DayuDdosPolicyResource;

// 端口过滤的 Kind：0/2 按目的端口生效，1 按源端口
const PORT_KIND_SOURCE: i64 = 1;

fn drop_option_schema() -> Schema {
    Schema::new([
        (
            "drop_tcp",
            FieldSchema::boolean().required().desc("Whether TCP packets are dropped."),
        ),
        (
            "drop_udp",
            FieldSchema::boolean().required().desc("Whether UDP packets are dropped."),
        ),
        (
            "drop_icmp",
            FieldSchema::boolean().required().desc("Whether ICMP packets are dropped."),
        ),
        (
            "drop_other",
            FieldSchema::boolean()
                .required()
                .desc("Whether packets of other protocols are dropped."),
        ),
        (
            "drop_abroad",
            FieldSchema::boolean().required().desc("Whether oversea traffic is dropped."),
        ),
        (
            "check_sync_conn",
            FieldSchema::boolean().required().desc("Whether null sessions are checked."),
        ),
        (
            "s_new_limit",
            FieldSchema::int()
                .required()
                .desc("New connection limit per source IP."),
        ),
        (
            "d_new_limit",
            FieldSchema::int()
                .required()
                .desc("New connection limit per destination IP."),
        ),
        (
            "s_conn_limit",
            FieldSchema::int()
                .required()
                .desc("Concurrent connection limit per source IP."),
        ),
        (
            "d_conn_limit",
            FieldSchema::int()
                .required()
                .desc("Concurrent connection limit per destination IP."),
        ),
        (
            "bad_conn_threshold",
            FieldSchema::int()
                .required()
                .desc("Abnormal connections threshold of a source IP."),
        ),
        (
            "null_conn_enable",
            FieldSchema::boolean()
                .required()
                .desc("Whether null session protection is enabled."),
        ),
        (
            "conn_timeout",
            FieldSchema::int().required().desc("Connection timeout in seconds."),
        ),
        (
            "syn_rate",
            FieldSchema::int()
                .required()
                .validate(Validation::int_range(0, 100))
                .desc("SYN packet rate threshold, in percent."),
        ),
        (
            "syn_limit",
            FieldSchema::int().required().desc("SYN packet count threshold."),
        ),
        (
            "tcp_mbps_limit",
            FieldSchema::int().required().desc("TCP bandwidth limit in Mbps."),
        ),
        (
            "udp_mbps_limit",
            FieldSchema::int().required().desc("UDP bandwidth limit in Mbps."),
        ),
        (
            "icmp_mbps_limit",
            FieldSchema::int().required().desc("ICMP bandwidth limit in Mbps."),
        ),
        (
            "other_mbps_limit",
            FieldSchema::int()
                .required()
                .desc("Bandwidth limit for other protocols in Mbps."),
        ),
    ])
}

fn port_filter_schema() -> Schema {
    Schema::new([
        (
            "protocol",
            FieldSchema::string()
                .optional()
                .default_value("all")
                .validate(Validation::allowed(&["tcp", "udp", "icmp", "all"]))
                .desc("Filtered protocol."),
        ),
        (
            "start_port",
            FieldSchema::int()
                .optional()
                .default_value(0_i64)
                .validate(Validation::int_range(0, 65_535))
                .desc("First port of the filtered span."),
        ),
        (
            "end_port",
            FieldSchema::int()
                .optional()
                .default_value(65_535_i64)
                .validate(Validation::int_range(0, 65_535))
                .desc("Last port of the filtered span."),
        ),
        (
            "action",
            FieldSchema::string()
                .optional()
                .validate(Validation::allowed(&["drop", "transmit"]))
                .desc("What to do with matched packets."),
        ),
        (
            "kind",
            FieldSchema::int()
                .optional()
                .default_value(0_i64)
                .validate(Validation::int_range(0, 2))
                .desc("Which side the span applies to: 0/2 destination ports, 1 source ports."),
        ),
    ])
}

fn packet_filter_schema() -> Schema {
    Schema::new([
        (
            "protocol",
            FieldSchema::string()
                .optional()
                .default_value("all")
                .validate(Validation::allowed(&["tcp", "udp", "icmp", "all"]))
                .desc("Filtered protocol."),
        ),
        (
            "d_start_port",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 65_535))
                .desc("First destination port."),
        ),
        (
            "d_end_port",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 65_535))
                .desc("Last destination port."),
        ),
        (
            "s_start_port",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 65_535))
                .desc("First source port."),
        ),
        (
            "s_end_port",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 65_535))
                .desc("Last source port."),
        ),
        (
            "pkt_length_min",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 1500))
                .desc("Minimum packet length in bytes."),
        ),
        (
            "pkt_length_max",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 1500))
                .desc("Maximum packet length in bytes."),
        ),
        (
            "match_begin",
            FieldSchema::string()
                .optional()
                .validate(Validation::allowed(&["begin_l3", "begin_l4", "no_match"]))
                .desc("Where payload matching starts."),
        ),
        (
            "match_type",
            FieldSchema::string()
                .optional()
                .validate(Validation::allowed(&["sunday", "pcre"]))
                .desc("Matching algorithm."),
        ),
        (
            "match_str",
            FieldSchema::string().optional().desc("Matched keyword or regular expression."),
        ),
        (
            "depth",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 1500))
                .desc("Matching depth in bytes."),
        ),
        (
            "offset",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 1500))
                .desc("Matching offset in bytes."),
        ),
        (
            "is_include",
            FieldSchema::boolean()
                .optional()
                .default_value(false)
                .desc("Whether a hit means the keyword was contained."),
        ),
        (
            "action",
            FieldSchema::string()
                .optional()
                .validate(Validation::allowed(&[
                    "drop",
                    "drop_black",
                    "drop_rst",
                    "drop_black_rst",
                    "transmit",
                ]))
                .desc("What to do with matched packets."),
        ),
    ])
}

fn water_print_schema() -> Schema {
    Schema::new([
        (
            "tcp_port_list",
            FieldSchema::list(FieldSchema::string().validate(Validation::PortRange))
                .optional()
                .desc("Watermarked TCP port spans, as `start-end` strings."),
        ),
        (
            "udp_port_list",
            FieldSchema::list(FieldSchema::string().validate(Validation::PortRange))
                .optional()
                .desc("Watermarked UDP port spans, as `start-end` strings."),
        ),
        (
            "offset",
            FieldSchema::int()
                .optional()
                .validate(Validation::int_range(0, 100))
                .desc("Watermark offset."),
        ),
        (
            "auto_remove",
            FieldSchema::boolean()
                .optional()
                .default_value(false)
                .desc("Whether the watermark is removed automatically."),
        ),
        (
            "open_switch",
            FieldSchema::boolean()
                .optional()
                .default_value(false)
                .desc("Whether watermark verification is enabled."),
        ),
    ])
}

fn block_bool(map: &AttrMap, name: &str) -> bool {
    map.get(name).and_then(AttrValue::as_bool).unwrap_or_default()
}

fn block_int(map: &AttrMap, name: &str) -> i64 {
    map.get(name).and_then(AttrValue::as_int).unwrap_or_default()
}

fn build_drop_options(d: &ResourceData) -> Vec<DdosPolicyDropOption> {
    let Some(block) = d.get_block("drop_options") else {
        return Vec::new();
    };
    vec![DdosPolicyDropOption {
        drop_tcp: Some(i64::from(block_bool(block, "drop_tcp"))),
        drop_udp: Some(i64::from(block_bool(block, "drop_udp"))),
        drop_icmp: Some(i64::from(block_bool(block, "drop_icmp"))),
        drop_other: Some(i64::from(block_bool(block, "drop_other"))),
        drop_abroad: Some(i64::from(block_bool(block, "drop_abroad"))),
        check_sync_conn: Some(i64::from(block_bool(block, "check_sync_conn"))),
        sd_new_limit: Some(block_int(block, "s_new_limit")),
        dst_new_limit: Some(block_int(block, "d_new_limit")),
        sd_conn_limit: Some(block_int(block, "s_conn_limit")),
        dst_conn_limit: Some(block_int(block, "d_conn_limit")),
        bad_conn_threshold: Some(block_int(block, "bad_conn_threshold")),
        null_conn_enable: Some(i64::from(block_bool(block, "null_conn_enable"))),
        conn_timeout: Some(block_int(block, "conn_timeout")),
        syn_rate: Some(block_int(block, "syn_rate")),
        syn_limit: Some(block_int(block, "syn_limit")),
        d_tcp_mbps_limit: Some(block_int(block, "tcp_mbps_limit")),
        d_udp_mbps_limit: Some(block_int(block, "udp_mbps_limit")),
        d_icmp_mbps_limit: Some(block_int(block, "icmp_mbps_limit")),
        d_other_mbps_limit: Some(block_int(block, "other_mbps_limit")),
    }]
}

fn build_port_filters(type_name: &str, d: &ResourceData) -> Result<Vec<DdosPolicyPortLimit>> {
    let mut filters = Vec::new();
    for entry in d.get_list("port_filters") {
        let Some(map) = entry.as_map() else { continue };
        let start = block_int(map, "start_port");
        let end = block_int(map, "end_port");
        if start > end {
            return Err(ProviderError::InvalidParameter {
                product: type_name.to_string(),
                param: "port_filters".to_string(),
                detail: format!("`start_port` {start} exceeds `end_port` {end}"),
            });
        }
        let kind = block_int(map, "kind");
        let mut limit = DdosPolicyPortLimit {
            protocol: block_string(map, "protocol"),
            action: block_string(map, "action"),
            kind: Some(kind),
            ..DdosPolicyPortLimit::default()
        };
        if kind == PORT_KIND_SOURCE {
            limit.s_port_start = Some(start);
            limit.s_port_end = Some(end);
        } else {
            limit.d_port_start = Some(start);
            limit.d_port_end = Some(end);
        }
        filters.push(limit);
    }
    Ok(filters)
}

fn build_packet_filters(type_name: &str, d: &ResourceData) -> Result<Vec<DdosPolicyPacketFilter>> {
    let mut filters = Vec::new();
    for entry in d.get_list("packet_filters") {
        let Some(map) = entry.as_map() else { continue };
        for (start, end) in [
            ("d_start_port", "d_end_port"),
            ("s_start_port", "s_end_port"),
            ("pkt_length_min", "pkt_length_max"),
        ] {
            if block_int(map, start) > block_int(map, end) {
                return Err(ProviderError::InvalidParameter {
                    product: type_name.to_string(),
                    param: "packet_filters".to_string(),
                    detail: format!("`{start}` exceeds `{end}`"),
                });
            }
        }
        filters.push(DdosPolicyPacketFilter {
            protocol: block_string(map, "protocol"),
            d_port_start: Some(block_int(map, "d_start_port")),
            d_port_end: Some(block_int(map, "d_end_port")),
            s_port_start: Some(block_int(map, "s_start_port")),
            s_port_end: Some(block_int(map, "s_end_port")),
            pktlen_min: Some(block_int(map, "pkt_length_min")),
            pktlen_max: Some(block_int(map, "pkt_length_max")),
            match_begin: block_string(map, "match_begin"),
            match_type: block_string(map, "match_type"),
            match_str: block_string(map, "match_str"),
            depth: Some(block_int(map, "depth")),
            offset: Some(block_int(map, "offset")),
            is_not: Some(i64::from(block_bool(map, "is_include"))),
            action: block_string(map, "action"),
        });
    }
    Ok(filters)
}

fn build_ip_lists(d: &ResourceData) -> Vec<IpBlackWhite> {
    let mut lists = Vec::new();
    for ip in d.get_string_list("black_ips") {
        lists.push(IpBlackWhite {
            ip: Some(ip),
            ip_type: Some(IP_TYPE_BLACK.to_string()),
        });
    }
    for ip in d.get_string_list("white_ips") {
        lists.push(IpBlackWhite {
            ip: Some(ip),
            ip_type: Some(IP_TYPE_WHITE.to_string()),
        });
    }
    lists
}

fn build_water_print(d: &ResourceData) -> Vec<WaterPrintPolicy> {
    let Some(block) = d.get_block("water_print") else {
        return Vec::new();
    };
    vec![WaterPrintPolicy {
        tcp_port_list: block.get("tcp_port_list").and_then(AttrValue::as_string_list),
        udp_port_list: block.get("udp_port_list").and_then(AttrValue::as_string_list),
        offset: block.get("offset").and_then(AttrValue::as_int),
        remove_switch: Some(i64::from(block_bool(block, "auto_remove"))),
        open_status: Some(i64::from(block_bool(block, "open_switch"))),
    }]
}

// ---- 回读扁平化 ----

fn flatten_drop_options(options: &DdosPolicyDropOption) -> AttrMap {
    let mut block = AttrMap::new();
    let flag = |v: Option<i64>| AttrValue::from(v.unwrap_or_default() > 0);
    let num = |v: Option<i64>| AttrValue::from(v.unwrap_or_default());
    block.insert("drop_tcp".to_string(), flag(options.drop_tcp));
    block.insert("drop_udp".to_string(), flag(options.drop_udp));
    block.insert("drop_icmp".to_string(), flag(options.drop_icmp));
    block.insert("drop_other".to_string(), flag(options.drop_other));
    block.insert("drop_abroad".to_string(), flag(options.drop_abroad));
    block.insert("check_sync_conn".to_string(), flag(options.check_sync_conn));
    block.insert("s_new_limit".to_string(), num(options.sd_new_limit));
    block.insert("d_new_limit".to_string(), num(options.dst_new_limit));
    block.insert("s_conn_limit".to_string(), num(options.sd_conn_limit));
    block.insert("d_conn_limit".to_string(), num(options.dst_conn_limit));
    block.insert("bad_conn_threshold".to_string(), num(options.bad_conn_threshold));
    block.insert("null_conn_enable".to_string(), flag(options.null_conn_enable));
    block.insert("conn_timeout".to_string(), num(options.conn_timeout));
    block.insert("syn_rate".to_string(), num(options.syn_rate));
    block.insert("syn_limit".to_string(), num(options.syn_limit));
    block.insert("tcp_mbps_limit".to_string(), num(options.d_tcp_mbps_limit));
    block.insert("udp_mbps_limit".to_string(), num(options.d_udp_mbps_limit));
    block.insert("icmp_mbps_limit".to_string(), num(options.d_icmp_mbps_limit));
    block.insert("other_mbps_limit".to_string(), num(options.d_other_mbps_limit));
    block
}

fn flatten_port_filter(limit: &DdosPolicyPortLimit) -> AttrMap {
    let mut block = AttrMap::new();
    let kind = limit.kind.unwrap_or_default();
    let (start, end) = if kind == PORT_KIND_SOURCE {
        (limit.s_port_start, limit.s_port_end)
    } else {
        (limit.d_port_start, limit.d_port_end)
    };
    if let Some(protocol) = &limit.protocol {
        block.insert("protocol".to_string(), AttrValue::from(protocol.clone()));
    }
    if let Some(action) = &limit.action {
        block.insert("action".to_string(), AttrValue::from(action.clone()));
    }
    block.insert("kind".to_string(), AttrValue::from(kind));
    block.insert("start_port".to_string(), AttrValue::from(start.unwrap_or_default()));
    block.insert("end_port".to_string(), AttrValue::from(end.unwrap_or_default()));
    block
}

fn flatten_packet_filter(filter: &DdosPolicyPacketFilter) -> AttrMap {
    let mut block = AttrMap::new();
    let num = |v: Option<i64>| AttrValue::from(v.unwrap_or_default());
    if let Some(protocol) = &filter.protocol {
        block.insert("protocol".to_string(), AttrValue::from(protocol.clone()));
    }
    block.insert("d_start_port".to_string(), num(filter.d_port_start));
    block.insert("d_end_port".to_string(), num(filter.d_port_end));
    block.insert("s_start_port".to_string(), num(filter.s_port_start));
    block.insert("s_end_port".to_string(), num(filter.s_port_end));
    block.insert("pkt_length_min".to_string(), num(filter.pktlen_min));
    block.insert("pkt_length_max".to_string(), num(filter.pktlen_max));
    if let Some(match_begin) = &filter.match_begin {
        block.insert("match_begin".to_string(), AttrValue::from(match_begin.clone()));
    }
    if let Some(match_type) = &filter.match_type {
        block.insert("match_type".to_string(), AttrValue::from(match_type.clone()));
    }
    if let Some(match_str) = &filter.match_str {
        block.insert("match_str".to_string(), AttrValue::from(match_str.clone()));
    }
    block.insert("depth".to_string(), num(filter.depth));
    block.insert("offset".to_string(), num(filter.offset));
    block.insert(
        "is_include".to_string(),
        AttrValue::from(filter.is_not.unwrap_or_default() > 0),
    );
    if let Some(action) = &filter.action {
        block.insert("action".to_string(), AttrValue::from(action.clone()));
    }
    block
}

fn flatten_water_print(policy: &WaterPrintPolicy) -> AttrMap {
    let mut block = AttrMap::new();
    if let Some(tcp) = &policy.tcp_port_list {
        block.insert("tcp_port_list".to_string(), AttrValue::from(tcp.clone()));
    }
    if let Some(udp) = &policy.udp_port_list {
        block.insert("udp_port_list".to_string(), AttrValue::from(udp.clone()));
    }
    if let Some(offset) = policy.offset {
        block.insert("offset".to_string(), AttrValue::from(offset));
    }
    block.insert(
        "auto_remove".to_string(),
        AttrValue::from(policy.remove_switch.unwrap_or_default() > 0),
    );
    block.insert(
        "open_switch".to_string(),
        AttrValue::from(policy.open_status.unwrap_or_default() > 0),
    );
    block
}

fn split_ip_lists(policy: &DdosPolicy) -> (Vec<String>, Vec<String>) {
    let mut black = Vec::new();
    let mut white = Vec::new();
    for entry in policy.ip_black_white_lists.as_deref().unwrap_or_default() {
        let Some(ip) = entry.ip.clone() else { continue };
        match entry.ip_type.as_deref() {
            Some(IP_TYPE_BLACK) => black.push(ip),
            Some(IP_TYPE_WHITE) => white.push(ip),
            _ => {}
        }
    }
    (black, white)
}

#[async_trait]
impl Resource for DayuDdosPolicyResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_dayu_ddos_policy"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "resource_type",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .validate(Validation::allowed(&[
                        RESOURCE_TYPE_BGPIP,
                        RESOURCE_TYPE_BGP,
                        RESOURCE_TYPE_BGP_MULTIP,
                        RESOURCE_TYPE_NET,
                    ]))
                    .desc("Type of the protection instances the policy applies to."),
            ),
            (
                "name",
                FieldSchema::string()
                    .required()
                    .validate(Validation::string_length(1, 32))
                    .desc("Policy name."),
            ),
            (
                "drop_options",
                FieldSchema::block(drop_option_schema())
                    .required()
                    .desc("Option of dropping abnormal traffic."),
            ),
            (
                "port_filters",
                FieldSchema::block_list(port_filter_schema())
                    .optional()
                    .desc("Port filter rules."),
            ),
            (
                "packet_filters",
                FieldSchema::block_list(packet_filter_schema())
                    .optional()
                    .desc("Packet feature filter rules."),
            ),
            (
                "black_ips",
                FieldSchema::set(FieldSchema::string().validate(Validation::Ip))
                    .optional()
                    .desc("Blacklisted IP addresses."),
            ),
            (
                "white_ips",
                FieldSchema::set(FieldSchema::string().validate(Validation::Ip))
                    .optional()
                    .desc("Whitelisted IP addresses."),
            ),
            (
                "water_print",
                FieldSchema::block(water_print_schema())
                    .optional()
                    .desc("Watermark policy, at most one."),
            ),
            (
                "policy_id",
                FieldSchema::string()
                    .computed()
                    .desc("Policy ID assigned by the platform."),
            ),
            (
                "create_time",
                FieldSchema::string().computed().desc("Creation time of the policy."),
            ),
            (
                "scene_id",
                FieldSchema::string()
                    .computed()
                    .desc("ID of the policy case bound to the policy."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let resource_type = d.get_string("resource_type");
        let req = CreateDdosPolicyRequest {
            business: resource_type.clone(),
            name: d.get_string("name"),
            drop_options: build_drop_options(d),
            port_limits: build_port_filters(self.type_name(), d)?,
            ip_allow_denys: build_ip_lists(d),
            packet_filters: build_packet_filters(self.type_name(), d)?,
            water_print: build_water_print(d),
        };

        let service = DayuService::new(conn);
        let policy_id = retry::within(WRITE_RETRY_TIMEOUT, || async {
            service.create_ddos_policy(&req).await.map_err(retry_error)
        })
        .await?;
        d.set_id(build_composite_id(&[&resource_type, &policy_id]));

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 2)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (resource_type, policy_id) = (parts[0].clone(), parts[1].clone());

        let service = DayuService::new(conn);
        let policy = retry::within(READ_RETRY_TIMEOUT, || async {
            service
                .describe_ddos_policy(&resource_type, &policy_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        let Some(policy) = policy else {
            d.set_id("");
            return Ok(());
        };

        d.set("resource_type", resource_type)?;
        d.set("policy_id", policy_id)?;
        if let Some(name) = policy.policy_name.clone() {
            d.set("name", name)?;
        }
        if let Some(create_time) = policy.create_time.clone() {
            d.set("create_time", create_time)?;
        }
        if let Some(scene_id) = policy.scene_id.clone() {
            d.set("scene_id", scene_id)?;
        }
        if let Some(options) = &policy.drop_options {
            d.set("drop_options", vec![flatten_drop_options(options)])?;
        }
        let port_filters: Vec<AttrMap> = policy
            .port_limits
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(flatten_port_filter)
            .collect();
        d.set("port_filters", port_filters)?;
        let packet_filters: Vec<AttrMap> = policy
            .packet_filters
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(flatten_packet_filter)
            .collect();
        d.set("packet_filters", packet_filters)?;
        let (black, white) = split_ip_lists(&policy);
        d.set("black_ips", black)?;
        d.set("white_ips", white)?;
        let water_print: Vec<AttrMap> = policy
            .water_print
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(flatten_water_print)
            .collect();
        d.set("water_print", water_print)?;
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        if d.has_change("resource_type") {
            return Err(ProviderError::UnsupportedOperation {
                product: self.type_name().to_string(),
                detail: "argument `resource_type` cannot be changed".to_string(),
            });
        }
        let parts = split_composite_id(d.id(), 2)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (resource_type, policy_id) = (parts[0].clone(), parts[1].clone());

        let service = DayuService::new(conn);

        if d.has_change("name") {
            let name = d.get_string("name");
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_ddos_policy_name(&resource_type, &policy_id, &name)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        if d.has_changes(&[
            "drop_options",
            "port_filters",
            "packet_filters",
            "black_ips",
            "white_ips",
            "water_print",
        ]) {
            let req = ModifyDdosPolicyRequest {
                business: resource_type.clone(),
                policy_id: policy_id.clone(),
                drop_options: build_drop_options(d),
                port_limits: build_port_filters(self.type_name(), d)?,
                ip_allow_denys: build_ip_lists(d),
                packet_filters: build_packet_filters(self.type_name(), d)?,
                water_print: build_water_print(d),
            };
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service.modify_ddos_policy(&req).await.map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 2)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (resource_type, policy_id) = (parts[0].clone(), parts[1].clone());

        let service = DayuService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            match service.delete_ddos_policy(&resource_type, &policy_id).await {
                Ok(()) | Err(ProviderError::ResourceNotFound { .. }) => Ok(()),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await?;

        retry::within(READ_RETRY_TIMEOUT, || async {
            match service.describe_ddos_policy(&resource_type, &policy_id).await {
                Ok(None) => Ok(()),
                Ok(Some(_)) => Err(Retry::not_ready(
                    "dayu",
                    format!("policy {policy_id} is still releasing"),
                )),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_options_block() -> AttrValue {
        let mut block = AttrMap::new();
        for flag in [
            "drop_tcp",
            "drop_udp",
            "drop_icmp",
            "drop_other",
            "drop_abroad",
            "check_sync_conn",
            "null_conn_enable",
        ] {
            block.insert(flag.to_string(), AttrValue::from(flag == "drop_tcp"));
        }
        for (field, value) in [
            ("s_new_limit", 100),
            ("d_new_limit", 100),
            ("s_conn_limit", 100),
            ("d_conn_limit", 100),
            ("bad_conn_threshold", 100),
            ("conn_timeout", 30),
            ("syn_rate", 50),
            ("syn_limit", 100),
            ("tcp_mbps_limit", 100),
            ("udp_mbps_limit", 100),
            ("icmp_mbps_limit", 100),
            ("other_mbps_limit", 100),
        ] {
            block.insert(field.to_string(), AttrValue::from(value));
        }
        AttrValue::List(vec![AttrValue::Map(block)])
    }

    fn base_config() -> AttrMap {
        let mut config = AttrMap::new();
        config.insert("resource_type".to_string(), AttrValue::from("bgpip"));
        config.insert("name".to_string(), AttrValue::from("tf-policy"));
        config.insert("drop_options".to_string(), drop_options_block());
        config
    }

    fn data(config: AttrMap) -> ResourceData {
        ResourceData::new(
            "tencentcloud_dayu_ddos_policy",
            DayuDdosPolicyResource.schema(),
            config,
        )
        .unwrap()
    }

    #[test]
    fn name_length_enforced() {
        let mut config = base_config();
        config.insert("name".to_string(), AttrValue::from("x".repeat(33)));
        assert!(
            ResourceData::new(
                "tencentcloud_dayu_ddos_policy",
                DayuDdosPolicyResource.schema(),
                config,
            )
            .is_err()
        );
    }

    #[test]
    fn drop_option_flags_become_integers() {
        let options = build_drop_options(&data(base_config()));
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].drop_tcp, Some(1));
        assert_eq!(options[0].drop_udp, Some(0));
        assert_eq!(options[0].sd_new_limit, Some(100));
        assert_eq!(options[0].d_tcp_mbps_limit, Some(100));
    }

    #[test]
    fn port_filter_kind_selects_port_side() {
        let mut config = base_config();
        let mut filter = AttrMap::new();
        filter.insert("protocol".to_string(), AttrValue::from("tcp"));
        filter.insert("start_port".to_string(), AttrValue::from(80));
        filter.insert("end_port".to_string(), AttrValue::from(443));
        filter.insert("kind".to_string(), AttrValue::from(1));
        config.insert(
            "port_filters".to_string(),
            AttrValue::List(vec![AttrValue::Map(filter)]),
        );
        let filters = build_port_filters("tencentcloud_dayu_ddos_policy", &data(config)).unwrap();
        assert_eq!(filters[0].s_port_start, Some(80));
        assert_eq!(filters[0].s_port_end, Some(443));
        assert!(filters[0].d_port_start.is_none());
    }

    #[test]
    fn port_filter_rejects_inverted_span() {
        let mut config = base_config();
        let mut filter = AttrMap::new();
        filter.insert("start_port".to_string(), AttrValue::from(443));
        filter.insert("end_port".to_string(), AttrValue::from(80));
        config.insert(
            "port_filters".to_string(),
            AttrValue::List(vec![AttrValue::Map(filter)]),
        );
        assert!(build_port_filters("tencentcloud_dayu_ddos_policy", &data(config)).is_err());
    }

    #[test]
    fn packet_filter_maps_inclusion_flag() {
        let mut config = base_config();
        let mut filter = AttrMap::new();
        filter.insert("match_str".to_string(), AttrValue::from("abc"));
        filter.insert("is_include".to_string(), AttrValue::from(true));
        filter.insert("d_start_port".to_string(), AttrValue::from(80));
        filter.insert("d_end_port".to_string(), AttrValue::from(443));
        config.insert(
            "packet_filters".to_string(),
            AttrValue::List(vec![AttrValue::Map(filter)]),
        );
        let filters = build_packet_filters("tencentcloud_dayu_ddos_policy", &data(config)).unwrap();
        assert_eq!(filters[0].is_not, Some(1));
        assert_eq!(filters[0].match_str.as_deref(), Some("abc"));
    }

    #[test]
    fn ip_lists_partition_by_color() {
        let mut config = base_config();
        config.insert(
            "black_ips".to_string(),
            AttrValue::from(vec!["1.1.1.1".to_string()]),
        );
        config.insert(
            "white_ips".to_string(),
            AttrValue::from(vec!["2.2.2.2".to_string(), "3.3.3.3".to_string()]),
        );
        let lists = build_ip_lists(&data(config));
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].ip_type.as_deref(), Some("black"));
        assert_eq!(lists[1].ip_type.as_deref(), Some("white"));
    }

    #[test]
    fn drop_options_round_back_as_booleans() {
        let options = DdosPolicyDropOption {
            drop_tcp: Some(1),
            drop_udp: Some(0),
            conn_timeout: Some(30),
            ..DdosPolicyDropOption::default()
        };
        let block = flatten_drop_options(&options);
        assert_eq!(block.get("drop_tcp"), Some(&AttrValue::Bool(true)));
        assert_eq!(block.get("drop_udp"), Some(&AttrValue::Bool(false)));
        assert_eq!(block.get("conn_timeout"), Some(&AttrValue::Int(30)));
    }
}
