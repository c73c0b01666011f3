//! Antiddos API 线上结构体。

use serde::{Deserialize, Serialize};

/// 特征过滤规则。`Id` 只在查询响应里出现；下发时可选字段也全量
/// 携带零值，回查比对才对得齐。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct PacketFilterConfig {
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Protocol", default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(rename = "SportStart", default, skip_serializing_if = "Option::is_none")]
    pub sport_start: Option<i64>,
    #[serde(rename = "SportEnd", default, skip_serializing_if = "Option::is_none")]
    pub sport_end: Option<i64>,
    #[serde(rename = "DportStart", default, skip_serializing_if = "Option::is_none")]
    pub dport_start: Option<i64>,
    #[serde(rename = "DportEnd", default, skip_serializing_if = "Option::is_none")]
    pub dport_end: Option<i64>,
    #[serde(rename = "PktlenMin", default, skip_serializing_if = "Option::is_none")]
    pub pktlen_min: Option<i64>,
    #[serde(rename = "PktlenMax", default, skip_serializing_if = "Option::is_none")]
    pub pktlen_max: Option<i64>,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(rename = "MatchBegin", default, skip_serializing_if = "Option::is_none")]
    pub match_begin: Option<String>,
    #[serde(rename = "MatchType", default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(rename = "Str", default, skip_serializing_if = "Option::is_none")]
    pub match_str: Option<String>,
    #[serde(rename = "Depth", default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    #[serde(rename = "Offset", default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(rename = "IsNot", default, skip_serializing_if = "Option::is_none")]
    pub is_not: Option<i64>,
    #[serde(rename = "MatchLogic", default, skip_serializing_if = "Option::is_none")]
    pub match_logic: Option<String>,
    #[serde(rename = "MatchBegin2", default, skip_serializing_if = "Option::is_none")]
    pub match_begin2: Option<String>,
    #[serde(rename = "MatchType2", default, skip_serializing_if = "Option::is_none")]
    pub match_type2: Option<String>,
    #[serde(rename = "Str2", default, skip_serializing_if = "Option::is_none")]
    pub match_str2: Option<String>,
    #[serde(rename = "Depth2", default, skip_serializing_if = "Option::is_none")]
    pub depth2: Option<i64>,
    #[serde(rename = "Offset2", default, skip_serializing_if = "Option::is_none")]
    pub offset2: Option<i64>,
    #[serde(rename = "IsNot2", default, skip_serializing_if = "Option::is_none")]
    pub is_not2: Option<i64>,
    #[serde(rename = "PktLenGT", default, skip_serializing_if = "Option::is_none")]
    pub pkt_len_gt: Option<i64>,
}

/// 查询响应里的配置与其生效实例。
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PacketFilterRelation {
    #[serde(rename = "PacketFilterConfig", default)]
    pub packet_filter_config: Option<PacketFilterConfig>,
    #[serde(rename = "InstanceDetailList", default)]
    pub instance_detail_list: Vec<InstanceRelation>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InstanceRelation {
    #[serde(rename = "InstanceId", default)]
    pub instance_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePacketFilterConfigRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "PacketFilterConfig")]
    pub packet_filter_config: PacketFilterConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct DescribeListPacketFilterConfigRequest {
    #[serde(rename = "Offset")]
    pub offset: i64,
    #[serde(rename = "Limit")]
    pub limit: i64,
    #[serde(rename = "FilterInstanceId")]
    pub filter_instance_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DescribeListPacketFilterConfigResponse {
    #[serde(rename = "Total", default)]
    pub total: i64,
    #[serde(rename = "ConfigList", default)]
    pub config_list: Vec<PacketFilterRelation>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeletePacketFilterConfigRequest {
    #[serde(rename = "InstanceId")]
    pub instance_id: String,
    #[serde(rename = "PacketFilterConfig")]
    pub packet_filter_config: PacketFilterConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_id_is_never_sent() {
        let config = PacketFilterConfig {
            protocol: Some("tcp".to_string()),
            sport_start: Some(0),
            ..PacketFilterConfig::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("Id").is_none());
        assert_eq!(json["Protocol"], "tcp");
        assert_eq!(json["SportStart"], 0);
    }

    #[test]
    fn keyword_field_uses_short_platform_name() {
        let config = PacketFilterConfig {
            match_str: Some("x313233".to_string()),
            match_str2: Some("abc".to_string()),
            pkt_len_gt: Some(1400),
            ..PacketFilterConfig::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["Str"], "x313233");
        assert_eq!(json["Str2"], "abc");
        assert_eq!(json["PktLenGT"], 1400);
    }

    #[test]
    fn relation_parses_config_and_instances() {
        let raw = serde_json::json!({
            "PacketFilterConfig": {
                "Id": "ccs-2j7o2transfer",
                "Protocol": "all",
                "SportStart": 0,
                "SportEnd": 65535,
                "Action": "drop"
            },
            "InstanceDetailList": [
                {"InstanceId": "bgp-000000xe", "EipList": ["1.2.3.4"]}
            ]
        });
        let relation: PacketFilterRelation = serde_json::from_value(raw).unwrap();
        let config = relation.packet_filter_config.unwrap();
        assert_eq!(config.id.as_deref(), Some("ccs-2j7o2transfer"));
        assert_eq!(config.match_begin, None);
        assert_eq!(
            relation.instance_detail_list[0].instance_id.as_deref(),
            Some("bgp-000000xe")
        );
    }
}
