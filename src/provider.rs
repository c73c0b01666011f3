//! Resource and data source registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::traits::{DataSource, Resource};

/// Registry of every resource and data source enabled via feature flags.
///
/// Lookup is by the public type name (`tencentcloud_cdn_domain` etc.).
/// Handlers are stateless; the registry hands out shared [`Arc`]s.
pub struct Provider {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl Provider {
    #[must_use]
    pub fn new() -> Self {
        let mut resources: BTreeMap<&'static str, Arc<dyn Resource>> = BTreeMap::new();
        let mut data_sources: BTreeMap<&'static str, Arc<dyn DataSource>> = BTreeMap::new();

        fn add_resource(
            map: &mut BTreeMap<&'static str, Arc<dyn Resource>>,
            resource: Arc<dyn Resource>,
        ) {
            map.insert(resource.type_name(), resource);
        }
        fn add_data_source(
            map: &mut BTreeMap<&'static str, Arc<dyn DataSource>>,
            source: Arc<dyn DataSource>,
        ) {
            map.insert(source.type_name(), source);
        }

        #[cfg(feature = "cdn")]
        {
            use crate::services::cdn;
            add_resource(&mut resources, Arc::new(cdn::CdnDomainResource));
            add_resource(&mut resources, Arc::new(cdn::CdnUrlPushResource));
            add_data_source(&mut data_sources, Arc::new(cdn::CdnDomainsDataSource));
        }

        #[cfg(feature = "dayu")]
        {
            use crate::services::dayu;
            add_resource(&mut resources, Arc::new(dayu::DayuL4RuleResource));
            add_resource(&mut resources, Arc::new(dayu::DayuL7RuleResource));
            add_resource(&mut resources, Arc::new(dayu::DayuDdosPolicyResource));
            add_resource(
                &mut resources,
                Arc::new(dayu::DayuDdosPolicyAttachmentResource),
            );
            add_data_source(&mut data_sources, Arc::new(dayu::DayuL7RulesDataSource));
        }

        #[cfg(feature = "dnspod")]
        {
            use crate::services::dnspod;
            add_resource(&mut resources, Arc::new(dnspod::DnspodDomainResource));
            add_resource(&mut resources, Arc::new(dnspod::DnspodRecordResource));
            add_data_source(&mut data_sources, Arc::new(dnspod::DnspodRecordsDataSource));
        }

        #[cfg(feature = "eb")]
        {
            use crate::services::eb;
            add_resource(&mut resources, Arc::new(eb::EbEventBusResource));
            add_resource(&mut resources, Arc::new(eb::EbEventRuleResource));
            add_resource(&mut resources, Arc::new(eb::EbEventTransformResource));
            add_data_source(&mut data_sources, Arc::new(eb::EbEventBusesDataSource));
        }

        #[cfg(feature = "sqlserver")]
        {
            use crate::services::sqlserver;
            add_resource(&mut resources, Arc::new(sqlserver::SqlserverInstanceResource));
            add_resource(
                &mut resources,
                Arc::new(sqlserver::SqlserverBasicInstanceResource),
            );
            add_data_source(
                &mut data_sources,
                Arc::new(sqlserver::SqlserverInstancesDataSource),
            );
        }

        #[cfg(feature = "mongodb")]
        {
            use crate::services::mongodb;
            add_resource(&mut resources, Arc::new(mongodb::MongodbInstanceResource));
            add_resource(
                &mut resources,
                Arc::new(mongodb::MongodbShardingInstanceResource),
            );
            add_data_source(
                &mut data_sources,
                Arc::new(mongodb::MongodbInstancesDataSource),
            );
        }

        #[cfg(feature = "antiddos")]
        {
            use crate::services::antiddos;
            add_resource(
                &mut resources,
                Arc::new(antiddos::AntiddosPacketFilterConfigResource),
            );
        }

        Self {
            resources,
            data_sources,
        }
    }

    /// Look up a resource handler by type name.
    #[must_use]
    pub fn resource(&self, type_name: &str) -> Option<Arc<dyn Resource>> {
        self.resources.get(type_name).cloned()
    }

    /// Look up a data source handler by type name.
    #[must_use]
    pub fn data_source(&self, type_name: &str) -> Option<Arc<dyn DataSource>> {
        self.data_sources.get(type_name).cloned()
    }

    /// Enabled resource type names, sorted.
    #[must_use]
    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Enabled data source type names, sorted.
    #[must_use]
    pub fn data_source_types(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_keys_match_type_names() {
        let p = Provider::new();
        for (key, resource) in &p.resources {
            assert_eq!(*key, resource.type_name());
        }
        for (key, source) in &p.data_sources {
            assert_eq!(*key, source.type_name());
        }
    }

    #[test]
    fn type_names_are_namespaced() {
        let p = Provider::new();
        for name in p.resource_types() {
            assert!(name.starts_with("tencentcloud_"), "bad type name: {name}");
        }
        for name in p.data_source_types() {
            assert!(name.starts_with("tencentcloud_"), "bad type name: {name}");
        }
    }

    #[cfg(feature = "cdn")]
    #[test]
    fn cdn_types_registered() {
        let p = Provider::new();
        assert!(p.resource("tencentcloud_cdn_domain").is_some());
        assert!(p.resource("tencentcloud_cdn_url_push").is_some());
        assert!(p.data_source("tencentcloud_cdn_domains").is_some());
    }

    #[cfg(feature = "dayu")]
    #[test]
    fn dayu_types_registered() {
        let p = Provider::new();
        assert!(p.resource("tencentcloud_dayu_l4_rule").is_some());
        assert!(p.resource("tencentcloud_dayu_l7_rule").is_some());
        assert!(p.resource("tencentcloud_dayu_ddos_policy").is_some());
        assert!(p.resource("tencentcloud_dayu_ddos_policy_attachment").is_some());
        assert!(p.data_source("tencentcloud_dayu_l7_rules").is_some());
    }

    #[cfg(feature = "dnspod")]
    #[test]
    fn dnspod_types_registered() {
        let p = Provider::new();
        assert!(p.resource("tencentcloud_dnspod_domain").is_some());
        assert!(p.resource("tencentcloud_dnspod_record").is_some());
        assert!(p.data_source("tencentcloud_dnspod_records").is_some());
    }

    #[cfg(feature = "eb")]
    #[test]
    fn eb_types_registered() {
        let p = Provider::new();
        assert!(p.resource("tencentcloud_eb_event_bus").is_some());
        assert!(p.resource("tencentcloud_eb_event_rule").is_some());
        assert!(p.resource("tencentcloud_eb_event_transform").is_some());
        assert!(p.data_source("tencentcloud_eb_event_buses").is_some());
    }

    #[cfg(feature = "sqlserver")]
    #[test]
    fn sqlserver_types_registered() {
        let p = Provider::new();
        assert!(p.resource("tencentcloud_sqlserver_instance").is_some());
        assert!(p.resource("tencentcloud_sqlserver_basic_instance").is_some());
        assert!(p.data_source("tencentcloud_sqlserver_instances").is_some());
    }

    #[cfg(feature = "mongodb")]
    #[test]
    fn mongodb_types_registered() {
        let p = Provider::new();
        assert!(p.resource("tencentcloud_mongodb_instance").is_some());
        assert!(p.resource("tencentcloud_mongodb_sharding_instance").is_some());
        assert!(p.data_source("tencentcloud_mongodb_instances").is_some());
    }

    #[cfg(feature = "antiddos")]
    #[test]
    fn antiddos_types_registered() {
        let p = Provider::new();
        assert!(
            p.resource("tencentcloud_antiddos_packet_filter_config")
                .is_some()
        );
    }

    #[test]
    fn unknown_type_returns_none() {
        let p = Provider::new();
        assert!(p.resource("tencentcloud_no_such_thing").is_none());
        assert!(p.data_source("tencentcloud_no_such_thing").is_none());
    }
}
