//! # tencentcloud-provider
//!
//! A declarative resource management library for Tencent Cloud services.
//! Each cloud object is described by an attribute schema and driven through
//! create/read/update/delete handlers, with time-bounded retries and status
//! polling built in.
//!
//! ## Supported Products
//!
//! | Product | Feature Flag | Resources |
//! |---------|-------------|-----------|
//! | [CDN](https://cloud.tencent.com/product/cdn) | `cdn` | `tencentcloud_cdn_domain`, `tencentcloud_cdn_url_push` |
//! | Anti-DDoS (classic) | `dayu` | `tencentcloud_dayu_l4_rule`, `tencentcloud_dayu_l7_rule`, `tencentcloud_dayu_ddos_policy`, `tencentcloud_dayu_ddos_policy_attachment` |
//! | Anti-DDoS (new-gen) | `antiddos` | `tencentcloud_antiddos_packet_filter_config` |
//! | [DNSPod](https://www.dnspod.cn/) | `dnspod` | `tencentcloud_dnspod_domain`, `tencentcloud_dnspod_record` |
//! | [EventBridge](https://cloud.tencent.com/product/eb) | `eb` | `tencentcloud_eb_event_bus`, `tencentcloud_eb_event_rule`, `tencentcloud_eb_event_transform` |
//! | [SQL Server](https://cloud.tencent.com/product/sqlserver) | `sqlserver` | `tencentcloud_sqlserver_instance`, `tencentcloud_sqlserver_basic_instance` |
//! | [MongoDB](https://cloud.tencent.com/product/mongodb) | `mongodb` | `tencentcloud_mongodb_instance`, `tencentcloud_mongodb_sharding_instance` |
//!
//! ## Feature Flags
//!
//! ### Product Selection
//!
//! - **`all-products`** *(default)*: enable every product listed above.
//! - Individual flags (`cdn`, `dayu`, `dnspod`, `eb`, `sqlserver`, `mongodb`,
//!   `antiddos`) enable one product each.
//!
//! ### TLS Backend
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for cross-compilation and musl targets.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! tencentcloud-provider = { version = "0.1", features = ["all-products"] }
//! ```
//!
//! Or enable only the products you need:
//!
//! ```toml
//! [dependencies]
//! tencentcloud-provider = { version = "0.1", default-features = false, features = ["dnspod", "rustls"] }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tencentcloud_provider::{AttrMap, Connection, Provider, ResourceData};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Credentials from TENCENTCLOUD_* environment variables
//!     let conn = Connection::from_env()?;
//!     let provider = Provider::new();
//!
//!     // 2. Look up a resource handler by type name
//!     let handler = provider
//!         .resource("tencentcloud_dnspod_record")
//!         .expect("dnspod feature enabled");
//!
//!     // 3. Describe the desired object
//!     let mut config = AttrMap::new();
//!     config.insert("domain".into(), "example.com".into());
//!     config.insert("record_type".into(), "A".into());
//!     config.insert("record_line".into(), "默认".into());
//!     config.insert("value".into(), "1.2.3.4".into());
//!     let mut d = ResourceData::new(handler.type_name(), handler.schema(), config)?;
//!
//!     // 4. Create it and keep the composite ID for later operations
//!     handler.create(&conn, &mut d).await?;
//!     println!("created {}", d.id());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError). The
//! error enum provides structured variants for common failure modes:
//!
//! - [`ProviderError::InvalidCredentials`]: authentication failed
//! - [`ProviderError::ResourceNotFound`]: the remote object does not exist
//! - [`ProviderError::RateLimited`]: API rate limit exceeded (retryable)
//! - [`ProviderError::NetworkError`]: network connectivity issue (retryable)
//!
//! Transient errors are retried inside the handlers with exponential backoff
//! until a per-operation deadline (3 minutes for reads, 5 minutes for writes);
//! see [`retry`] for the classification rules.

pub mod retry;

mod client;
mod connect;
mod error;
mod provider;
mod ratelimit;
mod schema;
mod services;
mod traits;
mod utils;

// Re-export error types
pub use error::{ErrorCollector, ProviderError, RETRYABLE_ERROR_CODES, Result, SchemaError};

// Re-export connection types
pub use connect::{
    Connection, ConnectionBuilder, ENV_REGION, ENV_SECRET_ID, ENV_SECRET_KEY, ENV_SECURITY_TOKEN,
};

// Re-export the registry and core traits
pub use provider::Provider;
pub use traits::{DataSource, Resource};

// Re-export schema types
pub use schema::{
    AttrMap, AttrValue, Elem, FieldSchema, FieldType, ID_SEPARATOR, ResourceData, Schema,
    Validation, block_string, build_composite_id, data_resource_id_hash, first_block,
    split_composite_id, write_result_output,
};

// Re-export concrete handlers (behind feature flags)
#[cfg(feature = "cdn")]
pub use services::cdn::{CdnDomainResource, CdnDomainsDataSource, CdnUrlPushResource};

#[cfg(feature = "dayu")]
pub use services::dayu::{
    DayuDdosPolicyAttachmentResource, DayuDdosPolicyResource, DayuL4RuleResource,
    DayuL7RuleResource, DayuL7RulesDataSource,
};

#[cfg(feature = "dnspod")]
pub use services::dnspod::{DnspodDomainResource, DnspodRecordResource, DnspodRecordsDataSource};

#[cfg(feature = "eb")]
pub use services::eb::{
    EbEventBusResource, EbEventBusesDataSource, EbEventRuleResource, EbEventTransformResource,
};

#[cfg(feature = "sqlserver")]
pub use services::sqlserver::{
    SqlserverBasicInstanceResource, SqlserverInstanceResource, SqlserverInstancesDataSource,
};

#[cfg(feature = "mongodb")]
pub use services::mongodb::{
    MongodbInstanceResource, MongodbInstancesDataSource, MongodbShardingInstanceResource,
};

#[cfg(feature = "antiddos")]
pub use services::antiddos::AntiddosPacketFilterConfigResource;
