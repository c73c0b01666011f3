//! 产品模块：每个云产品一个子模块，含接入点、线上结构体、服务层与
//! 资源/数据源处理器。

#[cfg(feature = "antiddos")]
pub mod antiddos;
#[cfg(feature = "cdn")]
pub mod cdn;
#[cfg(feature = "dayu")]
pub mod dayu;
#[cfg(feature = "dnspod")]
pub mod dnspod;
#[cfg(feature = "eb")]
pub mod eb;
#[cfg(feature = "mongodb")]
pub mod mongodb;
#[cfg(feature = "sqlserver")]
pub mod sqlserver;

// 标签是横切能力，挂在需要它的产品下，不单独注册资源
#[cfg(any(feature = "cdn", feature = "mongodb", feature = "sqlserver"))]
pub(crate) mod tag;
