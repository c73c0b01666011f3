//! 域名资源：`tencentcloud_dnspod_domain`，ID 就是域名本身。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{FieldSchema, ResourceData, Schema, Validation};
use crate::traits::Resource;

use super::service::DnspodService;
use super::types::CreateDomainRequest;

pub struct DnspodDomainResource;

#[async_trait]
impl Resource for DnspodDomainResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_dnspod_domain"
    }

    fn schema(&self) -> Schema {
        Schema::new([
            (
                "domain",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("Domain name to host."),
            ),
            (
                "group_id",
                FieldSchema::int()
                    .optional()
                    .force_new()
                    .desc("Domain group the domain is created in."),
            ),
            (
                "remark",
                FieldSchema::string().optional().desc("Domain remark."),
            ),
            (
                "status",
                FieldSchema::string()
                    .optional()
                    .default_value("ENABLE")
                    .validate(Validation::allowed(&["ENABLE", "PAUSE"]))
                    .desc("Resolution status of the domain. Valid values: `ENABLE`, `PAUSE`."),
            ),
            (
                "create_time",
                FieldSchema::string()
                    .computed()
                    .desc("Creation time of the domain."),
            ),
            (
                "slave_dns",
                FieldSchema::string()
                    .computed()
                    .desc("Whether the domain uses secondary DNS."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = DnspodService::new(conn);
        let domain = d.get_string("domain");
        let req = CreateDomainRequest {
            domain: domain.clone(),
            group_id: d.get_ok_int("group_id"),
        };
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service.create_domain(&req).await.map_err(retry_error)
        })
        .await?;
        d.set_id(&domain);

        // 创建接口不收状态和备注，需要补两次调用
        if d.get_string("status") == "PAUSE" {
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_domain_status(&domain, "disable")
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }
        if let Some(remark) = d.get_ok_string("remark") {
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_domain_remark(&domain, &remark)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = DnspodService::new(conn);
        let domain = d.id().to_string();
        let info = match retry::within(READ_RETRY_TIMEOUT, || async {
            service.describe_domain(&domain).await.map_err(retry_error)
        })
        .await
        {
            Ok(info) => info,
            Err(ProviderError::ResourceNotFound { .. }) => {
                d.set_id("");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        d.set("domain", info.domain.unwrap_or(domain))?;
        if let Some(group_id) = info.group_id {
            d.set("group_id", group_id)?;
        }
        // 平台用 "-" 占位表示未设置备注
        if let Some(remark) = info.remark
            && !remark.is_empty()
            && remark != "-"
        {
            d.set("remark", remark)?;
        }
        d.set("status", info.status.to_uppercase())?;
        if let Some(created_on) = info.created_on {
            d.set("create_time", created_on)?;
        }
        if let Some(slave_dns) = info.slave_dns {
            d.set("slave_dns", slave_dns)?;
        }
        Ok(())
    }

    async fn update(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = DnspodService::new(conn);
        let domain = d.id().to_string();

        if d.has_change("status") {
            // 修改接口收小写 enable/disable
            let status = if d.get_string("status") == "PAUSE" {
                "disable"
            } else {
                "enable"
            };
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_domain_status(&domain, status)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        if d.has_change("remark") {
            let remark = d.get_string("remark");
            retry::within(WRITE_RETRY_TIMEOUT, || async {
                service
                    .modify_domain_remark(&domain, &remark)
                    .await
                    .map_err(retry_error)
            })
            .await?;
        }

        self.read(conn, d).await
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let service = DnspodService::new(conn);
        let domain = d.id().to_string();
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            match service.delete_domain(&domain).await {
                // 已经不存在视为删除成功
                Ok(()) | Err(ProviderError::ResourceNotFound { .. }) => Ok(()),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttrMap, AttrValue};

    fn config(entries: &[(&str, AttrValue)]) -> AttrMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn status_defaults_to_enable() {
        let d = ResourceData::new(
            "tencentcloud_dnspod_domain",
            DnspodDomainResource.schema(),
            config(&[("domain", AttrValue::from("example.com"))]),
        )
        .unwrap();
        assert_eq!(d.get_string("status"), "ENABLE");
    }

    #[test]
    fn status_rejects_lowercase() {
        let err = ResourceData::new(
            "tencentcloud_dnspod_domain",
            DnspodDomainResource.schema(),
            config(&[
                ("domain", AttrValue::from("example.com")),
                ("status", AttrValue::from("pause")),
            ]),
        );
        assert!(err.is_err());
    }

    #[test]
    fn domain_is_required() {
        let err = ResourceData::new(
            "tencentcloud_dnspod_domain",
            DnspodDomainResource.schema(),
            AttrMap::new(),
        );
        assert!(err.is_err());
    }
}
