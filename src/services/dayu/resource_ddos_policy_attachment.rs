//! 策略绑定资源：`tencentcloud_dayu_ddos_policy_attachment`，
//! ID 形如 `bgpip-00000001#bgpip#policy-000000001`。
//!
//! 绑定本身没有查询接口，是否生效要看策略详情里的绑定资源列表。

use async_trait::async_trait;

use crate::connect::Connection;
use crate::error::{ProviderError, Result};
use crate::retry::{self, READ_RETRY_TIMEOUT, Retry, WRITE_RETRY_TIMEOUT, retry_error};
use crate::schema::{
    FieldSchema, ResourceData, Schema, Validation, build_composite_id, split_composite_id,
};
use crate::traits::Resource;

use super::service::DayuService;
use super::{
    RESOURCE_TYPE_BGP, RESOURCE_TYPE_BGPIP, RESOURCE_TYPE_BGP_MULTIP, RESOURCE_TYPE_NET,
};

pub struct DayuDdosPolicyAttachmentResource;

async fn attachment_bound(
    service: &DayuService,
    resource_type: &str,
    resource_id: &str,
    policy_id: &str,
) -> Result<bool> {
    let policy = service.describe_ddos_policy(resource_type, policy_id).await?;
    Ok(policy.is_some_and(|p| {
        p.bound_resources
            .unwrap_or_default()
            .iter()
            .any(|r| r == resource_id)
    }))
}

#[async_trait]
impl Resource for DayuDdosPolicyAttachmentResource {
    fn type_name(&self) -> &'static str {
        "tencentcloud_dayu_ddos_policy_attachment"
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
                    .desc("Type of the protection instance."),
            ),
            (
                "resource_id",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("ID of the protection instance the policy is bound to."),
            ),
            (
                "policy_id",
                FieldSchema::string()
                    .required()
                    .force_new()
                    .desc("ID of the bound policy."),
            ),
        ])
    }

    async fn create(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let resource_type = d.get_string("resource_type");
        let resource_id = d.get_string("resource_id");
        let policy_id = d.get_string("policy_id");

        let service = DayuService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .bind_ddos_policy(&resource_type, &resource_id, &policy_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        d.set_id(build_composite_id(&[&resource_id, &resource_type, &policy_id]));

        // 绑定异步生效，等它在策略的绑定列表里出现
        retry::within(READ_RETRY_TIMEOUT * 5, || async {
            match attachment_bound(&service, &resource_type, &resource_id, &policy_id).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(Retry::not_ready(
                    "dayu",
                    format!("policy {policy_id} is not yet bound to {resource_id}"),
                )),
                Err(e) => Err(retry_error(e)),
            }
        })
        .await?;

        self.read(conn, d).await
    }

    async fn read(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 3)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (resource_id, resource_type, policy_id) =
            (parts[0].clone(), parts[1].clone(), parts[2].clone());

        let service = DayuService::new(conn);
        let bound = retry::within(READ_RETRY_TIMEOUT, || async {
            attachment_bound(&service, &resource_type, &resource_id, &policy_id)
                .await
                .map_err(retry_error)
        })
        .await?;
        if !bound {
            d.set_id("");
            return Ok(());
        }

        d.set("resource_type", resource_type)?;
        d.set("resource_id", resource_id)?;
        d.set("policy_id", policy_id)?;
        Ok(())
    }

    async fn delete(&self, conn: &Connection, d: &mut ResourceData) -> Result<()> {
        let parts = split_composite_id(d.id(), 3)
            .map_err(|e| ProviderError::from_schema(self.type_name(), e))?;
        let (resource_id, resource_type, policy_id) =
            (parts[0].clone(), parts[1].clone(), parts[2].clone());

        let service = DayuService::new(conn);
        retry::within(WRITE_RETRY_TIMEOUT, || async {
            service
                .unbind_ddos_policy(&resource_type, &resource_id, &policy_id)
                .await
                .map_err(retry_error)
        })
        .await?;

        retry::within(READ_RETRY_TIMEOUT * 5, || async {
            match attachment_bound(&service, &resource_type, &resource_id, &policy_id).await {
                Ok(false) => Ok(()),
                Ok(true) => Err(Retry::not_ready(
                    "dayu",
                    format!("policy {policy_id} is still bound to {resource_id}"),
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
    use crate::schema::{AttrMap, AttrValue};

    #[test]
    fn all_arguments_force_replacement() {
        let schema = DayuDdosPolicyAttachmentResource.schema();
        for (_, field) in schema.iter() {
            assert!(field.force_new);
        }
    }

    #[test]
    fn resource_type_vocabulary_enforced() {
        let mut config = AttrMap::new();
        config.insert("resource_type".to_string(), AttrValue::from("cvm"));
        config.insert("resource_id".to_string(), AttrValue::from("bgpip-00000001"));
        config.insert("policy_id".to_string(), AttrValue::from("policy-1"));
        assert!(
            ResourceData::new(
                "tencentcloud_dayu_ddos_policy_attachment",
                DayuDdosPolicyAttachmentResource.schema(),
                config,
            )
            .is_err()
        );
    }
}
