//! 大禹服务层：消化经典接口的信封与怪癖，向上暴露正常的 Result 语义。
//!
//! 三个怪癖集中处理：`Success` 信封（HTTP 恒 200）、不存在的防护实例
//! 报 `InvalidParameterValue`（按查空处理）、创建接口不回规则 ID（按
//! 域名/规则名回查）。

use crate::client::ApiClient;
use crate::connect::Connection;
use crate::error::{ErrorContext, ProviderError, RawApiError, Result, map_api_error};

use super::types::{
    CreateDdosPolicyRequest, CreateDdosPolicyResponse, CreateL4HealthConfigRequest,
    CreateL4RulesRequest, CreateL7HealthConfigRequest, CreateL7RulesRequest,
    DdosPolicy, DeleteDdosPolicyRequest, DeleteL4RulesRequest, DeleteL7RulesRequest,
    DescribeDdosPolicyRequest, DescribeDdosPolicyResponse, DescribeL4RulesRequest,
    DescribeL4RulesResponse, DescribeL7RulesRequest, DescribeL7RulesResponse, L4HealthConfig,
    L4RuleEntry, L4RuleHealth, L7HealthConfig, L7RuleEntry, L7RuleHealth,
    ModifyCCHostProtectionRequest, ModifyCCThresholdRequest, ModifyDdosPolicyNameRequest,
    ModifyDdosPolicyRequest, ModifyL4KeepTimeRequest, ModifyL4RulesRequest, ModifyL7RulesRequest,
    ModifyResBindDdosPolicyRequest, SuccessCode, SuccessResponse,
};
use super::{
    CC_THRESHOLD_OFF, CC_THRESHOLD_ON, CODE_ABSENT, ENDPOINT, L7_PROTOCOL_HTTP, RULE_PAGE_SIZE,
    SUCCESS_CODE,
};

pub(crate) struct DayuService {
    client: ApiClient,
}

impl DayuService {
    pub fn new(conn: &Connection) -> Self {
        Self {
            client: conn.client(ENDPOINT),
        }
    }

    // ============ 七层规则 ============

    /// 创建接口只回信封，规则 ID 要按域名回查。域名在实例下唯一，回查
    /// 命中超过一条说明实例被并发改过，直接报错。
    pub async fn create_l7_rule(
        &self,
        business: &str,
        resource_id: &str,
        rule: L7RuleEntry,
    ) -> Result<String> {
        let domain = rule.domain.clone().unwrap_or_default();
        let req = CreateL7RulesRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            rules: vec![rule],
        };
        let resp: SuccessResponse = self
            .client
            .request("CreateL7Rules", &req, ErrorContext::resource(resource_id))
            .await?;
        ensure_success("CreateL7Rules", resp)?;

        let (rules, _) = self
            .list_l7_rules(business, resource_id, Some(&domain))
            .await?;
        match rules.as_slice() {
            [rule] => rule.rule_id.clone().ok_or_else(|| ProviderError::ParseError {
                product: "dayu".to_string(),
                detail: format!("created rule for domain {domain} carries no rule id"),
            }),
            _ => Err(ProviderError::ParseError {
                product: "dayu".to_string(),
                detail: format!("domain {domain} maps to {} rules after create", rules.len()),
            }),
        }
    }

    /// 翻页拉取实例下的全部七层规则与健康检查视图。
    pub async fn list_l7_rules(
        &self,
        business: &str,
        resource_id: &str,
        domain: Option<&str>,
    ) -> Result<(Vec<L7RuleEntry>, Vec<L7RuleHealth>)> {
        let mut rules = Vec::new();
        let mut healths = Vec::new();
        let mut offset = 0;
        loop {
            let req = DescribeL7RulesRequest {
                business: business.to_string(),
                id: resource_id.to_string(),
                domain: domain.map(ToString::to_string),
                offset,
                limit: RULE_PAGE_SIZE,
            };
            // 动作名里的 Describle 是平台原样，不是笔误
            let page: DescribeL7RulesResponse = match self
                .client
                .request("DescribleL7Rules", &req, ErrorContext::resource(resource_id))
                .await
            {
                Ok(page) => page,
                Err(e) if e.api_code() == Some(CODE_ABSENT) => return Ok((Vec::new(), Vec::new())),
                Err(e) => return Err(e),
            };
            let total = page.total.unwrap_or(0);
            let items = page.rules.unwrap_or_default();
            let fetched = i64::try_from(items.len()).unwrap_or(i64::MAX);
            rules.extend(items);
            healths.extend(page.healths.unwrap_or_default());
            if fetched < RULE_PAGE_SIZE || i64::try_from(rules.len()).unwrap_or(i64::MAX) >= total
            {
                break;
            }
            offset += RULE_PAGE_SIZE;
        }
        Ok((rules, healths))
    }

    /// 按规则 ID 精确取一条规则，健康检查视图按 `RuleId` 对齐。
    pub async fn describe_l7_rule(
        &self,
        business: &str,
        resource_id: &str,
        rule_id: &str,
    ) -> Result<Option<(L7RuleEntry, Option<L7RuleHealth>)>> {
        let (rules, healths) = self.list_l7_rules(business, resource_id, None).await?;
        let Some(rule) = rules
            .into_iter()
            .find(|r| r.rule_id.as_deref() == Some(rule_id))
        else {
            return Ok(None);
        };
        let health = healths
            .into_iter()
            .find(|h| h.rule_id.as_deref() == Some(rule_id));
        Ok(Some((rule, health)))
    }

    pub async fn modify_l7_rule(
        &self,
        business: &str,
        resource_id: &str,
        rule: L7RuleEntry,
    ) -> Result<()> {
        let req = ModifyL7RulesRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            rule,
        };
        let resp: SuccessResponse = self
            .client
            .request("ModifyL7Rules", &req, ErrorContext::resource(resource_id))
            .await?;
        ensure_success("ModifyL7Rules", resp)
    }

    pub async fn delete_l7_rule(
        &self,
        business: &str,
        resource_id: &str,
        rule_id: &str,
    ) -> Result<()> {
        let req = DeleteL7RulesRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            rule_id_list: vec![rule_id.to_string()],
        };
        let resp: SuccessResponse = self
            .client
            .request("DeleteL7Rules", &req, ErrorContext::resource(rule_id))
            .await?;
        ensure_success("DeleteL7Rules", resp)
    }

    /// 下发健康检查配置，关闭时同样全量下发（`enable` 置 0）。
    pub async fn set_l7_health(
        &self,
        business: &str,
        resource_id: &str,
        config: L7HealthConfig,
    ) -> Result<()> {
        let req = CreateL7HealthConfigRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            health_config: vec![config],
        };
        let resp: SuccessResponse = self
            .client
            .request("CreateL7HealthConfig", &req, ErrorContext::resource(resource_id))
            .await?;
        ensure_success("CreateL7HealthConfig", resp)
    }

    /// 切换一条七层规则的 CC 防护。http 有专门的开关接口，https 没有，
    /// 用告警阈值 0/非 0 代替。
    pub async fn set_l7_cc_switch(
        &self,
        business: &str,
        resource_id: &str,
        rule_id: &str,
        protocol: &str,
        on: bool,
    ) -> Result<()> {
        if protocol == L7_PROTOCOL_HTTP {
            let req = ModifyCCHostProtectionRequest {
                business: business.to_string(),
                id: resource_id.to_string(),
                rule_id: rule_id.to_string(),
                method: if on { "open" } else { "close" }.to_string(),
            };
            let resp: SuccessResponse = self
                .client
                .request("ModifyCCHostProtection", &req, ErrorContext::resource(rule_id))
                .await?;
            ensure_success("ModifyCCHostProtection", resp)
        } else {
            let req = ModifyCCThresholdRequest {
                business: business.to_string(),
                id: resource_id.to_string(),
                rule_id: rule_id.to_string(),
                protocol: protocol.to_string(),
                threshold: if on { CC_THRESHOLD_ON } else { CC_THRESHOLD_OFF },
            };
            let resp: SuccessResponse = self
                .client
                .request("ModifyCCThreshold", &req, ErrorContext::resource(rule_id))
                .await?;
            ensure_success("ModifyCCThreshold", resp)
        }
    }

    // ============ 四层规则 ============

    /// 创建后按规则名回查 ID，规则名在实例下唯一。
    pub async fn create_l4_rule(
        &self,
        business: &str,
        resource_id: &str,
        rule: L4RuleEntry,
    ) -> Result<String> {
        let name = rule.rule_name.clone().unwrap_or_default();
        let req = CreateL4RulesRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            rules: vec![rule],
        };
        let resp: SuccessResponse = self
            .client
            .request("CreateL4Rules", &req, ErrorContext::resource(resource_id))
            .await?;
        ensure_success("CreateL4Rules", resp)?;

        let (rules, _) = self.list_l4_rules(business, resource_id).await?;
        let matched: Vec<_> = rules
            .into_iter()
            .filter(|r| r.rule_name.as_deref() == Some(name.as_str()))
            .collect();
        match matched.as_slice() {
            [rule] => rule.rule_id.clone().ok_or_else(|| ProviderError::ParseError {
                product: "dayu".to_string(),
                detail: format!("created rule {name} carries no rule id"),
            }),
            _ => Err(ProviderError::ParseError {
                product: "dayu".to_string(),
                detail: format!("rule name {name} maps to {} rules after create", matched.len()),
            }),
        }
    }

    pub async fn list_l4_rules(
        &self,
        business: &str,
        resource_id: &str,
    ) -> Result<(Vec<L4RuleEntry>, Vec<L4RuleHealth>)> {
        let mut rules = Vec::new();
        let mut healths = Vec::new();
        let mut offset = 0;
        loop {
            let req = DescribeL4RulesRequest {
                business: business.to_string(),
                id: resource_id.to_string(),
                offset,
                limit: RULE_PAGE_SIZE,
            };
            let page: DescribeL4RulesResponse = match self
                .client
                .request("DescribleL4Rules", &req, ErrorContext::resource(resource_id))
                .await
            {
                Ok(page) => page,
                Err(e) if e.api_code() == Some(CODE_ABSENT) => return Ok((Vec::new(), Vec::new())),
                Err(e) => return Err(e),
            };
            let total = page.total.unwrap_or(0);
            let items = page.rules.unwrap_or_default();
            let fetched = i64::try_from(items.len()).unwrap_or(i64::MAX);
            rules.extend(items);
            healths.extend(page.healths.unwrap_or_default());
            if fetched < RULE_PAGE_SIZE || i64::try_from(rules.len()).unwrap_or(i64::MAX) >= total
            {
                break;
            }
            offset += RULE_PAGE_SIZE;
        }
        Ok((rules, healths))
    }

    pub async fn describe_l4_rule(
        &self,
        business: &str,
        resource_id: &str,
        rule_id: &str,
    ) -> Result<Option<(L4RuleEntry, Option<L4RuleHealth>)>> {
        let (rules, healths) = self.list_l4_rules(business, resource_id).await?;
        let Some(rule) = rules
            .into_iter()
            .find(|r| r.rule_id.as_deref() == Some(rule_id))
        else {
            return Ok(None);
        };
        let health = healths
            .into_iter()
            .find(|h| h.rule_id.as_deref() == Some(rule_id));
        Ok(Some((rule, health)))
    }

    pub async fn modify_l4_rule(
        &self,
        business: &str,
        resource_id: &str,
        rule: L4RuleEntry,
    ) -> Result<()> {
        let req = ModifyL4RulesRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            rule,
        };
        let resp: SuccessResponse = self
            .client
            .request("ModifyL4Rules", &req, ErrorContext::resource(resource_id))
            .await?;
        ensure_success("ModifyL4Rules", resp)
    }

    pub async fn delete_l4_rule(
        &self,
        business: &str,
        resource_id: &str,
        rule_id: &str,
    ) -> Result<()> {
        let req = DeleteL4RulesRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            rule_id_list: vec![rule_id.to_string()],
        };
        let resp: SuccessResponse = self
            .client
            .request("DeleteL4Rules", &req, ErrorContext::resource(rule_id))
            .await?;
        ensure_success("DeleteL4Rules", resp)
    }

    pub async fn set_l4_health(
        &self,
        business: &str,
        resource_id: &str,
        config: L4HealthConfig,
    ) -> Result<()> {
        let req = CreateL4HealthConfigRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            health_config: vec![config],
        };
        let resp: SuccessResponse = self
            .client
            .request("CreateL4HealthConfig", &req, ErrorContext::resource(resource_id))
            .await?;
        ensure_success("CreateL4HealthConfig", resp)
    }

    pub async fn set_l4_session(
        &self,
        business: &str,
        resource_id: &str,
        rule_id: &str,
        enable: bool,
        keep_time: i64,
    ) -> Result<()> {
        let req = ModifyL4KeepTimeRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            rule_id: rule_id.to_string(),
            keep_enable: i64::from(enable),
            keep_time,
        };
        let resp: SuccessResponse = self
            .client
            .request("ModifyL4KeepTime", &req, ErrorContext::resource(rule_id))
            .await?;
        ensure_success("ModifyL4KeepTime", resp)
    }

    // ============ DDoS 高级策略 ============

    pub async fn create_ddos_policy(&self, req: &CreateDdosPolicyRequest) -> Result<String> {
        let resp: CreateDdosPolicyResponse = self
            .client
            .request("CreateDDoSPolicy", req, ErrorContext::default())
            .await?;
        match resp.policy_id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ProviderError::ParseError {
                product: "dayu".to_string(),
                detail: "CreateDDoSPolicy response carries no policy id".to_string(),
            }),
        }
    }

    /// 实例类型下的全部策略。没有服务端过滤，调用方自己挑。
    pub async fn list_ddos_policies(&self, business: &str) -> Result<Vec<DdosPolicy>> {
        let req = DescribeDdosPolicyRequest {
            business: business.to_string(),
        };
        let resp: DescribeDdosPolicyResponse = match self
            .client
            .request("DescribeDDoSPolicy", &req, ErrorContext::default())
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.api_code() == Some(CODE_ABSENT) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(resp.ddos_policy_list.unwrap_or_default())
    }

    pub async fn describe_ddos_policy(
        &self,
        business: &str,
        policy_id: &str,
    ) -> Result<Option<DdosPolicy>> {
        let policies = self.list_ddos_policies(business).await?;
        Ok(policies
            .into_iter()
            .find(|p| p.policy_id.as_deref() == Some(policy_id)))
    }

    pub async fn modify_ddos_policy(&self, req: &ModifyDdosPolicyRequest) -> Result<()> {
        let ctx = ErrorContext::resource(&req.policy_id);
        let resp: SuccessResponse = self.client.request("ModifyDDoSPolicy", req, ctx).await?;
        ensure_success("ModifyDDoSPolicy", resp)
    }

    pub async fn modify_ddos_policy_name(
        &self,
        business: &str,
        policy_id: &str,
        name: &str,
    ) -> Result<()> {
        let req = ModifyDdosPolicyNameRequest {
            business: business.to_string(),
            policy_id: policy_id.to_string(),
            name: name.to_string(),
        };
        let resp: SuccessResponse = self
            .client
            .request("ModifyDDoSPolicyName", &req, ErrorContext::resource(policy_id))
            .await?;
        ensure_success("ModifyDDoSPolicyName", resp)
    }

    pub async fn delete_ddos_policy(&self, business: &str, policy_id: &str) -> Result<()> {
        let req = DeleteDdosPolicyRequest {
            business: business.to_string(),
            policy_id: policy_id.to_string(),
        };
        let resp: SuccessResponse = self
            .client
            .request("DeleteDDoSPolicy", &req, ErrorContext::resource(policy_id))
            .await?;
        ensure_success("DeleteDDoSPolicy", resp)
    }

    // ============ 策略绑定 ============

    pub async fn bind_ddos_policy(
        &self,
        business: &str,
        resource_id: &str,
        policy_id: &str,
    ) -> Result<()> {
        let resp = self
            .modify_policy_binding(business, resource_id, policy_id, "bind")
            .await?;
        ensure_success("ModifyResBindDDoSPolicy", resp)
    }

    /// 解绑幂等：绑定已不存在时平台在信封里报 resource not exist。
    pub async fn unbind_ddos_policy(
        &self,
        business: &str,
        resource_id: &str,
        policy_id: &str,
    ) -> Result<()> {
        let resp = self
            .modify_policy_binding(business, resource_id, policy_id, "unbind")
            .await?;
        let success = check_envelope("ModifyResBindDDoSPolicy", resp)?;
        if success.code == SUCCESS_CODE
            || (success.code == CODE_ABSENT
                && success.message.as_deref() == Some("resource not exist"))
        {
            return Ok(());
        }
        Err(envelope_error(success))
    }

    async fn modify_policy_binding(
        &self,
        business: &str,
        resource_id: &str,
        policy_id: &str,
        method: &str,
    ) -> Result<SuccessResponse> {
        let req = ModifyResBindDdosPolicyRequest {
            business: business.to_string(),
            id: resource_id.to_string(),
            policy_id: policy_id.to_string(),
            method: method.to_string(),
        };
        self.client
            .request("ModifyResBindDDoSPolicy", &req, ErrorContext::resource(resource_id))
            .await
    }
}

/// 经典接口 HTTP 层恒回 200，真正的结果码在 `Success` 信封里。
fn check_envelope(action: &str, resp: SuccessResponse) -> Result<SuccessCode> {
    resp.success.ok_or_else(|| ProviderError::ParseError {
        product: "dayu".to_string(),
        detail: format!("{action} response is missing the Success envelope"),
    })
}

/// 信封里的失败码走统一错误映射，跟 HTTP 层的报错同等分类。
fn envelope_error(success: SuccessCode) -> ProviderError {
    map_api_error(
        "dayu",
        RawApiError::with_code(success.code, success.message.unwrap_or_default()),
        ErrorContext::default(),
    )
}

fn ensure_success(action: &str, resp: SuccessResponse) -> Result<()> {
    let success = check_envelope(action, resp)?;
    if success.code == SUCCESS_CODE {
        return Ok(());
    }
    Err(envelope_error(success))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(code: &str, message: Option<&str>) -> SuccessResponse {
        SuccessResponse {
            success: Some(SuccessCode {
                code: code.to_string(),
                message: message.map(ToString::to_string),
            }),
        }
    }

    #[test]
    fn envelope_failure_keeps_raw_code() {
        let err = ensure_success("CreateL7Rules", envelope("InvalidParameter", Some("bad"))).unwrap_err();
        assert_eq!(err.api_code(), Some("InvalidParameter"));
    }

    #[test]
    fn missing_envelope_is_a_parse_error() {
        let err = ensure_success("CreateL7Rules", SuccessResponse::default()).unwrap_err();
        assert!(matches!(err, ProviderError::ParseError { .. }), "got {err:?}");
    }

    #[test]
    fn retryable_envelope_code_is_classified() {
        let err = ensure_success("ModifyL7Rules", envelope("ResourceBusy", None)).unwrap_err();
        assert!(err.is_retryable(), "got {err:?}");
    }
}
