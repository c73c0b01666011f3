//! 腾讯云 API 通用客户端（TC3-HMAC-SHA256 签名 + JSON POST）
//!
//! 每个产品的 API 都走同一条路径：序列化请求体、限频、签名、POST 到
//! `<service>.tencentcloudapi.com`、拆 `Response` 信封、映射平台错误码。
//! 客户端只发一次请求，重试由资源层的 [`crate::retry::within`] 负责。

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::connect::Connection;
use crate::error::{ErrorContext, ProviderError, RawApiError, Result, map_api_error};
use crate::ratelimit;
use crate::utils::hmac_sha256;
use crate::utils::log_sanitizer::{mask_sensitive, truncate_for_log};

/// 产品接入点：签名服务名、主机与 API 版本。
#[derive(Debug, Clone, Copy)]
pub(crate) struct Endpoint {
    pub service: &'static str,
    pub host: &'static str,
    pub version: &'static str,
}

/// 单个产品的已签名请求客户端。
#[derive(Clone)]
pub(crate) struct ApiClient {
    http: reqwest::Client,
    secret_id: String,
    secret_key: String,
    token: Option<String>,
    region: String,
    endpoint: Endpoint,
}

/// 腾讯云响应信封。业务字段与 `Error`/`RequestId` 平铺在 `Response` 里，
/// 先整体取出再二次反序列化，避免 flatten 的类型陷阱。
#[derive(serde::Deserialize)]
struct ApiEnvelope {
    #[serde(rename = "Response")]
    response: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct WireError {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message")]
    message: String,
}

impl ApiClient {
    pub fn new(conn: &Connection, endpoint: Endpoint) -> Self {
        Self {
            http: conn.http().clone(),
            secret_id: conn.secret_id().to_string(),
            secret_key: conn.secret_key().to_string(),
            token: conn.token().map(ToString::to_string),
            region: conn.region().to_string(),
            endpoint,
        }
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// 生成 TC3-HMAC-SHA256 签名
    pub(crate) fn sign(&self, action: &str, payload: &str, timestamp: i64) -> String {
        let date = DateTime::from_timestamp(timestamp, 0)
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%d")
            .to_string();

        // 1. 拼接规范请求串
        let http_request_method = "POST";
        let canonical_uri = "/";
        let canonical_query_string = "";
        let canonical_headers = format!(
            "content-type:application/json; charset=utf-8\nhost:{}\nx-tc-action:{}\n",
            self.endpoint.host,
            action.to_lowercase()
        );
        let signed_headers = "content-type;host;x-tc-action";
        let hashed_payload = hex::encode(Sha256::digest(payload.as_bytes()));
        let canonical_request = format!(
            "{http_request_method}\n{canonical_uri}\n{canonical_query_string}\n{canonical_headers}\n{signed_headers}\n{hashed_payload}"
        );

        // 2. 拼接待签名字符串
        let algorithm = "TC3-HMAC-SHA256";
        let credential_scope = format!("{date}/{}/tc3_request", self.endpoint.service);
        let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign =
            format!("{algorithm}\n{timestamp}\n{credential_scope}\n{hashed_canonical_request}");

        // 3. 计算签名
        let secret_date = hmac_sha256(
            format!("TC3{}", self.secret_key).as_bytes(),
            date.as_bytes(),
        );
        let secret_service = hmac_sha256(&secret_date, self.endpoint.service.as_bytes());
        let secret_signing = hmac_sha256(&secret_service, b"tc3_request");
        let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes()));

        // 4. 拼接 Authorization
        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            algorithm, self.secret_id, credential_scope, signed_headers, signature
        )
    }

    /// 执行一次 API 调用并反序列化 `Response` 信封内的业务字段。
    pub(crate) async fn request<T, B>(&self, action: &str, body: &B, ctx: ErrorContext) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let service = self.endpoint.service;

        // 1. 序列化请求体
        let payload = serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
            product: service.to_string(),
            detail: e.to_string(),
        })?;

        let call_id = uuid::Uuid::new_v4().simple().to_string();
        log::debug!(
            "[{service}] {action} call={} body={}",
            &call_id[..8],
            truncate_for_log(&mask_sensitive(&payload))
        );

        // 2. 限频排队
        ratelimit::acquire(action).await;

        // 3. 生成签名
        let timestamp = Utc::now().timestamp();
        let authorization = self.sign(action, &payload, timestamp);

        // 4. 发送请求
        let url = format!("https://{}", self.endpoint.host);
        let mut request = self
            .http
            .post(&url)
            .header("Content-Type", "application/json; charset=utf-8")
            .header("Host", self.endpoint.host)
            .header("X-TC-Action", action)
            .header("X-TC-Version", self.endpoint.version)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("Authorization", authorization);
        if !self.region.is_empty() {
            request = request.header("X-TC-Region", &self.region);
        }
        if let Some(token) = &self.token {
            request = request.header("X-TC-Token", token);
        }
        let response_text = self.execute(request.body(payload), action).await?;

        // 5. 拆信封
        let envelope: ApiEnvelope = serde_json::from_str(&response_text).map_err(|e| {
            log::error!("[{service}] JSON parse failed: {e}");
            log::error!("[{service}] Raw response: {}", truncate_for_log(&response_text));
            ProviderError::ParseError {
                product: service.to_string(),
                detail: e.to_string(),
            }
        })?;

        if let Some(request_id) = envelope.response.get("RequestId").and_then(|v| v.as_str()) {
            log::debug!("[{service}] {action} call={} request_id={request_id}", &call_id[..8]);
        }

        // 6. 处理平台错误
        if let Some(raw) = envelope.response.get("Error") {
            let wire: WireError =
                serde_json::from_value(raw.clone()).map_err(|e| ProviderError::ParseError {
                    product: service.to_string(),
                    detail: format!("malformed Error object: {e}"),
                })?;
            let mapped =
                map_api_error(service, RawApiError::with_code(&wire.code, &wire.message), ctx);
            if mapped.is_expected() {
                log::warn!("[{service}] API error: {} - {}", wire.code, wire.message);
            } else {
                log::error!("[{service}] API error: {} - {}", wire.code, wire.message);
            }
            return Err(mapped);
        }

        // 7. 提取业务字段
        serde_json::from_value(envelope.response).map_err(|e| {
            log::error!("[{service}] response decode failed: {e}");
            ProviderError::ParseError {
                product: service.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// 发送请求并读出响应文本，HTTP 层错误映射为可重试的错误变体。
    async fn execute(&self, request: reqwest::RequestBuilder, action: &str) -> Result<String> {
        let service = self.endpoint.service;

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    product: service.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    product: service.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{service}] {action} status={status_code}");

        // 读 body 之前先取 Retry-After
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{service}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                product: service.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{service}] Server error (HTTP {status_code})");
            return Err(ProviderError::NetworkError {
                product: service.to_string(),
                detail: format!("HTTP {status_code}: {body}"),
            });
        }

        let response_text = response.text().await.map_err(|e| ProviderError::NetworkError {
            product: service.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })?;

        log::debug!(
            "[{service}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok(response_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ENDPOINT: Endpoint = Endpoint {
        service: "cdn",
        host: "cdn.tencentcloudapi.com",
        version: "2018-06-06",
    };

    fn client() -> ApiClient {
        let conn = Connection::builder()
            .secret_id("test_secret_id")
            .secret_key("test_secret_key")
            .region("ap-guangzhou")
            .build()
            .unwrap();
        ApiClient::new(&conn, TEST_ENDPOINT)
    }

    // ---- 签名输出格式 ----

    #[test]
    fn sign_output_format() {
        let result = client().sign("DescribeDomains", "{}", 1_705_305_600);

        assert!(
            result.starts_with("TC3-HMAC-SHA256 "),
            "should start with 'TC3-HMAC-SHA256 ', got: {result}"
        );
        assert!(result.contains("Credential="));
        assert!(result.contains("SignedHeaders=content-type;host;x-tc-action"));
        assert!(result.contains("Signature="));
    }

    // ---- Credential 包含 secret_id 和日期路径 ----

    #[test]
    fn sign_credential_contains_secret_id_and_date() {
        // timestamp 1705305600 = 2024-01-15 08:00:00 UTC
        let result = client().sign("DescribeDomains", "{}", 1_705_305_600);

        let credential_start = result.find("Credential=").unwrap() + "Credential=".len();
        let credential_end = result[credential_start..].find(',').unwrap() + credential_start;
        let credential = &result[credential_start..credential_end];

        assert!(
            credential.starts_with("test_secret_id/"),
            "Credential should start with secret_id, got: {credential}"
        );
        assert!(
            credential.contains("2024-01-15/cdn/tc3_request"),
            "Credential should contain date path '2024-01-15/cdn/tc3_request', got: {credential}"
        );
    }

    // ---- 确定性 ----

    #[test]
    fn sign_deterministic() {
        let c = client();
        let a = c.sign("DescribeDomains", r#"{"Domain":"example.com"}"#, 1_705_305_600);
        let b = c.sign("DescribeDomains", r#"{"Domain":"example.com"}"#, 1_705_305_600);
        assert_eq!(a, b, "same inputs should produce identical output");
    }

    // ---- 不同输入产生不同签名 ----

    #[test]
    fn sign_varies_with_action_and_payload() {
        let c = client();
        let base = c.sign("DescribeDomains", "{}", 1_705_305_600);
        let other_action = c.sign("AddCdnDomain", "{}", 1_705_305_600);
        let other_payload = c.sign("DescribeDomains", r#"{"Offset":0}"#, 1_705_305_600);

        let sig = |s: &str| s.rsplit("Signature=").next().unwrap().to_string();
        assert_ne!(sig(&base), sig(&other_action));
        assert_ne!(sig(&base), sig(&other_payload));
    }

    // ---- 服务名进入签名域 ----

    #[test]
    fn sign_scope_uses_endpoint_service() {
        let conn = Connection::builder()
            .secret_id("test_secret_id")
            .secret_key("test_secret_key")
            .region("ap-guangzhou")
            .build()
            .unwrap();
        let mongodb = ApiClient::new(
            &conn,
            Endpoint {
                service: "mongodb",
                host: "mongodb.tencentcloudapi.com",
                version: "2019-07-25",
            },
        );
        let result = mongodb.sign("DescribeDBInstances", "{}", 1_705_305_600);
        assert!(result.contains("/mongodb/tc3_request"));
    }

    // ---- 信封解析 ----

    #[test]
    fn envelope_extracts_business_fields() {
        #[derive(serde::Deserialize)]
        struct Out {
            #[serde(rename = "TotalCount")]
            total_count: i64,
        }
        let envelope: ApiEnvelope = serde_json::from_str(
            r#"{"Response":{"TotalCount":3,"RequestId":"abc-123"}}"#,
        )
        .unwrap();
        assert!(envelope.response.get("Error").is_none());
        let out: Out = serde_json::from_value(envelope.response).unwrap();
        assert_eq!(out.total_count, 3);
    }

    #[test]
    fn envelope_surfaces_wire_error() {
        let envelope: ApiEnvelope = serde_json::from_str(
            r#"{"Response":{"Error":{"Code":"ResourceNotFound.Domain","Message":"domain gone"},"RequestId":"abc"}}"#,
        )
        .unwrap();
        let raw = envelope.response.get("Error").cloned().unwrap();
        let wire: WireError = serde_json::from_value(raw).unwrap();
        assert_eq!(wire.code, "ResourceNotFound.Domain");
        assert_eq!(wire.message, "domain gone");
    }
}
