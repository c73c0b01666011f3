use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform error codes that are safe to retry.
///
/// An entry matches either the full code (`ClientError.NetworkError`) or the
/// family before the first dot (`FailedOperation` matches
/// `FailedOperation.SomethingTransient`). The cloud APIs signal most
/// transient server-side conditions through these families. `InternalError`
/// is deliberately absent: only a few call paths tolerate it, and those pass
/// it to [`crate::retry::retry_error_with`] explicitly.
pub const RETRYABLE_ERROR_CODES: &[&str] = &[
    "ClientError.NetworkError",
    "ClientError.HttpStatusCodeError",
    "FailedOperation",
    "TradeUnknownError",
    "RequestLimitExceeded",
    "ResourceInUse",
    "ResourceUnavailable",
    "ResourceBusy",
];

/// 判断错误码是否命中给定列表（完整码或点号前缀）。
pub(crate) fn code_matches(code: &str, expected: &[&str]) -> bool {
    if expected.contains(&code) {
        return true;
    }
    if let Some((family, _)) = code.split_once('.') {
        return expected.contains(&family);
    }
    false
}

fn in_family(code: &str, family: &str) -> bool {
    code == family || code.split_once('.').is_some_and(|(f, _)| f == family)
}

/// Unified error type for all resource operations.
///
/// Each variant includes a `product` field identifying which product API
/// produced the error (`cdn`, `dayu`, ... or the resource type name for
/// schema-level failures), plus variant-specific context. All variants are
/// serializable for structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that the retry
/// helper re-attempts until its deadline:
/// - [`NetworkError`](Self::NetworkError): connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API rate limit exceeded
/// - [`RetryableOperation`](Self::RetryableOperation): platform error code
///   on the [`RETRYABLE_ERROR_CODES`] allow-list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection
    /// refused, HTTP 5xx from the gateway, etc.).
    NetworkError {
        /// Product that produced the error.
        product: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Product that produced the error.
        product: String,
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429 or
    /// `RequestLimitExceeded`).
    RateLimited {
        /// Product that produced the error.
        product: String,
        /// Suggested wait time in seconds before retrying, if provided.
        retry_after: Option<u64>,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The provided credentials are invalid or expired (`AuthFailure.*`).
    InvalidCredentials {
        /// Product that produced the error.
        product: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The referenced cloud resource does not exist (`ResourceNotFound.*`).
    ///
    /// Read handlers usually translate this into clearing the resource ID
    /// rather than failing.
    ResourceNotFound {
        /// Product that produced the error.
        product: String,
        /// Identifier of the missing resource.
        resource_id: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter or schema attribute is invalid.
    InvalidParameter {
        /// Product (or resource type) that produced the error.
        product: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The account's resource quota has been exceeded (`LimitExceeded.*`).
    ///
    /// Unlike [`RateLimited`](Self::RateLimited), this is not transient.
    QuotaExceeded {
        /// Product that produced the error.
        product: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The authenticated user lacks permission for the operation.
    PermissionDenied {
        /// Product that produced the error.
        product: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The operation is not supported for this resource
    /// (`UnsupportedOperation.*`, or an attempt to update an immutable
    /// argument).
    UnsupportedOperation {
        /// Product that produced the error.
        product: String,
        /// Description of the unsupported operation.
        detail: String,
    },

    /// A platform error whose code is on the retryable allow-list.
    ///
    /// The raw code is preserved so call sites can still mark specific
    /// subcodes fatal (e.g. `ResourceInUse.CdnHostExists`).
    RetryableOperation {
        /// Product that produced the error.
        product: String,
        /// Raw error code from the API.
        raw_code: String,
        /// Raw error message from the API.
        raw_message: String,
    },

    /// An asynchronous task or flow ended in a failed state.
    TaskFailed {
        /// Product that produced the error.
        product: String,
        /// Flow/task identifier reported by the API.
        task_id: String,
        /// Failure details.
        detail: String,
    },

    /// Failed to parse the API response.
    ParseError {
        /// Product that produced the error.
        product: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Product that produced the error.
        product: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// Failed to write a `result_output_file` snapshot.
    OutputFile {
        /// Target path that could not be written.
        path: String,
        /// IO error details.
        detail: String,
    },

    /// Several independent failures collected during one operation.
    Multiple {
        /// Product (or resource type) that produced the errors.
        product: String,
        /// Rendered messages of the collected errors.
        details: Vec<String>,
    },

    /// An unrecognized error from the API.
    Unknown {
        /// Product that produced the error.
        product: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为可重试错误，驱动 [`crate::retry`] 的默认分类。
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::RetryableOperation { .. }
        )
    }

    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::ResourceNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::QuotaExceeded { .. }
                | Self::PermissionDenied { .. }
                | Self::UnsupportedOperation { .. }
        )
    }

    /// The raw platform error code, for variants that preserve one.
    ///
    /// Call sites use this to promote or demote specific codes when
    /// classifying retries.
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::RetryableOperation { raw_code, .. } => Some(raw_code),
            Self::Unknown { raw_code, .. } => raw_code.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn from_schema(product: &str, err: SchemaError) -> Self {
        let param = match &err {
            SchemaError::UnknownField(field) | SchemaError::MissingRequired(field) => field.clone(),
            SchemaError::TypeMismatch { field, .. } | SchemaError::InvalidValue { field, .. } => {
                field.clone()
            }
            SchemaError::MalformedId { .. } => "id".to_string(),
        };
        Self::InvalidParameter {
            product: product.to_string(),
            param,
            detail: err.to_string(),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { product, detail } => {
                write!(f, "[{product}] Network error: {detail}")
            }
            Self::Timeout { product, detail } => {
                write!(f, "[{product}] Request timeout: {detail}")
            }
            Self::RateLimited {
                product,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{product}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{product}] Rate limited")
                }
            }
            Self::InvalidCredentials {
                product,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{product}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{product}] Invalid credentials")
                }
            }
            Self::ResourceNotFound {
                product,
                resource_id,
                ..
            } => {
                write!(f, "[{product}] Resource '{resource_id}' not found")
            }
            Self::InvalidParameter {
                product,
                param,
                detail,
            } => {
                write!(f, "[{product}] Invalid parameter '{param}': {detail}")
            }
            Self::QuotaExceeded { product, .. } => {
                write!(f, "[{product}] Quota exceeded")
            }
            Self::PermissionDenied {
                product,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{product}] Permission denied: {msg}")
                } else {
                    write!(f, "[{product}] Permission denied")
                }
            }
            Self::UnsupportedOperation { product, detail } => {
                write!(f, "[{product}] Unsupported operation: {detail}")
            }
            Self::RetryableOperation {
                product,
                raw_code,
                raw_message,
            } => {
                write!(f, "[{product}] {raw_code}: {raw_message}")
            }
            Self::TaskFailed {
                product,
                task_id,
                detail,
            } => {
                write!(f, "[{product}] Task '{task_id}' failed: {detail}")
            }
            Self::ParseError { product, detail } => {
                write!(f, "[{product}] Parse error: {detail}")
            }
            Self::SerializationError { product, detail } => {
                write!(f, "[{product}] Serialization error: {detail}")
            }
            Self::OutputFile { path, detail } => {
                write!(f, "Failed to write result file '{path}': {detail}")
            }
            Self::Multiple { product, details } => {
                write!(
                    f,
                    "[{product}] {} errors: {}",
                    details.len(),
                    details.join("; ")
                )
            }
            Self::Unknown {
                product,
                raw_message,
                ..
            } => {
                write!(f, "[{product}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 平台错误码
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 关联的资源 ID（用于 `ResourceNotFound` 等错误）
    pub resource_id: Option<String>,
}

impl ErrorContext {
    pub fn resource(id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(id.into()),
        }
    }
}

/// Map a raw platform error onto [`ProviderError`].
///
/// Tencent Cloud error codes are uniform across products, so a single
/// mapper covers every service. The friendly variants cover the common
/// `Family.Subcode` groups; anything on the retryable allow-list keeps its
/// raw code in [`ProviderError::RetryableOperation`]; the rest falls
/// through to [`ProviderError::Unknown`].
pub(crate) fn map_api_error(product: &str, raw: RawApiError, ctx: ErrorContext) -> ProviderError {
    let Some(code) = raw.code.clone() else {
        return ProviderError::Unknown {
            product: product.to_string(),
            raw_code: None,
            raw_message: raw.message,
        };
    };

    if in_family(&code, "AuthFailure") {
        return ProviderError::InvalidCredentials {
            product: product.to_string(),
            raw_message: Some(raw.message),
        };
    }
    if in_family(&code, "ResourceNotFound") {
        return ProviderError::ResourceNotFound {
            product: product.to_string(),
            resource_id: ctx.resource_id.unwrap_or_else(|| "<unknown>".to_string()),
            raw_message: Some(raw.message),
        };
    }
    if in_family(&code, "UnauthorizedOperation") || in_family(&code, "OperationDenied") {
        return ProviderError::PermissionDenied {
            product: product.to_string(),
            raw_message: Some(raw.message),
        };
    }
    if in_family(&code, "LimitExceeded") {
        return ProviderError::QuotaExceeded {
            product: product.to_string(),
            raw_message: Some(raw.message),
        };
    }
    // RequestLimitExceeded 同时在重试列表里，但作为限流处理更准确
    if in_family(&code, "RequestLimitExceeded") {
        return ProviderError::RateLimited {
            product: product.to_string(),
            retry_after: None,
            raw_message: Some(raw.message),
        };
    }
    if in_family(&code, "UnsupportedOperation") {
        return ProviderError::UnsupportedOperation {
            product: product.to_string(),
            detail: raw.message,
        };
    }
    if code_matches(&code, RETRYABLE_ERROR_CODES) {
        return ProviderError::RetryableOperation {
            product: product.to_string(),
            raw_code: code,
            raw_message: raw.message,
        };
    }

    ProviderError::Unknown {
        product: product.to_string(),
        raw_code: Some(code),
        raw_message: raw.message,
    }
}

/// Collects independent failures during one operation and reports them
/// jointly.
///
/// Read handlers that flatten dozens of attributes use this so one bad
/// field does not hide the rest.
#[derive(Debug)]
pub struct ErrorCollector {
    product: String,
    errors: Vec<ProviderError>,
}

impl ErrorCollector {
    #[must_use]
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, err: ProviderError) {
        self.errors.push(err);
    }

    /// 吸收一个操作结果，失败则记录。
    pub fn record<T>(&mut self, result: Result<T>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Resolve into a single result: no errors is `Ok`, one error is
    /// returned as-is, several collapse into [`ProviderError::Multiple`].
    pub fn finish(mut self) -> Result<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ProviderError::Multiple {
                product: self.product,
                details: self.errors.iter().map(ToString::to_string).collect(),
            }),
        }
    }
}

/// Schema-layer failures: type mismatches, unknown fields, validation and
/// malformed composite IDs.
///
/// Converted into [`ProviderError::InvalidParameter`] at the resource
/// boundary.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum SchemaError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Field '{field}' expects {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    #[error("Malformed resource ID '{id}': expected {expected} `#`-separated parts")]
    MalformedId { id: String, expected: usize },
}

/// 透传转换用于处理器内部的 `?`；已知资源类型时优先
/// [`ProviderError::from_schema`]。
impl From<SchemaError> for ProviderError {
    fn from(err: SchemaError) -> Self {
        Self::from_schema("schema", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Display ----

    #[test]
    fn display_network_error() {
        let e = ProviderError::NetworkError {
            product: "cdn".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[cdn] Network error: connection refused");
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = ProviderError::RateLimited {
            product: "dayu".to_string(),
            retry_after: Some(30),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[dayu] Rate limited (retry after 30s)");
    }

    #[test]
    fn display_resource_not_found() {
        let e = ProviderError::ResourceNotFound {
            product: "mongodb".to_string(),
            resource_id: "cmgo-abc123".to_string(),
            raw_message: Some("ignored".to_string()),
        };
        assert_eq!(e.to_string(), "[mongodb] Resource 'cmgo-abc123' not found");
    }

    #[test]
    fn display_retryable_operation() {
        let e = ProviderError::RetryableOperation {
            product: "sqlserver".to_string(),
            raw_code: "ResourceBusy".to_string(),
            raw_message: "backend busy".to_string(),
        };
        assert_eq!(e.to_string(), "[sqlserver] ResourceBusy: backend busy");
    }

    #[test]
    fn display_task_failed() {
        let e = ProviderError::TaskFailed {
            product: "sqlserver".to_string(),
            task_id: "1024".to_string(),
            detail: "flow status failed".to_string(),
        };
        assert_eq!(e.to_string(), "[sqlserver] Task '1024' failed: flow status failed");
    }

    #[test]
    fn display_multiple() {
        let e = ProviderError::Multiple {
            product: "tencentcloud_cdn_domain".to_string(),
            details: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(
            e.to_string(),
            "[tencentcloud_cdn_domain] 2 errors: first; second"
        );
    }

    // ---- code_matches ----

    #[test]
    fn code_matches_exact() {
        assert!(code_matches("ClientError.NetworkError", RETRYABLE_ERROR_CODES));
    }

    #[test]
    fn code_matches_family_prefix() {
        assert!(code_matches("FailedOperation.CdnConfigError", RETRYABLE_ERROR_CODES));
        assert!(code_matches("ResourceInUse.CdnHostExists", RETRYABLE_ERROR_CODES));
    }

    #[test]
    fn code_matches_rejects_other_families() {
        assert!(!code_matches("InvalidParameterValue", RETRYABLE_ERROR_CODES));
        assert!(!code_matches("AuthFailure.SignatureExpire", RETRYABLE_ERROR_CODES));
        assert!(!code_matches("InternalError.DBError", RETRYABLE_ERROR_CODES));
        // 列表里带点号的条目只做精确匹配
        assert!(!code_matches("ClientError.Other", RETRYABLE_ERROR_CODES));
    }

    // ---- is_retryable ----

    #[test]
    fn retryable_variants() {
        assert!(
            ProviderError::NetworkError {
                product: "t".into(),
                detail: "x".into(),
            }
            .is_retryable()
        );
        assert!(
            ProviderError::RetryableOperation {
                product: "t".into(),
                raw_code: "FailedOperation".into(),
                raw_message: "x".into(),
            }
            .is_retryable()
        );
        assert!(
            !ProviderError::InvalidCredentials {
                product: "t".into(),
                raw_message: None,
            }
            .is_retryable()
        );
        assert!(
            !ProviderError::Unknown {
                product: "t".into(),
                raw_code: Some("InvalidParameterValue".into()),
                raw_message: "x".into(),
            }
            .is_retryable()
        );
    }

    // ---- map_api_error ----

    #[test]
    fn map_auth_failure() {
        let e = map_api_error(
            "dnspod",
            RawApiError::with_code("AuthFailure.SignatureFailure", "bad sign"),
            ErrorContext::default(),
        );
        assert!(matches!(e, ProviderError::InvalidCredentials { .. }), "got {e:?}");
    }

    #[test]
    fn map_resource_not_found_uses_context() {
        let e = map_api_error(
            "eb",
            RawApiError::with_code("ResourceNotFound.EventBus", "no bus"),
            ErrorContext::resource("eb-123"),
        );
        assert!(
            matches!(e, ProviderError::ResourceNotFound { ref resource_id, .. } if resource_id == "eb-123"),
            "got {e:?}"
        );
    }

    #[test]
    fn map_permission_denied() {
        for code in ["UnauthorizedOperation", "OperationDenied.AccessDenied"] {
            let e = map_api_error("cdn", RawApiError::with_code(code, "denied"), ErrorContext::default());
            assert!(matches!(e, ProviderError::PermissionDenied { .. }), "code {code}: got {e:?}");
        }
    }

    #[test]
    fn map_limit_exceeded_to_quota() {
        let e = map_api_error(
            "dnspod",
            RawApiError::with_code("LimitExceeded.RecordTtlLimit", "too many"),
            ErrorContext::default(),
        );
        assert!(matches!(e, ProviderError::QuotaExceeded { .. }), "got {e:?}");
    }

    #[test]
    fn map_request_limit_to_rate_limited() {
        let e = map_api_error(
            "mongodb",
            RawApiError::with_code("RequestLimitExceeded", "slow down"),
            ErrorContext::default(),
        );
        assert!(matches!(e, ProviderError::RateLimited { .. }), "got {e:?}");
    }

    #[test]
    fn map_retryable_codes_keep_raw_code() {
        for code in [
            "FailedOperation",
            "ResourceInUse.CdnHostExists",
            "ResourceUnavailable",
            "TradeUnknownError",
        ] {
            let e = map_api_error("cdn", RawApiError::with_code(code, "x"), ErrorContext::default());
            assert!(
                matches!(e, ProviderError::RetryableOperation { ref raw_code, .. } if raw_code == code),
                "code {code}: got {e:?}"
            );
        }
    }

    #[test]
    fn map_internal_error_stays_fatal() {
        // InternalError 不在默认白名单，靠调用方传 retry_error_with 扩展
        let e = map_api_error(
            "cdn",
            RawApiError::with_code("InternalError.DBError", "x"),
            ErrorContext::default(),
        );
        assert!(matches!(e, ProviderError::Unknown { .. }), "got {e:?}");
        assert!(!e.is_retryable());
        assert_eq!(e.api_code(), Some("InternalError.DBError"));
    }

    #[test]
    fn map_unknown_code_preserved() {
        let e = map_api_error(
            "dayu",
            RawApiError::with_code("InvalidParameterValue", "no such policy"),
            ErrorContext::default(),
        );
        assert!(
            matches!(e, ProviderError::Unknown { ref raw_code, .. } if raw_code.as_deref() == Some("InvalidParameterValue")),
            "got {e:?}"
        );
        assert_eq!(e.api_code(), Some("InvalidParameterValue"));
    }

    #[test]
    fn map_no_code_maps_to_unknown() {
        let e = map_api_error("cdn", RawApiError::new("boom"), ErrorContext::default());
        assert!(
            matches!(e, ProviderError::Unknown { ref raw_code, .. } if raw_code.is_none()),
            "got {e:?}"
        );
    }

    // ---- ErrorCollector ----

    #[test]
    fn collector_empty_is_ok() {
        let c = ErrorCollector::new("t");
        assert!(c.finish().is_ok());
    }

    #[test]
    fn collector_single_error_passthrough() {
        let mut c = ErrorCollector::new("t");
        c.push(ProviderError::QuotaExceeded {
            product: "t".into(),
            raw_message: None,
        });
        let e = c.finish();
        assert!(matches!(e, Err(ProviderError::QuotaExceeded { .. })), "got {e:?}");
    }

    #[test]
    fn collector_aggregates_many() {
        let mut c = ErrorCollector::new("tencentcloud_cdn_domain");
        c.record::<()>(Err(ProviderError::ParseError {
            product: "cdn".into(),
            detail: "a".into(),
        }));
        c.record::<()>(Err(ProviderError::ParseError {
            product: "cdn".into(),
            detail: "b".into(),
        }));
        c.record(Ok(()));
        let e = c.finish();
        assert!(
            matches!(e, Err(ProviderError::Multiple { ref details, .. }) if details.len() == 2),
            "got {e:?}"
        );
    }

    // ---- serde ----

    #[test]
    fn serialize_tagged_by_code() {
        let e = ProviderError::RateLimited {
            product: "cdn".to_string(),
            retry_after: Some(60),
            raw_message: None,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"code\":\"RateLimited\""));
        assert!(json.contains("\"retry_after\":60"));
    }

    #[test]
    fn deserialize_round_trip() {
        let original = ProviderError::RetryableOperation {
            product: "dayu".to_string(),
            raw_code: "ResourceBusy".to_string(),
            raw_message: "busy".to_string(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let back: ProviderError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_string(), original.to_string());
    }

    // ---- SchemaError ----

    #[test]
    fn schema_error_display() {
        let e = SchemaError::TypeMismatch {
            field: "ttl".to_string(),
            expected: "an integer",
        };
        assert_eq!(e.to_string(), "Field 'ttl' expects an integer");
    }

    #[test]
    fn schema_error_converts_to_invalid_parameter() {
        let e = ProviderError::from_schema(
            "tencentcloud_dnspod_record",
            SchemaError::MissingRequired("value".to_string()),
        );
        assert!(
            matches!(e, ProviderError::InvalidParameter { ref param, .. } if param == "value"),
            "got {e:?}"
        );
        assert!(e.is_expected());
    }
}
