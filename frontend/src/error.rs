//! 客户端错误类型模块
//!
//! 所有组件层的错误最终都折叠为一条用户可见的临时提示，
//! 不向全局冒泡。唯一带导航副作用的是会话失效（401 或
//! 校验失败），由网关统一处理。

use std::fmt;

use medibook_shared::ErrorBody;

/// 客户端错误分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 本地校验失败，未发出任何网络请求
    Validation(String),
    /// 没有本地凭据，受保护请求被直接拒绝（零网络调用）
    Unauthenticated,
    /// 服务端返回 401，会话已被清除并跳转登录
    Unauthorized,
    /// 非 2xx、非 401 的响应，message 取服务端错误体或回退文案
    RequestFailed { status: u16, message: String },
    /// 请求无法完成（展示时与 RequestFailed 同等对待）
    Network(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network(message.into())
    }

    /// 从失败响应构造：优先采用服务端 `{"error": ...}` 原文
    pub fn from_response(status: u16, body: &str, fallback: &str) -> Self {
        ApiError::RequestFailed {
            status,
            message: error_message(body, fallback),
        }
    }

    /// 提示框文案
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Unauthenticated | ApiError::Unauthorized => "请重新登录".to_string(),
            ApiError::RequestFailed { message, .. } => message.clone(),
            ApiError::Network(msg) => msg.clone(),
        }
    }
}

/// 解析服务端错误体，取不到就用回退文案
pub fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            ApiError::Unauthenticated => write!(f, "[UNAUTHENTICATED] 本地无凭据"),
            ApiError::Unauthorized => write!(f, "[UNAUTHORIZED] 凭据被服务端拒绝"),
            ApiError::RequestFailed { status, message } => {
                write!(f, "[REQUEST_FAILED {}] {}", status, message)
            }
            ApiError::Network(msg) => write!(f, "[NETWORK] {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
