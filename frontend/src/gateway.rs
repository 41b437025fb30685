//! 认证请求网关模块
//!
//! 所有出站 API 调用的必经之路：统一附加凭据头、默认 JSON
//! Content-Type（multipart 除外），并在任何一处收到 401 时
//! 集中执行"清会话 + 跳登录"。调用方永远不需要单独处理 401。
//!
//! 传输层通过 `HttpBackend` 特征注入，浏览器实现走
//! `web::HttpClient`，测试使用 Mock。

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use medibook_shared::{HEADER_AUTHORIZATION, authorization_value};

use crate::error::{ApiError, ApiResult};
use crate::session::{KeyValueStorage, Session, SessionStore};
use crate::web::{HttpClient, HttpMethod};

// =========================================================
// 传输抽象 (HTTP Interface Abstraction)
// =========================================================

/// 请求体：JSON 字符串或 multipart 表单
pub enum RequestBody {
    Json(String),
    Multipart(web_sys::FormData),
}

impl RequestBody {
    /// 序列化任意可序列化值为 JSON 请求体
    pub fn json<T: Serialize>(value: &T) -> ApiResult<Self> {
        serde_json::to_string(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::network(format!("序列化请求体失败: {}", e)))
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// 响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析响应体 JSON
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| ApiError::network(format!("解析响应失败: {}", e)))
    }
}

#[async_trait(?Send)]
pub trait HttpBackend {
    async fn send(&self, req: ApiRequest) -> ApiResult<ApiResponse>;
}

// =========================================================
// 网关核心
// =========================================================

/// 组装出站请求头
///
/// 有凭据则附加 `Authorization: Token <token>`；除 multipart
/// 表单（由浏览器自行生成带分隔符的 Content-Type）外一律强制
/// JSON Content-Type。
pub fn build_headers(token: Option<&str>, multipart: bool) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    if let Some(token) = token {
        headers.push((HEADER_AUTHORIZATION.to_string(), authorization_value(token)));
    }
    if !multipart {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    headers
}

/// 认证请求网关
pub struct Gateway<B: HttpBackend, S: KeyValueStorage> {
    backend: B,
    store: Rc<SessionStore<S>>,
    base_url: String,
    /// 401 发生时的导航钩子（跳转登录页）
    on_unauthorized: Rc<dyn Fn()>,
}

impl<B: HttpBackend + Clone, S: KeyValueStorage> Clone for Gateway<B, S> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            store: self.store.clone(),
            base_url: self.base_url.clone(),
            on_unauthorized: self.on_unauthorized.clone(),
        }
    }
}

impl<B: HttpBackend, S: KeyValueStorage> Gateway<B, S> {
    pub fn new(
        backend: B,
        store: Rc<SessionStore<S>>,
        base_url: impl Into<String>,
        on_unauthorized: impl Fn() + 'static,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            backend,
            store,
            base_url,
            on_unauthorized: Rc::new(on_unauthorized),
        }
    }

    pub fn store(&self) -> &Rc<SessionStore<S>> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 公开请求（登录 / 注册），不要求本地凭据
    pub async fn public(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
    ) -> ApiResult<ApiResponse> {
        let multipart = body.as_ref().is_some_and(|b| b.is_multipart());
        let req = ApiRequest {
            method,
            url: self.url(path),
            headers: build_headers(None, multipart),
            body,
        };
        self.backend.send(req).await
    }

    /// 受保护请求
    ///
    /// 无本地会话立即失败（零网络调用）；401 响应触发全局
    /// 会话清除并跳转登录，再以 `Unauthorized` 失败；其余
    /// 响应原样交给调用方检查状态与响应体。
    pub async fn gated(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
    ) -> ApiResult<ApiResponse> {
        let Session { token, .. } = self.store.get().ok_or(ApiError::Unauthenticated)?;

        let multipart = body.as_ref().is_some_and(|b| b.is_multipart());
        let req = ApiRequest {
            method,
            url: self.url(path),
            headers: build_headers(Some(&token), multipart),
            body,
        };

        let resp = self.backend.send(req).await?;
        if resp.status == 401 {
            log_info!("[Gateway] 401 received, tearing down session.");
            self.store.clear();
            (self.on_unauthorized)();
            return Err(ApiError::Unauthorized);
        }
        Ok(resp)
    }
}

// =========================================================
// 实现层: 浏览器客户端
// =========================================================

#[derive(Clone, Copy, Default)]
pub struct WebHttpBackend;

#[async_trait(?Send)]
impl HttpBackend for WebHttpBackend {
    async fn send(&self, req: ApiRequest) -> ApiResult<ApiResponse> {
        let mut builder = HttpClient::request(&req.url, req.method);
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }
        builder = match req.body {
            Some(RequestBody::Json(json)) => builder.body(json),
            Some(RequestBody::Multipart(form)) => builder.form(form),
            None => builder,
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}

// =========================================================
// 测试环境实现 (Mock)
// =========================================================

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::session::tests::{MockStorage, sample_session};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    /// 记录下来的出站请求（请求体展开为字符串便于断言）
    pub struct RecordedRequest {
        pub method: HttpMethod,
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: Option<String>,
        pub multipart: bool,
    }

    impl RecordedRequest {
        pub fn header(&self, key: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        }
    }

    #[derive(Default)]
    struct MockInner {
        responses: RefCell<VecDeque<ApiResult<ApiResponse>>>,
        requests: RefCell<Vec<RecordedRequest>>,
    }

    /// Mock 传输层：按入队顺序出响应，同时记录每个请求
    #[derive(Clone, Default)]
    pub struct MockHttpBackend {
        inner: Rc<MockInner>,
    }

    impl MockHttpBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, status: u16, body: &str) {
            self.inner.responses.borrow_mut().push_back(Ok(ApiResponse {
                status,
                body: body.to_string(),
            }));
        }

        pub fn push_network_error(&self, message: &str) {
            self.inner
                .responses
                .borrow_mut()
                .push_back(Err(ApiError::network(message)));
        }

        pub fn request_count(&self) -> usize {
            self.inner.requests.borrow().len()
        }

        pub fn with_last_request<R>(&self, f: impl FnOnce(&RecordedRequest) -> R) -> R {
            let requests = self.inner.requests.borrow();
            f(requests.last().expect("没有记录到任何请求"))
        }
    }

    #[async_trait(?Send)]
    impl HttpBackend for MockHttpBackend {
        async fn send(&self, req: ApiRequest) -> ApiResult<ApiResponse> {
            let (body, multipart) = match &req.body {
                Some(RequestBody::Json(json)) => (Some(json.clone()), false),
                Some(RequestBody::Multipart(_)) => (None, true),
                None => (None, false),
            };
            self.inner.requests.borrow_mut().push(RecordedRequest {
                method: req.method,
                url: req.url,
                headers: req.headers,
                body,
                multipart,
            });
            self.inner
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(ApiResponse {
                    status: 200,
                    body: "{}".to_string(),
                }))
        }
    }

    // =========================================================
    // 辅助函数
    // =========================================================

    pub struct TestGateway {
        pub gateway: Gateway<MockHttpBackend, MockStorage>,
        pub backend: MockHttpBackend,
        pub redirected: Rc<Cell<u32>>,
    }

    /// 构造带 Mock 后端的网关，可选预置会话
    pub fn gateway_with_session(logged_in: bool) -> TestGateway {
        let store = SessionStore::new(MockStorage::new());
        if logged_in {
            store.set(&sample_session());
        }
        let backend = MockHttpBackend::new();
        let redirected = Rc::new(Cell::new(0));
        let hits = redirected.clone();
        let gateway = Gateway::new(
            backend.clone(),
            store,
            "http://localhost:8000/api/",
            move || hits.set(hits.get() + 1),
        );
        TestGateway {
            gateway,
            backend,
            redirected,
        }
    }

    // =========================================================
    // gated 测试
    // =========================================================

    #[tokio::test]
    async fn gated_without_session_makes_no_network_call() {
        let t = gateway_with_session(false);
        let err = t
            .gateway
            .gated(HttpMethod::Get, "/appointments/", None)
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Unauthenticated);
        assert_eq!(t.backend.request_count(), 0);
        assert_eq!(t.redirected.get(), 0);
    }

    #[tokio::test]
    async fn gated_attaches_token_and_json_content_type() {
        let t = gateway_with_session(true);
        t.backend.push_response(200, "[]");

        t.gateway
            .gated(HttpMethod::Get, "/appointments/", None)
            .await
            .unwrap();

        t.backend.with_last_request(|req| {
            assert_eq!(req.url, "http://localhost:8000/api/appointments/");
            assert_eq!(req.header(HEADER_AUTHORIZATION), Some("Token tok-123"));
            assert_eq!(req.header("Content-Type"), Some("application/json"));
        });
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_redirects_once() {
        let t = gateway_with_session(true);
        t.backend.push_response(401, r#"{"detail":"Invalid token."}"#);

        let err = t
            .gateway
            .gated(HttpMethod::Post, "/logout/", None)
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Unauthorized);
        assert!(t.gateway.store().get().is_none());
        assert_eq!(t.redirected.get(), 1);
    }

    #[tokio::test]
    async fn non_401_failures_pass_through_untouched() {
        let t = gateway_with_session(true);
        t.backend
            .push_response(400, r#"{"error":"This time slot is already booked"}"#);

        let resp = t
            .gateway
            .gated(HttpMethod::Post, "/appointments/", None)
            .await
            .unwrap();

        assert_eq!(resp.status, 400);
        assert!(!resp.ok());
        // 会话保持不动
        assert!(t.gateway.store().get().is_some());
        assert_eq!(t.redirected.get(), 0);
    }

    #[tokio::test]
    async fn network_errors_do_not_tear_down_session() {
        let t = gateway_with_session(true);
        t.backend.push_network_error("connection refused");

        let err = t
            .gateway
            .gated(HttpMethod::Get, "/doctors/", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
        assert!(t.gateway.store().get().is_some());
        assert_eq!(t.redirected.get(), 0);
    }

    #[tokio::test]
    async fn public_requests_carry_no_token() {
        let t = gateway_with_session(true);
        t.backend.push_response(200, "{}");

        t.gateway
            .public(
                HttpMethod::Post,
                "/login/",
                Some(RequestBody::Json("{}".into())),
            )
            .await
            .unwrap();

        t.backend.with_last_request(|req| {
            assert_eq!(req.header(HEADER_AUTHORIZATION), None);
            assert_eq!(req.header("Content-Type"), Some("application/json"));
        });
    }

    // =========================================================
    // 请求头组装测试
    // =========================================================

    // 断言辅助要求响应可调试打印（unwrap_err 等都依赖它）
    #[test]
    fn response_is_debug_printable() {
        let resp = ApiResponse {
            status: 502,
            body: "<html>".into(),
        };
        assert!(format!("{:?}", resp).contains("502"));
    }

    #[test]
    fn multipart_suppresses_json_content_type() {
        let headers = build_headers(Some("tok"), true);
        assert!(headers.iter().any(|(k, _)| k == HEADER_AUTHORIZATION));
        assert!(!headers.iter().any(|(k, _)| k == "Content-Type"));

        let headers = build_headers(Some("tok"), false);
        assert!(
            headers
                .iter()
                .any(|(k, v)| k == "Content-Type" && v == "application/json")
        );
    }
}
