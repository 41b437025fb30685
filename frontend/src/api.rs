//! 预约系统 API 客户端
//!
//! 每个远端操作一个类型化方法，统一经由认证网关发出。
//! 非 2xx 响应优先透传服务端 `{"error": ...}` 原文，
//! 否则使用各操作的回退文案。

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use medibook_shared::{
    Appointment, AuthResponse, CreateAppointmentRequest, Doctor, LoginRequest, ProfileUpdate,
    RegisterRequest, TimeSlot, UserSummary, date,
};

use crate::error::{ApiError, ApiResult};
use crate::gateway::{ApiResponse, Gateway, HttpBackend, RequestBody};
use crate::session::{KeyValueStorage, Session, SessionStore};
use crate::web::HttpMethod;
use std::rc::Rc;

/// 成功则解析响应体，失败则带状态码和服务端文案返回
fn expect_json<T: DeserializeOwned>(resp: ApiResponse, fallback: &str) -> ApiResult<T> {
    if resp.ok() {
        resp.json()
    } else {
        Err(ApiError::from_response(resp.status, &resp.body, fallback))
    }
}

fn expect_ok(resp: ApiResponse, fallback: &str) -> ApiResult<()> {
    if resp.ok() {
        Ok(())
    } else {
        Err(ApiError::from_response(resp.status, &resp.body, fallback))
    }
}

/// 类型化 API 客户端
pub struct MediBookApi<B: HttpBackend, S: KeyValueStorage> {
    gateway: Gateway<B, S>,
}

impl<B: HttpBackend + Clone, S: KeyValueStorage> Clone for MediBookApi<B, S> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
        }
    }
}

impl<B: HttpBackend, S: KeyValueStorage> MediBookApi<B, S> {
    pub fn new(gateway: Gateway<B, S>) -> Self {
        Self { gateway }
    }

    pub fn store(&self) -> &Rc<SessionStore<S>> {
        self.gateway.store()
    }

    // ---------------------------------------------------------
    // 认证
    // ---------------------------------------------------------

    /// 登录并写入会话
    pub async fn login(&self, email: String, password: String) -> ApiResult<Session> {
        let body = RequestBody::json(&LoginRequest { email, password })?;
        let resp = self
            .gateway
            .public(HttpMethod::Post, "/login/", Some(body))
            .await?;
        let auth: AuthResponse = expect_json(resp, "登录失败，请检查邮箱和密码")?;

        let session = Session {
            token: auth.token,
            user: auth.user,
        };
        self.gateway.store().set(&session);
        Ok(session)
    }

    /// 注册新账号并写入会话
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<Session> {
        let body = RequestBody::json(&req)?;
        let resp = self
            .gateway
            .public(HttpMethod::Post, "/register/", Some(body))
            .await?;
        let auth: AuthResponse = expect_json(resp, "注册失败，请稍后重试")?;

        let session = Session {
            token: auth.token,
            user: auth.user,
        };
        self.gateway.store().set(&session);
        Ok(session)
    }

    /// 通知服务端作废当前 token（尽力而为，本地清理不依赖它）
    pub async fn logout(&self) -> ApiResult<()> {
        let resp = self.gateway.gated(HttpMethod::Post, "/logout/", None).await?;
        expect_ok(resp, "退出登录失败")
    }

    /// 轻量级"我是谁"校验
    ///
    /// 会话有效时返回**本地存储的**用户摘要（保留最近一次档案
    /// 编辑的结果），任何失败都清除会话。401 的清除与跳转由
    /// 网关完成。
    pub async fn validate_session(&self) -> Option<UserSummary> {
        let session = self.gateway.store().get()?;

        match self.gateway.gated(HttpMethod::Get, "/profile/", None).await {
            Ok(resp) if resp.ok() => Some(session.user),
            Ok(_) => {
                self.gateway.store().clear();
                None
            }
            Err(ApiError::Unauthorized) => None, // 网关已清除会话
            Err(e) => {
                log_error!("[Auth] 会话校验失败: {}", e);
                self.gateway.store().clear();
                None
            }
        }
    }

    // ---------------------------------------------------------
    // 档案
    // ---------------------------------------------------------

    pub async fn fetch_profile(&self) -> ApiResult<UserSummary> {
        let resp = self.gateway.gated(HttpMethod::Get, "/profile/", None).await?;
        expect_json(resp, "加载档案失败")
    }

    /// 整表提交档案修改；响应中的用户对象整体替换本地摘要
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserSummary> {
        let body = RequestBody::json(update)?;
        let resp = self
            .gateway
            .gated(HttpMethod::Patch, "/profile/", Some(body))
            .await?;
        let user: UserSummary = expect_json(resp, "更新档案失败")?;
        self.gateway.store().replace_user(user.clone());
        Ok(user)
    }

    /// 上传头像（multipart，不带 JSON Content-Type）
    pub async fn upload_avatar(&self, form: web_sys::FormData) -> ApiResult<UserSummary> {
        let resp = self
            .gateway
            .gated(HttpMethod::Post, "/profile/", Some(RequestBody::Multipart(form)))
            .await?;
        let user: UserSummary = expect_json(resp, "上传头像失败")?;
        self.gateway.store().replace_user(user.clone());
        Ok(user)
    }

    /// 注销账号；成功后本地会话立即清除
    pub async fn delete_profile(&self) -> ApiResult<()> {
        let resp = self
            .gateway
            .gated(HttpMethod::Delete, "/profile/", None)
            .await?;
        expect_ok(resp, "注销账号失败")?;
        self.gateway.store().clear();
        Ok(())
    }

    // ---------------------------------------------------------
    // 医生与预约
    // ---------------------------------------------------------

    pub async fn doctors(&self) -> ApiResult<Vec<Doctor>> {
        let resp = self.gateway.gated(HttpMethod::Get, "/doctors/", None).await?;
        expect_json(resp, "加载医生列表失败")
    }

    pub async fn appointments(&self) -> ApiResult<Vec<Appointment>> {
        let resp = self
            .gateway
            .gated(HttpMethod::Get, "/appointments/", None)
            .await?;
        expect_json(resp, "加载预约列表失败")
    }

    pub async fn create_appointment(
        &self,
        req: &CreateAppointmentRequest,
    ) -> ApiResult<Appointment> {
        let body = RequestBody::json(req)?;
        let resp = self
            .gateway
            .gated(HttpMethod::Post, "/appointments/", Some(body))
            .await?;
        expect_json(resp, "创建预约失败")
    }

    pub async fn cancel_appointment(&self, id: i64) -> ApiResult<()> {
        let path = format!("/appointments/{}/cancel/", id);
        let resp = self.gateway.gated(HttpMethod::Post, &path, None).await?;
        expect_ok(resp, "取消预约失败")
    }

    /// 查询 (doctor, date) 组合的可约时段
    pub async fn available_slots(
        &self,
        doctor_id: i64,
        day: NaiveDate,
    ) -> ApiResult<Vec<TimeSlot>> {
        let path = format!(
            "/appointments/available_slots/?doctor_id={}&date={}",
            doctor_id,
            date::format_day(day)
        );
        let resp = self.gateway.gated(HttpMethod::Get, &path, None).await?;
        expect_json(resp, "加载可约时段失败")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::{TestGateway, gateway_with_session};
    use crate::session::KEY_TOKEN;

    fn api(t: &TestGateway) -> MediBookApi<crate::gateway::tests::MockHttpBackend, crate::session::tests::MockStorage> {
        MediBookApi::new(t.gateway.clone())
    }

    #[tokio::test]
    async fn login_success_writes_session_pair() {
        let t = gateway_with_session(false);
        t.backend.push_response(
            200,
            r#"{"token":"fresh","user":{"id":9,"username":"bo","email":"bo@x.cn"}}"#,
        );

        let api = api(&t);
        let session = api
            .login("bo@x.cn".into(), "secret".into())
            .await
            .unwrap();

        assert_eq!(session.token, "fresh");
        let stored = api.store().get().unwrap();
        assert_eq!(stored.user.id, 9);
        t.backend.with_last_request(|req| {
            assert_eq!(req.url, "http://localhost:8000/api/login/");
            assert!(req.body.as_ref().unwrap().contains("bo@x.cn"));
        });
    }

    #[tokio::test]
    async fn login_failure_surfaces_server_error_verbatim() {
        let t = gateway_with_session(false);
        t.backend.push_response(400, r#"{"error":"Invalid credentials"}"#);

        let err = api(&t)
            .login("bo@x.cn".into(), "wrong".into())
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(api(&t).store().get().is_none());
    }

    #[tokio::test]
    async fn update_profile_replaces_user_wholesale() {
        let t = gateway_with_session(true);
        // 服务端响应不含 avatar：替换后本地不得残留旧值
        t.backend.push_response(
            200,
            r#"{"id":1,"username":"lily","email":"new@x.cn","first_name":"Li","last_name":"Wang"}"#,
        );

        let api = api(&t);
        let update = ProfileUpdate {
            email: "new@x.cn".into(),
            ..Default::default()
        };
        let user = api.update_profile(&update).await.unwrap();

        assert_eq!(user.email, "new@x.cn");
        let stored = api.store().get().unwrap();
        assert_eq!(stored.user.email, "new@x.cn");
        assert!(stored.user.avatar.is_none());
        assert_eq!(stored.token, "tok-123");
    }

    #[tokio::test]
    async fn delete_profile_clears_session() {
        let t = gateway_with_session(true);
        t.backend.push_response(204, "");

        api(&t).delete_profile().await.unwrap();

        assert!(t.gateway.store().get().is_none());
    }

    #[tokio::test]
    async fn delete_profile_failure_keeps_session() {
        let t = gateway_with_session(true);
        t.backend.push_response(500, "");

        let err = api(&t).delete_profile().await.unwrap_err();
        assert_eq!(err.user_message(), "注销账号失败");
        assert!(t.gateway.store().get().is_some());
    }

    #[tokio::test]
    async fn cancel_hits_per_appointment_action_url() {
        let t = gateway_with_session(true);
        t.backend
            .push_response(200, r#"{"message":"Appointment cancelled successfully"}"#);

        api(&t).cancel_appointment(42).await.unwrap();

        t.backend.with_last_request(|req| {
            assert_eq!(req.url, "http://localhost:8000/api/appointments/42/cancel/");
            assert_eq!(req.method, HttpMethod::Post);
        });
    }

    #[tokio::test]
    async fn available_slots_keyed_by_doctor_and_day() {
        let t = gateway_with_session(true);
        t.backend
            .push_response(200, r#"[{"time":"09:00","is_available":true}]"#);

        let day = date::parse_day("2025-03-10").unwrap();
        let slots = api(&t).available_slots(7, day).await.unwrap();

        assert_eq!(slots.len(), 1);
        t.backend.with_last_request(|req| {
            assert_eq!(
                req.url,
                "http://localhost:8000/api/appointments/available_slots/?doctor_id=7&date=2025-03-10"
            );
        });
    }

    #[tokio::test]
    async fn validate_session_returns_locally_stored_user() {
        let t = gateway_with_session(true);
        // 服务端返回的档案与本地不同：以本地为准（保留最近编辑）
        t.backend.push_response(
            200,
            r#"{"id":1,"username":"lily","email":"stale@server.cn"}"#,
        );

        let user = api(&t).validate_session().await.unwrap();
        assert_eq!(user.email, "lily@example.com");
    }

    #[tokio::test]
    async fn validate_session_without_token_makes_no_call() {
        let t = gateway_with_session(false);
        assert!(api(&t).validate_session().await.is_none());
        assert_eq!(t.backend.request_count(), 0);
    }

    #[tokio::test]
    async fn failed_validation_clears_session() {
        let t = gateway_with_session(true);
        t.backend.push_network_error("offline");

        assert!(api(&t).validate_session().await.is_none());
        assert!(t.gateway.store().get().is_none());
    }

    #[tokio::test]
    async fn rejected_validation_clears_session_and_redirects() {
        let t = gateway_with_session(true);
        t.backend.push_response(401, "");

        assert!(api(&t).validate_session().await.is_none());
        assert!(t.gateway.store().get().is_none());
        assert_eq!(t.redirected.get(), 1);
    }

    #[test]
    fn storage_keys_are_stable() {
        // 持久化契约：换键名会把所有用户登出
        assert_eq!(KEY_TOKEN, "medibook_token");
    }
}
