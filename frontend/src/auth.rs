//! 认证模块
//!
//! 管理用户认证状态，与路由系统解耦。
//! 路由服务通过注入的认证信号来检查认证状态；会话存储的
//! 每次变化（登录、登出、401 清除）都经订阅通道同步到这里
//! 的信号，组件永远不直接读底层存储。

use leptos::prelude::*;
use leptos::task::spawn_local;

use medibook_shared::UserSummary;

use crate::api::MediBookApi;
use crate::gateway::WebHttpBackend;
use crate::web::LocalStorage;

/// 浏览器环境下的具体 API 客户端
pub type Api = MediBookApi<WebHttpBackend, LocalStorage>;

/// 存入 Context 的 API 客户端句柄
///
/// 客户端内部持有 `Rc`，不能直接作为 Context 值（Context 要求
/// `Send + Sync`）；`StoredValue` 的本线程存储把它寄存在当前
/// 线程的 arena 里，句柄本身是 `Copy + Send + Sync` 的键，
/// 视图闭包可以随意捕获，用时再取出客户端。
pub type ApiHandle = StoredValue<Api, leptos::prelude::LocalStorage>;

/// 认证状态
#[derive(Clone)]
pub struct AuthState {
    /// 当前用户摘要（仅在已认证时存在）
    pub user: Option<UserSummary>,
    /// 是否已认证
    pub is_authenticated: bool,
    /// 启动校验是否仍在进行
    pub is_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            // 校验完成前不渲染受保护内容，避免闪烁
            is_loading: true,
        }
    }
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 认证状态（只读）
    pub state: ReadSignal<AuthState>,
    /// 设置认证状态（写入）
    set_state: WriteSignal<AuthState>,
}

impl AuthContext {
    /// 创建新的认证上下文
    pub fn new() -> Self {
        let (state, set_state) = signal(AuthState::default());
        Self { state, set_state }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get().is_authenticated)
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 把 API 客户端寄存到 Context，返回可复制的句柄
pub fn provide_api(api: Api) -> ApiHandle {
    let handle = StoredValue::new_local(api);
    provide_context(handle);
    handle
}

/// 从 Context 获取 API 客户端句柄
pub fn use_api() -> ApiHandle {
    use_context::<ApiHandle>().expect("Api should be provided")
}

/// 初始化认证状态
///
/// 先把会话存储桥接到认证信号，再对已持久化的会话发起一次
/// 服务端校验。校验结束前 `is_loading` 保持为 true。
pub fn init_auth(ctx: &AuthContext, api: &Api) {
    // 存储变化 -> 信号联动。登录、登出和 401 清除都经此生效。
    let set_state = ctx.set_state;
    api.store().subscribe(move |session| {
        let user = session.map(|s| s.user.clone());
        set_state.update(|state| {
            state.is_authenticated = user.is_some();
            state.user = user;
            state.is_loading = false;
        });
    });

    let set_state = ctx.set_state;
    if api.store().get().is_none() {
        // 无本地凭据，直接以未登录态启动
        set_state.update(|state| state.is_loading = false);
        return;
    }

    let api = api.clone();
    spawn_local(async move {
        let user = api.validate_session().await;
        set_state.update(|state| {
            state.is_authenticated = user.is_some();
            state.user = user;
            state.is_loading = false;
        });
    });
}

/// 注销并清除状态
///
/// 先尽力通知服务端作废 token，无论成败都清除本地会话；
/// 导航由路由服务的认证状态监听自动处理。
pub fn logout(api: Api) {
    spawn_local(async move {
        if let Err(e) = api.logout().await {
            log_info!("[Auth] Server-side logout failed, clearing locally: {}", e);
        }
        api.store().clear();
    });
}
