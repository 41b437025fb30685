//! MediBook 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `session` / `gateway` / `api`: 会话存储、认证网关与类型化客户端
//! - `web::route` / `web::router`: 路由定义与路由服务
//! - `auth`: 认证状态管理
//! - `booking` / `appointments`: 纯状态机（不触碰 DOM）
//! - `components`: UI 组件层

// 跨平台日志宏：浏览器输出到 console，原生（测试）输出到标准流。
// 必须先于模块声明定义，子模块按文本作用域直接使用。
#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($arg:tt)*) => {
        web_sys::console::log_1(&format!($($arg)*).into())
    };
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($arg:tt)*) => {
        println!($($arg)*)
    };
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($arg:tt)*) => {
        web_sys::console::error_1(&format!($($arg)*).into())
    };
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($arg:tt)*) => {
        eprintln!($($arg)*)
    };
}

mod api;
mod appointments;
mod auth;
mod booking;
mod components {
    pub mod appointment_list;
    mod icons;
    pub mod login;
    pub mod navbar;
    pub mod new_appointment;
    pub mod profile;
    pub mod register;
    pub mod settings;
}
mod config;
mod error;
mod gateway;
mod session;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use http::{HttpClient, HttpMethod};
    pub use storage::LocalStorage;
}

use leptos::prelude::*;

use crate::api::MediBookApi;
use crate::auth::{Api, AuthContext, init_auth, provide_api};
use crate::components::appointment_list::AppointmentListPage;
use crate::components::login::LoginPage;
use crate::components::navbar::Navbar;
use crate::components::new_appointment::NewAppointmentPage;
use crate::components::profile::ProfilePage;
use crate::components::register::RegisterPage;
use crate::components::settings::{SettingsPage, restore_theme};
use crate::gateway::{Gateway, WebHttpBackend};
use crate::session::SessionStore;
use crate::web::LocalStorage;
use crate::web::route::AppRoute;
use crate::web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Appointments => view! { <AppointmentListPage /> }.into_any(),
        AppRoute::NewAppointment => view! { <NewAppointmentPage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::Settings => view! { <SettingsPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    restore_theme();

    // 1. 会话存储与 API 客户端（全局唯一实例）
    let store = SessionStore::new(LocalStorage);
    let api: Api = MediBookApi::new(Gateway::new(
        WebHttpBackend,
        store,
        config::API_BASE_URL,
        // 401 的跳转在这里委托给路由层：网关清除会话后，会话
        // 订阅桥把认证信号翻为未登录，路由服务的认证监听随即
        // 替换历史并落到登录页，钩子本身只补一条日志。
        || log_info!("[App] Credentials rejected by server."),
    ));
    provide_api(api.clone());

    // 2. 创建认证上下文并校验已持久化的会话
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);
    init_auth(&auth_ctx, &api);

    // 3. 获取认证状态信号，用于注入路由服务（解耦！）
    let is_authenticated = auth_ctx.is_authenticated_signal();
    let is_loading = move || auth_ctx.state.get().is_loading;

    view! {
        // 校验完成前不挂载路由器，避免守卫基于未定状态误跳转
        <Show
            when=move || !is_loading()
            fallback=|| view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
        >
            <Router is_authenticated=is_authenticated>
                <div class="min-h-screen bg-base-200">
                    <Navbar />
                    <RouterOutlet matcher=route_matcher />
                </div>
            </Router>
        </Show>
    }
}
