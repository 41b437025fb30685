//! 顶部导航栏
//!
//! 只在已认证时渲染；认证状态来自会话订阅驱动的信号，
//! 登出后整条导航栏随信号消失。

use leptos::prelude::*;

use crate::auth::{logout, use_api, use_auth};
use crate::components::icons::{CalendarIcon, LogoutIcon, PlusIcon, StethoscopeIcon};
use crate::config;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let router = use_router();

    let is_authenticated = move || auth.state.get().is_authenticated;

    let nav_link = move |route: AppRoute, label: &'static str, icon: AnyView| {
        let active = move || router.current_route().get() == route;
        view! {
            <li>
                <a
                    class=move || if active() { "active" } else { "" }
                    on:click=move |_| router.navigate_route(route)
                >
                    <span class="h-4 w-4">{icon}</span>
                    {label}
                </a>
            </li>
        }
    };

    let on_logout = move |_| {
        logout(api.get_value());
    };

    view! {
        <Show
            when=is_authenticated
            fallback=move || view! {
                <div class="navbar bg-base-100 shadow-sm px-4">
                    <div class="flex-1">
                        <a class="btn btn-ghost text-xl gap-2 text-primary">
                            <span class="h-6 w-6"><StethoscopeIcon /></span>
                            "MediBook"
                        </a>
                    </div>
                    <div class="flex-none gap-2">
                        <button
                            class="btn btn-ghost btn-sm"
                            on:click=move |_| router.navigate_route(AppRoute::Login)
                        >
                            "登录"
                        </button>
                        <button
                            class="btn btn-primary btn-sm"
                            on:click=move |_| router.navigate_route(AppRoute::Register)
                        >
                            "注册"
                        </button>
                    </div>
                </div>
            }
        >
            <div class="navbar bg-base-100 shadow-sm px-4">
                <div class="flex-1">
                    <a
                        class="btn btn-ghost text-xl gap-2 text-primary"
                        on:click=move |_| router.navigate_route(AppRoute::Appointments)
                    >
                        <span class="h-6 w-6"><StethoscopeIcon /></span>
                        "MediBook"
                    </a>
                </div>
                <div class="flex-none gap-1">
                    <ul class="menu menu-horizontal px-1 gap-1">
                        {nav_link(
                            AppRoute::Appointments,
                            "我的预约",
                            view! { <CalendarIcon /> }.into_any(),
                        )}
                        {nav_link(
                            AppRoute::NewAppointment,
                            "新建预约",
                            view! { <PlusIcon /> }.into_any(),
                        )}
                    </ul>

                    <div class="dropdown dropdown-end">
                        <div tabindex="0" role="button" class="btn btn-ghost btn-circle avatar">
                            {move || {
                                let user = auth.state.get().user;
                                match user.as_ref().and_then(|u| u.avatar.clone()) {
                                    Some(path) => view! {
                                        <div class="w-9 rounded-full">
                                            <img src=config::media_url(&path) alt="avatar" />
                                        </div>
                                    }
                                    .into_any(),
                                    None => view! {
                                        <div class="avatar placeholder">
                                            <div class="bg-primary text-primary-content w-9 rounded-full">
                                                <span class="text-sm">
                                                    {user.map(|u| u.initials()).unwrap_or_default()}
                                                </span>
                                            </div>
                                        </div>
                                    }
                                    .into_any(),
                                }
                            }}
                        </div>
                        <ul
                            tabindex="0"
                            class="menu menu-sm dropdown-content bg-base-100 rounded-box z-10 mt-3 w-44 p-2 shadow"
                        >
                            <li class="menu-title">
                                {move || {
                                    auth.state.get().user.map(|u| u.full_name()).unwrap_or_default()
                                }}
                            </li>
                            <li>
                                <a on:click=move |_| router.navigate_route(AppRoute::Profile)>
                                    "个人档案"
                                </a>
                            </li>
                            <li>
                                <a on:click=move |_| router.navigate_route(AppRoute::Settings)>
                                    "偏好设置"
                                </a>
                            </li>
                            <li>
                                <a class="text-error" on:click=on_logout>
                                    <span class="h-4 w-4"><LogoutIcon /></span>
                                    "退出登录"
                                </a>
                            </li>
                        </ul>
                    </div>
                </div>
            </div>
        </Show>
    }
}
