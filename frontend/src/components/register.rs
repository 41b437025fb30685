//! 注册页
//!
//! 注册成功后服务端直接返回凭据，行为与登录一致：
//! 会话写入、守卫自动跳转到预约列表。

use leptos::prelude::*;
use leptos::task::spawn_local;

use medibook_shared::RegisterRequest;

use crate::auth::use_api;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let api = use_api();
    let router = use_router();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (first_name, set_first_name) = signal(String::new());
    let (last_name, set_last_name) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if email.get().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("请填写邮箱和密码".to_string()));
            return;
        }
        if password.get() != confirm.get() {
            set_error_msg.set(Some("两次输入的密码不一致".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let api = api.get_value();
        spawn_local(async move {
            let req = RegisterRequest {
                email: email.get_untracked(),
                password: password.get_untracked(),
                first_name: first_name.get_untracked(),
                last_name: last_name.get_untracked(),
            };
            if let Err(e) = api.register(req).await {
                set_error_msg.set(Some(e.user_message()));
            }
            set_is_submitting.set(false);
        });
    };

    let text_field = move |id: &'static str,
                           label: &'static str,
                           input_type: &'static str,
                           value: ReadSignal<String>,
                           setter: WriteSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=input_type
                    on:input=move |ev| setter.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                />
            </div>
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-2">
                    <h1 class="text-3xl font-bold">"创建账号"</h1>
                    <p class="text-base-content/70 mt-1">"注册后即可在线预约就诊"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="grid grid-cols-2 gap-2">
                            {text_field("first_name", "名", "text", first_name, set_first_name)}
                            {text_field("last_name", "姓", "text", last_name, set_last_name)}
                        </div>
                        {text_field("email", "邮箱", "email", email, set_email)}
                        {text_field("password", "密码", "password", password, set_password)}
                        {text_field("confirm", "确认密码", "password", confirm, set_confirm)}

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "注册中..." }.into_any()
                                } else {
                                    "注册".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm mt-2">
                            "已有账号？"
                            <a
                                class="link link-primary ml-1"
                                on:click=move |_| router.navigate_route(AppRoute::Login)
                            >
                                "去登录"
                            </a>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
