//! 个人档案页
//!
//! 表单整表提交（PATCH），服务端响应整体替换本地用户摘要；
//! 头像上传走 multipart，单独的进行中标志；注销账号后跳转
//! 注册页。

use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::time::Duration;

use medibook_shared::{ProfileUpdate, UserSummary, date};

use crate::auth::use_api;
use crate::config;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let api = use_api();
    let router = use_router();

    let (is_loading, set_is_loading) = signal(true);
    let (is_saving, set_is_saving) = signal(false);
    let (is_uploading, set_is_uploading) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (success_msg, set_success_msg) = signal(Option::<String>::None);

    let (first_name, set_first_name) = signal(String::new());
    let (last_name, set_last_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (phone, set_phone) = signal(String::new());
    let (birthday, set_birthday) = signal(String::new());
    let (medical_history, set_medical_history) = signal(String::new());
    let (avatar, set_avatar) = signal(Option::<String>::None);
    let (initials, set_initials) = signal(String::new());

    let file_input: NodeRef<html::Input> = NodeRef::new();

    let fill_form = move |user: &UserSummary| {
        set_first_name.set(user.first_name.clone());
        set_last_name.set(user.last_name.clone());
        set_email.set(user.email.clone());
        set_phone.set(user.phone.clone());
        set_birthday.set(user.birthday.map(date::format_day).unwrap_or_default());
        set_medical_history.set(user.medical_history.clone().unwrap_or_default());
        set_avatar.set(user.avatar.clone());
        set_initials.set(user.initials());
    };

    {
        let api = api.get_value();
        spawn_local(async move {
            match api.fetch_profile().await {
                Ok(user) => fill_form(&user),
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_loading.set(false);
        });
    }

    let flash_success = move |msg: &str| {
        set_success_msg.set(Some(msg.to_string()));
        set_timeout(
            move || set_success_msg.set(None),
            Duration::from_secs(3),
        );
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_saving.set(true);
        set_error_msg.set(None);

        let update = ProfileUpdate {
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
            email: email.get_untracked(),
            phone: phone.get_untracked(),
            birthday: date::parse_day(&birthday.get_untracked()),
            medical_history: medical_history.get_untracked(),
        };

        let api = api.get_value();
        spawn_local(async move {
            match api.update_profile(&update).await {
                Ok(user) => {
                    fill_form(&user);
                    flash_success("档案已更新");
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_saving.set(false);
        });
    };

    let on_avatar_change = move |_ev: leptos::web_sys::Event| {
        let Some(input) = file_input.get_untracked() else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        let Ok(form) = web_sys::FormData::new() else {
            return;
        };
        if form.append_with_blob("avatar", &file).is_err() {
            return;
        }

        set_is_uploading.set(true);
        set_error_msg.set(None);

        let api = api.get_value();
        spawn_local(async move {
            match api.upload_avatar(form).await {
                Ok(user) => {
                    fill_form(&user);
                    flash_success("头像已更新");
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_uploading.set(false);
        });
    };

    let on_delete = move |_| {
        if !confirm("注销后账号与全部预约记录将被删除，且无法恢复。确定继续吗？") {
            return;
        }
        let api = api.get_value();
        spawn_local(async move {
            match api.delete_profile().await {
                Ok(()) => router.navigate_route(AppRoute::Register),
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
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
        <div class="max-w-2xl mx-auto p-4">
            <h1 class="text-2xl font-bold mb-4">"个人档案"</h1>

            <Show when=move || error_msg.get().is_some()>
                <div role="alert" class="alert alert-error text-sm py-2 mb-4">
                    <span>{move || error_msg.get().unwrap_or_default()}</span>
                </div>
            </Show>
            <Show when=move || success_msg.get().is_some()>
                <div role="alert" class="alert alert-success text-sm py-2 mb-4">
                    <span>{move || success_msg.get().unwrap_or_default()}</span>
                </div>
            </Show>

            <Show
                when=move || !is_loading.get()
                fallback=|| view! {
                    <div class="flex justify-center py-16">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                }
            >
                <div class="card bg-base-100 shadow-sm mb-4">
                    <div class="card-body flex-row items-center gap-4">
                        {move || match avatar.get() {
                            Some(path) => view! {
                                <div class="avatar">
                                    <div class="w-20 rounded-full">
                                        <img src=config::media_url(&path) alt="avatar" />
                                    </div>
                                </div>
                            }
                            .into_any(),
                            None => view! {
                                <div class="avatar placeholder">
                                    <div class="bg-primary text-primary-content w-20 rounded-full">
                                        <span class="text-2xl">{initials}</span>
                                    </div>
                                </div>
                            }
                            .into_any(),
                        }}
                        <div>
                            <input
                                type="file"
                                accept="image/*"
                                class="hidden"
                                node_ref=file_input
                                on:change=on_avatar_change
                            />
                            <button
                                class="btn btn-outline btn-sm"
                                disabled=move || is_uploading.get()
                                on:click=move |_| {
                                    if let Some(input) = file_input.get_untracked() {
                                        input.click();
                                    }
                                }
                            >
                                {move || if is_uploading.get() {
                                    view! {
                                        <span class="loading loading-spinner loading-xs"></span>
                                        "上传中..."
                                    }
                                    .into_any()
                                } else {
                                    "更换头像".into_any()
                                }}
                            </button>
                        </div>
                    </div>
                </div>

                <form class="card bg-base-100 shadow-sm" on:submit=on_submit>
                    <div class="card-body gap-2">
                        <div class="grid grid-cols-2 gap-2">
                            {text_field("first_name", "名", "text", first_name, set_first_name)}
                            {text_field("last_name", "姓", "text", last_name, set_last_name)}
                        </div>
                        {text_field("email", "邮箱", "email", email, set_email)}
                        {text_field("phone", "电话", "tel", phone, set_phone)}
                        {text_field("birthday", "出生日期", "date", birthday, set_birthday)}

                        <div class="form-control">
                            <label class="label" for="medical_history">
                                <span class="label-text">"病史"</span>
                            </label>
                            <textarea
                                id="medical_history"
                                class="textarea textarea-bordered"
                                rows="3"
                                prop:value=medical_history
                                on:input=move |ev| set_medical_history.set(event_target_value(&ev))
                            ></textarea>
                        </div>

                        <div class="card-actions justify-end mt-4">
                            <button class="btn btn-primary" disabled=move || is_saving.get()>
                                {move || if is_saving.get() {
                                    view! { <span class="loading loading-spinner"></span> "保存中..." }
                                        .into_any()
                                } else {
                                    "保存修改".into_any()
                                }}
                            </button>
                        </div>
                    </div>
                </form>

                <div class="card bg-base-100 shadow-sm mt-4 border border-error/30">
                    <div class="card-body flex-row items-center justify-between">
                        <div>
                            <h2 class="font-semibold text-error">"注销账号"</h2>
                            <p class="text-sm text-base-content/60">
                                "删除账号与全部预约记录，不可恢复"
                            </p>
                        </div>
                        <button class="btn btn-error btn-outline btn-sm" on:click=on_delete>
                            "注销"
                        </button>
                    </div>
                </div>
            </Show>
        </div>
    }
}
