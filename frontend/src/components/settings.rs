//! 偏好设置页
//!
//! 纯本地偏好，写入 localStorage 即生效，不产生任何服务端请求。
//! 主题切换直接改写 `<html data-theme>`（daisyUI 主题机制）。

use leptos::prelude::*;

use crate::web::LocalStorage;

const KEY_THEME: &str = "medibook_theme";
const KEY_LANGUAGE: &str = "medibook_language";
const KEY_REMINDERS: &str = "medibook_reminders";

fn apply_theme(theme: &str) {
    if let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    {
        let _ = root.set_attribute("data-theme", theme);
    }
}

/// 应用启动时恢复已保存的主题
pub fn restore_theme() {
    if let Some(theme) = LocalStorage::get(KEY_THEME) {
        apply_theme(&theme);
    }
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let (theme, set_theme) = signal(
        LocalStorage::get(KEY_THEME).unwrap_or_else(|| "light".to_string()),
    );
    let (language, set_language) = signal(
        LocalStorage::get(KEY_LANGUAGE).unwrap_or_else(|| "zh-CN".to_string()),
    );
    let (reminders, set_reminders) = signal(
        LocalStorage::get(KEY_REMINDERS).as_deref() != Some("off"),
    );

    let on_theme = move |ev: leptos::web_sys::Event| {
        let value = event_target_value(&ev);
        LocalStorage::set(KEY_THEME, &value);
        apply_theme(&value);
        set_theme.set(value);
    };

    let on_language = move |ev: leptos::web_sys::Event| {
        let value = event_target_value(&ev);
        LocalStorage::set(KEY_LANGUAGE, &value);
        set_language.set(value);
    };

    let on_reminders = move |_| {
        let next = !reminders.get_untracked();
        LocalStorage::set(KEY_REMINDERS, if next { "on" } else { "off" });
        set_reminders.set(next);
    };

    view! {
        <div class="max-w-2xl mx-auto p-4">
            <h1 class="text-2xl font-bold mb-4">"偏好设置"</h1>

            <div class="card bg-base-100 shadow-sm">
                <div class="card-body gap-4">
                    <div class="form-control">
                        <label class="label" for="theme">
                            <span class="label-text">"界面主题"</span>
                        </label>
                        <select
                            id="theme"
                            class="select select-bordered"
                            on:change=on_theme
                            prop:value=theme
                        >
                            <option value="light">"浅色"</option>
                            <option value="dark">"深色"</option>
                        </select>
                    </div>

                    <div class="form-control">
                        <label class="label" for="language">
                            <span class="label-text">"语言"</span>
                        </label>
                        <select
                            id="language"
                            class="select select-bordered"
                            on:change=on_language
                            prop:value=language
                        >
                            <option value="zh-CN">"简体中文"</option>
                            <option value="en">"English"</option>
                        </select>
                    </div>

                    <div class="form-control">
                        <label class="label cursor-pointer justify-start gap-3">
                            <input
                                type="checkbox"
                                class="toggle toggle-primary"
                                prop:checked=reminders
                                on:change=on_reminders
                            />
                            <span class="label-text">"就诊前提醒"</span>
                        </label>
                        <p class="text-xs text-base-content/60 ml-1">
                            "偏好仅保存在本设备浏览器中"
                        </p>
                    </div>
                </div>
            </div>
        </div>
    }
}
