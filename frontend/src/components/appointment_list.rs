//! 预约列表页
//!
//! 进入页面即拉取列表；取消操作先经浏览器确认框，按 ID 独立
//! 跟踪进行中的取消，成功后本地按 ID 移除对应行。

use leptos::prelude::*;
use leptos::task::spawn_local;

use medibook_shared::{Appointment, AppointmentStatus};

use crate::appointments::AppointmentsState;
use crate::auth::use_api;
use crate::components::icons::{CalendarIcon, PlusIcon};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

/// "2025-03-12T09:00:00" -> ("2025-03-12", "09:00")
fn split_when(date: &str) -> (String, String) {
    match date.split_once('T') {
        Some((day, time)) => (day.to_string(), time.chars().take(5).collect()),
        None => (date.to_string(), String::new()),
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn status_badge(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Scheduled => "badge badge-primary badge-outline",
        AppointmentStatus::Completed => "badge badge-success badge-outline",
        AppointmentStatus::Cancelled => "badge badge-ghost",
    }
}

#[component]
pub fn AppointmentListPage() -> impl IntoView {
    let api = use_api();
    let router = use_router();

    let state = RwSignal::new(AppointmentsState::default());
    let (is_loading, set_is_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    {
        let api = api.get_value();
        spawn_local(async move {
            match api.appointments().await {
                Ok(items) => state.set(AppointmentsState::new(items)),
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_loading.set(false);
        });
    }

    let on_cancel = move |id: i64| {
        if !confirm("确定要取消这条预约吗？") {
            return;
        }
        state.update(|s| s.begin_cancel(id));
        set_error_msg.set(None);

        let api = api.get_value();
        spawn_local(async move {
            match api.cancel_appointment(id).await {
                Ok(()) => state.update(|s| s.finish_cancel_ok(id)),
                Err(e) => {
                    state.update(|s| s.finish_cancel_err(id));
                    set_error_msg.set(Some(e.user_message()));
                }
            }
        });
    };

    let row = move |apt: Appointment| {
        let id = apt.id;
        let (day, time) = split_when(&apt.date);
        let cancellable = apt.is_cancellable();
        view! {
            <tr>
                <td class="font-medium">{apt.doctor_name.clone()}</td>
                <td>{day}</td>
                <td>{time}</td>
                <td>
                    <span class=status_badge(apt.status)>{apt.status.label()}</span>
                </td>
                <td class="text-base-content/70 max-w-48 truncate">{apt.notes.clone()}</td>
                <td class="text-right">
                    <Show when=move || cancellable>
                        <button
                            class="btn btn-error btn-outline btn-xs"
                            disabled=move || state.with(|s| s.is_cancelling(id))
                            on:click=move |_| on_cancel(id)
                        >
                            {move || if state.with(|s| s.is_cancelling(id)) {
                                view! { <span class="loading loading-spinner loading-xs"></span> }
                                    .into_any()
                            } else {
                                "取消".into_any()
                            }}
                        </button>
                    </Show>
                </td>
            </tr>
        }
    };

    view! {
        <div class="max-w-4xl mx-auto p-4">
            <div class="flex items-center justify-between mb-4">
                <h1 class="text-2xl font-bold flex items-center gap-2">
                    <span class="h-6 w-6 text-primary"><CalendarIcon /></span>
                    "我的预约"
                </h1>
                <button
                    class="btn btn-primary btn-sm gap-1"
                    on:click=move |_| router.navigate_route(AppRoute::NewAppointment)
                >
                    <span class="h-4 w-4"><PlusIcon /></span>
                    "新建预约"
                </button>
            </div>

            <Show when=move || error_msg.get().is_some()>
                <div role="alert" class="alert alert-error text-sm py-2 mb-4">
                    <span>{move || error_msg.get().unwrap_or_default()}</span>
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
                <Show
                    when=move || state.with(|s| !s.is_empty())
                    fallback=move || view! {
                        <div class="card bg-base-100 shadow-sm">
                            <div class="card-body items-center text-center py-16">
                                <p class="text-base-content/60">"暂无预约记录"</p>
                                <button
                                    class="btn btn-primary btn-sm mt-2"
                                    on:click=move |_| router.navigate_route(AppRoute::NewAppointment)
                                >
                                    "立即预约"
                                </button>
                            </div>
                        </div>
                    }
                >
                    <div class="card bg-base-100 shadow-sm overflow-x-auto">
                        <table class="table">
                            <thead>
                                <tr>
                                    <th>"医生"</th>
                                    <th>"日期"</th>
                                    <th>"时间"</th>
                                    <th>"状态"</th>
                                    <th>"备注"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || state.with(|s| s.items.clone())
                                    key=|apt| apt.id
                                    children=row
                                />
                            </tbody>
                        </table>
                    </div>
                </Show>
            </Show>
        </div>
    }
}
