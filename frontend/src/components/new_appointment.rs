//! 新建预约页
//!
//! 组件层只负责把用户输入喂给 `BookingState` 并按票据发起
//! 时段查询，状态流转全部在状态机内完成。

use leptos::prelude::*;
use leptos::task::spawn_local;

use medibook_shared::date;

use crate::auth::{Api, use_api};
use crate::booking::{BookingPhase, BookingState, SlotTicket, SlotsState};
use crate::components::icons::ClockIcon;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// 按票据发起时段查询，结果连同票据交回状态机裁决
fn fetch_slots(api: Api, state: RwSignal<BookingState>, ticket: SlotTicket) {
    spawn_local(async move {
        match api.available_slots(ticket.doctor, ticket.date).await {
            Ok(slots) => {
                state.update(|s| {
                    s.apply_slots(ticket, slots);
                });
            }
            Err(e) => {
                log_error!("[Booking] Slot fetch failed: {}", e);
                state.update(|s| {
                    s.slots_failed(ticket);
                });
            }
        }
    });
}

#[component]
pub fn NewAppointmentPage() -> impl IntoView {
    let api = use_api();
    let router = use_router();

    let state = RwSignal::new(BookingState::new(Vec::new()));
    let (is_loading, set_is_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    {
        let api = api.get_value();
        spawn_local(async move {
            match api.doctors().await {
                Ok(doctors) => state.set(BookingState::new(doctors)),
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_loading.set(false);
        });
    }

    let on_doctor_change = move |ev: leptos::web_sys::Event| {
        let value = event_target_value(&ev);
        let Ok(doctor_id) = value.parse::<i64>() else {
            return;
        };
        let mut ticket = None;
        state.update(|s| ticket = s.select_doctor(doctor_id));
        if let Some(ticket) = ticket {
            fetch_slots(api.get_value(), state, ticket);
        }
    };

    let on_date_change = move |ev: leptos::web_sys::Event| {
        let Some(day) = date::parse_day(&event_target_value(&ev)) else {
            return;
        };
        let mut picked = Ok(None);
        state.update(|s| picked = s.select_date(today(), day));
        match picked {
            Ok(Some(ticket)) => {
                set_error_msg.set(None);
                fetch_slots(api.get_value(), state, ticket);
            }
            Ok(None) => set_error_msg.set(None),
            Err(e) => set_error_msg.set(Some(e.user_message())),
        }
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let request = match state.with_untracked(|s| s.submission()) {
            Ok(req) => req,
            Err(e) => {
                set_error_msg.set(Some(e.user_message()));
                return;
            }
        };
        state.update(|s| s.begin_submit());
        set_error_msg.set(None);

        let api = api.get_value();
        spawn_local(async move {
            match api.create_appointment(&request).await {
                Ok(_) => router.navigate_route(AppRoute::Appointments),
                Err(e) => {
                    state.update(|s| s.submit_failed());
                    set_error_msg.set(Some(e.user_message()));
                }
            }
        });
    };

    let slot_grid = move || {
        let slots = match state.with(|s| s.slots.clone()) {
            SlotsState::Ready(slots) => slots,
            _ => return ().into_any(),
        };
        if slots.is_empty() {
            return view! {
                <p class="text-sm text-base-content/60 py-2">"该日期已无可约时段，请换一天"</p>
            }
            .into_any();
        }
        view! {
            <div class="grid grid-cols-4 gap-2">
                {slots
                    .into_iter()
                    .map(|slot| {
                        let time = slot.time.clone();
                        let selected =
                            move || state.with(|s| s.time.as_deref() == Some(time.as_str()));
                        let pick = slot.time.clone();
                        view! {
                            <button
                                type="button"
                                class=move || {
                                    if selected() { "btn btn-sm btn-primary" }
                                    else { "btn btn-sm btn-outline" }
                                }
                                disabled=!slot.is_available
                                on:click=move |_| state.update(|s| s.select_time(&pick))
                            >
                                {slot.time.clone()}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
        }
        .into_any()
    };

    view! {
        <div class="max-w-2xl mx-auto p-4">
            <h1 class="text-2xl font-bold mb-4 flex items-center gap-2">
                <span class="h-6 w-6 text-primary"><ClockIcon /></span>
                "新建预约"
            </h1>

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
                <form class="card bg-base-100 shadow-sm" on:submit=on_submit>
                    <div class="card-body gap-4">
                        <div class="form-control">
                            <label class="label" for="doctor">
                                <span class="label-text">"选择医生"</span>
                            </label>
                            <select
                                id="doctor"
                                class="select select-bordered"
                                on:change=on_doctor_change
                            >
                                <option value="" selected disabled>"请选择"</option>
                                {move || {
                                    state
                                        .with(|s| s.doctors.clone())
                                        .into_iter()
                                        .map(|d| view! {
                                            <option value=d.id.to_string()>
                                                {format!("{} · {}", d.name, d.specialization)}
                                            </option>
                                        })
                                        .collect_view()
                                }}
                            </select>
                        </div>

                        <div class="form-control">
                            <label class="label" for="date">
                                <span class="label-text">"就诊日期（仅工作日）"</span>
                            </label>
                            <input
                                id="date"
                                type="date"
                                class="input input-bordered"
                                min=date::format_day(today())
                                on:change=on_date_change
                            />
                        </div>

                        <Show when=move || state.with(|s| s.phase() == BookingPhase::SlotsLoading)>
                            <div class="flex items-center gap-2 text-sm text-base-content/60 py-2">
                                <span class="loading loading-spinner loading-sm"></span>
                                "正在查询可约时段..."
                            </div>
                        </Show>

                        {slot_grid}

                        <div class="form-control">
                            <label class="label" for="notes">
                                <span class="label-text">"备注（可选）"</span>
                            </label>
                            <textarea
                                id="notes"
                                class="textarea textarea-bordered"
                                rows="3"
                                placeholder="简要描述症状或需求"
                                on:input=move |ev| {
                                    let notes = event_target_value(&ev);
                                    state.update(|s| s.set_notes(notes));
                                }
                            ></textarea>
                        </div>

                        <div class="card-actions justify-end mt-2">
                            <button
                                type="button"
                                class="btn btn-ghost"
                                on:click=move |_| router.navigate_route(AppRoute::Appointments)
                            >
                                "返回"
                            </button>
                            <button
                                type="submit"
                                class="btn btn-primary"
                                disabled=move || {
                                    state.with(|s| {
                                        s.time.is_none() || s.phase() == BookingPhase::Submitting
                                    })
                                }
                            >
                                {move || {
                                    if state.with(|s| s.phase() == BookingPhase::Submitting) {
                                        view! {
                                            <span class="loading loading-spinner"></span>
                                            "提交中..."
                                        }
                                        .into_any()
                                    } else {
                                        "确认预约".into_any()
                                    }
                                }}
                            </button>
                        </div>
                    </div>
                </form>
            </Show>
        </div>
    }
}
