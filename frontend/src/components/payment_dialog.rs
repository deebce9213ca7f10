mod form_state;

use std::time::Duration;

use crate::components::icons::{AlertTriangle, CheckCircle, CreditCard};
use crate::config::use_config;
use crate::entitlement::PremiumStore;
use crate::payment::{PaymentReceipt, PlanSelection, submit_payment};
use crate::web::BrowserStorage;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use form_state::FormState;
use leptos::prelude::*;
use leptos::task::spawn_local;
use litreview_shared::date::{Clock, SystemClock};

const ERROR_HIDE_AFTER: Duration = Duration::from_secs(5);
const REDIRECT_AFTER: Duration = Duration::from_millis(3500);

/// 支付弹窗
///
/// `selection` 为 `Some` 时打开；成功后展示回执并跳转到生成器。
#[component]
pub fn PaymentDialog(
    selection: RwSignal<Option<PlanSelection>>,
) -> impl IntoView {
    let config = use_config();
    let router = use_router();
    let form = FormState::new();
    let (loading, set_loading) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (receipt, set_receipt) = signal(Option::<PaymentReceipt>::None);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if selection.get().is_some() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    // 错误提示 5 秒后自动隐藏
    Effect::new(move |_| {
        if error_msg.get().is_some() {
            set_timeout(move || set_error_msg.set(None), ERROR_HIDE_AFTER);
        }
    });

    let close = move || {
        selection.set(None);
        set_error_msg.set(None);
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(chosen) = selection.get_untracked() else {
            return;
        };
        set_loading.set(true);
        set_error_msg.set(None);

        let api = config.api();
        let payment_form = form.to_form();
        spawn_local(async move {
            let premium = PremiumStore::new(BrowserStorage);
            let result = submit_payment(&api, &premium, &payment_form, chosen, SystemClock.now()).await;
            set_loading.set(false);
            match result {
                Ok(r) => {
                    form.reset();
                    selection.set(None);
                    set_receipt.set(Some(r));
                    set_timeout(
                        move || {
                            set_receipt.set(None);
                            router.navigate(AppRoute::Dashboard);
                        },
                        REDIRECT_AFTER,
                    );
                }
                Err(e) => set_error_msg.set(Some(e.to_string())),
            }
        });
    };

    let title = move || {
        selection
            .get()
            .map(|s| format!("{} · {}{}", s.plan.display_name(), s.price_label(), s.billing.period_label()))
            .unwrap_or_default()
    };

    view! {
        <dialog class="modal" node_ref=dialog_ref on:close=move |_| close()>
            <div class="modal-box">
                <h3 class="font-bold text-lg flex items-center gap-2">
                    <CreditCard attr:class="h-5 w-5" /> {title}
                </h3>

                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error text-sm py-2 mt-4">
                        <AlertTriangle attr:class="h-4 w-4" />
                        <span>{move || error_msg.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <form on:submit=on_submit class="space-y-4 mt-4">
                    <div class="grid grid-cols-2 gap-4">
                        <input type="text" placeholder="First name" class="input input-bordered w-full"
                            prop:value=form.first_name
                            on:input=move |ev| form.first_name.set(event_target_value(&ev))
                        />
                        <input type="text" placeholder="Last name" class="input input-bordered w-full"
                            prop:value=form.last_name
                            on:input=move |ev| form.last_name.set(event_target_value(&ev))
                        />
                    </div>
                    <input type="email" placeholder="Email" class="input input-bordered w-full"
                        prop:value=form.email
                        on:input=move |ev| form.email.set(event_target_value(&ev))
                    />
                    <input type="tel" placeholder="Phone" class="input input-bordered w-full"
                        prop:value=form.phone
                        on:input=move |ev| form.phone.set(event_target_value(&ev))
                    />
                    <input type="text" inputmode="numeric" placeholder="1234 5678 9012 3456" class="input input-bordered w-full font-mono"
                        prop:value=form.card_number
                        on:input=move |ev| form.input_card_number(&event_target_value(&ev))
                    />
                    <div class="grid grid-cols-2 gap-4">
                        <input type="text" placeholder="MM/YY" class="input input-bordered w-full font-mono"
                            prop:value=form.expiry_date
                            on:input=move |ev| form.input_expiry(&event_target_value(&ev))
                        />
                        <input type="text" inputmode="numeric" placeholder="CVV" class="input input-bordered w-full font-mono"
                            prop:value=form.cvv
                            on:input=move |ev| form.input_cvv(&event_target_value(&ev))
                        />
                    </div>

                    <div class="modal-action">
                        <button type="button" class="btn" on:click=move |_| close()>"Cancel"</button>
                        <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                            {move || if loading.get() {
                                view! { <span class="loading loading-spinner"></span> "Processing..." }.into_any()
                            } else {
                                "Pay Now".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>

        // 成功回执
        {move || receipt.get().map(|r| view! {
            <div class="modal modal-open">
                <div class="modal-box text-center space-y-3">
                    <CheckCircle attr:class="h-12 w-12 text-success mx-auto" />
                    <h3 class="font-bold text-lg">"Payment Successful!"</h3>
                    <p>"Plan: " <span class="font-semibold">{r.plan}</span></p>
                    <p>"Amount: " <span class="font-semibold">{r.amount}</span></p>
                    <p class="text-xs opacity-60 font-mono">"Transaction ID: " {r.transaction_id}</p>
                    <p class="text-sm opacity-70">"Redirecting to the generator..."</p>
                </div>
            </div>
        })}
    }
}
