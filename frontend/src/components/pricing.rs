use crate::components::icons::{CheckCircle, Crown};
use crate::components::payment_dialog::PaymentDialog;
use crate::entitlement::PremiumStore;
use crate::payment::PlanSelection;
use crate::web::BrowserStorage;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use litreview_shared::{BillingCycle, PlanId};

const FREE_FEATURES: [&str; 3] = [
    "Up to 20 sources per review",
    "Brief and standard reviews",
    "Local review library",
];

fn plan_features(plan: PlanId) -> &'static [&'static str] {
    match plan {
        PlanId::Pro => &[
            "Up to 50 sources per review",
            "Comprehensive reviews",
            "Download as text",
            "Priority generation",
        ],
        PlanId::Enterprise => &[
            "Everything in Pro",
            "Team seats",
            "Dedicated support",
        ],
    }
}

#[component]
pub fn PricingPage() -> impl IntoView {
    let (billing, set_billing) = signal(BillingCycle::Monthly);
    let selection = RwSignal::new(Option::<PlanSelection>::None);
    let current_plan = PremiumStore::new(BrowserStorage)
        .plan()
        .map(|p| p.plan)
        .unwrap_or_default();
    let has_plan = !current_plan.is_empty();

    let yearly = move || billing.get() == BillingCycle::Yearly;

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-5xl mx-auto space-y-8">
                <div class="text-center space-y-2">
                    <h2 class="text-3xl font-bold">"Choose your plan"</h2>
                    <Show when=move || has_plan>
                        <p class="flex justify-center items-center gap-2 text-warning">
                            <Crown attr:class="h-4 w-4" /> "Current plan: " {current_plan.clone()}
                        </p>
                    </Show>
                    <label class="label cursor-pointer justify-center gap-3">
                        <span class="label-text">"Monthly"</span>
                        <input
                            type="checkbox"
                            class="toggle toggle-primary"
                            prop:checked=yearly
                            on:change=move |ev| {
                                set_billing.set(if event_target_checked(&ev) {
                                    BillingCycle::Yearly
                                } else {
                                    BillingCycle::Monthly
                                })
                            }
                        />
                        <span class="label-text">"Yearly"</span>
                    </label>
                </div>

                <div class="grid gap-6 md:grid-cols-3">
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <h3 class="card-title">"Free"</h3>
                            <p class="text-4xl font-bold">"$0"</p>
                            <ul class="space-y-2 my-4">
                                {FREE_FEATURES.iter().map(|f| view! {
                                    <li class="flex gap-2"><CheckCircle attr:class="h-4 w-4 text-success" /> {*f}</li>
                                }).collect_view()}
                            </ul>
                            <div class="card-actions">
                                <Link to=AppRoute::Dashboard class="btn btn-outline w-full">"Get Started"</Link>
                            </div>
                        </div>
                    </div>

                    {PlanId::ALL.into_iter().map(|plan| {
                        let current = move || PlanSelection { plan, billing: billing.get() };
                        view! {
                            <div class=if plan == PlanId::Pro { "card bg-base-100 shadow-xl border-2 border-primary" } else { "card bg-base-100 shadow-xl" }>
                                <div class="card-body">
                                    <h3 class="card-title">{plan.display_name()}</h3>
                                    <p>
                                        <span class="text-4xl font-bold">{move || current().price_label()}</span>
                                        <span class="opacity-70">{move || billing.get().period_label()}</span>
                                    </p>
                                    <ul class="space-y-2 my-4">
                                        {plan_features(plan).iter().map(|f| view! {
                                            <li class="flex gap-2"><CheckCircle attr:class="h-4 w-4 text-success" /> {*f}</li>
                                        }).collect_view()}
                                    </ul>
                                    <div class="card-actions">
                                        <button
                                            class="btn btn-primary w-full"
                                            on:click=move |_| selection.set(Some(current()))
                                        >
                                            "Upgrade"
                                        </button>
                                    </div>
                                </div>
                            </div>
                        }
                    }).collect_view()}
                </div>
            </div>

            <PaymentDialog selection=selection />
        </div>
    }
}
