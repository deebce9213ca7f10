use crate::components::icons::*;
use crate::components::library_panel::LibraryPanel;
use crate::config::use_config;
use crate::entitlement::PremiumStore;
use crate::generator::{
    GeneratorController, GeneratorForm, GeneratorView, NO_SOURCES_MESSAGE, ReviewDisplay,
    download_filename, format_for_download, live_topic_error, share_payload, share_text,
};
use crate::library::SavedReviewStore;
use crate::web::router::use_router;
use crate::web::{BrowserStorage, ShareOutcome, save_text_file, share_or_copy};
use leptos::prelude::*;
use leptos::task::spawn_local;
use litreview_shared::ReviewLength;
use litreview_shared::date::{Clock, SystemClock};

const FIELDS: [(&str, &str); 8] = [
    ("general", "General"),
    ("computer_science", "Computer Science"),
    ("medicine", "Medicine & Health"),
    ("psychology", "Psychology"),
    ("engineering", "Engineering"),
    ("business", "Business & Economics"),
    ("education", "Education"),
    ("social_sciences", "Social Sciences"),
];
const SOURCE_LIMITS: [u32; 4] = [10, 20, 30, 50];
const LENGTHS: [(ReviewLength, &str); 3] = [
    (ReviewLength::Brief, "Brief"),
    (ReviewLength::Standard, "Standard"),
    (ReviewLength::Comprehensive, "Comprehensive"),
];

const TOAST_DURATION: std::time::Duration = std::time::Duration::from_secs(3);

fn library() -> SavedReviewStore<BrowserStorage, SystemClock> {
    SavedReviewStore::new(BrowserStorage, SystemClock)
}

// =========================================================
// 视图绑定
// =========================================================

/// 以信号实现 `GeneratorView`
#[derive(Clone, Copy)]
struct SignalView {
    field_error: RwSignal<Option<String>>,
    busy: RwSignal<bool>,
    results: RwSignal<Option<ReviewDisplay>>,
    error: RwSignal<Option<String>>,
    library_version: RwSignal<u32>,
}

impl SignalView {
    fn new() -> Self {
        Self {
            field_error: RwSignal::new(None),
            busy: RwSignal::new(false),
            results: RwSignal::new(None),
            error: RwSignal::new(None),
            library_version: RwSignal::new(0),
        }
    }
}

impl GeneratorView for SignalView {
    fn show_field_error(&self, message: &str) {
        self.field_error.set(Some(message.to_string()));
    }

    fn clear_field_error(&self) {
        self.field_error.set(None);
    }

    fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
    }

    fn show_results(&self, display: ReviewDisplay) {
        self.results.set(Some(display));
    }

    fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));
    }

    fn hide_error(&self) {
        self.error.set(None);
    }

    fn refresh_library(&self) {
        self.library_version.update(|v| *v += 1);
    }
}

// =========================================================
// 通知
// =========================================================

/// 右上角通知；每条通知带代次，过期计时器只能清除自己那一条
#[derive(Debug, Clone, Default, PartialEq)]
struct Toast {
    generation: u64,
    /// 消息内容, 是否出错
    message: Option<(String, bool)>,
}

impl Toast {
    fn show(&mut self, message: &str, is_err: bool) -> u64 {
        self.generation += 1;
        self.message = Some((message.to_string(), is_err));
        self.generation
    }

    fn expire(&mut self, generation: u64) {
        if self.generation == generation {
            self.message = None;
        }
    }
}

// =========================================================
// 页面
// =========================================================

#[component]
pub fn DashboardPage() -> impl IntoView {
    let config = use_config();
    let view_state = SignalView::new();

    let topic = RwSignal::new(String::new());
    let objectives = RwSignal::new(String::new());
    let field = RwSignal::new(GeneratorForm::default().field);
    let max_sources = RwSignal::new(GeneratorForm::default().max_sources);
    let review_length = RwSignal::new(ReviewLength::default());
    let query = RwSignal::new(String::new());
    let toast = RwSignal::new(Toast::default());
    let notification = move || toast.with(|t| t.message.clone());

    let is_premium = PremiumStore::new(BrowserStorage).is_premium();
    let identity = use_router().identity();
    let email = move || identity.get().unwrap_or_default();

    let saved = Signal::derive(move || {
        view_state.library_version.track();
        library().list(Some(query.get().as_str()))
    });

    let notify = move |msg: &str, is_err: bool| {
        if let Some(generation) = toast.try_update(|t| t.show(msg, is_err)) {
            set_timeout(
                move || {
                    toast.try_update(|t| t.expire(generation));
                },
                TOAST_DURATION,
            );
        }
    };

    let reset_form = move || {
        let defaults = GeneratorForm::default();
        topic.set(defaults.topic);
        objectives.set(defaults.objectives);
        field.set(defaults.field);
        max_sources.set(defaults.max_sources);
        review_length.set(defaults.review_length);
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = GeneratorForm {
            topic: topic.get_untracked(),
            objectives: objectives.get_untracked(),
            field: field.get_untracked(),
            max_sources: max_sources.get_untracked(),
            review_length: review_length.get_untracked(),
        };
        let api = config.api();
        spawn_local(async move {
            let store = library();
            GeneratorController::new(&api, &view_state, &store)
                .submit(&form)
                .await;
        });
    };

    let on_new_chat = move |_: ()| {
        reset_form();
        view_state.results.set(None);
        view_state.hide_error();
        view_state.clear_field_error();
        query.set(String::new());
        notify("Started a new chat", false);
    };

    let on_load = move |id: i64| {
        if let Some(item) = library().load(id) {
            view_state.show_results(ReviewDisplay::from_saved(&item));
            view_state.hide_error();
        }
    };

    let on_delete = move |id: i64| {
        library().delete(id);
        view_state.refresh_library();
        notify("Deleted from library", false);
    };

    let on_clear = move |_: ()| {
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message("Clear all saved conversations?").ok())
            .unwrap_or(false);
        if confirmed {
            library().clear();
            view_state.refresh_library();
            notify("Library cleared", false);
        }
    };

    let current_record = move || view_state.results.get().map(|d| d.record);

    let on_save = move |_: web_sys::MouseEvent| match current_record() {
        Some(record) => {
            library().save(record);
            view_state.refresh_library();
            notify("Saved to library", false);
        }
        None => notify("Nothing to save", false),
    };

    let on_download = move |_: web_sys::MouseEvent| {
        let Some(record) = current_record() else {
            notify("No review to download", true);
            return;
        };
        let content = format_for_download(&record, SystemClock.now());
        if let Err(e) = save_text_file(&download_filename(&record.topic), &content) {
            leptos::logging::error!("download failed: {:?}", e);
            notify("Download failed", true);
        }
    };

    let on_share = move |_: web_sys::MouseEvent| {
        let Some(record) = current_record() else {
            notify("No review to share", true);
            return;
        };
        let payload = share_payload(&record.topic);
        let fallback = share_text(&record.topic, &record.review);
        spawn_local(async move {
            match share_or_copy(&payload.title, &payload.text, &fallback).await {
                Ok(ShareOutcome::Copied) => notify("Review copied to clipboard!", false),
                Ok(ShareOutcome::Shared) => {}
                // 用户取消分享面板也会走到这里
                Err(e) => leptos::logging::warn!("share failed: {:?}", e),
            }
        });
    };

    let busy = move || view_state.busy.get();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            // 通知提示框
            <Show when=move || notification().is_some()>
                <div class="toast toast-top toast-end z-50">
                    <div class=move || {
                        let is_err = notification().map(|(_, e)| e).unwrap_or(false);
                        if is_err { "alert alert-error shadow-lg" } else { "alert alert-info shadow-lg" }
                    }>
                        <span>{move || notification().map(|(m, _)| m).unwrap_or_default()}</span>
                    </div>
                </div>
            </Show>

            <div class="max-w-7xl mx-auto grid gap-6 lg:grid-cols-[18rem_1fr]">
                <LibraryPanel
                    items=saved
                    query=query
                    on_load=on_load
                    on_delete=on_delete
                    on_clear=on_clear
                    on_new_chat=on_new_chat
                />

                <main class="space-y-6">
                    <div class="flex flex-wrap items-center justify-between gap-2">
                        <div>
                            <h2 class="text-2xl font-bold">"Literature Review Generator"</h2>
                            <p class="text-sm opacity-70">"Signed in as " <span class="font-mono">{email}</span></p>
                        </div>
                        {is_premium.then(|| view! {
                            <span class="badge badge-warning gap-1 p-3">
                                <Crown attr:class="h-4 w-4" /> "Premium"
                            </span>
                        })}
                    </div>

                    <form class="card bg-base-100 shadow-xl" on:submit=on_submit>
                        <div class="card-body gap-4">
                            <div class="form-control">
                                <label class="label" for="topic">
                                    <span class="label-text">"Research topic"</span>
                                </label>
                                <input
                                    id="topic"
                                    type="text"
                                    placeholder="e.g. Machine learning in healthcare diagnostics"
                                    class=move || if view_state.field_error.get().is_some() { "input input-bordered input-error" } else { "input input-bordered" }
                                    disabled=busy
                                    prop:value=topic
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        match live_topic_error(&value) {
                                            Some(e) => view_state.show_field_error(&e.to_string()),
                                            None => view_state.clear_field_error(),
                                        }
                                        topic.set(value);
                                    }
                                />
                                <Show when=move || view_state.field_error.get().is_some()>
                                    <span class="text-error text-sm mt-1">
                                        {move || view_state.field_error.get().unwrap_or_default()}
                                    </span>
                                </Show>
                            </div>

                            <div class="form-control">
                                <label class="label" for="objectives">
                                    <span class="label-text">"Research objectives (optional)"</span>
                                </label>
                                <textarea
                                    id="objectives"
                                    class="textarea textarea-bordered"
                                    rows="3"
                                    disabled=busy
                                    prop:value=objectives
                                    on:input=move |ev| objectives.set(event_target_value(&ev))
                                ></textarea>
                            </div>

                            <div class="grid gap-4 md:grid-cols-3">
                                <select
                                    class="select select-bordered"
                                    disabled=busy
                                    on:change=move |ev| field.set(event_target_value(&ev))
                                >
                                    {FIELDS.iter().map(|&(value, label)| view! {
                                        <option value=value selected=move || field.get() == value>{label}</option>
                                    }).collect_view()}
                                </select>
                                <select
                                    class="select select-bordered"
                                    disabled=busy
                                    on:change=move |ev| {
                                        if let Ok(n) = event_target_value(&ev).parse() {
                                            max_sources.set(n);
                                        }
                                    }
                                >
                                    {SOURCE_LIMITS.iter().map(|&n| {
                                        view! {
                                            <option value=n.to_string() selected=move || max_sources.get() == n>
                                                {format!("{} sources", n)}
                                            </option>
                                        }
                                    }).collect_view()}
                                </select>
                                <select
                                    class="select select-bordered"
                                    disabled=busy
                                    on:change=move |ev| review_length.set(ReviewLength::from_label(&event_target_value(&ev)))
                                >
                                    {LENGTHS.iter().map(|&(len, label)| view! {
                                        <option value=len.as_str() selected=move || review_length.get() == len>{label}</option>
                                    }).collect_view()}
                                </select>
                            </div>

                            <div class="card-actions justify-end">
                                <button type="submit" class="btn btn-primary gap-2" disabled=busy>
                                    {move || if busy() {
                                        view! { <span class="loading loading-spinner"></span> "Generating..." }.into_any()
                                    } else {
                                        view! { <Sparkles attr:class="h-4 w-4" /> "Generate Literature Review" }.into_any()
                                    }}
                                </button>
                            </div>
                        </div>
                    </form>

                    // 错误面板
                    <Show when=move || view_state.error.get().is_some()>
                        <div role="alert" class="alert alert-error">
                            <AlertTriangle attr:class="h-5 w-5" />
                            <span>{move || view_state.error.get().unwrap_or_default()}</span>
                        </div>
                    </Show>

                    // 结果
                    {move || view_state.results.get().map(|display| view! {
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body gap-4">
                                <div class="flex flex-wrap items-center justify-between gap-2">
                                    <div>
                                        <h3 class="card-title">{display.topic_label.clone()}</h3>
                                        <p class="text-sm opacity-70">
                                            {display.count_label.clone()} " · " {display.date_label(SystemClock.now())}
                                        </p>
                                    </div>
                                    <div class="flex gap-2">
                                        <button class="btn btn-sm btn-outline gap-2" on:click=on_save>
                                            <Save attr:class="h-4 w-4" /> "Save"
                                        </button>
                                        <button class="btn btn-sm btn-outline gap-2" on:click=on_download>
                                            <Download attr:class="h-4 w-4" /> "Download"
                                        </button>
                                        <button class="btn btn-sm btn-outline gap-2" on:click=on_share>
                                            <Share2 attr:class="h-4 w-4" /> "Share"
                                        </button>
                                    </div>
                                </div>

                                <article class="whitespace-pre-wrap leading-relaxed">{display.review.clone()}</article>

                                <div class="divider">"Sources"</div>
                                {if display.cards.is_empty() {
                                    view! { <p class="opacity-70">{NO_SOURCES_MESSAGE}</p> }.into_any()
                                } else {
                                    display.cards.iter().cloned().map(|card| view! {
                                        <div class="border border-base-300 rounded-box p-4 space-y-1">
                                            <div class="font-semibold">{card.title}</div>
                                            <div class="text-sm opacity-80">{card.byline}</div>
                                            <div class="text-sm opacity-70">{card.abstract_text}</div>
                                            <div class="flex justify-between text-xs opacity-60">
                                                <span>"Source: " {card.provenance}</span>
                                                <a href=card.url target="_blank" rel="noopener" class="link link-primary">"View Paper"</a>
                                            </div>
                                        </div>
                                    }).collect_view().into_any()
                                }}
                            </div>
                        </div>
                    })}
                </main>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_timer_keeps_newer_toast() {
        let mut toast = Toast::default();
        let first = toast.show("Saved to library", false);
        let second = toast.show("Deleted from library", false);

        toast.expire(first);
        assert_eq!(toast.message, Some(("Deleted from library".to_string(), false)));

        toast.expire(second);
        assert_eq!(toast.message, None);
    }
}
