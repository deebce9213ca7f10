use crate::auth::{AuthMode, FirebaseIdentity, authenticate, use_auth};
use crate::components::icons::BookOpen;
use crate::config::use_config;
use leptos::prelude::*;
use leptos::task::spawn_local;
use litreview_shared::SERVICE_NAME;

/// 入口页：邮箱密码登录 / 注册
///
/// 登录成功后不手动跳转，路由服务监听认证状态自动重定向。
#[component]
pub fn EntryPage() -> impl IntoView {
    let auth = use_auth();
    let config = use_config();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (pending, set_pending) = signal(Option::<AuthMode>::None);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let submit = move |mode: AuthMode| {
        set_pending.set(Some(mode));
        set_error_msg.set(None);

        let provider = FirebaseIdentity::new(config.firebase_api_key.clone());
        let session = auth.session();
        spawn_local(async move {
            let result = authenticate(
                &provider,
                &session,
                mode,
                &email.get_untracked(),
                &password.get_untracked(),
            )
            .await;
            if let Err(e) = result {
                leptos::logging::error!("Authentication Error: {}", e);
                set_error_msg.set(Some(e.to_string()));
            }
            set_pending.set(None);
        });
    };

    let on_submit = {
        let submit = submit.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            submit(AuthMode::SignIn);
        }
    };
    let busy = move || pending.get().is_some();

    view! {
        <div class="hero min-h-[80vh] bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <BookOpen attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">{SERVICE_NAME}</h1>
                        <p class="text-base-content/70">
                            "Sign in to generate literature reviews from real research"
                        </p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                autocomplete="email"
                                placeholder="you@university.edu"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="current-password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                            />
                        </div>
                        <div class="form-control mt-6 gap-2">
                            <button type="submit" class="btn btn-primary" disabled=busy>
                                {move || if pending.get() == Some(AuthMode::SignIn) {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign In".into_any()
                                }}
                            </button>
                            <button
                                type="button"
                                class="btn btn-outline"
                                disabled=busy
                                on:click=move |_| submit(AuthMode::SignUp)
                            >
                                {move || if pending.get() == Some(AuthMode::SignUp) {
                                    view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any()
                                } else {
                                    "Create Account".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
