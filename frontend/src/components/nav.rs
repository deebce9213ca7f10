use crate::auth::use_auth;
use crate::components::icons::{BookOpen, LogOut};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use litreview_shared::SERVICE_NAME;

/// 顶部导航栏
#[component]
pub fn SiteNav() -> impl IntoView {
    let auth = use_auth();
    let signed_in = move || auth.state.get().is_signed_in();

    view! {
        <div class="navbar bg-base-100 shadow-sm px-4">
            <div class="flex-1">
                <Link to=AppRoute::Entry class="btn btn-ghost text-xl gap-2">
                    <BookOpen attr:class="h-6 w-6 text-primary" />
                    {SERVICE_NAME}
                </Link>
            </div>
            <div class="flex-none">
                <ul class="menu menu-horizontal px-1 gap-1">
                    <li><Link to=AppRoute::Dashboard>"Generator"</Link></li>
                    <li><Link to=AppRoute::Pricing>"Pricing"</Link></li>
                    <li><Link to=AppRoute::Contact>"Contact"</Link></li>
                </ul>
                <Show when=signed_in>
                    <button class="btn btn-ghost btn-sm gap-2" on:click=move |_| auth.sign_out()>
                        <LogOut attr:class="h-4 w-4" /> "Sign out"
                    </button>
                </Show>
            </div>
        </div>
    }
}
