use crate::components::icons::{MessageSquare, Plus, Search, Trash2};
use crate::library::SavedReview;
use leptos::prelude::*;

/// 侧边栏：已保存综述列表
#[component]
pub fn LibraryPanel(
    /// 当前过滤后的条目
    #[prop(into)]
    items: Signal<Vec<SavedReview>>,
    query: RwSignal<String>,
    #[prop(into)] on_load: Callback<i64>,
    #[prop(into)] on_delete: Callback<i64>,
    #[prop(into)] on_clear: Callback<()>,
    #[prop(into)] on_new_chat: Callback<()>,
) -> impl IntoView {
    let is_empty = move || items.with(|list| list.is_empty());

    view! {
        <aside class="card bg-base-100 shadow-xl h-fit">
            <div class="card-body p-4 gap-3">
                <button class="btn btn-primary btn-sm gap-2" on:click=move |_| on_new_chat.run(())>
                    <Plus attr:class="h-4 w-4" /> "New chat"
                </button>

                <label class="input input-bordered input-sm flex items-center gap-2">
                    <Search attr:class="h-4 w-4 opacity-50" />
                    <input
                        type="search"
                        class="grow"
                        placeholder="Search saved reviews"
                        on:input=move |ev| query.set(event_target_value(&ev))
                        prop:value=query
                    />
                </label>

                <div class="flex items-center justify-between">
                    <h3 class="font-semibold text-sm uppercase opacity-60">"Library"</h3>
                    <button
                        class="btn btn-ghost btn-xs text-error"
                        disabled=is_empty
                        on:click=move |_| on_clear.run(())
                    >
                        "Clear all"
                    </button>
                </div>

                <ul class="menu menu-sm p-0 w-full">
                    <Show when=is_empty>
                        <li class="disabled"><span>"No conversations yet"</span></li>
                    </Show>
                    <For
                        each=move || items.get()
                        key=|r| r.id
                        children=move |review| {
                            let id = review.id;
                            view! {
                                <li>
                                    <a class="flex items-center gap-2" on:click=move |_| on_load.run(id)>
                                        <MessageSquare attr:class="h-4 w-4 shrink-0 opacity-60" />
                                        <span class="flex flex-col min-w-0 grow">
                                            <span class="truncate">{review.title()}</span>
                                            <span class="text-xs opacity-50">
                                                {review.saved_at.display_datetime()}
                                            </span>
                                        </span>
                                        <button
                                            class="btn btn-ghost btn-xs text-error"
                                            title="Delete"
                                            aria-label="Delete"
                                            on:click=move |ev| {
                                                ev.stop_propagation();
                                                on_delete.run(id);
                                            }
                                        >
                                            <Trash2 attr:class="h-3 w-3" />
                                        </button>
                                    </a>
                                </li>
                            }
                        }
                    />
                </ul>
            </div>
        </aside>
    }
}
