use crate::components::icons::Mail;
use crate::contact::{ContactFeedback, ContactMessage, SIMULATED_SEND_DELAY, validate_contact};
use crate::web::sleep;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ContactPage() -> impl IntoView {
    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let subject = RwSignal::new(String::new());
    let message = RwSignal::new(String::new());
    let (feedback, set_feedback) = signal(Option::<ContactFeedback>::None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let msg = ContactMessage {
            name: name.get_untracked(),
            email: email.get_untracked(),
            subject: subject.get_untracked(),
            message: message.get_untracked(),
        };
        if let Err(e) = validate_contact(&msg) {
            set_feedback.set(Some(ContactFeedback::Error(e)));
            return;
        }

        set_feedback.set(Some(ContactFeedback::Pending));
        spawn_local(async move {
            sleep(SIMULATED_SEND_DELAY).await;
            set_feedback.set(Some(ContactFeedback::Sent));
            for field in [name, email, subject, message] {
                field.set(String::new());
            }
        });
    };

    let pending = move || feedback.get() == Some(ContactFeedback::Pending);

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-xl mx-auto card bg-base-100 shadow-xl">
                <form class="card-body gap-4" on:submit=on_submit>
                    <h2 class="card-title text-2xl gap-2">
                        <Mail attr:class="h-6 w-6 text-primary" /> "Contact us"
                    </h2>
                    <input type="text" placeholder="Your name" class="input input-bordered w-full"
                        prop:value=name
                        on:input=move |ev| name.set(event_target_value(&ev))
                    />
                    <input type="email" placeholder="you@example.com" class="input input-bordered w-full"
                        prop:value=email
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input type="text" placeholder="Subject" class="input input-bordered w-full"
                        prop:value=subject
                        on:input=move |ev| subject.set(event_target_value(&ev))
                    />
                    <textarea placeholder="Message" rows="5" class="textarea textarea-bordered w-full"
                        prop:value=message
                        on:input=move |ev| message.set(event_target_value(&ev))
                    ></textarea>

                    {move || feedback.get().map(|f| view! {
                        <p class=format!("text-sm {}", f.class())>{f.text()}</p>
                    })}

                    <div class="card-actions justify-end">
                        <button type="submit" class="btn btn-primary" disabled=pending>"Send Message"</button>
                    </div>
                </form>
            </div>
        </div>
    }
}
