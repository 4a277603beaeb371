//! Login Page
//!
//! Records the operator name in the browser. The backend has no accounts.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::routes;
use crate::state::GlobalState;

/// Login page component
#[component]
pub fn Login() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let navigate = use_navigate();

    let (name, set_name) = create_signal(state.operator.get_untracked().unwrap_or_default());

    let state_for_submit = state.clone();
    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if state_for_submit.log_in(&name.get()) {
            state_for_submit.show_success("Signed in");
            navigate(routes::MAIN_MENU, Default::default());
        } else {
            state_for_submit.show_error("Please enter your name");
        }
    };

    let state_for_logout = state.clone();
    let log_out = move |_| {
        state_for_logout.log_out();
        set_name.set(String::new());
    };

    let operator = state.operator;

    view! {
        <div class="max-w-md mx-auto bg-white rounded-xl shadow p-8 space-y-6">
            <h1 class="text-2xl font-bold">"Login"</h1>

            <form on:submit=submit class="space-y-4">
                <label class="block">
                    <span class="block text-sm text-gray-600 mb-2">"Operator name"</span>
                    <input
                        type="text"
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                        class="w-full rounded-lg px-4 py-3 border border-gray-300 focus:border-blue-500 focus:outline-none"
                    />
                </label>
                <button
                    type="submit"
                    class="w-full px-4 py-3 bg-blue-600 hover:bg-blue-700 text-white rounded-lg font-medium"
                >
                    "Sign in"
                </button>
            </form>

            <Show when=move || operator.with(Option::is_some)>
                <button on:click=log_out.clone() class="text-sm text-gray-500 hover:text-gray-900">
                    "Sign out"
                </button>
            </Show>

            <ApiSettings />
        </div>
    }
}

/// Backend origin override; blank means the page's own origin
#[component]
fn ApiSettings() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let (api_url, set_api_url) = create_signal(api::get_api_base());
    let (testing, set_testing) = create_signal(false);

    let test_connection = move |_| {
        set_testing.set(true);
        api::set_api_base(&api_url.get());

        let state_clone = state.clone();
        spawn_local(async move {
            match api::check_connection().await {
                Ok(total) => state_clone.show_success(&format!("Backend reachable, {} items stored", total)),
                Err(e) => state_clone.show_error(&format!("Connection failed: {}", e)),
            }
            set_testing.set(false);
        });
    };

    view! {
        <div class="border-t pt-6">
            <label class="block text-sm text-gray-600 mb-2">"Backend URL (blank for this site)"</label>
            <div class="flex space-x-2">
                <input
                    type="text"
                    prop:value=move || api_url.get()
                    on:input=move |ev| set_api_url.set(event_target_value(&ev))
                    class="flex-1 rounded-lg px-4 py-2 border border-gray-300"
                />
                <button
                    on:click=test_connection
                    disabled=move || testing.get()
                    class="px-4 py-2 bg-gray-200 hover:bg-gray-300 rounded-lg font-medium"
                >
                    {move || if testing.get() { "Testing..." } else { "Save & Test" }}
                </button>
            </div>
        </div>
    }
}
