//! Upload Items Page
//!
//! Imports an item sheet into the backend catalogue.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::{FilePicker, InlineLoading};
use crate::routes;
use crate::state::GlobalState;

/// Upload items page component
#[component]
pub fn UploadItems() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let file = create_rw_signal(None::<web_sys::File>);
    let (uploading, set_uploading) = create_signal(false);
    let (imported, set_imported) = create_signal(None::<usize>);

    let upload = move |_| {
        let Some(selected) = file.get() else {
            state.show_error("Choose an item sheet first");
            return;
        };

        set_uploading.set(true);
        set_imported.set(None);

        let state_clone = state.clone();
        spawn_local(async move {
            match api::upload_items(&selected).await {
                Ok(result) => {
                    set_imported.set(Some(result.imported));
                    state_clone.show_success(&format!("Imported {} items", result.imported));
                }
                Err(e) => state_clone.show_error(&e),
            }
            set_uploading.set(false);
        });
    };

    view! {
        <div class="max-w-xl mx-auto bg-white rounded-xl shadow p-8 space-y-6">
            <div>
                <h1 class="text-2xl font-bold">"Upload Items"</h1>
                <p class="text-gray-500 mt-1">"Every row of the sheet becomes one item."</p>
            </div>

            <FilePicker label="Item sheet (CSV)" file=file />

            <button
                on:click=upload
                disabled=move || uploading.get()
                class="px-4 py-3 bg-blue-600 hover:bg-blue-700 disabled:bg-gray-400 text-white rounded-lg font-medium"
            >
                {move || if uploading.get() {
                    view! { <InlineLoading /> " Uploading..." }.into_view()
                } else {
                    "Upload".into_view()
                }}
            </button>

            {move || imported.get().map(|count| view! {
                <p class="text-sm text-green-700">
                    {format!("{} items imported. ", count)}
                    <A href=routes::ITEM_LIST class="underline">"View item list"</A>
                </p>
            })}
        </div>
    }
}
