//! File Picker Component
//!
//! Labelled CSV file input; the chosen file is written to a signal.

use leptos::*;
use wasm_bindgen::JsCast;

/// First file of an input's change event
pub fn selected_file(ev: &web_sys::Event) -> Option<web_sys::File> {
    ev.target()?
        .dyn_into::<web_sys::HtmlInputElement>()
        .ok()?
        .files()?
        .get(0)
}

#[component]
pub fn FilePicker(
    label: &'static str,
    file: RwSignal<Option<web_sys::File>>,
) -> impl IntoView {
    view! {
        <label class="block">
            <span class="block text-sm text-gray-600 mb-2">{label}</span>
            <input
                type="file"
                accept=".csv,text/csv"
                on:change=move |ev| file.set(selected_file(&ev))
                class="block w-full text-sm text-gray-700 border border-gray-300 rounded-lg p-2"
            />
            <span class="block text-xs text-gray-500 mt-1">
                {move || file.with(|f| f.as_ref().map(|f| f.name()).unwrap_or_else(|| "No file chosen".to_string()))}
            </span>
        </label>
    }
}

/// Read a chosen file as UTF-8 text
pub async fn read_text(file: &web_sys::File) -> Result<String, String> {
    wasm_bindgen_futures::JsFuture::from(file.text())
        .await
        .ok()
        .and_then(|text| text.as_string())
        .ok_or_else(|| format!("Failed to read {}", file.name()))
}
