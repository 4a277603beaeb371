//! Item Detail Page
//!
//! Shows every field of one uploaded item.

use leptos::*;
use leptos_router::*;

use crate::api;
use crate::components::Loading;
use crate::routes;

/// Item detail page component
#[component]
pub fn ItemDetail() -> impl IntoView {
    let params = use_params_map();
    let id = move || params.with(|p| p.get("id").and_then(|id| id.parse::<u64>().ok()));

    let item = create_local_resource(id, |id| async move {
        match id {
            Some(id) => api::fetch_item(id).await,
            None => Err("Invalid item id".to_string()),
        }
    });

    view! {
        <div class="space-y-6">
            <A href=routes::ITEM_LIST class="text-sm text-blue-700 hover:underline">"← Back to items"</A>

            <Suspense fallback=|| view! { <Loading /> }>
                {move || item.get().map(|result| match result {
                    Ok(item) => {
                        let uploaded = chrono::DateTime::parse_from_rfc3339(&item.uploaded_at)
                            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or(item.uploaded_at.clone());
                        view! {
                            <div class="bg-white rounded-xl shadow p-6">
                                <h1 class="text-2xl font-bold mb-1">{format!("Item #{}", item.id)}</h1>
                                <p class="text-sm text-gray-500 mb-6">{format!("Uploaded {}", uploaded)}</p>
                                <dl class="grid grid-cols-3 gap-y-2">
                                    {item.fields.into_iter().map(|(column, value)| {
                                        let text = match value {
                                            serde_json::Value::String(s) => s,
                                            serde_json::Value::Null => "-".to_string(),
                                            other => other.to_string(),
                                        };
                                        view! {
                                            <dt class="text-gray-500">{column}</dt>
                                            <dd class="col-span-2">{text}</dd>
                                        }
                                    }).collect_view()}
                                </dl>
                            </div>
                        }.into_view()
                    }
                    Err(e) => view! {
                        <p class="text-red-600">{e}</p>
                    }.into_view(),
                })}
            </Suspense>
        </div>
    }
}
