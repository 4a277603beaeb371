//! Item List Page

use leptos::*;
use leptos_router::*;

use crate::api::{self, Item};
use crate::components::Loading;
use crate::routes;

/// Column shown as the item label, first one present wins
const LABEL_COLUMNS: [&str; 3] = ["name", "material", "box_id"];

/// Short label for an item in the list
pub fn item_label(item: &Item) -> String {
    LABEL_COLUMNS
        .iter()
        .find_map(|column| item.fields.get(*column).and_then(|v| v.as_str()))
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Item {}", item.id))
}

/// Item list page component
#[component]
pub fn ItemList() -> impl IntoView {
    let items = create_local_resource(|| (), |_| api::fetch_items());

    view! {
        <div class="space-y-6">
            <div class="flex items-center justify-between">
                <h1 class="text-3xl font-bold">"Items"</h1>
                <A href=routes::UPLOAD_ITEMS class="px-4 py-2 bg-blue-600 text-white rounded-lg">
                    "Upload more"
                </A>
            </div>

            <Suspense fallback=|| view! { <Loading /> }>
                {move || items.get().map(|result| match result {
                    Ok(items) if items.is_empty() => view! {
                        <p class="text-gray-500">"No items uploaded yet."</p>
                    }.into_view(),
                    Ok(items) => view! {
                        <ul class="bg-white rounded-xl shadow divide-y">
                            {items.into_iter().map(|item| {
                                let href = routes::item_detail(item.id);
                                let label = item_label(&item);
                                view! {
                                    <li class="px-6 py-4 flex justify-between">
                                        <A href=href class="font-medium text-blue-700 hover:underline">{label}</A>
                                        <span class="text-sm text-gray-500">{format!("#{}", item.id)}</span>
                                    </li>
                                }
                            }).collect_view()}
                        </ul>
                    }.into_view(),
                    Err(e) => view! {
                        <p class="text-red-600">{format!("Failed to load items: {}", e)}</p>
                    }.into_view(),
                })}
            </Suspense>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(fields: serde_json::Value) -> Item {
        Item {
            id: 7,
            fields: fields.as_object().cloned().unwrap_or_default(),
            uploaded_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_item_label_prefers_name() {
        assert_eq!(item_label(&item(json!({"material": "K18", "name": "ring"}))), "ring");
        assert_eq!(item_label(&item(json!({"material": "K18"}))), "K18");
        assert_eq!(item_label(&item(json!({"weight": "3g"}))), "Item 7");
    }
}
