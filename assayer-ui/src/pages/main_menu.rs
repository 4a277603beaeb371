//! Main Menu Page
//!
//! Entry point linking to every workflow.

use leptos::*;
use leptos_router::*;

use crate::routes;
use crate::state::GlobalState;

/// Main menu page component
#[component]
pub fn MainMenu() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let operator = state.operator;

    view! {
        <div class="space-y-8">
            // Header
            <div>
                <h1 class="text-3xl font-bold">"Main Menu"</h1>
                <p class="text-gray-500 mt-1">
                    {move || match operator.get() {
                        Some(name) => format!("Signed in as {}", name),
                        None => "Choose a task to get started".to_string(),
                    }}
                </p>
            </div>

            <div class="grid md:grid-cols-2 gap-4">
                <MenuCard
                    href=routes::METAL_CALCULATE
                    title="Metal Calculation"
                    description="Value an item sheet against a metal price list"
                />
                <MenuCard
                    href=routes::UPLOAD_ITEMS
                    title="Upload Items"
                    description="Import an item sheet into the catalogue"
                />
                <MenuCard
                    href=routes::ITEM_LIST
                    title="Item List"
                    description="Browse uploaded items"
                />
                <MenuCard
                    href=routes::CSV_EDITOR
                    title="CSV Editor"
                    description="Edit a sheet in the browser and download it"
                />
            </div>
        </div>
    }
}

#[component]
fn MenuCard(
    href: &'static str,
    title: &'static str,
    description: &'static str,
) -> impl IntoView {
    view! {
        <A href=href class="block bg-white rounded-xl p-6 shadow hover:shadow-md transition-shadow">
            <h2 class="text-xl font-semibold mb-2">{title}</h2>
            <p class="text-gray-500 text-sm">{description}</p>
        </A>
    }
}
