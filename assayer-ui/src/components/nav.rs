//! Navigation Component
//!
//! Header navigation bar with logo, links and the operator name.

use leptos::*;
use leptos_router::*;

use crate::routes;
use crate::state::GlobalState;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let operator = state.operator;

    view! {
        <nav class="bg-white border-b border-gray-200">
            <div class="container mx-auto px-4">
                <div class="flex items-center justify-between h-16">
                    // Logo and brand
                    <A href=routes::MAIN_MENU class="flex items-center space-x-3">
                        <span class="text-2xl">"💍"</span>
                        <span class="text-xl font-bold text-gray-900">"Assayer"</span>
                    </A>

                    // Navigation links
                    <div class="flex items-center space-x-1">
                        <NavLink href=routes::METAL_CALCULATE label="Calculate" />
                        <NavLink href=routes::UPLOAD_ITEMS label="Upload" />
                        <NavLink href=routes::ITEM_LIST label="Items" />
                        <NavLink href=routes::CSV_EDITOR label="CSV Editor" />
                        {move || match operator.get() {
                            Some(name) => view! {
                                <span class="px-4 py-2 text-sm text-gray-500">{name}</span>
                            }.into_view(),
                            None => view! { <NavLink href=routes::LOGIN label="Login" /> }.into_view(),
                        }}
                    </div>
                </div>
            </div>
        </nav>
    }
}

/// Individual navigation link
#[component]
fn NavLink(
    href: &'static str,
    label: &'static str,
) -> impl IntoView {
    view! {
        <A
            href=href
            class="px-4 py-2 rounded-lg text-gray-600 hover:text-gray-900 hover:bg-gray-100 transition-colors"
            active_class="bg-gray-100 text-gray-900"
        >
            {label}
        </A>
    }
}
