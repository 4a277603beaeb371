//! App Root Component
//!
//! Main application component with routing and global providers.

use leptos::*;
use leptos_router::*;

use crate::components::{Nav, Toast};
use crate::pages::{
    CsvEditor, ItemDetail, ItemList, Login, MainMenu, MetalCalculate, NotFound, UploadItems,
};
use crate::routes;
use crate::state::provide_global_state;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide global state to all components
    provide_global_state();

    view! {
        <Router>
            <div class="min-h-screen bg-gray-100 text-gray-900 flex flex-col">
                // Navigation header
                <Nav />

                // Main content area
                <main class="flex-1 container mx-auto px-4 py-8">
                    <Routes>
                        <Route path=routes::MAIN_MENU view=MainMenu />
                        <Route path=routes::METAL_CALCULATE view=MetalCalculate />
                        <Route path=routes::UPLOAD_ITEMS view=UploadItems />
                        <Route path=routes::ITEM_LIST view=ItemList />
                        <Route path=routes::ITEM_DETAIL view=ItemDetail />
                        <Route path=routes::LOGIN view=Login />
                        <Route path=routes::CSV_EDITOR view=CsvEditor />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </main>

                // Toast notifications
                <Toast />
            </div>
        </Router>
    }
}
