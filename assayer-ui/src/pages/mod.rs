//! Pages
//!
//! Top-level page components for each route.

pub mod csv_editor;
pub mod item_detail;
pub mod item_list;
pub mod login;
pub mod main_menu;
pub mod metal_calculate;
pub mod not_found;
pub mod upload_items;

pub use csv_editor::CsvEditor;
pub use item_detail::ItemDetail;
pub use item_list::ItemList;
pub use login::Login;
pub use main_menu::MainMenu;
pub use metal_calculate::MetalCalculate;
pub use not_found::NotFound;
pub use upload_items::UploadItems;
