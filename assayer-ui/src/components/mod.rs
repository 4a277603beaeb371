//! UI Components
//!
//! Reusable Leptos components shared by the pages.

pub mod file_picker;
pub mod loading;
pub mod nav;
pub mod toast;

pub use file_picker::{read_text, FilePicker};
pub use loading::{InlineLoading, Loading};
pub use nav::Nav;
pub use toast::Toast;
