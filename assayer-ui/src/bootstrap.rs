//! Application Bootstrap
//!
//! Mounts the root component into the `#app` element exactly once.

use std::sync::OnceLock;

use leptos::*;
use wasm_bindgen::JsCast;

use crate::app::App;

/// Id of the element the client mounts into
pub const MOUNT_ID: &str = "app";

static MOUNTED: OnceLock<()> = OnceLock::new();

/// Mount the application.
///
/// Later calls are ignored. Without a `#app` element the client mounts
/// into `<body>`.
pub fn bootstrap() {
    if MOUNTED.set(()).is_err() {
        web_sys::console::warn_1(&"Assayer is already mounted".into());
        return;
    }

    match mount_element() {
        Some(element) => mount_to(element, || view! { <App /> }),
        None => {
            web_sys::console::error_1(
                &format!("#{} not found, mounting to <body>", MOUNT_ID).into(),
            );
            mount_to_body(|| view! { <App /> });
        }
    }
}

fn mount_element() -> Option<web_sys::HtmlElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(MOUNT_ID)?
        .dyn_into::<web_sys::HtmlElement>()
        .ok()
}
