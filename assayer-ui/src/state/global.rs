//! Global Application State
//!
//! Reactive state management using Leptos signals.

use leptos::*;

const OPERATOR_KEY: &str = "assayer_operator";

/// Global application state provided to all components
#[derive(Clone)]
pub struct GlobalState {
    /// Name entered on the login page
    pub operator: RwSignal<Option<String>>,
    /// Global loading state
    pub loading: RwSignal<bool>,
    /// Error message to display
    pub error: RwSignal<Option<String>>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let state = GlobalState {
        operator: create_rw_signal(load_operator()),
        loading: create_rw_signal(false),
        error: create_rw_signal(None),
        success: create_rw_signal(None),
    };

    provide_context(state);
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

fn load_operator() -> Option<String> {
    local_storage()?
        .get_item(OPERATOR_KEY)
        .ok()?
        .and_then(|name| normalize_operator(&name))
}

/// Trimmed operator name, `None` when blank
pub fn normalize_operator(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

impl GlobalState {
    /// Record the operator name locally; there is no server-side login
    pub fn log_in(&self, name: &str) -> bool {
        let Some(name) = normalize_operator(name) else {
            return false;
        };
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(OPERATOR_KEY, &name);
        }
        self.operator.set(Some(name));
        true
    }

    pub fn log_out(&self) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(OPERATOR_KEY);
        }
        self.operator.set(None);
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        self.success.set(Some(message.to_string()));

        let success_signal = self.success;
        gloo_timers::callback::Timeout::new(3000, move || {
            success_signal.set(None);
        }).forget();
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));

        let error_signal = self.error;
        gloo_timers::callback::Timeout::new(5000, move || {
            error_signal.set(None);
        }).forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_operator() {
        assert_eq!(normalize_operator("  Sato "), Some("Sato".to_string()));
        assert_eq!(normalize_operator("   "), None);
    }
}
