//! # Assayer
//!
//! Jewellery metal valuation: a single-page Leptos client plus the Rust
//! plumbing around it.
//!
//! ## Modules
//!
//! - [`routing`]: Route table mapping navigation paths to pages
//! - [`proxy`]: Development proxy map and request forwarder
//! - [`shell`]: Server for the built client (routes, proxy, assets)
//! - [`api`]: REST backend with Axum
//! - [`valuation`]: Metal weight and price calculation
//! - [`table`]: CSV table model shared by the valuation and item code
//! - [`items`]: In-memory item store
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use assayer::routing::{Page, RouteTable};
//! use assayer::proxy::ProxyMap;
//!
//! let routes = RouteTable::standard();
//! let matched = routes.resolve("/items/42").unwrap();
//! assert_eq!(matched.page, Page::ItemDetail);
//! assert_eq!(matched.param("id"), Some("42"));
//!
//! let proxy = ProxyMap::development("http://localhost:8080").unwrap();
//! let target = proxy.rewrite("/items/42?full=1").unwrap();
//! assert_eq!(target.as_str(), "http://localhost:8080/items/42?full=1");
//! ```

pub mod api;
pub mod config;
pub mod items;
pub mod logging;
pub mod proxy;
pub mod routing;
pub mod shell;
pub mod table;
pub mod valuation;

// Re-export top-level types for convenience
pub use routing::{Page, RouteEntry, RouteError, RouteMatch, RouteTable};

pub use proxy::{ProxyEntry, ProxyError, ProxyForwarder, ProxyMap};

pub use shell::Shell;

pub use api::{build_router, serve, ApiError, AppState};

pub use table::{Table, TableError};

pub use valuation::{InvalidWeight, PriceList, RowValuation, ValuationError};

pub use items::{Item, ItemStore};

pub use config::{
    ApiConfig, Config, ConfigError, LoadedConfig, LoggingConfig, ProxyConfig, ShellConfig,
};
