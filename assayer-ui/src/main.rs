//! Assayer Client
//!
//! Jewellery metal valuation client built with Leptos (WASM).
//!
//! # Features
//!
//! - Metal calculation with weight checks and corrections
//! - Item sheet upload, list and detail views
//! - In-browser CSV editor
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. It talks to the Assayer API over same-origin HTTP; during
//! development the shell server proxies those paths to the backend.

mod api;
mod app;
mod bootstrap;
mod components;
mod pages;
mod routes;
mod sheet;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    bootstrap::bootstrap();
}
