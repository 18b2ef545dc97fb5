// The binary in main.rs drives the terminal; everything it runs lives here
// so integration tests can exercise it without a terminal.

rust_i18n::i18n!("locales", fallback = "en");

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod logging;
pub mod recommend;
pub mod route;
pub mod stats;
pub mod store;
pub mod study;
pub mod ui;
