// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod dataset;
pub mod evaluator;
pub mod events;
pub mod histogram;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod store;
pub mod tracker;
pub mod ui;
pub mod word_bank;
