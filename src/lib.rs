//! Options subsystem of an e-book reader.
//!
//! - [`options`]: the persisted key/value store and typed option accessors.
//! - [`dialog`]: option entries, their views, and dialog tabs.
//! - [`integration`]: tabs for choosing and configuring external programs.
//! - [`formats`]: format plugins and the plugin collection.
//! - [`config`]: `conf/config.toml` loading.

pub mod config;
pub mod dialog;
pub mod formats;
pub mod integration;
pub mod options;
