// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Async facade over the plugin store catalog.
//!
//! [`CatalogService`] exposes the catalog operations of `plugin-store-db` as
//! `async fn`s for callers such as an API layer. It is configured from a
//! TOML file (see [`config`]).

pub mod config;
pub mod error;
mod service;

pub use config::Config;
pub use error::{ConfigError, Result, ServiceError};
pub use service::CatalogService;
