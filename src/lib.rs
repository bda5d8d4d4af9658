//! Pricing Engine library crate.
//!
//! This crate exposes the revenue-tiered pricing engine, the
//! Launch/Scale plan comparator and the HTTP API as reusable modules.
//! External applications may depend on the `pricing_engine` crate and
//! call [`engine::calculate_pricing`] directly or embed the API via
//! [`api::build_router`].

pub mod api;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rates;

pub use compare::PlanCatalog;
pub use engine::{calculate_pricing, PricingEngine};
pub use error::PricingError;
pub use rates::{apply_discount, detect_tier, rate_for_tier, PricingConfig};
