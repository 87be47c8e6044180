//! garment-studio
//!
//! Core of the garment customizer:
//!
//! - [`render`]: the render-state store and the per-frame material sync engine
//!   that keeps the garment's material and decals in step with it.
//! - [`generation`]: the image-generation orchestrator that proxies prompts to
//!   an external provider with bounded retry and classified errors.
//! - [`api`]: axum routes exposing the orchestrator over HTTP (`server` feature).

pub mod config;
pub mod generation;
pub mod render;

#[cfg(feature = "server")]
pub mod api;

pub use garment_types as types;
