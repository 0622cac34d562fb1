//! # cadence-schema
//!
//! JSON Schema generation, validation, and registry for Cadence.
//!
//! This crate provides:
//! - `SchemaRegistry`: named JSON Schemas for durations, wire triggers, and
//!   trigger descriptors
//! - Schema-checked decoding of untyped JSON wire triggers
//!
//! ## Architecture
//!
//! Trigger types are defined in `cadence-core` with `#[derive(JsonSchema)]`.
//! This crate imports those types and provides the registry and the JSON
//! boundary on top of the core codec.

mod error;
mod registry;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
