#![deny(missing_docs)]

//! # rpcgen Core
//!
//! Core library for the RPC stub generator: schema loading, dispatch id
//! assignment, and artifact rendering.

/// Shared error types.
pub mod error;

/// Service schema model and document loaders.
pub mod schema;

/// Dispatch id derivation.
pub mod ident;

/// Artifact generation.
pub mod codegen;

/// Target-language rendering strategies.
pub mod strategies;

pub use codegen::generate_service_artifact;
pub use error::{AppError, AppResult};
pub use ident::{assign_ids, method_id, service_id, Crc32Hasher, IdHasher};
pub use schema::{
    load_service_file, parse_service_document, parse_service_document_yaml, MethodSchema,
    ServiceSchema,
};
pub use strategies::{RustAsyncStrategy, TargetStrategy};
