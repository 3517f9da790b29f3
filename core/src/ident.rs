#![deny(missing_docs)]

//! # Identifier Assignment
//!
//! Derives the 32-bit dispatch ids for a service and its methods.
//!
//! Ids are a pure function of schema content, never of declaration order or
//! of a central registry:
//!
//! - `service_id = hash32(namespace + ":" + service_name)`
//! - `method_id  = service_id XOR hash32(join(name, input_type, output_type))`
//!   where the join separator is `namespace + ":"` itself.
//!
//! XOR-ing with the service id scopes method ids to their owning service.
//! Adding a method never changes existing ids; reordering changes nothing;
//! renaming a method or changing its type signature changes only that
//! method's id. A wire protocol built on these ids relies on exactly this
//! for backward-compatible evolution.

use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::schema::{MethodSchema, ServiceSchema};

/// A pure 32-bit string hash.
///
/// Injectable so the generator core stays testable and registry-free; the
/// wire contract assumes [`Crc32Hasher`].
pub trait IdHasher {
    /// Hashes `input` to a 32-bit id.
    fn hash32(&self, input: &str) -> u32;
}

/// CRC-32 (IEEE) hasher with zlib `crc32` semantics: order-sensitive,
/// avalanches on single-character changes, no cryptographic guarantee.
#[derive(Debug, Default, Clone, Copy)]
pub struct Crc32Hasher;

impl IdHasher for Crc32Hasher {
    fn hash32(&self, input: &str) -> u32 {
        crc32fast::hash(input.as_bytes())
    }
}

/// Computes the service id from namespace and service name.
pub fn service_id(hasher: &impl IdHasher, namespace: &str, service_name: &str) -> u32 {
    hasher.hash32(&format!("{}:{}", namespace, service_name))
}

/// Computes one method id, scoped to `service_id`.
pub fn method_id(
    hasher: &impl IdHasher,
    service_id: u32,
    namespace: &str,
    method: &MethodSchema,
) -> u32 {
    let separator = format!("{}:", namespace);
    let composite_key = [
        method.name.as_str(),
        method.input_type.as_str(),
        method.output_type.as_str(),
    ]
    .join(&separator);
    service_id ^ hasher.hash32(&composite_key)
}

/// Enriches `schema` in place with the derived service and method ids.
///
/// Deterministic for fixed schema content. An empty method list is fine:
/// the service id is still computed. After enrichment all method ids must
/// be pairwise distinct; two methods hashing to the same dispatch slot is
/// an [`AppError::Collision`].
pub fn assign_ids(schema: &mut ServiceSchema, hasher: &impl IdHasher) -> AppResult<()> {
    schema.id = service_id(hasher, &schema.namespace, &schema.service_name);
    tracing::debug!(
        service = %schema.service_name,
        id = schema.id,
        "assigned service id"
    );

    let sid = schema.id;
    let namespace = schema.namespace.clone();
    let mut claimed: BTreeMap<u32, String> = BTreeMap::new();
    for method in &mut schema.methods {
        method.id = method_id(hasher, sid, &namespace, method);
        tracing::debug!(method = %method.name, id = method.id, "assigned method id");

        if let Some(holder) = claimed.insert(method.id, method.name.clone()) {
            return Err(AppError::Collision(format!(
                "{}::{}: methods `{}` and `{}` both map to id {}",
                namespace, schema.service_name, holder, method.name, method.id
            )));
        }
    }

    Ok(())
}
