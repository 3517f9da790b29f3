#![deny(missing_docs)]

//! # Artifact Generation
//!
//! Projects an id-enriched [`ServiceSchema`] into one generated source unit.
//!
//! The artifact contains, in order: the do-not-edit banner, the imports of
//! the runtime networking and failure-injection collaborators, and a
//! namespace-scoped block holding the dispatch stub, the client stub, and
//! the failure-probe harness. Callers must run
//! [`crate::ident::assign_ids`] first; rendering is a pure projection and
//! performs no I/O.

use crate::schema::ServiceSchema;
use crate::strategies::TargetStrategy;

/// Renders the complete artifact for `schema` with the given target.
pub fn generate_service_artifact(schema: &ServiceSchema, strategy: &impl TargetStrategy) -> String {
    tracing::debug!(
        service = %schema.service_name,
        methods = schema.methods.len(),
        "rendering artifact"
    );

    let mut out = String::new();
    out.push_str(&strategy.header_comment());
    out.push('\n');
    out.push_str(&strategy.imports(schema));
    out.push('\n');
    out.push_str(&strategy.namespace_open(schema));
    out.push_str(&strategy.dispatch_stub(schema));
    out.push('\n');
    out.push_str(&strategy.client_stub(schema));
    out.push('\n');
    out.push_str(&strategy.failure_probes(schema));
    out.push_str(&strategy.namespace_close(schema));
    out
}
