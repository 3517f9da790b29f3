#![deny(missing_docs)]

//! # Target Strategy Trait
//!
//! Defines the interface required to render a service schema into source
//! text for a specific target language/runtime. The generator core (loader +
//! id assignment + structural contract) stays testable independent of the
//! exact output syntax.

use crate::schema::ServiceSchema;

/// A strategy trait for decoupling target-language rendering.
///
/// Implementors emit the individual sections of one generated artifact; the
/// orchestrator in [`crate::codegen`] concatenates them in the fixed order:
/// header, imports, namespace open, dispatch stub, client stub, failure
/// probes, namespace close.
pub trait TargetStrategy {
    /// Returns the do-not-edit banner for the generated file.
    fn header_comment(&self) -> String;

    /// Returns the imports of the runtime networking and failure-injection
    /// collaborators, including the schema's extra `includes`.
    fn imports(&self, schema: &ServiceSchema) -> String;

    /// Opens the namespace-scoped block.
    fn namespace_open(&self, schema: &ServiceSchema) -> String;

    /// Closes the namespace-scoped block.
    fn namespace_close(&self, schema: &ServiceSchema) -> String;

    /// Renders the server-side dispatch stub.
    ///
    /// The emitted text must contain one dispatch entry per method, keyed by
    /// that method's id, plus a reachable fallback for unknown ids; and per
    /// method a raw/wire handler delegating to an overridable handler whose
    /// default resolves to a defined "unimplemented" failure.
    fn dispatch_stub(&self, schema: &ServiceSchema) -> String;

    /// Renders the client-side call stub: one method per schema method,
    /// sending `input_type` and asynchronously yielding `output_type`.
    fn client_stub(&self, schema: &ServiceSchema) -> String;

    /// Renders the failure-injection probe harness: one point per method,
    /// addressable by method name, supporting synthesized failure, bounded
    /// random delay, or abnormal termination when enabled; a no-op when not.
    fn failure_probes(&self, schema: &ServiceSchema) -> String;
}
