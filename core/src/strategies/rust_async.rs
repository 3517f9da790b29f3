#![deny(missing_docs)]

//! # Rust Async Strategy
//!
//! Implementation of `TargetStrategy` emitting async Rust stubs against the
//! `rpc`/`finject` runtime collaborators. Type references from the schema
//! are echoed verbatim; the consuming project supplies the actual types.

use heck::ToUpperCamelCase;

use crate::schema::ServiceSchema;
use crate::strategies::TargetStrategy;

/// Strategy for generating async Rust stubs.
pub struct RustAsyncStrategy;

impl TargetStrategy for RustAsyncStrategy {
    fn header_comment(&self) -> String {
        "// This file is autogenerated. Manual changes will be lost.\n".to_string()
    }

    fn imports(&self, schema: &ServiceSchema) -> String {
        imports(schema)
    }

    fn namespace_open(&self, schema: &ServiceSchema) -> String {
        format!("pub mod {} {{\n    use super::*;\n\n", schema.namespace)
    }

    fn namespace_close(&self, _schema: &ServiceSchema) -> String {
        "} // namespace\n".to_string()
    }

    fn dispatch_stub(&self, schema: &ServiceSchema) -> String {
        dispatch_stub(schema)
    }

    fn client_stub(&self, schema: &ServiceSchema) -> String {
        client_stub(schema)
    }

    fn failure_probes(&self, schema: &ServiceSchema) -> String {
        failure_probes(schema)
    }
}

/// PascalCase prefix for the generated service/client/probe type names.
fn service_type_name(schema: &ServiceSchema) -> String {
    schema.service_name.to_upper_camel_case()
}

/// Bit mask addressing one method inside the probe configuration words.
///
/// The first declared method gets bit 1, matching the wire-tooling
/// convention of reserving bit 0.
fn probe_mask(index: usize) -> String {
    format!("1u64 << {}", index + 1)
}

/// Prefixes every non-blank line with one indent level.
fn indent(code: &str) -> String {
    let mut out = String::new();
    for line in code.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Returns the imports of the runtime and failure-injection collaborators.
fn imports(schema: &ServiceSchema) -> String {
    let mut code = String::new();
    code.push_str("use std::time::Duration;\n\n");
    code.push_str("use finject::Probe;\n");
    code.push_str("use rpc::execution::execute_typed;\n");
    code.push_str("use rpc::{\n");
    code.push_str("    ClientContext, InputStream, Netbuf, RpcError, SchedulingGroup, SmpServiceGroup,\n");
    code.push_str("    StreamingContext, Transport,\n");
    code.push_str("};\n");

    if !schema.includes.is_empty() {
        code.push_str("\n// extra includes\n");
        for include in &schema.includes {
            code.push_str(&format!("use {};\n", include));
        }
    }

    code
}

/// Generates the server-side dispatch stub.
///
/// One dispatch arm per method keyed by its id, a `_ => None` fallback for
/// unknown ids, and per method the raw/wire handler plus the overridable
/// default handler.
fn dispatch_stub(schema: &ServiceSchema) -> String {
    let service = service_type_name(schema);
    let mut code = String::new();

    code.push_str(&format!(
        "/// Server-side dispatch stub for `{}`.\n",
        schema.service_name
    ));
    code.push_str("///\n");
    code.push_str("/// A concrete service overrides the per-method handlers; an unoverridden\n");
    code.push_str("/// handler resolves to `RpcError::Unimplemented` instead of succeeding.\n");
    code.push_str(&format!("pub trait {}Service: Send + Sync {{\n", service));
    code.push_str("    /// Scheduling group this service executes under.\n");
    code.push_str("    fn scheduling_group(&self) -> SchedulingGroup;\n");
    code.push('\n');
    code.push_str("    /// Concurrency-limit group for cross-shard dispatch.\n");
    code.push_str("    fn smp_service_group(&self) -> SmpServiceGroup;\n");
    code.push('\n');
    code.push_str("    /// Routes an incoming id to its handler slot, `None` for unknown ids.\n");
    code.push_str("    async fn dispatch(\n");
    code.push_str("        &self,\n");
    code.push_str("        id: u32,\n");
    code.push_str("        input: &mut InputStream,\n");
    code.push_str("        ctx: &mut StreamingContext,\n");
    code.push_str("    ) -> Option<Result<Netbuf, RpcError>> {\n");
    code.push_str("        match id {\n");
    for method in &schema.methods {
        code.push_str(&format!(
            "            {}u32 => Some(self.raw_{}(input, ctx).await),\n",
            method.id, method.name
        ));
    }
    code.push_str("            _ => None,\n");
    code.push_str("        }\n");
    code.push_str("    }\n");

    for method in &schema.methods {
        code.push('\n');
        code.push_str(&format!(
            "    /// {} -> {}\n",
            method.input_type, method.output_type
        ));
        code.push_str(&format!("    async fn raw_{}(\n", method.name));
        code.push_str("        &self,\n");
        code.push_str("        input: &mut InputStream,\n");
        code.push_str("        ctx: &mut StreamingContext,\n");
        code.push_str("    ) -> Result<Netbuf, RpcError> {\n");
        code.push_str(&format!(
            "        execute_typed::<{}, {}, _>(input, ctx, {}u32, |req, ctx| {{\n",
            method.input_type, method.output_type, method.id
        ));
        code.push_str(&format!("            self.{}(req, ctx)\n", method.name));
        code.push_str("        })\n");
        code.push_str("        .await\n");
        code.push_str("    }\n");
        code.push('\n');
        code.push_str(&format!(
            "    /// Default handler for `{}`; a concrete service must override this.\n",
            method.name
        ));
        code.push_str(&format!("    async fn {}(\n", method.name));
        code.push_str("        &self,\n");
        code.push_str(&format!("        _input: {},\n", method.input_type));
        code.push_str("        _ctx: &mut StreamingContext,\n");
        code.push_str(&format!(
            "    ) -> Result<{}, RpcError> {{\n",
            method.output_type
        ));
        code.push_str(&format!(
            "        Err(RpcError::Unimplemented(\"{}::{}::{}\"))\n",
            schema.namespace, schema.service_name, method.name
        ));
        code.push_str("    }\n");
    }

    code.push_str("}\n");
    indent(&code)
}

/// Generates the client-side call stub.
fn client_stub(schema: &ServiceSchema) -> String {
    let service = service_type_name(schema);
    let mut code = String::new();

    code.push_str(&format!(
        "/// Client-side call stub for `{}`.\n",
        schema.service_name
    ));
    code.push_str(&format!("pub struct {}Client<'a> {{\n", service));
    code.push_str("    transport: &'a mut Transport,\n");
    code.push_str("}\n");
    code.push('\n');
    code.push_str(&format!("impl<'a> {}Client<'a> {{\n", service));
    code.push_str("    /// Wraps an established transport.\n");
    code.push_str("    pub fn new(transport: &'a mut Transport) -> Self {\n");
    code.push_str("        Self { transport }\n");
    code.push_str("    }\n");

    for method in &schema.methods {
        code.push('\n');
        code.push_str(&format!(
            "    /// Sends `{}`, yields `{}`.\n",
            method.input_type, method.output_type
        ));
        code.push_str(&format!(
            "    pub async fn {}(&mut self, req: {}) -> Result<ClientContext<{}>, RpcError> {{\n",
            method.name, method.input_type, method.output_type
        ));
        code.push_str("        self.transport\n");
        code.push_str(&format!(
            "            .send_typed::<{}, {}>(req, {}u32)\n",
            method.input_type, method.output_type, method.id
        ));
        code.push_str("            .await\n");
        code.push_str("    }\n");
    }

    code.push_str("}\n");
    indent(&code)
}

/// Generates the failure-injection probe harness.
///
/// One point per method, addressed by method name. Enabled points inject
/// exactly one of: a synthesized failure, a bounded random delay (0-49 ms),
/// or abnormal process termination. Disabled points are immediate no-ops.
fn failure_probes(schema: &ServiceSchema) -> String {
    let service = service_type_name(schema);
    let mut code = String::new();

    code.push_str(&format!(
        "/// Failure-injection probes for `{}`.\n",
        schema.service_name
    ));
    code.push_str("///\n");
    code.push_str("/// Points are addressed by method name; a point that is not enabled is\n");
    code.push_str("/// an immediate no-op.\n");
    code.push_str("#[derive(Debug, Default)]\n");
    code.push_str(&format!("pub struct {}FailureProbes {{\n", service));
    code.push_str("    probe: Probe,\n");
    code.push_str("}\n");
    code.push('\n');
    code.push_str(&format!("impl {}FailureProbes {{\n", service));
    code.push_str("    /// Registry name for this probe set.\n");
    code.push_str(&format!(
        "    pub const NAME: &'static str = \"{}_service::failure_probes\";\n",
        schema.service_name
    ));
    code.push('\n');
    code.push_str("    /// Bit mask assigned to `point`, 0 for unknown points.\n");
    code.push_str("    pub fn method_for_point(point: &str) -> u64 {\n");
    code.push_str("        match point {\n");
    for (index, method) in schema.methods.iter().enumerate() {
        code.push_str(&format!(
            "            \"{}\" => {},\n",
            method.name,
            probe_mask(index)
        ));
    }
    code.push_str("            _ => 0,\n");
    code.push_str("        }\n");
    code.push_str("    }\n");
    code.push('\n');
    code.push_str("    /// All injection points, in method declaration order.\n");
    code.push_str("    pub fn points() -> Vec<&'static str> {\n");
    let point_list = schema
        .methods
        .iter()
        .map(|m| format!("\"{}\"", m.name))
        .collect::<Vec<_>>()
        .join(", ");
    code.push_str(&format!("        vec![{}]\n", point_list));
    code.push_str("    }\n");

    for (index, method) in schema.methods.iter().enumerate() {
        code.push('\n');
        code.push_str(&format!("    /// Injection point for `{}`.\n", method.name));
        code.push_str(&format!(
            "    pub async fn {}(&self) -> Result<(), RpcError> {{\n",
            method.name
        ));
        code.push_str("        if !self.probe.is_enabled() {\n");
        code.push_str("            return Ok(());\n");
        code.push_str("        }\n");
        code.push_str(&format!("        self.do_{}().await\n", method.name));
        code.push_str("    }\n");
        code.push('\n');
        code.push_str(&format!(
            "    async fn do_{}(&self) -> Result<(), RpcError> {{\n",
            method.name
        ));
        code.push_str(&format!("        let mask = {};\n", probe_mask(index)));
        code.push_str("        if self.probe.fails(mask) {\n");
        code.push_str(&format!(
            "            return Err(RpcError::Injected(\"{}::{}::{}\"));\n",
            schema.namespace, schema.service_name, method.name
        ));
        code.push_str("        }\n");
        code.push_str("        if self.probe.delays(mask) {\n");
        code.push_str(
            "            tokio::time::sleep(Duration::from_millis(fastrand::u64(..50))).await;\n",
        );
        code.push_str("            return Ok(());\n");
        code.push_str("        }\n");
        code.push_str("        if self.probe.terminates(mask) {\n");
        code.push_str("            std::process::abort();\n");
        code.push_str("        }\n");
        code.push_str("        Ok(())\n");
        code.push_str("    }\n");
    }

    code.push_str("}\n");
    indent(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{assign_ids, Crc32Hasher};
    use crate::schema::parse_service_document;

    fn echo_schema() -> ServiceSchema {
        let mut schema = parse_service_document(
            r#"{
            "namespace": "rpc_test",
            "service_name": "echo",
            "methods": [
                {"name": "ping", "input_type": "ping_req", "output_type": "ping_resp"}
            ]
        }"#,
        )
        .unwrap();
        assign_ids(&mut schema, &Crc32Hasher).unwrap();
        schema
    }

    #[test]
    fn test_service_type_name_is_pascal_case() {
        let schema = echo_schema();
        assert_eq!(service_type_name(&schema), "Echo");
    }

    #[test]
    fn test_dispatch_stub_arms_and_fallback() {
        let schema = echo_schema();
        let code = dispatch_stub(&schema);
        assert!(code.contains("pub trait EchoService"));
        assert!(code.contains("4294345902u32 => Some(self.raw_ping(input, ctx).await),"));
        assert!(code.contains("_ => None,"));
    }

    #[test]
    fn test_dispatch_stub_triad_agrees_on_id() {
        let schema = echo_schema();
        let code = dispatch_stub(&schema);
        // Raw handler decodes with the same id the dispatch arm routes on
        assert!(code.contains("async fn raw_ping("));
        assert!(code.contains("execute_typed::<ping_req, ping_resp, _>(input, ctx, 4294345902u32"));
        // Default handler signals unimplemented rather than succeeding
        assert!(code.contains("async fn ping("));
        assert!(code.contains("Err(RpcError::Unimplemented(\"rpc_test::echo::ping\"))"));
    }

    #[test]
    fn test_client_stub_sends_with_method_id() {
        let schema = echo_schema();
        let code = client_stub(&schema);
        assert!(code.contains("pub struct EchoClient"));
        assert!(code.contains("pub async fn ping(&mut self, req: ping_req)"));
        assert!(code.contains(".send_typed::<ping_req, ping_resp>(req, 4294345902u32)"));
    }

    #[test]
    fn test_failure_probes_point_by_name() {
        let schema = echo_schema();
        let code = failure_probes(&schema);
        assert!(code.contains("pub struct EchoFailureProbes"));
        assert!(code.contains("\"echo_service::failure_probes\""));
        assert!(code.contains("\"ping\" => 1u64 << 1,"));
        assert!(code.contains("vec![\"ping\"]"));
        assert!(code.contains("RpcError::Injected(\"rpc_test::echo::ping\")"));
        assert!(code.contains("Duration::from_millis(fastrand::u64(..50))"));
        assert!(code.contains("std::process::abort();"));
    }

    #[test]
    fn test_disabled_point_is_noop() {
        let schema = echo_schema();
        let code = failure_probes(&schema);
        assert!(code.contains("if !self.probe.is_enabled() {"));
        assert!(code.contains("return Ok(());"));
    }

    #[test]
    fn test_includes_are_echoed() {
        let mut schema = echo_schema();
        schema.includes = vec!["crate::types::ping_req".into()];
        let code = imports(&schema);
        assert!(code.contains("// extra includes"));
        assert!(code.contains("use crate::types::ping_req;"));
    }

    #[test]
    fn test_empty_service_sections_are_well_formed() {
        let mut schema = parse_service_document(
            r#"{"namespace": "ns", "service_name": "svc", "methods": []}"#,
        )
        .unwrap();
        assign_ids(&mut schema, &Crc32Hasher).unwrap();

        let dispatch = dispatch_stub(&schema);
        assert!(dispatch.contains("_ => None,"));
        assert!(!dispatch.contains("raw_"));

        let client = client_stub(&schema);
        assert!(client.contains("pub fn new(transport"));
        assert!(!client.contains("send_typed"));

        let probes = failure_probes(&schema);
        assert!(probes.contains("vec![]"));
    }
}
