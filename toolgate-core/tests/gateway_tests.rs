//! End-to-end tests for discovery, inspection and invocation
//!
//! These tests drive a small registry through the public API only: the
//! gateway meta-operations, the invocation handler, and the MCP server.

use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use toolgate_core::gateway::{EXECUTE_TOOL, GET_INFO_TOOL};
use toolgate_core::invocation::coerce_value;
use toolgate_core::operation::name::{to_operation_id, to_wire_name};
use toolgate_core::prelude::*;

/// Reports a fixed status, echoing the arguments it received
#[derive(Default)]
struct SiteStatus {
    received: serde_json::Map<String, Value>,
}

#[async_trait::async_trait]
impl Operation for SiteStatus {
    fn set_value(&mut self, name: &str, value: Value) {
        self.received.insert(name.to_string(), value);
    }

    async fn execute(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn result(&self) -> OperationOutcome {
        OperationOutcome::success()
            .with_message("Site is up")
            .with_data(&json!({"status": "ok", "received": self.received}))
    }
}

/// Access is always denied; counts how often `execute` runs
struct Restricted {
    executions: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Operation for Restricted {
    fn set_value(&mut self, _name: &str, _value: Value) {}

    fn access(&self) -> bool {
        false
    }

    async fn execute(&mut self) -> anyhow::Result<()> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn result(&self) -> OperationOutcome {
        OperationOutcome::success().with_message("should not happen")
    }
}

/// Fails with a context chain
struct Flaky;

#[async_trait::async_trait]
impl Operation for Flaky {
    fn set_value(&mut self, _name: &str, _value: Value) {}

    async fn execute(&mut self) -> anyhow::Result<()> {
        anyhow::bail!("upstream timed out")
    }

    fn result(&self) -> OperationOutcome {
        OperationOutcome::success()
    }
}

/// Panics during execution
struct Unstable;

#[async_trait::async_trait]
impl Operation for Unstable {
    fn set_value(&mut self, _name: &str, _value: Value) {}

    async fn execute(&mut self) -> anyhow::Result<()> {
        let items: Vec<u8> = Vec::new();
        let index = items.len() + 3;
        let _ = items[index];
        Ok(())
    }

    fn result(&self) -> OperationOutcome {
        OperationOutcome::success()
    }
}

struct Harness {
    registry: Arc<OperationRegistry>,
    restricted_executions: Arc<AtomicUsize>,
}

fn harness() -> Harness {
    let restricted_executions = Arc::new(AtomicUsize::new(0));
    let mut registry = OperationRegistry::new();

    registry
        .register(
            OperationDefinition::new("acme:get_site_status", "Get site status")
                .with_provider("acme")
                .with_description("Report whether the site is healthy")
                .with_parameter(ParameterDefinition::boolean("verbose"))
                .with_parameter(ParameterDefinition::integer("count")),
            || Ok(Box::new(SiteStatus::default())),
        )
        .unwrap();
    registry
        .register(
            OperationDefinition::new("acme:list_users", "List users")
                .with_provider("acme")
                .with_description("Enumerate accounts")
                .with_parameter(
                    ParameterDefinition::string("role")
                        .with_allowed_values([json!("admin"), json!("editor")]),
                ),
            || Ok(Box::new(SiteStatus::default())),
        )
        .unwrap();

    let executions = restricted_executions.clone();
    registry
        .register(
            OperationDefinition::new("acme:delete_site", "Delete site")
                .with_provider("acme")
                .with_kind(OperationKind::Write)
                .destructive(),
            move || {
                Ok(Box::new(Restricted {
                    executions: executions.clone(),
                }))
            },
        )
        .unwrap();
    registry
        .register(
            OperationDefinition::new("acme:sync_feeds", "Sync feeds").with_provider("acme"),
            || Ok(Box::new(Flaky)),
        )
        .unwrap();
    registry
        .register(
            OperationDefinition::new("acme:rebuild_index", "Rebuild index").with_provider("acme"),
            || Ok(Box::new(Unstable)),
        )
        .unwrap();
    registry
        .register(
            OperationDefinition::new("other_vendor:thing", "Vendor thing")
                .with_provider("other_vendor.thing"),
            || Ok(Box::new(SiteStatus::default())),
        )
        .unwrap();

    Harness {
        registry: Arc::new(registry),
        restricted_executions,
    }
}

fn gateway(harness: &Harness) -> ToolGateway {
    ToolGateway::new(InvocationHandler::new(
        harness.registry.clone(),
        AllowList::prefix("acme"),
    ))
}

fn discovered_names(result: &ToolCallResult) -> Vec<String> {
    result.structured()["tools"]
        .as_array()
        .map(|tools| {
            tools
                .iter()
                .filter_map(|t| t["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_every_schema_is_an_object_with_object_properties() {
    let harness = harness();
    for definition in harness.registry.definitions() {
        let encoded = serde_json::to_string(&to_input_schema(definition)).unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded["type"], "object", "{}", definition.id);
        assert!(decoded["properties"].is_object(), "{}", definition.id);
    }
}

#[test]
fn test_coercion_is_idempotent_on_typed_values() {
    let flag = ParameterDefinition::boolean("flag");
    let count = ParameterDefinition::integer("count");

    assert_eq!(coerce_value(&flag, json!(true)), json!(true));
    assert_eq!(coerce_value(&count, json!(5)), json!(5));
}

#[tokio::test]
async fn test_string_arguments_are_coerced() {
    let harness = harness();
    let result = gateway(&harness)
        .execute("acme___get_site_status", json!({"count": "5", "verbose": "false"}))
        .await;

    assert!(!result.is_error);
    assert_eq!(
        result.structured()["data"]["received"],
        json!({"count": 5, "verbose": false})
    );
}

#[tokio::test]
async fn test_unknown_tool_everywhere() {
    let harness = harness();
    let gateway = gateway(&harness);

    assert!(!discovered_names(&gateway.discover(None)).contains(&"does_not_exist".to_string()));

    let info = gateway.get_info("does_not_exist");
    assert_eq!(info.structured()["success"], false);
    assert!(info.structured()["error"].as_str().unwrap().contains("Unknown tool"));

    let executed = gateway.execute("does_not_exist", json!({})).await;
    assert!(executed.is_error);
}

#[tokio::test]
async fn test_allow_list_hides_other_providers() {
    let harness = harness();
    let gateway = gateway(&harness);

    assert!(harness.registry.contains("other_vendor:thing"));

    let names = discovered_names(&gateway.discover(None));
    assert!(!names.iter().any(|n| n.starts_with("other_vendor")));

    let executed = gateway.execute("other_vendor___thing", json!({})).await;
    assert!(executed.is_error);
    assert_eq!(executed.structured()["error"], "Unknown tool: other_vendor___thing");
    assert_eq!(executed.structured()["code"], -32601);
}

#[tokio::test]
async fn test_access_denial_never_executes() {
    let harness = harness();
    let result = gateway(&harness).execute("acme___delete_site", json!({})).await;

    assert!(result.is_error);
    assert_eq!(
        result.structured(),
        &json!({"success": false, "message": "Access denied."})
    );
    assert_eq!(harness.restricted_executions.load(Ordering::SeqCst), 0);
}

#[test]
fn test_name_transform_reverses() {
    let harness = harness();
    for id in harness.registry.ids() {
        assert!(id.contains(':'));
        assert_eq!(to_operation_id(&to_wire_name(id)), id);
    }
}

#[test]
fn test_query_filter() {
    let harness = harness();
    let result = gateway(&harness).discover(Some("status"));

    assert_eq!(discovered_names(&result), vec!["acme___get_site_status"]);
    assert_eq!(result.structured()["count"], 1);
}

#[tokio::test]
async fn test_execution_failures_are_results() {
    let harness = harness();
    let gateway = gateway(&harness);

    let failed = gateway.execute("acme___sync_feeds", Value::Null).await;
    assert!(failed.is_error);
    assert_eq!(failed.structured()["message"], "upstream timed out");

    let panicked = gateway.execute("acme___rebuild_index", Value::Null).await;
    assert!(panicked.is_error);
    assert!(
        panicked.structured()["message"]
            .as_str()
            .unwrap()
            .contains("index out of bounds")
    );
}

#[tokio::test]
async fn test_strict_and_lenient_paths_diverge() {
    let harness = harness();
    let arguments = json!({"role": "guest"});

    let lenient = gateway(&harness).execute("acme___list_users", arguments.clone()).await;
    assert!(!lenient.is_error);

    let strict = ToolGateway::new(
        InvocationHandler::new(harness.registry.clone(), AllowList::prefix("acme"))
            .with_strict_validation(InputValidator::default()),
    );
    let rejected = strict.execute("acme___list_users", arguments).await;
    assert!(rejected.is_error);
    assert_eq!(
        rejected.structured()["data"]["validation_errors"][0]["keyword"],
        "enum"
    );
    assert_eq!(rejected.structured()["data"]["validation_errors"][0]["path"], "role");
}

#[tokio::test]
async fn test_server_round_trip_in_gateway_mode() {
    let harness = harness();
    let mut config = GatewayConfig::default();
    config.server.gateway_mode = true;
    config.access.allowed_provider_prefix = "acme".to_string();

    let server = McpServer::builder()
        .with_config(&config)
        .with_registry(harness.registry.clone())
        .build();

    let request: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": "call-1",
        "method": "tools/call",
        "params": {
            "name": EXECUTE_TOOL,
            "arguments": {"tool_name": "acme___get_site_status", "arguments": {"verbose": "yes"}}
        }
    }))
    .unwrap();

    let response = server.handle_request(request).await;
    assert_eq!(response.id, RequestId::from("call-1"));

    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
    assert_eq!(result["structuredContent"]["data"]["received"]["verbose"], true);
    assert!(result["content"][0]["text"].as_str().unwrap().starts_with("Site is up\n"));

    let info = server
        .handle_request(JsonRpcRequest::new(2i64, "tools/call").with_params(json!({
            "name": GET_INFO_TOOL,
            "arguments": {"tool_name": "acme:delete_site"}
        })))
        .await
        .result
        .unwrap();
    assert_eq!(info["structuredContent"]["annotations"]["destructiveHint"], true);
}
