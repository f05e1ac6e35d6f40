//! Tests for the gateway meta-operations

use super::*;
use crate::invocation::InvocationHandler;
use crate::operation::{
    Operation, OperationDefinition, OperationKind, OperationOutcome, OperationRegistry,
    ParameterDefinition,
};
use crate::policy::AllowList;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns the `limit` it was given
#[derive(Default)]
struct ListUsers {
    limit: Option<i64>,
}

#[async_trait]
impl Operation for ListUsers {
    fn set_value(&mut self, name: &str, value: Value) {
        if name == "limit" {
            self.limit = value.as_i64();
        }
    }

    async fn execute(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn result(&self) -> OperationOutcome {
        OperationOutcome::success()
            .with_message("Listed users")
            .with_data(&json!({"limit": self.limit}))
    }
}

fn gateway(factory_calls: Arc<AtomicUsize>) -> ToolGateway {
    let mut registry = OperationRegistry::new();
    registry
        .register(
            OperationDefinition::new("acme:get_site_status", "Site status")
                .with_provider("acme")
                .with_description("Report the current health of the site"),
            || Ok(Box::new(ListUsers::default())),
        )
        .unwrap();
    registry
        .register(
            OperationDefinition::new("acme:list_users", "List users")
                .with_provider("acme")
                .with_description("Enumerate accounts")
                .with_parameter(ParameterDefinition::integer("limit")),
            move || {
                factory_calls.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ListUsers::default()))
            },
        )
        .unwrap();
    registry
        .register(
            OperationDefinition::new("acme:reindex", "Reindex")
                .with_provider("acme")
                .with_kind(OperationKind::Trigger),
            || Ok(Box::new(ListUsers::default())),
        )
        .unwrap();
    registry
        .register(
            OperationDefinition::new("other_vendor:status", "Vendor status")
                .with_provider("other_vendor"),
            || Ok(Box::new(ListUsers::default())),
        )
        .unwrap();

    ToolGateway::new(InvocationHandler::new(Arc::new(registry), AllowList::prefix("acme")))
}

fn names(result: &ToolCallResult) -> Vec<String> {
    result.structured()["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_discover_lists_allowed_tools() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));
    let result = gateway.discover(None);

    assert!(!result.is_error);
    assert_eq!(result.structured()["success"], true);
    assert_eq!(result.structured()["count"], 3);
    assert_eq!(
        names(&result),
        vec!["acme___get_site_status", "acme___list_users", "acme___reindex"]
    );
    assert!(result.text_content().starts_with("Found 3 tools.\n"));
}

#[test]
fn test_discover_query() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));
    let result = gateway.discover(Some("status"));

    assert_eq!(names(&result), vec!["acme___get_site_status"]);
    let hints = &result.structured()["tools"][0]["hints"];
    assert_eq!(hints, &json!({"read_only": true, "destructive": false, "idempotent": true}));
}

#[test]
fn test_discover_no_matches() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));
    let result = gateway.discover(Some("zzz"));

    assert!(!result.is_error);
    assert_eq!(result.text_content(), "Found 0 tools.");
    assert_eq!(result.structured()["count"], 0);
}

#[test]
fn test_catalog_is_cached() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));
    let first = gateway.catalog() as *const ToolCatalog;
    let second = gateway.catalog() as *const ToolCatalog;
    assert_eq!(first, second);
}

#[test]
fn test_get_info() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));

    for name in ["acme___list_users", "acme:list_users"] {
        let result = gateway.get_info(name);
        assert!(!result.is_error);

        let info = result.structured();
        assert_eq!(info["success"], true);
        assert_eq!(info["name"], "acme___list_users");
        assert_eq!(info["operation_id"], "acme:list_users");
        assert_eq!(info["provider"], "acme");
        assert_eq!(info["inputSchema"]["properties"]["limit"]["type"], "integer");
        assert_eq!(info["annotations"]["readOnlyHint"], true);
        assert!(result.text_content().contains("\"operation_id\": \"acme:list_users\""));
    }
}

#[test]
fn test_get_info_unknown_and_hidden() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));

    for name in ["acme___nope", "other_vendor___status"] {
        let result = gateway.get_info(name);
        assert!(result.is_error);
        assert_eq!(
            result.structured(),
            &json!({"success": false, "error": format!("Unknown tool: {name}")})
        );
    }
}

#[tokio::test]
async fn test_execute_delegates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = gateway(calls.clone());

    let result = gateway.execute("acme___list_users", json!({"limit": "25"})).await;
    assert!(!result.is_error);
    assert_eq!(result.structured()["data"], json!({"limit": 25}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_execute_rejects_non_object_arguments() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = gateway(calls.clone());

    let result = gateway.execute("acme___list_users", json!("limit=5")).await;
    assert!(result.is_error);
    assert_eq!(
        result.structured(),
        &json!({"success": false, "error": "Arguments must be an object.", "tool": "acme___list_users"})
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_execute_unknown_tool_folds_protocol_error() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));

    let result = gateway.execute("other_vendor___status", Value::Null).await;
    assert!(result.is_error);
    assert_eq!(
        result.structured(),
        &json!({
            "success": false,
            "error": "Unknown tool: other_vendor___status",
            "tool": "other_vendor___status",
            "code": -32601
        })
    );
}

#[tokio::test]
async fn test_call_dispatches_meta_tools() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));

    let discovered = gateway.call(DISCOVER_TOOL, json!({"query": "users"})).await.unwrap();
    assert_eq!(names(&discovered), vec!["acme___list_users"]);

    let info = gateway
        .call(GET_INFO_TOOL, json!({"tool_name": "acme___reindex"}))
        .await
        .unwrap();
    assert_eq!(info.structured()["annotations"]["readOnlyHint"], false);

    let executed = gateway
        .call(
            EXECUTE_TOOL,
            json!({"tool_name": "acme___list_users", "arguments": {"limit": 3}}),
        )
        .await
        .unwrap();
    assert_eq!(executed.structured()["data"]["limit"], 3);
}

#[tokio::test]
async fn test_call_argument_errors() {
    let gateway = gateway(Arc::new(AtomicUsize::new(0)));

    let missing = gateway.call(GET_INFO_TOOL, json!({})).await.unwrap_err();
    assert_eq!(missing.code, -32602);

    let wrong_type = gateway.call(DISCOVER_TOOL, json!({"query": 5})).await.unwrap_err();
    assert_eq!(wrong_type.code, -32602);

    let unknown = gateway.call("toolgate/other", json!({})).await.unwrap_err();
    assert_eq!(unknown.code, -32601);
}

#[test]
fn test_meta_tool_definitions() {
    let tools = ToolGateway::tools();
    assert_eq!(tools.len(), 3);

    let discover = &tools[0];
    assert_eq!(discover.name, DISCOVER_TOOL);
    assert!(discover.input_schema.get("required").is_none());
    let annotations = discover.annotations.as_ref().unwrap();
    assert_eq!(annotations.title.as_deref(), Some("Discover Tools"));
    assert_eq!(annotations.open_world_hint, Some(false));

    let execute = &tools[2];
    assert_eq!(execute.input_schema["required"], json!(["tool_name"]));
    assert_eq!(execute.input_schema["properties"]["arguments"]["type"], "object");
    let annotations = execute.annotations.as_ref().unwrap();
    assert_eq!(annotations.read_only_hint, Some(false));
    assert_eq!(annotations.open_world_hint, Some(true));
    assert!(annotations.idempotent_hint.is_none());

    assert!(tools.iter().all(|t| ToolGateway::is_gateway_tool(&t.name)));
    assert!(!ToolGateway::is_gateway_tool("acme___list_users"));
}
