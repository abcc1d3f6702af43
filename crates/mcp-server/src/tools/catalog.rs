use super::schemas::{GetRuleRequest, ListRulesRequest, ReloadRequest, RepositoryStatusRequest};
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde_json::{json, Value};
use std::sync::Arc;

pub const LIST_RULES: &str = "list_rules";
pub const GET_RULE: &str = "get_rule";
pub const REPOSITORY_STATUS: &str = "repository_status";
pub const RELOAD: &str = "reload";

const LIST_RULES_DESCRIPTION: &str =
    "List every rule key currently available, plus ALL for the combined document.";
const GET_RULE_DESCRIPTION: &str =
    "Return the text of one rule by key, or every rule as labeled sections when key is ALL. \
The key enum lists the rules present when tools were listed; the server sends \
tools/list_changed when that set changes.";
const REPOSITORY_STATUS_DESCRIPTION: &str =
    "Report the rules root, snapshot age, staleness and any warnings from the last scan.";
const RELOAD_DESCRIPTION: &str =
    "Force a rescan of the rules directory and return the resulting status.";

/// Tool list for `tools/list`. The `key` argument of `get_rule` is constrained to `keys`.
pub fn tools(keys: &[String]) -> Vec<Tool> {
    vec![
        Tool::new(
            LIST_RULES,
            LIST_RULES_DESCRIPTION,
            Arc::new(input_schema::<ListRulesRequest>()),
        ),
        Tool::new(
            GET_RULE,
            GET_RULE_DESCRIPTION,
            Arc::new(get_rule_schema(keys)),
        ),
        Tool::new(
            REPOSITORY_STATUS,
            REPOSITORY_STATUS_DESCRIPTION,
            Arc::new(input_schema::<RepositoryStatusRequest>()),
        ),
        Tool::new(
            RELOAD,
            RELOAD_DESCRIPTION,
            Arc::new(input_schema::<ReloadRequest>()),
        ),
    ]
}

pub fn tool_inventory_json(version: &str, keys: &[String]) -> String {
    let tools: Vec<Value> = tools(keys)
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.input_schema.as_ref(),
            })
        })
        .collect();
    let payload = json!({
        "server": "rulebook-mcp",
        "version": version,
        "tools": tools,
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
}

fn get_rule_schema(keys: &[String]) -> JsonObject {
    let mut schema = input_schema::<GetRuleRequest>();
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        if let Some(Value::Object(key)) = properties.get_mut("key") {
            key.insert("enum".to_string(), json!(keys));
        }
    }
    schema
}

fn input_schema<T: JsonSchema>() -> JsonObject {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(mut map)) => {
            map.remove("$schema");
            map
        }
        _ => JsonObject::new(),
    }
}
