use super::catalog::{self, GET_RULE, LIST_RULES, RELOAD, REPOSITORY_STATUS};
use super::error::{internal_error, invalid_request, unknown_key};
use super::schemas::GetRuleRequest;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use rulebook_protocol::{serialize_json, ListRulesResult, RepositoryStatus, ALL_KEY};
use rulebook_repository::{Invalidate, RepositoryError, RuleQuery};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};

const INSTRUCTIONS: &str = "Rulebook serves grouped Markdown rules. Call list_rules to discover \
keys, then get_rule with a key (or ALL) to read them.";

/// MCP front end over the rule query surface.
#[derive(Clone)]
pub struct RulebookService {
    query: RuleQuery,
    /// Key set last sent in `tools/list`; the `get_rule` enum was built from it.
    advertised_keys: Arc<Mutex<Option<Vec<String>>>>,
}

impl RulebookService {
    pub fn new(query: RuleQuery) -> Self {
        Self {
            query,
            advertised_keys: Arc::new(Mutex::new(None)),
        }
    }

    fn remember_advertised(&self, keys: &[String]) {
        let mut advertised = self.advertised_keys.lock().unwrap_or_else(|e| e.into_inner());
        *advertised = Some(keys.to_vec());
    }

    /// Notify the client when the key set drifted from the one it last listed.
    async fn announce_key_changes(&self, context: &RequestContext<RoleServer>) {
        let keys = match self.blocking(|query| query.list_keys()).await {
            Ok(keys) => keys,
            Err(err) => {
                log::warn!("Could not check rule keys for changes: {err:?}");
                return;
            }
        };
        if !keys_changed(&self.advertised_keys, keys) {
            return;
        }
        if let Err(err) = context.peer.notify_tool_list_changed().await {
            log::warn!("Failed to send tools/list_changed: {err}");
        }
    }

    /// Repository reads may hit the filesystem, so they run off the async executor.
    async fn blocking<T, F>(&self, f: F) -> Result<T, McpError>
    where
        T: Send + 'static,
        F: FnOnce(RuleQuery) -> T + Send + 'static,
    {
        let query = self.query.clone();
        tokio::task::spawn_blocking(move || f(query))
            .await
            .map_err(|err| McpError::internal_error(format!("repository task failed: {err}"), None))
    }

    async fn list_rules(&self) -> Result<CallToolResult, McpError> {
        let keys = self.blocking(|query| query.list_keys()).await?;
        let result = ListRulesResult {
            count: keys.iter().filter(|k| k.as_str() != ALL_KEY).count(),
            keys,
        };
        Ok(json_result(&result))
    }

    async fn get_rule(&self, request: GetRuleRequest) -> Result<CallToolResult, McpError> {
        let key = request.key;
        if key.is_empty() {
            return Ok(invalid_request("key must not be empty"));
        }
        let lookup = key.clone();
        match self.blocking(move |query| query.get(&lookup)).await? {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(err @ RepositoryError::UnknownKey { .. }) => Ok(unknown_key(&key, err.to_string())),
            Err(err) => Ok(internal_error(err.to_string())),
        }
    }

    async fn repository_status(&self) -> Result<CallToolResult, McpError> {
        let status = self
            .blocking(|query| query.repository().status())
            .await?;
        Ok(json_result(&status))
    }

    async fn reload(&self) -> Result<CallToolResult, McpError> {
        let status: RepositoryStatus = self
            .blocking(|query| {
                let repository = query.repository();
                repository.invalidate();
                repository.read();
                repository.status()
            })
            .await?;
        Ok(json_result(&status))
    }
}

impl ServerHandler for RulebookService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_tool_list_changed()
                .build(),
            server_info: Implementation {
                name: "rulebook-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let keys = self.blocking(|query| query.list_keys()).await?;
        self.remember_advertised(&keys);
        Ok(ListToolsResult::with_all_items(catalog::tools(&keys)))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.dispatch(request).await;
        self.announce_key_changes(&context).await;
        result
    }
}

impl RulebookService {
    async fn dispatch(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();
        match &*request.name {
            LIST_RULES => self.list_rules().await,
            GET_RULE => match parse_arguments::<GetRuleRequest>(arguments) {
                Ok(req) => self.get_rule(req).await,
                Err(message) => Ok(invalid_request(message)),
            },
            REPOSITORY_STATUS => self.repository_status().await,
            RELOAD => self.reload().await,
            other => Err(McpError::invalid_params(
                format!("unknown tool: {other}"),
                None,
            )),
        }
    }
}

/// Records `current` and reports whether it differs from an earlier advertised key set.
fn keys_changed(advertised: &Mutex<Option<Vec<String>>>, current: Vec<String>) -> bool {
    let mut advertised = advertised.lock().unwrap_or_else(|e| e.into_inner());
    match advertised.as_ref() {
        None => false,
        Some(previous) if *previous == current => false,
        Some(_) => {
            *advertised = Some(current);
            true
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: JsonObject) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|err| format!("invalid arguments: {err}"))
}

fn json_result<T: serde::Serialize>(value: &T) -> CallToolResult {
    match serialize_json(value) {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(err) => internal_error(format!("failed to serialize result: {err:#}")),
    }
}
