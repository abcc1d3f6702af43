use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListRulesRequest {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetRuleRequest {
    /// Rule key as returned by `list_rules`, or `ALL` for every rule at once.
    #[schemars(description = "Rule key (e.g. GENERAL-OVERVIEW) or ALL for every rule.")]
    pub key: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RepositoryStatusRequest {}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ReloadRequest {}
