//! Rulebook MCP tool surface: tool catalog, request schemas, and dispatch.

pub mod catalog;
mod dispatch;
mod error;
mod schemas;

pub use dispatch::RulebookService;
