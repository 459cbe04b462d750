// Alert system module for price-change notifications.
//
// Architecture:
// - model.rs: Rule ids, rule configuration and the decision type
// - triggers.rs: Pure decision logic over (old, new, target) prices
// - engine.rs: Applies per-rule configuration to trigger results
// - message.rs: Notification title/body templates

pub mod engine;
pub mod message;
pub mod model;
pub mod triggers;
