// Alert model types for configuration and decisions.
//
// NOTE: the desktop shell serializes these to the UI as JSON.
// Keep field names stable when modifying data structures.

use serde::{Deserialize, Serialize};

/// Unique identifier for the price alert rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertRuleId {
    /// Price went down since the previous check
    PriceDrop,
    /// Price crossed from above the target to at or below it
    TargetReached,
}

impl AlertRuleId {
    /// Get the display name for this alert
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PriceDrop => "Price Drop",
            Self::TargetReached => "Target Reached",
        }
    }

    /// Get a description of what this alert does
    pub fn description(&self) -> &'static str {
        match self {
            Self::PriceDrop => "Alert when a checked price is lower than the previous one",
            Self::TargetReached => "Alert when a price falls to or below your target for the first time",
        }
    }

    /// Get all available alert rule IDs
    pub fn all() -> &'static [AlertRuleId] {
        &[Self::PriceDrop, Self::TargetReached]
    }
}

/// Per-rule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    pub enabled: bool,
}

impl Default for AlertRuleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Outcome of comparing the prices around one check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum NotificationDecision {
    None,
    PriceDrop {
        old: f64,
        new: f64,
        target: f64,
        /// Full precision; rounded only for display
        savings: f64,
        /// Rounded to one decimal place
        percent: f64,
        at_target: bool,
    },
    TargetReached {
        current: f64,
        target: f64,
    },
}

impl NotificationDecision {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Rule that produced this decision, if any
    pub fn rule_id(&self) -> Option<AlertRuleId> {
        match self {
            Self::None => None,
            Self::PriceDrop { .. } => Some(AlertRuleId::PriceDrop),
            Self::TargetReached { .. } => Some(AlertRuleId::TargetReached),
        }
    }

    /// Whether the notification should stay on screen until dismissed
    pub fn requires_interaction(&self) -> bool {
        match self {
            Self::None => false,
            Self::PriceDrop { at_target, .. } => *at_target,
            Self::TargetReached { .. } => true,
        }
    }
}
