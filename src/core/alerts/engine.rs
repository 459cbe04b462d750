// Alert engine - applies per-rule configuration on top of trigger evaluation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::model::{AlertRuleConfig, AlertRuleId, NotificationDecision};
use super::triggers::evaluate_observation;
use crate::core::model::PriceObservation;

/// Alert engine configuration - persisted in settings.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertEngineConfig {
    /// Per-rule configuration
    pub rules: HashMap<AlertRuleId, AlertRuleConfig>,
}

impl AlertEngineConfig {
    /// Create config with all rules enabled at default settings
    pub fn default_enabled() -> Self {
        let mut rules = HashMap::new();
        for rule_id in AlertRuleId::all() {
            rules.insert(*rule_id, AlertRuleConfig::default());
        }
        Self { rules }
    }

    /// Check if a specific rule is enabled
    pub fn is_enabled(&self, rule_id: AlertRuleId) -> bool {
        self.rules.get(&rule_id).map(|c| c.enabled).unwrap_or(false)
    }
}

/// Alert engine state
#[derive(Debug, Clone)]
pub struct AlertEngine {
    config: AlertEngineConfig,
}

impl AlertEngine {
    pub fn new(config: AlertEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlertEngineConfig {
        &self.config
    }

    /// Update the engine configuration (hot-reload friendly)
    pub fn update_config(&mut self, config: AlertEngineConfig) {
        self.config = config;
    }

    /// Evaluate one observation. A decision from a disabled rule is dropped
    /// rather than downgraded to the other variant.
    pub fn evaluate(&self, observation: &PriceObservation) -> NotificationDecision {
        let decision = evaluate_observation(observation);
        match decision.rule_id() {
            Some(rule_id) if !self.config.is_enabled(rule_id) => {
                log::debug!(
                    "{} alert suppressed: rule disabled",
                    rule_id.display_name()
                );
                NotificationDecision::None
            }
            _ => decision,
        }
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(AlertEngineConfig::default_enabled())
    }
}
