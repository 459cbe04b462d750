// Trigger evaluation logic for price alerts.
//
// Pure functions over the prices seen before and after a check. A price of
// zero means the backend has not scraped the product yet and is never compared.

use super::model::NotificationDecision;
use crate::core::model::PriceObservation;

/// Decide which notification, if any, an observation warrants.
///
/// Rules are evaluated in order and at most one decision is produced:
/// 1. unknown or non-positive prices never fire
/// 2. crossing from above the target to at/below it fires `TargetReached`
/// 3. any other decrease fires `PriceDrop`
pub fn decide(old: Option<f64>, new: f64, target: f64) -> NotificationDecision {
    let old = match old {
        Some(old) if old > 0.0 && new > 0.0 => old,
        _ => return NotificationDecision::None,
    };

    if new <= target && old > target {
        return NotificationDecision::TargetReached { current: new, target };
    }

    if new < old {
        let savings = old - new;
        return NotificationDecision::PriceDrop {
            old,
            new,
            target,
            savings,
            percent: round1(savings / old * 100.0),
            at_target: new <= target,
        };
    }

    NotificationDecision::None
}

/// Evaluate a full observation.
pub fn evaluate_observation(observation: &PriceObservation) -> NotificationDecision {
    decide(
        observation.old_price,
        observation.new_price,
        observation.target_price,
    )
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
