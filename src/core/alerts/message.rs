// Title/body text for each notification variant.

use serde::Serialize;

use super::model::NotificationDecision;

pub const WELCOME_TITLE: &str = "Price Tracker";
pub const WELCOME_BODY: &str =
    "Desktop notifications enabled! You'll be notified when prices drop.";

/// Rendered text of a notification, before it is tagged and shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub require_interaction: bool,
}

impl NotificationContent {
    pub fn plain(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            require_interaction: false,
        }
    }

    pub fn welcome() -> Self {
        Self::plain(WELCOME_TITLE, WELCOME_BODY)
    }

    /// Render a decision for the named product. `None` has nothing to render.
    pub fn for_decision(decision: &NotificationDecision, product_name: &str) -> Option<Self> {
        let (title, body) = match *decision {
            NotificationDecision::None => return None,
            NotificationDecision::TargetReached { current, target } => (
                format!("Target Price Reached: {product_name}"),
                format!("Price is now ₹{current:.2} (Your target: ₹{target:.2})"),
            ),
            NotificationDecision::PriceDrop {
                old,
                new,
                target,
                savings,
                percent,
                at_target,
            } => {
                let drop = format!(
                    "Price dropped! Was ₹{old:.2}, now ₹{new:.2} (Save ₹{savings:.2} - {percent:.1}%)"
                );
                if at_target {
                    (
                        format!("Target Reached: {product_name}"),
                        format!(
                            "{drop} Price reached your target! Current: ₹{new:.2} (Target: ₹{target:.2})"
                        ),
                    )
                } else {
                    (format!("Price Drop: {product_name}"), drop)
                }
            }
        };

        Some(Self {
            title,
            body,
            require_interaction: decision.requires_interaction(),
        })
    }
}
