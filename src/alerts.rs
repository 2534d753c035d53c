//! Standing price alerts and their one-shot evaluation.
//!
//! [`AlertEngine::evaluate`] fires every active alert whose condition holds
//! against the supplied prices, flips it to triggered, and moves it out of
//! the standing set into the append-only history. A triggered alert is
//! never looked at again.
//!
//! The engine needs `&mut self` to evaluate; callers sharing it across
//! tasks must wrap it in a mutex so a flip and its event stay atomic.

use chrono::Utc;
use tracing::info;

use crate::models::PriceMap;
use crate::models::alert::{Alert, AlertStatus, TriggerEvent};

#[derive(Debug, Default)]
pub struct AlertEngine {
    standing: Vec<Alert>,
    history: Vec<TriggerEvent>,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores persisted state. Alerts already marked triggered are left
    /// out of the standing set.
    pub fn restore(alerts: Vec<Alert>, history: Vec<TriggerEvent>) -> Self {
        Self {
            standing: alerts.into_iter().filter(Alert::is_active).collect(),
            history,
        }
    }

    /// Adds an alert to the end of the standing set. Triggered alerts are
    /// ignored.
    pub fn add(&mut self, alert: Alert) {
        if alert.is_active() {
            self.standing.push(alert);
        }
    }

    /// Removes a standing alert by id, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<Alert> {
        let index = self.standing.iter().position(|alert| alert.id == id)?;
        Some(self.standing.remove(index))
    }

    /// Standing alerts in insertion order.
    pub fn standing(&self) -> &[Alert] {
        &self.standing
    }

    /// Every trigger so far, oldest first.
    pub fn history(&self) -> &[TriggerEvent] {
        &self.history
    }

    /// Fires each active alert whose symbol is priced in `prices` and whose
    /// condition holds. Events come back in standing-set order.
    pub fn evaluate(&mut self, prices: &PriceMap) -> Vec<TriggerEvent> {
        let fired_at = Utc::now();
        let mut events = Vec::new();

        for alert in self.standing.iter_mut().filter(|alert| alert.is_active()) {
            let Some(observation) = prices.get(&alert.symbol) else {
                continue;
            };
            if !alert
                .direction
                .is_crossed(observation.price, alert.target_price)
            {
                continue;
            }

            alert.status = AlertStatus::Triggered;
            info!(
                alert = %alert.id,
                symbol = %alert.symbol,
                direction = alert.direction.as_str(),
                target = %alert.target_price,
                price = %observation.price,
                "price alert triggered"
            );
            events.push(TriggerEvent {
                alert_id: alert.id.clone(),
                symbol: alert.symbol.clone(),
                direction: alert.direction,
                target_price: alert.target_price,
                observed_price: observation.price,
                fired_at,
            });
        }

        self.standing.retain(Alert::is_active);
        self.history.extend(events.iter().cloned());
        events
    }
}
