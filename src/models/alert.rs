//! Price alert records and the events they emit.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;
use crate::{PricewatchError, Result};

/// Which side of the target price fires the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Fires when the price reaches or exceeds the target.
    Above,
    /// Fires when the price reaches or falls below the target.
    Below,
}

impl Direction {
    /// Returns `true` if `price` satisfies this direction against `target`.
    pub fn is_crossed(&self, price: Decimal, target: Decimal) -> bool {
        match self {
            Direction::Above => price >= target,
            Direction::Below => price <= target,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Triggered,
}

/// A user-defined price threshold.
///
/// Moves from [`AlertStatus::Active`] to [`AlertStatus::Triggered`] at most
/// once and never back.
///
/// Also reads the older stored layout (`coin`, `type`, `isActive`,
/// `dateCreated`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredAlert")]
pub struct Alert {
    pub id: String,
    pub symbol: Symbol,
    pub direction: Direction,
    pub target_price: Decimal,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

/// Deserialized form of [`Alert`], accepting either status encoding.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAlert {
    id: String,
    #[serde(alias = "coin")]
    symbol: Symbol,
    #[serde(alias = "type")]
    direction: Direction,
    target_price: Decimal,
    #[serde(default)]
    status: Option<AlertStatus>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(alias = "dateCreated", default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl From<StoredAlert> for Alert {
    fn from(stored: StoredAlert) -> Self {
        let status = stored.status.unwrap_or(match stored.is_active {
            Some(false) => AlertStatus::Triggered,
            _ => AlertStatus::Active,
        });
        Self {
            id: stored.id,
            symbol: stored.symbol,
            direction: stored.direction,
            target_price: stored.target_price,
            status,
            created_at: stored.created_at,
        }
    }
}

impl Alert {
    /// Creates a new active alert with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`PricewatchError::InvalidInput`] if the symbol is blank or
    /// the target price is not positive.
    pub fn new(symbol: &str, direction: Direction, target_price: Decimal) -> Result<Self> {
        let symbol = Symbol::parse(symbol)
            .ok_or_else(|| PricewatchError::InvalidInput("alert symbol is empty".to_string()))?;
        if target_price <= Decimal::ZERO {
            return Err(PricewatchError::InvalidInput(format!(
                "alert target price must be positive, got {target_price}"
            )));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol,
            direction,
            target_price,
            status: AlertStatus::Active,
            created_at: Utc::now(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}

/// Emitted exactly once when an alert's condition is met.
///
/// History entries stored as triggered alert records (`id`, `coin`,
/// `type`, `triggeredAt`) deserialize too; a missing observed price reads
/// as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    #[serde(alias = "id")]
    pub alert_id: String,
    #[serde(alias = "coin")]
    pub symbol: Symbol,
    #[serde(alias = "type")]
    pub direction: Direction,
    pub target_price: Decimal,
    #[serde(alias = "triggerPrice", alias = "currentPrice", default)]
    pub observed_price: Decimal,
    #[serde(alias = "triggeredAt")]
    pub fired_at: DateTime<Utc>,
}

impl TriggerEvent {
    /// One-line human-readable description of the crossing.
    pub fn describe(&self) -> String {
        format!(
            "{} is {} {} (now {})",
            self.symbol.as_str().to_uppercase(),
            self.direction,
            self.target_price,
            self.observed_price
        )
    }
}
