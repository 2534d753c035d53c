//! Display collaborator interface.
//!
//! The engine hands the view layer the current cache contents and the
//! latest trigger events, plus user-facing notifications. What the view
//! does with them is its own business.

use tracing::{error, info, warn};

use crate::models::PriceObservation;
use crate::models::alert::TriggerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

/// Receives everything the engine wants shown.
pub trait DisplaySink: Send + Sync {
    /// Re-render with the current prices and the most recent triggers.
    fn render(&self, prices: &[PriceObservation], events: &[TriggerEvent]);

    fn notify(&self, notification: Notification);
}

/// Writes renders and notifications to the tracing log.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn render(&self, prices: &[PriceObservation], events: &[TriggerEvent]) {
        for observation in prices {
            info!(
                symbol = %observation.symbol,
                price = %observation.price,
                change_24h = %observation.change_24h,
                source = observation.source.as_str(),
                "price"
            );
        }
        if !events.is_empty() {
            info!(triggered = events.len(), "alerts triggered this cycle");
        }
    }

    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info | NotificationLevel::Success => {
                info!("{}", notification.message);
            }
            NotificationLevel::Warning => warn!("{}", notification.message),
            NotificationLevel::Error => error!("{}", notification.message),
        }
    }
}
