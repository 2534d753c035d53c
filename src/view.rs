//! View states of the tracker UI and the data each one needs refreshed.

use std::fmt;

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Portfolio,
    Trades,
    Watchlist,
    Alerts,
}

/// A piece of derived display state to recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshAction {
    Metrics,
    Charts,
    HoldingsTable,
    TradesTable,
    WatchlistCards,
    AlertLists,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Dashboard,
        View::Portfolio,
        View::Trades,
        View::Watchlist,
        View::Alerts,
    ];

    /// Tab identifier used by the view layer.
    pub fn id(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Portfolio => "portfolio",
            View::Trades => "trades",
            View::Watchlist => "watchlist",
            View::Alerts => "alerts",
        }
    }

    /// Parses a tab identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.id() == id)
    }

    /// What to recompute when this view becomes active.
    pub fn refresh_actions(&self) -> &'static [RefreshAction] {
        match self {
            View::Dashboard => &[RefreshAction::Metrics, RefreshAction::Charts],
            View::Portfolio => &[RefreshAction::HoldingsTable],
            View::Trades => &[RefreshAction::TradesTable],
            View::Watchlist => &[RefreshAction::WatchlistCards],
            View::Alerts => &[RefreshAction::AlertLists],
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
