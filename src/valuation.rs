//! Portfolio valuation derived from holdings and current prices.

use rust_decimal::Decimal;

use crate::models::portfolio::Holding;
use crate::models::{PriceObservation, Symbol};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Valuation of one holding.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingValuation {
    pub symbol: Symbol,
    pub quantity: Decimal,
    pub invested: Decimal,
    /// `None` when no price is known for the symbol.
    pub current_price: Option<Decimal>,
    pub market_value: Decimal,
    pub pnl: Decimal,
    pub pnl_pct: Decimal,
    pub change_24h: Decimal,
}

/// Portfolio totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioMetrics {
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_pct: Decimal,
    pub positions: Vec<HoldingValuation>,
}

/// Values `holding` at `price`.
pub fn value_holding(holding: &Holding, price: Option<&PriceObservation>) -> HoldingValuation {
    let invested = holding.holdings * holding.avg_buy_price;
    let (current_price, market_value, change_24h) = match price {
        Some(observation) => (
            Some(observation.price),
            holding.holdings * observation.price,
            observation.change_24h,
        ),
        None => (None, Decimal::ZERO, Decimal::ZERO),
    };
    let pnl_pct = match current_price {
        Some(price) if !holding.avg_buy_price.is_zero() => {
            (price - holding.avg_buy_price) / holding.avg_buy_price * HUNDRED
        }
        _ => Decimal::ZERO,
    };

    HoldingValuation {
        symbol: holding.symbol.clone(),
        quantity: holding.holdings,
        invested,
        current_price,
        market_value,
        pnl: market_value - invested,
        pnl_pct,
        change_24h,
    }
}

/// Values every holding, looking prices up with `price_of`.
pub fn portfolio_metrics<'a, F>(holdings: &[Holding], mut price_of: F) -> PortfolioMetrics
where
    F: FnMut(&Symbol) -> Option<&'a PriceObservation>,
{
    let positions: Vec<_> = holdings
        .iter()
        .map(|holding| value_holding(holding, price_of(&holding.symbol)))
        .collect();

    let total_value: Decimal = positions.iter().map(|p| p.market_value).sum();
    let total_invested: Decimal = positions.iter().map(|p| p.invested).sum();
    let total_pnl = total_value - total_invested;
    let total_pnl_pct = if total_invested > Decimal::ZERO {
        total_pnl / total_invested * HUNDRED
    } else {
        Decimal::ZERO
    };

    PortfolioMetrics {
        total_value,
        total_invested,
        total_pnl,
        total_pnl_pct,
        positions,
    }
}
