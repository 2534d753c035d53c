use rust_decimal_macros::dec;

use pricewatch::models::Symbol;
use pricewatch::models::alert::{Alert, AlertStatus, Direction, TriggerEvent};
use pricewatch::models::portfolio::{Holding, Trade, TradeSide, WatchlistItem};

#[test]
fn deserialize_stored_holdings() {
    let json = r#"[
        { "id": "1", "symbol": "bitcoin", "holdings": 0.5, "avgBuyPrice": 40000 },
        { "id": "2", "symbol": "Ethereum", "holdings": "3.25", "avgBuyPrice": "2450.10",
          "dateAdded": "2024-01-15T10:30:00Z" }
    ]"#;

    let holdings: Vec<Holding> = serde_json::from_str(json).unwrap();

    assert_eq!(holdings.len(), 2);
    assert_eq!(holdings[0].holdings, dec!(0.5));
    assert!(holdings[0].date_added.is_none());
    assert_eq!(holdings[1].symbol, Symbol::new("ethereum"));
    assert_eq!(holdings[1].avg_buy_price, dec!(2450.10));
    assert!(holdings[1].date_added.is_some());
}

#[test]
fn deserialize_trade_with_legacy_field_names() {
    let json = r#"{
        "id": "t1",
        "coin": "solana",
        "type": "sell",
        "amount": 12,
        "price": 98.45,
        "date": "2024-02-01"
    }"#;

    let trade: Trade = serde_json::from_str(json).unwrap();

    assert_eq!(trade.symbol, Symbol::new("solana"));
    assert_eq!(trade.side, TradeSide::Sell);
    assert_eq!(trade.amount, dec!(12));
    assert_eq!(trade.price, dec!(98.45));
    assert_eq!(trade.date.as_deref(), Some("2024-02-01"));
}

#[test]
fn deserialize_watchlist_item() {
    let item: WatchlistItem = serde_json::from_str(r#"{ "id": "w1", "symbol": "CARDANO" }"#).unwrap();
    assert_eq!(item.symbol.as_str(), "cardano");
}

#[test]
fn alert_survives_storage() {
    let alert = Alert::new("Bitcoin", Direction::Above, dec!(40000)).unwrap();

    let json = serde_json::to_string(&alert).unwrap();
    assert!(json.contains(r#""direction":"above""#));
    assert!(json.contains(r#""status":"active""#));

    let restored: Alert = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, alert);
    assert_eq!(restored.status, AlertStatus::Active);
}

#[test]
fn trigger_event_describes_the_crossing() {
    let json = r#"{
        "alertId": "a1",
        "symbol": "ethereum",
        "direction": "below",
        "targetPrice": "2500",
        "observedPrice": "2489.10",
        "firedAt": "2024-03-01T12:00:00Z"
    }"#;

    let event: TriggerEvent = serde_json::from_str(json).unwrap();

    assert_eq!(event.describe(), "ETHEREUM is below 2500 (now 2489.10)");
}

#[test]
fn deserialize_alerts_in_legacy_layout() {
    let json = r#"[
        { "id": "lq3x", "coin": "bitcoin", "type": "above", "targetPrice": 40000,
          "isActive": true, "dateCreated": "2024-01-15T10:30:00.000Z" }
    ]"#;

    let alerts: Vec<Alert> = serde_json::from_str(json).unwrap();

    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.id, "lq3x");
    assert_eq!(alert.symbol, Symbol::new("bitcoin"));
    assert_eq!(alert.direction, Direction::Above);
    assert_eq!(alert.target_price, dec!(40000));
    assert_eq!(alert.status, AlertStatus::Active);
    assert_eq!(alert.created_at.to_rfc3339(), "2024-01-15T10:30:00+00:00");
}

#[test]
fn deserialize_triggered_history_in_legacy_layout() {
    let json = r#"[
        { "id": "lq3x", "coin": "bitcoin", "type": "above", "targetPrice": 40000,
          "isActive": false, "dateCreated": "2024-01-15T10:30:00.000Z",
          "triggeredAt": "2024-01-16T08:00:00.000Z" }
    ]"#;

    let history: Vec<TriggerEvent> = serde_json::from_str(json).unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].alert_id, "lq3x");
    assert_eq!(history[0].direction, Direction::Above);
    assert_eq!(history[0].observed_price, dec!(0));
}
