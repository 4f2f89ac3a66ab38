use std::collections::HashMap;
use std::sync::Once;

use jianzhi::engine::Engine;
use jianzhi::order::OrderRequest;
use jianzhi::quote::QuoteUpdate;
use jianzhi::types::{Direction, Offset, PriceType, TimeCondition};
use jianzhi::ContractViolation;

static LOG_INIT: Once = Once::new();

fn init_logging() {
    LOG_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn future_patch(last_price: f64, datetime: &str) -> QuoteUpdate {
    QuoteUpdate {
        datetime: Some(datetime.to_string()),
        last_price: Some(last_price),
        ins_class: Some("FUTURE".to_string()),
        volume_multiple: Some(5.0),
        commission: Some(10.0),
        margin: Some(15000.0),
        ..Default::default()
    }
}

fn request(order_id: &str, direction: Direction, offset: Offset, volume: i64, limit_price: f64) -> OrderRequest {
    OrderRequest {
        order_id: order_id.to_string(),
        user_id: "u1".to_string(),
        exchange_id: "SHFE".to_string(),
        instrument_id: "cu2401".to_string(),
        direction,
        offset,
        price_type: PriceType::Limit,
        limit_price: Some(limit_price),
        time_condition: TimeCondition::Gfd,
        volume,
    }
}

fn quotes(symbol: &str, patch: QuoteUpdate) -> HashMap<String, QuoteUpdate> {
    let mut map = HashMap::new();
    map.insert(symbol.to_string(), patch);
    map
}

#[test]
fn futures_open_hold_and_mark() {
    init_logging();
    let mut engine = Engine::new("user1");
    engine.update_quotes(
        "SHFE.cu2401",
        quotes("SHFE.cu2401", future_patch(70000.0, "2024-01-02 09:00:00.000000")),
    );

    let (_, events) = engine
        .insert_order("SHFE.cu2401", request("o1", Direction::Buy, Offset::Open, 2, 70000.0))
        .unwrap();
    assert_eq!(events.last().unwrap().last_msg, "全部成交");

    let position = engine.position("SHFE.cu2401").unwrap();
    assert_eq!(position.volume_long, 2);
    assert_eq!(position.volume_long_today, 2);
    assert_eq!(position.open_price_long, 70000.0);

    let account = engine.account();
    assert_eq!(account.margin, 30000.0);
    assert_eq!(account.commission, 20.0);
    assert_eq!(account.available, 1e7 - 20.0 - 30000.0);

    engine.update_quotes(
        "SHFE.cu2401",
        quotes("SHFE.cu2401", future_patch(70100.0, "2024-01-02 09:00:01.000000")),
    );

    let account = engine.account();
    assert_eq!(account.float_profit, 1000.0);
    assert_eq!(account.position_profit, 1000.0);
    assert_eq!(account.balance, 1e7 - 20.0 + 1000.0);
    assert_eq!(account.risk_ratio, 30000.0 / account.balance);
}

#[test]
fn shfe_close_today_rejects_against_a_historical_long() {
    init_logging();
    let mut engine = Engine::new("user1");
    engine.update_quotes(
        "SHFE.cu2401",
        quotes("SHFE.cu2401", future_patch(70000.0, "2024-01-02 09:00:00.000000")),
    );
    engine
        .insert_order("SHFE.cu2401", request("o1", Direction::Buy, Offset::Open, 2, 70000.0))
        .unwrap();

    let margin_before = engine.account().margin;

    let (_, events) = engine
        .insert_order("SHFE.cu2401", request("o2", Direction::Sell, Offset::Close, 2, 70000.0))
        .unwrap();
    assert_eq!(events.last().unwrap().last_msg, "平昨仓手数不足");
    assert_eq!(engine.account().margin, margin_before);
    assert_eq!(engine.position("SHFE.cu2401").unwrap().volume_long, 2);
}

#[test]
fn options_short_open_credits_premium_and_marks_negative_market_value() {
    init_logging();
    let mut engine = Engine::new("user1");
    let symbol = "SSE.510050C2401M03000";
    let underlying = "SSE.510050";

    engine.update_quotes(
        underlying,
        quotes(underlying, future_patch(3.0, "2024-01-02 09:00:00.000000")),
    );
    engine.update_quotes(
        symbol,
        quotes(
            symbol,
            QuoteUpdate {
                datetime: Some("2024-01-02 09:00:00.000000".to_string()),
                last_price: Some(0.05),
                ins_class: Some("ETF_OPTION".to_string()),
                volume_multiple: Some(10000.0),
                underlying_symbol: Some(underlying.to_string()),
                strike_price: Some(3.0),
                ..Default::default()
            },
        ),
    );

    let mut req = request("o1", Direction::Sell, Offset::Open, 1, 0.05);
    req.exchange_id = "SSE".to_string();
    req.instrument_id = "510050C2401M03000".to_string();
    let (_, events) = engine.insert_order(symbol, req).unwrap();
    assert_eq!(events.last().unwrap().last_msg, "全部成交");

    let position = engine.position(symbol).unwrap();
    assert_eq!(position.market_value_short, -500.0);
    assert_eq!(position.position_profit, 0.0);
    assert_eq!(engine.account().premium, 500.0);
    assert!(position.margin_short > 0.0);
    assert_eq!(engine.account().margin, position.margin_short);
}

#[test]
fn cancel_unwinds_a_frozen_open_reservation() {
    init_logging();
    let mut engine = Engine::new("user1");
    engine.update_quotes(
        "SHFE.cu2401",
        quotes("SHFE.cu2401", future_patch(70000.0, "2024-01-02 09:00:00.000000")),
    );

    engine
        .insert_order("SHFE.cu2401", request("o1", Direction::Buy, Offset::Open, 2, 1.0))
        .unwrap();
    assert_eq!(engine.account().available, 1e7 - 30000.0);

    engine.cancel_order("SHFE.cu2401", "o1");
    assert_eq!(engine.account().available, 1e7);
    assert_eq!(engine.account().frozen_margin, 0.0);
}

#[test]
fn settlement_rolls_todays_volume_into_historical() {
    init_logging();
    let mut engine = Engine::new("user1");
    engine.update_quotes(
        "SHFE.cu2401",
        quotes("SHFE.cu2401", future_patch(70100.0, "2024-01-02 09:00:00.000000")),
    );
    engine
        .insert_order("SHFE.cu2401", request("o1", Direction::Buy, Offset::Open, 3, 70100.0))
        .unwrap();

    let (_, _, trade_log) = engine.settle();
    assert_eq!(trade_log.len(), 1);

    let position = engine.position("SHFE.cu2401").unwrap();
    assert_eq!(position.volume_long_his, 3);
    assert_eq!(position.volume_long_today, 0);
    assert_eq!(position.position_price_long, position.last_price);
    assert_eq!(position.position_profit, 0.0);

    let account = engine.account();
    assert_eq!(account.pre_balance, account.balance - account.market_value);
    assert_eq!(account.close_profit, 0.0);
    assert_eq!(account.commission, 0.0);
    assert_eq!(account.premium, 0.0);
    assert_eq!(account.frozen_margin, 0.0);
    assert_eq!(account.frozen_premium, 0.0);
    assert_eq!(account.risk_ratio, account.margin / account.balance);
}

#[test]
fn a_resting_limit_order_fills_on_a_later_quote_update() {
    init_logging();
    let mut engine = Engine::new("user1");
    engine.update_quotes(
        "SHFE.cu2401",
        quotes(
            "SHFE.cu2401",
            QuoteUpdate {
                ask_price1: Some(70000.0),
                bid_price1: Some(69990.0),
                ..future_patch(69995.0, "2024-01-02 09:00:00.000000")
            },
        ),
    );

    let (_, events) = engine
        .insert_order("SHFE.cu2401", request("o1", Direction::Buy, Offset::Open, 1, 69900.0))
        .unwrap();
    assert!(events.iter().all(|o| o.last_msg != "全部成交"));

    let (_, events) = engine.update_quotes(
        "SHFE.cu2401",
        quotes(
            "SHFE.cu2401",
            QuoteUpdate {
                ask_price1: Some(69800.0),
                bid_price1: Some(69790.0),
                ..future_patch(69800.0, "2024-01-02 09:00:01.000000")
            },
        ),
    );
    assert!(events.iter().any(|o| o.last_msg == "全部成交"));
    assert_eq!(engine.position("SHFE.cu2401").unwrap().open_price_long, 69900.0);
}

#[test]
fn insert_order_without_a_prior_quote_is_a_contract_violation() {
    init_logging();
    let mut engine = Engine::new("user1");
    let result = engine.insert_order("SHFE.cu2401", request("o1", Direction::Buy, Offset::Open, 1, 70000.0));
    assert!(matches!(result, Err(ContractViolation::MissingQuote { .. })));
}
