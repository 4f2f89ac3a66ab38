use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jianzhi::engine::Engine;
use jianzhi::order::OrderRequest;
use jianzhi::quote::QuoteUpdate;
use jianzhi::types::{Direction, Offset, PriceType, TimeCondition};

fn quote_patch(last_price: f64, datetime: &str) -> HashMap<String, QuoteUpdate> {
    let mut map = HashMap::new();
    map.insert(
        "SHFE.cu2401".to_string(),
        QuoteUpdate {
            datetime: Some(datetime.to_string()),
            last_price: Some(last_price),
            ins_class: Some("FUTURE".to_string()),
            volume_multiple: Some(5.0),
            commission: Some(10.0),
            margin: Some(15000.0),
            ..Default::default()
        },
    );
    map
}

fn open_close_round_trip(engine: &mut Engine, n: i64) {
    let open = OrderRequest {
        order_id: format!("open-{n}"),
        user_id: "bench".to_string(),
        exchange_id: "SHFE".to_string(),
        instrument_id: "cu2401".to_string(),
        direction: Direction::Buy,
        offset: Offset::Open,
        price_type: PriceType::Limit,
        limit_price: Some(70000.0),
        time_condition: TimeCondition::Gfd,
        volume: 1,
    };
    engine.insert_order("SHFE.cu2401", open).unwrap();

    let close = OrderRequest {
        order_id: format!("close-{n}"),
        user_id: "bench".to_string(),
        exchange_id: "SHFE".to_string(),
        instrument_id: "cu2401".to_string(),
        direction: Direction::Sell,
        offset: Offset::CloseToday,
        price_type: PriceType::Limit,
        limit_price: Some(70000.0),
        time_condition: TimeCondition::Gfd,
        volume: 1,
    };
    engine.insert_order("SHFE.cu2401", close).unwrap();
}

fn bench_open_close_round_trip(c: &mut Criterion) {
    let mut engine = Engine::new("bench-account");
    engine.update_quotes("SHFE.cu2401", quote_patch(70000.0, "2024-01-02 09:00:00.000000"));

    let mut n = 0i64;
    c.bench_function("insert_order open+close round trip", |b| {
        b.iter(|| {
            n += 1;
            open_close_round_trip(black_box(&mut engine), n);
        })
    });
}

fn bench_quote_tick_revaluation(c: &mut Criterion) {
    let mut engine = Engine::new("bench-account");
    engine.update_quotes("SHFE.cu2401", quote_patch(70000.0, "2024-01-02 09:00:00.000000"));
    engine
        .insert_order(
            "SHFE.cu2401",
            OrderRequest {
                order_id: "seed".to_string(),
                user_id: "bench".to_string(),
                exchange_id: "SHFE".to_string(),
                instrument_id: "cu2401".to_string(),
                direction: Direction::Buy,
                offset: Offset::Open,
                price_type: PriceType::Limit,
                limit_price: Some(70000.0),
                time_condition: TimeCondition::Gfd,
                volume: 5,
            },
        )
        .unwrap();

    let mut price = 70000.0;
    let mut tick = 0u32;
    c.bench_function("update_quotes tick revaluation", |b| {
        b.iter(|| {
            tick += 1;
            price += 1.0;
            let datetime = format!("2024-01-02 09:00:{:02}.000000", tick % 60);
            engine.update_quotes(black_box("SHFE.cu2401"), quote_patch(price, &datetime));
        })
    });
}

criterion_group!(benches, bench_open_close_round_trip, bench_quote_tick_revaluation);
criterion_main!(benches);
