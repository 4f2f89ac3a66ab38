use serde::Serialize;
use serde_json::json;

use crate::account::Account;
use crate::order::{Order, Trade};
use crate::position::Position;

/// One mutated entity, captured as a full copy at the moment of emission so
/// later mutation of the live state cannot leak into an already-returned
/// diff.
#[derive(Clone, Debug)]
pub enum Diff {
    Account(Account),
    Position(Position),
    Order(Order),
    Trade(Trade),
}

impl Diff {
    /// Wraps this diff into the wire envelope
    /// `{"trade": {<account_key>: {<bucket>: {<key>: <copy>}}}}`.
    pub fn to_envelope(&self, account_key: &str) -> serde_json::Value {
        let (bucket, key, body) = match self {
            Diff::Account(account) => ("accounts", account.currency.clone(), to_value(account)),
            Diff::Position(position) => (
                "positions",
                format!("{}.{}", position.exchange_id, position.instrument_id),
                to_value(position),
            ),
            Diff::Order(order) => ("orders", order.order_id.clone(), to_value(order)),
            Diff::Trade(trade) => ("trades", trade.trade_id.clone(), to_value(trade)),
        };
        json!({
            "trade": {
                account_key: {
                    bucket: {
                        key: body
                    }
                }
            }
        })
    }
}

fn to_value<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).expect("diff payloads are always representable as JSON")
}
