use serde::{Deserialize, Serialize};

use crate::types::{Direction, Offset, OrderId, PriceType, TimeCondition, Volume};

/// Wire shape of an order request. An `aid` discriminator the caller may
/// send alongside is not modeled here: serde drops unrecognized fields
/// during deserialization, which is all the intake step needs.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OrderRequest {
    pub order_id: OrderId,
    pub user_id: String,
    pub exchange_id: String,
    pub instrument_id: String,
    pub direction: Direction,
    pub offset: Offset,
    pub price_type: PriceType,
    pub limit_price: Option<f64>,
    pub time_condition: TimeCondition,
    pub volume: Volume,
}

/// A live or terminal order. Present in the order book iff `status ==
/// Alive`; once `Finished` it is removed from the book and visible to the
/// caller only through the emitted event list.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    pub exchange_order_id: OrderId,
    pub user_id: String,
    pub exchange_id: String,
    pub instrument_id: String,
    pub direction: Direction,
    pub offset: Offset,
    pub price_type: PriceType,
    pub limit_price: Option<f64>,
    pub time_condition: TimeCondition,

    pub volume_orign: Volume,
    pub volume_left: Volume,
    pub frozen_margin: f64,
    pub frozen_premium: f64,
    pub last_msg: String,
    pub status: crate::types::OrderStatus,
    pub insert_date_time: i64,
}

impl Order {
    pub fn from_request(req: OrderRequest, insert_date_time: i64) -> Self {
        Self {
            order_id: req.order_id.clone(),
            exchange_order_id: req.order_id,
            user_id: req.user_id,
            exchange_id: req.exchange_id,
            instrument_id: req.instrument_id,
            direction: req.direction,
            offset: req.offset,
            price_type: req.price_type,
            limit_price: req.limit_price,
            time_condition: req.time_condition,
            volume_orign: req.volume,
            volume_left: req.volume,
            frozen_margin: 0.0,
            frozen_premium: 0.0,
            last_msg: "报单成功".to_string(),
            status: crate::types::OrderStatus::Alive,
            insert_date_time,
        }
    }

    pub fn reject(&mut self, reason: &str) {
        self.last_msg = reason.to_string();
        self.status = crate::types::OrderStatus::Finished;
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.status, crate::types::OrderStatus::Alive)
    }
}

/// An append-only fill record.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Trade {
    pub user_id: String,
    pub order_id: OrderId,
    pub trade_id: String,
    pub exchange_trade_id: String,
    pub exchange_id: String,
    pub instrument_id: String,
    pub direction: Direction,
    pub offset: Offset,
    pub price: f64,
    pub volume: Volume,
    pub trade_date_time: i64,
    pub commission: f64,
}

impl Trade {
    /// `trade_id` literally encodes `volume_left` at fill time. Since this
    /// engine never partial-fills, that is always `volume_orign`, but the
    /// formula is kept verbatim for compatibility with the upstream wire
    /// format.
    pub fn from_fill(order: &Order, price: f64, commission: f64, trade_date_time: i64) -> Self {
        let trade_id = format!("{}|{}", order.order_id, order.volume_left);
        Self {
            user_id: order.user_id.clone(),
            order_id: order.order_id.clone(),
            trade_id: trade_id.clone(),
            exchange_trade_id: trade_id,
            exchange_id: order.exchange_id.clone(),
            instrument_id: order.instrument_id.clone(),
            direction: order.direction,
            offset: order.offset,
            price,
            volume: order.volume_left,
            trade_date_time,
            commission,
        }
    }
}
