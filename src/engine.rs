use std::collections::HashMap;

use chrono::NaiveDateTime;
use log::{debug, info, warn};

use crate::account::Account;
use crate::diff::Diff;
use crate::error::ContractViolation;
use crate::margin;
use crate::order::{Order, OrderRequest, Trade};
use crate::position::{self, Position, Trigger};
use crate::quote::{QuoteCache, QuoteRecord, QuoteUpdate};
use crate::types::{position_key, Direction, Offset, OrderId, OrderStatus, PriceType, TimeCondition};

/// Supplies the nanosecond trade timestamp used to stamp new orders and
/// fills. Implemented for any `FnMut() -> i64`.
pub trait TradeTimestamp {
    fn trade_timestamp(&mut self) -> i64;
}

impl<F: FnMut() -> i64> TradeTimestamp for F {
    fn trade_timestamp(&mut self) -> i64 {
        self()
    }
}

/// Whether a quote falls inside the configured trading calendar.
/// Implemented for any `Fn(&QuoteRecord) -> bool`.
pub trait IsInTradingTime {
    fn is_in_trading_time(&self, quote: &QuoteRecord) -> bool;
}

impl<F: Fn(&QuoteRecord) -> bool> IsInTradingTime for F {
    fn is_in_trading_time(&self, quote: &QuoteRecord) -> bool {
        self(quote)
    }
}

pub struct EngineConfig {
    pub account_key: String,
    pub init_balance: f64,
    pub trade_timestamp: Option<Box<dyn TradeTimestamp>>,
    pub is_in_trading_time: Option<Box<dyn IsInTradingTime>>,
}

impl EngineConfig {
    pub fn new(account_key: impl Into<String>) -> Self {
        Self {
            account_key: account_key.into(),
            init_balance: 1e7,
            trade_timestamp: None,
            is_in_trading_time: None,
        }
    }
}

/// The matching and accounting engine for one account. Owns the quote
/// cache, order book, position ledger and balance sheet, and is driven
/// synchronously by its four public operations.
pub struct Engine {
    account_key: String,
    account: Account,
    positions: HashMap<String, Position>,
    orders: HashMap<String, HashMap<OrderId, Order>>,
    trades: Vec<Trade>,
    quotes: QuoteCache,
    diffs: Vec<Diff>,
    order_events: Vec<Order>,
    trade_timestamp_hook: Option<Box<dyn TradeTimestamp>>,
    is_in_trading_time_hook: Option<Box<dyn IsInTradingTime>>,
}

impl Engine {
    pub fn new(account_key: impl Into<String>) -> Self {
        Self::with_config(EngineConfig::new(account_key))
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            account_key: config.account_key,
            account: Account::new(config.init_balance),
            positions: HashMap::new(),
            orders: HashMap::new(),
            trades: Vec::new(),
            quotes: QuoteCache::new(),
            diffs: Vec::new(),
            order_events: Vec::new(),
            trade_timestamp_hook: config.trade_timestamp,
            is_in_trading_time_hook: config.is_in_trading_time,
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn order(&self, symbol: &str, order_id: &str) -> Option<&Order> {
        self.orders.get(symbol).and_then(|book| book.get(order_id))
    }

    pub fn init_snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "trade": {
                self.account_key.clone(): {
                    "accounts": { "CNY": serde_json::to_value(&self.account).unwrap() },
                    "positions": {},
                    "orders": {},
                    "trades": {}
                }
            }
        })
    }

    /// Resolve `(symbol, req)` into a live order, validate it, and attempt
    /// an immediate fill. Fails hard only on a missing quote: every domain
    /// rejection is instead recorded on the returned order.
    pub fn insert_order(
        &mut self,
        symbol: &str,
        req: OrderRequest,
    ) -> Result<(Vec<Diff>, Vec<Order>), ContractViolation> {
        let (quote, underlying) = self.resolve_quotes(symbol)?;

        let order_id = req.order_id.clone();
        let timestamp = self.trade_timestamp();
        let mut order = Order::from_request(req, timestamp);
        info!("insert_order {symbol} {order_id} {:?} {:?}", order.direction, order.offset);
        self.order_events.push(order.clone());
        self.diffs.push(Diff::Order(order.clone()));

        self.validate_order(&mut order, &quote, underlying.as_ref());

        if !order.is_alive() {
            self.diffs.push(Diff::Order(order.clone()));
        }

        self.orders.entry(symbol.to_string()).or_default().insert(order_id.clone(), order);

        if self.order(symbol, &order_id).map(Order::is_alive).unwrap_or(false) {
            self.match_order(symbol, &order_id);
        }

        self.finalize_if_finished(symbol, &order_id);

        Ok(self.take_results())
    }

    /// Cancel a live order. Unknown or already-finished orders are a silent
    /// no-op, matching the upstream contract.
    pub fn cancel_order(&mut self, symbol: &str, order_id: &str) -> (Vec<Diff>, Vec<Order>) {
        if self.order(symbol, order_id).map(Order::is_alive).unwrap_or(false) {
            info!("cancel_order {symbol} {order_id}");
            self.unwind_order(symbol, order_id, "已撤单");
            self.finalize_if_finished(symbol, order_id);
        } else {
            debug!("cancel_order {symbol} {order_id} ignored: not alive");
        }
        self.take_results()
    }

    /// Merge a batch of per-symbol quote patches, re-match every live order
    /// on the affected symbol, then revalue the position against the new
    /// mark.
    pub fn update_quotes(
        &mut self,
        symbol: &str,
        updates: HashMap<String, QuoteUpdate>,
    ) -> (Vec<Diff>, Vec<Order>) {
        for (patch_symbol, patch) in updates {
            self.quotes.apply(&patch_symbol, patch);
        }

        let quote = match self.quotes.get(symbol) {
            Some(q) => q.clone(),
            None => return self.take_results(),
        };
        if quote.last_price.is_nan() {
            return self.take_results();
        }
        let underlying = quote
            .underlying_symbol
            .as_ref()
            .and_then(|sym| self.quotes.get(sym))
            .cloned();

        let order_ids: Vec<OrderId> = self
            .orders
            .get(symbol)
            .map(|book| book.keys().cloned().collect())
            .unwrap_or_default();
        for order_id in order_ids {
            if self.order(symbol, &order_id).map(Order::is_alive).unwrap_or(false) {
                self.match_order(symbol, &order_id);
                self.finalize_if_finished(symbol, &order_id);
            }
        }

        self.revalue_position(symbol, &quote, underlying.as_ref());

        self.take_results()
    }

    /// End-of-day roll: snapshot, cancel every live order, fold positions
    /// and the account into the next trading day's opening state.
    pub fn settle(&mut self) -> (Vec<Diff>, Vec<Order>, Vec<Trade>) {
        info!("settle");
        let trade_log = std::mem::take(&mut self.trades);

        let symbols: Vec<String> = self.orders.keys().cloned().collect();
        for symbol in symbols {
            let order_ids: Vec<OrderId> = self
                .orders
                .get(&symbol)
                .map(|book| book.keys().cloned().collect())
                .unwrap_or_default();
            for order_id in order_ids {
                if let Some(book) = self.orders.get_mut(&symbol) {
                    if let Some(order) = book.get_mut(&order_id) {
                        order.frozen_margin = 0.0;
                        order.frozen_premium = 0.0;
                        order.last_msg = "交易日结束，自动撤销当日有效的委托单（GFD）".to_string();
                        order.status = OrderStatus::Finished;
                        let order_copy = order.clone();
                        self.order_events.push(order_copy.clone());
                        self.diffs.push(Diff::Order(order_copy));
                    }
                }
            }
            self.orders.insert(symbol, HashMap::new());
        }

        self.account.settle();
        self.diffs.push(Diff::Account(self.account.clone()));

        let keys: Vec<String> = self.positions.keys().cloned().collect();
        for key in keys {
            let position = self.positions.get_mut(&key).unwrap();
            let multiple = self
                .quotes
                .get(&position_key(&position.exchange_id, &position.instrument_id))
                .map(|q| q.volume_multiple)
                .unwrap_or(1.0);

            position.volume_long_frozen_today = 0;
            position.volume_long_frozen_his = 0;
            position.volume_short_frozen_today = 0;
            position.volume_short_frozen_his = 0;
            position.volume_long_today = 0;
            position.volume_long_his = position.volume_long;
            position.volume_short_today = 0;
            position.volume_short_his = position.volume_short;
            position.volume_long_frozen = 0;
            position.volume_short_frozen = 0;
            position.position_price_long = position.last_price;
            position.position_price_short = position.last_price;
            // `last_price` may still be NaN for a symbol that was opened
            // but never quoted; the resulting NaN cost is intentional.
            position.position_cost_long = position.last_price * position.volume_long as f64 * multiple;
            position.position_cost_short = position.last_price * position.volume_short as f64 * multiple;
            position.position_profit_long = 0.0;
            position.position_profit_short = 0.0;
            position.position_profit = 0.0;
            self.diffs.push(Diff::Position(position.clone()));
        }

        let (diffs, order_events) = self.take_results();
        (diffs, order_events, trade_log)
    }

    fn resolve_quotes(
        &self,
        symbol: &str,
    ) -> Result<(QuoteRecord, Option<QuoteRecord>), ContractViolation> {
        let (quote, underlying) =
            self.quotes
                .resolve(symbol)
                .ok_or_else(|| ContractViolation::MissingQuote { symbol: symbol.to_string() })?;
        if quote.is_option() && underlying.is_none() {
            return Err(ContractViolation::MissingUnderlyingQuote { symbol: symbol.to_string() });
        }
        Ok((quote.clone(), underlying.cloned()))
    }

    fn trade_timestamp(&mut self) -> i64 {
        match self.trade_timestamp_hook.as_mut() {
            Some(hook) => hook.trade_timestamp(),
            None => default_trade_timestamp(self.quotes.max_datetime()),
        }
    }

    fn is_in_trading_time(&self, quote: &QuoteRecord) -> bool {
        match self.is_in_trading_time_hook.as_ref() {
            Some(hook) => hook.is_in_trading_time(quote),
            // No trading calendar configured: permissive default, matching
            // this engine's stance that calendar rules are an external
            // collaborator left for the caller to inject.
            None => true,
        }
    }

    fn ensure_position(
        &mut self,
        exchange_id: &str,
        instrument_id: &str,
        future_margin: f64,
        last_price: f64,
        underlying_last_price: f64,
    ) -> &mut Position {
        let key = position_key(exchange_id, instrument_id);
        let position = self
            .positions
            .entry(key)
            .or_insert_with(|| Position::new(exchange_id, instrument_id));
        if position.is_unmarked() {
            position.future_margin = future_margin;
            position.last_price = last_price;
            position.underlying_last_price = underlying_last_price;
        }
        position
    }

    fn validate_order(
        &mut self,
        order: &mut Order,
        quote: &QuoteRecord,
        underlying: Option<&QuoteRecord>,
    ) {
        let exchange_id = order.exchange_id.clone();
        let instrument_id = order.instrument_id.clone();
        let future_margin = margin::future_margin(quote);
        let underlying_last_price = underlying.map(|u| u.last_price).unwrap_or(f64::NAN);
        self.ensure_position(&exchange_id, &instrument_id, future_margin, quote.last_price, underlying_last_price);

        if !quote.is_option() && !quote.has_future_fields() {
            order.reject("不支持的合约类型，TqSim 目前不支持组合，股票，etf期权模拟交易");
        }

        if order.is_alive() && !self.is_in_trading_time(quote) {
            order.reject("下单失败, 不在可交易时间段内");
        }

        if order.is_alive() && order.offset.is_close() {
            let key = position_key(&exchange_id, &instrument_id);
            let position = self.positions.get_mut(&key).expect("position ensured above");

            let insufficient = if crate::types::splits_today_his(&exchange_id) {
                match (order.offset, order.direction) {
                    (Offset::CloseToday, Direction::Buy) => {
                        position.volume_short_today - position.volume_short_frozen_today < order.volume_orign
                    }
                    (Offset::CloseToday, Direction::Sell) => {
                        position.volume_long_today - position.volume_long_frozen_today < order.volume_orign
                    }
                    (Offset::Close, Direction::Buy) => {
                        position.volume_short_his - position.volume_short_frozen_his < order.volume_orign
                    }
                    (Offset::Close, Direction::Sell) => {
                        position.volume_long_his - position.volume_long_frozen_his < order.volume_orign
                    }
                    (Offset::Open, _) => unreachable!("guarded by is_close"),
                }
            } else {
                match order.direction {
                    Direction::Buy => position.volume_short - position.volume_short_frozen < order.volume_orign,
                    Direction::Sell => position.volume_long - position.volume_long_frozen < order.volume_orign,
                }
            };

            if insufficient {
                let reason = if crate::types::splits_today_his(&exchange_id) {
                    if matches!(order.offset, Offset::CloseToday) {
                        "平今仓手数不足"
                    } else {
                        "平昨仓手数不足"
                    }
                } else {
                    "平仓手数不足"
                };
                order.reject(reason);
            }
        }

        if order.is_alive() && matches!(order.offset, Offset::Open) {
            if quote.is_option() {
                if matches!(order.direction, Direction::Sell) {
                    let underlying_mark = underlying.map(|u| u.last_price).unwrap_or(f64::NAN);
                    order.frozen_margin = order.volume_orign as f64
                        * margin::option_margin(quote, quote.last_price, underlying_mark);
                } else {
                    let price = if matches!(order.price_type, PriceType::Any) {
                        quote.last_price
                    } else {
                        order.limit_price.unwrap_or(f64::NAN)
                    };
                    order.frozen_premium = order.volume_orign as f64 * quote.volume_multiple * price;
                }
            } else {
                order.frozen_margin = order.volume_orign as f64 * margin::future_margin(quote);
            }

            if order.frozen_margin + order.frozen_premium > self.account.available {
                order.frozen_margin = 0.0;
                order.frozen_premium = 0.0;
                order.reject("开仓资金不足");
            }
        }

        if order.is_alive() && matches!(order.offset, Offset::Open) {
            self.account.apply_order_delta(order.frozen_margin, order.frozen_premium);
            self.diffs.push(Diff::Account(self.account.clone()));
        }

        if order.is_alive() && order.offset.is_close() {
            let key = position_key(&exchange_id, &instrument_id);
            let position = self.positions.get_mut(&key).expect("position ensured above");
            position::freeze_close(position, &exchange_id, order.direction, order.offset, order.volume_orign);
            let snapshot = position.clone();
            self.diffs.push(Diff::Position(snapshot));
        }

    }

    fn match_order(&mut self, symbol: &str, order_id: &str) {
        let (quote, underlying) = match self.quotes.resolve(symbol) {
            Some((q, u)) => (q.clone(), u.cloned()),
            None => return,
        };

        let (price_type, limit_price, direction, time_condition) = {
            let order = self.orders.get(symbol).and_then(|b| b.get(order_id)).expect("order exists");
            (order.price_type, order.limit_price, order.direction, order.time_condition)
        };

        let (ask_price, bid_price) = margin::price_range(&quote);
        let price = match price_type {
            PriceType::Limit => limit_price.unwrap_or(f64::NAN),
            _ => {
                if matches!(direction, Direction::Buy) {
                    ask_price
                } else {
                    bid_price
                }
            }
        };

        let mut reject_reason: Option<&'static str> = None;
        if matches!(price_type, PriceType::Any) && price.is_nan() {
            reject_reason = Some("市价指令剩余撤销");
        } else if matches!(time_condition, TimeCondition::Ioc) {
            let cannot_cross = match direction {
                Direction::Buy => price < ask_price,
                Direction::Sell => price > bid_price,
            };
            if cannot_cross {
                reject_reason = Some("已撤单报单已提交");
            }
        }

        if let Some(reason) = reject_reason {
            self.unwind_order(symbol, order_id, reason);
            return;
        }

        let crossable = match direction {
            Direction::Buy => price >= ask_price,
            Direction::Sell => price <= bid_price,
        };
        if crossable {
            self.fill_order(symbol, order_id, price, &quote, underlying.as_ref());
        }
    }

    /// Finishes an order without a fill, undoing whatever reservation was
    /// made at intake (§4.5).
    fn unwind_order(&mut self, symbol: &str, order_id: &str, last_msg: &str) {
        let (exchange_id, instrument_id, offset, direction, volume_orign, orig_frozen_margin, orig_frozen_premium);
        {
            let order = self.orders.get_mut(symbol).and_then(|b| b.get_mut(order_id)).expect("order exists");
            order.last_msg = last_msg.to_string();
            order.status = OrderStatus::Finished;
            orig_frozen_margin = order.frozen_margin;
            orig_frozen_premium = order.frozen_premium;
            order.frozen_margin = 0.0;
            order.frozen_premium = 0.0;
            exchange_id = order.exchange_id.clone();
            instrument_id = order.instrument_id.clone();
            offset = order.offset;
            direction = order.direction;
            volume_orign = order.volume_orign;
            self.diffs.push(Diff::Order(order.clone()));
        }

        if matches!(offset, Offset::Open) {
            self.account.apply_order_delta(-orig_frozen_margin, -orig_frozen_premium);
            self.diffs.push(Diff::Account(self.account.clone()));
        } else {
            let key = position_key(&exchange_id, &instrument_id);
            let position = self.positions.get_mut(&key).expect("position exists for a close order");
            position::unwind_close(position, &exchange_id, direction, offset, volume_orign);
            self.diffs.push(Diff::Position(position.clone()));
        }
    }

    /// Finishes an order with a full fill: records the trade, then runs
    /// fill settlement (§4.6).
    fn fill_order(
        &mut self,
        symbol: &str,
        order_id: &str,
        price: f64,
        quote: &QuoteRecord,
        underlying: Option<&QuoteRecord>,
    ) {
        let timestamp = self.trade_timestamp();
        let commission = {
            let order = self.orders.get(symbol).and_then(|b| b.get(order_id)).expect("order exists");
            order.volume_left as f64 * margin::commission(quote)
        };
        let trade = {
            let order = self.orders.get(symbol).and_then(|b| b.get(order_id)).expect("order exists");
            Trade::from_fill(order, price, commission, timestamp)
        };
        self.trades.push(trade.clone());
        self.diffs.push(Diff::Trade(trade.clone()));

        let (offset, direction, volume_orign, exchange_id, instrument_id, orig_frozen_margin, orig_frozen_premium);
        {
            let order = self.orders.get_mut(symbol).and_then(|b| b.get_mut(order_id)).expect("order exists");
            orig_frozen_margin = order.frozen_margin;
            orig_frozen_premium = order.frozen_premium;
            order.frozen_margin = 0.0;
            order.frozen_premium = 0.0;
            order.volume_left = 0;
            order.last_msg = "全部成交".to_string();
            order.status = OrderStatus::Finished;
            offset = order.offset;
            direction = order.direction;
            volume_orign = order.volume_orign;
            exchange_id = order.exchange_id.clone();
            instrument_id = order.instrument_id.clone();
            self.diffs.push(Diff::Order(order.clone()));
        }

        let key = position_key(&exchange_id, &instrument_id);
        let future_margin = margin::future_margin(quote);
        let underlying_last_price = underlying.map(|u| u.last_price).unwrap_or(f64::NAN);
        self.ensure_position(&exchange_id, &instrument_id, future_margin, quote.last_price, underlying_last_price);

        if matches!(offset, Offset::Open) {
            {
                let position = self.positions.get_mut(&key).unwrap();
                match direction {
                    Direction::Buy => {
                        position.volume_long_today += volume_orign;
                        position.open_cost_long += trade.price * volume_orign as f64 * quote.volume_multiple;
                        position.position_cost_long += trade.price * volume_orign as f64 * quote.volume_multiple;
                    }
                    Direction::Sell => {
                        position.volume_short_today += volume_orign;
                        position.open_cost_short += trade.price * volume_orign as f64 * quote.volume_multiple;
                        position.position_cost_short += trade.price * volume_orign as f64 * quote.volume_multiple;
                    }
                }
            }

            self.account.apply_order_delta(-orig_frozen_margin, -orig_frozen_premium);
            let premium = margin::premium(&trade, quote);
            self.account.apply_trade_delta(trade.commission, premium, 0.0);

            let trigger = match direction {
                Direction::Buy => Trigger::BuyOpen(volume_orign),
                Direction::Sell => Trigger::SellOpen(volume_orign),
            };
            let underlying_last_price = underlying.map(|u| u.last_price).unwrap_or(f64::NAN);
            let delta = {
                let position = self.positions.get_mut(&key).unwrap();
                position::apply_trigger(
                    position,
                    quote,
                    underlying,
                    trigger,
                    trade.price,
                    quote.last_price,
                    f64::NAN,
                    underlying_last_price,
                )
            };
            self.account.apply_position_delta(delta);
        } else {
            let pre_last_price;
            let pre_underlying_last_price;
            let close_profit;
            {
                let position = self.positions.get_mut(&key).unwrap();
                pre_last_price = position.last_price;
                pre_underlying_last_price = position.underlying_last_price;
                close_profit = margin::close_profit(&trade, quote, position);

                match direction {
                    Direction::Sell => {
                        position.open_cost_long -= position.open_price_long * volume_orign as f64 * quote.volume_multiple;
                        position.position_cost_long -=
                            position.position_price_long * volume_orign as f64 * quote.volume_multiple;
                    }
                    Direction::Buy => {
                        position.open_cost_short -=
                            position.open_price_short * volume_orign as f64 * quote.volume_multiple;
                        position.position_cost_short -=
                            position.position_price_short * volume_orign as f64 * quote.volume_multiple;
                    }
                }
                position::consume_close(position, &exchange_id, direction, offset, volume_orign);
            }

            let premium = margin::premium(&trade, quote);
            self.account.apply_trade_delta(trade.commission, premium, close_profit);

            let trigger = match direction {
                Direction::Sell => Trigger::SellClose(volume_orign),
                Direction::Buy => Trigger::BuyClose(volume_orign),
            };
            let delta = {
                let position = self.positions.get_mut(&key).unwrap();
                position::apply_trigger(
                    position,
                    quote,
                    underlying,
                    trigger,
                    pre_last_price,
                    0.0,
                    pre_underlying_last_price,
                    0.0,
                )
            };
            self.account.apply_position_delta(delta);
        }

        self.diffs.push(Diff::Position(self.positions.get(&key).unwrap().clone()));
        self.diffs.push(Diff::Account(self.account.clone()));
    }

    /// Quote-driven revaluation (§4.7): re-marks an existing net position
    /// to the latest tick and refreshes its mark-price cache fields.
    fn revalue_position(&mut self, symbol: &str, quote: &QuoteRecord, underlying: Option<&QuoteRecord>) {
        let exchange_id;
        let instrument_id;
        if let Some((ex, ins)) = symbol.split_once('.') {
            exchange_id = ex.to_string();
            instrument_id = ins.to_string();
        } else {
            warn!("update_quotes received a symbol without an exchange prefix: {symbol}");
            return;
        }

        let future_margin = margin::future_margin(quote);
        let underlying_last_price = underlying.map(|u| u.last_price).unwrap_or(f64::NAN);
        let position = self.ensure_position(&exchange_id, &instrument_id, future_margin, quote.last_price, underlying_last_price);

        let has_volume = position.has_volume();
        let price_changed = position.last_price != quote.last_price;
        let margin_changed = future_margin.is_nan() || future_margin != position.future_margin;
        let underlying_changed = underlying.is_some()
            && (underlying_last_price.is_nan() || underlying_last_price != position.underlying_last_price);

        if has_volume && (price_changed || margin_changed || underlying_changed) {
            let pre_last_price = position.last_price;
            let pre_underlying_last_price = position.underlying_last_price;
            let key = position_key(&exchange_id, &instrument_id);
            let delta = {
                let position = self.positions.get_mut(&key).unwrap();
                position::apply_trigger(
                    position,
                    quote,
                    underlying,
                    Trigger::Tick,
                    pre_last_price,
                    quote.last_price,
                    pre_underlying_last_price,
                    underlying_last_price,
                )
            };
            self.account.apply_position_delta(delta);
            self.diffs.push(Diff::Account(self.account.clone()));
        }

        let key = position_key(&exchange_id, &instrument_id);
        let position = self.positions.get_mut(&key).unwrap();
        position.future_margin = future_margin;
        position.last_price = quote.last_price;
        position.underlying_last_price = underlying_last_price;
        self.diffs.push(Diff::Position(position.clone()));
    }

    fn finalize_if_finished(&mut self, symbol: &str, order_id: &str) {
        let finished = self.order(symbol, order_id).map(|o| !o.is_alive()).unwrap_or(false);
        if finished {
            if let Some(order) = self.orders.get_mut(symbol).and_then(|b| b.remove(order_id)) {
                self.order_events.push(order);
            }
        }
    }

    fn take_results(&mut self) -> (Vec<Diff>, Vec<Order>) {
        (std::mem::take(&mut self.diffs), std::mem::take(&mut self.order_events))
    }
}

/// Derives the trade timestamp from the maximum observed quote datetime
/// (`YYYY-MM-DD HH:MM:SS.ffffff`), in nanoseconds since the epoch.
fn default_trade_timestamp(max_datetime: &str) -> i64 {
    if max_datetime.is_empty() {
        return 0;
    }
    match NaiveDateTime::parse_from_str(max_datetime, "%Y-%m-%d %H:%M:%S%.f") {
        Ok(dt) => dt.and_utc().timestamp_micros() * 1000,
        Err(_) => 0,
    }
}
