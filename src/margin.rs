//! Numeric collaborators the Matcher and Adjuster lean on: tradable price
//! window, margin/commission/premium/close-profit formulas. The upstream
//! quote-utility module these mirror was not available to ground against
//! directly, so the option margin formula below is a documented
//! approximation (see DESIGN.md).

use crate::order::Trade;
use crate::position::Position;
use crate::quote::QuoteRecord;
use crate::types::Direction;

/// Tradable price window `(ask_price, bid_price)`. Prefers the quote's own
/// top-of-book; falls back to `last_price` bounded by `price_tick` when one
/// side is missing, and to `last_price` alone when no tick size is known.
pub fn price_range(quote: &QuoteRecord) -> (f64, f64) {
    let ask = if !quote.ask_price1.is_nan() {
        quote.ask_price1
    } else if !quote.price_tick.is_nan() {
        quote.last_price + quote.price_tick
    } else {
        quote.last_price
    };
    let bid = if !quote.bid_price1.is_nan() {
        quote.bid_price1
    } else if !quote.price_tick.is_nan() {
        quote.last_price - quote.price_tick
    } else {
        quote.last_price
    };
    (ask, bid)
}

/// Per-lot margin for a futures position, read straight off the quote.
pub fn future_margin(quote: &QuoteRecord) -> f64 {
    quote.margin
}

/// Per-lot commission, read straight off the quote (0 for options, which
/// carry no top-level commission field).
pub fn commission(quote: &QuoteRecord) -> f64 {
    if quote.commission.is_nan() {
        0.0
    } else {
        quote.commission
    }
}

/// Simplified CTP-style commodity option margin: mark-to-market premium
/// value plus a fraction of the underlying's per-lot margin, discounted by
/// half of any out-of-the-money amount.
pub fn option_margin(quote: &QuoteRecord, mark: f64, underlying_mark: f64) -> f64 {
    let multiple = quote.volume_multiple;
    let premium_value = mark * multiple;
    let underlying_margin = quote.margin.is_nan().then(|| 0.0).unwrap_or(quote.margin);
    let otm = if underlying_mark > quote.strike_price {
        (underlying_mark - quote.strike_price) * multiple
    } else {
        (quote.strike_price - underlying_mark) * multiple
    };
    let base = underlying_margin + premium_value - 0.5 * otm;
    let floor = premium_value + 0.5 * underlying_margin;
    base.max(floor)
}

/// Option cash flow at trade time: positive when selling (premium received),
/// negative when buying (premium paid); always zero for futures.
pub fn premium(trade: &Trade, quote: &QuoteRecord) -> f64 {
    if !quote.is_option() {
        return 0.0;
    }
    let magnitude = trade.price * trade.volume as f64 * quote.volume_multiple;
    match trade.direction {
        Direction::Sell => magnitude,
        Direction::Buy => -magnitude,
    }
}

/// Realized P/L on a closing trade, measured off the position's last mark
/// (`position_price_*`, rolled forward by every `settle()`) rather than its
/// original entry price, so profit already recognized through
/// `position_profit` on prior days isn't counted again.
pub fn close_profit(trade: &Trade, quote: &QuoteRecord, position: &Position) -> f64 {
    let multiple = quote.volume_multiple;
    let volume = trade.volume as f64;
    match trade.direction {
        // SELL CLOSE reduces a long position.
        Direction::Sell => (trade.price - position.position_price_long) * volume * multiple,
        // BUY CLOSE reduces a short position.
        Direction::Buy => (position.position_price_short - trade.price) * volume * multiple,
    }
}
