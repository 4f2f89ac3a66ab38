use serde::{Deserialize, Serialize};

use crate::margin;
use crate::quote::QuoteRecord;
use crate::types::{splits_today_his, Direction, Offset, Volume};

/// One symbol's ledger: raw volume/frozen counters split today/historical,
/// their derived sums, cost aggregates, and the per-side profit/margin/
/// market-value figures that roll up into the account.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub exchange_id: String,
    pub instrument_id: String,

    pub volume_long_today: Volume,
    pub volume_long_his: Volume,
    pub volume_long: Volume,
    pub volume_long_frozen_today: Volume,
    pub volume_long_frozen_his: Volume,
    pub volume_long_frozen: Volume,

    pub volume_short_today: Volume,
    pub volume_short_his: Volume,
    pub volume_short: Volume,
    pub volume_short_frozen_today: Volume,
    pub volume_short_frozen_his: Volume,
    pub volume_short_frozen: Volume,

    pub open_price_long: f64,
    pub open_price_short: f64,
    pub open_cost_long: f64,
    pub open_cost_short: f64,
    pub position_price_long: f64,
    pub position_price_short: f64,
    pub position_cost_long: f64,
    pub position_cost_short: f64,

    pub float_profit_long: f64,
    pub float_profit_short: f64,
    pub float_profit: f64,
    pub position_profit_long: f64,
    pub position_profit_short: f64,
    pub position_profit: f64,
    pub margin_long: f64,
    pub margin_short: f64,
    pub margin: f64,
    pub market_value_long: f64,
    pub market_value_short: f64,
    pub market_value: f64,

    pub last_price: f64,
    pub underlying_last_price: f64,
    pub future_margin: f64,
}

impl Position {
    pub fn new(exchange_id: &str, instrument_id: &str) -> Self {
        Self {
            exchange_id: exchange_id.to_string(),
            instrument_id: instrument_id.to_string(),
            volume_long_today: 0,
            volume_long_his: 0,
            volume_long: 0,
            volume_long_frozen_today: 0,
            volume_long_frozen_his: 0,
            volume_long_frozen: 0,
            volume_short_today: 0,
            volume_short_his: 0,
            volume_short: 0,
            volume_short_frozen_today: 0,
            volume_short_frozen_his: 0,
            volume_short_frozen: 0,
            open_price_long: f64::NAN,
            open_price_short: f64::NAN,
            open_cost_long: 0.0,
            open_cost_short: 0.0,
            position_price_long: f64::NAN,
            position_price_short: f64::NAN,
            position_cost_long: 0.0,
            position_cost_short: 0.0,
            float_profit_long: 0.0,
            float_profit_short: 0.0,
            float_profit: 0.0,
            position_profit_long: 0.0,
            position_profit_short: 0.0,
            position_profit: 0.0,
            margin_long: 0.0,
            margin_short: 0.0,
            margin: 0.0,
            market_value_long: 0.0,
            market_value_short: 0.0,
            market_value: 0.0,
            last_price: f64::NAN,
            underlying_last_price: f64::NAN,
            future_margin: f64::NAN,
        }
    }

    /// Whether this symbol has never been touched since the engine started
    /// (or since the last settlement with no open lots): the `last_price`
    /// cache field is still its NaN sentinel.
    pub fn is_unmarked(&self) -> bool {
        self.last_price.is_nan()
    }

    pub fn has_volume(&self) -> bool {
        self.volume_long > 0 || self.volume_short > 0
    }

    /// Recomputes only the frozen sums; called whenever a closing order is
    /// frozen or unfrozen without a fill taking place.
    pub fn recompute_frozen(&mut self) {
        self.volume_long_frozen = self.volume_long_frozen_today + self.volume_long_frozen_his;
        self.volume_short_frozen = self.volume_short_frozen_today + self.volume_short_frozen_his;
    }

    /// Recomputes both the volume and frozen sums; called after a fill,
    /// once the raw today/his counters have already been mutated.
    pub fn recompute_volume(&mut self) {
        self.volume_long = self.volume_long_today + self.volume_long_his;
        self.volume_short = self.volume_short_today + self.volume_short_his;
        self.recompute_frozen();
    }
}

/// Result of [`apply_trigger`], rolled into the account via
/// `Account::apply_position_delta`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PositionDelta {
    pub float_profit: f64,
    pub position_profit: f64,
    pub margin: f64,
    pub market_value: f64,
}

/// Which primitive event is revaluing the position: a fresh fill on one
/// side, or a tick revaluing the net position already held.
#[derive(Clone, Copy, Debug)]
pub enum Trigger {
    BuyOpen(Volume),
    SellOpen(Volume),
    BuyClose(Volume),
    SellClose(Volume),
    Tick,
}

/// The Adjuster's numeric heart. Computes this trigger's contribution to
/// float/position profit, margin and market value as deltas against the
/// position's current side totals, applies them, recomputes the derived
/// per-unit prices and side sums, and returns the delta to roll into the
/// account.
///
/// `pre_last_price`/`last_price` and the underlying equivalents bracket the
/// revaluation window: an open fill revalues the freshly opened lot from
/// its trade price up to the current mark; a close fill revalues the
/// closed lot's existing unrealized figures down to nothing, using the
/// *pre-close* side volume for the ratio (hence this is called before the
/// volume aggregates are recomputed); a tick revalues the whole net
/// position between the old and new marks.
#[allow(clippy::too_many_arguments)]
pub fn apply_trigger(
    position: &mut Position,
    quote: &QuoteRecord,
    underlying: Option<&QuoteRecord>,
    trigger: Trigger,
    pre_last_price: f64,
    last_price: f64,
    pre_underlying_last_price: f64,
    underlying_last_price: f64,
) -> PositionDelta {
    let is_option = quote.is_option();
    let multiple = quote.volume_multiple;

    let mut float_profit_long = 0.0;
    let mut float_profit_short = 0.0;
    let mut position_profit_long = 0.0;
    let mut position_profit_short = 0.0;
    let mut margin_long = 0.0;
    let mut margin_short = 0.0;
    let mut market_value_long = 0.0;
    let mut market_value_short = 0.0;

    let is_fill = !matches!(trigger, Trigger::Tick);

    match trigger {
        Trigger::BuyOpen(volume) => {
            let volume = volume as f64;
            float_profit_long = (last_price - pre_last_price) * volume * multiple;
            if is_option {
                market_value_long = last_price * volume * multiple;
            } else {
                margin_long = volume * margin::future_margin(quote);
                position_profit_long = (last_price - pre_last_price) * volume * multiple;
            }
        }
        Trigger::SellClose(volume) => {
            let volume = volume as f64;
            float_profit_long = -position.float_profit_long / position.volume_long as f64 * volume;
            if is_option {
                market_value_long = -pre_last_price * volume * multiple;
            } else {
                margin_long = -volume * margin::future_margin(quote);
                position_profit_long =
                    -position.position_profit_long / position.volume_long as f64 * volume;
            }
        }
        Trigger::SellOpen(volume) => {
            let volume = volume as f64;
            float_profit_short = (pre_last_price - last_price) * volume * multiple;
            if is_option {
                market_value_short = -last_price * volume * multiple;
                let underlying_mark = underlying_last_price;
                margin_short = volume * margin::option_margin(quote, last_price, underlying_mark);
            } else {
                margin_short = volume * margin::future_margin(quote);
                position_profit_short = (pre_last_price - last_price) * volume * multiple;
            }
        }
        Trigger::BuyClose(volume) => {
            let volume = volume as f64;
            float_profit_short = -position.float_profit_short / position.volume_short as f64 * volume;
            if is_option {
                market_value_short = pre_last_price * volume * multiple;
                margin_short =
                    -volume * margin::option_margin(quote, pre_last_price, pre_underlying_last_price);
            } else {
                margin_short = -volume * margin::future_margin(quote);
                position_profit_short =
                    -position.position_profit_short / position.volume_short as f64 * volume;
            }
        }
        Trigger::Tick => {
            let volume_long = position.volume_long as f64;
            let volume_short = position.volume_short as f64;
            float_profit_long = (last_price - pre_last_price) * volume_long * multiple;
            float_profit_short = (pre_last_price - last_price) * volume_short * multiple;
            if is_option {
                margin_short = margin::option_margin(quote, last_price, underlying_last_price)
                    * volume_short
                    - position.margin_short;
                market_value_long = (last_price - pre_last_price) * volume_long * multiple;
                market_value_short = (pre_last_price - last_price) * volume_short * multiple;
            } else {
                position_profit_long = float_profit_long;
                position_profit_short = float_profit_short;
                margin_long = margin::future_margin(quote) * volume_long - position.margin_long;
                margin_short = margin::future_margin(quote) * volume_short - position.margin_short;
            }
        }
    }

    if is_fill {
        position.recompute_volume();
    }

    position.float_profit_long += float_profit_long;
    position.float_profit_short += float_profit_short;
    position.position_profit_long += position_profit_long;
    position.position_profit_short += position_profit_short;
    position.margin_long += margin_long;
    position.margin_short += margin_short;
    position.market_value_long += market_value_long;
    position.market_value_short += market_value_short;

    if position.volume_long > 0 {
        position.open_price_long = position.open_cost_long / (position.volume_long as f64) / multiple;
        position.position_price_long =
            position.position_cost_long / (position.volume_long as f64) / multiple;
    } else {
        position.open_price_long = f64::NAN;
        position.position_price_long = f64::NAN;
    }
    if position.volume_short > 0 {
        position.open_price_short =
            position.open_cost_short / (position.volume_short as f64) / multiple;
        position.position_price_short =
            position.position_cost_short / (position.volume_short as f64) / multiple;
    } else {
        position.open_price_short = f64::NAN;
        position.position_price_short = f64::NAN;
    }

    position.float_profit = position.float_profit_long + position.float_profit_short;
    position.position_profit = position.position_profit_long + position.position_profit_short;
    position.margin = position.margin_long + position.margin_short;
    position.market_value = position.market_value_long + position.market_value_short;

    PositionDelta {
        float_profit: float_profit_long + float_profit_short,
        position_profit: position_profit_long + position_profit_short,
        margin: margin_long + margin_short,
        market_value: market_value_long + market_value_short,
    }
}

/// Reserves closing volume onto the position's frozen counters at order
/// intake. SHFE/INE route strictly by `offset`; other exchanges fill
/// `frozen_his` first and spill the remainder into `frozen_today`.
pub fn freeze_close(position: &mut Position, exchange_id: &str, direction: Direction, offset: Offset, volume: Volume) {
    if splits_today_his(exchange_id) {
        let today = matches!(offset, Offset::CloseToday);
        match direction {
            Direction::Buy if today => position.volume_short_frozen_today += volume,
            Direction::Buy => position.volume_short_frozen_his += volume,
            Direction::Sell if today => position.volume_long_frozen_today += volume,
            Direction::Sell => position.volume_long_frozen_his += volume,
        }
    } else {
        match direction {
            Direction::Buy => {
                let available = position.volume_short_his - position.volume_short_frozen_his;
                if available < volume {
                    position.volume_short_frozen_his += available;
                    position.volume_short_frozen_today += volume - available;
                } else {
                    position.volume_short_frozen_his += volume;
                }
            }
            Direction::Sell => {
                let available = position.volume_long_his - position.volume_long_frozen_his;
                if available < volume {
                    position.volume_long_frozen_his += available;
                    position.volume_long_frozen_today += volume - available;
                } else {
                    position.volume_long_frozen_his += volume;
                }
            }
        }
    }
    position.recompute_frozen();
}

/// Releases a reservation made by [`freeze_close`] when the closing order
/// finishes without a fill (cancel or matcher rejection). Non-SHFE/INE
/// exchanges drain `frozen_today` first here — the mirror image of
/// `freeze_close`'s his-first order — an intentional asymmetry carried
/// forward from the upstream engine.
pub fn unwind_close(position: &mut Position, exchange_id: &str, direction: Direction, offset: Offset, volume: Volume) {
    if splits_today_his(exchange_id) {
        let today = matches!(offset, Offset::CloseToday);
        match direction {
            Direction::Buy if today => position.volume_short_frozen_today -= volume,
            Direction::Buy => position.volume_short_frozen_his -= volume,
            Direction::Sell if today => position.volume_long_frozen_today -= volume,
            Direction::Sell => position.volume_long_frozen_his -= volume,
        }
    } else {
        match direction {
            Direction::Buy => {
                if position.volume_short_frozen_today >= volume {
                    position.volume_short_frozen_today -= volume;
                } else {
                    position.volume_short_frozen_his -= volume - position.volume_short_frozen_today;
                    position.volume_short_frozen_today = 0;
                }
            }
            Direction::Sell => {
                if position.volume_long_frozen_today >= volume {
                    position.volume_long_frozen_today -= volume;
                } else {
                    position.volume_long_frozen_his -= volume - position.volume_long_frozen_today;
                    position.volume_long_frozen_today = 0;
                }
            }
        }
    }
    position.recompute_frozen();
}

/// Drains the frozen reservation and the underlying raw volume counter
/// together when a closing order actually fills. Same his-first order as
/// `freeze_close` (this is not the asymmetric path).
pub fn consume_close(position: &mut Position, exchange_id: &str, direction: Direction, offset: Offset, volume: Volume) {
    if splits_today_his(exchange_id) {
        let today = matches!(offset, Offset::CloseToday);
        match direction {
            Direction::Buy if today => {
                position.volume_short_frozen_today -= volume;
                position.volume_short_today -= volume;
            }
            Direction::Buy => {
                position.volume_short_frozen_his -= volume;
                position.volume_short_his -= volume;
            }
            Direction::Sell if today => {
                position.volume_long_frozen_today -= volume;
                position.volume_long_today -= volume;
            }
            Direction::Sell => {
                position.volume_long_frozen_his -= volume;
                position.volume_long_his -= volume;
            }
        }
    } else {
        match direction {
            Direction::Buy => {
                if position.volume_short_frozen_his >= volume {
                    position.volume_short_frozen_his -= volume;
                    position.volume_short_his -= volume;
                } else {
                    let spill = volume - position.volume_short_frozen_his;
                    position.volume_short_frozen_today -= spill;
                    position.volume_short_today -= spill;
                    position.volume_short_his -= position.volume_short_frozen_his;
                    position.volume_short_frozen_his = 0;
                }
            }
            Direction::Sell => {
                if position.volume_long_frozen_his >= volume {
                    position.volume_long_frozen_his -= volume;
                    position.volume_long_his -= volume;
                } else {
                    let spill = volume - position.volume_long_frozen_his;
                    position.volume_long_frozen_today -= spill;
                    position.volume_long_today -= spill;
                    position.volume_long_his -= position.volume_long_frozen_his;
                    position.volume_long_frozen_his = 0;
                }
            }
        }
    }
    // Aggregates are recomputed once by `apply_trigger`'s fill branch,
    // after the cost bases are also updated.
}
