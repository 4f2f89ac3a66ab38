use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single symbol's market data, merged last-write-wins from incoming packets.
///
/// Price-like fields default to `NaN` rather than zero: an absent `ask_price1`
/// is "unknown", not "zero".
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuoteRecord {
    pub datetime: String,
    pub last_price: f64,
    pub ins_class: String,
    pub volume_multiple: f64,
    #[serde(default = "nan")]
    pub commission: f64,
    #[serde(default = "nan")]
    pub margin: f64,
    pub underlying_symbol: Option<String>,
    #[serde(default = "nan")]
    pub ask_price1: f64,
    #[serde(default = "nan")]
    pub bid_price1: f64,
    #[serde(default = "nan")]
    pub price_tick: f64,
    #[serde(default = "nan")]
    pub strike_price: f64,
}

fn nan() -> f64 {
    f64::NAN
}

impl QuoteRecord {
    pub fn is_option(&self) -> bool {
        self.ins_class.ends_with("OPTION")
    }

    /// matches the quote-utility's "unsupported contract" check: futures
    /// quotes missing commission/margin are malformed, options never carry
    /// either field at the top level.
    pub fn has_future_fields(&self) -> bool {
        !self.commission.is_nan() && !self.margin.is_nan()
    }
}

/// Partial update for a single symbol. Any field set to `None` leaves the
/// cached value untouched (deep-merge, no deletion).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct QuoteUpdate {
    pub datetime: Option<String>,
    pub last_price: Option<f64>,
    pub ins_class: Option<String>,
    pub volume_multiple: Option<f64>,
    pub commission: Option<f64>,
    pub margin: Option<f64>,
    pub underlying_symbol: Option<String>,
    pub ask_price1: Option<f64>,
    pub bid_price1: Option<f64>,
    pub price_tick: Option<f64>,
    pub strike_price: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct QuoteCache {
    records: HashMap<String, QuoteRecord>,
    max_datetime: String,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&QuoteRecord> {
        self.records.get(symbol)
    }

    pub fn max_datetime(&self) -> &str {
        &self.max_datetime
    }

    /// Resolves `(quote, underlying_quote)` for matching/margin purposes.
    /// The underlying is `Some` iff the quote is an option and its
    /// `underlying_symbol` is itself cached.
    pub fn resolve<'a>(&'a self, symbol: &str) -> Option<(&'a QuoteRecord, Option<&'a QuoteRecord>)> {
        let quote = self.records.get(symbol)?;
        if quote.is_option() {
            let underlying_symbol = quote.underlying_symbol.as_deref()?;
            let underlying = self.records.get(underlying_symbol)?;
            Some((quote, Some(underlying)))
        } else {
            Some((quote, None))
        }
    }

    /// Merges one symbol's patch into the cache and advances `max_datetime`.
    /// Returns the symbol's record after the merge, plus whether `last_price`
    /// is informative (non-NaN) so callers know whether to re-match/revalue.
    pub fn apply(&mut self, symbol: &str, patch: QuoteUpdate) -> &QuoteRecord {
        let entry = self
            .records
            .entry(symbol.to_string())
            .or_insert_with(|| QuoteRecord {
                datetime: String::new(),
                last_price: f64::NAN,
                ins_class: String::new(),
                volume_multiple: 1.0,
                commission: f64::NAN,
                margin: f64::NAN,
                underlying_symbol: None,
                ask_price1: f64::NAN,
                bid_price1: f64::NAN,
                price_tick: f64::NAN,
                strike_price: f64::NAN,
            });

        if let Some(v) = patch.datetime {
            if v > self.max_datetime {
                self.max_datetime = v.clone();
            }
            entry.datetime = v;
        }
        if let Some(v) = patch.last_price {
            entry.last_price = v;
        }
        if let Some(v) = patch.ins_class {
            entry.ins_class = v;
        }
        if let Some(v) = patch.volume_multiple {
            entry.volume_multiple = v;
        }
        if let Some(v) = patch.commission {
            entry.commission = v;
        }
        if let Some(v) = patch.margin {
            entry.margin = v;
        }
        if patch.underlying_symbol.is_some() {
            entry.underlying_symbol = patch.underlying_symbol;
        }
        if let Some(v) = patch.ask_price1 {
            entry.ask_price1 = v;
        }
        if let Some(v) = patch.bid_price1 {
            entry.bid_price1 = v;
        }
        if let Some(v) = patch.price_tick {
            entry.price_tick = v;
        }
        if let Some(v) = patch.strike_price {
            entry.strike_price = v;
        }

        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(last_price: f64, datetime: &str) -> QuoteUpdate {
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

    #[test]
    fn merge_is_last_write_wins_without_deletion() {
        let mut cache = QuoteCache::new();
        cache.apply("SHFE.cu2401", patch(70000.0, "2024-01-02 09:00:00.000000"));
        cache.apply(
            "SHFE.cu2401",
            QuoteUpdate {
                last_price: Some(70100.0),
                ..Default::default()
            },
        );
        let q = cache.get("SHFE.cu2401").unwrap();
        assert_eq!(q.last_price, 70100.0);
        assert_eq!(q.commission, 10.0);
    }

    #[test]
    fn max_datetime_advances_to_lexicographic_max() {
        let mut cache = QuoteCache::new();
        cache.apply("A", patch(1.0, "2024-01-02 09:00:00.000000"));
        cache.apply("A", patch(1.0, "2024-01-01 09:00:00.000000"));
        assert_eq!(cache.max_datetime(), "2024-01-02 09:00:00.000000");
    }

    #[test]
    fn option_resolves_underlying() {
        let mut cache = QuoteCache::new();
        cache.apply(
            "SHFE.cu2401",
            QuoteUpdate {
                last_price: Some(70000.0),
                ins_class: Some("FUTURE".to_string()),
                ..Default::default()
            },
        );
        cache.apply(
            "SSE.510050C2401M03000",
            QuoteUpdate {
                last_price: Some(0.05),
                ins_class: Some("ETF_OPTION".to_string()),
                underlying_symbol: Some("SHFE.cu2401".to_string()),
                ..Default::default()
            },
        );
        let (quote, underlying) = cache.resolve("SSE.510050C2401M03000").unwrap();
        assert!(quote.is_option());
        assert_eq!(underlying.unwrap().last_price, 70000.0);
    }
}
