use serde::{Deserialize, Serialize};

pub type OrderId = String;
pub type Volume = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Direction {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Offset {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSE")]
    Close,
    #[serde(rename = "CLOSETODAY")]
    CloseToday,
}

impl Offset {
    pub fn is_close(&self) -> bool {
        matches!(self, Offset::Close | Offset::CloseToday)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum PriceType {
    #[serde(rename = "LIMIT")]
    Limit,
    #[serde(rename = "ANY")]
    Any,
    #[serde(rename = "BEST")]
    Best,
    #[serde(rename = "FIVELEVEL")]
    FiveLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum TimeCondition {
    #[serde(rename = "GFD")]
    Gfd,
    #[serde(rename = "IOC")]
    Ioc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum OrderStatus {
    #[serde(rename = "ALIVE")]
    Alive,
    #[serde(rename = "FINISHED")]
    Finished,
}

/// today/his split applies only on these two exchanges; everywhere else
/// closing volume is drawn from the aggregated counters.
pub fn splits_today_his(exchange_id: &str) -> bool {
    matches!(exchange_id, "SHFE" | "INE")
}

pub fn position_key(exchange_id: &str, instrument_id: &str) -> String {
    format!("{exchange_id}.{instrument_id}")
}
