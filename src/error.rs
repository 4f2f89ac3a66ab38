use derive_more::{Display, Error};

/// Contract violations: conditions a well-formed caller never triggers.
/// Domain rejections (insufficient capital, outside trading hours, and so
/// on) are never errors — they are recorded on the order and surfaced
/// through the diff stream instead.
#[derive(Debug, Display, Error)]
pub enum ContractViolation {
    #[display(fmt = "no quote received for {symbol} before insert_order")]
    MissingQuote { symbol: String },
    #[display(fmt = "no quote received for underlying of {symbol} before insert_order")]
    MissingUnderlyingQuote { symbol: String },
}
