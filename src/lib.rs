//! A single-account matching and accounting engine for simulated futures
//! and options trading: order intake and validation, a price/time matcher,
//! position and margin accounting, and end-of-day settlement.
//!
//! The engine is driven synchronously through [`engine::Engine`]'s four
//! operations (`insert_order`, `cancel_order`, `update_quotes`, `settle`).
//! Every mutation is surfaced as a [`diff::Diff`], mirroring the bucketed
//! account/position/order/trade snapshot a caller would persist or forward
//! to a UI.

pub mod account;
pub mod diff;
pub mod engine;
pub mod error;
pub mod margin;
pub mod order;
pub mod position;
pub mod quote;
pub mod types;

pub use account::Account;
pub use diff::Diff;
pub use engine::{Engine, EngineConfig};
pub use error::ContractViolation;
pub use order::{Order, OrderRequest, Trade};
pub use position::Position;
pub use quote::{QuoteCache, QuoteRecord, QuoteUpdate};
