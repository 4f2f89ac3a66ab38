use serde::{Deserialize, Serialize};

use crate::position::PositionDelta;

/// The single-currency balance sheet. One instance per engine, created at
/// construction and never replaced.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Account {
    pub currency: String,
    pub pre_balance: f64,
    pub static_balance: f64,
    pub balance: f64,
    pub available: f64,

    pub close_profit: f64,
    pub commission: f64,
    pub premium: f64,
    pub deposit: f64,
    pub withdraw: f64,

    pub float_profit: f64,
    pub position_profit: f64,
    pub margin: f64,
    pub market_value: f64,

    pub frozen_margin: f64,
    pub frozen_commission: f64,
    pub frozen_premium: f64,

    pub risk_ratio: f64,

    /// Passthrough fields the upstream account-comparison tooling expects;
    /// this engine never computes a value for them.
    pub ctp_balance: f64,
    pub ctp_available: f64,
}

impl Account {
    pub fn new(init_balance: f64) -> Self {
        Self {
            currency: "CNY".to_string(),
            pre_balance: init_balance,
            static_balance: init_balance,
            balance: init_balance,
            available: init_balance,
            close_profit: 0.0,
            commission: 0.0,
            premium: 0.0,
            deposit: 0.0,
            withdraw: 0.0,
            float_profit: 0.0,
            position_profit: 0.0,
            margin: 0.0,
            market_value: 0.0,
            frozen_margin: 0.0,
            frozen_commission: 0.0,
            frozen_premium: 0.0,
            risk_ratio: 0.0,
            ctp_balance: f64::NAN,
            ctp_available: f64::NAN,
        }
    }

    /// Effect of a trade settling: realized close profit, commission paid,
    /// option premium paid/received.
    pub fn apply_trade_delta(&mut self, commission: f64, premium: f64, close_profit: f64) {
        self.close_profit += close_profit;
        self.commission += commission;
        self.premium += premium;
        self.balance += close_profit - commission + premium;
        self.available += close_profit - commission + premium;
        self.recompute_risk_ratio();
    }

    /// Effect of a position revaluation (fill or tick), rolled up from
    /// [`PositionDelta`].
    pub fn apply_position_delta(&mut self, delta: PositionDelta) {
        self.float_profit += delta.float_profit;
        self.position_profit += delta.position_profit;
        self.margin += delta.margin;
        self.market_value += delta.market_value;
        self.balance += delta.position_profit + delta.market_value;
        self.available += delta.position_profit - delta.margin;
        self.recompute_risk_ratio();
    }

    /// Effect of freezing/releasing capital against a live order.
    pub fn apply_order_delta(&mut self, frozen_margin: f64, frozen_premium: f64) {
        self.frozen_margin += frozen_margin;
        self.frozen_premium += frozen_premium;
        self.available -= frozen_margin + frozen_premium;
    }

    fn recompute_risk_ratio(&mut self) {
        self.risk_ratio = self.margin / self.balance;
    }

    /// Rolls the account to the next trading day: frozen amounts clear,
    /// daily cumulative fields reset, market value rides over into the new
    /// `pre_balance`.
    pub fn settle(&mut self) {
        self.pre_balance = self.balance - self.market_value;
        self.close_profit = 0.0;
        self.commission = 0.0;
        self.premium = 0.0;
        self.frozen_margin = 0.0;
        self.frozen_premium = 0.0;
        self.static_balance = self.pre_balance;
        self.position_profit = 0.0;
        self.risk_ratio = self.margin / self.balance;
        self.available = self.static_balance - self.margin;
    }
}
