use thiserror::Error;

/// 清算模拟错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiquidatorError {
    /// 请求的输出量达到或超过储备量，无法成交
    #[error("Invalid trade: amount out {amount_out} exceeds reserve {reserve_out}")]
    InvalidTrade { amount_out: f64, reserve_out: f64 },

    #[error("Non-positive reserve: yield {yield_reserve}, reward {reward_reserve}")]
    NonPositiveReserve { yield_reserve: f64, reward_reserve: f64 },

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Record sink error: {0}")]
    Sink(String),
}

pub type LiquidatorResult<T> = Result<T, LiquidatorError>;
