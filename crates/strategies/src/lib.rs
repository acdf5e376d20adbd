pub mod optimizer;
pub mod rebalancer;

pub use optimizer::{TradeOptimizer, GRID_STEPS};
pub use rebalancer::{RebalanceOutcome, Rebalancer};
