mod logger;
pub mod time_utils;

pub use logger::{LoggerManager, ARBITRAGE_TARGET, SIMULATION_TARGET};
pub use time_utils::{now_shanghai, now_shanghai_str};
