//! 虚拟 CPMM 收益清算模拟
//!
//! 功能：
//! 1. 按 tick 推进，累积收益并按外生市场汇率寻找最优套利
//! 2. 提交交易后按移动平均重新缩放虚拟流动性
//! 3. 输出逐笔 CSV 记录与汇总报告

pub mod report;
pub mod scenario;
pub mod simulation;
pub mod sink;

pub use scenario::Scenario;
pub use simulation::{Simulation, SimulationState, TickOutcome};
pub use sink::{CsvRecordSink, NullSink, RecordSink};
