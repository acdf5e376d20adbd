//! 回购模型
//!
//! 把全部待清算收益按当前价格折入储备，得到假想的交易前储备。
//! 优化器评估和真实提交都使用这一份计算，保证评估利润与执行利润一致。

use models::ReservePair;

use crate::cpmm::VirtualCpmm;

/// 把 `accrued_yield` 卖入虚拟池后的储备 (不修改输入)
pub fn buyback(accrued_yield: f64, reserves: &ReservePair) -> ReservePair {
    // yield 换 reward
    let reward_out = VirtualCpmm::calculate_amount_out(
        accrued_yield,
        reserves.yield_reserve,
        reserves.reward_reserve,
    );

    ReservePair {
        yield_reserve: reserves.yield_reserve + accrued_yield,
        reward_reserve: reserves.reward_reserve - reward_out,
    }
}
