use models::{LiquidatorError, LiquidatorResult};

/// 虚拟恒定乘积做市商 (x * y = k, 无手续费)
pub struct VirtualCpmm;

impl VirtualCpmm {
    /// 计算输出数量 (纯计算)
    ///
    /// amountOut = amountIn * reserveOut / (reserveIn + amountIn)
    pub fn calculate_amount_out(amount_in: f64, reserve_in: f64, reserve_out: f64) -> f64 {
        if amount_in <= 0.0 {
            return 0.0;
        }

        (amount_in * reserve_out) / (reserve_in + amount_in)
    }

    /// 计算输入数量 (纯计算)
    ///
    /// amountIn = reserveIn * amountOut / (reserveOut - amountOut)，
    /// 输出量达到或超过储备时无法满足。
    pub fn calculate_amount_in(
        amount_out: f64,
        reserve_in: f64,
        reserve_out: f64,
    ) -> LiquidatorResult<f64> {
        if amount_out >= reserve_out || amount_out < 0.0 || !amount_out.is_finite() {
            return Err(LiquidatorError::InvalidTrade {
                amount_out,
                reserve_out,
            });
        }

        Ok((reserve_in * amount_out) / (reserve_out - amount_out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_out_zero_input() {
        assert_eq!(VirtualCpmm::calculate_amount_out(0.0, 500.0, 50.0), 0.0);
    }

    #[test]
    fn test_amount_out_basic() {
        // 10 yield 换入 500:50 的池子
        let out = VirtualCpmm::calculate_amount_out(10.0, 500.0, 50.0);
        assert!((out - 500.0 / 510.0).abs() < 1e-12);
    }

    #[test]
    fn test_amount_in_rejects_full_reserve() {
        assert!(matches!(
            VirtualCpmm::calculate_amount_in(50.0, 500.0, 50.0),
            Err(LiquidatorError::InvalidTrade { .. })
        ));
        assert!(VirtualCpmm::calculate_amount_in(60.0, 500.0, 50.0).is_err());
        assert_eq!(VirtualCpmm::calculate_amount_in(0.0, 500.0, 50.0), Ok(0.0));
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            (500.0, 50.0),
            (49.0196, 510.0),
            (1.0e6, 3.0),
            (0.75, 0.002),
        ];

        for (reserve_in, reserve_out) in cases {
            for fraction in [0.0, 1e-6, 0.1, 0.5, 0.9, 0.999] {
                let x = reserve_out * fraction;
                let amount_in =
                    VirtualCpmm::calculate_amount_in(x, reserve_in, reserve_out).unwrap();
                let back = VirtualCpmm::calculate_amount_out(amount_in, reserve_in, reserve_out);
                let tolerance = 1e-9 * x.abs().max(1e-12);
                assert!(
                    (back - x).abs() <= tolerance,
                    "round trip drifted: x={}, back={}, reserves=({}, {})",
                    x,
                    back,
                    reserve_in,
                    reserve_out
                );
            }
        }
    }
}
