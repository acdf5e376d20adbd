//! 模拟汇总报告

use anyhow::{Context, Result};
use models::SimulationSummary;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// 写入 JSON 的汇总
#[derive(Debug, Serialize)]
struct SummaryReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    summary: &'a SimulationSummary,
}

/// 一行结论
pub fn summary_line(summary: &SimulationSummary) -> String {
    format!(
        "{} arbs brought in {} POOL",
        summary.arb_count, summary.cumulative_reward_spent
    )
}

/// 格式化文本报告
pub fn format_text_report(summary: &SimulationSummary) -> String {
    let mut report = String::new();

    report.push_str(&"=".repeat(60));
    report.push('\n');
    report.push_str("清算模拟报告\n");
    report.push_str(&"=".repeat(60));
    report.push_str("\n\n");

    report.push_str("【参数】\n");
    report.push_str(&format!("  时长: {} ticks\n", summary.duration));
    report.push_str(&format!("  ema alpha: {}\n", summary.params.ema_alpha));
    report.push_str(&format!("  swap multiplier: {}\n", summary.params.swap_multiplier));
    report.push_str(&format!("  liquidity fraction: {}\n", summary.params.liquidity_fraction));
    report.push_str(&format!("  最低利润: {}\n", summary.min_profit));
    report.push_str(&format!("  零速率处理: {}\n", summary.zero_rate_policy));
    report.push('\n');

    report.push_str("【结果】\n");
    report.push_str(&format!("  套利次数: {}\n", summary.arb_count));
    report.push_str(&format!("  累计换入 reward: {:.6}\n", summary.cumulative_reward_spent));
    if summary.aborted_commits > 0 {
        report.push_str(&format!("  放弃提交: {}\n", summary.aborted_commits));
    }
    report.push_str(&format!("  未卖出收益: {:.6}\n", summary.unsold_yield));
    report.push('\n');

    let reserves = &summary.final_market.reserves;
    report.push_str("【最终虚拟做市商】\n");
    report.push_str(&format!("  yield 储备: {:.6}\n", reserves.yield_reserve));
    report.push_str(&format!("  reward 储备: {:.6}\n", reserves.reward_reserve));
    report.push_str(&format!("  移动平均: {:.6}\n", summary.final_market.yield_ema));
    report.push_str(&format!("  边际汇率: {:.6}\n", reserves.spot_rate()));

    report.push_str(&"=".repeat(60));
    report.push('\n');
    report.push_str(&summary_line(summary));
    report.push('\n');

    report
}

/// 写入 JSON 汇总
pub fn write_json_summary(summary: &SimulationSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let report = SummaryReport {
        generated_at: utils::now_shanghai_str(),
        summary,
    };
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    info!("JSON 汇总已保存: {:?}", path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{LiquidatorParams, MarketState, ReservePair, ZeroRatePolicy};

    fn sample_summary() -> SimulationSummary {
        SimulationSummary {
            duration: 1000,
            params: LiquidatorParams::default(),
            min_profit: 1.0,
            zero_rate_policy: ZeroRatePolicy::CarryForward,
            arb_count: 42,
            cumulative_reward_spent: 123.5,
            aborted_commits: 0,
            final_market: MarketState {
                reserves: ReservePair::new(3500.0, 210.0).unwrap(),
                yield_ema: 70.0,
            },
            unsold_yield: 9.0,
        }
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(summary_line(&sample_summary()), "42 arbs brought in 123.5 POOL");
    }

    #[test]
    fn test_text_report_contains_results() {
        let report = format_text_report(&sample_summary());
        assert!(report.contains("套利次数: 42"));
        assert!(report.contains("carry-forward"));
        assert!(!report.contains("放弃提交"));
        assert!(report.trim_end().ends_with("42 arbs brought in 123.5 POOL"));
    }

    #[test]
    fn test_json_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json_summary(&sample_summary(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["arb_count"], 42);
        assert_eq!(value["zero_rate_policy"], "carry-forward");
        assert_eq!(value["final_market"]["yield_ema"], 70.0);
        assert!(value["generated_at"].is_string());
    }
}
