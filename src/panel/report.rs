//! 报告导出与比例摘要
//!
//! 导出的报告永远基于完整结果集，与面板当前的过滤视图无关

use crate::detection::types::{AnalysisResult, Statistics};

/// 标记段的展示色
pub const FLAGGED_COLOR: &str = "rgba(245, 101, 101, 0.8)";
/// 正常段的展示色
pub const CLEAR_COLOR: &str = "rgba(72, 187, 120, 0.8)";

/// 将分析结果渲染为固定模板的纯文本报告
pub fn render_report(result: &AnalysisResult) -> String {
    let stats = &result.statistics;

    let mut report = format!(
        "=== CYBERBULLYING ANALYSIS ===\n\n\
         Total: {}\n\
         Harassment: {} ({:.1}%)\n\
         Safe: {}\n\n\
         === DETAILS ===\n\n",
        stats.total_comments,
        stats.harassment_detected,
        stats.harassment_percentage,
        stats.safe_count()
    );

    for (i, prediction) in result.predictions.iter().enumerate() {
        let verdict = if prediction.is_harassment {
            "⚠️ HARASSMENT"
        } else {
            "✓ SAFE"
        };
        report.push_str(&format!(
            "{}. {} ({:.1}%)\n\"{}\"\n\n",
            i + 1,
            verdict,
            prediction.confidence * 100.0,
            prediction.comment
        ));
    }

    report
}

/// 标记与正常的比例摘要
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionSummary {
    pub flagged: usize,
    pub clear: usize,
}

impl ProportionSummary {
    /// 从聚合统计构造
    pub fn from_statistics(stats: &Statistics) -> Self {
        Self {
            flagged: stats.harassment_detected,
            clear: stats.safe_count(),
        }
    }

    /// 总数
    pub fn total(&self) -> usize {
        self.flagged + self.clear
    }

    /// 两个比例段（标记在前），总数为零时返回空
    pub fn segments(&self) -> Vec<(&'static str, usize)> {
        if self.total() == 0 {
            return Vec::new();
        }
        vec![(FLAGGED_COLOR, self.flagged), (CLEAR_COLOR, self.clear)]
    }

    /// 渲染为定宽文本比例条，'█' 为标记段，'░' 为正常段
    pub fn render_bar(&self, width: usize) -> String {
        let total = self.total();
        if total == 0 || width == 0 {
            return String::new();
        }

        let flagged_cells =
            ((self.flagged as f64 / total as f64) * width as f64).round() as usize;
        let flagged_cells = flagged_cells.min(width);

        let mut bar = String::with_capacity(width * 3);
        bar.extend(std::iter::repeat('█').take(flagged_cells));
        bar.extend(std::iter::repeat('░').take(width - flagged_cells));
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::Prediction;

    fn sample_result() -> AnalysisResult {
        let predictions = vec![
            Prediction {
                comment: "you are an idiot".to_string(),
                is_harassment: true,
                confidence: 0.92,
            },
            Prediction {
                comment: "great video!".to_string(),
                is_harassment: false,
                confidence: 0.97,
            },
        ];
        let statistics = Statistics::derive(&predictions);
        AnalysisResult {
            predictions,
            statistics,
        }
    }

    #[test]
    fn test_report_template() {
        let report = render_report(&sample_result());

        assert!(report.starts_with("=== CYBERBULLYING ANALYSIS ===\n\n"));
        assert!(report.contains("Total: 2\n"));
        assert!(report.contains("Harassment: 1 (50.0%)\n"));
        assert!(report.contains("Safe: 1\n"));
        assert!(report.contains("=== DETAILS ===\n\n"));
        assert!(report.contains("1. ⚠️ HARASSMENT (92.0%)\n\"you are an idiot\"\n"));
        assert!(report.contains("2. ✓ SAFE (97.0%)\n\"great video!\"\n"));
    }

    #[test]
    fn test_summary_segments_order() {
        let summary = ProportionSummary { flagged: 1, clear: 3 };
        let segments = summary.segments();
        assert_eq!(segments, vec![(FLAGGED_COLOR, 1), (CLEAR_COLOR, 3)]);
    }

    #[test]
    fn test_empty_summary_has_no_segments() {
        let summary = ProportionSummary { flagged: 0, clear: 0 };
        assert!(summary.segments().is_empty());
        assert_eq!(summary.render_bar(10), "");
    }

    #[test]
    fn test_bar_width_is_exact() {
        let summary = ProportionSummary { flagged: 1, clear: 2 };
        let bar = summary.render_bar(9);
        assert_eq!(bar.chars().count(), 9);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 3);
    }
}
