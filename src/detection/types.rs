//! 检测管道核心数据类型
//!
//! 与远程分类API的线上格式一一对应，字段名即线上字段名

use serde::{Deserialize, Serialize};

/// 单条评论的判定结果
///
/// 与提交批次一一对应且保持顺序，顺序是回写页面的唯一关联键
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 原始评论文本
    pub comment: String,
    /// 是否判定为骚扰内容
    pub is_harassment: bool,
    /// 置信度，0.0–1.0
    pub confidence: f64,
}

/// 一次分析的汇总统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_comments: usize,
    pub harassment_detected: usize,
    /// 0–100，展示时保留一位小数
    pub harassment_percentage: f64,
}

impl Statistics {
    /// 从判定结果推导统计（总数为0时百分比短路为0）
    pub fn derive(predictions: &[Prediction]) -> Self {
        let total = predictions.len();
        let detected = predictions.iter().filter(|p| p.is_harassment).count();
        let percentage = if total > 0 {
            (detected as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Statistics {
            total_comments: total,
            harassment_detected: detected,
            harassment_percentage: percentage,
        }
    }

    /// 未被标记的评论数
    pub fn safe_count(&self) -> usize {
        self.total_comments.saturating_sub(self.harassment_detected)
    }

    /// 检查百分比不变式是否成立
    pub fn is_consistent(&self) -> bool {
        if self.harassment_percentage < 0.0 || self.harassment_percentage > 100.0 {
            return false;
        }
        if self.harassment_detected > self.total_comments {
            return false;
        }
        let expected = if self.total_comments > 0 {
            (self.harassment_detected as f64 / self.total_comments as f64) * 100.0
        } else {
            0.0
        };
        (self.harassment_percentage - expected).abs() < 1e-6
    }
}

/// 一次完整分析的结果单元
///
/// 分类成功时创建，面板重置或重新分析时销毁，从不跨会话持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub predictions: Vec<Prediction>,
    pub statistics: Statistics,
}
