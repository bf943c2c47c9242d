//! 检测管道模块
//!
//! 结果交付管道的四个阶段：提取 → 分类 → 对账 → 渲染
//!
//! # 模块组织
//!
//! - `extractor` - 从页面DOM按文档顺序收集评论文本
//! - `classifier` - 整批提交远程分类API，带超时与结构校验
//! - `renderer` - 按位置把判定结果回写为页面视觉标记
//! - `types` - 线上数据类型（Prediction、Statistics、AnalysisResult）
//! - `error` - 统一错误分类

pub mod classifier;
pub mod error;
pub mod extractor;
pub mod renderer;
pub mod types;

// 重新导出主要类型
pub use classifier::{ClassifierClient, ClassifierConfig, DEFAULT_API_URL};
pub use error::{DetectionError, DetectionResult};
pub use extractor::{CommentExtractor, ExtractorConfig, COMMENT_SELECTOR_ID, MAX_COMMENT_LENGTH};
pub use renderer::{HighlightRenderer, RendererConfig};
pub use types::{AnalysisResult, Prediction, Statistics};
