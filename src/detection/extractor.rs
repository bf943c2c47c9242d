//! 评论提取器模块
//!
//! 按文档顺序从页面DOM中收集可见评论文本

use std::time::Duration;

use markup5ever_rcdom::Handle;
use tokio::time::{sleep, Instant};

use crate::detection::error::{DetectionError, DetectionResult};
use crate::parsers::html::{find_elements_by_id, text_content};

/// 评论选择器：观看页上承载评论正文的元素 id
pub const COMMENT_SELECTOR_ID: &str = "content-text";

/// 超过该长度的文本视为误匹配的系统/界面文本，直接丢弃
pub const MAX_COMMENT_LENGTH: usize = 5000;

/// 提取器配置
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// 匹配评论元素的 id 值
    pub selector_id: String,
    /// 文本长度上限（字符数，含上限即丢弃）
    pub max_comment_length: usize,
    /// 等待模式下的轮询间隔
    pub poll_interval: Duration,
    /// 等待模式下的超时上限
    pub wait_timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            selector_id: COMMENT_SELECTOR_ID.to_string(),
            max_comment_length: MAX_COMMENT_LENGTH,
            poll_interval: Duration::from_millis(100),
            wait_timeout: Duration::from_millis(10_000),
        }
    }
}

/// 提取统计信息
#[derive(Debug, Clone, Default)]
pub struct ExtractionStats {
    pub matched_elements: usize,
    pub dropped_empty: usize,
    pub dropped_oversize: usize,
    pub extracted: usize,
}

impl ExtractionStats {
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

/// 评论提取器
///
/// 两种调用路径语义不同：`extract` 对零匹配返回空序列；
/// `extract_when_ready` 在限时内持续轮询，从未出现匹配元素则按超时失败。
/// 这个不对称是有意的：弹窗路径需要区分"没有评论"和"页面未就绪"
pub struct CommentExtractor {
    config: ExtractorConfig,
    stats: ExtractionStats,
}

impl CommentExtractor {
    /// 创建新的提取器
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            stats: ExtractionStats::default(),
        }
    }

    /// 直接提取：按文档顺序返回过滤后的评论文本
    pub fn extract(&mut self, root: &Handle) -> Vec<String> {
        self.stats.reset();

        let elements = find_elements_by_id(root, &self.config.selector_id);
        self.stats.matched_elements = elements.len();

        let mut comments = Vec::with_capacity(elements.len());
        for element in &elements {
            let text = text_content(element).trim().to_string();

            if text.is_empty() {
                self.stats.dropped_empty += 1;
                continue;
            }
            if text.chars().count() >= self.config.max_comment_length {
                self.stats.dropped_oversize += 1;
                continue;
            }

            comments.push(text);
        }

        self.stats.extracted = comments.len();
        tracing::debug!(
            "评论提取完成: 匹配 {} 个元素，保留 {} 条",
            self.stats.matched_elements,
            self.stats.extracted
        );

        comments
    }

    /// 等待提取：评论可能仍在异步加载，限时轮询直到选择器出现匹配
    ///
    /// 匹配元素一旦出现即提取并返回（过滤后可能为空序列）；
    /// 超时前从未出现任何匹配则报 `NoContent` 超时错误
    pub async fn extract_when_ready(&mut self, root: &Handle) -> DetectionResult<Vec<String>> {
        let deadline = Instant::now() + self.config.wait_timeout;

        loop {
            if !find_elements_by_id(root, &self.config.selector_id).is_empty() {
                return Ok(self.extract(root));
            }

            if Instant::now() >= deadline {
                tracing::warn!(
                    "等待评论超时: {:?} 内未出现选择器匹配",
                    self.config.wait_timeout
                );
                return Err(DetectionError::NoContent(
                    "Timeout: comments not found".to_string(),
                ));
            }

            sleep(self.config.poll_interval).await;
        }
    }

    /// 获取提取统计信息
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }
}

impl Default for CommentExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::html_to_dom;

    fn dom_root(html: &str) -> markup5ever_rcdom::RcDom {
        html_to_dom(html.as_bytes(), "utf-8".to_string())
    }

    #[test]
    fn test_extract_preserves_document_order() {
        let dom = dom_root(
            "<ytd-comment-renderer><span id=\"content-text\"> first comment </span></ytd-comment-renderer>\
             <ytd-comment-renderer><span id=\"content-text\">second comment</span></ytd-comment-renderer>",
        );
        let mut extractor = CommentExtractor::default();

        let comments = extractor.extract(&dom.document);
        assert_eq!(comments, vec!["first comment", "second comment"]);
        assert_eq!(extractor.stats().matched_elements, 2);
    }

    #[test]
    fn test_extract_drops_empty_and_oversize() {
        let oversize = "a".repeat(MAX_COMMENT_LENGTH);
        let html = format!(
            "<span id=\"content-text\">   </span>\
             <span id=\"content-text\">{}</span>\
             <span id=\"content-text\">kept</span>",
            oversize
        );
        let dom = dom_root(&html);
        let mut extractor = CommentExtractor::default();

        let comments = extractor.extract(&dom.document);
        assert_eq!(comments, vec!["kept"]);
        assert_eq!(extractor.stats().dropped_empty, 1);
        assert_eq!(extractor.stats().dropped_oversize, 1);
    }

    #[test]
    fn test_extract_zero_matches_is_empty_not_error() {
        let dom = dom_root("<div>no comments here</div>");
        let mut extractor = CommentExtractor::default();

        assert!(extractor.extract(&dom.document).is_empty());
    }

    #[tokio::test]
    async fn test_extract_when_ready_times_out_without_matches() {
        let dom = dom_root("<div>still loading</div>");
        let mut extractor = CommentExtractor::new(ExtractorConfig {
            poll_interval: Duration::from_millis(5),
            wait_timeout: Duration::from_millis(30),
            ..Default::default()
        });

        let err = extractor
            .extract_when_ready(&dom.document)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DetectionError::NoContent("Timeout: comments not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_extract_when_ready_returns_immediately_when_present() {
        let dom = dom_root("<span id=\"content-text\">already here</span>");
        let mut extractor = CommentExtractor::default();

        let comments = extractor
            .extract_when_ready(&dom.document)
            .await
            .unwrap();
        assert_eq!(comments, vec!["already here"]);
    }
}
