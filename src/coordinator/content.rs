//! 标签页内容上下文
//!
//! 一个已注册标签页对应一份已解析的页面DOM，提取器与渲染器
//! 在它上面就地工作。序列化回字节串用于产出带标记的页面副本

use markup5ever_rcdom::RcDom;

use crate::detection::error::DetectionResult;
use crate::detection::extractor::{CommentExtractor, ExtractorConfig};
use crate::detection::renderer::{HighlightRenderer, RendererConfig};
use crate::detection::types::Prediction;
use crate::parsers::html::{html_to_dom, serialize_document};

/// 单个标签页的页面上下文
pub struct ContentContext {
    url: String,
    dom: RcDom,
    extractor: CommentExtractor,
    renderer: HighlightRenderer,
}

impl ContentContext {
    /// 解析页面字节串并建立上下文
    pub fn from_html(url: impl Into<String>, html: &[u8]) -> Self {
        Self {
            url: url.into(),
            dom: html_to_dom(html, "utf-8".to_string()),
            extractor: CommentExtractor::new(ExtractorConfig::default()),
            renderer: HighlightRenderer::new(RendererConfig::default()),
        }
    }

    /// 页面地址
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 页面DOM
    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    /// 立即提取一遍评论文本
    pub fn extract(&mut self) -> Vec<String> {
        self.extractor.extract(&self.dom.document)
    }

    /// 等待评论出现后提取，超时报 `NoContent`
    pub async fn extract_when_ready(&mut self) -> DetectionResult<Vec<String>> {
        self.extractor.extract_when_ready(&self.dom.document).await
    }

    /// 将判定结果应用为视觉标记
    pub fn highlight(&mut self, predictions: &[Prediction]) {
        self.renderer.apply(&self.dom, predictions);
    }

    /// 撤销全部视觉标记
    pub fn clear_highlights(&mut self) {
        self.renderer.clear(&self.dom);
    }

    /// 当前带标记的容器数量
    pub fn highlighted_count(&self) -> usize {
        self.renderer.analyzed_count()
    }

    /// 序列化当前DOM（含标记）为HTML字节串
    pub fn to_html(&self) -> Vec<u8> {
        serialize_document(&self.dom, "utf-8".to_string())
    }
}
