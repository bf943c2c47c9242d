//! 核心功能和主要处理逻辑
//!
//! 面向库使用者的一站式入口：给定一份页面字节串，
//! 走完提取、分类、标记、序列化的完整管道

use markup5ever_rcdom::RcDom;

use crate::detection::classifier::{ClassifierClient, ClassifierConfig};
use crate::detection::error::{DetectionError, DetectionResult};
use crate::detection::extractor::{CommentExtractor, ExtractorConfig};
use crate::detection::renderer::{HighlightRenderer, RendererConfig};
use crate::detection::types::AnalysisResult;
use crate::parsers::html::{html_to_dom, serialize_document};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Configuration options for a one-shot analysis run
#[derive(Debug, Default, Clone)]
pub struct GuardOptions {
    /// 覆盖分类API基地址
    pub api_url: Option<String>,
    /// 输入文档的字符集（默认按 UTF-8 解析）
    pub encoding: Option<String>,
    /// 只分类，不在输出文档中做视觉标记
    pub no_highlight: bool,
    /// 覆盖分类请求超时（秒）
    pub timeout: u64,
    /// 不打印进度信息
    pub silent: bool,
}

impl GuardOptions {
    fn classifier_config(&self) -> ClassifierConfig {
        let mut config = ClassifierConfig::default();
        if let Some(url) = &self.api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if self.timeout > 0 {
            config.classify_timeout = std::time::Duration::from_secs(self.timeout);
        }
        config
    }
}

/// 对一份静态页面执行完整分析
///
/// 返回分析结果与（可能带标记的）序列化文档。
/// 静态文档不存在异步加载，没有评论即刻报 `NoContent`
pub async fn analyze_document_from_data(
    data: &[u8],
    options: &GuardOptions,
) -> DetectionResult<(AnalysisResult, Vec<u8>)> {
    let encoding = options.encoding.clone().unwrap_or_else(|| "utf-8".to_string());
    let dom: RcDom = html_to_dom(data, encoding.clone());

    let mut extractor = CommentExtractor::new(ExtractorConfig::default());
    let comments = extractor.extract(&dom.document);
    if comments.is_empty() {
        return Err(DetectionError::NoContent("No comments found.".to_string()));
    }

    if !options.silent {
        tracing::info!("提取到 {} 条评论，开始分类", comments.len());
    }

    let classifier = ClassifierClient::new(options.classifier_config())?;
    let result = classifier.classify(&comments).await?;

    if !options.no_highlight {
        let mut renderer = HighlightRenderer::new(RendererConfig::default());
        renderer.apply(&dom, &result.predictions);
    }

    let html = serialize_document(&dom, encoding);
    Ok((result, html))
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
