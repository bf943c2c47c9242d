// 集成测试公共模块
//
// 提供测试页面构造、模拟API响应与内存标签页宿主

use std::time::Duration;

use serde_json::{json, Value};

use commentguard::detection::classifier::{ClassifierClient, ClassifierConfig};
use commentguard::detection::error::{DetectionError, DetectionResult};
use commentguard::detection::types::Prediction;
use commentguard::panel::host::{TabHost, TabId, TabInfo};

/// 构造一个含指定评论的观看页HTML
pub fn watch_page_html(comments: &[&str]) -> String {
    let mut html = String::from("<html><body><div id=\"comments\">");
    for comment in comments {
        html.push_str(&format!(
            "<ytd-comment-renderer>\
               <div id=\"header\"><span>author</span></div>\
               <span id=\"content-text\">{}</span>\
             </ytd-comment-renderer>",
            comment
        ));
    }
    html.push_str("</div></body></html>");
    html
}

/// 构造分类API的成功响应体，flags 与 comments 按位置对应
pub fn analysis_json(comments: &[&str], flags: &[bool]) -> Value {
    assert_eq!(comments.len(), flags.len());

    let predictions: Vec<Value> = comments
        .iter()
        .zip(flags.iter())
        .map(|(comment, flagged)| {
            json!({
                "comment": comment,
                "is_harassment": flagged,
                "confidence": 0.9,
            })
        })
        .collect();

    let total = comments.len();
    let detected = flags.iter().filter(|f| **f).count();
    let percentage = if total > 0 {
        detected as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    json!({
        "predictions": predictions,
        "statistics": {
            "total_comments": total,
            "harassment_detected": detected,
            "harassment_percentage": percentage,
        }
    })
}

/// 指向模拟服务器的分类客户端（超时压短，测试不等真实期限）
pub fn classifier_for(server_uri: &str) -> ClassifierClient {
    ClassifierClient::new(ClassifierConfig {
        api_url: server_uri.trim_end_matches('/').to_string(),
        classify_timeout: Duration::from_millis(500),
        health_timeout: Duration::from_millis(500),
    })
    .expect("client should build")
}

/// 内存标签页宿主
///
/// 预置地址与评论，记录高亮/清除调用供断言
pub struct StaticHost {
    pub tab: Option<TabInfo>,
    pub comments: Vec<String>,
    pub extract_error: Option<DetectionError>,
    pub highlighted: Vec<Vec<Prediction>>,
    pub clear_calls: usize,
}

impl StaticHost {
    pub fn on_watch_page(comments: &[&str]) -> Self {
        Self::at_url("https://www.youtube.com/watch?v=abc123", comments)
    }

    pub fn at_url(url: &str, comments: &[&str]) -> Self {
        Self {
            tab: Some(TabInfo {
                id: 1,
                url: url.to_string(),
            }),
            comments: comments.iter().map(|c| c.to_string()).collect(),
            extract_error: None,
            highlighted: Vec::new(),
            clear_calls: 0,
        }
    }

    pub fn without_tab() -> Self {
        Self {
            tab: None,
            comments: Vec::new(),
            extract_error: None,
            highlighted: Vec::new(),
            clear_calls: 0,
        }
    }
}

impl TabHost for StaticHost {
    fn active_tab(&self) -> Option<TabInfo> {
        self.tab.clone()
    }

    async fn extract_comments(&mut self, _tab: TabId) -> DetectionResult<Vec<String>> {
        if let Some(err) = self.extract_error.clone() {
            return Err(err);
        }
        Ok(self.comments.clone())
    }

    async fn highlight_comments(
        &mut self,
        _tab: TabId,
        predictions: &[Prediction],
    ) -> DetectionResult<()> {
        self.highlighted.push(predictions.to_vec());
        Ok(())
    }

    async fn clear_highlights(&mut self, _tab: TabId) -> DetectionResult<()> {
        self.clear_calls += 1;
        Ok(())
    }
}
