//! 分类客户端模块
//!
//! 与远程分类API的全部交互：批量判定与健康探测
//!
//! 两个判定端点对应两条调用路径：弹窗直连 `/predict`，
//! 协调器中继使用 `/predict_batch`。语义相同，均为单次整批请求

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detection::error::{DetectionError, DetectionResult};
use crate::detection::types::{AnalysisResult, Prediction, Statistics};

/// 默认API地址
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// 分类请求的客户端超时（秒），低于任何服务端处理上限
pub const CLASSIFY_TIMEOUT_SECS: u64 = 30;

/// 健康探测超时（秒），比分类超时更短
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// 分类客户端配置
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// API 基地址，不含尾部斜杠
    pub api_url: String,
    /// 分类请求的中止期限
    pub classify_timeout: Duration,
    /// 健康探测的中止期限
    pub health_timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            classify_timeout: Duration::from_secs(CLASSIFY_TIMEOUT_SECS),
            health_timeout: Duration::from_secs(HEALTH_TIMEOUT_SECS),
        }
    }
}

/// 请求体：一次提交整批评论
#[derive(Debug, Serialize)]
struct CommentBatch<'a> {
    comments: &'a [String],
}

/// 未经结构校验的原始响应
#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    predictions: Option<Vec<Prediction>>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

/// 非2xx响应可能携带的结构化错误负载
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    detail: Option<String>,
}

/// 分类客户端
///
/// 除网络调用外无副作用；给定输入与远端响应，行为是纯函数式的
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    config: ClassifierConfig,
}

impl ClassifierClient {
    /// 创建新的分类客户端
    pub fn new(config: ClassifierConfig) -> DetectionResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DetectionError::Transport(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// 使用默认配置创建客户端
    pub fn create_default() -> DetectionResult<Self> {
        Self::new(ClassifierConfig::default())
    }

    /// 获取配置
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// 分类整批评论（弹窗路径，`POST /predict`）
    pub async fn classify(&self, comments: &[String]) -> DetectionResult<AnalysisResult> {
        self.submit("/predict", comments).await
    }

    /// 分类整批评论（协调器路径，`POST /predict_batch`）
    pub async fn classify_batch(&self, comments: &[String]) -> DetectionResult<AnalysisResult> {
        self.submit("/predict_batch", comments).await
    }

    /// 健康探测：`GET /health`
    ///
    /// 为轮询方便只返回可达性布尔值，从不向调用方抛错
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.config.api_url);

        match self
            .http
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("健康探测失败: {}", e);
                false
            }
        }
    }

    async fn submit(&self, endpoint: &str, comments: &[String]) -> DetectionResult<AnalysisResult> {
        let url = format!("{}{}", self.config.api_url, endpoint);

        tracing::debug!("提交 {} 条评论到 {}", comments.len(), url);

        let response = self
            .http
            .post(&url)
            .json(&CommentBatch { comments })
            .timeout(self.config.classify_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DetectionError::Transport(format!(
                        "timeout: no response within {}s",
                        self.config.classify_timeout.as_secs()
                    ))
                } else {
                    DetectionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // 优先透传服务端的结构化错误详情
            let detail = response
                .json::<ErrorPayload>()
                .await
                .ok()
                .and_then(|payload| payload.detail);

            return Err(DetectionError::Transport(detail.unwrap_or_else(|| {
                format!("API error: status {}", status.as_u16())
            })));
        }

        let raw: RawResponse = response.json().await.map_err(|e| {
            DetectionError::Protocol(format!("Invalid response format: {}", e))
        })?;

        validate_response(comments.len(), raw)
    }
}

/// 结构校验：两个键都必须存在，且预测数量与提交数量一致
fn validate_response(submitted: usize, raw: RawResponse) -> DetectionResult<AnalysisResult> {
    let (predictions, statistics) = match (raw.predictions, raw.statistics) {
        (Some(p), Some(s)) => (p, s),
        _ => {
            return Err(DetectionError::Protocol(
                "Invalid response format: missing predictions or statistics".to_string(),
            ))
        }
    };

    if predictions.len() != submitted {
        return Err(DetectionError::Protocol(format!(
            "Prediction count mismatch: submitted {}, received {}",
            submitted,
            predictions.len()
        )));
    }

    if statistics.harassment_percentage < 0.0 || statistics.harassment_percentage > 100.0 {
        return Err(DetectionError::Protocol(format!(
            "Invalid response format: harassment_percentage {} out of range",
            statistics.harassment_percentage
        )));
    }

    Ok(AnalysisResult {
        predictions,
        statistics,
    })
}
