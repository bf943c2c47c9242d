//! 协调器模块
//!
//! 常驻的消息中枢：代理整批分类、维护设置与每标签页徽章、
//! 触发高占比通知、驱动各标签页的内容上下文
//!
//! # 模块组织
//!
//! - `messages` - 请求/回复协议（action 区分，统一信封）
//! - `settings` - 设置存储（默认补齐、按键合并）
//! - `health` - 分类服务的后台健康轮询
//! - `content` - 每标签页的页面DOM上下文

pub mod content;
pub mod health;
pub mod messages;
pub mod settings;

use std::collections::HashMap;

use serde_json::json;

use crate::detection::classifier::ClassifierClient;
use crate::detection::error::{DetectionError, DetectionResult};
use crate::detection::types::{AnalysisResult, Prediction, Statistics};
use crate::panel::host::{TabHost, TabId, TabInfo};

pub use content::ContentContext;
pub use health::{HealthMonitor, HealthMonitorConfig, HEALTH_POLL_PERIOD_SECS};
pub use messages::{Reply, Request};
pub use settings::{Settings, SettingsStore, Theme};

/// 触发通知的标记占比阈值（百分比，严格大于）
pub const NOTIFY_THRESHOLD_PERCENT: f64 = 20.0;

/// 徽章背景色（有标记时）
pub const BADGE_COLOR: &str = "#f56565";

/// 一条待展示的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// 通知的投递出口
///
/// 协调器只决定"何时通知"，投递方式由实现决定
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// 默认出口：写入日志
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&mut self, notification: Notification) {
        tracing::info!("{}: {}", notification.title, notification.message);
    }
}

/// 单个标签页的徽章状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeState {
    /// 展示文本，空串表示隐藏
    pub text: String,
    /// 背景色，仅在有文本时设置
    pub color: Option<&'static str>,
}

impl BadgeState {
    fn from_count(count: usize) -> Self {
        if count > 0 {
            Self {
                text: count.to_string(),
                color: Some(BADGE_COLOR),
            }
        } else {
            Self {
                text: String::new(),
                color: None,
            }
        }
    }
}

/// 消息协调器
pub struct Coordinator {
    classifier: ClassifierClient,
    settings: SettingsStore,
    tabs: HashMap<TabId, ContentContext>,
    badges: HashMap<TabId, BadgeState>,
    notifier: Box<dyn NotificationSink>,
    active_tab: Option<TabId>,
}

impl Coordinator {
    /// 创建协调器，通知写入日志
    pub fn new(classifier: ClassifierClient) -> Self {
        Self::with_notifier(classifier, Box::new(LogNotifier))
    }

    /// 创建协调器并指定通知出口
    pub fn with_notifier(classifier: ClassifierClient, notifier: Box<dyn NotificationSink>) -> Self {
        Self {
            classifier,
            settings: SettingsStore::new(),
            tabs: HashMap::new(),
            badges: HashMap::new(),
            notifier,
            active_tab: None,
        }
    }

    /// 注册标签页并使其成为活动标签
    pub fn register_tab(&mut self, tab: TabId, url: impl Into<String>, html: &[u8]) {
        let ctx = ContentContext::from_html(url, html);
        self.tabs.insert(tab, ctx);
        self.active_tab = Some(tab);
    }

    /// 切换活动标签页
    pub fn set_active_tab(&mut self, tab: Option<TabId>) {
        self.active_tab = tab;
    }

    /// 标签页完成导航：徽章归零
    pub fn on_navigation(&mut self, tab: TabId) {
        self.badges.insert(tab, BadgeState::from_count(0));
    }

    /// 某标签页当前的徽章状态
    pub fn badge(&self, tab: TabId) -> Option<&BadgeState> {
        self.badges.get(&tab)
    }

    /// 设置存储
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// 某标签页的内容上下文
    pub fn context(&self, tab: TabId) -> Option<&ContentContext> {
        self.tabs.get(&tab)
    }

    /// 某标签页的内容上下文（可变）
    pub fn context_mut(&mut self, tab: TabId) -> Option<&mut ContentContext> {
        self.tabs.get_mut(&tab)
    }

    /// 处理一条请求，总是产生一条回复
    pub async fn dispatch(&mut self, request: Request) -> Reply {
        match request {
            Request::AnalyzeComments { comments, tab_id } => {
                match self.handle_analysis(&comments, tab_id).await {
                    Ok(result) => match serde_json::to_value(&result) {
                        Ok(data) => Reply::ok(data),
                        Err(e) => Reply::err(e.to_string()),
                    },
                    Err(e) => Reply::err(e.to_string()),
                }
            }
            Request::CheckApiHealth => {
                if self.classifier.health().await {
                    Reply::ok(json!({ "status": "healthy" }))
                } else {
                    Reply::err(format!(
                        "Cannot connect to API. Make sure the server is running on {}",
                        self.classifier.config().api_url
                    ))
                }
            }
            Request::GetSettings => match serde_json::to_value(self.settings.get_all()) {
                Ok(data) => Reply::ok(data),
                Err(e) => Reply::err(e.to_string()),
            },
            Request::UpdateSettings { settings } => match self.settings.merge_set(&settings) {
                Ok(()) => Reply::ok_empty(),
                Err(e) => Reply::err(e),
            },
            Request::ExtractComments { tab_id } => {
                let ctx = match self.require_tab(tab_id) {
                    Ok(ctx) => ctx,
                    Err(e) => return Reply::err(e.to_string()),
                };
                match ctx.extract_when_ready().await {
                    Ok(comments) => Reply::ok(json!(comments)),
                    Err(e) => Reply::err(e.to_string()),
                }
            }
            Request::HighlightComments {
                tab_id,
                predictions,
            } => match self.require_tab(tab_id) {
                Ok(ctx) => {
                    ctx.highlight(&predictions);
                    Reply::ok_empty()
                }
                Err(e) => Reply::err(e.to_string()),
            },
            Request::ClearHighlights { tab_id } => match self.require_tab(tab_id) {
                Ok(ctx) => {
                    ctx.clear_highlights();
                    Reply::ok_empty()
                }
                Err(e) => Reply::err(e.to_string()),
            },
        }
    }

    /// 整批分类并执行后置策略：通知、自动高亮、徽章
    async fn handle_analysis(
        &mut self,
        comments: &[String],
        tab_id: Option<TabId>,
    ) -> DetectionResult<AnalysisResult> {
        let result = self.classifier.classify_batch(comments).await?;

        tracing::info!(
            "批量分析完成: {} 条评论，标记 {} 条 ({:.1}%)",
            result.statistics.total_comments,
            result.statistics.harassment_detected,
            result.statistics.harassment_percentage
        );

        let settings = self.settings.get_all();

        if let Some(notification) = notification_for(&result.statistics, &settings) {
            self.notifier.notify(notification);
        }

        if let Some(tab) = tab_id {
            if settings.auto_highlight {
                if let Some(ctx) = self.tabs.get_mut(&tab) {
                    ctx.highlight(&result.predictions);
                }
            }
            self.badges.insert(
                tab,
                BadgeState::from_count(result.statistics.harassment_detected),
            );
        }

        Ok(result)
    }

    fn require_tab(&mut self, tab: TabId) -> DetectionResult<&mut ContentContext> {
        self.tabs
            .get_mut(&tab)
            .ok_or_else(|| DetectionError::Injection(format!("No registered tab {}", tab)))
    }
}

/// 通知策略：仅当通知开启且标记占比严格超过阈值
fn notification_for(stats: &Statistics, settings: &Settings) -> Option<Notification> {
    if !settings.notifications_enabled {
        return None;
    }
    if stats.harassment_percentage <= NOTIFY_THRESHOLD_PERCENT {
        return None;
    }

    Some(Notification {
        title: "⚠️ Harassment detected".to_string(),
        message: format!(
            "{} harassment comments detected ({:.1}%)",
            stats.harassment_detected, stats.harassment_percentage
        ),
    })
}

impl TabHost for Coordinator {
    fn active_tab(&self) -> Option<TabInfo> {
        let id = self.active_tab?;
        let ctx = self.tabs.get(&id)?;
        Some(TabInfo {
            id,
            url: ctx.url().to_string(),
        })
    }

    async fn extract_comments(&mut self, tab: TabId) -> DetectionResult<Vec<String>> {
        self.require_tab(tab)?.extract_when_ready().await
    }

    async fn highlight_comments(
        &mut self,
        tab: TabId,
        predictions: &[Prediction],
    ) -> DetectionResult<()> {
        self.require_tab(tab)?.highlight(predictions);
        Ok(())
    }

    async fn clear_highlights(&mut self, tab: TabId) -> DetectionResult<()> {
        self.require_tab(tab)?.clear_highlights();
        Ok(())
    }
}
