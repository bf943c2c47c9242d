//! 面板控制器状态机
//!
//! `Initial → Loading → {Results | Error}`，以及 `Results → Initial`
//! （显式重置）和 `Results/Error → Loading`（重新运行/重试）。
//! 任一时刻只有一个状态可见；可见集合总是整体重新计算，
//! 不依赖对前一状态的任何假设

use regex::Regex;

use crate::detection::classifier::ClassifierClient;
use crate::detection::error::{DetectionError, DetectionResult};
use crate::detection::types::{AnalysisResult, Prediction};
use crate::panel::host::{TabHost, TabId};
use crate::panel::report::{render_report, ProportionSummary};

/// 观看页地址模式：不匹配则立即报"页面错误"，不发起任何网络调用
pub const WATCH_PAGE_PATTERN: &str = r"youtube\.com/watch";

/// 面板配置
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// 观看页地址匹配模式
    pub watch_page_pattern: Regex,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            watch_page_pattern: Regex::new(WATCH_PAGE_PATTERN).unwrap(),
        }
    }
}

/// 面板状态
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Initial,
    Loading { label: String },
    Results,
    Error { message: String },
}

/// 结果列表的类别过滤
///
/// 过滤只改变展示子集；存储的判定集与聚合计数永远不受影响
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Harassment,
    Safe,
}

impl CategoryFilter {
    /// 判断某条结果是否属于当前类别
    pub fn matches(&self, prediction: &Prediction) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Harassment => prediction.is_harassment,
            CategoryFilter::Safe => !prediction.is_harassment,
        }
    }
}

/// 类别计数（始终来自完整结果集）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryCounts {
    pub all: usize,
    pub harassment: usize,
    pub safe: usize,
}

/// 四个面板区块的可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVisibility {
    pub initial: bool,
    pub loading: bool,
    pub error: bool,
    pub results: bool,
}

/// 瞬态提示，不构成状态转移
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub is_error: bool,
}

/// 面板控制器
pub struct PanelController<H: TabHost> {
    host: H,
    classifier: ClassifierClient,
    config: PanelConfig,
    state: PanelState,
    filter: CategoryFilter,
    analysis: Option<AnalysisResult>,
    result_tab: Option<TabId>,
}

impl<H: TabHost> PanelController<H> {
    /// 创建新的面板控制器（初始状态 `Initial`）
    pub fn new(host: H, classifier: ClassifierClient, config: PanelConfig) -> Self {
        Self {
            host,
            classifier,
            config,
            state: PanelState::Initial,
            filter: CategoryFilter::default(),
            analysis: None,
            result_tab: None,
        }
    }

    /// 当前状态
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// 完整可见集：进入任何状态都显式决定全部四个区块
    pub fn visibility(&self) -> PanelVisibility {
        PanelVisibility {
            initial: matches!(self.state, PanelState::Initial),
            loading: matches!(self.state, PanelState::Loading { .. }),
            error: matches!(self.state, PanelState::Error { .. }),
            results: matches!(self.state, PanelState::Results),
        }
    }

    /// 当前存储的分析结果
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    /// 当前类别过滤
    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    /// 加载阶段的进度文案
    pub fn loading_label(&self) -> Option<&str> {
        match &self.state {
            PanelState::Loading { label } => Some(label),
            _ => None,
        }
    }

    /// 错误状态的消息（原样展示）
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            PanelState::Error { message } => Some(message),
            _ => None,
        }
    }

    /// 启动一次完整分析
    ///
    /// `Loading` 期间的重复触发被忽略：同一面板实例绝不允许两个
    /// 分类请求同时在途，两套结果也绝不可能交错进同一个状态
    pub async fn start_analysis(&mut self) {
        if matches!(self.state, PanelState::Loading { .. }) {
            tracing::debug!("分析正在进行中，忽略重复触发");
            return;
        }

        self.enter_loading("Checking the watch page...");

        match self.run_pipeline().await {
            Ok((tab, result)) => {
                tracing::info!(
                    "分析完成: {} 条评论，标记 {} 条 ({:.1}%)",
                    result.statistics.total_comments,
                    result.statistics.harassment_detected,
                    result.statistics.harassment_percentage
                );
                self.analysis = Some(result);
                self.result_tab = Some(tab);
                self.state = PanelState::Results;
            }
            Err(e) => {
                tracing::warn!("分析失败: {}", e);
                self.state = PanelState::Error {
                    message: e.to_string(),
                };
            }
        }
    }

    /// 重试：重新进入 `Loading`，从提取阶段整体重跑
    pub async fn retry(&mut self) {
        self.start_analysis().await;
    }

    /// 显式重置：销毁结果，回到 `Initial`
    pub fn reset(&mut self) {
        self.analysis = None;
        self.result_tab = None;
        self.state = PanelState::Initial;
    }

    /// 切换类别过滤：只重渲染既有结果，不重新请求
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    /// 按当前过滤返回展示子集
    pub fn visible_predictions(&self) -> Vec<&Prediction> {
        match &self.analysis {
            Some(result) => result
                .predictions
                .iter()
                .filter(|p| self.filter.matches(p))
                .collect(),
            None => Vec::new(),
        }
    }

    /// 类别计数，永远从未过滤的完整集合计算
    pub fn counts(&self) -> CategoryCounts {
        match &self.analysis {
            Some(result) => {
                let flagged = result.statistics.harassment_detected;
                CategoryCounts {
                    all: result.statistics.total_comments,
                    harassment: flagged,
                    safe: result.statistics.safe_count(),
                }
            }
            None => CategoryCounts::default(),
        }
    }

    /// 比例摘要（用于结果状态的图形化展示）
    pub fn summary(&self) -> Option<ProportionSummary> {
        self.analysis
            .as_ref()
            .map(|result| ProportionSummary::from_statistics(&result.statistics))
    }

    /// 导出完整结果（非过滤视图）为固定模板的纯文本报告
    ///
    /// 导出机制本身的失败以瞬态提示上报，不发生状态转移
    pub fn export_report(&self) -> Result<String, Toast> {
        match &self.analysis {
            Some(result) => Ok(render_report(result)),
            None => Err(Toast {
                message: "No data to copy".to_string(),
                is_error: true,
            }),
        }
    }

    /// 将存储的判定结果回写到产生它的标签页
    pub async fn highlight_on_page(&mut self) -> DetectionResult<()> {
        let tab = self.result_tab.ok_or_else(|| {
            DetectionError::Injection("No analyzed tab to highlight".to_string())
        })?;
        let predictions = match &self.analysis {
            Some(result) => result.predictions.clone(),
            None => return Ok(()),
        };

        self.host.highlight_comments(tab, &predictions).await
    }

    /// 撤销产生当前结果的标签页上的标记
    pub async fn clear_page_highlights(&mut self) -> DetectionResult<()> {
        match self.result_tab {
            Some(tab) => self.host.clear_highlights(tab).await,
            None => Ok(()),
        }
    }

    /// 面板打开时的可用性探测（非致命，仅供展示）
    pub async fn check_api_health(&self) -> bool {
        self.classifier.health().await
    }

    /// 借出宿主
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// 取回宿主
    pub fn into_host(self) -> H {
        self.host
    }

    async fn run_pipeline(&mut self) -> DetectionResult<(TabId, AnalysisResult)> {
        // 前置条件依次检查，任何一条失败都中止整次运行
        let tab = self
            .host
            .active_tab()
            .ok_or_else(|| DetectionError::WrongPage("Open a video watch page.".to_string()))?;

        if !self.config.watch_page_pattern.is_match(&tab.url) {
            return Err(DetectionError::WrongPage(
                "Open a video watch page.".to_string(),
            ));
        }

        self.enter_loading("Extracting comments...");
        let comments = self.host.extract_comments(tab.id).await?;
        if comments.is_empty() {
            return Err(DetectionError::NoContent("No comments found.".to_string()));
        }

        let plural = if comments.len() > 1 { "s" } else { "" };
        self.enter_loading(&format!("Analyzing {} comment{}...", comments.len(), plural));
        let result = self.classifier.classify(&comments).await?;

        Ok((tab.id, result))
    }

    fn enter_loading(&mut self, label: &str) {
        self.state = PanelState::Loading {
            label: label.to_string(),
        };
    }
}
