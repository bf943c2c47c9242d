//! 面板与浏览器环境之间的能力接口
//!
//! 面板控制器不直接触碰任何标签页；查询活动标签、注入提取脚本、
//! 驱动内容端渲染器都通过这个接口完成。协调器是默认实现，
//! 测试中可以用内存页面替代

use crate::detection::error::DetectionResult;
use crate::detection::types::Prediction;

/// 标签页标识
pub type TabId = u32;

/// 活动标签页信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
}

/// 标签页宿主能力
///
/// 注入本身的失败（标签页已关闭、无权限页面）以 `Injection` 错误
/// 上报，与"没有找到评论"严格区分。
/// 整个模型是单线程协作式的，接口不要求 Send
#[allow(async_fn_in_trait)]
pub trait TabHost {
    /// 当前活动标签页，没有则返回 None
    fn active_tab(&self) -> Option<TabInfo>;

    /// 在目标标签页中执行评论提取并取回结果
    async fn extract_comments(&mut self, tab: TabId) -> DetectionResult<Vec<String>>;

    /// 将判定结果发送到目标标签页做视觉标记
    async fn highlight_comments(
        &mut self,
        tab: TabId,
        predictions: &[Prediction],
    ) -> DetectionResult<()>;

    /// 撤销目标标签页上的全部标记
    async fn clear_highlights(&mut self, tab: TabId) -> DetectionResult<()>;
}
