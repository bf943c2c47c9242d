//! 结果渲染器模块
//!
//! 将判定结果按位置回写到页面DOM：第 i 条预测对应第 i 个选择器匹配元素。
//! 位置对应是提取与渲染之间唯一的正确性关联，页面若在两者之间改动评论
//! 列表，映射会静默错位。这是已知风险，未引入稳定标识符
//!
//! 快照先行、恢复即清除：首次触碰某容器时把它原有的内联样式存入快照
//! 属性，`clear` 时逐字节恢复。这是渲染器对共享DOM仅有的保护手段

use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};

use crate::detection::extractor::COMMENT_SELECTOR_ID;
use crate::detection::types::Prediction;
use crate::parsers::html::{
    append_child, append_text_child, create_styled_element, detach_node, find_elements_by_class,
    find_elements_by_id, find_elements_with_attr, get_ancestor_by_tag, get_child_node_by_id,
    get_node_attr, set_node_attr,
};

/// 标记评论的背景色
pub const HIGHLIGHT_HARASSMENT_BG: &str = "rgba(245,101,101,0.2)";
/// 正常评论的背景色
pub const HIGHLIGHT_SAFE_BG: &str = "rgba(72,187,120,0.1)";
/// 标记评论的左边框
pub const BORDER_HARASSMENT: &str = "4px solid #f56565";
/// 正常评论的左边框
pub const BORDER_SAFE: &str = "4px solid #48bb78";

/// 渲染器配置
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// 评论元素选择器 id（与提取器保持一致）
    pub selector_id: String,
    /// 评论容器的标签名（最近的该标签祖先）
    pub container_tag: String,
    /// 容器内徽章的挂载点 id，缺失时挂到容器本身
    pub header_id: String,
    /// 保存原始内联样式的快照属性
    pub snapshot_attr: String,
    /// 徽章元素的 class
    pub badge_class: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            selector_id: COMMENT_SELECTOR_ID.to_string(),
            container_tag: "ytd-comment-renderer".to_string(),
            header_id: "header".to_string(),
            snapshot_attr: "data-original-style".to_string(),
            badge_class: "cyberbully-badge".to_string(),
        }
    }
}

/// 高亮渲染器
///
/// 容器与判定结果的运行时关联由渲染器独占持有；
/// 关联存在即表示该元素当前带有视觉标记
pub struct HighlightRenderer {
    config: RendererConfig,
    analyzed: Vec<(Handle, Prediction)>,
}

impl HighlightRenderer {
    /// 创建新的渲染器
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            analyzed: Vec::new(),
        }
    }

    /// 按位置应用判定结果
    ///
    /// 预测数量多于页面元素时只处理前 N 条，不报错。
    /// 对同一元素重复应用不会叠加效果：样式总是从快照重新计算，
    /// 徽章先查找删除再追加
    pub fn apply(&mut self, dom: &RcDom, predictions: &[Prediction]) {
        let elements = find_elements_by_id(&dom.document, &self.config.selector_id);

        let rendered = predictions.len().min(elements.len());
        tracing::debug!(
            "应用高亮: {} 条预测，页面 {} 个匹配元素",
            predictions.len(),
            elements.len()
        );

        for (element, prediction) in elements.iter().zip(predictions.iter()) {
            let container = match get_ancestor_by_tag(element, &self.config.container_tag) {
                Some(container) => container,
                None => continue,
            };

            // 首次触碰时快照原有内联样式，区分"没有属性"与"空属性"
            if get_node_attr(&container, &self.config.snapshot_attr).is_none() {
                let original = get_node_attr(&container, "style");
                set_node_attr(
                    &container,
                    &self.config.snapshot_attr,
                    Some(encode_style_snapshot(original.as_deref())),
                );
            }

            let snapshot =
                get_node_attr(&container, &self.config.snapshot_attr).unwrap_or_default();
            let base = decode_style_snapshot(&snapshot).unwrap_or_default();
            set_node_attr(
                &container,
                "style",
                Some(compose_highlight_style(base, prediction.is_harassment)),
            );

            self.attach_badge(dom, &container, prediction);
            self.record(container, prediction.clone());
        }

        if rendered < predictions.len() {
            tracing::warn!("{} 条预测没有对应的页面元素，已忽略", predictions.len() - rendered);
        }
    }

    /// 撤销全部视觉标记
    ///
    /// 幂等：没有先行 `apply` 时是空操作
    pub fn clear(&mut self, dom: &RcDom) {
        for badge in find_elements_by_class(&dom.document, &self.config.badge_class) {
            detach_node(&badge);
        }

        for container in find_elements_with_attr(&dom.document, &self.config.snapshot_attr) {
            let saved = get_node_attr(&container, &self.config.snapshot_attr).unwrap_or_default();
            set_node_attr(
                &container,
                "style",
                decode_style_snapshot(&saved).map(str::to_string),
            );
            set_node_attr(&container, &self.config.snapshot_attr, None);
        }

        self.analyzed.clear();
    }

    /// 当前带标记的容器数量
    pub fn analyzed_count(&self) -> usize {
        self.analyzed.len()
    }

    /// 查询某容器当前渲染的判定结果
    pub fn prediction_for(&self, container: &Handle) -> Option<&Prediction> {
        self.analyzed
            .iter()
            .find(|(handle, _)| Rc::ptr_eq(handle, container))
            .map(|(_, prediction)| prediction)
    }

    fn attach_badge(&self, dom: &RcDom, container: &Handle, prediction: &Prediction) {
        // 先删后加，保证每个容器最多一个徽章
        for old in find_elements_by_class(container, &self.config.badge_class) {
            detach_node(&old);
        }

        let badge = create_styled_element(
            dom,
            "div",
            &[
                ("class", self.config.badge_class.as_str()),
                ("style", badge_style(prediction.is_harassment).as_str()),
            ],
        );
        append_text_child(&badge, &badge_label(prediction));

        let target = get_child_node_by_id(container, &self.config.header_id)
            .unwrap_or_else(|| container.clone());
        append_child(&target, &badge);
    }

    fn record(&mut self, container: Handle, prediction: Prediction) {
        if let Some(entry) = self
            .analyzed
            .iter_mut()
            .find(|(handle, _)| Rc::ptr_eq(handle, &container))
        {
            entry.1 = prediction;
        } else {
            self.analyzed.push((container, prediction));
        }
    }
}

impl Default for HighlightRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

/// 把原有 `style` 编码进快照属性值
///
/// 属性缺失与空属性必须可区分：缺失编码为空串，存在的值前置一个
/// 分号（分号不会出现在合法样式声明的开头，解码无歧义）
fn encode_style_snapshot(original: Option<&str>) -> String {
    match original {
        Some(value) => format!(";{}", value),
        None => String::new(),
    }
}

/// 解码快照值：`None` 表示原元素没有 `style` 属性
fn decode_style_snapshot(snapshot: &str) -> Option<&str> {
    snapshot.strip_prefix(';')
}

/// 从快照重建容器样式并附加判定配色
fn compose_highlight_style(base: &str, is_harassment: bool) -> String {
    let (background, border) = if is_harassment {
        (HIGHLIGHT_HARASSMENT_BG, BORDER_HARASSMENT)
    } else {
        (HIGHLIGHT_SAFE_BG, BORDER_SAFE)
    };

    let mut style = base.trim().to_string();
    if !style.is_empty() && !style.ends_with(';') {
        style.push(';');
    }
    style.push_str(&format!(
        "background-color:{};border-left:{};padding-left:8px;\
         transition:background-color 0.3s ease, border-left 0.3s ease;",
        background, border
    ));

    style
}

fn badge_style(is_harassment: bool) -> String {
    let (background, color) = if is_harassment {
        ("rgba(245,101,101,0.1)", "#f56565")
    } else {
        ("rgba(72,187,120,0.1)", "#48bb78")
    };

    format!(
        "display:inline-flex;align-items:center;gap:4px;padding:4px 10px;\
         margin-left:8px;border-radius:12px;font-size:11px;font-weight:700;\
         background:{};color:{};",
        background, color
    )
}

fn badge_label(prediction: &Prediction) -> String {
    let (icon, label) = if prediction.is_harassment {
        ("⚠️", "Harassment detected")
    } else {
        ("✓", "Safe comment")
    };

    format!("{} {} ({:.0}%)", icon, label, prediction.confidence * 100.0)
}
