//! 面板模块
//!
//! 结果展示面板：状态机控制器、宿主能力接口、报告导出
//!
//! # 模块组织
//!
//! - `controller` - 面板状态机（Initial/Loading/Results/Error）与分析编排
//! - `host` - 面板与标签页环境之间的能力接口
//! - `report` - 纯文本报告与比例摘要

pub mod controller;
pub mod host;
pub mod report;

// 重新导出主要类型
pub use controller::{
    CategoryCounts, CategoryFilter, PanelConfig, PanelController, PanelState, PanelVisibility,
    Toast,
};
pub use host::{TabHost, TabId, TabInfo};
pub use report::{render_report, ProportionSummary};
