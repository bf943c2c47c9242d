//! # CommentGuard Library
//!
//! 视频观看页评论的网络霸凌检测工具库：提取页面评论、整批提交
//! 远程分类API、把判定结果回写为页面视觉标记。
//!
//! ## 模块组织
//!
//! - `core` - 核心功能和一站式分析入口
//! - `detection` - 检测管道（提取、分类、对账、渲染）
//! - `panel` - 结果展示面板的状态机与报告导出
//! - `coordinator` - 常驻消息中枢（设置、徽章、通知、健康轮询）
//! - `parsers` - HTML解析与DOM操作
//! - `env` - 环境变量管理

pub mod coordinator;
pub mod core;
pub mod detection;
pub mod env;
pub mod panel;
pub mod parsers;

// Re-export commonly used items for convenience
pub use self::core::*;
pub use detection::*;
pub use panel::*;
