//! 页面解析模块
//!
//! 提供HTML文档的解析、节点查询和序列化功能
//!
//! # 模块组织
//!
//! - `html` - DOM解析、节点操作、序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::*;
