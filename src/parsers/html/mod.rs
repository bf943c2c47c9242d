//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（解析、节点查询、属性读写）
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;

// 重新导出主要的公共 API
pub use dom::{
    append_child, append_text_child, create_styled_element, detach_node, find_elements_by_class,
    find_elements_by_id,
    find_elements_with_attr, get_ancestor_by_tag, get_child_node_by_id, get_node_attr,
    get_node_name, get_parent_node, html_to_dom, set_node_attr, text_content,
};
pub use serializer::serialize_document;
