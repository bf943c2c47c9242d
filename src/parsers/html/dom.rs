use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, TendrilSink};
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};
use std::cell::RefCell;
use std::rc::Rc;

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: String) -> RcDom {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .unwrap()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点（不破坏树结构）
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    child.parent.set(weak);
    parent
}

/// 设置节点属性；`None` 表示删除该属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    let _ = &attrs_mut[i].value.clear();
                    let _ = &attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            // Add new attribute (since originally the target node didn't have it)
            if let Some(attr_value) = attr_value.clone() {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 按文档顺序收集 `id` 属性等于给定值的所有元素
///
/// 页面选择器语义：提取器和渲染器共用同一遍历顺序，
/// 两者之间的位置对应关系完全依赖于此
pub fn find_elements_by_id(node: &Handle, id: &str) -> Vec<Handle> {
    let mut found: Vec<Handle> = Vec::new();

    if let NodeData::Element { .. } = node.data {
        if get_node_attr(node, "id").as_deref() == Some(id) {
            found.push(node.clone());
        }
    }

    for child in node.children.borrow().iter() {
        found.append(&mut find_elements_by_id(child, id));
    }

    found
}

/// 收集 `class` 属性包含给定类名的所有元素（按文档顺序）
pub fn find_elements_by_class(node: &Handle, class_name: &str) -> Vec<Handle> {
    let mut found: Vec<Handle> = Vec::new();

    if let NodeData::Element { .. } = node.data {
        if let Some(classes) = get_node_attr(node, "class") {
            if classes.split_whitespace().any(|c| c == class_name) {
                found.push(node.clone());
            }
        }
    }

    for child in node.children.borrow().iter() {
        found.append(&mut find_elements_by_class(child, class_name));
    }

    found
}

/// 收集带有给定属性的所有元素（按文档顺序）
pub fn find_elements_with_attr(node: &Handle, attr_name: &str) -> Vec<Handle> {
    let mut found: Vec<Handle> = Vec::new();

    if let NodeData::Element { .. } = node.data {
        if get_node_attr(node, attr_name).is_some() {
            found.push(node.clone());
        }
    }

    for child in node.children.borrow().iter() {
        found.append(&mut find_elements_with_attr(child, attr_name));
    }

    found
}

/// 查找第一个 `id` 匹配的后代元素
pub fn get_child_node_by_id(parent: &Handle, id: &str) -> Option<Handle> {
    for child in parent.children.borrow().iter() {
        let mut matches = find_elements_by_id(child, id);
        if !matches.is_empty() {
            return Some(matches.remove(0));
        }
    }
    None
}

/// 沿父链向上查找最近的指定标签祖先
pub fn get_ancestor_by_tag(node: &Handle, tag_name: &str) -> Option<Handle> {
    let mut current = get_parent_node(node);

    while let Some(ancestor) = current {
        if get_node_name(&ancestor) == Some(tag_name) {
            return Some(ancestor);
        }
        current = get_parent_node(&ancestor);
    }

    None
}

/// 拼接节点所有后代文本（等价于 textContent）
pub fn text_content(node: &Handle) -> String {
    let mut result = String::new();
    collect_text(node, &mut result);
    result
}

fn collect_text(node: &Handle, out: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => {
            out.push_str(&contents.borrow());
        }
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

/// 创建带属性的新元素（未挂载到树上）
pub fn create_styled_element(dom: &RcDom, tag_name: &str, attributes: &[(&str, &str)]) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: format_tendril!("{}", value),
        })
        .collect();

    create_element(
        dom,
        QualName::new(None, ns!(), LocalName::from(tag_name)),
        attrs,
    )
}

/// 将子节点追加到父节点末尾
pub fn append_child(parent: &Handle, child: &Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// 追加文本子节点
pub fn append_text_child(parent: &Handle, text: &str) {
    let text_node: Handle = Node::new(NodeData::Text {
        contents: RefCell::new(format_tendril!("{}", text)),
    });
    append_child(parent, &text_node);
}

/// 从父节点中摘除节点
pub fn detach_node(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom_of(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8".to_string())
    }

    #[test]
    fn test_find_elements_by_id_document_order() {
        let dom = dom_of(
            "<body>\
             <div><span id=\"content-text\">first</span></div>\
             <p id=\"content-text\">second</p>\
             <span id=\"other\">no</span>\
             <span id=\"content-text\">third</span>\
             </body>",
        );

        let found = find_elements_by_id(&dom.document, "content-text");
        assert_eq!(found.len(), 3);

        let texts: Vec<String> = found.iter().map(|n| text_content(n)).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_text_content_joins_descendants() {
        let dom = dom_of("<div id=\"c\">hello <b>cruel</b> world</div>");
        let node = find_elements_by_id(&dom.document, "c").remove(0);
        assert_eq!(text_content(&node), "hello cruel world");
    }

    #[test]
    fn test_get_ancestor_by_tag() {
        let dom = dom_of(
            "<ytd-comment-renderer><div><span id=\"content-text\">hi</span></div></ytd-comment-renderer>",
        );
        let leaf = find_elements_by_id(&dom.document, "content-text").remove(0);

        let container = get_ancestor_by_tag(&leaf, "ytd-comment-renderer");
        assert!(container.is_some());
        assert_eq!(
            get_node_name(container.as_ref().unwrap()),
            Some("ytd-comment-renderer")
        );

        // 父链被完整保留，可重复遍历
        assert!(get_ancestor_by_tag(&leaf, "ytd-comment-renderer").is_some());
        assert!(get_ancestor_by_tag(&leaf, "article").is_none());
    }

    #[test]
    fn test_set_node_attr_roundtrip() {
        let dom = dom_of("<div id=\"c\" style=\"color:red;\">x</div>");
        let node = find_elements_by_id(&dom.document, "c").remove(0);

        assert_eq!(get_node_attr(&node, "style").as_deref(), Some("color:red;"));

        set_node_attr(&node, "style", Some("color:blue;".to_string()));
        assert_eq!(get_node_attr(&node, "style").as_deref(), Some("color:blue;"));

        set_node_attr(&node, "style", None);
        assert_eq!(get_node_attr(&node, "style"), None);
    }

    #[test]
    fn test_detach_node_removes_from_parent() {
        let dom = dom_of("<div id=\"parent\"><span id=\"child\">x</span></div>");
        let child = find_elements_by_id(&dom.document, "child").remove(0);

        detach_node(&child);
        assert!(find_elements_by_id(&dom.document, "child").is_empty());
    }
}
