//! 协调器消息协议
//!
//! 请求以 `action` 字段区分，回复统一为 `{success, data|error}` 信封。
//! 未知 action 在反序列化阶段即被拒绝

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::detection::types::Prediction;
use crate::panel::host::TabId;

/// 发往协调器的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    /// 整批分类评论，附带来源标签页时更新其徽章
    AnalyzeComments {
        comments: Vec<String>,
        #[serde(default)]
        tab_id: Option<TabId>,
    },
    /// 探测分类服务可达性
    #[serde(rename = "checkAPIHealth")]
    CheckApiHealth,
    /// 读取全部设置（缺失键以默认值补齐）
    GetSettings,
    /// 合并写入设置
    UpdateSettings { settings: Value },
    /// 在目标标签页提取评论
    ExtractComments { tab_id: TabId },
    /// 在目标标签页应用视觉标记
    HighlightComments {
        tab_id: TabId,
        predictions: Vec<Prediction>,
    },
    /// 撤销目标标签页的全部标记
    ClearHighlights { tab_id: TabId },
}

/// 协调器的统一回复信封
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    /// 成功回复，携带数据
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// 成功回复，无数据
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// 失败回复
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags_round_trip() {
        let request: Request =
            serde_json::from_str(r#"{"action":"checkAPIHealth"}"#).unwrap();
        assert!(matches!(request, Request::CheckApiHealth));

        let request: Request = serde_json::from_str(
            r#"{"action":"analyzeComments","comments":["hi"],"tabId":7}"#,
        )
        .unwrap();
        match request {
            Request::AnalyzeComments { comments, tab_id } => {
                assert_eq!(comments, vec!["hi".to_string()]);
                assert_eq!(tab_id, Some(7));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<Request, _> =
            serde_json::from_str(r#"{"action":"selfDestruct"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_envelope_shape() {
        let json = serde_json::to_value(Reply::ok(serde_json::json!({"n": 1}))).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["n"], 1);
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(Reply::err("boom")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
