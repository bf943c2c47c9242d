//! 设置存储
//!
//! 读取时缺失键以默认值补齐，写入时按键合并，未提及的键保持不变

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 界面主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// 用户设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub auto_highlight: bool,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            auto_highlight: true,
            notifications_enabled: true,
        }
    }
}

/// 键值设置存储
///
/// 底层按独立键存放，容忍部分写入；结构化视图在读取时拼装
#[derive(Debug, Default)]
pub struct SettingsStore {
    entries: HashMap<String, Value>,
}

impl SettingsStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取全部设置，缺失键以默认值补齐
    pub fn get_all(&self) -> Settings {
        let defaults = serde_json::to_value(Settings::default())
            .unwrap_or(Value::Null);
        let mut merged = match defaults {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        for (key, value) in &self.entries {
            merged.insert(key.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }

    /// 按键合并写入；非对象负载是协议错误
    pub fn merge_set(&mut self, patch: &Value) -> Result<(), String> {
        let map = patch
            .as_object()
            .ok_or_else(|| "settings payload must be an object".to_string())?;

        for (key, value) in map {
            self.entries.insert(key.clone(), value.clone());
        }

        tracing::debug!("设置已更新: {} 个键", map.len());
        Ok(())
    }
}
