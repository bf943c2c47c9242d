//! 统一的环境变量管理系统
//!
//! 类型安全、可验证的环境变量访问，所有变量集中定义

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::detection::classifier::ClassifierConfig;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Environment variable '{}': {}",
            self.variable, self.message
        )
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    /// 未设置时的默认值；None 表示必填
    fn default() -> Option<T> {
        None
    }

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::default().ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: "Required environment variable not set".to_string(),
            }),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;
    use crate::detection::classifier::{
        CLASSIFY_TIMEOUT_SECS, DEFAULT_API_URL, HEALTH_TIMEOUT_SECS,
    };
    use crate::coordinator::health::HEALTH_POLL_PERIOD_SECS;

    /// 分类API基地址
    pub struct ApiUrl;
    impl EnvVar<String> for ApiUrl {
        const NAME: &'static str = "COMMENTGUARD_API_URL";
        const DESCRIPTION: &'static str = "Base URL of the classification API";

        fn default() -> Option<String> {
            Some(DEFAULT_API_URL.to_string())
        }

        fn parse(value: &str) -> EnvResult<String> {
            let parsed = Url::parse(value).map_err(|e| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid URL '{}': {}", value, e),
            })?;

            match parsed.scheme() {
                "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
                other => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Unsupported scheme '{}'. Use http:// or https://", other),
                }),
            }
        }
    }

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "COMMENTGUARD_LOG_LEVEL";
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn default() -> Option<String> {
            Some("info".to_string())
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 分类请求超时（秒）
    pub struct ClassifyTimeout;
    impl EnvVar<u64> for ClassifyTimeout {
        const NAME: &'static str = "COMMENTGUARD_CLASSIFY_TIMEOUT";
        const DESCRIPTION: &'static str = "Classification request timeout in seconds";

        fn default() -> Option<u64> {
            Some(CLASSIFY_TIMEOUT_SECS)
        }

        fn parse(value: &str) -> EnvResult<u64> {
            value.parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid timeout '{}'. Must be a positive integer", value),
            })
        }
    }

    /// 健康探测超时（秒）
    pub struct HealthTimeout;
    impl EnvVar<u64> for HealthTimeout {
        const NAME: &'static str = "COMMENTGUARD_HEALTH_TIMEOUT";
        const DESCRIPTION: &'static str = "Health probe timeout in seconds";

        fn default() -> Option<u64> {
            Some(HEALTH_TIMEOUT_SECS)
        }

        fn parse(value: &str) -> EnvResult<u64> {
            value.parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid timeout '{}'. Must be a positive integer", value),
            })
        }
    }

    /// 后台健康轮询周期（秒）
    pub struct HealthPollPeriod;
    impl EnvVar<u64> for HealthPollPeriod {
        const NAME: &'static str = "COMMENTGUARD_HEALTH_PERIOD";
        const DESCRIPTION: &'static str = "Background health poll period in seconds";

        fn default() -> Option<u64> {
            Some(HEALTH_POLL_PERIOD_SECS)
        }

        fn parse(value: &str) -> EnvResult<u64> {
            value.parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid period '{}'. Must be a positive integer", value),
            })
        }
    }
}

/// 从环境变量拼装分类客户端配置
pub fn classifier_config_from_env() -> EnvResult<ClassifierConfig> {
    Ok(ClassifierConfig {
        api_url: core::ApiUrl::get()?,
        classify_timeout: Duration::from_secs(core::ClassifyTimeout::get()?),
        health_timeout: Duration::from_secs(core::HealthTimeout::get()?),
    })
}

/// 从环境变量拼装健康监视配置
pub fn health_monitor_config_from_env() -> EnvResult<crate::coordinator::HealthMonitorConfig> {
    Ok(crate::coordinator::HealthMonitorConfig {
        period: Duration::from_secs(core::HealthPollPeriod::get()?),
    })
}
