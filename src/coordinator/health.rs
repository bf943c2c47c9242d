//! 后台健康监视
//!
//! 启动时立即探测一次，之后按固定周期轮询。结果通过 watch 通道
//! 广播，面板随时读取最近一次的可达性

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::detection::classifier::ClassifierClient;

/// 默认轮询周期（秒）
pub const HEALTH_POLL_PERIOD_SECS: u64 = 300;

/// 健康监视配置
#[derive(Debug, Clone)]
pub struct HealthMonitorConfig {
    /// 探测间隔
    pub period: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(HEALTH_POLL_PERIOD_SECS),
        }
    }
}

/// 分类服务的后台健康监视器
pub struct HealthMonitor {
    rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl HealthMonitor {
    /// 启动监视任务
    pub fn start(client: ClassifierClient, config: HealthMonitorConfig) -> Self {
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.period);
            loop {
                // interval 的首次 tick 立即完成，启动即探测
                ticker.tick().await;
                let reachable = client.health().await;
                if !reachable {
                    tracing::warn!("分类服务不可达");
                }
                if tx.send(reachable).is_err() {
                    break;
                }
            }
        });

        Self { rx, task }
    }

    /// 最近一次探测的可达性
    pub fn reachable(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待下一次探测结果
    pub async fn changed(&mut self) -> bool {
        if self.rx.changed().await.is_err() {
            return false;
        }
        *self.rx.borrow()
    }

    /// 停止监视任务
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_period_is_five_minutes() {
        let config = HealthMonitorConfig::default();
        assert_eq!(config.period, Duration::from_secs(300));
    }
}
