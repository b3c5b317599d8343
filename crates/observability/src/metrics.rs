//! 指标记录模块
//!
//! 通过 `metrics` facade 记录事件流、解码、显示与点云指标。
//! 未安装 recorder 时所有调用均为空操作。

use metrics::{counter, histogram};

/// 记录收到一个订阅事件
pub fn record_event_received(client: &str, path: &str) {
    counter!(
        "oak_streamer_events_received_total",
        "client" => client.to_string(),
        "path" => path.to_string()
    )
    .increment(1);
}

/// 记录单个事件解码失败
pub fn record_decode_failure(client: &str, path: &str) {
    counter!(
        "oak_streamer_decode_failures_total",
        "client" => client.to_string(),
        "path" => path.to_string()
    )
    .increment(1);
}

/// 记录帧已显示到窗口
pub fn record_frame_displayed(window: &str) {
    counter!(
        "oak_streamer_frames_displayed_total",
        "window" => window.to_string()
    )
    .increment(1);
}

/// 记录一次点云重建：保留点数与被深度范围过滤的点数
pub fn record_point_cloud(kept: usize, discarded: usize) {
    histogram!("oak_streamer_point_cloud_points").record(kept as f64);
    if discarded > 0 {
        counter!("oak_streamer_points_discarded_total").increment(discarded as u64);
    }
}

/// 记录监听循环结束状态
pub fn record_loop_finished(success: bool) {
    let status = if success { "ok" } else { "error" };
    counter!(
        "oak_streamer_loops_finished_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// 统计摘要
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// 生成摘要
    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }
}
