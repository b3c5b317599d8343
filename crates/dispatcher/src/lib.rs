//! # Dispatcher
//!
//! 事件订阅多路复用模块。
//!
//! 负责：
//! - 启动前解析全部订阅的所属客户端（未知客户端即配置错误）
//! - 每个订阅一个独立监听循环，循环内按到达顺序处理
//! - 按消息类型路由：普通帧直接显示，视差帧上色后显示
//! - 按失败策略（fail-fast / isolate）汇合所有循环

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod listener;
pub mod metrics;
pub mod sinks;

pub use dispatcher::{
    log_sink_factory, DispatchReport, DispatcherBuilder, DispatcherConfig, EventDispatcher,
    FailurePolicy, SinkFactory,
};
pub use error::DispatcherError;
pub use handler::{window_name, FrameHandler, FrameRoute};
pub use listener::{listen, LoopEnd, LoopReport};
pub use metrics::{LoopMetrics, LoopMetricsSnapshot};
pub use sinks::{LogFrameSink, LogSurface};
