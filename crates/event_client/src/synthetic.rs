//! 合成相机服务
//!
//! 无硬件环境下的 `EventClient` 实现：按帧率生成 PNG 编码的图像，
//! 视差路径生成带空洞的斜面视差图，其它路径生成 RGB 渐变图。

use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{
    CameraData, ContractError, DecodedMessage, OakCalibration, PixelFormat, PixelGrid,
    ServiceConfig, SubscribeRequest,
};
use frame_codec::encode_png;
use tracing::{debug, instrument, trace, warn};

use crate::client::{EventClient, CALIBRATION_PATH};
use crate::error::ClientError;
use crate::stream::{frame_event, EventSender, EventStream};

/// 视差最小值（像素）
const MIN_DISPARITY: u32 = 4;
/// 视差跨度（像素）
const DISPARITY_SPAN: u32 = 56;
/// 空洞间隔
const HOLE_PERIOD: u32 = 17;

/// 合成服务配置
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// 源帧率 (Hz)，降采样前
    pub frame_rate_hz: f64,

    /// 图像宽度
    pub width: u32,

    /// 图像高度
    pub height: u32,

    /// 每个订阅最多投递的事件数（None = 不限）
    pub max_events: Option<u64>,

    /// 订阅通道容量
    pub channel_capacity: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 10.0,
            width: 160,
            height: 100,
            max_events: None,
            channel_capacity: 8,
        }
    }
}

/// 合成相机服务客户端
pub struct SyntheticEventClient {
    name: String,
    config: SyntheticConfig,
    started: Instant,
}

impl SyntheticEventClient {
    /// 创建合成客户端
    pub fn new(name: impl Into<String>, config: SyntheticConfig) -> Self {
        Self {
            name: name.into(),
            config,
            started: Instant::now(),
        }
    }

    /// 从服务配置创建，条目必须带端口
    pub fn from_service(
        service: &ServiceConfig,
        config: SyntheticConfig,
    ) -> Result<Self, ClientError> {
        if !service.is_endpoint() {
            return Err(ClientError::NotAnEndpoint {
                name: service.name.clone(),
            });
        }
        Ok(Self::new(service.name.clone(), config))
    }

    /// 设备标定：两个相机，焦距取宽度的 0.8 倍，主点居中
    pub fn calibration(&self) -> OakCalibration {
        let (w, h) = (self.config.width, self.config.height);
        let f = 0.8 * f64::from(w);
        let (cx, cy) = (f64::from(w) / 2.0, f64::from(h) / 2.0);
        let camera_data = (0..2)
            .map(|camera_number| CameraData {
                camera_number,
                width: w,
                height: h,
                intrinsic_matrix: vec![f, 0.0, cx, 0.0, f, cy, 0.0, 0.0, 1.0],
                distortion_coeff: vec![0.0; 14],
            })
            .collect();
        OakCalibration { camera_data }
    }

    fn frame_interval(&self) -> Duration {
        if self.config.frame_rate_hz.is_finite() && self.config.frame_rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.config.frame_rate_hz)
        } else {
            Duration::ZERO
        }
    }
}

impl EventClient for SyntheticEventClient {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "synthetic_subscribe", skip(self, request), fields(client = %self.name, path = %request.path()))]
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<EventStream, ContractError> {
        let path = request.path().to_string();
        let (tx, stream) =
            EventStream::channel(&self.name, &path, self.config.channel_capacity);

        let publisher = Publisher {
            service: self.name.clone(),
            path,
            every_n: u64::from(request.every_n.max(1)),
            width: self.config.width,
            height: self.config.height,
            max_events: self.config.max_events,
            interval: self.frame_interval(),
            started: self.started,
        };
        tokio::spawn(publisher.run(tx));

        Ok(stream)
    }

    #[instrument(name = "synthetic_request_reply", skip(self), fields(client = %self.name))]
    async fn request_reply(&self, path: &str) -> Result<DecodedMessage, ContractError> {
        if path == CALIBRATION_PATH {
            Ok(DecodedMessage::Calibration(self.calibration()))
        } else {
            Err(ContractError::transport(
                &self.name,
                format!("path '{path}' is not served"),
            ))
        }
    }
}

/// 单个订阅的发布任务
struct Publisher {
    service: String,
    path: String,
    every_n: u64,
    width: u32,
    height: u32,
    max_events: Option<u64>,
    interval: Duration,
    started: Instant,
}

impl Publisher {
    async fn run(self, tx: EventSender) {
        let disparity = self.path.ends_with("disparity");
        let mut source_seq: u64 = 0;
        let mut delivered: u64 = 0;

        debug!(service = %self.service, path = %self.path, every_n = self.every_n, "synthetic publisher started");

        loop {
            if self.max_events.is_some_and(|max| delivered >= max) {
                break;
            }
            if !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            } else {
                tokio::task::yield_now().await;
            }
            if tx.is_closed() {
                break;
            }

            let seq = source_seq;
            source_seq += 1;
            if seq % self.every_n != 0 {
                continue;
            }

            let grid = if disparity {
                disparity_plane(self.width, self.height, seq)
            } else {
                rgb_gradient(self.width, self.height, seq)
            };
            let image_data = match encode_png(&grid) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(service = %self.service, path = %self.path, error = %e, "synthetic frame encode failed");
                    continue;
                }
            };

            let stamp = self.started.elapsed().as_secs_f64();
            let item = frame_event(&self.service, &self.path, seq, stamp, image_data);
            if tx.send(Ok(item)).await.is_err() {
                break;
            }
            delivered += 1;
            trace!(service = %self.service, path = %self.path, seq, "synthetic frame sent");
        }

        debug!(service = %self.service, path = %self.path, delivered, "synthetic publisher stopped");
    }
}

/// 斜面视差：自上而下从 4 增至 60，周期性置 0 作为无效像素
pub fn disparity_plane(width: u32, height: u32, seq: u64) -> PixelGrid {
    let span = height.saturating_sub(1).max(1);
    let shift = (seq % u64::from(HOLE_PERIOD)) as u32;
    let mut data = Vec::with_capacity((width * height) as usize);
    for v in 0..height {
        let d = MIN_DISPARITY + DISPARITY_SPAN * v / span;
        for u in 0..width {
            let hole = (u + v + shift) % HOLE_PERIOD == 0;
            data.push(if hole { 0 } else { d as u8 });
        }
    }
    PixelGrid {
        width,
        height,
        format: PixelFormat::Gray8,
        data: Bytes::from(data),
    }
}

/// RGB 渐变，随帧序号平移
pub fn rgb_gradient(width: u32, height: u32, seq: u64) -> PixelGrid {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    let w = width.max(1);
    let h = height.max(1);
    for v in 0..height {
        for u in 0..width {
            data.push((u * 255 / w) as u8);
            data.push((v * 255 / h) as u8);
            data.push((seq % 256) as u8);
        }
    }
    PixelGrid {
        width,
        height,
        format: PixelFormat::Rgb8,
        data: Bytes::from(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_codec::{decode_disparity, decode_frame};

    fn fast(max_events: u64) -> SyntheticConfig {
        SyntheticConfig {
            frame_rate_hz: 1000.0,
            width: 32,
            height: 20,
            max_events: Some(max_events),
            channel_capacity: 4,
        }
    }

    #[tokio::test]
    async fn test_every_n_decimates_at_source() {
        let client = SyntheticEventClient::new("oak0", fast(3));
        let mut stream = client
            .subscribe(&SubscribeRequest::new("oak0", "/rgb", 3))
            .await
            .unwrap();

        let mut seqs = Vec::new();
        while let Some(item) = stream.next().await {
            let (event, _) = item.unwrap();
            seqs.push(event.sequence);
        }
        assert_eq!(seqs, vec![0, 3, 6]);
    }

    #[tokio::test]
    async fn test_disparity_frames_decode() {
        let client = SyntheticEventClient::new("oak0", fast(1));
        let mut stream = client
            .subscribe(&SubscribeRequest::new("oak0", "/disparity", 1))
            .await
            .unwrap();

        let (_, message) = stream.next().await.unwrap().unwrap();
        let DecodedMessage::Frame(frame) = message else {
            panic!("expected frame");
        };
        let grid = decode_disparity("/disparity", &frame.image_data).unwrap();
        assert_eq!((grid.width, grid.height), (32, 20));
        // (0 + 0 + 0) % 17 == 0
        assert_eq!(grid.data[0], 0.0);
        assert_eq!(grid.data[1], 4.0);
        assert_eq!(grid.data[19 * 32 + 1], 60.0);
    }

    #[tokio::test]
    async fn test_rgb_frames_decode() {
        let client = SyntheticEventClient::new("oak0", fast(1));
        let mut stream = client
            .subscribe(&SubscribeRequest::new("oak0", "/rgb", 1))
            .await
            .unwrap();
        let (_, message) = stream.next().await.unwrap().unwrap();
        let DecodedMessage::Frame(frame) = message else {
            panic!("expected frame");
        };
        let grid = decode_frame("/rgb", &frame.image_data).unwrap();
        assert_eq!(grid.format, PixelFormat::Rgb8);
    }

    #[tokio::test]
    async fn test_calibration_reply() {
        let client = SyntheticEventClient::new("oak0", SyntheticConfig::default());
        let DecodedMessage::Calibration(calibration) =
            client.request_reply(CALIBRATION_PATH).await.unwrap()
        else {
            panic!("expected calibration");
        };
        assert_eq!(calibration.camera_data.len(), 2);
        let k = &calibration.camera_data[0].intrinsic_matrix;
        assert_eq!((k[0], k[2], k[4], k[5]), (128.0, 80.0, 128.0, 50.0));

        assert!(client.request_reply("/nope").await.is_err());
    }

    #[test]
    fn test_from_service_requires_port() {
        let viewer = ServiceConfig::subscriber("viewer", Vec::new());
        assert!(matches!(
            SyntheticEventClient::from_service(&viewer, SyntheticConfig::default()),
            Err(ClientError::NotAnEndpoint { .. })
        ));
        let oak = ServiceConfig::endpoint("oak0", 50010);
        let client = SyntheticEventClient::from_service(&oak, SyntheticConfig::default()).unwrap();
        assert_eq!(client.name(), "oak0");
    }
}
