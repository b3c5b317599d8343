//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 → 分发器启动的契约测试
//! - 合成相机服务 → Dispatcher → 显示 sink
//! - 合成相机服务 → 标定 → 点云重建 → 可视化 surface

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use contracts::{ContractError, FrameSink, PixelGrid, PointCloud, PointCloudSurface};
    use dispatcher::SinkFactory;

    pub const SERVICE_CONFIG: &str = r#"{
        "configs": [
            { "name": "oak0", "host": "localhost", "port": 50010 },
            { "name": "oak1", "host": "localhost", "port": 50011 },
            {
                "name": "viewer",
                "subscriptions": [
                    { "uri": { "path": "/rgb", "query": "type=farm_ng.oak.proto.OakFrame&service_name=oak0" }, "every_n": 1 },
                    { "uri": { "path": "/disparity", "query": "type=farm_ng.oak.proto.OakFrame&service_name=oak0" }, "every_n": 1 },
                    { "uri": { "path": "/rgb", "query": "service=oak1" }, "every_n": 2 }
                ]
            }
        ]
    }"#;

    pub type Shown = Arc<Mutex<Vec<(String, PixelGrid)>>>;

    struct RecordingSink {
        shown: Shown,
    }

    impl FrameSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        fn show(&mut self, window: &str, image: &PixelGrid) -> Result<(), ContractError> {
            self.shown
                .lock()
                .unwrap()
                .push((window.to_string(), image.clone()));
            Ok(())
        }
    }

    pub fn recording_factory(shown: &Shown) -> SinkFactory {
        let shown = Arc::clone(shown);
        Arc::new(move |_window| {
            Ok(Box::new(RecordingSink {
                shown: Arc::clone(&shown),
            }) as Box<dyn FrameSink>)
        })
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum GeometryCall {
        Add,
        Update,
    }

    /// Records every geometry call with the cloud's point count and depth span
    #[derive(Default)]
    pub struct RecordingSurface {
        pub calls: Vec<(GeometryCall, usize, Option<(f64, f64)>)>,
        pub renders: usize,
    }

    impl RecordingSurface {
        fn record(&mut self, call: GeometryCall, cloud: &PointCloud) {
            let span = cloud.bounds().map(|(lo, hi)| (lo.z, hi.z));
            self.calls.push((call, cloud.len(), span));
        }
    }

    impl PointCloudSurface for RecordingSurface {
        fn name(&self) -> &str {
            "recording"
        }

        fn add_geometry(&mut self, cloud: &PointCloud) -> Result<(), ContractError> {
            self.record(GeometryCall::Add, cloud);
            Ok(())
        }

        fn update_geometry(&mut self, cloud: &PointCloud) -> Result<(), ContractError> {
            self.record(GeometryCall::Update, cloud);
            Ok(())
        }

        fn render(&mut self) -> Result<(), ContractError> {
            self.renders += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod config_tests {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, SubscribeRequest};
    use dispatcher::{DispatcherBuilder, DispatcherError};
    use event_client::{ClientRegistry, MockEventClient};

    use crate::support::SERVICE_CONFIG;

    #[test]
    fn test_loop_count_matches_subscriptions() {
        let configs = ConfigLoader::load_from_str(SERVICE_CONFIG, ConfigFormat::Json).unwrap();
        let registry =
            ClientRegistry::from_configs(&configs, |c| Ok(MockEventClient::new(&c.name))).unwrap();
        assert_eq!(registry.len(), 2);

        let subscriptions: Vec<SubscribeRequest> = configs.subscriptions().cloned().collect();
        let dispatcher = DispatcherBuilder::new(Arc::new(registry), subscriptions)
            .build()
            .unwrap();
        assert_eq!(dispatcher.loop_count(), 3);
    }

    #[test]
    fn test_unknown_client_rejected_by_loader() {
        let config = SERVICE_CONFIG.replace("service=oak1", "service=oak2");
        let err = ConfigLoader::load_from_str(&config, ConfigFormat::Json).unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(err, ContractError::UnknownClient { ref name, .. } if name == "oak2"));
    }

    #[test]
    fn test_unknown_client_rejected_by_dispatcher() {
        let configs = ConfigLoader::load_from_str(SERVICE_CONFIG, ConfigFormat::Json).unwrap();
        // registry built from a different source than the subscriptions
        let registry =
            ClientRegistry::from_clients([("oak0".to_string(), MockEventClient::new("oak0"))])
                .unwrap();
        let registry = Arc::new(registry);

        let result =
            DispatcherBuilder::new(Arc::clone(&registry), configs.subscriptions().cloned().collect())
                .build();
        assert!(matches!(
            result,
            Err(DispatcherError::Contract(ContractError::UnknownClient { .. }))
        ));
        assert_eq!(registry.get("oak0").unwrap().subscribe_count(), 0);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::PixelFormat;
    use dispatcher::{DispatcherBuilder, LoopEnd};
    use event_client::synthetic::disparity_plane;
    use event_client::{ClientRegistry, SyntheticConfig, SyntheticEventClient};
    use frame_codec::{decode_disparity, encode_png, jet_lut};
    use reconstruction::{run_reconstruction, DepthRange, ReconstructionConfig};

    use crate::support::{recording_factory, GeometryCall, RecordingSurface, Shown, SERVICE_CONFIG};

    fn fast_source(max_events: Option<u64>) -> SyntheticConfig {
        SyntheticConfig {
            frame_rate_hz: 1000.0,
            max_events,
            ..Default::default()
        }
    }

    /// End-to-end: config -> synthetic services -> Dispatcher -> sinks
    #[tokio::test]
    async fn test_e2e_stream_pipeline() {
        let configs = ConfigLoader::load_from_str(SERVICE_CONFIG, ConfigFormat::Json).unwrap();
        let registry = ClientRegistry::from_configs(&configs, |service| {
            SyntheticEventClient::from_service(service, fast_source(Some(3)))
        })
        .unwrap();
        let shown = Shown::default();

        let report = DispatcherBuilder::new(Arc::new(registry), configs.subscriptions().cloned().collect())
            .sink_factory(recording_factory(&shown))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.completed.len(), 3);
        for loop_report in &report.completed {
            assert_eq!(loop_report.end, LoopEnd::StreamClosed);
            assert_eq!(loop_report.metrics.events, 3);
            assert_eq!(loop_report.metrics.displayed, 3);
        }

        let shown = shown.lock().unwrap();
        let disparity: Vec<_> = shown.iter().filter(|(w, _)| w == "oak0/disparity").collect();
        assert_eq!(disparity.len(), 3);
        // colorized for display; pixel (0, 0) of the first frame is a hole
        assert_eq!(disparity[0].1.format, PixelFormat::Rgb8);
        assert_eq!(&disparity[0].1.data[..3], &jet_lut()[0]);

        assert_eq!(shown.iter().filter(|(w, _)| w == "oak1/rgb").count(), 3);
    }

    /// End-to-end: synthetic service -> calibration -> reconstruction -> surface
    #[tokio::test]
    async fn test_e2e_reconstruction_pipeline() {
        let client = SyntheticEventClient::new("oak0", fast_source(None));
        let config = ReconstructionConfig {
            max_frames: Some(3),
            ..Default::default()
        };

        let (stats, surface) = run_reconstruction(&client, config, RecordingSurface::default())
            .await
            .unwrap();

        assert_eq!(stats.frames, 3);
        assert_eq!(stats.skipped, 0);
        assert!(stats.registered);
        assert!(stats.discarded_total > 0);
        assert_eq!(surface.renders, 3);

        let kinds: Vec<GeometryCall> = surface.calls.iter().map(|c| c.0).collect();
        assert_eq!(
            kinds,
            vec![GeometryCall::Add, GeometryCall::Update, GeometryCall::Update]
        );

        let range = DepthRange::default();
        for (_, points, span) in &surface.calls {
            assert!(*points > 0);
            let (lo, hi) = span.unwrap();
            assert!(range.contains(lo) && range.contains(hi));
        }
    }

    /// Decoding is pure: the same bytes always give the same grid
    #[test]
    fn test_decode_is_deterministic() {
        let encoded = encode_png(&disparity_plane(32, 8, 4)).unwrap();
        let first = decode_disparity("oak0/disparity", &encoded).unwrap();
        let second = decode_disparity("oak0/disparity", &encoded).unwrap();
        assert_eq!(first, second);
        assert_eq!((first.width, first.height), (32, 8));
    }
}
