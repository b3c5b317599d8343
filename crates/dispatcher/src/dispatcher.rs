//! EventDispatcher - one listening loop per subscription

use std::sync::Arc;

use contracts::{ContractError, FrameSink, SubscribeRequest};
use event_client::{ClientRegistry, EventClient};
use observability::record_loop_finished;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

use crate::error::DispatcherError;
use crate::handler::{window_name, FrameHandler};
use crate::listener::{listen, LoopReport};
use crate::metrics::LoopMetrics;
use crate::sinks::LogFrameSink;

/// How the dispatcher reacts to a failed loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// First failed loop aborts all siblings and fails the run
    #[default]
    FailFast,
    /// Failed loops are collected; siblings keep running
    Isolate,
}

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    pub failure_policy: FailurePolicy,
    /// Stop each loop after this many events (None = until its stream ends)
    pub max_events_per_loop: Option<u64>,
}

/// Creates the display sink of one window
pub type SinkFactory =
    Arc<dyn Fn(&str) -> Result<Box<dyn FrameSink>, ContractError> + Send + Sync>;

/// Default factory: tracing-backed sinks
pub fn log_sink_factory() -> SinkFactory {
    Arc::new(|window| Ok(Box::new(LogFrameSink::new(window)) as Box<dyn FrameSink>))
}

/// Builder for creating an EventDispatcher
pub struct DispatcherBuilder<C> {
    registry: Arc<ClientRegistry<C>>,
    subscriptions: Vec<SubscribeRequest>,
    config: DispatcherConfig,
    sink_factory: SinkFactory,
}

impl<C: EventClient + Sync + 'static> DispatcherBuilder<C> {
    pub fn new(registry: Arc<ClientRegistry<C>>, subscriptions: Vec<SubscribeRequest>) -> Self {
        Self {
            registry,
            subscriptions,
            config: DispatcherConfig::default(),
            sink_factory: log_sink_factory(),
        }
    }

    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn max_events_per_loop(mut self, max: Option<u64>) -> Self {
        self.config.max_events_per_loop = max;
        self
    }

    pub fn sink_factory(mut self, factory: SinkFactory) -> Self {
        self.sink_factory = factory;
        self
    }

    /// Resolve every subscription and create its sink
    ///
    /// Nothing is spawned here; an unknown client or a sink that cannot be
    /// created fails the whole build.
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(subscriptions = self.subscriptions.len())
    )]
    pub fn build(self) -> Result<EventDispatcher<C>, DispatcherError> {
        let mut loops = Vec::with_capacity(self.subscriptions.len());
        for request in self.subscriptions {
            let client = self.registry.resolve(&request)?;
            let window = window_name(client.name(), request.path());
            let sink = (self.sink_factory)(&window)
                .map_err(|e| DispatcherError::sink_creation(&window, e.to_string()))?;
            let handler = FrameHandler::new(client.name(), request.path(), sink);
            loops.push(PendingLoop {
                client,
                request,
                handler,
            });
        }

        Ok(EventDispatcher {
            loops,
            config: self.config,
        })
    }
}

struct PendingLoop<C> {
    client: Arc<C>,
    request: SubscribeRequest,
    handler: FrameHandler,
}

/// Outcome of a dispatcher run
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Loops that ended cleanly
    pub completed: Vec<LoopReport>,
    /// Loops that failed (only populated under `Isolate`)
    pub failed: Vec<DispatcherError>,
}

impl DispatchReport {
    pub fn loops_finished(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Dispatcher with all loops resolved and ready to start
pub struct EventDispatcher<C> {
    loops: Vec<PendingLoop<C>>,
    config: DispatcherConfig,
}

impl<C: EventClient + Sync + 'static> EventDispatcher<C> {
    /// Number of loops `run` will start
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// Live metrics handles, keyed by window
    pub fn loop_metrics(&self) -> Vec<(String, Arc<LoopMetrics>)> {
        self.loops
            .iter()
            .map(|l| (l.handler.window().to_string(), Arc::clone(l.handler.metrics())))
            .collect()
    }

    /// Start every loop and wait for them
    ///
    /// Under `FailFast` the first failed loop aborts the rest and is returned
    /// as the error. Under `Isolate` every result is collected. Dropping the
    /// returned future aborts all loops.
    #[instrument(name = "dispatcher_run", skip(self), fields(loops = self.loops.len(), policy = ?self.config.failure_policy))]
    pub async fn run(self) -> Result<DispatchReport, DispatcherError> {
        let policy = self.config.failure_policy;
        let mut set = JoinSet::new();
        for pending in self.loops {
            set.spawn(listen(
                pending.client,
                pending.request,
                pending.handler,
                self.config.max_events_per_loop,
            ));
        }
        info!(loops = set.len(), "dispatcher started");

        let mut report = DispatchReport::default();
        while let Some(joined) = set.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => Err(DispatcherError::LoopPanicked {
                    message: e.to_string(),
                }),
            };

            match result {
                Ok(loop_report) => {
                    record_loop_finished(true);
                    info!(
                        window = %loop_report.window,
                        end = ?loop_report.end,
                        events = loop_report.metrics.events,
                        displayed = loop_report.metrics.displayed,
                        "loop finished"
                    );
                    report.completed.push(loop_report);
                }
                Err(e) => {
                    record_loop_finished(false);
                    match policy {
                        FailurePolicy::FailFast => {
                            error!(error = %e, remaining = set.len(), "loop failed, aborting siblings");
                            set.abort_all();
                            return Err(e);
                        }
                        FailurePolicy::Isolate => {
                            warn!(error = %e, remaining = set.len(), "loop failed, siblings continue");
                            report.failed.push(e);
                        }
                    }
                }
            }
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            "dispatcher finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use bytes::Bytes;
    use contracts::{PixelFormat, PixelGrid, ServiceConfig, ServiceConfigList};
    use event_client::{frame_event, MockConfig, MockEventClient};
    use frame_codec::encode_png;

    use crate::listener::LoopEnd;

    type Shown = Arc<Mutex<Vec<String>>>;

    struct Recording {
        shown: Shown,
    }

    impl FrameSink for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn show(&mut self, window: &str, _image: &PixelGrid) -> Result<(), ContractError> {
            self.shown.lock().unwrap().push(window.to_string());
            Ok(())
        }
    }

    fn recording_factory(shown: &Shown) -> SinkFactory {
        let shown = Arc::clone(shown);
        Arc::new(move |_window| {
            Ok(Box::new(Recording {
                shown: Arc::clone(&shown),
            }) as Box<dyn FrameSink>)
        })
    }

    fn png() -> Bytes {
        encode_png(&PixelGrid {
            width: 2,
            height: 1,
            format: PixelFormat::Gray8,
            data: Bytes::from_static(&[1, 2]),
        })
        .unwrap()
    }

    fn frames(service: &str, path: &str, n: u64) -> Vec<Result<event_client::EventItem, ContractError>> {
        (0..n)
            .map(|i| Ok(frame_event(service, path, i, i as f64, png())))
            .collect()
    }

    fn config() -> ServiceConfigList {
        ServiceConfigList {
            configs: vec![
                ServiceConfig::endpoint("oak0", 50010),
                ServiceConfig::endpoint("oak1", 50011),
                ServiceConfig::subscriber(
                    "viewer",
                    vec![
                        SubscribeRequest::new("oak0", "/rgb", 1),
                        SubscribeRequest::new("oak0", "/left", 1),
                        SubscribeRequest::new("oak1", "/rgb", 1),
                    ],
                ),
            ],
        }
    }

    fn registry(clients: Vec<MockEventClient>) -> Arc<ClientRegistry<MockEventClient>> {
        let clients = clients.into_iter().map(|c| (c.name().to_string(), c));
        Arc::new(ClientRegistry::from_clients(clients).unwrap())
    }

    #[tokio::test]
    async fn test_one_loop_per_subscription() {
        let list = config();
        let registry = registry(vec![
            MockEventClient::new("oak0")
                .with_script("/rgb", frames("oak0", "/rgb", 3))
                .with_script("/left", frames("oak0", "/left", 2)),
            MockEventClient::new("oak1").with_script("/rgb", frames("oak1", "/rgb", 1)),
        ]);
        let shown = Shown::default();

        let dispatcher = DispatcherBuilder::new(registry, list.subscriptions().cloned().collect())
            .sink_factory(recording_factory(&shown))
            .build()
            .unwrap();
        assert_eq!(dispatcher.loop_count(), list.subscriptions().count());

        let report = dispatcher.run().await.unwrap();
        assert_eq!(report.completed.len(), 3);
        assert!(report.is_clean());
        assert!(report.completed.iter().all(|r| r.end == LoopEnd::StreamClosed));

        let shown = shown.lock().unwrap();
        assert_eq!(shown.len(), 6);
        assert_eq!(shown.iter().filter(|w| *w == "oak0/rgb").count(), 3);
        assert_eq!(shown.iter().filter(|w| *w == "oak1/rgb").count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_client_fails_before_any_loop() {
        let oak0 = MockEventClient::new("oak0");
        let registry = registry(vec![oak0]);
        let subscriptions = vec![
            SubscribeRequest::new("oak0", "/rgb", 1),
            SubscribeRequest::new("oak7", "/rgb", 1),
        ];

        let result = DispatcherBuilder::new(Arc::clone(&registry), subscriptions).build();
        let Err(err) = result else {
            panic!("expected build failure");
        };
        assert!(err.is_startup());
        assert!(matches!(err, DispatcherError::Contract(ContractError::UnknownClient { .. })));
        assert_eq!(registry.get("oak0").unwrap().subscribe_count(), 0);
    }

    #[tokio::test]
    async fn test_decode_errors_do_not_end_loop() {
        let mut items = frames("oak0", "/rgb", 1);
        items.push(Ok(frame_event("oak0", "/rgb", 1, 1.0, Bytes::from_static(b"garbage"))));
        items.extend(frames("oak0", "/rgb", 1));
        let registry = registry(vec![MockEventClient::new("oak0").with_script("/rgb", items)]);
        let shown = Shown::default();

        let report = DispatcherBuilder::new(registry, vec![SubscribeRequest::new("oak0", "/rgb", 1)])
            .sink_factory(recording_factory(&shown))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        let metrics = report.completed[0].metrics;
        assert_eq!(metrics.events, 3);
        assert_eq!(metrics.displayed, 2);
        assert_eq!(metrics.decode_failures, 1);
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_run() {
        let mut broken = frames("oak1", "/rgb", 1);
        broken.push(Err(ContractError::transport("oak1", "stream reset")));
        let registry = registry(vec![
            MockEventClient::new("oak0"),
            MockEventClient::new("oak1").with_script("/rgb", broken),
        ]);
        let subscriptions = vec![
            SubscribeRequest::new("oak0", "/rgb", 1),
            SubscribeRequest::new("oak1", "/rgb", 1),
        ];

        let err = DispatcherBuilder::new(registry, subscriptions)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, DispatcherError::LoopFailed { ref client, .. } if client == "oak1"));
    }

    #[tokio::test]
    async fn test_isolate_collects_failures() {
        let registry = registry(vec![
            MockEventClient::new("oak0").with_script("/rgb", frames("oak0", "/rgb", 2)),
            MockEventClient::with_config(
                "oak1",
                MockConfig {
                    fail_subscribe: vec!["/rgb".into()],
                    ..Default::default()
                },
            ),
        ]);
        let subscriptions = vec![
            SubscribeRequest::new("oak0", "/rgb", 1),
            SubscribeRequest::new("oak1", "/rgb", 1),
        ];
        let shown = Shown::default();

        let report = DispatcherBuilder::new(registry, subscriptions)
            .failure_policy(FailurePolicy::Isolate)
            .sink_factory(recording_factory(&shown))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.loops_finished(), 2);
        assert_eq!(report.completed.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(shown.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_event_limit_stops_loop() {
        let registry =
            registry(vec![MockEventClient::new("oak0").with_script("/rgb", frames("oak0", "/rgb", 5))]);

        let report = DispatcherBuilder::new(registry, vec![SubscribeRequest::new("oak0", "/rgb", 1)])
            .max_events_per_loop(Some(2))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.completed[0].end, LoopEnd::LimitReached);
        assert_eq!(report.completed[0].metrics.events, 2);
    }

    #[test]
    fn test_sink_creation_failure_is_startup_error() {
        let registry = registry(vec![MockEventClient::new("oak0")]);
        let factory: SinkFactory =
            Arc::new(|window| Err(ContractError::display(window, "no display")));
        let result = DispatcherBuilder::new(registry, vec![SubscribeRequest::new("oak0", "/rgb", 1)])
            .sink_factory(factory)
            .build();
        assert!(matches!(result, Err(DispatcherError::SinkCreation { .. })));
    }
}
