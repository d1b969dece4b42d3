//! Tests for the orchestrator module

use super::aggregator::RunningStatistics;
use super::builder::OrchestratorBuilder;
use super::executor::BenchmarkOrchestrator;
use super::state::RunPhase;
use crate::archive::ArchiveEntry;
use crate::config::{BenchmarkConfig, DemoDataset};
use crate::consistency::ConsistencyTier;
use crate::error::BenchError;
use crate::metrics::{IterationResult, Resolution};
use crate::solution::{JobId, RoutePlan, SolveOutcome};
use crate::traits::{ClientError, Presenter, PresenterError, ProblemSource, SolveClient};

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Mock SolveClient
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Reply {
    /// Synchronous solution with the given driving time
    Direct(f64),
    /// Job handle that stays active for `active_ticks` status queries
    Handle { active_ticks: usize, driving: f64 },
    /// Non-success HTTP status
    Fail(u16, &'static str),
    /// Neither a solution nor a job id
    Garbage,
}

fn plan(driving: f64, generation: usize, status: &str) -> RoutePlan {
    let mut plan = RoutePlan {
        score: Some(format!("0hard/-{}soft", driving)),
        solver_status: Some(status.to_string()),
        total_driving_time_seconds: Some(driving),
        ..Default::default()
    };
    plan.extra.insert("generation".into(), json!(generation));
    plan
}

fn generation(plan: &RoutePlan) -> u64 {
    plan.extra
        .get("generation")
        .and_then(|v| v.as_u64())
        .unwrap_or(u64::MAX)
}

struct MockSolveClient {
    replies: Mutex<VecDeque<Reply>>,
    submitted: Mutex<Vec<RoutePlan>>,
    pending: Mutex<Option<(usize, f64, usize)>>,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
    enrichment_calls: AtomicUsize,
    enrichment_fails: bool,
    status_fails: bool,
    submit_delay: Duration,
}

impl MockSolveClient {
    fn new(replies: &[Reply]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().copied().collect()),
            submitted: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            enrichment_calls: AtomicUsize::new(0),
            enrichment_fails: false,
            status_fails: false,
            submit_delay: Duration::ZERO,
        }
    }

    fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    fn with_enrichment_failure(mut self) -> Self {
        self.enrichment_fails = true;
        self
    }

    fn with_status_failure(mut self) -> Self {
        self.status_fails = true;
        self
    }
}

#[async_trait]
impl SolveClient for MockSolveClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, problem: &RoutePlan) -> Result<SolveOutcome, ClientError> {
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
        let generation = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.submitted.lock().unwrap().push(problem.clone());

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Direct(driving)) => Ok(SolveOutcome::Direct(plan(
                driving,
                generation,
                "NOT_SOLVING",
            ))),
            Some(Reply::Handle {
                active_ticks,
                driving,
            }) => {
                *self.pending.lock().unwrap() = Some((active_ticks, driving, generation));
                Ok(SolveOutcome::Handle(JobId::new(format!("job-{}", generation))))
            }
            Some(Reply::Fail(status, message)) => Err(ClientError::Status {
                status,
                message: message.to_string(),
            }),
            Some(Reply::Garbage) => SolveOutcome::classify(json!({"unexpected": true})),
            None => Err(ClientError::Status {
                status: 500,
                message: "no reply scripted".into(),
            }),
        }
    }

    async fn status(&self, _job: &JobId) -> Result<RoutePlan, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.status_fails {
            return Err(ClientError::Status {
                status: 404,
                message: "job not found".into(),
            });
        }

        let mut pending = self.pending.lock().unwrap();
        match pending.as_mut() {
            Some((remaining, driving, generation)) if *remaining > 0 => {
                *remaining -= 1;
                Ok(plan(*driving * 2.0, *generation, "SOLVING_ACTIVE"))
            }
            Some((_, driving, generation)) => Ok(plan(*driving, *generation, "NOT_SOLVING")),
            None => Err(ClientError::Status {
                status: 404,
                message: "no job".into(),
            }),
        }
    }

    async fn enrichment(&self, _job: &JobId) -> Result<serde_json::Value, ClientError> {
        self.enrichment_calls.fetch_add(1, Ordering::SeqCst);
        if self.enrichment_fails {
            Err(ClientError::Status {
                status: 503,
                message: "road graph not loaded".into(),
            })
        } else {
            Ok(json!({"vehicles": [{"id": "1", "path": []}]}))
        }
    }

    async fn start(&self, _problem: &RoutePlan) -> Result<JobId, ClientError> {
        Err(ClientError::Payload("single solve not used here".into()))
    }

    async fn cancel(&self, _job: &JobId) -> Result<(), ClientError> {
        Ok(())
    }
}

// ============================================================================
// Mock ProblemSource
// ============================================================================

struct MockSource {
    fails: bool,
    loads: AtomicUsize,
}

impl MockSource {
    fn new() -> Self {
        Self {
            fails: false,
            loads: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fails: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl ProblemSource for MockSource {
    async fn load(&self, _dataset: DemoDataset) -> Result<RoutePlan, ClientError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fails {
            Err(ClientError::Status {
                status: 503,
                message: "demo data unavailable".into(),
            })
        } else {
            Ok(plan(0.0, 0, "NOT_SOLVING"))
        }
    }
}

// ============================================================================
// Recording Presenter
// ============================================================================

#[derive(Default)]
struct RecordingPresenter {
    messages: Mutex<Vec<String>>,
    completed: Mutex<Vec<(usize, RunningStatistics)>>,
    run_complete: Mutex<Vec<(RunningStatistics, ConsistencyTier)>>,
    failures: Mutex<Vec<String>>,
    replays: AtomicUsize,
    panic_on_iteration: bool,
    fail_progress: bool,
}

impl RecordingPresenter {
    fn messages_containing(&self, needle: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.contains(needle))
            .count()
    }
}

impl Presenter for RecordingPresenter {
    fn on_progress(&self, _iteration: usize, _total: usize, message: &str) -> Result<(), PresenterError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail_progress {
            return Err(PresenterError("terminal closed".into()));
        }
        Ok(())
    }

    fn on_iteration_complete(
        &self,
        result: &IterationResult,
        _solution: &RoutePlan,
        statistics: &RunningStatistics,
    ) -> Result<(), PresenterError> {
        self.completed
            .lock()
            .unwrap()
            .push((result.index, *statistics));
        if self.panic_on_iteration {
            panic!("presenter blew up");
        }
        Ok(())
    }

    fn on_run_complete(
        &self,
        statistics: &RunningStatistics,
        tier: ConsistencyTier,
    ) -> Result<(), PresenterError> {
        self.run_complete.lock().unwrap().push((*statistics, tier));
        Ok(())
    }

    fn on_run_failed(&self, reason: &str) -> Result<(), PresenterError> {
        self.failures.lock().unwrap().push(reason.to_string());
        Ok(())
    }

    fn on_replay(&self, _entry: &ArchiveEntry) -> Result<(), PresenterError> {
        self.replays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Fixture {
    client: Arc<MockSolveClient>,
    source: Arc<MockSource>,
    presenter: Arc<RecordingPresenter>,
    orchestrator: Arc<BenchmarkOrchestrator>,
}

fn fixture_with(
    client: MockSolveClient,
    source: MockSource,
    presenter: RecordingPresenter,
) -> Fixture {
    let client = Arc::new(client);
    let source = Arc::new(source);
    let presenter = Arc::new(presenter);
    let orchestrator = OrchestratorBuilder::new()
        .client(client.clone())
        .source(source.clone())
        .presenter(presenter.clone())
        .build()
        .unwrap();

    Fixture {
        client,
        source,
        presenter,
        orchestrator: Arc::new(orchestrator),
    }
}

fn fixture(replies: &[Reply]) -> Fixture {
    fixture_with(
        MockSolveClient::new(replies),
        MockSource::new(),
        RecordingPresenter::default(),
    )
}

fn config(iterations: usize) -> BenchmarkConfig {
    BenchmarkConfig::new(iterations, DemoDataset::SingaporeCentral)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

// ============================================================================
// Builder Tests
// ============================================================================

#[test]
fn test_builder_missing_client() {
    let result = OrchestratorBuilder::new()
        .source(Arc::new(MockSource::new()))
        .build();
    assert!(matches!(result, Err(BenchError::MissingConfig("client"))));
}

#[test]
fn test_builder_missing_source() {
    let result = OrchestratorBuilder::new()
        .client(Arc::new(MockSolveClient::new(&[])))
        .build();
    assert!(matches!(result, Err(BenchError::MissingConfig("source"))));
}

#[test]
fn test_builder_rejects_zero_poll_interval() {
    let result = OrchestratorBuilder::new()
        .client(Arc::new(MockSolveClient::new(&[])))
        .source(Arc::new(MockSource::new()))
        .poll_interval(Duration::ZERO)
        .build();
    assert!(matches!(result, Err(BenchError::Config(_))));
}

#[tokio::test]
async fn test_fresh_orchestrator_is_idle() {
    let f = fixture(&[]);
    let state = f.orchestrator.snapshot().await;
    assert_eq!(state.phase, RunPhase::Idle);
    assert!(!state.running);
    assert!(state.archive.is_empty());
    assert!(format!("{:?}", f.orchestrator).contains("mock"));
}

// ============================================================================
// Run Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_three_direct_iterations() {
    let f = fixture(&[
        Reply::Direct(1000.0),
        Reply::Direct(1100.0),
        Reply::Direct(900.0),
    ]);

    let state = f.orchestrator.run(config(3)).await.unwrap();

    assert_eq!(state.phase, RunPhase::Completed);
    assert!(!state.running);
    assert_eq!(state.archive.metrics(), vec![20.0, 22.0, 18.0]);
    assert!(state
        .archive
        .results()
        .all(|r| r.resolution == Resolution::Direct && !r.enrichment_available));

    let stats = state.statistics.unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.best, 18.0);
    assert_eq!(stats.worst, 22.0);
    assert!(approx(stats.mean, 20.0));
    assert!(approx(stats.std_dev, 1.633));
    assert!((stats.std_dev_percent - 8.16).abs() < 0.01);
    assert_eq!(state.tier(), Some(ConsistencyTier::Acceptable));

    let run_complete = f.presenter.run_complete.lock().unwrap();
    assert_eq!(run_complete.len(), 1);
    assert_eq!(run_complete[0].1, ConsistencyTier::Acceptable);
    assert_eq!(f.presenter.completed.lock().unwrap().len(), 3);
    assert_eq!(f.source.loads.load(Ordering::SeqCst), 1);
    assert!(state.finished_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_statistics_match_archive_at_every_notification() {
    let f = fixture(&[
        Reply::Direct(1500.0),
        Reply::Direct(1000.0),
        Reply::Direct(2000.0),
        Reply::Direct(1250.0),
    ]);

    let state = f.orchestrator.run(config(4)).await.unwrap();
    let metrics = state.archive.metrics();

    let completed = f.presenter.completed.lock().unwrap();
    for (index, stats) in completed.iter() {
        assert_eq!(stats.count, *index);
        assert_eq!(
            Some(*stats),
            RunningStatistics::compute(&metrics[..*index])
        );
    }
    assert_eq!(
        state.statistics,
        RunningStatistics::from_archive(&state.archive)
    );
}

#[tokio::test(start_paused = true)]
async fn test_iterations_chain_previous_solution() {
    let f = fixture(&[
        Reply::Direct(1000.0),
        Reply::Handle {
            active_ticks: 0,
            driving: 1100.0,
        },
        Reply::Direct(900.0),
    ]);

    f.orchestrator.run(config(3)).await.unwrap();

    let submitted = f.client.submitted.lock().unwrap();
    let generations: Vec<u64> = submitted.iter().map(generation).collect();
    assert_eq!(generations, vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_second_dispatch_failure() {
    let f = fixture(&[Reply::Direct(1000.0), Reply::Fail(500, "solver crashed")]);

    let err = f.orchestrator.run(config(3)).await.unwrap_err();
    match &err {
        BenchError::DispatchFailed { iteration, message } => {
            assert_eq!(*iteration, 2);
            assert_eq!(message, "solver crashed");
        }
        other => panic!("unexpected error: {other}"),
    }

    let state = f.orchestrator.snapshot().await;
    assert_eq!(state.phase, RunPhase::Failed);
    assert!(!state.running);
    assert_eq!(state.archive.len(), 1);
    assert_eq!(state.archive.metrics(), vec![20.0]);
    assert!(state.failure.as_deref().unwrap().contains("iteration 2"));

    assert_eq!(f.presenter.completed.lock().unwrap().len(), 1);
    let failures = f.presenter.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("solver crashed"));
    assert!(f.presenter.run_complete.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_response_shape_fails_dispatch() {
    let f = fixture(&[Reply::Garbage]);

    let err = f.orchestrator.run(config(3)).await.unwrap_err();
    assert!(matches!(err, BenchError::DispatchFailed { iteration: 1, .. }));
    assert!(err.to_string().contains("Unexpected response shape"));
    assert!(f.orchestrator.snapshot().await.archive.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_setup_failure_runs_no_iteration() {
    let f = fixture_with(
        MockSolveClient::new(&[Reply::Direct(1000.0)]),
        MockSource::failing(),
        RecordingPresenter::default(),
    );

    let err = f.orchestrator.run(config(3)).await.unwrap_err();
    assert!(matches!(err, BenchError::SetupFailed(_)));
    assert!(err.to_string().contains("demo data unavailable"));

    assert_eq!(f.client.submit_calls.load(Ordering::SeqCst), 0);
    let state = f.orchestrator.snapshot().await;
    assert_eq!(state.phase, RunPhase::Failed);
    assert!(state.archive.is_empty());
    assert!(state.statistics.is_none());
    assert_eq!(f.presenter.failures.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_two_tick_handle() {
    let f = fixture(&[Reply::Handle {
        active_ticks: 1,
        driving: 1000.0,
    }]);

    let state = f.orchestrator.run(config(1)).await.unwrap();

    assert_eq!(f.client.status_calls.load(Ordering::SeqCst), 2);
    assert_eq!(f.presenter.messages_containing("still running"), 1);

    let result = &state.archive.iteration(1).unwrap().result;
    assert_eq!(result.resolution, Resolution::Polled);
    assert_eq!(result.primary_metric, 20.0);
    assert!(result.enrichment_available);
    assert!(approx(result.elapsed_seconds, 4.0));
    assert_eq!(f.client.enrichment_calls.load(Ordering::SeqCst), 1);
    assert!(state.archive.iteration(1).unwrap().enrichment.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_enrichment_failure_only_clears_flag() {
    let f = fixture_with(
        MockSolveClient::new(&[Reply::Handle {
            active_ticks: 0,
            driving: 1000.0,
        }])
        .with_enrichment_failure(),
        MockSource::new(),
        RecordingPresenter::default(),
    );

    let state = f.orchestrator.run(config(1)).await.unwrap();

    assert_eq!(state.phase, RunPhase::Completed);
    let entry = state.archive.iteration(1).unwrap();
    assert!(!entry.result.enrichment_available);
    assert!(entry.enrichment.is_none());
    assert!(f.presenter.failures.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_poll_failure() {
    let f = fixture_with(
        MockSolveClient::new(&[
            Reply::Direct(1000.0),
            Reply::Handle {
                active_ticks: 3,
                driving: 1000.0,
            },
        ])
        .with_status_failure(),
        MockSource::new(),
        RecordingPresenter::default(),
    );

    let err = f.orchestrator.run(config(3)).await.unwrap_err();
    match err {
        BenchError::PollFailed { iteration, message } => {
            assert_eq!(iteration, 2);
            assert_eq!(message, "job not found");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(f.orchestrator.snapshot().await.archive.len(), 1);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_stop_during_polling_appends_nothing() {
    let f = fixture(&[Reply::Handle {
        active_ticks: usize::MAX,
        driving: 1000.0,
    }]);

    let orchestrator = Arc::clone(&f.orchestrator);
    let handle = tokio::spawn(async move { orchestrator.run(config(3)).await });

    tokio::time::sleep(Duration::from_secs(5)).await;
    let stopped_at = Instant::now();
    assert!(f.orchestrator.stop());

    let state = handle.await.unwrap().unwrap();
    assert!(stopped_at.elapsed() <= Duration::from_secs(2));

    assert_eq!(state.phase, RunPhase::Stopped);
    assert!(state.archive.is_empty());
    assert!(state.statistics.is_none());
    assert_eq!(f.client.status_calls.load(Ordering::SeqCst), 2);
    assert_eq!(f.client.submit_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.presenter.messages_containing("stopped"), 1);
    assert!(f.presenter.run_complete.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_pause_keeps_archive() {
    let f = fixture(&[
        Reply::Direct(1000.0),
        Reply::Direct(1100.0),
        Reply::Direct(900.0),
    ]);

    let orchestrator = Arc::clone(&f.orchestrator);
    let handle = tokio::spawn(async move { orchestrator.run(config(3)).await });

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(f.orchestrator.stop());

    let state = handle.await.unwrap().unwrap();
    assert_eq!(state.phase, RunPhase::Stopped);
    assert_eq!(state.archive.len(), 1);
    assert_eq!(f.client.submit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() {
    let f = fixture(&[Reply::Handle {
        active_ticks: usize::MAX,
        driving: 1000.0,
    }]);

    // Nothing running yet
    assert!(!f.orchestrator.stop());
    assert!(!f.orchestrator.stop());

    let orchestrator = Arc::clone(&f.orchestrator);
    let handle = tokio::spawn(async move { orchestrator.run(config(3)).await });
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(f.orchestrator.stop());
    assert!(!f.orchestrator.stop());

    let state = handle.await.unwrap().unwrap();
    assert_eq!(state.phase, RunPhase::Stopped);
    assert_eq!(f.presenter.messages_containing("stopped"), 1);

    assert!(!f.orchestrator.stop());
    assert_eq!(f.orchestrator.snapshot().await.phase, RunPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_start_while_running_is_rejected() {
    let f = fixture(&[Reply::Handle {
        active_ticks: usize::MAX,
        driving: 1000.0,
    }]);

    let orchestrator = Arc::clone(&f.orchestrator);
    let handle = tokio::spawn(async move { orchestrator.run(config(3)).await });
    tokio::time::sleep(Duration::from_secs(1)).await;

    let second = BenchmarkConfig::new(10, DemoDataset::SingaporeWest);
    let err = f.orchestrator.run(second).await.unwrap_err();
    assert!(matches!(err, BenchError::AlreadyRunning));

    let state = f.orchestrator.snapshot().await;
    assert_eq!(state.phase, RunPhase::Running);
    assert!(state.running);
    assert_eq!(state.config, Some(config(3)));
    assert_eq!(f.source.loads.load(Ordering::SeqCst), 1);

    f.orchestrator.stop();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_last_dispatch_reports_stopped() {
    let f = fixture_with(
        MockSolveClient::new(&[Reply::Direct(1000.0)]).with_submit_delay(Duration::from_secs(3)),
        MockSource::new(),
        RecordingPresenter::default(),
    );

    let orchestrator = Arc::clone(&f.orchestrator);
    let handle = tokio::spawn(async move { orchestrator.run(config(1)).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(f.orchestrator.stop());

    let state = handle.await.unwrap().unwrap();
    assert_eq!(state.phase, RunPhase::Stopped);
    assert_eq!(state.archive.len(), 1);
    assert_eq!(f.presenter.messages_containing("stopped"), 1);
    assert!(f.presenter.run_complete.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_while_stopped_run_winds_down() {
    let f = fixture_with(
        MockSolveClient::new(&[
            Reply::Direct(1000.0),
            Reply::Direct(2000.0),
            Reply::Direct(2000.0),
            Reply::Direct(2000.0),
        ])
        .with_submit_delay(Duration::from_secs(3)),
        MockSource::new(),
        RecordingPresenter::default(),
    );

    let orchestrator = Arc::clone(&f.orchestrator);
    let first = tokio::spawn(async move { orchestrator.run(config(3)).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(f.orchestrator.stop());
    assert!(!f.orchestrator.is_running());
    assert!(f.orchestrator.is_active());

    // The first run's dispatch is still in flight
    let err = f.orchestrator.run(config(3)).await.unwrap_err();
    assert!(matches!(err, BenchError::AlreadyRunning));
    assert_eq!(f.source.loads.load(Ordering::SeqCst), 1);

    let stopped = first.await.unwrap().unwrap();
    assert_eq!(stopped.phase, RunPhase::Stopped);
    assert_eq!(stopped.archive.metrics(), vec![20.0]);
    assert!(!f.orchestrator.is_active());

    let state = f.orchestrator.run(config(3)).await.unwrap();
    assert_eq!(state.phase, RunPhase::Completed);
    assert_eq!(state.archive.metrics(), vec![40.0, 40.0, 40.0]);
    let indices: Vec<usize> = (1..=3)
        .filter_map(|i| state.archive.iteration(i))
        .map(|entry| entry.result.index)
        .collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert_eq!(f.client.submit_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_new_run_resets_state() {
    let f = fixture(&[
        Reply::Direct(1000.0),
        Reply::Direct(1000.0),
        Reply::Direct(1000.0),
        Reply::Direct(2000.0),
        Reply::Direct(2000.0),
        Reply::Direct(2000.0),
    ]);

    f.orchestrator.run(config(3)).await.unwrap();
    let state = f.orchestrator.run(config(3)).await.unwrap();

    assert_eq!(state.archive.metrics(), vec![40.0, 40.0, 40.0]);
    assert_eq!(state.statistics.unwrap().count, 3);
    assert_eq!(f.source.loads.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Presenter Boundary
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_presenter_panic_does_not_affect_run() {
    let f = fixture_with(
        MockSolveClient::new(&[
            Reply::Direct(1000.0),
            Reply::Direct(1100.0),
            Reply::Direct(900.0),
        ]),
        MockSource::new(),
        RecordingPresenter {
            panic_on_iteration: true,
            ..Default::default()
        },
    );

    let state = f.orchestrator.run(config(3)).await.unwrap();
    assert_eq!(state.phase, RunPhase::Completed);
    assert_eq!(state.archive.len(), 3);
    assert_eq!(f.presenter.run_complete.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_presenter_errors_are_ignored() {
    let f = fixture_with(
        MockSolveClient::new(&[Reply::Direct(1000.0), Reply::Direct(1100.0), Reply::Direct(900.0)]),
        MockSource::new(),
        RecordingPresenter {
            fail_progress: true,
            ..Default::default()
        },
    );

    let state = f.orchestrator.run(config(3)).await.unwrap();
    assert_eq!(state.phase, RunPhase::Completed);
    assert!(f.presenter.messages_containing("Running iteration") >= 3);
}

#[tokio::test(start_paused = true)]
async fn test_replay_archived_iteration() {
    let f = fixture(&[Reply::Direct(1000.0), Reply::Direct(1100.0), Reply::Direct(900.0)]);
    f.orchestrator.run(config(3)).await.unwrap();

    let entry = f.orchestrator.replay(2).await.unwrap();
    assert_eq!(entry.result.index, 2);
    assert_eq!(entry.result.primary_metric, 22.0);
    assert_eq!(f.presenter.replays.load(Ordering::SeqCst), 1);

    assert!(f.orchestrator.replay(4).await.is_none());
    assert_eq!(f.presenter.replays.load(Ordering::SeqCst), 1);
}
