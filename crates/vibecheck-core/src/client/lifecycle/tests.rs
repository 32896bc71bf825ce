use super::*;
use crate::results::ConditionalResult;
use crate::suite::{Check, Checks, Eval, SuiteMetadata};
use std::collections::{HashMap, VecDeque};

/// Backend that replays a scripted status sequence per model.
///
/// The last status of a script repeats forever, so a script ending in
/// `running` models a run that never finishes.
#[derive(Default)]
struct ScriptedBackend {
    scripts: Mutex<HashMap<String, VecDeque<RunStatus>>>,
    run_models: Mutex<HashMap<String, String>>,
    polls: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
    cancelled: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn with_script(self, model: &str, statuses: Vec<RunStatus>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(model.to_string(), statuses.into());
        self
    }

    fn polls(&self) -> Vec<String> {
        self.polls.lock().unwrap().clone()
    }

    fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

impl RunBackend for ScriptedBackend {
    async fn submit(&self, suite: &EvalSuite, _yaml: Option<&str>) -> Result<String> {
        let run_id = format!("run-{}", suite.metadata.model);
        self.run_models
            .lock()
            .unwrap()
            .insert(run_id.clone(), suite.metadata.model.clone());
        Ok(run_id)
    }

    async fn poll(&self, run_id: &str) -> Result<RunStatus> {
        tokio::task::yield_now().await;

        let model = self.run_models.lock().unwrap()[run_id].clone();
        self.polls.lock().unwrap().push(run_id.to_string());

        let status = {
            let mut scripts = self.scripts.lock().unwrap();
            let script = scripts.get_mut(&model).unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        };

        if status.status.is_terminal() {
            self.finished.lock().unwrap().push(run_id.to_string());
        }
        Ok(status)
    }

    async fn cancel(&self, run_id: &str) -> Result<()> {
        self.cancelled.lock().unwrap().push(run_id.to_string());
        Ok(())
    }
}

fn suite(model: &str) -> EvalSuite {
    EvalSuite {
        metadata: SuiteMetadata {
            name: "lifecycle".to_string(),
            model: model.to_string(),
            system_prompt: None,
            threads: None,
            mcp_server: None,
        },
        evals: vec![Eval {
            prompt: "What is 2+2?".to_string(),
            checks: Checks::All(vec![Check::Match("*4*".to_string())]),
        }],
    }
}

fn eval_result(name: &str, passed: bool) -> EvalResult {
    EvalResult {
        eval_name: name.to_string(),
        prompt: name.to_string(),
        response: "4".to_string(),
        check_results: vec![ConditionalResult {
            kind: "match".to_string(),
            passed,
            message: "contains '4'".to_string(),
            children: Vec::new(),
        }],
        passed,
        execution_time_ms: Some(10),
        cost: None,
        model: None,
    }
}

fn status(state: RunState) -> RunStatus {
    RunStatus::new(state)
}

fn finished(state: RunState, results: Vec<EvalResult>) -> RunStatus {
    RunStatus {
        status: state,
        results: Some(results),
        error: None,
    }
}

fn failed(state: RunState, message: &str) -> RunStatus {
    RunStatus {
        status: state,
        results: None,
        error: Some(message.to_string()),
    }
}

fn options(interval_secs: u64, max_wait_secs: u64) -> PollOptions {
    PollOptions {
        interval: Duration::from_secs(interval_secs),
        max_wait: Duration::from_secs(max_wait_secs),
    }
}

fn lifecycle(
    backend: ScriptedBackend,
    opts: PollOptions,
) -> RunLifecycle<ScriptedBackend, Arc<ManualScheduler>> {
    RunLifecycle::new(backend, Arc::new(ManualScheduler::new()), opts)
}

#[tokio::test]
async fn test_queued_running_completed_returns_results() {
    let backend = ScriptedBackend::default().with_script(
        "m",
        vec![
            status(RunState::Queued),
            status(RunState::Running),
            finished(RunState::Completed, vec![eval_result("2+2", true)]),
        ],
    );
    let scheduler = Arc::new(ManualScheduler::new());
    let lifecycle = RunLifecycle::new(backend, Arc::clone(&scheduler), options(1, 60));

    let outcome = lifecycle.run_suite(&suite("m"), None).await.unwrap();

    assert_eq!(outcome.run_id, "run-m");
    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(outcome.results, vec![eval_result("2+2", true)]);
    assert_eq!(lifecycle.backend().polls().len(), 3);
    assert_eq!(
        scheduler.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(1)]
    );
    assert!(lifecycle.in_flight().is_empty());
}

#[tokio::test]
async fn test_partial_failure_is_data_not_error() {
    let backend = ScriptedBackend::default().with_script(
        "m",
        vec![finished(
            RunState::PartialFailure,
            vec![eval_result("a", true), eval_result("b", false)],
        )],
    );
    let lifecycle = lifecycle(backend, options(1, 60));

    let results = lifecycle.run_suite(&suite("m"), None).await.unwrap().results;
    assert_eq!(results.len(), 2);
    assert!(!results[1].passed);
}

#[tokio::test]
async fn test_completed_without_results_is_empty() {
    let backend = ScriptedBackend::default().with_script("m", vec![status(RunState::Completed)]);
    let lifecycle = lifecycle(backend, options(1, 60));

    let outcome = lifecycle.run_suite(&suite("m"), None).await.unwrap();
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn test_failed_and_error_states_carry_server_message() {
    for state in [RunState::Failed, RunState::Error] {
        let backend = ScriptedBackend::default().with_script(
            "m",
            vec![status(RunState::Running), failed(state.clone(), "model overloaded")],
        );
        let lifecycle = lifecycle(backend, options(1, 60));

        let err = lifecycle.run_suite(&suite("m"), None).await.unwrap_err();
        match err {
            VibeError::RunFailed {
                run_id,
                state: reported,
                message,
            } => {
                assert_eq!(run_id, "run-m");
                assert_eq!(reported, state);
                assert_eq!(message, "model overloaded");
            }
            other => panic!("expected RunFailed, got {other:?}"),
        }
        assert!(lifecycle.in_flight().is_empty());
    }
}

#[tokio::test]
async fn test_server_timeout_distinct_from_client_timeout() {
    let backend = ScriptedBackend::default()
        .with_script("m", vec![failed(RunState::TimedOut, "exceeded 300s")]);
    let lifecycle = lifecycle(backend, options(1, 60));

    let err = lifecycle.run_suite(&suite("m"), None).await.unwrap_err();
    assert!(matches!(err, VibeError::ServerTimedOut { ref message, .. } if message == "exceeded 300s"));
}

#[tokio::test]
async fn test_stuck_run_hits_client_ceiling() {
    let backend = ScriptedBackend::default().with_script("m", vec![status(RunState::Running)]);
    let lifecycle = lifecycle(backend, options(1, 5));

    let err = lifecycle.run_suite(&suite("m"), None).await.unwrap_err();
    match err {
        VibeError::PollTimeout { run_id, waited } => {
            assert_eq!(run_id, "run-m");
            assert_eq!(waited, Duration::from_secs(5));
        }
        other => panic!("expected PollTimeout, got {other:?}"),
    }
    assert_eq!(lifecycle.backend().polls().len(), 6);
    assert_eq!(lifecycle.in_flight(), vec!["run-m".to_string()]);
}

#[tokio::test]
async fn test_last_sleep_is_capped_at_ceiling() {
    let backend = ScriptedBackend::default().with_script("m", vec![status(RunState::Queued)]);
    let scheduler = Arc::new(ManualScheduler::new());
    let lifecycle = RunLifecycle::new(backend, Arc::clone(&scheduler), options(2, 5));

    let err = lifecycle.run_suite(&suite("m"), None).await.unwrap_err();
    assert!(matches!(err, VibeError::PollTimeout { .. }));
    assert_eq!(
        scheduler.sleeps(),
        vec![
            Duration::from_secs(2),
            Duration::from_secs(2),
            Duration::from_secs(1)
        ]
    );
}

#[tokio::test]
async fn test_unknown_state_keeps_polling() {
    let backend = ScriptedBackend::default().with_script(
        "m",
        vec![
            status(RunState::Unknown("provisioning".to_string())),
            finished(RunState::Completed, vec![eval_result("a", true)]),
        ],
    );
    let lifecycle = lifecycle(backend, options(1, 60));

    let outcome = lifecycle.run_suite(&suite("m"), None).await.unwrap();
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn test_server_cancelled_state() {
    let backend = ScriptedBackend::default().with_script("m", vec![status(RunState::Cancelled)]);
    let lifecycle = lifecycle(backend, options(1, 60));

    let err = lifecycle.run_suite(&suite("m"), None).await.unwrap_err();
    assert!(matches!(err, VibeError::RunCancelled { .. }));
}

#[tokio::test]
async fn test_wait_for_completion_on_existing_run() {
    let backend = ScriptedBackend::default().with_script(
        "m",
        vec![
            status(RunState::Running),
            finished(RunState::Completed, vec![eval_result("a", false)]),
        ],
    );
    backend
        .run_models
        .lock()
        .unwrap()
        .insert("existing".to_string(), "m".to_string());
    let lifecycle = lifecycle(backend, options(1, 60));

    let results = lifecycle.wait_for_completion("existing").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(lifecycle.backend().polls(), vec!["existing", "existing"]);
}

#[tokio::test]
async fn test_pre_cancelled_token_interrupts_without_polling() {
    let backend = ScriptedBackend::default().with_script("m", vec![status(RunState::Queued)]);
    let token = CancelToken::new();
    token.cancel();
    let lifecycle = lifecycle(backend, options(1, 60)).with_cancel_token(token);

    let err = lifecycle.run_suite(&suite("m"), None).await.unwrap_err();
    assert!(matches!(err, VibeError::Interrupted { ref run_id } if run_id == "run-m"));
    assert!(lifecycle.backend().polls().is_empty());
    // Still live on the server, so it stays available for cancellation
    assert_eq!(lifecycle.in_flight(), vec!["run-m".to_string()]);
}

#[tokio::test]
async fn test_cancel_wakes_sleeping_poll_loop() {
    let backend = ScriptedBackend::default().with_script("m", vec![status(RunState::Queued)]);
    let lifecycle = RunLifecycle::new(
        backend,
        TokioScheduler::new(),
        options(3600, 7200),
    );

    let token = lifecycle.cancel_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let started = std::time::Instant::now();
    let err = lifecycle.run_suite(&suite("m"), None).await.unwrap_err();

    assert!(matches!(err, VibeError::Interrupted { .. }));
    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(lifecycle.backend().polls().len(), 1);
}

#[tokio::test]
async fn test_cancel_forwards_to_backend() {
    let lifecycle = lifecycle(ScriptedBackend::default(), options(1, 60));
    lifecycle.cancel("run-x").await.unwrap();
    assert_eq!(
        *lifecycle.backend().cancelled.lock().unwrap(),
        vec!["run-x".to_string()]
    );
}

#[tokio::test]
async fn test_zero_interval_is_raised_to_floor() {
    let backend = ScriptedBackend::default().with_script("m", vec![status(RunState::Running)]);
    let scheduler = Arc::new(ManualScheduler::new());
    let opts = PollOptions {
        interval: Duration::ZERO,
        max_wait: Duration::from_millis(50),
    };
    let lifecycle = RunLifecycle::new(backend, Arc::clone(&scheduler), opts);

    let err = lifecycle.run_suite(&suite("m"), None).await.unwrap_err();
    assert!(matches!(err, VibeError::PollTimeout { .. }));
    let floor = Duration::from_millis(MIN_POLL_INTERVAL_MS);
    assert_eq!(scheduler.sleeps(), vec![floor; 5]);
    assert_eq!(lifecycle.backend().polls().len(), 6);
}

// Pipelines in a fan-out share one ManualScheduler, so each sleep advances
// the clock for every pipeline. Ceilings here are set far above the summed
// sleeps; these tests cover ordering and error propagation, not ceilings.

#[tokio::test]
async fn test_multi_model_results_follow_model_order() {
    let backend = ScriptedBackend::default()
        .with_script(
            "model-a",
            vec![
                status(RunState::Queued),
                status(RunState::Running),
                status(RunState::Running),
                finished(RunState::Completed, vec![eval_result("a1", true), eval_result("a2", false)]),
            ],
        )
        .with_script(
            "model-b",
            vec![finished(RunState::Completed, vec![eval_result("b1", true)])],
        );
    let lifecycle = lifecycle(backend, options(1, 60));
    let models = vec!["model-a".to_string(), "model-b".to_string()];

    let results = lifecycle.run_models(&suite("ignored"), &models).await.unwrap();

    // B finished first on the server, but A's results still come first.
    assert_eq!(lifecycle.backend().finished(), vec!["run-model-b", "run-model-a"]);
    let names: Vec<_> = results.iter().map(|r| r.eval_name.as_str()).collect();
    assert_eq!(names, vec!["a1", "a2", "b1"]);
    let stamped: Vec<_> = results.iter().map(|r| r.model.as_deref()).collect();
    assert_eq!(
        stamped,
        vec![Some("model-a"), Some("model-a"), Some("model-b")]
    );
}

#[tokio::test]
async fn test_multi_model_failure_propagates() {
    let backend = ScriptedBackend::default()
        .with_script(
            "model-a",
            vec![finished(RunState::Completed, vec![eval_result("a1", true)])],
        )
        .with_script("model-b", vec![failed(RunState::Error, "unknown model")]);
    let lifecycle = lifecycle(backend, options(1, 60));
    let models = vec!["model-a".to_string(), "model-b".to_string()];

    let err = lifecycle.run_models(&suite("x"), &models).await.unwrap_err();
    assert!(matches!(err, VibeError::RunFailed { ref run_id, .. } if run_id == "run-model-b"));
}

#[tokio::test]
async fn test_multi_model_early_failure_not_hidden_by_stuck_sibling() {
    let backend = ScriptedBackend::default()
        .with_script("model-a", vec![status(RunState::Running)])
        .with_script("model-b", vec![failed(RunState::Error, "unknown model")]);
    let lifecycle = lifecycle(backend, options(1, 600));
    let models = vec!["model-a".to_string(), "model-b".to_string()];

    let err = lifecycle.run_models(&suite("x"), &models).await.unwrap_err();
    match err {
        VibeError::RunFailed {
            run_id, message, ..
        } => {
            assert_eq!(run_id, "run-model-b");
            assert_eq!(message, "unknown model");
        }
        other => panic!("expected RunFailed, got {other:?}"),
    }

    // A was abandoned after a poll or two, not waited out to the ceiling.
    let a_polls = lifecycle
        .backend()
        .polls()
        .iter()
        .filter(|id| *id == "run-model-a")
        .count();
    assert!(a_polls <= 2, "run-model-a polled {a_polls} times");
    assert_eq!(lifecycle.in_flight(), vec!["run-model-a".to_string()]);
}

#[tokio::test]
async fn test_cancel_token_resolves_after_cancel() {
    let token = CancelToken::new();
    let waiter = token.clone();
    let handle = tokio::spawn(async move { waiter.cancelled().await });

    token.cancel();
    handle.await.unwrap();
    assert!(token.is_cancelled());
}
