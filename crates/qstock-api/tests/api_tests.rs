//! Integration tests for the Quantum Stock Prediction API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use qstock_api::api::predict::run_prediction;
use qstock_api::{AppState, PredictSettings, create_router};
use qstock_hal::{
    Backend, BackendAvailability, Counts, ExecutionResult, HalError, HalResult, JobId, JobStatus,
};
use qstock_ir::Circuit;
use serde_json::{Value, json};

// ============================================================================
// Test helpers
// ============================================================================

/// How the fake backend behaves on each call.
enum Script {
    /// Run to completion with these counts after `polls` running polls.
    Complete { counts: Vec<(&'static str, u64)>, polls: usize },
    /// Report the device as down.
    Unavailable(&'static str),
    /// Reject the submission.
    RejectSubmit(&'static str),
    /// Accept the job, then fail it.
    FailJob(&'static str),
    /// Accept the job, then cancel it.
    CancelJob,
    /// Panic while submitting.
    PanicOnSubmit,
}

struct FakeBackend {
    script: Script,
    polls: AtomicUsize,
    submitted_shots: AtomicUsize,
    cancels: AtomicUsize,
}

impl FakeBackend {
    fn new(script: Script) -> Self {
        Self {
            script,
            polls: AtomicUsize::new(0),
            submitted_shots: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn name(&self) -> &str {
        "fake_perth"
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        match self.script {
            Script::Unavailable(reason) => Ok(BackendAvailability::unavailable(reason)),
            _ => Ok(BackendAvailability::always_available()),
        }
    }

    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        assert_eq!(circuit.num_qubits(), 2);
        self.submitted_shots.store(shots as usize, Ordering::SeqCst);

        match self.script {
            Script::RejectSubmit(msg) => Err(HalError::SubmissionFailed(msg.into())),
            Script::PanicOnSubmit => panic!("backend exploded"),
            _ => Ok(JobId::new("job-42")),
        }
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        let seen = self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.script {
            Script::Complete { polls, .. } if seen < *polls => JobStatus::Running,
            Script::Complete { .. } => JobStatus::Completed,
            Script::FailJob(msg) => JobStatus::Failed((*msg).to_string()),
            Script::CancelJob => JobStatus::Cancelled,
            _ => JobStatus::Queued,
        })
    }

    async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
        match &self.script {
            Script::Complete { counts, .. } => {
                let counts = Counts::from_pairs(counts.iter().copied());
                let shots = counts.total_shots() as u32;
                Ok(ExecutionResult::new(counts, shots))
            }
            _ => Err(HalError::Backend("no result".into())),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        assert_eq!(job_id, &JobId::new("job-42"));
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn settings() -> PredictSettings {
    PredictSettings {
        shots: 1024,
        poll_interval: Duration::from_millis(1),
    }
}

fn test_server_with(backend: Arc<FakeBackend>) -> TestServer {
    let state = Arc::new(AppState::new(backend).with_predict_settings(settings()));
    TestServer::new(create_router(state, "*")).expect("test server")
}

fn test_server(script: Script) -> TestServer {
    test_server_with(Arc::new(FakeBackend::new(script)))
}

fn bell_script() -> Script {
    Script::Complete {
        counts: vec![("00", 512), ("11", 512)],
        polls: 0,
    }
}

// ============================================================================
// Informational endpoints
// ============================================================================

async fn assert_static(path: &str, expected: Value) {
    let server = test_server(bell_script());
    let response = server.get(path).await;
    response.assert_status_ok();
    response.assert_json(&expected);
}

#[tokio::test]
async fn test_root() {
    assert_static(
        "/",
        json!({"message": "Welcome to the Quantum Stock Prediction API. Use /predict to get predictions."}),
    )
    .await;
}

#[tokio::test]
async fn test_health() {
    assert_static("/health", json!({"status": "ok"})).await;
}

#[tokio::test]
async fn test_version() {
    assert_static(
        "/version",
        json!({
            "version": "1.0.0",
            "description": "Quantum Stock Prediction API using Qiskit and IBM Quantum."
        }),
    )
    .await;
}

#[tokio::test]
async fn test_docs() {
    assert_static(
        "/docs",
        json!({"message": "API documentation is available at /docs."}),
    )
    .await;
}

#[tokio::test]
async fn test_about() {
    assert_static(
        "/about",
        json!({
            "name": "Quantum Stock Prediction API from AccelCQ",
            "version": "1.0.0",
            "description": "An API that uses quantum computing to predict stock market trends.",
            "author": "Your Name",
            "contact": "ranjan@accelcq.com"
        }),
    )
    .await;
}

#[tokio::test]
async fn test_contact() {
    assert_static(
        "/contact",
        json!({
            "email": "ranjan@accelcq.com",
            "phone": "+1234567890",
            "website": "https://www.accelcq.com",
            "social_media": {
                "twitter": "@accelcq",
                "linkedin": "https://www.linkedin.com/company/accelcq"
            }
        }),
    )
    .await;
}

#[tokio::test]
async fn test_privacy() {
    assert_static(
        "/privacy",
        json!({
            "policy": "We respect your privacy. No personal data is collected through this API.",
            "data_usage": "Data is used solely for the purpose of providing quantum stock predictions.",
            "contact": "For any privacy concerns, please contact us at ranjan@accelcq.com"
        }),
    )
    .await;
}

#[tokio::test]
async fn test_terms() {
    assert_static(
        "/terms",
        json!({
            "terms": "By using this API, you agree to the terms and conditions set forth by AccelCQ.",
            "usage": "The API is provided 'as is' without any warranties.",
            "liability": "AccelCQ is not liable for any damages arising from the use of this API.",
            "contact": "For any inquiries, please contact us at ranjan@accelcq.com"
        }),
    )
    .await;
}

#[tokio::test]
async fn test_feedback() {
    assert_static(
        "/feedback",
        json!({
            "message": "We welcome your feedback to improve our API.",
            "email": "ranjan@accelcq.com"
        }),
    )
    .await;
}

#[tokio::test]
async fn test_support() {
    assert_static(
        "/support",
        json!({"message": "For support, please contact us at ranjan@accelcq.com"}),
    )
    .await;
}

#[tokio::test]
async fn test_static_endpoints_ignore_backend_state() {
    let server = test_server(Script::PanicOnSubmit);
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({"status": "ok"}));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = test_server(bell_script());
    let response = server.get("/nope").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

// ============================================================================
// Prediction
// ============================================================================

#[tokio::test]
async fn test_predict_returns_probabilities() {
    let backend = Arc::new(FakeBackend::new(Script::Complete {
        counts: vec![("00", 600), ("11", 400), ("01", 24)],
        polls: 3,
    }));
    let server = test_server_with(backend.clone());

    let response = server.get("/predict").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let map = body.as_object().unwrap();
    assert_eq!(map.len(), 3);
    assert!(map.get("error").is_none());

    let p00 = body["00"].as_f64().unwrap();
    let p11 = body["11"].as_f64().unwrap();
    let p01 = body["01"].as_f64().unwrap();
    assert!((p00 - 600.0 / 1024.0).abs() < 1e-12);
    assert!((p11 - 400.0 / 1024.0).abs() < 1e-12);
    assert!((p00 + p11 + p01 - 1.0).abs() < 1e-12);

    // Three running polls, then the completed one.
    assert_eq!(backend.polls.load(Ordering::SeqCst), 4);
    assert_eq!(backend.submitted_shots.load(Ordering::SeqCst), 1024);
    assert_eq!(backend.cancels.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_predict_keys_are_sorted() {
    let server = test_server(Script::Complete {
        counts: vec![("11", 1), ("00", 1), ("10", 1)],
        polls: 0,
    });

    let text = server.get("/predict").await.text();
    let first = text.find("\"00\"").unwrap();
    let second = text.find("\"10\"").unwrap();
    let third = text.find("\"11\"").unwrap();
    assert!(first < second && second < third);
}

async fn assert_predict_error(script: Script, expected_fragment: &str) {
    let server = test_server(script);
    let response = server.get("/predict").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let map = body.as_object().unwrap();
    assert_eq!(map.len(), 1, "error body has a single field: {body}");

    let error = body["error"].as_str().unwrap();
    assert!(
        error.contains(expected_fragment),
        "error {error:?} should mention {expected_fragment:?}"
    );
}

#[tokio::test]
async fn test_predict_unavailable_backend() {
    assert_predict_error(Script::Unavailable("maintenance"), "maintenance").await;
}

#[tokio::test]
async fn test_predict_rejected_submission() {
    assert_predict_error(Script::RejectSubmit("quota exceeded"), "quota exceeded").await;
}

#[tokio::test]
async fn test_predict_failed_job() {
    assert_predict_error(Script::FailJob("calibration error"), "calibration error").await;
}

#[tokio::test]
async fn test_predict_cancelled_job() {
    assert_predict_error(Script::CancelJob, "cancelled").await;
}

#[tokio::test]
async fn test_predict_empty_result() {
    assert_predict_error(
        Script::Complete {
            counts: vec![],
            polls: 0,
        },
        "job-42",
    )
    .await;
}

#[tokio::test]
async fn test_predict_backend_panic_is_reported() {
    assert_predict_error(Script::PanicOnSubmit, "backend exploded").await;
}

#[tokio::test]
async fn test_server_survives_predict_panic() {
    let server = test_server(Script::PanicOnSubmit);

    server.get("/predict").await.assert_status_ok();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_abandoned_prediction_cancels_job() {
    let backend = Arc::new(FakeBackend::new(Script::Complete {
        counts: vec![("00", 1)],
        polls: usize::MAX,
    }));
    let shared: Arc<dyn Backend> = backend.clone();
    let task = tokio::spawn(run_prediction(shared, settings()));

    // Give up once the job is being polled.
    while backend.polls.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.cancels.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("abandoned job is cancelled");
    assert_eq!(backend.cancels.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_job_is_not_cancelled() {
    let backend = Arc::new(FakeBackend::new(Script::FailJob("calibration error")));
    let shared: Arc<dyn Backend> = backend.clone();

    let err = run_prediction(shared, settings()).await.unwrap_err();
    assert!(err.to_string().contains("calibration error"));

    tokio::task::yield_now().await;
    assert_eq!(backend.cancels.load(Ordering::SeqCst), 0);
}
