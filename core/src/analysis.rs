//! One analysis run, end to end.
//!
//! ORDER (fixed):
//!   1. select subscribers   (pure; input errors abort here, before any network call)
//!   2. build prompt         (pure)
//!   3. call the model       (blocking; the only slow step)
//!   4. parse the response   (pure; never fails)
//!
//! RULES:
//!   - Input tables are shared read-only; a run never mutates them.
//!   - Every run returns its own immutable AnalysisResult. Nothing is cached
//!     between runs, so overlapping runs need no locking.

use crate::{
    dataset::{ProductCatalogue, SubscriberRecord, SubscriberTable},
    error::{RecError, RecResult},
    model::GenerativeModel,
    parser::{self, ParsedResponse},
    prompt,
    rng::SampleRng,
    selector::{self, SelectionMode, SelectionPolicy},
    types::RunId,
};
use chrono::{DateTime, Local};
use log::{info, warn};
use serde::Serialize;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// Operator configuration for one run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub policy: SelectionPolicy,
    /// Profiling fields mentioned in the prompt, in display order.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub run_id:             RunId,
    pub generated_at:       DateTime<Local>,
    pub selection_mode:     SelectionMode,
    /// Random mode asked for more rows than the table had.
    pub clamped:            bool,
    /// Sampling seed, when the run can be replayed.
    pub seed:               Option<u64>,
    pub fields:             Vec<String>,
    pub subscriber_headers: Vec<String>,
    pub subscribers:        Vec<SubscriberRecord>,
    pub prompt:             String,
    pub response:           String,
    pub parsed:             ParsedResponse,
}

impl AnalysisResult {
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn fields_label(&self) -> String {
        self.fields.join(", ")
    }
}

pub fn new_run_id() -> RunId {
    format!("run-{}", uuid::Uuid::new_v4())
}

pub fn run_analysis(
    request: &AnalysisRequest,
    subscribers: &SubscriberTable,
    catalogue: &ProductCatalogue,
    model: &dyn GenerativeModel,
    rng: &mut SampleRng,
) -> RecResult<AnalysisResult> {
    let run_id = new_run_id();
    let subset = selector::select(subscribers, request.policy, rng)?;
    info!("{run_id}: {} subscribers selected", subset.len());

    let prompt_text = prompt::build_prompt(&subset, catalogue, &request.fields);
    let response = model.generate(&prompt_text)?;

    let parsed = parser::parse(&response);
    match &parsed.table {
        Some(table) => info!(
            "{run_id}: {} recommendations, {} insights",
            table.len(),
            parsed.insights.len()
        ),
        None => warn!("{run_id}: no recommendation table in model response"),
    }

    Ok(AnalysisResult {
        run_id,
        generated_at: Local::now(),
        selection_mode: subset.policy.mode(),
        clamped: subset.clamped,
        seed: rng.seed(),
        fields: request.fields.clone(),
        subscriber_headers: subscribers.headers.clone(),
        subscribers: subset.records.iter().map(|r| (*r).clone()).collect(),
        prompt: prompt_text,
        response,
        parsed,
    })
}

// ── Background execution ──────────────────────────────────────────

/// A run executing on a worker thread.
///
/// Dropping the handle (or calling `abandon`) stops waiting for the result;
/// the worker finishes its pending model call and its output is discarded.
pub struct BackgroundRun {
    receiver: mpsc::Receiver<RecResult<AnalysisResult>>,
}

impl BackgroundRun {
    pub fn spawn(
        request: AnalysisRequest,
        subscribers: Arc<SubscriberTable>,
        catalogue: Arc<ProductCatalogue>,
        model: Arc<dyn GenerativeModel>,
        mut rng: SampleRng,
    ) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let result = run_analysis(&request, &subscribers, &catalogue, model.as_ref(), &mut rng);
            // The receiver is gone when the caller abandoned the run.
            let _ = sender.send(result);
        });
        Self { receiver }
    }

    /// Block until the run finishes.
    pub fn wait(self) -> RecResult<AnalysisResult> {
        self.receiver
            .recv()
            .map_err(|_| RecError::ExternalService("analysis worker exited without a result".to_string()))?
    }

    /// Wait up to `timeout`. `Ok(None)` means the run is still in flight.
    pub fn wait_timeout(&self, timeout: Duration) -> RecResult<Option<AnalysisResult>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result.map(Some),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RecError::ExternalService(
                "analysis worker exited without a result".to_string(),
            )),
        }
    }

    pub fn abandon(self) {
        info!("analysis run abandoned by caller");
    }
}
