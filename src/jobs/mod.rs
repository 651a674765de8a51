//! Model-run queue
//!
//! `POST /api/model/run` enqueues a scoring job and returns immediately.
//! A single [`ModelRunner`] task drains the channel and scores companies
//! against the mock dataset; job state lives in a shared map read by
//! `GET /api/model/jobs/{jobId}`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analytics;
use crate::mock::MockDataset;
use crate::types::{CompanyScore, JobStatus, ModelJob, ModelRunRequest};

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("model queue is full")]
    QueueFull,
    #[error("model runner has stopped")]
    RunnerStopped,
}

struct QueuedRun {
    job_id: String,
    request: ModelRunRequest,
}

type JobTable = Arc<RwLock<HashMap<String, ModelJob>>>;

/// Cloneable handle used by request handlers.
#[derive(Clone)]
pub struct ModelQueue {
    tx: mpsc::Sender<QueuedRun>,
    jobs: JobTable,
}

impl ModelQueue {
    /// Register a job and hand it to the runner.
    pub async fn enqueue(&self, request: ModelRunRequest) -> Result<ModelJob, JobError> {
        let job = ModelJob {
            job_id: uuid::Uuid::new_v4().to_string(),
            status: JobStatus::Queued,
            requested_at: Utc::now(),
            finished_at: None,
            result: None,
            error: None,
        };
        self.jobs.write().await.insert(job.job_id.clone(), job.clone());

        let run = QueuedRun {
            job_id: job.job_id.clone(),
            request,
        };
        if let Err(e) = self.tx.try_send(run) {
            self.jobs.write().await.remove(&job.job_id);
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => JobError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => JobError::RunnerStopped,
            });
        }

        debug!(job_id = %job.job_id, "Model run queued");
        Ok(job)
    }

    pub async fn status(&self, job_id: &str) -> Option<ModelJob> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

/// Background scorer.
pub struct ModelRunner {
    rx: mpsc::Receiver<QueuedRun>,
    jobs: JobTable,
    dataset: Arc<MockDataset>,
    dwell_window: usize,
    job_duration: Duration,
}

impl ModelRunner {
    /// Create a runner and the handle that feeds it.
    pub fn new(
        dataset: Arc<MockDataset>,
        dwell_window: usize,
        capacity: usize,
        job_duration: Duration,
    ) -> (Self, ModelQueue) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let jobs: JobTable = Arc::new(RwLock::new(HashMap::new()));
        let runner = Self {
            rx,
            jobs: Arc::clone(&jobs),
            dataset,
            dwell_window,
            job_duration,
        };
        (runner, ModelQueue { tx, jobs })
    }

    /// Process jobs until the channel closes or `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("Model runner started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Model runner cancelled");
                    break;
                }
                next = self.rx.recv() => {
                    let Some(run) = next else {
                        info!("Model queue closed");
                        break;
                    };
                    self.process(run).await;
                }
            }
        }
    }

    async fn process(&self, run: QueuedRun) {
        self.set_status(&run.job_id, JobStatus::Running).await;
        tokio::time::sleep(self.job_duration).await;

        let outcome = score(&self.dataset, &run.request, self.dwell_window);
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&run.job_id) else {
            return;
        };
        job.finished_at = Some(Utc::now());
        match outcome {
            Ok(scores) => {
                info!(job_id = %run.job_id, companies = scores.len(), "Model run finished");
                job.status = JobStatus::Done;
                job.result = Some(scores);
            }
            Err(message) => {
                warn!(job_id = %run.job_id, error = %message, "Model run failed");
                job.status = JobStatus::Failed;
                job.error = Some(message);
            }
        }
    }

    async fn set_status(&self, job_id: &str, status: JobStatus) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            job.status = status;
        }
    }
}

/// Score the requested companies, highest risk first.
pub fn score(dataset: &MockDataset, request: &ModelRunRequest, dwell_window: usize) -> Result<Vec<CompanyScore>, String> {
    let targets: Vec<_> = if request.company_ids.is_empty() {
        dataset.companies().iter().collect()
    } else {
        request
            .company_ids
            .iter()
            .map(|id| dataset.company(id).ok_or_else(|| format!("unknown company id '{id}'")))
            .collect::<Result<_, _>>()?
    };

    let mut scores: Vec<CompanyScore> = targets
        .into_iter()
        .map(|c| {
            let history: Vec<_> = dataset.records_for(&c.id).cloned().collect();
            CompanyScore {
                company_id: c.id.clone(),
                company_name: c.name.clone(),
                risk_level: c.risk_level,
                risk_score: c.risk_score,
                avg_dwell: analytics::summarize(&history, dwell_window).value,
            }
        })
        .collect();
    scores.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score).then_with(|| a.company_id.cmp(&b.company_id)));
    Ok(scores)
}
