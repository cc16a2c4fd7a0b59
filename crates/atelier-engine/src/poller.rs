//! Generation job poller
//!
//! Drives a single generation job from submission to a locally available
//! artifact: submit the graph, poll history at a fixed interval, and on
//! success materialize the output (directly for images, via the candidate
//! sweep for videos).
//!
//! Job lifecycle is an explicit state machine (`submitted -> polling ->
//! success | error | abandoned`). A job that never reaches a terminal
//! engine status is abandoned after `max_poll_ticks`, so no poll loop runs
//! forever. Loops are independent; one tokio task per submitted job.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use atelier_core::models::{JobPhase, JobState, MediaKind, MediaRecord};
use atelier_store::{MediaJournal, StoredMedia};
use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::sleep;
use uuid::Uuid;

use crate::comfy::{ComfyClient, EngineJobStatus, HistoryEntry};
use crate::error::EngineResult;
use crate::proxy::MediaProxy;
use crate::sweep::video_candidates;
use crate::workflows::{build_image_graph, build_video_graph, random_seed, SAVE_NODE};

/// Tuning knobs for the poll loop and the video candidate sweep.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    /// Poll ticks before a job transitions to `abandoned`.
    pub max_poll_ticks: u32,
    /// Wait before the first sweep; video encoding takes time.
    pub sweep_initial_delay: Duration,
    /// Delay between full-sweep attempts, indexed by attempt number.
    pub sweep_attempt_delays: Vec<Duration>,
    pub sweep_max_attempts: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_poll_ticks: 600,
            sweep_initial_delay: Duration::from_secs(10),
            sweep_attempt_delays: vec![
                Duration::from_secs(2),
                Duration::from_secs(3),
                Duration::from_secs(5),
                Duration::from_secs(8),
                Duration::from_secs(10),
                Duration::from_secs(15),
                Duration::from_secs(20),
            ],
            sweep_max_attempts: 8,
        }
    }
}

/// In-memory map of job states, shared between the poller tasks and the
/// HTTP handlers that report on them.
#[derive(Clone, Default)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<Uuid, JobState>>>,
}

impl JobTracker {
    pub async fn get(&self, id: Uuid) -> Option<JobState> {
        self.jobs.read().await.get(&id).cloned()
    }

    async fn insert(&self, job: JobState) {
        self.jobs.write().await.insert(job.id, job);
    }

    async fn update(&self, id: Uuid, f: impl FnOnce(&mut JobState)) {
        if let Some(job) = self.jobs.write().await.get_mut(&id) {
            f(job);
            job.updated_at = Utc::now();
        }
    }
}

/// Generation inputs carried through to the journaled record.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub prompt: String,
    pub negative_prompt: String,
    /// Display reference of the source image; video jobs only.
    pub input_image: Option<String>,
}

/// How one poll loop ended.
enum PollOutcome {
    Completed(HistoryEntry),
    Failed(String),
    Abandoned,
}

#[derive(Clone)]
pub struct JobPoller {
    proxy: MediaProxy,
    image_journal: MediaJournal,
    video_journal: MediaJournal,
    tracker: JobTracker,
    config: Arc<PollerConfig>,
}

impl JobPoller {
    pub fn new(
        proxy: MediaProxy,
        image_journal: MediaJournal,
        video_journal: MediaJournal,
        config: PollerConfig,
    ) -> Self {
        Self {
            proxy,
            image_journal,
            video_journal,
            tracker: JobTracker::default(),
            config: Arc::new(config),
        }
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    fn comfy(&self) -> &ComfyClient {
        self.proxy.comfy()
    }

    /// Submit an image job and start its poll loop. Returns the initial
    /// job state immediately.
    #[tracing::instrument(skip(self, spec), fields(prompt_len = spec.prompt.len()))]
    pub async fn submit_image(&self, spec: JobSpec) -> EngineResult<JobState> {
        let graph = build_image_graph(&spec.prompt, &spec.negative_prompt, random_seed());
        let prompt_id = self.comfy().submit(&graph).await?;
        Ok(self.start(MediaKind::Image, prompt_id, spec).await)
    }

    /// Submit a video job for an already-staged input image and start its
    /// poll loop. `input_name` must be the engine-assigned upload name.
    #[tracing::instrument(skip(self, spec))]
    pub async fn submit_video(&self, spec: JobSpec, input_name: &str) -> EngineResult<JobState> {
        let graph = build_video_graph(&spec.prompt, &spec.negative_prompt, input_name);
        let prompt_id = self.comfy().submit(&graph).await?;
        Ok(self.start(MediaKind::Video, prompt_id, spec).await)
    }

    async fn start(&self, kind: MediaKind, prompt_id: String, spec: JobSpec) -> JobState {
        let job = JobState::new(kind, prompt_id);
        self.tracker.insert(job.clone()).await;

        let poller = self.clone();
        let task_job = job.clone();
        tokio::spawn(async move {
            poller.drive(task_job, spec).await;
        });

        job
    }

    /// Run one job to a terminal phase.
    async fn drive(self, job: JobState, spec: JobSpec) {
        let job_id = job.id;
        self.tracker
            .update(job_id, |j| j.phase = JobPhase::Polling)
            .await;

        let outcome = self.poll_until_terminal(&job.prompt_id).await;

        match outcome {
            PollOutcome::Abandoned => {
                tracing::warn!(
                    job_id = %job_id,
                    prompt_id = %job.prompt_id,
                    max_ticks = self.config.max_poll_ticks,
                    "Job abandoned: no terminal engine status"
                );
                self.tracker
                    .update(job_id, |j| {
                        j.phase = JobPhase::Abandoned;
                        j.message = Some(format!(
                            "No terminal status after {} polls",
                            self.config.max_poll_ticks
                        ));
                    })
                    .await;
            }
            PollOutcome::Failed(message) => {
                tracing::warn!(job_id = %job_id, message = %message, "Generation failed");
                self.tracker
                    .update(job_id, |j| {
                        j.phase = JobPhase::Error;
                        j.message = Some(message);
                    })
                    .await;
            }
            PollOutcome::Completed(entry) => match job.kind {
                MediaKind::Image => self.finish_image(job_id, &job.prompt_id, &entry, &spec).await,
                MediaKind::Video => self.finish_video(job_id, &job.prompt_id, &spec).await,
            },
        }
    }

    async fn poll_until_terminal(&self, prompt_id: &str) -> PollOutcome {
        let mut ticks = 0u32;
        loop {
            if ticks >= self.config.max_poll_ticks {
                return PollOutcome::Abandoned;
            }

            match self.comfy().history(prompt_id).await {
                Err(e) => {
                    return PollOutcome::Failed(format!("Failed to check generation status: {}", e))
                }
                Ok(Some(entry)) => match entry.job_status() {
                    EngineJobStatus::Success => return PollOutcome::Completed(entry),
                    EngineJobStatus::Error => {
                        return PollOutcome::Failed("Generation failed".to_string())
                    }
                    EngineJobStatus::Pending => {}
                },
                Ok(None) => {}
            }

            ticks += 1;
            sleep(self.config.poll_interval).await;
        }
    }

    async fn finish_image(&self, job_id: Uuid, prompt_id: &str, entry: &HistoryEntry, spec: &JobSpec) {
        let Some((filename, subfolder)) = entry.image_output(SAVE_NODE) else {
            self.tracker
                .update(job_id, |j| {
                    j.phase = JobPhase::Error;
                    j.message = Some("Engine reported no image output".to_string());
                })
                .await;
            return;
        };

        match self
            .proxy
            .fetch_and_store(&filename, &subfolder, MediaKind::Image)
            .await
        {
            Ok(stored) => {
                let record =
                    self.make_record(prompt_id, &subfolder, spec, Some(stored), filename.clone());
                self.journal_and_succeed(job_id, MediaKind::Image, record, None)
                    .await;
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Image download failed, keeping remote reference");
                let record = self.make_record(prompt_id, &subfolder, spec, None, filename);
                self.journal_and_succeed(
                    job_id,
                    MediaKind::Image,
                    record,
                    Some("Image generated but could not be downloaded locally".to_string()),
                )
                .await;
            }
        }
    }

    /// Locate and persist a finished video via the candidate sweep. The
    /// engine's output struct does not reliably report video locations, so
    /// every candidate is probed per attempt, with increasing delays
    /// between attempts. Exhaustion still journals a fallback record so the
    /// job is never silently dropped.
    async fn finish_video(&self, job_id: Uuid, prompt_id: &str, spec: &JobSpec) {
        sleep(self.config.sweep_initial_delay).await;

        let candidates = video_candidates();
        for attempt in 0..self.config.sweep_max_attempts {
            tracing::debug!(
                job_id = %job_id,
                attempt = attempt + 1,
                max_attempts = self.config.sweep_max_attempts,
                "Video download sweep"
            );

            for candidate in &candidates {
                match self
                    .proxy
                    .fetch_and_store(&candidate.filename, &candidate.subfolder, MediaKind::Video)
                    .await
                {
                    Ok(stored) => {
                        tracing::info!(
                            job_id = %job_id,
                            filename = %candidate.filename,
                            subfolder = %candidate.subfolder,
                            "Video located"
                        );
                        let record = self.make_record(
                            prompt_id,
                            &candidate.subfolder,
                            spec,
                            Some(stored),
                            candidate.filename.clone(),
                        );
                        self.journal_and_succeed(job_id, MediaKind::Video, record, None)
                            .await;
                        return;
                    }
                    // Expected while the file is still encoding or lives
                    // elsewhere; try the next candidate.
                    Err(_) => continue,
                }
            }

            if attempt + 1 < self.config.sweep_max_attempts {
                let delay = self
                    .config
                    .sweep_attempt_delays
                    .get(attempt)
                    .or_else(|| self.config.sweep_attempt_delays.last())
                    .copied()
                    .unwrap_or(Duration::ZERO);
                sleep(delay).await;
            }
        }

        // All candidates and retries exhausted: keep a placeholder record
        // so the job is not lost from the gallery.
        let fallback_name = format!("vid_{}.mp4", Utc::now().timestamp_millis());
        let record = self.make_record(prompt_id, "HV15Out", spec, None, fallback_name);
        self.journal_and_succeed(
            job_id,
            MediaKind::Video,
            record,
            Some("Video generated but could not be downloaded locally".to_string()),
        )
        .await;
    }

    fn make_record(
        &self,
        prompt_id: &str,
        subfolder: &str,
        spec: &JobSpec,
        stored: Option<StoredMedia>,
        engine_filename: String,
    ) -> MediaRecord {
        let (filename, local_path, local_filename) = match stored {
            Some(stored) => (
                stored.filename.clone(),
                Some(stored.local_path),
                Some(stored.filename),
            ),
            None => (engine_filename, None, None),
        };
        MediaRecord {
            filename,
            subfolder: subfolder.to_string(),
            job_id: prompt_id.to_string(),
            local_path,
            local_filename,
            prompt: Some(spec.prompt.clone()),
            negative_prompt: Some(spec.negative_prompt.clone()),
            input_image: spec.input_image.clone(),
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    async fn journal_and_succeed(
        &self,
        job_id: Uuid,
        kind: MediaKind,
        record: MediaRecord,
        message: Option<String>,
    ) {
        let journal = match kind {
            MediaKind::Image => &self.image_journal,
            MediaKind::Video => &self.video_journal,
        };
        if let Err(e) = journal.append(record.clone()).await {
            tracing::error!(job_id = %job_id, error = %e, "Failed to journal media record");
        }

        self.tracker
            .update(job_id, |j| {
                j.phase = JobPhase::Success;
                j.message = message;
                j.record = Some(record);
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_store::MediaLibrary;
    use axum::extract::Path;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use tempfile::tempdir;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn test_config() -> PollerConfig {
        PollerConfig {
            poll_interval: Duration::ZERO,
            max_poll_ticks: 50,
            sweep_initial_delay: Duration::ZERO,
            sweep_attempt_delays: vec![Duration::ZERO],
            sweep_max_attempts: 2,
        }
    }

    fn poller_for(base_url: &str, dir: &std::path::Path, config: PollerConfig) -> JobPoller {
        let comfy = ComfyClient::new(base_url);
        let library = MediaLibrary::new(dir, "/media");
        let proxy = MediaProxy::new(comfy, library);
        JobPoller::new(
            proxy,
            MediaJournal::new(dir, MediaKind::Image),
            MediaJournal::new(dir, MediaKind::Video),
            config,
        )
    }

    async fn wait_terminal(poller: &JobPoller, id: Uuid) -> JobState {
        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if let Some(job) = poller.tracker().get(id).await {
                    if job.phase.is_terminal() {
                        return job;
                    }
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("job did not reach a terminal phase")
    }

    fn spec() -> JobSpec {
        JobSpec {
            prompt: "a red fox".to_string(),
            negative_prompt: "blurry".to_string(),
            input_image: None,
        }
    }

    #[tokio::test]
    async fn test_image_job_success_downloads_and_journals() {
        let router = Router::new()
            .route(
                "/prompt",
                post(|| async { Json(serde_json::json!({"prompt_id": "p1"})) }),
            )
            .route(
                "/history/{id}",
                get(|Path(id): Path<String>| async move {
                    Json(serde_json::json!({
                        id: {
                            "status": {"status_str": "success"},
                            "outputs": {"9": {"images": [{"filename": "fox.png", "subfolder": "out"}]}}
                        }
                    }))
                }),
            )
            .route("/view", get(|| async { b"png bytes".to_vec() }));
        let base_url = serve(router).await;

        let dir = tempdir().unwrap();
        let poller = poller_for(&base_url, dir.path(), test_config());

        let job = poller.submit_image(spec()).await.unwrap();
        assert_eq!(job.prompt_id, "p1");

        let done = wait_terminal(&poller, job.id).await;
        assert_eq!(done.phase, JobPhase::Success);
        assert!(done.message.is_none());

        let record = done.record.expect("record");
        assert!(record.local_path.is_some());
        assert!(record.filename.ends_with("_fox.png"));
        assert_eq!(record.subfolder, "out");
        assert_eq!(record.job_id, "p1");
        assert_eq!(record.prompt.as_deref(), Some("a red fox"));

        // Record was prepended to the image journal
        let journal = MediaJournal::new(dir.path(), MediaKind::Image);
        let records = journal.list().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, record.filename);
    }

    #[tokio::test]
    async fn test_engine_error_stops_polling_without_record() {
        let router = Router::new()
            .route(
                "/prompt",
                post(|| async { Json(serde_json::json!({"prompt_id": "p2"})) }),
            )
            .route(
                "/history/{id}",
                get(|Path(id): Path<String>| async move {
                    Json(serde_json::json!({
                        id: { "status": {"status_str": "error"}, "outputs": {} }
                    }))
                }),
            );
        let base_url = serve(router).await;

        let dir = tempdir().unwrap();
        let poller = poller_for(&base_url, dir.path(), test_config());

        let job = poller.submit_image(spec()).await.unwrap();
        let done = wait_terminal(&poller, job.id).await;

        assert_eq!(done.phase, JobPhase::Error);
        assert!(done.record.is_none());

        let journal = MediaJournal::new(dir.path(), MediaKind::Image);
        assert!(journal.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_video_sweep_exhaustion_creates_fallback_record() {
        // No /view route: every candidate probe 404s.
        let router = Router::new()
            .route(
                "/prompt",
                post(|| async { Json(serde_json::json!({"prompt_id": "p3"})) }),
            )
            .route(
                "/history/{id}",
                get(|Path(id): Path<String>| async move {
                    Json(serde_json::json!({
                        id: { "status": {"status_str": "success"}, "outputs": {} }
                    }))
                }),
            );
        let base_url = serve(router).await;

        let dir = tempdir().unwrap();
        let poller = poller_for(&base_url, dir.path(), test_config());

        let job = poller
            .submit_video(spec(), "input_image_001.jpg")
            .await
            .unwrap();
        let done = wait_terminal(&poller, job.id).await;

        assert_eq!(done.phase, JobPhase::Success);
        assert!(done
            .message
            .as_deref()
            .unwrap()
            .contains("could not be downloaded"));

        let record = done.record.expect("fallback record");
        assert!(record.local_path.is_none());
        assert!(record.filename.starts_with("vid_"));
        assert!(record.filename.ends_with(".mp4"));
        assert_eq!(record.subfolder, "HV15Out");

        let journal = MediaJournal::new(dir.path(), MediaKind::Video);
        assert_eq!(journal.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_video_sweep_finds_candidate() {
        let router = Router::new()
            .route(
                "/prompt",
                post(|| async { Json(serde_json::json!({"prompt_id": "p4"})) }),
            )
            .route(
                "/history/{id}",
                get(|Path(id): Path<String>| async move {
                    Json(serde_json::json!({
                        id: { "status": {"status_str": "success"}, "outputs": {} }
                    }))
                }),
            )
            .route(
                "/view",
                get(
                    |axum::extract::Query(q): axum::extract::Query<
                        std::collections::HashMap<String, String>,
                    >| async move {
                        if q.get("filename").map(String::as_str) == Some("vid_00002_.mp4")
                            && q.get("subfolder").map(String::as_str) == Some("HV15Out")
                        {
                            Ok(b"mp4 bytes".to_vec())
                        } else {
                            Err(axum::http::StatusCode::NOT_FOUND)
                        }
                    },
                ),
            );
        let base_url = serve(router).await;

        let dir = tempdir().unwrap();
        let poller = poller_for(&base_url, dir.path(), test_config());

        let mut video_spec = spec();
        video_spec.input_image = Some("/media/images/source.png".to_string());
        let job = poller
            .submit_video(video_spec, "input_image_001.jpg")
            .await
            .unwrap();
        let done = wait_terminal(&poller, job.id).await;

        assert_eq!(done.phase, JobPhase::Success);
        let record = done.record.expect("record");
        assert!(record.local_path.is_some());
        assert!(record.filename.ends_with("_vid_00002_.mp4"));
        assert_eq!(
            record.input_image.as_deref(),
            Some("/media/images/source.png")
        );
    }

    #[tokio::test]
    async fn test_job_abandoned_after_max_ticks() {
        let router = Router::new()
            .route(
                "/prompt",
                post(|| async { Json(serde_json::json!({"prompt_id": "p5"})) }),
            )
            // Engine never records the job
            .route(
                "/history/{id}",
                get(|| async { Json(serde_json::json!({})) }),
            );
        let base_url = serve(router).await;

        let dir = tempdir().unwrap();
        let mut config = test_config();
        config.max_poll_ticks = 3;
        let poller = poller_for(&base_url, dir.path(), config);

        let job = poller.submit_image(spec()).await.unwrap();
        let done = wait_terminal(&poller, job.id).await;

        assert_eq!(done.phase, JobPhase::Abandoned);
        assert!(done.message.as_deref().unwrap().contains("3"));
        assert!(done.record.is_none());
    }

    #[tokio::test]
    async fn test_submit_fails_when_engine_offline() {
        let dir = tempdir().unwrap();
        // Port 1 is never listening
        let poller = poller_for("http://127.0.0.1:1", dir.path(), test_config());

        let result = poller.submit_image(spec()).await;
        assert!(matches!(
            result,
            Err(crate::error::EngineError::Unavailable(_))
        ));
    }
}
