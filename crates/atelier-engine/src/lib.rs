//! Atelier Engine Library
//!
//! Clients for the three external collaborators (the diffusion engine, the
//! LLM runtime, and the TTS subprocess), the job-graph builders, and the
//! generation job poller that drives a job from submission to a locally
//! available artifact.

mod comfy;
mod error;
mod ollama;
mod poller;
mod proxy;
mod sweep;
mod tts;
mod workflows;

pub use comfy::{ComfyClient, EngineJobStatus, HistoryEntry, HistoryStatus};
pub use error::{EngineError, EngineResult};
pub use ollama::{fallback_reply, OllamaClient, FALLBACK_MODELS};
pub use poller::{JobPoller, JobSpec, JobTracker, PollerConfig};
pub use proxy::MediaProxy;
pub use sweep::{video_candidates, Candidate};
pub use tts::{parse_trailing_json, TtsAudio, TtsBridge};
pub use workflows::{build_image_graph, build_video_graph, random_seed};
