//! Diffusion engine client
//!
//! Thin HTTP client for the engine's queue API: submit a job graph, read
//! job history, fetch produced files, and stage input images.

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Client for the diffusion engine's HTTP surface.
#[derive(Clone)]
pub struct ComfyClient {
    base_url: String,
    client: reqwest::Client,
}

/// Engine response to a job submission.
#[derive(Debug, Deserialize)]
struct PromptResponse {
    prompt_id: String,
}

/// Engine response to an input-image upload.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    name: Option<String>,
}

/// One entry of the engine's history map.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub status: Option<HistoryStatus>,
    #[serde(default)]
    pub outputs: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryStatus {
    #[serde(default)]
    pub status_str: Option<String>,
}

/// Job status derived from a history entry (or its absence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineJobStatus {
    Pending,
    Success,
    Error,
}

impl HistoryEntry {
    pub fn job_status(&self) -> EngineJobStatus {
        match self
            .status
            .as_ref()
            .and_then(|s| s.status_str.as_deref())
        {
            Some("success") => EngineJobStatus::Success,
            Some("error") => EngineJobStatus::Error,
            _ => EngineJobStatus::Pending,
        }
    }

    /// Exact output location reported for an image job, read from the save
    /// node's first image.
    pub fn image_output(&self, save_node: &str) -> Option<(String, String)> {
        let image = self
            .outputs
            .get(save_node)?
            .get("images")?
            .as_array()?
            .first()?;
        let filename = image.get("filename")?.as_str()?.to_string();
        let subfolder = image
            .get("subfolder")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .to_string();
        Some((filename, subfolder))
    }
}

impl ComfyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Submit a job graph; returns the engine-assigned prompt id.
    #[tracing::instrument(skip(self, graph))]
    pub async fn submit(&self, graph: &serde_json::Value) -> EngineResult<String> {
        let response = self
            .client
            .post(format!("{}/prompt", self.base_url))
            .json(&serde_json::json!({
                "prompt": graph,
                "client_id": uuid::Uuid::new_v4().to_string(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Unavailable(format!(
                "Engine responded with {}: {}",
                status, body
            )));
        }

        let result: PromptResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        tracing::info!(prompt_id = %result.prompt_id, "Job submitted to engine");
        Ok(result.prompt_id)
    }

    /// Read the history entry for a job. `None` means the engine has not
    /// recorded the job yet (still queued or running).
    pub async fn history(&self, prompt_id: &str) -> EngineResult<Option<HistoryEntry>> {
        let response = self
            .client
            .get(format!("{}/history/{}", self.base_url, prompt_id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EngineError::Unavailable(format!(
                "Engine responded with {}",
                response.status()
            )));
        }

        let mut map: std::collections::HashMap<String, HistoryEntry> = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        Ok(map.remove(prompt_id))
    }

    /// Fetch the bytes of a produced output file. A 404 is the expected
    /// case while probing video candidates.
    pub async fn view(&self, filename: &str, subfolder: &str) -> EngineResult<Vec<u8>> {
        let response = self
            .client
            .get(format!("{}/view", self.base_url))
            .query(&[
                ("filename", filename),
                ("subfolder", subfolder),
                ("type", "output"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EngineError::Fetch(format!(
                "{}/{} responded with {}",
                subfolder,
                filename,
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Stage an input image ahead of a video job. The engine assigns the
    /// final input filename, which must be round-tripped into the job graph
    /// verbatim.
    #[tracing::instrument(skip(self, data))]
    pub async fn upload_input(&self, data: Vec<u8>, filename: &str) -> EngineResult<String> {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(format!("{}/upload/image", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Unavailable(format!(
                "Input upload failed with {}: {}",
                status, body
            )));
        }

        let result: UploadResponse = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let uploaded = result.name.unwrap_or_else(|| filename.to_string());
        tracing::info!(uploaded_filename = %uploaded, "Input image staged on engine");
        Ok(uploaded)
    }

    /// Best-effort reachability probe.
    pub async fn is_available(&self) -> bool {
        match self
            .client
            .get(format!("{}/system_stats", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Remote URL for an output file, used as the display fallback when a
    /// local copy was never stored.
    pub fn view_url(&self, filename: &str, subfolder: &str) -> String {
        format!(
            "{}/view?filename={}&subfolder={}&type=output",
            self.base_url,
            urlencode(filename),
            urlencode(subfolder)
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn urlencode(value: &str) -> String {
    // Query-safe percent encoding for the small character set engine
    // filenames can contain.
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_mapping() {
        let pending: HistoryEntry = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(pending.job_status(), EngineJobStatus::Pending);

        let success: HistoryEntry = serde_json::from_value(serde_json::json!({
            "status": { "status_str": "success" },
            "outputs": {}
        }))
        .unwrap();
        assert_eq!(success.job_status(), EngineJobStatus::Success);

        let error: HistoryEntry = serde_json::from_value(serde_json::json!({
            "status": { "status_str": "error" }
        }))
        .unwrap();
        assert_eq!(error.job_status(), EngineJobStatus::Error);
    }

    #[test]
    fn test_image_output_location() {
        let entry: HistoryEntry = serde_json::from_value(serde_json::json!({
            "status": { "status_str": "success" },
            "outputs": {
                "9": { "images": [ { "filename": "fox.png", "subfolder": "out" } ] }
            }
        }))
        .unwrap();
        assert_eq!(
            entry.image_output("9"),
            Some(("fox.png".to_string(), "out".to_string()))
        );
        assert_eq!(entry.image_output("7"), None);
    }

    #[test]
    fn test_view_url_encodes_query() {
        let client = ComfyClient::new("http://localhost:8188");
        let url = client.view_url("a b.png", "out/dir");
        assert_eq!(
            url,
            "http://localhost:8188/view?filename=a%20b.png&subfolder=out%2Fdir&type=output"
        );
    }
}
