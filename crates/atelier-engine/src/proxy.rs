//! Media proxy
//!
//! Translates local requests into calls against the engine's HTTP surface
//! and materializes remote artifacts onto local storage.

use atelier_core::models::MediaKind;
use atelier_store::{MediaLibrary, StoreError, StoredMedia};

use crate::comfy::ComfyClient;
use crate::error::EngineResult;

#[derive(Clone)]
pub struct MediaProxy {
    comfy: ComfyClient,
    library: MediaLibrary,
}

impl MediaProxy {
    pub fn new(comfy: ComfyClient, library: MediaLibrary) -> Self {
        Self { comfy, library }
    }

    pub fn comfy(&self) -> &ComfyClient {
        &self.comfy
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Fetch an output file from the engine and persist it under a
    /// timestamped local name. Returns the stable local path.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_and_store(
        &self,
        filename: &str,
        subfolder: &str,
        kind: MediaKind,
    ) -> EngineResult<StoredMedia> {
        let data = self.comfy.view(filename, subfolder).await?;
        let stored = self.library.save(kind, filename, &data).await?;
        Ok(stored)
    }

    /// Re-stage a previously generated image as a fresh engine input.
    /// The engine partitions input and output storage, so outputs cannot be
    /// referenced directly as inputs. Prefers the local library copy and
    /// falls back to re-fetching from the engine's output tree.
    #[tracing::instrument(skip(self))]
    pub async fn copy_from_gallery_to_input(
        &self,
        filename: &str,
        subfolder: &str,
    ) -> EngineResult<String> {
        let data = match self.library.read(MediaKind::Image, filename).await {
            Ok(data) => data,
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(
                    filename,
                    subfolder,
                    "Image not in local library, re-fetching from engine output"
                );
                self.comfy.view(filename, subfolder).await?
            }
            Err(e) => return Err(e.into()),
        };

        self.comfy.upload_input(data, "input_image.jpg").await
    }
}
