// src/providers/mod.rs

use crate::errors::Result;

pub mod openai;

/// A common trait for vision-capable model providers.
/// The service ships with an OpenAI-compatible implementation; anything
/// speaking the same chat-completions shape plugs in behind this seam.
///
/// Note: We're not using async_trait here, so implementers must handle async directly.
pub trait VisionProvider: Send + Sync {
    /// Sends an instruction prompt plus one inline image to the model.
    ///
    /// # Arguments
    /// * `prompt` - The fixed instruction text describing what to do with the image.
    /// * `image_data_url` - The image as a `data:image/...;base64,...` URL.
    ///
    /// # Returns
    /// A `Result` with the model's answer text and the call latency in milliseconds.
    fn analyze(
        &self,
        prompt: &str,
        image_data_url: &str,
    ) -> impl std::future::Future<Output = Result<(String, u64)>> + Send;
}
