//! Image builder abstraction

use crate::error::SliceResult;
use async_trait::async_trait;
use std::path::Path;

/// Builds a container image from a directory holding a Dockerfile
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Check if the builder can be used on this system
    async fn is_available(&self) -> bool;

    /// Build `context_dir` as `tag`, reporting each output line
    async fn build_image(
        &self,
        context_dir: &Path,
        tag: &str,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> SliceResult<()>;

    /// Human-readable builder name for display
    fn name(&self) -> &str;
}
