//! Image builds through a docker-compatible CLI

use crate::build::{build_error_output, stream_child_output, ImageBuilder};
use crate::error::{SliceError, SliceResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `<program> build -t <tag> <dir>`; works for docker and podman
pub struct CliImageBuilder {
    program: String,
}

impl CliImageBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ImageBuilder for CliImageBuilder {
    async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn build_image(
        &self,
        context_dir: &Path,
        tag: &str,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> SliceResult<()> {
        let context = context_dir.display().to_string();
        let args = ["build", "-t", tag, context.as_str()];
        debug!("Executing: {} {:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SliceError::RuntimeNotFound(self.program.clone()),
                _ => SliceError::command_failed(format!("{} build", self.program), e),
            })?;

        let all_output = stream_child_output(&mut child, on_output).await;

        let status = child
            .wait()
            .await
            .map_err(|e| SliceError::command_failed(format!("{} build", self.program), e))?;

        if !status.success() {
            return Err(SliceError::ImageBuild {
                tag: tag.to_string(),
                reason: build_error_output(&all_output.join("\n"), ""),
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
