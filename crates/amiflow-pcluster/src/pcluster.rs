//! pcluster CLI wrapper
//!
//! Wraps the ParallelCluster v3 CLI commands used for image builds. Every
//! command prints JSON on stdout, including error responses.

use crate::error::{PclusterError, Result};
use amiflow_core::{ImageDescription, ImageTarget};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// pcluster CLI wrapper
pub struct Pcluster {
    bin: PathBuf,
}

impl Default for Pcluster {
    fn default() -> Self {
        Self::new("pcluster")
    }
}

impl Pcluster {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Run a pcluster command and return stdout
    async fn run_command(&self, args: &[String], region: Option<&str>) -> Result<String> {
        let mut cmd = Command::new(&self.bin);
        cmd.args(args);
        if let Some(region) = region {
            cmd.env("AWS_DEFAULT_REGION", region);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", self.bin.display(), args.join(" "));

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PclusterError::PclusterNotFound(self.bin.display().to_string())
            } else {
                PclusterError::IoError(e)
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PclusterError::CommandFailed(error_message(&stdout, &stderr)));
        }

        Ok(stdout)
    }

    /// Installed pcluster version, e.g. "3.2.1"
    pub async fn version(&self) -> Result<String> {
        let output = self.run_command(&["version".to_string()], None).await?;
        parse_version(&output)
    }

    /// Launch an image build
    pub async fn build_image(
        &self,
        target: &ImageTarget,
        config_file: &Path,
    ) -> Result<BuildImageResponse> {
        let output = self
            .run_command(&build_image_args(target, config_file), Some(&target.region))
            .await?;

        let response: BuildImageResponse = serde_json::from_str(&output)?;
        for message in &response.validation_messages {
            tracing::warn!("pcluster validation [{}]: {}", message.level, message.message);
        }
        Ok(response)
    }

    /// Describe an image
    pub async fn describe_image(&self, target: &ImageTarget) -> Result<ImageDescription> {
        let output = self
            .run_command(&describe_image_args(target), Some(&target.region))
            .await
            .map_err(|e| match e {
                PclusterError::CommandFailed(msg) if msg.contains("No image or stack") => {
                    PclusterError::ImageNotFound(target.image_id.clone())
                }
                other => other,
            })?;

        let description: ImageDescription = serde_json::from_str(&output)?;
        Ok(description)
    }
}

/// Arguments for `pcluster build-image`
pub fn build_image_args(target: &ImageTarget, config_file: &Path) -> Vec<String> {
    vec![
        "build-image".to_string(),
        "--image-id".to_string(),
        target.image_id.clone(),
        "-r".to_string(),
        target.region.clone(),
        "-c".to_string(),
        config_file.display().to_string(),
    ]
}

/// Arguments for `pcluster describe-image`
pub fn describe_image_args(target: &ImageTarget) -> Vec<String> {
    vec![
        "describe-image".to_string(),
        "--image-id".to_string(),
        target.image_id.clone(),
        "--region".to_string(),
        target.region.clone(),
    ]
}

/// Output of `pcluster version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
}

fn parse_version(output: &str) -> Result<String> {
    match serde_json::from_str::<VersionInfo>(output) {
        Ok(info) => Ok(info.version),
        // pcluster 2.x prints a bare version string
        Err(_) if !output.trim().is_empty() && !output.trim_start().starts_with('{') => {
            Ok(output.trim().to_string())
        }
        Err(_) => Err(PclusterError::UnexpectedOutput(output.trim().to_string())),
    }
}

/// Pick the most useful error text from a failed command
fn error_message(stdout: &str, stderr: &str) -> String {
    if let Ok(response) = serde_json::from_str::<ErrorResponse>(stdout) {
        return response.message;
    }
    let stderr = stderr.trim();
    if stderr.is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.to_string()
    }
}

/// Error body printed by pcluster on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Output of `pcluster build-image`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildImageResponse {
    #[serde(default)]
    pub image: Option<ImageSummary>,

    #[serde(default)]
    pub validation_messages: Vec<ValidationMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub image_id: String,

    pub image_build_status: String,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub level: String,

    pub message: String,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}
