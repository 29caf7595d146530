//! ParallelCluster image build service

use crate::pcluster::Pcluster;
use amiflow_core::{ImageBuildService, ImageDescription, ImageTarget};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Image builds through the pcluster CLI
#[derive(Default)]
pub struct PclusterProvider {
    pcluster: Pcluster,
}

impl PclusterProvider {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self {
            pcluster: Pcluster::new(bin),
        }
    }

    pub fn pcluster(&self) -> &Pcluster {
        &self.pcluster
    }
}

#[async_trait]
impl ImageBuildService for PclusterProvider {
    fn name(&self) -> &str {
        "pcluster"
    }

    async fn installed_version(&self) -> amiflow_core::Result<String> {
        Ok(self.pcluster.version().await?)
    }

    async fn build_image(&self, target: &ImageTarget, config_file: &Path) -> amiflow_core::Result<()> {
        let response = self.pcluster.build_image(target, config_file).await?;
        if let Some(image) = response.image {
            tracing::info!(
                "Image {} accepted: {}",
                image.image_id,
                image.image_build_status
            );
        }
        Ok(())
    }

    async fn describe_image(&self, target: &ImageTarget) -> amiflow_core::Result<ImageDescription> {
        Ok(self.pcluster.describe_image(target).await?)
    }
}
