//! Image build launch

use crate::image::ImageTarget;
use crate::service::ImageBuildService;
use std::path::Path;

/// Launch an image build, fire-and-forget.
///
/// A failing launch is only logged. The status poll that follows is what
/// reports whether the build is actually running.
pub async fn start_build(builds: &dyn ImageBuildService, target: &ImageTarget, config_file: &Path) {
    tracing::info!(
        "Starting image build {} with {} ({})",
        target,
        config_file.display(),
        builds.name()
    );

    if let Err(e) = builds.build_image(target, config_file).await {
        tracing::warn!("build-image for {} did not succeed: {}", target, e);
    }
}
