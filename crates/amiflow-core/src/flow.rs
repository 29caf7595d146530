//! Entry-point flows
//!
//! - [`BuildFlows::start`]: version guard, then launch
//! - [`BuildFlows::build_and_watch`]: version guard, launch, poll, describe
//! - [`BuildFlows::watch`]: poll an existing build, describe
//! - [`BuildFlows::describe`]: describe only

use crate::driver::start_build;
use crate::error::Result;
use crate::image::{BuildRequest, ImageDescription, WatchRequest};
use crate::poller::{WatchOptions, watch_build};
use crate::service::{ImageBuildService, LogSink, LogSource};
use crate::version::ensure_version;

/// Image build flows over a pair of external services
pub struct BuildFlows<'a> {
    builds: &'a dyn ImageBuildService,
    logs: &'a dyn LogSource,
    options: WatchOptions,
}

impl<'a> BuildFlows<'a> {
    pub fn new(builds: &'a dyn ImageBuildService, logs: &'a dyn LogSource) -> Self {
        Self {
            builds,
            logs,
            options: WatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Check the pcluster version and launch the build
    pub async fn start(&self, request: &BuildRequest) -> Result<()> {
        ensure_version(self.builds, &request.expected_version).await?;
        start_build(self.builds, &request.target, &request.config_file).await;
        Ok(())
    }

    /// Launch the build and watch it to completion
    pub async fn build_and_watch(
        &self,
        request: &BuildRequest,
        sink: &mut dyn LogSink,
    ) -> Result<ImageDescription> {
        self.start(request).await?;
        self.watch(&WatchRequest::from(request), sink).await
    }

    /// Watch an existing build to completion and return its final description
    pub async fn watch(
        &self,
        request: &WatchRequest,
        sink: &mut dyn LogSink,
    ) -> Result<ImageDescription> {
        let report = watch_build(self.builds, self.logs, sink, &request.target, &self.options)
            .await?;
        tracing::info!(
            "Image build {} finished with {} after {} check(s)",
            request.target,
            report.last_status,
            report.iterations
        );
        self.describe(request).await
    }

    /// Fetch the current description of the image
    pub async fn describe(&self, request: &WatchRequest) -> Result<ImageDescription> {
        tracing::debug!(
            "Describing {} (output file {})",
            request.target,
            request.output_file.display()
        );
        self.builds.describe_image(&request.target).await
    }
}
