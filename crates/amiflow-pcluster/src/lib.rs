//! ParallelCluster provider for amiflow
//!
//! This crate implements the `ImageBuildService` trait on top of the
//! ParallelCluster v3 CLI, enabling amiflow to launch and describe image
//! builds.
//!
//! # Requirements
//!
//! - `pcluster` CLI must be installed (`pip install aws-parallelcluster`)
//! - AWS credentials are resolved by pcluster itself
//!
//! # Example
//!
//! ```ignore
//! use amiflow_core::{ImageBuildService, ImageTarget};
//! use amiflow_pcluster::PclusterProvider;
//!
//! let provider = PclusterProvider::new("pcluster");
//! let version = provider.installed_version().await?;
//! let image = provider
//!     .describe_image(&ImageTarget::new("my-image", "us-east-1"))
//!     .await?;
//! ```

pub mod error;
pub mod pcluster;
pub mod provider;

pub use error::{PclusterError, Result};
pub use pcluster::{BuildImageResponse, ImageSummary, Pcluster, ValidationMessage};
pub use provider::PclusterProvider;
