//! Image build requests and descriptions

use crate::status::{BuildPhase, classify};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Expected pcluster version when none is configured
pub const DEFAULT_PCLUSTER_VERSION: &str = "3.2";

/// An image in a region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTarget {
    pub image_id: String,
    pub region: String,
}

impl ImageTarget {
    pub fn new(image_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            region: region.into(),
        }
    }
}

impl std::fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.image_id, self.region)
    }
}

/// Parameters for launching an image build
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub target: ImageTarget,

    /// pcluster image configuration file
    pub config_file: PathBuf,

    /// Carried through for the caller; never written by the flows
    pub output_file: PathBuf,

    /// Substring the installed pcluster version must contain
    pub expected_version: String,
}

/// Parameters for watching an existing image build
#[derive(Debug, Clone)]
pub struct WatchRequest {
    pub target: ImageTarget,

    /// Carried through for the caller; never written by the flows
    pub output_file: PathBuf,
}

impl From<&BuildRequest> for WatchRequest {
    fn from(request: &BuildRequest) -> Self {
        Self {
            target: request.target.clone(),
            output_file: request.output_file.clone(),
        }
    }
}

/// Result of `pcluster describe-image`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescription {
    pub image_id: String,

    pub image_build_status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_build_logs_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudformation_stack_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec2_ami_info: Option<AmiInfo>,

    /// Remaining fields, preserved as reported
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ImageDescription {
    pub fn new(image_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            image_build_status: status.into(),
            image_build_logs_arn: None,
            region: None,
            version: None,
            cloudformation_stack_status: None,
            ec2_ami_info: None,
            extra: HashMap::new(),
        }
    }

    pub fn with_logs_arn(mut self, arn: impl Into<String>) -> Self {
        self.image_build_logs_arn = Some(arn.into());
        self
    }

    pub fn phase(&self) -> BuildPhase {
        classify(&self.image_build_status)
    }

    /// The AMI id, once the build has produced one
    pub fn ami_id(&self) -> Option<&str> {
        self.ec2_ami_info.as_ref().map(|info| info.ami_id.as_str())
    }
}

/// EC2 AMI details of a finished image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmiInfo {
    pub ami_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ami_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}
