//! Test-only fakes for the cluster control plane.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use crate::core::deployment::Deployment;
use crate::io::kubectl::ClusterControlPlane;

/// One recorded control-plane call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDeployments,
    CreateDeployment {
        name: String,
        image: String,
        replicas: u32,
        dry_run: bool,
    },
    SetImage {
        deployment: String,
        image: String,
    },
    ScaleDeployment {
        deployment: String,
        replicas: u32,
    },
    ApplyConfig {
        path: PathBuf,
        dry_run: bool,
    },
}

/// Control plane that records calls and answers from canned deployments.
///
/// Individual operations can be scripted to fail; the deployment list is
/// static, so repeated reconciliation against an already-converged state
/// models an unchanged cluster.
#[derive(Debug, Default)]
pub struct RecordingControlPlane {
    deployments: Vec<Deployment>,
    calls: Mutex<Vec<Call>>,
    fail_list: bool,
    fail_create: bool,
    fail_set_image: bool,
    fail_scale: bool,
    fail_apply: bool,
}

impl RecordingControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deployment(mut self, deployment: Deployment) -> Self {
        self.deployments.push(deployment);
        self
    }

    pub fn fail_list_deployments(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn fail_set_image(mut self) -> Self {
        self.fail_set_image = true;
        self
    }

    pub fn fail_scale(mut self) -> Self {
        self.fail_scale = true;
        self
    }

    pub fn fail_apply(mut self) -> Self {
        self.fail_apply = true;
        self
    }

    /// Every call issued so far, in issue order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl ClusterControlPlane for RecordingControlPlane {
    fn list_deployments(&self) -> Result<Vec<Deployment>> {
        self.record(Call::ListDeployments);
        if self.fail_list {
            return Err(anyhow!("scripted list failure"));
        }
        Ok(self.deployments.clone())
    }

    fn create_deployment(
        &self,
        name: &str,
        image: &str,
        replicas: u32,
        dry_run: bool,
    ) -> Result<()> {
        self.record(Call::CreateDeployment {
            name: name.to_string(),
            image: image.to_string(),
            replicas,
            dry_run,
        });
        if self.fail_create {
            return Err(anyhow!("scripted create failure"));
        }
        Ok(())
    }

    fn set_image(&self, deployment: &str, image: &str) -> Result<()> {
        self.record(Call::SetImage {
            deployment: deployment.to_string(),
            image: image.to_string(),
        });
        if self.fail_set_image {
            return Err(anyhow!("scripted set-image failure"));
        }
        Ok(())
    }

    fn scale_deployment(&self, deployment: &str, replicas: u32) -> Result<()> {
        self.record(Call::ScaleDeployment {
            deployment: deployment.to_string(),
            replicas,
        });
        if self.fail_scale {
            return Err(anyhow!("scripted scale failure"));
        }
        Ok(())
    }

    fn apply_config(&self, path: &Path, dry_run: bool) -> Result<()> {
        self.record(Call::ApplyConfig {
            path: path.to_path_buf(),
            dry_run,
        });
        if self.fail_apply {
            return Err(anyhow!("scripted apply failure"));
        }
        Ok(())
    }
}

/// Build a deterministic live deployment for tests.
pub fn deployment(name: &str, replicas: u32, images: &[&str]) -> Deployment {
    Deployment {
        name: name.to_string(),
        replicas,
        images: images.iter().map(ToString::to_string).collect(),
    }
}
