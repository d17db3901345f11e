//! Cluster control-plane capability and its kubectl implementation.
//!
//! The [`ClusterControlPlane`] trait decouples reconciliation from the
//! actual cluster transport. Tests use recording fakes that return canned
//! deployments without spawning processes.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::core::deployment::{Deployment, parse_deployment_list};
use crate::io::process::{CommandOutput, run_command};
use crate::io::settings::ToolSettings;

/// Abstraction over the cluster control plane.
///
/// `Sync` is required because the reconciler issues independent mutations
/// concurrently from scoped threads.
pub trait ClusterControlPlane: Sync {
    /// List every deployment in the cluster.
    fn list_deployments(&self) -> Result<Vec<Deployment>>;

    /// Create a new deployment running `image` with `replicas` replicas.
    fn create_deployment(
        &self,
        name: &str,
        image: &str,
        replicas: u32,
        dry_run: bool,
    ) -> Result<()>;

    /// Point every container of `deployment` at `image`.
    fn set_image(&self, deployment: &str, image: &str) -> Result<()>;

    /// Resize `deployment` to `replicas` replicas.
    fn scale_deployment(&self, deployment: &str, replicas: u32) -> Result<()>;

    /// Apply a whole config document.
    fn apply_config(&self, path: &Path, dry_run: bool) -> Result<()>;
}

/// Control plane backed by a kubectl binary.
///
/// The handle is explicit: binary path, kubeconfig, and per-call limits all
/// come from [`ToolSettings`] passed at construction, never from globals.
pub struct Kubectl {
    settings: ToolSettings,
}

impl Kubectl {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.settings.kubectl_bin);
        cmd.args(args);
        if let Some(kubeconfig) = &self.settings.kubeconfig {
            cmd.arg(format!("--kubeconfig={}", kubeconfig.display()));
        }
        cmd
    }

    /// Run one kubectl call, turning timeouts and non-zero exits into errors
    /// that carry the exit code and captured stderr.
    #[instrument(skip(self), fields(kubectl = %self.settings.kubectl_bin))]
    fn run(&self, label: &str, args: &[&str]) -> Result<CommandOutput> {
        let cmd = self.command(args);
        let output = run_command(
            cmd,
            self.settings.call_timeout(),
            self.settings.output_limit_bytes,
        )
        .with_context(|| format!("run kubectl {label}"))?;

        if output.timed_out {
            bail!(
                "kubectl {label} timed out after {}s",
                self.settings.call_timeout_secs
            );
        }
        if !output.status.success() {
            bail!(
                "kubectl {label} failed with exit code {:?}: {}",
                output.status.code(),
                output.stderr_text().trim()
            );
        }
        debug!(label, "kubectl call succeeded");
        Ok(output)
    }
}

impl ClusterControlPlane for Kubectl {
    fn list_deployments(&self) -> Result<Vec<Deployment>> {
        let output = self.run("get deployments", &["get", "deployments", "-o", "json"])?;
        parse_deployment_list(&output.stdout_text())
    }

    fn create_deployment(
        &self,
        name: &str,
        image: &str,
        replicas: u32,
        dry_run: bool,
    ) -> Result<()> {
        info!(name, image, replicas, "creating deployment");
        let image_arg = format!("--image={image}");
        let replicas_arg = format!("--replicas={replicas}");
        let mut args = vec![
            "run",
            "--port=8080",
            "--record",
            name,
            image_arg.as_str(),
            replicas_arg.as_str(),
        ];
        if dry_run {
            args.push("--dry-run=true");
        }
        self.run("run", &args)?;
        Ok(())
    }

    fn set_image(&self, deployment: &str, image: &str) -> Result<()> {
        info!(deployment, image, "setting deployment image");
        let target = format!("deployment/{deployment}");
        let assignment = format!("{deployment}={image}");
        self.run(
            "set image",
            &["set", "image", "--record", &target, &assignment],
        )?;
        Ok(())
    }

    fn scale_deployment(&self, deployment: &str, replicas: u32) -> Result<()> {
        info!(deployment, replicas, "rescaling deployment");
        let replicas_arg = format!("--replicas={replicas}");
        self.run(
            "scale",
            &["scale", "deployment", deployment, &replicas_arg],
        )?;
        Ok(())
    }

    fn apply_config(&self, path: &Path, dry_run: bool) -> Result<()> {
        info!(path = %path.display(), dry_run, "applying config");
        let path_arg = path
            .to_str()
            .with_context(|| format!("non-utf8 config path {}", path.display()))?;
        let mut args = vec!["apply", "-f", path_arg];
        if dry_run {
            args.push("--dry-run=true");
        }
        self.run("apply", &args)?;
        Ok(())
    }
}
