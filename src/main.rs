//! Deploy a containerized workload to a GKE cluster.
//!
//! Two delivery modes, selected by `--deploy-type`:
//!
//! - `config`: apply a Kubernetes config document, optionally rewriting its
//!   image references to a new tag first.
//! - `values`: converge a named deployment's image and replica count,
//!   creating the deployment if it does not exist.
//!
//! Credentials are assumed to be established by the surrounding CI step
//! (kubeconfig and service-account scope); this binary only drives kubectl.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use deploy_gke::io::kubectl::Kubectl;
use deploy_gke::io::settings::load_settings;
use deploy_gke::logging;
use deploy_gke::task::{TaskInputs, run_task};

#[derive(Parser)]
#[command(
    name = "deploy-gke",
    version,
    about = "Deploy a container image to a GKE cluster"
)]
struct Cli {
    /// Delivery mode: "config" applies a config file, "values" converges a
    /// named deployment.
    #[arg(long)]
    deploy_type: String,

    /// Compute and report changes without mutating the cluster.
    #[arg(long)]
    dry_run: bool,

    /// Tool settings TOML (kubectl binary, kubeconfig, timeouts).
    #[arg(long, default_value = "deploy-gke.toml")]
    settings: PathBuf,

    /// Path to the Kubernetes config document (config mode).
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Rewrite matching image references in the config before applying.
    #[arg(long)]
    update_tag: bool,

    /// Image repository to deploy (values mode, or config mode with
    /// --update-tag).
    #[arg(long)]
    image_name: Option<String>,

    /// Image tag to deploy.
    #[arg(long)]
    image_tag: Option<String>,

    /// Name of the deployment to create or converge (values mode).
    #[arg(long)]
    deployment_name: Option<String>,

    /// Desired replica count (values mode).
    #[arg(long)]
    replicas: Option<String>,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.settings)?;
    let kubectl = Kubectl::new(settings);

    let inputs = TaskInputs {
        deploy_type: cli.deploy_type,
        dry_run: cli.dry_run,
        config_path: cli.config_path,
        update_tag: cli.update_tag,
        image_name: cli.image_name,
        image_tag: cli.image_tag,
        deployment_name: cli.deployment_name,
        replicas: cli.replicas,
    };

    let message = run_task(&inputs, &kubectl)?;
    println!("{message}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_values_mode() {
        let cli = Cli::parse_from([
            "deploy-gke",
            "--deploy-type",
            "values",
            "--deployment-name",
            "web",
            "--image-name",
            "gcr.io/project/app",
            "--image-tag",
            "v2",
            "--replicas",
            "3",
            "--dry-run",
        ]);
        assert_eq!(cli.deploy_type, "values");
        assert!(cli.dry_run);
        assert_eq!(cli.replicas.as_deref(), Some("3"));
    }

    #[test]
    fn parse_config_mode() {
        let cli = Cli::parse_from([
            "deploy-gke",
            "--deploy-type",
            "config",
            "--config-path",
            "k8s/deploy.yaml",
            "--update-tag",
            "--image-name",
            "gcr.io/project/app",
            "--image-tag",
            "v2",
        ]);
        assert_eq!(cli.deploy_type, "config");
        assert!(cli.update_tag);
        assert_eq!(cli.config_path, Some(PathBuf::from("k8s/deploy.yaml")));
    }
}
