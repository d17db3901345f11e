//! Top-level task dispatch.
//!
//! Mirrors the build task's input surface: a `deployType` discriminant
//! selects the delivery mode, and each mode validates the inputs it needs
//! before touching the cluster.

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use tracing::instrument;

use crate::apply::{self, ApplyRequest};
use crate::core::deployment::{DesiredState, parse_replicas};
use crate::core::image::ImageRule;
use crate::io::kubectl::ClusterControlPlane;
use crate::reconcile;

/// Raw task inputs, per-mode fields optional.
#[derive(Debug, Clone, Default)]
pub struct TaskInputs {
    /// Delivery mode: `config` or `values`.
    pub deploy_type: String,
    pub dry_run: bool,

    // config mode
    pub config_path: Option<PathBuf>,
    pub update_tag: bool,

    // both modes
    pub image_name: Option<String>,
    pub image_tag: Option<String>,

    // values mode
    pub deployment_name: Option<String>,
    pub replicas: Option<String>,
}

/// Run the task in the mode `deploy_type` selects.
///
/// Returns the terminal success message; any other `deploy_type` value fails
/// fast without a cluster call.
#[instrument(skip_all, fields(deploy_type = %inputs.deploy_type))]
pub fn run_task<C: ClusterControlPlane>(inputs: &TaskInputs, control: &C) -> Result<String> {
    match inputs.deploy_type.as_str() {
        "config" => run_config_mode(inputs, control),
        "values" => run_values_mode(inputs, control),
        other => bail!("Invalid deployType {other:?}. Expected \"config\" or \"values\"."),
    }
}

fn run_config_mode<C: ClusterControlPlane>(inputs: &TaskInputs, control: &C) -> Result<String> {
    let config_path = inputs
        .config_path
        .as_deref()
        .ok_or_else(|| anyhow!("missing required input --config-path"))?;

    let rule = if inputs.update_tag {
        Some(ImageRule::new(
            require(inputs.image_name.as_ref(), "--image-name")?,
            require(inputs.image_tag.as_ref(), "--image-tag")?,
        )?)
    } else {
        None
    };

    apply::apply_config(
        control,
        &ApplyRequest {
            config_path,
            rule,
            dry_run: inputs.dry_run,
        },
    )
}

fn run_values_mode<C: ClusterControlPlane>(inputs: &TaskInputs, control: &C) -> Result<String> {
    let name = require(inputs.deployment_name.as_ref(), "--deployment-name")?;
    let image_name = require(inputs.image_name.as_ref(), "--image-name")?;
    let image_tag = require(inputs.image_tag.as_ref(), "--image-tag")?;
    let raw_replicas = require(inputs.replicas.as_ref(), "--replicas")?;

    // Validation precedes every cluster call.
    let replicas = parse_replicas(raw_replicas)?;

    let desired = DesiredState {
        name: name.to_string(),
        image: format!("{image_name}:{image_tag}"),
        replicas,
        dry_run: inputs.dry_run,
    };
    reconcile::reconcile(control, &desired)
}

fn require<'a>(value: Option<&'a String>, flag: &str) -> Result<&'a str> {
    value
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing required input {flag}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingControlPlane;

    fn values_inputs(replicas: &str) -> TaskInputs {
        TaskInputs {
            deploy_type: "values".to_string(),
            deployment_name: Some("web".to_string()),
            image_name: Some("gcr.io/project/app".to_string()),
            image_tag: Some("v2".to_string()),
            replicas: Some(replicas.to_string()),
            ..TaskInputs::default()
        }
    }

    #[test]
    fn unknown_deploy_type_fails_fast() {
        let control = RecordingControlPlane::new();
        let inputs = TaskInputs {
            deploy_type: "canary".to_string(),
            ..TaskInputs::default()
        };
        let err = run_task(&inputs, &control).unwrap_err();
        assert!(err.to_string().contains("canary"));
        assert!(control.calls().is_empty());
    }

    #[test]
    fn non_numeric_replicas_fail_before_any_cluster_call() {
        let control = RecordingControlPlane::new();
        let err = run_task(&values_inputs("abc"), &control).unwrap_err();
        assert!(err.to_string().contains("abc"));
        assert!(control.calls().is_empty());
    }

    #[test]
    fn negative_replicas_fail_before_any_cluster_call() {
        let control = RecordingControlPlane::new();
        let err = run_task(&values_inputs("-4"), &control).unwrap_err();
        assert!(err.to_string().contains("-4"));
        assert!(control.calls().is_empty());
    }

    #[test]
    fn missing_values_inputs_are_named() {
        let control = RecordingControlPlane::new();
        let mut inputs = values_inputs("3");
        inputs.deployment_name = None;
        let err = run_task(&inputs, &control).unwrap_err();
        assert!(err.to_string().contains("--deployment-name"));
        assert!(control.calls().is_empty());
    }

    #[test]
    fn config_mode_requires_image_inputs_only_with_update_tag() {
        let control = RecordingControlPlane::new();
        let inputs = TaskInputs {
            deploy_type: "config".to_string(),
            config_path: Some(PathBuf::from("/nope/deploy.yaml")),
            update_tag: true,
            ..TaskInputs::default()
        };
        let err = run_task(&inputs, &control).unwrap_err();
        assert!(err.to_string().contains("--image-name"));
        assert!(control.calls().is_empty());
    }
}
