//! Orchestration for the `values` delivery mode.
//!
//! One reconciliation pass queries the live deployments, diffs the named
//! deployment against the desired state, and issues the minimal set of
//! mutations. The image and replica axes are independent; when both need a
//! live mutation they run concurrently and both outcomes are joined, so a
//! failure on one axis never hides a failure on the other.

use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, instrument};

use crate::core::deployment::DesiredState;
use crate::core::plan::{self, DeploymentPlan, plan_deployment};
use crate::io::kubectl::ClusterControlPlane;

/// Converge the named deployment to the desired state.
///
/// Returns the terminal success message. The list query is the only
/// precondition: if it fails, reconciliation stops with no mutation issued.
#[instrument(skip_all, fields(deployment = %desired.name, dry_run = desired.dry_run))]
pub fn reconcile<C: ClusterControlPlane>(control: &C, desired: &DesiredState) -> Result<String> {
    let deployments = control.list_deployments().context("list deployments")?;
    let live = deployments.iter().find(|dep| dep.name == desired.name);
    debug!(found = live.is_some(), "looked up deployment");

    match plan_deployment(live, desired) {
        DeploymentPlan::Create {
            name,
            image,
            replicas,
        } => {
            if desired.dry_run {
                println!("{}", plan::create_dry_run_message(&name, &image, replicas));
            } else {
                control
                    .create_deployment(&name, &image, replicas, false)
                    .context("create deployment")?;
            }
            info!(%name, "deployment created");
            Ok(plan::created_message(&name))
        }
        DeploymentPlan::Converge {
            name,
            set_image,
            rescale,
        } => {
            if set_image.is_none() {
                let message = plan::skip_set_image_message(&name, &desired.image);
                debug!("{message}");
                println!("{message}");
            }
            if rescale.is_none() {
                let message = plan::skip_rescale_message(&name, desired.replicas);
                debug!("{message}");
                println!("{message}");
            }
            converge(control, &name, set_image.as_deref(), rescale, desired.dry_run)?;
            Ok(plan::image_converged_message(&desired.image))
        }
    }
}

/// Issue the mutations a converge plan calls for.
///
/// Dry run reports what would change and issues nothing. When both axes need
/// a live mutation, the two calls run on scoped threads and **both** results
/// are collected before reporting; all failed axes appear in the error.
fn converge<C: ClusterControlPlane>(
    control: &C,
    name: &str,
    set_image: Option<&str>,
    rescale: Option<u32>,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        if let Some(image) = set_image {
            println!("{}", plan::set_image_dry_run_message(name, image));
        }
        if let Some(replicas) = rescale {
            println!("{}", plan::rescale_dry_run_message(name, replicas));
        }
        return Ok(());
    }

    match (set_image, rescale) {
        (Some(image), Some(replicas)) => {
            let (image_result, scale_result) = thread::scope(|scope| {
                let image_handle = scope.spawn(|| control.set_image(name, image));
                let scale_handle = scope.spawn(|| control.scale_deployment(name, replicas));
                (join_mutation(image_handle), join_mutation(scale_handle))
            });

            let mut failures = Vec::new();
            if let Err(err) = image_result {
                failures.push(format!("set image: {err:#}"));
            }
            if let Err(err) = scale_result {
                failures.push(format!("scale: {err:#}"));
            }
            if !failures.is_empty() {
                bail!(
                    "updating deployment {name} failed:\n- {}",
                    failures.join("\n- ")
                );
            }
            Ok(())
        }
        (Some(image), None) => control.set_image(name, image).context("set image"),
        (None, Some(replicas)) => control
            .scale_deployment(name, replicas)
            .context("scale deployment"),
        (None, None) => Ok(()),
    }
}

fn join_mutation(handle: thread::ScopedJoinHandle<'_, Result<()>>) -> Result<()> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("mutation thread panicked")),
    }
}
