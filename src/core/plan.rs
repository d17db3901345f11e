//! Deployment diffing and user-facing progress messages.
//!
//! [`plan_deployment`] compares the live deployment (if any) against the
//! desired state and decides which mutations are needed. The image and
//! replica axes are independent: each may be a no-op on its own.

use crate::core::deployment::{Deployment, DesiredState};

/// The mutations one reconciliation pass needs to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentPlan {
    /// The deployment does not exist; create it with the desired values.
    Create {
        name: String,
        image: String,
        replicas: u32,
    },
    /// The deployment exists; converge each axis that differs.
    Converge {
        name: String,
        /// New full image reference, or `None` if every container already
        /// runs the desired image.
        set_image: Option<String>,
        /// New replica count, or `None` if the count already matches.
        rescale: Option<u32>,
    },
}

/// Diff desired state against the live deployment.
///
/// The image axis needs action unless every container's reference equals the
/// desired full image string (including tag). The replica axis needs action
/// iff the counts differ.
pub fn plan_deployment(live: Option<&Deployment>, desired: &DesiredState) -> DeploymentPlan {
    let Some(live) = live else {
        return DeploymentPlan::Create {
            name: desired.name.clone(),
            image: desired.image.clone(),
            replicas: desired.replicas,
        };
    };

    let image_differs = live.images.iter().any(|image| *image != desired.image);
    let replicas_differ = live.replicas != desired.replicas;

    DeploymentPlan::Converge {
        name: desired.name.clone(),
        set_image: image_differs.then(|| desired.image.clone()),
        rescale: replicas_differ.then_some(desired.replicas),
    }
}

fn replica_word(replicas: u32) -> &'static str {
    if replicas == 1 { "replica" } else { "replicas" }
}

pub fn created_message(name: &str) -> String {
    format!("Deployment {name} created.")
}

pub fn create_dry_run_message(name: &str, image: &str, replicas: u32) -> String {
    format!(
        "Deployment {name} created with image {image} and {replicas} {}. (dry run)",
        replica_word(replicas)
    )
}

pub fn image_converged_message(image: &str) -> String {
    format!("Deployment image set to {image}.")
}

pub fn set_image_dry_run_message(name: &str, image: &str) -> String {
    format!("Deployment {name} image set to {image}. (dry run)")
}

pub fn rescale_dry_run_message(name: &str, replicas: u32) -> String {
    format!(
        "Deployment {name} rescaled to {replicas} {}. (dry run)",
        replica_word(replicas)
    )
}

pub fn skip_set_image_message(name: &str, image: &str) -> String {
    format!("Deployment {name} already uses image {image}.")
}

pub fn skip_rescale_message(name: &str, replicas: u32) -> String {
    format!(
        "Deployment {name} has {replicas} {}. Skipping rescaling.",
        replica_word(replicas)
    )
}
