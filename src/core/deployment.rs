//! Typed cluster entities and desired-state validation.
//!
//! [`Deployment`] is a flattened view of the live cluster state for one
//! workload, built fresh from each `kubectl get deployments -o json`
//! response and discarded after one reconciliation pass.

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

/// Live cluster state for one named workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub name: String,
    pub replicas: u32,
    /// One image reference per container in the pod template, in order.
    pub images: Vec<String>,
}

/// Operator input for one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    pub name: String,
    /// Full image reference including tag.
    pub image: String,
    pub replicas: u32,
    pub dry_run: bool,
}

/// Parse a raw replica-count input.
///
/// Rejects non-integer and negative inputs before any cluster call is made;
/// both messages name the offending input.
pub fn parse_replicas(raw: &str) -> Result<u32> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("Number of Replicas must be a number but was {raw:?}."))?;
    if value < 0 {
        bail!("Number of Replicas must be positive, but was {value}.");
    }
    u32::try_from(value).with_context(|| format!("Number of Replicas {value} is out of range"))
}

// Wire shape of `kubectl get deployments -o json`. Only the fields the
// reconciler reads are modeled; everything else is ignored.

#[derive(Debug, Deserialize)]
struct WireDeploymentList {
    #[serde(default)]
    items: Vec<WireDeployment>,
}

#[derive(Debug, Deserialize)]
struct WireDeployment {
    metadata: WireMetadata,
    spec: WireSpec,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireSpec {
    #[serde(default)]
    replicas: u32,
    template: WireTemplate,
}

#[derive(Debug, Deserialize)]
struct WireTemplate {
    spec: WirePodSpec,
}

#[derive(Debug, Deserialize)]
struct WirePodSpec {
    #[serde(default)]
    containers: Vec<WireContainer>,
}

#[derive(Debug, Deserialize)]
struct WireContainer {
    #[serde(default)]
    image: String,
}

/// Parse the JSON payload of `kubectl get deployments -o json` into typed
/// entities.
pub fn parse_deployment_list(json: &str) -> Result<Vec<Deployment>> {
    let list: WireDeploymentList =
        serde_json::from_str(json).context("parse deployment list json")?;
    Ok(list
        .items
        .into_iter()
        .map(|item| Deployment {
            name: item.metadata.name,
            replicas: item.spec.replicas,
            images: item
                .spec
                .template
                .spec
                .containers
                .into_iter()
                .map(|container| container.image)
                .collect(),
        })
        .collect())
}
