//! CI build task that deploys a containerized workload to a GKE cluster.
//!
//! The task has two delivery modes selected by a single `deployType` input:
//!
//! - **config**: rewrite the image references embedded in a Kubernetes
//!   config document (JSON or YAML) to a new tag, then `kubectl apply` the
//!   whole document.
//! - **values**: converge one named deployment's image and replica count to
//!   explicit desired values, creating the deployment if it does not exist.
//!
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (image matching, config
//!   patching, deployment diffing, replica validation). No I/O, fully
//!   testable in isolation.
//! - **[`io`]**: Side-effecting operations (child processes, kubectl
//!   invocation, config-document files). Isolated to enable fakes in tests.
//!
//! Orchestration modules ([`apply`], [`reconcile`], [`task`]) coordinate
//! core logic with I/O to implement the two delivery modes.

pub mod apply;
pub mod core;
pub mod io;
pub mod logging;
pub mod reconcile;
pub mod task;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
