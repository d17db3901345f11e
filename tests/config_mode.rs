//! End-to-end tests for the `config` delivery mode: patch the document on
//! disk, then apply it through a recording control plane.

use std::fs;
use std::path::PathBuf;

use deploy_gke::task::{TaskInputs, run_task};
use deploy_gke::test_support::{Call, RecordingControlPlane};

fn inputs(config_path: PathBuf, update_tag: bool, dry_run: bool) -> TaskInputs {
    TaskInputs {
        deploy_type: "config".to_string(),
        dry_run,
        config_path: Some(config_path),
        update_tag,
        image_name: Some("gcr.io/project/app".to_string()),
        image_tag: Some("newtag".to_string()),
        ..TaskInputs::default()
    }
}

const TWO_CONTAINER_YAML: &str = "\
apiVersion: apps/v1
kind: Deployment
spec:
  template:
    spec:
      containers:
        - name: app
          image: gcr.io/project/app:old
        - name: job
          image: gcr.io/project/app:old
";

/// Every matching `image` field is rewritten, across array indices.
#[test]
fn patches_every_occurrence_then_applies() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("deploy.yaml");
    fs::write(&path, TWO_CONTAINER_YAML).expect("seed");

    let control = RecordingControlPlane::new();
    let message = run_task(&inputs(path.clone(), true, false), &control).expect("task");
    assert!(message.contains("Applied config"));

    let patched = fs::read_to_string(&path).expect("read");
    assert_eq!(patched.matches("gcr.io/project/app:newtag").count(), 2);
    assert!(!patched.contains(":old"));

    assert_eq!(
        control.calls(),
        vec![Call::ApplyConfig {
            path: path.clone(),
            dry_run: false,
        }]
    );
}

/// A document naming a different repository is applied unchanged.
#[test]
fn other_repository_is_left_unchanged() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("deploy.yaml");
    fs::write(&path, "spec:\n  image: other-repo:old\n").expect("seed");

    let control = RecordingControlPlane::new();
    run_task(&inputs(path.clone(), true, false), &control).expect("task");

    let contents = fs::read_to_string(&path).expect("read");
    assert!(contents.contains("other-repo:old"));
}

/// A JSON document that fails JSON parsing but succeeds as YAML is patched
/// via YAML and re-serialized as YAML.
#[test]
fn yaml_fallback_serializes_as_yaml() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("deploy.conf");
    fs::write(&path, "spec:\n  image: gcr.io/project/app:old\n").expect("seed");

    let control = RecordingControlPlane::new();
    run_task(&inputs(path.clone(), true, false), &control).expect("task");

    let contents = fs::read_to_string(&path).expect("read");
    assert!(contents.contains("gcr.io/project/app:newtag"));
    assert!(!contents.trim_start().starts_with('{'));
}

/// Both parser failures are reported and the file is never overwritten.
#[test]
fn unparseable_document_fails_without_writing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("deploy.conf");
    let original = "{broken json\n\t- : - broken yaml";
    fs::write(&path, original).expect("seed");

    let control = RecordingControlPlane::new();
    let err = run_task(&inputs(path.clone(), true, false), &control).unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("JSON:"), "{message}");
    assert!(message.contains("YAML:"), "{message}");
    assert_eq!(fs::read_to_string(&path).expect("read"), original);
    assert!(control.calls().is_empty());
}

/// Without --update-tag the document is applied as-is.
#[test]
fn apply_without_update_tag_does_not_touch_the_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("deploy.yaml");
    fs::write(&path, TWO_CONTAINER_YAML).expect("seed");

    let control = RecordingControlPlane::new();
    run_task(&inputs(path.clone(), false, false), &control).expect("task");

    assert_eq!(fs::read_to_string(&path).expect("read"), TWO_CONTAINER_YAML);
    assert_eq!(control.calls().len(), 1);
}

/// Dry run forwards the flag to the apply call.
#[test]
fn dry_run_flag_reaches_apply() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("deploy.yaml");
    fs::write(&path, TWO_CONTAINER_YAML).expect("seed");

    let control = RecordingControlPlane::new();
    run_task(&inputs(path.clone(), true, true), &control).expect("task");

    assert_eq!(
        control.calls(),
        vec![Call::ApplyConfig {
            path: path.clone(),
            dry_run: true,
        }]
    );
}
