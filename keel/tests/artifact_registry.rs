//! Artifact registry behavior against the file-backed set store.
//!
//! Covers registration idempotence, the registered-before-versioned rule, and
//! descending version order surviving an encode, store, reload, decode cycle.

use std::sync::Arc;
use std::thread;

use keel::artifacts::{ArtifactRegistry, RegistryError};
use keel::io::set_store::FileSetStore;
use keel::test_support::{TestWorkspace, deb, version_of};

#[test]
fn versions_survive_reopening_the_store() {
    let workspace = TestWorkspace::new().expect("workspace");
    let sets_path = workspace.paths().sets_path.clone();
    let fnord = deb("fnord");

    {
        let registry = ArtifactRegistry::new(FileSetStore::new(&sets_path));
        registry.register(&fnord).expect("register");
        registry
            .record_version(&version_of(&fnord, "2"))
            .expect("record 2");
        registry
            .record_version(&version_of(&fnord, "10"))
            .expect("record 10");
    }

    let reopened = ArtifactRegistry::new(FileSetStore::new(&sets_path));
    assert_eq!(reopened.get("fnord", fnord.kind).expect("get"), Some(fnord.clone()));
    assert_eq!(
        reopened.versions(&fnord).expect("versions"),
        vec![version_of(&fnord, "10"), version_of(&fnord, "2")]
    );
}

#[test]
fn unregistered_record_fails_then_succeeds_after_register() {
    let workspace = TestWorkspace::new().expect("workspace");
    let registry = ArtifactRegistry::new(FileSetStore::new(&workspace.paths().sets_path));
    let fnord = deb("fnord");

    let err = registry
        .record_version(&version_of(&fnord, "1.0.0"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotRegistered { .. }));
    assert!(registry.versions(&fnord).expect("versions").is_empty());

    registry.register(&fnord).expect("register");
    registry
        .record_version(&version_of(&fnord, "1.0.0"))
        .expect("retry");
}

/// Concurrent registrations of the same artifact converge on one entry.
#[test]
fn concurrent_registration_converges() {
    let workspace = TestWorkspace::new().expect("workspace");
    let registry = Arc::new(ArtifactRegistry::new(FileSetStore::new(
        &workspace.paths().sets_path,
    )));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.register(&deb("fnord")).expect("register"))
        })
        .collect();
    let newly_added = handles
        .into_iter()
        .map(|handle| handle.join().expect("join"))
        .filter(|added| *added)
        .count();

    assert_eq!(newly_added, 1);
    assert_eq!(registry.artifacts().expect("artifacts"), vec![deb("fnord")]);
}
