//! Registry of delivery artifacts and their discovered versions.
//!
//! Artifacts are registered once by identity `(name, type)`; versions may only
//! be recorded against registered artifacts. Both live in a [`SetStore`]:
//!
//! - `keel.delivery_artifacts` holds every registered artifact.
//! - `{keel.delivery_artifact_versions.<type>.<name>}` holds that artifact's
//!   versions.
//!
//! Members are JSON encodings of the records, so identical records collapse
//! into a single set member.

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::core::types::{ArtifactType, DeliveryArtifact, DeliveryArtifactVersion};
use crate::core::version::compare_versions;
use crate::io::set_store::SetStore;

/// Set holding every registered artifact.
pub const REGISTERED_ARTIFACTS_KEY: &str = "keel.delivery_artifacts";

/// Artifact registry failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A version was recorded for an artifact that is not registered.
    #[error("no registered artifact with name {name} and type {kind}")]
    NotRegistered { name: String, kind: ArtifactType },

    /// A record could not be encoded or a stored member could not be decoded.
    #[error("artifact record codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The underlying store failed.
    #[error("artifact storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl RegistryError {
    /// True for failures a caller may resolve by retrying.
    ///
    /// `NotRegistered` can be the result of racing a concurrent registration;
    /// callers should ensure the artifact is registered and retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, RegistryError::NotRegistered { .. })
    }
}

impl From<anyhow::Error> for RegistryError {
    fn from(err: anyhow::Error) -> Self {
        RegistryError::Storage(err)
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Set key holding the versions of `artifact`.
pub fn versions_key(artifact: &DeliveryArtifact) -> String {
    format!(
        "{{keel.delivery_artifact_versions.{}.{}}}",
        artifact.kind, artifact.name
    )
}

/// Artifact registry over a set-backed store.
#[derive(Debug)]
pub struct ArtifactRegistry<S> {
    store: S,
}

impl<S: SetStore> ArtifactRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register an artifact identity. Registering twice is a no-op.
    ///
    /// Returns true if the artifact was not registered before.
    #[instrument(skip_all, fields(name = %artifact.name, kind = %artifact.kind))]
    pub fn register(&self, artifact: &DeliveryArtifact) -> Result<bool> {
        let added = self
            .store
            .add(REGISTERED_ARTIFACTS_KEY, &encode_artifact(artifact)?)?;
        if added {
            info!("registered artifact");
        } else {
            debug!("artifact already registered");
        }
        Ok(added)
    }

    /// Record a discovered version of a registered artifact.
    ///
    /// Fails with [`RegistryError::NotRegistered`] if the artifact is unknown.
    /// The check happens at write time and is not atomic with the write, so a
    /// concurrent first registration can still be reported as unregistered.
    /// Returns true if this exact version record was not stored before.
    #[instrument(skip_all, fields(name = %version.artifact.name, kind = %version.artifact.kind, version = %version.version))]
    pub fn record_version(&self, version: &DeliveryArtifactVersion) -> Result<bool> {
        if !self.is_registered(&version.artifact)? {
            return Err(RegistryError::NotRegistered {
                name: version.artifact.name.clone(),
                kind: version.artifact.kind,
            });
        }
        let member = serde_json::to_string(version)?;
        let added = self.store.add(&versions_key(&version.artifact), &member)?;
        debug!(added, "recorded artifact version");
        Ok(added)
    }

    /// The registered artifact with this identity, if any.
    pub fn get(&self, name: &str, kind: ArtifactType) -> Result<Option<DeliveryArtifact>> {
        let artifact = DeliveryArtifact::new(name, kind);
        if self.is_registered(&artifact)? {
            Ok(Some(artifact))
        } else {
            Ok(None)
        }
    }

    /// All recorded versions of `artifact`, newest first.
    ///
    /// Versions that compare equal are ordered by their stored encoding.
    pub fn versions(&self, artifact: &DeliveryArtifact) -> Result<Vec<DeliveryArtifactVersion>> {
        let mut decoded = self
            .store
            .members(&versions_key(artifact))?
            .into_iter()
            .map(|member| -> Result<(DeliveryArtifactVersion, String)> {
                let version = serde_json::from_str::<DeliveryArtifactVersion>(&member)?;
                Ok((version, member))
            })
            .collect::<Result<Vec<_>>>()?;
        decoded.sort_by(|(a, a_raw), (b, b_raw)| {
            compare_versions(&b.version, &a.version).then_with(|| a_raw.cmp(b_raw))
        });
        debug!(artifact = %artifact, count = decoded.len(), "listed artifact versions");
        Ok(decoded.into_iter().map(|(version, _)| version).collect())
    }

    /// Every registered artifact, in stored order.
    pub fn artifacts(&self) -> Result<Vec<DeliveryArtifact>> {
        self.store
            .members(REGISTERED_ARTIFACTS_KEY)?
            .iter()
            .map(|member| -> Result<DeliveryArtifact> { Ok(serde_json::from_str(member)?) })
            .collect()
    }

    fn is_registered(&self, artifact: &DeliveryArtifact) -> Result<bool> {
        Ok(self
            .store
            .contains(REGISTERED_ARTIFACTS_KEY, &encode_artifact(artifact)?)?)
    }
}

fn encode_artifact(artifact: &DeliveryArtifact) -> Result<String> {
    Ok(serde_json::to_string(artifact)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::set_store::InMemorySetStore;

    fn registry() -> ArtifactRegistry<InMemorySetStore> {
        ArtifactRegistry::new(InMemorySetStore::new())
    }

    fn fnord() -> DeliveryArtifact {
        DeliveryArtifact::new("fnord", ArtifactType::Deb)
    }

    #[test]
    fn versions_key_uses_type_and_name() {
        assert_eq!(
            versions_key(&fnord()),
            "{keel.delivery_artifact_versions.deb.fnord}"
        );
    }

    /// Registering the same identity twice leaves a single registration.
    #[test]
    fn register_is_idempotent() {
        let registry = registry();
        assert!(registry.register(&fnord()).expect("register"));
        assert!(!registry.register(&fnord()).expect("re-register"));

        assert_eq!(registry.get("fnord", ArtifactType::Deb).expect("get"), Some(fnord()));
        assert_eq!(registry.artifacts().expect("artifacts"), vec![fnord()]);
    }

    #[test]
    fn get_unknown_artifact_is_none() {
        let registry = registry();
        registry.register(&fnord()).expect("register");
        assert_eq!(registry.get("fnord", ArtifactType::Docker).expect("get"), None);
        assert_eq!(registry.get("other", ArtifactType::Deb).expect("get"), None);
    }

    #[test]
    fn record_version_requires_registration() {
        let registry = registry();
        let version = DeliveryArtifactVersion::new(fnord(), "1.0.0");

        let err = registry.record_version(&version).unwrap_err();
        assert!(matches!(
            &err,
            RegistryError::NotRegistered { name, kind } if name == "fnord" && *kind == ArtifactType::Deb
        ));
        assert!(err.is_transient());
        assert_eq!(
            err.to_string(),
            "no registered artifact with name fnord and type deb"
        );

        registry.register(&fnord()).expect("register");
        assert!(registry.record_version(&version).expect("retry"));
        assert_eq!(registry.versions(&fnord()).expect("versions"), vec![version]);
    }

    /// "10" must sort ahead of "2": ordering is by version value, not text.
    #[test]
    fn versions_are_listed_newest_first() {
        let registry = registry();
        registry.register(&fnord()).expect("register");
        let v1 = DeliveryArtifactVersion::new(fnord(), "2");
        let v2 = DeliveryArtifactVersion::new(fnord(), "10");
        registry.record_version(&v1).expect("record v1");
        registry.record_version(&v2).expect("record v2");

        assert_eq!(registry.versions(&fnord()).expect("versions"), vec![v2, v1]);
    }

    #[test]
    fn recording_same_version_twice_is_noop() {
        let registry = registry();
        registry.register(&fnord()).expect("register");
        let version = DeliveryArtifactVersion::new(fnord(), "1.2.3");
        assert!(registry.record_version(&version).expect("record"));
        assert!(!registry.record_version(&version).expect("re-record"));
        assert_eq!(registry.versions(&fnord()).expect("versions").len(), 1);
    }

    #[test]
    fn metadata_survives_storage() {
        let registry = registry();
        registry.register(&fnord()).expect("register");
        let mut version = DeliveryArtifactVersion::new(fnord(), "1.0.0-h2.abc");
        version
            .metadata
            .insert("commit".to_string(), "abc".to_string());
        registry.record_version(&version).expect("record");
        assert_eq!(registry.versions(&fnord()).expect("versions"), vec![version]);
    }

    #[test]
    fn versions_are_scoped_per_artifact() {
        let registry = registry();
        let docker = DeliveryArtifact::new("fnord", ArtifactType::Docker);
        registry.register(&fnord()).expect("register deb");
        registry.register(&docker).expect("register docker");
        registry
            .record_version(&DeliveryArtifactVersion::new(docker.clone(), "3"))
            .expect("record");

        assert!(registry.versions(&fnord()).expect("deb versions").is_empty());
        assert_eq!(registry.versions(&docker).expect("docker versions").len(), 1);
    }

    #[test]
    fn corrupt_version_member_is_codec_error() {
        let registry = registry();
        registry
            .store()
            .add(&versions_key(&fnord()), "not json")
            .expect("add");
        let err = registry.versions(&fnord()).unwrap_err();
        assert!(matches!(err, RegistryError::Codec(_)));
    }
}
