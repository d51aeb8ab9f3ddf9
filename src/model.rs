use std::io;
use std::path::Path;

use crate::error::{PublishError, Result};

/// Model families recognized by the blob store, keyed by how the model
/// persists itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Context-bound models from the legacy mllib lineage.
    Legacy,
    /// Self-contained models with an overwrite-capable writer.
    Versioned,
}

impl ModelFamily {
    /// Type tag assigned when the caller did not supply a `modelType`.
    pub fn default_type_tag(self) -> &'static str {
        match self {
            ModelFamily::Legacy => "spark-mllib",
            ModelFamily::Versioned => "spark-ml",
        }
    }
}

/// Legacy persistence: the model writes a re-loadable directory tree beneath
/// `dir`, driven by a caller-provided context handle.
pub trait LegacyPersistence<C> {
    fn save(&self, ctx: &C, dir: &Path) -> io::Result<()>;
}

/// Modern persistence: the model writes a re-loadable directory tree beneath
/// `dir`, replacing anything already there.
pub trait VersionedPersistence {
    fn save_overwrite(&self, dir: &Path) -> io::Result<()>;
}

/// A trained model that can be packaged and published.
///
/// A model advertises at most one persistence capability through the
/// accessor methods below; the pipeline resolves the capability once at
/// entry and never inspects the model again. A model advertising neither
/// capability is rejected before any filesystem mutation.
pub trait MlModel<C> {
    /// Name of the concrete model implementation, recorded in the manifest.
    fn class_name(&self) -> &str;

    fn legacy_persistence(&self) -> Option<&dyn LegacyPersistence<C>> {
        None
    }

    fn versioned_persistence(&self) -> Option<&dyn VersionedPersistence> {
        None
    }
}

/// Normalized persistence handle: the family tag plus a way to write the
/// model into a staging directory. The legacy/modern distinction does not
/// travel past this point.
pub(crate) enum ResolvedPersistence<'a, C> {
    Legacy(&'a dyn LegacyPersistence<C>),
    Versioned(&'a dyn VersionedPersistence),
}

impl<'a, C> std::fmt::Debug for ResolvedPersistence<'a, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedPersistence::Legacy(_) => f.debug_tuple("Legacy").finish(),
            ResolvedPersistence::Versioned(_) => f.debug_tuple("Versioned").finish(),
        }
    }
}

impl<'a, C> ResolvedPersistence<'a, C> {
    pub(crate) fn family(&self) -> ModelFamily {
        match self {
            ResolvedPersistence::Legacy(_) => ModelFamily::Legacy,
            ResolvedPersistence::Versioned(_) => ModelFamily::Versioned,
        }
    }

    pub(crate) fn save(&self, ctx: &C, dir: &Path) -> io::Result<()> {
        match self {
            ResolvedPersistence::Legacy(p) => p.save(ctx, dir),
            ResolvedPersistence::Versioned(p) => p.save_overwrite(dir),
        }
    }
}

/// Resolve which persistence capability the model carries. Legacy wins if a
/// model advertises both.
pub(crate) fn resolve_persistence<C>(model: &dyn MlModel<C>) -> Result<ResolvedPersistence<'_, C>> {
    if let Some(p) = model.legacy_persistence() {
        Ok(ResolvedPersistence::Legacy(p))
    } else if let Some(p) = model.versioned_persistence() {
        Ok(ResolvedPersistence::Versioned(p))
    } else {
        Err(PublishError::UnsupportedModel(
            model.class_name().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCapabilities;

    impl MlModel<()> for NoCapabilities {
        fn class_name(&self) -> &str {
            "test.NoCapabilities"
        }
    }

    struct LegacyOnly;

    impl LegacyPersistence<()> for LegacyOnly {
        fn save(&self, _ctx: &(), _dir: &Path) -> io::Result<()> {
            Ok(())
        }
    }

    impl MlModel<()> for LegacyOnly {
        fn class_name(&self) -> &str {
            "test.LegacyOnly"
        }

        fn legacy_persistence(&self) -> Option<&dyn LegacyPersistence<()>> {
            Some(self)
        }
    }

    struct VersionedOnly;

    impl VersionedPersistence for VersionedOnly {
        fn save_overwrite(&self, _dir: &Path) -> io::Result<()> {
            Ok(())
        }
    }

    impl MlModel<()> for VersionedOnly {
        fn class_name(&self) -> &str {
            "test.VersionedOnly"
        }

        fn versioned_persistence(&self) -> Option<&dyn VersionedPersistence> {
            Some(self)
        }
    }

    #[test]
    fn test_resolve_legacy() {
        let resolved = resolve_persistence(&LegacyOnly).unwrap();
        assert_eq!(resolved.family(), ModelFamily::Legacy);
        assert_eq!(resolved.family().default_type_tag(), "spark-mllib");
    }

    #[test]
    fn test_resolve_versioned() {
        let resolved = resolve_persistence(&VersionedOnly).unwrap();
        assert_eq!(resolved.family(), ModelFamily::Versioned);
        assert_eq!(resolved.family().default_type_tag(), "spark-ml");
    }

    #[test]
    fn test_no_capability_names_the_model() {
        let err = resolve_persistence(&NoCapabilities).unwrap_err();
        match err {
            PublishError::UnsupportedModel(name) => assert_eq!(name, "test.NoCapabilities"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
