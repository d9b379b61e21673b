use anyhow::Result;
use omnipack_core::ConfirmationRequest;
use semver::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: Version,
}

impl InstalledPackage {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

// Boundary to the feed and installer collaborators. Everything that
// touches the network or the filesystem lives behind this trait; the
// orchestrator only sequences, retries, confirms, and records.
pub trait PackageService: Sync {
    fn installed_packages(&self) -> Result<Vec<InstalledPackage>>;

    // The newer version for a package, if the feed has one.
    fn find_upgrade(&self, package: &InstalledPackage) -> Result<Option<Version>>;

    // A confirmation the installer needs answered before the action may
    // proceed, e.g. a destructive replacement or an ambiguous choice.
    fn required_confirmation(
        &self,
        package: &InstalledPackage,
        candidate: &Version,
    ) -> Option<ConfirmationRequest> {
        let _ = (package, candidate);
        None
    }

    fn apply_upgrade(&self, package: &InstalledPackage, candidate: &Version) -> Result<()>;

    fn latest_version(&self, name: &str) -> Result<Option<Version>>;

    fn install(&self, name: &str, version: &Version) -> Result<()>;

    fn install_provider_available(&self) -> bool {
        true
    }
}
