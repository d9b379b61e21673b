use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use omnipack_batch::{InstalledPackage, PackageService};
use omnipack_core::ConfirmationRequest;
use semver::Version;
use serde::{Deserialize, Serialize};

// Local stand-in for the feed and installer collaborators: package
// versions live in a TOML state file and "installing" means updating the
// installed table. The real feed client plugs in behind the same trait.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFile {
    // Plain values must serialize ahead of the tables below.
    pub confirm_upgrades: Vec<String>,
    pub feed: BTreeMap<String, Version>,
    pub installed: BTreeMap<String, Version>,
}

impl StateFile {
    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).with_context(|| "failed parsing state file")
    }

    pub fn render(&self) -> Result<String> {
        toml::to_string_pretty(self).with_context(|| "failed rendering state file")
    }
}

#[derive(Debug)]
pub struct FileService {
    path: PathBuf,
    state: Mutex<StateFile>,
}

impl FileService {
    pub fn load(path: &Path) -> Result<Self> {
        let state = match std::fs::read_to_string(path) {
            Ok(raw) => StateFile::parse(&raw)
                .with_context(|| format!("invalid state file: {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StateFile::default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed reading state file: {}", path.display()));
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    pub fn installed_snapshot(&self) -> Vec<InstalledPackage> {
        self.state
            .lock()
            .map(|state| {
                state
                    .installed
                    .iter()
                    .map(|(name, version)| InstalledPackage::new(name.clone(), version.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn latest_installed(&self, name: &str) -> Option<Version> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.installed.get(name).cloned())
    }

    fn record_installed(&self, name: &str, version: &Version) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("state lock poisoned"))?;
        state.installed.insert(name.to_string(), version.clone());
        let rendered = state.render()?;
        std::fs::write(&self.path, rendered)
            .with_context(|| format!("failed writing state file: {}", self.path.display()))
    }
}

impl PackageService for FileService {
    fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        Ok(self.installed_snapshot())
    }

    fn find_upgrade(&self, package: &InstalledPackage) -> Result<Option<Version>> {
        let state = self
            .state
            .lock()
            .map_err(|_| anyhow!("state lock poisoned"))?;
        Ok(state
            .feed
            .get(&package.name)
            .filter(|candidate| **candidate > package.version)
            .cloned())
    }

    fn required_confirmation(
        &self,
        package: &InstalledPackage,
        candidate: &Version,
    ) -> Option<ConfirmationRequest> {
        let wants_confirmation = self
            .state
            .lock()
            .map(|state| state.confirm_upgrades.contains(&package.name))
            .unwrap_or(false);
        if !wants_confirmation {
            return None;
        }
        Some(ConfirmationRequest::new(
            format!(
                "{} {} replaces the installed {} version, continue?",
                package.name, candidate, package.version
            ),
            vec!["yes".to_string(), "no".to_string()],
        ))
    }

    fn apply_upgrade(&self, package: &InstalledPackage, candidate: &Version) -> Result<()> {
        self.record_installed(&package.name, candidate)
    }

    fn latest_version(&self, name: &str) -> Result<Option<Version>> {
        let state = self
            .state
            .lock()
            .map_err(|_| anyhow!("state lock poisoned"))?;
        Ok(state.feed.get(name).cloned())
    }

    fn install(&self, name: &str, version: &Version) -> Result<()> {
        self.record_installed(name, version)
    }
}
