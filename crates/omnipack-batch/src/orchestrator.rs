use std::collections::HashSet;

use anyhow::{anyhow, Result};
use omnipack_console::{prompt_for_confirmation, Console};
use omnipack_core::{
    BatchConfig, CancelToken, Cancelled, LogSink, MessageLevel, OutcomeMessage, OutcomeStatus,
    PackageOutcome, RecordingSink, TargetSet,
};
use omnipack_tolerance::{retry_unit, RetryPolicy};
use rayon::prelude::*;
use semver::Version;

use crate::results::BatchResults;
use crate::service::{InstalledPackage, PackageService};

enum UpgradeTarget {
    Installed(InstalledPackage),
    Missing(String),
}

pub struct BatchRunner<'a> {
    service: &'a dyn PackageService,
    console: &'a dyn Console,
    sink: &'a dyn LogSink,
    retry_policy: RetryPolicy,
    cancel: Option<CancelToken>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        service: &'a dyn PackageService,
        console: &'a dyn Console,
        sink: &'a dyn LogSink,
    ) -> Self {
        Self {
            service,
            console,
            sink,
            retry_policy: RetryPolicy::default(),
            cancel: None,
        }
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Upgrades every target and records exactly one outcome per target.
    /// One package failing never aborts the batch; only failing to
    /// enumerate the targets does.
    pub fn upgrade_run(&self, config: &BatchConfig) -> Result<BatchResults> {
        let installed = self.service.installed_packages()?;
        let targets = match &config.targets {
            TargetSet::All => installed
                .into_iter()
                .map(UpgradeTarget::Installed)
                .collect::<Vec<_>>(),
            TargetSet::Named(names) => unique_names(names)
                .into_iter()
                .map(|name| {
                    match installed.iter().find(|package| &package.name == name) {
                        Some(package) => UpgradeTarget::Installed(package.clone()),
                        None => UpgradeTarget::Missing(name.clone()),
                    }
                })
                .collect(),
        };

        let results = BatchResults::new();
        targets.par_iter().for_each(|target| {
            let outcome = match target {
                UpgradeTarget::Missing(name) => PackageOutcome::failed(
                    name,
                    "",
                    format!("{name} is not installed, cannot upgrade"),
                ),
                UpgradeTarget::Installed(package) => self.upgrade_one(package),
            };
            results.put(outcome);
        });
        Ok(results)
    }

    /// Installs every named target; the "all" sentinel has no meaning for
    /// installs and is rejected up front.
    pub fn install_run(&self, config: &BatchConfig) -> Result<BatchResults> {
        let names = match &config.targets {
            TargetSet::All => {
                return Err(anyhow!("install requires explicit package names"));
            }
            TargetSet::Named(names) => names,
        };
        let installed = self.service.installed_packages()?;

        let results = BatchResults::new();
        unique_names(names).par_iter().for_each(|name| {
            results.put(self.install_one(name.as_str(), &installed, config));
        });
        Ok(results)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
    }

    fn upgrade_one(&self, package: &InstalledPackage) -> PackageOutcome {
        let current = package.version.to_string();
        if self.is_cancelled() {
            return PackageOutcome::cancelled(&package.name, current);
        }

        let candidate = match self.service.find_upgrade(package) {
            Ok(candidate) => candidate,
            Err(err) => {
                return PackageOutcome::failed(
                    &package.name,
                    current,
                    format!("could not check for upgrade: {err:#}"),
                );
            }
        };
        let Some(candidate) = candidate else {
            return PackageOutcome::skipped(&package.name, &current).with_message(
                MessageLevel::Info,
                format!("{} {current} is already the latest version", package.name),
            );
        };

        if let Some(request) = self.service.required_confirmation(package, &candidate) {
            let proceed = request.proceed_choice().map(str::to_string);
            match prompt_for_confirmation(self.console, &request.prompt, &request.choices) {
                Ok(selection) => {
                    if Some(selection.as_str()) != proceed.as_deref() {
                        return PackageOutcome::skipped(&package.name, &current).with_message(
                            MessageLevel::Info,
                            format!("upgrade to {candidate} declined ({selection})"),
                        );
                    }
                }
                Err(err) => {
                    return PackageOutcome::failed(
                        &package.name,
                        current,
                        format!("confirmation for upgrade to {candidate} failed: {err}"),
                    );
                }
            }
        }

        let description = format!("upgrade of {} to {candidate}", package.name);
        self.run_action(&package.name, &current, &candidate, &description, || {
            self.service.apply_upgrade(package, &candidate)
        })
        .unwrap_or_else(|outcome| outcome)
    }

    fn install_one(
        &self,
        name: &str,
        installed: &[InstalledPackage],
        config: &BatchConfig,
    ) -> PackageOutcome {
        if self.is_cancelled() {
            return PackageOutcome::cancelled(name, "");
        }

        if let Some(package) = installed.iter().find(|package| package.name == name) {
            let version = package.version.to_string();
            return PackageOutcome::skipped(name, &version).with_message(
                MessageLevel::Info,
                format!("{name} {version} is already installed"),
            );
        }

        if !self.service.install_provider_available() {
            if config.skip_unavailable_install_provider {
                return PackageOutcome::skipped(name, "").with_message(
                    MessageLevel::Warn,
                    format!("install provider unavailable, skipping {name}"),
                );
            }
            return PackageOutcome::failed(
                name,
                "",
                format!("install provider unavailable, cannot install {name}"),
            );
        }

        let candidate = match self.service.latest_version(name) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                return PackageOutcome::failed(
                    name,
                    "",
                    format!("{name} was not found in the feed"),
                );
            }
            Err(err) => {
                return PackageOutcome::failed(
                    name,
                    "",
                    format!("could not query the feed for {name}: {err:#}"),
                );
            }
        };

        let description = format!("install of {name} {candidate}");
        self.run_action(name, "", &candidate, &description, || {
            self.service.install(name, &candidate)
        })
        .map(|mut outcome| {
            outcome.status = OutcomeStatus::Installed;
            outcome
        })
        .unwrap_or_else(|outcome| outcome)
    }

    // Runs the installer action through the resilient executor with a
    // per-target recording sink, then maps the result onto an outcome.
    // Ok carries the success outcome (status Upgraded), Err the
    // failed/cancelled one.
    fn run_action(
        &self,
        name: &str,
        current_version: &str,
        candidate: &Version,
        description: &str,
        action: impl FnMut() -> Result<()>,
    ) -> Result<PackageOutcome, PackageOutcome> {
        let recording = RecordingSink::forwarding(self.sink);
        let result = retry_unit(
            &self.retry_policy,
            &recording,
            self.cancel.as_ref(),
            Some(description),
            action,
        );
        let attempt_warnings = recording
            .into_captured()
            .into_iter()
            .filter(|message| message.level == MessageLevel::Warn)
            .collect::<Vec<_>>();

        match result {
            Ok(()) => {
                let mut outcome = PackageOutcome::upgraded(name, candidate.to_string());
                outcome.messages = attempt_warnings;
                Ok(outcome)
            }
            Err(err) if err.downcast_ref::<Cancelled>().is_some() => {
                let mut outcome = PackageOutcome::cancelled(name, current_version);
                prepend_messages(&mut outcome, attempt_warnings);
                Err(outcome)
            }
            Err(err) => {
                let mut outcome = PackageOutcome::failed(
                    name,
                    current_version,
                    format!("{description} failed: {err:#}"),
                );
                prepend_messages(&mut outcome, attempt_warnings);
                Err(outcome)
            }
        }
    }
}

fn prepend_messages(outcome: &mut PackageOutcome, mut earlier: Vec<OutcomeMessage>) {
    earlier.append(&mut outcome.messages);
    outcome.messages = earlier;
}

// A repeated name must not spawn two workers racing the installer and the
// results map for the same identifier. First mention wins the ordering.
fn unique_names(names: &[String]) -> Vec<&String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .collect()
}
