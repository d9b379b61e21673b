use anyhow::{anyhow, Result};

pub const ALL_PACKAGES_SENTINEL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSet {
    All,
    Named(Vec<String>),
}

impl TargetSet {
    pub fn from_names(names: Vec<String>) -> Result<Self> {
        if names.iter().any(|name| name == ALL_PACKAGES_SENTINEL) {
            if names.len() > 1 {
                return Err(anyhow!(
                    "the '{ALL_PACKAGES_SENTINEL}' sentinel cannot be combined with package names"
                ));
            }
            return Ok(Self::All);
        }

        if names.is_empty() {
            return Err(anyhow!("at least one package name is required"));
        }
        for name in &names {
            if name.trim().is_empty() {
                return Err(anyhow!("package name must not be empty"));
            }
        }
        Ok(Self::Named(names))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub targets: TargetSet,
    pub skip_unavailable_install_provider: bool,
}

impl BatchConfig {
    pub fn new(targets: TargetSet) -> Self {
        Self {
            targets,
            skip_unavailable_install_provider: false,
        }
    }

    pub fn skip_unavailable_install_provider(mut self, skip: bool) -> Self {
        self.skip_unavailable_install_provider = skip;
        self
    }
}

// Built per confirmation point and consumed immediately. The first choice
// is the affirmative one; the orchestrator treats anything else as decline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub prompt: String,
    pub choices: Vec<String>,
}

impl ConfirmationRequest {
    pub fn new(prompt: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            choices,
        }
    }

    pub fn proceed_choice(&self) -> Option<&str> {
        self.choices.first().map(String::as_str)
    }
}
