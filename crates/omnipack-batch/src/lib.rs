mod orchestrator;
mod results;
mod service;

pub use orchestrator::BatchRunner;
pub use results::BatchResults;
pub use service::{InstalledPackage, PackageService};
