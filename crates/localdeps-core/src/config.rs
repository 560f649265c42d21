use crate::paths::{DEFAULT_MODULES_DIR, DEFAULT_PACKAGE_MANAGER, PACKAGE_MANAGER_ENV};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for the localdeps CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory. `node_modules` is created here.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Options for one resolve-and-install run.
///
/// Supplied once and never mutated while resolving or installing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    /// Skip devDependencies when walking the dependency graph.
    pub production: bool,

    /// Never run the package manager; only report the command for missing packages.
    pub local_only: bool,

    /// Link to the package source instead of copying it.
    pub symlink: bool,

    /// Trace every crawled directory and report duplicate packages.
    pub verbose: bool,

    /// Package manager binary used for packages not found locally.
    pub package_manager: String,

    /// Name of the dependency directory created under the working directory.
    pub modules_dir_name: String,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            production: false,
            local_only: false,
            symlink: false,
            verbose: false,
            package_manager: default_package_manager(),
            modules_dir_name: DEFAULT_MODULES_DIR.to_string(),
        }
    }
}

impl InstallOptions {
    #[must_use]
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    #[must_use]
    pub fn with_local_only(mut self, local_only: bool) -> Self {
        self.local_only = local_only;
        self
    }

    #[must_use]
    pub fn with_symlink(mut self, symlink: bool) -> Self {
        self.symlink = symlink;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Override the package manager binary.
    #[must_use]
    pub fn with_package_manager(mut self, package_manager: impl Into<String>) -> Self {
        self.package_manager = package_manager.into();
        self
    }
}

/// Package manager binary, honoring `LOCALDEPS_NPM`.
///
/// An empty value falls back to `npm`.
#[must_use]
pub fn default_package_manager() -> String {
    std::env::var(PACKAGE_MANAGER_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PACKAGE_MANAGER.to_string())
}
