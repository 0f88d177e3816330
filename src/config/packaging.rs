use crate::utils::error::{ProbeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layout and runtime tables for building the libsodium NuGet package.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagingConfig {
    pub package: String,
    pub library: String,
    pub release_base_url: String,
    pub msvc_toolset: String,
    pub props_file: String,
    pub makefile: String,
    pub output_dir: String,
    pub build_dir: String,
    pub cache_dir: String,
    pub temp_dir: String,
    pub windows: Vec<WindowsRuntime>,
    pub macos: Vec<StageRuntime>,
    pub linux: Vec<StageRuntime>,
    pub extras: Vec<String>,
}

/// A Windows runtime, taken from the prebuilt MSVC archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsRuntime {
    pub rid: String,
    pub platform: String,
}

/// A runtime whose binary comes from a CI build stage's workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRuntime {
    pub rid: String,
    pub stage: String,
}

impl WindowsRuntime {
    fn new(rid: &str, platform: &str) -> Self {
        Self {
            rid: rid.to_string(),
            platform: platform.to_string(),
        }
    }
}

impl StageRuntime {
    fn new(rid: &str, stage: &str) -> Self {
        Self {
            rid: rid.to_string(),
            stage: stage.to_string(),
        }
    }
}

impl Default for PackagingConfig {
    fn default() -> Self {
        Self {
            package: "libsodium".to_string(),
            library: "libsodium".to_string(),
            release_base_url: "https://download.libsodium.org/libsodium/releases".to_string(),
            msvc_toolset: "v140".to_string(),
            props_file: "libsodium.props".to_string(),
            makefile: "Makefile".to_string(),
            output_dir: "artifacts".to_string(),
            build_dir: "build".to_string(),
            cache_dir: "cache".to_string(),
            temp_dir: "temp".to_string(),
            windows: vec![
                WindowsRuntime::new("win-x64", "x64"),
                WindowsRuntime::new("win-x86", "Win32"),
            ],
            macos: vec![StageRuntime::new("osx-x64", "macos-xcode-9.2")],
            linux: vec![
                StageRuntime::new("linux-x64", "debian-stretch"),
                StageRuntime::new("alpine.3.6-x64", "alpine-3.6"),
            ],
            extras: vec![
                "LICENSE".to_string(),
                "AUTHORS".to_string(),
                "ChangeLog".to_string(),
            ],
        }
    }
}

impl PackagingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProbeError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProbeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProbeError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// All runtime identifiers, in Makefile order.
    pub fn runtime_ids(&self) -> impl Iterator<Item = &str> {
        self.windows
            .iter()
            .map(|w| w.rid.as_str())
            .chain(self.macos.iter().map(|m| m.rid.as_str()))
            .chain(self.linux.iter().map(|l| l.rid.as_str()))
    }
}

impl Validate for PackagingConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("release_base_url", &self.release_base_url)?;
        validation::validate_non_empty_string("package", &self.package)?;
        validation::validate_non_empty_string("library", &self.library)?;
        validation::validate_non_empty_string("msvc_toolset", &self.msvc_toolset)?;

        for (field, value) in [
            ("props_file", &self.props_file),
            ("makefile", &self.makefile),
            ("output_dir", &self.output_dir),
            ("build_dir", &self.build_dir),
            ("cache_dir", &self.cache_dir),
            ("temp_dir", &self.temp_dir),
        ] {
            validation::validate_path(field, value)?;
        }

        validation::validate_runtime_ids("runtimes", self.runtime_ids())?;

        for extra in &self.extras {
            validation::validate_path("extras", extra)?;
        }

        if self.windows.is_empty() && self.macos.is_empty() && self.linux.is_empty() {
            return Err(ProbeError::ConfigValidationError {
                field: "runtimes".to_string(),
                message: "At least one runtime must be configured".to_string(),
            });
        }

        Ok(())
    }
}
