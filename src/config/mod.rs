pub mod packaging;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

/// Running without arguments probes the platform's default libsodium.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sodium-probe")]
#[command(about = "Load libsodium, print its version and check that it initializes")]
pub struct ProbeConfig {
    /// Load libsodium from this file instead of the default library names
    #[arg(long, env = "SODIUM_PROBE_LIBRARY")]
    pub library: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for ProbeConfig {
    fn validate(&self) -> Result<()> {
        if let Some(library) = &self.library {
            validation::validate_path("library", library)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let config = ProbeConfig::try_parse_from(["sodium-probe"]).unwrap();
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_library() {
        let config =
            ProbeConfig::try_parse_from(["sodium-probe", "--library", "/opt/lib/libsodium.so", "-v"])
                .unwrap();
        assert_eq!(config.library.as_deref(), Some("/opt/lib/libsodium.so"));
        assert!(config.verbose);
    }

    #[test]
    fn test_empty_library_rejected() {
        let config = ProbeConfig {
            library: Some(String::new()),
            verbose: false,
        };
        assert!(config.validate().is_err());
    }
}
