use crate::domain::ports::SodiumApi;
use crate::utils::error::{ProbeError, Result};
use libloading::{Library, Symbol};
use std::ffi::c_int;
use std::fmt;

type SodiumFn = unsafe extern "C" fn() -> c_int;

#[cfg(target_os = "windows")]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libsodium.dll"];

#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libsodium.dylib", "libsodium.26.dylib"];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libsodium.so", "libsodium.so.26", "libsodium.so.23"];

/// libsodium loaded at runtime. The function pointers are only valid while
/// `_library` is alive, so they never leave this struct.
pub struct NativeSodium {
    path: String,
    init: SodiumFn,
    version_major: SodiumFn,
    version_minor: SodiumFn,
    _library: Library,
}

impl NativeSodium {
    /// Load libsodium using the platform's usual library names.
    pub fn load() -> Result<Self> {
        Self::load_any(DEFAULT_LIBRARY_NAMES)
    }

    /// Try each candidate in order and keep the first that loads.
    pub fn load_any(candidates: &[&str]) -> Result<Self> {
        let mut tried = Vec::with_capacity(candidates.len());
        let mut last_reason = String::from("no candidates given");

        for candidate in candidates {
            tried.push(candidate.to_string());
            match Self::open(candidate) {
                Ok(sodium) => return Ok(sodium),
                Err(ProbeError::LibraryNotFound { reason, .. }) => {
                    tracing::debug!("Could not load {}: {}", candidate, reason);
                    last_reason = reason;
                }
                Err(e) => return Err(e),
            }
        }

        Err(ProbeError::LibraryNotFound {
            tried,
            reason: last_reason,
        })
    }

    /// Load libsodium from an explicit file name or path.
    pub fn open(path: &str) -> Result<Self> {
        // SAFETY: loading libsodium runs no initializers with preconditions
        // on our side; the caller chose the path.
        let library = unsafe { Library::new(path) }.map_err(|e| ProbeError::LibraryNotFound {
            tried: vec![path.to_string()],
            reason: e.to_string(),
        })?;

        let init = resolve(&library, path, "sodium_init")?;
        let version_major = resolve(&library, path, "sodium_library_version_major")?;
        let version_minor = resolve(&library, path, "sodium_library_version_minor")?;

        tracing::debug!("Loaded libsodium from {}", path);

        Ok(Self {
            path: path.to_string(),
            init,
            version_major,
            version_minor,
            _library: library,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn resolve(library: &Library, path: &str, name: &str) -> Result<SodiumFn> {
    // SAFETY: all three exports are `int f(void)` in libsodium's public header.
    let symbol: Symbol<SodiumFn> =
        unsafe { library.get(name.as_bytes()) }.map_err(|e| ProbeError::MissingSymbol {
            symbol: name.to_string(),
            library: path.to_string(),
            reason: e.to_string(),
        })?;
    Ok(*symbol)
}

impl SodiumApi for NativeSodium {
    fn library_version_major(&self) -> i32 {
        // SAFETY: resolved from the library owned by `self`.
        unsafe { (self.version_major)() }
    }

    fn library_version_minor(&self) -> i32 {
        // SAFETY: resolved from the library owned by `self`.
        unsafe { (self.version_minor)() }
    }

    fn init(&self) -> i32 {
        // SAFETY: resolved from the library owned by `self`. sodium_init is
        // thread-safe and idempotent.
        unsafe { (self.init)() }
    }
}

impl fmt::Debug for NativeSodium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSodium").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_library() {
        let err = NativeSodium::open("/nonexistent/dir/libsodium-missing.so").unwrap_err();
        match err {
            ProbeError::LibraryNotFound { tried, .. } => {
                assert_eq!(tried, vec!["/nonexistent/dir/libsodium-missing.so".to_string()]);
            }
            other => panic!("expected LibraryNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_any_reports_every_candidate() {
        let candidates = ["/nonexistent/a/libsodium.so", "/nonexistent/b/libsodium.so"];
        let err = NativeSodium::load_any(&candidates).unwrap_err();
        match err {
            ProbeError::LibraryNotFound { tried, .. } => assert_eq!(tried.len(), 2),
            other => panic!("expected LibraryNotFound, got {:?}", other),
        }
        assert_eq!(NativeSodium::load_any(&[]).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn test_default_names_per_platform() {
        assert!(DEFAULT_LIBRARY_NAMES[0].starts_with("libsodium."));

        #[cfg(target_os = "macos")]
        assert_eq!(DEFAULT_LIBRARY_NAMES, &["libsodium.dylib", "libsodium.26.dylib"][..]);

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        assert_eq!(
            DEFAULT_LIBRARY_NAMES,
            &["libsodium.so", "libsodium.so.26", "libsodium.so.23"][..]
        );
    }
}
