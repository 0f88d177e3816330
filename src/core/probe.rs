use crate::domain::model::{InitStatus, ProbeReport};
use crate::domain::ports::SodiumApi;
use crate::utils::error::Result;
use std::io::Write;

pub const VERSION_MAJOR_LABEL: &str = "sodium_library_version_major()";
pub const VERSION_MINOR_LABEL: &str = "sodium_library_version_minor()";
pub const INIT_LABEL: &str = "sodium_init()";

/// Calls the three libsodium entry points in a fixed order and prints each
/// result as `<label> = <value>`.
pub struct Probe<S: SodiumApi> {
    api: S,
}

impl<S: SodiumApi> Probe<S> {
    pub fn new(api: S) -> Self {
        Self { api }
    }

    pub fn run<W: Write>(&self, out: &mut W) -> Result<ProbeReport> {
        let major = self.api.library_version_major();
        tracing::debug!("{} returned {}", VERSION_MAJOR_LABEL, major);
        writeln!(out, "{} = {}", VERSION_MAJOR_LABEL, major)?;

        let minor = self.api.library_version_minor();
        tracing::debug!("{} returned {}", VERSION_MINOR_LABEL, minor);
        writeln!(out, "{} = {}", VERSION_MINOR_LABEL, minor)?;

        let init_status = InitStatus(self.api.init());
        writeln!(out, "{} = {}", INIT_LABEL, init_status)?;
        out.flush()?;

        if init_status.is_success() {
            tracing::debug!("{} succeeded", INIT_LABEL);
        } else {
            tracing::error!("❌ {} returned {}", INIT_LABEL, init_status);
        }

        Ok(ProbeReport {
            major,
            minor,
            init_status,
        })
    }

    pub fn into_inner(self) -> S {
        self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingSodium {
        calls: RefCell<Vec<&'static str>>,
    }

    impl SodiumApi for RecordingSodium {
        fn library_version_major(&self) -> i32 {
            self.calls.borrow_mut().push("major");
            10
        }

        fn library_version_minor(&self) -> i32 {
            self.calls.borrow_mut().push("minor");
            3
        }

        fn init(&self) -> i32 {
            self.calls.borrow_mut().push("init");
            0
        }
    }

    #[test]
    fn test_calls_in_fixed_order() {
        let probe = Probe::new(RecordingSodium {
            calls: RefCell::new(Vec::new()),
        });
        let mut out = Vec::new();
        let report = probe.run(&mut out).unwrap();

        assert_eq!(report.major, 10);
        assert_eq!(report.minor, 3);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(*probe.into_inner().calls.borrow(), vec!["major", "minor", "init"]);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_io_error() {
        let probe = Probe::new(RecordingSodium {
            calls: RefCell::new(Vec::new()),
        });
        let err = probe.run(&mut BrokenPipe).unwrap_err();
        assert!(matches!(err, crate::utils::error::ProbeError::IoError(_)));
    }
}
