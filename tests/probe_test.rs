use sodium_probe::{NativeSodium, Probe, ProbeError, ProbeReport, SodiumApi};

struct FakeSodium {
    major: i32,
    minor: i32,
    init_status: i32,
}

impl FakeSodium {
    fn new(init_status: i32) -> Self {
        Self {
            major: 10,
            minor: 3,
            init_status,
        }
    }
}

impl SodiumApi for FakeSodium {
    fn library_version_major(&self) -> i32 {
        self.major
    }

    fn library_version_minor(&self) -> i32 {
        self.minor
    }

    fn init(&self) -> i32 {
        self.init_status
    }
}

fn run(api: FakeSodium) -> (ProbeReport, Vec<String>) {
    let mut out = Vec::new();
    let report = Probe::new(api).run(&mut out).unwrap();
    let lines = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    (report, lines)
}

#[test]
fn test_successful_init_exits_zero() {
    let (report, lines) = run(FakeSodium::new(0));

    assert_eq!(report.exit_code(), 0);
    assert!(report.into_result().is_ok());
    assert_eq!(
        lines,
        vec![
            "sodium_library_version_major() = 10",
            "sodium_library_version_minor() = 3",
            "sodium_init() = 0",
        ]
    );
}

#[test]
fn test_failed_init_exits_one() {
    let (report, lines) = run(FakeSodium::new(-1));

    assert_eq!(report.exit_code(), 1);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "sodium_init() = -1");

    let err = report.into_result().unwrap_err();
    assert!(matches!(err, ProbeError::InitFailed { status: -1 }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_any_nonzero_status_is_failure() {
    for status in [1, 2, -42, i32::MAX, i32::MIN] {
        let (report, lines) = run(FakeSodium::new(status));
        assert_eq!(report.exit_code(), 1, "status {}", status);
        assert_eq!(lines[2], format!("sodium_init() = {}", status));
    }
}

#[test]
fn test_versions_printed_verbatim() {
    let (report, lines) = run(FakeSodium {
        major: 26,
        minor: -7,
        init_status: 0,
    });

    assert_eq!(report.major, 26);
    assert_eq!(report.minor, -7);
    assert_eq!(lines[0], "sodium_library_version_major() = 26");
    assert_eq!(lines[1], "sodium_library_version_minor() = -7");
}

#[test]
fn test_probe_accepts_borrowed_api() {
    let fake = FakeSodium::new(0);
    let mut out = Vec::new();
    let report = Probe::new(&fake).run(&mut out).unwrap();
    assert_eq!(report.init_status.code(), 0);
}

#[test]
fn test_missing_library_exits_two() {
    let err = NativeSodium::open("/definitely/not/here/libsodium.so").unwrap_err();
    assert!(matches!(err, ProbeError::LibraryNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}
