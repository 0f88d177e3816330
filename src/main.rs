use clap::Parser;
use sodium_probe::utils::{logger, validation::Validate};
use sodium_probe::{NativeSodium, Probe, ProbeConfig, ProbeError, ProbeReport};

fn main() {
    let config = ProbeConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        exit_with(e);
    }

    let loaded = match &config.library {
        Some(path) => NativeSodium::open(path),
        None => NativeSodium::load(),
    };
    let sodium = match loaded {
        Ok(sodium) => sodium,
        Err(e) => exit_with(e),
    };
    tracing::debug!("Using libsodium at {}", sodium.path());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match Probe::new(&sodium).run(&mut out).and_then(ProbeReport::into_result) {
        Ok(report) => {
            tracing::info!(
                "✅ libsodium library version {}.{} initialized",
                report.major,
                report.minor
            );
        }
        Err(e) => exit_with(e),
    }
}

fn exit_with(e: ProbeError) -> ! {
    tracing::error!("❌ {}", e);
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}
