use clap::Parser;
use sodium_probe::utils::{logger, validation::Validate};
use sodium_probe::{PackagePlan, PackagingConfig, ProbeError, ReleaseVersion};

#[derive(Parser)]
#[command(name = "prepare")]
#[command(about = "Write the Makefile that builds the libsodium NuGet package")]
struct Args {
    /// Package version, e.g. 1.0.14 or 1.0.14.1-preview-01
    version: Option<String>,

    /// Path to a TOML file overriding the packaging tables
    #[arg(short, long)]
    config: Option<String>,

    /// Where to write the Makefile (defaults to the config's `makefile`)
    #[arg(short, long)]
    output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let version = match args.version.as_deref().map(ReleaseVersion::parse) {
        Some(Ok(version)) => version,
        Some(Err(e)) => {
            tracing::error!("❌ {}", e);
            print_usage();
            std::process::exit(e.exit_code());
        }
        None => {
            print_usage();
            std::process::exit(1);
        }
    };

    let config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            PackagingConfig::from_file(path).unwrap_or_else(|e| exit_with(e))
        }
        None => PackagingConfig::default(),
    };

    if let Err(e) = config.validate() {
        exit_with(e);
    }

    let plan = PackagePlan::new(&config, version).unwrap_or_else(|e| exit_with(e));
    let output = args.output.unwrap_or_else(|| config.makefile.clone());

    if let Err(e) = plan.write_makefile(&output) {
        exit_with(e);
    }

    println!(
        "prepared {} to make {} for libsodium {}",
        output, plan.layout.pkg_file, plan.version.libsodium_version
    );
}

fn print_usage() {
    println!("Usage:");
    println!("       prepare <version>");
    println!();
    println!("Examples:");
    for example in [
        "1.0.14-preview-01",
        "1.0.14-preview-02",
        "1.0.14-preview-03",
        "1.0.14",
        "1.0.14.1-preview-01",
        "1.0.14.1",
        "1.0.14.2",
    ] {
        println!("       prepare {}", example);
    }
}

fn exit_with(e: ProbeError) -> ! {
    tracing::error!("❌ {}", e);
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}
