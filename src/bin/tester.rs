//! benchwire Tester Binary
//!
//! Drives one full benchmark exchange against a running runner: uploads
//! the model and input, triggers processing, then writes the downloaded
//! output bytes and a JSON measurements report.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use benchwire::{
    Config, Endianness, Measurements, Result, RuntimeProtocol, TcpProtocol,
};

/// benchwire Tester
#[derive(Parser, Debug)]
#[command(name = "benchwire-tester")]
#[command(about = "Benchmarking host driving the benchwire protocol")]
#[command(version)]
struct Args {
    /// Address of the target runner
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port of the target runner
    #[arg(long, default_value = "12345")]
    port: u16,

    /// Wire byte order (must match the runner)
    #[arg(long, default_value = "little")]
    endianness: String,

    /// Path to the compiled model to upload
    #[arg(long)]
    model: PathBuf,

    /// Optional path to the model's io specification (JSON)
    #[arg(long)]
    io_spec: Option<PathBuf>,

    /// Path to the serialized input tensors
    #[arg(long)]
    input: PathBuf,

    /// Where to save the downloaded output bytes
    #[arg(long)]
    output: PathBuf,

    /// Where to save the measurements report (JSON)
    #[arg(long)]
    measurements: PathBuf,
}

fn run(args: &Args, endianness: Endianness) -> Result<()> {
    let config = Config::builder()
        .host(args.host.clone())
        .port(args.port)
        .endianness(endianness)
        .build();

    let mut protocol = TcpProtocol::new(config);
    let mut measurements = Measurements::new();

    protocol.initialize_client()?;

    protocol.upload_model(&args.model)?;

    if let Some(io_spec) = &args.io_spec {
        protocol.upload_io_specification(io_spec)?;
    }

    let input = std::fs::read(&args.input)?;
    protocol.upload_input(&input)?;

    protocol.request_processing()?;

    let output = protocol.download_output()?;
    tracing::info!("Downloaded output ({} bytes)", output.len());
    std::fs::write(&args.output, &output)?;

    protocol.download_statistics(&mut measurements)?;
    std::fs::write(&args.measurements, measurements.to_json_pretty()?)?;

    protocol.disconnect();
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,benchwire=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let endianness: Endianness = match args.endianness.parse() {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("benchwire Tester v{}", benchwire::VERSION);

    if let Err(e) = run(&args, endianness) {
        tracing::error!("Benchmark failed: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Benchmark complete");
}
