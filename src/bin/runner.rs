//! benchwire Runner Binary
//!
//! Hosts the server role with a loopback model runtime: the model is
//! stored, input is echoed back as output, and per-request processing
//! latency is recorded. Useful for benchmarking the protocol itself and
//! as the reference for real runtime integrations.

use std::time::Instant;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use benchwire::{
    BenchwireError, Config, Endianness, Measurements, ModelRuntime, Result, Runner, TcpProtocol,
};

/// benchwire Runner
#[derive(Parser, Debug)]
#[command(name = "benchwire-runner")]
#[command(about = "Inference runner serving the benchwire protocol")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value = "12345")]
    port: u16,

    /// Wire byte order (must match the tester)
    #[arg(long, default_value = "little")]
    endianness: String,
}

/// Model runtime that echoes input to output and records latency
#[derive(Default)]
struct LoopbackRuntime {
    model: Option<Vec<u8>>,
    input: Option<Vec<u8>>,
    output: Option<Vec<u8>>,
    measurements: Measurements,
}

impl ModelRuntime for LoopbackRuntime {
    fn prepare_model(&mut self, model: &[u8]) -> Result<()> {
        tracing::info!("Received model ({} bytes)", model.len());
        self.model = Some(model.to_vec());
        Ok(())
    }

    fn prepare_input(&mut self, input: &[u8]) -> Result<()> {
        if self.model.is_none() {
            return Err(BenchwireError::Protocol(
                "Input received before model".to_string(),
            ));
        }
        self.input = Some(input.to_vec());
        Ok(())
    }

    fn prepare_io_specification(&mut self, spec: &[u8]) -> Result<()> {
        tracing::info!("Received io specification ({} bytes)", spec.len());
        Ok(())
    }

    fn process_input(&mut self) -> Result<()> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| BenchwireError::Protocol("No input staged".to_string()))?;

        let started = Instant::now();
        self.output = Some(input.clone());
        // a real runtime spends time here; the pause keeps the completion
        // ack from landing in the same read as the start ack
        std::thread::sleep(std::time::Duration::from_millis(20));
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.measurements.add_sample("process_time_ms", elapsed_ms);
        Ok(())
    }

    fn fetch_output(&mut self) -> Result<Vec<u8>> {
        self.output
            .clone()
            .ok_or_else(|| BenchwireError::Protocol("No output produced".to_string()))
    }

    fn statistics(&mut self) -> Measurements {
        self.measurements.clone()
    }
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

    tracing::info!("benchwire Runner v{}", benchwire::VERSION);

    let config = Config::builder()
        .host(args.host)
        .port(args.port)
        .endianness(endianness)
        .build();

    let mut runner = Runner::new(TcpProtocol::new(config), LoopbackRuntime::default());

    if let Err(e) = runner.initialize() {
        tracing::error!("Failed to start server: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = runner.run() {
        tracing::error!("Runner error: {}", e);
        std::process::exit(1);
    }
}
