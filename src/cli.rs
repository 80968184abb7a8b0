use clap::Parser;

#[derive(Parser)]
#[command(name = "stt-relay")]
#[command(about = "Live transcription relay", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Configuration file (without extension, config-crate style)
    #[arg(short, long, default_value = "config/stt-relay")]
    pub config: String,

    /// Override the configured HTTP port
    #[arg(short, long)]
    pub port: Option<u16>,
}
