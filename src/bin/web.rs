use clap::Parser;
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;

use sat_collage::config::WebConfig;

#[derive(Parser, Debug)]
#[command(name = "collage_web", about = "Serve the satellite collage upload form", version)]
struct Cli {
    /// JSON config file; missing keys keep their defaults
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(short = 'b', long = "bind")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    sat_collage::init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WebConfig::load(path)?,
        None => WebConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }

    sat_collage::web::serve(config).await?;
    Ok(())
}
