//! Probe target binary

use clap::Parser;
use hello_watchdog::server::{self, DEFAULT_HOST, DEFAULT_PORT};
use hello_watchdog::{Component, Logging, Result};
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "hello-app", version, about = "Answers every GET with \"Hello World!\"")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "HELLO_APP_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(long, env = "HELLO_APP_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _logging = Logging::new(Component::App).try_init()?;

    if let Err(e) = server::serve(&args.host, args.port).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
