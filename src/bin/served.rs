use std::env;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use hrportal_store::server::Router;
use hrportal_store::service::{LocalUserService, UserService};
use tokio::signal;

/// Serves the user service over TCP for other portal processes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    port: Option<String>,

    /// Artificial delay added to every call, in milliseconds.
    #[arg(short, long, default_value_t = 0)]
    latency_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let port = args.port
        .or_else(|| env::var("HRPORTAL_PORT").ok())
        .unwrap_or_else(|| "7001".to_string());

    let service = Arc::new(LocalUserService::seeded(Duration::from_millis(args.latency_ms)));
    let users = service.list().await?.len();
    let router = Router::new(service);

    println!("Starting HR portal user service...");
    println!("Loaded {} users.", users);
    println!("Listening on :{} (TCP)", port);

    tokio::select! {
        res = router.listen(&port) => {
            if let Err(e) = res {
                eprintln!("TCP Server failed: {}", e);
            }
        }
        _ = signal::ctrl_c() => {
            println!("\nShutdown signal received. Exiting.");
        }
    }

    Ok(())
}
