use clap::Parser;
use log::{error, info, warn};
use server::config::ServerConfig;
use server::console::{Console, Flow};
use server::network::Server;
use server::session::QuizSession;
use std::sync::Arc;
use tokio::io::{stdin, stdout, BufReader};

/// Main-method of the quiz server.
/// Parses command-line arguments, starts the acceptor and hands stdin to the
/// administrator console until the game starts.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();

    // Created once, lives for the whole process
    let session = Arc::new(QuizSession::new());

    if let Some(path) = &config.quizzes {
        let count = session.load_quizzes(path).await?;
        info!("Preloaded {} quizzes from {}", count, path.display());
    }

    let server = Server::bind(&config, Arc::clone(&session)).await?;

    // Spawn acceptor task
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server stopped: {}", e);
        }
    });

    // Spawn console task
    tokio::spawn(async move {
        let mut console = Console::new(BufReader::new(stdin()), stdout(), session);
        match console.run().await {
            Ok(Flow::Started) => info!("Game is running, press Ctrl+C to quit"),
            Ok(_) => warn!("Console input closed before the game started"),
            Err(e) => error!("Console failed: {}", e),
        }
    });

    tokio::select! {
        result = server_handle => {
            if let Err(e) = result {
                error!("Network task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    // A pending stdin read cannot be cancelled and would block runtime shutdown
    std::process::exit(0)
}
