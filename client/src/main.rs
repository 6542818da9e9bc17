use clap::Parser;
use client::network::Client;
use log::info;
use shared::{DEFAULT_HOST, DEFAULT_PORT, MAX_MESSAGE};
use tokio::io::{stdin, stdout, AsyncWriteExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "quiz-client", author, version, about = "Terminal client for the quiz server", long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port to connect to
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum bytes consumed by a single line read
    #[arg(short, long, default_value_t = MAX_MESSAGE)]
    max_message: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);

    let client = match Client::connect(&address, args.max_message).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Could not connect to the server at {}: {}", address, e);
            return Err(e.into());
        }
    };

    let mut out = stdout();
    out.write_all(b"Enter your name: ").await?;
    out.flush().await?;

    client.run(BufReader::new(stdin()), out).await?;
    info!("Disconnected");

    // A pending stdin read cannot be cancelled and would block runtime shutdown
    std::process::exit(0)
}
