//! Command-line configuration for the quiz server

use clap::Parser;
use shared::{DEFAULT_HOST, DEFAULT_PORT, MAX_MESSAGE};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "quiz-server", author, version, about = "Multiplayer text quiz server", long_about = None)]
pub struct ServerConfig {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum bytes consumed by a single line read
    #[arg(short, long, default_value_t = MAX_MESSAGE)]
    pub max_message: usize,

    /// Listen backlog for pending connections
    #[arg(short, long, default_value_t = 4)]
    pub backlog: u32,

    /// Quiz file to load into the catalog at startup
    #[arg(short, long)]
    pub quizzes: Option<PathBuf>,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
