//! # Quiz Client Library
//!
//! A thin terminal client for the quiz server. It connects over TCP, sends
//! every line typed by the player and prints every line the server sends.
//! The first line typed is the player's display name; all later lines are
//! chat or answers, which only the server tells apart.
//!
//! Sending and receiving run concurrently: a listener task prints server
//! lines as they arrive while the forwarding loop waits on local input.
//!
//! ```rust,no_run
//! use client::network::Client;
//! use tokio::io::{stdin, stdout, BufReader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect("127.0.0.1:51001", 2048).await?;
//!     client.run(BufReader::new(stdin()), stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod network;
