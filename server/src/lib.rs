//! # Quiz Server Library
//!
//! This library provides the server side of a text-line multiplayer quiz
//! game. One process accepts many TCP clients, lets an operator curate a set
//! of quizzes, and then runs a live round-based quiz in which the first
//! correct answer scores a point and moves everyone to the next question.
//!
//! ## Lifecycle
//!
//! ### Preparing
//! Clients may already connect and chat. Every received line is echoed to
//! all clients and never judged as an answer. The administrator console edits
//! the catalog and finally starts the game.
//!
//! ### Running
//! A quiz is current at all times. Every line is still echoed, then compared
//! with the current answer by exact string equality. The first match awards
//! one point, after which the scoreboard and a newly drawn quiz are
//! broadcast. The game never returns to preparing.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! The roster of registered clients in registration order, with scores and
//! per-client outbound line channels.
//!
//! ### Quiz Module (`quiz`)
//! Quiz items, the ordered catalog and its JSON persistence.
//!
//! ### Game Module (`game`)
//! The preparing/running state machine, answer evaluation and quiz selection.
//!
//! ### Session Module (`session`)
//! The single shared owner of roster and game state. All mutations and
//! broadcasts happen under one lock, which keeps broadcasts consistent and
//! makes each round winnable only once.
//!
//! ### Network Module (`network`)
//! The connection acceptor and the per-connection client handler.
//!
//! ### Console Module (`console`)
//! The operator's command shell (`add`, `remove`, `list`, `load`, `save`,
//! `help`, `start`).
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use server::config::ServerConfig;
//! use server::network::Server;
//! use server::quiz::Quiz;
//! use server::session::QuizSession;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::parse();
//!     let session = Arc::new(QuizSession::new());
//!     session.add_quiz(Quiz::new("2+2?", "4")).await?;
//!
//!     let server = Server::bind(&config, Arc::clone(&session)).await?;
//!     tokio::spawn(server.run());
//!
//!     session.start_game().await?;
//!     tokio::signal::ctrl_c().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod console;
pub mod game;
pub mod network;
pub mod quiz;
pub mod session;
