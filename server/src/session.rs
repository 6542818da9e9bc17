//! Process-wide quiz session shared by the acceptor, every client handler
//! and the administrator console.
//!
//! The client roster and the game state sit behind one async mutex. Every
//! operation below takes that lock once and does all of its reads, mutations
//! and broadcasts inside it. Two consequences follow:
//! - a broadcast never observes a half-registered or half-removed client, and
//!   all clients see broadcasts in the same order
//! - comparing an answer, awarding the point and selecting the next quiz form
//!   a single step, so only one submission can win a round
//!
//! Broadcasting only enqueues lines on per-connection channels, so the
//! critical sections never wait on a socket.

use crate::client_manager::{ClientId, ClientManager, LineSender};
use crate::game::{GameError, GameState, Verdict};
use crate::quiz::{CatalogError, Quiz, QuizCatalog};
use log::{info, warn};
use shared::notice;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tokio::sync::Mutex;

/// Failures surfaced to the administrator console
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

struct SessionState {
    clients: ClientManager,
    game: GameState,
}

/// Scoreboard, blank line, quiz label and the current prompt
fn announce_quiz(clients: &ClientManager, game: &GameState) {
    clients.broadcast(&clients.scoreboard());
    clients.broadcast("");
    if let Some(quiz) = game.current_quiz() {
        clients.broadcast(notice::QUIZ_LABEL);
        clients.broadcast(&quiz.prompt);
    }
}

/// Shared handle to the roster and game state of one server run.
///
/// Wrapped in an `Arc` and cloned into the acceptor, every client handler
/// and the console. All methods are async because they wait for the lock.
pub struct QuizSession {
    state: Mutex<SessionState>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// Creates an empty session in the preparing phase
    pub fn new() -> Self {
        Self::with_game(GameState::new())
    }

    /// Wraps an existing game state, for example one with a seeded RNG
    pub fn with_game(game: GameState) -> Self {
        Self {
            state: Mutex::new(SessionState {
                clients: ClientManager::new(),
                game,
            }),
        }
    }

    /// Adds a named client, tells the others and greets the newcomer
    pub async fn register(&self, name: String, addr: SocketAddr, sender: LineSender) -> ClientId {
        let mut state = self.state.lock().await;

        let client_id = state.clients.add_client(name.clone(), addr, sender);
        state
            .clients
            .broadcast_others(client_id, &notice::joined(&name));
        state.clients.send_to(client_id, &notice::welcome(&name));

        if !state.game.is_running() {
            state.clients.send_to(client_id, notice::PREPARING);
            state.clients.send_to(client_id, notice::PLEASE_WAIT);
        }

        client_id
    }

    /// Removes a client and announces the departure to those remaining.
    ///
    /// Returns the departed client's name, or `None` if it was already gone.
    pub async fn unregister(&self, client_id: ClientId) -> Option<String> {
        let mut state = self.state.lock().await;

        let client = state.clients.remove_client(client_id)?;
        state.clients.broadcast(&notice::left(&client.name));
        Some(client.name)
    }

    /// Echoes a line from `client_id` to everyone and, once the game is
    /// running, judges it as an answer.
    ///
    /// A correct answer is followed by the success notice, the updated
    /// scoreboard and the next quiz, all within the same critical section.
    pub async fn relay(&self, client_id: ClientId, line: &str) -> Verdict {
        let mut state = self.state.lock().await;
        let SessionState { clients, game } = &mut *state;

        let name = match clients.get(client_id) {
            Some(client) => client.name.clone(),
            None => return Verdict::NoOp,
        };
        clients.broadcast(&notice::chat(&name, line));

        if !game.is_running() {
            return Verdict::NoOp;
        }

        match game.evaluate_answer(clients, client_id, line) {
            Ok(Verdict::Correct) => {
                clients.broadcast(notice::CORRECT);
                announce_quiz(clients, game);
                Verdict::Correct
            }
            Ok(Verdict::NoOp) => Verdict::NoOp,
            Err(e) => {
                warn!("Answer from client {} not evaluated: {}", client_id, e);
                Verdict::NoOp
            }
        }
    }

    /// Switches to the running phase and announces the first quiz
    pub async fn start_game(&self) -> Result<(), GameError> {
        let mut state = self.state.lock().await;

        state.game.start()?;
        state.clients.broadcast(notice::GAME_START);
        state.clients.broadcast("");
        announce_quiz(&state.clients, &state.game);
        Ok(())
    }

    /// Appends a quiz while preparing; refused once the game runs
    pub async fn add_quiz(&self, quiz: Quiz) -> Result<(), GameError> {
        self.state.lock().await.game.add_quiz(quiz)
    }

    /// Removes the quiz at a 0-based index
    pub async fn remove_quiz(&self, index: usize) -> Result<Quiz, GameError> {
        self.state.lock().await.game.remove_quiz(index)
    }

    /// Snapshot of the catalog in its current order.
    ///
    /// The copy is taken under the lock, so it reflects a single point in
    /// time even if the console edits the catalog right after.
    pub async fn list_quizzes(&self) -> Vec<Quiz> {
        let state = self.state.lock().await;
        state.game.catalog().iter().cloned().collect()
    }

    /// Number of quizzes in the catalog
    pub async fn quiz_count(&self) -> usize {
        self.state.lock().await.game.catalog().len()
    }

    /// Appends the quizzes stored in `path` to the catalog.
    ///
    /// The file is read before the lock is taken. Nothing is added if the
    /// file is unreadable or the game has already started.
    pub async fn load_quizzes(&self, path: &Path) -> Result<usize, AdminError> {
        let mut loaded = QuizCatalog::new();
        let count = loaded.load(path)?;

        let mut state = self.state.lock().await;
        let catalog = state.game.catalog_mut()?;
        for quiz in loaded.iter() {
            catalog.push(quiz.clone());
        }

        info!("Loaded {} quizzes from {}", count, path.display());
        Ok(count)
    }

    /// Writes a snapshot of the catalog to `path`.
    ///
    /// The lock is released before any file I/O happens.
    pub async fn save_quizzes(&self, path: &Path) -> Result<(), AdminError> {
        let snapshot = self.state.lock().await.game.catalog().clone();
        snapshot.save(path)?;
        info!("Saved {} quizzes to {}", snapshot.len(), path.display());
        Ok(())
    }

    /// Current `name: N pt` lines in registration order
    pub async fn scoreboard(&self) -> String {
        self.state.lock().await.clients.scoreboard()
    }

    /// Prompt of the quiz open for answers, `None` while preparing
    pub async fn current_quiz_prompt(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.game.current_quiz().map(|quiz| quiz.prompt.clone())
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.game.is_running()
    }

    /// Number of quizzes presented since the game started
    pub async fn round(&self) -> u64 {
        self.state.lock().await.game.round()
    }

    /// Number of registered clients
    pub async fn client_count(&self) -> usize {
        self.state.lock().await.clients.len()
    }
}
