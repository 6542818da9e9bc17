use crate::client_manager::{ClientId, ClientManager};
use crate::quiz::{Quiz, QuizCatalog};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Lifecycle phase of a server run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Catalog is editable and every client line is chat
    Preparing,
    /// `current` indexes the catalog, which no longer changes
    Running { current: usize, round: u64 },
}

/// Result of checking a submitted line against the current quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing changed: wrong answer, or the line was only chat
    NoOp,
    /// The submitter scored and the next quiz has been selected
    Correct,
}

/// Reasons a game operation is refused.
///
/// A refused operation never leaves the state partially changed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("no quizzes have been registered")]
    EmptyCatalog,
    #[error("the game has already started")]
    AlreadyRunning,
    #[error("the game has not started yet")]
    NotRunning,
    #[error("there is no quiz number {0}")]
    NoSuchQuiz(usize),
}

/// Phase, quiz catalog and the random source used to pick quizzes.
///
/// Holds no lock of its own. The session keeps it next to the client roster
/// behind one mutex, which is what makes answer evaluation atomic.
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: Phase,
    catalog: QuizCatalog,
    rng: StdRng,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Creates a preparing game with an empty catalog and an entropy seeded RNG
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Same as [`GameState::new`] but with a caller supplied RNG, so quiz
    /// selection can be made deterministic.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            phase: Phase::Preparing,
            catalog: QuizCatalog::new(),
            rng,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// Number of quizzes presented so far; 0 while preparing
    pub fn round(&self) -> u64 {
        match self.phase {
            Phase::Preparing => 0,
            Phase::Running { round, .. } => round,
        }
    }

    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    /// Catalog access for edits, only granted while preparing
    pub fn catalog_mut(&mut self) -> Result<&mut QuizCatalog, GameError> {
        if self.is_running() {
            return Err(GameError::AlreadyRunning);
        }
        Ok(&mut self.catalog)
    }

    /// Appends a quiz to the catalog.
    ///
    /// Fails with [`GameError::AlreadyRunning`] once the game has started.
    pub fn add_quiz(&mut self, quiz: Quiz) -> Result<(), GameError> {
        self.catalog_mut()?.push(quiz);
        Ok(())
    }

    /// Removes and returns the quiz at a 0-based index.
    ///
    /// Later quizzes shift down by one. Refused while running or when the
    /// index is out of range.
    pub fn remove_quiz(&mut self, index: usize) -> Result<Quiz, GameError> {
        self.catalog_mut()?
            .remove(index)
            .ok_or(GameError::NoSuchQuiz(index))
    }

    /// The quiz currently open for answers, `None` while preparing
    pub fn current_quiz(&self) -> Option<&Quiz> {
        match self.phase {
            Phase::Preparing => None,
            Phase::Running { current, .. } => self.catalog.get(current),
        }
    }

    /// Moves from preparing to running and picks the first quiz.
    ///
    /// Refuses, without changing anything, when already running or when the
    /// catalog is empty.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.is_running() {
            return Err(GameError::AlreadyRunning);
        }
        if self.catalog.is_empty() {
            return Err(GameError::EmptyCatalog);
        }

        self.phase = Phase::Running {
            current: 0,
            round: 0,
        };
        self.advance();
        info!("Game started with {} quizzes", self.catalog.len());
        Ok(())
    }

    /// Picks the next quiz uniformly from the whole catalog.
    ///
    /// Draws are independent, so the same quiz may come up again. Does
    /// nothing while preparing.
    pub fn advance(&mut self) {
        if let Phase::Running { round, .. } = self.phase {
            let current = self.rng.gen_range(0..self.catalog.len());
            self.phase = Phase::Running {
                current,
                round: round + 1,
            };
        }
    }

    /// Checks `submitted` against the current answer with exact equality.
    ///
    /// On a match the client gets a point and the next quiz is selected
    /// before returning, so a second identical submission for the same round
    /// is compared against the new quiz instead.
    pub fn evaluate_answer(
        &mut self,
        clients: &mut ClientManager,
        client_id: ClientId,
        submitted: &str,
    ) -> Result<Verdict, GameError> {
        let quiz = self.current_quiz().ok_or(GameError::NotRunning)?;

        if quiz.answer != submitted {
            return Ok(Verdict::NoOp);
        }

        clients.add_point(client_id, 1);
        info!("Client {} answered round {} correctly", client_id, self.round());
        self.advance();
        Ok(Verdict::Correct)
    }
}
