//! Quiz items and the ordered catalog they live in
//!
//! The catalog is curated by the administrator while the game is being
//! prepared and becomes read-only once it starts. It is persisted as a
//! headerless two-column CSV file, one `prompt,answer` record per quiz.
//! Multi-line prompts are written as quoted fields.

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Length of the one-line summary shown in catalog listings
const SUMMARY_LEN: usize = 27;

/// A single question and the exact text that answers it.
///
/// Field order matches the column order of the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub prompt: String,
    pub answer: String,
}

impl Quiz {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }

    /// One-line abbreviation of the prompt, ellipsized past 27 characters
    pub fn summary(&self) -> String {
        let flat = self.prompt.replace('\n', " ");
        let mut summary: String = flat.chars().take(SUMMARY_LEN).collect();
        if flat.chars().count() > SUMMARY_LEN {
            summary.push_str("...");
        }
        summary
    }
}

/// Errors raised while loading or saving a catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("{0} is a directory")]
    IsDirectory(PathBuf),
    #[error("invalid quiz file {0}: {1}")]
    Parse(PathBuf, csv::Error),
    #[error("i/o error on {0}: {1}")]
    Io(PathBuf, io::Error),
}

/// Ordered collection of quizzes
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    quizzes: Vec<Quiz>,
}

impl QuizCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, quiz: Quiz) {
        self.quizzes.push(quiz);
    }

    /// Removes the quiz at a 0-based index, if present
    pub fn remove(&mut self, index: usize) -> Option<Quiz> {
        if index < self.quizzes.len() {
            Some(self.quizzes.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Quiz> {
        self.quizzes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quiz> {
        self.quizzes.iter()
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// Appends every quiz stored in `path`, returning how many were read.
    ///
    /// Blank lines are skipped. A record without exactly two fields rejects
    /// the whole file and leaves the catalog untouched.
    pub fn load(&mut self, path: &Path) -> Result<usize, CatalogError> {
        if path.is_dir() {
            return Err(CatalogError::IsDirectory(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CatalogError::NotFound(path.to_path_buf()),
            _ => CatalogError::Io(path.to_path_buf(), e),
        })?;

        let mut reader = ReaderBuilder::new().has_headers(false).from_reader(file);
        let loaded = reader
            .deserialize::<Quiz>()
            .collect::<Result<Vec<Quiz>, _>>()
            .map_err(|e| CatalogError::Parse(path.to_path_buf(), e))?;

        let count = loaded.len();
        self.quizzes.extend(loaded);
        Ok(count)
    }

    /// Writes the whole catalog to `path`, replacing any previous content
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        if path.is_dir() {
            return Err(CatalogError::IsDirectory(path.to_path_buf()));
        }

        let file = File::create(path).map_err(|e| CatalogError::Io(path.to_path_buf(), e))?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);

        for quiz in &self.quizzes {
            writer
                .serialize(quiz)
                .map_err(|e| CatalogError::Parse(path.to_path_buf(), e))?;
        }
        writer
            .flush()
            .map_err(|e| CatalogError::Io(path.to_path_buf(), e))
    }
}
