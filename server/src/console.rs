//! Administrator console used while the game is being prepared
//!
//! Commands are read one line at a time. `remove`, `load` and `save` take
//! their arguments inline or ask for them interactively. The console returns
//! as soon as `start` succeeds.

use crate::quiz::Quiz;
use crate::session::QuizSession;
use shared::read_line;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

const PROMPT: &str = "> ";

/// Console input lines are not bounded by the network budget
const CONSOLE_LINE_LIMIT: usize = 64 * 1024;

const COMMAND_HELP: &str = "\
[Commands]
add    add a quiz
remove remove a quiz
list   list all quizzes
load   load quizzes from a file
save   save quizzes to a file
help   show this command list
start  start the quiz tournament";

const USAGE_HELP: &str = "\
Commands are interactive.
remove, load and save also accept their arguments inline.
Press Ctrl-C to quit.";

/// How the console loop should proceed after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Started,
    Closed,
}

pub struct Console<R, W> {
    input: R,
    output: W,
    session: Arc<QuizSession>,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, session: Arc<QuizSession>) -> Self {
        Self {
            input,
            output,
            session,
        }
    }

    /// Runs commands until the game starts (`Flow::Started`) or the input
    /// closes (`Flow::Closed`)
    pub async fn run(&mut self) -> io::Result<Flow> {
        self.say("Preparing the quiz tournament").await?;
        self.say("").await?;
        self.help(true).await?;

        loop {
            self.say("").await?;
            let Some(line) = self.ask(PROMPT).await? else {
                return Ok(Flow::Closed);
            };

            match self.execute(&line).await? {
                Flow::Continue => continue,
                flow => return Ok(flow),
            }
        }
    }

    /// Executes one command line
    pub async fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };
        let mut args: Vec<String> = words.map(str::to_string).collect();
        args.reverse();

        match command {
            "start" => self.start().await,
            "add" => self.add().await,
            "remove" => self.remove(args).await,
            "list" => self.list().await.map(|_| Flow::Continue),
            "load" => self.load(args).await,
            "save" => self.save(args).await,
            "help" => self.help(true).await.map(|_| Flow::Continue),
            _ => {
                self.say("Unknown command").await?;
                self.help(false).await?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }

    /// Shows `prompt` and reads one reply; `None` once the input is closed
    async fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;
        read_line(&mut self.input, CONSOLE_LINE_LIMIT).await
    }

    async fn help(&mut self, with_usage: bool) -> io::Result<()> {
        self.say(COMMAND_HELP).await?;
        if with_usage {
            self.say("").await?;
            self.say(USAGE_HELP).await?;
        }
        Ok(())
    }

    async fn start(&mut self) -> io::Result<Flow> {
        match self.session.start_game().await {
            Ok(()) => {
                self.say("The quiz tournament begins!").await?;
                Ok(Flow::Started)
            }
            Err(e) => {
                self.say(&format!("error: {}", e)).await?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn add(&mut self) -> io::Result<Flow> {
        self.say("[Enter the quiz text] (finish with an empty line)")
            .await?;

        let mut prompt = String::new();
        loop {
            let Some(line) = self.ask("").await? else {
                return Ok(Flow::Closed);
            };
            if line.is_empty() {
                break;
            }
            prompt.push_str(&line);
            prompt.push('\n');
        }

        let Some(answer) = self.ask("Answer: ").await? else {
            return Ok(Flow::Closed);
        };

        let quiz = Quiz::new(prompt.trim(), answer);
        match self.session.add_quiz(quiz).await {
            Ok(()) => self.say("Quiz added").await?,
            Err(e) => self.say(&format!("error: {}", e)).await?,
        }
        Ok(Flow::Continue)
    }

    /// Prints the numbered catalog; returns false when it is empty
    async fn list(&mut self) -> io::Result<bool> {
        let quizzes = self.session.list_quizzes().await;
        if quizzes.is_empty() {
            self.say("No quizzes registered").await?;
            return Ok(false);
        }

        for (i, quiz) in quizzes.iter().enumerate() {
            self.say(&format!("{}: {}", i + 1, quiz.summary())).await?;
        }
        Ok(true)
    }

    async fn remove(&mut self, mut args: Vec<String>) -> io::Result<Flow> {
        if !self.list().await? {
            return Ok(Flow::Continue);
        }

        // Numbers are 1-based as listed; anything out of range cancels
        let number = loop {
            let reply = match args.pop() {
                Some(arg) => arg,
                None => match self
                    .ask("Number of the quiz to remove (out of range cancels): ")
                    .await?
                {
                    Some(reply) => reply,
                    None => return Ok(Flow::Closed),
                },
            };
            if let Ok(number) = reply.trim().parse::<i64>() {
                break number;
            }
        };

        let removed = match usize::try_from(number - 1) {
            Ok(index) => self.session.remove_quiz(index).await.ok(),
            Err(_) => None,
        };
        match removed {
            Some(_) => self.say("Quiz removed").await?,
            None => self.say("Removal cancelled").await?,
        }
        Ok(Flow::Continue)
    }

    async fn load(&mut self, mut args: Vec<String>) -> io::Result<Flow> {
        let Some(filename) = self.filename(&mut args).await? else {
            return Ok(Flow::Closed);
        };
        let path = PathBuf::from(filename);

        match self.session.load_quizzes(&path).await {
            Ok(count) => {
                self.say(&format!("Loaded from: {}", display_path(&path)))
                    .await?;
                self.say(&format!("Loaded {} quizzes", count)).await?;
            }
            Err(e) => self.say(&format!("error: {}", e)).await?,
        }
        Ok(Flow::Continue)
    }

    async fn save(&mut self, mut args: Vec<String>) -> io::Result<Flow> {
        let Some(filename) = self.filename(&mut args).await? else {
            return Ok(Flow::Closed);
        };
        let path = PathBuf::from(filename);

        if path.is_file() {
            self.say("warning: the file already exists").await?;
            loop {
                let reply = match args.pop() {
                    Some(arg) => arg,
                    None => match self.ask("Overwrite it? ([y], n): ").await? {
                        Some(reply) => reply,
                        None => return Ok(Flow::Closed),
                    },
                };
                match reply.as_str() {
                    "" | "y" => break,
                    "n" => return Ok(Flow::Continue),
                    _ => continue,
                }
            }
        }

        match self.session.save_quizzes(&path).await {
            Ok(()) => {
                self.say("Saved").await?;
                self.say(&format!("Saved to: {}", display_path(&path)))
                    .await?;
            }
            Err(e) => self.say(&format!("error: {}", e)).await?,
        }
        Ok(Flow::Continue)
    }

    /// Takes the next inline argument or asks for a file name
    async fn filename(&mut self, args: &mut Vec<String>) -> io::Result<Option<String>> {
        if let Some(arg) = args.pop() {
            return Ok(Some(arg));
        }

        let cwd = std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        self.say(&format!("Current directory: {}", cwd)).await?;
        self.ask("File name: ").await
    }
}

fn display_path(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Arc<QuizSession> {
        Arc::new(QuizSession::with_game(GameState::with_rng(
            StdRng::seed_from_u64(3),
        )))
    }

    /// Feeds `script` to a console and returns its flow and printed output
    async fn run_script(session: Arc<QuizSession>, script: &str) -> (Flow, String) {
        let mut output = Vec::new();
        let flow = {
            let mut console = Console::new(script.as_bytes(), &mut output, session);
            console.run().await.unwrap()
        };
        (flow, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_closed_input_ends_console() {
        let (flow, output) = run_script(session(), "").await;

        assert_eq!(flow, Flow::Closed);
        assert!(output.contains("[Commands]"));
        assert!(output.contains("Press Ctrl-C to quit."));
    }

    #[tokio::test]
    async fn test_start_with_empty_catalog_is_refused() {
        let session = session();
        let (flow, output) = run_script(Arc::clone(&session), "start\n").await;

        assert_eq!(flow, Flow::Closed);
        assert!(output.contains("error: no quizzes have been registered"));
        assert!(!session.is_running().await);
    }

    #[tokio::test]
    async fn test_add_then_start() {
        let session = session();
        let script = "add\nWhat is\ntwo plus two?\n\n4\nlist\nstart\n";
        let (flow, output) = run_script(Arc::clone(&session), script).await;

        assert_eq!(flow, Flow::Started);
        assert!(output.contains("Quiz added"));
        assert!(output.contains("1: What is two plus two?"));
        assert!(output.contains("The quiz tournament begins!"));
        assert_eq!(
            session.list_quizzes().await,
            vec![Quiz::new("What is\ntwo plus two?", "4")]
        );
        assert_eq!(
            session.current_quiz_prompt().await.as_deref(),
            Some("What is\ntwo plus two?")
        );
    }

    #[tokio::test]
    async fn test_remove_inline_and_interactive() {
        let session = session();
        session.add_quiz(Quiz::new("first", "1")).await.unwrap();
        session.add_quiz(Quiz::new("second", "2")).await.unwrap();
        session.add_quiz(Quiz::new("third", "3")).await.unwrap();

        let script = "remove 2\nremove\nabc\n1\n";
        let (_, output) = run_script(Arc::clone(&session), script).await;

        assert_eq!(output.matches("Quiz removed").count(), 2);
        assert_eq!(session.list_quizzes().await, vec![Quiz::new("third", "3")]);
    }

    #[tokio::test]
    async fn test_remove_out_of_range_cancels() {
        let session = session();
        session.add_quiz(Quiz::new("only", "1")).await.unwrap();

        let (_, output) = run_script(Arc::clone(&session), "remove 0\nremove 5\n").await;

        assert_eq!(output.matches("Removal cancelled").count(), 2);
        assert_eq!(session.quiz_count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_on_empty_catalog() {
        let (_, output) = run_script(session(), "remove 1\n").await;
        assert!(output.contains("No quizzes registered"));
        assert!(!output.contains("Removal cancelled"));
    }

    #[tokio::test]
    async fn test_unknown_command_shows_short_help() {
        let (_, output) = run_script(session(), "frobnicate\n").await;

        assert!(output.contains("Unknown command"));
        assert_eq!(output.matches("[Commands]").count(), 2);
        assert_eq!(output.matches("Press Ctrl-C to quit.").count(), 1);
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizzes.csv");

        let session_a = session();
        session_a.add_quiz(Quiz::new("2+2?", "4")).await.unwrap();
        let script = format!("save {}\n", path.display());
        let (_, output) = run_script(Arc::clone(&session_a), &script).await;
        assert!(output.contains("Saved to:"));

        let session_b = session();
        let script = format!("load {}\n", path.display());
        let (_, output) = run_script(Arc::clone(&session_b), &script).await;
        assert!(output.contains("Loaded 1 quizzes"));
        assert_eq!(session_b.list_quizzes().await, vec![Quiz::new("2+2?", "4")]);
    }

    #[tokio::test]
    async fn test_save_overwrite_declined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizzes.csv");
        std::fs::write(&path, "old,content\n").unwrap();

        let session = session();
        session.add_quiz(Quiz::new("2+2?", "4")).await.unwrap();
        let script = format!("save {}\nmaybe\nn\n", path.display());
        let (_, output) = run_script(session, &script).await;

        assert!(output.contains("warning: the file already exists"));
        assert!(!output.contains("Saved to:"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old,content\n");
    }

    #[tokio::test]
    async fn test_load_missing_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = format!("load {}\n", dir.path().join("missing.csv").display());

        let (_, output) = run_script(session(), &script).await;
        assert!(output.contains("error: file not found"));
    }
}
