//! Line protocol shared by the quiz server and the quiz client.
//!
//! Every logical message is UTF-8 text terminated by a single `\n`. The first
//! line a client sends is its display name; everything after that is either
//! chat or a candidate answer, and only the server's phase decides which.
//! Server-to-client lines are plain text as well and may contain embedded
//! newlines (multi-line quiz prompts, scoreboards).

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 51001;

/// Upper bound on bytes consumed by a single line read
pub const MAX_MESSAGE: usize = 2048;

/// Frames `text` as one protocol line
pub fn encode_line(text: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity(text.len() + 1);
    data.extend_from_slice(text.as_bytes());
    data.push(b'\n');
    data
}

/// Reads the next line from `reader`, consuming at most `max_bytes` bytes.
///
/// A line longer than the budget is handed back in budget-sized pieces; the
/// remainder shows up on the following calls. The `\n` terminator (and a
/// `\r` right before it) is stripped, any other whitespace is preserved.
/// When a piece fills the budget exactly, a terminator that immediately
/// follows it belongs to that piece and is consumed with it, so no empty
/// line is produced. Returns `Ok(None)` once the peer has closed the stream.
pub async fn read_line<R>(reader: &mut R, max_bytes: usize) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = max_bytes.max(1) as u64;

    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if n as u64 == limit {
        let skip = match reader.fill_buf().await? {
            [b'\n', ..] => 1,
            [b'\r', b'\n', ..] => 2,
            _ => 0,
        };
        if skip == 1 && buf.last() == Some(&b'\r') {
            buf.pop();
        }
        reader.consume(skip);
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Texts the server sends to clients
pub mod notice {
    pub const PREPARING: &str = "The game is being prepared.";
    pub const PLEASE_WAIT: &str = "Please wait for it to start.";
    pub const CORRECT: &str = "Correct!";
    pub const GAME_START: &str = "The quiz tournament begins!";
    pub const QUIZ_LABEL: &str = "[Quiz]";

    pub fn joined(name: &str) -> String {
        format!("Joined: {}", name)
    }

    pub fn welcome(name: &str) -> String {
        format!("Hello, {}!", name)
    }

    pub fn chat(name: &str, text: &str) -> String {
        format!("{}: {}", name, text)
    }

    pub fn left(name: &str) -> String {
        format!("Left: {}", name)
    }

    pub fn score_line(name: &str, points: u32) -> String {
        format!("{}: {} pt", name, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;
    use tokio_test::io::Builder;

    #[test]
    fn test_encode_line() {
        assert_eq!(encode_line("hello"), b"hello\n".to_vec());
        assert_eq!(encode_line(""), b"\n".to_vec());
        assert_eq!(encode_line("a\nb"), b"a\nb\n".to_vec());
    }

    #[tokio::test]
    async fn test_read_line_strips_terminator_only() {
        let mock = Builder::new().read(b"  Alice \r\nsecond\n").build();
        let mut reader = BufReader::new(mock);

        let first = read_line(&mut reader, MAX_MESSAGE).await.unwrap();
        assert_eq!(first.as_deref(), Some("  Alice "));

        let second = read_line(&mut reader, MAX_MESSAGE).await.unwrap();
        assert_eq!(second.as_deref(), Some("second"));

        let end = read_line(&mut reader, MAX_MESSAGE).await.unwrap();
        assert_eq!(end, None);
    }

    #[tokio::test]
    async fn test_read_line_splits_on_budget() {
        let mock = Builder::new().read(b"abcdefgh\n").build();
        let mut reader = BufReader::new(mock);

        assert_eq!(read_line(&mut reader, 3).await.unwrap().as_deref(), Some("abc"));
        assert_eq!(read_line(&mut reader, 3).await.unwrap().as_deref(), Some("def"));
        assert_eq!(read_line(&mut reader, 3).await.unwrap().as_deref(), Some("gh"));
        assert_eq!(read_line(&mut reader, 3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_exactly_at_budget() {
        let mock = Builder::new().read(b"abcdefgh\nnext\n").build();
        let mut reader = BufReader::new(mock);

        assert_eq!(read_line(&mut reader, 8).await.unwrap().as_deref(), Some("abcdefgh"));
        assert_eq!(read_line(&mut reader, 8).await.unwrap().as_deref(), Some("next"));
        assert_eq!(read_line(&mut reader, 8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_budget_cuts_crlf() {
        let mock = Builder::new().read(b"abcdefg\r\n").read(b"abcdefgh\r\nz\n").build();
        let mut reader = BufReader::new(mock);

        assert_eq!(read_line(&mut reader, 8).await.unwrap().as_deref(), Some("abcdefg"));
        assert_eq!(read_line(&mut reader, 8).await.unwrap().as_deref(), Some("abcdefgh"));
        assert_eq!(read_line(&mut reader, 8).await.unwrap().as_deref(), Some("z"));
        assert_eq!(read_line(&mut reader, 8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_terminator_in_next_chunk() {
        let mock = Builder::new().read(b"abcdefgh").read(b"\nrest\n").build();
        let mut reader = BufReader::new(mock);

        assert_eq!(read_line(&mut reader, 8).await.unwrap().as_deref(), Some("abcdefgh"));
        assert_eq!(read_line(&mut reader, 8).await.unwrap().as_deref(), Some("rest"));
    }

    #[tokio::test]
    async fn test_read_line_across_chunks() {
        let mock = Builder::new().read(b"par").read(b"tial\n").build();
        let mut reader = BufReader::new(mock);

        let line = read_line(&mut reader, MAX_MESSAGE).await.unwrap();
        assert_eq!(line.as_deref(), Some("partial"));
    }

    #[tokio::test]
    async fn test_read_line_unterminated_tail() {
        let mock = Builder::new().read(b"no newline").build();
        let mut reader = BufReader::new(mock);

        let line = read_line(&mut reader, MAX_MESSAGE).await.unwrap();
        assert_eq!(line.as_deref(), Some("no newline"));
        assert_eq!(read_line(&mut reader, MAX_MESSAGE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_propagates_errors() {
        let mock = Builder::new()
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();
        let mut reader = BufReader::new(mock);

        let err = read_line(&mut reader, MAX_MESSAGE).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn test_notice_formatting() {
        assert_eq!(notice::joined("Bob"), "Joined: Bob");
        assert_eq!(notice::chat("Bob", "hi there"), "Bob: hi there");
        assert_eq!(notice::left("Bob"), "Left: Bob");
        assert_eq!(notice::score_line("Bob", 3), "Bob: 3 pt");
    }
}
