use log::{debug, info};
use shared::{encode_line, read_line};
use std::io;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;

/// Local input lines are not bounded by the network budget
const INPUT_LINE_LIMIT: usize = 64 * 1024;

/// Read budget for lines coming from the server.
///
/// A chat echo is a name and a message joined by `": "`, and the server reads
/// each of those with `max_message`, so an echo can be twice the budget.
/// Quiz prompts come from the administrator and are not bounded by it at all.
fn server_line_budget(max_message: usize) -> usize {
    max_message
        .saturating_mul(2)
        .saturating_add(2)
        .max(INPUT_LINE_LIMIT)
}

pub struct Client {
    stream: TcpStream,
    max_message: usize,
}

impl Client {
    pub async fn connect(server_addr: &str, max_message: usize) -> io::Result<Self> {
        let stream = TcpStream::connect(server_addr).await?;
        info!("Connected to {}", stream.peer_addr()?);

        Ok(Client {
            stream,
            max_message,
        })
    }

    /// Forwards `input` lines to the server and prints server lines to
    /// `output`.
    ///
    /// When `input` ends, the sending side is shut down and the remaining
    /// server lines are printed until the server closes the connection.
    /// Returns as soon as the server goes away.
    pub async fn run<I, O>(self, mut input: I, output: O) -> io::Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin + Send + 'static,
    {
        let (read_half, mut write_half) = self.stream.into_split();
        let mut listener = tokio::spawn(print_lines(
            BufReader::new(read_half),
            output,
            server_line_budget(self.max_message),
        ));

        tokio::select! {
            result = forward_lines(&mut input, &mut write_half) => {
                result?;
                flatten(listener.await)
            }
            joined = &mut listener => {
                info!("Server closed the connection");
                flatten(joined)
            }
        }
    }
}

async fn forward_lines<I>(input: &mut I, writer: &mut OwnedWriteHalf) -> io::Result<()>
where
    I: AsyncBufRead + Unpin,
{
    while let Some(line) = read_line(input, INPUT_LINE_LIMIT).await? {
        writer.write_all(&encode_line(&line)).await?;
    }

    debug!("Input closed, shutting down the sending side");
    writer.shutdown().await
}

async fn print_lines<R, O>(mut reader: BufReader<R>, mut output: O, budget: usize) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    while let Some(line) = read_line(&mut reader, budget).await? {
        output.write_all(&encode_line(&line)).await?;
        output.flush().await?;
    }
    Ok(())
}

fn flatten(joined: Result<io::Result<()>, tokio::task::JoinError>) -> io::Result<()> {
    joined.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}
