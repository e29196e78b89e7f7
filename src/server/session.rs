use log::{error, info};
use std::io;
use std::net::SocketAddr;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;

use crate::depot::Depot;
use crate::protocol::responses::{READY, SYNTAX_ERROR, format_response};
use crate::protocol::{CommandStatus, handle_command, parse_command};

/// Outcome of reading one command line
#[derive(Debug, PartialEq)]
enum LineRead {
    Command(String),
    TooLong,
    NotUtf8,
    Closed,
}

/// Runs one client session: greeting, then commands until QUIT, EOF, or a
/// connection failure.
pub async fn handle_session(
    cmd_stream: TcpStream,
    client_addr: SocketAddr,
    depot: Depot,
    max_command_length: usize,
) {
    let (read_half, mut write_half) = cmd_stream.into_split();
    let mut reader = BufReader::new(read_half);

    run_session(
        &mut reader,
        &mut write_half,
        client_addr,
        &depot,
        max_command_length,
    )
    .await;

    info!("Client {} disconnected", client_addr);
}

async fn run_session<R, W>(
    reader: &mut R,
    writer: &mut W,
    client_addr: SocketAddr,
    depot: &Depot,
    max_command_length: usize,
) where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Err(e) = writer
        .write_all(format_response(READY, "csv-depot ready").as_bytes())
        .await
    {
        error!("Failed to greet {}: {}", client_addr, e);
        return;
    }

    loop {
        let rejection = match read_command_line(reader, max_command_length).await {
            Ok(LineRead::Command(line)) => {
                let command = parse_command(&line);
                info!("Received from {}: {:?}", client_addr, &command);

                let result = match handle_command(depot, &command, reader, writer).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Session with {} failed: {}", client_addr, e);
                        break;
                    }
                };

                if let Some(msg) = &result.message {
                    if let Err(e) = writer.write_all(msg.as_bytes()).await {
                        error!("Failed to reply to {}: {}", client_addr, e);
                        break;
                    }
                }

                if result.status == CommandStatus::CloseConnection {
                    info!("Client {} requested to quit", client_addr);
                    break;
                }
                continue;
            }
            Ok(LineRead::TooLong) => "Command too long",
            Ok(LineRead::NotUtf8) => "Command is not valid UTF-8",
            Ok(LineRead::Closed) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        };

        if let Err(e) = writer
            .write_all(format_response(SYNTAX_ERROR, rejection).as_bytes())
            .await
        {
            error!("Failed to reply to {}: {}", client_addr, e);
            break;
        }
    }
}

/// Reads up to one LF-terminated line of at most `limit` bytes, CRLF included.
/// An overlong line is consumed to its end and reported as `TooLong`.
async fn read_command_line<R>(reader: &mut R, limit: usize) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(limit as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(LineRead::Closed);
    }

    if buf.len() > limit {
        while buf.last() != Some(&b'\n') {
            buf.clear();
            if (&mut *reader).take(limit as u64).read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
        }
        return Ok(LineRead::TooLong);
    }

    match String::from_utf8(buf) {
        Ok(line) => Ok(LineRead::Command(line)),
        Err(_) => Ok(LineRead::NotUtf8),
    }
}
