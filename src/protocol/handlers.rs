//! Command handlers for depot sessions.
//!
//! Each handler runs one parsed command against the shared [`Depot`] and
//! returns the reply to send. Upload bodies are read from the session's
//! command stream right after the `150` reply.

use log::{info, warn};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::depot::Depot;
use crate::error::{DepotError, RepositoryError};
use crate::error::handlers::{handle_error, reply_code};
use crate::protocol::responses::{
    ARGUMENT_ERROR, COMPLETE, DATA_FOLLOWS, GOODBYE, SYNTAX_ERROR, format_response,
};
use crate::protocol::{Command, CommandResult, CommandStatus};
use crate::storage::validate_file_name;
use crate::tabular;

/// Dispatches a parsed command.
///
/// `reader` and `writer` are the session's command stream. Only `UPLOAD`
/// touches them directly. An `Err` means the connection itself failed.
pub async fn handle_command<R, W>(
    depot: &Depot,
    command: &Command,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<CommandResult>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let result = match command {
        Command::QUIT => handle_cmd_quit(),
        Command::LIST => handle_cmd_list(depot).await,
        Command::PREVIEW(name) => handle_cmd_preview(depot, name).await,
        Command::UPLOAD {
            name,
            length,
            declared_type,
        } => handle_cmd_upload(depot, name, *length, declared_type, reader, writer).await?,
        Command::INVALID(reason) => CommandResult {
            status: CommandStatus::Failure(reason.clone()),
            message: Some(format_response(ARGUMENT_ERROR, reason)),
        },
        Command::UNKNOWN => CommandResult {
            status: CommandStatus::Failure("Unknown command".into()),
            message: Some(format_response(SYNTAX_ERROR, "Unknown command")),
        },
    };

    Ok(result)
}

fn handle_cmd_quit() -> CommandResult {
    CommandResult {
        status: CommandStatus::CloseConnection,
        message: Some(format_response(GOODBYE, "Goodbye")),
    }
}

/// Replies with one `<size>\t<name>` line per stored file
async fn handle_cmd_list(depot: &Depot) -> CommandResult {
    let files = match depot.list_files().await {
        Ok(files) => files,
        Err(e) => return failure(e.into()),
    };

    let mut message = format_response(DATA_FOLLOWS, &format!("{} file(s)", files.len()));
    for file in &files {
        message.push_str(&format!("{}\t{}\r\n", file.size_bytes, file.name));
    }
    message.push_str(&format_response(COMPLETE, "Listing complete"));

    CommandResult {
        status: CommandStatus::Success,
        message: Some(message),
    }
}

/// Replies with the parsed table re-encoded as CSV, framed by its byte length
async fn handle_cmd_preview(depot: &Depot, name: &str) -> CommandResult {
    let table = match depot.read_preview(name).await {
        Ok(table) => table,
        Err(e) => return failure(e.into()),
    };

    let body = match tabular::encode(&table)
        .and_then(|bytes| String::from_utf8(bytes).map_err(io::Error::other))
    {
        Ok(body) => body,
        Err(e) => return failure(RepositoryError::Io(e).into()),
    };

    let mut message = format_response(
        DATA_FOLLOWS,
        &format!(
            "{} column(s), {} row(s), {} bytes",
            table.columns.len(),
            table.rows.len(),
            body.len()
        ),
    );
    message.push_str(&body);
    message.push_str(&format_response(COMPLETE, "Preview complete"));

    CommandResult {
        status: CommandStatus::Success,
        message: Some(message),
    }
}

/// Checks what can be checked before the body is sent, then reads exactly
/// `length` bytes and ingests them
async fn handle_cmd_upload<R, W>(
    depot: &Depot,
    name: &str,
    length: u64,
    declared_type: &str,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<CommandResult>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Err(e) = validate_file_name(name) {
        return Ok(failure(e.into()));
    }
    if let Err(e) = depot.validator().check_size(length) {
        return Ok(failure(e.into()));
    }

    writer
        .write_all(format_response(DATA_FOLLOWS, &format!("Ready for {} bytes", length)).as_bytes())
        .await?;
    writer.flush().await?;

    // Bounded by the size ceiling checked above
    let mut content = vec![0u8; length as usize];
    if let Err(e) = reader.read_exact(&mut content).await {
        warn!("Upload of {} ended after a partial body: {}", name, e);
        return Err(e);
    }

    match depot.ingest_upload(&content, declared_type, name).await {
        Ok(()) => {
            info!("Upload of {} complete", name);
            Ok(CommandResult {
                status: CommandStatus::Success,
                message: Some(format_response(COMPLETE, "Upload complete")),
            })
        }
        Err(e) => Ok(failure(e.into())),
    }
}

fn failure(err: DepotError) -> CommandResult {
    handle_error(&err);
    let text = err.to_string();
    CommandResult {
        message: Some(format_response(reply_code(&err), &text)),
        status: CommandStatus::Failure(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadLimits;
    use crate::storage::Repository;
    use tempfile::TempDir;

    fn depot(temp: &TempDir, max: u64) -> Depot {
        let limits = UploadLimits {
            max_upload_size_bytes: max,
            ..UploadLimits::default()
        };
        Depot::with_repository(Repository::new(temp.path().canonicalize().unwrap()), limits)
    }

    async fn run(depot: &Depot, command: Command, body: &[u8]) -> (CommandResult, String) {
        let mut reader = body;
        let mut written: Vec<u8> = vec![];
        let result = handle_command(depot, &command, &mut reader, &mut written)
            .await
            .unwrap();
        (result, String::from_utf8(written).unwrap())
    }

    fn upload(name: &str, length: u64) -> Command {
        Command::UPLOAD {
            name: name.into(),
            length,
            declared_type: "text/csv".into(),
        }
    }

    #[tokio::test]
    async fn test_upload_then_preview() {
        let temp = TempDir::new().unwrap();
        let depot = depot(&temp, 1000);
        let body = b"name,val\nx,1\ny,2\n";

        let (result, preliminary) = run(&depot, upload("t.csv", body.len() as u64), body).await;
        assert_eq!(preliminary, "150 Ready for 17 bytes\r\n");
        assert_eq!(result.status, CommandStatus::Success);
        assert_eq!(result.message.unwrap(), "226 Upload complete\r\n");

        let (result, _) = run(&depot, Command::PREVIEW("t.csv".into()), b"").await;
        assert_eq!(
            result.message.unwrap(),
            "150 2 column(s), 2 row(s), 17 bytes\r\nname,val\nx,1\ny,2\n226 Preview complete\r\n"
        );
    }

    #[tokio::test]
    async fn test_oversized_upload_is_refused_before_body() {
        let temp = TempDir::new().unwrap();
        let depot = depot(&temp, 4);

        let (result, preliminary) = run(&depot, upload("big.csv", 5), b"a,b\n1").await;

        assert!(preliminary.is_empty());
        assert!(result.message.unwrap().starts_with("552 "));
        assert!(!temp.path().join("big.csv").exists());
    }

    #[tokio::test]
    async fn test_escaping_name_is_refused_before_body() {
        let temp = TempDir::new().unwrap();
        let depot = depot(&temp, 100);

        let (result, preliminary) = run(&depot, upload("../x.csv", 3), b"a\n1").await;

        assert!(preliminary.is_empty());
        assert!(result.message.unwrap().starts_with("553 "));
    }

    #[tokio::test]
    async fn test_binary_upload_is_rejected() {
        let temp = TempDir::new().unwrap();
        let depot = depot(&temp, 100);

        let (result, _) = run(&depot, upload("img.csv", 4), b"\0\x01\x02\x03").await;

        assert!(matches!(result.status, CommandStatus::Failure(_)));
        assert!(result.message.unwrap().starts_with("554 "));
        assert!(!temp.path().join("img.csv").exists());
    }

    #[tokio::test]
    async fn test_truncated_body_fails_the_connection() {
        let temp = TempDir::new().unwrap();
        let depot = depot(&temp, 100);
        let mut reader: &[u8] = b"a,b";
        let mut written: Vec<u8> = vec![];

        let err = handle_command(&depot, &upload("t.csv", 10), &mut reader, &mut written)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(!temp.path().join("t.csv").exists());
    }

    #[tokio::test]
    async fn test_list_and_missing_preview() {
        let temp = TempDir::new().unwrap();
        let depot = depot(&temp, 100);
        std::fs::write(temp.path().join("a.csv"), b"x\n1\n").unwrap();

        let (result, _) = run(&depot, Command::LIST, b"").await;
        assert_eq!(
            result.message.unwrap(),
            "150 1 file(s)\r\n4\ta.csv\r\n226 Listing complete\r\n"
        );

        let (result, _) = run(&depot, Command::PREVIEW("nope.csv".into()), b"").await;
        assert!(result.message.unwrap().starts_with("550 "));
    }

    #[tokio::test]
    async fn test_malformed_preview_reports_parse_failure() {
        let temp = TempDir::new().unwrap();
        let depot = depot(&temp, 100);
        std::fs::write(temp.path().join("bad.csv"), b"a,b\nx,y\"z\n").unwrap();

        let (result, _) = run(&depot, Command::PREVIEW("bad.csv".into()), b"").await;

        assert!(result.message.unwrap().starts_with("551 "));
    }

    #[tokio::test]
    async fn test_quit_and_unknown() {
        let temp = TempDir::new().unwrap();
        let depot = depot(&temp, 100);

        let (result, _) = run(&depot, Command::QUIT, b"").await;
        assert_eq!(result.status, CommandStatus::CloseConnection);
        assert_eq!(result.message.unwrap(), "221 Goodbye\r\n");

        let (result, _) = run(&depot, Command::UNKNOWN, b"").await;
        assert_eq!(result.message.unwrap(), "500 Unknown command\r\n");
    }
}
