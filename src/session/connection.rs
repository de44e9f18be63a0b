//! Session protocol loop
//!
//! Prompt, read one line, dispatch, reply. The world lock is only taken
//! inside `PlayerSession::execute`, which returns before any await, so
//! no session ever holds it across network I/O.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::session::command::Command;
use crate::session::player::{PlayerSession, PROMPT};
use crate::world::WorldState;

/// Longest command line accepted, newline included
pub const MAX_LINE: usize = 256;

/// Drive one session until the client disconnects.
///
/// Returns the player with its final inventory on a clean disconnect;
/// a read or write failure ends the session with that error.
pub async fn run_session<R, W>(
    mut reader: R,
    mut writer: W,
    mut player: PlayerSession,
    world: Arc<WorldState>,
) -> std::io::Result<PlayerSession>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(MAX_LINE);

    writer.write_all(format!("{}\n", player.welcome()).as_bytes()).await?;

    loop {
        writer.write_all(format!("{}\n", PROMPT).as_bytes()).await?;
        writer.flush().await?;

        let Some(command) = read_command(&mut reader, &mut buf).await? else {
            break;
        };

        let reply = player.execute(&command, &world);
        writer.write_all(reply.to_string().as_bytes()).await?;
    }

    Ok(player)
}

/// Read one command line of at most `MAX_LINE` bytes.
///
/// Bytes that aren't UTF-8 are decoded lossily and end up as an unknown
/// command. An over-long line is skipped up to its newline without
/// being buffered and also counts as unknown. `None` means EOF.
async fn read_command<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<Command>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = (&mut *reader)
        .take(MAX_LINE as u64)
        .read_until(b'\n', buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    if read == MAX_LINE && buf.last() != Some(&b'\n') {
        skip_line(reader).await?;
        let prefix = String::from_utf8_lossy(&buf[..16]).into_owned();
        return Ok(Some(Command::Unknown(format!("{}...", prefix))));
    }

    Ok(Some(Command::parse(&String::from_utf8_lossy(buf))))
}

/// Discard input through the next newline or EOF
async fn skip_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (used, done) = {
            let chunk = reader.fill_buf().await?;
            if chunk.is_empty() {
                return Ok(());
            }
            match chunk.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (chunk.len(), false),
            }
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}
