//! Terminal chat transport: one command per stdin line, replies on stdout.

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};
use weather_core::{Command, CommandProcessor, Reply, Transport, TransportError};

pub struct ConsoleTransport<W> {
    out: Mutex<W>,
}

impl<W> ConsoleTransport<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> Transport for ConsoleTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, _user_id: i64, reply: &Reply) -> Result<(), TransportError> {
        let mut out = self.out.lock().await;
        out.write_all(reply.text.as_bytes()).await?;
        out.write_all(b"\n\n").await?;
        out.flush().await?;
        Ok(())
    }
}

/// Feed every command line from `input` to `processor` as `user_id` until EOF.
pub async fn run_chat<R>(
    processor: &CommandProcessor,
    user_id: i64,
    input: R,
    transport: &dyn Transport,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(user_id, &line) else {
            if !line.trim().is_empty() {
                tracing::debug!(user_id, "ignoring non-command line");
            }
            continue;
        };

        let dispatch = processor.dispatch(&command, transport).await;
        tracing::debug!(
            user_id,
            command = %command.name,
            delivered = dispatch.delivered,
            audit = ?dispatch.audit,
            "command handled"
        );
    }

    Ok(())
}
