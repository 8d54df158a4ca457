//! Line-delimited stdio transport.
//!
//! Every non-blank input line is handled on its own task; responses are
//! written one per line as they complete, so ordering follows completion,
//! not arrival.
//!
//! Lines are decoded strictly. A line that is not valid UTF-8 is never
//! repaired and passed on: it gets the codec's parse-error reply and the
//! loop moves on to the next line.

use crate::envelope::EnvelopeCodec;
use crate::error::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

/// Stdio transport over an envelope codec
#[derive(Clone)]
pub struct StdioTransport {
    codec: Arc<dyn EnvelopeCodec>,
}

impl StdioTransport {
    pub fn new(codec: Arc<dyn EnvelopeCodec>) -> Self {
        Self { codec }
    }

    /// Serve the process stdin and stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        info!(envelope = %self.codec.kind(), "Starting stdio transport");
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await?;
        info!("Stdin closed, stdio transport stopped");
        Ok(())
    }

    /// Serve `reader` until end of input, then wait for in-flight requests
    /// and hand back the writer.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<W>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let mut tx = Some(tx);
        let mut buf = Vec::new();

        loop {
            tokio::select! {
                read = reader.read_until(b'\n', &mut buf), if tx.is_some() => {
                    let n = read?;
                    // Partial bytes from an interrupted read stay in `buf`
                    if n == 0 && buf.is_empty() {
                        debug!("End of input");
                        tx = None;
                        continue;
                    }
                    let line = String::from_utf8(std::mem::take(&mut buf));
                    if let Some(tx) = &tx {
                        match line {
                            Ok(line) => self.dispatch(line, tx.clone()),
                            Err(e) => {
                                warn!("Input line is not valid UTF-8: {}", e);
                                let _ = tx.send(self.codec.parse_failure(&e.to_string()));
                            }
                        }
                    }
                    if n == 0 {
                        tx = None;
                    }
                }
                response = rx.recv() => match response {
                    Some(response) => {
                        debug!("Sending response: {}", response);
                        writer.write_all(response.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;
                    }
                    None => break,
                },
            }
        }

        Ok(writer)
    }

    fn dispatch(&self, line: String, tx: mpsc::UnboundedSender<String>) {
        if line.trim().is_empty() {
            return;
        }

        let span = tracing::info_span!("request", request_id = %Uuid::new_v4());
        let codec = Arc::clone(&self.codec);

        tokio::spawn(
            async move {
                debug!("Received: {}", line.trim_end());
                let response = codec.handle_line(&line).await;
                // Receiver is gone only if the writer failed
                let _ = tx.send(response);
            }
            .instrument(span),
        );
    }
}
