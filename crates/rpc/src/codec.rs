//! Line-delimited JSON-RPC over a raw stream.
//!
//! Every request is one line of JSON (a single call or a batch) and every
//! reply is written back as one line, in request order. Notifications get
//! no line back.

use crate::RpcServer;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Maximum accepted request line, in bytes.
pub const MAX_LINE_LENGTH: usize = 5 * 1024 * 1024;

/// Serves one connection until EOF, a codec error, or `cancel`.
pub async fn serve_codec<S>(server: Arc<RpcServer>, io: S, cancel: CancellationToken)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(io, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));

    loop {
        let line = tokio::select! {
            next = framed.next() => next,
            _ = cancel.cancelled() => {
                debug!(target: "seele::rpc", "rpc session cancelled");
                break;
            }
        };

        let line = match line {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!(target: "seele::rpc", error = %e, "rpc codec error");
                break;
            }
            None => break,
        };

        if line.trim().is_empty() {
            continue;
        }

        let Some(reply) = server.handle_text(&line) else {
            continue;
        };
        if let Err(e) = framed.send(reply).await {
            warn!(target: "seele::rpc", error = %e, "failed to write rpc reply");
            break;
        }
    }
}
