use super::BusMessage;
use crate::dispatch::NotificationDispatcher;
use crate::focus::FocusPolicy;
use crate::session::SessionStore;
use crate::sound::SoundPlayer;
use color_eyre::Result;
use std::os::unix::io::{FromRawFd, IntoRawFd};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

/// Maximum concurrent connections to prevent resource exhaustion
const MAX_CONNECTIONS: usize = 100;

/// Socket receive buffer size (4KB is plenty for single-line JSON events)
const SOCKET_RECV_BUF: usize = 4096;

/// Client-side connect/write timeout
const FORWARD_TIMEOUT: Duration = Duration::from_millis(500);

/// Listen for host events on a Unix socket until cancelled
///
/// Each connection carries one [`BusMessage`] on a single line. Every event
/// is handled on its own task against the shared dispatcher, judged against
/// the terminal it came from, so a slow probe never blocks the next event.
pub async fn listen<F, S, P>(
    dispatcher: Arc<NotificationDispatcher<F, S, P>>,
    socket_path: &Path,
    cancel: CancellationToken,
) -> Result<()>
where
    F: FocusPolicy + 'static,
    S: SessionStore + 'static,
    P: SoundPlayer + 'static,
{
    // Remove existing socket file
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }

    // Create socket with socket2 for buffer tuning
    let socket = socket2::Socket::new(socket2::Domain::UNIX, socket2::Type::STREAM, None)?;

    // OS may clamp to minimum, which is fine
    if let Err(e) = socket.set_recv_buffer_size(SOCKET_RECV_BUF) {
        tracing::debug!("Could not set recv buffer size: {}", e);
    }

    socket.bind(&socket2::SockAddr::unix(socket_path)?)?;
    socket.listen(128)?;
    socket.set_nonblocking(true)?;

    // SAFETY: the fd comes straight from a freshly bound, listening socket2
    // socket whose ownership is transferred by into_raw_fd.
    let std_listener: std::os::unix::net::UnixListener =
        unsafe { std::os::unix::net::UnixListener::from_raw_fd(socket.into_raw_fd()) };
    let listener = UnixListener::from_std(std_listener)?;

    tracing::info!("Listening on {:?}", socket_path);

    let semaphore = Arc::new(Semaphore::new(MAX_CONNECTIONS));

    // Backoff state for accept errors
    let mut backoff_ms: u64 = 0;
    const MAX_BACKOFF_MS: u64 = 5000;

    loop {
        let accepted = tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("Event bus shutting down");
                break;
            }
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, _)) => {
                backoff_ms = 0;

                let permit = match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!(
                            "Connection limit reached ({} max), dropping connection",
                            MAX_CONNECTIONS
                        );
                        continue;
                    }
                };

                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    // Permit is held until this task completes
                    let _permit = permit;

                    let reader = BufReader::new(stream);
                    let mut lines = reader.lines();

                    match timeout(Duration::from_secs(2), lines.next_line()).await {
                        Ok(Ok(Some(line))) if !line.trim().is_empty() => {
                            match BusMessage::decode(&line) {
                                Ok(message) => {
                                    tracing::debug!("Received event: {:?}", message);
                                    dispatcher
                                        .handle(&message.event, message.origin.as_ref())
                                        .await;
                                }
                                Err(e) => {
                                    tracing::warn!("Failed to parse event: {} - {}", e, line);
                                }
                            }
                        }
                        Ok(Ok(Some(_))) => {} // Empty line, ignore
                        Ok(Ok(None)) => {}    // Stream closed
                        Ok(Err(e)) => {
                            tracing::warn!("Read error: {}", e);
                        }
                        Err(_) => {
                            tracing::debug!("Read timeout (connection may be stale)");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::error!("Accept error: {}", e);

                // Exponential backoff to prevent CPU spin on persistent errors
                if backoff_ms == 0 {
                    backoff_ms = 100;
                } else {
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                }

                tracing::debug!("Backing off for {}ms", backoff_ms);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }

    if socket_path.exists() {
        let _ = std::fs::remove_file(socket_path);
    }
    Ok(())
}

/// Send one event line to a running event bus
///
/// Returns `false` when nothing is listening, so the caller can handle the
/// event in-process instead.
pub async fn forward(socket_path: &Path, line: &str) -> bool {
    if !socket_path.exists() {
        return false;
    }

    let mut stream = match timeout(FORWARD_TIMEOUT, UnixStream::connect(socket_path)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Event bus not accepting connections");
            return false;
        }
        Err(_) => {
            tracing::debug!("Event bus connect timed out");
            return false;
        }
    };

    let data = format!("{}\n", line.trim());
    match timeout(FORWARD_TIMEOUT, stream.write_all(data.as_bytes())).await {
        Ok(Ok(())) => {
            let _ = stream.shutdown().await;
            true
        }
        _ => {
            tracing::debug!("Failed to write event to bus");
            false
        }
    }
}
