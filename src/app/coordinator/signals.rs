//! Signal handling for cancellation
//!
//! Ctrl-C and SIGTERM are turned into a broadcast on the shutdown channel.
//! The coordinator never terminates from inside the handler; it observes the
//! broadcast between tile fetches and unwinds through its normal purge path.

use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Signal handler that forwards termination signals to a shutdown channel
pub struct SignalHandler {
    shutdown_tx: broadcast::Sender<()>,
}

impl SignalHandler {
    /// Create a new signal handler with the given shutdown broadcaster
    pub fn new(shutdown_tx: broadcast::Sender<()>) -> Self {
        Self { shutdown_tx }
    }

    /// Spawn the background task that waits for Ctrl-C or SIGTERM
    ///
    /// If a signal listener cannot be installed the failure is logged and
    /// that signal is simply never observed.
    pub fn setup(&self) -> JoinHandle<()> {
        let shutdown_tx = self.shutdown_tx.clone();

        tokio::spawn(async move {
            let ctrl_c = async {
                match signal::ctrl_c().await {
                    Ok(()) => info!("Ctrl+C signal received"),
                    Err(e) => {
                        error!("Failed to install Ctrl+C handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut stream) => {
                        stream.recv().await;
                        info!("SIGTERM signal received");
                    }
                    Err(e) => {
                        error!("Failed to install SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {
                    info!("Received Ctrl+C, cancelling run");
                },
                _ = terminate => {
                    info!("Received terminate signal, cancelling run");
                },
            }

            let _ = shutdown_tx.send(());
        })
    }
}

/// Create a shutdown signal broadcaster
pub fn create_shutdown_channel() -> (broadcast::Sender<()>, broadcast::Receiver<()>) {
    broadcast::channel(1)
}

/// Non-blocking check whether shutdown has been requested on `shutdown_rx`
///
/// A closed channel means nobody can request shutdown any more and is not
/// treated as a request.
pub fn shutdown_requested(shutdown_rx: &mut broadcast::Receiver<()>) -> bool {
    use broadcast::error::TryRecvError;

    match shutdown_rx.try_recv() {
        Ok(()) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_shutdown_channel_creation() {
        let (tx, mut rx) = create_shutdown_channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(());
        });

        let result = timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_signal_handler_setup_does_not_fire() {
        let (tx, mut rx) = create_shutdown_channel();
        let handler = SignalHandler::new(tx);
        let handle = handler.setup();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!shutdown_requested(&mut rx));
        handle.abort();
    }

    #[test]
    fn test_shutdown_requested_states() {
        let (tx, mut rx) = create_shutdown_channel();
        assert!(!shutdown_requested(&mut rx));

        tx.send(()).unwrap();
        assert!(shutdown_requested(&mut rx));
        assert!(!shutdown_requested(&mut rx));

        drop(tx);
        assert!(!shutdown_requested(&mut rx));
    }

    #[test]
    fn test_lagged_receiver_counts_as_shutdown() {
        let (tx, mut rx) = create_shutdown_channel();
        tx.send(()).unwrap();
        tx.send(()).unwrap();
        assert!(shutdown_requested(&mut rx));
    }
}
