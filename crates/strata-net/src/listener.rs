//! Inbound peer connection listener.
//!
//! Kept generic over the handler so this crate never depends on
//! `strata-store`: the byte-store wiring lives in the `stratad` binary,
//! which depends on both. One spawned `tokio` task per accepted connection.

use std::future::Future;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::error::NetError;

/// Accepts connections on `listener` and spawns `handler` for each one,
/// until `shutdown` fires. Connections in flight when shutdown fires are
/// left to finish on their own; this function returns once no more new
/// connections will be accepted.
pub async fn serve<H, Fut>(
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
    handler: Arc<H>,
) -> Result<(), NetError>
where
    H: Fn(TcpStream) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("peer listener shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer_addr) = accepted?;
                tracing::debug!(%peer_addr, "accepted peer connection");
                let handler = handler.clone();
                tokio::spawn(async move {
                    handler(stream).await;
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpStream as ClientStream;

    #[tokio::test]
    async fn serve_spawns_handler_per_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let handler = Arc::new(move |_stream: TcpStream| {
            let count = count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        let serve_task = tokio::spawn(serve(listener, shutdown_rx, handler));

        for _ in 0..3 {
            let _ = ClientStream::connect(addr).await.unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        shutdown_tx.send(()).unwrap();
        serve_task.await.unwrap().unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
