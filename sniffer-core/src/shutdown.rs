use std::future::Future;
use std::io;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The one shutdown signal of the process.
///
/// Cancelled on ctrl-c or SIGTERM. Every task gets a clone and reacts by
/// dropping the single channel sender it owns.
pub fn shutdown_listener() -> io::Result<CancellationToken> {
    let cancellation_token = CancellationToken::new();
    let signalled = wait_for_signal()?;

    tokio::spawn({
        let cancellation_token = cancellation_token.clone();
        async move {
            signalled.await;
            cancellation_token.cancel();
        }
    });

    Ok(cancellation_token)
}

#[cfg(unix)]
fn wait_for_signal() -> io::Result<impl Future<Output = ()>> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("SIGTERM received"),
            _ = signal::ctrl_c() => info!("interrupt received"),
        }
    })
}

#[cfg(not(unix))]
fn wait_for_signal() -> io::Result<impl Future<Output = ()>> {
    Ok(async {
        if signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
        }
    })
}
