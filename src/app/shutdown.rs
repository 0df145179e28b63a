//! Interrupt handling and graceful shutdown.

use futures::{Stream, StreamExt};
use log::{error, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Exit status after a forced second interrupt (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

/// Spawns a task that cancels `cancel` on the first Ctrl-C and exits the
/// process on the second.
///
/// The task exits on its own once `done` is cancelled, so a completed run
/// does not leave a signal listener behind.
pub fn spawn_interrupt_listener(
    cancel: CancellationToken,
    done: CancellationToken,
) -> JoinHandle<()> {
    let interrupts = Box::pin(futures::stream::unfold((), |()| async {
        Some((tokio::signal::ctrl_c().await, ()))
    }));
    tokio::spawn(async move {
        if watch_interrupts(interrupts, cancel, done).await == ListenerExit::Forced {
            error!("Second interrupt received, exiting without waiting for in-flight batches");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}

#[derive(Debug, PartialEq, Eq)]
enum ListenerExit {
    Finished,
    Forced,
}

async fn watch_interrupts<S>(
    mut interrupts: S,
    cancel: CancellationToken,
    done: CancellationToken,
) -> ListenerExit
where
    S: Stream<Item = std::io::Result<()>> + Unpin,
{
    let mut interrupted = false;
    loop {
        tokio::select! {
            biased;
            _ = done.cancelled() => return ListenerExit::Finished,
            next = interrupts.next() => match next {
                Some(Ok(())) if interrupted => return ListenerExit::Forced,
                Some(Ok(())) => {
                    warn!(
                        "Interrupt received, finishing in-flight batches before exiting \
                         (press Ctrl-C again to force)"
                    );
                    interrupted = true;
                    cancel.cancel();
                }
                Some(Err(e)) => {
                    warn!("Failed to listen for interrupt signal: {}", e);
                    done.cancelled().await;
                    return ListenerExit::Finished;
                }
                None => {
                    done.cancelled().await;
                    return ListenerExit::Finished;
                }
            },
        }
    }
}

/// Stops the background tasks of a finished run and waits for them.
pub async fn shutdown_gracefully(done: CancellationToken, tasks: Vec<JoinHandle<()>>) {
    done.cancel();
    for task in tasks {
        if let Err(e) = task.await {
            warn!("Background task ended abnormally: {}", e);
        }
    }
    info!("Background tasks stopped");
}
