use std::future::Future;

use tokio::sync::watch;

/// Stop request for the HTTP server, raised by a signal or by the caller.
#[derive(Clone)]
pub struct Shutdown {
    requested: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (requested, _) = watch::channel(false);
        Self { requested }
    }

    pub fn trigger(&self) {
        self.requested.send_replace(true);
    }

    /// Resolves once a stop has been requested, including before the call.
    /// Suitable for `axum::serve(..).with_graceful_shutdown`.
    pub fn requested(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut receiver = self.requested.subscribe();
        async move {
            let _ = receiver.wait_for(|stop| *stop).await;
        }
    }

    /// Raises the stop request on Ctrl-C and, on unix, SIGTERM.
    pub fn install_signal_handlers(&self) {
        let ctrlc = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!(target: "app", "received Ctrl-C; draining requests");
                ctrlc.trigger();
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let term = self.clone();
            tokio::spawn(async move {
                if let Ok(mut sig) = signal(SignalKind::terminate()) {
                    sig.recv().await;
                    tracing::info!(target: "app", "received SIGTERM; draining requests");
                    term.trigger();
                }
            });
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn pending_until_triggered() {
        let shutdown = Shutdown::new();
        let waiting = shutdown.requested();
        assert!(timeout(Duration::from_millis(50), shutdown.requested())
            .await
            .is_err());

        shutdown.trigger();
        timeout(Duration::from_secs(1), waiting).await.unwrap();
    }

    #[tokio::test]
    async fn trigger_before_wait_resolves_immediately() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        timeout(Duration::from_secs(1), shutdown.clone().requested())
            .await
            .unwrap();
    }
}
