//! Shared harness: a daemon on an ephemeral port.

#![allow(dead_code)]

use meld_kernel::host::MeldState;
use meld_kernel::infrastructure::{config::Settings, server};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub base_url: String,
    pub addr: std::net::SocketAddr,
    pub state: MeldState,
    shutdown: Option<oneshot::Sender<()>>,
    serving: Option<JoinHandle<anyhow::Result<()>>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(Settings::defaults().unwrap()).await
    }

    pub async fn start_with(settings: Settings) -> Self {
        let state = MeldState::new(&settings);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = server::build_router(state.clone(), &settings.server, None);

        let (tx, rx) = oneshot::channel::<()>();
        let serving = tokio::spawn(server::serve(listener, router, state.clone(), async move {
            let _ = rx.await;
        }));

        Self {
            base_url: format!("http://{addr}"),
            addr,
            state,
            shutdown: Some(tx),
            serving: Some(serving),
        }
    }

    /// Fires the shutdown signal and waits for the server to drain.
    pub async fn stop(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.serving.take() {
            Some(serving) => serving.await?,
            None => Ok(()),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.state.shutdown();
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Fast settings for watcher-driven tests.
pub fn quick_settings() -> Settings {
    let mut settings = Settings::defaults().unwrap();
    settings.watch.debounce_ms = 50;
    settings.server.keep_alive_secs = 1;
    settings
}
