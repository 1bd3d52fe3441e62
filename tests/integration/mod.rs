//! End-to-end tests against a server bound to an ephemeral port

mod client_tests;

use habit_calendar::{AppConfig, Args, HabitCalendarServer};
use clap::Parser;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A running server and the scratch directory holding its data
pub struct TestServer {
    pub base_url: String,
    pub config: AppConfig,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
    _dir: Option<TempDir>,
}

impl TestServer {
    pub async fn start() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut server = Self::start_in(dir.path()).await;
        server._dir = Some(dir);
        server
    }

    /// Start a server whose data lives under `data_dir`
    pub async fn start_in(data_dir: &std::path::Path) -> Self {
        let args = Args::parse_from([
            "habit-calendar",
            "--data-dir",
            data_dir.to_str().expect("utf-8 path"),
            "--bind",
            "127.0.0.1",
            "--utc-offset-minutes",
            "0",
        ]);
        let config = AppConfig::from_args(&args).expect("Failed to resolve config");
        let server = HabitCalendarServer::new(&config).expect("Failed to create server");

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await
                .expect("server failed");
        });

        Self {
            base_url,
            config,
            shutdown: Some(tx),
            handle,
            _dir: None,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Stop accepting connections and wait for the server task
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.handle).await.expect("server task panicked");
    }
}
