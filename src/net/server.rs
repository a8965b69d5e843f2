//! Core HTTP server implementation.
//!
//! This module implements the listener side of the server.
//! It is responsible only for:
//! - binding the listening socket,
//! - accepting TCP connections,
//! - handing each connection to the worker pool,
//! - stopping cleanly when asked to.
//!
//! Everything that happens on an accepted socket lives in
//! [`connection`](crate::net::connection), and everything HTTP-specific in
//! the `http` and `handler` namespaces.
//!
//! ## Connection lifecycle
//!
//! 1. Accept a TCP connection
//! 2. Wait for a free worker slot
//!    (see [`WorkerPool`](crate::net::pool::WorkerPool))
//! 3. Frame, parse and route one request, then write the response
//!    (delegated to [`handle_connection`](crate::net::connection::handle_connection))
//! 4. Close the socket
//!
//! A [`ShutdownHandle`] flips the running flag and wakes the accept loop.
//! Requests already being served are allowed to finish.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_std::net::TcpListener;
use async_std::task;

use crate::config::ServerConfig;
use crate::net::connection::handle_connection;
use crate::net::pool::WorkerPool;

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct Server {
    config: Arc<ServerConfig>,
    listener: TcpListener,
    running: Arc<AtomicBool>,
}

/// Stops a running [`Server`] from any thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl Server {
    /// Binds the listening socket on the configured address and port.
    pub async fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.socket_addr()).await?;
        Ok(Self {
            config: Arc::new(config),
            listener,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Actual bound address, useful when the configured port is 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> io::Result<ShutdownHandle> {
        let mut wake_addr = self.local_addr()?;
        // connect to loopback when bound to a wildcard address
        if wake_addr.ip().is_unspecified() {
            wake_addr.set_ip(match wake_addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            });
        }
        Ok(ShutdownHandle {
            running: Arc::clone(&self.running),
            wake_addr,
        })
    }

    /// Accepts connections until stopped, then waits for in-flight requests.
    pub async fn run(self) {
        let pool = WorkerPool::new(self.config.max_threads);
        tracing::info!(
            addr = %self.config.socket_addr(),
            root = %self.config.root.display(),
            workers = pool.size(),
            "server listening"
        );

        while self.running.load(Ordering::SeqCst) {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    if !self.running.load(Ordering::SeqCst) {
                        tracing::debug!(%peer, "dropping connection accepted during shutdown");
                        break;
                    }
                    tracing::debug!(%peer, busy = pool.busy(), "accepted connection");
                    pool.submit(handle_connection(stream, Arc::clone(&self.config)))
                        .await;
                }
                Err(e) if !self.running.load(Ordering::SeqCst) => {
                    tracing::info!(error = %e, "accept interrupted by shutdown");
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    // persistent errors such as EMFILE would otherwise spin
                    task::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }

        tracing::info!(busy = pool.busy(), "shutting down, waiting for in-flight requests");
        pool.drain().await;
        drop(self.listener);
        tracing::info!("server stopped");
    }
}

impl ShutdownHandle {
    /// Clears the running flag and wakes the accept loop. Calling it twice is
    /// harmless.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        tracing::info!("stop requested");

        // a throwaway connection unblocks the pending accept
        if let Err(e) = std::net::TcpStream::connect_timeout(&self.wake_addr, Duration::from_secs(1))
        {
            tracing::debug!(error = %e, "wake-up connection failed");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
