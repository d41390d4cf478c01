//! Server configuration and lifecycle.
//!
//! This module parses the command line, owns the shared pieces every
//! connection needs (store, snapshot manager, replica set) and runs the
//! accept loop. A node configured with `--replicaof` dials its primary,
//! performs the handshake and applies the replicated stream alongside its
//! own client connections.

use std::sync::Arc;

use anyhow::Context;
use bytes::BytesMut;
use rand::distr::{Alphanumeric, SampleString};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use crate::connection::handle_client_connection;
use crate::replication::{self, ReplicaSet};
use crate::snapshot::SnapshotManager;
use crate::store::{SharedStore, Store};
use crate::sweeper::start_sweeper;

/// Errors that can occur while parsing the command line.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum CliError {
    #[error("invalid command line flag")]
    InvalidCommandLineFlag,
    #[error("invalid port flag value")]
    InvalidPortFlagValue,
    #[error("invalid replicaof value, expected \"<host> <port>\"")]
    InvalidReplicaOfValue,
    #[error("invalid replicaof port")]
    InvalidReplicaOfPort,
}

/// The role this node plays.
#[derive(Debug, PartialEq, Clone)]
pub enum ServerRole {
    Primary,
    Replica { host: String, port: u16 },
}

impl ServerRole {
    /// Role name as reported by INFO, using the wire protocol's
    /// traditional terminology.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerRole::Primary => "master",
            ServerRole::Replica { .. } => "slave",
        }
    }

    pub fn is_replica(&self) -> bool {
        matches!(self, ServerRole::Replica { .. })
    }
}

/// Immutable configuration resolved at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Directory holding the snapshot file
    pub dir: String,
    /// Snapshot file name inside `dir`
    pub dbfilename: String,
    /// TCP port to listen on
    pub port: u16,
    pub role: ServerRole,
    /// Replication id for this node, a 40 character alphanumeric string
    pub repl_id: String,
}

impl ServerConfig {
    /// Parses configuration from command line arguments.
    ///
    /// Supported flags, all optional:
    ///
    /// * `--dir <path>` - snapshot directory (default `/tmp/redis-data`)
    /// * `--dbfilename <name>` - snapshot file name (default `dump.godb`)
    /// * `--port <port>` - port to listen on (default `6380`)
    /// * `--replicaof "<host> <port>"` - run as a replica of the given
    ///   primary; an empty value means primary mode
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, CliError> {
        let mut iter = args.into_iter().skip(1);
        let mut dir = "/tmp/redis-data".to_string();
        let mut dbfilename = "dump.godb".to_string();
        let mut port: u16 = 6380;
        let mut role = ServerRole::Primary;

        while let Some(flag) = iter.next() {
            match flag.as_str() {
                "--dir" => {
                    dir = iter.next().ok_or(CliError::InvalidCommandLineFlag)?;
                }
                "--dbfilename" => {
                    dbfilename = iter.next().ok_or(CliError::InvalidCommandLineFlag)?;
                }
                "--port" => {
                    let value = iter.next().ok_or(CliError::InvalidCommandLineFlag)?;
                    port = value
                        .parse::<u16>()
                        .map_err(|_| CliError::InvalidPortFlagValue)?;
                }
                "--replicaof" => {
                    let value = iter.next().ok_or(CliError::InvalidCommandLineFlag)?;
                    if !value.is_empty() {
                        role = parse_replica_of(&value)?;
                    }
                }
                _ => return Err(CliError::InvalidCommandLineFlag),
            }
        }

        Ok(ServerConfig {
            dir,
            dbfilename,
            port,
            role,
            repl_id: Alphanumeric.sample_string(&mut rand::rng(), 40),
        })
    }
}

/// Parses the `--replicaof` value, a space separated host and port. The
/// port must fit in 0..=65535; the host is validated by resolution at
/// startup.
fn parse_replica_of(value: &str) -> Result<ServerRole, CliError> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(CliError::InvalidReplicaOfValue);
    }

    let port = parts[1]
        .parse::<u16>()
        .map_err(|_| CliError::InvalidReplicaOfPort)?;

    Ok(ServerRole::Replica {
        host: parts[0].to_string(),
        port,
    })
}

/// Everything a connection handler needs, cheap to clone.
#[derive(Clone)]
pub struct ServerContext {
    pub config: Arc<ServerConfig>,
    pub store: SharedStore,
    pub snapshots: Arc<SnapshotManager>,
    pub replicas: Arc<ReplicaSet>,
}

pub struct Server {
    context: ServerContext,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let store = Store::shared();
        let snapshots = SnapshotManager::new(&config.dir, &config.dbfilename, Arc::clone(&store));
        Server {
            context: ServerContext {
                config: Arc::new(config),
                store,
                snapshots,
                replicas: Arc::new(ReplicaSet::new()),
            },
        }
    }

    /// Loads the snapshot, starts the sweeper, attaches to the primary
    /// when in replica mode, then accepts client connections forever.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.context
            .snapshots
            .load_on_start()
            .await
            .context("failed to load snapshot on startup")?;

        start_sweeper(Arc::clone(&self.context.store));

        if let ServerRole::Replica { host, port } = &self.context.config.role {
            let address = format!("{}:{}", host, port);

            let mut resolved = tokio::net::lookup_host(address.as_str())
                .await
                .with_context(|| format!("primary host '{}' does not resolve", host))?;
            if resolved.next().is_none() {
                anyhow::bail!("primary host '{}' does not resolve", host);
            }

            let mut stream = TcpStream::connect(address.as_str())
                .await
                .with_context(|| format!("failed to connect to primary at {}", address))?;
            let mut buffer = BytesMut::with_capacity(8192);
            let snapshot = replication::perform_handshake(
                &mut stream,
                &mut buffer,
                self.context.config.port,
            )
            .await
            .context("replication handshake failed")?;

            self.context
                .snapshots
                .load_from_bytes(&snapshot)
                .await
                .context("failed to load snapshot received from primary")?;
            info!(primary = %address, bytes = snapshot.len(), "attached to primary");

            let context = self.context.clone();
            tokio::spawn(async move {
                replication::handle_primary_connection(stream, buffer, context).await;
            });
        }

        let listener = TcpListener::bind(format!("127.0.0.1:{}", self.context.config.port))
            .await
            .with_context(|| format!("failed to bind port {}", self.context.config.port))?;
        info!(
            port = self.context.config.port,
            role = self.context.config.role.as_str(),
            "listening"
        );

        loop {
            match listener.accept().await {
                Ok((stream, address)) => {
                    let context = self.context.clone();
                    tokio::spawn(async move {
                        handle_client_connection(stream, address.to_string(), context).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}
