//! Shared helpers for the integration tests.

use std::sync::Arc;

use rudis::commands::{CommandError, CommandHandler, CommandOutcome};
use rudis::replication::ReplicaSet;
use rudis::server::{ServerConfig, ServerContext, ServerRole};
use rudis::snapshot::SnapshotManager;
use rudis::store::Store;

/// A self-contained server context backed by a per-test snapshot
/// directory under the system temp dir.
pub struct TestEnv {
    pub context: ServerContext,
}

impl TestEnv {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("rudis-it-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        Self::with_dir(&dir.to_string_lossy())
    }

    /// Builds an environment over an existing snapshot directory, used to
    /// simulate a process restart against the same file.
    pub fn with_dir(dir: &str) -> Self {
        let config = ServerConfig {
            dir: dir.to_string(),
            dbfilename: "dump.godb".to_string(),
            port: 6380,
            role: ServerRole::Primary,
            repl_id: "f".repeat(40),
        };
        let store = Store::shared();
        let snapshots = SnapshotManager::new(&config.dir, &config.dbfilename, Arc::clone(&store));

        TestEnv {
            context: ServerContext {
                config: Arc::new(config),
                store,
                snapshots,
                replicas: Arc::new(ReplicaSet::new()),
            },
        }
    }

    pub async fn load_snapshot(&self) {
        self.context.snapshots.load_on_start().await.unwrap();
    }

    /// Runs one command through the dispatcher and returns its reply.
    pub async fn exec(&self, parts: &[&str]) -> Result<String, CommandError> {
        let frame = rudis::resp::RespValue::command_frame(
            parts[0],
            &parts[1..].iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        );
        let command = CommandHandler::from_frame(frame)?;
        match command.execute(&self.context).await? {
            CommandOutcome::Reply(reply) => Ok(reply),
            CommandOutcome::AttachReplica(_) => panic!("unexpected replica attach"),
        }
    }

    /// Runs one command and asserts its exact RESP reply.
    pub async fn exec_ok(&self, parts: &[&str], expected: &str) {
        let reply = self.exec(parts).await;
        assert_eq!(reply, Ok(expected.to_string()), "command: {:?}", parts);
    }

    /// Runs one command and asserts it fails with the given error.
    pub async fn exec_err(&self, parts: &[&str], expected: CommandError) {
        let reply = self.exec(parts).await;
        assert_eq!(reply, Err(expected), "command: {:?}", parts);
    }
}
