//! An in-memory key-value server speaking a Redis-compatible protocol.
//!
//! This crate provides a typed keyspace engine and the server around it:
//!
//! - String operations (GET, SET with expiry options, INCR family, APPEND, MSET/MGET)
//! - List operations (LPUSH, RPUSH, LPOP, RPOP, LRANGE, LTRIM, LMOVE)
//! - Blocking list operations (BLPOP, BRPOP, BLMOVE) with FIFO wake-up
//! - Set operations (SADD, SREM, SMEMBERS, SINTER, SUNION, SMOVE)
//! - Per-key expiry with lazy checks and a periodic background sweep
//! - Atomic snapshot persistence (SAVE, BGSAVE, LASTSAVE)
//! - Primary to replica streaming replication (REPLCONF, PSYNC)
//!
//! Clients talk RESP over TCP and each connection is served by its own
//! async task on top of Tokio.

pub mod commands;
pub mod connection;
pub mod replication;
pub mod resp;
pub mod server;
pub mod snapshot;
pub mod store;
pub mod sweeper;
