//! Command parsing and handlers, one module per command or command
//! family. Each handler validates its own arguments and returns an
//! encoded RESP reply.

pub mod append;
pub mod blmove;
pub mod blpop;
pub mod command_error;
pub mod command_handler;
pub mod config_get;
pub mod del;
pub mod echo;
pub mod exists;
pub mod get;
pub mod incr;
pub mod info;
pub mod keys;
pub mod llen;
pub mod lmove;
pub mod lrange;
pub mod ltrim;
pub mod mget;
pub mod mset;
pub mod persistence;
pub mod ping;
pub mod pop;
pub mod psync;
pub mod push;
pub mod replconf;
pub mod sadd;
pub mod scard;
pub mod set;
pub mod set_algebra;
pub mod sismember;
pub mod smembers;
pub mod smove;
pub mod srem;
pub mod ttl;

pub use command_error::CommandError;
pub use command_handler::{CommandHandler, CommandOutcome};
