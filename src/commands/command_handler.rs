use crate::commands::{
    append::append,
    blmove::blmove,
    blpop::{blpop, brpop},
    command_error::CommandError,
    config_get::config,
    del::del,
    echo::echo,
    exists::exists,
    get::get,
    incr::{decr, decr_by, incr, incr_by},
    info::info,
    keys::keys,
    llen::llen,
    lmove::lmove,
    lrange::lrange,
    ltrim::ltrim,
    mget::mget,
    mset::mset,
    persistence::{bgsave, lastsave, save},
    ping::ping,
    pop::{lpop, rpop},
    psync::psync,
    push::{lpush, rpush},
    replconf::replconf,
    sadd::sadd,
    scard::scard,
    set::set,
    set_algebra::{sinter, sunion},
    sismember::sismember,
    smembers::smembers,
    smove::smove,
    srem::srem,
    ttl::ttl,
};
use crate::resp::RespValue;
use crate::server::ServerContext;

/// Commands that mutate the keyspace and are therefore forwarded to
/// replicas. The blocking variants are deliberately absent: their effect
/// on the keyspace is produced by the push that satisfied them.
const WRITE_COMMANDS: &[&str] = &[
    "SET", "DEL", "INCR", "DECR", "INCRBY", "DECRBY", "APPEND", "MSET", "LPUSH", "RPUSH", "LPOP",
    "RPOP", "LTRIM", "LMOVE", "SADD", "SREM", "SMOVE",
];

/// Commands a replica still serves to its own clients. Everything else is
/// rejected with READONLY while in replica mode.
const READ_ONLY_COMMANDS: &[&str] = &[
    "PING", "ECHO", "GET", "TTL", "CONFIG", "KEYS", "LASTSAVE", "INFO",
];

/// What the connection loop should do after a command ran.
#[derive(Debug)]
pub enum CommandOutcome {
    /// Write this RESP reply back to the client.
    Reply(String),
    /// Send the snapshot as a length-prefixed bulk payload and register
    /// the connection as a replica.
    AttachReplica(Vec<u8>),
}

/// A parsed command: the uppercased command word plus its literal
/// arguments.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub arguments: Vec<String>,
}

impl CommandHandler {
    /// Builds a command from a decoded frame, which must be an array of
    /// bulk strings with the command word first.
    pub fn from_frame(frame: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = frame else {
            return Err(CommandError::InvalidFrame);
        };

        let mut strings = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                RespValue::BulkString(s) => strings.push(s),
                _ => return Err(CommandError::InvalidFrame),
            }
        }

        let Some((name, arguments)) = strings.split_first() else {
            return Err(CommandError::InvalidFrame);
        };

        Ok(CommandHandler {
            name: name.to_uppercase(),
            arguments: arguments.to_vec(),
        })
    }

    pub fn is_write_command(&self) -> bool {
        WRITE_COMMANDS.contains(&self.name.as_str())
    }

    pub fn is_read_only_command(&self) -> bool {
        READ_ONLY_COMMANDS.contains(&self.name.as_str())
    }

    /// Re-frames this command for the replication stream.
    pub fn replication_frame(&self) -> String {
        RespValue::command_frame(&self.name, &self.arguments).encode()
    }

    /// Dispatches to the matching handler.
    pub async fn execute(&self, context: &ServerContext) -> Result<CommandOutcome, CommandError> {
        let args = self.arguments.clone();
        let store = &context.store;

        let reply = match self.name.as_str() {
            "PING" => ping(args)?,
            "ECHO" => echo(args)?,
            "GET" => get(store, args).await?,
            "SET" => set(store, args).await?,
            "DEL" => del(store, args).await?,
            "EXISTS" => exists(store, args).await?,
            "TTL" => ttl(store, args).await?,
            "INCR" => incr(store, args).await?,
            "DECR" => decr(store, args).await?,
            "INCRBY" => incr_by(store, args).await?,
            "DECRBY" => decr_by(store, args).await?,
            "APPEND" => append(store, args).await?,
            "MSET" => mset(store, args).await?,
            "MGET" => mget(store, args).await?,
            "KEYS" => keys(store, args).await?,
            "CONFIG" => config(&context.config, args)?,
            "INFO" => info(&context.config, args)?,
            "SAVE" => save(&context.snapshots, args).await?,
            "BGSAVE" => bgsave(&context.snapshots, args).await?,
            "LASTSAVE" => lastsave(&context.snapshots, args).await?,
            "LPUSH" => lpush(store, args).await?,
            "RPUSH" => rpush(store, args).await?,
            "LPOP" => lpop(store, args).await?,
            "RPOP" => rpop(store, args).await?,
            "LLEN" => llen(store, args).await?,
            "LRANGE" => lrange(store, args).await?,
            "LTRIM" => ltrim(store, args).await?,
            "LMOVE" => lmove(store, args).await?,
            "BLPOP" => blpop(store, args).await?,
            "BRPOP" => brpop(store, args).await?,
            "BLMOVE" => blmove(store, args).await?,
            "SADD" => sadd(store, args).await?,
            "SREM" => srem(store, args).await?,
            "SISMEMBER" => sismember(store, args).await?,
            "SCARD" => scard(store, args).await?,
            "SMEMBERS" => smembers(store, args).await?,
            "SINTER" => sinter(store, args).await?,
            "SUNION" => sunion(store, args).await?,
            "SMOVE" => smove(store, args).await?,
            "REPLCONF" => replconf(args)?,
            "PSYNC" => {
                let snapshot = psync(context, args).await?;
                return Ok(CommandOutcome::AttachReplica(snapshot));
            }
            _ => {
                let joined = self
                    .arguments
                    .iter()
                    .map(|argument| format!("'{}'", argument))
                    .collect::<Vec<String>>()
                    .join(", ");
                return Err(CommandError::UnknownCommand(
                    self.name.to_lowercase(),
                    joined,
                ));
            }
        };

        Ok(CommandOutcome::Reply(reply))
    }
}
