use crate::commands::blpop::parse_timeout;
use crate::commands::command_error::CommandError;
use crate::commands::lmove::parse_end;
use crate::resp::RespValue;
use crate::store::{block_move, SharedStore};

/// Handles `BLMOVE src dst LEFT|RIGHT LEFT|RIGHT timeout`: an LMOVE that
/// parks on an absent source until an element arrives or the timeout
/// elapses.
pub async fn blmove(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 5 {
        return Err(CommandError::WrongArgCount("blmove".to_string()));
    }

    let src_end = parse_end(&arguments[2])?;
    let dst_end = parse_end(&arguments[3])?;
    let timeout = parse_timeout(&arguments[4])?;

    match block_move(store, &arguments[0], &arguments[1], src_end, dst_end, timeout).await? {
        Some(element) => Ok(RespValue::BulkString(element).encode()),
        None => Ok(RespValue::NullBulkString.encode()),
    }
}
