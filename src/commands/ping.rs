use crate::commands::command_error::CommandError;
use crate::resp::RespValue;

/// PING replies `+PONG`, or echoes its single argument as a bulk string.
pub fn ping(arguments: Vec<String>) -> Result<String, CommandError> {
    match arguments.len() {
        0 => Ok(RespValue::SimpleString("PONG".to_string()).encode()),
        1 => Ok(RespValue::BulkString(arguments[0].clone()).encode()),
        _ => Err(CommandError::WrongArgCount("echo".to_string())),
    }
}
