use crate::commands::command_error::CommandError;
use crate::resp::RespValue;

pub fn echo(arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArgCount("echo".to_string()));
    }

    Ok(RespValue::BulkString(arguments[0].clone()).encode())
}
