use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

pub async fn scard(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArgCount("scard".to_string()));
    }

    let mut guard = store.write().await;
    let cardinality = guard.scard(&arguments[0])?;

    Ok(RespValue::Integer(cardinality as i64).encode())
}
