use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// LTRIM keeps only the given inclusive sub-range, deleting the key when
/// the range selects nothing.
pub async fn ltrim(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 3 {
        return Err(CommandError::WrongArgCount("ltrim".to_string()));
    }

    let start = arguments[1]
        .parse::<i64>()
        .map_err(|_| CommandError::NotInteger)?;
    let end = arguments[2]
        .parse::<i64>()
        .map_err(|_| CommandError::NotInteger)?;

    let mut guard = store.write().await;
    guard.list_trim(&arguments[0], start, end)?;

    Ok(RespValue::SimpleString("OK".to_string()).encode())
}
