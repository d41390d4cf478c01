use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// Handles INCR, DECR, INCRBY and DECRBY.
///
/// All four add a signed delta to the decimal integer stored at the key,
/// creating the key with the delta when absent and preserving any
/// existing expiry. A non-numeric stored value is rejected, and an
/// addition that would leave the 64-bit range fails with the overflow
/// error while leaving the stored value untouched.
pub async fn incr(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    apply_delta(store, arguments, "incr", 1).await
}

pub async fn decr(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    apply_delta(store, arguments, "decr", -1).await
}

pub async fn incr_by(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    let (key_args, delta) = parse_by_arguments(arguments, "incrby")?;
    apply_delta(store, key_args, "incrby", delta).await
}

pub async fn decr_by(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    let (key_args, delta) = parse_by_arguments(arguments, "decrby")?;
    let delta = delta.checked_neg().ok_or(CommandError::Overflow)?;
    apply_delta(store, key_args, "decrby", delta).await
}

fn parse_by_arguments(
    arguments: Vec<String>,
    command: &str,
) -> Result<(Vec<String>, i64), CommandError> {
    if arguments.len() != 2 {
        return Err(CommandError::WrongArgCount(command.to_string()));
    }

    let delta = arguments[1]
        .parse::<i64>()
        .map_err(|_| CommandError::NotInteger)?;

    Ok((vec![arguments[0].clone()], delta))
}

async fn apply_delta(
    store: &SharedStore,
    arguments: Vec<String>,
    command: &str,
    delta: i64,
) -> Result<String, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArgCount(command.to_string()));
    }

    let mut guard = store.write().await;
    let value = guard.increment(&arguments[0], delta)?;

    Ok(RespValue::Integer(value).encode())
}
