use jiff::Timestamp;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::{SetOptions, SetReply, SharedStore};

/// Parsed form of `SET key value [EX s | PX ms | KEEPTTL] [NX | XX] [GET]`.
pub struct SetArguments {
    key: String,
    value: String,
    options: SetOptions,
}

impl SetArguments {
    /// Parses the SET grammar. Options may appear in any order; at most
    /// one of EX, PX and KEEPTTL, at most one of NX and XX. Repetition,
    /// conflict or a missing operand is a syntax error; a non-positive
    /// expire operand is an invalid expire time.
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongArgCount("set".to_string()));
        }

        let mut options = SetOptions::default();
        let mut expiry_option: Option<String> = None;

        let mut index = 2;
        while index < arguments.len() {
            let option = arguments[index].to_uppercase();
            match option.as_str() {
                "EX" | "PX" => {
                    if expiry_option.is_some() {
                        return Err(CommandError::Syntax);
                    }
                    let Some(operand) = arguments.get(index + 1) else {
                        return Err(CommandError::Syntax);
                    };
                    let amount = operand
                        .parse::<i64>()
                        .map_err(|_| CommandError::InvalidExpire)?;
                    if amount <= 0 {
                        return Err(CommandError::InvalidExpire);
                    }
                    let millis = if option == "EX" {
                        amount.checked_mul(1000).ok_or(CommandError::InvalidExpire)?
                    } else {
                        amount
                    };
                    let deadline = Timestamp::now()
                        .as_millisecond()
                        .checked_add(millis)
                        .ok_or(CommandError::InvalidExpire)?;
                    options.expires_at = Some(
                        Timestamp::from_millisecond(deadline)
                            .map_err(|_| CommandError::InvalidExpire)?,
                    );
                    expiry_option = Some(option);
                    index += 2;
                }
                "KEEPTTL" => {
                    if expiry_option.is_some() {
                        return Err(CommandError::Syntax);
                    }
                    options.keep_ttl = true;
                    expiry_option = Some(option);
                    index += 1;
                }
                "NX" => {
                    if options.xx || options.nx {
                        return Err(CommandError::Syntax);
                    }
                    options.nx = true;
                    index += 1;
                }
                "XX" => {
                    if options.nx || options.xx {
                        return Err(CommandError::Syntax);
                    }
                    options.xx = true;
                    index += 1;
                }
                "GET" => {
                    options.get_previous = true;
                    index += 1;
                }
                _ => return Err(CommandError::Syntax),
            }
        }

        Ok(SetArguments {
            key: arguments[0].clone(),
            value: arguments[1].clone(),
            options,
        })
    }
}

/// Handles the SET command.
///
/// The reply is `+OK` on a plain install, nil when an NX or XX condition
/// is unmet, and the previous value (or nil) when GET was given.
pub async fn set(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    let SetArguments {
        key,
        value,
        options,
    } = SetArguments::parse(arguments)?;

    let mut guard = store.write().await;
    let reply = guard.set(&key, value, &options)?;

    Ok(match reply {
        SetReply::Ok => RespValue::SimpleString("OK".to_string()).encode(),
        SetReply::Nil => RespValue::Null.encode(),
        SetReply::Previous(Some(previous)) => RespValue::BulkString(previous).encode(),
        SetReply::Previous(None) => RespValue::Null.encode(),
    })
}
