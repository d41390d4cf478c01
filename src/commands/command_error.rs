use thiserror::Error;

use crate::resp::RespValue;
use crate::store::StoreError;

/// Errors surfaced to clients as RESP error frames. The `Display` text is
/// the exact message that goes over the wire, minus the `ERR`,
/// `WRONGTYPE` or `READONLY` prefix added by [`CommandError::as_resp`].
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("wrong number of arguments for '{0}' command")]
    WrongArgCount(String),
    #[error("Syntax error")]
    Syntax,
    #[error("Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("value is not an integer or out of range")]
    NotInteger,
    #[error("increment or decrement would overflow")]
    Overflow,
    #[error("invalid expire time in 'set' command")]
    InvalidExpire,
    #[error("timeout is not a float or out of range")]
    TimeoutNotFloat,
    #[error("You can't write against a read only replica.")]
    ReadOnly,
    #[error("{0}")]
    Persistence(String),
    #[error("unknown command '{0}', with args beginning with: {1}")]
    UnknownCommand(String, String),
    #[error("invalid command frame")]
    InvalidFrame,
}

impl CommandError {
    /// Encodes this error as a RESP error frame.
    pub fn as_resp(&self) -> String {
        let frame = match self {
            CommandError::WrongType => format!("WRONGTYPE {}", self),
            CommandError::ReadOnly => format!("READONLY {}", self),
            _ => format!("ERR {}", self),
        };
        RespValue::Error(frame).encode()
    }
}

impl From<StoreError> for CommandError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::WrongType => CommandError::WrongType,
            StoreError::NotInteger => CommandError::NotInteger,
            StoreError::Overflow => CommandError::Overflow,
        }
    }
}
