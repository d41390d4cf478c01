use crate::commands::command_error::CommandError;
use crate::resp::RespValue;

/// REPLCONF acknowledges the known handshake subcommands with `+OK`.
pub fn replconf(arguments: Vec<String>) -> Result<String, CommandError> {
    if let Some(subcommand) = arguments.first() {
        let known = subcommand.eq_ignore_ascii_case("listening-port")
            || subcommand.eq_ignore_ascii_case("capa");
        if !known {
            return Err(CommandError::Syntax);
        }
    }

    Ok(RespValue::SimpleString("OK".to_string()).encode())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replconf() {
        assert_eq!(
            replconf(vec!["listening-port".to_string(), "6381".to_string()]).unwrap(),
            "+OK\r\n"
        );
        assert_eq!(
            replconf(vec!["capa".to_string(), "psync2".to_string()]).unwrap(),
            "+OK\r\n"
        );
        assert_eq!(replconf(vec![]).unwrap(), "+OK\r\n");
        assert_eq!(
            replconf(vec!["getack".to_string()]),
            Err(CommandError::Syntax)
        );
    }
}
