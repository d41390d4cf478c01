use std::sync::Arc;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::server::ServerConfig;

/// CONFIG GET for the two persistence parameters. Unknown parameters and
/// unsupported subcommands reply with an empty array.
pub fn config(config: &Arc<ServerConfig>, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.is_empty() {
        return Err(CommandError::WrongArgCount("config".to_string()));
    }
    if arguments.len() == 1 && arguments[0].eq_ignore_ascii_case("get") {
        return Err(CommandError::WrongArgCount("config|get".to_string()));
    }

    if !arguments[0].eq_ignore_ascii_case("get") {
        return Ok(RespValue::Array(Vec::new()).encode());
    }

    let reply = match arguments[1].as_str() {
        "dir" => RespValue::Array(vec![
            RespValue::BulkString("dir".to_string()),
            RespValue::BulkString(config.dir.clone()),
        ]),
        "dbfilename" => RespValue::Array(vec![
            RespValue::BulkString("dbfilename".to_string()),
            RespValue::BulkString(config.dbfilename.clone()),
        ]),
        _ => RespValue::Array(Vec::new()),
    };

    Ok(reply.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerRole;

    fn test_config() -> Arc<ServerConfig> {
        Arc::new(ServerConfig {
            dir: "/tmp/redis-data".to_string(),
            dbfilename: "dump.godb".to_string(),
            port: 6380,
            role: ServerRole::Primary,
            repl_id: "r".repeat(40),
        })
    }

    #[test]
    fn test_config_get() {
        let server_config = test_config();

        assert_eq!(
            config(&server_config, vec!["GET".to_string(), "dir".to_string()]).unwrap(),
            "*2\r\n$3\r\ndir\r\n$15\r\n/tmp/redis-data\r\n"
        );
        assert_eq!(
            config(
                &server_config,
                vec!["GET".to_string(), "dbfilename".to_string()]
            )
            .unwrap(),
            "*2\r\n$10\r\ndbfilename\r\n$9\r\ndump.godb\r\n"
        );
        assert_eq!(
            config(
                &server_config,
                vec!["GET".to_string(), "maxmemory".to_string()]
            )
            .unwrap(),
            "*0\r\n"
        );
        assert_eq!(
            config(&server_config, vec!["SET".to_string(), "dir".to_string()]).unwrap(),
            "*0\r\n"
        );
        assert_eq!(
            config(&server_config, vec![]),
            Err(CommandError::WrongArgCount("config".to_string()))
        );
        assert_eq!(
            config(&server_config, vec!["GET".to_string()]),
            Err(CommandError::WrongArgCount("config|get".to_string()))
        );
    }
}
