use std::sync::Arc;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::server::ServerConfig;

/// INFO replies a bulk string of `key:value` lines grouped into sections.
/// Only the replication section exists; asking for unknown sections
/// yields an empty report.
pub fn info(config: &Arc<ServerConfig>, arguments: Vec<String>) -> Result<String, CommandError> {
    let wants_replication = arguments.is_empty()
        || arguments
            .iter()
            .any(|section| section.eq_ignore_ascii_case("replication"));

    let mut report = String::new();
    if wants_replication {
        report.push_str("# Replication\r\n");
        report.push_str(&format!("role:{}\r\n", config.role.as_str()));
        report.push_str(&format!("master_replid:{}\r\n", config.repl_id));
        report.push_str("master_repl_offset:0\r\n");
    }

    Ok(RespValue::BulkString(report).encode())
}
