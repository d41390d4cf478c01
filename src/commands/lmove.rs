use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::{PopEnd, SharedStore};

/// Parses a LEFT or RIGHT operand, case-insensitively.
pub(crate) fn parse_end(word: &str) -> Result<PopEnd, CommandError> {
    if word.eq_ignore_ascii_case("left") {
        Ok(PopEnd::Left)
    } else if word.eq_ignore_ascii_case("right") {
        Ok(PopEnd::Right)
    } else {
        Err(CommandError::Syntax)
    }
}

/// Handles `LMOVE src dst LEFT|RIGHT LEFT|RIGHT`, replying with the moved
/// element or nil when the source is absent.
pub async fn lmove(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 4 {
        return Err(CommandError::WrongArgCount("lmove".to_string()));
    }

    let src_end = parse_end(&arguments[2])?;
    let dst_end = parse_end(&arguments[3])?;

    let mut guard = store.write().await;
    match guard.move_element(&arguments[0], &arguments[1], src_end, dst_end)? {
        Some(element) => Ok(RespValue::BulkString(element).encode()),
        None => Ok(RespValue::NullBulkString.encode()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_lmove() {
        let store = Store::shared();
        store
            .write()
            .await
            .push("src", PopEnd::Right, vec!["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(
            lmove(&store, args(&["src", "dst", "RIGHT", "left"]))
                .await
                .unwrap(),
            "$1\r\nb\r\n"
        );
        assert_eq!(
            lmove(&store, args(&["missing", "dst", "LEFT", "LEFT"]))
                .await
                .unwrap(),
            "$-1\r\n"
        );
        assert_eq!(
            lmove(&store, args(&["src", "dst", "SIDEWAYS", "LEFT"])).await,
            Err(CommandError::Syntax)
        );
    }
}
