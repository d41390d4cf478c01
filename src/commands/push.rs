use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::{PopEnd, SharedStore};

/// Handles the LPUSH command.
///
/// Pushes each element at the head in argument order, creating the list
/// on demand, then hands elements to any parked waiters before the lock
/// is released. Replies with the list length after the push.
pub async fn lpush(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    push(store, arguments, PopEnd::Left, "lpush").await
}

/// Handles the RPUSH command, the tail-end counterpart of [`lpush`].
pub async fn rpush(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    push(store, arguments, PopEnd::Right, "rpush").await
}

async fn push(
    store: &SharedStore,
    mut arguments: Vec<String>,
    end: PopEnd,
    command: &str,
) -> Result<String, CommandError> {
    if arguments.len() < 2 {
        return Err(CommandError::WrongArgCount(command.to_string()));
    }

    let key = arguments.remove(0);
    let mut guard = store.write().await;
    let length = guard.push(&key, end, arguments)?;

    Ok(RespValue::Integer(length as i64).encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_push_replies_with_length() {
        let store = Store::shared();

        assert_eq!(
            rpush(&store, args(&["q", "a", "b"])).await.unwrap(),
            ":2\r\n"
        );
        assert_eq!(lpush(&store, args(&["q", "c"])).await.unwrap(), ":3\r\n");

        let mut guard = store.write().await;
        assert_eq!(
            guard.list_range("q", 0, -1).unwrap(),
            vec!["c".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_push_validation() {
        let store = Store::shared();

        assert_eq!(
            lpush(&store, args(&["q"])).await,
            Err(CommandError::WrongArgCount("lpush".to_string()))
        );

        store
            .write()
            .await
            .set("s", "x".to_string(), &crate::store::SetOptions::default())
            .unwrap();
        assert_eq!(
            rpush(&store, args(&["s", "a"])).await,
            Err(CommandError::WrongType)
        );
    }
}
