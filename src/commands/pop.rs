use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::{PopEnd, SharedStore};

/// Handles the LPOP command, with an optional positive count.
pub async fn lpop(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    pop(store, arguments, PopEnd::Left, "lpop").await
}

/// Handles the RPOP command, with an optional positive count.
pub async fn rpop(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    pop(store, arguments, PopEnd::Right, "rpop").await
}

async fn pop(
    store: &SharedStore,
    arguments: Vec<String>,
    end: PopEnd,
    command: &str,
) -> Result<String, CommandError> {
    match arguments.len() {
        1 => {
            let mut guard = store.write().await;
            match guard.pop(&arguments[0], end)? {
                Some(element) => Ok(RespValue::BulkString(element).encode()),
                None => Ok(RespValue::NullBulkString.encode()),
            }
        }
        2 => {
            let count = arguments[1]
                .parse::<i64>()
                .map_err(|_| CommandError::NotInteger)?;
            if count <= 0 {
                return Err(CommandError::NotInteger);
            }

            let mut guard = store.write().await;
            match guard.pop_count(&arguments[0], end, count as usize)? {
                Some(elements) => Ok(RespValue::Array(
                    elements.into_iter().map(RespValue::BulkString).collect(),
                )
                .encode()),
                None => Ok(RespValue::NullBulkString.encode()),
            }
        }
        _ => Err(CommandError::WrongArgCount(command.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    async fn seed(store: &SharedStore, items: &[&str]) {
        store
            .write()
            .await
            .push(
                "q",
                PopEnd::Right,
                items.iter().map(|s| s.to_string()).collect(),
            )
            .unwrap();
    }

    #[tokio::test]
    async fn test_single_pop() {
        let store = Store::shared();
        seed(&store, &["a", "b"]).await;

        assert_eq!(lpop(&store, args(&["q"])).await.unwrap(), "$1\r\na\r\n");
        assert_eq!(rpop(&store, args(&["q"])).await.unwrap(), "$1\r\nb\r\n");
        assert_eq!(lpop(&store, args(&["q"])).await.unwrap(), "$-1\r\n");
    }

    #[tokio::test]
    async fn test_counted_pop() {
        let store = Store::shared();
        seed(&store, &["a", "b", "c"]).await;

        assert_eq!(
            rpop(&store, args(&["q", "2"])).await.unwrap(),
            "*2\r\n$1\r\nc\r\n$1\r\nb\r\n"
        );
        // more than the remaining length drains the list
        assert_eq!(
            lpop(&store, args(&["q", "10"])).await.unwrap(),
            "*1\r\n$1\r\na\r\n"
        );
        assert_eq!(
            lpop(&store, args(&["q", "2"])).await.unwrap(),
            "$-1\r\n"
        );
    }

    #[tokio::test]
    async fn test_count_must_be_positive() {
        let store = Store::shared();

        assert_eq!(
            lpop(&store, args(&["q", "0"])).await,
            Err(CommandError::NotInteger)
        );
        assert_eq!(
            lpop(&store, args(&["q", "-1"])).await,
            Err(CommandError::NotInteger)
        );
        assert_eq!(
            lpop(&store, args(&["q", "few"])).await,
            Err(CommandError::NotInteger)
        );
    }
}
