use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// MSET installs every pair under one lock acquisition.
pub async fn mset(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.is_empty() || arguments.len() % 2 != 0 {
        return Err(CommandError::WrongArgCount("mset".to_string()));
    }

    let pairs = arguments
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();

    let mut guard = store.write().await;
    guard.mset(pairs);

    Ok(RespValue::SimpleString("OK".to_string()).encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mset() {
        let store = Store::shared();

        assert_eq!(
            mset(&store, args(&["a", "1", "b", "2"])).await.unwrap(),
            "+OK\r\n"
        );
        let mut guard = store.write().await;
        assert_eq!(guard.get("b").unwrap(), Some(("2".to_string(), None)));
    }

    #[tokio::test]
    async fn test_mset_odd_arguments() {
        let store = Store::shared();
        assert_eq!(
            mset(&store, args(&["a", "1", "b"])).await,
            Err(CommandError::WrongArgCount("mset".to_string()))
        );
    }
}
