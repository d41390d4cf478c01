use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// SREM replies with the number of members that were present and removed.
pub async fn srem(store: &SharedStore, mut arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() < 2 {
        return Err(CommandError::WrongArgCount("srem".to_string()));
    }

    let key = arguments.remove(0);
    let mut guard = store.write().await;
    let removed = guard.srem(&key, &arguments)?;

    Ok(RespValue::Integer(removed as i64).encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_srem() {
        let store = Store::shared();
        store
            .write()
            .await
            .sadd("s", args(&["a", "b"]))
            .unwrap();

        assert_eq!(srem(&store, args(&["s", "a", "zzz"])).await.unwrap(), ":1\r\n");
        assert_eq!(srem(&store, args(&["missing", "a"])).await.unwrap(), ":0\r\n");
    }
}
