use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// DEL removes any kind of key and replies with how many existed.
pub async fn del(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.is_empty() {
        return Err(CommandError::WrongArgCount("del".to_string()));
    }

    let mut guard = store.write().await;
    Ok(RespValue::Integer(guard.delete(&arguments) as i64).encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SetOptions, Store};

    #[tokio::test]
    async fn test_del() {
        let store = Store::shared();
        {
            let mut guard = store.write().await;
            guard.set("a", "1".to_string(), &SetOptions::default()).unwrap();
            guard.sadd("s", vec!["x".to_string()]).unwrap();
        }

        assert_eq!(
            del(&store, vec!["a".to_string(), "s".to_string(), "nope".to_string()])
                .await
                .unwrap(),
            ":2\r\n"
        );
        assert_eq!(
            del(&store, vec![]).await,
            Err(CommandError::WrongArgCount("del".to_string()))
        );
    }
}
