use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

pub async fn llen(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.len() != 1 {
        return Err(CommandError::WrongArgCount("llen".to_string()));
    }

    let guard = store.read().await;
    let length = guard.list_len(&arguments[0])?;

    Ok(RespValue::Integer(length as i64).encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PopEnd, Store};

    #[tokio::test]
    async fn test_llen() {
        let store = Store::shared();

        assert_eq!(llen(&store, vec!["q".to_string()]).await.unwrap(), ":0\r\n");

        store
            .write()
            .await
            .push("q", PopEnd::Right, vec!["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(llen(&store, vec!["q".to_string()]).await.unwrap(), ":2\r\n");
    }
}
