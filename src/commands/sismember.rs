use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

pub async fn sismember(
    store: &SharedStore,
    arguments: Vec<String>,
) -> Result<String, CommandError> {
    if arguments.len() != 2 {
        return Err(CommandError::WrongArgCount("sismember".to_string()));
    }

    let mut guard = store.write().await;
    let present = guard.sismember(&arguments[0], &arguments[1])?;

    Ok(RespValue::Integer(present as i64).encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn test_sismember() {
        let store = Store::shared();
        store
            .write()
            .await
            .sadd("s", vec!["a".to_string()])
            .unwrap();

        assert_eq!(
            sismember(&store, vec!["s".to_string(), "a".to_string()])
                .await
                .unwrap(),
            ":1\r\n"
        );
        assert_eq!(
            sismember(&store, vec!["s".to_string(), "b".to_string()])
                .await
                .unwrap(),
            ":0\r\n"
        );
    }
}
