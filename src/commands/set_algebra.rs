use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::SharedStore;

/// SINTER over any number of keys. Every named key is type-checked even
/// when an absent key already empties the result.
pub async fn sinter(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.is_empty() {
        return Err(CommandError::WrongArgCount("sinter".to_string()));
    }

    let mut guard = store.write().await;
    let members = guard.sinter(&arguments)?;

    Ok(encode_members(members))
}

/// SUNION over any number of keys.
pub async fn sunion(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    if arguments.is_empty() {
        return Err(CommandError::WrongArgCount("sunion".to_string()));
    }

    let mut guard = store.write().await;
    let members = guard.sunion(&arguments)?;

    Ok(encode_members(members))
}

fn encode_members(members: Vec<String>) -> String {
    RespValue::Array(members.into_iter().map(RespValue::BulkString).collect()).encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_algebra() {
        let store = Store::shared();
        {
            let mut guard = store.write().await;
            guard.sadd("s", args(&["a", "b", "c"])).unwrap();
            guard.sadd("t", args(&["b", "c", "d"])).unwrap();
        }

        let inter = sinter(&store, args(&["s", "t"])).await.unwrap();
        assert!(inter.starts_with("*2\r\n"));
        assert!(inter.contains("$1\r\nb\r\n"));
        assert!(inter.contains("$1\r\nc\r\n"));

        let union = sunion(&store, args(&["s", "t"])).await.unwrap();
        assert!(union.starts_with("*4\r\n"));
    }

    #[tokio::test]
    async fn test_algebra_wrong_type() {
        let store = Store::shared();
        {
            let mut guard = store.write().await;
            guard.sadd("s", args(&["a"])).unwrap();
            guard
                .set("str", "x".to_string(), &crate::store::SetOptions::default())
                .unwrap();
        }

        assert_eq!(
            sinter(&store, args(&["s", "str"])).await,
            Err(CommandError::WrongType)
        );
        assert_eq!(
            sunion(&store, args(&["str"])).await,
            Err(CommandError::WrongType)
        );
    }
}
