use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::{block_pop, PopEnd, SharedStore};

/// Handles the BLPOP command.
///
/// `BLPOP key [key ...] timeout` pops from the head of the first
/// non-empty list, or parks until a push arrives on any of the keys. The
/// reply is a two-element array of the key and the element, or nil on
/// timeout. A timeout of `0` blocks indefinitely.
pub async fn blpop(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    blocking_pop(store, arguments, PopEnd::Left, "blpop").await
}

/// Handles the BRPOP command, the tail-end counterpart of [`blpop`].
pub async fn brpop(store: &SharedStore, arguments: Vec<String>) -> Result<String, CommandError> {
    blocking_pop(store, arguments, PopEnd::Right, "brpop").await
}

async fn blocking_pop(
    store: &SharedStore,
    mut arguments: Vec<String>,
    end: PopEnd,
    command: &str,
) -> Result<String, CommandError> {
    let Some(timeout_word) = arguments.pop() else {
        return Err(CommandError::WrongArgCount(command.to_string()));
    };
    if arguments.is_empty() {
        return Err(CommandError::WrongArgCount(command.to_string()));
    }

    let timeout = parse_timeout(&timeout_word)?;
    let keys = arguments;

    match block_pop(store, &keys, end, timeout).await? {
        Some(delivery) => Ok(RespValue::encode_array_from_strings(&[
            delivery.key,
            delivery.element,
        ])),
        None => Ok(RespValue::NullBulkString.encode()),
    }
}

/// Upper bound on the timeout operand, matching what a one-shot timer
/// can actually represent.
const MAX_TIMEOUT_SECS: f64 = 1e9;

/// Parses the timeout operand: a finite, non-negative number of seconds.
pub(crate) fn parse_timeout(word: &str) -> Result<f64, CommandError> {
    let timeout = word
        .parse::<f64>()
        .map_err(|_| CommandError::TimeoutNotFloat)?;
    if !timeout.is_finite() || timeout < 0.0 || timeout > MAX_TIMEOUT_SECS {
        return Err(CommandError::TimeoutNotFloat);
    }
    Ok(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use std::sync::Arc;
    use std::time::Duration;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_blpop_immediate() {
        let store = Store::shared();
        store
            .write()
            .await
            .push("q", PopEnd::Right, vec!["a".to_string()])
            .unwrap();

        assert_eq!(
            blpop(&store, args(&["q", "0"])).await.unwrap(),
            "*2\r\n$1\r\nq\r\n$1\r\na\r\n"
        );
    }

    #[tokio::test]
    async fn test_blpop_timeout_is_nil() {
        let store = Store::shared();

        assert_eq!(
            blpop(&store, args(&["q", "0.05"])).await.unwrap(),
            "$-1\r\n"
        );
    }

    #[tokio::test]
    async fn test_blpop_woken_by_push() {
        let store = Store::shared();

        let waiter_store = Arc::clone(&store);
        let waiter =
            tokio::spawn(async move { blpop(&waiter_store, args(&["q", "0"])).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        store
            .write()
            .await
            .push("q", PopEnd::Right, vec!["hello".to_string()])
            .unwrap();

        assert_eq!(
            waiter.await.unwrap().unwrap(),
            "*2\r\n$1\r\nq\r\n$5\r\nhello\r\n"
        );
    }

    #[tokio::test]
    async fn test_brpop_pops_tail() {
        let store = Store::shared();
        store
            .write()
            .await
            .push("q", PopEnd::Right, vec!["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(
            brpop(&store, args(&["q", "0"])).await.unwrap(),
            "*2\r\n$1\r\nq\r\n$1\r\nb\r\n"
        );
    }

    #[tokio::test]
    async fn test_timeout_validation() {
        let store = Store::shared();

        assert_eq!(
            blpop(&store, args(&["q", "soon"])).await,
            Err(CommandError::TimeoutNotFloat)
        );
        assert_eq!(
            blpop(&store, args(&["q", "-1"])).await,
            Err(CommandError::TimeoutNotFloat)
        );
        assert_eq!(
            blpop(&store, args(&["q"])).await,
            Err(CommandError::WrongArgCount("blpop".to_string()))
        );
    }
}
