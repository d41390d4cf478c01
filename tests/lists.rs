mod common;

use std::time::Duration;

use common::TestEnv;
use rudis::commands::CommandError;

#[tokio::test]
async fn test_push_range_pop_scenario() {
    let env = TestEnv::new("push-range-pop");

    env.exec_ok(&["LPUSH", "q", "a", "b", "c"], ":3\r\n").await;
    env.exec_ok(
        &["LRANGE", "q", "0", "-1"],
        "*3\r\n$1\r\nc\r\n$1\r\nb\r\n$1\r\na\r\n",
    )
    .await;
    env.exec_ok(&["RPOP", "q", "2"], "*2\r\n$1\r\na\r\n$1\r\nb\r\n").await;
    env.exec_ok(&["LLEN", "q"], ":1\r\n").await;
}

#[tokio::test]
async fn test_ltrim_and_lmove() {
    let env = TestEnv::new("trim-move");

    env.exec_ok(&["RPUSH", "q", "a", "b", "c", "d"], ":4\r\n").await;
    env.exec_ok(&["LTRIM", "q", "1", "2"], "+OK\r\n").await;
    env.exec_ok(&["LRANGE", "q", "0", "-1"], "*2\r\n$1\r\nb\r\n$1\r\nc\r\n").await;

    env.exec_ok(&["LMOVE", "q", "p", "LEFT", "RIGHT"], "$1\r\nb\r\n").await;
    env.exec_ok(&["LMOVE", "q", "p", "LEFT", "RIGHT"], "$1\r\nc\r\n").await;
    env.exec_ok(&["LMOVE", "q", "p", "LEFT", "RIGHT"], "$-1\r\n").await;
    env.exec_ok(&["LRANGE", "p", "0", "-1"], "*2\r\n$1\r\nb\r\n$1\r\nc\r\n").await;
    env.exec_ok(&["LLEN", "q"], ":0\r\n").await;
}

#[tokio::test]
async fn test_blpop_blocked_client_woken_by_push() {
    let env = TestEnv::new("blpop-wake");

    let waiter_context = env.context.clone();
    let waiter = tokio::spawn(async move {
        let env = TestEnv {
            context: waiter_context,
        };
        env.exec(&["BLPOP", "k", "0"]).await
    });

    tokio::time::sleep(Duration::from_millis(80)).await;

    env.exec_ok(&["RPUSH", "k", "hello"], ":1\r\n").await;

    assert_eq!(
        waiter.await.unwrap(),
        Ok("*2\r\n$1\r\nk\r\n$5\r\nhello\r\n".to_string())
    );

    // the push was consumed by the waiter
    env.exec_ok(&["LLEN", "k"], ":0\r\n").await;
}

#[tokio::test]
async fn test_blpop_single_push_leaves_other_client_blocked() {
    let env = TestEnv::new("blpop-still-blocked");

    let first_context = env.context.clone();
    let first = tokio::spawn(async move {
        let env = TestEnv {
            context: first_context,
        };
        env.exec(&["BLPOP", "k", "0"]).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second_context = env.context.clone();
    let second = tokio::spawn(async move {
        let env = TestEnv {
            context: second_context,
        };
        env.exec(&["BLPOP", "k", "0.4"]).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    env.exec_ok(&["RPUSH", "k", "hello"], ":1\r\n").await;

    assert_eq!(
        first.await.unwrap(),
        Ok("*2\r\n$1\r\nk\r\n$5\r\nhello\r\n".to_string())
    );
    // client C keeps blocking and eventually times out
    assert_eq!(second.await.unwrap(), Ok("$-1\r\n".to_string()));

    env.exec_ok(&["LLEN", "k"], ":0\r\n").await;
}

#[tokio::test]
async fn test_blpop_multiple_keys_first_producer_wins() {
    let env = TestEnv::new("blpop-multi-key");

    let waiter_context = env.context.clone();
    let waiter = tokio::spawn(async move {
        let env = TestEnv {
            context: waiter_context,
        };
        env.exec(&["BLPOP", "a", "b", "c", "1"]).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    env.exec_ok(&["RPUSH", "b", "x"], ":1\r\n").await;

    assert_eq!(
        waiter.await.unwrap(),
        Ok("*2\r\n$1\r\nb\r\n$1\r\nx\r\n".to_string())
    );
}

#[tokio::test]
async fn test_blmove_delivers_into_destination() {
    let env = TestEnv::new("blmove");

    let waiter_context = env.context.clone();
    let waiter = tokio::spawn(async move {
        let env = TestEnv {
            context: waiter_context,
        };
        env.exec(&["BLMOVE", "src", "dst", "LEFT", "RIGHT", "0"]).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    env.exec_ok(&["RPUSH", "src", "job"], ":1\r\n").await;

    assert_eq!(waiter.await.unwrap(), Ok("$3\r\njob\r\n".to_string()));
    env.exec_ok(&["LRANGE", "dst", "0", "-1"], "*1\r\n$3\r\njob\r\n").await;
}

#[tokio::test]
async fn test_blocking_timeout_validation() {
    let env = TestEnv::new("blocking-validation");

    env.exec_err(&["BLPOP", "k", "nan-ish"], CommandError::TimeoutNotFloat).await;
    env.exec_err(&["BLPOP", "k", "-2"], CommandError::TimeoutNotFloat).await;
    env.exec_err(&["BLPOP", "k"], CommandError::WrongArgCount("blpop".to_string())).await;
}
