mod common;

use std::time::Duration;

use common::TestEnv;
use rudis::commands::CommandError;

#[tokio::test]
async fn test_set_with_expiry_lifecycle() {
    let env = TestEnv::new("expiry-lifecycle");

    env.exec_ok(&["SET", "foo", "bar", "PX", "120"], "+OK\r\n").await;

    let ttl = env.exec(&["TTL", "foo"]).await.unwrap();
    let seconds: i64 = ttl
        .trim_start_matches(':')
        .trim_end_matches("\r\n")
        .parse()
        .unwrap();
    assert!((0..=1).contains(&seconds));

    env.exec_ok(&["GET", "foo"], "$3\r\nbar\r\n").await;

    tokio::time::sleep(Duration::from_millis(150)).await;

    env.exec_ok(&["GET", "foo"], "_\r\n").await;
    env.exec_ok(&["TTL", "foo"], ":-2\r\n").await;
    env.exec_ok(&["EXISTS", "foo"], ":0\r\n").await;
}

#[tokio::test]
async fn test_set_option_combinations() {
    let env = TestEnv::new("set-options");

    env.exec_ok(&["SET", "k", "v1", "NX"], "+OK\r\n").await;
    env.exec_ok(&["SET", "k", "v2", "NX"], "_\r\n").await;
    env.exec_ok(&["SET", "k", "v2", "XX", "GET"], "$2\r\nv1\r\n").await;
    env.exec_ok(&["GET", "k"], "$2\r\nv2\r\n").await;

    env.exec_err(&["SET", "k", "v", "EX", "10", "KEEPTTL"], CommandError::Syntax)
        .await;
    env.exec_err(&["SET", "k", "v", "EX", "0"], CommandError::InvalidExpire)
        .await;
}

#[tokio::test]
async fn test_increment_overflow_scenario() {
    let env = TestEnv::new("incr-overflow");

    env.exec_ok(&["SET", "n", "9223372036854775806"], "+OK\r\n").await;
    env.exec_ok(&["INCRBY", "n", "1"], ":9223372036854775807\r\n").await;
    env.exec_err(&["INCRBY", "n", "1"], CommandError::Overflow).await;
    env.exec_ok(&["GET", "n"], "$19\r\n9223372036854775807\r\n").await;

    env.exec_ok(&["SET", "text", "abc"], "+OK\r\n").await;
    env.exec_err(&["INCR", "text"], CommandError::NotInteger).await;
}

#[tokio::test]
async fn test_batch_operations() {
    let env = TestEnv::new("batch");

    env.exec_ok(&["MSET", "a", "1", "b", "2"], "+OK\r\n").await;
    env.exec_ok(
        &["MGET", "a", "missing", "b"],
        "*3\r\n$1\r\n1\r\n_\r\n$1\r\n2\r\n",
    )
    .await;

    env.exec_ok(&["APPEND", "a", "23"], ":3\r\n").await;
    env.exec_ok(&["GET", "a"], "$3\r\n123\r\n").await;

    env.exec_ok(&["DEL", "a", "b", "missing"], ":2\r\n").await;
    env.exec_ok(&["EXISTS", "a", "b"], ":0\r\n").await;
}

#[tokio::test]
async fn test_keys_glob_patterns() {
    let env = TestEnv::new("keys-glob");

    for key in ["hello", "hallo", "hillo", "world"] {
        env.exec_ok(&["SET", key, "x"], "+OK\r\n").await;
    }

    let reply = env.exec(&["KEYS", "h[ae]llo"]).await.unwrap();
    assert!(reply.starts_with("*2\r\n"));
    assert!(reply.contains("hello") && reply.contains("hallo"));
    assert!(!reply.contains("hillo"));

    let reply = env.exec(&["KEYS", "*"]).await.unwrap();
    assert!(reply.starts_with("*4\r\n"));
}

#[tokio::test]
async fn test_type_tags_are_exclusive() {
    let env = TestEnv::new("type-tags");

    env.exec_ok(&["SET", "s", "x"], "+OK\r\n").await;
    env.exec_err(&["LPUSH", "s", "a"], CommandError::WrongType).await;
    env.exec_err(&["SADD", "s", "a"], CommandError::WrongType).await;

    env.exec_ok(&["LPUSH", "q", "a"], ":1\r\n").await;
    env.exec_err(&["GET", "q"], CommandError::WrongType).await;
    env.exec_err(&["INCR", "q"], CommandError::WrongType).await;

    // deleting the key frees the name for another kind
    env.exec_ok(&["DEL", "q"], ":1\r\n").await;
    env.exec_ok(&["SADD", "q", "m"], ":1\r\n").await;
}

#[tokio::test]
async fn test_unknown_command_report() {
    let env = TestEnv::new("unknown");

    env.exec_err(
        &["FROB", "a", "b"],
        CommandError::UnknownCommand("frob".to_string(), "'a', 'b'".to_string()),
    )
    .await;
}
