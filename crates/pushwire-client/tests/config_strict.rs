#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use pushwire_client::config::{self, Environment};
use pushwire_client::Endpoint;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
endpoint:
  client_token: "c"
  access_token: "a"
timing:
  pong_wiat_ms: 1000 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
endpoint:
  client_token: "c"
  access_token: "a"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.endpoint.environment, Environment::Production);
    assert_eq!(cfg.endpoint.host(), "www.mews.li");
    assert_eq!(cfg.timing.pong_wait(), Duration::from_secs(60));
    assert_eq!(cfg.timing.ping_period(), Duration::from_secs(54));
    assert_eq!(cfg.timing.write_wait(), Duration::from_secs(10));
    assert_eq!(cfg.timing.close_grace(), Duration::from_secs(10));
}

#[test]
fn host_override_and_demo() {
    let ok = r#"
version: 1
endpoint:
  environment: demo
  host: "push.example.test"
  path: "/ws/custom"
  client_token: "c"
  access_token: "a"
"#;
    let cfg = config::load_from_str(ok).unwrap();
    let ep = Endpoint::from_config(&cfg.endpoint).unwrap();
    assert_eq!(ep.url().scheme(), "wss");
    assert_eq!(ep.url().host_str(), Some("push.example.test"));
    assert_eq!(ep.url().path(), "/ws/custom");
}

#[test]
fn ping_period_must_be_below_pong_wait() {
    let bad = r#"
version: 1
endpoint:
  client_token: "c"
  access_token: "a"
timing:
  pong_wait_ms: 5000
  ping_period_ms: 5000
"#;
    let err = config::load_from_str(bad).unwrap_err();
    assert!(err.to_string().contains("ping_period_ms"));
}

#[test]
fn empty_tokens_are_rejected() {
    let bad = r#"
version: 1
endpoint:
  client_token: ""
  access_token: "a"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn unsupported_version() {
    let bad = r#"
version: 2
endpoint:
  client_token: "c"
  access_token: "a"
"#;
    let err = config::load_from_str(bad).unwrap_err();
    assert_eq!(err.code().as_str(), "CONFIG");
}
