#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use clap::Parser;
use metrix_server::config;

#[test]
fn deny_unknown_fields() {
    let bad = r#"
address: "localhost:9090"
store_intervall: 10 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("{}").expect("must parse");
    assert_eq!(cfg.address, "localhost:8080");
    assert_eq!(cfg.store_interval(), Some(Duration::from_secs(300)));
    assert_eq!(cfg.file_storage_path, "/tmp/metrics-db.json");
    assert!(cfg.restore);
    assert!(!cfg.uses_database());
}

#[test]
fn address_without_port_is_rejected() {
    let err = config::load_from_str("address: localhost").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");

    let err = config::load_from_str("address: \"localhost:http\"").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn zero_interval_disables_periodic_saves() {
    let cfg = config::load_from_str("store_interval_secs: 0").unwrap();
    assert_eq!(cfg.store_interval(), None);
}

#[test]
fn flags_override_file_values() {
    let mut cfg = config::load_from_str(
        r#"
address: "0.0.0.0:7000"
restore: true
key: "from-file"
"#,
    )
    .unwrap();

    let args = config::ServerArgs::try_parse_from([
        "metrix-server",
        "-a",
        "127.0.0.1:9000",
        "-i",
        "-1",
        "-r",
        "false",
        "-d",
        "postgres://localhost/metrics",
    ])
    .unwrap();
    args.apply(&mut cfg);

    assert_eq!(cfg.address, "127.0.0.1:9000");
    assert_eq!(cfg.store_interval(), None);
    assert!(!cfg.restore);
    assert!(cfg.uses_database());
    assert_eq!(cfg.key, "from-file");
}
