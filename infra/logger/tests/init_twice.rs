use herald_logger::{LevelFilter, Logger, LoggerError, LoggerSettings};

#[test]
fn second_global_install_is_rejected() {
    let settings = LoggerSettings { level: "warn".to_owned(), ..LoggerSettings::default() };
    let _logger = Logger::from_settings("herald-first", &settings).expect("first install");

    let err = Logger::builder()
        .name("herald-second")
        .level(LevelFilter::DEBUG)
        .init()
        .expect_err("a global subscriber is already set");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "got {err:?}");
}
