use super::error::HubError;
use super::logging;

#[test]
fn logging_init_accepts_levels() {
    // Should not panic
    logging::init("info");
    logging::init("debug");
    logging::init("warn");
}

#[test]
fn parse_level_falls_back_to_info() {
    assert_eq!(logging::parse_level("WARNING"), tracing::Level::WARN);
    assert_eq!(logging::parse_level("trace"), tracing::Level::TRACE);
    assert_eq!(logging::parse_level("loud"), tracing::Level::INFO);
}

#[test]
fn errors_name_the_connection() {
    let err = HubError::NotFound {
        client_id: "abc".to_string(),
    };
    assert_eq!(err.to_string(), "connection abc not found");

    let err = HubError::Closed {
        client_id: "abc".to_string(),
    };
    assert_eq!(err.to_string(), "connection abc is closed");
}
