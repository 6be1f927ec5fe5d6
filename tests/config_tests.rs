use std::time::Duration;

use battleship_link::{parse_level, parse_port, validate_port, ConfigError, SessionConfig, TURN_TICKS};
use log::LevelFilter;

#[test]
fn test_port_bounds() {
    assert_eq!(validate_port(10000), Ok(10000));
    assert_eq!(validate_port(65535), Ok(65535));
    assert_eq!(validate_port(9999), Err(ConfigError::PortOutOfRange(9999)));
    assert_eq!(validate_port(65536), Err(ConfigError::PortOutOfRange(65536)));
}

#[test]
fn test_parse_port_text() {
    assert_eq!(parse_port(" 12345 "), Ok(12345));
    assert_eq!(parse_port("abc"), Err(ConfigError::InvalidPort("abc".into())));
    assert_eq!(parse_port("80"), Err(ConfigError::PortOutOfRange(80)));
}

#[test]
fn test_session_config_builders() {
    assert_eq!(SessionConfig::new("  ").unwrap_err(), ConfigError::EmptyName);
    let config = SessionConfig::new(" Ada ")
        .unwrap()
        .with_tick(Duration::from_millis(5))
        .with_turn_ticks(0)
        .with_seed(Some(3));
    assert_eq!(config.name, "Ada");
    assert_eq!(config.tick, Duration::from_millis(5));
    assert_eq!(config.turn_ticks, 1);
    assert_eq!(config.seed, Some(3));
    assert_eq!(SessionConfig::default().turn_ticks, TURN_TICKS);
}

#[test]
fn test_log_level_parsing() {
    assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
    assert_eq!(parse_level(Some(" WARN ")), LevelFilter::Warn);
    assert_eq!(parse_level(Some("loud")), LevelFilter::Info);
    assert_eq!(parse_level(None), LevelFilter::Info);
}
