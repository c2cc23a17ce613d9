//! Configuration defaults

use ados::config::drafts::DraftsConfig;
use ados::config::notifications::NotificationsConfig;
use ados::config::CONFIG;
use ados::services::notification::NotificationService;

#[test]
fn test_defaults_are_usable() {
    assert!(!CONFIG.auth.jwt_secret.is_empty());
    assert_eq!(CONFIG.version, env!("CARGO_PKG_VERSION"));
    assert!(!CONFIG.server.public_url.ends_with('/'));
}

#[test]
fn test_draft_ttl_is_positive() {
    let drafts = DraftsConfig { ttl_hours: 168 };
    assert_eq!(drafts.ttl().num_days(), 7);
    assert!(CONFIG.drafts.ttl().num_hours() > 0);
}

#[test]
fn test_no_channels_without_credentials() {
    let service = NotificationService::from_config(&NotificationsConfig::default());
    assert!(service.channels().is_empty());
}
