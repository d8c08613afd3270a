// Tests for clip time-zone resolution

use chrono::{TimeZone, Utc};
use trigger_recorder::recorder::ZoneConfig;
use trigger_recorder::ClipZone;

fn zones(id: Option<&str>, platform: Option<&str>, iana: Option<&str>) -> ZoneConfig {
    ZoneConfig {
        id: id.map(str::to_string),
        platform_default: platform.map(str::to_string),
        iana_default: iana.map(str::to_string),
    }
}

#[test]
fn test_explicit_iana_identifier_wins() {
    let zone = ClipZone::resolve(&zones(Some("Europe/Berlin"), Some("Tokyo Standard Time"), None));
    assert_eq!(zone.id(), "Europe/Berlin");

    let winter = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    assert_eq!(zone.render(winter).offset().local_minus_utc(), 3600);
    let summer = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
    assert_eq!(zone.render(summer).offset().local_minus_utc(), 7200);
}

#[test]
fn test_explicit_windows_identifier_is_accepted() {
    let zone = ClipZone::resolve(&zones(Some("Tokyo Standard Time"), None, None));
    assert_eq!(zone.id(), "Tokyo Standard Time");

    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    assert_eq!(zone.render(at).offset().local_minus_utc(), 9 * 3600);
}

#[test]
fn test_invalid_explicit_identifier_falls_through() {
    let zone = ClipZone::resolve(&zones(Some("Mars/Olympus_Mons"), Some("Tokyo Standard Time"), Some("Asia/Tokyo")));
    assert_eq!(zone.id(), "Tokyo Standard Time");
}

#[test]
fn test_iana_default_used_when_platform_default_unknown() {
    let zone = ClipZone::resolve(&zones(None, Some("Nowhere Standard Time"), Some("Asia/Tokyo")));
    assert_eq!(zone.id(), "Asia/Tokyo");
}

#[test]
fn test_host_zone_is_last_resort() {
    let zone = ClipZone::resolve(&zones(Some("bogus"), Some("also bogus"), Some("Not/AZone")));
    assert_eq!(zone, ClipZone::host());
    assert!(!zone.id().is_empty());

    let unset = ClipZone::resolve(&ZoneConfig::default());
    assert_eq!(unset, ClipZone::host());
}

#[test]
fn test_lookup_rules() {
    assert!(ClipZone::lookup("").is_none());
    assert!(ClipZone::lookup("   ").is_none());
    assert!(ClipZone::lookup("UTC").is_some());
    assert!(ClipZone::lookup("pacific standard time").is_some(), "Windows names match case-insensitively");
    assert!(ClipZone::lookup(" America/New_York ").is_some());
}

#[test]
fn test_file_stamp_format() {
    let zone = ClipZone::lookup("UTC").unwrap();
    let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 58).unwrap();
    assert_eq!(zone.file_stamp(at), "20241231_235958");

    let tokyo = ClipZone::lookup("Asia/Tokyo").unwrap();
    assert_eq!(tokyo.file_stamp(at), "20250101_085958");
}
