// Time-zone resolution for clip names and metadata
//
// Candidates are tried once, at construction: the explicit identifier, a
// Windows-style platform default, its IANA equivalent, then the host zone.
// Resolution never fails; the host zone is always available.

use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use super::config::ZoneConfig;

/// Windows zone names mapped to their IANA equivalents
const WINDOWS_ZONES: &[(&str, &str)] = &[
    ("UTC", "Etc/UTC"),
    ("GMT Standard Time", "Europe/London"),
    ("W. Europe Standard Time", "Europe/Berlin"),
    ("Romance Standard Time", "Europe/Paris"),
    ("Central European Standard Time", "Europe/Warsaw"),
    ("E. Europe Standard Time", "Europe/Chisinau"),
    ("Russian Standard Time", "Europe/Moscow"),
    ("India Standard Time", "Asia/Kolkata"),
    ("China Standard Time", "Asia/Shanghai"),
    ("Singapore Standard Time", "Asia/Singapore"),
    ("Tokyo Standard Time", "Asia/Tokyo"),
    ("Korea Standard Time", "Asia/Seoul"),
    ("AUS Eastern Standard Time", "Australia/Sydney"),
    ("New Zealand Standard Time", "Pacific/Auckland"),
    ("Hawaiian Standard Time", "Pacific/Honolulu"),
    ("Alaskan Standard Time", "America/Anchorage"),
    ("Pacific Standard Time", "America/Los_Angeles"),
    ("Mountain Standard Time", "America/Denver"),
    ("Central Standard Time", "America/Chicago"),
    ("Eastern Standard Time", "America/New_York"),
    ("SA Pacific Standard Time", "America/Bogota"),
    ("E. South America Standard Time", "America/Sao_Paulo"),
];

/// The zone clip instants are rendered in
#[derive(Debug, Clone, PartialEq)]
pub enum ClipZone {
    Named { id: String, tz: Tz },
    /// Host zone without a resolvable IANA name
    Local,
}

impl ClipZone {
    pub fn resolve(config: &ZoneConfig) -> Self {
        if let Some(id) = config.id.as_deref() {
            match Self::lookup(id) {
                Some(zone) => return zone,
                None => warn!("Unknown time zone {:?}, falling back", id),
            }
        }

        let candidates = [config.platform_default.as_deref(), config.iana_default.as_deref()];
        for id in candidates.into_iter().flatten() {
            if let Some(zone) = Self::lookup(id) {
                return zone;
            }
            debug!("Time zone candidate {:?} unresolvable", id);
        }

        Self::host()
    }

    /// Resolve an IANA or Windows-style identifier
    pub fn lookup(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }

        if let Ok(tz) = id.parse::<Tz>() {
            return Some(ClipZone::Named {
                id: id.to_string(),
                tz,
            });
        }

        WINDOWS_ZONES
            .iter()
            .find(|(windows, _)| windows.eq_ignore_ascii_case(id))
            .and_then(|(windows, iana)| {
                iana.parse::<Tz>().ok().map(|tz| ClipZone::Named {
                    id: windows.to_string(),
                    tz,
                })
            })
    }

    pub fn host() -> Self {
        iana_time_zone::get_timezone()
            .ok()
            .and_then(|id| Self::lookup(&id))
            .unwrap_or(ClipZone::Local)
    }

    pub fn id(&self) -> &str {
        match self {
            ClipZone::Named { id, .. } => id,
            ClipZone::Local => "Local",
        }
    }

    /// Local wall-clock rendering of `at`
    pub fn render(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            ClipZone::Named { tz, .. } => at.with_timezone(tz).fixed_offset(),
            ClipZone::Local => at.with_timezone(&Local).fixed_offset(),
        }
    }

    /// `yyyyMMdd_HHmmss` stamp used in clip file names
    pub fn file_stamp(&self, at: DateTime<Utc>) -> String {
        self.render(at).format("%Y%m%d_%H%M%S").to_string()
    }
}
