//! Footer timestamps in the search area's local time.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

use crate::geo::Coordinates;

const POSTED_FORMAT: &str = "%b %d, %Y at %I:%M:%S %p %Z";

/// Resolves coordinates to an IANA zone. Building the finder loads the
/// boundary data, so create one per process.
pub struct LocalClock {
    finder: DefaultFinder,
}

impl LocalClock {
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }

    /// Zone at `point`, or UTC when the lookup finds nothing.
    pub fn zone_at(&self, point: Coordinates) -> Tz {
        let name = self.finder.get_tz_name(point.longitude, point.latitude);
        name.parse::<Tz>().unwrap_or_else(|_| {
            tracing::debug!(
                latitude = point.latitude,
                longitude = point.longitude,
                "No time zone found, using UTC"
            );
            Tz::UTC
        })
    }

    pub fn posted_at(&self, point: Coordinates, now: DateTime<Utc>) -> String {
        format_posted(now, self.zone_at(point))
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new()
    }
}

/// e.g. `Mar 01, 2021 at 12:00:00 PM CST`
pub fn format_posted(now: DateTime<Utc>, zone: Tz) -> String {
    now.with_timezone(&zone).format(POSTED_FORMAT).to_string()
}
