//! False-to-true transition detection.

use crate::availability::tracker::AvailabilitySection;
use crate::providers::Location;

/// Outcome of one detection pass over a provider family's listing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Detection {
    /// Locations that were unavailable (or unseen) last time and are
    /// available now, in provider order.
    pub newly_available: Vec<Location>,
    /// Test mode only: a stand-in location, present when there were no
    /// genuine transitions. Its availability is whatever the provider
    /// reported.
    pub forced_sample: Option<Location>,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.newly_available.is_empty() && self.forced_sample.is_none()
    }

    /// The locations to notify about: the genuine transitions, or the
    /// forced sample when there are none.
    pub fn notifiable(&self) -> Vec<Location> {
        if !self.newly_available.is_empty() {
            return self.newly_available.clone();
        }
        self.forced_sample.iter().cloned().collect()
    }
}

/// Compare `locations` against `section` and record every observation.
///
/// Each location is written back exactly once with its real availability,
/// including any location used as the forced sample. In `test` mode the
/// first location whose previous state is unavailable and that is not a
/// genuine transition becomes the sample; it is dropped when any genuine
/// transition exists.
pub fn detect(locations: &[Location], section: &mut AvailabilitySection, test: bool) -> Detection {
    let mut detection = Detection::default();

    for location in locations {
        let previous = section.previous(&location.id);

        if location.is_available && !previous {
            detection.newly_available.push(location.clone());
        } else if test && !previous && detection.forced_sample.is_none() {
            detection.forced_sample = Some(location.clone());
        }

        section.record(&location.id, location.is_available);
    }

    if !detection.newly_available.is_empty() {
        detection.forced_sample = None;
    }

    detection
}
