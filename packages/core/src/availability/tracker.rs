//! Last-observed availability per location.

use std::collections::HashMap;

use crate::providers::ProviderFamily;

/// Availability by location id for one provider family.
///
/// An id that has never been observed reads as unavailable. Entries are
/// overwritten in place and never removed.
#[derive(Debug, Default, Clone)]
pub struct AvailabilitySection {
    seen: HashMap<String, bool>,
}

impl AvailabilitySection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self, id: &str) -> bool {
        self.seen.get(id).copied().unwrap_or(false)
    }

    pub fn record(&mut self, id: &str, available: bool) {
        match self.seen.get_mut(id) {
            Some(entry) => *entry = available,
            None => {
                self.seen.insert(id.to_string(), available);
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.seen.values().filter(|available| **available).count()
    }
}

/// One independent section per provider family; ids never cross over.
#[derive(Debug, Default, Clone)]
pub struct AvailabilityTracker {
    hyvee: AvailabilitySection,
    spotter: AvailabilitySection,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&self, family: ProviderFamily) -> &AvailabilitySection {
        match family {
            ProviderFamily::HyVee => &self.hyvee,
            ProviderFamily::Spotter => &self.spotter,
        }
    }

    pub fn section_mut(&mut self, family: ProviderFamily) -> &mut AvailabilitySection {
        match family {
            ProviderFamily::HyVee => &mut self.hyvee,
            ProviderFamily::Spotter => &mut self.spotter,
        }
    }

    pub fn previous(&self, family: ProviderFamily, id: &str) -> bool {
        self.section(family).previous(id)
    }
}
