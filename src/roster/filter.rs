use std::collections::{BTreeSet, HashMap};

use super::profile::{Availability, Profile};

pub const TOP_LIMIT: usize = 24;

const PROJECT_WEIGHT: u32 = 2;

pub fn relevance_score(profile: &Profile) -> u32 {
    profile.projects.len() as u32 * PROJECT_WEIGHT + profile.availability.relevance_weight()
}

/// Side-panel filter state. Empty sets mean "no constraint".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterFilter {
    pub tags: BTreeSet<String>,
    pub availability: BTreeSet<Availability>,
    pub show_all: bool,
}

impl RosterFilter {
    pub fn is_active(&self) -> bool {
        !self.tags.is_empty() || !self.availability.is_empty()
    }

    pub fn reset(&mut self) {
        self.tags.clear();
        self.availability.clear();
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_owned());
        }
    }

    pub fn toggle_availability(&mut self, availability: Availability) {
        if !self.availability.remove(&availability) {
            self.availability.insert(availability);
        }
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        let tag_match = self.tags.is_empty()
            || profile
                .tech_stack
                .iter()
                .any(|tag| self.tags.contains(tag));
        let availability_match =
            self.availability.is_empty() || self.availability.contains(&profile.availability);
        tag_match && availability_match
    }

    /// Matching profiles; unless `show_all` is set, only the most relevant
    /// [`TOP_LIMIT`], best first with ties in roster order.
    pub fn apply<'a>(&self, profiles: &'a [Profile]) -> Vec<&'a Profile> {
        let mut matching = profiles
            .iter()
            .filter(|profile| self.matches(profile))
            .collect::<Vec<_>>();
        if self.show_all {
            return matching;
        }

        matching.sort_by_key(|profile| std::cmp::Reverse(relevance_score(profile)));
        matching.truncate(TOP_LIMIT);
        matching
    }
}

/// Every tag in the roster with the number of profiles listing it, most
/// common first.
pub fn tag_counts(profiles: &[Profile]) -> Vec<(String, usize)> {
    let mut counts = HashMap::<&str, usize>::new();
    for profile in profiles {
        for tag in &profile.tech_stack {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut counts = counts
        .into_iter()
        .map(|(tag, count)| (tag.to_owned(), count))
        .collect::<Vec<_>>();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
