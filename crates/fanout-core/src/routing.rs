//! Routing engine
//!
//! Decides which storage providers receive a copy of the object an event
//! refers to. Rules are evaluated independently; when several matching rules
//! name the same provider, the one declared last wins.

use std::collections::BTreeMap;

use crate::types::{Event, OutputRule};

/// Destination provider name -> destination path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingDecision {
    destinations: BTreeMap<String, String>,
}

impl RoutingDecision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the destination path of a provider, replacing any previous one
    pub fn insert(&mut self, provider: impl Into<String>, path: impl Into<String>) {
        self.destinations.insert(provider.into(), path.into());
    }

    pub fn get(&self, provider: &str) -> Option<&str> {
        self.destinations.get(provider).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.destinations
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_str()))
    }
}

/// Compute where an event's object must be copied to
pub fn compute_destinations(event: &Event, rules: &[OutputRule]) -> RoutingDecision {
    let mut decision = RoutingDecision::new();
    for rule in rules {
        if rule.matches(&event.object_key) {
            decision.insert(rule.storage_name.as_str(), rule.path.as_str());
        }
    }
    decision
}
