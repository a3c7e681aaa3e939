//! Timeline conversion: events carry a numeric `at` attribute and are
//! bucketed into tracks.
//!
//! Containers become tracks; nodes outside any container land on one
//! implicit track. A malformed `at` value degrades to an untimed event
//! rather than failing the profile.

use trellis_core::{document::Profile, identifier::Id};

use crate::convert::GraphModel;

/// One event on a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub id: Id,
    pub label: String,
    /// Position on the time axis; `None` for untimed events, which are
    /// placed after all timed ones in declaration order.
    pub at: Option<f64>,
}

/// A horizontal band of events.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// The declaring container, or `None` for the implicit track.
    pub id: Option<Id>,
    pub label: Option<String>,
    pub events: Vec<TimelineEvent>,
}

/// The timeline domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineModel {
    pub graph: GraphModel,
    pub tracks: Vec<Track>,
}

impl TimelineModel {
    /// The overall time range across all tracks, when any event is
    /// timed.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for track in &self.tracks {
            for event in &track.events {
                if let Some(at) = event.at {
                    range = Some(match range {
                        None => (at, at),
                        Some((min, max)) => (min.min(at), max.max(at)),
                    });
                }
            }
        }
        range
    }
}

/// Bucket a validated profile's events into tracks.
pub fn convert_timeline(profile: &Profile) -> TimelineModel {
    let event_for = |id: Id| -> Option<TimelineEvent> {
        let node = profile.node(id)?;
        Some(TimelineEvent {
            id: node.id,
            label: node.display_text(),
            at: node.data.get("at").and_then(|v| v.as_number()),
        })
    };

    let mut tracks = Vec::new();

    // Implicit track for events declared outside any container.
    let loose: Vec<TimelineEvent> = profile
        .nodes
        .iter()
        .filter(|n| n.parent.is_none())
        .filter_map(|n| event_for(n.id))
        .collect();
    if !loose.is_empty() {
        tracks.push(Track {
            id: None,
            label: None,
            events: loose,
        });
    }

    for container in &profile.containers {
        let events: Vec<TimelineEvent> = container
            .children
            .iter()
            .filter_map(|child| event_for(*child))
            .collect();
        tracks.push(Track {
            id: Some(container.id),
            label: container.label.clone(),
            events,
        });
    }

    TimelineModel {
        graph: GraphModel::from_profile(profile),
        tracks,
    }
}
