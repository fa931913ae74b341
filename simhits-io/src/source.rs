//! Upstream event access.
//!
//! The host framework keeps one event in flight at a time. `NavBuffer` is
//! the in-process stand-in: it owns a queue of loaded navigators and
//! exposes the current one through [`EventSource`].

use serde::{Deserialize, Serialize};
use simhits_core::{SimEvent, SimHeader};
use std::collections::VecDeque;

/// One loaded event slot with its headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventNavigator {
    /// Detector simulation header, if the input carried one.
    #[serde(default)]
    pub sim_header: Option<SimHeader>,
}

impl EventNavigator {
    /// Navigator with a header holding `event`.
    #[must_use]
    pub fn from_event(event: SimEvent) -> Self {
        Self {
            sim_header: Some(SimHeader::new(event)),
        }
    }

    /// Navigator with no simulation header.
    #[must_use]
    pub fn without_header() -> Self {
        Self { sim_header: None }
    }

    /// Navigator with a header but no event payload.
    #[must_use]
    pub fn without_payload() -> Self {
        Self {
            sim_header: Some(SimHeader::empty()),
        }
    }
}

/// Access to the current event and its parts.
///
/// Every lookup may come back empty; callers treat that as fatal for the
/// current event only.
pub trait EventSource {
    /// The navigator of the event being processed.
    fn current_event(&self) -> Option<&EventNavigator>;

    /// The simulation header of `nav`.
    fn header<'a>(&self, nav: &'a EventNavigator) -> Option<&'a SimHeader> {
        nav.sim_header.as_ref()
    }

    /// The event payload of `header`.
    fn payload<'a>(&self, header: &'a SimHeader) -> Option<&'a SimEvent> {
        header.event()
    }
}

/// Queue of events, one of which is current.
#[derive(Debug, Default)]
pub struct NavBuffer {
    pending: VecDeque<EventNavigator>,
    current: Option<EventNavigator>,
    loaded: usize,
}

impl NavBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `nav` behind the already pending events.
    pub fn push(&mut self, nav: EventNavigator) {
        self.pending.push_back(nav);
    }

    /// Makes the next pending event current, dropping the previous one.
    ///
    /// Returns `false` once the queue is exhausted; the current slot is
    /// then empty.
    pub fn next_event(&mut self) -> bool {
        self.current = self.pending.pop_front();
        if self.current.is_some() {
            self.loaded += 1;
        }
        self.current.is_some()
    }

    /// Number of events not yet made current.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Number of events made current so far.
    #[must_use]
    pub fn loaded(&self) -> usize {
        self.loaded
    }
}

impl FromIterator<EventNavigator> for NavBuffer {
    fn from_iter<I: IntoIterator<Item = EventNavigator>>(iter: I) -> Self {
        Self {
            pending: iter.into_iter().collect(),
            current: None,
            loaded: 0,
        }
    }
}

impl EventSource for NavBuffer {
    fn current_event(&self) -> Option<&EventNavigator> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_cycles_events() {
        let mut buffer: NavBuffer = (1..=3)
            .map(|id| EventNavigator::from_event(SimEvent::new(id)))
            .collect();

        assert!(buffer.current_event().is_none());
        assert_eq!(buffer.remaining(), 3);

        let mut ids = Vec::new();
        while buffer.next_event() {
            let nav = buffer.current_event().unwrap();
            let header = buffer.header(nav).unwrap();
            ids.push(buffer.payload(header).unwrap().event_id);
        }

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(buffer.loaded(), 3);
        assert!(buffer.current_event().is_none());
    }

    #[test]
    fn test_missing_parts() {
        let mut buffer = NavBuffer::new();
        buffer.push(EventNavigator::without_header());
        buffer.push(EventNavigator::without_payload());

        assert!(buffer.next_event());
        let nav = buffer.current_event().unwrap();
        assert!(buffer.header(nav).is_none());

        assert!(buffer.next_event());
        let nav = buffer.current_event().unwrap();
        let header = buffer.header(nav).unwrap();
        assert!(buffer.payload(header).is_none());
    }
}
