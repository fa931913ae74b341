//! The per-event flattening step and the loop that drives it.

use crate::error::Lookup;
use crate::source::{EventSource, NavBuffer};
use crate::{Error, Result};
use log::{error, info};
use simhits_core::{DataStore, EventFlattening, HitArrayExtractor, ValueStore};

/// What a successful [`FlattenStep::execute`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The event had no hits; the store was not touched.
    Skipped { event_id: i32 },
    /// All fields were published.
    Published { event_id: i32, n_hits: usize },
}

impl StepOutcome {
    /// Event identifier of the processed event.
    #[must_use]
    pub fn event_id(&self) -> i32 {
        match self {
            Self::Skipped { event_id } | Self::Published { event_id, .. } => *event_id,
        }
    }
}

/// Processing step: look up the current event, flatten it, publish it.
#[derive(Debug, Clone, Default)]
pub struct FlattenStep<E = HitArrayExtractor> {
    extractor: E,
}

impl<E: EventFlattening> FlattenStep<E> {
    /// Creates a step around `extractor`.
    #[must_use]
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// The wrapped extractor.
    #[must_use]
    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Processes the current event of `source` into `store`.
    ///
    /// Either all fields are published or none are.
    ///
    /// # Errors
    /// Returns [`Error::MissingInput`] if the navigator, header or payload is
    /// absent, or the extractor's error. Nothing is published in either case.
    pub fn execute<S, V>(&self, source: &S, store: &mut V) -> Result<StepOutcome>
    where
        S: EventSource + ?Sized,
        V: ValueStore + ?Sized,
    {
        let nav = source.current_event().ok_or_else(|| missing(Lookup::Navigator))?;
        let header = source.header(nav).ok_or_else(|| missing(Lookup::Header))?;
        let event = source.payload(header).ok_or_else(|| missing(Lookup::Payload))?;

        info!("The SimEvent ID: {}", event.event_id);

        let output = self.extractor.extract(event)?;
        if output.is_skip() {
            info!("Skip the event due to empty collection.");
            return Ok(StepOutcome::Skipped {
                event_id: event.event_id,
            });
        }

        let n_hits = output.hit_count();
        info!("Register the value to the data store.");
        output.publish(store);

        Ok(StepOutcome::Published {
            event_id: event.event_id,
            n_hits,
        })
    }
}

fn missing(lookup: Lookup) -> Error {
    error!("Failed to find the {lookup}.");
    Error::MissingInput(lookup)
}

/// Options for [`run_events`].
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    /// Stop after this many events (`None` = all).
    pub evt_max: Option<usize>,
}

impl RunConfig {
    /// Set the maximum number of events.
    #[must_use]
    pub fn with_evt_max(mut self, evt_max: Option<usize>) -> Self {
        self.evt_max = evt_max;
        self
    }
}

/// Counters collected over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Events handed to the step.
    pub processed: usize,
    /// Events that published their fields.
    pub published: usize,
    /// Events skipped for having no hits.
    pub skipped: usize,
    /// Events whose step failed.
    pub failed: usize,
    /// Hits published over all events.
    pub total_hits: usize,
}

/// Drives `step` over every event in `buffer`.
///
/// The store is cleared before each event so a skipped or failed event
/// never exposes the previous event's values. A failed event is counted
/// and the loop moves on. `on_event` sees the store after every event.
pub fn run_events<E, F>(
    buffer: &mut NavBuffer,
    step: &FlattenStep<E>,
    store: &mut DataStore,
    config: &RunConfig,
    mut on_event: F,
) -> RunStatistics
where
    E: EventFlattening,
    F: FnMut(&Result<StepOutcome>, &DataStore),
{
    let mut stats = RunStatistics::default();
    info!("Running the {} extractor", step.extractor().name());

    loop {
        if config.evt_max.is_some_and(|max| stats.processed >= max) || !buffer.next_event() {
            break;
        }
        store.clear();
        stats.processed += 1;

        let result = step.execute(&*buffer, &mut *store);
        match &result {
            Ok(StepOutcome::Published { n_hits, .. }) => {
                stats.published += 1;
                stats.total_hits += n_hits;
            }
            Ok(StepOutcome::Skipped { .. }) => stats.skipped += 1,
            Err(e) => {
                error!("event {} failed: {e}", buffer.loaded());
                stats.failed += 1;
            }
        }
        on_event(&result, store);
    }

    stats
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::source::EventNavigator;
    use simhits_core::{SimEvent, SimHit, SimTrack};

    fn event_with_hits(id: i32, hits: usize) -> SimEvent {
        let mut event = SimEvent::new(id).with_track(SimTrack::new(1.0, 2.0, 3.0, 0.5));
        for i in 0..hits {
            let i = i32::try_from(i).unwrap();
            event = event.with_hit(SimHit::new(i, 1, f64::from(i)));
        }
        event
    }

    fn step() -> FlattenStep {
        FlattenStep::new(HitArrayExtractor::new())
    }

    fn buffer_of(navs: Vec<EventNavigator>) -> NavBuffer {
        let mut buffer: NavBuffer = navs.into_iter().collect();
        buffer.next_event();
        buffer
    }

    #[test]
    fn test_publishes_all_fields() {
        let buffer = buffer_of(vec![EventNavigator::from_event(event_with_hits(5, 3))]);
        let mut store = DataStore::new();

        let outcome = step().execute(&buffer, &mut store).unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Published {
                event_id: 5,
                n_hits: 3
            }
        );
        assert_eq!(store.set_calls(), 7);
        assert_eq!(store.scalar("edep").unwrap(), 0.5);
    }

    #[test]
    fn test_step_exposes_extractor() {
        let step = step();
        assert_eq!(step.extractor().name(), "HitArray");
        assert_eq!(step.extractor().config().field_names.pmt_id, "pmtid");
    }

    #[test]
    fn test_empty_collection_is_success() {
        let buffer = buffer_of(vec![EventNavigator::from_event(event_with_hits(6, 0))]);
        let mut store = DataStore::new();

        let outcome = step().execute(&buffer, &mut store).unwrap();
        assert_eq!(outcome, StepOutcome::Skipped { event_id: 6 });
        assert_eq!(outcome.event_id(), 6);
        assert_eq!(store.set_calls(), 0);
    }

    #[test]
    fn test_missing_inputs() {
        let step = step();
        let mut store = DataStore::new();

        let empty = NavBuffer::new();
        let err = step.execute(&empty, &mut store).unwrap_err();
        assert!(matches!(err, Error::MissingInput(Lookup::Navigator)));

        let no_header = buffer_of(vec![EventNavigator::without_header()]);
        let err = step.execute(&no_header, &mut store).unwrap_err();
        assert!(matches!(err, Error::MissingInput(Lookup::Header)));

        let no_payload = buffer_of(vec![EventNavigator::without_payload()]);
        let err = step.execute(&no_payload, &mut store).unwrap_err();
        assert!(matches!(err, Error::MissingInput(Lookup::Payload)));

        assert_eq!(store.set_calls(), 0);
    }

    #[test]
    fn test_run_counts_and_continues_after_failure() {
        let mut buffer: NavBuffer = vec![
            EventNavigator::from_event(event_with_hits(1, 2)),
            EventNavigator::without_header(),
            EventNavigator::from_event(event_with_hits(3, 0)),
            EventNavigator::from_event(event_with_hits(4, 5)),
        ]
        .into_iter()
        .collect();
        let mut store = DataStore::new();
        let mut seen = Vec::new();

        let stats = run_events(
            &mut buffer,
            &step(),
            &mut store,
            &RunConfig::default(),
            |result, store| seen.push((result.is_ok(), store.len())),
        );

        assert_eq!(
            stats,
            RunStatistics {
                processed: 4,
                published: 2,
                skipped: 1,
                failed: 1,
                total_hits: 7,
            }
        );
        // Skipped and failed events see an empty store.
        assert_eq!(seen, vec![(true, 7), (false, 0), (true, 0), (true, 7)]);
    }

    #[test]
    fn test_run_respects_evt_max() {
        let mut buffer: NavBuffer = (0..10)
            .map(|id| EventNavigator::from_event(event_with_hits(id, 1)))
            .collect();
        let mut store = DataStore::new();

        let stats = run_events(
            &mut buffer,
            &step(),
            &mut store,
            &RunConfig::default().with_evt_max(Some(4)),
            |_, _| {},
        );

        assert_eq!(stats.processed, 4);
        assert_eq!(buffer.remaining(), 6);
    }
}
