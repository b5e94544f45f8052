//! Fixed-length sliding history of classified events.
//!
//! The history always holds exactly `capacity` events, oldest first. It is
//! seeded with `None` placeholders, so it is never partially filled: every
//! push evicts the oldest event.

use crate::config::ConfigError;
use crate::core::classifier::{Event, EventType};
use std::collections::VecDeque;

/// Ring buffer of the most recent events.
#[derive(Debug, Clone)]
pub struct EventHistory {
    events: VecDeque<Event>,
    capacity: usize,
}

impl EventHistory {
    /// Create a history pre-filled with `capacity` `None` events.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidHistoryLength);
        }

        let mut events = VecDeque::with_capacity(capacity);
        events.extend(std::iter::repeat(Event::none()).take(capacity));
        Ok(Self { events, capacity })
    }

    /// Evict the oldest event and append `event` as the newest.
    pub fn push(&mut self, event: Event) {
        self.events.pop_front();
        self.events.push_back(event);
    }

    /// Iterate over the current contents, oldest first, without consuming them.
    pub fn scan(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }

    /// The oldest event in the history.
    pub fn oldest(&self) -> &Event {
        // Never empty: capacity >= 1 and every push is paired with an eviction.
        &self.events[0]
    }

    /// The most recently pushed event.
    pub fn newest(&self) -> &Event {
        &self.events[self.capacity - 1]
    }

    /// Replace every slot with a `None` event.
    pub fn reset(&mut self) {
        for event in self.events.iter_mut() {
            *event = Event::none();
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Count events of the given type currently held.
    pub fn count(&self, event_type: EventType) -> usize {
        self.events.iter().filter(|e| e.is(event_type)).count()
    }

    /// Compact one-label-per-slot rendering, oldest first.
    pub fn render(&self) -> String {
        self.events
            .iter()
            .map(|e| e.event_type.label())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::RawSample;

    fn event(event_type: EventType) -> Event {
        Event::new(RawSample::new(-1.0), event_type)
    }

    fn types(history: &EventHistory) -> Vec<EventType> {
        history.scan().map(|e| e.event_type).collect()
    }

    #[test]
    fn test_new_history_is_seeded_with_none() {
        let history = EventHistory::new(5).unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history.count(EventType::None), 5);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            EventHistory::new(0).unwrap_err(),
            ConfigError::InvalidHistoryLength
        );
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut history = EventHistory::new(3).unwrap();
        history.push(event(EventType::Clench));
        history.push(event(EventType::ReflexBlink));
        assert_eq!(
            types(&history),
            vec![EventType::None, EventType::Clench, EventType::ReflexBlink]
        );

        history.push(event(EventType::VoluntaryBlink));
        history.push(event(EventType::None));
        assert_eq!(
            types(&history),
            vec![
                EventType::ReflexBlink,
                EventType::VoluntaryBlink,
                EventType::None
            ]
        );
        assert_eq!(history.oldest().event_type, EventType::ReflexBlink);
        assert_eq!(history.newest().event_type, EventType::None);
    }

    #[test]
    fn test_length_is_constant() {
        for capacity in [1, 2, 7, 25] {
            let mut history = EventHistory::new(capacity).unwrap();
            for i in 0..(capacity * 3 + 1) {
                let kind = if i % 2 == 0 {
                    EventType::Clench
                } else {
                    EventType::ReflexBlink
                };
                history.push(event(kind));
                assert_eq!(history.len(), capacity);
            }
        }
    }

    #[test]
    fn test_scan_is_non_destructive() {
        let mut history = EventHistory::new(4).unwrap();
        history.push(event(EventType::Clench));
        history.push(event(EventType::VoluntaryBlink));

        let first = types(&history);
        let second = types(&history);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_clears_all_slots() {
        let mut history = EventHistory::new(4).unwrap();
        for _ in 0..4 {
            history.push(event(EventType::Clench));
        }
        history.reset();
        assert_eq!(history.len(), 4);
        assert_eq!(history.count(EventType::None), 4);

        // Subsequent pushes still land at the newest end.
        history.push(event(EventType::Clench));
        assert_eq!(history.newest().event_type, EventType::Clench);
        assert_eq!(history.oldest().event_type, EventType::None);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut once = EventHistory::new(3).unwrap();
        let mut twice = EventHistory::new(3).unwrap();
        for h in [&mut once, &mut twice] {
            h.push(event(EventType::Clench));
            h.push(event(EventType::ReflexBlink));
        }

        once.reset();
        twice.reset();
        twice.reset();
        assert_eq!(types(&once), types(&twice));
    }

    #[test]
    fn test_render() {
        let mut history = EventHistory::new(2).unwrap();
        history.push(event(EventType::Clench));
        assert_eq!(history.render(), "none clench");
    }
}
