//! Repeat-read suppression for cards left in the reader field.
//!
//! A card resting on the reader produces a detection on nearly every poll.
//! Only the first presentation within the cooldown window should reach the
//! access policy; the rest are the same physical presentation, not new
//! events.

use latchkey_core::{CardId, CardKind, constants::CARD_COOLDOWN};
use std::time::Instant;

/// The most recent fresh detection.
#[derive(Debug, Clone)]
pub struct CardRecord {
    pub kind: CardKind,
    pub id: CardId,
    pub last_seen: Instant,
}

/// Suppresses repeat detections of the same physical card.
///
/// A detection is suppressed iff its kind and ID both match the previous
/// record and less than the cooldown has elapsed since that record was
/// made. Suppressed reads do not refresh the record, so a card held in the
/// field re-triggers once per cooldown period.
#[derive(Debug, Default)]
pub struct CardDeduplicator {
    last: Option<CardRecord>,
}

impl CardDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a detection. Returns `true` if it is a fresh presentation
    /// (and records it), `false` if it is a duplicate to suppress.
    pub fn observe(&mut self, kind: CardKind, id: &CardId, now: Instant) -> bool {
        if let Some(last) = &self.last
            && last.kind == kind
            && last.id == *id
            && now.duration_since(last.last_seen) < CARD_COOLDOWN
        {
            return false;
        }

        self.last = Some(CardRecord {
            kind,
            id: id.clone(),
            last_seen: now,
        });
        true
    }

    /// The last fresh detection, if any.
    pub fn last(&self) -> Option<&CardRecord> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn id(hex: &str) -> CardId {
        CardId::new(hex).unwrap()
    }

    #[test]
    fn test_repeat_within_cooldown_is_suppressed() {
        let mut dedup = CardDeduplicator::new();
        let t0 = Instant::now();
        let card = id("0123456789ABCDEF");

        assert!(dedup.observe(CardKind::Felica, &card, t0));
        assert!(!dedup.observe(CardKind::Felica, &card, t0 + Duration::from_millis(500)));
        assert!(!dedup.observe(CardKind::Felica, &card, t0 + Duration::from_millis(1999)));
    }

    #[test]
    fn test_repeat_at_cooldown_is_fresh() {
        let mut dedup = CardDeduplicator::new();
        let t0 = Instant::now();
        let card = id("0123456789ABCDEF");

        assert!(dedup.observe(CardKind::Felica, &card, t0));
        assert!(dedup.observe(CardKind::Felica, &card, t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn test_different_id_is_always_fresh() {
        let mut dedup = CardDeduplicator::new();
        let t0 = Instant::now();

        assert!(dedup.observe(CardKind::TypeA, &id("04ABCDEF"), t0));
        assert!(dedup.observe(CardKind::TypeA, &id("04ABCDE0"), t0 + Duration::from_millis(1)));
    }

    #[test]
    fn test_different_kind_is_always_fresh() {
        let mut dedup = CardDeduplicator::new();
        let t0 = Instant::now();
        let card = id("0011223344556677");

        assert!(dedup.observe(CardKind::Felica, &card, t0));
        assert!(dedup.observe(CardKind::TypeA, &card, t0 + Duration::from_millis(1)));
    }

    #[test]
    fn test_suppressed_read_does_not_refresh_record() {
        let mut dedup = CardDeduplicator::new();
        let t0 = Instant::now();
        let card = id("0123456789ABCDEF");

        assert!(dedup.observe(CardKind::Felica, &card, t0));
        // Held in the field: suppressed reads at 1.5s and 1.9s must not
        // push the window forward.
        assert!(!dedup.observe(CardKind::Felica, &card, t0 + Duration::from_millis(1500)));
        assert!(!dedup.observe(CardKind::Felica, &card, t0 + Duration::from_millis(1900)));
        // 2s after the ORIGINAL presentation the card re-triggers.
        assert!(dedup.observe(CardKind::Felica, &card, t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn test_last_record_tracks_fresh_reads() {
        let mut dedup = CardDeduplicator::new();
        let t0 = Instant::now();

        assert!(dedup.last().is_none());
        dedup.observe(CardKind::TypeA, &id("04ABCDEF"), t0);

        let record = dedup.last().unwrap();
        assert_eq!(record.kind, CardKind::TypeA);
        assert_eq!(record.id.as_str(), "04ABCDEF");
        assert_eq!(record.last_seen, t0);
    }
}
