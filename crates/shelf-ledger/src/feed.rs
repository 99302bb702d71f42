use std::sync::{PoisonError, RwLock};

use shelf_types::BookKey;
use tokio::sync::broadcast;

use crate::event::EventKind;
use crate::journal::JournalEntry;

/// Filter for subscribing to a subset of ledger events.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// If set, only events of these kinds are delivered.
    pub kinds: Option<Vec<EventKind>>,
    /// If set, only events for these books are delivered.
    pub keys: Option<Vec<BookKey>>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn kinds(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
            keys: None,
        }
    }

    pub fn book(key: BookKey) -> Self {
        Self {
            kinds: None,
            keys: Some(vec![key]),
        }
    }

    pub fn matches(&self, entry: &JournalEntry) -> bool {
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&entry.event.kind()) {
                return false;
            }
        }
        if let Some(ref keys) = self.keys {
            if !keys.contains(entry.event.key()) {
                return false;
            }
        }
        true
    }
}

/// Receiving half of a feed subscription.
pub type EventStream = broadcast::Receiver<JournalEntry>;

struct Subscriber {
    filter: EventFilter,
    sender: broadcast::Sender<JournalEntry>,
}

/// Fan-out of journaled events to live subscribers.
///
/// Entries are published in journal order. Subscribers whose receivers have
/// all been dropped are pruned on the next publish.
pub struct EventFeed {
    subscribers: RwLock<Vec<Subscriber>>,
    capacity: usize,
}

impl EventFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, filter: EventFilter) -> EventStream {
        let (sender, receiver) = broadcast::channel(self.capacity);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber { filter, sender });
        receiver
    }

    /// Deliver `entry` to every matching subscriber; returns how many got it.
    pub fn publish(&self, entry: &JournalEntry) -> usize {
        let mut delivered = 0;
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subs.retain(|sub| {
            if sub.filter.matches(entry) {
                let alive = sub.sender.send(entry.clone()).is_ok();
                if alive {
                    delivered += 1;
                }
                alive
            } else {
                sub.sender.receiver_count() > 0
            }
        });
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use shelf_types::AccountId;

    use super::*;
    use crate::event::LedgerEvent;
    use crate::journal::Journal;
    use crate::operation::Operation;

    fn entries() -> Vec<JournalEntry> {
        let owner = AccountId::from_label("owner").unwrap();
        let key = BookKey::from_hash([1; 32]);
        let mut journal = Journal::new();
        let added = journal
            .prepare(
                Operation::add_book(owner, "Test Book", 1),
                LedgerEvent::BookAdded {
                    key,
                    title: "Test Book".into(),
                    copies: 1,
                },
            )
            .unwrap();
        journal.push(added).unwrap();
        let borrowed = journal
            .prepare(
                Operation::borrow_book(owner, key),
                LedgerEvent::BookBorrowed {
                    key,
                    borrower: owner,
                    remaining: 0,
                },
            )
            .unwrap();
        journal.push(borrowed).unwrap();
        journal.entries().to_vec()
    }

    #[test]
    fn subscriber_receives_in_order() {
        let feed = EventFeed::default();
        let mut rx = feed.subscribe(EventFilter::all());

        for entry in entries() {
            assert_eq!(feed.publish(&entry), 1);
        }

        assert_eq!(rx.try_recv().unwrap().seq, 1);
        assert_eq!(rx.try_recv().unwrap().seq, 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn kind_filter() {
        let feed = EventFeed::default();
        let mut rx = feed.subscribe(EventFilter::kinds([EventKind::BookBorrowed]));

        for entry in entries() {
            feed.publish(&entry);
        }

        let got = rx.try_recv().unwrap();
        assert_eq!(got.event.kind(), EventKind::BookBorrowed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn key_filter() {
        let feed = EventFeed::default();
        let mut other = feed.subscribe(EventFilter::book(BookKey::from_hash([2; 32])));

        for entry in entries() {
            feed.publish(&entry);
        }
        assert!(other.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let feed = EventFeed::default();
        let rx = feed.subscribe(EventFilter::all());
        assert_eq!(feed.subscriber_count(), 1);
        drop(rx);

        let entry = entries().remove(0);
        assert_eq!(feed.publish(&entry), 0);
        assert_eq!(feed.subscriber_count(), 0);
    }
}
