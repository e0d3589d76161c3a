//! Single-slot handoff of the latest reading to external readers.
//!
//! The reading is held as an immutable `Arc` snapshot inside a
//! [`tokio::sync::watch`] channel. A write swaps the whole snapshot with
//! `send_replace`. A reader clones the current `Arc` and keeps a consistent
//! view for as long as it holds it, even if a newer scan lands meanwhile.

use std::sync::Arc;

use lanpulse_common::reading::{LatestReading, Observation};
use tokio::sync::watch;

/// Sink the scheduler hands each completed reading to.
pub trait ReadingStore: Send + Sync {
    /// Replaces the current reading. Called by the scheduler only.
    fn write(&self, reading: LatestReading);

    /// Returns the reading of the last completed scan.
    fn read(&self) -> Arc<LatestReading>;
}

#[derive(Debug, Clone)]
pub struct LatestReadingStore {
    tx: Arc<watch::Sender<Arc<LatestReading>>>,
}

impl LatestReadingStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(LatestReading::default()));
        Self { tx: Arc::new(tx) }
    }

    /// Receiver woken on every replacement, for readers that would rather wait than poll.
    pub fn subscribe(&self) -> watch::Receiver<Arc<LatestReading>> {
        self.tx.subscribe()
    }

    /// The current reading in the collector's observation schema.
    pub fn observations(&self) -> Vec<Observation> {
        self.read().observations()
    }
}

impl Default for LatestReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingStore for LatestReadingStore {
    fn write(&self, reading: LatestReading) {
        self.tx.send_replace(Arc::new(reading));
    }

    fn read(&self) -> Arc<LatestReading> {
        self.tx.borrow().clone()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use lanpulse_common::reading::PresenceRecord;
    use std::net::Ipv4Addr;

    fn reading(hosts: u8, minute: i64) -> LatestReading {
        let at = DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z").unwrap() + Duration::minutes(minute);
        let records = (1..=hosts)
            .map(|i| PresenceRecord::up(Ipv4Addr::new(10, 0, 0, i), at))
            .collect();
        LatestReading::new(at, records)
    }

    #[test]
    fn starts_empty() {
        let store = LatestReadingStore::new();
        assert_eq!(*store.read(), LatestReading::default());
        assert!(store.observations().is_empty());
    }

    #[test]
    fn write_replaces_instead_of_appending() {
        let store = LatestReadingStore::new();
        store.write(reading(3, 0));
        store.write(reading(1, 5));

        let current = store.read();
        assert_eq!(*current, reading(1, 5));
        assert_eq!(store.observations().len(), 1);
    }

    #[test]
    fn held_snapshot_survives_replacement() {
        let store = LatestReadingStore::new();
        store.write(reading(2, 0));
        let held = store.read();

        store.write(reading(4, 5));

        assert_eq!(held.len(), 2);
        assert_eq!(store.read().len(), 4);
    }

    #[tokio::test]
    async fn subscribers_see_each_replacement() {
        let store = LatestReadingStore::new();
        let mut rx = store.subscribe();

        store.write(reading(2, 0));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 2);
    }

    #[test]
    fn concurrent_readers_never_see_partial_readings() {
        let store = Arc::new(LatestReadingStore::new());
        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for round in 0..200u8 {
                    let hosts = if round % 2 == 0 { 5 } else { 9 };
                    store.write(reading(hosts, i64::from(round)));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let len = store.read().len();
                        assert!(matches!(len, 0 | 5 | 9), "partial reading of {len} records");
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
