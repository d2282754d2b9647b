//! Tests for `RecordStore` behavior.

use super::*;
use crate::table::FileSource;
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Clock returning a controlled number of seconds since the epoch.
struct MockClock {
    secs: AtomicU64,
}

impl MockClock {
    fn new(initial_secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(initial_secs),
        }
    }

    fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.secs.load(Ordering::SeqCst))
    }
}

/// In-memory source whose content can be replaced or made unreadable.
struct MemorySource {
    content: Mutex<Option<String>>,
}

impl MemorySource {
    fn new(content: &str) -> Self {
        Self {
            content: Mutex::new(Some(content.to_string())),
        }
    }

    fn set(&self, content: &str) {
        *self.content.lock().unwrap() = Some(content.to_string());
    }

    fn make_unreadable(&self) {
        *self.content.lock().unwrap() = None;
    }
}

impl TableSource for MemorySource {
    type Reader = Cursor<Vec<u8>>;

    fn open(&self) -> Result<Self::Reader, TableError> {
        self.content
            .lock()
            .unwrap()
            .clone()
            .map(|text| Cursor::new(text.into_bytes()))
            .ok_or_else(|| TableError::Open {
                origin: self.origin(),
                source: io::Error::new(io::ErrorKind::NotFound, "gone"),
            })
    }

    fn origin(&self) -> String {
        "memory".to_string()
    }
}

/// Source that takes a while to open, widening the window in which two
/// cycles overlap.
struct SlowSource {
    inner: MemorySource,
    delay: Duration,
}

impl TableSource for SlowSource {
    type Reader = Cursor<Vec<u8>>;

    fn open(&self) -> Result<Self::Reader, TableError> {
        std::thread::sleep(self.delay);
        self.inner.open()
    }

    fn origin(&self) -> String {
        "slow memory".to_string()
    }
}

const TWO_RECORDS: &str = "\
Destination: A
  NextHop: 10.0.0.1
Destination: B
  NextHop: 10.0.0.2
";

fn store(content: &str) -> RecordStore<MemorySource, MockClock> {
    RecordStore::with_clock(MemorySource::new(content), Chunker::default(), MockClock::new(100))
}

fn changed(report: &ReloadReport) -> Vec<&str> {
    report.changes.iter().collect()
}

mod load {
    use super::*;

    #[test]
    fn store_starts_empty() {
        let store = store(TWO_RECORDS);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn load_publishes_snapshot() {
        let store = store(TWO_RECORDS);

        let report = store.load().unwrap();

        assert_eq!(report.records, 2);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("A"));
        assert!(snapshot.contains("B"));
        assert_eq!(
            snapshot.loaded_at(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(100)
        );
    }

    #[test]
    fn failed_load_keeps_previous_snapshot() {
        let store = store(TWO_RECORDS);
        store.load().unwrap();
        let before = store.snapshot();

        store.source().make_unreadable();
        let result = store.load();

        assert!(matches!(result, Err(TableError::Open { .. })));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn initial_load_failure_leaves_store_empty() {
        let store = store(TWO_RECORDS);
        store.source().make_unreadable();

        assert!(store.load().is_err());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn each_load_stamps_a_new_time() {
        let store = store(TWO_RECORDS);
        store.load().unwrap();
        let first = store.snapshot().loaded_at();

        store.clock.advance(5);
        store.load().unwrap();

        assert_eq!(
            store.snapshot().loaded_at().duration_since(first).unwrap(),
            Duration::from_secs(5)
        );
    }
}

mod reload {
    use super::*;

    #[test]
    fn edited_body_reports_only_that_key() {
        let store = store(TWO_RECORDS);
        store.load().unwrap();

        store.source().set(
            "Destination: A\n  NextHop: 10.0.0.1\nDestination: B\n  NextHop: 10.9.9.9\n",
        );
        let report = store.reload().unwrap();

        assert_eq!(changed(&report), ["B"]);
        assert_eq!(report.records, 2);
    }

    #[test]
    fn removed_and_added_keys_are_reported() {
        let store = store(TWO_RECORDS);
        store.load().unwrap();

        store.source().set(
            "Destination: B\n  NextHop: 10.0.0.2\nDestination: C\n  NextHop: 10.0.0.3\n",
        );
        let report = store.reload().unwrap();

        assert_eq!(report.changes.len(), 2);
        assert!(report.changes.contains("A"));
        assert!(report.changes.contains("C"));
    }

    #[test]
    fn identical_content_reports_nothing_but_still_publishes() {
        let store = store(TWO_RECORDS);
        store.load().unwrap();
        let before = store.snapshot();

        let report = store.reload().unwrap();

        assert!(report.changes.is_empty());
        assert!(!Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(*before, *store.snapshot());
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot_for_next_diff() {
        let store = store(TWO_RECORDS);
        store.load().unwrap();

        store.source().make_unreadable();
        assert!(store.reload().is_err());
        assert_eq!(store.snapshot().len(), 2);

        store.source().set("Destination: A\n  NextHop: 10.0.0.1\n");
        let report = store.reload().unwrap();

        assert_eq!(changed(&report), ["B"]);
    }

    #[test]
    fn reload_before_load_reports_everything_as_changed() {
        let store = store(TWO_RECORDS);

        let report = store.reload().unwrap();

        assert_eq!(changed(&report), ["A", "B"]);
    }

    #[test]
    fn report_carries_stamp_of_replaced_snapshot() {
        let store = store(TWO_RECORDS);
        store.load().unwrap();

        store.clock.advance(30);
        let first = store.reload().unwrap();
        store.clock.advance(7);
        let second = store.reload().unwrap();

        assert_eq!(first.since, SystemTime::UNIX_EPOCH + Duration::from_secs(100));
        assert_eq!(second.since, SystemTime::UNIX_EPOCH + Duration::from_secs(130));
    }

    #[test]
    fn consecutive_reloads_diff_against_latest() {
        let store = store(TWO_RECORDS);
        store.load().unwrap();

        store.source().set("Destination: A\n  NextHop: 10.0.0.1\n");
        assert_eq!(changed(&store.reload().unwrap()), ["B"]);

        store.source().set(TWO_RECORDS);
        assert_eq!(changed(&store.reload().unwrap()), ["B"]);

        assert!(store.reload().unwrap().changes.is_empty());
    }
}

mod concurrency {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    fn versioned(version: usize, count: usize) -> String {
        (0..count)
            .map(|i| format!("Destination: r{i}\n  Version: {version}\n"))
            .collect()
    }

    #[test]
    fn readers_never_observe_a_mixed_snapshot() {
        let store = Arc::new(store(&versioned(0, 50)));
        store.load().unwrap();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for version in 1..=20 {
                    store.source().set(&versioned(version, 50 + version));
                    store.reload().unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = store.snapshot();
                        let version = snapshot.len() - 50;
                        let marker = format!("Version: {version}");
                        assert!(snapshot.records().all(|r| r.content.contains(&marker)));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.snapshot().len(), 70);
    }

    #[test]
    fn overlapping_reloads_are_serialized() {
        let source = SlowSource {
            inner: MemorySource::new(TWO_RECORDS),
            delay: Duration::from_millis(100),
        };
        let store = Arc::new(RecordStore::with_clock(
            source,
            Chunker::default(),
            MockClock::new(100),
        ));
        store.load().unwrap();
        store.source().inner.set("Destination: C\n  NextHop: 10.0.0.3\n");

        let start = Arc::new(Barrier::new(2));
        let cycles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    store.reload().unwrap()
                })
            })
            .collect();

        let mut reports: Vec<ReloadReport> =
            cycles.into_iter().map(|cycle| cycle.join().unwrap()).collect();
        reports.sort_by_key(|report| report.changes.len());

        // The later cycle diffs against what the earlier one published
        assert!(reports[0].changes.is_empty());
        assert_eq!(changed(&reports[1]), ["A", "B", "C"]);
        assert_eq!(store.snapshot().len(), 1);
    }
}

mod file_backed {
    use super::*;

    #[test]
    fn rewrite_scenarios_report_expected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.txt");
        std::fs::write(&path, TWO_RECORDS).unwrap();

        let store = RecordStore::new(FileSource::new(&path), Chunker::default());
        assert_eq!(store.load().unwrap().records, 2);

        std::fs::write(
            &path,
            "Destination: A\n  NextHop: 10.0.0.1\nDestination: B\n  NextHop: 10.0.0.9\n",
        )
        .unwrap();
        assert_eq!(changed(&store.reload().unwrap()), ["B"]);

        std::fs::write(
            &path,
            "Destination: B\n  NextHop: 10.0.0.9\nDestination: C\n  NextHop: 10.0.0.3\n",
        )
        .unwrap();
        assert_eq!(changed(&store.reload().unwrap()), ["A", "C"]);

        std::fs::write(
            &path,
            "Destination: B\n  NextHop: 10.0.0.9\nDestination: C\n  NextHop: 10.0.0.3\n",
        )
        .unwrap();
        assert!(store.reload().unwrap().changes.is_empty());
    }

    #[test]
    fn file_briefly_absent_keeps_known_good_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.txt");
        std::fs::write(&path, TWO_RECORDS).unwrap();

        let store = RecordStore::new(FileSource::new(&path), Chunker::default());
        store.load().unwrap();

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(store.reload(), Err(TableError::Open { .. })));
        assert_eq!(store.snapshot().len(), 2);

        std::fs::write(&path, TWO_RECORDS).unwrap();
        assert!(store.reload().unwrap().changes.is_empty());
    }
}
