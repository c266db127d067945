//! # Integration Tests
//!
//! Cross-crate tests for the scribe.
//!
//! Covers:
//! - Mutual exclusion and routing under real thread contention
//! - Shutdown while producers are still submitting
//! - The two-writer grid scenario, end to end from a session file

#[cfg(test)]
mod contract_tests {
    use contracts::{ConfigVersion, Edit, EditEvent, SessionBlueprint};

    #[test]
    fn test_session_defaults_from_json() {
        let json = r#"{
            "producers": [{
                "name": "writer",
                "edits": [
                    { "id": 4, "event": "add", "row": 1, "col": 2, "character": 65, "timestamp": 9 },
                    { "id": 5, "event": "delete", "row": 1, "col": 2 }
                ]
            }]
        }"#;

        let session: SessionBlueprint = serde_json::from_str(json).unwrap();
        assert_eq!(session.version, ConfigVersion::V1);
        assert_eq!(session.scribe.name, "scribe");
        assert_eq!(session.scribe.lock_timeout_ms, None);
        assert_eq!((session.grid.row_width, session.grid.capacity), (10, 41));

        let edits = &session.producers[0].edits;
        assert_eq!(edits[0], Edit::add(4, 1, 2, 'A' as u32, 9));
        assert_eq!(edits[1].event, EditEvent::Delete);
        assert_eq!((edits[1].character, edits[1].timestamp), (0, 0));
    }

    #[test]
    fn test_session_survives_json_round_trip() {
        let mut session: SessionBlueprint =
            serde_json::from_str(r#"{ "producers": [{ "name": "a" }] }"#).unwrap();
        session.scribe.lock_timeout_ms = Some(30);
        session.producers[0].edits.push(Edit::delete(7, 3, 3, -1));

        let encoded = serde_json::to_string(&session).unwrap();
        assert!(encoded.contains(r#""event":"delete""#), "got: {encoded}");

        let decoded: SessionBlueprint = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.scribe, session.scribe);
        assert_eq!(decoded.producers[0].edits, session.producers[0].edits);
    }
}

#[cfg(test)]
mod scribe_tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    use contracts::{Edit, EditEvent};
    use parking_lot::Mutex;
    use scribe::{FnSink, Scribe, ScribeError};

    const THREADS: usize = 8;
    const EDITS_PER_THREAD: usize = 500;

    fn counting_sink(calls: Arc<AtomicUsize>) -> impl contracts::EditSink {
        let deletes = Arc::clone(&calls);
        FnSink::new(
            "counting",
            move |_: Edit| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            },
            move |_: Edit| {
                deletes.fetch_add(1, Ordering::SeqCst);
                true
            },
        )
    }

    /// Sink calls never overlap, checked with a logical clock
    #[test]
    fn test_mutual_exclusion_under_contention() {
        let clock = Arc::new(AtomicU64::new(0));
        let inside = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let intervals = Arc::new(Mutex::new(Vec::new()));

        let record = {
            let (clock, inside, overlaps, intervals) = (
                Arc::clone(&clock),
                Arc::clone(&inside),
                Arc::clone(&overlaps),
                Arc::clone(&intervals),
            );
            move || {
                let entered = clock.fetch_add(1, Ordering::SeqCst);
                if inside.swap(true, Ordering::SeqCst) {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                std::hint::spin_loop();
                inside.store(false, Ordering::SeqCst);
                let exited = clock.fetch_add(1, Ordering::SeqCst);
                intervals.lock().push((entered, exited));
                true
            }
        };
        let on_add = record.clone();
        let on_delete = record;
        let sink = FnSink::new("recorder", move |_: Edit| on_add(), move |_: Edit| on_delete());
        let scribe = Scribe::open(sink).unwrap();

        thread::scope(|s| {
            for t in 0..THREADS {
                let scribe = &scribe;
                s.spawn(move || {
                    for i in 0..EDITS_PER_THREAD {
                        let edit = if i % 3 == 0 {
                            Edit::delete(t, t, i, 0)
                        } else {
                            Edit::add(t, t, i, 'x' as u32, 0)
                        };
                        scribe.submit(edit).unwrap();
                    }
                });
            }
        });
        scribe.close();

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);

        let mut intervals = intervals.lock().clone();
        assert_eq!(intervals.len(), THREADS * EDITS_PER_THREAD);
        intervals.sort_unstable();
        for pair in intervals.windows(2) {
            assert!(
                pair[0].1 < pair[1].0,
                "overlapping sink calls: {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    /// Each edit reaches the matching capability with every field intact
    #[test]
    fn test_routing_preserves_fields() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (adds, deletes) = (Arc::clone(&seen), Arc::clone(&seen));
        let sink = FnSink::new(
            "recorder",
            move |e: Edit| {
                adds.lock().push(("add", e));
                true
            },
            move |e: Edit| {
                deletes.lock().push(("delete", e));
                true
            },
        );
        let scribe = Scribe::open(sink).unwrap();

        let add = Edit::add(17, 3, 9, 'Z' as u32, 1_234_567);
        let delete = Edit {
            id: 18,
            event: EditEvent::Delete,
            row: 4,
            col: 2,
            character: 'q' as u32,
            timestamp: -5,
        };
        scribe.submit(add).unwrap();
        scribe.submit(delete).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.as_slice(), &[("add", add), ("delete", delete)]);
    }

    /// K producers x M edits before close -> exactly K*M sink calls
    #[test]
    fn test_no_lost_or_duplicated_submissions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scribe = Scribe::open(counting_sink(Arc::clone(&calls))).unwrap();

        thread::scope(|s| {
            for t in 0..THREADS {
                let scribe = &scribe;
                s.spawn(move || {
                    for i in 0..EDITS_PER_THREAD {
                        scribe.submit(Edit::add(i, t, i, 0, 0)).unwrap();
                    }
                });
            }
        });
        scribe.close();

        let expected = THREADS * EDITS_PER_THREAD;
        assert_eq!(calls.load(Ordering::SeqCst), expected);
        let metrics = scribe.metrics();
        assert_eq!(metrics.applied, expected as u64);
        assert_eq!(metrics.submitted, expected as u64);
    }

    /// Producers hammering the scribe while it closes never reach the sink
    /// afterwards, and once a producer sees `Closed` it keeps seeing it
    #[test]
    fn test_post_close_rejection_storm() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scribe = Scribe::open(counting_sink(Arc::clone(&calls))).unwrap();
        let calls_at_close = AtomicUsize::new(usize::MAX);

        thread::scope(|s| {
            let mut producers = Vec::new();
            for t in 0..THREADS {
                let scribe = &scribe;
                producers.push(s.spawn(move || {
                    let mut closed_seen = 0;
                    let mut i = 0;
                    while closed_seen < 200 {
                        match scribe.submit(Edit::add(i, t, i, 0, 0)) {
                            Ok(()) => assert_eq!(closed_seen, 0, "accepted after Closed"),
                            Err(ScribeError::Closed { .. }) => closed_seen += 1,
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                        i += 1;
                    }
                }));
            }

            while calls.load(Ordering::SeqCst) < 1_000 {
                thread::yield_now();
            }
            scribe.close();
            calls_at_close.store(calls.load(Ordering::SeqCst), Ordering::SeqCst);

            for producer in producers {
                producer.join().unwrap();
            }
        });

        assert!(scribe.is_closed());
        assert_eq!(
            calls.load(Ordering::SeqCst),
            calls_at_close.load(Ordering::SeqCst)
        );
        assert!(scribe.metrics().rejected_closed >= (THREADS * 200) as u64);
    }

    #[test]
    fn test_close_twice_then_submit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let scribe = Scribe::open(counting_sink(Arc::clone(&calls))).unwrap();

        scribe.close();
        scribe.close();
        let err = scribe.submit(Edit::add(1, 0, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, ScribeError::Closed { .. }));
        scribe.close();

        assert!(scribe.is_closed());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// `close` waits for the sink call already in progress
    #[test]
    fn test_close_waits_for_in_flight_dispatch() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let finished = Arc::new(AtomicBool::new(false));
        let finished_in_sink = Arc::clone(&finished);

        let sink = FnSink::new(
            "slow",
            move |_: Edit| {
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(100));
                finished_in_sink.store(true, Ordering::SeqCst);
                true
            },
            |_: Edit| true,
        );
        let scribe = Scribe::open(sink).unwrap();

        thread::scope(|s| {
            let producer = s.spawn(|| scribe.submit(Edit::add(1, 0, 0, 0, 0)));

            entered_rx.recv().unwrap();
            scribe.close();
            assert!(finished.load(Ordering::SeqCst), "close returned mid-dispatch");

            assert!(producer.join().unwrap().is_ok());
        });
    }

    /// A timed submit gives up while another producer holds the section
    #[test]
    fn test_timed_submit_under_contention() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let sink = FnSink::new(
            "slow",
            move |_: Edit| {
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(200));
                true
            },
            |_: Edit| true,
        );
        let scribe = Scribe::open(sink).unwrap();

        thread::scope(|s| {
            let holder = s.spawn(|| scribe.submit(Edit::add(1, 0, 0, 0, 0)));
            entered_rx.recv().unwrap();

            let err = scribe
                .submit_timeout(Edit::delete(2, 0, 0, 0), Duration::from_millis(5))
                .unwrap_err();
            assert!(matches!(err, ScribeError::LockTimeout { .. }));

            assert!(holder.join().unwrap().is_ok());
        });
        assert_eq!(scribe.metrics().lock_timeouts, 1);
    }

    /// A panicking sink leaves the scribe usable and closable
    #[test]
    fn test_sink_panic_leaves_scribe_usable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adds = Arc::clone(&calls);
        let sink = FnSink::new(
            "flaky",
            move |e: Edit| {
                adds.fetch_add(1, Ordering::SeqCst);
                assert!(e.id != 1, "sink failure on edit 1");
                true
            },
            |_: Edit| true,
        );
        let scribe = Scribe::open(sink).unwrap();

        let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
            scribe.submit(Edit::add(1, 0, 0, 'x' as u32, 0))
        }));
        assert!(unwound.is_err());

        assert!(scribe.submit(Edit::add(2, 0, 1, 'y' as u32, 0)).is_ok());
        scribe.close();
        assert!(scribe.is_closed());

        let err = scribe.submit(Edit::add(3, 0, 2, 'z' as u32, 0)).unwrap_err();
        assert!(matches!(err, ScribeError::Closed { edit_id: 3, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Repeated close races: nothing reaches the sink after `close` returns
    /// and every submission is either applied or rejected as closed
    #[test]
    fn test_close_race_accounts_for_every_submission() {
        const ROUNDS: usize = 50;
        const PRODUCERS: usize = 4;
        const SUBMITS: usize = 200;

        for _ in 0..ROUNDS {
            let calls = Arc::new(AtomicUsize::new(0));
            let scribe = Scribe::open(counting_sink(Arc::clone(&calls))).unwrap();

            let calls_at_close = thread::scope(|s| {
                for t in 0..PRODUCERS {
                    let scribe = &scribe;
                    s.spawn(move || {
                        for i in 0..SUBMITS {
                            match scribe.submit(Edit::add(i, t, i, 0, 0)) {
                                Ok(()) | Err(ScribeError::Closed { .. }) => {}
                                Err(e) => panic!("unexpected error: {e}"),
                            }
                        }
                    });
                }
                thread::yield_now();
                scribe.close();
                calls.load(Ordering::SeqCst)
            });

            assert_eq!(calls.load(Ordering::SeqCst), calls_at_close);
            let metrics = scribe.metrics();
            assert_eq!(metrics.submitted, (PRODUCERS * SUBMITS) as u64);
            assert_eq!(metrics.applied + metrics.rejected_closed, metrics.submitted);
        }
    }
}

#[cfg(test)]
mod grid_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use contracts::{Edit, EditSink};
    use scribe::{Grid, GridSink, Scribe, ScribeError};

    const LIMIT: usize = 41;
    const ADD_ID: usize = 1;
    const DELETE_ID: usize = 2;
    const TIMESTAMP: i64 = 1_700_000_000;

    fn expected_addition() -> [u32; LIMIT] {
        let mut cells = [0u32; LIMIT];
        for col in 1..=10 {
            cells[10 + col] = 'A' as u32 + col as u32;
            cells[30 + col] = 'B' as u32 + col as u32;
        }
        cells
    }

    fn expected_deletion() -> [u32; LIMIT] {
        let mut cells = expected_addition();
        for index in [14, 15, 34, 35] {
            cells[index] = 0;
        }
        cells
    }

    /// Grid sink that also counts edits whose id/timestamp did not survive
    struct CheckedSink {
        inner: GridSink,
        mismatches: Arc<AtomicUsize>,
    }

    impl CheckedSink {
        fn check(&self, edit: &Edit, expected_id: usize) {
            if edit.id != expected_id || edit.timestamp != TIMESTAMP {
                self.mismatches.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    impl EditSink for CheckedSink {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn apply_add(&mut self, edit: Edit) -> bool {
            self.check(&edit, ADD_ID);
            self.inner.apply_add(edit)
        }

        fn apply_delete(&mut self, edit: Edit) -> bool {
            self.check(&edit, DELETE_ID);
            self.inner.apply_delete(edit)
        }
    }

    fn add_row(scribe: &Scribe<CheckedSink>, row: usize, base: char) {
        for col in 1..=10 {
            let edit = Edit::add(ADD_ID, row, col, base as u32 + col as u32, TIMESTAMP);
            scribe.submit(edit).unwrap();
        }
    }

    fn delete_pair(scribe: &Scribe<CheckedSink>, row: usize) {
        for col in 4..6 {
            scribe
                .submit(Edit::delete(DELETE_ID, row, col, TIMESTAMP))
                .unwrap();
        }
    }

    #[test]
    fn test_two_writers_fill_disjoint_rows() {
        let grid = Grid::new(10, LIMIT);
        let mismatches = Arc::new(AtomicUsize::new(0));
        let sink = CheckedSink {
            inner: GridSink::new("grid", grid.clone()),
            mismatches: Arc::clone(&mismatches),
        };
        let scribe = Scribe::open(sink).unwrap();

        thread::scope(|s| {
            s.spawn(|| add_row(&scribe, 1, 'A'));
            s.spawn(|| add_row(&scribe, 3, 'B'));
        });
        assert_eq!(grid.snapshot(), expected_addition());

        thread::scope(|s| {
            s.spawn(|| delete_pair(&scribe, 1));
            s.spawn(|| delete_pair(&scribe, 3));
        });
        assert_eq!(grid.snapshot(), expected_deletion());

        scribe.close();
        assert_eq!(mismatches.load(Ordering::SeqCst), 0);
        assert_eq!(scribe.metrics().applied, 24);
    }

    #[test]
    fn test_out_of_range_delete_changes_nothing() {
        let grid = Grid::new(10, LIMIT);
        let scribe = Scribe::open(GridSink::new("grid", grid.clone())).unwrap();
        for col in 0..10 {
            scribe
                .submit(Edit::add(ADD_ID, 2, col, 'a' as u32 + col as u32, 0))
                .unwrap();
        }
        let before = grid.snapshot();

        let err = scribe
            .submit(Edit::delete(DELETE_ID, 7, 3, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            ScribeError::ApplyFailed {
                edit_id: DELETE_ID,
                ..
            }
        ));
        assert_eq!(grid.snapshot(), before);

        // The scribe keeps serving after a rejected edit
        assert!(scribe.submit(Edit::delete(DELETE_ID, 2, 0, 0)).is_ok());
        assert_eq!(grid.get(20), Some(0));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::PathBuf;
    use std::thread;
    use std::time::Instant;

    use config_loader::ConfigLoader;
    use observability::SubmissionAggregator;
    use scribe::{Grid, GridSink, Scribe};

    fn demo_session() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/two_writers.toml")
    }

    /// Session file -> one thread per producer -> grid
    #[test]
    fn test_demo_session_replay() {
        let session = ConfigLoader::load_from_path(&demo_session()).unwrap();
        let grid = Grid::from_config(&session.grid);
        let scribe =
            Scribe::with_config(GridSink::new("grid", grid.clone()), session.scribe.clone())
                .unwrap();

        let aggregators: Vec<SubmissionAggregator> = thread::scope(|s| {
            let handles: Vec<_> = session
                .producers
                .iter()
                .map(|producer| {
                    let scribe = &scribe;
                    s.spawn(move || {
                        let mut agg = SubmissionAggregator::new();
                        for edit in &producer.edits {
                            let started = Instant::now();
                            let result = scribe.submit(*edit);
                            agg.update(&result, started.elapsed());
                        }
                        agg
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        scribe.close();

        let mut totals = SubmissionAggregator::new();
        for agg in &aggregators {
            totals.merge(agg);
        }
        assert_eq!(totals.count("success"), session.edit_count() as u64);

        let rendered = grid.render();
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows[1], ".BCDEFGHIJ");
        assert_eq!(rows[2], "K.........");
        assert_eq!(grid.get(11), Some('B' as u32));
        assert_eq!(grid.get(20), Some('K' as u32));
        assert_eq!(grid.get(31), Some('C' as u32));
        assert_eq!(grid.get(40), Some('L' as u32));
        assert_eq!(grid.get(10), Some(0));
    }
}
