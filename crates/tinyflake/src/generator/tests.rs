use crate::{Error, IdAllocator, IdGenStatus, TimeSource, TinyflakeId, WallClock};
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Mutex;
use std::thread::scope;

struct MockTime {
    millis: u64,
}

impl TimeSource<u64> for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock whose reading the test moves explicitly.
#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl TimeSource<u64> for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

/// A clock that advances one scripted value per read and then sticks at the
/// last one.
struct ScriptedTime {
    values: Vec<u64>,
    reads: Cell<usize>,
}

impl ScriptedTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            values,
            reads: Cell::new(0),
        }
    }
}

impl TimeSource<u64> for ScriptedTime {
    fn current_millis(&self) -> u64 {
        let read = self.reads.get();
        self.reads.set(read + 1);
        self.values[read.min(self.values.len() - 1)]
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> TinyflakeId;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> TinyflakeId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn initialized<T: TimeSource<u64>>(time: T, worker_id: i64) -> IdAllocator<T> {
    let allocator = IdAllocator::new(time);
    allocator.initialize(worker_id).unwrap();
    allocator
}

#[test]
fn sequence_increments_within_same_tick() {
    let allocator = initialized(MockTime { millis: 42 }, 5);

    let id1 = allocator.allocate_id().unwrap();
    let id2 = allocator.allocate_id().unwrap();
    let id3 = allocator.allocate_id().unwrap();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert_eq!(id1.worker_id(), 5);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn composed_id_matches_layout() {
    let allocator = initialized(MockTime { millis: 1000 }, 5);
    for _ in 0..3 {
        allocator.allocate_id().unwrap();
    }
    let id = allocator.allocate_id().unwrap();
    assert_eq!(id.sequence(), 3);
    assert_eq!(id.to_raw(), (1000 << 24) | (5 << 16) | (3 << 10));
}

#[test]
fn uninitialized_allocator_fails() {
    let allocator = IdAllocator::new(MockTime { millis: 42 });
    assert!(!allocator.is_initialized());
    assert_eq!(allocator.worker_id(), None);
    assert_eq!(allocator.allocate_id(), Err(Error::Uninitialized));
    assert_eq!(allocator.try_poll_id(), Err(Error::Uninitialized));
}

#[test]
fn out_of_range_worker_id_is_rejected_without_state_change() {
    let allocator = IdAllocator::new(MockTime { millis: 42 });
    for worker_id in [-1, 256, i64::MIN, i64::MAX] {
        assert_eq!(
            allocator.initialize(worker_id),
            Err(Error::InvalidArgument { worker_id })
        );
    }
    assert!(!allocator.is_initialized());
    assert_eq!(allocator.allocate_id(), Err(Error::Uninitialized));

    allocator.initialize(255).unwrap();
    assert_eq!(allocator.allocate_id().unwrap().worker_id(), 255);
}

#[test]
fn second_initialize_keeps_first_worker_id() {
    let allocator = initialized(MockTime { millis: 42 }, 3);
    assert_eq!(allocator.initialize(9), Ok(()));
    assert_eq!(allocator.worker_id(), Some(3));
    assert_eq!(allocator.allocate_id().unwrap().worker_id(), 3);

    // The range check still applies after initialization.
    assert_eq!(
        allocator.initialize(300),
        Err(Error::InvalidArgument { worker_id: 300 })
    );
    assert_eq!(allocator.worker_id(), Some(3));
}

#[test]
fn poll_returns_pending_when_sequence_exhausted() {
    let shared_time = SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values: vec![42, 43],
            index: Cell::new(0),
        }),
    };
    let allocator = initialized(shared_time.clone(), 1);

    for i in 0..=TinyflakeId::max_sequence() {
        let id = allocator.try_poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }

    assert_eq!(allocator.try_poll_id().unwrap().unwrap_pending(), 1);
    assert_eq!(allocator.try_poll_id().unwrap().unwrap_pending(), 1);

    shared_time.clock.index.set(1);

    let id = allocator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn allocate_spins_into_next_millisecond_when_exhausted() {
    // 64 reads fill millisecond 42, the 65th allocation reads 42 once more,
    // spins through two more 42s and lands on 43.
    let mut values = vec![42; 64 + 3];
    values.push(43);
    let allocator = initialized(ScriptedTime::new(values), 1);

    for i in 0..=TinyflakeId::max_sequence() {
        let id = allocator.allocate_id().unwrap();
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.sequence(), i);
    }

    let id = allocator.allocate_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn backward_clock_continues_last_timestamp() {
    let allocator = initialized(ScriptedTime::new(vec![100, 100, 90, 90, 101]), 2);

    let ids: Vec<_> = (0..5).map(|_| allocator.allocate_id().unwrap()).collect();
    let fields: Vec<_> = ids.iter().map(|id| (id.timestamp(), id.sequence())).collect();
    assert_eq!(fields, vec![(100, 0), (100, 1), (100, 2), (100, 3), (101, 0)]);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn backward_clock_with_exhausted_sequence_waits_for_last_timestamp() {
    let mut values = vec![50; 64];
    values.extend([40, 40, 45, 50, 51]);
    let allocator = initialized(ScriptedTime::new(values), 2);

    for _ in 0..=TinyflakeId::max_sequence() {
        assert_eq!(allocator.allocate_id().unwrap().timestamp(), 50);
    }

    let id = allocator.allocate_id().unwrap();
    assert_eq!(id.timestamp(), 51);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn poll_with_backward_clock_reports_distance_to_last_timestamp() {
    let mut values = vec![50; 64];
    values.push(47);
    let allocator = initialized(ScriptedTime::new(values), 2);

    for _ in 0..=TinyflakeId::max_sequence() {
        allocator.try_poll_id().unwrap().unwrap_ready();
    }
    assert_eq!(allocator.try_poll_id().unwrap().unwrap_pending(), 4);
}

#[test]
fn poll_with_backward_clock_uses_remaining_sequence() {
    let allocator = initialized(ScriptedTime::new(vec![50, 49]), 2);

    let first = allocator.try_poll_id().unwrap().unwrap_ready();
    let second = allocator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!((second.timestamp(), second.sequence()), (50, 1));
    assert!(first < second);
}

#[test]
fn wall_clock_ids_are_monotonic() {
    let allocator = initialized(WallClock::default(), 1);
    let mut last_timestamp = 0;
    let mut sequence = 0;
    let mut last_id = None;

    for _ in 0..4096 * 16 {
        let id = allocator.allocate_id().unwrap();
        let ts = id.timestamp();
        if ts > last_timestamp {
            sequence = 0;
        }

        assert!(ts >= last_timestamp);
        assert_eq!(id.worker_id(), 1);
        assert_eq!(id.sequence(), sequence);
        assert_eq!(id.reserved(), 0);
        assert!(last_id.is_none_or(|last| last < id));

        last_timestamp = ts;
        last_id = Some(id);
        sequence += 1;
    }
}

#[test]
fn wall_clock_ids_are_unique_across_threads() {
    const IDS_PER_THREAD: usize = 4096;
    let threads = num_cpus::get().clamp(2, 8);
    let total_ids = threads * IDS_PER_THREAD;

    let allocator = initialized(WallClock::default(), 0);
    let seen_ids = Mutex::new(HashSet::with_capacity(total_ids));

    scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                for _ in 0..IDS_PER_THREAD {
                    local.push(allocator.allocate_id().unwrap());
                }
                // Calls from one thread are serialized, so its own IDs must
                // strictly increase.
                assert!(local.windows(2).all(|w| w[0] < w[1]));

                let mut set = seen_ids.lock().unwrap();
                for id in local {
                    assert!(set.insert(id), "duplicate id {id:?}");
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, total_ids, "Expected {total_ids} unique IDs");
}

#[test]
fn concurrent_initialize_has_single_winner() {
    const THREADS: i64 = 16;
    let allocator = IdAllocator::new(WallClock::default());

    scope(|s| {
        for worker_id in 0..THREADS {
            let allocator = &allocator;
            s.spawn(move || allocator.initialize(worker_id).unwrap());
        }
    });

    let winner = allocator.worker_id().unwrap();
    assert!(winner < THREADS as u64);
    for _ in 0..128 {
        assert_eq!(allocator.allocate_id().unwrap().worker_id(), winner);
    }
}

#[test]
fn clock_stuck_at_epoch_starts_at_sequence_zero() {
    // A host clock before the epoch reads as 0, the same value the state
    // starts from.
    let allocator = initialized(MockTime { millis: 0 }, 4);

    let first = allocator.allocate_id().unwrap();
    let second = allocator.allocate_id().unwrap();
    assert_eq!((first.timestamp(), first.sequence()), (0, 0));
    assert_eq!((second.timestamp(), second.sequence()), (0, 1));

    let polled = initialized(MockTime { millis: 0 }, 4);
    let id = polled.try_poll_id().unwrap().unwrap_ready();
    assert_eq!((id.timestamp(), id.sequence()), (0, 0));
}

#[cfg(feature = "tracing")]
#[test]
fn backward_clock_is_traced_on_both_paths() {
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let allocator = initialized(ScriptedTime::new(vec![100, 90]), 2);
        allocator.allocate_id().unwrap();
        allocator.allocate_id().unwrap();

        let polled = initialized(ScriptedTime::new(vec![100, 90]), 2);
        polled.try_poll_id().unwrap().unwrap_ready();
        polled.try_poll_id().unwrap().unwrap_ready();
    });

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert_eq!(
        output.matches("clock moved backward").count(),
        2,
        "unexpected log output:\n{output}"
    );
}
