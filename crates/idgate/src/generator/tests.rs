use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Mutex;
use std::thread::scope;

use crate::{
    AtomicIdGenerator, Error, IdGenStatus, IdGenerator, Identifier, LockIdGenerator, NodeId,
    SystemClock, TimeSource,
};

#[derive(Clone)]
struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Returns `values[index]`; tests move the index to step time around.
#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl SharedMockStepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            clock: Rc::new(MockStepTime {
                values,
                index: Cell::new(0),
            }),
        }
    }

    fn step_to(&self, index: usize) {
        self.clock.index.set(index);
    }
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

/// Reports `start` for the first `reads` calls, then `start + 1`.
struct AdvanceAfterReads {
    start: u64,
    reads: u64,
    seen: Cell<u64>,
}

impl TimeSource for AdvanceAfterReads {
    fn current_millis(&self) -> u64 {
        let seen = self.seen.get();
        self.seen.set(seen + 1);
        if seen < self.reads { self.start } else { self.start + 1 }
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> Identifier;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> Identifier {
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

fn node(value: u64) -> NodeId {
    NodeId::new(value).unwrap()
}

fn run_id_sequence_increments_within_same_tick<G, T>(generator: &G)
where
    G: IdGenerator<T>,
    T: TimeSource,
{
    let id1 = generator.try_poll_id().unwrap().unwrap_ready();
    let id2 = generator.try_poll_id().unwrap().unwrap_ready();
    let id3 = generator.try_poll_id().unwrap().unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_generator_returns_pending_when_sequence_exhausted<G, T>(generator: &G)
where
    G: IdGenerator<T>,
    T: TimeSource,
{
    let yield_for = generator.try_poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 1);
}

fn run_generator_handles_rollover<G, T>(generator: &G, shared_time: &SharedMockStepTime)
where
    G: IdGenerator<T>,
    T: TimeSource,
{
    for i in 0..=Identifier::max_sequence() {
        let id = generator.try_poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }

    let yield_for = generator.try_poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 1);

    shared_time.step_to(1);

    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

fn run_generator_rejects_clock_rollback<G, T>(generator: &G, shared_time: &SharedMockStepTime)
where
    G: IdGenerator<T>,
    T: TimeSource,
{
    let first = generator.generate().unwrap();
    assert_eq!(first.timestamp(), 50);

    shared_time.step_to(1);
    assert_eq!(
        generator.try_poll_id(),
        Err(Error::ClockRollback { now: 40, last: 50 })
    );
    assert_eq!(
        generator.generate(),
        Err(Error::ClockRollback { now: 40, last: 50 })
    );

    // state untouched: same millisecond continues where it left off
    shared_time.step_to(2);
    let second = generator.generate().unwrap();
    assert_eq!(second.timestamp(), 50);
    assert_eq!(second.sequence(), first.sequence() + 1);

    shared_time.step_to(3);
    let third = generator.generate().unwrap();
    assert_eq!(third.timestamp(), 51);
    assert_eq!(third.sequence(), 0);
    assert!(first < second && second < third);
}

fn run_generate_waits_for_next_millisecond<G, T>(generator: &G)
where
    G: IdGenerator<T>,
    T: TimeSource,
{
    let id = generator.generate().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(id.node_id(), 7);
}

fn run_generator_rejects_timestamp_overflow<G, T>(generator: &G)
where
    G: IdGenerator<T>,
    T: TimeSource,
{
    assert_eq!(
        generator.generate(),
        Err(Error::TimestampOverflow {
            now: Identifier::max_timestamp() + 1
        })
    );
}

fn run_generator_monotonic<G, T>(generator: &G)
where
    G: IdGenerator<T>,
    T: TimeSource,
{
    const TOTAL_IDS: usize = 4096 * 64;

    let mut last = generator.generate().unwrap();
    for _ in 0..TOTAL_IDS {
        let id = generator.generate().unwrap();
        assert!(id > last, "{id} not after {last}");
        assert!(id.to_i64() > last.to_i64());
        assert_eq!(id.node_id(), 1);
        if id.timestamp() == last.timestamp() {
            assert_eq!(id.sequence(), last.sequence() + 1);
        } else {
            assert_eq!(id.sequence(), 0);
        }
        last = id;
    }
}

fn run_generator_unique_threaded<G>(generator: G)
where
    G: IdGenerator<SystemClock> + Sync,
{
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 4096 * 8;

    let threads = num_cpus::get().clamp(2, THREADS);
    let seen_ids = Mutex::new(HashSet::with_capacity(threads * IDS_PER_THREAD));

    scope(|s| {
        for _ in 0..threads {
            let generator = &generator;
            let seen_ids = &seen_ids;
            s.spawn(move || {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                for _ in 0..IDS_PER_THREAD {
                    local.push(generator.generate().unwrap());
                }
                // each caller observes strictly increasing identifiers
                assert!(local.windows(2).all(|w| w[0] < w[1]));
                let mut seen = seen_ids.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate id {id}");
                }
            });
        }
    });

    assert_eq!(seen_ids.into_inner().unwrap().len(), threads * IDS_PER_THREAD);
}

#[test]
fn lock_generator_sequence_increments_within_same_tick() {
    let generator = LockIdGenerator::new(node(0), MockTime { millis: 42 });
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn atomic_generator_sequence_increments_within_same_tick() {
    let generator = AtomicIdGenerator::new(node(0), MockTime { millis: 42 });
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn lock_generator_pending_when_sequence_exhausted() {
    let generator = LockIdGenerator::from_components(
        0,
        node(0),
        Identifier::max_sequence(),
        MockTime { millis: 0 },
    )
    .unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn atomic_generator_pending_when_sequence_exhausted() {
    let generator = AtomicIdGenerator::from_components(
        0,
        node(0),
        Identifier::max_sequence(),
        MockTime { millis: 0 },
    )
    .unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn lock_generator_handles_rollover() {
    let time = SharedMockStepTime::new(vec![42, 43]);
    let generator = LockIdGenerator::new(node(0), time.clone());
    run_generator_handles_rollover(&generator, &time);
}

#[test]
fn atomic_generator_handles_rollover() {
    let time = SharedMockStepTime::new(vec![42, 43]);
    let generator = AtomicIdGenerator::new(node(0), time.clone());
    run_generator_handles_rollover(&generator, &time);
}

#[test]
fn lock_generator_rejects_clock_rollback() {
    let time = SharedMockStepTime::new(vec![50, 40, 50, 51]);
    let generator = LockIdGenerator::new(node(3), time.clone());
    run_generator_rejects_clock_rollback(&generator, &time);
}

#[test]
fn atomic_generator_rejects_clock_rollback() {
    let time = SharedMockStepTime::new(vec![50, 40, 50, 51]);
    let generator = AtomicIdGenerator::new(node(3), time.clone());
    run_generator_rejects_clock_rollback(&generator, &time);
}

#[test]
fn lock_generator_waits_for_next_millisecond() {
    let time = AdvanceAfterReads {
        start: 42,
        reads: 5,
        seen: Cell::new(0),
    };
    let generator =
        LockIdGenerator::from_components(42, node(7), Identifier::max_sequence(), time).unwrap();
    run_generate_waits_for_next_millisecond(&generator);
}

#[test]
fn atomic_generator_waits_for_next_millisecond() {
    let time = AdvanceAfterReads {
        start: 42,
        reads: 5,
        seen: Cell::new(0),
    };
    let generator =
        AtomicIdGenerator::from_components(42, node(7), Identifier::max_sequence(), time).unwrap();
    run_generate_waits_for_next_millisecond(&generator);
}

#[test]
fn lock_generator_rejects_timestamp_overflow() {
    let time = MockTime {
        millis: Identifier::max_timestamp() + 1,
    };
    run_generator_rejects_timestamp_overflow(&LockIdGenerator::new(node(0), time));
}

#[test]
fn atomic_generator_rejects_timestamp_overflow() {
    let time = MockTime {
        millis: Identifier::max_timestamp() + 1,
    };
    run_generator_rejects_timestamp_overflow(&AtomicIdGenerator::new(node(0), time));
}

#[test]
fn lock_generator_monotonic() {
    let generator = LockIdGenerator::new(node(1), SystemClock::default());
    run_generator_monotonic(&generator);
}

#[test]
fn atomic_generator_monotonic() {
    let generator = AtomicIdGenerator::new(node(1), SystemClock::default());
    run_generator_monotonic(&generator);
}

#[test]
fn lock_generator_unique_threaded() {
    run_generator_unique_threaded(LockIdGenerator::new(node(1), SystemClock::default()));
}

#[test]
fn atomic_generator_unique_threaded() {
    run_generator_unique_threaded(AtomicIdGenerator::new(node(1), SystemClock::default()));
}

#[test]
fn lock_generator_clones_share_state() {
    let generator = LockIdGenerator::new(node(9), MockTime { millis: 42 });
    let clone = generator.clone();
    let a = generator.generate().unwrap();
    let b = clone.generate().unwrap();
    assert_eq!(b.sequence(), a.sequence() + 1);
    assert_eq!(clone.node_id(), node(9));
}

#[test]
fn independent_generators_do_not_share_state() {
    let a = LockIdGenerator::new(node(1), MockTime { millis: 42 });
    let b = LockIdGenerator::new(node(2), MockTime { millis: 42 });
    let id_a = a.generate().unwrap();
    let id_b = b.generate().unwrap();
    assert_eq!(id_a.sequence(), 0);
    assert_eq!(id_b.sequence(), 0);
    assert_ne!(id_a, id_b);
}

fn run_restore_rejects_out_of_range_state<G>(
    restore: impl Fn(u64, NodeId, u64) -> crate::Result<G>,
) where
    G: IdGenerator<MockTime>,
{
    assert_eq!(
        restore(0, node(0), Identifier::max_sequence() + 1).err(),
        Some(Error::InvalidSequence {
            value: Identifier::max_sequence() + 1
        })
    );
    assert_eq!(
        restore(Identifier::max_timestamp() + 1, node(0), 0).err(),
        Some(Error::TimestampOverflow {
            now: Identifier::max_timestamp() + 1
        })
    );

    // a valid restore continues after the saved identifier
    let generator = restore(42, node(5), 7).unwrap();
    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 42);
    assert_eq!(id.sequence(), 8);
    assert_eq!(id.node_id(), 5);
}

#[test]
fn lock_generator_restore_rejects_out_of_range_state() {
    run_restore_rejects_out_of_range_state(|ts, node_id, seq| {
        LockIdGenerator::from_components(ts, node_id, seq, MockTime { millis: 42 })
    });
}

#[test]
fn atomic_generator_restore_rejects_out_of_range_state() {
    run_restore_rejects_out_of_range_state(|ts, node_id, seq| {
        AtomicIdGenerator::from_components(ts, node_id, seq, MockTime { millis: 42 })
    });
}

#[test]
fn from_host_generators_share_node_and_clock() {
    let lock = LockIdGenerator::from_host();
    let atomic = AtomicIdGenerator::from_host();
    assert_eq!(lock.node_id(), NodeId::from_host());
    assert_eq!(atomic.node_id(), lock.node_id());

    let a = lock.generate().unwrap();
    let b = atomic.generate().unwrap();
    assert_eq!(a.node_id(), b.node_id());
    assert!(a.timestamp().abs_diff(b.timestamp()) < 1_000);
}

#[test]
fn unix_millis_matches_wall_clock_for_custom_epoch() {
    let clock = SystemClock::with_epoch(core::time::Duration::from_millis(1_600_000_000_000));
    let generator = LockIdGenerator::new(node(1), clock);
    let before = unix_now_millis();
    let id = generator.generate().unwrap();
    let after = unix_now_millis();

    let minted = id.unix_millis(clock.epoch());
    assert!(before <= minted && minted <= after, "{before} <= {minted} <= {after}");
}

fn unix_now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
