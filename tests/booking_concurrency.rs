//! Concurrency scenarios against the in-memory store.
//!
//! Racing tasks load their snapshot, then wait on a shared barrier before
//! committing, so all writers in a round hold the same version. The
//! write-window scenarios hold booking inserts behind [`InterceptedStore`]
//! to land between the version bump and the insert.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Barrier, Semaphore};

use class_booking::adapters::{InMemorySessionStore, StoreSessionRepository};
use class_booking::application::{BookSessionCommand, BookSessionHandler};
use class_booking::domain::booking::{BookingError, DetectedBy, Session};
use class_booking::domain::foundation::{
    Category, Email, SessionId, SessionType, StartSlot, Weekday,
};
use class_booking::ports::{
    BookingRecord, SessionRecord, SessionRepository, SessionStore, StoreError, StoredItem,
    VersionBump,
};

fn session_id() -> SessionId {
    SessionId::from_parts("2024-12-09", Weekday::Mon, StartSlot::T1930).unwrap()
}

fn email(n: usize) -> Email {
    Email::new(format!("dancer{}@x.com", n)).unwrap()
}

async fn setup(max_spots: u32) -> (Arc<StoreSessionRepository>, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let repo = Arc::new(StoreSessionRepository::new(store.clone()));
    let session = Session::new(
        session_id(),
        SessionType::new(Category::Salsa, Some(1)).unwrap(),
        max_spots,
    )
    .unwrap();
    repo.create(&session).await.unwrap();
    (repo, store)
}

// ════════════════════════════════════════════════════════════════════════════
// Store wrapper
// ════════════════════════════════════════════════════════════════════════════

enum InsertMode {
    /// The first booking insert fails as if the store timed out.
    FailFirst(AtomicBool),
    /// Every booking insert reports its key, then waits for a permit.
    Gated {
        reached: mpsc::UnboundedSender<String>,
        gate: Semaphore,
    },
}

/// In-memory store whose booking inserts can fail or be held back.
struct InterceptedStore {
    inner: InMemorySessionStore,
    mode: InsertMode,
}

impl InterceptedStore {
    fn failing_first_insert() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
            mode: InsertMode::FailFirst(AtomicBool::new(false)),
        }
    }

    fn gated() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (reached, rx) = mpsc::unbounded_channel();
        let store = Self {
            inner: InMemorySessionStore::new(),
            mode: InsertMode::Gated {
                reached,
                gate: Semaphore::new(0),
            },
        };
        (store, rx)
    }

    /// Lets one held insert through, oldest first.
    fn release_one(&self) {
        if let InsertMode::Gated { gate, .. } = &self.mode {
            gate.add_permits(1);
        }
    }
}

#[async_trait]
impl SessionStore for InterceptedStore {
    async fn query_partition(&self, pk: &str) -> Result<Vec<StoredItem>, StoreError> {
        self.inner.query_partition(pk).await
    }

    async fn query_category_index(&self, index_pk: &str) -> Result<Vec<SessionRecord>, StoreError> {
        self.inner.query_category_index(index_pk).await
    }

    async fn insert_session_if_absent(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.inner.insert_session_if_absent(record).await
    }

    async fn update_session_if_version(&self, pk: &str, bump: &VersionBump) -> Result<(), StoreError> {
        self.inner.update_session_if_version(pk, bump).await
    }

    async fn put_booking_if_absent(&self, record: &BookingRecord) -> Result<(), StoreError> {
        match &self.mode {
            InsertMode::FailFirst(failed) => {
                if !failed.swap(true, Ordering::SeqCst) {
                    return Err(StoreError::Unavailable("timeout".to_string()));
                }
            }
            InsertMode::Gated { reached, gate } => {
                let _ = reached.send(record.sk.clone());
                gate.acquire()
                    .await
                    .map_err(|_| StoreError::Unavailable("gate closed".to_string()))?
                    .forget();
            }
        }
        self.inner.put_booking_if_absent(record).await
    }
}

async fn setup_on(store: Arc<InterceptedStore>, max_spots: u32) -> Arc<StoreSessionRepository> {
    let repo = Arc::new(StoreSessionRepository::new(store));
    let session = Session::new(
        session_id(),
        SessionType::new(Category::Salsa, Some(1)).unwrap(),
        max_spots,
    )
    .unwrap();
    repo.create(&session).await.unwrap();
    repo
}

fn book(n: usize) -> BookSessionCommand {
    BookSessionCommand {
        session_id: session_id(),
        email: email(n),
    }
}

/// Loads, waits for every other writer to load, then books and commits.
async fn book_after_barrier(
    repo: Arc<StoreSessionRepository>,
    barrier: Arc<Barrier>,
    email: Email,
) -> Result<u64, BookingError> {
    let loaded = repo.find_by_id(&session_id()).await?;
    barrier.wait().await;

    let found = loaded.ok_or(BookingError::NotFound(session_id()))?;
    let mut session = found.session;
    session.book(email)?;
    repo.save(&session, found.version).await
}

#[tokio::test]
async fn writers_at_the_same_version_admit_exactly_one() {
    let (repo, _) = setup(10).await;
    let barrier = Arc::new(Barrier::new(2));

    let a = tokio::spawn(book_after_barrier(repo.clone(), barrier.clone(), email(1)));
    let b = tokio::spawn(book_after_barrier(repo.clone(), barrier.clone(), email(2)));
    let results = [a.await.unwrap(), b.await.unwrap()];

    let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(*winners[0].as_ref().unwrap(), 1);

    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        loser,
        BookingError::ConcurrentModification {
            expected_version: 0,
            ..
        }
    ));
    assert!(loser.is_retryable());

    let stored = repo.find_by_id(&session_id()).await.unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.session.booked_count(), 1);
}

#[tokio::test]
async fn racing_rounds_never_overbook() {
    const CAPACITY: u32 = 5;
    let (repo, store) = setup(CAPACITY).await;
    let mut pending: Vec<usize> = (0..20).collect();
    let mut admitted = Vec::new();

    // Each round every remaining dancer races from the same version.
    for _round in 0..=CAPACITY {
        let barrier = Arc::new(Barrier::new(pending.len()));
        let tasks: Vec<_> = pending
            .iter()
            .map(|&n| {
                let task = tokio::spawn(book_after_barrier(repo.clone(), barrier.clone(), email(n)));
                (n, task)
            })
            .collect();

        let mut retry = Vec::new();
        for (n, task) in tasks {
            match task.await.unwrap() {
                Ok(_) => admitted.push(n),
                Err(err) if err.is_retryable() => retry.push(n),
                Err(BookingError::CapacityExceeded { max_spots, .. }) => {
                    assert_eq!(max_spots, CAPACITY)
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        pending = retry;
    }

    assert_eq!(admitted.len(), CAPACITY as usize);
    assert!(pending.is_empty());

    let stored = repo.find_by_id(&session_id()).await.unwrap().unwrap();
    assert_eq!(stored.session.booked_count(), CAPACITY);
    assert_eq!(stored.session.spots_remaining(), 0);
    assert_eq!(stored.version, u64::from(CAPACITY));
    for n in admitted {
        assert!(stored.session.is_booked(&email(n)));
    }
    // metadata plus one record per admitted dancer
    assert_eq!(store.item_count().await, CAPACITY as usize + 1);
}

#[tokio::test]
async fn same_participant_racing_gets_one_spot() {
    let (repo, _) = setup(10).await;
    let barrier = Arc::new(Barrier::new(3));

    let tasks: Vec<_> = (0..3)
        .map(|_| tokio::spawn(book_after_barrier(repo.clone(), barrier.clone(), email(7))))
        .collect();
    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);

    // A retry on a fresh read hits the aggregate's duplicate rule.
    let handler = BookSessionHandler::new(repo.clone());
    let err = handler
        .handle(BookSessionCommand {
            session_id: session_id(),
            email: email(7),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::DuplicateParticipant { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn handler_books_sequentially_until_full() {
    let (repo, _) = setup(2).await;
    let handler = BookSessionHandler::new(repo.clone());

    for n in 0..2 {
        handler
            .handle(BookSessionCommand {
                session_id: session_id(),
                email: email(n),
            })
            .await
            .unwrap();
    }

    let err = handler
        .handle(BookSessionCommand {
            session_id: session_id(),
            email: email(2),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::CapacityExceeded { max_spots: 2, .. }));
}

// ════════════════════════════════════════════════════════════════════════════
// Write window
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn retry_after_failed_insert_recovers_without_duplicating() {
    let store = Arc::new(InterceptedStore::failing_first_insert());
    let repo = setup_on(store.clone(), 5).await;
    let handler = BookSessionHandler::new(repo.clone());

    // The version bump lands, the booking record does not.
    let err = handler.handle(book(1)).await.unwrap_err();
    assert_eq!(err, BookingError::Store(StoreError::Unavailable("timeout".to_string())));

    let partial = repo.find_by_id(&session_id()).await.unwrap().unwrap();
    assert_eq!(partial.version, 1);
    assert!(!partial.session.is_fully_loaded());
    assert_eq!(partial.session.booked_count(), 1);

    // The caller retries the same booking.
    handler.handle(book(1)).await.unwrap();

    let stored = repo.find_by_id(&session_id()).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert!(stored.session.is_fully_loaded());
    assert_eq!(stored.session.booked_count(), 1);
    assert!(stored.session.is_booked(&email(1)));
    assert_eq!(store.inner.item_count().await, 2);

    // The session keeps taking bookings and still rejects repeats.
    handler.handle(book(2)).await.unwrap();
    let err = handler.handle(book(1)).await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::DuplicateParticipant {
            detected_by: DetectedBy::Aggregate,
            ..
        }
    ));

    let stored = repo.find_by_id(&session_id()).await.unwrap().unwrap();
    assert_eq!(stored.version, 3);
    assert_eq!(stored.session.booked_count(), 2);
}

#[tokio::test]
async fn failed_insert_releases_its_spot_to_the_next_booking() {
    let store = Arc::new(InterceptedStore::failing_first_insert());
    let repo = setup_on(store.clone(), 5).await;
    let handler = BookSessionHandler::new(repo.clone());

    handler.handle(book(1)).await.unwrap_err();
    handler.handle(book(2)).await.unwrap();

    let stored = repo.find_by_id(&session_id()).await.unwrap().unwrap();
    assert!(stored.session.is_fully_loaded());
    assert_eq!(stored.session.booked_count(), 1);
    assert!(stored.session.is_booked(&email(2)));
    assert!(!stored.session.is_booked(&email(1)));
}

#[tokio::test]
async fn reader_in_write_window_is_stopped_by_store_exists_check() {
    let (store, mut reached) = InterceptedStore::gated();
    let store = Arc::new(store);
    let repo = setup_on(store.clone(), 5).await;
    let handler = Arc::new(BookSessionHandler::new(repo.clone()));

    // First writer bumps the version, then waits before its insert.
    let first = {
        let handler = handler.clone();
        tokio::spawn(async move { handler.handle(book(1)).await })
    };
    assert_eq!(reached.recv().await.as_deref(), Some("dancer1@x.com"));

    // Second writer reads inside the window: count 1, no records yet.
    let second = {
        let handler = handler.clone();
        tokio::spawn(async move { handler.handle(book(1)).await })
    };
    assert_eq!(reached.recv().await.as_deref(), Some("dancer1@x.com"));

    store.release_one();
    let receipt = first.await.unwrap().unwrap();
    assert_eq!(receipt.email, email(1));

    store.release_one();
    let err = second.await.unwrap().unwrap_err();
    assert_eq!(
        err,
        BookingError::DuplicateParticipant {
            email: email(1),
            session_id: session_id(),
            detected_by: DetectedBy::Store,
        }
    );
    assert!(!err.is_retryable());

    let stored = repo.find_by_id(&session_id()).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert!(stored.session.is_fully_loaded());
    assert_eq!(stored.session.booked_count(), 1);
    assert_eq!(store.inner.item_count().await, 2);
}
