// src/reader.rs

//! Background readers that keep the latest measurement fresh.
//!
//! [`spawn_reader`] drives a [`SyncSession`] on its own OS thread;
//! [`spawn_local_reader`] (feature `tokio`) drives an
//! [`AsyncSession`](crate::session::AsyncSession) as a task on a
//! single-threaded `LocalSet`. Both call `update()` once per interval,
//! publish the result, and stop on request or at the first transport error,
//! handing the session (or the error) back through `join`.

use crate::common::{
    error::TfmpError,
    hal_traits::{TfmpClock, TfmpSerial},
    status::Measurement,
};
use crate::session::SyncSession;
use embedded_hal::delay::DelayNs;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

type ReaderResult<IF> = Result<SyncSession<IF>, TfmpError<<IF as TfmpSerial>::Error>>;

/// Handle to a reader thread started by [`spawn_reader`].
#[derive(Debug)]
pub struct ReaderHandle<IF>
where
    IF: TfmpSerial + TfmpClock + DelayNs,
{
    latest: Arc<Mutex<Option<Measurement>>>,
    stop: Arc<AtomicBool>,
    thread: thread::JoinHandle<ReaderResult<IF>>,
}

/// Moves `session` onto a new thread that updates it every `interval`.
///
/// A cycle that takes longer than `interval` is followed immediately by the
/// next one.
pub fn spawn_reader<IF>(session: SyncSession<IF>, interval: Duration) -> io::Result<ReaderHandle<IF>>
where
    IF: TfmpSerial + TfmpClock + DelayNs + Send + 'static,
    IF::Error: Send + 'static,
{
    let latest = Arc::new(Mutex::new(None));
    let stop = Arc::new(AtomicBool::new(false));

    let thread = thread::Builder::new().name("tfmp-reader".into()).spawn({
        let latest = latest.clone();
        let stop = stop.clone();
        move || run_reader(session, interval, &latest, &stop)
    })?;

    Ok(ReaderHandle { latest, stop, thread })
}

fn run_reader<IF>(
    mut session: SyncSession<IF>,
    interval: Duration,
    latest: &Mutex<Option<Measurement>>,
    stop: &AtomicBool,
) -> ReaderResult<IF>
where
    IF: TfmpSerial + TfmpClock + DelayNs,
{
    while !stop.load(Ordering::Acquire) {
        let next = Instant::now() + interval;
        let result = session.update();
        *latest.lock().unwrap_or_else(PoisonError::into_inner) = session.last();
        if let Err(e) = result {
            log::warn!("reader stopping after transport error: {:?}", e);
            return Err(e);
        }

        // Parked rather than slept so that stop() cuts the wait short.
        loop {
            if stop.load(Ordering::Acquire) {
                break;
            }
            let now = Instant::now();
            if now >= next {
                break;
            }
            thread::park_timeout(next - now);
        }
    }
    log::debug!("reader stopped on request");
    Ok(session)
}

impl<IF> ReaderHandle<IF>
where
    IF: TfmpSerial + TfmpClock + DelayNs,
{
    /// Result of the most recent cycle, `None` until the first one finishes.
    pub fn latest(&self) -> Option<Measurement> {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Asks the thread to stop after its current cycle.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        self.thread.thread().unpark();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the thread to end. Returns the session if it was stopped,
    /// or the transport error that ended it.
    pub fn join(self) -> ReaderResult<IF> {
        match self.thread.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

#[cfg(feature = "tokio")]
pub use local::{spawn_local_reader, LocalReaderHandle};

#[cfg(feature = "tokio")]
mod local {
    use crate::common::{
        error::TfmpError,
        hal_traits::{TfmpClock, TfmpSerial},
        status::Measurement,
    };
    use crate::session::AsyncSession;
    use core::cell::Cell;
    use embedded_hal_async::delay::DelayNs;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tokio::task::{JoinError, JoinHandle};
    use tokio::time::Instant;

    type LocalResult<IF> = Result<AsyncSession<IF>, TfmpError<<IF as TfmpSerial>::Error>>;

    /// Handle to a reader task started by [`spawn_local_reader`].
    #[derive(Debug)]
    pub struct LocalReaderHandle<IF>
    where
        IF: TfmpSerial + TfmpClock + DelayNs,
    {
        latest: Rc<Cell<Option<Measurement>>>,
        stop: Rc<Notify>,
        task: JoinHandle<LocalResult<IF>>,
    }

    /// Spawns a task on the current `LocalSet` that updates `session` every
    /// `interval`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a `LocalSet`.
    pub fn spawn_local_reader<IF>(session: AsyncSession<IF>, interval: Duration) -> LocalReaderHandle<IF>
    where
        IF: TfmpSerial + TfmpClock + DelayNs + 'static,
        IF::Error: 'static,
    {
        let latest = Rc::new(Cell::new(None));
        let stop = Rc::new(Notify::new());
        let task = tokio::task::spawn_local(run_reader(session, interval, latest.clone(), stop.clone()));
        LocalReaderHandle { latest, stop, task }
    }

    async fn run_reader<IF>(
        mut session: AsyncSession<IF>,
        interval: Duration,
        latest: Rc<Cell<Option<Measurement>>>,
        stop: Rc<Notify>,
    ) -> LocalResult<IF>
    where
        IF: TfmpSerial + TfmpClock + DelayNs,
    {
        loop {
            let next = Instant::now() + interval;
            let result = session.update().await;
            latest.set(session.last());
            if let Err(e) = result {
                log::warn!("reader task stopping after transport error: {:?}", e);
                return Err(e);
            }

            // A stop requested mid-cycle leaves a permit, so this returns at once.
            if tokio::time::timeout_at(next, stop.notified()).await.is_ok() {
                log::debug!("reader task stopped on request");
                return Ok(session);
            }
        }
    }

    impl<IF> LocalReaderHandle<IF>
    where
        IF: TfmpSerial + TfmpClock + DelayNs,
    {
        pub fn latest(&self) -> Option<Measurement> {
            self.latest.get()
        }

        /// Asks the task to stop after its current cycle.
        pub fn stop(&self) {
            self.stop.notify_one();
        }

        pub fn is_finished(&self) -> bool {
            self.task.is_finished()
        }

        /// Waits for the task to end. The outer error is tokio's (the task
        /// panicked or was aborted).
        pub async fn join(self) -> Result<LocalResult<IF>, JoinError> {
            self.task.await
        }
    }
}
