// SPDX-License-Identifier: GPL-3.0-only

//! Capture thread ownership
//!
//! A device backend runs its blocking capture loop on a dedicated thread.
//! [`CaptureLoop`] owns that thread: stopping it signals the loop and then
//! waits for the thread to exit, so once [`CaptureLoop::stop`] returns the
//! loop has dropped the device and its buffers.
//!
//! The loop body must check the `running` flag at least once per poll
//! interval; a body blocked indefinitely would make `stop` block too.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// A capture loop running on its own thread
pub struct CaptureLoop {
    name: String,
    running: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl CaptureLoop {
    /// Spawn `body` on a named thread
    ///
    /// `body` receives the running flag and should return once it reads
    /// `false`. An error it returns is logged and ends the loop.
    pub fn spawn<F>(name: &str, body: F) -> io::Result<Self>
    where
        F: FnOnce(&AtomicBool) -> io::Result<()> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let thread_name = name.to_string();

        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            if let Err(e) = body(&thread_running) {
                warn!(name = %thread_name, error = %e, "Capture loop ended with error");
            }
            thread_running.store(false, Ordering::SeqCst);
        })?;

        info!(name, "Capture loop started");
        Ok(Self {
            name: name.to_string(),
            running,
            thread: Mutex::new(Some(handle)),
        })
    }

    /// True until the thread has exited
    pub fn is_running(&self) -> bool {
        self.lock_thread()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signal the loop without waiting for it
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Signal the loop and wait for its thread to exit. Idempotent.
    pub fn stop(&self) {
        self.request_stop();

        let handle = self.lock_thread().take();
        if let Some(handle) = handle {
            debug!(name = %self.name, "Waiting for capture loop thread to finish");
            if handle.join().is_err() {
                warn!(name = %self.name, "Capture loop thread panicked");
            } else {
                debug!(name = %self.name, "Capture loop thread finished");
            }
        }
    }

    fn lock_thread(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.thread.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CaptureLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureLoop")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stop_waits_for_loop_to_release_resources() {
        let device = Arc::new(());
        let held = Arc::clone(&device);

        let capture = CaptureLoop::spawn("test-capture", move |running| {
            let _device = held;
            while running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(5));
            }
            Ok(())
        })
        .unwrap();

        assert!(capture.is_running());
        capture.stop();

        assert!(!capture.is_running());
        assert_eq!(Arc::strong_count(&device), 1);

        capture.stop();
    }

    #[test]
    fn test_failed_loop_is_not_running() {
        let capture = CaptureLoop::spawn("test-capture", |_| {
            Err(io::Error::other("device unplugged"))
        })
        .unwrap();

        while capture.is_running() {
            thread::sleep(Duration::from_millis(1));
        }
        capture.stop();
        assert!(!capture.is_running());
    }

    #[test]
    fn test_drop_joins_the_thread() {
        let device = Arc::new(());
        let held = Arc::clone(&device);

        let capture = CaptureLoop::spawn("test-capture", move |running| {
            let _device = held;
            while running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(5));
            }
            Ok(())
        })
        .unwrap();

        drop(capture);
        assert_eq!(Arc::strong_count(&device), 1);
    }
}
