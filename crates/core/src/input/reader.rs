//! Generic background reader for Linux character devices
//!
//! A [`DeviceReader`] owns one open device file and at most one background
//! thread. The thread performs one blocking read of exactly `R::SIZE` bytes
//! at a time, decodes it and hands it to the injected [`EventHandler`].
//!
//! # Cancellation
//!
//! The loop waits in `poll(2)` on both the device and a private wake socket,
//! with no timeout. [`DeviceReader::stop_event_loop`] sets the stop flag,
//! writes one byte to the wake socket and joins the thread, so it returns
//! promptly even when the device is silent and no handler call can happen
//! after it returns.
//!
//! # Failure
//!
//! Short reads are discarded. End of file and any other read error end the
//! loop quietly; the handler keeps whatever state it had.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::marker::PhantomData;
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{DeviceError, INPUT_GROUP_HINT};
use crate::input::event::Record;
use crate::logging::{log, LogCategory, LogLevel};

/// Per-record strategy plugged into a [`DeviceReader`].
///
/// Called only from the reader's background thread; implementors guard
/// their own state for concurrent queries.
pub trait EventHandler<R>: Send + Sync + 'static {
    fn handle(&self, record: &R);
}

struct Worker {
    stop: Arc<AtomicBool>,
    waker: UnixStream,
    thread: JoinHandle<()>,
}

pub struct DeviceReader<R: Record, H: EventHandler<R>> {
    path: PathBuf,
    device: Option<File>,
    handler: Arc<H>,
    worker: Option<Worker>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record, H: EventHandler<R>> DeviceReader<R, H> {
    /// Create a reader for `path`; nothing is opened until [`initialize`](Self::initialize).
    pub fn new(path: impl Into<PathBuf>, handler: H) -> Self {
        Self {
            path: path.into(),
            device: None,
            handler: Arc::new(handler),
            worker: None,
            _record: PhantomData,
        }
    }

    /// Wrap an already-open source such as one end of a socket pair.
    pub fn from_file(path: impl Into<PathBuf>, device: File, handler: H) -> Self {
        let mut reader = Self::new(path, handler);
        reader.device = Some(device);
        reader
    }

    /// Open the device for shared read access.
    pub fn initialize(&mut self) -> Result<(), DeviceError> {
        let device = OpenOptions::new()
            .read(true)
            .open(&self.path)
            .map_err(|err| DeviceError::from_open(&self.path, err, INPUT_GROUP_HINT))?;

        log(LogCategory::Input, LogLevel::Info, || {
            format!("opened input device {}", self.path.display())
        });

        self.device = Some(device);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared handle to the aggregate state for queries.
    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.thread.is_finished())
    }

    /// Spawn the background read loop.
    ///
    /// Exactly one loop may run per reader: calling this again before
    /// [`stop_event_loop`](Self::stop_event_loop) fails with
    /// [`DeviceError::AlreadyRunning`]. A loop that already ended on its own
    /// (end of device, read error) is joined first and does not count.
    /// Fails with [`DeviceError::NotInitialized`] if the device was never
    /// opened.
    pub fn start_event_loop(&mut self) -> Result<(), DeviceError> {
        if self
            .worker
            .as_ref()
            .is_some_and(|worker| worker.thread.is_finished())
        {
            self.stop_event_loop();
        }
        if self.worker.is_some() {
            return Err(DeviceError::AlreadyRunning {
                path: self.path.clone(),
            });
        }
        let device = self.device.as_ref().ok_or_else(|| DeviceError::NotInitialized {
            path: self.path.clone(),
        })?;

        let spawn_error = |source: io::Error| DeviceError::Spawn {
            path: self.path.clone(),
            source,
        };
        let device = device.try_clone().map_err(spawn_error)?;
        let (waker, wake_rx) = UnixStream::pair().map_err(spawn_error)?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handler = Arc::clone(&self.handler);
        let path = self.path.clone();
        let name = format!(
            "input:{}",
            self.path.file_name().and_then(|n| n.to_str()).unwrap_or("device")
        );

        let thread = thread::Builder::new()
            .name(name)
            .spawn(move || read_loop::<R, H>(&path, device, wake_rx, &thread_stop, &*handler))
            .map_err(spawn_error)?;

        self.worker = Some(Worker {
            stop,
            waker,
            thread,
        });
        Ok(())
    }

    /// Cancel the read loop and wait until it has fully exited.
    ///
    /// A no-op when no loop is running.
    pub fn stop_event_loop(&mut self) {
        let Some(mut worker) = self.worker.take() else {
            return;
        };

        worker.stop.store(true, Ordering::Release);
        // The loop may already have exited and closed its end.
        let _ = worker.waker.write_all(&[1]);

        if worker.thread.join().is_err() {
            log(LogCategory::Input, LogLevel::Error, || {
                format!("reader for {} panicked", self.path.display())
            });
        }
    }
}

impl<R: Record, H: EventHandler<R>> Drop for DeviceReader<R, H> {
    fn drop(&mut self) {
        // Join before `device` is closed.
        self.stop_event_loop();
    }
}

enum Wake {
    Readable,
    Stop,
}

/// Block until the device is readable or the wake socket fires.
fn wait_readable(device: RawFd, wake: RawFd) -> io::Result<Wake> {
    let mut fds = [
        libc::pollfd {
            fd: device,
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: wake,
            events: libc::POLLIN,
            revents: 0,
        },
    ];

    loop {
        // SAFETY: `fds` is a valid array of two pollfd structs for the call's duration.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if fds[1].revents != 0 {
            return Ok(Wake::Stop);
        }
        // POLLERR/POLLHUP also surface here; the following read reports them.
        if fds[0].revents != 0 {
            return Ok(Wake::Readable);
        }
    }
}

fn read_loop<R: Record, H: EventHandler<R>>(
    path: &Path,
    mut device: File,
    wake: UnixStream,
    stop: &AtomicBool,
    handler: &H,
) {
    let mut buf = vec![0u8; R::SIZE];
    let device_fd = device.as_raw_fd();
    let wake_fd = wake.as_raw_fd();

    let reason = loop {
        if stop.load(Ordering::Acquire) {
            break "cancelled".to_string();
        }

        match wait_readable(device_fd, wake_fd) {
            Ok(Wake::Readable) => {}
            Ok(Wake::Stop) => break "cancelled".to_string(),
            Err(err) => break format!("poll failed: {}", err),
        }

        if stop.load(Ordering::Acquire) {
            break "cancelled".to_string();
        }

        match device.read(&mut buf) {
            Ok(0) => break "end of device".to_string(),
            Ok(n) if n == R::SIZE => {
                if let Some(record) = R::decode(&buf) {
                    handler.handle(&record);
                }
            }
            Ok(n) => {
                log(LogCategory::Input, LogLevel::Trace, || {
                    format!("discarding short read of {} bytes from {}", n, path.display())
                });
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => break format!("read failed: {}", err),
        }
    };

    log(LogCategory::Input, LogLevel::Debug, || {
        format!("reader for {} exited: {}", path.display(), reason)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::event::InputEvent;
    use std::os::fd::OwnedFd;
    use std::os::unix::net::UnixDatagram;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<InputEvent>>,
    }

    impl EventHandler<InputEvent> for Recorder {
        fn handle(&self, record: &InputEvent) {
            self.events.lock().unwrap().push(*record);
        }
    }

    fn socket_reader() -> (DeviceReader<InputEvent, Recorder>, UnixStream) {
        let (feed, device) = UnixStream::pair().unwrap();
        let device = File::from(OwnedFd::from(device));
        let reader = DeviceReader::from_file("socket", device, Recorder::default());
        (reader, feed)
    }

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn test_start_requires_initialize() {
        let mut reader: DeviceReader<InputEvent, Recorder> =
            DeviceReader::new("/dev/input/does-not-exist", Recorder::default());
        assert!(matches!(
            reader.start_event_loop(),
            Err(DeviceError::NotInitialized { .. })
        ));
    }

    #[test]
    fn test_initialize_reports_missing_device() {
        let mut reader: DeviceReader<InputEvent, Recorder> =
            DeviceReader::new("/dev/input/does-not-exist", Recorder::default());
        assert!(matches!(
            reader.initialize(),
            Err(DeviceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_dispatches_whole_records() {
        let (mut reader, mut feed) = socket_reader();
        reader.start_event_loop().unwrap();

        feed.write_all(&InputEvent::key(30, 1).encode()).unwrap();
        feed.write_all(&InputEvent::syn().encode()).unwrap();

        let handler = Arc::clone(reader.handler());
        assert!(wait_for(|| handler.events.lock().unwrap().len() == 2));
        reader.stop_event_loop();

        let events = handler.events.lock().unwrap();
        assert_eq!(events[0], InputEvent::key(30, 1));
        assert_eq!(events[1], InputEvent::syn());
    }

    #[test]
    fn test_starting_twice_is_rejected() {
        let (mut reader, _feed) = socket_reader();
        reader.start_event_loop().unwrap();
        assert!(matches!(
            reader.start_event_loop(),
            Err(DeviceError::AlreadyRunning { .. })
        ));
        reader.stop_event_loop();
        assert!(!reader.is_running());
    }

    #[test]
    fn test_stop_returns_while_device_is_silent() {
        let (mut reader, _feed) = socket_reader();
        reader.start_event_loop().unwrap();
        assert!(reader.is_running());

        let started = Instant::now();
        reader.stop_event_loop();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!reader.is_running());
    }

    #[test]
    fn test_no_dispatch_after_stop() {
        let (mut reader, mut feed) = socket_reader();
        reader.start_event_loop().unwrap();
        reader.stop_event_loop();

        feed.write_all(&InputEvent::key(1, 1).encode()).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(reader.handler().events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_loop_ends_when_device_disappears() {
        let (mut reader, feed) = socket_reader();
        reader.start_event_loop().unwrap();
        drop(feed);

        assert!(wait_for(|| !reader.is_running()));
        // Stopping an exited loop is still fine.
        reader.stop_event_loop();
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut reader, mut feed) = socket_reader();
        reader.start_event_loop().unwrap();
        reader.stop_event_loop();
        reader.start_event_loop().unwrap();

        feed.write_all(&InputEvent::rel(0, 4).encode()).unwrap();
        let handler = Arc::clone(reader.handler());
        assert!(wait_for(|| handler.events.lock().unwrap().len() == 1));
    }

    #[test]
    fn test_short_read_is_discarded() {
        // Datagrams keep each write a separate read.
        let (feed, device) = UnixDatagram::pair().unwrap();
        let device = File::from(OwnedFd::from(device));
        let mut reader: DeviceReader<InputEvent, Recorder> =
            DeviceReader::from_file("datagram", device, Recorder::default());
        reader.start_event_loop().unwrap();

        let whole = InputEvent::key(30, 1);
        feed.send(&whole.encode()[..10]).unwrap();
        feed.send(&whole.encode()).unwrap();

        let handler = Arc::clone(reader.handler());
        assert!(wait_for(|| !handler.events.lock().unwrap().is_empty()));
        thread::sleep(Duration::from_millis(50));
        reader.stop_event_loop();

        assert_eq!(*handler.events.lock().unwrap(), vec![whole]);
    }

    #[test]
    fn test_restart_after_device_disappears() {
        let (mut reader, feed) = socket_reader();
        reader.start_event_loop().unwrap();
        drop(feed);
        assert!(wait_for(|| !reader.is_running()));

        reader.start_event_loop().unwrap();
        assert!(wait_for(|| !reader.is_running()));
        reader.stop_event_loop();
    }
}
