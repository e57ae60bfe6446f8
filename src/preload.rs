//! Media preloading for the showcase.
//!
//! - Small worker pool (flume request channel) decodes images off the main
//!   thread before the stage is built
//! - Results flow back over an async channel the main thread drains with
//!   `glib::spawn_future_local`
//! - Every completion, success or failure, advances the aggregate progress;
//!   failures are logged and never retried
//!
//! There is deliberately no timeout: a stalled decode stalls initialization,
//! which is an accepted failure mode at this scale.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use image::DynamicImage;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

/// Decode worker count; the catalogs this feeds are small.
const DEFAULT_WORKERS: usize = 2;
const MAX_WORKERS: usize = 4;

#[derive(Debug, Error)]
pub enum PreloadError {
    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// One completed preload, delivered to the main thread.
#[derive(Debug)]
pub struct PreloadResult {
    pub path: PathBuf,
    pub outcome: Result<DynamicImage, PreloadError>,
}

/// Counts completions against the requested total.
///
/// Failures count as loaded: the loading screen always reaches 100% and the
/// stage starts with whatever decoded.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTally {
    total: usize,
    loaded: usize,
}

impl ProgressTally {
    pub fn new(total: usize) -> Self {
        Self { total, loaded: 0 }
    }

    /// Record one completion and return the new percentage.
    pub fn record(&mut self) -> f64 {
        self.loaded = (self.loaded + 1).min(self.total.max(1));
        self.percent()
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.loaded as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.loaded >= self.total
    }
}

/// Decode worker pool.
pub struct Preloader {
    request_tx: flume::Sender<PathBuf>,
    pending: Arc<RwLock<HashSet<PathBuf>>>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl Preloader {
    pub fn new(workers: usize, result_tx: async_channel::Sender<PreloadResult>) -> Self {
        let worker_count = workers.clamp(1, MAX_WORKERS);
        let (request_tx, request_rx) = flume::unbounded::<PathBuf>();
        let pending = Arc::new(RwLock::new(HashSet::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            let pending = Arc::clone(&pending);
            let shutdown = Arc::clone(&shutdown);

            let handle = thread::Builder::new()
                .name(format!("preload-worker-{}", worker_id))
                .spawn(move || worker_loop(rx, tx, pending, shutdown))
                .expect("Failed to spawn preload worker");
            handles.push(handle);
        }

        debug!(worker_count, "Started preload worker pool");

        Self {
            request_tx,
            pending,
            shutdown,
            workers: handles,
        }
    }

    pub fn with_default_workers(result_tx: async_channel::Sender<PreloadResult>) -> Self {
        Self::new(DEFAULT_WORKERS, result_tx)
    }

    /// Queue one path. Returns false when it is already in flight.
    pub fn enqueue(&self, path: PathBuf) -> bool {
        if !mark_pending(&self.pending, &path) {
            return false;
        }
        match self.request_tx.send(path) {
            Ok(()) => true,
            Err(flume::SendError(path)) => {
                self.pending.write().remove(&path);
                false
            }
        }
    }

    /// Queue a batch in order; returns how many were accepted.
    pub fn enqueue_all(&self, paths: Vec<PathBuf>) -> usize {
        paths
            .into_iter()
            .map(|path| self.enqueue(path))
            .filter(|&accepted| accepted)
            .count()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.read().len()
    }

    /// Signal workers to stop and wait for them. In-flight decodes finish;
    /// queued requests are abandoned.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for Preloader {
    fn drop(&mut self) {
        if !self.shutdown.load(Ordering::Relaxed) {
            self.shutdown();
        }
    }
}

fn mark_pending(pending: &RwLock<HashSet<PathBuf>>, path: &Path) -> bool {
    pending.write().insert(path.to_path_buf())
}

fn worker_loop(
    rx: flume::Receiver<PathBuf>,
    tx: async_channel::Sender<PreloadResult>,
    pending: Arc<RwLock<HashSet<PathBuf>>>,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let path = match rx.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(path) => path,
            Err(flume::RecvTimeoutError::Timeout) => continue,
            Err(flume::RecvTimeoutError::Disconnected) => break,
        };

        let outcome = decode_image(&path);
        pending.write().remove(&path);

        if let Err(error) = &outcome {
            warn!(?path, %error, "Failed to preload media");
        }

        if tx.send_blocking(PreloadResult { path, outcome }).is_err() {
            break;
        }
    }
}

/// Read and decode an image, guessing the format from the bytes.
pub fn decode_image(path: &Path) -> Result<DynamicImage, PreloadError> {
    let bytes = std::fs::read(path).map_err(|source| PreloadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match image::guess_format(&bytes).ok() {
        Some(format) => image::load_from_memory_with_format(&bytes, format),
        None => image::load_from_memory(&bytes),
    }
    .map_err(|source| PreloadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert a decoded image to tightly packed RGBA bytes plus dimensions,
/// ready for texture upload on the main thread.
pub fn to_rgba_bytes(image: &DynamicImage) -> anyhow::Result<(Vec<u8>, u32, u32)> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        anyhow::bail!("image has zero dimension ({width}x{height})");
    }
    Ok((rgba.into_raw(), width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use std::collections::HashMap;

    fn write_test_png(dir: &std::path::Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(4, 4, Rgba([180, 40, 90, 255]));
        img.save(&path).expect("write test png");
        path
    }

    #[test]
    fn test_tally_empty_set_completes_immediately() {
        let tally = ProgressTally::new(0);
        assert!(tally.is_complete());
        assert_eq!(tally.percent(), 100.0);
    }

    #[test]
    fn test_tally_percent_sequence() {
        let mut tally = ProgressTally::new(4);
        assert!(!tally.is_complete());
        assert_eq!(tally.record(), 25.0);
        assert_eq!(tally.record(), 50.0);
        assert_eq!(tally.record(), 75.0);
        assert_eq!(tally.record(), 100.0);
        assert!(tally.is_complete());
    }

    #[test]
    fn test_mark_pending_rejects_duplicates() {
        let pending = RwLock::new(HashSet::new());
        let path = PathBuf::from("/tmp/a.png");
        assert!(mark_pending(&pending, &path));
        assert!(!mark_pending(&pending, &path));
    }

    #[test]
    fn test_failures_count_toward_completion() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = write_test_png(dir.path(), "good.png");
        let garbage = dir.path().join("garbage.bin");
        std::fs::write(&garbage, b"definitely not an image").unwrap();
        let missing = dir.path().join("missing.png");

        let (result_tx, result_rx) = async_channel::unbounded();
        let mut preloader = Preloader::new(2, result_tx);
        assert_eq!(preloader.enqueue_all(vec![good, garbage, missing]), 3);

        let mut tally = ProgressTally::new(3);
        let mut cache: HashMap<PathBuf, DynamicImage> = HashMap::new();
        while !tally.is_complete() {
            let result = result_rx.recv_blocking().expect("result");
            tally.record();
            if let Ok(image) = result.outcome {
                cache.insert(result.path, image);
            }
        }

        assert_eq!(cache.len(), 1);
        assert_eq!(tally.percent(), 100.0);
        preloader.shutdown();
    }

    #[test]
    fn test_decode_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_test_png(dir.path(), "pixel.png");
        let image = decode_image(&path).expect("decode");
        let (bytes, width, height) = to_rgba_bytes(&image).expect("rgba");
        assert_eq!((width, height), (4, 4));
        assert_eq!(bytes.len(), 4 * 4 * 4);
        assert_eq!(&bytes[0..4], &[180, 40, 90, 255]);
    }
}
