//! Process-wide OCR adapter with initialize-once semantics.
//!
//! The adapter is built once by the composition root and passed by
//! reference to the PDF and image extractors. The backend is constructed on
//! first use; if construction fails the adapter stays unavailable for the
//! rest of the process and every call reports that instead of retrying.

use std::mem;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::OcrError;

use super::OcrResult;

/// An optical character recognition backend.
///
/// Backends are assumed non-reentrant; the adapter serializes calls.
pub trait OcrBackend: Send {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Recognize text spans in an image, in reading order.
    fn recognize(&mut self, image: &DynamicImage) -> Result<OcrResult, OcrError>;
}

type Initializer = Box<dyn FnOnce() -> Result<Box<dyn OcrBackend>, OcrError> + Send>;

enum AdapterState {
    Pending(Initializer),
    Initializing,
    Ready(Box<dyn OcrBackend>),
    Unavailable(String),
}

/// Shared, lazily-initialized OCR engine handle.
pub struct OcrAdapter {
    state: Mutex<AdapterState>,
}

impl OcrAdapter {
    /// Defer backend construction until the first recognition call.
    pub fn lazy<F>(init: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn OcrBackend>, OcrError> + Send + 'static,
    {
        Self {
            state: Mutex::new(AdapterState::Pending(Box::new(init))),
        }
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(backend: impl OcrBackend + 'static) -> Self {
        Self {
            state: Mutex::new(AdapterState::Ready(Box::new(backend))),
        }
    }

    /// An adapter that never recognizes anything.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(AdapterState::Unavailable(reason.into())),
        }
    }

    /// Lazily load the pure-Rust ONNX engine from the configured model directory.
    #[cfg(feature = "native")]
    pub fn from_config(config: &crate::models::OcrConfig) -> Self {
        let config = config.clone();
        Self::lazy(move || {
            let model_dir = config
                .model_dir
                .clone()
                .ok_or_else(|| OcrError::Unavailable("no OCR model directory configured".to_string()))?;
            let backend = super::PureOcrBackend::from_dir(&model_dir, config)?;
            Ok(Box::new(backend) as Box<dyn OcrBackend>)
        })
    }

    /// Whether the backend is (or can be made) ready. Forces initialization.
    pub fn is_available(&self) -> bool {
        let mut state = self.lock();
        Self::ensure_initialized(&mut state);
        matches!(*state, AdapterState::Ready(_))
    }

    /// Run recognition, initializing the backend on first use.
    pub fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let mut state = self.lock();
        Self::ensure_initialized(&mut state);

        match &mut *state {
            AdapterState::Ready(backend) => {
                let start = Instant::now();
                let mut result = backend.recognize(image)?;
                result.processing_time_ms = start.elapsed().as_millis() as u64;
                debug!(
                    "{} recognized {} spans in {}ms",
                    backend.name(),
                    result.boxes.len(),
                    result.processing_time_ms
                );
                Ok(result)
            }
            AdapterState::Unavailable(reason) => Err(OcrError::Unavailable(reason.clone())),
            AdapterState::Pending(_) | AdapterState::Initializing => Err(OcrError::Unavailable(
                "OCR engine initialization did not complete".to_string(),
            )),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AdapterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_initialized(state: &mut AdapterState) {
        if !matches!(state, AdapterState::Pending(_)) {
            return;
        }

        let AdapterState::Pending(init) = mem::replace(state, AdapterState::Initializing) else {
            return;
        };

        *state = match init() {
            Ok(backend) => {
                info!("OCR backend {} initialized", backend.name());
                AdapterState::Ready(backend)
            }
            Err(e) => {
                warn!("OCR backend unavailable: {}", e);
                AdapterState::Unavailable(e.to_string())
            }
        };
    }
}

impl std::fmt::Debug for OcrAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.lock() {
            AdapterState::Pending(_) => "pending",
            AdapterState::Initializing => "initializing",
            AdapterState::Ready(_) => "ready",
            AdapterState::Unavailable(_) => "unavailable",
        };
        f.debug_struct("OcrAdapter").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::TextBox;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct EchoBackend {
        calls: Arc<AtomicUsize>,
    }

    impl OcrBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        fn recognize(&mut self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OcrResult::new(
                vec![TextBox::new("hello", 0.99, [0.0; 8])],
                (image.width(), image.height()),
            ))
        }
    }

    #[test]
    fn test_lazy_initializes_once() {
        let inits = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));

        let adapter = {
            let inits = inits.clone();
            let calls = calls.clone();
            OcrAdapter::lazy(move || {
                inits.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(EchoBackend { calls }) as Box<dyn OcrBackend>)
            })
        };
        assert_eq!(inits.load(Ordering::SeqCst), 0);

        let image = DynamicImage::new_rgb8(4, 4);
        for _ in 0..3 {
            let result = adapter.recognize(&image).unwrap();
            assert_eq!(result.joined("\n"), "hello");
        }

        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_init_is_cached() {
        let inits = Arc::new(AtomicUsize::new(0));
        let adapter = {
            let inits = inits.clone();
            OcrAdapter::lazy(move || {
                inits.fetch_add(1, Ordering::SeqCst);
                Err(OcrError::ModelLoad("missing det.onnx".to_string()))
            })
        };

        let image = DynamicImage::new_rgb8(4, 4);
        assert!(matches!(adapter.recognize(&image), Err(OcrError::Unavailable(_))));
        assert!(matches!(adapter.recognize(&image), Err(OcrError::Unavailable(_))));
        assert!(!adapter.is_available());
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapter = Arc::new(OcrAdapter::with_backend(EchoBackend { calls: calls.clone() }));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let adapter = adapter.clone();
                std::thread::spawn(move || {
                    let image = DynamicImage::new_rgb8(2, 2);
                    adapter.recognize(&image).is_ok()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
