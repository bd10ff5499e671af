//! Fetch/export orchestration around the pure pipeline.
//!
//! Fetching the source image and saving the result are one-shot calls into
//! external collaborators ([`ImageSource`], [`ImageSink`]). There is no retry
//! and no timeout here. Overlapping invocations are resolved with
//! generation tokens: every invocation takes a fresh [`Generation`], and a
//! result whose generation is no longer current is dropped instead of
//! saved.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{EffectError, Result};
use crate::pipeline::EffectParameters;
use crate::raster::RasterBuffer;
use crate::render::{EffectRenderer, ExportRenderer};

// ============================================================================
// Requests
// ============================================================================

/// How the source image bytes are reached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transport {
    /// Straight from the origin.
    #[default]
    Direct,
    /// Through a prefix-style relay: the origin URL is appended to `base`.
    Relay { base: String },
}

/// A source image to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub url: String,
    pub transport: Transport,
}

impl ImageRequest {
    pub fn direct(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            transport: Transport::Direct,
        }
    }

    /// The same resource through a relay; the fix for [`EffectError::FetchBlocked`].
    pub fn via_relay(&self, base: impl Into<String>) -> Self {
        Self {
            url: self.url.clone(),
            transport: Transport::Relay { base: base.into() },
        }
    }

    /// URL the transport actually contacts.
    pub fn effective_url(&self) -> String {
        match &self.transport {
            Transport::Direct => self.url.clone(),
            Transport::Relay { base } => format!("{base}{}", self.url),
        }
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Fetches and decodes a source image into an RGBA raster.
pub trait ImageSource {
    /// Fails with [`EffectError::FetchBlocked`] when the origin forbids
    /// pixel access, or [`EffectError::FetchFailed`] otherwise.
    fn fetch(&self, request: &ImageRequest) -> Result<RasterBuffer>;
}

/// Encodes a raster and hands it to the user.
pub trait ImageSink {
    /// Fails with [`EffectError::ExportFailed`].
    fn save(&self, image: &RasterBuffer, name: &str) -> Result<()>;
}

// ============================================================================
// Generations
// ============================================================================

/// Token identifying one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out increasing [`Generation`]s; only the newest is current.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new invocation, superseding every earlier one.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::Acquire) == generation.0
    }

    /// Pass `value` through only if `generation` is still current.
    pub fn accept<T>(&self, generation: Generation, value: T) -> Option<T> {
        if self.is_current(generation) {
            Some(value)
        } else {
            warn!(
                "discarding stale result from generation {} (latest {})",
                generation.0,
                self.latest.load(Ordering::Acquire)
            );
            None
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// What happened to an export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The result was handed to the sink.
    Saved {
        generation: Generation,
        width: u32,
        height: u32,
    },
    /// A newer invocation started before this one finished; nothing was saved.
    Superseded { generation: Generation },
}

/// Source + sink + generation bookkeeping.
///
/// The counter is shared so that other callers (a UI thread, a second
/// session) can supersede in-flight exports.
pub struct EffectSession<S, K> {
    source: S,
    sink: K,
    generations: Arc<GenerationCounter>,
}

impl<S: ImageSource, K: ImageSink> EffectSession<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self::with_generations(source, sink, Arc::new(GenerationCounter::new()))
    }

    pub fn with_generations(source: S, sink: K, generations: Arc<GenerationCounter>) -> Self {
        Self {
            source,
            sink,
            generations,
        }
    }

    pub fn generations(&self) -> &Arc<GenerationCounter> {
        &self.generations
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Fetch `request`, run `params` through the export pipeline and save the
    /// result as `name`.
    ///
    /// Collaborator errors are returned as-is and nothing is saved.
    pub fn export(
        &self,
        request: &ImageRequest,
        params: &EffectParameters,
        name: &str,
    ) -> Result<ExportOutcome> {
        let generation = self.generations.begin();
        debug!(
            "export #{}: {} from {}",
            generation.0,
            params.kind(),
            request.effective_url()
        );

        let source = self.source.fetch(request).inspect_err(|err| {
            warn!("export #{}: fetch failed: {err}", generation.0);
        })?;

        let Some(source) = self.generations.accept(generation, source) else {
            return Ok(ExportOutcome::Superseded { generation });
        };
        let output = ExportRenderer.render(&source, params);
        let Some(output) = self.generations.accept(generation, output) else {
            return Ok(ExportOutcome::Superseded { generation });
        };

        self.sink.save(&output, name)?;
        info!(
            "export #{}: saved {name} ({}x{})",
            generation.0,
            output.width(),
            output.height()
        );
        Ok(ExportOutcome::Saved {
            generation,
            width: output.width(),
            height: output.height(),
        })
    }

    /// Like [`export`](Self::export), but a direct request refused with
    /// [`EffectError::FetchBlocked`] is re-issued once through `relay`.
    pub fn export_with_relay(
        &self,
        request: &ImageRequest,
        relay: &str,
        params: &EffectParameters,
        name: &str,
    ) -> Result<ExportOutcome> {
        match self.export(request, params, name) {
            Err(EffectError::FetchBlocked { url }) if request.transport == Transport::Direct => {
                info!("fetch of {url} blocked; switching to relay {relay}");
                self.export(&request.via_relay(relay), params, name)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use crate::pipeline::EffectKind;

    /// Serves a fixed raster; blocks direct requests when `cors` is set.
    struct StubSource {
        image: RasterBuffer,
        cors: bool,
        fetched: RefCell<Vec<String>>,
    }

    impl StubSource {
        fn new(cors: bool) -> Self {
            Self {
                image: RasterBuffer::filled(4, 4, [255, 255, 255, 255]).unwrap(),
                cors,
                fetched: RefCell::new(Vec::new()),
            }
        }
    }

    impl ImageSource for StubSource {
        fn fetch(&self, request: &ImageRequest) -> Result<RasterBuffer> {
            self.fetched.borrow_mut().push(request.effective_url());
            if self.cors && request.transport == Transport::Direct {
                return Err(EffectError::FetchBlocked { url: request.url.clone() });
            }
            Ok(self.image.clone())
        }
    }

    #[derive(Default)]
    struct MemorySink {
        saved: RefCell<Vec<(String, RasterBuffer)>>,
        fail: Cell<bool>,
    }

    impl ImageSink for MemorySink {
        fn save(&self, image: &RasterBuffer, name: &str) -> Result<()> {
            if self.fail.get() {
                return Err(EffectError::ExportFailed("disk full".into()));
            }
            self.saved.borrow_mut().push((name.to_string(), image.clone()));
            Ok(())
        }
    }

    #[test]
    fn test_generation_counter() {
        let counter = GenerationCounter::new();
        let first = counter.begin();
        assert!(counter.is_current(first));
        assert_eq!(counter.accept(first, 1), Some(1));

        let second = counter.begin();
        assert!(second > first);
        assert!(!counter.is_current(first));
        assert_eq!(counter.accept(first, 1), None);
        assert_eq!(counter.accept(second, 2), Some(2));
    }

    #[test]
    fn test_export_saves_result() {
        let session = EffectSession::new(StubSource::new(false), MemorySink::default());
        let outcome = session
            .export(
                &ImageRequest::direct("https://img/a.png"),
                &EffectParameters::defaults(EffectKind::Edges),
                "a-edges.png",
            )
            .unwrap();

        assert!(matches!(outcome, ExportOutcome::Saved { width: 4, height: 4, .. }));
        let saved = session.sink().saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, "a-edges.png");
        assert!(saved[0].1.as_bytes().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_blocked_fetch_is_distinct_and_saves_nothing() {
        let session = EffectSession::new(StubSource::new(true), MemorySink::default());
        let err = session
            .export(&ImageRequest::direct("https://img/a.png"), &EffectParameters::None, "a.png")
            .unwrap_err();

        assert_eq!(err, EffectError::FetchBlocked { url: "https://img/a.png".into() });
        assert!(err.is_recoverable());
        assert!(session.sink().saved.borrow().is_empty());
    }

    #[test]
    fn test_relay_fallback() {
        let session = EffectSession::new(StubSource::new(true), MemorySink::default());
        let outcome = session
            .export_with_relay(
                &ImageRequest::direct("https://img/a.png"),
                "https://relay.example/",
                &EffectParameters::None,
                "a.png",
            )
            .unwrap();

        assert!(matches!(outcome, ExportOutcome::Saved { .. }));
        assert_eq!(
            *session.source().fetched.borrow(),
            vec![
                "https://img/a.png".to_string(),
                "https://relay.example/https://img/a.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_export_failure_surfaces() {
        let sink = MemorySink::default();
        sink.fail.set(true);
        let session = EffectSession::new(StubSource::new(false), sink);
        let err = session
            .export(&ImageRequest::direct("a.png"), &EffectParameters::None, "out.png")
            .unwrap_err();
        assert!(matches!(err, EffectError::ExportFailed(_)));
    }

    /// Starts a newer invocation while the fetch is in flight.
    struct RacingSource {
        counter: Arc<GenerationCounter>,
    }

    impl ImageSource for RacingSource {
        fn fetch(&self, _request: &ImageRequest) -> Result<RasterBuffer> {
            self.counter.begin();
            RasterBuffer::filled(2, 2, [0, 0, 0, 255])
        }
    }

    #[test]
    fn test_stale_invocation_is_not_saved() {
        let counter = Arc::new(GenerationCounter::new());
        let source = RacingSource { counter: Arc::clone(&counter) };
        let session = EffectSession::with_generations(source, MemorySink::default(), counter);

        let outcome = session
            .export(&ImageRequest::direct("a.png"), &EffectParameters::None, "a.png")
            .unwrap();
        assert!(matches!(outcome, ExportOutcome::Superseded { .. }));
        assert!(session.sink().saved.borrow().is_empty());
    }
}
