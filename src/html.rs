use crate::taint::TaintSet;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Snapshot of the first tainted write an observer saw.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// How many characters of the chunk were untrusted.
    pub tainted_chars: usize,
    /// Total character length of the chunk.
    pub chunk_len: usize,
    /// Zero-based index of the write among all observed writes.
    pub write_index: u64,
    pub at: DateTime<Utc>,
}

/// Watches chunks written to a response body. A chunk that still carries
/// taint means the caller emitted untrusted content without neutralizing it
/// into fresh untainted text first; by then the write has already gone out,
/// so this observer flags instead of raising.
///
/// The flag is one-way until [`reset`](HtmlObserver::reset). Internally
/// synchronized, so one instance can be shared by every sink call site of a
/// response (or the whole process, via [`html_observer`]).
#[derive(Debug)]
pub struct HtmlObserver {
    enabled: bool,
    vulnerable: AtomicBool,
    writes: AtomicU64,
    tainted_writes: AtomicU64,
    first: Mutex<Option<Detection>>,
}

impl Default for HtmlObserver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl HtmlObserver {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            vulnerable: AtomicBool::new(false),
            writes: AtomicU64::new(0),
            tainted_writes: AtomicU64::new(0),
            first: Mutex::new(None),
        }
    }

    /// An observer that records nothing; for hosts whose policy turns the
    /// HTML sink off.
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Records one response-body write. Never fails and never blocks the
    /// write; a tainted chunk (or a chunk whose taint metadata is the wrong
    /// length) latches the vulnerability flag.
    pub fn observe_write(&self, text: &str, taint: &TaintSet) {
        if !self.enabled {
            return;
        }
        let index = self.writes.fetch_add(1, Ordering::Relaxed);
        let chunk_len = text.chars().count();
        let tainted_chars = if taint.len() == chunk_len {
            taint.cardinality()
        } else {
            // corrupted metadata counts as fully untrusted
            chunk_len.max(1)
        };
        if tainted_chars == 0 {
            return;
        }

        self.tainted_writes.fetch_add(1, Ordering::Relaxed);
        self.vulnerable.store(true, Ordering::Release);
        debug!(target: "html", "tainted response write #{index}: {tainted_chars}/{chunk_len} chars untrusted");

        let mut first = self
            .first
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if first.is_none() {
            *first = Some(Detection {
                tainted_chars,
                chunk_len,
                write_index: index,
                at: Utc::now(),
            });
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        self.vulnerable.load(Ordering::Acquire)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn tainted_writes(&self) -> u64 {
        self.tainted_writes.load(Ordering::Relaxed)
    }

    pub fn first_detection(&self) -> Option<Detection> {
        self.first
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Clears the flag, the counters, and the stored detection.
    pub fn reset(&self) {
        self.vulnerable.store(false, Ordering::Release);
        self.writes.store(0, Ordering::Relaxed);
        self.tainted_writes.store(0, Ordering::Relaxed);
        *self
            .first
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }
}

static GLOBAL: Lazy<HtmlObserver> = Lazy::new(HtmlObserver::default);

/// The process-wide default observer.
pub fn html_observer() -> &'static HtmlObserver {
    &GLOBAL
}

/// Records a write against the process-wide observer.
pub fn validate_html_write(text: &str, taint: &TaintSet) {
    GLOBAL.observe_write(text, taint);
}

#[test]
fn flag_is_set_iff_the_chunk_is_tainted() {
    let observer = HtmlObserver::default();
    let clean = "<p>hello</p>";
    observer.observe_write(clean, &TaintSet::new(clean.chars().count()));
    assert!(!observer.is_vulnerable());

    let dirty = "<p>name</p>";
    let mut taint = TaintSet::new(dirty.chars().count());
    taint.set_range(3, 7).unwrap();
    observer.observe_write(dirty, &taint);
    assert!(observer.is_vulnerable());

    // the flag is one-way: later clean writes do not clear it
    observer.observe_write(clean, &TaintSet::new(clean.chars().count()));
    assert!(observer.is_vulnerable());
    assert_eq!(observer.writes(), 3);
    assert_eq!(observer.tainted_writes(), 1);
}

#[test]
fn first_detection_is_kept_until_reset() {
    let observer = HtmlObserver::default();
    observer.observe_write("ok", &TaintSet::new(2));
    observer.observe_write("xy", &TaintSet::filled(true, 2));
    observer.observe_write("zz", &TaintSet::filled(true, 2));

    let first = observer.first_detection().expect("detection recorded");
    assert_eq!(first.write_index, 1);
    assert_eq!(first.tainted_chars, 2);
    assert_eq!(first.chunk_len, 2);

    observer.reset();
    assert!(!observer.is_vulnerable());
    assert!(observer.first_detection().is_none());
    assert_eq!(observer.writes(), 0);
}

#[test]
fn length_mismatch_latches_the_flag() {
    let observer = HtmlObserver::default();
    observer.observe_write("abcdef", &TaintSet::new(2));
    assert!(observer.is_vulnerable());
}

#[test]
fn disabled_observer_records_nothing() {
    let observer = HtmlObserver::disabled();
    observer.observe_write("xy", &TaintSet::filled(true, 2));
    assert!(!observer.is_vulnerable());
    assert_eq!(observer.writes(), 0);
}

#[test]
fn global_observer_is_shared() {
    html_observer().reset();
    validate_html_write("safe", &TaintSet::new(4));
    assert!(!html_observer().is_vulnerable());
    validate_html_write("evil", &TaintSet::filled(true, 4));
    assert!(html_observer().is_vulnerable());
    html_observer().reset();
}
