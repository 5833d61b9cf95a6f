//! chartshot Capture Engine
//!
//! Renders chart URLs in a dedicated browser session, classifies empty and
//! failed renders, crops the chart container out of the viewport screenshot
//! and caches successful captures by fingerprint.
//!
//! # Overview
//!
//! - **CaptureEngine**: one bounded capture per call, single-flight per fingerprint
//! - **CaptureCache**: moka TTL cache of cropped PNGs
//! - **SessionLauncher / BrowserSession**: browser seam, WebDriver in production
//! - **RetryPolicy**: bounded retries for the chart container wait
//! - **CaptureOutcome**: success with image bytes, or a classified failure
//!
//! # Example
//!
//! ```rust
//! use chartshot_capture::{select_largest, ElementRect, RetryPolicy};
//! use std::time::Duration;
//!
//! let rects = [
//!     ElementRect::new(0.0, 0.0, 300.0, 200.0),
//!     ElementRect::new(0.0, 240.0, 1200.0, 600.0),
//! ];
//! assert_eq!(select_largest(&rects).map(|(index, _)| index), Some(1));
//!
//! let policy = RetryPolicy::fixed(2, Duration::from_secs(1));
//! assert_eq!(policy.delay_before(2), Duration::from_secs(1));
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod classify;
pub mod config;
pub mod crop;
pub mod engine;
pub mod guard;
pub mod outcome;
pub mod retry;
pub mod scripts;
pub mod session;
pub mod webdriver;

// Re-exports
pub use cache::{CacheEntry, CacheSettings, CacheStats, CaptureCache, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
pub use classify::{classify_driver_error, classify_message};
pub use config::CaptureConfig;
pub use crop::{crop_png, CropError, CropRegion, DEFAULT_PADDING};
pub use engine::{select_largest, CaptureEngine};
pub use guard::SessionGuard;
pub use outcome::{CaptureFailure, CaptureOutcome, FailureKind, ImageBytes};
pub use retry::{Backoff, RetryPolicy};
pub use session::{
    AuthCookie, BrowserSession, DomSignals, DriverError, ElementRect, SessionLauncher, SessionOptions,
};
pub use webdriver::{chrome_args, WebDriverLauncher, WebDriverSession, DEFAULT_WEBDRIVER_URL};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for capturing charts
    pub use crate::{
        CaptureCache, CaptureConfig, CaptureEngine, CaptureOutcome, FailureKind, SessionLauncher,
        WebDriverLauncher,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
