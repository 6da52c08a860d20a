//! Public slider: header texts, the dated images, and slide navigation.
//!
//! Loading never fails outward. Settings fall back to the built-in texts and
//! images to an empty list; the loading flag is cleared either way.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::api::{ImageRecord, Settings, SiteApi};
use crate::constants;
use crate::utils::{LoadingFlag, bounded};

/// Direction of a recognised vertical swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved up: show the next slide.
    Up,
    /// Finger moved down: show the previous slide.
    Down,
}

/// Classify a vertical gesture from its start and end `y` coordinates.
///
/// A zero coordinate means the touch position was never recorded and the
/// gesture is ignored. Travel must exceed [`constants::SWIPE_THRESHOLD_PX`].
pub fn classify_swipe(start_y: f64, end_y: f64) -> Option<Swipe> {
    if start_y == 0.0 || end_y == 0.0 {
        return None;
    }
    let distance = start_y - end_y;
    if distance > constants::SWIPE_THRESHOLD_PX {
        Some(Swipe::Up)
    } else if distance < -constants::SWIPE_THRESHOLD_PX {
        Some(Swipe::Down)
    } else {
        None
    }
}

/// `January 2, 2024`
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Slider state for the public page.
pub struct Slider {
    api: Arc<dyn SiteApi>,
    timeout: Duration,
    settings: Settings,
    images: Vec<ImageRecord>,
    current: usize,
    loading: bool,
}

impl Slider {
    pub fn new(api: Arc<dyn SiteApi>) -> Self {
        Self {
            api,
            timeout: Duration::from_secs(constants::DEFAULT_REQUEST_TIMEOUT_SECS),
            settings: Settings::default(),
            images: Vec::new(),
            current: 0,
            loading: true,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch settings and images.
    pub async fn load(&mut self) {
        let _loading = LoadingFlag::raise(&mut self.loading);

        let (settings, images) = tokio::join!(
            bounded(self.timeout, "fetch settings", self.api.get_settings()),
            bounded(self.timeout, "list images", self.api.list_images()),
        );

        match settings {
            Ok(settings) => self.settings = settings,
            Err(e) => warn!(error = %e, "Failed to fetch settings"),
        }
        match images {
            Ok(images) => {
                self.images = images;
                self.current = self.current.min(self.images.len().saturating_sub(1));
            },
            Err(e) => warn!(error = %e, "Failed to fetch images"),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Index of the slide on screen.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.images.get(self.current)
    }

    /// Advance one slide; stays on the last one.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.images.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one slide; stays on the first one.
    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a slide (dot navigation). Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.images.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Apply a touch gesture; returns whether the slide changed.
    pub fn swipe(&mut self, start_y: f64, end_y: f64) -> bool {
        match classify_swipe(start_y, end_y) {
            Some(Swipe::Up) => self.next(),
            Some(Swipe::Down) => self.prev(),
            None => false,
        }
    }
}
