// SPDX-License-Identifier: MPL-2.0

//! Decides when reaching the bottom of a list should pull in another page.
//!
//! Positions are plain numbers in the same unit (pixels), measured from the
//! top of the visible area, so any toolkit's scroll geometry can feed it.

use crate::feed::loader::LoaderStatus;

/// The visible area and the full height of the scrolled content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub height: f64,
    pub content_height: f64,
}

impl Viewport {
    pub fn content_exceeds(&self) -> bool {
        self.content_height > self.height
    }
}

/// Marker placed after the last item of a list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentinel {
    /// Distance from the top of the viewport to the top of the marker
    pub top: f64,
    pub height: f64,
}

impl Sentinel {
    pub fn below_fold(&self, viewport: &Viewport) -> bool {
        self.top >= viewport.height
    }

    /// Fully inside the viewport
    pub fn visible(&self, viewport: &Viewport) -> bool {
        self.top >= 0.0 && self.top + self.height <= viewport.height
    }
}

/// Ways a person moves through the list. Programmatic scrolling is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Wheel,
    Touch,
    Key,
}

/// Gate in front of "load the next page".
///
/// Observation of the sentinel only starts once it has been seen below the
/// fold, and is suspended from the moment it fires until the new page has
/// been rendered.
#[derive(Debug, Clone, Default)]
pub struct TriggerGate {
    armed: bool,
    observing: bool,
    user_interacted: bool,
}

impl TriggerGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_interaction(&mut self, _kind: Interaction) {
        self.user_interacted = true;
    }

    pub fn user_interacted(&self) -> bool {
        self.user_interacted
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Feed the sentinel's position after layout or a scroll. Observation
    /// begins the first time the sentinel sits below the fold.
    pub fn update_position(&mut self, sentinel: Sentinel, viewport: Viewport) -> bool {
        if !self.armed && sentinel.below_fold(&viewport) {
            self.armed = true;
            self.observing = true;
            tracing::trace!("sentinel below fold, observing");
        }
        self.observing
    }

    /// All five conditions plus the sentinel actually being in view.
    pub fn should_fetch(&self, sentinel: Sentinel, viewport: Viewport, loader: LoaderStatus) -> bool {
        self.observing
            && sentinel.visible(&viewport)
            && self.armed
            && viewport.content_exceeds()
            && self.user_interacted
            && loader.first_page_loaded
            && !loader.in_flight
            && loader.has_more
    }

    /// Stop watching until the next page is on screen
    pub fn suspend(&mut self) {
        self.observing = false;
    }

    /// Call once newly loaded items have been rendered.
    pub fn resume(&mut self, loader: LoaderStatus) {
        if self.armed && !loader.in_flight && loader.has_more {
            self.observing = true;
        }
    }

    /// A new query lays the list out from scratch; interaction history is kept.
    pub fn reset(&mut self) {
        self.armed = false;
        self.observing = false;
    }
}
