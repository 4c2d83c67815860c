// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Host-platform capabilities used by the mini-app.
//!
//! Everything here is untrusted: the host hands us init data but we never
//! verify it on this side. [`HeadlessBridge`] stands in for the real host in
//! tests and command-line runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Impact strength for tactile feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

/// Outcome signalled by a notification haptic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Impact(ImpactStyle),
    Notification(NotificationKind),
    SelectionChanged,
}

/// Viewport size reported by the host, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub height: f64,
    /// Height once the host has finished animating
    pub stable_height: f64,
    pub is_expanded: bool,
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self {
            height: 600.0,
            stable_height: 600.0,
            is_expanded: true,
        }
    }
}

/// Capabilities the host platform exposes to the mini-app.
pub trait PlatformBridge: Send + Sync {
    /// Raw signed launch data, if the host provided any.
    fn init_data(&self) -> Option<String>;

    fn show_alert(&self, message: &str);

    fn haptic_feedback(&self, kind: HapticKind);

    fn show_back_button(&self);

    fn hide_back_button(&self);

    fn is_back_button_visible(&self) -> bool;

    fn viewport(&self) -> ViewportMetrics;
}

/// A call made against a [`HeadlessBridge`].
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Alert(String),
    Haptic(HapticKind),
    BackButtonShown,
    BackButtonHidden,
}

/// In-process bridge that records every call.
#[derive(Debug, Default)]
pub struct HeadlessBridge {
    init_data: Option<String>,
    viewport: ViewportMetrics,
    back_button: AtomicBool,
    events: Mutex<Vec<BridgeEvent>>,
}

impl HeadlessBridge {
    pub fn new(init_data: Option<String>) -> Self {
        Self {
            init_data,
            ..Self::default()
        }
    }

    pub fn with_viewport(mut self, viewport: ViewportMetrics) -> Self {
        self.viewport = viewport;
        self
    }

    /// Snapshot of recorded calls, oldest first.
    pub fn events(&self) -> Vec<BridgeEvent> {
        self.lock_events().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock_events()
            .iter()
            .filter_map(|event| match event {
                BridgeEvent::Alert(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: BridgeEvent) {
        tracing::debug!(?event, "Bridge call");
        self.lock_events().push(event);
    }

    // A panic while recording leaves the log usable.
    fn lock_events(&self) -> MutexGuard<'_, Vec<BridgeEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PlatformBridge for HeadlessBridge {
    fn init_data(&self) -> Option<String> {
        self.init_data.clone()
    }

    fn show_alert(&self, message: &str) {
        self.record(BridgeEvent::Alert(message.to_string()));
    }

    fn haptic_feedback(&self, kind: HapticKind) {
        self.record(BridgeEvent::Haptic(kind));
    }

    fn show_back_button(&self) {
        self.back_button.store(true, Ordering::SeqCst);
        self.record(BridgeEvent::BackButtonShown);
    }

    fn hide_back_button(&self) {
        self.back_button.store(false, Ordering::SeqCst);
        self.record(BridgeEvent::BackButtonHidden);
    }

    fn is_back_button_visible(&self) -> bool {
        self.back_button.load(Ordering::SeqCst)
    }

    fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_button_state() {
        let bridge = HeadlessBridge::new(None);
        assert!(!bridge.is_back_button_visible());

        bridge.show_back_button();
        assert!(bridge.is_back_button_visible());
        bridge.hide_back_button();
        assert!(!bridge.is_back_button_visible());

        assert_eq!(
            bridge.events(),
            vec![BridgeEvent::BackButtonShown, BridgeEvent::BackButtonHidden]
        );
    }

    #[test]
    fn test_records_alerts_and_haptics() {
        let bridge = HeadlessBridge::new(Some("a=1".to_string()));
        bridge.show_alert("hello");
        bridge.haptic_feedback(HapticKind::Impact(ImpactStyle::Light));

        assert_eq!(bridge.init_data().as_deref(), Some("a=1"));
        assert_eq!(bridge.alerts(), vec!["hello".to_string()]);
        assert_eq!(bridge.events().len(), 2);
    }

    #[test]
    fn test_custom_viewport() {
        let viewport = ViewportMetrics {
            height: 480.0,
            stable_height: 470.0,
            is_expanded: false,
        };
        let bridge = HeadlessBridge::new(None).with_viewport(viewport);
        assert_eq!(bridge.viewport(), viewport);
    }
}
