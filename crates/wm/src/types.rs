//! Value types shared between the facade and the dock engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a running application owned by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppHandle(pub u64);

impl fmt::Display for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkspaceId(pub u32);

/// A workspace as reported by the window manager.
///
/// A virtual workspace is one large desktop scrolled through viewports
/// (Compiz style) rather than a set of distinct desktops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    #[serde(default)]
    pub is_virtual: bool,
}

impl Workspace {
    pub fn new(id: WorkspaceId) -> Self {
        Self {
            id,
            is_virtual: false,
        }
    }

    pub fn new_virtual(id: WorkspaceId) -> Self {
        Self {
            id,
            is_virtual: true,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }
}

/// Screen rectangle in root-window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x.saturating_add(self.width)
            && y < self.y.saturating_add(self.height)
    }

    pub fn center(&self) -> (i32, i32) {
        (
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// A window belongs to the monitor that contains its center.
    pub fn owns(&self, window: &Rect) -> bool {
        let (cx, cy) = window.center();
        self.contains_point(cx, cy)
    }
}

/// What the application matcher knows about a running application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Launcher identifier (e.g., "org.gnome.Terminal.desktop")
    pub launcher_id: String,

    /// Display name (e.g., "Terminal")
    pub display_text: String,

    /// Suggested file name for a persisted launcher
    #[serde(default)]
    pub filename_hint: String,
}

impl AppInfo {
    pub fn new(launcher_id: impl Into<String>, display_text: impl Into<String>) -> Self {
        let launcher_id = launcher_id.into();
        let filename_hint = launcher_id
            .rsplit('/')
            .next()
            .unwrap_or(launcher_id.as_str())
            .to_string();
        Self {
            launcher_id,
            display_text: display_text.into(),
            filename_hint,
        }
    }
}

/// Notification topic a subscription can be taken out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    ActiveWindowChanged,
    ActiveWorkspaceChanged,
    ViewportsChanged,
    WindowOpened,
    WindowClosed,
    /// Geometry changes of one specific window.
    GeometryChanged(WindowId),
    ApplicationOpened,
    ApplicationClosed,
}

/// Handle returned by [`crate::WindowManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// A notification delivered by the window manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WmEvent {
    ActiveWindowChanged,
    ActiveWorkspaceChanged { previous: Option<Workspace> },
    ViewportsChanged,
    WindowOpened(WindowId),
    WindowClosed(WindowId),
    GeometryChanged(WindowId),
    ApplicationOpened(AppHandle),
    ApplicationClosed(AppHandle),
}

impl WmEvent {
    /// Topic a subscriber must hold to receive this event.
    pub fn topic(&self) -> Topic {
        match self {
            WmEvent::ActiveWindowChanged => Topic::ActiveWindowChanged,
            WmEvent::ActiveWorkspaceChanged { .. } => Topic::ActiveWorkspaceChanged,
            WmEvent::ViewportsChanged => Topic::ViewportsChanged,
            WmEvent::WindowOpened(_) => Topic::WindowOpened,
            WmEvent::WindowClosed(_) => Topic::WindowClosed,
            WmEvent::GeometryChanged(window) => Topic::GeometryChanged(*window),
            WmEvent::ApplicationOpened(_) => Topic::ApplicationOpened,
            WmEvent::ApplicationClosed(_) => Topic::ApplicationClosed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_belongs_to_monitor_by_center() {
        let monitor = Rect::new(0, 0, 1920, 1080);
        assert!(monitor.owns(&Rect::new(100, 100, 400, 300)));
        // Mostly on the right-hand monitor
        assert!(!monitor.owns(&Rect::new(1800, 100, 800, 600)));
        assert!(!monitor.owns(&Rect::new(2000, 0, 100, 100)));
    }

    #[test]
    fn test_rect_edges_are_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(0, 0));
        assert!(r.contains_point(9, 9));
        assert!(!r.contains_point(10, 5));
    }

    #[test]
    fn test_rect_near_coordinate_limit() {
        let edge = Rect::new(i32::MAX - 10, i32::MAX - 10, 100, 100);
        assert_eq!(edge.center(), (i32::MAX, i32::MAX));
        assert!(edge.contains_point(i32::MAX - 1, i32::MAX - 1));
        assert!(!edge.contains_point(i32::MAX - 11, i32::MAX - 1));
        assert!(edge.owns(&Rect::new(i32::MAX - 5, i32::MAX - 5, 2, 2)));
    }

    #[test]
    fn test_event_topics() {
        let w = WindowId(7);
        assert_eq!(WmEvent::GeometryChanged(w).topic(), Topic::GeometryChanged(w));
        assert_eq!(
            WmEvent::ActiveWorkspaceChanged { previous: None }.topic(),
            Topic::ActiveWorkspaceChanged
        );
        assert_eq!(
            WmEvent::ApplicationClosed(AppHandle(1)).topic(),
            Topic::ApplicationClosed
        );
    }

    #[test]
    fn test_app_info_filename_hint() {
        let info = AppInfo::new("/usr/share/applications/firefox.desktop", "Firefox");
        assert_eq!(info.filename_hint, "firefox.desktop");
        assert_eq!(info.display_text, "Firefox");
    }

    #[test]
    fn test_workspace_deserialize_defaults() {
        let ws: Workspace = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert_eq!(ws.id, WorkspaceId(3));
        assert!(!ws.is_virtual());
    }
}
