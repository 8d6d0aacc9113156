use crate::drop_zone::DropZoneState;
use crate::export::{PlacedLogo, SceneSnapshot};
use crate::logo::{LogoAsset, LogoSource};
use crate::overlay::{hit_test_handle, Gesture, OverlayGeometry, ResizeHandle};
use eframe::egui::{DroppedFile, Pos2, Vec2};
use image::RgbaImage;
use std::sync::Arc;

/// Size of the t-shirt design area, in points.
pub const CONTAINER_SIZE: Vec2 = Vec2 { x: 288.0, y: 384.0 };

/// State of one designer widget: the current logo, where it sits, and the
/// drag-and-drop highlight. Everything here lives only as long as the window.
pub struct Designer {
    bounds: Vec2,
    logo: Option<LogoAsset>,
    geometry: OverlayGeometry,
    gesture: Gesture,
    drop_zone: DropZoneState,
}

impl Default for Designer {
    fn default() -> Self {
        Self::new(CONTAINER_SIZE)
    }
}

impl Designer {
    pub fn new(bounds: Vec2) -> Self {
        Self {
            bounds,
            logo: None,
            geometry: OverlayGeometry::default().clamped(bounds),
            gesture: Gesture::Idle,
            drop_zone: DropZoneState::Idle,
        }
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn logo(&self) -> Option<&LogoAsset> {
        self.logo.as_ref()
    }

    /// Replaces the logo and puts the overlay back at its default spot.
    pub fn set_logo(&mut self, asset: LogoAsset) {
        log::info!("Logo set: {:?}", asset);
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Logo data URI: {}", asset.data_uri());
        }
        self.logo = Some(asset);
        self.geometry = OverlayGeometry::default().clamped(self.bounds);
        self.gesture = Gesture::Idle;
    }

    /// Overlay placement; `None` while there is no logo.
    pub fn overlay(&self) -> Option<OverlayGeometry> {
        self.logo.as_ref().map(|_| self.geometry)
    }

    pub fn drop_zone(&self) -> DropZoneState {
        self.drop_zone
    }

    /// Runs one frame of OS drag-and-drop input through the drop zone and
    /// returns the file to load, if something was dropped.
    pub fn sync_drag_input(&mut self, hovering_files: bool, dropped: &[DroppedFile]) -> Option<LogoSource> {
        self.drop_zone.sync(hovering_files, dropped)
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Starts a gesture at a container-local pointer position: a resize when
    /// the pointer is on a handle, a move when it's on the logo body.
    /// Returns whether a gesture started.
    pub fn press(&mut self, pointer: Pos2) -> bool {
        if self.logo.is_none() {
            return false;
        }
        if let Some(handle) = hit_test_handle(pointer, &self.geometry) {
            self.begin_resize(handle, pointer);
            true
        } else if self.geometry.rect().contains(pointer) {
            self.begin_move(pointer);
            true
        } else {
            false
        }
    }

    pub fn begin_move(&mut self, pointer: Pos2) {
        self.gesture = Gesture::moving(self.geometry, pointer);
    }

    pub fn begin_resize(&mut self, handle: ResizeHandle, pointer: Pos2) {
        self.gesture = Gesture::resizing(handle, self.geometry, pointer);
    }

    /// Applies a pointer move to the active gesture. Takes effect immediately.
    pub fn update_gesture(&mut self, pointer: Pos2) {
        if let Some(geometry) = self.gesture.apply(pointer, self.bounds) {
            self.geometry = geometry;
        }
    }

    pub fn release(&mut self) {
        if self.gesture.is_active() {
            log::debug!("Overlay placed at {:?}", self.geometry);
        }
        self.gesture = Gesture::Idle;
    }

    /// Everything needed to rasterize the design area as it looks right now.
    pub fn snapshot(&self, background: Option<Arc<RgbaImage>>, scale: f32) -> SceneSnapshot {
        SceneSnapshot {
            size: self.bounds,
            scale,
            background,
            logo: self.logo.as_ref().map(|asset| PlacedLogo {
                image: asset.image().cloned(),
                geometry: self.geometry,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logo::load_logo;
    use eframe::egui::{pos2, vec2};
    use image::Rgba;
    use std::path::PathBuf;

    fn logo(name: &str) -> LogoAsset {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        LogoAsset::from_bytes(name.to_string(), bytes.into())
    }

    #[test]
    fn test_placeholder_without_logo() {
        let designer = Designer::default();
        assert!(designer.overlay().is_none());
        assert!(designer.logo().is_none());
    }

    #[test]
    fn test_set_logo_shows_overlay_at_default() {
        let mut designer = Designer::default();
        designer.set_logo(logo("a.png"));

        assert!(designer.logo().unwrap().data_uri().starts_with("data:image/png"));
        assert_eq!(designer.overlay(), Some(OverlayGeometry::default()));
    }

    #[test]
    fn test_second_logo_replaces_and_resets_geometry() {
        let mut designer = Designer::default();
        designer.set_logo(logo("a.png"));

        designer.begin_move(pos2(100.0, 100.0));
        designer.update_gesture(pos2(130.0, 160.0));
        designer.release();
        let moved = designer.overlay().unwrap();
        assert_eq!((moved.x, moved.y), (80.0, 110.0));

        designer.set_logo(logo("b.png"));
        assert_eq!(designer.logo().unwrap().name, "b.png");
        assert_eq!(designer.overlay(), Some(OverlayGeometry::default()));
    }

    #[test]
    fn test_press_picks_resize_or_move() {
        let mut designer = Designer::default();
        assert!(!designer.press(pos2(100.0, 100.0)));

        designer.set_logo(logo("a.png"));
        assert!(designer.press(pos2(150.0, 150.0)));
        assert!(matches!(
            designer.gesture(),
            Gesture::Resizing {
                handle: ResizeHandle::BottomRight,
                ..
            }
        ));
        designer.release();

        assert!(designer.press(pos2(100.0, 100.0)));
        assert!(matches!(designer.gesture(), Gesture::Moving { .. }));
        designer.release();

        assert!(!designer.press(pos2(250.0, 300.0)));
        assert_eq!(designer.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_live_resize_keeps_ratio() {
        let mut designer = Designer::default();
        designer.set_logo(logo("a.png"));
        designer.press(pos2(150.0, 150.0));

        for step in 1..=20 {
            let pointer = pos2(150.0 + step as f32 * 4.0, 150.0 + step as f32);
            designer.update_gesture(pointer);
            let geometry = designer.overlay().unwrap();
            assert!((geometry.width - geometry.height).abs() < 1e-4);
        }
        designer.release();
        assert_eq!(designer.overlay().unwrap().width, 180.0);
    }

    #[test]
    fn test_drag_over_leave_and_drop() {
        let mut designer = Designer::default();
        assert!(designer.sync_drag_input(true, &[]).is_none());
        assert!(designer.drop_zone().is_highlighted());
        designer.sync_drag_input(false, &[]);
        assert!(!designer.drop_zone().is_highlighted());

        designer.sync_drag_input(true, &[]);
        let file = DroppedFile {
            path: Some(PathBuf::from("logo.png")),
            ..Default::default()
        };
        let source = designer.sync_drag_input(false, &[file]);
        assert!(!designer.drop_zone().is_highlighted());
        assert!(matches!(source, Some(LogoSource::Path(_))));
        // Dropping doesn't touch the logo until the read completes
        assert!(designer.overlay().is_none());
    }

    #[tokio::test]
    async fn test_dropped_file_sets_logo_like_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.png");
        std::fs::write(&path, logo("unused").bytes()).unwrap();

        let mut designer = Designer::default();
        designer.sync_drag_input(true, &[]);
        let file = DroppedFile {
            path: Some(path),
            ..Default::default()
        };
        let source = designer.sync_drag_input(false, &[file]).unwrap();
        let asset = load_logo(source).await.unwrap();
        designer.set_logo(asset);

        assert_eq!(designer.logo().unwrap().name, "dropped.png");
        assert!(designer.logo().unwrap().is_renderable());
        assert_eq!(designer.overlay(), Some(OverlayGeometry::default()));
        assert!(!designer.drop_zone().is_highlighted());
    }

    #[test]
    fn test_snapshot_tracks_live_geometry() {
        let mut designer = Designer::new(vec2(200.0, 200.0));
        assert!(designer.snapshot(None, 1.0).logo.is_none());

        designer.set_logo(logo("a.png"));
        designer.begin_move(pos2(60.0, 60.0));
        designer.update_gesture(pos2(70.0, 65.0));

        let snapshot = designer.snapshot(None, 2.0);
        let placed = snapshot.logo.unwrap();
        assert_eq!((placed.geometry.x, placed.geometry.y), (60.0, 55.0));
        assert!(placed.image.is_some());
        assert_eq!(snapshot.scale, 2.0);
    }
}
