use eframe::egui::{pos2, vec2, CursorIcon, Pos2, Rect, Vec2};

pub const DEFAULT_X: f32 = 50.0;
pub const DEFAULT_Y: f32 = 50.0;
pub const DEFAULT_WIDTH: f32 = 100.0;
pub const DEFAULT_HEIGHT: f32 = 100.0;

/// Smallest edge the overlay can be resized down to.
pub const MIN_SIZE: f32 = 10.0;

/// Pointer distance (in points) within which a handle counts as hit.
pub const HANDLE_HIT_RADIUS: f32 = 6.0;

/// Position and size of the logo overlay, in container-local points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for OverlayGeometry {
    fn default() -> Self {
        Self {
            x: DEFAULT_X,
            y: DEFAULT_Y,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl OverlayGeometry {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(pos2(self.x, self.y), vec2(self.width, self.height))
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Shrinks (keeping the aspect ratio) and shifts the box until it fits
    /// inside `bounds`.
    pub fn clamped(&self, bounds: Vec2) -> Self {
        let ratio = self.aspect_ratio();
        let mut width = self.width;
        let mut height = self.height;
        if width > bounds.x || height > bounds.y {
            width = width.min(bounds.x).min(bounds.y * ratio);
            height = width / ratio;
        }

        Self {
            x: self.x.clamp(0.0, (bounds.x - width).max(0.0)),
            y: self.y.clamp(0.0, (bounds.y - height).max(0.0)),
            width,
            height,
        }
    }

    /// Moves the box by `delta`, stopping at the container edges.
    pub fn translated(&self, delta: Vec2, bounds: Vec2) -> Self {
        Self {
            x: (self.x + delta.x).clamp(0.0, (bounds.x - self.width).max(0.0)),
            y: (self.y + delta.y).clamp(0.0, (bounds.y - self.height).max(0.0)),
            ..*self
        }
    }

    /// Resizes the box by dragging `handle` by `delta`.
    ///
    /// The side or corner opposite the handle stays put, `width / height`
    /// stays equal to `ratio`, and the result never leaves `bounds` or drops
    /// below [`MIN_SIZE`] on either edge (unless the bounds themselves are
    /// smaller than that).
    pub fn resized(&self, handle: ResizeHandle, delta: Vec2, ratio: f32, bounds: Vec2) -> Self {
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        let (dir_x, dir_y) = handle.direction();

        let proposed_width = self.width + delta.x * dir_x;
        let proposed_height = self.height + delta.y * dir_y;

        let width = match (dir_x == 0.0, dir_y == 0.0) {
            (true, _) => proposed_height * ratio,
            (_, true) => proposed_width,
            // Corners follow whichever axis the pointer pushed further
            _ => proposed_width.max(proposed_height * ratio),
        };

        let right = self.x + self.width;
        let bottom = self.y + self.height;

        let available_width = if dir_x < 0.0 { right } else { bounds.x - self.x };
        let available_height = if dir_y < 0.0 { bottom } else { bounds.y - self.y };

        let max_width = available_width.min(available_height * ratio).max(0.0);
        let min_width = MIN_SIZE.max(MIN_SIZE * ratio).min(max_width);

        let width = width.max(min_width).min(max_width);
        let height = width / ratio;

        Self {
            x: if dir_x < 0.0 { right - width } else { self.x },
            y: if dir_y < 0.0 { bottom - height } else { self.y },
            width,
            height,
        }
    }
}

/// The eight grab points around the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    /// Which way each axis grows when the pointer moves in its positive
    /// direction: -1 for the left/top sides, 1 for right/bottom, 0 if the
    /// handle doesn't control that axis.
    fn direction(self) -> (f32, f32) {
        match self {
            ResizeHandle::TopLeft => (-1.0, -1.0),
            ResizeHandle::Top => (0.0, -1.0),
            ResizeHandle::TopRight => (1.0, -1.0),
            ResizeHandle::Right => (1.0, 0.0),
            ResizeHandle::BottomRight => (1.0, 1.0),
            ResizeHandle::Bottom => (0.0, 1.0),
            ResizeHandle::BottomLeft => (-1.0, 1.0),
            ResizeHandle::Left => (-1.0, 0.0),
        }
    }

    /// Center of the handle on the given rect.
    pub fn anchor(self, rect: Rect) -> Pos2 {
        match self {
            ResizeHandle::TopLeft => rect.left_top(),
            ResizeHandle::Top => rect.center_top(),
            ResizeHandle::TopRight => rect.right_top(),
            ResizeHandle::Right => rect.right_center(),
            ResizeHandle::BottomRight => rect.right_bottom(),
            ResizeHandle::Bottom => rect.center_bottom(),
            ResizeHandle::BottomLeft => rect.left_bottom(),
            ResizeHandle::Left => rect.left_center(),
        }
    }

    pub fn cursor_icon(self) -> CursorIcon {
        match self {
            ResizeHandle::Top | ResizeHandle::Bottom => CursorIcon::ResizeVertical,
            ResizeHandle::Left | ResizeHandle::Right => CursorIcon::ResizeHorizontal,
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => CursorIcon::ResizeNwSe,
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => CursorIcon::ResizeNeSw,
        }
    }
}

/// Hit areas of every handle around `rect`.
pub fn handle_rects(rect: Rect) -> impl Iterator<Item = (ResizeHandle, Rect)> {
    ResizeHandle::ALL.into_iter().map(move |handle| {
        let area = Rect::from_center_size(
            handle.anchor(rect),
            Vec2::splat(HANDLE_HIT_RADIUS * 2.0),
        );
        (handle, area)
    })
}

pub fn hit_test_handle(pointer: Pos2, geometry: &OverlayGeometry) -> Option<ResizeHandle> {
    handle_rects(geometry.rect())
        .find(|(_, area)| area.contains(pointer))
        .map(|(handle, _)| handle)
}

/// Pointer gesture in progress on the overlay. Geometry and pointer are
/// captured at press time so every move is computed from the same origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Moving {
        origin: OverlayGeometry,
        start: Pos2,
    },
    Resizing {
        handle: ResizeHandle,
        origin: OverlayGeometry,
        start: Pos2,
        ratio: f32,
    },
}

impl Gesture {
    pub fn moving(origin: OverlayGeometry, start: Pos2) -> Self {
        Gesture::Moving { origin, start }
    }

    pub fn resizing(handle: ResizeHandle, origin: OverlayGeometry, start: Pos2) -> Self {
        Gesture::Resizing {
            handle,
            origin,
            start,
            ratio: origin.aspect_ratio(),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }

    /// Geometry for the pointer at `pointer`, or `None` when idle.
    pub fn apply(&self, pointer: Pos2, bounds: Vec2) -> Option<OverlayGeometry> {
        match *self {
            Gesture::Idle => None,
            Gesture::Moving { origin, start } => Some(origin.translated(pointer - start, bounds)),
            Gesture::Resizing {
                handle,
                origin,
                start,
                ratio,
            } => Some(origin.resized(handle, pointer - start, ratio, bounds)),
        }
    }
}
