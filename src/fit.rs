use eframe::egui::{pos2, vec2, Rect, Vec2};

/// Portion of the source image (in normalized UV space) that stays visible
/// when the image is scaled to cover `target` and center-cropped.
pub fn cover_uv(image_size: Vec2, target: Vec2) -> Rect {
    let full = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
    if image_size.x <= 0.0 || image_size.y <= 0.0 || target.x <= 0.0 || target.y <= 0.0 {
        return full;
    }

    let image_aspect = image_size.x / image_size.y;
    let target_aspect = target.x / target.y;

    if image_aspect > target_aspect {
        // Wider than the target: crop left and right
        let visible = target_aspect / image_aspect;
        let inset = (1.0 - visible) / 2.0;
        Rect::from_min_max(pos2(inset, 0.0), pos2(inset + visible, 1.0))
    } else {
        let visible = image_aspect / target_aspect;
        let inset = (1.0 - visible) / 2.0;
        Rect::from_min_max(pos2(0.0, inset), pos2(1.0, inset + visible))
    }
}

/// Scaled size and top-left offset of an image drawn with cover semantics
/// into a box of `target` size. Offsets are zero or negative.
pub fn cover_placement(image_size: Vec2, target: Vec2) -> (Vec2, Vec2) {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return (target, Vec2::ZERO);
    }
    let scale = (target.x / image_size.x).max(target.y / image_size.y);
    let size = image_size * scale;
    (size, (target - size) / 2.0)
}

/// Largest rect with the image's aspect ratio that fits inside `frame`,
/// centered in it.
pub fn contain_rect(image_size: Vec2, frame: Rect) -> Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return frame;
    }
    let scale = (frame.width() / image_size.x).min(frame.height() / image_size.y);
    let size = vec2(image_size.x * scale, image_size.y * scale);
    Rect::from_center_size(frame.center(), size)
}
