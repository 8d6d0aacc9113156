use crate::config::DesignerConfig;
use crate::designer::Designer;
use crate::export::{export_design, ExportError, SceneSnapshot};
use crate::fit;
use crate::logo::{load_logo, LoadError, LogoAsset, LogoSource, IMAGE_EXTENSIONS};
use crate::overlay::{handle_rects, hit_test_handle, OverlayGeometry, HANDLE_HIT_RADIUS};
use crate::ui_theme::DesignerTheme;
use eframe::egui::{self, pos2, Color32, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use image::imageops;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

const PLACEHOLDER_TEXT: &str = "Drag and Drop Logo Here";

/// Texture uploaded for display. Large images are shrunk to what the GPU
/// accepts; `natural_size` keeps the source dimensions for layout.
struct DisplayTexture {
    handle: egui::TextureHandle,
    natural_size: Vec2,
}

impl DisplayTexture {
    fn upload(ctx: &egui::Context, name: &str, img: &RgbaImage) -> Self {
        let max_side = ctx.input(|i| i.max_texture_side);
        Self {
            handle: ctx.load_texture(name, texture_image(img, max_side), egui::TextureOptions::LINEAR),
            natural_size: Vec2::new(img.width() as f32, img.height() as f32),
        }
    }
}

pub struct DesignerApp {
    designer: Designer,
    config: DesignerConfig,
    theme: DesignerTheme,

    // Background shirt, kept as pixels for export and as a texture for display
    background: Option<Arc<RgbaImage>>,
    background_texture: Option<DisplayTexture>,
    logo_texture: Option<DisplayTexture>,

    // Screen rect of the design area from the last layout pass.
    // Serves as both the drop target and the export source.
    container_rect: Option<Rect>,

    // Runtime
    runtime: Option<tokio::runtime::Runtime>,

    // Results of background tasks
    logo_sender: mpsc::UnboundedSender<Result<LogoAsset, LoadError>>,
    logo_receiver: mpsc::UnboundedReceiver<Result<LogoAsset, LoadError>>,
    export_sender: mpsc::UnboundedSender<Result<Option<PathBuf>, ExportError>>,
    export_receiver: mpsc::UnboundedReceiver<Result<Option<PathBuf>, ExportError>>,
}

impl DesignerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DesignerConfig) -> Self {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => Some(rt),
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                None
            }
        };

        Self::with_context(&cc.egui_ctx, config, runtime)
    }

    fn with_context(
        ctx: &egui::Context,
        config: DesignerConfig,
        runtime: Option<tokio::runtime::Runtime>,
    ) -> Self {
        let theme = DesignerTheme::default();
        theme.apply_to_ctx(ctx);

        let (logo_sender, logo_receiver) = mpsc::unbounded_channel();
        let (export_sender, export_receiver) = mpsc::unbounded_channel();

        let background = load_background(&config.background_path());
        let background_texture = background
            .as_ref()
            .map(|img| DisplayTexture::upload(ctx, "shirt", img));

        Self {
            designer: Designer::default(),
            config,
            theme,
            background,
            background_texture,
            logo_texture: None,
            container_rect: None,
            runtime,
            logo_sender,
            logo_receiver,
            export_sender,
            export_receiver,
        }
    }

    fn pick_logo(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.spawn_load(ctx, LogoSource::Path(path));
        }
    }

    fn spawn_load(&self, ctx: &egui::Context, source: LogoSource) {
        let Some(rt) = &self.runtime else {
            log::error!("No runtime, can't load {}", source.name());
            return;
        };

        let sender = self.logo_sender.clone();
        let ctx = ctx.clone();
        rt.spawn(async move {
            let _ = sender.send(load_logo(source).await);
            ctx.request_repaint();
        });
    }

    fn download_design(&self, ctx: &egui::Context) {
        let Some(rt) = &self.runtime else {
            log::error!("No runtime, can't export");
            return;
        };

        let scene = self.export_scene(ctx.pixels_per_point());
        let dir = self.config.output_dir();
        let sender = self.export_sender.clone();
        let ctx = ctx.clone();
        rt.spawn(async move {
            let _ = sender.send(export_design(scene, dir).await);
            ctx.request_repaint();
        });
    }

    /// What the export would capture right now; `None` before the first layout.
    fn export_scene(&self, scale: f32) -> Option<SceneSnapshot> {
        self.container_rect
            .map(|_| self.designer.snapshot(self.background.clone(), scale))
    }

    fn set_logo(&mut self, ctx: &egui::Context, asset: LogoAsset) {
        self.logo_texture = asset
            .image()
            .map(|img| DisplayTexture::upload(ctx, "logo", img));
        self.designer.set_logo(asset);
    }

    fn poll_tasks(&mut self, ctx: &egui::Context) {
        // Every completed read is applied in arrival order, so the last one wins
        while let Ok(result) = self.logo_receiver.try_recv() {
            match result {
                Ok(asset) => self.set_logo(ctx, asset),
                Err(e) => log::warn!("Failed to read logo: {}", e),
            }
        }

        while let Ok(result) = self.export_receiver.try_recv() {
            match result {
                Ok(Some(path)) => log::info!("Design saved to {}", path.display()),
                Ok(None) => {}
                Err(e) => log::warn!("Failed to export design: {}", e),
            }
        }
    }

    fn handle_file_drag(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| (!i.raw.hovered_files.is_empty(), i.raw.dropped_files.clone()));
        if let Some(source) = self.designer.sync_drag_input(hovering, &dropped) {
            self.spawn_load(ctx, source);
        }
    }
}

impl eframe::App for DesignerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_tasks(ctx);
        self.handle_file_drag(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(self.theme.padding_medium);
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("T-Shirt Designer")
                        .font(self.theme.font_title.clone())
                        .strong()
                        .color(self.theme.text_primary),
                );
            });
            ui.add_space(self.theme.spacing_medium);

            let content_width =
                self.designer.bounds().x + self.theme.spacing_large + self.theme.button_size.x;
            ui.horizontal_top(|ui| {
                ui.add_space(((ui.available_width() - content_width) / 2.0).max(0.0));

                self.theme.card_frame().show(ui, |ui| {
                    self.show_design_area(ui);
                });

                ui.add_space(self.theme.spacing_large);
                self.show_action_buttons(ui);
            });
        });
    }
}

impl DesignerApp {
    fn show_design_area(&mut self, ui: &mut egui::Ui) {
        let (rect, _) = ui.allocate_exact_size(self.designer.bounds(), Sense::hover());
        self.container_rect = Some(rect);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, self.theme.radius_small, Color32::WHITE);

        if let Some(texture) = &self.background_texture {
            let uv = fit::cover_uv(texture.natural_size, rect.size());
            painter.image(texture.handle.id(), rect, uv, Color32::WHITE);
        }

        match self.designer.overlay() {
            Some(geometry) => self.show_overlay(ui, rect, geometry),
            None => self.show_placeholder(&painter, rect),
        }

        let border = self.theme.drop_zone_border(self.designer.drop_zone());
        painter.rect_stroke(rect.shrink(1.0), self.theme.radius_small, Stroke::new(2.0, border));
    }

    fn show_overlay(&mut self, ui: &mut egui::Ui, container: Rect, geometry: OverlayGeometry) {
        let offset = container.min.to_vec2();
        let to_local = |p: Pos2| p - offset;

        let hit_area = geometry.rect().translate(offset).expand(HANDLE_HIT_RADIUS);
        let response = ui.interact(hit_area, ui.id().with("logo_overlay"), Sense::drag());

        if response.drag_started() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.designer.press(to_local(pointer));
            }
        }
        if response.dragged() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.designer.update_gesture(to_local(pointer));
            }
        }
        if response.drag_stopped() {
            self.designer.release();
        }

        if let Some(hover) = response.hover_pos() {
            let local = to_local(hover);
            if let Some(handle) = hit_test_handle(local, &geometry) {
                ui.ctx().set_cursor_icon(handle.cursor_icon());
            } else if geometry.rect().contains(local) {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Move);
            }
        }

        // Paint with the geometry after this frame's pointer input
        let geometry = self.designer.overlay().unwrap_or(geometry);
        let overlay_rect = geometry.rect().translate(offset);
        let painter = ui.painter_at(container);

        match &self.logo_texture {
            Some(texture) => {
                let target = fit::contain_rect(texture.natural_size, overlay_rect);
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                painter.image(texture.handle.id(), target, uv, Color32::WHITE);
            }
            None => self.paint_broken_image(&painter, overlay_rect),
        }

        if response.hovered() || self.designer.gesture().is_active() {
            let outline = self.theme.overlay_outline;
            painter.rect_stroke(overlay_rect, 0.0, Stroke::new(1.0, outline));
            for (_, handle) in handle_rects(overlay_rect) {
                let knob = Rect::from_center_size(handle.center(), egui::vec2(6.0, 6.0));
                painter.rect_filled(knob, 1.0, Color32::WHITE);
                painter.rect_stroke(knob, 1.0, Stroke::new(1.0, outline));
            }
        }

        if let Some(logo) = self.designer.logo() {
            let note = if logo.is_renderable() { "" } else { ", not an image" };
            response.on_hover_text(format!(
                "{} ({}, {} bytes{})",
                logo.name,
                logo.mime,
                logo.bytes().len(),
                note
            ));
        }
    }

    fn paint_broken_image(&self, painter: &egui::Painter, rect: Rect) {
        let stroke = Stroke::new(1.0, self.theme.broken_image);
        let icon = Rect::from_min_size(rect.min, egui::vec2(16.0, 16.0).min(rect.size()));
        painter.rect_stroke(icon, 2.0, stroke);
        painter.line_segment([icon.left_top(), icon.right_bottom()], stroke);
        painter.line_segment([icon.right_top(), icon.left_bottom()], stroke);
    }

    fn show_placeholder(&self, painter: &egui::Painter, rect: Rect) {
        let inner = rect.shrink(self.theme.spacing_small);
        painter.rect_filled(rect, self.theme.radius_small, self.theme.placeholder_fill);

        let outline = [
            inner.left_top(),
            inner.right_top(),
            inner.right_bottom(),
            inner.left_bottom(),
            inner.left_top(),
        ];
        painter.extend(Shape::dashed_line(
            &outline,
            Stroke::new(2.0, self.theme.placeholder_border),
            6.0,
            4.0,
        ));

        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            PLACEHOLDER_TEXT,
            self.theme.font_medium.clone(),
            self.theme.text_muted,
        );
    }

    fn show_action_buttons(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            let theme = &self.theme;
            let upload = theme.action_button(ui, "Upload Logo", theme.upload, theme.upload_hover);
            ui.add_space(theme.spacing_medium);
            let download =
                theme.action_button(ui, "Download Design", theme.download, theme.download_hover);

            if upload.clicked() {
                self.pick_logo(ui.ctx());
            }
            if download.clicked() {
                self.download_design(ui.ctx());
            }
        });
    }
}

fn load_background(path: &Path) -> Option<Arc<RgbaImage>> {
    match image::open(path) {
        Ok(img) => {
            log::info!("Loaded background {}", path.display());
            Some(Arc::new(img.to_rgba8()))
        }
        Err(e) => {
            log::warn!("Background {} unavailable: {}", path.display(), e);
            None
        }
    }
}

/// Pixels for a GPU texture, scaled down so neither side exceeds `max_side`.
fn texture_image(img: &RgbaImage, max_side: usize) -> egui::ColorImage {
    let max_side = u32::try_from(max_side).unwrap_or(u32::MAX).max(1);
    let (width, height) = img.dimensions();
    if width <= max_side && height <= max_side {
        return color_image(img);
    }

    let scale = max_side as f32 / width.max(height) as f32;
    let fit = |side: u32| ((side as f32 * scale).round() as u32).clamp(1, max_side);
    log::debug!("Downscaling {}x{} texture to fit {} px", width, height, max_side);
    color_image(&imageops::thumbnail(img, fit(width), fit(height)))
}

fn color_image(img: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [img.width() as usize, img.height() as usize],
        img.as_raw(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io;

    fn png_asset(name: &str, width: u32, height: u32) -> LogoAsset {
        let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut io::Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        LogoAsset::from_bytes(name.to_string(), bytes.into())
    }

    fn test_app(ctx: &egui::Context) -> (DesignerApp, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = DesignerConfig {
            background_path: Some(dir.path().join("missing-shirt.png")),
            output_dir: Some(dir.path().to_path_buf()),
        };
        (DesignerApp::with_context(ctx, config, None), dir)
    }

    #[test]
    fn test_texture_image_fits_max_side() {
        let wide = RgbaImage::new(20000, 2);
        let image = texture_image(&wide, 4096);
        assert!(image.size[0] <= 4096 && image.size[1] <= 4096);
        assert_eq!(image.size, [4096, 1]);

        let tall = RgbaImage::new(300, 9000);
        let image = texture_image(&tall, 2048);
        assert_eq!(image.size, [68, 2048]);

        let small = RgbaImage::new(40, 30);
        assert_eq!(texture_image(&small, 2048).size, [40, 30]);
    }

    #[test]
    fn test_oversized_logo_uploads_within_limit() {
        let ctx = egui::Context::default();
        let (mut app, _dir) = test_app(&ctx);
        let max_side = ctx.input(|i| i.max_texture_side);

        app.set_logo(&ctx, png_asset("banner.png", max_side as u32 * 3, 2));

        let texture = app.logo_texture.as_ref().unwrap();
        let [width, height] = texture.handle.size();
        assert!(width <= max_side && height <= max_side);
        assert_eq!(texture.natural_size, Vec2::new(max_side as f32 * 3.0, 2.0));
        // Export still gets the full resolution pixels
        let full = app.designer.logo().unwrap().image().unwrap();
        assert_eq!(full.width(), max_side as u32 * 3);
    }

    #[test]
    fn test_failed_read_keeps_current_logo() {
        let ctx = egui::Context::default();
        let (mut app, _dir) = test_app(&ctx);
        app.set_logo(&ctx, png_asset("first.png", 8, 8));
        app.designer.begin_move(pos2(100.0, 100.0));
        app.designer.update_gesture(pos2(120.0, 130.0));
        app.designer.release();
        let placed = app.designer.overlay();

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        app.logo_sender.send(Err(LoadError::IoError(missing))).unwrap();
        app.poll_tasks(&ctx);

        assert_eq!(app.designer.logo().unwrap().name, "first.png");
        assert_eq!(app.designer.overlay(), placed);
        assert!(app.logo_texture.is_some());
    }

    #[test]
    fn test_last_completed_read_wins() {
        let ctx = egui::Context::default();
        let (mut app, _dir) = test_app(&ctx);
        app.set_logo(&ctx, png_asset("first.png", 8, 8));
        app.designer.begin_move(pos2(100.0, 100.0));
        app.designer.update_gesture(pos2(110.0, 110.0));
        app.designer.release();

        app.logo_sender.send(Ok(png_asset("slow.png", 8, 8))).unwrap();
        app.logo_sender.send(Ok(png_asset("fast.png", 16, 4))).unwrap();
        app.poll_tasks(&ctx);

        assert_eq!(app.designer.logo().unwrap().name, "fast.png");
        assert_eq!(app.designer.overlay(), Some(OverlayGeometry::default()));
        let texture = app.logo_texture.as_ref().unwrap();
        assert_eq!(texture.natural_size, Vec2::new(16.0, 4.0));
    }

    #[test]
    fn test_no_export_scene_before_layout() {
        let ctx = egui::Context::default();
        let (mut app, _dir) = test_app(&ctx);
        assert!(app.export_scene(1.0).is_none());

        app.container_rect = Some(Rect::from_min_size(pos2(10.0, 10.0), app.designer.bounds()));
        let scene = app.export_scene(2.0).unwrap();
        assert_eq!(scene.size, app.designer.bounds());
        assert_eq!(scene.scale, 2.0);
        assert!(scene.background.is_none());
        assert!(scene.logo.is_none());
    }
}
