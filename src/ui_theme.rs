use crate::drop_zone::DropZoneState;
use eframe::egui::{self, Color32, FontFamily, FontId, Rounding, Shadow, Stroke, Vec2};

pub struct DesignerTheme {
    // Colors
    pub background: Color32,
    pub card: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub upload: Color32,
    pub upload_hover: Color32,
    pub download: Color32,
    pub download_hover: Color32,
    pub drop_zone_idle: Color32,
    pub drop_zone_hover: Color32,
    pub placeholder_fill: Color32,
    pub placeholder_border: Color32,
    pub overlay_outline: Color32,
    pub broken_image: Color32,

    // Spacing
    pub spacing_small: f32,
    pub spacing_medium: f32,
    pub spacing_large: f32,
    pub padding_medium: f32,

    // Border radius
    pub radius_small: Rounding,
    pub radius_medium: Rounding,

    pub shadow_large: Shadow,

    // Typography
    pub font_medium: FontId,
    pub font_title: FontId,

    pub button_size: Vec2,
}

impl Default for DesignerTheme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(243, 244, 246),       // gray-100
            card: Color32::WHITE,
            text_primary: Color32::from_rgb(17, 24, 39),
            text_muted: Color32::from_rgb(107, 114, 128),       // gray-500
            upload: Color32::from_rgb(59, 130, 246),            // blue-500
            upload_hover: Color32::from_rgb(37, 99, 235),       // blue-600
            download: Color32::from_rgb(34, 197, 94),           // green-500
            download_hover: Color32::from_rgb(22, 163, 74),     // green-600
            drop_zone_idle: Color32::from_rgb(229, 231, 235),   // #e5e7eb
            drop_zone_hover: Color32::from_rgb(76, 175, 80),    // #4CAF50
            placeholder_fill: Color32::from_rgba_unmultiplied(249, 250, 251, 191),
            placeholder_border: Color32::from_rgb(209, 213, 219), // gray-300
            overlay_outline: Color32::from_rgb(59, 130, 246),
            broken_image: Color32::from_rgb(156, 163, 175),

            spacing_small: 4.0,
            spacing_medium: 16.0,
            spacing_large: 40.0,
            padding_medium: 24.0,

            radius_small: Rounding::same(4.0),
            radius_medium: Rounding::same(6.0),

            shadow_large: Shadow {
                offset: egui::vec2(0.0, 8.0),
                blur: 20.0,
                spread: 0.0,
                color: Color32::from_black_alpha(40),
            },

            font_medium: FontId::new(14.0, FontFamily::Proportional),
            font_title: FontId::new(24.0, FontFamily::Proportional),

            button_size: egui::vec2(160.0, 36.0),
        }
    }
}

impl DesignerTheme {
    pub fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals = egui::Visuals::light();
        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.background;
        style.visuals.widgets.inactive.rounding = self.radius_medium;
        style.visuals.widgets.hovered.rounding = self.radius_medium;
        style.visuals.widgets.active.rounding = self.radius_medium;

        style.text_styles = [
            (egui::TextStyle::Heading, self.font_title.clone()),
            (egui::TextStyle::Body, self.font_medium.clone()),
            (egui::TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
            (egui::TextStyle::Button, self.font_medium.clone()),
            (egui::TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        ]
        .into();

        ctx.set_style(style);
    }

    /// Border color of the design area for the current drag state.
    pub fn drop_zone_border(&self, state: DropZoneState) -> Color32 {
        match state {
            DropZoneState::Hovering => self.drop_zone_hover,
            DropZoneState::Idle => self.drop_zone_idle,
        }
    }

    pub fn card_frame(&self) -> egui::Frame {
        egui::Frame {
            rounding: self.radius_small,
            shadow: self.shadow_large,
            fill: self.card,
            ..Default::default()
        }
    }

    /// Solid, fixed-size button that darkens on hover.
    pub fn action_button(
        &self,
        ui: &mut egui::Ui,
        label: &str,
        fill: Color32,
        hover_fill: Color32,
    ) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(self.button_size, egui::Sense::click());
        let bg = if response.hovered() { hover_fill } else { fill };

        let button = egui::Button::new(
            egui::RichText::new(label)
                .size(14.0)
                .color(Color32::WHITE)
                .strong(),
        )
        .rounding(self.radius_small)
        .fill(bg)
        .stroke(Stroke::NONE);

        ui.put(rect, button)
            .on_hover_cursor(egui::CursorIcon::PointingHand)
    }
}
