//! The canvas widget: shows the rasterized board and feeds it pointer events.

use crate::ui::to_color32;
use egui::{Color32, Pos2, Rect, Sense, Stroke, StrokeKind, TextureHandle, TextureOptions, Vec2};
use inkboard_core::{BrushKind, Modifiers, PointerEvent, ShapeId, Whiteboard};
use inkboard_render::{CairoRenderer, Layer, RenderContext, Renderer};
use kurbo::Point;

const SELECTION_COLOR: Color32 = Color32::from_rgb(59, 130, 246);

/// Renders a [`Whiteboard`] into textures and routes pointer input to it.
///
/// The settled document is cached in `base` and only re-rendered when the board's
/// revision or its set of live shapes changes. Shapes under an active gesture are
/// redrawn into `live` each frame.
#[derive(Default)]
pub struct CanvasView {
    renderer: CairoRenderer,
    base: Option<TextureHandle>,
    base_key: Option<(u64, Vec<ShapeId>)>,
    live: Option<TextureHandle>,
}

impl CanvasView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the canvas at its configured size.
    pub fn show(&mut self, ui: &mut egui::Ui, board: &mut Whiteboard) {
        let (width, height) = (board.config().canvas_width, board.config().canvas_height);
        let size = Vec2::new(width as f32, height as f32);
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let origin = response.rect.min;

        self.handle_input(ui, &response, origin, board);
        let live = board.live_shapes();
        self.refresh_base(ui.ctx(), board, &live);
        self.refresh_live(ui.ctx(), board, &live);

        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        for texture in [&self.base, &self.live].into_iter().flatten() {
            painter.image(texture.id(), response.rect, uv, Color32::WHITE);
        }

        let to_screen = |p: Point| origin + Vec2::new(p.x as f32, p.y as f32);
        let to_screen_rect =
            |r: kurbo::Rect| Rect::from_min_max(to_screen(Point::new(r.x0, r.y0)), to_screen(Point::new(r.x1, r.y1)));

        for id in &board.canvas().selection {
            if let Some(shape) = board.canvas().document.get_shape(*id) {
                painter.rect_stroke(
                    to_screen_rect(shape.bounds()).expand(2.0),
                    0.0,
                    Stroke::new(1.0, SELECTION_COLOR),
                    StrokeKind::Outside,
                );
            }
        }

        if let Some(marquee) = board.marquee() {
            let rect = to_screen_rect(marquee);
            painter.rect_filled(rect, 0.0, SELECTION_COLOR.gamma_multiply(0.1));
            painter.rect_stroke(rect, 0.0, Stroke::new(1.0, SELECTION_COLOR), StrokeKind::Inside);
        }

        if let (Some(points), Some(brush)) = (board.stroke_preview(), board.tools().brush()) {
            let color = match brush.kind {
                BrushKind::Pencil => to_color32(brush.color),
                BrushKind::Eraser => Color32::from_gray(200).gamma_multiply(0.6),
            };
            let points: Vec<Pos2> = points.iter().map(|p| to_screen(*p)).collect();
            painter.add(egui::Shape::line(points, Stroke::new(brush.width as f32, color)));
        }
    }

    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        origin: Pos2,
        board: &mut Whiteboard,
    ) {
        let (pressed, released, moved, pos, shift) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.delta() != Vec2::ZERO,
                i.pointer.interact_pos(),
                i.modifiers.shift,
            )
        });
        let Some(pos) = pos else {
            return;
        };
        let position = Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);
        let active = board.tools().is_active();

        if pressed && response.hovered() {
            board.handle_pointer(PointerEvent::Down {
                position,
                modifiers: Modifiers { shift },
            });
        }
        if moved && (active || response.hovered()) {
            board.handle_pointer(PointerEvent::Move { position });
        }
        if released && board.tools().is_active() {
            board.handle_pointer(PointerEvent::Up { position });
        }
    }

    fn refresh_base(&mut self, ctx: &egui::Context, board: &Whiteboard, live: &[ShapeId]) {
        let key = (board.revision(), live.to_vec());
        if self.base.is_some() && self.base_key.as_ref() == Some(&key) {
            return;
        }
        if let Some(image) = self.render_layer(board, Layer::Base(live)) {
            upload(ctx, &mut self.base, "inkboard-base", image);
            self.base_key = Some(key);
        }
    }

    fn refresh_live(&mut self, ctx: &egui::Context, board: &Whiteboard, live: &[ShapeId]) {
        if live.is_empty() {
            self.live = None;
            return;
        }
        if let Some(image) = self.render_layer(board, Layer::Live(live)) {
            upload(ctx, &mut self.live, "inkboard-live", image);
        }
    }

    fn render_layer(&mut self, board: &Whiteboard, layer: Layer<'_>) -> Option<egui::ColorImage> {
        let config = board.config();
        let render_ctx = RenderContext::new(
            &board.canvas().document,
            config.canvas_width,
            config.canvas_height,
        )
        .with_background(config.background())
        .with_layer(layer);
        match self.renderer.render(&render_ctx) {
            Ok(pixels) => Some(egui::ColorImage::from_rgba_unmultiplied(
                [pixels.width() as usize, pixels.height() as usize],
                pixels.as_raw(),
            )),
            Err(e) => {
                log::error!("Failed to render canvas: {}", e);
                None
            }
        }
    }
}

fn upload(ctx: &egui::Context, slot: &mut Option<TextureHandle>, name: &str, image: egui::ColorImage) {
    match slot {
        Some(texture) => texture.set(image, TextureOptions::LINEAR),
        None => *slot = Some(ctx.load_texture(name, image, TextureOptions::LINEAR)),
    }
}
