//! Board rendering for `PuzzleApp`.
//!
//! Each wedge is drawn as a projected outline: the equatorial arc of its
//! ball segment plus the top meridian. Pointer events on the board are
//! forwarded to the puzzle in board-local pixels.

use eframe::egui;
use glam::{Affine3A, Vec3};

use orange_twist::Highlight;

use super::PuzzleApp;

const ARC_STEPS: usize = 10;

/// Outline of a wedge in its own frame (outward axis `-Z`, Y up).
fn wedge_outline(radius: f32, half_angle: f32) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(ARC_STEPS + 6);
    points.push(Vec3::ZERO);
    for i in 0..=ARC_STEPS {
        let yaw = -half_angle + 2.0 * half_angle * i as f32 / ARC_STEPS as f32;
        points.push(Vec3::new(-yaw.sin(), 0.0, -yaw.cos()) * radius);
    }
    points.push(Vec3::ZERO);
    points.push(Vec3::Y * radius);
    let top = radius * std::f32::consts::FRAC_1_SQRT_2;
    points.push(Vec3::new(0.0, top, -top));
    points.push(Vec3::new(0.0, 0.0, -radius));
    points
}

fn wedge_color(original_index: usize, slices: usize, highlight: Option<&Highlight>) -> egui::Color32 {
    if let Some(h) = highlight {
        if h.primary == original_index {
            return egui::Color32::from_rgb(255, 214, 10);
        }
        if h.secondary.contains(&original_index) {
            return egui::Color32::from_rgb(255, 140, 60);
        }
    }
    let hue = original_index as f32 / slices.max(1) as f32;
    egui::ecolor::Hsva::new(hue, 0.75, 0.9, 1.0).into()
}

impl PuzzleApp {
    /// Render the puzzle and route pointer input into it.
    pub fn draw_board(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        self.puzzle.set_viewport(rect.width(), rect.height());

        self.forward_pointer(ctx, rect, response.hovered());

        let painter = ui.painter_at(rect);
        let config = self.puzzle.config();
        let outline = wedge_outline(config.radius, std::f32::consts::PI / config.slices as f32);
        let slices = config.slices;

        let transforms: Vec<(usize, Affine3A)> = match self.puzzle.registry().world_transforms(self.puzzle.scene()) {
            Ok(t) => t,
            Err(err) => {
                self.report::<()>(Err(err));
                return;
            }
        };

        let camera = *self.puzzle.camera();
        // Far wedges first so near outlines stay on top.
        let mut ordered: Vec<(f32, usize, Affine3A)> = transforms
            .into_iter()
            .map(|(idx, world)| {
                let centre = world.transform_point3(Vec3::new(0.0, 0.0, -0.5));
                ((centre - camera.eye()).length(), idx, world)
            })
            .collect();
        ordered.sort_by(|a, b| b.0.total_cmp(&a.0));

        let highlight = self.puzzle.highlight();
        for (_, idx, world) in ordered {
            let points: Vec<egui::Pos2> = outline
                .iter()
                .filter_map(|p| camera.project(world.transform_point3(*p)))
                .map(|[x, y]| rect.min + egui::vec2(x, y))
                .collect();
            if points.len() < 2 {
                continue;
            }
            let color = wedge_color(idx, slices, highlight);
            painter.add(egui::Shape::line(points, egui::Stroke::new(2.0, color)));

            if let Some([x, y]) = camera.project(world.transform_point3(Vec3::new(0.0, 0.35, -0.6))) {
                painter.text(
                    rect.min + egui::vec2(x, y),
                    egui::Align2::CENTER_CENTER,
                    idx.to_string(),
                    egui::FontId::proportional(14.0),
                    color,
                );
            }
        }
    }

    fn forward_pointer(&mut self, ctx: &egui::Context, rect: egui::Rect, hovered: bool) {
        let (pressed, released, pos, present, delta) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.pointer.has_pointer(),
                i.pointer.delta(),
            )
        });

        let Some(pos) = pos else {
            if !present {
                self.puzzle.pointer_leave();
            }
            return;
        };
        let local = pos - rect.min;

        if pressed && hovered {
            self.puzzle.pointer_down(local.x, local.y);
        }
        if delta != egui::Vec2::ZERO {
            let moved = self.puzzle.pointer_move(local.x, local.y);
            self.report(moved);
        }
        if released {
            let up = self.puzzle.pointer_up(local.x, local.y);
            self.report(up);
        }
    }
}
