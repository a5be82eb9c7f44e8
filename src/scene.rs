//! Interactive 3D scene over a [`NetworkLayout`].
//!
//! A [`Scene`] is an owned, disposable resource scoped to a single
//! (model, mode, theme, comparison) tuple: any change to that tuple drops
//! the whole scene and builds a fresh one, re-framing the camera on the new
//! bounding-box centroid. There is no incremental update path.
//!
//! Rendering is a software projection through the egui painter with a
//! continuously repainting frame loop. Pointer hit-testing unprojects the
//! cursor to a world ray and intersects it against connection geometry
//! only, throttled to one test per 100 ms.

use std::f32::consts::PI;

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

use crate::layout::{CameraFrame, NetworkLayout, CAMERA_FOV};

/// Minimum interval between pointer hit-tests, seconds.
const HOVER_THROTTLE: f64 = 0.1;
/// Extra world-space tolerance around a connection's radius when picking.
const PICK_SLOP: f32 = 0.03;
/// Hovered connections are recolored to this and drawn fully opaque.
const HIGHLIGHT_COLOR: Color32 = Color32::YELLOW;
/// World-space neuron sphere radius.
const NEURON_RADIUS: f32 = 0.4;
/// Vertical world offset of the index label above each neuron.
const LABEL_OFFSET: f32 = 0.8;

const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 1000.0;
const ORBIT_SENSITIVITY: f32 = 0.01;
const ZOOM_SENSITIVITY: f32 = 0.002;
const CAMERA_DAMPING: f32 = 0.1;

/// Hover payload surfaced to the surrounding UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoveredConnection {
    pub from: usize,
    pub to: usize,
    pub weight: f32,
    pub diff: Option<f32>,
}

/// Damped orbit camera around a focal point.
///
/// Input writes targets; [`OrbitCamera::step`] eases the live parameters
/// toward them each frame.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub focus: Point3<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
    target_distance: f32,
    target_yaw: f32,
    target_pitch: f32,
}

impl OrbitCamera {
    /// Frame the camera per the layout's fitted framing: focused on the
    /// bounding-box centroid, pulled back the fitted distance, with the
    /// side-by-side x offset folded into the starting yaw.
    pub fn from_frame(frame: &CameraFrame) -> Self {
        let offset = Vector3::new(frame.x_offset, 0.0, frame.distance);
        let distance = offset.norm().max(frame.min_distance);
        let yaw = frame.x_offset.atan2(frame.distance);
        Self {
            distance,
            yaw,
            pitch: 0.0,
            focus: frame.focus,
            min_distance: frame.min_distance,
            max_distance: frame.max_distance,
            target_distance: distance,
            target_yaw: yaw,
            target_pitch: 0.0,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.focus + Vector3::new(x, y, z)
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.target_yaw -= delta.x * ORBIT_SENSITIVITY;
        self.target_pitch = (self.target_pitch + delta.y * ORBIT_SENSITIVITY)
            .clamp(-PI / 2.0 + 0.1, PI / 2.0 - 0.1);
    }

    pub fn zoom(&mut self, scroll: f32) {
        let factor = 1.0 - scroll * ZOOM_SENSITIVITY;
        self.target_distance =
            (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Ease live parameters toward their targets.
    pub fn step(&mut self, dt: f32) {
        let factor = 1.0 - (1.0 - CAMERA_DAMPING).powf(dt * 60.0);
        self.distance += (self.target_distance - self.distance) * factor;
        self.yaw += (self.target_yaw - self.yaw) * factor;
        self.pitch += (self.target_pitch - self.pitch) * factor;
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position(), &self.focus, &Vector3::y())
    }

    fn projection(&self, aspect: f32) -> Perspective3<f32> {
        Perspective3::new(aspect.max(1e-3), CAMERA_FOV, CAMERA_NEAR, CAMERA_FAR)
    }

    /// Project a world point into the viewport. Returns the screen position
    /// and the view-space depth (positive in front of the camera).
    fn project(&self, point: Point3<f32>, rect: Rect) -> Option<(Pos2, f32)> {
        let aspect = rect.width() / rect.height().max(1.0);
        let view = self.view_matrix();
        let v = view.transform_point(&point);
        let depth = -v.z;
        if depth <= CAMERA_NEAR {
            return None;
        }
        let ndc = self.projection(aspect).project_point(&v);
        let x = rect.left() + (ndc.x + 1.0) * 0.5 * rect.width();
        let y = rect.top() + (1.0 - ndc.y) * 0.5 * rect.height();
        Some((Pos2::new(x, y), depth))
    }

    /// Screen pixels per world unit at the given view depth.
    fn pixels_per_unit(&self, rect: Rect, depth: f32) -> f32 {
        (rect.height() / 2.0) / ((CAMERA_FOV / 2.0).tan() * depth.max(CAMERA_NEAR))
    }

    /// Unproject a viewport position into a world-space ray from the camera.
    fn pointer_ray(&self, pos: Pos2, rect: Rect) -> (Point3<f32>, Vector3<f32>) {
        let aspect = rect.width() / rect.height().max(1.0);
        let ndc_x = (pos.x - rect.left()) / rect.width() * 2.0 - 1.0;
        let ndc_y = 1.0 - (pos.y - rect.top()) / rect.height() * 2.0;

        let origin = self.position();
        let view = self.view_matrix();
        // Camera basis in world space from the inverse rotation.
        let inv = view.try_inverse().unwrap_or_else(Matrix4::identity);
        let right = inv.transform_vector(&Vector3::x());
        let up = inv.transform_vector(&Vector3::y());
        let forward = inv.transform_vector(&-Vector3::z());

        let half_h = (CAMERA_FOV / 2.0).tan();
        let dir = (forward + right * (ndc_x * half_h * aspect) + up * (ndc_y * half_h))
            .normalize();
        (origin, dir)
    }
}

/// Shortest distance between a ray and a segment, with the ray parameter of
/// the closest approach.
fn ray_segment_distance(
    origin: Point3<f32>,
    dir: Vector3<f32>,
    a: Point3<f32>,
    b: Point3<f32>,
) -> (f32, f32) {
    let seg = b - a;
    let w = origin - a;

    let aa = dir.dot(&dir);
    let bb = dir.dot(&seg);
    let cc = seg.dot(&seg);
    let dd = dir.dot(&w);
    let ee = seg.dot(&w);

    let denom = aa * cc - bb * bb;
    // Near-parallel rays pin the segment parameter to its start.
    let s = if denom.abs() < 1e-8 {
        0.0
    } else {
        ((aa * ee - bb * dd) / denom).clamp(0.0, 1.0)
    };
    let t = ((bb * s - dd) / aa).max(0.0);

    let closest_ray = origin + dir * t;
    let closest_seg = a + seg * s;
    ((closest_ray - closest_seg).norm(), t)
}

/// Key identifying the configuration tuple a scene was built for. When the
/// key changes the scene must be discarded and rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneKey {
    pub model_id: String,
    pub mode: crate::layout::ViewMode,
    pub theme: crate::layout::Theme,
    pub pane: crate::layout::PanePosition,
    pub comparison_id: Option<String>,
}

/// Live scene state for one layout: camera, hover state, and the hit-test
/// throttle clock. Dropped wholesale on any configuration change.
pub struct Scene {
    layout: NetworkLayout,
    camera: OrbitCamera,
    theme: crate::layout::Theme,
    hovered: Option<usize>,
    last_hit_test: f64,
}

impl Scene {
    pub fn new(layout: NetworkLayout, theme: crate::layout::Theme) -> Self {
        let camera = OrbitCamera::from_frame(&layout.frame);
        log::info!(
            "scene built: {} neurons, {} connections, framing distance {:.1}",
            layout.neurons.len(),
            layout.connections.len(),
            layout.frame.distance
        );
        Self {
            layout,
            camera,
            theme,
            hovered: None,
            last_hit_test: f64::NEG_INFINITY,
        }
    }

    pub fn layout(&self) -> &NetworkLayout {
        &self.layout
    }

    /// Currently hovered connection, if any.
    pub fn hovered(&self) -> Option<HoveredConnection> {
        self.hovered.map(|i| {
            let c = &self.layout.connections[i];
            HoveredConnection {
                from: c.from,
                to: c.to,
                weight: c.weight,
                diff: c.diff,
            }
        })
    }

    /// Run one frame: input, camera damping, hit-test, paint. Returns the
    /// hover payload for the surrounding UI.
    pub fn show(&mut self, ui: &mut Ui, size: Vec2) -> Option<HoveredConnection> {
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        if response.dragged() {
            self.camera.orbit(response.drag_delta());
        }
        if let Some(pos) = ui.input(|i| i.pointer.hover_pos()) {
            if rect.contains(pos) {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    self.camera.zoom(scroll);
                }
            }
        }

        let dt = ui.input(|i| i.stable_dt).min(0.1);
        self.camera.step(dt);

        // Throttled pointer hit-test against connection geometry only.
        if let Some(pos) = response.hover_pos() {
            let now = ui.input(|i| i.time);
            if now - self.last_hit_test >= HOVER_THROTTLE {
                self.last_hit_test = now;
                let (origin, dir) = self.camera.pointer_ray(pos, rect);
                self.hovered = pick_connection(&self.layout, origin, dir);
            }
        } else {
            self.hovered = None;
        }

        self.paint(ui, rect);

        // Keep the render loop running.
        ui.ctx().request_repaint();

        self.hovered()
    }

    fn paint(&self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 8.0, self.theme.background());

        for (i, conn) in self.layout.connections.iter().enumerate() {
            let (Some((from, d0)), Some((to, d1))) = (
                self.camera.project(conn.from_pos, rect),
                self.camera.project(conn.to_pos, rect),
            ) else {
                continue;
            };
            let depth = (d0 + d1) / 2.0;
            let width = (conn.radius * 2.0 * self.camera.pixels_per_unit(rect, depth)).max(0.5);
            let (color, opacity) = if self.hovered == Some(i) {
                (HIGHLIGHT_COLOR, 1.0)
            } else {
                (conn.color, conn.opacity)
            };
            let color = color.gamma_multiply(opacity);
            painter.line_segment([from, to], Stroke::new(width, color));
        }

        let neuron_color = self.theme.neuron_color();
        let label_color = self.theme.label_color();
        for neuron in &self.layout.neurons {
            if let Some((pos, depth)) = self.camera.project(neuron.position, rect) {
                let radius = NEURON_RADIUS * self.camera.pixels_per_unit(rect, depth);
                painter.circle_filled(pos, radius, neuron_color);
            }
            let label_pos = neuron.position + Vector3::new(0.0, LABEL_OFFSET, 0.0);
            if let Some((pos, depth)) = self.camera.project(label_pos, rect) {
                let px = self.camera.pixels_per_unit(rect, depth);
                painter.text(
                    pos,
                    Align2::CENTER_CENTER,
                    neuron.index.to_string(),
                    FontId::proportional((px * 0.4).clamp(8.0, 18.0)),
                    label_color,
                );
            }
        }
    }
}

/// Nearest connection hit by the ray, by ray parameter. A connection is hit
/// when the ray passes within its radius (plus a small picking tolerance).
fn pick_connection(
    layout: &NetworkLayout,
    origin: Point3<f32>,
    dir: Vector3<f32>,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, conn) in layout.connections.iter().enumerate() {
        let (dist, t) = ray_segment_distance(origin, dir, conn.from_pos, conn.to_pos);
        if dist <= conn.radius + PICK_SLOP {
            if best.map_or(true, |(_, bt)| t < bt) {
                best = Some((i, t));
            }
        }
    }
    best.map(|(i, _)| i)
}
