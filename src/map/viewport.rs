use std::f64::consts::SQRT_2;

use eframe::egui::{Pos2, Rect, Vec2, vec2};

use super::layout::MapCluster;

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 2.4;

pub const AUTO_FIT_DELAY_SECS: f64 = 0.5;
pub const AUTO_FIT_DURATION_SECS: f64 = 0.45;
pub const SMOOTH_ZOOM_DURATION_SECS: f64 = 0.35;

const FIT_PADDING: f32 = 60.0;
const FIT_MIN_SCALE: f32 = 0.5;
const FIT_MAX_SCALE: f32 = 1.6;

const NODE_FADE_START: f32 = 0.55;
const NODE_FADE_SPAN: f32 = 0.4;
const NODE_MIN_OPACITY: f32 = 0.2;
const PILL_FADE_START: f32 = 0.95;
const PILL_FADE_SPAN: f32 = 0.35;
const LINK_OPACITY_THRESHOLD: f32 = 0.6;

const ZOOM_RHO: f64 = SQRT_2;
const ZOOM_EPSILON_SQ: f64 = 1e-12;

/// Uniform scale plus translation, mapping world coordinates to
/// canvas-local screen coordinates: `screen = world * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn world_to_screen(self, world: Vec2) -> Pos2 {
        (world * self.scale + self.translate).to_pos2()
    }

    pub fn screen_to_world(self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translate) / self.scale
    }

    /// Rescales by `factor` while keeping the world point under `anchor`
    /// fixed on screen.
    pub fn zoomed_at(self, anchor: Pos2, factor: f32) -> Self {
        let world = self.screen_to_world(anchor);
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        Self {
            translate: anchor.to_vec2() - world * scale,
            scale,
        }
    }

    pub fn panned_by(self, delta: Vec2) -> Self {
        Self {
            translate: self.translate + delta,
            scale: self.scale,
        }
    }

    pub fn node_opacity(self) -> f32 {
        ((self.scale - NODE_FADE_START) / NODE_FADE_SPAN).clamp(NODE_MIN_OPACITY, 1.0)
    }

    pub fn pill_opacity(self) -> f32 {
        ((self.scale - PILL_FADE_START) / PILL_FADE_SPAN).clamp(0.0, 1.0)
    }

    pub fn links_visible(self) -> bool {
        self.node_opacity() > LINK_OPACITY_THRESHOLD
    }

    fn view_rect(self, size: Vec2) -> ZoomView {
        let center = self.screen_to_world((size * 0.5).to_pos2());
        ZoomView {
            center_x: f64::from(center.x),
            center_y: f64::from(center.y),
            width: f64::from(size.x.max(1.0)) / f64::from(self.scale),
        }
    }

    fn from_view_rect(view: ZoomView, size: Vec2) -> Self {
        let scale = (f64::from(size.x.max(1.0)) / view.width) as f32;
        let center = vec2(view.center_x as f32, view.center_y as f32);
        Self {
            translate: size * 0.5 - center * scale,
            scale,
        }
    }
}

/// World-space bounding box of every cluster halo.
pub fn halo_bounds(clusters: &[MapCluster]) -> Option<Rect> {
    clusters
        .iter()
        .map(|cluster| Rect::from_center_size(cluster.center.to_pos2(), Vec2::splat(cluster.radius * 2.0)))
        .reduce(|bounds, halo| bounds.union(halo))
}

/// Transform that centers `bounds` in a `size` viewport with padding on
/// every side.
pub fn fit_transform(bounds: Rect, size: Vec2) -> ViewTransform {
    let usable = (size - Vec2::splat(FIT_PADDING * 2.0)).max(Vec2::splat(1.0));
    let extent = bounds.size().max(Vec2::splat(1.0));
    let scale = (usable.x / extent.x)
        .min(usable.y / extent.y)
        .clamp(FIT_MIN_SCALE, FIT_MAX_SCALE);
    ViewTransform {
        translate: size * 0.5 - bounds.center().to_vec2() * scale,
        scale,
    }
}

#[derive(Clone, Copy, Debug)]
struct ZoomView {
    center_x: f64,
    center_y: f64,
    width: f64,
}

/// Smooth pan-and-zoom path between two view rectangles (van Wijk and Nuij,
/// "Smooth and efficient zooming and panning").
#[derive(Clone, Copy, Debug)]
struct ZoomPath {
    from: ZoomView,
    dx: f64,
    dy: f64,
    length: f64,
    curve: Option<ZoomCurve>,
}

#[derive(Clone, Copy, Debug)]
struct ZoomCurve {
    distance: f64,
    r0: f64,
}

impl ZoomPath {
    fn new(from: ZoomView, to: ZoomView) -> Self {
        let dx = to.center_x - from.center_x;
        let dy = to.center_y - from.center_y;
        let distance_sq = dx * dx + dy * dy;
        let rho_sq = ZOOM_RHO * ZOOM_RHO;

        if distance_sq < ZOOM_EPSILON_SQ {
            return Self {
                from,
                dx,
                dy,
                length: (to.width / from.width).ln() / ZOOM_RHO,
                curve: None,
            };
        }

        let distance = distance_sq.sqrt();
        let rho_quad_d = rho_sq * rho_sq * distance_sq;
        let width_sq_delta = to.width * to.width - from.width * from.width;
        let b0 = (width_sq_delta + rho_quad_d) / (2.0 * from.width * rho_sq * distance);
        let b1 = (width_sq_delta - rho_quad_d) / (2.0 * to.width * rho_sq * distance);
        let r0 = ((b0 * b0 + 1.0).sqrt() - b0).ln();
        let r1 = ((b1 * b1 + 1.0).sqrt() - b1).ln();

        Self {
            from,
            dx,
            dy,
            length: (r1 - r0) / ZOOM_RHO,
            curve: Some(ZoomCurve { distance, r0 }),
        }
    }

    fn at(&self, t: f64) -> ZoomView {
        let s = t * self.length;
        match self.curve {
            None => ZoomView {
                center_x: self.from.center_x + t * self.dx,
                center_y: self.from.center_y + t * self.dy,
                width: self.from.width * (ZOOM_RHO * s).exp(),
            },
            Some(ZoomCurve { distance, r0 }) => {
                let rho_sq = ZOOM_RHO * ZOOM_RHO;
                let cosh_r0 = r0.cosh();
                let u = self.from.width / (rho_sq * distance)
                    * (cosh_r0 * (ZOOM_RHO * s + r0).tanh() - r0.sinh());
                ZoomView {
                    center_x: self.from.center_x + u * self.dx,
                    center_y: self.from.center_y + u * self.dy,
                    width: self.from.width * cosh_r0 / (ZOOM_RHO * s + r0).cosh(),
                }
            }
        }
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Clone, Copy, Debug)]
struct ViewAnimation {
    started_at: f64,
    duration: f64,
    path: ZoomPath,
    target: ViewTransform,
}

/// Camera state for one canvas: the live transform, a running transition
/// and the one-shot auto-fit timer.
#[derive(Debug)]
pub struct Viewport {
    size: Vec2,
    transform: ViewTransform,
    animation: Option<ViewAnimation>,
    auto_fit_at: Option<f64>,
}

impl Viewport {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            transform: ViewTransform::IDENTITY,
            animation: None,
            auto_fit_at: None,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn has_pending_auto_fit(&self) -> bool {
        self.auto_fit_at.is_some()
    }

    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        self.animation = None;
        self.transform = self.transform.zoomed_at(anchor, factor);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.animation = None;
        self.transform = self.transform.panned_by(delta);
    }

    pub fn animate_to(&mut self, target: ViewTransform, now: f64, duration: f64) {
        let target = ViewTransform {
            scale: target.scale.clamp(MIN_SCALE, MAX_SCALE),
            ..target
        };
        if duration <= 0.0 {
            self.animation = None;
            self.transform = target;
            return;
        }

        let path = ZoomPath::new(
            self.transform.view_rect(self.size),
            target.view_rect(self.size),
        );
        self.animation = Some(ViewAnimation {
            started_at: now,
            duration,
            path,
            target,
        });
    }

    /// Zooms about the center of the canvas along the smooth zoom path.
    pub fn smooth_zoom_to(&mut self, target_scale: f32, now: f64, duration: f64) {
        let scale = target_scale.clamp(MIN_SCALE, MAX_SCALE);
        let center = (self.size * 0.5).to_pos2();
        let target = self.transform.zoomed_at(center, scale / self.transform.scale);
        self.animate_to(target, now, duration);
    }

    /// Starts the fit-to-halos transition. Returns false when there is
    /// nothing to fit.
    pub fn auto_fit(&mut self, clusters: &[MapCluster], now: f64) -> bool {
        self.auto_fit_at = None;
        let Some(bounds) = halo_bounds(clusters) else {
            return false;
        };
        self.animate_to(fit_transform(bounds, self.size), now, AUTO_FIT_DURATION_SECS);
        true
    }

    pub fn schedule_auto_fit(&mut self, at: f64) {
        self.auto_fit_at = Some(at);
    }

    /// Consumes the auto-fit timer once it is due.
    pub fn take_due_auto_fit(&mut self, now: f64) -> bool {
        match self.auto_fit_at {
            Some(at) if now >= at => {
                self.auto_fit_at = None;
                true
            }
            _ => false,
        }
    }

    /// Advances a running transition. Returns whether the transform changed.
    pub fn advance(&mut self, now: f64) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };

        let progress = ((now - animation.started_at) / animation.duration).clamp(0.0, 1.0);
        if progress >= 1.0 {
            self.transform = animation.target;
            self.animation = None;
            return true;
        }

        let view = animation.path.at(ease_cubic_in_out(progress));
        let next = ViewTransform::from_view_rect(view, self.size);
        if next.scale.is_finite() && next.translate.x.is_finite() && next.translate.y.is_finite() {
            self.transform = next;
        }
        true
    }

    /// Drops any transition and the auto-fit timer.
    pub fn cancel(&mut self) {
        self.animation = None;
        self.auto_fit_at = None;
    }
}
