//! Orbit camera projecting world-space spheres onto the 2D egui painter.

use glam::{Mat4, Vec3};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
const MIN_PITCH: f32 = -1.5;
const MAX_PITCH: f32 = 1.5;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 20.0;

/// A sphere after projection to screen space.
#[derive(Clone, Copy, Debug)]
pub struct Projected {
    pub center: egui::Pos2,
    /// Projected radius in pixels.
    pub radius: f32,
    /// Distance along the view direction; larger is further away.
    pub depth: f32,
}

/// Camera orbiting a target point at a fixed distance.
///
/// ### Fields
/// - `target` - Point the camera looks at.
/// - `yaw` - Rotation around the world Y axis, in radians.
/// - `pitch` - Elevation above the XZ plane, in radians.
/// - `distance` - Distance from the target.
/// - `fov_y` - Vertical field of view, in radians.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov_y: f32,
}

impl Default for OrbitCamera {
    /// Eye at `(2, 2, 2)` looking at the origin with a 45° field of view.
    fn default() -> Self {
        let eye = Vec3::splat(2.0);
        Self {
            target: Vec3::ZERO,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: (eye.y / eye.length()).asin(),
            distance: eye.length(),
            fov_y: 45f32.to_radians(),
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(cp * cy, sp, cp * sy)
    }

    /// Rotates the camera by a screen drag of `delta` pixels.
    pub fn orbit(&mut self, delta: egui::Vec2) {
        self.yaw += delta.x * 0.01;
        self.pitch = (self.pitch + delta.y * 0.01).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Moves the camera toward (`factor < 1`) or away from the target.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(self.fov_y, aspect, NEAR, FAR);
        proj * view
    }

    /// Projects a sphere of `radius` at `pos` into `rect`.
    ///
    /// ### Returns
    /// `None` if the sphere center is behind the near plane.
    pub fn project(&self, pos: Vec3, radius: f32, rect: egui::Rect) -> Option<Projected> {
        let aspect = rect.width() / rect.height().max(1.0);
        let clip = self.view_proj(aspect) * pos.extend(1.0);
        if clip.w <= NEAR {
            return None;
        }

        let ndc = clip.truncate() / clip.w;
        let center = rect.center();
        let focal = rect.height() * 0.5 / (self.fov_y * 0.5).tan();

        Some(Projected {
            center: egui::pos2(
                center.x + ndc.x * rect.width() * 0.5,
                center.y - ndc.y * rect.height() * 0.5,
            ),
            radius: radius * focal / clip.w,
            depth: clip.w,
        })
    }
}
