//! Owns the cube's GPU objects and rotation, and draws it under the UI.

use tandem_engine::device::Gpu;
use tandem_engine::paint::Color;
use tandem_engine::render::mesh::{Mesh, ProgramDesc, RenderState, ShaderProgram};
use tandem_ui::app::{AfterRender, RenderHook};

use crate::cube;

/// Widget id of the status label.
pub const STATUS_LABEL: &str = "l1";
/// Degrees per millisecond.
pub const INITIAL_SPEED: f32 = 0.05;
const FPS_WINDOW_MS: f32 = 1000.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriverState {
    Uninitialized,
    ContextReady,
    Running,
    Released,
}

struct CubeGpu {
    mesh: Mesh,
    program: ShaderProgram,
}

/// Frames counted over a rolling one-second window.
#[derive(Debug, Default)]
struct FpsCounter {
    frames: u32,
    timer_ms: f32,
}

impl FpsCounter {
    /// Returns the frame count once more than a second has accumulated.
    fn tick(&mut self, dt_ms: f32) -> Option<u32> {
        self.frames += 1;
        self.timer_ms += dt_ms;
        if self.timer_ms <= FPS_WINDOW_MS {
            return None;
        }
        let frames = self.frames;
        self.timer_ms %= FPS_WINDOW_MS;
        self.frames = 0;
        Some(frames)
    }
}

pub struct FrameDriver {
    state: DriverState,
    gpu: Option<CubeGpu>,
    render_state: RenderState,
    angle: f32,
    speed: f32,
    fps: FpsCounter,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Uninitialized,
            gpu: None,
            render_state: RenderState::new(),
            angle: 0.0,
            speed: INITIAL_SPEED,
            fps: FpsCounter::default(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Uploads the cube and compiles its program. Runs once.
    pub fn on_context_created(&mut self, gpu: &Gpu<'_>) {
        if self.state != DriverState::Uninitialized {
            log::warn!("frame driver: context already initialized ({:?})", self.state);
            return;
        }

        self.render_state.set_clear_color(Color::from_premul(0.2, 0.4, 0.5, 0.0));
        self.render_state.set_clear_depth(1.0);
        self.render_state.enable_depth_test(Some(wgpu::CompareFunction::Less));

        let device = gpu.device();
        let mesh = Mesh::new(device, "cube", &cube::VERTICES, &cube::INDICES);
        let program = ShaderProgram::new(
            device,
            &ProgramDesc {
                label: "cube",
                source: cube::SHADER,
                color_format: gpu.surface_format(),
                depth_format: gpu.depth_format(),
                depth_compare: self.render_state.depth_compare(),
            },
        );

        self.gpu = Some(CubeGpu { mesh, program });
        self.state = DriverState::ContextReady;
        log::info!("frame driver: cube uploaded ({} indices)", cube::INDICES.len());
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(proj) = cube::projection(width, height) {
            self.render_state.set_projection_matrix(proj);
        }
    }

    /// Clears, advances the rotation and draws the cube into the frame the
    /// UI is about to draw over.
    pub fn on_before_render(&mut self, hook: &mut RenderHook<'_, '_, '_>) {
        if self.gpu.is_none() {
            return;
        }
        self.state = DriverState::Running;

        self.advance(hook.dt_ms);
        self.render_state.set_modelview_matrix(cube::modelview(self.angle));

        if let Some(gpu) = self.gpu.as_ref() {
            let mut rpass = self.render_state.begin_pass(hook.rctx, hook.target, true);
            gpu.program.bind(hook.rctx.queue, &mut rpass, self.render_state.mvp());
            gpu.mesh.draw(&mut rpass);
        }

        if let Some(frames) = self.fps.tick(hook.dt_ms) {
            hook.ui.set_text(STATUS_LABEL, status_line(frames, self.speed));
        }
    }

    /// Keeps frames coming while there is something to draw.
    pub fn on_after_render(&self, after: &mut AfterRender) {
        if matches!(self.state, DriverState::ContextReady | DriverState::Running) {
            after.request_redraw();
        }
    }

    /// Frees the GPU objects; nothing is drawn afterwards.
    pub fn release(&mut self) {
        if self.gpu.take().is_some() {
            log::debug!("frame driver: released");
        }
        self.state = DriverState::Released;
    }

    // ── rotation ──────────────────────────────────────────────────────────

    /// Rotates by `dt_ms * speed` degrees, keeping the angle in `[0, 360)`.
    ///
    /// Accumulated in f64 so `dt_ms * speed` cannot overflow for any finite
    /// speed. A non-finite step leaves the angle where it was.
    pub fn advance(&mut self, dt_ms: f32) {
        let step = f64::from(dt_ms) * f64::from(self.speed);
        if !step.is_finite() {
            log::warn!("frame driver: skipping rotation step {step}");
            return;
        }
        self.angle = (f64::from(self.angle) + step).rem_euclid(360.0) as f32;
        // Rounding to f32 (or rem_euclid on tiny negatives) can land on exactly 360.
        if self.angle >= 360.0 {
            self.angle = 0.0;
        }
    }

    /// Doubles the speed unless that would overflow to infinity.
    pub fn double_speed(&mut self) {
        let next = self.speed * 2.0;
        if next.is_finite() {
            self.speed = next;
        } else {
            log::warn!("frame driver: speed {} is at its limit", self.speed);
        }
    }

    pub fn halve_speed(&mut self) {
        self.speed /= 2.0;
    }

    /// Sets the speed from text field input. Unparsable input keeps the
    /// current speed; returns whether it changed.
    pub fn set_speed_from_text(&mut self, text: &str) -> bool {
        match text.trim().parse::<f32>() {
            Ok(v) if v.is_finite() => {
                self.speed = v;
                true
            }
            _ => {
                log::warn!("frame driver: ignoring speed {text:?}");
                false
            }
        }
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}

pub fn status_line(frames: u32, speed: f32) -> String {
    format!("fps: {frames}, speed={speed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── rotation ──────────────────────────────────────────────────────────

    #[test]
    fn advance_wraps_into_range() {
        let mut d = FrameDriver::new();
        d.advance(1000.0); // 50°
        assert!((d.angle() - 50.0).abs() < 1e-4);
        d.advance(7000.0); // +350° = 400°
        assert!((d.angle() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn angle_stays_in_range_for_any_speed() {
        let mut d = FrameDriver::new();
        for (dt, text) in [(16.0, "3.7"), (250.0, "-11.3"), (0.1, "1e4"), (33.0, "-0.0001")] {
            assert!(d.set_speed_from_text(text));
            for _ in 0..100 {
                d.advance(dt);
                assert!((0.0..360.0).contains(&d.angle()), "angle {}", d.angle());
            }
        }
    }

    #[test]
    fn huge_speed_keeps_angle_finite() {
        let mut d = FrameDriver::new();
        assert!(d.set_speed_from_text("3e38"));
        for _ in 0..10 {
            d.advance(250.0);
            assert!((0.0..360.0).contains(&d.angle()), "angle {}", d.angle());
        }
    }

    #[test]
    fn repeated_doubling_stops_short_of_infinity() {
        let mut d = FrameDriver::new();
        for _ in 0..140 {
            d.double_speed();
        }
        assert!(d.speed().is_finite());
        d.advance(16.0);
        assert!((0.0..360.0).contains(&d.angle()), "angle {}", d.angle());

        let top = d.speed();
        d.halve_speed();
        assert_eq!(d.speed(), top / 2.0);
        d.advance(16.0);
        assert!((0.0..360.0).contains(&d.angle()), "angle {}", d.angle());
    }

    #[test]
    fn zero_dt_keeps_angle() {
        let mut d = FrameDriver::new();
        d.advance(100.0);
        let a = d.angle();
        d.advance(0.0);
        assert_eq!(d.angle(), a);
    }

    // ── speed controls ────────────────────────────────────────────────────

    #[test]
    fn double_then_halve_twice_restores_half() {
        let mut d = FrameDriver::new();
        d.double_speed();
        d.halve_speed();
        assert!((d.speed() - INITIAL_SPEED).abs() < 1e-7);
        d.halve_speed();
        assert!((d.speed() - INITIAL_SPEED / 2.0).abs() < 1e-7);
    }

    #[test]
    fn bad_speed_text_keeps_speed() {
        let mut d = FrameDriver::new();
        assert!(!d.set_speed_from_text("fast"));
        assert!(!d.set_speed_from_text("inf"));
        assert!(!d.set_speed_from_text(""));
        assert_eq!(d.speed(), INITIAL_SPEED);
        assert!(d.set_speed_from_text(" 0.2 "));
        assert_eq!(d.speed(), 0.2);
    }

    // ── fps ───────────────────────────────────────────────────────────────

    #[test]
    fn fps_reports_after_one_second() {
        let mut fps = FpsCounter::default();
        for _ in 0..62 {
            assert_eq!(fps.tick(16.0), None);
        }
        // 63 * 16 = 1008 ms
        assert_eq!(fps.tick(16.0), Some(63));
        assert!((fps.timer_ms - 8.0).abs() < 1e-3);
        assert_eq!(fps.frames, 0);
    }

    #[test]
    fn status_line_format() {
        assert_eq!(status_line(60, 0.05), "fps: 60, speed=0.05");
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn lifecycle_without_gpu() {
        let mut d = FrameDriver::new();
        assert_eq!(d.state(), DriverState::Uninitialized);

        let mut after = AfterRender::default();
        d.on_after_render(&mut after);
        assert!(!after.redraw_requested());

        d.release();
        assert_eq!(d.state(), DriverState::Released);
        let mut after = AfterRender::default();
        d.on_after_render(&mut after);
        assert!(!after.redraw_requested());
    }
}
