//! Astral: interactive gravitational N-body simulation
//!
//! Bodies move under mutual Newtonian gravity in SI units; the view is drawn
//! in a scaled render space where one unit is 1,000 km.
//!
//! Controls:
//! - Left mouse drag: Orbit camera
//! - Scroll: Zoom in/out
//! - Space: Play/pause
//! - +/-: Adjust simulation speed
//! - Tab: Follow the next body
//! - R: Reset view
//! - 1/2/3: Load presets (Sun/Earth/Moon, Inner Planets, Asteroid Belt)
//!
//! An optional JSON config path may be passed as the first argument
//! (default `astral.json`).

mod hud;
mod renderer;

use anyhow::Result;
use astral_sim::config::{AstralConfig, PhysicsConfig};
use astral_sim::scenario::{self, Preset};
use astral_sim::{DrawList, EntityId, SimulationWorld, UnitScale};
use common::{constants::SECONDS_PER_DAY, GraphicsContext, OrbitalCamera};
use hud::{draw_overlay, Controls, Readout};
use renderer::SceneRenderer;
use std::collections::BTreeMap;
use std::time::Instant;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const MAX_BODIES: usize = 4096;
const DEFAULT_CONFIG_PATH: &str = "astral.json";
const ASTEROID_PRESET: Preset = Preset::AsteroidBelt { count: 300, seed: 1 };

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: SceneRenderer,
    sim: SimulationWorld<DrawList>,
    camera: OrbitalCamera,
    config: AstralConfig,
    controls: Controls,
    preset: Preset,
    names: BTreeMap<EntityId, String>,
    follow: Option<EntityId>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    fps: f32,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext, config: AstralConfig) -> Result<Self> {
        let renderer = SceneRenderer::new(&ctx, MAX_BODIES);

        let scale = UnitScale::DEFAULT;
        let to_render = |metres: f64| scale.to_render_scalar(metres) as f32;
        let camera = OrbitalCamera::new(
            ctx.aspect_ratio(),
            to_render(config.camera.distance),
            to_render(config.camera.min_distance),
            to_render(config.camera.max_distance),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        let controls = Controls {
            paused: config.playback.start_paused,
            speed: config.playback.speed,
            max_speed: config.playback.max_speed,
        };
        let preset = config.scenario;
        let (sim, names) = build_simulation(&config.physics, preset)?;

        let mut app = Self {
            ctx,
            renderer,
            sim,
            camera,
            config,
            controls,
            preset,
            names,
            follow: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            fps: 0.0,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        };
        app.follow = app.default_follow();
        Ok(app)
    }

    /// Replace the running simulation with a fresh world holding `preset`
    fn load_preset(&mut self, preset: Preset) -> Result<()> {
        let (sim, names) = build_simulation(&self.config.physics, preset)?;
        self.sim = sim;
        self.names = names;
        self.preset = preset;
        self.follow = self.default_follow();
        Ok(())
    }

    /// The configured body if the preset has it, else the first one
    fn default_follow(&self) -> Option<EntityId> {
        self.config
            .camera
            .follow
            .filter(|id| self.sim.contains(*id))
            .or_else(|| self.sim.ids().next())
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.set_aspect_ratio(self.ctx.aspect_ratio());
        self.renderer.resize(&self.ctx);
    }

    fn update(&mut self, frame_dt: f32) {
        if frame_dt > 0.0 {
            self.fps = 0.9 * self.fps + 0.1 / frame_dt;
        }

        self.sim.advance(self.controls.scaled_dt(frame_dt));
        if let Some(target) = self.follow.and_then(|id| self.sim.render_position(id)) {
            self.camera.follow(target);
        }
        self.sim.submit_frame(&self.camera);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.upload(&self.ctx.queue, self.sim.backend());

        // Build egui UI
        let readout = Readout {
            fps: self.fps,
            bodies: self.sim.len(),
            elapsed_days: self.sim.physics().elapsed() / SECONDS_PER_DAY,
            scenario: self.preset.name(),
            integrator: self.sim.physics().integrator(),
            following: self
                .follow
                .and_then(|id| self.names.get(&id))
                .map(String::as_str),
        };
        let controls = &mut self.controls;
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            draw_overlay(ctx, controls, &readout);
        });

        self.egui
            .state
            .handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self
            .egui
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui
                .renderer
                .update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui
                .renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        let preset = match key {
            KeyCode::Space => {
                self.controls.paused = !self.controls.paused;
                None
            }
            KeyCode::Equal | KeyCode::NumpadAdd => {
                self.controls.speed = (self.controls.speed * 1.5).min(self.controls.max_speed);
                None
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                self.controls.speed = (self.controls.speed / 1.5).max(1.0);
                None
            }
            KeyCode::Tab => {
                self.follow_next();
                None
            }
            KeyCode::KeyR => {
                let distance = self.sim.unit_scale().to_render_scalar(self.config.camera.distance);
                self.camera.reset(distance as f32);
                None
            }
            KeyCode::Digit1 => Some(Preset::SunEarthMoon),
            KeyCode::Digit2 => Some(Preset::InnerPlanets),
            KeyCode::Digit3 => Some(ASTEROID_PRESET),
            _ => None,
        };

        if let Some(preset) = preset {
            if let Err(err) = self.load_preset(preset) {
                log::error!("failed to load preset '{}': {err:#}", preset.name());
            }
        }
    }

    fn follow_next(&mut self) {
        let ids: Vec<EntityId> = self.sim.ids().collect();
        self.follow = match self.follow.and_then(|id| ids.iter().position(|&other| other == id)) {
            Some(i) => ids.get((i + 1) % ids.len()).copied(),
            None => ids.first().copied(),
        };
    }

    fn handle_mouse_move(&mut self, x: f64, y: f64) {
        if self.mouse_pressed {
            if let Some((last_x, last_y)) = self.last_mouse_pos {
                let speed = self.config.camera.orbit_speed;
                let dx = (x - last_x) as f32 * speed;
                let dy = (y - last_y) as f32 * speed;
                self.camera.orbit(dx, dy);
            }
            self.last_mouse_pos = Some((x, y));
        }
    }

    fn handle_scroll(&mut self, delta: f32) {
        // Scale the step with distance so both planet close-ups and the
        // whole system stay a few scroll lines away
        let step = self.config.camera.zoom_speed.max(self.camera.distance * 0.1);
        self.camera.zoom(delta * step);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

/// A world populated with `preset`, transforms synced, plus each body's name
fn build_simulation(
    physics: &PhysicsConfig,
    preset: Preset,
) -> Result<(SimulationWorld<DrawList>, BTreeMap<EntityId, String>)> {
    let specs = preset.bodies(physics.gravitational_constant);

    let mut sim = SimulationWorld::new(physics.build_world(), DrawList::new())
        .with_substeps(physics.substeps);
    scenario::populate(&mut sim, &specs)?;
    sim.advance(0.0);

    log::info!("loaded preset '{}' with {} bodies", preset.name(), specs.len());
    let names = specs.into_iter().map(|spec| (spec.id, spec.name)).collect();
    Ok((sim, names))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AstralConfig::load_or_default(&config_path);

    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        &config.window.title,
        config.window.width,
        config.window.height,
    ))?;

    let mut app = App::new(ctx, config)?;
    let mut last_time = Instant::now();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let consumed = app.handle_window_event(event);

                if !consumed {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => app.resize(*size),
                        WindowEvent::MouseInput { state, button, .. } => {
                            if *button == MouseButton::Left {
                                app.mouse_pressed = *state == ElementState::Pressed;
                                if !app.mouse_pressed {
                                    app.last_mouse_pos = None;
                                }
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            app.handle_mouse_move(position.x, position.y);
                        }
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(key),
                                    state,
                                    ..
                                },
                            ..
                        } => app.handle_key(*key, *state),
                        WindowEvent::MouseWheel { delta, .. } => {
                            let scroll = match delta {
                                MouseScrollDelta::LineDelta(_, y) => *y,
                                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                            };
                            app.handle_scroll(scroll);
                        }
                        _ => {}
                    }
                }

                // Redraw even while egui holds the pointer
                if matches!(event, WindowEvent::RedrawRequested) {
                    let now = Instant::now();
                    let dt = (now - last_time).as_secs_f32().min(0.1);
                    last_time = now;

                    app.update(dt);
                    match app.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                        Err(e) => log::error!("render error: {e:?}"),
                    }
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use astral_sim::Integrator;

    #[test]
    fn build_simulation_populates_a_synced_world() {
        let physics = PhysicsConfig {
            integrator: Integrator::ExplicitEuler,
            substeps: 3,
            ..PhysicsConfig::default()
        };
        let (sim, names) = build_simulation(&physics, Preset::SunEarthMoon).unwrap();

        assert_eq!(sim.len(), 3);
        assert_eq!(sim.substeps(), 3);
        assert_eq!(sim.physics().integrator(), Integrator::ExplicitEuler);
        assert_eq!(sim.physics().elapsed(), 0.0);
        assert_eq!(names.get(&EntityId(2)).map(String::as_str), Some("Moon"));

        // transforms are synced before the first frame
        let earth = sim.render_position(EntityId(1)).unwrap();
        assert!((earth.x - 149_600.0).abs() < 0.05);
    }

    #[test]
    fn every_preset_builds() {
        for preset in [Preset::SunEarthMoon, Preset::InnerPlanets, ASTEROID_PRESET] {
            let (sim, names) = build_simulation(&PhysicsConfig::default(), preset).unwrap();
            assert_eq!(sim.len(), names.len(), "{}", preset.name());
            assert_eq!(sim.backend().len(), names.len());
        }
    }
}
