//! On-screen controls and readouts, drawn with egui

use astral_sim::Integrator;
use egui::{Color32, Context, RichText};

/// Playback controls the overlay can change
pub struct Controls {
    pub paused: bool,
    pub speed: f32,
    pub max_speed: f32,
}

impl Controls {
    /// Simulated seconds for a frame that took `frame_dt` wall-clock seconds
    pub fn scaled_dt(&self, frame_dt: f32) -> f64 {
        if self.paused {
            0.0
        } else {
            f64::from(frame_dt) * f64::from(self.speed)
        }
    }
}

/// Read-only figures shown in the overlay
pub struct Readout<'a> {
    pub fps: f32,
    pub bodies: usize,
    pub elapsed_days: f64,
    pub scenario: &'a str,
    pub integrator: Integrator,
    pub following: Option<&'a str>,
}

struct Equation {
    name: &'static str,
    formula: &'static str,
}

const GRAVITATION: Equation = Equation {
    name: "Newton's Law of Gravitation",
    formula: "F = G·m₁·m₂ / r²",
};

const ORBIT_SPEED: Equation = Equation {
    name: "Circular Orbit Speed",
    formula: "v = √(G·M / r)",
};

const VERLET: &[Equation] = &[
    GRAVITATION,
    Equation {
        name: "Verlet Position",
        formula: "x' = x + v·Δt + ½·a·Δt²",
    },
    Equation {
        name: "Verlet Velocity",
        formula: "v' = v + ½·(a + a')·Δt",
    },
    ORBIT_SPEED,
];

const EULER: &[Equation] = &[
    GRAVITATION,
    Equation {
        name: "Euler Position",
        formula: "x' = x + v·Δt",
    },
    Equation {
        name: "Euler Velocity",
        formula: "v' = v + a·Δt",
    },
    ORBIT_SPEED,
];

/// Formulas describing one step of `integrator`
fn equations(integrator: Integrator) -> &'static [Equation] {
    match integrator {
        Integrator::VelocityVerlet => VERLET,
        Integrator::ExplicitEuler => EULER,
    }
}

pub fn draw_overlay(ctx: &Context, controls: &mut Controls, readout: &Readout) {
    egui::Window::new("Options")
        .fixed_pos(egui::pos2(10.0, 10.0))
        .title_bar(false)
        .resizable(false)
        .frame(egui::Frame::window(&ctx.style()).fill(Color32::from_black_alpha(160)))
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", readout.fps));
            ui.label(RichText::new(readout.scenario).strong().color(Color32::LIGHT_BLUE));
            ui.label(format!("Bodies: {}", readout.bodies));
            ui.label(format!("Elapsed: {:.2} days", readout.elapsed_days));
            if let Some(name) = readout.following {
                ui.label(format!("Following: {name}"));
            }
            ui.separator();

            let label = if controls.paused { "Play" } else { "Pause" };
            if ui.button(label).clicked() {
                controls.paused = !controls.paused;
            }

            ui.add(
                egui::Slider::new(&mut controls.speed, 1.0..=controls.max_speed)
                    .logarithmic(true)
                    .text("Sim Speed")
                    .custom_formatter(|n, _| format!("{n:.3}x")),
            );

            if controls.paused {
                ui.label(RichText::new("PAUSED").color(Color32::YELLOW));
            }

            ui.collapsing(RichText::new("Equations").strong(), |ui| {
                for eq in equations(readout.integrator) {
                    ui.label(RichText::new(eq.name).color(Color32::YELLOW));
                    ui.label(RichText::new(eq.formula).monospace().color(Color32::WHITE));
                    ui.add_space(4.0);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equations_match_the_integrator() {
        let names = |integrator| -> Vec<&'static str> {
            equations(integrator).iter().map(|eq| eq.name).collect()
        };

        assert!(names(Integrator::VelocityVerlet).contains(&"Verlet Velocity"));
        assert!(!names(Integrator::VelocityVerlet).contains(&"Euler Velocity"));
        assert!(names(Integrator::ExplicitEuler).contains(&"Euler Position"));
        assert!(!names(Integrator::ExplicitEuler).iter().any(|name| name.starts_with("Verlet")));
    }

    #[test]
    fn paused_controls_yield_zero_dt() {
        let mut controls = Controls {
            paused: true,
            speed: 100.0,
            max_speed: 1.0e4,
        };
        assert_eq!(controls.scaled_dt(0.016), 0.0);

        controls.paused = false;
        assert!((controls.scaled_dt(0.5) - 50.0).abs() < 1e-9);
    }
}
