//! Radial interference renderer.
//!
//! Places each symbol's frequency as a wave source on a ring and samples
//! the summed field over a fixed grid; the active symbol's source
//! dominates the pattern. With nothing playing it collapses to a single
//! slow ambient ripple from the center.

use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

/// Field sampling grid. Fixed, so per-frame work is bounded regardless of
/// terminal size.
const GRID_W: usize = 64;
const GRID_H: usize = 44;

/// Radius of the source ring in canvas units.
const RING_RADIUS: f64 = 0.55;

/// Spatial frequency scale: Hz to radians per canvas unit.
const WAVE_SCALE: f64 = 1.0 / 32.0;

pub struct InterferenceView {
    phase: f64,
}

impl InterferenceView {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Advance the wave phase; the active tone sets the ripple speed.
    pub fn update(&mut self, position: i32, frequencies: &[f32], dt: f64) {
        let rate = if position >= 0 {
            frequencies
                .get(position as usize)
                .copied()
                .unwrap_or(220.0) as f64
                / 220.0
        } else {
            0.4
        };
        self.phase += dt * rate * std::f64::consts::TAU;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, position: i32, frequencies: &[f32]) {
        if area.width < 3 || area.height < 3 {
            return;
        }

        // (x, y, spatial frequency, weight)
        let mut sources: Vec<(f64, f64, f64, f64)> = Vec::new();
        if frequencies.is_empty() {
            // Ambient: one center ripple
            sources.push((0.0, 0.0, 180.0 * WAVE_SCALE, 1.0));
        } else {
            let n = frequencies.len();
            for (i, &freq) in frequencies.iter().enumerate() {
                let angle = std::f64::consts::TAU * i as f64 / n as f64;
                let weight = if position == i as i32 { 1.0 } else { 0.3 };
                sources.push((
                    angle.cos() * RING_RADIUS,
                    angle.sin() * RING_RADIUS,
                    freq as f64 * WAVE_SCALE,
                    weight,
                ));
            }
        }
        let total_weight: f64 = sources.iter().map(|s| s.3).sum();

        let mut bright = Vec::new();
        let mut mid = Vec::new();
        let mut dim = Vec::new();

        for gy in 0..GRID_H {
            for gx in 0..GRID_W {
                let x = gx as f64 / (GRID_W - 1) as f64 * 2.0 - 1.0;
                let y = gy as f64 / (GRID_H - 1) as f64 * 2.0 - 1.0;

                let mut field = 0.0;
                for &(sx, sy, k, w) in &sources {
                    let dist = ((x - sx) * (x - sx) + (y - sy) * (y - sy)).sqrt();
                    field += w * (k * dist - self.phase).sin();
                }
                field /= total_weight;

                if field > 0.6 {
                    bright.push((x, y));
                } else if field > 0.25 {
                    mid.push((x, y));
                } else if field > 0.0 {
                    dim.push((x, y));
                }
            }
        }

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(" interference ")
                    .borders(Borders::ALL),
            )
            .marker(symbols::Marker::Braille)
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                ctx.draw(&Points {
                    coords: &dim,
                    color: Color::DarkGray,
                });
                ctx.draw(&Points {
                    coords: &mid,
                    color: Color::Blue,
                });
                ctx.draw(&Points {
                    coords: &bright,
                    color: Color::Cyan,
                });
            });

        frame.render_widget(canvas, area);
    }
}
