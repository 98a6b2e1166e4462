//! Lattice renderer: an isometric grid rippling with the active tone.
//!
//! The grid's vertical displacement is a damped radial wave whose spatial
//! frequency tracks the active symbol's pitch. Idle playback keeps a faint
//! slow swell running so the pane never freezes.

use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

/// Grid resolution per axis.
const GRID: usize = 13;

/// Isometric projection factors.
const ISO_X: f64 = 0.72;
const ISO_Y: f64 = 0.36;

pub struct LatticeView {
    time: f64,
}

impl LatticeView {
    pub fn new() -> Self {
        Self { time: 0.0 }
    }

    pub fn update(&mut self, dt: f64) {
        self.time += dt;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, position: i32, frequencies: &[f32]) {
        if area.width < 3 || area.height < 3 {
            return;
        }

        let playing = position >= 0;
        let amplitude = if playing { 0.45 } else { 0.12 };
        let wave_k = if playing {
            frequencies
                .get(position as usize)
                .copied()
                .unwrap_or(270.0) as f64
                / 90.0
        } else {
            3.0
        };

        // Project every grid vertex once
        let mut heights = [[0.0f64; GRID]; GRID];
        let mut projected = [[(0.0f64, 0.0f64); GRID]; GRID];
        for row in 0..GRID {
            for col in 0..GRID {
                let u = col as f64 / (GRID - 1) as f64 * 2.0 - 1.0;
                let v = row as f64 / (GRID - 1) as f64 * 2.0 - 1.0;
                let r = (u * u + v * v).sqrt();
                let z = amplitude * (wave_k * r - self.time * 3.0).sin() * (-r * 0.8).exp();
                heights[row][col] = z;
                projected[row][col] = ((u - v) * ISO_X, (u + v) * ISO_Y + z);
            }
        }

        let canvas = Canvas::default()
            .block(Block::default().title(" lattice ").borders(Borders::ALL))
            .marker(symbols::Marker::Braille)
            .x_bounds([-1.6, 1.6])
            .y_bounds([-1.2, 1.2])
            .paint(|ctx| {
                for row in 0..GRID {
                    for col in 0..GRID {
                        let (x1, y1) = projected[row][col];
                        let color = edge_color(heights[row][col], amplitude);

                        if col + 1 < GRID {
                            let (x2, y2) = projected[row][col + 1];
                            ctx.draw(&CanvasLine { x1, y1, x2, y2, color });
                        }
                        if row + 1 < GRID {
                            let (x2, y2) = projected[row + 1][col];
                            ctx.draw(&CanvasLine { x1, y1, x2, y2, color });
                        }
                    }
                }
            });

        frame.render_widget(canvas, area);
    }
}

fn edge_color(z: f64, amplitude: f64) -> Color {
    if z > amplitude * 0.4 {
        Color::Cyan
    } else if z > -amplitude * 0.4 {
        Color::Blue
    } else {
        Color::DarkGray
    }
}
