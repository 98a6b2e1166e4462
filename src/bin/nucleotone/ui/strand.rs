//! Strand renderer: particle bursts over a live output waveform.
//!
//! Every change of playback position spawns a burst above the symbol's slot,
//! colored by base and sized by its frequency. With playback idle, dim
//! ambient motes drift upward instead.

use rand::Rng;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use nucleotone::Base;

const MAX_PARTICLES: usize = 240;
const BURST_SIZE: usize = 18;
const GRAVITY: f64 = 0.5;

/// One color per base, shared with the transport's sequence strip.
pub const BASE_COLORS: [Color; 4] = [Color::Green, Color::Cyan, Color::Magenta, Color::Yellow];

struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    age: f64,
    life: f64,
    color_index: usize,
}

pub struct StrandView {
    particles: Vec<Particle>,
    last_position: i32,
}

impl StrandView {
    pub fn new() -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            last_position: -1,
        }
    }

    /// Advance particle state one frame.
    pub fn update(&mut self, position: i32, bases: &[Base], frequencies: &[f32], dt: f64) {
        let mut rng = rand::thread_rng();

        if position >= 0 && position != self.last_position {
            let slot = position as usize;
            if let (Some(&base), Some(&freq)) = (bases.get(slot), frequencies.get(slot)) {
                let origin_x = if bases.len() > 1 {
                    (slot as f64 + 0.5) / bases.len() as f64 * 2.0 - 1.0
                } else {
                    0.0
                };
                let energy = (freq as f64 / 440.0).clamp(0.3, 2.0);

                for _ in 0..BURST_SIZE {
                    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                    let speed = rng.gen_range(0.2..0.9) * energy;
                    self.spawn(Particle {
                        x: origin_x,
                        y: 0.0,
                        vx: angle.cos() * speed,
                        vy: angle.sin().abs() * speed,
                        age: 0.0,
                        life: rng.gen_range(0.6..1.4),
                        color_index: base.index(),
                    });
                }
            }
        } else if position < 0 && rng.gen_bool((dt * 2.0).min(1.0)) {
            // Idle: a slow ambient mote
            self.spawn(Particle {
                x: rng.gen_range(-1.0..1.0),
                y: -1.0,
                vx: 0.0,
                vy: rng.gen_range(0.05..0.2),
                age: 0.0,
                life: rng.gen_range(2.0..4.0),
                color_index: rng.gen_range(0..BASE_COLORS.len()),
            });
        }
        self.last_position = position;

        for p in &mut self.particles {
            p.age += dt;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vy -= GRAVITY * dt;
        }
        self.particles.retain(|p| p.age < p.life && p.y > -1.2);
    }

    fn spawn(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, audio: &[f32]) {
        if area.width < 3 || area.height < 3 {
            // Surface not ready; skip this frame and retry on the next.
            return;
        }

        let mut by_color: [Vec<(f64, f64)>; 4] = Default::default();
        for p in &self.particles {
            by_color[p.color_index].push((p.x, p.y));
        }

        // Downsample the tap into waveform segments along the lower band
        let mut segments = Vec::new();
        if audio.len() >= 2 {
            let points = 96.min(audio.len());
            let to_xy = |i: usize| {
                let idx = i * (audio.len() - 1) / (points - 1);
                let x = i as f64 / (points - 1) as f64 * 2.0 - 1.0;
                let y = -0.65 + audio[idx] as f64 * 0.3;
                (x, y)
            };
            for i in 0..points - 1 {
                let (x1, y1) = to_xy(i);
                let (x2, y2) = to_xy(i + 1);
                segments.push((x1, y1, x2, y2));
            }
        }

        let canvas = Canvas::default()
            .block(Block::default().title(" strand ").borders(Borders::ALL))
            .marker(symbols::Marker::Braille)
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                for &(x1, y1, x2, y2) in &segments {
                    ctx.draw(&CanvasLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: Color::DarkGray,
                    });
                }
                for (color_index, coords) in by_color.iter().enumerate() {
                    if !coords.is_empty() {
                        ctx.draw(&Points {
                            coords,
                            color: BASE_COLORS[color_index],
                        });
                    }
                }
            });

        frame.render_widget(canvas, area);
    }
}
