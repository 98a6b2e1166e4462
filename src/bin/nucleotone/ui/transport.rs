//! Transport header: playback state, parameter readouts, and the sequence
//! strip with the active symbol highlighted.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use nucleotone::Sequence;

use super::strand::BASE_COLORS;
use crate::app::App;

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    position: i32,
    frequencies: &[f32],
    sequence: &Sequence,
) {
    let playing = app.is_playing();

    let state_span = if playing {
        Span::styled("playing", Style::default().fg(Color::Green))
    } else {
        Span::styled("stopped", Style::default().fg(Color::DarkGray))
    };

    let mutation = app.params.mutation;
    let status = Line::from(vec![
        Span::raw(" "),
        state_span,
        Span::raw(format!(
            "  key {}  speed {:.1}x  detune {:+.1} Hz  tempo {:.2}  blend {:.2}",
            app.params.key.name(),
            app.params.speed,
            mutation.detune,
            mutation.tempo_variation,
            mutation.harmonic_blend,
        )),
        Span::raw(format!(
            "  evolve {}",
            if app.evolve.is_enabled() { "on" } else { "off" }
        )),
        if app.params.biofeedback_enabled {
            Span::styled(
                format!("  bio {:.0}%", app.level() * 100.0),
                Style::default().fg(Color::Magenta),
            )
        } else {
            Span::styled("  bio off", Style::default().fg(Color::DarkGray))
        },
    ]);

    // Sequence strip; active slot inverted
    let mut strip: Vec<Span> = vec![Span::raw(" ")];
    for (i, &base) in sequence.bases().iter().enumerate() {
        let mut style = Style::default().fg(BASE_COLORS[base.index()]);
        if position == i as i32 {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        strip.push(Span::styled(base.as_char().to_string(), style));
        strip.push(Span::raw(" "));
    }
    if sequence.is_empty() {
        strip.push(Span::styled(
            "(no sequence)",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut detail: Vec<Span> = Vec::new();
    if position >= 0 {
        if let Some(freq) = frequencies.get(position as usize) {
            detail.push(Span::raw(format!(
                " pos {}  {:.2} Hz",
                position, freq
            )));
        }
    }
    if let Some(notice) = &app.notice {
        detail.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(Color::Red),
        ));
    }

    let widget = Paragraph::new(vec![status, Line::from(strip), Line::from(detail)])
        .block(Block::default().title(" nucleotone ").borders(Borders::ALL));
    frame.render_widget(widget, area);
}
