use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::{
    app::App,
    engine::{MotionStatus, ShotResult, Snapshot, TargetPicker},
};

const FIELD_HEIGHT: u16 = 3;
const BLOCK: &str = "█";
const CROSSHAIR: &str = "+";

impl<P: TargetPicker> Widget for &App<P> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.snapshot();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FIELD_HEIGHT),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        render_field(&snap, self.engine.config().field_width, chunks[0], buf);

        Paragraph::new(hud_lines(self, &snap))
            .wrap(Wrap { trim: false })
            .render(chunks[2], buf);
    }
}

/// Draw the bordered one-row field. The border turns green when a shot
/// would score; the target is drawn over the crosshair.
fn render_field(snap: &Snapshot, field_width: u16, area: Rect, buf: &mut Buffer) {
    let frame_style = Style::default().fg(if snap.can_score {
        Color::Green
    } else {
        Color::Red
    });
    let crosshair_style = Style::default().fg(Color::Magenta);

    let mut put = |col: i32, row: u16, symbol: &str, style: Style| {
        let Ok(col) = u16::try_from(col) else {
            return;
        };
        if col >= area.width || col >= field_width || row >= area.height {
            return;
        }
        if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
            cell.set_symbol(symbol).set_style(style);
        }
    };

    let last_col = i32::from(field_width) - 1;
    for col in 0..=last_col {
        for row in 0..FIELD_HEIGHT {
            let border = row == 0 || row == FIELD_HEIGHT - 1 || col == 0 || col == last_col;
            if border {
                put(col, row, BLOCK, frame_style);
            } else {
                put(col, row, " ", Style::default());
            }
        }
    }

    put(snap.cell, 1, CROSSHAIR, crosshair_style);
    for col in snap.target_span.clone() {
        put(col, 1, BLOCK, Style::default());
    }
}

fn hud_lines<'a, P: TargetPicker>(app: &App<P>, snap: &Snapshot) -> Vec<Line<'a>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let italic = Style::default().add_modifier(Modifier::ITALIC);

    let status = match snap.status {
        MotionStatus::CounterStrafe(left) => Span::styled(
            format!("COUNTER-STRAFE WINDOW: {}ms", left.as_millis()),
            bold.fg(Color::Yellow),
        ),
        MotionStatus::Standstill => Span::styled("Status: STANDSTILL", bold.fg(Color::Green)),
        MotionStatus::Moving => Span::styled("Status: MOVING", bold.fg(Color::Red)),
    };

    let last_shot = match app.last_shot {
        Some(ShotResult::Hit) => Span::styled("HIT", bold.fg(Color::Green)),
        Some(ShotResult::Miss) => Span::styled("MISS", bold.fg(Color::Red)),
        None => Span::styled("-", dim),
    };

    vec![
        Line::from(Span::styled("Counter-Strafe Trainer", bold.fg(Color::Cyan))),
        Line::from(vec![
            Span::styled(format!("Score: {}", snap.score), bold),
            Span::raw(format!(" | Shots: {} | Last: ", app.shots)),
            last_shot,
        ]),
        Line::from(vec![
            Span::raw(format!(
                "Position: {:.1} | Velocity: {:.2} | ",
                snap.position, snap.velocity
            )),
            status,
        ]),
        Line::default(),
        Line::from(Span::styled("Controls:", bold)),
        Line::from("  A/D - Move left/right"),
        Line::from("  Left Click / Space - Shoot (scores only when the frame is green)"),
        Line::from("  Q / Esc - Quit"),
        Line::default(),
        Line::from(Span::styled(
            "Tip: counter-strafe by tapping the opposite direction, then shoot inside the window.",
            italic,
        )),
        Line::from(Span::styled(
            "Keep holding A or D while moving; release and drift is what a missed counter-strafe feels like.",
            italic,
        )),
    ]
}
