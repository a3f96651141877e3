use itertools::{EitherOrBoth, Itertools};
use kaneda::{combo::MAX_HEAT, progression::ProfileStore, session::Session, GameMode, Status};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const BOSS_PANEL_LINES: u16 = 10;

impl<S: ProfileStore> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Playing => render_playing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_playing<S: ProfileStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_lines = (app.display.width() as f64 / max_chars_per_line as f64).ceil() as u16;
    let prompt_lines = prompt_lines.max(1);
    let boss_lines = if session.boss().is_some() {
        BOSS_PANEL_LINES
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),            // header
            Constraint::Length(1),            // time bar
            Constraint::Length(1),            // heat bar
            Constraint::Length(boss_lines),   // boss panel
            Constraint::Min(1),               // spacer
            Constraint::Length(prompt_lines), // phrase
            Constraint::Min(1),               // spacer
            Constraint::Length(1),            // items
            Constraint::Length(1),            // legend
        ])
        .split(area);

    let header = Line::from(vec![
        Span::styled(format!("[{}]", session.mode()), bold_style.fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(format!("{} wpm", session.live_wpm()), bold_style),
    ]);
    Paragraph::new(header).render(chunks[0], buf);

    render_time_bar(session, chunks[1], buf);

    let heat = session.heat();
    let heat_color = if heat >= MAX_HEAT {
        Color::Red
    } else {
        Color::Yellow
    };
    Gauge::default()
        .gauge_style(Style::default().fg(heat_color))
        .ratio(ratio(heat as f64, MAX_HEAT as f64))
        .label(format!("HEAT {heat}/{MAX_HEAT}  STREAK {}", session.streak()))
        .render(chunks[2], buf);

    if boss_lines > 0 {
        render_boss_panel(session, chunks[3], buf);
    }

    let widget = Paragraph::new(phrase_line(app))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    widget.render(chunks[5], buf);

    let inv = session.inventory();
    let items = format!(
        "[F1] TIME_FREEZE x{}   [F2] AUTO_WORD x{}   PROXY_SHIELD x{}",
        inv.time_freeze, inv.auto_word, inv.proxy_shield
    );
    Paragraph::new(Span::styled(items, dim_style))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);

    let legend = match (session.status(), session.mode()) {
        (Status::Idle, _) => "start typing to begin",
        (_, GameMode::Zen) => "(esc) cash out",
        _ => "(esc) abort",
    };
    Paragraph::new(Span::styled(
        legend,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[8], buf);
}

fn render_time_bar<E: kaneda::effects::EffectsSink>(
    session: &Session<E>,
    area: Rect,
    buf: &mut Buffer,
) {
    if !session.is_timed() {
        Paragraph::new(Span::styled(
            "NO LIMIT",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(area, buf);
        return;
    }

    let fraction = session.time_fraction();
    let color = if session.is_frozen() {
        Color::Cyan
    } else if fraction < 0.25 {
        Color::Red
    } else {
        Color::Green
    };
    let label = if session.is_frozen() {
        format!("{:.1}s FROZEN", session.remaining_secs())
    } else {
        format!("{:.1}s", session.remaining_secs())
    };
    Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(fraction.clamp(0.0, 1.0))
        .label(label)
        .render(area, buf);
}

fn render_boss_panel<E: kaneda::effects::EffectsSink>(
    session: &Session<E>,
    area: Rect,
    buf: &mut Buffer,
) {
    let Some(boss) = session.boss() else {
        return;
    };
    let block = Block::default().borders(Borders::ALL).title(format!(
        " {} [{}] ",
        boss.def().name,
        boss.def().difficulty
    ));
    let inner = block.inner(area);
    block.render(area, buf);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Red))
        .ratio(ratio(boss.hp() as f64, boss.max_hp() as f64))
        .label(format!("FIREWALL {}%", boss.hp_percent()))
        .render(rows[0], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio(boss.charge_percent(), 100.0))
        .label(format!("ATTACK {:.0}%", boss.charge_percent()))
        .render(rows[1], buf);

    let log: Vec<Line> = boss
        .log()
        .map(|l| Line::from(Span::styled(format!("> {l}"), Style::default().fg(Color::Gray))))
        .collect();
    Paragraph::new(log).render(rows[2], buf);
}

/// Typed characters coloured against the target, then the rest of the
/// displayed (possibly still scrambling) phrase.
fn phrase_line<S: ProfileStore>(app: &App<S>) -> Line<'static> {
    let session = &app.session;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = bold_style.fg(Color::Green);
    let red_bold_style = bold_style.fg(Color::Red);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let cursor_style = dim_bold_style.add_modifier(Modifier::UNDERLINED);

    let target = session.target_chars();
    let typed_len = session.typed().len();
    let spans = session
        .typed()
        .iter()
        .zip_longest(app.display.chars())
        .enumerate()
        .map(|(idx, pair)| match pair {
            EitherOrBoth::Both(&typed, _) | EitherOrBoth::Left(&typed) => {
                if target.get(idx) == Some(&typed) {
                    Span::styled(typed.to_string(), green_bold_style)
                } else {
                    let shown = match typed {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    };
                    Span::styled(shown, red_bold_style)
                }
            }
            EitherOrBoth::Right(shown) if idx == typed_len => {
                Span::styled(shown.to_string(), cursor_style)
            }
            EitherOrBoth::Right(shown) => Span::styled(shown.to_string(), dim_bold_style),
        })
        .collect::<Vec<Span>>();

    Line::from(spans)
}

fn render_results<S: ProfileStore>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let Some(outcome) = app.result.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // verdict
            Constraint::Length(1), // stats
            Constraint::Length(1), // payout
            Constraint::Length(1), // notice
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (verdict, color) = match (outcome.is_zen, outcome.passed) {
        (true, _) => (format!("SESSION CLOSED ({})", outcome.reason), Color::Cyan),
        (false, true) => (format!("ACCESS GRANTED ({})", outcome.reason), Color::Green),
        (false, false) => (format!("CONNECTION LOST ({})", outcome.reason), Color::Red),
    };
    Paragraph::new(Span::styled(verdict, bold_style.fg(color)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!("{} wpm   {}% acc", outcome.wpm, outcome.accuracy),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let credited = app.credited.unwrap_or(outcome.yen_payout);
    let bonus = credited.saturating_sub(outcome.yen_payout);
    let payout = if bonus > 0 {
        format!("+{credited} yen (bounty +{bonus})")
    } else {
        format!("+{credited} yen")
    };
    Paragraph::new(Span::styled(payout, Style::default().fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);
    }

    Paragraph::new(Span::styled(
        "(r)etry / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[6], buf);
}

fn ratio(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    (value / max).clamp(0.0, 1.0)
}
