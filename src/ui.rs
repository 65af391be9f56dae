pub mod playfield;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

use quickbench::{
    score::{AimScore, TypingScore},
    util::{mean, time_ago},
    GameKind, ScoreHistory,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;
const HISTORY_WIDTH: u16 = 32;
/// Below this width the history panel is dropped
const HISTORY_MIN_WIDTH: u16 = 80;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.view).render(app, f);
}

/// Regions shared by both game screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub stats: Rect,
    pub board: Rect,
    pub playfield: Rect,
    pub history: Option<Rect>,
    pub legend: Rect,
}

pub fn layout(area: Rect) -> AppLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(3), // stats bar
            Constraint::Min(3),    // board + history
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (board, history) = if area.width >= HISTORY_MIN_WIDTH {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(HISTORY_WIDTH)])
            .split(rows[1]);
        (cols[0], Some(cols[1]))
    } else {
        (rows[1], None)
    };

    AppLayout {
        stats: rows[0],
        board,
        playfield: board.inner(Margin::new(1, 1)),
        history,
        legend: rows[2],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Good,
    Fair,
    Poor,
}

impl Grade {
    pub fn for_accuracy(kind: GameKind, accuracy: f64) -> Self {
        let (good, fair) = match kind {
            GameKind::AimTrainer => (90.0, 70.0),
            GameKind::TypingTest => (95.0, 85.0),
        };
        if accuracy >= good {
            Grade::Good
        } else if accuracy >= fair {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }

    pub fn style(&self) -> Style {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        match self {
            Grade::Good => bold.fg(Color::Green),
            Grade::Fair => bold,
            Grade::Poor => bold.fg(Color::Red),
        }
    }
}

pub fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn dim_style() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

/// `value unit` pair as shown in the stats bar
pub fn stat<'a>(value: String, unit: &'a str, style: Style) -> [Span<'a>; 3] {
    [
        Span::styled(value, style),
        Span::styled(format!(" {unit}"), dim_style()),
        Span::raw("     "),
    ]
}

pub fn render_stats(spans: Vec<Span>, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .render(area, buf);
}

pub fn render_legend(text: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(area, buf);
}

/// Centered "Complete" card with three headline numbers
pub fn render_results(items: [(String, &str, Style); 3], legend: &str, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("Complete", bold_style())),
        Line::default(),
    ];
    for (value, label, style) in items {
        lines.push(Line::from(vec![
            Span::styled(value, style),
            Span::styled(format!("  {label}"), dim_style()),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        legend.to_string(),
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    let height = lines.len() as u16;
    let top = area.y + area.height.saturating_sub(height) / 2;
    let centered = Rect::new(area.x, top, area.width, height.min(area.height));
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(centered, buf);
}

pub fn render_history(history: &ScoreHistory, kind: GameKind, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title(" History ");
    let now = chrono::Utc::now();

    let lines: Vec<Line> = match kind {
        GameKind::AimTrainer if history.aim_trainer.is_empty() => empty_history(),
        GameKind::TypingTest if history.typing_test.is_empty() => empty_history(),
        GameKind::AimTrainer => {
            let mut lines: Vec<Line> = history
                .aim_trainer
                .iter()
                .enumerate()
                .flat_map(|(idx, s)| aim_history_lines(idx, s, now))
                .collect();
            let cps: Vec<f64> = history.aim_trainer.iter().map(|s| s.cps).collect();
            if let Some(avg) = mean(&cps) {
                lines.push(Line::from(Span::styled(
                    format!("avg {avg:.2} cps"),
                    dim_style(),
                )));
            }
            lines
        }
        GameKind::TypingTest => {
            let mut lines: Vec<Line> = history
                .typing_test
                .iter()
                .enumerate()
                .flat_map(|(idx, s)| typing_history_lines(idx, s, now))
                .collect();
            let wpm: Vec<f64> = history
                .typing_test
                .iter()
                .map(|s| s.words_per_minute as f64)
                .collect();
            if let Some(avg) = mean(&wpm) {
                lines.push(Line::from(Span::styled(
                    format!("avg {avg:.0} wpm"),
                    dim_style(),
                )));
            }
            lines
        }
    };

    Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn empty_history() -> Vec<Line<'static>> {
    vec![Line::from(Span::styled("No scores yet", dim_style()))]
}

fn entry_style(idx: usize) -> Style {
    // newest entry stands out
    if idx == 0 {
        bold_style()
    } else {
        Style::default()
    }
}

fn aim_history_lines(idx: usize, s: &AimScore, now: chrono::DateTime<chrono::Utc>) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(format!("{:.2}s  ", s.time), entry_style(idx)),
            Span::styled(
                format!("{:.0}%", s.accuracy),
                Grade::for_accuracy(GameKind::AimTrainer, s.accuracy).style(),
            ),
        ]),
        Line::from(Span::styled(
            format!("{:.2} cps · {}", s.cps, time_ago(s.timestamp, now)),
            dim_style(),
        )),
    ]
}

fn typing_history_lines(
    idx: usize,
    s: &TypingScore,
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(format!("{} wpm  ", s.words_per_minute), entry_style(idx)),
            Span::styled(
                format!("{:.0}%", s.accuracy),
                Grade::for_accuracy(GameKind::TypingTest, s.accuracy).style(),
            ),
        ]),
        Line::from(Span::styled(
            format!("{} chars · {}", s.characters_typed, time_ago(s.timestamp, now)),
            dim_style(),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_terminals_get_a_history_panel() {
        let l = layout(Rect::new(0, 0, 120, 40));
        let history = l.history.expect("history shown");
        assert_eq!(history.width, HISTORY_WIDTH);
        assert_eq!(l.playfield.width, l.board.width - 2);
        assert_eq!(l.playfield.height, l.board.height - 2);
    }

    #[test]
    fn narrow_terminals_drop_the_history_panel() {
        let l = layout(Rect::new(0, 0, 60, 30));
        assert!(l.history.is_none());
        assert_eq!(l.board.width, 60 - HORIZONTAL_MARGIN * 2);
    }

    #[test]
    fn grades_follow_game_thresholds() {
        assert_eq!(Grade::for_accuracy(GameKind::AimTrainer, 90.0), Grade::Good);
        assert_eq!(Grade::for_accuracy(GameKind::AimTrainer, 75.0), Grade::Fair);
        assert_eq!(Grade::for_accuracy(GameKind::TypingTest, 90.0), Grade::Fair);
        assert_eq!(Grade::for_accuracy(GameKind::TypingTest, 80.0), Grade::Poor);
    }

    #[test]
    fn empty_history_says_so() {
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        render_history(&ScoreHistory::default(), GameKind::TypingTest, area, &mut buf);

        let text: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect();
        assert!(text.contains("No scores yet"));
    }
}
