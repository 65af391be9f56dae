use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use quickbench::{aim::TOTAL_TARGETS, typing::CharState, GameKind, Phase};

use super::playfield::TargetWidget;
use super::{
    bold_style, dim_style, layout, render_history, render_legend, render_results, render_stats,
    stat, Grade,
};
use crate::{App, View};

const RESULTS_LEGEND: &str = "(r)etry / (esc) menu";
/// Timer turns red at or below this many seconds
const LOW_TIME_SECS: u32 = 10;

/// A UI Screen boundary: responsible for drawing one view
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(2)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(3), // title
                Constraint::Length(5), // aim card
                Constraint::Length(5), // typing card
                Constraint::Min(1),
                Constraint::Length(1), // legend
            ])
            .split(area);

        let title = Paragraph::new(vec![
            Line::from(Span::styled("QuickBench", bold_style())),
            Line::from(Span::styled(
                "Test your reflexes and typing speed",
                dim_style(),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(title, rows[1]);

        for (kind, rect) in [
            (GameKind::AimTrainer, rows[2]),
            (GameKind::TypingTest, rows[3]),
        ] {
            render_card(f, kind, app.selected == kind, app.bench.history().len(kind), rect);
        }

        let buf = f.buffer_mut();
        render_legend(
            "(↑/↓) select / (enter) start / (a)im / (t)yping / (c)lear scores / (q)uit",
            rows[5],
            buf,
        );
    }
}

fn render_card(f: &mut Frame, kind: GameKind, selected: bool, recorded: usize, area: Rect) {
    let (blurb, metrics) = match kind {
        GameKind::AimTrainer => (
            "Test your reflexes by clicking 30 targets as fast as possible",
            "time · accuracy · cps",
        ),
        GameKind::TypingTest => (
            "Measure your typing speed and accuracy in 60 seconds",
            "wpm · accuracy · characters",
        ),
    };
    let border = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        dim_style()
    };
    let title = match kind {
        GameKind::AimTrainer => " (a) Aim Trainer ",
        GameKind::TypingTest => " (t) Typing Test ",
    };
    let card = Paragraph::new(vec![
        Line::from(blurb),
        Line::from(Span::styled(metrics, dim_style())),
        Line::from(Span::styled(format!("{recorded} recent scores"), dim_style())),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(title, border)),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

pub struct AimScreen;

impl Screen for AimScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let aim = app.bench.aim();
        let l = layout(f.area());

        let acc_style = Grade::for_accuracy(GameKind::AimTrainer, aim.accuracy()).style();
        let spans = [
            stat(format!("{}/{}", aim.targets_hit(), TOTAL_TARGETS), "targets", bold_style()),
            stat(format!("{:.2}", aim.elapsed().as_secs_f64()), "sec", bold_style()),
            stat(format!("{:.2}", aim.cps()), "cps", bold_style()),
            stat(format!("{:.0}%", aim.accuracy()), "accuracy", acc_style),
        ]
        .into_iter()
        .flatten()
        .collect();

        let buf = f.buffer_mut();
        render_stats(spans, l.stats, buf);
        Block::default()
            .borders(Borders::ALL)
            .title(" Aim Trainer ")
            .render(l.board, buf);
        if let Some(history) = l.history {
            render_history(app.bench.history(), GameKind::AimTrainer, history, buf);
        }

        match (aim.phase(), aim.score()) {
            (Phase::Finished, Some(score)) => {
                render_results(
                    [
                        (format!("{:.2}s", score.time), "time", bold_style()),
                        (
                            format!("{:.0}%", score.accuracy),
                            "accuracy",
                            Grade::for_accuracy(GameKind::AimTrainer, score.accuracy).style(),
                        ),
                        (format!("{:.2}", score.cps), "clicks per second", bold_style()),
                    ],
                    RESULTS_LEGEND,
                    l.playfield,
                    buf,
                );
            }
            (Phase::Playing, _) => {
                if let Some(target) = aim.target() {
                    TargetWidget { target }.render(l.playfield, buf);
                }
                if !aim.has_started() {
                    Paragraph::new(Span::styled(
                        "click the target to start the timer",
                        dim_style().add_modifier(Modifier::ITALIC),
                    ))
                    .alignment(Alignment::Center)
                    .render(first_row(l.playfield), buf);
                }
            }
            _ => {
                Paragraph::new(Span::styled("press enter to start", bold_style()))
                    .alignment(Alignment::Center)
                    .render(first_row(l.playfield), buf);
            }
        }

        render_legend("(esc) menu / (r)estart when done", l.legend, buf);
    }
}

pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let typing = app.bench.typing();
        let l = layout(f.area());

        let timer_style = if typing.remaining_secs() <= LOW_TIME_SECS {
            bold_style().fg(Color::Red)
        } else {
            bold_style()
        };
        let acc_style = Grade::for_accuracy(GameKind::TypingTest, typing.accuracy()).style();
        let spans = [
            stat(typing.remaining_secs().to_string(), "sec", timer_style),
            stat(typing.wpm().to_string(), "wpm", bold_style()),
            stat(format!("{:.0}%", typing.accuracy()), "accuracy", acc_style),
        ]
        .into_iter()
        .flatten()
        .collect();

        let buf = f.buffer_mut();
        render_stats(spans, l.stats, buf);
        Block::default()
            .borders(Borders::ALL)
            .title(" Typing Test ")
            .render(l.board, buf);
        if let Some(history) = l.history {
            render_history(app.bench.history(), GameKind::TypingTest, history, buf);
        }

        match (typing.phase(), typing.score()) {
            (Phase::Finished, Some(score)) => {
                render_results(
                    [
                        (format!("{}", score.words_per_minute), "wpm", bold_style()),
                        (
                            format!("{:.0}%", score.accuracy),
                            "accuracy",
                            Grade::for_accuracy(GameKind::TypingTest, score.accuracy).style(),
                        ),
                        (format!("{}", score.characters_typed), "characters", bold_style()),
                    ],
                    RESULTS_LEGEND,
                    l.playfield,
                    buf,
                );
            }
            (Phase::Playing, _) => {
                let prompt = typing.source_text();
                let single_line = prompt.width() <= l.playfield.width as usize;
                let lines = if single_line {
                    1
                } else {
                    (prompt.width() as u16).div_ceil(l.playfield.width.max(1)) + 1
                };
                let top = l.playfield.y + l.playfield.height.saturating_sub(lines) / 2;
                let rect = Rect::new(
                    l.playfield.x,
                    top,
                    l.playfield.width,
                    lines.min(l.playfield.height),
                );

                Paragraph::new(Line::from(prompt_spans(&typing.char_states())))
                    .alignment(if single_line {
                        Alignment::Center
                    } else {
                        Alignment::Left
                    })
                    .wrap(Wrap { trim: true })
                    .render(rect, buf);

                if !typing.has_started() {
                    Paragraph::new(Span::styled(
                        "start typing to begin the 60 second timer",
                        dim_style().add_modifier(Modifier::ITALIC),
                    ))
                    .alignment(Alignment::Center)
                    .render(first_row(l.playfield), buf);
                }
            }
            _ => {
                Paragraph::new(Span::styled("press enter to start", bold_style()))
                    .alignment(Alignment::Center)
                    .render(first_row(l.playfield), buf);
            }
        }

        render_legend("(esc) menu / (r)estart when done", l.legend, buf);
    }
}

fn first_row(area: Rect) -> Rect {
    Rect::new(area.x, area.y, area.width, area.height.min(1))
}

fn char_style(state: CharState) -> Style {
    match state {
        CharState::Correct => bold_style().fg(Color::Green),
        CharState::Incorrect => bold_style().fg(Color::Red),
        CharState::Cursor => bold_style()
            .add_modifier(Modifier::DIM)
            .add_modifier(Modifier::UNDERLINED),
        CharState::Pending => bold_style().add_modifier(Modifier::DIM),
    }
}

/// Runs of equally classified characters, one span each
pub fn prompt_spans(states: &[(char, CharState)]) -> Vec<Span<'static>> {
    let runs = states.iter().chunk_by(|(_, state)| *state);
    runs.into_iter()
        .map(|(state, run)| {
            let text: String = run
                .map(|&(c, _)| match (state, c) {
                    (CharState::Incorrect, ' ') => '·',
                    (_, c) => c,
                })
                .collect();
            Span::styled(text, char_style(state))
        })
        .collect()
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: View) -> Box<dyn Screen> {
    match view {
        View::Menu => Box::new(MenuScreen),
        View::Aim => Box::new(AimScreen),
        View::Typing => Box::new(TypingScreen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_groups_runs_by_state() {
        let states = vec![
            ('h', CharState::Correct),
            ('i', CharState::Correct),
            (' ', CharState::Incorrect),
            ('t', CharState::Cursor),
            ('o', CharState::Pending),
            ('o', CharState::Pending),
        ];
        let spans = prompt_spans(&states);
        let texts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["hi", "·", "t", "oo"]);
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[1].style.fg, Some(Color::Red));
        assert!(spans[2].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn incorrect_letters_keep_their_glyph() {
        let spans = prompt_spans(&[('a', CharState::Incorrect)]);
        assert_eq!(spans[0].content, "a");
    }
}
