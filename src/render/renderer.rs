use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{CollisionType, EndReason, GameState, GameStatus, Position};
use crate::metrics::GameMetrics;

/// Terminal columns per grid cell, so cells come out roughly square
pub const CELL_WIDTH: u16 = 2;

/// What occupies one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Head,
    Body,
    Food,
    Empty,
}

impl CellKind {
    pub fn of(state: &GameState, pos: Position) -> Self {
        if pos == state.snake.head() {
            CellKind::Head
        } else if state.snake.occupies(pos) {
            CellKind::Body
        } else if state.food == Some(pos) {
            CellKind::Food
        } else {
            CellKind::Empty
        }
    }

    fn span(self) -> Span<'static> {
        match self {
            CellKind::Head => Span::styled(
                "██",
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            ),
            CellKind::Body => Span::styled("██", Style::default().fg(Color::Green)),
            CellKind::Food => Span::styled(
                "██",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            CellKind::Empty => Span::styled(" .", Style::default().fg(Color::DarkGray)),
        }
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, metrics), chunks[0]);

        let board = board_area(chunks[1], state);
        frame.render_widget(self.render_grid(state), board);

        if let GameStatus::Over(reason) = state.status {
            let popup = centered(chunks[1], 36, 7);
            frame.render_widget(Clear, popup);
            frame.render_widget(self.render_game_over(reason, state, metrics), popup);
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'static> {
        let lines: Vec<Line> = (0..state.grid_height as i32)
            .map(|y| {
                let spans: Vec<Span> = (0..state.grid_width as i32)
                    .map(|x| CellKind::of(state, Position::new(x, y)).span())
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

        let text = Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value),
            Span::raw("   "),
            Span::styled("Length: ", label),
            Span::styled(state.snake.len().to_string(), value),
            Span::raw("   "),
            Span::styled("Speed: ", label),
            Span::styled(format!("{}ms", state.tick_interval.as_millis()), value),
            Span::raw("   "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("   "),
            Span::styled("Best: ", label),
            Span::styled(metrics.best_score.to_string(), value),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(
        &self,
        reason: EndReason,
        state: &GameState,
        metrics: &GameMetrics,
    ) -> Paragraph<'static> {
        let (title, detail, color) = match reason {
            EndReason::BoardFilled => ("YOU WIN", "The board is full", Color::Green),
            EndReason::Collision(CollisionType::Wall) => ("GAME OVER", "Hit the wall", Color::Red),
            EndReason::Collision(CollisionType::SelfCollision) => {
                ("GAME OVER", "Bit your own tail", Color::Red)
            }
        };

        let text = vec![
            Line::from(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
            Line::from(format!(
                "Score {}  Best {}",
                state.score,
                metrics.best_score.max(state.score)
            )),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let text = Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" / "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" move | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Board rectangle (grid plus border) centred in `area`, clipped to fit
fn board_area(area: Rect, state: &GameState) -> Rect {
    let width = state.grid_width as u16 * CELL_WIDTH + 2;
    let height = state.grid_height as u16 + 2;
    centered(area, width, height)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
