//! Layout and drawing: board, active piece, next preview, score, overlays, particles.

use crate::board::Cell;
use crate::effects::{Particles, RowFlash};
use crate::game::GameState;
use crate::piece::{ColorId, Shape};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;

/// Terminal columns per board cell; one row per cell.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 18;
/// Next preview box, in board cells.
const PREVIEW_CELLS: u16 = 4;

const FILLED: &str = "██";
const EMPTY: &str = " ·";
const PARTICLE: &str = "•";

/// Everything a frame needs besides the game state.
pub struct View<'a> {
    pub theme: &'a Theme,
    pub paused: bool,
    pub particles: Option<&'a Particles>,
    pub flash: Option<&'a mut RowFlash>,
    pub now: Instant,
}

/// Board outline size in terminal cells (border included).
fn board_outer_size(width: u16, height: u16) -> (u16, u16) {
    (width * CELL_WIDTH + 2, height + 2)
}

/// Largest board (columns, rows) up to the requested size that fits the terminal
/// next to the sidebar.
pub fn fit_board(term_cols: u16, term_rows: u16, width: u16, height: u16) -> (u16, u16) {
    let max_w = term_cols.saturating_sub(SIDEBAR_WIDTH + 2) / CELL_WIDTH;
    let max_h = term_rows.saturating_sub(2);
    (width.min(max_w).max(1), height.min(max_h).max(1))
}

/// (board outline, sidebar), centred in `area`.
fn layout(area: Rect, state: &GameState) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(state.board().width() as u16, state.board().height() as u16);
    let total_w = bw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    (inner[0], inner[1])
}

fn border_style(theme: &Theme) -> Style {
    Style::default().fg(theme.grid).bg(theme.bg)
}

/// Linear blend of `color` into `bg`; non-RGB colours snap at the halfway point.
fn fade(color: Color, bg: Color, alpha: f32) -> Color {
    match (color, bg) {
        (Color::Rgb(r, g, b), Color::Rgb(br, bg_, bb)) => {
            let mix = |c: u8, b: u8| (b as f32 + (c as f32 - b as f32) * alpha).round() as u8;
            Color::Rgb(mix(r, br), mix(g, bg_), mix(b, bb))
        }
        _ if alpha >= 0.5 => color,
        _ => bg,
    }
}

pub fn draw(frame: &mut Frame, state: &GameState, view: View<'_>) {
    let View {
        theme,
        paused,
        particles,
        flash,
        now,
    } = view;
    let area = frame.area();
    let (board_area, sidebar_area) = layout(area, state);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme))
        .title(Span::styled(" Blockfall ", Style::default().fg(theme.title)));
    let board_rect = block.inner(board_area);
    block.render(board_area, frame.buffer_mut());

    draw_board(frame.buffer_mut(), state, theme, board_rect);
    if let Some(particles) = particles {
        draw_particles(frame.buffer_mut(), particles, theme, board_rect);
    }
    if let Some(flash) = flash {
        flash.render(frame, board_rect, now);
    }
    draw_sidebar(frame.buffer_mut(), state, theme, sidebar_area);

    if state.is_game_over() {
        draw_game_over(frame.buffer_mut(), state, theme, area);
    } else if paused {
        draw_pause_overlay(frame.buffer_mut(), theme, area);
    }
}

fn put_cell(buf: &mut Buffer, rect: Rect, x: i32, y: i32, symbol: &str, style: Style) {
    if x < 0 || y < 0 {
        return;
    }
    let rx = rect.x as i32 + x * CELL_WIDTH as i32;
    let ry = rect.y as i32 + y;
    if rx + CELL_WIDTH as i32 > (rect.x + rect.width) as i32 || ry >= (rect.y + rect.height) as i32 {
        return;
    }
    buf.set_string(rx as u16, ry as u16, symbol, style);
}

fn draw_board(buf: &mut Buffer, state: &GameState, theme: &Theme, rect: Rect) {
    let empty = Style::default().fg(theme.grid).bg(theme.bg);
    for (y, row) in state.board().rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let (symbol, style) = match *cell {
                Cell::Empty => (EMPTY, empty),
                Cell::Filled(id) => (FILLED, filled_style(theme, id)),
            };
            put_cell(buf, rect, x as i32, y as i32, symbol, style);
        }
    }

    if state.is_game_over() {
        return;
    }
    let piece = state.active();
    let style = filled_style(theme, piece.color());
    for (x, y) in piece.cells() {
        put_cell(buf, rect, x, y, FILLED, style);
    }
}

fn filled_style(theme: &Theme, id: ColorId) -> Style {
    let c = theme.piece_color(id);
    Style::default().fg(c).bg(theme.bg)
}

fn draw_particles(buf: &mut Buffer, particles: &Particles, theme: &Theme, rect: Rect) {
    for p in particles.iter() {
        if p.x < 0.0 || p.y < 0.0 {
            continue;
        }
        let rx = rect.x as f32 + p.x * CELL_WIDTH as f32;
        let ry = rect.y as f32 + p.y;
        if rx >= (rect.x + rect.width) as f32 || ry >= (rect.y + rect.height) as f32 {
            continue;
        }
        let color = fade(theme.piece_color(p.color), theme.bg, p.alpha());
        buf[(rx as u16, ry as u16)]
            .set_symbol(PARTICLE)
            .set_fg(color);
    }
}

fn draw_sidebar(buf: &mut Buffer, state: &GameState, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let text_style = Style::default().fg(theme.text);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(PREVIEW_CELLS + 2), // Next (border + 4x4 box)
            Constraint::Length(4),                 // Score, Lines
            Constraint::Fill(1),                   // controls
        ])
        .split(area);

    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme))
        .title(Span::styled(" Next ", title_style));
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], buf);
    draw_preview(buf, &state.next().shape, state.next().color(), theme, next_inner);

    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(theme));
    let stats_inner = stats_block.inner(chunks[1]);
    stats_block.render(chunks[1], buf);
    Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score().to_string(), text_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(state.lines().to_string(), text_style),
        ]),
    ])
    .render(stats_inner, buf);

    let hint = Style::default().fg(theme.grid);
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(" ←→/hl  move", hint)),
        Line::from(Span::styled(" ↑/k    rotate", hint)),
        Line::from(Span::styled(" ↓/j    soft drop", hint)),
        Line::from(Span::styled(" space  hard drop", hint)),
        Line::from(Span::styled(" p      pause", hint)),
        Line::from(Span::styled(" q      quit", hint)),
    ])
    .render(chunks[2], buf);
}

/// Shape centred in a 4x4-cell box at the top-left of `area`.
fn draw_preview(buf: &mut Buffer, shape: &Shape, color: ColorId, theme: &Theme, area: Rect) {
    let box_w = (PREVIEW_CELLS * CELL_WIDTH).min(area.width);
    let box_h = PREVIEW_CELLS.min(area.height);
    let off_x = box_w.saturating_sub(shape.width() as u16 * CELL_WIDTH) / 2;
    let off_y = box_h.saturating_sub(shape.height() as u16) / 2;
    let style = filled_style(theme, color);
    for (dx, dy) in shape.cells() {
        let x = area.x + off_x + dx as u16 * CELL_WIDTH;
        let y = area.y + off_y + dy as u16;
        if x + CELL_WIDTH <= area.x + area.width && y < area.y + area.height {
            buf.set_string(x, y, FILLED, style);
        }
    }
}

/// Centred popup of `lines` over `area`.
fn draw_popup(buf: &mut Buffer, theme: &Theme, area: Rect, lines: Vec<Line<'_>>) {
    let popup_w = 26u16.min(area.width);
    let popup_h = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    };
    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(theme)),
        )
        .render(popup, buf);
}

fn draw_game_over(buf: &mut Buffer, state: &GameState, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            " Game Over! ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Score: {}", state.score()),
            Style::default().fg(theme.text),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to restart",
            Style::default().fg(theme.text),
        )),
    ];
    draw_popup(buf, theme, area, lines);
}

fn draw_pause_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "P resume   Q quit",
            Style::default().fg(theme.text),
        )),
    ];
    draw_popup(buf, theme, area, lines);
}
