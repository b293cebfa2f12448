//! UI rendering
//!
//! Layout structure:
//! - Title bar (1 line)
//! - Middle section:
//!   - Editor (left half)
//!   - Generated code (right, top) and run log (right, bottom)
//! - Status line (1 line)

use super::app::App;
use super::theme::Theme;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unv::unv::session::Outcome;

const MIN_TERMINAL_WIDTH: u16 = 60;
const LINE_NUMBER_WIDTH: usize = 4;

pub fn render(frame: &mut Frame, app: &App) {
    let theme = Theme::default();
    let size = frame.area();

    if size.width < MIN_TERMINAL_WIDTH {
        let msg = format!("Terminal too narrow: {} < {} chars", size.width, MIN_TERMINAL_WIDTH);
        frame.render_widget(Paragraph::new(msg).style(theme.error_message()), size);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(size);

    let title = format!("unv:: {}", app.title());
    frame.render_widget(Paragraph::new(title).style(theme.title_bar()), chunks[0]);
    render_middle_section(frame, chunks[1], app, &theme);
    render_status_line(frame, chunks[2], app, &theme);
}

fn render_middle_section(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let outputs = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);

    render_editor(frame, columns[0], app, theme);
    render_generated(frame, outputs[0], app, theme);
    render_log(frame, outputs[1], app, theme);
}

fn render_editor(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.editor_border())
        .title(" unv ");
    let inner = block.inner(area);

    let (row, column) = app.cursor();
    let scroll = row.saturating_sub(inner.height.saturating_sub(1) as usize);

    let lines: Vec<Line> = app
        .lines()
        .iter()
        .enumerate()
        .map(|(index, text)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>width$} ", index + 1, width = LINE_NUMBER_WIDTH - 1),
                    theme.line_number(),
                ),
                Span::styled(text.clone(), theme.source_text()),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(block).scroll((scroll as u16, 0)),
        area,
    );

    let x = inner.x as usize + LINE_NUMBER_WIDTH + column;
    let y = inner.y as usize + row - scroll;
    if x < (inner.x + inner.width) as usize {
        frame.set_cursor_position((x as u16, y as u16));
    }
}

fn render_generated(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let generated = app.report().map_or("", |report| report.generated.as_str());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.output_border())
        .title(" generated ");
    frame.render_widget(
        Paragraph::new(generated.to_string())
            .style(theme.source_text())
            .block(block),
        area,
    );
}

fn render_log(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.output_border())
        .title(" log ");

    let lines: Vec<Line> = match app.report() {
        Some(report) => {
            let failed = !report.succeeded();
            let last = report.log.len().saturating_sub(1);
            report
                .log
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let style = if failed && index == last {
                        theme.log_error()
                    } else {
                        theme.log_entry()
                    };
                    Line::styled(entry.clone(), style)
                })
                .collect()
        }
        None => vec![Line::styled("running...", theme.log_entry())],
    };

    // keep the newest entries in view
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible);
    frame.render_widget(
        Paragraph::new(lines).block(block).scroll((scroll as u16, 0)),
        area,
    );
}

fn render_status_line(frame: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let run = match app.report() {
        Some(report) => {
            let outcome = match report.outcome {
                Outcome::Completed => "ok",
                Outcome::CompileFailed => "compile error",
                Outcome::RuntimeFailed => "runtime error",
            };
            format!("run {}: {}", report.revision, outcome)
        }
        None => "waiting for first run".to_string(),
    };

    let status = if app.status().is_empty() {
        format!(" {} | Ctrl+S save | Esc quit", run)
    } else {
        format!(" {} | {}", run, app.status())
    };
    frame.render_widget(Paragraph::new(status).style(theme.status_line()), area);
}
