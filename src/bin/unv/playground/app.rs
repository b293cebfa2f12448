//! Playground state: the edited document, the cursor and the latest run report.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use std::path::PathBuf;
use unv::unv::fragment;
use unv::unv::lexing::{classify_line, Line, LineType};
use unv::unv::session::RunReport;

const INDENT: &str = "    ";

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Edited,
    Save,
    Quit,
}

pub struct App {
    lines: Vec<String>,
    row: usize,
    /// Cursor column in characters.
    column: usize,
    path: Option<PathBuf>,
    report: Option<RunReport>,
    status: String,
}

impl App {
    pub fn new(document: &str, path: Option<PathBuf>) -> Self {
        App {
            lines: document.split('\n').map(String::from).collect(),
            row: 0,
            column: 0,
            path,
            report: None,
            status: String::new(),
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// `(row, column)`, both 0-based.
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    pub fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn title(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "scratch".to_string(),
        }
    }

    pub fn show_report(&mut self, report: RunReport) {
        self.report = Some(report);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if control => Action::Quit,
            KeyCode::Char('s') if control => Action::Save,
            KeyCode::Char(c) if !control => {
                self.insert(c.encode_utf8(&mut [0; 4]));
                Action::Edited
            }
            KeyCode::Tab => {
                self.insert(INDENT);
                Action::Edited
            }
            KeyCode::Enter => {
                self.newline();
                Action::Edited
            }
            KeyCode::Backspace => {
                if self.backspace() {
                    Action::Edited
                } else {
                    Action::None
                }
            }
            KeyCode::Left => {
                self.move_left();
                Action::None
            }
            KeyCode::Right => {
                self.move_right();
                Action::None
            }
            KeyCode::Up => {
                self.move_vertical(-1);
                Action::None
            }
            KeyCode::Down => {
                self.move_vertical(1);
                Action::None
            }
            KeyCode::Home => {
                self.column = 0;
                Action::None
            }
            KeyCode::End => {
                self.column = self.line_len(self.row);
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Write the document back to its file, or show its share fragment when there is none.
    pub fn save(&mut self) {
        let text = self.text();
        self.status = match &self.path {
            Some(path) => match fs::write(path, &text) {
                Ok(()) => format!("saved {}", path.display()),
                Err(e) => format!("cannot save {}: {}", path.display(), e),
            },
            None => format!("#{}", fragment::encode(&text)),
        };
    }

    fn insert(&mut self, text: &str) {
        let at = self.byte_offset();
        self.lines[self.row].insert_str(at, text);
        self.column += text.chars().count();
    }

    fn newline(&mut self) {
        let at = self.byte_offset();
        let current = &self.lines[self.row];
        let head = &current[..at];

        let line = Line::new(head);
        let mut indentation = line.indentation().to_string();
        if matches!(classify_line(&line), LineType::BlockOpener(_)) {
            indentation.push_str(INDENT);
        }

        let tail = current[at..].to_string();
        self.lines[self.row].truncate(at);
        self.column = indentation.chars().count();
        self.lines.insert(self.row + 1, indentation + &tail);
        self.row += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.column > 0 {
            self.column -= 1;
            let at = self.byte_offset();
            self.lines[self.row].remove(at);
            true
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.column = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
            true
        } else {
            false
        }
    }

    fn move_left(&mut self) {
        if self.column > 0 {
            self.column -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.column = self.line_len(self.row);
        }
    }

    fn move_right(&mut self) {
        if self.column < self.line_len(self.row) {
            self.column += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.column = 0;
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let Some(row) = self.row.checked_add_signed(delta) else {
            return;
        };
        if row < self.lines.len() {
            self.row = row;
            self.column = self.column.min(self.line_len(row));
        }
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_offset(&self) -> usize {
        let line = &self.lines[self.row];
        line.char_indices()
            .nth(self.column)
            .map_or(line.len(), |(offset, _)| offset)
    }
}
