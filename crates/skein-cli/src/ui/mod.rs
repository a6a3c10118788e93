//! Terminal output: a [`DisplaySink`] that prints panels and comment trees
//! into the normal scrollback.
//!
//! On a terminal, widgets go through an inline ratatui viewport with
//! [`Terminal::insert_before`]. When stdout is not a terminal they are drawn
//! into an off-screen buffer and written out as plain text.

pub mod layout;

use std::io::{self, IsTerminal as _, Stdout, Write as _};

use ratatui::{
  Terminal, TerminalOptions, Viewport,
  backend::CrosstermBackend,
  buffer::Buffer,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Block, Borders, Paragraph, Widget},
};
use skein_core::{
  display::{DisplaySink, Notice, ThreadPanel},
  tree::CommentTree,
};

/// Width used when stdout is not a terminal.
const PLAIN_WIDTH: u16 = 100;

enum Target {
  Inline(Terminal<CrosstermBackend<Stdout>>),
  Plain(Stdout),
}

pub struct TerminalSink {
  target: Target,
}

impl TerminalSink {
  pub fn new() -> io::Result<Self> {
    let stdout = io::stdout();
    let target = if stdout.is_terminal() {
      let terminal = Terminal::with_options(CrosstermBackend::new(stdout), TerminalOptions {
        viewport: Viewport::Inline(1),
      })?;
      Target::Inline(terminal)
    } else {
      Target::Plain(stdout)
    };
    Ok(Self { target })
  }

  fn width(&self) -> io::Result<u16> {
    match &self.target {
      Target::Inline(terminal) => Ok(terminal.size()?.width),
      Target::Plain(_) => Ok(PLAIN_WIDTH),
    }
  }

  /// Print `widget` as `height` full-width rows above the viewport.
  fn emit(&mut self, height: u16, widget: impl Widget) -> io::Result<()> {
    if height == 0 {
      return Ok(());
    }
    match &mut self.target {
      Target::Inline(terminal) => terminal.insert_before(height, |buf| widget.render(buf.area, buf)),
      Target::Plain(stdout) => {
        let area = Rect::new(0, 0, PLAIN_WIDTH, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        let mut out = stdout.lock();
        for row in buffer_rows(&buf) {
          writeln!(out, "{row}")?;
        }
        out.flush()
      }
    }
  }

  fn emit_lines(&mut self, lines: Vec<Line<'static>>) -> io::Result<()> {
    let height = to_height(lines.len());
    self.emit(height, Paragraph::new(lines))
  }
}

impl DisplaySink for TerminalSink {
  type Error = io::Error;

  fn notice(&mut self, notice: &Notice) -> io::Result<()> {
    let style = match notice {
      Notice::SubredditNotFound { .. } => Style::default().fg(Color::Red),
      Notice::NoThreads { .. } => Style::default().fg(Color::Yellow),
    };
    self.emit_lines(vec![Line::styled(notice.to_string(), style)])
  }

  fn thread(&mut self, panel: &ThreadPanel) -> io::Result<()> {
    let width = self.width()?;
    let inner = usize::from(width.saturating_sub(2));
    let lines = layout::panel_lines(panel, inner);

    let block = Block::default()
      .title(Line::styled(
        format!(" {} ", panel.heading),
        Style::default().add_modifier(Modifier::BOLD),
      ))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));

    let height = to_height(lines.len()).saturating_add(2);
    self.emit(height, Paragraph::new(lines).block(block))
  }

  fn comments(&mut self, tree: &CommentTree) -> io::Result<()> {
    let width = usize::from(self.width()?);
    let mut lines = layout::tree_lines(tree, width);
    lines.push(Line::from(""));
    self.emit_lines(lines)
  }
}

fn to_height(lines: usize) -> u16 { u16::try_from(lines).unwrap_or(u16::MAX) }

/// Rows of `buf` as text with trailing blanks removed.
fn buffer_rows(buf: &Buffer) -> Vec<String> {
  let area = buf.area;
  (area.top()..area.bottom())
    .map(|y| {
      let row: String = (area.left()..area.right())
        .map(|x| buf[(x, y)].symbol())
        .collect();
      row.trim_end().to_owned()
    })
    .collect()
}
