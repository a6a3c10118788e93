//! Text layout for thread panels and comment trees.
//!
//! Everything here produces pre-wrapped [`Line`]s, so a widget's height is
//! simply the number of lines it holds.

use ratatui::{
  style::{Color, Modifier, Style},
  text::{Line, Span},
};
use skein_core::{
  display::ThreadPanel,
  model::{author_label, format_date},
  tree::{CommentTree, NodeId},
};

/// Narrowest column comment text is wrapped to, however deep the nesting.
const MIN_TEXT_WIDTH: usize = 20;

// ─── Wrapping ────────────────────────────────────────────────────────────────

/// Greedy word wrap to `width` columns. Paragraph breaks are kept; words
/// longer than a line are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
  let width = width.max(1);
  let mut out = Vec::new();

  for paragraph in text.lines() {
    let mut line = String::new();
    let mut len = 0;

    for word in paragraph.split_whitespace() {
      let mut word: Vec<char> = word.chars().collect();
      while word.len() > width {
        if len > 0 {
          out.push(std::mem::take(&mut line));
          len = 0;
        }
        let rest = word.split_off(width);
        out.push(word.into_iter().collect());
        word = rest;
      }
      if word.is_empty() {
        continue;
      }

      let needed = if len == 0 { word.len() } else { len + 1 + word.len() };
      if needed > width {
        out.push(std::mem::take(&mut line));
        len = 0;
      }
      if len > 0 {
        line.push(' ');
        len += 1;
      }
      line.extend(word.iter());
      len += word.len();
    }

    out.push(line);
  }

  if out.is_empty() {
    out.push(String::new());
  }
  out
}

// ─── Thread panel ────────────────────────────────────────────────────────────

/// Content lines of a thread panel whose inner area is `width` columns wide.
pub fn panel_lines(panel: &ThreadPanel, width: usize) -> Vec<Line<'static>> {
  let dim = Style::default().fg(Color::DarkGray);
  let mut lines = vec![Line::from(vec![
    Span::styled(format!("▲ {}", panel.upvotes), Style::default().fg(Color::Yellow)),
    Span::styled(format!("  ·  {}", panel.posted), dim),
  ])];

  if let Some(body) = &panel.body {
    lines.push(Line::from(""));
    lines.extend(wrap(body, width).into_iter().map(Line::from));
  }

  lines.push(Line::from(""));
  if let Some(link) = &panel.external_url {
    push_labelled(&mut lines, "Link: ", link, width);
  }
  push_labelled(&mut lines, "URL:  ", &panel.url, width);
  lines
}

fn push_labelled(lines: &mut Vec<Line<'static>>, label: &'static str, value: &str, width: usize) {
  let label_style = Style::default().fg(Color::DarkGray);
  let value_style = Style::default().fg(Color::Blue);
  let indent = " ".repeat(label.len());

  for (i, chunk) in wrap(value, width.saturating_sub(label.len())).into_iter().enumerate() {
    let lead = if i == 0 { label.to_owned() } else { indent.clone() };
    lines.push(Line::from(vec![
      Span::styled(lead, label_style),
      Span::styled(chunk, value_style),
    ]));
  }
}

// ─── Comment tree ────────────────────────────────────────────────────────────

/// The whole tree as guide-prefixed lines, at most `width` columns wide
/// where nesting allows.
pub fn tree_lines(tree: &CommentTree, width: usize) -> Vec<Line<'static>> {
  let mut lines = Vec::new();
  walk(tree, CommentTree::ROOT, "", width, &mut lines);
  lines
}

fn walk(tree: &CommentTree, node: NodeId, prefix: &str, width: usize, out: &mut Vec<Line<'static>>) {
  let guide = Style::default().fg(Color::DarkGray);
  let children = tree.children(node);

  for (i, &child) in children.iter().enumerate() {
    let last = i + 1 == children.len();
    let (branch, stem) = if last { ("└─ ", "   ") } else { ("├─ ", "│  ") };
    let child_prefix = format!("{prefix}{stem}");

    let entry = tree.node(child);
    let Some(comment) = &entry.comment else {
      continue;
    };

    let mut header = vec![
      Span::styled(format!("{prefix}{branch}"), guide),
      Span::styled(
        author_label(comment.username.as_deref()).to_owned(),
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      ),
      Span::styled(
        format!(" · ▲ {} · {}", comment.upvotes, format_date(&comment.date_posted)),
        guide,
      ),
    ];
    if entry.orphaned {
      header.push(Span::styled(
        " (reply to a missing comment)",
        Style::default().fg(Color::Yellow),
      ));
    }
    out.push(Line::from(header));

    let text_width = width
      .saturating_sub(child_prefix.chars().count())
      .max(MIN_TEXT_WIDTH);
    for text in wrap(&comment.text, text_width) {
      out.push(Line::from(vec![
        Span::styled(child_prefix.clone(), guide),
        Span::raw(text),
      ]));
    }

    walk(tree, child, &child_prefix, width, out);
  }
}
