use anyhow::Result;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tracing_subscriber::EnvFilter;

use vidpaths::app::{App, DialogKind};
use vidpaths::Config;

// Ensures terminal is restored even if the app panics or exits abruptly
struct TermGuard;
impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn main() -> Result<()> {
    let config = Config::default();
    init_logging(&config);
    tracing::info!(path = %config.config_path.display(), "starting");
    let mut app = App::new(config);
    run(&mut app)
}

/// Logs go to a file next to the path list; stdout belongs to the UI.
fn init_logging(config: &Config) {
    if let Some(dir) = config.log_path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run(app: &mut App) -> Result<()> {
    let _tg = TermGuard;
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| ui(f, app))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let Event::Key(k) = event::read()? else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
            break;
        }

        // Modal dialogs swallow everything until dismissed
        if app.active_dialog().is_some() {
            if matches!(k.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.dismiss_dialog();
            }
            continue;
        }
        if app.goto_input.is_some() {
            match k.code {
                KeyCode::Enter => app.confirm_goto(),
                KeyCode::Esc => app.cancel_goto(),
                _ => {
                    if let Some(input) = app.goto_input.as_mut() {
                        let _ = input.input(k);
                    }
                }
            }
            continue;
        }
        if app.picker.is_some() {
            match k.code {
                KeyCode::Esc => app.picker_cancel(),
                KeyCode::Char(' ') | KeyCode::Char('c') => {
                    app.picker_choose();
                }
                KeyCode::Char('g') => app.begin_goto(),
                code => {
                    if let Some(picker) = app.picker.as_mut() {
                        match code {
                            KeyCode::Up | KeyCode::Char('k') => picker.up(),
                            KeyCode::Down | KeyCode::Char('j') => picker.down(),
                            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => picker.enter(),
                            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
                                picker.parent()
                            }
                            _ => {}
                        }
                    }
                }
            }
            continue;
        }
        if app.show_help {
            if matches!(k.code, KeyCode::Esc | KeyCode::Char('?')) {
                app.toggle_help();
            }
            continue;
        }

        match k.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
            KeyCode::Char(' ') => app.toggle_mark(),
            KeyCode::Char('*') => app.toggle_mark_all(),
            KeyCode::Char('a') => app.begin_add(),
            KeyCode::Char('d') | KeyCode::Delete => {
                app.delete_selected();
            }
            KeyCode::Char('s') => app.toggle_include_subfolders(),
            KeyCode::Char('r') => app.rescan(),
            KeyCode::Char('o') => {
                if let Err(e) = app.open_selected() {
                    app.status = format!("Open failed: {e}");
                }
            }
            KeyCode::Char('?') => app.toggle_help(),
            _ => {}
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Path list
            Constraint::Length(3), // Buttons + checkbox
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_path_list(f, chunks[0], app);
    draw_controls(f, chunks[1], app);

    let status = Paragraph::new(format!(
        "PATHS  │  a add  d delete  space mark  s subfolders  r rescan  ? help  q quit  │  {}",
        app.status
    ))
    .style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(status, chunks[2]);

    if app.show_help {
        draw_centered_help(f, f.area());
    }
    if app.picker.is_some() {
        draw_dir_picker(f, f.area(), app);
    }
    if let Some(input) = app.goto_input.as_ref() {
        draw_goto_prompt(f, f.area(), input);
    }
    // Dialogs sit above every other overlay
    if let Some(dialog) = app.active_dialog() {
        draw_dialog(f, f.area(), dialog, app.dialogs.len());
    }
}

fn draw_path_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.rows.is_empty() {
        vec![ListItem::new("(no paths, press a to add one)")
            .style(Style::default().fg(Color::DarkGray))]
    } else {
        app.rows
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let mark = if app.is_marked(path) { "● " } else { "  " };
                let style = if i == app.cursor {
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else if app.is_marked(path) {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(format!("{mark}{}", path.display())).style(style)
            })
            .collect()
    };
    let title = format!(" Video Paths ({}) ", app.rows.len());
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(list, area);
}

fn draw_controls(f: &mut Frame, area: Rect, app: &App) {
    let checkbox = if app.record.include_subfolders() {
        "[x]"
    } else {
        "[ ]"
    };
    let line = Line::from(vec![
        Span::styled(" a ", Style::default().fg(Color::Black).bg(Color::Green)),
        Span::raw(" Add Path    "),
        Span::styled(" d ", Style::default().fg(Color::Black).bg(Color::Red)),
        Span::raw(" Delete Selected    "),
        Span::styled(" s ", Style::default().fg(Color::Black).bg(Color::Yellow)),
        Span::raw(format!(" {checkbox} Include Subfolders")),
    ]);
    let p = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width);
    let h = h.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn draw_centered_help(f: &mut Frame, area: Rect) {
    let help = [
        "vidpaths — Video Paths Manager",
        "",
        "Move: ↑↓ or j/k",
        "Mark row: Space   Mark all: *",
        "Add path (directory chooser): a",
        "Delete marked (or current) rows: d / Delete",
        "Include subfolders: s",
        "Count videos: r",
        "Open in file manager: o",
        "Help: ? (toggle)",
        "Quit: q / Esc",
    ]
    .join("\n");
    let paragraph = Paragraph::new(help)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    let popup = centered(area, 60, 14);
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn draw_dir_picker(f: &mut Frame, area: Rect, app: &App) {
    let Some(picker) = app.picker.as_ref() else {
        return;
    };
    let popup = centered(area, 70, 25);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" Choose Directory: {} ", picker.dir.display()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));
    f.render_widget(block.clone(), popup);
    let inner = block.inner(popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = picker
        .entries
        .iter()
        .map(|entry| {
            let prefix = if entry.is_parent { "↩ " } else { "📁 " };
            ListItem::new(format!("{prefix}{}", entry.label))
        })
        .collect();
    let list = List::new(items).highlight_style(
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default().with_selected(Some(picker.index));
    f.render_stateful_widget(list, chunks[0], &mut state);

    let (footer, style) = match &picker.error {
        Some(err) => (err.clone(), Style::default().fg(Color::White).bg(Color::Red)),
        None => (
            "↑↓ move  Enter open  Backspace parent  Space choose this directory  g go to  Esc cancel"
                .to_string(),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    };
    f.render_widget(
        Paragraph::new(footer).style(style).alignment(Alignment::Center),
        chunks[1],
    );
}

fn draw_goto_prompt(f: &mut Frame, area: Rect, input: &tui_textarea::TextArea) {
    let popup = centered(area, 60, 3);
    let block = Block::default()
        .title("Go to directory (Enter=go, Esc=cancel)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    f.render_widget(Clear, popup);
    f.render_widget(block.clone(), popup);
    let inner = block.inner(popup);
    f.render_widget(input, inner);
}

fn draw_dialog(f: &mut Frame, area: Rect, dialog: &vidpaths::app::Dialog, pending: usize) {
    let color = match dialog.kind {
        DialogKind::Warning => Color::Yellow,
        DialogKind::Error => Color::Red,
    };
    let popup = centered(area, 64, 9);
    let block = Block::default()
        .title(format!(" {} ", dialog.title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Black));
    f.render_widget(Clear, popup);
    f.render_widget(block.clone(), popup);

    let more = if pending > 1 {
        format!("  ({} more)", pending - 1)
    } else {
        String::new()
    };
    let content = vec![
        Line::from(""),
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Black).bg(color)),
            Span::raw(format!(" OK{more}")),
        ]),
    ];
    let body = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(body, block.inner(popup));
}
