use ratatui::{prelude::*, widgets::*};

use crate::{
    app::{App, MinuteField, SettingsField, View},
    pomodoro::{Phase, format_remaining},
};

pub fn render_ui(f: &mut Frame, app: &App) {
    f.render_widget(
        Block::default().style(Style::default().fg(app.theme.text_color)),
        f.size(),
    );
    match app.current_view {
        View::Timer => render_timer(f, app),
        View::Stats => render_stats(f, app),
        View::Settings => render_settings(f, app),
        View::Help => render_help(f, app),
    }
}

fn phase_color(app: &App) -> Color {
    match app.pomodoro.phase() {
        Phase::Idle => app.theme.idle_color,
        Phase::Work => app.theme.work_color,
        Phase::ShortBreak => app.theme.short_break_color,
        Phase::LongBreak => app.theme.long_break_color,
    }
}

fn panel<'a>(title: &'a str, app: &App) -> Block<'a> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.border_color))
}

/// Bold heading line in `color`.
fn heading(text: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn hint(text: &str, app: &App) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(app.theme.muted_color)
            .add_modifier(Modifier::ITALIC),
    ))
}

fn render_timer(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(f.size());

    let header = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.border_color))
        .title(Span::styled(
            " 🍅 CLOCKLAB ",
            Style::default()
                .fg(app.theme.accent_color)
                .add_modifier(Modifier::BOLD),
        ));
    f.render_widget(header, chunks[0]);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Percentage(10),
        ])
        .split(chunks[1]);

    let color = phase_color(app);
    let bold = Style::default().fg(color).add_modifier(Modifier::BOLD);

    f.render_widget(
        Paragraph::new(app.pomodoro.phase().name())
            .style(bold)
            .alignment(Alignment::Center),
        sections[1],
    );
    f.render_widget(
        Paragraph::new(format_remaining(app.pomodoro.remaining()))
            .style(bold)
            .alignment(Alignment::Center),
        sections[3],
    );

    let (status, status_color) = if app.pomodoro.is_running() {
        ("● RUNNING", Color::Green)
    } else if app.pomodoro.phase() == Phase::Idle {
        ("○ READY", app.theme.muted_color)
    } else {
        ("⏸  PAUSED", Color::Yellow)
    };
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(status_color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[5],
    );

    f.render_widget(
        Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .gauge_style(Style::default().fg(color))
            .percent((app.pomodoro.progress_ratio() * 100.0) as u16),
        sections[7],
    );

    let mut dots: Vec<Span> = app
        .pomodoro
        .progress_slots()
        .iter()
        .map(|filled| {
            if *filled {
                Span::styled(" ● ", Style::default().fg(app.theme.accent_color))
            } else {
                Span::styled(" ○ ", Style::default().fg(app.theme.muted_color))
            }
        })
        .collect();
    dots.push(Span::styled(
        format!("  {} done", app.pomodoro.completed_work_sessions()),
        Style::default().fg(app.theme.muted_color),
    ));
    f.render_widget(
        Paragraph::new(Line::from(dots)).alignment(Alignment::Center),
        sections[9],
    );

    f.render_widget(
        Paragraph::new(app.stats_summary())
            .style(Style::default().fg(app.theme.muted_color))
            .alignment(Alignment::Center),
        sections[11],
    );

    f.render_widget(
        Paragraph::new(minute_fields(app)).alignment(Alignment::Center),
        sections[13],
    );

    let mut controls = vec![
        Line::from(vec![
            span_key("Space", app),
            Span::raw(format!(" {}  •  ", app.pomodoro.control_label())),
            span_key("N", app),
            Span::raw(" Skip  •  "),
            span_key("R", app),
            Span::raw(" Reset  •  "),
            span_key("W", app),
            Span::raw("/"),
            span_key("B", app),
            Span::raw(" Minutes"),
        ]),
        Line::from(vec![
            span_key("S", app),
            Span::raw(" Stats  •  "),
            span_key("D", app),
            Span::raw(" Settings  •  "),
            span_key("T", app),
            Span::raw(" Theme  •  "),
            span_key("H", app),
            Span::raw(" Help  •  "),
            span_key("Q", app),
            Span::raw(" Quit"),
        ]),
    ];
    if let Some(status) = &app.status {
        controls.insert(
            0,
            Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Yellow),
            )),
        );
    }
    f.render_widget(
        Paragraph::new(controls)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted_color)),
        chunks[2],
    );
}

fn minute_fields(app: &App) -> Line<'static> {
    let field = |label: &'static str, which: MinuteField, value: u32| -> Vec<Span<'static>> {
        if app.editing == Some(which) {
            let typing = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
            vec![
                Span::styled(
                    label,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(app.input.clone(), typing),
                Span::styled("█", Style::default().fg(Color::Green)),
            ]
        } else {
            let style = if app.pomodoro.is_configurable() {
                Style::default().fg(app.theme.text_color)
            } else {
                Style::default().fg(app.theme.muted_color)
            };
            vec![
                Span::styled(label, style),
                Span::styled(format!("{value} min"), style),
            ]
        }
    };

    let mut spans = field("Work: ", MinuteField::Work, app.pomodoro.work_minutes());
    spans.push(Span::raw("   "));
    spans.extend(field("Break: ", MinuteField::Break, app.pomodoro.break_minutes()));
    spans.push(Span::styled(
        format!(
            "   Long break: {} min",
            app.pomodoro.durations().long_break.as_secs() / 60
        ),
        Style::default().fg(app.theme.muted_color),
    ));
    Line::from(spans)
}

fn span_key<'a>(text: &'a str, app: &App) -> Span<'a> {
    Span::styled(
        text,
        Style::default()
            .fg(app.theme.accent_color)
            .add_modifier(Modifier::BOLD),
    )
}

fn render_help(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        heading("⌨️  KEYBOARD SHORTCUTS", app.theme.accent_color),
        Line::from(""),
        Line::from("  Timer Controls:"),
        help_line("Space", "Start / pause / resume"),
        help_line("N", "Skip to next phase"),
        help_line("R", "Reset to idle"),
        help_line("W", "Edit work minutes (idle only)"),
        help_line("B", "Edit break minutes (idle only)"),
        Line::from(""),
        Line::from("  Views:"),
        help_line("S", "Daily statistics (E exports CSV)"),
        help_line("D", "Settings"),
        help_line("T", "Toggle dark/light theme"),
        help_line("H", "Toggle this help"),
        help_line("Q", "Quit / back"),
        Line::from(""),
        hint("  Every 4th focus session is followed by a long break.", app),
    ];

    f.render_widget(Paragraph::new(help_text).block(panel(" Help ", app)), area);
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn render_stats(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 85, f.size());
    let today = app.stats.entry(&app.today_key());
    let total_hours = app.stats.total_minutes() as f64 / 60.0;

    let mut lines = vec![
        Line::from(""),
        heading("📊 FOCUS STATISTICS", app.theme.accent_color),
        Line::from(""),
        hint("  E to export CSV  •  S/Esc to close", app),
        Line::from(""),
        heading("  📅 Today:", Color::Cyan),
        stat_line("Focus minutes", today.focus_minutes_total.to_string(), app),
        stat_line(
            "Sessions completed",
            today.completed_session_count.to_string(),
            app,
        ),
        Line::from(""),
        heading("  📈 All Time:", Color::Green),
        stat_line("Total sessions", app.stats.total_sessions().to_string(), app),
        stat_line("Total focus time", format!("{total_hours:.1} hours"), app),
        Line::from(""),
        heading("  🗓  By day:", Color::Yellow),
    ];

    let max = app
        .stats
        .days()
        .map(|(_, e)| e.focus_minutes_total)
        .max()
        .unwrap_or(1)
        .max(1);
    let mut any = false;
    for (day, entry) in app.stats.days() {
        any = true;
        let width = (entry.focus_minutes_total as f64 / max as f64 * 30.0) as usize;
        lines.push(Line::from(vec![
            Span::styled(
                format!("     {} ", day),
                Style::default().fg(app.theme.muted_color),
            ),
            Span::styled("█".repeat(width), Style::default().fg(app.theme.accent_color)),
            Span::raw(format!(
                " {}m • {} sessions",
                entry.focus_minutes_total, entry.completed_session_count
            )),
        ]));
    }
    if !any {
        lines.push(Line::from(Span::styled(
            "     No sessions yet!",
            Style::default().fg(app.theme.muted_color),
        )));
    }

    if let Some(status) = &app.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {status}"),
            Style::default().fg(Color::Yellow),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(panel(" Statistics ", app)), area);
}

fn stat_line(label: &str, value: String, app: &App) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("     {}: ", label)),
        Span::styled(
            value,
            Style::default()
                .fg(app.theme.text_color)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

fn render_settings(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 85, f.size());

    let mut lines = vec![
        Line::from(""),
        heading("⚙️  SETTINGS", app.theme.accent_color),
        Line::from(""),
        hint("  ↑↓/jk: Navigate  •  Enter/Space: Toggle  •  Esc: Close", app),
    ];

    let on_off = |on: bool| (if on { "ON" } else { "OFF" }).to_string();

    for field in SettingsField::ALL {
        let (label, value) = match field {
            SettingsField::SoundEnabled => ("🔔 Sound", on_off(app.settings.sound_enabled)),
            SettingsField::DesktopNotifications => (
                "💬 Desktop Notifications",
                on_off(app.settings.desktop_notifications),
            ),
            SettingsField::DefaultView => ("🗂  Start View", app.settings.default_view.clone()),
            SettingsField::Theme => ("🎨 Theme", app.theme_mode.name().to_string()),
        };
        let selected = app.settings_field == field;
        let (prefix, label_style, value_style) = if selected {
            (
                "  > ",
                Style::default()
                    .fg(app.theme.accent_color)
                    .add_modifier(Modifier::BOLD),
                Style::default()
                    .fg(app.theme.text_color)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (
                "    ",
                Style::default().fg(app.theme.text_color),
                Style::default().fg(app.theme.muted_color),
            )
        };

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(prefix, label_style),
            Span::styled(label, label_style),
        ]));
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(value, value_style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  💾 Auto-saved",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(lines).block(panel(" Settings ", app)), area);
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(70, 80, area);
        assert!(inner.width <= 70 && inner.height <= 40);
        assert!(inner.x >= 15 && inner.y >= 5);
    }
}
