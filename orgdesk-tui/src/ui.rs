//! Screen rendering.
//!
//! Pure view code: reads [`App`] state and draws it, no mutation beyond
//! the stateful table selections.

use ratatui::{prelude::*, widgets::*};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

use crate::app::{App, EmployeeForm, FormField, InputMode, ListView, LoginField, Overlay, Screen};

pub fn draw(f: &mut Frame, app: &mut App) {
    if app.screen == Screen::Login {
        draw_login(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    // Optional log pane on the right
    let body = if app.show_logs {
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        draw_logs(f, app, main_chunks[1]);
        main_chunks[0]
    } else {
        chunks[1]
    };

    match app.screen {
        Screen::Login => {}
        Screen::Dashboard => draw_dashboard(f, app, body),
        Screen::Divisions => draw_divisions(f, app, body),
        Screen::Employees => draw_employees(f, app, body),
    }

    draw_footer(f, app, chunks[2]);
    draw_overlay(f, app);
}

// ============================================================================
// Chrome
// ============================================================================

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            " Orgdesk Admin ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        nav_span("[1] Dashboard", app.screen == Screen::Dashboard),
        Span::raw("  "),
        nav_span("[2] Divisions", app.screen == Screen::Divisions),
        Span::raw("  "),
        nav_span("[3] Employees", app.screen == Screen::Employees),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(title, area);

    if let Some(name) = app.admin_name() {
        let who = Paragraph::new(Line::from(vec![
            Span::styled(name.to_string(), Style::default().fg(Color::Green)),
            Span::styled("  [o] logout ", Style::default().fg(Color::DarkGray)),
        ]))
        .alignment(Alignment::Right);
        f.render_widget(who, area.inner(Margin::new(1, 1)));
    }
}

fn nav_span(label: &str, active: bool) -> Span<'_> {
    if active {
        Span::styled(
            label,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(label, Style::default().fg(Color::Gray))
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = match (app.screen, app.input_mode) {
        (_, InputMode::Editing) => "Esc done  Enter apply  type to filter by name",
        (Screen::Dashboard, _) => "q quit  2 divisions  3 employees  o sign out  l logs",
        (Screen::Divisions, _) => "q quit  / filter  n/p page  r refresh  o sign out  l logs",
        (Screen::Employees, _) => {
            "q quit  / filter  f division  n/p page  a add  e edit  x delete  r refresh  o sign out  l logs"
        }
        (Screen::Login, _) => "",
    };

    let mut lines = vec![Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    ))];
    if let Some(status) = &app.status {
        let style = if status.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        lines.push(Line::from(Span::styled(status.text.clone(), style)));
    }

    let footer = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(
            Block::default()
                .title(" Logs ")
                .border_style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::DIM),
                )
                .borders(Borders::ALL),
        )
        .output_separator('|')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style(Style::default().fg(Color::White))
        .state(&app.logger_state);
    f.render_widget(logs, area);
}

// ============================================================================
// Login
// ============================================================================

fn draw_login(f: &mut Frame, app: &App) {
    let area = centered_rect(46, 14, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Orgdesk Admin ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Heading
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(1), // Error
            Constraint::Length(1), // Hint
            Constraint::Min(0),
        ])
        .split(inner);

    let heading = if app.login.in_flight {
        Span::styled("Signing in...", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("Sign in to continue")
    };
    f.render_widget(Paragraph::new(Line::from(heading)), rows[0]);

    draw_login_field(
        f,
        rows[1],
        "Username",
        app.login.username.value(),
        app.login.focus == LoginField::Username,
    );
    let masked = "*".repeat(app.login.password.value().chars().count());
    draw_login_field(
        f,
        rows[2],
        "Password",
        &masked,
        app.login.focus == LoginField::Password,
    );

    if let Some(error) = &app.login.error {
        let error = Paragraph::new(error.clone()).style(Style::default().fg(Color::Red));
        f.render_widget(error, rows[3]);
    }

    let hint = Paragraph::new("Use admin / pastibisa to sign in")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(hint, rows[4]);

    if !app.login.in_flight {
        let (input, row) = match app.login.focus {
            LoginField::Username => (&app.login.username, rows[1]),
            LoginField::Password => (&app.login.password, rows[2]),
        };
        let width = row.width.max(3) - 3;
        let scroll = input.visual_scroll(width as usize);
        f.set_cursor_position((
            row.x + ((input.visual_cursor().max(scroll) - scroll) as u16) + 1,
            row.y + 1,
        ));
    }
}

fn draw_login_field(f: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let field = Paragraph::new(value.to_string()).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {label} ")),
    );
    f.render_widget(field, area);
}

// ============================================================================
// Dashboard
// ============================================================================

fn draw_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let name = app.admin_name().unwrap_or("there");
    let text = vec![
        Line::from(Span::styled(
            format!("Welcome, {name}!"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw("")),
        Line::from(vec![
            Span::raw("Server: "),
            Span::styled(app.api_url.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::raw("")),
        Line::from(Span::raw("Press 2 to manage divisions.")),
        Line::from(Span::raw("Press 3 to manage employees.")),
    ];

    let panel = Paragraph::new(text)
        .block(Block::default().title(" Dashboard ").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

// ============================================================================
// List screens
// ============================================================================

fn draw_divisions(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    draw_filter(f, &app.divisions, app.input_mode, rows[0]);

    if let Some(notice) = list_notice(&app.divisions, "No divisions found") {
        f.render_widget(notice.block(list_block(" Divisions ")), rows[1]);
        return;
    }

    let table_rows: Vec<Row> = app
        .divisions
        .rows
        .iter()
        .enumerate()
        .map(|(idx, d)| {
            Row::new(vec![
                Cell::from(app.divisions.row_number(idx).to_string()),
                Cell::from(d.name.clone()),
            ])
        })
        .collect();

    let table = Table::new(table_rows, [Constraint::Length(5), Constraint::Min(10)])
        .header(header_row(&["#", "Name"]))
        .block(list_block(" Divisions ").title_bottom(page_line(&app.divisions)))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(table, rows[1], &mut app.divisions.table);
}

fn draw_employees(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let filter_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(24), Constraint::Length(30)])
        .split(rows[0]);

    draw_filter(f, &app.employees, app.input_mode, filter_chunks[0]);

    let division = Paragraph::new(format!("< {} >", app.division_filter_label()))
        .style(Style::default().fg(Color::Gray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Division (f) "),
        );
    f.render_widget(division, filter_chunks[1]);

    if let Some(notice) = list_notice(&app.employees, "No employees found") {
        f.render_widget(notice.block(list_block(" Employees ")), rows[1]);
        return;
    }

    let table_rows: Vec<Row> = app
        .employees
        .rows
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            Row::new(vec![
                Cell::from(app.employees.row_number(idx).to_string()),
                Cell::from(e.name.clone()),
                Cell::from(e.phone.clone()),
                Cell::from(e.division.name.clone()),
                Cell::from(e.position.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(5),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ],
    )
    .header(header_row(&["#", "Name", "Phone", "Division", "Position"]))
    .block(list_block(" Employees ").title_bottom(page_line(&app.employees)))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ");
    f.render_stateful_widget(table, rows[1], &mut app.employees.table);
}

fn draw_filter<T>(f: &mut Frame, view: &ListView<T>, mode: InputMode, area: Rect) {
    let style = match mode {
        InputMode::Normal => Style::default().fg(Color::Gray),
        InputMode::Editing => Style::default().fg(Color::Yellow),
    };

    let width = area.width.max(3) - 3;
    let scroll = view.filter.visual_scroll(width as usize);
    let input = Paragraph::new(view.filter.value())
        .style(style)
        .scroll((0, scroll as u16))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Filter by name (/) "),
        );
    f.render_widget(input, area);

    if mode == InputMode::Editing {
        f.set_cursor_position((
            area.x + ((view.filter.visual_cursor().max(scroll) - scroll) as u16) + 1,
            area.y + 1,
        ));
    }
}

fn list_block(title: &str) -> Block<'_> {
    Block::default().title(title.to_string()).borders(Borders::ALL)
}

fn header_row(labels: &[&'static str]) -> Row<'static> {
    Row::new(labels.iter().map(|l| Cell::from(*l)).collect::<Vec<_>>())
        .style(Style::default().add_modifier(Modifier::BOLD))
}

/// Loading, error and empty states take over the table area.
fn list_notice<T>(view: &ListView<T>, empty_text: &str) -> Option<Paragraph<'static>> {
    if let Some(error) = &view.error {
        return Some(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    error.clone(),
                    Style::default().fg(Color::Red),
                )),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .wrap(Wrap { trim: true }),
        );
    }
    if view.loading && !view.loaded {
        return Some(Paragraph::new("Loading...").style(Style::default().fg(Color::Yellow)));
    }
    if view.loaded && view.rows.is_empty() {
        return Some(
            Paragraph::new(empty_text.to_string()).style(Style::default().fg(Color::DarkGray)),
        );
    }
    None
}

/// Bottom title of the table block: page position and nav hints.
fn page_line<T>(view: &ListView<T>) -> Line<'static> {
    let Some(p) = &view.pagination else {
        return Line::from("");
    };
    let nav = |label: &'static str, enabled: bool| {
        if enabled {
            Span::styled(label, Style::default().fg(Color::White))
        } else {
            Span::styled(label, Style::default().fg(Color::DarkGray))
        }
    };
    let total = p.total.map(|t| format!(" ({t} total)")).unwrap_or_default();
    Line::from(vec![
        Span::raw(format!(" Page {} of {}{} ", p.current_page, p.last_page, total)),
        nav("[p] Prev", view.can_prev()),
        Span::raw(" "),
        nav("[n] Next", view.can_next()),
        Span::raw(" "),
    ])
}

// ============================================================================
// Overlays
// ============================================================================

fn draw_overlay(f: &mut Frame, app: &App) {
    match &app.overlay {
        Overlay::None => {}
        Overlay::Form(form) => draw_employee_form(f, form),
        Overlay::ConfirmDelete { name, deleting, .. } => draw_delete_confirm(f, name, *deleting),
    }
}

fn draw_employee_form(f: &mut Frame, form: &EmployeeForm) {
    let area = centered_rect(54, 13, f.area());
    f.render_widget(Clear, area);

    let title = if form.is_edit() {
        " Edit Employee "
    } else {
        " Add Employee "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let division_label = form
        .division
        .as_ref()
        .map(|d| d.name.clone())
        .unwrap_or_else(|| "Select a division".to_string());

    let fields: [(FormField, &str, String); 5] = [
        (FormField::Image, "Image", form.image.value().to_string()),
        (FormField::Name, "Name", form.name.value().to_string()),
        (FormField::Phone, "Phone", form.phone.value().to_string()),
        (FormField::Division, "Division", format!("< {division_label} >")),
        (
            FormField::Position,
            "Position",
            form.position.value().to_string(),
        ),
    ];

    let mut lines: Vec<Line> = fields
        .iter()
        .map(|(field, label, value)| {
            let style = if form.focus == *field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{label:<9}"), Style::default().fg(Color::Gray)),
                Span::styled(value.clone(), style),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    if form.saving {
        lines.push(Line::from(Span::styled(
            "Saving...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Enter save  Esc cancel  Tab next field  Space pick division",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    // Cursor sits at the end of the focused text field
    if !form.saving {
        let cursor = match form.focus {
            FormField::Image => Some((0u16, form.image.visual_cursor())),
            FormField::Name => Some((1, form.name.visual_cursor())),
            FormField::Phone => Some((2, form.phone.visual_cursor())),
            FormField::Division => None,
            FormField::Position => Some((4, form.position.visual_cursor())),
        };
        if let Some((row, col)) = cursor {
            let x = (inner.x + 9 + col as u16).min(inner.right().saturating_sub(1));
            f.set_cursor_position((x, inner.y + row));
        }
    }
}

fn draw_delete_confirm(f: &mut Frame, name: &str, deleting: bool) {
    let area = centered_rect(46, 7, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(format!("Delete employee {name}?")),
        Line::from(""),
        if deleting {
            Line::from(Span::styled(
                "Deleting...",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from(vec![
                Span::styled("[y]", Style::default().fg(Color::Red)),
                Span::raw(" delete   "),
                Span::styled("[n]", Style::default().fg(Color::Green)),
                Span::raw(" cancel"),
            ])
        },
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

/// Fixed-size rect centered in `area`, clamped to it.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::AppEvent;
    use crate::session::SessionStore;
    use orgdesk_client::{OrgdeskClient, Session};
    use ratatui::backend::TestBackend;
    use shared::client::Admin;
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::Receiver<AppEvent>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let (tx, rx) = mpsc::channel(32);
        let app = App::new("http://127.0.0.1:9/api", store, tx).unwrap();
        (app, rx, dir)
    }

    fn sign_in(app: &mut App) {
        let admin = Admin {
            id: "adm-1".to_string(),
            name: "Administrator".to_string(),
            username: "admin".to_string(),
            email: None,
            phone: None,
        };
        let client =
            OrgdeskClient::from_session("http://127.0.0.1:9/api", Session::new("tok", admin))
                .unwrap();
        app.on_event(AppEvent::LoginDone(Ok(Box::new(client))));
    }

    fn rendered_text(app: &mut App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn login_screen_shows_the_form() {
        let (mut app, _rx, _dir) = test_app();
        app.login.error = Some("Invalid username or password".to_string());

        let text = rendered_text(&mut app);

        assert!(text.contains("Orgdesk Admin"));
        assert!(text.contains("Username"));
        assert!(text.contains("Password"));
        assert!(text.contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn dashboard_greets_the_admin() {
        let (mut app, _rx, _dir) = test_app();
        sign_in(&mut app);

        let text = rendered_text(&mut app);

        assert!(text.contains("Welcome, Administrator!"));
        assert!(text.contains("[2] Divisions"));
    }

    #[tokio::test]
    async fn empty_employee_list_shows_the_placeholder() {
        let (mut app, _rx, _dir) = test_app();
        sign_in(&mut app);
        app.screen = Screen::Employees;
        app.employees.loaded = true;

        let text = rendered_text(&mut app);

        assert!(text.contains("No employees found"));
        assert!(text.contains("All divisions"));
    }

    #[tokio::test]
    async fn form_overlay_renders_on_top() {
        let (mut app, _rx, _dir) = test_app();
        sign_in(&mut app);
        app.screen = Screen::Employees;
        app.employees.loaded = true;
        app.overlay = Overlay::Form(EmployeeForm::create());

        let text = rendered_text(&mut app);

        assert!(text.contains("Add Employee"));
        assert!(text.contains("Division"));
    }

    #[tokio::test]
    async fn edit_form_shows_the_record_division() {
        let (mut app, _rx, _dir) = test_app();
        sign_in(&mut app);
        app.screen = Screen::Employees;
        app.employees.loaded = true;

        // No division options loaded; the label still comes from the record.
        let emp = shared::models::Employee {
            id: "e1".to_string(),
            image: "https://example.com/p.jpg".to_string(),
            name: "Alice Johnson".to_string(),
            phone: "0812".to_string(),
            division: shared::models::Division {
                id: "d11".to_string(),
                name: "Archives".to_string(),
            },
            position: "Clerk".to_string(),
        };
        app.overlay = Overlay::Form(EmployeeForm::edit(&emp));

        let text = rendered_text(&mut app);

        assert!(text.contains("Edit Employee"));
        assert!(text.contains("< Archives >"));
    }

    #[tokio::test]
    async fn delete_confirm_names_the_employee() {
        let (mut app, _rx, _dir) = test_app();
        sign_in(&mut app);
        app.screen = Screen::Employees;
        app.overlay = Overlay::ConfirmDelete {
            id: "e1".to_string(),
            name: "Alice Johnson".to_string(),
            deleting: false,
        };

        let text = rendered_text(&mut app);

        assert!(text.contains("Delete employee Alice Johnson?"));
    }
}
