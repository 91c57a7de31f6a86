//! Application state for the admin console.
//!
//! `App` owns the typestate client through its login/logout transitions,
//! the per-screen list state and the modal overlays. Keystrokes mutate
//! state synchronously; backend work is spawned through [`crate::net`]
//! and folded back in via [`AppEvent`].

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use orgdesk_client::{Anonymous, Authenticated, ClientError, OrgdeskClient, Page};
use ratatui::widgets::TableState;
use shared::models::{Division, Employee, EmployeePayload};
use shared::request::{DivisionQuery, EmployeeQuery};
use shared::response::Pagination;
use tokio::sync::mpsc;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;
use tui_logger::{TuiWidgetEvent, TuiWidgetState};
use validator::Validate;

use crate::net::{self, AppEvent, RequestError};
use crate::session::{SessionStore, StoredSession};

/// Delay between the last filter edit and the fetch it triggers.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(400);

/// Portrait applied when a new employee is created without a photo URL.
pub const DEFAULT_PORTRAIT: &str = "https://randomuser.me/api/portraits/men/1.jpg";

// ============================================================================
// Debounce
// ============================================================================

/// Trailing-edge debounce timer for filter inputs.
///
/// Each edit restarts the timer; the fetch runs once the input has been
/// quiet for [`FILTER_DEBOUNCE`].
#[derive(Debug, Default)]
pub struct Debounce {
    deadline: Option<Instant>,
}

impl Debounce {
    /// Restarts the timer from `now`.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + FILTER_DEBOUNCE);
    }

    /// Returns true once per elapsed deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }
}

// ============================================================================
// List View State
// ============================================================================

/// State for one paginated table view.
pub struct ListView<T> {
    pub rows: Vec<T>,
    pub pagination: Option<Pagination>,
    /// Requested page (1-based); `pagination` reflects the last response.
    pub page: u64,
    pub filter: Input,
    pub debounce: Debounce,
    pub table: TableState,
    pub loading: bool,
    pub error: Option<String>,
    /// Set after the first successful fetch; distinguishes "not loaded
    /// yet" from a genuinely empty result.
    pub loaded: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            pagination: None,
            page: 1,
            filter: Input::default(),
            debounce: Debounce::default(),
            table: TableState::default(),
            loading: false,
            error: None,
            loaded: false,
        }
    }
}

impl<T> ListView<T> {
    /// Filter text, or `None` when blank.
    pub fn filter_value(&self) -> Option<String> {
        let value = self.filter.value().trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// A filter edit snaps back to page 1 and arms the debounce timer.
    pub fn on_filter_edited(&mut self, now: Instant) {
        self.page = 1;
        self.debounce.touch(now);
    }

    pub fn can_next(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_next())
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    /// Advances one page. Returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        if self.can_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.can_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Applies fetched rows, clamping the selection into range.
    pub fn apply(&mut self, page: Page<T>) {
        self.rows = page.items;
        self.pagination = page.pagination;
        self.loading = false;
        self.loaded = true;
        self.error = None;
        if self.rows.is_empty() {
            self.table.select(None);
        } else {
            let idx = self.table.selected().unwrap_or(0).min(self.rows.len() - 1);
            self.table.select(Some(idx));
        }
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    /// Row label for the `#` column, continuing the server's numbering
    /// across pages.
    pub fn row_number(&self, idx: usize) -> u64 {
        let from = self.pagination.as_ref().and_then(|p| p.from).unwrap_or(0);
        from + idx as u64
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let idx = self
            .table
            .selected()
            .map_or(0, |i| (i + 1).min(self.rows.len() - 1));
        self.table.select(Some(idx));
    }

    pub fn select_prev(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let idx = self.table.selected().map_or(0, |i| i.saturating_sub(1));
        self.table.select(Some(idx));
    }

    pub fn selected(&self) -> Option<&T> {
        self.table.selected().and_then(|i| self.rows.get(i))
    }
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Default)]
pub struct LoginForm {
    pub username: Input,
    pub password: Input,
    pub focus: LoginField,
    pub error: Option<String>,
    pub in_flight: bool,
}

impl LoginForm {
    fn focus_next(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn focused_input(&mut self) -> &mut Input {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}

/// Fields of the employee modal, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Image,
    Name,
    Phone,
    Division,
    Position,
}

/// Modal form for creating or editing an employee.
pub struct EmployeeForm {
    /// `Some(id)` when editing an existing employee.
    pub id: Option<String>,
    pub image: Input,
    pub name: Input,
    pub phone: Input,
    /// Selected division, `None` until one is picked.
    pub division: Option<Division>,
    pub position: Input,
    pub focus: FormField,
    pub error: Option<String>,
    pub saving: bool,
}

impl EmployeeForm {
    /// Blank form for a new employee, with the default portrait applied.
    pub fn create() -> Self {
        Self {
            id: None,
            image: Input::new(DEFAULT_PORTRAIT.to_string()),
            name: Input::default(),
            phone: Input::default(),
            division: None,
            position: Input::default(),
            focus: FormField::Image,
            error: None,
            saving: false,
        }
    }

    /// Form prefilled from an existing record. The record's own division
    /// stays selected even when the loaded options do not include it.
    pub fn edit(employee: &Employee) -> Self {
        Self {
            id: Some(employee.id.clone()),
            image: Input::new(employee.image.clone()),
            name: Input::new(employee.name.clone()),
            phone: Input::new(employee.phone.clone()),
            division: Some(employee.division.clone()),
            position: Input::new(employee.position.clone()),
            focus: FormField::Image,
            error: None,
            saving: false,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    fn focus_next(&mut self) {
        self.focus = match self.focus {
            FormField::Image => FormField::Name,
            FormField::Name => FormField::Phone,
            FormField::Phone => FormField::Division,
            FormField::Division => FormField::Position,
            FormField::Position => FormField::Image,
        };
    }

    fn focus_prev(&mut self) {
        self.focus = match self.focus {
            FormField::Image => FormField::Position,
            FormField::Name => FormField::Image,
            FormField::Phone => FormField::Name,
            FormField::Division => FormField::Phone,
            FormField::Position => FormField::Division,
        };
    }

    /// Cycles the division selection through the loaded options. A
    /// selection that is not among them steps onto the first or last one.
    fn cycle_division(&mut self, options: &[Division], forward: bool) {
        if options.is_empty() {
            return;
        }
        let at = self
            .division
            .as_ref()
            .and_then(|sel| options.iter().position(|d| d.id == sel.id));
        let next = match at {
            None => {
                if forward {
                    0
                } else {
                    options.len() - 1
                }
            }
            Some(i) => {
                if forward {
                    (i + 1) % options.len()
                } else {
                    (i + options.len() - 1) % options.len()
                }
            }
        };
        self.division = Some(options[next].clone());
    }

    fn focused_input(&mut self) -> Option<&mut Input> {
        match self.focus {
            FormField::Image => Some(&mut self.image),
            FormField::Name => Some(&mut self.name),
            FormField::Phone => Some(&mut self.phone),
            FormField::Division => None,
            FormField::Position => Some(&mut self.position),
        }
    }

    /// Builds the request payload, validating required fields.
    pub fn payload(&self) -> Result<EmployeePayload, String> {
        let payload = EmployeePayload {
            image: self.image.value().trim().to_string(),
            name: self.name.value().trim().to_string(),
            phone: self.phone.value().trim().to_string(),
            division_id: self
                .division
                .as_ref()
                .map(|d| d.id.clone())
                .unwrap_or_default(),
            position: self.position.value().trim().to_string(),
        };
        payload.validate().map_err(|e| validation_message(&e))?;
        Ok(payload)
    }
}

/// First field-level message out of a validation report.
fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Please fill in all fields".to_string())
}

// ============================================================================
// Screens and Overlays
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Login,
    Dashboard,
    Divisions,
    Employees,
}

/// Which widget receives keystrokes on the list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// The filter input has focus.
    Editing,
}

#[derive(Default)]
pub enum Overlay {
    #[default]
    None,
    Form(EmployeeForm),
    ConfirmDelete {
        id: String,
        name: String,
        deleting: bool,
    },
}

/// Transient message for the footer.
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// Backend connection, tracking the typestate client through its
/// transitions.
enum Conn {
    /// No session. Owns the anonymous client for the next login.
    Idle(OrgdeskClient<Anonymous>),
    /// Login request in flight; the client travels with the task.
    LoggingIn,
    /// Authenticated; request tasks take clones.
    Ready(OrgdeskClient<Authenticated>),
    /// Logout in flight.
    LoggingOut,
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub login: LoginForm,
    pub divisions: ListView<Division>,
    pub employees: ListView<Employee>,
    /// Division choices backing the employee filter and form selects.
    pub division_options: Vec<Division>,
    /// Employee list division filter: index into `division_options`.
    pub division_filter: Option<usize>,
    pub overlay: Overlay,
    pub status: Option<StatusLine>,
    pub logger_state: TuiWidgetState,
    pub show_logs: bool,
    pub should_quit: bool,
    pub api_url: String,
    conn: Conn,
    store: SessionStore,
    tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(
        api_url: &str,
        store: SessionStore,
        tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            screen: Screen::Login,
            input_mode: InputMode::Normal,
            login: LoginForm::default(),
            divisions: ListView::default(),
            employees: ListView::default(),
            division_options: Vec::new(),
            division_filter: None,
            overlay: Overlay::None,
            status: None,
            logger_state: TuiWidgetState::new(),
            show_logs: false,
            should_quit: false,
            api_url: api_url.to_string(),
            conn: Conn::Idle(OrgdeskClient::new(api_url)?),
            store,
            tx,
        })
    }

    /// Restores a persisted session, landing on the dashboard.
    ///
    /// The token is trusted until the backend rejects it.
    pub fn restore_session(&mut self, stored: StoredSession) {
        let username = stored.admin.username.clone();
        match OrgdeskClient::from_session(&self.api_url, stored.into_session()) {
            Ok(client) => {
                tracing::info!("Restored session for {}", username);
                self.conn = Conn::Ready(client);
                self.screen = Screen::Dashboard;
                self.fetch_division_options();
            }
            Err(e) => tracing::warn!("Failed to restore session: {}", e),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.conn, Conn::Ready(_))
    }

    /// Signed-in administrator's display name.
    pub fn admin_name(&self) -> Option<&str> {
        match &self.conn {
            Conn::Ready(client) => client.admin().map(|a| a.name.as_str()),
            _ => None,
        }
    }

    /// Label for the active division filter.
    pub fn division_filter_label(&self) -> &str {
        self.division_filter
            .and_then(|i| self.division_options.get(i))
            .map(|d| d.name.as_str())
            .unwrap_or("All divisions")
    }

    fn client(&self) -> Option<&OrgdeskClient<Authenticated>> {
        match &self.conn {
            Conn::Ready(client) => Some(client),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    fn division_query(&self) -> DivisionQuery {
        DivisionQuery {
            page: self.divisions.page,
            name: self.divisions.filter_value(),
        }
    }

    fn employee_query(&self) -> EmployeeQuery {
        EmployeeQuery {
            page: self.employees.page,
            name: self.employees.filter_value(),
            division_id: self
                .division_filter
                .and_then(|i| self.division_options.get(i))
                .map(|d| d.id.clone()),
        }
    }

    fn fetch_divisions(&mut self) {
        let query = self.division_query();
        if let Some(client) = self.client().cloned() {
            self.divisions.loading = true;
            net::spawn_divisions(self.tx.clone(), client, query);
        }
    }

    fn fetch_employees(&mut self) {
        let query = self.employee_query();
        if let Some(client) = self.client().cloned() {
            self.employees.loading = true;
            net::spawn_employees(self.tx.clone(), client, query);
        }
    }

    fn fetch_division_options(&mut self) {
        if let Some(client) = self.client().cloned() {
            net::spawn_division_options(self.tx.clone(), client);
        }
    }

    /// Switches screens, refreshing the target list.
    fn enter_screen(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        self.screen = screen;
        self.input_mode = InputMode::Normal;
        self.status = None;
        match screen {
            Screen::Divisions => self.fetch_divisions(),
            Screen::Employees => {
                if self.division_options.is_empty() {
                    self.fetch_division_options();
                }
                self.fetch_employees();
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Key handling
    // ------------------------------------------------------------------

    /// Routes a key press by overlay, screen and input mode.
    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if !matches!(self.overlay, Overlay::None) {
            self.on_overlay_key(key);
            return;
        }

        match self.screen {
            Screen::Login => self.on_login_key(key),
            Screen::Dashboard => self.on_dashboard_key(key),
            Screen::Divisions | Screen::Employees => self.on_list_key(key),
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        if self.login.in_flight {
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.focus_next()
            }
            KeyCode::Enter => self.submit_login(),
            _ => {
                self.login.focused_input().handle_event(&Event::Key(key));
            }
        }
    }

    fn submit_login(&mut self) {
        let username = self.login.username.value().trim().to_string();
        let password = self.login.password.value().to_string();
        if username.is_empty() || password.is_empty() {
            self.login.error = Some("Please enter a username and password".to_string());
            return;
        }

        match std::mem::replace(&mut self.conn, Conn::LoggingIn) {
            Conn::Idle(client) => {
                self.login.error = None;
                self.login.in_flight = true;
                net::spawn_login(self.tx.clone(), client, username, password);
            }
            other => self.conn = other,
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.enter_screen(Screen::Dashboard),
            KeyCode::Char('2') => self.enter_screen(Screen::Divisions),
            KeyCode::Char('3') => self.enter_screen(Screen::Employees),
            KeyCode::Char('l') => self.show_logs = !self.show_logs,
            KeyCode::Char('o') => self.logout(),
            KeyCode::PageUp => self.logger_state.transition(TuiWidgetEvent::PrevPageKey),
            KeyCode::PageDown => self.logger_state.transition(TuiWidgetEvent::NextPageKey),
            _ => {}
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Editing => self.on_filter_key(key),
            InputMode::Normal => self.on_list_normal_key(key),
        }
    }

    fn on_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.input_mode = InputMode::Normal,
            _ => {
                let now = Instant::now();
                match self.screen {
                    Screen::Divisions => {
                        let before = self.divisions.filter.value().to_string();
                        self.divisions.filter.handle_event(&Event::Key(key));
                        if self.divisions.filter.value() != before {
                            self.divisions.on_filter_edited(now);
                        }
                    }
                    Screen::Employees => {
                        let before = self.employees.filter.value().to_string();
                        self.employees.filter.handle_event(&Event::Key(key));
                        if self.employees.filter.value() != before {
                            self.employees.on_filter_edited(now);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn on_list_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.enter_screen(Screen::Dashboard),
            KeyCode::Char('2') => self.enter_screen(Screen::Divisions),
            KeyCode::Char('3') => self.enter_screen(Screen::Employees),
            KeyCode::Char('l') => self.show_logs = !self.show_logs,
            KeyCode::Char('o') => self.logout(),
            KeyCode::Char('/') => self.input_mode = InputMode::Editing,
            KeyCode::Char('r') => self.refresh_current(),
            KeyCode::Char('n') | KeyCode::Right => self.change_page(true),
            KeyCode::Char('p') | KeyCode::Left => self.change_page(false),
            KeyCode::Up => self.select_row(false),
            KeyCode::Down => self.select_row(true),
            KeyCode::PageUp => self.logger_state.transition(TuiWidgetEvent::PrevPageKey),
            KeyCode::PageDown => self.logger_state.transition(TuiWidgetEvent::NextPageKey),
            _ => {}
        }

        if self.screen == Screen::Employees {
            match key.code {
                KeyCode::Char('a') => self.open_create_form(),
                KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form(),
                KeyCode::Char('x') | KeyCode::Delete => self.open_delete_confirm(),
                KeyCode::Char('f') => self.cycle_division_filter(),
                _ => {}
            }
        }
    }

    fn select_row(&mut self, down: bool) {
        match (self.screen, down) {
            (Screen::Employees, true) => self.employees.select_next(),
            (Screen::Employees, false) => self.employees.select_prev(),
            (_, true) => self.divisions.select_next(),
            (_, false) => self.divisions.select_prev(),
        }
    }

    fn refresh_current(&mut self) {
        match self.screen {
            Screen::Divisions => self.fetch_divisions(),
            Screen::Employees => self.fetch_employees(),
            _ => {}
        }
    }

    /// Explicit page changes fetch immediately, superseding any pending
    /// filter debounce.
    fn change_page(&mut self, forward: bool) {
        match self.screen {
            Screen::Divisions => {
                let moved = if forward {
                    self.divisions.next_page()
                } else {
                    self.divisions.prev_page()
                };
                if moved {
                    self.divisions.debounce.cancel();
                    self.fetch_divisions();
                }
            }
            Screen::Employees => {
                let moved = if forward {
                    self.employees.next_page()
                } else {
                    self.employees.prev_page()
                };
                if moved {
                    self.employees.debounce.cancel();
                    self.fetch_employees();
                }
            }
            _ => {}
        }
    }

    /// Steps the employee division filter: All -> each division -> All.
    fn cycle_division_filter(&mut self) {
        if self.division_options.is_empty() {
            return;
        }
        self.division_filter = match self.division_filter {
            None => Some(0),
            Some(i) if i + 1 < self.division_options.len() => Some(i + 1),
            Some(_) => None,
        };
        self.employees.on_filter_edited(Instant::now());
    }

    fn open_create_form(&mut self) {
        self.status = None;
        self.overlay = Overlay::Form(EmployeeForm::create());
    }

    fn open_edit_form(&mut self) {
        if let Some(employee) = self.employees.selected() {
            let form = EmployeeForm::edit(employee);
            self.status = None;
            self.overlay = Overlay::Form(form);
        }
    }

    fn open_delete_confirm(&mut self) {
        if let Some(employee) = self.employees.selected() {
            let (id, name) = (employee.id.clone(), employee.name.clone());
            self.status = None;
            self.overlay = Overlay::ConfirmDelete {
                id,
                name,
                deleting: false,
            };
        }
    }

    fn on_overlay_key(&mut self, key: KeyEvent) {
        match &mut self.overlay {
            Overlay::None => {}
            Overlay::Form(form) => {
                if form.saving {
                    return;
                }
                match key.code {
                    KeyCode::Esc => self.overlay = Overlay::None,
                    KeyCode::Enter => self.submit_form(),
                    KeyCode::Tab | KeyCode::Down => form.focus_next(),
                    KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                    KeyCode::Left if form.focus == FormField::Division => {
                        form.cycle_division(&self.division_options, false)
                    }
                    KeyCode::Right | KeyCode::Char(' ')
                        if form.focus == FormField::Division =>
                    {
                        form.cycle_division(&self.division_options, true)
                    }
                    _ => {
                        if let Some(input) = form.focused_input() {
                            input.handle_event(&Event::Key(key));
                        }
                    }
                }
            }
            Overlay::ConfirmDelete { id, deleting, .. } => {
                if *deleting {
                    return;
                }
                match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => {
                        *deleting = true;
                        let id = id.clone();
                        self.delete_employee(id);
                    }
                    KeyCode::Char('n') | KeyCode::Esc => self.overlay = Overlay::None,
                    _ => {}
                }
            }
        }
    }

    fn submit_form(&mut self) {
        let Some(client) = self.client().cloned() else {
            return;
        };
        let Overlay::Form(form) = &mut self.overlay else {
            return;
        };
        match form.payload() {
            Ok(payload) => {
                form.error = None;
                form.saving = true;
                let id = form.id.clone();
                net::spawn_save_employee(self.tx.clone(), client, id, payload);
            }
            Err(message) => form.error = Some(message),
        }
    }

    fn delete_employee(&mut self, id: String) {
        if let Some(client) = self.client().cloned() {
            net::spawn_delete_employee(self.tx.clone(), client, id);
        }
    }

    /// Signs out. The server call is best-effort; local state drops now.
    fn logout(&mut self) {
        match std::mem::replace(&mut self.conn, Conn::LoggingOut) {
            Conn::Ready(client) => {
                if let Err(e) = self.store.clear() {
                    tracing::warn!("Failed to clear session file: {}", e);
                }
                self.reset_data();
                self.screen = Screen::Login;
                self.login = LoginForm::default();
                net::spawn_logout(self.tx.clone(), client);
            }
            other => self.conn = other,
        }
    }

    fn reset_data(&mut self) {
        self.divisions = ListView::default();
        self.employees = ListView::default();
        self.division_options.clear();
        self.division_filter = None;
        self.overlay = Overlay::None;
        self.status = None;
        self.input_mode = InputMode::Normal;
    }

    // ------------------------------------------------------------------
    // Background events
    // ------------------------------------------------------------------

    /// Applies a background task result.
    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LoginDone(result) => {
                self.login.in_flight = false;
                match result {
                    Ok(client) => {
                        if let Some(session) = client.session() {
                            if let Err(e) = self.store.save(&StoredSession::from_session(session))
                            {
                                tracing::warn!("Failed to persist session: {}", e);
                            }
                        }
                        self.conn = Conn::Ready(*client);
                        self.login = LoginForm::default();
                        self.screen = Screen::Dashboard;
                        self.fetch_division_options();
                    }
                    Err((message, client)) => {
                        self.login.error = Some(message);
                        self.conn = Conn::Idle(*client);
                    }
                }
            }
            AppEvent::LoggedOut(client) => {
                if matches!(self.conn, Conn::LoggingOut) {
                    self.conn = Conn::Idle(*client);
                }
            }
            AppEvent::DivisionOptionsLoaded(result) => match result {
                Ok(page) => self.division_options = page.items,
                Err(err) => {
                    if self.check_session(&err) {
                        return;
                    }
                    tracing::warn!("Failed to load division options: {}", err.message);
                }
            },
            AppEvent::DivisionsLoaded(result) => match result {
                Ok(page) => self.divisions.apply(page),
                Err(err) => {
                    if self.check_session(&err) {
                        return;
                    }
                    self.divisions.fail(err.message);
                }
            },
            AppEvent::EmployeesLoaded(result) => match result {
                Ok(page) => self.employees.apply(page),
                Err(err) => {
                    if self.check_session(&err) {
                        return;
                    }
                    self.employees.fail(err.message);
                }
            },
            AppEvent::EmployeeSaved(result) => match result {
                Ok(employee) => {
                    let verb = match &self.overlay {
                        Overlay::Form(form) if form.is_edit() => "updated",
                        _ => "created",
                    };
                    tracing::info!("Employee {} {}", employee.name, verb);
                    self.overlay = Overlay::None;
                    self.set_status(format!("Employee {verb}"), false);
                    self.fetch_employees();
                }
                Err(err) => {
                    if self.check_session(&err) {
                        return;
                    }
                    if let Overlay::Form(form) = &mut self.overlay {
                        form.saving = false;
                        form.error = Some(err.message);
                    } else {
                        self.set_status(err.message, true);
                    }
                }
            },
            AppEvent::EmployeeDeleted(result) => match result {
                Ok(()) => {
                    self.overlay = Overlay::None;
                    self.set_status("Employee deleted".to_string(), false);
                    self.fetch_employees();
                }
                Err(err) => {
                    if self.check_session(&err) {
                        return;
                    }
                    if let Overlay::ConfirmDelete { deleting, .. } = &mut self.overlay {
                        *deleting = false;
                    }
                    self.set_status(err.message, true);
                }
            },
        }
    }

    /// A rejected token mid-session drops back to the login screen.
    fn check_session(&mut self, err: &RequestError) -> bool {
        if !err.unauthorized || !matches!(self.conn, Conn::Ready(_)) {
            return false;
        }
        tracing::warn!("Session rejected by the backend, signing out");
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear session file: {}", e);
        }
        match OrgdeskClient::new(&self.api_url) {
            Ok(client) => self.conn = Conn::Idle(client),
            Err(e) => {
                tracing::error!("Failed to recreate client: {}", e);
                self.should_quit = true;
                return true;
            }
        }
        self.reset_data();
        self.screen = Screen::Login;
        self.login = LoginForm::default();
        self.login.error = Some("Session expired, please sign in again".to_string());
        true
    }

    fn set_status(&mut self, text: String, is_error: bool) {
        self.status = Some(StatusLine { text, is_error });
    }

    // ------------------------------------------------------------------
    // Ticks
    // ------------------------------------------------------------------

    /// Fires debounced filter fetches.
    pub fn on_tick(&mut self, now: Instant) {
        if self.divisions.debounce.fire(now) {
            self.fetch_divisions();
        }
        if self.employees.debounce.fire(now) {
            self.fetch_employees();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgdesk_client::Session;
    use shared::client::Admin;

    fn sample_admin() -> Admin {
        Admin {
            id: "adm-1".to_string(),
            name: "Administrator".to_string(),
            username: "admin".to_string(),
            email: None,
            phone: None,
        }
    }

    fn division(id: &str, name: &str) -> Division {
        Division {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn employee(id: &str, name: &str, division: Division) -> Employee {
        Employee {
            id: id.to_string(),
            image: "https://example.com/p.jpg".to_string(),
            name: name.to_string(),
            phone: "0812".to_string(),
            division,
            position: "Engineer".to_string(),
        }
    }

    fn test_app() -> (App, mpsc::Receiver<AppEvent>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let (tx, rx) = mpsc::channel(32);
        let app = App::new("http://127.0.0.1:9/api", store, tx).unwrap();
        (app, rx, dir)
    }

    fn authed_client() -> OrgdeskClient<Authenticated> {
        OrgdeskClient::from_session("http://127.0.0.1:9/api", Session::new("tok", sample_admin()))
            .unwrap()
    }

    #[test]
    fn debounce_fires_once_after_the_delay() {
        let mut debounce = Debounce::default();
        let t0 = Instant::now();

        debounce.touch(t0);
        assert!(!debounce.fire(t0 + Duration::from_millis(200)));
        assert!(debounce.fire(t0 + Duration::from_millis(400)));
        assert!(!debounce.fire(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn debounce_restarts_on_each_edit() {
        let mut debounce = Debounce::default();
        let t0 = Instant::now();

        debounce.touch(t0);
        debounce.touch(t0 + Duration::from_millis(300));
        assert!(!debounce.fire(t0 + Duration::from_millis(500)));
        assert!(debounce.fire(t0 + Duration::from_millis(700)));
    }

    #[test]
    fn filter_edit_resets_to_page_one() {
        let mut view: ListView<Division> = ListView::default();
        view.page = 4;

        view.on_filter_edited(Instant::now());

        assert_eq!(view.page, 1);
        assert!(view.debounce.pending());
    }

    #[test]
    fn next_page_stops_at_the_last_page() {
        let mut view: ListView<Division> = ListView::default();
        view.page = 2;
        view.pagination = Some(Pagination::new(2, 10, 12));

        assert!(!view.can_next());
        assert!(!view.next_page());
        assert_eq!(view.page, 2);

        assert!(view.prev_page());
        assert_eq!(view.page, 1);
        assert!(!view.prev_page());
    }

    #[test]
    fn row_numbers_follow_the_server_offset() {
        let mut view: ListView<Division> = ListView::default();
        view.pagination = Some(Pagination::new(2, 10, 12));

        assert_eq!(view.row_number(0), 11);
        assert_eq!(view.row_number(1), 12);

        view.pagination = None;
        assert_eq!(view.row_number(2), 2);
    }

    #[test]
    fn apply_clamps_the_selection() {
        let mut view: ListView<Division> = ListView::default();
        view.table.select(Some(5));

        view.apply(Page {
            items: vec![division("d1", "QA"), division("d2", "Backend")],
            pagination: None,
        });
        assert_eq!(view.table.selected(), Some(1));
        assert!(view.loaded);

        view.apply(Page {
            items: vec![],
            pagination: None,
        });
        assert_eq!(view.table.selected(), None);
    }

    #[test]
    fn create_form_applies_the_default_portrait() {
        let form = EmployeeForm::create();
        assert_eq!(form.image.value(), DEFAULT_PORTRAIT);
        assert!(!form.is_edit());
    }

    #[test]
    fn edit_form_prefills_from_the_employee() {
        let emp = employee("e1", "Alice Johnson", division("d2", "Backend"));

        let form = EmployeeForm::edit(&emp);

        assert!(form.is_edit());
        assert_eq!(form.division, Some(division("d2", "Backend")));
        assert_eq!(form.name.value(), "Alice Johnson");

        let payload = form.payload().unwrap();
        assert_eq!(payload.division_id, "d2");
    }

    #[test]
    fn edit_keeps_a_division_missing_from_the_options() {
        let options = vec![division("d1", "QA")];
        let emp = employee("e7", "Rama Putra", division("d11", "Archives"));

        let mut form = EmployeeForm::edit(&emp);

        // The unchanged record must save with its own division even though
        // the loaded options do not carry it.
        let payload = form.payload().unwrap();
        assert_eq!(payload.division_id, "d11");

        // Cycling steps onto the loaded options.
        form.cycle_division(&options, true);
        assert_eq!(form.division, Some(division("d1", "QA")));
    }

    #[test]
    fn form_rejects_blank_required_fields() {
        let mut form = EmployeeForm::create();
        form.division = Some(division("d1", "QA"));
        form.phone = Input::new("0812".to_string());
        form.position = Input::new("Engineer".to_string());

        let err = form.payload().unwrap_err();
        assert_eq!(err, "name is required");
    }

    #[test]
    fn division_filter_cycles_back_to_all() {
        let (mut app, _rx, _dir) = test_app();
        app.division_options = vec![division("d1", "QA"), division("d2", "Backend")];
        app.employees.page = 3;

        app.cycle_division_filter();
        assert_eq!(app.division_filter, Some(0));
        assert_eq!(app.employees.page, 1);
        assert!(app.employees.debounce.pending());

        app.cycle_division_filter();
        assert_eq!(app.division_filter, Some(1));

        app.cycle_division_filter();
        assert_eq!(app.division_filter, None);
        assert_eq!(app.division_filter_label(), "All divisions");
    }

    #[tokio::test]
    async fn login_success_lands_on_the_dashboard() {
        let (mut app, _rx, dir) = test_app();

        app.on_event(AppEvent::LoginDone(Ok(Box::new(authed_client()))));

        assert_eq!(app.screen, Screen::Dashboard);
        assert!(app.is_authenticated());
        assert_eq!(app.admin_name(), Some("Administrator"));
        assert!(dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn login_failure_keeps_the_login_screen() {
        let (mut app, _rx, _dir) = test_app();
        let anon = OrgdeskClient::new("http://127.0.0.1:9/api").unwrap();

        app.on_event(AppEvent::LoginDone(Err((
            "Invalid username or password".to_string(),
            Box::new(anon),
        ))));

        assert_eq!(app.screen, Screen::Login);
        assert!(!app.is_authenticated());
        assert_eq!(
            app.login.error.as_deref(),
            Some("Invalid username or password")
        );
    }

    #[tokio::test]
    async fn restored_session_skips_the_login_screen() {
        let (mut app, _rx, _dir) = test_app();
        let stored = StoredSession::from_session(&Session::new("tok", sample_admin()));

        app.restore_session(stored);

        assert_eq!(app.screen, Screen::Dashboard);
        assert!(app.is_authenticated());
        assert_eq!(app.admin_name(), Some("Administrator"));
    }

    #[tokio::test]
    async fn rejected_token_drops_back_to_login() {
        let (mut app, _rx, dir) = test_app();
        app.on_event(AppEvent::LoginDone(Ok(Box::new(authed_client()))));
        assert!(dir.path().join("session.json").exists());

        app.on_event(AppEvent::EmployeesLoaded(Err(RequestError {
            message: "Unauthenticated.".to_string(),
            unauthorized: true,
        })));

        assert_eq!(app.screen, Screen::Login);
        assert!(!app.is_authenticated());
        assert_eq!(
            app.login.error.as_deref(),
            Some("Session expired, please sign in again")
        );
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_the_view_with_a_message() {
        let (mut app, _rx, _dir) = test_app();
        app.on_event(AppEvent::LoginDone(Ok(Box::new(authed_client()))));

        app.on_event(AppEvent::EmployeesLoaded(Err(RequestError {
            message: "Failed to load employees".to_string(),
            unauthorized: false,
        })));

        assert!(app.is_authenticated());
        assert_eq!(
            app.employees.error.as_deref(),
            Some("Failed to load employees")
        );
    }

    #[tokio::test]
    async fn paging_key_supersedes_a_pending_debounce() {
        let (mut app, _rx, _dir) = test_app();
        app.on_event(AppEvent::LoginDone(Ok(Box::new(authed_client()))));
        app.screen = Screen::Employees;
        app.employees.pagination = Some(Pagination::new(1, 10, 12));
        app.employees.debounce.touch(Instant::now());

        app.on_key(KeyEvent::from(KeyCode::Char('n')));

        assert_eq!(app.employees.page, 2);
        assert!(!app.employees.debounce.pending());
    }

    #[tokio::test]
    async fn logout_clears_the_session_and_data() {
        let (mut app, _rx, dir) = test_app();
        app.on_event(AppEvent::LoginDone(Ok(Box::new(authed_client()))));
        app.screen = Screen::Employees;
        app.employees.rows = vec![employee("e1", "Alice", division("d1", "QA"))];

        app.on_key(KeyEvent::from(KeyCode::Char('o')));

        assert_eq!(app.screen, Screen::Login);
        assert!(!app.is_authenticated());
        assert!(app.employees.rows.is_empty());
        assert!(!dir.path().join("session.json").exists());

        let anon = OrgdeskClient::new("http://127.0.0.1:9/api").unwrap();
        app.on_event(AppEvent::LoggedOut(Box::new(anon)));
        assert!(!app.is_authenticated());
    }

    #[tokio::test]
    async fn save_result_closes_the_form_and_refreshes() {
        let (mut app, _rx, _dir) = test_app();
        app.on_event(AppEvent::LoginDone(Ok(Box::new(authed_client()))));
        app.screen = Screen::Employees;
        app.overlay = Overlay::Form(EmployeeForm::create());

        app.on_event(AppEvent::EmployeeSaved(Ok(employee(
            "e1",
            "Zed",
            division("d1", "QA"),
        ))));

        assert!(matches!(app.overlay, Overlay::None));
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.text, "Employee created");
        assert!(!status.is_error);
        assert!(app.employees.loading);
    }

    #[tokio::test]
    async fn save_error_stays_in_the_form() {
        let (mut app, _rx, _dir) = test_app();
        app.on_event(AppEvent::LoginDone(Ok(Box::new(authed_client()))));
        let mut form = EmployeeForm::create();
        form.saving = true;
        app.overlay = Overlay::Form(form);

        app.on_event(AppEvent::EmployeeSaved(Err(RequestError {
            message: "The selected division id is invalid.".to_string(),
            unauthorized: false,
        })));

        match &app.overlay {
            Overlay::Form(form) => {
                assert!(!form.saving);
                assert_eq!(
                    form.error.as_deref(),
                    Some("The selected division id is invalid.")
                );
            }
            _ => panic!("form should stay open"),
        }
    }
}
