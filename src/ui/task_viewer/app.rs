use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::board::{Column, ListFilter};
use crate::config::ViewMode;
use crate::deps::DependencyEntry;
use crate::error::{Error, Result};
use crate::source::{TaskFilter, TaskSource};
use crate::stats::TaskStats;
use crate::task::{Task, TaskKey};
use crate::view::TaskDependencyView;

use super::model;
use super::view;

const NARROW_WIDTH: u16 = 90;
const EVENT_POLL_MS: u64 = 120;
const WATCH_DEBOUNCE_MS: u64 = 200;

/// Startup settings for the viewer.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub mode: ViewMode,
    pub status: Option<String>,
    /// Fetch-side agent scope; the `a` key filters locally on top of it.
    pub agent: Option<String>,
    pub limit: usize,
    pub refresh_secs: u64,
}

enum LoadRequest {
    Reload,
}

enum UiMsg {
    DataLoaded(Vec<Task>, Option<TaskStats>, Option<String>),
    LoadError(String),
    WatchError(String),
}

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub struct AppState {
    pub(crate) view: TaskDependencyView,
    pub(crate) stats: Option<TaskStats>,
    pub(crate) mode: ViewMode,
    pub(crate) status_filter: Option<String>,
    pub(crate) agent_filter: Option<String>,
    pub(crate) list_cursor: usize,
    pub(crate) column: Column,
    pub(crate) column_cursors: [usize; 3],
    pub(crate) dep_cursor: usize,
    pub(crate) show_help: bool,
    pub(crate) loaded: bool,
    pub(crate) source_label: String,
    pub(crate) info_message: Option<String>,
    status_message: Option<String>,
    watch_error: Option<String>,
    viewport_width: u16,
}

impl AppState {
    pub(crate) fn new(options: &ViewerOptions, source_label: String) -> Self {
        Self {
            view: TaskDependencyView::new(),
            stats: None,
            mode: options.mode,
            status_filter: options.status.clone(),
            agent_filter: None,
            list_cursor: 0,
            column: Column::Pending,
            column_cursors: [0; 3],
            dep_cursor: 0,
            show_help: false,
            loaded: false,
            source_label,
            info_message: None,
            status_message: None,
            watch_error: None,
            viewport_width: 0,
        }
    }

    fn update_viewport(&mut self, width: u16) {
        self.viewport_width = width;
    }

    pub(crate) fn is_narrow(&self) -> bool {
        self.viewport_width < NARROW_WIDTH
    }

    pub(crate) fn list_filter(&self) -> ListFilter {
        ListFilter::new(self.status_filter.clone(), self.agent_filter.clone())
    }

    /// Rows of the list, or of the focused board column.
    pub(crate) fn visible_tasks(&self) -> Vec<&Task> {
        match self.mode {
            ViewMode::List => self.view.list(&self.list_filter()),
            ViewMode::Board => self.view.board().column(self.column).to_vec(),
        }
    }

    pub(crate) fn cursor(&self) -> usize {
        match self.mode {
            ViewMode::List => self.list_cursor,
            ViewMode::Board => self.column_cursors[self.column.index()],
        }
    }

    fn set_cursor(&mut self, cursor: usize) {
        match self.mode {
            ViewMode::List => self.list_cursor = cursor,
            ViewMode::Board => self.column_cursors[self.column.index()] = cursor,
        }
    }

    pub(crate) fn cursor_task(&self) -> Option<&Task> {
        self.visible_tasks().get(self.cursor()).copied()
    }

    fn cursor_key(&self) -> Option<TaskKey> {
        self.cursor_task().map(Task::key)
    }

    pub(crate) fn dependency_entries(&self) -> Vec<DependencyEntry<'_>> {
        self.view
            .dependencies_of_selected()
            .map(|deps| deps.entries())
            .unwrap_or_default()
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(error) = self.watch_error.as_ref() {
            return Some((error.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        if !self.loaded {
            return Some((format!("loading {}", self.source_label), StatusKind::Info));
        }
        None
    }

    pub(crate) fn footer_hint(&self) -> String {
        let mut hint = match self.mode {
            ViewMode::List => "j/k move  enter select  s status  a agent  v board",
            ViewMode::Board => "j/k move  h/l column  enter select  v list",
        }
        .to_string();
        if self.view.selected().is_some() {
            hint.push_str("  tab dep  g go  esc close");
        } else {
            hint.push_str("  esc/q quit");
        }
        hint.push_str("  ? help");
        hint
    }

    pub(crate) fn stats_summary(&self) -> String {
        match self.stats.as_ref() {
            Some(stats) => stats.summary(),
            None => format!("{} tasks loaded", self.view.store().len()),
        }
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
    }

    /// Move the cursor onto a task, switching board column when needed.
    /// Leaves the cursor alone when the task is filtered out of the list.
    fn focus(&mut self, key: &TaskKey) {
        if self.mode == ViewMode::Board {
            let column = self.view.store().get(key).and_then(model::column_for);
            match column {
                Some(column) => self.column = column,
                None => return,
            }
        }
        let tasks = self.visible_tasks();
        if let Some(pos) = model::position_of(&tasks, Some(key)) {
            self.set_cursor(pos);
        }
    }

    fn clamp_cursors(&mut self) {
        self.list_cursor = model::clamp_cursor(
            self.list_cursor,
            self.view.list(&self.list_filter()).len(),
        );
        let counts = self.view.board().counts();
        for (cursor, count) in self.column_cursors.iter_mut().zip(counts) {
            *cursor = model::clamp_cursor(*cursor, count);
        }
        self.dep_cursor = model::clamp_cursor(self.dep_cursor, self.dependency_entries().len());
    }

    fn apply_tasks(&mut self, tasks: Vec<Task>) {
        let previous = self.cursor_key();
        self.view.replace_tasks(tasks);
        if let Some(filter) = self.agent_filter.as_deref() {
            if !self.view.store().agents().iter().any(|agent| agent == filter) {
                self.agent_filter = None;
            }
        }
        self.clamp_cursors();
        if let Some(key) = previous.as_ref() {
            let tasks = self.visible_tasks();
            if let Some(pos) = model::position_of(&tasks, Some(key)) {
                self.set_cursor(pos);
            }
        }
        self.loaded = true;
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.visible_tasks().len();
        let next = model::step(self.cursor(), delta, len);
        self.set_cursor(next);
    }

    fn select_cursor(&mut self) {
        let Some(task) = self.cursor_task().cloned() else {
            return;
        };
        self.view.select(&task);
        self.dep_cursor = 0;
    }

    fn move_dep_cursor(&mut self, delta: isize) {
        let len = self.dependency_entries().len();
        if len == 0 {
            self.set_info("no dependencies".to_string());
            return;
        }
        self.dep_cursor = model::wrap_step(self.dep_cursor, delta, len);
    }

    fn follow_dependency(&mut self) {
        let target = self
            .dependency_entries()
            .get(self.dep_cursor)
            .map(|entry| (entry.id.clone(), entry.in_scope()));
        let Some((id, in_scope)) = target else {
            return;
        };
        if !in_scope || !self.view.navigate_to(&id) {
            self.set_info(format!("{id} is not in scope"));
            return;
        }
        self.dep_cursor = 0;
        if let Some(key) = self.view.selected().map(Task::key) {
            self.focus(&key);
        }
    }

    fn toggle_mode(&mut self) {
        let key = self.cursor_key();
        self.mode = match self.mode {
            ViewMode::List => ViewMode::Board,
            ViewMode::Board => ViewMode::List,
        };
        if let Some(key) = key.as_ref() {
            self.focus(key);
        }
    }

    fn cycle_status_filter(&mut self) {
        if self.mode == ViewMode::Board {
            self.set_info("filters apply to the list view".to_string());
            return;
        }
        self.status_filter = model::cycle_status(self.status_filter.as_deref());
        self.list_cursor = 0;
    }

    fn cycle_agent_filter(&mut self) {
        if self.mode == ViewMode::Board {
            self.set_info("filters apply to the list view".to_string());
            return;
        }
        let agents = self.view.store().agents();
        if agents.is_empty() {
            self.set_info("no agents in the loaded tasks".to_string());
            return;
        }
        self.agent_filter = model::cycle_agent(self.agent_filter.as_deref(), &agents);
        self.list_cursor = 0;
    }
}

pub fn run(source: Box<dyn TaskSource>, options: ViewerOptions) -> Result<()> {
    let (ui_tx, ui_rx) = mpsc::channel();
    let (req_tx, req_rx) = mpsc::channel();

    let source_label = source.describe();
    let watch_path = source.watch_path().map(Path::to_path_buf);
    let poll_every = match watch_path {
        Some(path) => {
            spawn_watch(path, req_tx.clone(), ui_tx.clone());
            None
        }
        None => Some(Duration::from_secs(options.refresh_secs)),
    };
    let filter = TaskFilter {
        agent_id: options.agent.clone(),
        status: None,
        limit: options.limit,
    };
    spawn_loader(source, filter, req_rx, ui_tx);

    if req_tx.send(LoadRequest::Reload).is_err() {
        return Err(Error::OperationFailed(
            "failed to start task loader".to_string(),
        ));
    }

    let mut app = AppState::new(&options, source_label);
    run_terminal(&mut app, ui_rx, req_tx, poll_every)
}

fn run_terminal(
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
    poll_every: Option<Duration>,
) -> Result<()> {
    enable_raw_mode()?;
    let result = drive_terminal(app, ui_rx, req_tx, poll_every);
    finish_terminal(result, restore_terminal)
}

fn drive_terminal(
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
    poll_every: Option<Duration>,
) -> Result<()> {
    execute!(io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.update_viewport(size.width);

    run_loop(&mut terminal, app, ui_rx, req_tx, poll_every)
}

/// Restores the terminal whether or not the session failed; the session
/// error wins over a restore error.
fn finish_terminal<T>(result: Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode();
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
    raw?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
    poll_every: Option<Duration>,
) -> Result<()> {
    let mut dirty = true;
    let mut last_poll = Instant::now();
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg);
            dirty = true;
        }

        if let Some(interval) = poll_every {
            if last_poll.elapsed() >= interval {
                last_poll = Instant::now();
                let _ = req_tx.send(LoadRequest::Reload);
            }
        }

        if dirty {
            terminal.draw(|frame| {
                app.update_viewport(frame.size().width);
                view::render(frame, app);
            })?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key, &req_tx) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(width, _) => {
                    app.update_viewport(width);
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg) {
    match msg {
        UiMsg::DataLoaded(tasks, stats, stats_error) => {
            app.apply_tasks(tasks);
            app.stats = stats;
            app.status_message = stats_error;
        }
        UiMsg::LoadError(err) => {
            app.set_error(format!("load error: {err}"));
        }
        UiMsg::WatchError(err) => {
            app.watch_error = Some(format!("watch error: {err}"));
        }
    }
}

/// Returns true when the viewer should exit.
fn handle_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    app.info_message = None;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc => {
            if app.show_help {
                app.show_help = false;
            } else if app.view.selected().is_some() {
                app.view.clear();
            } else {
                return true;
            }
        }
        KeyCode::Char('?') => app.show_help = !app.show_help,
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('h') | KeyCode::Left if app.mode == ViewMode::Board => {
            app.column = model::shift_column(app.column, -1);
        }
        KeyCode::Char('l') | KeyCode::Right if app.mode == ViewMode::Board => {
            app.column = model::shift_column(app.column, 1);
        }
        KeyCode::Enter => app.select_cursor(),
        KeyCode::Char('v') => app.toggle_mode(),
        KeyCode::Char('s') => app.cycle_status_filter(),
        KeyCode::Char('a') => app.cycle_agent_filter(),
        KeyCode::Tab => app.move_dep_cursor(1),
        KeyCode::BackTab => app.move_dep_cursor(-1),
        KeyCode::Char('g') => app.follow_dependency(),
        KeyCode::Char('r') => {
            if req_tx.send(LoadRequest::Reload).is_ok() {
                app.set_info("reloading".to_string());
            }
        }
        _ => {}
    }
    false
}

fn spawn_loader(
    source: Box<dyn TaskSource>,
    filter: TaskFilter,
    req_rx: Receiver<LoadRequest>,
    ui_tx: Sender<UiMsg>,
) {
    thread::spawn(move || serve_loads(source.as_ref(), &filter, &req_rx, &ui_tx));
}

fn serve_loads(
    source: &dyn TaskSource,
    filter: &TaskFilter,
    req_rx: &Receiver<LoadRequest>,
    ui_tx: &Sender<UiMsg>,
) {
    while let Ok(req) = req_rx.recv() {
        // Requests that piled up during a slow fetch collapse into this one.
        while req_rx.try_recv().is_ok() {}
        match req {
            LoadRequest::Reload => {
                if ui_tx.send(load(source, filter)).is_err() {
                    break;
                }
            }
        }
    }
}

fn load(source: &dyn TaskSource, filter: &TaskFilter) -> UiMsg {
    match source.list_tasks(filter) {
        Ok(tasks) => {
            let (stats, stats_error) = match source.list_task_stats(filter.agent_id.as_deref()) {
                Ok(stats) => (Some(stats), None),
                Err(err) => (None, Some(format!("stats error: {err}"))),
            };
            UiMsg::DataLoaded(tasks, stats, stats_error)
        }
        Err(err) => {
            tracing::warn!(error = %err, "task reload failed");
            UiMsg::LoadError(err.to_string())
        }
    }
}

fn spawn_watch(path: PathBuf, req_tx: Sender<LoadRequest>, ui_tx: Sender<UiMsg>) {
    // Watch the directory: editors often replace the file instead of writing it.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        return;
    }
    let file_name = path.file_name().map(|name| name.to_os_string());

    thread::spawn(move || {
        let (event_tx, event_rx) = mpsc::channel();
        let watcher: notify::Result<RecommendedWatcher> = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        });

        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(err) => {
                let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                return;
            }
        };

        if let Err(err) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
            return;
        }

        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(3600));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(event)) => {
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|changed| changed.file_name() == file_name.as_deref());
                    if touches_file {
                        pending = Some(Instant::now() + debounce);
                    }
                }
                Ok(Err(err)) => {
                    let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if pending.is_some() {
                        pending = None;
                        tracing::debug!(path = %path.display(), "snapshot changed");
                        if req_tx.send(LoadRequest::Reload).is_err() {
                            break;
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{task, with_deps};

    fn app(mode: ViewMode) -> AppState {
        let options = ViewerOptions {
            mode,
            status: None,
            agent: None,
            limit: 200,
            refresh_secs: 5,
        };
        let mut app = AppState::new(&options, "test".to_string());
        app.update_viewport(120);
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut AppState, code: KeyCode) -> bool {
        let (tx, _rx) = mpsc::channel();
        handle_key(app, key(code), &tx)
    }

    fn scenario() -> Vec<Task> {
        vec![
            with_deps("1", &[], &["2"]),
            with_deps("2", &["1"], &[]),
            with_deps("3", &["9"], &[]),
        ]
    }

    #[test]
    fn enter_toggles_selection_and_esc_clears_then_quits() {
        let mut app = app(ViewMode::List);
        app.apply_tasks(scenario());

        assert!(!press(&mut app, KeyCode::Enter));
        assert_eq!(app.view.selected().map(|task| task.id.as_str()), Some("1"));
        press(&mut app, KeyCode::Enter);
        assert!(app.view.selected().is_none());

        press(&mut app, KeyCode::Enter);
        assert!(!press(&mut app, KeyCode::Esc));
        assert!(app.view.selected().is_none());
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn following_dependencies_moves_selection_and_cursor() {
        let mut app = app(ViewMode::List);
        app.apply_tasks(scenario());
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.view.selected().map(|task| task.id.as_str()), Some("2"));
        assert_eq!(app.list_cursor, 1);
    }

    #[test]
    fn unresolved_dependency_is_a_noop_with_hint() {
        let mut app = app(ViewMode::List);
        app.apply_tasks(scenario());
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view.selected().map(|task| task.id.as_str()), Some("3"));

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.view.selected().map(|task| task.id.as_str()), Some("3"));
        assert_eq!(app.info_message.as_deref(), Some("9 is not in scope"));
    }

    #[test]
    fn board_columns_and_mode_toggle_keep_focus() {
        let mut app = app(ViewMode::List);
        app.apply_tasks(vec![
            task("1", "pending"),
            task("2", "in_progress"),
            task("3", "in_progress"),
            task("4", "completed"),
            task("5", "deleted"),
        ]);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.cursor_task().map(|task| task.id.as_str()), Some("3"));

        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.mode, ViewMode::Board);
        assert_eq!(app.column, Column::InProgress);
        assert_eq!(app.cursor_task().map(|task| task.id.as_str()), Some("3"));

        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.visible_tasks().len(), 1);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.column, Column::Completed);
    }

    #[test]
    fn status_filter_cycles_in_list_view() {
        let mut app = app(ViewMode::List);
        app.apply_tasks(vec![task("1", "pending"), task("2", "deleted")]);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.status_filter.as_deref(), Some("pending"));
        assert_eq!(app.visible_tasks().len(), 1);
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('s'));
        }
        assert_eq!(app.status_filter.as_deref(), Some("deleted"));
        assert_eq!(app.cursor_task().map(|task| task.id.as_str()), Some("2"));
        press(&mut app, KeyCode::Char('s'));
        assert!(app.status_filter.is_none());
    }

    #[test]
    fn agent_filter_cycles_over_loaded_agents() {
        let mut app = app(ViewMode::List);
        let mut first = task("1", "pending");
        first.agent_id = Some("alpha".to_string());
        let mut second = task("2", "pending");
        second.agent_id = Some("beta".to_string());
        app.apply_tasks(vec![first, second]);

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.agent_filter.as_deref(), Some("alpha"));
        assert_eq!(app.visible_tasks().len(), 1);

        app.apply_tasks(vec![task("3", "pending")]);
        assert!(app.agent_filter.is_none());
    }

    #[test]
    fn reload_keeps_cursor_on_same_task_and_drops_missing_selection() {
        let mut app = app(ViewMode::List);
        app.apply_tasks(scenario());
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        app.apply_tasks(vec![task("0", "pending"), with_deps("2", &["1"], &[])]);
        assert_eq!(app.cursor_task().map(|task| task.id.as_str()), Some("2"));
        assert_eq!(app.view.selected().map(|task| task.id.as_str()), Some("2"));

        app.apply_tasks(vec![task("0", "pending")]);
        assert!(app.view.selected().is_none());
        assert_eq!(app.list_cursor, 0);
    }

    #[test]
    fn load_errors_surface_in_status_line() {
        let mut app = app(ViewMode::List);
        handle_ui_msg(&mut app, UiMsg::LoadError("connection refused".to_string()));
        let (line, kind) = app.status_line().expect("status");
        assert!(matches!(kind, StatusKind::Error));
        assert!(line.contains("connection refused"));
    }

    #[derive(Default)]
    struct CountingSource {
        calls: std::cell::Cell<usize>,
    }

    impl TaskSource for CountingSource {
        fn list_tasks(&self, _filter: &TaskFilter) -> Result<Vec<Task>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![task("1", "pending")])
        }

        fn list_task_stats(&self, _agent_id: Option<&str>) -> Result<TaskStats> {
            Ok(TaskStats::default())
        }

        fn list_agent_task_stats(&self) -> Result<Vec<crate::stats::AgentTaskStats>> {
            Ok(Vec::new())
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[test]
    fn queued_reloads_collapse_into_one_fetch() {
        let (req_tx, req_rx) = mpsc::channel();
        let (ui_tx, ui_rx) = mpsc::channel();
        for _ in 0..4 {
            req_tx.send(LoadRequest::Reload).expect("queue reload");
        }
        drop(req_tx);

        let source = CountingSource::default();
        serve_loads(&source, &TaskFilter::default(), &req_rx, &ui_tx);

        assert_eq!(source.calls.get(), 1);
        let messages: Vec<UiMsg> = ui_rx.try_iter().collect();
        assert_eq!(messages.len(), 1);
        assert!(matches!(&messages[0], UiMsg::DataLoaded(tasks, Some(_), None) if tasks.len() == 1));
    }

    #[test]
    fn terminal_is_restored_when_the_session_fails() {
        let mut restored = false;
        let result: Result<()> = finish_terminal(
            Err(Error::OperationFailed("no tty".to_string())),
            || {
                restored = true;
                Ok(())
            },
        );
        assert!(restored);
        assert!(matches!(result, Err(Error::OperationFailed(_))));

        let result = finish_terminal(Ok(()), || {
            Err(Error::OperationFailed("restore failed".to_string()))
        });
        assert!(matches!(result, Err(Error::OperationFailed(_))));
    }
}
