use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::TableState;
use tracing::error;
use uuid::Uuid;
use zentask_core::{parse_due_date, KeyValueStore, Priority, Task, TaskDraft, TaskStore};

use crate::tui::input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
    Due,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Priority,
            FormField::Priority => FormField::Due,
            FormField::Due => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Due,
            FormField::Description => FormField::Title,
            FormField::Priority => FormField::Description,
            FormField::Due => FormField::Priority,
        }
    }
}

/// The "new task" form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: TextInput,
    pub description: TextInput,
    pub priority: Priority,
    pub due: TextInput,
    pub focus: FormField,
    pub error: Option<String>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: TextInput::default(),
            description: TextInput::default(),
            priority: Priority::default(),
            due: TextInput::default(),
            focus: FormField::Title,
            error: None,
        }
    }
}

impl TaskForm {
    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Due => Some(&mut self.due),
            FormField::Priority => None,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            _ if self.focus == FormField::Priority => match key.code {
                KeyCode::Left => self.priority = self.priority.cycle_prev(),
                KeyCode::Right | KeyCode::Char(' ') => self.priority = self.priority.cycle_next(),
                KeyCode::Char(c) => {
                    if let Ok(p) = c.to_string().parse() {
                        self.priority = p;
                    }
                }
                _ => {}
            },
            _ => {
                if let Some(input) = self.focused_input() {
                    edit_text(input, key);
                }
            }
        }
    }

    /// An unparsable due date is an error; a blank one means no deadline.
    pub fn to_draft(&self, today: NaiveDate) -> anyhow::Result<TaskDraft> {
        let due_date = match self.due.value().trim() {
            "" => None,
            text => Some(parse_due_date(text, today)?),
        };
        Ok(TaskDraft {
            title: self.title.value().to_string(),
            description: Some(self.description.value().to_string()),
            priority: self.priority,
            due_date,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
}

/// Edit buffer for one task, seeded when editing starts.
#[derive(Debug, Clone, PartialEq)]
pub struct EditState {
    pub id: Uuid,
    pub title: TextInput,
    pub description: TextInput,
    pub focus: EditField,
}

impl EditState {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            title: TextInput::with_value(&task.title),
            description: TextInput::with_value(task.description.as_deref().unwrap_or("")),
            focus: EditField::Title,
        }
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            EditField::Title => &mut self.title,
            EditField::Description => &mut self.description,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    EditField::Title => EditField::Description,
                    EditField::Description => EditField::Title,
                };
            }
            _ => edit_text(self.focused_input(), key),
        }
    }
}

fn edit_text(input: &mut TextInput, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {}
    }
}

pub enum Mode {
    Normal,
    Creating(TaskForm),
    Editing(EditState),
}

pub struct App<S: KeyValueStore> {
    pub store: TaskStore<S>,
    pub state: TableState,
    pub mode: Mode,
    pub status: Option<String>,
    pub today: NaiveDate,
    pub should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: TaskStore<S>) -> App<S> {
        let mut state = TableState::default();
        if !store.tasks().is_empty() {
            state.select(Some(0));
        }
        App {
            store,
            state,
            mode: Mode::Normal,
            status: None,
            today: Local::now().date_naive(),
            should_quit: false,
        }
    }

    /// Keeps overdue highlighting correct across midnight.
    pub fn tick(&mut self) {
        self.today = Local::now().date_naive();
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.store.tasks().get(i))
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.mode {
            Mode::Normal => self.on_normal_key(key),
            Mode::Creating(_) => self.on_form_key(key),
            Mode::Editing(_) => self.on_edit_key(key),
        }
    }

    fn on_normal_key(&mut self, key: KeyEvent) {
        self.status = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('a') => self.open_form(),
            KeyCode::Char('e') => self.start_edit(),
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => self.submit_form(),
            _ => {
                if let Mode::Creating(form) = &mut self.mode {
                    form.on_key(key);
                }
            }
        }
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Enter => self.save_edit(),
            _ => {
                if let Mode::Editing(edit) = &mut self.mode {
                    edit.on_key(key);
                }
            }
        }
    }

    pub fn next(&mut self) {
        let len = self.store.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.store.tasks().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        if let Err(e) = self.store.toggle_complete(&id) {
            self.report_persist_error(e);
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        let Some(id) = self.store.tasks().get(i).map(|t| t.id) else {
            return;
        };
        if let Err(e) = self.store.delete(&id) {
            self.report_persist_error(e);
        }

        let len = self.store.tasks().len();
        if len == 0 {
            self.state.select(None);
        } else if i >= len {
            self.state.select(Some(len - 1));
        } else {
            self.state.select(Some(i));
        }
    }

    pub fn open_form(&mut self) {
        self.mode = Mode::Creating(TaskForm::default());
    }

    fn submit_form(&mut self) {
        let Mode::Creating(form) = &mut self.mode else {
            return;
        };
        let draft = match form.to_draft(self.today) {
            Ok(draft) => draft,
            Err(e) => {
                form.error = Some(e.to_string());
                form.focus = FormField::Due;
                return;
            }
        };

        match self.store.add(draft) {
            Ok(Some(_)) => {
                self.mode = Mode::Normal;
                self.state.select(Some(0));
                self.status = Some("Task added".to_string());
            }
            // Blank title: keep the form open for correction.
            Ok(None) => {
                form.error = None;
                form.focus = FormField::Title;
            }
            Err(e) => {
                self.mode = Mode::Normal;
                self.state.select(Some(0));
                self.report_persist_error(e);
            }
        }
    }

    pub fn start_edit(&mut self) {
        if let Some(task) = self.selected_task() {
            self.mode = Mode::Editing(EditState::from_task(task));
        }
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Normal;
    }

    fn save_edit(&mut self) {
        let Mode::Editing(edit) = std::mem::replace(&mut self.mode, Mode::Normal) else {
            return;
        };
        match self
            .store
            .save_edit(&edit.id, edit.title.value(), edit.description.value())
        {
            Ok(true) => self.status = Some("Task updated".to_string()),
            Ok(false) => self.status = Some("Task no longer exists".to_string()),
            Err(e) => self.report_persist_error(e),
        }
    }

    fn report_persist_error(&mut self, e: anyhow::Error) {
        error!("{:#}", e);
        self.status = Some(format!("Could not save: {:#}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zentask_core::MemoryKeyValueStore;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<S: KeyValueStore>(app: &mut App<S>, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn new_app() -> App<MemoryKeyValueStore> {
        App::new(TaskStore::hydrate(MemoryKeyValueStore::new()))
    }

    fn add_task<S: KeyValueStore>(app: &mut App<S>, title: &str) {
        app.on_key(key(KeyCode::Char('a')));
        type_text(app, title);
        app.on_key(key(KeyCode::Enter));
    }

    #[test]
    fn test_form_creates_task_and_closes() {
        let mut app = new_app();
        app.today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        app.on_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Buy milk");
        app.on_key(key(KeyCode::Tab));
        type_text(&mut app, "2 litres");
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Char('h')));
        app.on_key(key(KeyCode::Tab));
        type_text(&mut app, "tomorrow");
        app.on_key(key(KeyCode::Enter));

        assert!(matches!(app.mode, Mode::Normal));
        let task = app.selected_task().unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description.as_deref(), Some("2 litres"));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 1, 16));
    }

    #[test]
    fn test_blank_title_keeps_form_open() {
        let mut app = new_app();

        add_task(&mut app, "   ");

        assert!(matches!(app.mode, Mode::Creating(_)));
        assert!(app.store.tasks().is_empty());
    }

    #[test]
    fn test_bad_due_date_keeps_form_open_with_message() {
        let mut app = new_app();
        app.on_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Plan trip");
        for _ in 0..3 {
            app.on_key(key(KeyCode::Tab));
        }
        type_text(&mut app, "someday");
        app.on_key(key(KeyCode::Enter));

        match &app.mode {
            Mode::Creating(form) => assert!(form.error.is_some()),
            _ => panic!("form should stay open"),
        }
        assert!(app.store.tasks().is_empty());
    }

    #[test]
    fn test_reopened_form_is_reset() {
        let mut app = new_app();
        add_task(&mut app, "first");
        app.on_key(key(KeyCode::Char('a')));

        match &app.mode {
            Mode::Creating(form) => assert_eq!(form, &TaskForm::default()),
            _ => panic!("form should be open"),
        }
    }

    #[test]
    fn test_toggle_and_delete_selected() {
        let mut app = new_app();
        add_task(&mut app, "older");
        add_task(&mut app, "newer");
        assert_eq!(app.selected_task().unwrap().title, "newer");

        app.on_key(key(KeyCode::Char('j')));
        app.on_key(key(KeyCode::Char(' ')));
        assert!(app.store.tasks()[1].completed);
        assert_eq!(app.store.pending_count(), 1);

        app.on_key(key(KeyCode::Char('d')));
        assert_eq!(app.store.tasks().len(), 1);
        assert_eq!(app.state.selected(), Some(0));

        app.on_key(key(KeyCode::Char('d')));
        assert!(app.store.tasks().is_empty());
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_edit_saves_from_buffer() {
        let mut app = new_app();
        add_task(&mut app, "draft");

        app.on_key(key(KeyCode::Char('e')));
        app.on_key(key(KeyCode::Backspace));
        type_text(&mut app, "ed");
        app.on_key(key(KeyCode::Tab));
        type_text(&mut app, "notes");
        app.on_key(key(KeyCode::Enter));

        assert!(matches!(app.mode, Mode::Normal));
        let task = &app.store.tasks()[0];
        assert_eq!(task.title, "drafed");
        assert_eq!(task.description.as_deref(), Some("notes"));
    }

    #[test]
    fn test_cancel_edit_discards_buffer() {
        let mut app = new_app();
        add_task(&mut app, "keep me");

        app.on_key(key(KeyCode::Char('e')));
        type_text(&mut app, " changed");
        app.on_key(key(KeyCode::Esc));

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store.tasks()[0].title, "keep me");
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = new_app();
        add_task(&mut app, "a");
        add_task(&mut app, "b");

        app.on_key(key(KeyCode::Char('k')));
        assert_eq!(app.state.selected(), Some(1));
        app.on_key(key(KeyCode::Char('j')));
        assert_eq!(app.state.selected(), Some(0));
    }

    #[test]
    fn test_quit() {
        let mut app = new_app();
        app.on_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
