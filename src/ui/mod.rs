//! Two-pane reader: item list on the left, selected item on the right.
//!
//! Each loop turn plans the geometry from the current terminal size,
//! clamps the cursors, draws both panes in one frame and then blocks on a
//! single input event.

mod layout;
mod render;
mod session;
mod state;
mod wrap;

use crate::model::Item;
use crate::storage::ItemStore;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use layout::Geometry;
use ratatui::backend::Backend;
use ratatui::{Frame, Terminal};
use session::TerminalSession;
use state::ViewState;
use tracing::{debug, info, warn};

pub fn run<S: ItemStore>(store: S) -> Result<()> {
    let mut app = App::load(store);
    let mut session = TerminalSession::acquire()?;
    app.event_loop(session.terminal_mut(), &mut CrosstermEvents)
}

/// Where the loop gets its next input event from.
pub trait EventSource {
    fn next_event(&mut self) -> Result<Event>;
}

pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> Result<Event> {
        Ok(event::read()?)
    }
}

pub struct App<S> {
    store: S,
    items: Vec<Item>,
    view: ViewState,
    status: String,
    geometry: Option<Geometry>,
}

impl<S: ItemStore> App<S> {
    pub fn load(store: S) -> Self {
        let (items, status) = match store.list_items() {
            Ok(items) => {
                let status = format!("Loaded {} item(s)", items.len());
                (items, status)
            }
            Err(err) => {
                warn!(error = %err, "initial load failed");
                (Vec::new(), format!("Could not load items: {}", err))
            }
        };
        App {
            store,
            items: working_set(items),
            view: ViewState::default(),
            status,
            geometry: None,
        }
    }

    pub fn event_loop<B: Backend, E: EventSource>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut E,
    ) -> Result<()> {
        info!(items = self.items.len(), "reader started");
        loop {
            terminal.draw(|f| self.draw(f))?;
            let quit = match events.next_event()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Resize(width, height) => {
                    debug!(width, height, "terminal resized");
                    false
                }
                _ => false,
            };
            if quit {
                break;
            }
        }
        info!("reader stopped");
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame<'_>) {
        let area = f.size();
        let geometry = match layout::plan(area.height, area.width) {
            Ok(geometry) => geometry,
            Err(err) => {
                self.geometry = None;
                render::draw_too_small(f, area, &err);
                return;
            }
        };

        self.view.clamp_selection(self.items.len());
        self.view.keep_visible(geometry.sidebar_rows());
        let max_scroll = render::max_body_scroll(self.selected_item(), geometry.reader_rect());
        self.view.clamp_body_scroll(max_scroll);

        render::draw_sidebar(f, geometry.sidebar_rect(), &self.items, &self.view);
        render::draw_reader(
            f,
            geometry.reader_rect(),
            self.selected_item(),
            self.view.body_scroll,
        );
        render::draw_footer(f, geometry.footer_rect(), &self.status);
        self.geometry = Some(geometry);
    }

    /// Returns `true` when the loop should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            _ => {}
        }
        // Too small: nothing but quit until the terminal grows.
        let Some(geometry) = self.geometry else {
            return false;
        };

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.view.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.view.select_next(self.items.len()),
            KeyCode::PageDown | KeyCode::Char(' ') => self.view.page_down(geometry.reader_height),
            KeyCode::PageUp => self.view.page_up(geometry.reader_height),
            KeyCode::Home | KeyCode::Char('g') => self.view.scroll_to_top(),
            KeyCode::End | KeyCode::Char('G') => {
                let max = render::max_body_scroll(self.selected_item(), geometry.reader_rect());
                self.view.scroll_to_bottom(max);
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('s') => self.cycle_status(),
            _ => {}
        }
        self.view.keep_visible(geometry.sidebar_rows());
        false
    }

    fn refresh(&mut self) {
        match self.store.list_items() {
            Ok(items) => {
                let count = items.len();
                self.items = working_set(items);
                self.view.after_refresh(self.items.len());
                info!(count, "working set refreshed");
                self.status = format!("Refreshed: {} item(s)", count);
            }
            Err(err) => {
                warn!(error = %err, "refresh failed");
                self.status = format!("Refresh failed: {}", err);
            }
        }
    }

    fn cycle_status(&mut self) {
        let index = self.view.selected;
        let Some(item) = self.items.get(index) else {
            return;
        };
        if item.is_placeholder() {
            self.status = "Nothing to update yet".into();
            return;
        }
        let (id, next) = (item.id, item.status.next());
        match self.store.update_item_status(id, next) {
            Ok(()) => {
                self.items[index].status = next;
                self.status = format!("#{} is now {}", id, next);
            }
            Err(err) => {
                warn!(id, error = %err, "status update failed");
                self.status = format!("Status update failed: {}", err);
            }
        }
    }

    fn selected_item(&self) -> &Item {
        &self.items[self.view.selected]
    }
}

/// Substitutes the placeholder so there is always something to show.
fn working_set(items: Vec<Item>) -> Vec<Item> {
    if items.is_empty() {
        vec![Item::placeholder()]
    } else {
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, ItemKind, Priority, Status};
    use anyhow::anyhow;
    use ratatui::backend::TestBackend;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeStore {
        items: RefCell<Vec<Item>>,
        updates: RefCell<Vec<(ItemId, Status)>>,
        fail: Cell<bool>,
    }

    impl FakeStore {
        fn with(items: Vec<Item>) -> Self {
            FakeStore {
                items: RefCell::new(items),
                ..FakeStore::default()
            }
        }
    }

    impl ItemStore for &FakeStore {
        fn list_items(&self) -> Result<Vec<Item>> {
            if self.fail.get() {
                return Err(anyhow!("database is locked"));
            }
            Ok(self.items.borrow().clone())
        }

        fn update_item_status(&self, id: ItemId, status: Status) -> Result<()> {
            if self.fail.get() {
                return Err(anyhow!("database is locked"));
            }
            self.updates.borrow_mut().push((id, status));
            if let Some(item) = self.items.borrow_mut().iter_mut().find(|i| i.id == id) {
                item.status = status;
            }
            Ok(())
        }
    }

    struct Script(VecDeque<Event>);

    impl Script {
        fn keys(codes: &[KeyCode]) -> Self {
            Script(codes.iter().map(|code| key_event(*code)).collect())
        }
    }

    impl EventSource for Script {
        fn next_event(&mut self) -> Result<Event> {
            self.0.pop_front().ok_or_else(|| anyhow!("script exhausted"))
        }
    }

    fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn item(id: ItemId, body: &str) -> Item {
        Item {
            id,
            title: format!("Item {}", id),
            kind: ItemKind::Todo,
            status: Status::Todo,
            priority: Priority::Med,
            due_date: None,
            body: body.into(),
            tags: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(width, height)).unwrap()
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn two_status_cycles_leave_item_blocked() {
        let store = FakeStore::with(vec![item(1, "")]);
        let mut app = App::load(&store);
        let mut script = Script::keys(&[KeyCode::Char('s'), KeyCode::Char('s'), KeyCode::Char('q')]);
        app.event_loop(&mut terminal(100, 30), &mut script).unwrap();

        assert_eq!(app.items[0].status, Status::Blocked);
        assert_eq!(
            *store.updates.borrow(),
            vec![(1, Status::Doing), (1, Status::Blocked)]
        );
    }

    #[test]
    fn status_cycle_keeps_cursor_and_scroll() {
        let body = vec!["word"; 600].join(" ");
        let store = FakeStore::with(vec![item(1, ""), item(2, &body), item(3, "")]);
        let mut app = App::load(&store);
        let mut term = terminal(100, 30);
        let mut script = Script::keys(&[
            KeyCode::Down,
            KeyCode::PageDown,
            KeyCode::Char('s'),
            KeyCode::Char('q'),
        ]);
        app.event_loop(&mut term, &mut script).unwrap();

        assert_eq!(app.view.selected, 1);
        assert_eq!(app.view.body_scroll, 14);
        assert_eq!(app.items[1].status, Status::Doing);
    }

    #[test]
    fn too_small_terminal_shows_only_prompt_and_quits() {
        let store = FakeStore::with(vec![item(1, "body"), item(2, "")]);
        let mut app = App::load(&store);
        let mut term = terminal(40, 20);
        let mut script = Script::keys(&[KeyCode::Char('q')]);
        app.event_loop(&mut term, &mut script).unwrap();

        let screen = screen_text(&term);
        assert!(screen[0].starts_with("Enlarge terminal"));
        assert!(screen.iter().all(|line| !line.contains('│')));
        assert!(screen.iter().all(|line| !line.contains("Item 1")));
        assert!(app.geometry.is_none());
    }

    #[test]
    fn too_small_terminal_ignores_everything_but_quit() {
        let store = FakeStore::with(vec![item(1, ""), item(2, "")]);
        let mut app = App::load(&store);
        let mut script = Script::keys(&[
            KeyCode::Char('j'),
            KeyCode::Char('s'),
            KeyCode::Char('r'),
            KeyCode::Esc,
        ]);
        app.event_loop(&mut terminal(50, 20), &mut script).unwrap();

        assert_eq!(app.view, ViewState::default());
        assert!(store.updates.borrow().is_empty());
    }

    #[test]
    fn resize_events_redraw_without_quitting() {
        let store = FakeStore::with(vec![item(1, "")]);
        let mut app = App::load(&store);
        let mut script = Script(VecDeque::from(vec![
            Event::Resize(120, 40),
            Event::FocusGained,
            key_event(KeyCode::Char('q')),
        ]));
        app.event_loop(&mut terminal(100, 30), &mut script).unwrap();
        assert!(script.0.is_empty());
    }

    #[test]
    fn empty_store_shows_placeholder_and_never_updates_it() {
        let store = FakeStore::default();
        let mut app = App::load(&store);
        let mut term = terminal(100, 30);
        let mut script = Script::keys(&[KeyCode::Char('s'), KeyCode::Char('q')]);
        app.event_loop(&mut term, &mut script).unwrap();

        assert_eq!(app.items.len(), 1);
        assert!(app.items[0].is_placeholder());
        assert!(store.updates.borrow().is_empty());
        assert!(screen_text(&term)
            .iter()
            .any(|line| line.contains("(no items yet)")));
    }

    #[test]
    fn selection_moves_and_clamps_at_both_ends() {
        let items = (1..=4).map(|id| item(id, "")).collect();
        let store = FakeStore::with(items);
        let mut app = App::load(&store);
        let mut codes = vec![KeyCode::Down; 9];
        codes.push(KeyCode::Char('q'));
        app.event_loop(&mut terminal(100, 30), &mut Script::keys(&codes))
            .unwrap();
        assert_eq!(app.view.selected, 3);

        let mut codes = vec![KeyCode::Char('k'); 9];
        codes.push(KeyCode::Char('q'));
        app.event_loop(&mut terminal(100, 30), &mut Script::keys(&codes))
            .unwrap();
        assert_eq!(app.view.selected, 0);
    }

    #[test]
    fn sidebar_scrolls_to_keep_selection_visible() {
        let items = (1..=40).map(|id| item(id, "")).collect();
        let store = FakeStore::with(items);
        let mut app = App::load(&store);
        let mut codes = vec![KeyCode::Char('j'); 35];
        codes.push(KeyCode::Char('q'));
        let mut term = terminal(100, 20);
        app.event_loop(&mut term, &mut Script::keys(&codes)).unwrap();

        // 20 rows: 19 for the panes, 17 inside the sidebar border.
        assert_eq!(app.view.selected, 35);
        assert_eq!(app.view.sidebar_top, 35 + 1 - 17);
        assert!(screen_text(&term)
            .iter()
            .any(|line| line.contains("> Item 36")));
    }

    #[test]
    fn refresh_clamps_selection_to_shorter_list() {
        let items = (1..=5).map(|id| item(id, "")).collect();
        let store = FakeStore::with(items);
        let mut app = App::load(&store);
        let mut term = terminal(100, 30);
        let mut codes = vec![KeyCode::Down; 4];
        codes.push(KeyCode::Char('q'));
        app.event_loop(&mut term, &mut Script::keys(&codes)).unwrap();
        assert_eq!(app.view.selected, 4);

        store.items.borrow_mut().truncate(2);
        app.view.body_scroll = 3;
        app.event_loop(
            &mut term,
            &mut Script::keys(&[KeyCode::Char('r'), KeyCode::Char('q')]),
        )
        .unwrap();
        assert_eq!(app.items.len(), 2);
        assert_eq!(app.view.selected, 1);
        assert_eq!(app.view.body_scroll, 0);
    }

    #[test]
    fn refresh_of_emptied_store_falls_back_to_placeholder() {
        let store = FakeStore::with(vec![item(1, ""), item(2, "")]);
        let mut app = App::load(&store);
        store.items.borrow_mut().clear();
        app.event_loop(
            &mut terminal(100, 30),
            &mut Script::keys(&[KeyCode::Down, KeyCode::Char('r'), KeyCode::Char('q')]),
        )
        .unwrap();
        assert_eq!(app.items.len(), 1);
        assert!(app.items[0].is_placeholder());
        assert_eq!(app.view.selected, 0);
    }

    #[test]
    fn store_failures_keep_last_known_state() {
        let store = FakeStore::with(vec![item(1, ""), item(2, "")]);
        let mut app = App::load(&store);
        store.fail.set(true);
        let mut term = terminal(100, 30);
        app.event_loop(
            &mut term,
            &mut Script::keys(&[KeyCode::Char('s'), KeyCode::Char('r'), KeyCode::Char('q')]),
        )
        .unwrap();

        assert_eq!(app.items.len(), 2);
        assert_eq!(app.items[0].status, Status::Todo);
        assert!(app.status.starts_with("Refresh failed"));
    }

    #[test]
    fn failed_initial_load_still_renders() {
        let store = FakeStore::default();
        store.fail.set(true);
        let mut app = App::load(&store);
        assert!(app.items[0].is_placeholder());
        assert!(app.status.starts_with("Could not load items"));
        app.event_loop(
            &mut terminal(100, 30),
            &mut Script::keys(&[KeyCode::Char('q')]),
        )
        .unwrap();
    }

    #[test]
    fn bottom_jumps_to_exact_last_page_and_top_returns() {
        let body = (1..=80)
            .map(|n| format!("line {}", n))
            .collect::<Vec<_>>()
            .join("\n");
        let store = FakeStore::with(vec![item(1, &body)]);
        let mut app = App::load(&store);
        let mut term = terminal(100, 30);
        app.event_loop(
            &mut term,
            &mut Script::keys(&[KeyCode::Char('G'), KeyCode::Char('q')]),
        )
        .unwrap();

        let geometry = app.geometry.unwrap();
        let max = render::max_body_scroll(&app.items[0], geometry.reader_rect());
        assert_eq!(app.view.body_scroll, max);
        let screen = screen_text(&term);
        assert!(screen.iter().any(|line| line.contains("line 80")));
        assert!(screen.iter().any(|line| line.contains("100%")));

        app.event_loop(
            &mut term,
            &mut Script::keys(&[KeyCode::PageUp, KeyCode::Char('g'), KeyCode::Char('q')]),
        )
        .unwrap();
        assert_eq!(app.view.body_scroll, 0);
    }

    #[test]
    fn paging_past_the_end_is_clamped_on_next_frame() {
        let body = (1..=40)
            .map(|n| format!("line {}", n))
            .collect::<Vec<_>>()
            .join("\n");
        let store = FakeStore::with(vec![item(1, &body)]);
        let mut app = App::load(&store);
        let mut codes = vec![KeyCode::PageDown; 10];
        codes.push(KeyCode::Char('q'));
        let mut term = terminal(100, 30);
        app.event_loop(&mut term, &mut Script::keys(&codes)).unwrap();

        // The last PageDown lands past the end; the final frame clamps it.
        let geometry = app.geometry.unwrap();
        let max = render::max_body_scroll(&app.items[0], geometry.reader_rect());
        assert!(app.view.body_scroll >= max);
        terminal(100, 30).draw(|f| app.draw(f)).unwrap();
        assert_eq!(app.view.body_scroll, max);
    }

    #[test]
    fn ctrl_c_quits() {
        let store = FakeStore::with(vec![item(1, "")]);
        let mut app = App::load(&store);
        let mut script = Script(VecDeque::from(vec![Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        ))]));
        app.event_loop(&mut terminal(100, 30), &mut script).unwrap();
    }
}
