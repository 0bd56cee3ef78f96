//! View binding: grid cells decorated with selection, today, and event presence.

use chrono::NaiveDate;
use platform_host::{HostServices, PrefsStore};

use crate::{
    editor::{EditorOutcome, EventEditor},
    event::{CalendarEvent, EventId},
    grid::{DayCell, MonthView},
    prefs::{load_calendar_prefs, save_calendar_prefs, CalendarPrefs},
    store::EventStore,
};

/// A grid cell ready to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDay {
    /// Underlying grid cell.
    pub cell: DayCell,
    /// Events on this date.
    pub event_count: usize,
    /// Whether this is the selected date.
    pub is_selected: bool,
    /// Whether this is today.
    pub is_today: bool,
}

impl GridDay {
    /// Whether any event falls on this date.
    pub fn has_events(&self) -> bool {
        self.event_count > 0
    }

    /// Space-separated state classes for the cell element.
    pub fn class(&self) -> String {
        let mut class = String::from("calendar-day");
        for (flag, name) in [
            (!self.cell.is_current_month, " other-month"),
            (self.is_selected, " selected"),
            (self.is_today, " today"),
            (self.has_events(), " has-events"),
        ] {
            if flag {
                class.push_str(name);
            }
        }
        class
    }
}

/// Root class for the app shell under the injected theme flag.
pub fn shell_class(dark_mode: bool) -> &'static str {
    if dark_mode {
        "app-calendar-shell dark"
    } else {
        "app-calendar-shell"
    }
}

/// Calendar screen state: month navigation, events, and the editor.
#[derive(Debug)]
pub struct CalendarViewModel {
    month: MonthView,
    store: EventStore,
    editor: EventEditor,
    prefs: CalendarPrefs,
    today: NaiveDate,
}

impl CalendarViewModel {
    /// Opens on `today` with the editor closed.
    pub fn new(store: EventStore, prefs: CalendarPrefs, today: NaiveDate) -> Self {
        Self {
            month: MonthView::new(today),
            store,
            editor: EventEditor::default(),
            prefs,
            today,
        }
    }

    /// Loads events and prefs from `host`, opening on `today`.
    pub async fn load(host: &HostServices, today: NaiveDate) -> Self {
        let store = EventStore::load(host.app_state.clone(), host.prefs.as_ref(), today).await;
        let prefs = load_calendar_prefs(host.prefs.as_ref()).await;
        Self::new(store, prefs, today)
    }

    /// Month navigation state.
    pub fn month(&self) -> &MonthView {
        &self.month
    }

    /// Loaded events.
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Editor state.
    pub fn editor(&self) -> &EventEditor {
        &self.editor
    }

    /// Mutable editor, for draft field edits.
    pub fn editor_mut(&mut self) -> &mut EventEditor {
        &mut self.editor
    }

    /// Defaults for new drafts.
    pub fn prefs(&self) -> &CalendarPrefs {
        &self.prefs
    }

    /// Date treated as today.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Currently selected date.
    pub fn selected(&self) -> NaiveDate {
        self.month.selected()
    }

    /// Selects `date`, switching months if needed.
    pub fn select_day(&mut self, date: NaiveDate) {
        self.month.set_date(date);
    }

    /// Moves the selection one month forward.
    pub fn next_month(&mut self) {
        self.month.next_month();
    }

    /// Moves the selection one month back.
    pub fn prev_month(&mut self) {
        self.month.prev_month();
    }

    /// Selects today.
    pub fn go_today(&mut self) {
        self.month.set_date(self.today);
    }

    /// Opens a new draft on the selected day.
    pub fn open_new_for_selected(&mut self) {
        self.editor.open_new(self.month.selected(), &self.prefs);
    }

    /// Opens event `id` for editing. Returns `false` when it does not exist.
    pub fn open_existing(&mut self, id: EventId) -> bool {
        self.editor.open_existing(&self.store, id)
    }

    /// Saves the open draft. A saved event's date becomes the selection.
    pub async fn save_draft(&mut self) -> EditorOutcome {
        let outcome = self.editor.save(&mut self.store).await;
        if let EditorOutcome::Saved(id) = outcome {
            if let Some(date) = self.store.get(id).map(|event| event.fields.date) {
                self.month.set_date(date);
            }
        }
        outcome
    }

    /// Deletes the event being edited.
    pub async fn delete_draft(&mut self) -> EditorOutcome {
        self.editor.delete(&mut self.store).await
    }

    /// Closes the editor without saving.
    pub fn discard_draft(&mut self) -> EditorOutcome {
        self.editor.discard()
    }

    /// Replaces the draft defaults and persists them.
    ///
    /// # Errors
    ///
    /// Returns the store error; the new prefs apply to this session either way.
    pub async fn update_prefs<P: PrefsStore + ?Sized>(
        &mut self,
        store: &P,
        prefs: CalendarPrefs,
    ) -> Result<(), String> {
        self.prefs = prefs;
        save_calendar_prefs(store, &self.prefs).await
    }

    /// Events on the selected day, insertion order.
    pub fn selected_events(&self) -> Vec<&CalendarEvent> {
        self.store.list(self.month.selected())
    }

    /// The 42 grid cells decorated for rendering.
    pub fn grid_days(&self) -> Vec<GridDay> {
        let (start, end) = self.month.visible_range();
        let counts = self.store.event_counts(start, end);
        let selected = self.month.selected();
        self.month
            .cells()
            .iter()
            .map(|cell| GridDay {
                cell: *cell,
                event_count: counts.get(&cell.date).copied().unwrap_or(0),
                is_selected: cell.date == selected,
                is_today: cell.date == self.today,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::{MemoryPrefsStore, CALENDAR_PREFS_KEY};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{editor::EditorState, event::EventColor, grid::GRID_LENGTH};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 10).expect("date")
    }

    fn seeded() -> CalendarViewModel {
        let (host, _) = HostServices::memory();
        block_on(CalendarViewModel::load(&host, today()))
    }

    #[test]
    fn grid_days_mark_today_selection_and_event_counts() {
        let mut vm = seeded();
        let days = vm.grid_days();
        assert_eq!(days.len(), GRID_LENGTH);
        assert_eq!(days.iter().filter(|d| d.is_today).count(), 1);
        assert_eq!(days.iter().filter(|d| d.is_selected).count(), 1);
        assert_eq!(days.iter().filter(|d| d.has_events()).count(), 5);

        let tomorrow = today().succ_opt().expect("tomorrow");
        vm.select_day(tomorrow);
        let selected = vm
            .grid_days()
            .into_iter()
            .find(|d| d.is_selected)
            .expect("selected cell");
        assert_eq!(selected.cell.date, tomorrow);
        assert_eq!(selected.class(), "calendar-day selected has-events");
        assert_eq!(vm.selected_events().len(), 1);
    }

    #[test]
    fn navigation_and_go_today() {
        let mut vm = seeded();
        vm.next_month();
        assert_eq!(vm.month().title(), "October 2024");
        assert!(vm.grid_days().iter().all(|d| !d.is_today || !d.cell.is_current_month));
        vm.prev_month();
        vm.prev_month();
        assert_eq!(vm.month().title(), "August 2024");
        vm.go_today();
        assert_eq!(vm.selected(), today());
    }

    #[test]
    fn saving_a_draft_selects_its_date() {
        let mut vm = seeded();
        vm.open_new_for_selected();
        let target = NaiveDate::from_ymd_opt(2024, 11, 2).expect("date");
        if let Some(draft) = vm.editor_mut().draft_mut() {
            draft.title = "Marathon".to_string();
            draft.date = target;
        }
        let outcome = block_on(vm.save_draft());
        assert!(matches!(outcome, EditorOutcome::Saved(_)));
        assert_eq!(vm.selected(), target);
        assert_eq!(vm.editor().state(), &EditorState::Closed);
        assert_eq!(vm.selected_events()[0].fields.title, "Marathon");
    }

    #[test]
    fn updated_prefs_feed_new_drafts_and_persist() {
        let prefs_store = MemoryPrefsStore::default();
        let mut vm = seeded();
        let prefs = CalendarPrefs {
            default_color: EventColor::Purple,
            ..CalendarPrefs::default()
        };
        block_on(vm.update_prefs(&prefs_store, prefs)).expect("saved");
        vm.open_new_for_selected();
        assert_eq!(vm.editor().draft().map(|d| d.color), Some(EventColor::Purple));
        assert!(prefs_store.raw(CALENDAR_PREFS_KEY).is_some());
    }

    #[test]
    fn shell_class_follows_dark_mode() {
        assert_eq!(shell_class(true), "app-calendar-shell dark");
        assert_eq!(shell_class(false), "app-calendar-shell");
    }
}
