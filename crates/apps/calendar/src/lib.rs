//! Calendar desktop app: month grid, persisted events, and the event editor.
//!
//! The domain layer ([`grid`], [`store`], [`editor`], [`view_model`]) is plain Rust driven
//! through `platform_host` contracts. [`CalendarApp`] binds it to a Leptos view, rendering
//! from immutable snapshots so async persistence never holds a borrow across an await.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod editor;
pub mod event;
pub mod grid;
pub mod prefs;
pub mod seed;
pub mod store;
pub mod view_model;

use std::{cell::RefCell, future::Future, rc::Rc};

use chrono::{Datelike, Local, NaiveDate};
use desktop_app_contract::AppServices;
use leptos::*;
use platform_host::{HostServices, PrefsStore};
use serde_json::{json, Value};

pub use editor::{EditorOutcome, EditorState, EventDraft, EventEditor};
pub use event::{CalendarEvent, EventColor, EventFieldError, EventFields, EventId, PALETTE};
pub use grid::{month_grid, DayCell, MonthView, GRID_COLS, GRID_LENGTH, GRID_ROWS};
pub use prefs::CalendarPrefs;
pub use store::{EventStore, LoadSource, PersistedCalendar, CALENDAR_SCHEMA_VERSION};
pub use view_model::{shell_class, CalendarViewModel, GridDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorMode {
    New,
    Existing(EventId),
}

#[derive(Debug, Clone, PartialEq)]
struct CalendarSnapshot {
    title: String,
    selected: NaiveDate,
    days: Vec<GridDay>,
    selected_events: Vec<CalendarEvent>,
    mode: Option<EditorMode>,
    draft: Option<EventDraft>,
    can_save: bool,
    default_color: EventColor,
}

impl CalendarSnapshot {
    fn of(vm: &CalendarViewModel) -> Self {
        let mode = match vm.editor().state() {
            EditorState::Closed => None,
            EditorState::NewDraft(_) => Some(EditorMode::New),
            EditorState::EditingExisting { id, .. } => Some(EditorMode::Existing(*id)),
        };
        Self {
            title: vm.month().title(),
            selected: vm.selected(),
            days: vm.grid_days(),
            selected_events: vm.selected_events().into_iter().cloned().collect(),
            mode,
            draft: vm.editor().draft().cloned(),
            can_save: vm.editor().can_save(),
            default_color: vm.prefs().default_color,
        }
    }
}

fn restored_selection(restored_state: Option<&Value>) -> Option<NaiveDate> {
    restored_state?
        .get("selected")
        .and_then(Value::as_str)
        .and_then(|raw| event::parse_date_key(raw).ok())
}

#[derive(Clone)]
struct SessionHandle {
    cell: Rc<RefCell<Option<CalendarViewModel>>>,
    snapshot: RwSignal<Option<CalendarSnapshot>>,
    prefs: Rc<dyn PrefsStore>,
    services: Option<AppServices>,
}

impl SessionHandle {
    fn publish(&self, vm: &CalendarViewModel) {
        let previous = self
            .snapshot
            .with_untracked(|snap| snap.as_ref().map(|snap| snap.selected));
        self.snapshot.set(Some(CalendarSnapshot::of(vm)));
        if previous != Some(vm.selected()) {
            if let Some(services) = &self.services {
                services
                    .state
                    .persist_window_state(json!({ "selected": event::date_key(vm.selected()) }));
            }
        }
    }

    fn update(&self, apply: impl FnOnce(&mut CalendarViewModel)) {
        let mut guard = self.cell.borrow_mut();
        let Some(vm) = guard.as_mut() else {
            return;
        };
        apply(vm);
        self.publish(vm);
    }

    // The view model is moved out for the duration of `op`; input arriving meanwhile is
    // dropped, matching a disabled form while a write is in flight.
    fn run<F, Fut>(&self, op: F)
    where
        F: FnOnce(CalendarViewModel) -> Fut + 'static,
        Fut: Future<Output = CalendarViewModel> + 'static,
    {
        let Some(vm) = self.cell.borrow_mut().take() else {
            return;
        };
        let handle = self.clone();
        spawn_local(async move {
            let vm = op(vm).await;
            handle.publish(&vm);
            *handle.cell.borrow_mut() = Some(vm);
        });
    }

    fn edit_draft(&self, apply: impl FnOnce(&mut EventDraft)) {
        self.update(|vm| {
            if let Some(draft) = vm.editor_mut().draft_mut() {
                apply(draft);
            }
        });
    }
}

#[component]
/// Calendar app window contents.
///
/// Events and draft defaults load through `host`; the selected date is restored from and
/// persisted to manager-owned window state when `services` is present.
pub fn CalendarApp(
    /// Host services providing storage.
    host: HostServices,
    /// Manager-restored app state payload for this window instance.
    restored_state: Option<Value>,
    /// Optional app-host bridge for theme and window-state commands.
    services: Option<AppServices>,
) -> impl IntoView {
    let dark_mode = services.as_ref().map(|services| services.theme.dark_mode);
    let snapshot = create_rw_signal::<Option<CalendarSnapshot>>(None);
    let notice = create_rw_signal::<Option<String>>(None);
    let handle = SessionHandle {
        cell: Rc::new(RefCell::new(None)),
        snapshot,
        prefs: host.prefs.clone(),
        services,
    };

    let restored = restored_selection(restored_state.as_ref());
    {
        let handle = handle.clone();
        spawn_local(async move {
            let today = Local::now().date_naive();
            let mut vm = CalendarViewModel::load(&host, today).await;
            if let Some(date) = restored {
                vm.select_day(date);
            }
            handle.publish(&vm);
            *handle.cell.borrow_mut() = Some(vm);
        });
    }

    let mode = create_memo(move |_| snapshot.with(|snap| snap.as_ref().and_then(|s| s.mode)));
    let draft_text = move |read: fn(&EventDraft) -> String| {
        snapshot.with(|snap| {
            snap.as_ref()
                .and_then(|s| s.draft.as_ref())
                .map(read)
                .unwrap_or_default()
        })
    };
    let field_result = move |result: Result<(), EventFieldError>| {
        notice.set(result.err().map(|err| err.to_string()));
    };

    let toolbar = {
        let (prev, next, today, add, color) = (
            handle.clone(),
            handle.clone(),
            handle.clone(),
            handle.clone(),
            handle.clone(),
        );
        view! {
            <div class="calendar-toolbar">
                <button type="button" on:click=move |_| prev.update(CalendarViewModel::prev_month)>
                    "<"
                </button>
                <h2 class="calendar-title">
                    {move || snapshot.with(|snap| snap.as_ref().map(|s| s.title.clone()).unwrap_or_default())}
                </h2>
                <button type="button" on:click=move |_| next.update(CalendarViewModel::next_month)>
                    ">"
                </button>
                <button type="button" on:click=move |_| today.update(CalendarViewModel::go_today)>
                    "Today"
                </button>
                <button
                    type="button"
                    on:click=move |_| add.update(CalendarViewModel::open_new_for_selected)
                >
                    "New Event"
                </button>
                <label class="calendar-default-color">
                    "New event color "
                    <select on:change=move |ev| {
                        let picked = EventColor::from_token(&event_target_value(&ev));
                        let prefs_store = color.prefs.clone();
                        color.run(move |mut vm| async move {
                            let prefs = CalendarPrefs {
                                default_color: picked,
                                ..vm.prefs().clone()
                            };
                            if let Err(err) = vm.update_prefs(prefs_store.as_ref(), prefs).await {
                                logging::warn!("calendar prefs save failed: {err}");
                            }
                            vm
                        });
                    }>
                        {PALETTE
                            .into_iter()
                            .map(|option| {
                                view! {
                                    <option
                                        value=option.as_str()
                                        selected=move || snapshot.with(|snap| {
                                            snap.as_ref().map(|s| s.default_color) == Some(option)
                                        })
                                    >
                                        {option.as_str()}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </label>
            </div>
        }
    };

    let grid = {
        let handle = handle.clone();
        move || {
            snapshot.with(|snap| {
                snap.as_ref().map(|snap| {
                    snap.days
                        .chunks(GRID_COLS)
                        .map(|week| {
                            let cells = week
                                .iter()
                                .map(|day| {
                                    let handle = handle.clone();
                                    let date = day.cell.date;
                                    view! {
                                        <button
                                            type="button"
                                            class=day.class()
                                            aria-pressed=day.is_selected
                                            on:click=move |_| handle.update(|vm| vm.select_day(date))
                                        >
                                            <span class="calendar-day-number">{date.day()}</span>
                                            {day.has_events().then(|| view! {
                                                <span class="calendar-day-dot" aria-label="has events"></span>
                                            })}
                                        </button>
                                    }
                                })
                                .collect_view();
                            view! { <div class="calendar-week" role="row">{cells}</div> }
                        })
                        .collect_view()
                })
            })
        }
    };

    let agenda = {
        let handle = handle.clone();
        move || {
            snapshot.with(|snap| {
                let snap = snap.as_ref()?;
                let heading = snap.selected.format("%A, %B %-d").to_string();
                let items = if snap.selected_events.is_empty() {
                    view! { <li class="calendar-agenda-empty">"No events"</li> }.into_view()
                } else {
                    snap.selected_events
                        .iter()
                        .map(|event| {
                            let handle = handle.clone();
                            let id = event.id;
                            let location = event.fields.location.clone();
                            view! {
                                <li class=format!("calendar-event {}", event.fields.color.as_str())>
                                    <button
                                        type="button"
                                        on:click=move |_| handle.update(|vm| {
                                            vm.open_existing(id);
                                        })
                                    >
                                        <span class="calendar-event-time">{event.time_label()}</span>
                                        <span class="calendar-event-title">{event.fields.title.clone()}</span>
                                        {location.map(|location| view! {
                                            <span class="calendar-event-location">{location}</span>
                                        })}
                                    </button>
                                </li>
                            }
                        })
                        .collect_view()
                };
                Some(view! {
                    <section class="calendar-agenda">
                        <h3>{heading}</h3>
                        <ul>{items}</ul>
                    </section>
                })
            })
        }
    };

    let editor_panel = {
        let handle = handle.clone();
        move || {
            let current = mode.get()?;
            let (title, date, time, duration, color, location) = (
                handle.clone(),
                handle.clone(),
                handle.clone(),
                handle.clone(),
                handle.clone(),
                handle.clone(),
            );
            let (save, delete, discard) = (handle.clone(), handle.clone(), handle.clone());
            let heading = match current {
                EditorMode::New => "New Event",
                EditorMode::Existing(_) => "Edit Event",
            };
            Some(view! {
                <form class="calendar-editor" on:submit=|ev| ev.prevent_default()>
                    <h3>{heading}</h3>
                    <input
                        type="text"
                        placeholder="Title"
                        prop:value=move || draft_text(|d| d.title.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            title.edit_draft(|d| d.title = value);
                        }
                    />
                    <input
                        type="date"
                        prop:value=move || draft_text(EventDraft::date_input)
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            let mut result = Ok(());
                            date.edit_draft(|d| result = d.set_date_input(&value));
                            field_result(result);
                        }
                    />
                    <input
                        type="time"
                        prop:value=move || draft_text(EventDraft::time_input)
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            let mut result = Ok(());
                            time.edit_draft(|d| result = d.set_time_input(&value));
                            field_result(result);
                        }
                    />
                    <input
                        type="number"
                        min="1"
                        prop:value=move || draft_text(|d| d.duration_minutes.to_string())
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            let mut result = Ok(());
                            duration.edit_draft(|d| result = d.set_duration_input(&value));
                            field_result(result);
                        }
                    />
                    <select
                        prop:value=move || draft_text(|d| d.color.as_str().to_string())
                        on:change=move |ev| {
                            let picked = EventColor::from_token(&event_target_value(&ev));
                            color.edit_draft(|d| d.color = picked);
                        }
                    >
                        {PALETTE
                            .into_iter()
                            .map(|option| view! { <option value=option.as_str()>{option.as_str()}</option> })
                            .collect_view()}
                    </select>
                    <input
                        type="text"
                        placeholder="Location"
                        prop:value=move || draft_text(|d| d.location.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            location.edit_draft(|d| d.location = value);
                        }
                    />
                    <div class="calendar-editor-actions">
                        <button
                            type="button"
                            disabled=move || !snapshot.with(|snap| snap.as_ref().is_some_and(|s| s.can_save))
                            on:click=move |_| {
                                save.run(move |mut vm| async move {
                                    if vm.save_draft().await == EditorOutcome::Rejected {
                                        notice.set(Some("A title is required".to_string()));
                                    }
                                    vm
                                });
                            }
                        >
                            "Save"
                        </button>
                        {matches!(current, EditorMode::Existing(_)).then(|| view! {
                            <button
                                type="button"
                                on:click=move |_| {
                                    delete.run(|mut vm| async move {
                                        vm.delete_draft().await;
                                        vm
                                    });
                                }
                            >
                                "Delete"
                            </button>
                        })}
                        <button
                            type="button"
                            on:click=move |_| {
                                discard.update(|vm| {
                                    vm.discard_draft();
                                });
                                notice.set(None);
                            }
                        >
                            "Cancel"
                        </button>
                    </div>
                </form>
            })
        }
    };

    view! {
        <div class=move || shell_class(dark_mode.is_some_and(|flag| flag.get()))>
            {toolbar}
            <div class="calendar-weekdays" role="row">
                {grid::WEEKDAY_LABELS
                    .into_iter()
                    .map(|label| view! { <span class="calendar-weekday">{label}</span> })
                    .collect_view()}
            </div>
            <div class="calendar-grid" role="grid">
                {move || {
                    if snapshot.with(Option::is_none) {
                        Some(view! { <div class="calendar-loading">"Loading events"</div> })
                    } else {
                        None
                    }
                }}
                {grid}
            </div>
            {agenda}
            {editor_panel}
            <div class="calendar-notice" role="status">
                {move || notice.get().unwrap_or_default()}
            </div>
        </div>
    }
}
