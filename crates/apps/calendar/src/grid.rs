//! Sunday-first month grid generation and month navigation.

use chrono::{Datelike, Days, Months, NaiveDate};

/// Rows in a month grid.
pub const GRID_ROWS: usize = 6;
/// Columns in a month grid, Sunday through Saturday.
pub const GRID_COLS: usize = 7;
/// Cells in a month grid.
pub const GRID_LENGTH: usize = GRID_ROWS * GRID_COLS;

/// Column header labels in grid order.
pub const WEEKDAY_LABELS: [&str; GRID_COLS] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One cell of a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayCell {
    /// Date shown in the cell.
    pub date: NaiveDate,
    /// Whether `date` falls inside the grid's reference month.
    pub is_current_month: bool,
}

/// Builds the 42-cell grid for the month containing `reference`.
///
/// The grid starts on the Sunday on or before the first of the month, so the leading cells
/// are trailing days of the previous month and the grid is padded with the following month.
/// The result is always 6 full weeks, even for a February that fits in four rows.
pub fn month_grid(reference: NaiveDate) -> [DayCell; GRID_LENGTH] {
    let start = grid_start(reference);
    let (year, month) = (reference.year(), reference.month());

    // Only the last month chrono can represent runs out of successors; repeat the boundary
    // date there instead of panicking.
    std::array::from_fn(|offset| {
        let date = start
            .checked_add_days(Days::new(offset as u64))
            .unwrap_or(NaiveDate::MAX);
        DayCell {
            date,
            is_current_month: date.year() == year && date.month() == month,
        }
    })
}

fn grid_start(reference: NaiveDate) -> NaiveDate {
    let first = reference.with_day(1).unwrap_or(reference);
    let leading = first.weekday().num_days_from_sunday();
    first
        .checked_sub_days(Days::new(u64::from(leading)))
        .unwrap_or(first)
}

/// Selected date plus the grid of its month.
///
/// The grid is regenerated only when the selection crosses into another month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    selected: NaiveDate,
    cells: [DayCell; GRID_LENGTH],
}

impl MonthView {
    /// View of the month containing `selected`.
    pub fn new(selected: NaiveDate) -> Self {
        Self {
            selected,
            cells: month_grid(selected),
        }
    }

    /// Currently selected date.
    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    /// All 42 cells, row-major.
    pub fn cells(&self) -> &[DayCell; GRID_LENGTH] {
        &self.cells
    }

    /// Returns the seven cells of week `idx` (0-based), or `None` past the sixth row.
    pub fn row(&self, idx: usize) -> Option<&[DayCell]> {
        self.cells.chunks(GRID_COLS).nth(idx)
    }

    /// The six weeks in order.
    pub fn rows(&self) -> impl Iterator<Item = &[DayCell]> + '_ {
        self.cells.chunks(GRID_COLS)
    }

    /// Position of `date` in the grid, if it is visible.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.cells.iter().position(|cell| cell.date == date)
    }

    /// First and last dates covered by the grid.
    pub fn visible_range(&self) -> (NaiveDate, NaiveDate) {
        (self.cells[0].date, self.cells[GRID_LENGTH - 1].date)
    }

    /// Selects `date`. Returns `true` when the grid had to be rebuilt for a new month.
    pub fn set_date(&mut self, date: NaiveDate) -> bool {
        let month_changed =
            date.year() != self.selected.year() || date.month() != self.selected.month();
        self.selected = date;
        if month_changed {
            self.cells = month_grid(date);
        }
        month_changed
    }

    /// Moves one month forward, clamping the day to the new month's length.
    pub fn next_month(&mut self) {
        if let Some(date) = self.selected.checked_add_months(Months::new(1)) {
            self.set_date(date);
        }
    }

    /// Moves one month back, clamping the day to the new month's length.
    pub fn prev_month(&mut self) {
        if let Some(date) = self.selected.checked_sub_months(Months::new(1)) {
            self.set_date(date);
        }
    }

    /// Heading such as `"March 2024"`.
    pub fn title(&self) -> String {
        self.selected.format("%B %Y").to_string()
    }
}
