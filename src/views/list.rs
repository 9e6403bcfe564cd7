use crate::records::{Student, TASK_COUNT};
use crate::table::{CellValue, Column, TableState};

pub const MISSING_TASKS_TITLE: &str = "Some students have missing tasks!";

pub fn missing_tasks_description(count: usize) -> String {
    format!("{count} students have missing tasks.")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Empty,
}

/// Column the search query applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Id,
    Name,
    ClassId,
    HasEmptyTasks,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Id,
        FilterField::Name,
        FilterField::ClassId,
        FilterField::HasEmptyTasks,
    ];

    pub fn column_id(self) -> &'static str {
        match self {
            FilterField::Id => "id",
            FilterField::Name => "name",
            FilterField::ClassId => "class_id",
            FilterField::HasEmptyTasks => "has_empty_tasks",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterField::Id => "ID",
            FilterField::Name => "Name",
            FilterField::ClassId => "Class",
            FilterField::HasEmptyTasks => "Has empty tasks",
        }
    }

    pub fn default_query(self) -> &'static str {
        match self {
            FilterField::HasEmptyTasks => "any",
            _ => "",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn accessor(self) -> fn(&Student) -> CellValue {
        match self {
            FilterField::Id => id_cell,
            FilterField::Name => name_cell,
            FilterField::ClassId => class_cell,
            FilterField::HasEmptyTasks => empty_tasks_cell,
        }
    }
}

fn id_cell(student: &Student) -> CellValue {
    CellValue::Int(student.id)
}

fn name_cell(student: &Student) -> CellValue {
    CellValue::Text(student.name.clone())
}

fn class_cell(student: &Student) -> CellValue {
    CellValue::Int(student.class_id)
}

fn epa_cell(student: &Student) -> CellValue {
    CellValue::Float(student.epa)
}

fn task_cell<const TASK: usize>(student: &Student) -> CellValue {
    student.task(TASK).map_or(CellValue::Empty, CellValue::Float)
}

fn empty_tasks_cell(student: &Student) -> CellValue {
    CellValue::Bool(student.has_empty_tasks())
}

pub fn student_columns() -> Vec<Column<Student>> {
    let columns = vec![
        Column::new("id", "ID", id_cell),
        Column::new("name", "Name", name_cell),
        Column::new("class_id", "Class", class_cell),
        Column::new("epa", "EPA", epa_cell),
        Column::new("task_1", "Task 1", task_cell::<1>),
        Column::new("task_2", "Task 2", task_cell::<2>),
        Column::new("task_3", "Task 3", task_cell::<3>),
        Column::new("task_4", "Task 4", task_cell::<4>),
        Column::new("has_empty_tasks", "Incomplete", empty_tasks_cell),
    ];
    debug_assert_eq!(columns.len(), 5 + TASK_COUNT);
    columns
}

/// Student table with one search field, fed by full re-fetches.
pub struct ListView {
    table: TableState<Student>,
    state: LoadState,
    filter_field: FilterField,
    query: String,
}

impl ListView {
    pub fn new(page_size: usize) -> Self {
        Self {
            table: TableState::new(student_columns(), page_size),
            state: LoadState::Loading,
            filter_field: FilterField::Id,
            query: String::new(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Store a fresh fetch. Returns how many students still have empty tasks.
    pub fn finish_load(&mut self, students: Vec<Student>) -> usize {
        let missing = students.iter().filter(|s| s.has_empty_tasks()).count();
        self.state = if students.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Loaded
        };
        self.table.set_rows(students);
        missing
    }

    /// Leave loading with whatever rows were already there.
    pub fn load_failed(&mut self) {
        self.state = if self.table.rows().is_empty() {
            LoadState::Empty
        } else {
            LoadState::Loaded
        };
    }

    pub fn table(&self) -> &TableState<Student> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableState<Student> {
        &mut self.table
    }

    pub fn filter_field(&self) -> FilterField {
        self.filter_field
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Switching fields drops the previous column filter and resets the query.
    pub fn set_filter_field(&mut self, field: FilterField) {
        if field == self.filter_field {
            return;
        }
        self.table.clear_filter(self.filter_field.column_id());
        self.filter_field = field;
        self.query = field.default_query().to_string();
        self.apply_query();
    }

    pub fn cycle_filter_field(&mut self) {
        self.set_filter_field(self.filter_field.next());
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.apply_query();
    }

    pub fn push_query_char(&mut self, ch: char) {
        self.query.push(ch);
        self.apply_query();
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.apply_query();
    }

    /// Cycle any -> true -> false for the empty-tasks field.
    pub fn cycle_flag_query(&mut self) {
        let next = match self.query.to_lowercase().as_str() {
            "any" | "" => "true",
            "true" | "yes" => "false",
            _ => "any",
        };
        self.set_query(next);
    }

    /// The "Show" action of the missing-tasks notice.
    pub fn show_empty_tasks(&mut self) {
        self.set_filter_field(FilterField::HasEmptyTasks);
        self.set_query("true");
    }

    pub fn selected_student_id(&self) -> Option<i64> {
        self.table.selected_row().map(|student| student.id)
    }

    fn apply_query(&mut self) {
        let column = self.filter_field.column_id();
        let query = self.query.trim().to_lowercase();

        if self.filter_field == FilterField::HasEmptyTasks {
            match query.as_str() {
                "" | "any" => self.table.clear_filter(column),
                "true" | "yes" => self
                    .table
                    .set_filter(column, Box::new(|s: &Student| s.has_empty_tasks())),
                "false" | "no" => self
                    .table
                    .set_filter(column, Box::new(|s: &Student| !s.has_empty_tasks())),
                // Partial input such as "tr" keeps the current filter.
                _ => {}
            }
            return;
        }

        if query.is_empty() {
            self.table.clear_filter(column);
            return;
        }
        let accessor = self.filter_field.accessor();
        self.table.set_filter(
            column,
            Box::new(move |s: &Student| accessor(s).to_string().to_lowercase().contains(&query)),
        );
    }
}
