use crate::records::Student;

/// Backend facts shown on the test page, filled in as each call completes.
#[derive(Debug, Clone, Default)]
pub struct TestPage {
    store_path: Option<String>,
    incomplete: Option<Vec<Student>>,
}

impl TestPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_path(&self) -> Option<&str> {
        self.store_path.as_deref()
    }

    pub fn set_store_path(&mut self, path: String) {
        self.store_path = Some(path);
    }

    pub fn set_incomplete(&mut self, students: Vec<Student>) {
        self.incomplete = Some(students);
    }

    /// `None` until the backend answers; then one line per student naming the open tasks.
    pub fn incomplete_lines(&self) -> Option<Vec<String>> {
        let students = self.incomplete.as_ref()?;
        Some(
            students
                .iter()
                .map(|student| {
                    let tasks: Vec<String> = student
                        .empty_task_ids()
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    format!("{} {}: tasks {}", student.id, student.name, tasks.join(", "))
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_open_tasks_per_student() {
        let mut page = TestPage::new();
        assert_eq!(page.store_path(), None);
        assert_eq!(page.incomplete_lines(), None);

        page.set_store_path("/data/store.json".to_string());
        page.set_incomplete(vec![
            Student::new(2, "Bea", 1, 3.0, [Some(5.0), None, Some(3.0), None]),
            Student::new(7, "Cy", 2, 1.5, [None, Some(1.0), Some(2.0), Some(3.0)]),
        ]);
        assert_eq!(page.store_path(), Some("/data/store.json"));
        assert_eq!(
            page.incomplete_lines().unwrap(),
            vec!["2 Bea: tasks 2, 4".to_string(), "7 Cy: tasks 1".to_string()]
        );
    }
}
