/// Operation names understood by the backend.
pub const GET_DATA_KEY: &str = "get_data_key";
pub const SET_DATA_KEY: &str = "set_data_key";
pub const GET_STUDENTS: &str = "get_students";
pub const GET_STUDENT_BY_ID: &str = "get_student_by_id";
pub const SET_STUDENT_MARK: &str = "set_student_mark";
pub const GENERATE_MARK_FOR_TASK: &str = "generate_mark_for_task";
pub const UPDATE_STUDENT: &str = "update_student";
pub const CHECK_STUDENTS_WITH_MISSING_TASKS: &str = "check_students_with_missing_tasks";
pub const GET_PATH: &str = "get_path";

/// Preference key holding the location of the students CSV.
pub const CSV_PATH_KEY: &str = "fileLocation";
