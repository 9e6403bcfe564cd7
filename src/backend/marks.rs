//! Mark suggestion for an ungraded task, derived from how the student ranks on
//! the other tasks and from the class-wide relation between EPA and marks.

use super::error::BackendError;
use crate::records::{task_index, Student, TASK_COUNT};

/// Ranks within this percentage of their mean count as a steady performer.
const CONSISTENCY_TOLERANCE_PERCENT: f64 = 10.0;
/// Largest mean rank step per task still treated as a trend.
const TREND_THRESHOLD: f64 = 20.0;
/// First-to-last rank spread, as a percentage of the cohort, treated as flat.
const SPREAD_TOLERANCE_PERCENT: f64 = 10.0;
const EPA_RANGE: std::ops::RangeInclusive<f64> = 0.0..=5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    NonDecreasing,
    Decreasing,
}

/// Ordinary least squares over one explanatory variable.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LinearFit {
    slope: f64,
    intercept: f64,
}

impl LinearFit {
    fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
        let var_x: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        if var_x == 0.0 {
            return Some(Self {
                slope: 0.0,
                intercept: mean_y,
            });
        }
        let cov: f64 = points
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        let slope = cov / var_x;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Suggest a mark for `task_id` of student `student_id`, truncated to a whole number.
pub fn generate_mark(
    students: &[Student],
    student_id: i64,
    task_id: usize,
) -> Result<f64, BackendError> {
    if task_index(task_id).is_none() {
        return Err(BackendError::InvalidTask(task_id));
    }
    let student = students
        .iter()
        .find(|student| student.id == student_id)
        .ok_or(BackendError::StudentNotFound(student_id))?;

    let other_tasks: Vec<usize> = (1..=TASK_COUNT).filter(|t| *t != task_id).collect();
    let mut ranks = Vec::with_capacity(other_tasks.len());
    for &task in &other_tasks {
        let rank = rank_on_task(students, student, task).ok_or_else(|| {
            BackendError::generation(format!("student {student_id} has no mark for task {task}"))
        })?;
        ranks.push(rank as f64);
    }

    let cohort = students.len();
    let average_mark = mark_at_rank(students, rank_by_average(students, student), task_id)?;

    if is_consistent(&ranks, CONSISTENCY_TOLERANCE_PERCENT) {
        return Ok(average_mark.trunc());
    }

    let rank_points: Vec<(f64, f64)> = other_tasks
        .iter()
        .map(|t| *t as f64)
        .zip(ranks.iter().copied())
        .collect();
    // Projected ranks stay within the marks already recorded for this task.
    let recorded = students.iter().filter(|s| s.task(task_id).is_some()).count();
    let regression_mark = LinearFit::fit(&rank_points).and_then(|fit| {
        let predicted = fit.predict(task_id as f64).trunc();
        let rank = predicted.clamp(1.0, recorded.max(1) as f64) as usize;
        mark_at_rank(students, rank, task_id).ok()
    });

    let epa = student.epa;
    let mark = match (trend(&ranks, TREND_THRESHOLD), regression_mark) {
        (Some(direction), Some(regression_mark)) => {
            let follows_rank = (epa <= 3.5 && direction == Trend::NonDecreasing)
                || (epa >= 1.5 && direction == Trend::Decreasing);
            if follows_rank {
                regression_mark
            } else {
                mark_from_epa(students, epa, task_id, None)?
            }
        }
        _ => {
            let spread = (ranks[0] - ranks[ranks.len() - 1]).abs() / cohort as f64 * 100.0;
            if spread <= SPREAD_TOLERANCE_PERCENT {
                average_mark
            } else {
                mark_from_epa(students, epa, task_id, Some(student.class_id))?
            }
        }
    };
    Ok(mark.trunc())
}

/// 1 + the number of students with a strictly higher mark on `task_id`.
fn rank_on_task(students: &[Student], student: &Student, task_id: usize) -> Option<usize> {
    let mark = student.task(task_id)?;
    let higher = students
        .iter()
        .filter_map(|other| other.task(task_id))
        .filter(|other| *other > mark)
        .count();
    Some(higher + 1)
}

fn rank_by_average(students: &[Student], student: &Student) -> usize {
    let average = student.average().unwrap_or(0.0);
    let others: Vec<f64> = students
        .iter()
        .filter(|other| other.id != student.id)
        .map(|other| other.average().unwrap_or(0.0))
        .collect();
    if !others.iter().any(|other| *other >= average) {
        return 1;
    }
    let below = others.iter().filter(|other| **other < average).count();
    students.len() - below
}

/// Mark expected at `rank` on `task_id`; the ends of the table are extrapolated.
fn mark_at_rank(students: &[Student], rank: usize, task_id: usize) -> Result<f64, BackendError> {
    let mut marks: Vec<f64> = students.iter().filter_map(|s| s.task(task_id)).collect();
    marks.sort_by(|a, b| b.total_cmp(a));

    if rank < 1 || rank > marks.len() {
        return Err(BackendError::generation(format!(
            "rank {rank} is out of bounds for task {task_id}"
        )));
    }

    if rank == 1 || rank == marks.len() {
        let points: Vec<(f64, f64)> = students
            .iter()
            .filter_map(|s| {
                let mark = s.task(task_id)?;
                let rank = rank_on_task(students, s, task_id)?;
                Some((rank as f64, mark))
            })
            .collect();
        let fit = LinearFit::fit(&points)
            .ok_or_else(|| BackendError::generation(format!("no marks for task {task_id}")))?;
        Ok(fit.predict(rank as f64))
    } else {
        Ok((marks[rank - 2] + marks[rank - 1]) / 2.0)
    }
}

/// Fit EPA against marks over fully graded students, optionally one class only.
fn mark_from_epa(
    students: &[Student],
    epa: f64,
    task_id: usize,
    class_id: Option<i64>,
) -> Result<f64, BackendError> {
    if !EPA_RANGE.contains(&epa) {
        return Err(BackendError::generation("EPA must be between 0 and 5"));
    }
    let points: Vec<(f64, f64)> = students
        .iter()
        .filter(|s| class_id.map_or(true, |class| s.class_id == class))
        .filter(|s| !s.has_empty_tasks())
        .filter_map(|s| s.task(task_id).map(|mark| (s.epa, mark)))
        .collect();
    let fit = LinearFit::fit(&points)
        .ok_or_else(|| BackendError::generation(format!("no marks for task {task_id}")))?;
    Ok(fit.predict(epa))
}

fn is_consistent(values: &[f64], tolerance_percent: f64) -> bool {
    if values.len() < 2 {
        return false;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return false;
    }
    values
        .iter()
        .all(|value| (value - mean).abs() / mean * 100.0 <= tolerance_percent)
}

fn trend(values: &[f64], threshold: f64) -> Option<Trend> {
    if values.len() < 2 {
        return None;
    }
    let step = (values[values.len() - 1] - values[0]) / (values.len() - 1) as f64;
    if (0.0..=threshold).contains(&step) {
        Some(Trend::NonDecreasing)
    } else if (-threshold..0.0).contains(&step) {
        Some(Trend::Decreasing)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cohort(target: Student) -> Vec<Student> {
        vec![
            Student::new(1, "A", 1, 4.5, [Some(90.0); TASK_COUNT]),
            Student::new(2, "B", 1, 4.0, [Some(80.0); TASK_COUNT]),
            Student::new(3, "C", 2, 3.0, [Some(70.0); TASK_COUNT]),
            Student::new(4, "D", 2, 2.0, [Some(60.0); TASK_COUNT]),
            target,
        ]
    }

    #[test]
    fn least_squares_line() {
        let fit = LinearFit::fit(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]).unwrap();
        assert!((fit.predict(4.0) - 8.0).abs() < 1e-9);

        let flat = LinearFit::fit(&[(2.0, 3.0), (2.0, 5.0)]).unwrap();
        assert_eq!(flat.predict(10.0), 4.0);
        assert!(LinearFit::fit(&[]).is_none());
    }

    #[test]
    fn steady_student_gets_mark_at_average_rank() {
        let students = cohort(Student::new(5, "E", 1, 4.2, [Some(85.0), Some(85.0), Some(85.0), None]));
        let mark = generate_mark(&students, 5, 4).unwrap();
        assert_eq!(mark, 85.0);
    }

    #[test]
    fn rising_rank_trend_follows_regression() {
        let students = cohort(Student::new(5, "E", 2, 3.0, [Some(95.0), Some(65.0), Some(75.0), None]));
        let mark = generate_mark(&students, 5, 4).unwrap();
        assert_eq!(mark, 60.0);
    }

    #[test]
    fn needs_marks_on_other_tasks() {
        let students = cohort(Student::new(5, "E", 1, 3.0, [Some(95.0), None, Some(75.0), None]));
        let err = generate_mark(&students, 5, 4).unwrap_err();
        assert_eq!(err.code(), "generation_failed");
    }

    #[test]
    fn rejects_unknown_student_and_task() {
        let students = cohort(Student::new(5, "E", 1, 3.0, [None; TASK_COUNT]));
        assert!(matches!(generate_mark(&students, 42, 1), Err(BackendError::StudentNotFound(42))));
        assert!(matches!(generate_mark(&students, 5, 0), Err(BackendError::InvalidTask(0))));
    }

    #[test]
    fn rank_helpers() {
        assert!(is_consistent(&[10.0, 10.5, 9.5], 10.0));
        assert!(!is_consistent(&[1.0, 4.0, 3.0], 10.0));
        assert_eq!(trend(&[1.0, 4.0, 3.0], 20.0), Some(Trend::NonDecreasing));
        assert_eq!(trend(&[9.0, 5.0, 1.0], 20.0), Some(Trend::Decreasing));
        assert_eq!(trend(&[1.0, 80.0], 20.0), None);
    }

    #[test]
    fn rising_trend_with_high_epa_uses_cohort_epa_fit() {
        let students = cohort(Student::new(5, "E", 2, 4.0, [Some(95.0), Some(65.0), Some(75.0), None]));
        let mark = generate_mark(&students, 5, 4).unwrap();
        assert_eq!(mark, 82.0);
    }

    #[test]
    fn epa_outside_range_fails_generation() {
        let students = cohort(Student::new(5, "E", 2, 6.0, [Some(95.0), Some(65.0), Some(75.0), None]));
        let err = generate_mark(&students, 5, 4).unwrap_err();
        assert_eq!(err.code(), "generation_failed");
        assert!(err.to_string().contains("EPA"));
    }

    #[test]
    fn rising_trend_past_last_recorded_rank_uses_bottom_mark() {
        // Ranks 2, 4, 5 project to rank 6; task 4 only has four marks recorded.
        let students = cohort(Student::new(5, "E", 2, 3.0, [Some(85.0), Some(65.0), Some(55.0), None]));
        let mark = generate_mark(&students, 5, 4).unwrap();
        assert_eq!(mark, 60.0);
    }

    #[test]
    fn wide_rank_spread_falls_back_to_class_epa_fit() {
        // Fifty class-1 students on the line mark = 50 + 10 * epa.
        let mut students: Vec<Student> = (1..=50)
            .map(|i| {
                let epa = 5.0 - i as f64 * 0.1;
                Student::new(i, "S", 1, epa, [Some(100.0 - i as f64); TASK_COUNT])
            })
            .collect();
        // Off the class-1 line; only a cohort-wide fit would see it.
        students.push(Student::new(200, "Z", 2, 3.05, [Some(0.0); TASK_COUNT]));
        // Ranks 1, 50, 51: steps of 25 are no trend and the spread is wide.
        students.push(Student::new(100, "T", 1, 3.05, [Some(99.5), Some(50.0), Some(10.0), None]));

        let mark = generate_mark(&students, 100, 4).unwrap();
        assert_eq!(mark, 80.0);
    }

    #[test]
    fn table_ends_are_extrapolated() {
        let marks = [100.0, 80.0, 75.0, 60.0];
        let students: Vec<Student> = marks
            .iter()
            .enumerate()
            .map(|(i, mark)| Student::new(i as i64 + 1, "S", 1, 3.0, [Some(*mark), None, None, None]))
            .collect();

        assert_eq!(mark_at_rank(&students, 1, 1).unwrap(), 97.5);
        assert_eq!(mark_at_rank(&students, 2, 1).unwrap(), 90.0);
        assert_eq!(mark_at_rank(&students, 3, 1).unwrap(), 77.5);
        assert_eq!(mark_at_rank(&students, 4, 1).unwrap(), 60.0);
        assert!(mark_at_rank(&students, 0, 1).is_err());
        assert!(mark_at_rank(&students, 5, 1).is_err());
    }
}
