use crate::board::Column;
use crate::task::{Task, TaskKey, TaskStatus};

/// Next status filter in the cycle: all, then each known status, then all.
pub fn cycle_status(current: Option<&str>) -> Option<String> {
    let known = TaskStatus::known();
    let next = match current {
        None => 0,
        Some(value) => match known.iter().position(|status| status.as_str() == value) {
            Some(idx) => idx + 1,
            None => 0,
        },
    };
    known.get(next).map(|status| status.as_str().to_string())
}

/// Next agent filter in the cycle over the agents seen in the loaded page.
pub fn cycle_agent(current: Option<&str>, agents: &[String]) -> Option<String> {
    let next = match current {
        None => 0,
        Some(value) => match agents.iter().position(|agent| agent == value) {
            Some(idx) => idx + 1,
            None => 0,
        },
    };
    agents.get(next).cloned()
}

pub fn position_of(tasks: &[&Task], key: Option<&TaskKey>) -> Option<usize> {
    let key = key?;
    tasks.iter().position(|task| task.has_key(key))
}

pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        cursor.min(len - 1)
    }
}

pub fn step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = (len - 1) as isize;
    (cursor as isize + delta).clamp(0, max) as usize
}

/// Wrapping step for the dependency cursor.
pub fn wrap_step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    ((cursor as isize + delta).rem_euclid(len)) as usize
}

pub fn column_for(task: &Task) -> Option<Column> {
    Column::for_status(&task.status)
}

pub fn shift_column(column: Column, delta: isize) -> Column {
    let idx = step(column.index(), delta, Column::ALL.len());
    Column::ALL[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::task;

    #[test]
    fn status_cycle_returns_to_all() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            current = cycle_status(current.as_deref());
            seen.push(current.clone());
        }
        assert_eq!(
            seen,
            vec![
                Some("pending".to_string()),
                Some("in_progress".to_string()),
                Some("completed".to_string()),
                Some("deleted".to_string()),
                None,
            ]
        );
        assert_eq!(cycle_status(Some("archived")), Some("pending".to_string()));
    }

    #[test]
    fn agent_cycle_wraps_and_handles_unknown() {
        let agents = vec!["a".to_string(), "b".to_string()];
        assert_eq!(cycle_agent(None, &agents), Some("a".to_string()));
        assert_eq!(cycle_agent(Some("a"), &agents), Some("b".to_string()));
        assert_eq!(cycle_agent(Some("b"), &agents), None);
        assert_eq!(cycle_agent(Some("gone"), &agents), Some("a".to_string()));
        assert_eq!(cycle_agent(None, &[]), None);
    }

    #[test]
    fn cursor_helpers_stay_in_bounds() {
        assert_eq!(clamp_cursor(5, 3), 2);
        assert_eq!(clamp_cursor(5, 0), 0);
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(1, 5, 3), 2);
        assert_eq!(wrap_step(0, -1, 3), 2);
        assert_eq!(wrap_step(2, 1, 3), 0);
        assert_eq!(wrap_step(0, 1, 0), 0);
    }

    #[test]
    fn board_columns_follow_status() {
        assert_eq!(column_for(&task("1", "in_progress")), Some(Column::InProgress));
        assert_eq!(column_for(&task("2", "deleted")), None);
        assert_eq!(shift_column(Column::Pending, -1), Column::Pending);
        assert_eq!(shift_column(Column::Pending, 1), Column::InProgress);
        assert_eq!(shift_column(Column::InProgress, 4), Column::Completed);
    }

    #[test]
    fn position_matches_composite_key() {
        let first = task("1", "pending");
        let second = task("2", "pending");
        let tasks = vec![&first, &second];
        assert_eq!(position_of(&tasks, Some(&TaskKey::new("list", "2"))), Some(1));
        assert_eq!(position_of(&tasks, Some(&TaskKey::new("other", "2"))), None);
        assert_eq!(position_of(&tasks, None), None);
    }
}
