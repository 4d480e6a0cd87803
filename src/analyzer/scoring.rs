use crate::models::Task;

/// Weighted average of task completion, rounded to two decimals.
///
/// Empty input and a zero total weight both score 0.
pub fn calculate_productivity(tasks: &[Task]) -> f64 {
    let total_weight = tasks.iter().map(|task| task.weight).sum::<f64>();
    if tasks.is_empty() || total_weight == 0.0 {
        return 0.0;
    }

    let weighted = tasks
        .iter()
        .map(|task| task.weight * task.completion_percent)
        .sum::<f64>();

    round2(weighted / total_weight)
}

/// Rescales weights so they sum to exactly 100.
///
/// A zero total splits 100 evenly. Rounding residue lands on the first task.
pub fn normalize_weights(tasks: &[Task]) -> Vec<Task> {
    if tasks.is_empty() {
        return Vec::new();
    }

    let total_weight = tasks.iter().map(|task| task.weight).sum::<f64>();

    let mut normalized = if total_weight == 0.0 {
        let share = round2(100.0 / tasks.len() as f64);
        tasks
            .iter()
            .map(|task| Task {
                weight: share,
                ..task.clone()
            })
            .collect::<Vec<_>>()
    } else if total_weight == 100.0 {
        return tasks.to_vec();
    } else {
        let factor = 100.0 / total_weight;
        tasks
            .iter()
            .map(|task| Task {
                weight: round2(task.weight * factor),
                ..task.clone()
            })
            .collect::<Vec<_>>()
    };

    let residue = 100.0 - normalized.iter().map(|task| task.weight).sum::<f64>();
    if let Some(first) = normalized.first_mut() {
        first.weight = round2(first.weight + residue);
    }

    normalized
}

pub fn total_weight(tasks: &[Task]) -> f64 {
    round2(tasks.iter().map(|task| task.weight).sum::<f64>())
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{calculate_productivity, normalize_weights};
    use crate::models::Task;

    fn task(weight: f64, completion: f64) -> Task {
        Task::new("task", weight).with_completion(completion)
    }

    fn weight_sum(tasks: &[Task]) -> f64 {
        tasks.iter().map(|task| task.weight).sum()
    }

    #[test]
    fn empty_and_weightless_inputs_score_zero() {
        assert_eq!(calculate_productivity(&[]), 0.0);
        assert_eq!(calculate_productivity(&[task(0.0, 100.0), task(0.0, 50.0)]), 0.0);
    }

    #[test]
    fn weighted_average_of_completion() {
        assert_eq!(calculate_productivity(&[task(60.0, 100.0), task(40.0, 50.0)]), 80.0);
        assert_eq!(
            calculate_productivity(&[task(25.0, 100.0), task(25.0, 0.0), task(50.0, 30.0)]),
            40.0
        );
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        let score = calculate_productivity(&[task(1.0, 100.0), task(2.0, 0.0)]);
        assert_eq!(score, 33.33);
    }

    #[test]
    fn zero_total_splits_evenly() {
        let normalized = normalize_weights(&[task(0.0, 0.0), task(0.0, 0.0), task(0.0, 0.0)]);

        assert_eq!(normalized[1].weight, 33.33);
        assert_eq!(normalized[2].weight, 33.33);
        assert!((weight_sum(&normalized) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn exact_hundred_is_unchanged() {
        let tasks = vec![task(70.0, 10.0), task(30.0, 90.0)];
        assert_eq!(normalize_weights(&tasks), tasks);
    }

    #[test]
    fn drifted_weights_scale_to_hundred() {
        let normalized = normalize_weights(&[task(30.0, 0.0), task(30.0, 0.0), task(30.0, 0.0)]);
        assert!((weight_sum(&normalized) - 100.0).abs() < 1e-9);
        assert_eq!(normalized[1].weight, 33.33);

        let normalized = normalize_weights(&[task(10.0, 0.0), task(30.0, 0.0)]);
        assert_eq!(normalized[0].weight, 25.0);
        assert_eq!(normalized[1].weight, 75.0);
    }

    #[test]
    fn normalization_preserves_task_identity() {
        let tasks = vec![task(5.0, 40.0), task(15.0, 80.0)];
        let normalized = normalize_weights(&tasks);

        assert_eq!(normalized[0].id, tasks[0].id);
        assert_eq!(normalized[1].completion_percent, 80.0);
        assert!(normalize_weights(&[]).is_empty());
    }
}
