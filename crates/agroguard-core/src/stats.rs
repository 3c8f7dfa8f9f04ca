//! Usage statistics over a caller's prediction history.

use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregated prediction statistics for one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    /// Total predictions recorded for the account.
    pub total_predictions: usize,
    /// Class key with the highest count; ties break to the
    /// lexicographically smallest key. `None` with no predictions.
    pub most_common_disease: Option<String>,
    /// Count per class key.
    pub disease_counts: BTreeMap<String, usize>,
}

/// Aggregate predicted class keys into totals and a frequency table.
pub fn aggregate_stats<'a, I>(classes: I) -> UsageStats
where
    I: IntoIterator<Item = &'a str>,
{
    let mut disease_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_predictions = 0;
    for class in classes {
        *disease_counts.entry(class.to_string()).or_insert(0) += 1;
        total_predictions += 1;
    }

    // Ascending key iteration, so an equal later count never replaces the
    // current winner: ties resolve to the smallest key.
    let most_common_disease = disease_counts
        .iter()
        .fold(None::<(&String, usize)>, |best, (key, count)| match best {
            Some((_, top)) if top >= *count => best,
            _ => Some((key, *count)),
        })
        .map(|(key, _)| key.clone());

    UsageStats {
        total_predictions,
        most_common_disease,
        disease_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::aggregate_stats;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_history_has_no_most_common() {
        let stats = aggregate_stats(Vec::<&str>::new());
        assert_eq!(stats.total_predictions, 0);
        assert_eq!(stats.most_common_disease, None);
        assert!(stats.disease_counts.is_empty());
    }

    #[test]
    fn counts_and_most_common() {
        let stats = aggregate_stats(["X", "Y", "X"]);
        assert_eq!(stats.total_predictions, 3);
        assert_eq!(stats.most_common_disease.as_deref(), Some("X"));
        assert_eq!(stats.disease_counts["X"], 2);
        assert_eq!(stats.disease_counts["Y"], 1);
    }

    #[test]
    fn ties_break_to_smallest_key() {
        let stats = aggregate_stats(["B", "A", "C", "A", "B"]);
        assert_eq!(stats.most_common_disease.as_deref(), Some("A"));
    }
}
