use std::collections::BTreeMap;

use shared::{AccuracyReport, ClassDistribution};

// Placeholder figures served until a real metrics pipeline replaces them.

pub fn class_distribution() -> ClassDistribution {
    BTreeMap::from([
        ("glioma".to_string(), 35),
        ("meningioma".to_string(), 28),
        ("notumor".to_string(), 22),
        ("pituitary".to_string(), 15),
    ])
}

pub fn accuracy_report() -> AccuracyReport {
    AccuracyReport {
        overall_accuracy: 0.82,
        class_accuracy: BTreeMap::from([
            ("glioma".to_string(), 0.85),
            ("meningioma".to_string(), 0.79),
            ("notumor".to_string(), 0.88),
            ("pituitary".to_string(), 0.76),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_covers_the_four_classes() {
        let dist = class_distribution();
        assert_eq!(dist.len(), 4);
        assert_eq!(dist.values().sum::<u32>(), 100);
    }

    #[test]
    fn accuracy_report_is_consistent() {
        let report = accuracy_report();
        assert_eq!(report.class_accuracy.len(), 4);
        assert!(report.overall_accuracy > 0.0 && report.overall_accuracy <= 1.0);
    }
}
