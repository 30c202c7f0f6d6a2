//! Deduplicating, order-preserving review store for one crawl run.

use std::collections::HashSet;

use crate::domain::review::ReviewRecord;

#[derive(Debug, Default)]
pub struct ReviewAccumulator {
    records: Vec<ReviewRecord>,
    seen: HashSet<String>,
}

impl ReviewAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `record` unless its dedup key was seen before. Returns whether it
    /// was kept.
    pub fn add(&mut self, record: ReviewRecord) -> bool {
        if !self.seen.insert(record.dedup_key()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Add a page's worth of records; returns how many were new.
    pub fn extend(&mut self, records: impl IntoIterator<Item = ReviewRecord>) -> usize {
        records
            .into_iter()
            .map(|record| self.add(record))
            .filter(|kept| *kept)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ReviewRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn review(user: &str, date: &str, content: &str) -> ReviewRecord {
        ReviewRecord {
            user: Some(user.into()),
            date: Some(date.into()),
            content: content.into(),
            ..ReviewRecord::default()
        }
    }

    #[test]
    fn test_first_seen_wins() {
        let mut acc = ReviewAccumulator::new();
        let mut first = review("ana", "1 Jan", "good");
        first.likes = 1;
        let mut repeat = first.clone();
        repeat.likes = 9;

        assert!(acc.add(first));
        assert!(!acc.add(repeat));
        assert!(acc.add(review("ana", "2 Jan", "good")));
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.records()[0].likes, 1);
    }

    #[test]
    fn test_extend_counts_new_records() {
        let mut acc = ReviewAccumulator::new();
        let page = vec![review("a", "d", "x"), review("b", "d", "y")];
        assert_eq!(acc.extend(page.clone()), 2);
        assert_eq!(acc.extend(page), 0);
    }

    proptest! {
        #[test]
        fn prop_keys_unique_and_first_seen_order(
            entries in prop::collection::vec((0u8..4, 0u8..3, 0u8..3), 0..40)
        ) {
            let records: Vec<ReviewRecord> = entries
                .iter()
                .map(|(u, d, c)| review(&format!("u{u}"), &format!("d{d}"), &format!("c{c}")))
                .collect();

            let mut acc = ReviewAccumulator::new();
            acc.extend(records.clone());

            let mut expected_keys: Vec<String> = Vec::new();
            for record in &records {
                let key = record.dedup_key();
                if !expected_keys.contains(&key) {
                    expected_keys.push(key);
                }
            }
            let kept: Vec<String> = acc.records().iter().map(ReviewRecord::dedup_key).collect();
            prop_assert_eq!(kept, expected_keys);
        }
    }
}
