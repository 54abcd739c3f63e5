// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Search, pagination and statistics over a record snapshot.

use std::collections::HashSet;

use crate::models::{RecordPage, RecordStats, RepoRecord};

/// Records per page when the caller does not choose.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Case-insensitive substring match on name or description.
pub fn filter_records(records: &[RepoRecord], term: &str) -> Vec<RepoRecord> {
    let needle = term.trim().to_lowercase();
    records
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.name.to_lowercase().contains(&needle)
                || r.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Newest first; ties keep their relative order.
pub fn sort_newest_first(records: &mut [RepoRecord]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Slice out a 1-based page. Out-of-range pages clamp to the nearest one.
pub fn paginate(records: Vec<RepoRecord>, page: usize, page_size: usize) -> RecordPage {
    let page_size = page_size.max(1);
    let total_records = records.len();
    let total_pages = total_records.div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));

    let records = records
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    RecordPage {
        records,
        page,
        page_size,
        total_pages,
        total_records,
    }
}

pub fn compute_stats(records: &[RepoRecord]) -> RecordStats {
    let total_records = records.len();
    let total_files: u64 = records.iter().map(|r| r.file_count).sum();
    let avg_files = match total_records as u64 {
        0 => 0,
        n => (total_files + n / 2) / n,
    };
    let active_creators = records
        .iter()
        .map(|r| r.creator.as_str())
        .collect::<HashSet<_>>()
        .len();

    RecordStats {
        total_records,
        total_files,
        avg_files,
        active_creators,
    }
}

/// `0x1234...abcd` form of an address for display.
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, description: &str, files: u64, at: u64, creator: &str) -> RepoRecord {
        RepoRecord {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            file_count: files,
            updated_at: at,
            creator: creator.to_string(),
            size_verified: false,
            revealed_size: None,
        }
    }

    fn sample() -> Vec<RepoRecord> {
        vec![
            record("repo-1", "Parser", "fast tokenizer", 10, 100, "0xaa"),
            record("repo-2", "ledger-core", "consensus PARSER helpers", 3, 300, "0xbb"),
            record("repo-3", "web", "frontend", 4, 200, "0xaa"),
        ]
    }

    #[test]
    fn search_matches_name_and_description_case_insensitively() {
        let hits = filter_records(&sample(), "parser");
        let ids: Vec<_> = hits.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["repo-1", "repo-2"]);

        assert_eq!(filter_records(&sample(), "  ").len(), 3);
        assert!(filter_records(&sample(), "missing").is_empty());
    }

    #[test]
    fn sorts_newest_first() {
        let mut records = sample();
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["repo-2", "repo-3", "repo-1"]);
    }

    #[test]
    fn paginates_and_clamps() {
        let records: Vec<_> = (0..12)
            .map(|i| record(&format!("repo-{i}"), "n", "d", 1, i, "0xaa"))
            .collect();

        let first = paginate(records.clone(), 1, DEFAULT_PAGE_SIZE);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.records.len(), 5);
        assert_eq!(first.records[0].id, "repo-0");

        let last = paginate(records.clone(), 3, DEFAULT_PAGE_SIZE);
        assert_eq!(last.records.len(), 2);

        let beyond = paginate(records.clone(), 99, DEFAULT_PAGE_SIZE);
        assert_eq!(beyond.page, 3);

        let zero = paginate(records, 0, DEFAULT_PAGE_SIZE);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn empty_set_has_no_pages() {
        let page = paginate(Vec::new(), 4, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.records.is_empty());
    }

    #[test]
    fn stats_aggregate_files_and_creators() {
        let stats = compute_stats(&sample());
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.total_files, 17);
        // 17 / 3 = 5.67
        assert_eq!(stats.avg_files, 6);
        assert_eq!(stats.active_creators, 2);

        assert_eq!(compute_stats(&[]), RecordStats::default());
    }

    #[test]
    fn shortens_addresses() {
        assert_eq!(
            short_address("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12"),
            "0x742d...aB12"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
