use crate::error::Error;
use crate::model::FileItem;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

lazy_static::lazy_static! {
    pub static ref DEFAULT_NUMBER_PATTERN: Regex =
        Regex::new(r"\d+").expect("default number pattern is valid");
}

/// Upper bound on numbers listed in [`SequenceReport::missing`]. Wider spans
/// are still counted in `missing_count` and visible through
/// [`SequenceValidator::get_sequence_gaps`].
pub const MAX_LISTED_MISSING: usize = 10_000;

/// Result of checking the numeric naming sequence of a file set.
///
/// Files whose stem carries no number are counted in `total_files` but take
/// no part in the numeric analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    pub is_valid: bool,
    /// Missing numbers in ascending order, at most [`MAX_LISTED_MISSING`].
    pub missing: Vec<u64>,
    /// Total missing numbers, including any left out of `missing`.
    pub missing_count: u64,
    pub duplicates: BTreeMap<u64, Vec<String>>,
    pub total_files: usize,
    pub min_number: Option<u64>,
    pub max_number: Option<u64>,
}

/// Extracts numeric tokens from file stems and checks them for gaps and
/// duplicates.
#[derive(Debug, Clone)]
pub struct SequenceValidator {
    pattern: Regex,
}

impl Default for SequenceValidator {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_NUMBER_PATTERN.clone(),
        }
    }
}

impl SequenceValidator {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let pattern = Regex::new(pattern)?;
        debug!("SequenceValidator using pattern: {}", pattern);
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// First match of the pattern in `stem`, parsed as an integer. Digit runs
    /// too long for a u64 count as no match.
    pub fn extract_number(&self, stem: &str) -> Option<u64> {
        let found = self.pattern.find(stem)?;
        match found.as_str().parse::<u64>() {
            Ok(n) => Some(n),
            Err(e) => {
                debug!("Ignoring token '{}' in '{}': {}", found.as_str(), stem, e);
                None
            }
        }
    }

    /// (number, file name) for every file whose stem yields a number, in input
    /// order.
    fn numbered<'a>(&self, files: &'a [FileItem]) -> Vec<(u64, &'a FileItem)> {
        files
            .iter()
            .filter_map(|f| self.extract_number(&f.stem).map(|n| (n, f)))
            .collect()
    }

    pub fn detect_missing(&self, files: &[FileItem]) -> Vec<u64> {
        let distinct: BTreeSet<u64> = self.numbered(files).into_iter().map(|(n, _)| n).collect();

        if distinct.is_empty() {
            warn!("No numbers found in file names");
            return Vec::new();
        }

        let mut missing = Vec::new();
        let mut truncated = false;
        let mut previous: Option<u64> = None;
        for &n in &distinct {
            if let Some(prev) = previous {
                let room = (MAX_LISTED_MISSING - missing.len()) as u64;
                let end = n.min((prev + 1).saturating_add(room));
                missing.extend(prev + 1..end);
                truncated |= end < n;
            }
            previous = Some(n);
        }

        if truncated {
            warn!(
                "Numbers span {}..={}; listing only the first {} missing numbers",
                distinct.first().copied().unwrap_or_default(),
                distinct.last().copied().unwrap_or_default(),
                MAX_LISTED_MISSING
            );
        }
        if missing.is_empty() {
            debug!("No missing numbers detected");
        } else {
            info!(
                "{} missing numbers detected, first {:?}",
                missing.len(),
                &missing[..missing.len().min(20)]
            );
        }
        missing
    }

    fn count_missing(&self, files: &[FileItem]) -> u64 {
        self.get_sequence_gaps(files)
            .iter()
            .map(|(a, b)| b - a - 1)
            .fold(0, u64::saturating_add)
    }

    pub fn detect_duplicates(&self, files: &[FileItem]) -> BTreeMap<u64, Vec<String>> {
        let mut by_number: BTreeMap<u64, Vec<String>> = BTreeMap::new();
        for (n, file) in self.numbered(files) {
            by_number.entry(n).or_default().push(file.file_name());
        }
        by_number.retain(|_, names| names.len() > 1);

        if !by_number.is_empty() {
            warn!("Duplicate numbers detected: {:?}", by_number);
        }
        by_number
    }

    pub fn validate(&self, files: &[FileItem]) -> SequenceReport {
        let numbers: Vec<u64> = self.numbered(files).into_iter().map(|(n, _)| n).collect();
        let missing = self.detect_missing(files);
        let missing_count = self.count_missing(files);
        let duplicates = self.detect_duplicates(files);

        let report = SequenceReport {
            is_valid: missing_count == 0 && duplicates.is_empty(),
            missing,
            missing_count,
            duplicates,
            total_files: files.len(),
            min_number: numbers.iter().copied().min(),
            max_number: numbers.iter().copied().max(),
        };

        info!(
            "Sequence validation: valid={}, {} files, {} missing, {} duplicated numbers",
            report.is_valid,
            report.total_files,
            report.missing_count,
            report.duplicates.len(),
        );
        report
    }

    /// Adjacent pairs (a, b) of the distinct sorted numbers where b - a > 1.
    pub fn get_sequence_gaps(&self, files: &[FileItem]) -> Vec<(u64, u64)> {
        let distinct: BTreeSet<u64> = self.numbered(files).into_iter().map(|(n, _)| n).collect();
        let sorted: Vec<u64> = distinct.into_iter().collect();

        let gaps: Vec<(u64, u64)> = sorted
            .windows(2)
            .filter(|w| w[1] - w[0] > 1)
            .map(|w| (w[0], w[1]))
            .collect();

        debug!("Sequence gaps detected: {:?}", gaps);
        gaps
    }
}
