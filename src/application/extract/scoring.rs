//! Framework scoring
//!
//! +1 per pattern found as a case-insensitive substring of any path, +2 per
//! pattern found (case-sensitive) in each source file's content.

use crate::domain::value_objects::Framework;

use super::index::RepoIndex;
use super::signals::SOURCE_EXTENSIONS;

const PATH_HIT: u32 = 1;
const CONTENT_HIT: u32 = 2;

/// Score of every candidate framework, in candidate order
pub fn framework_scores(index: &RepoIndex) -> Vec<(Framework, u32)> {
    let paths: Vec<String> = index.paths().map(str::to_lowercase).collect();
    let sources: Vec<&str> = index
        .with_extensions(&SOURCE_EXTENSIONS)
        .filter_map(|path| index.text(path))
        .collect();

    Framework::ALL
        .into_iter()
        .map(|fw| (fw, score(fw, &paths, &sources)))
        .collect()
}

fn score(framework: Framework, paths: &[String], sources: &[&str]) -> u32 {
    framework
        .patterns()
        .iter()
        .map(|pattern| {
            let needle = pattern.to_lowercase();
            let path_hit = if paths.iter().any(|p| p.contains(&needle)) {
                PATH_HIT
            } else {
                0
            };
            let content_hits = sources.iter().filter(|s| s.contains(pattern)).count() as u32;
            path_hit + CONTENT_HIT * content_hits
        })
        .sum()
}

/// Highest-scoring framework; earlier candidates win ties, zero means none
pub fn detect_framework(index: &RepoIndex) -> Option<Framework> {
    let mut best: Option<(Framework, u32)> = None;
    for (framework, score) in framework_scores(index) {
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((framework, score));
        }
    }
    best.map(|(framework, _)| framework)
}
