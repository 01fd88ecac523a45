//! Guessing arguments for files that have no entry of their own.

const MATCH_PREFIX_WEIGHT: i64 = 100;
const MISMATCH_DIRECTORY_WEIGHT: i64 = 100;
const MATCH_SUFFIX_WEIGHT: i64 = 1;

/// Scores how well `a` and `b` match.
///
/// A shared leading run dominates, each directory separator past the shared
/// run costs as much as one matching character, and a shared trailing run
/// (`_unittest.cc`) breaks ties between files at the same depth. The suffix
/// scan is independent of the prefix scan and may overlap it.
pub fn guess_score(a: &str, b: &str) -> i64 {
    let a = a.as_bytes();
    let b = b.as_bytes();

    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();

    let separators = |rest: &[u8]| rest.iter().filter(|&&c| c == b'/').count() as i64;
    let directory_penalty = separators(&a[prefix..]) + separators(&b[prefix..]);

    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    prefix as i64 * MATCH_PREFIX_WEIGHT - directory_penalty * MISMATCH_DIRECTORY_WEIGHT
        + suffix as i64 * MATCH_SUFFIX_WEIGHT
}

/// Index of the best-scoring candidate for `filename`. The first candidate
/// wins ties. `None` when there are no candidates.
pub fn best_match<'a, I>(filename: &str, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, i64)> = None;
    for (index, candidate) in candidates.into_iter().enumerate() {
        let score = guess_score(filename, candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}
