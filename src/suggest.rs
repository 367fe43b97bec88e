use strsim::levenshtein;

const MAX_DISTANCE: usize = 2;

/// Candidates within edit distance 2 of `input`, keeping only those at the
/// smallest distance found. Ties are returned in candidate order.
pub fn suggest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let scored = candidates
        .into_iter()
        .map(|it| (levenshtein(input, it), it))
        .filter(|(distance, _)| *distance <= MAX_DISTANCE)
        .collect::<Vec<_>>();
    let best = match scored.iter().map(|(distance, _)| *distance).min() {
        Some(it) => it,
        None => return Vec::new(),
    };
    let mut res = Vec::new();
    for (distance, candidate) in scored {
        if distance == best && !res.iter().any(|it| it == candidate) {
            res.push(candidate.to_string());
        }
    }
    res
}
