//! Score display formatting.

/// Group digits the Indian way: the three least-significant digits first,
/// then pairs. `1234567` becomes `12,34,567`.
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
