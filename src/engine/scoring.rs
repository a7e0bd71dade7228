/// Score stored with each session: words per minute times live accuracy.
pub fn session_score(wpm: f64, accuracy: f64) -> f64 {
    wpm * accuracy
}

/// Positional accuracy against the target length.
///
/// Matches are counted up to the shorter length, every character typed past
/// the end of the target cancels one match, and the result is clamped to
/// 0..=100. An empty target scores 0.
pub fn strict_accuracy(target: &str, typed: &str) -> f64 {
    let target: Vec<char> = target.chars().collect();
    if target.is_empty() {
        return 0.0;
    }
    let typed: Vec<char> = typed.chars().collect();

    let correct = target.iter().zip(&typed).filter(|(a, b)| a == b).count();
    let over = typed.len().saturating_sub(target.len());
    let score = correct.saturating_sub(over);
    100.0 * score as f64 / target.len() as f64
}

/// Words per minute with five characters to a word.
pub fn char_wpm(typed_chars: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs.is_nan() || elapsed_secs <= 0.0 {
        return 0.0;
    }
    (typed_chars as f64 / 5.0) / (elapsed_secs / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_score() {
        assert_eq!(session_score(50.0, 50.0), 2500.0);
        assert_eq!(session_score(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_strict_accuracy_penalizes_overtyping() {
        assert_eq!(strict_accuracy("hello", "hello"), 100.0);
        assert_eq!(strict_accuracy("hello", "hello!!"), 60.0);
        assert_eq!(strict_accuracy("short", "shorterinput"), 0.0);
    }

    #[test]
    fn test_strict_accuracy_partial_input() {
        assert_eq!(strict_accuracy("hello", "he"), 40.0);
        assert_eq!(strict_accuracy("hello", ""), 0.0);
        assert_eq!(strict_accuracy("", "abc"), 0.0);
    }

    #[test]
    fn test_char_wpm() {
        assert!((char_wpm(50, 60.0) - 10.0).abs() < f64::EPSILON);
        assert_eq!(char_wpm(50, 0.0), 0.0);
    }
}
