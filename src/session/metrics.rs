/// Live metrics returned after each keystroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub accuracy: f64,
    pub current_streak: u32,
    pub best_streak: u32,
    pub complete: bool,
    pub word_count: usize,
}

impl Snapshot {
    pub fn wpm(&self, elapsed_minutes: f64) -> u32 {
        words_per_minute(self.word_count, elapsed_minutes)
    }
}

/// Scores one attempt at a target text as the input evolves.
///
/// Correct characters are recounted on every update. Errors are counted once
/// per position when it turns wrong, so retyping a wrong character as another
/// wrong one adds nothing and fixing it removes nothing. Input past the end of
/// the target is ignored.
#[derive(Clone, Debug)]
pub struct MetricsEngine {
    target: Vec<char>,
    word_count: usize,
    previous_input: Vec<char>,
    correct_count: usize,
    cumulative_error_count: usize,
    current_streak: u32,
    best_streak: u32,
    frozen: bool,
}

impl MetricsEngine {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.chars().collect(),
            word_count: target.split_whitespace().count(),
            previous_input: Vec::new(),
            correct_count: 0,
            cumulative_error_count: 0,
            current_streak: 0,
            best_streak: 0,
            frozen: false,
        }
    }

    pub fn reset(&mut self, target: &str) {
        *self = Self::new(target);
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    /// Last observed input, as characters.
    pub fn input(&self) -> &[char] {
        &self.previous_input
    }

    pub fn update(&mut self, input: &str) -> Snapshot {
        if self.frozen {
            return self.snapshot();
        }

        let input: Vec<char> = input.chars().collect();
        let len = input.len().min(self.target.len());

        self.correct_count = 0;
        for (i, (&typed, &expected)) in input[..len].iter().zip(&self.target[..len]).enumerate() {
            if typed == expected {
                self.correct_count += 1;
            } else if self
                .previous_input
                .get(i)
                .is_none_or(|&prev| prev == expected)
            {
                self.cumulative_error_count += 1;
            }
        }

        self.frozen = input == self.target;
        self.previous_input = input;
        self.snapshot()
    }

    pub fn record_streak(&mut self, typed: char, expected: char) {
        if self.frozen {
            return;
        }
        if typed == expected {
            self.current_streak += 1;
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.current_streak = 0;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.previous_input == self.target
    }

    pub fn accuracy(&self) -> f64 {
        let attempts = self.correct_count + self.cumulative_error_count;
        if attempts == 0 {
            return 100.0;
        }
        self.correct_count as f64 * 100.0 / attempts as f64
    }

    pub fn wpm(&self, elapsed_minutes: f64) -> u32 {
        words_per_minute(self.word_count, elapsed_minutes)
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn cumulative_error_count(&self) -> usize {
        self.cumulative_error_count
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            accuracy: self.accuracy(),
            current_streak: self.current_streak,
            best_streak: self.best_streak,
            complete: self.is_complete(),
            word_count: self.word_count,
        }
    }
}

fn words_per_minute(word_count: usize, elapsed_minutes: f64) -> u32 {
    if elapsed_minutes.is_nan() || elapsed_minutes <= 0.0 {
        return 0;
    }
    (word_count as f64 / elapsed_minutes) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_single_mismatch() {
        let mut engine = MetricsEngine::new("hello world");
        engine.update("hello worxd");
        assert!((engine.accuracy() - 90.909).abs() < 0.01);
        assert_eq!(engine.correct_count(), 10);
        assert_eq!(engine.cumulative_error_count(), 1);
    }

    #[test]
    fn test_accuracy_starts_at_100() {
        let engine = MetricsEngine::new("hello");
        assert_eq!(engine.accuracy(), 100.0);
    }

    #[test]
    fn test_empty_input_keeps_accuracy_at_100() {
        let mut engine = MetricsEngine::new("hello");
        let snap = engine.update("");
        assert_eq!(snap.accuracy, 100.0);
        assert!(!snap.complete);
    }

    #[test]
    fn test_perfect_input() {
        let mut engine = MetricsEngine::new("hello");
        let snap = engine.update("hello");
        assert_eq!(snap.accuracy, 100.0);
        assert!(snap.complete);
    }

    #[test]
    fn test_wpm_counts_target_words() {
        let engine = MetricsEngine::new("hello world");
        assert_eq!(engine.wpm(1.0), 2);
        assert_eq!(engine.wpm(0.5), 4);
        // 2 / 0.75 = 2.67, truncated
        assert_eq!(engine.wpm(0.75), 2);
    }

    #[test]
    fn test_wpm_zero_or_negative_time() {
        let engine = MetricsEngine::new("hello world");
        assert_eq!(engine.wpm(0.0), 0);
        assert_eq!(engine.wpm(-1.0), 0);
        assert_eq!(engine.wpm(f64::NAN), 0);
    }

    #[test]
    fn test_wpm_collapses_repeated_whitespace() {
        let engine = MetricsEngine::new("  one   two\tthree  ");
        assert_eq!(engine.word_count(), 3);
    }

    #[test]
    fn test_streak_tracking() {
        let mut engine = MetricsEngine::new("abc");
        engine.record_streak('a', 'a');
        engine.record_streak('b', 'b');
        engine.record_streak('x', 'c');
        assert_eq!(engine.current_streak(), 0);
        assert_eq!(engine.best_streak(), 2);
    }

    #[test]
    fn test_streak_resumes_after_mistake() {
        let mut engine = MetricsEngine::new("abc");
        engine.record_streak('a', 'a');
        engine.record_streak('b', 'b');
        engine.record_streak('x', 'c');
        engine.record_streak('c', 'c');
        assert_eq!(engine.current_streak(), 1);
        assert_eq!(engine.best_streak(), 2);
    }

    #[test]
    fn test_same_wrong_char_not_counted_twice() {
        let mut engine = MetricsEngine::new("abc");
        engine.update("x");
        engine.update("x");
        engine.update("xb");
        assert_eq!(engine.cumulative_error_count(), 1);
    }

    #[test]
    fn test_different_wrong_char_not_counted_twice() {
        let mut engine = MetricsEngine::new("abc");
        engine.update("x");
        engine.update("y");
        assert_eq!(engine.cumulative_error_count(), 1);
    }

    #[test]
    fn test_corrected_error_stays_counted() {
        let mut engine = MetricsEngine::new("abc");
        engine.update("x");
        engine.update("a");
        assert_eq!(engine.cumulative_error_count(), 1);
        assert_eq!(engine.correct_count(), 1);
        assert!((engine.accuracy() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_backspace_then_wrong_again_counts_again() {
        // Position 0 drops out of the input, so it is untyped before the retype.
        let mut engine = MetricsEngine::new("abc");
        engine.update("x");
        engine.update("");
        engine.update("y");
        assert_eq!(engine.cumulative_error_count(), 2);
    }

    #[test]
    fn test_correct_position_turning_wrong_counts() {
        let mut engine = MetricsEngine::new("abc");
        engine.update("ab");
        engine.update("ax");
        assert_eq!(engine.cumulative_error_count(), 1);
        assert_eq!(engine.correct_count(), 1);
    }

    #[test]
    fn test_errors_never_decrease() {
        let mut engine = MetricsEngine::new("hello");
        let mut last = 0;
        for input in ["h", "hx", "h", "he", "hey", "hel", "", "hello"] {
            engine.update(input);
            assert!(engine.cumulative_error_count() >= last);
            last = engine.cumulative_error_count();
        }
    }

    #[test]
    fn test_excess_input_ignored() {
        let mut engine = MetricsEngine::new("short");
        let snap = engine.update("shorterinput");
        assert_eq!(engine.correct_count(), 5);
        assert_eq!(engine.cumulative_error_count(), 0);
        assert_eq!(snap.accuracy, 100.0);
        assert!(!snap.complete);
    }

    #[test]
    fn test_trailing_whitespace_not_scored() {
        let mut engine = MetricsEngine::new("hello");
        let snap = engine.update("hello ");
        assert_eq!(snap.accuracy, 100.0);
        assert!(!engine.is_complete());
    }

    #[test]
    fn test_completion_is_case_sensitive() {
        let mut engine = MetricsEngine::new("Done");
        assert!(!engine.update("done").complete);
        assert!(engine.update("Done").complete);
    }

    #[test]
    fn test_incomplete_input() {
        let mut engine = MetricsEngine::new("hello");
        engine.update("hel");
        assert!(!engine.is_complete());
    }

    #[test]
    fn test_frozen_after_completion() {
        let mut engine = MetricsEngine::new("ab");
        engine.record_streak('a', 'a');
        engine.record_streak('b', 'b');
        let done = engine.update("ab");
        assert!(done.complete);

        let after = engine.update("zz");
        assert_eq!(after, done);
        engine.record_streak('q', 'a');
        assert_eq!(engine.current_streak(), 2);
        assert_eq!(engine.cumulative_error_count(), 0);
    }

    #[test]
    fn test_reset_clears_counters() {
        let mut engine = MetricsEngine::new("abc");
        engine.update("xyz");
        engine.record_streak('a', 'a');
        engine.reset("hello world");
        assert_eq!(engine.cumulative_error_count(), 0);
        assert_eq!(engine.correct_count(), 0);
        assert_eq!(engine.current_streak(), 0);
        assert_eq!(engine.best_streak(), 0);
        assert_eq!(engine.word_count(), 2);
        assert!(engine.input().is_empty());
    }

    #[test]
    fn test_positions_are_chars_not_bytes() {
        let mut engine = MetricsEngine::new("héllo");
        let snap = engine.update("hé");
        assert_eq!(engine.correct_count(), 2);
        assert_eq!(snap.accuracy, 100.0);
    }

    #[test]
    fn test_empty_target_completes_on_empty_input() {
        let mut engine = MetricsEngine::new("");
        assert_eq!(engine.word_count(), 0);
        let snap = engine.update("");
        assert!(snap.complete);
        assert_eq!(snap.wpm(1.0), 0);
    }

    #[test]
    fn test_snapshot_wpm_matches_engine() {
        let mut engine = MetricsEngine::new("one two three");
        let snap = engine.update("one");
        assert_eq!(snap.wpm(0.5), engine.wpm(0.5));
        assert_eq!(snap.wpm(0.5), 6);
    }
}
