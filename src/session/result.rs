use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Drill, DrillId, Tier};
use crate::engine::scoring;
use crate::session::metrics::MetricsEngine;
use crate::store::{UserContext, UserId};

/// A finished attempt as stored in the session history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub drill_id: DrillId,
    /// Tier of the drill when it was played. Progression reads tiers from the catalog.
    pub tier: Tier,
    pub wpm: f64,
    pub accuracy: f64,
    /// Positional accuracy with over-typing penalized, kept next to the live figure.
    #[serde(default)]
    pub strict_accuracy: f64,
    pub typed_chars: usize,
    pub duration_seconds: f64,
    pub started_at: DateTime<Utc>,
    pub score: f64,
}

impl SessionRecord {
    pub fn from_attempt(
        user: &UserContext,
        drill: &Drill,
        engine: &MetricsEngine,
        typed: &str,
        duration_seconds: f64,
        started_at: DateTime<Utc>,
    ) -> Self {
        let wpm = engine.wpm(duration_seconds / 60.0) as f64;
        let accuracy = engine.accuracy();
        Self {
            user_id: user.id,
            drill_id: drill.id,
            tier: drill.tier,
            wpm,
            accuracy,
            strict_accuracy: scoring::strict_accuracy(&drill.body, typed),
            typed_chars: typed.chars().count(),
            duration_seconds,
            started_at,
            score: scoring::session_score(wpm, accuracy),
        }
    }

    /// Characters-based speed (5 chars per word), for the result screen.
    pub fn char_wpm(&self) -> f64 {
        scoring::char_wpm(self.typed_chars, self.duration_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::input::apply_input;

    fn user() -> UserContext {
        UserContext {
            id: UserId(3),
            name: "ada".to_string(),
        }
    }

    fn drill(body: &str) -> Drill {
        Drill {
            id: DrillId(21),
            title: "Numbers".to_string(),
            body: body.to_string(),
            tier: Tier::new(2).unwrap(),
        }
    }

    #[test]
    fn test_record_from_clean_attempt() {
        let drill = drill("hello world");
        let mut engine = MetricsEngine::new(&drill.body);
        apply_input(&mut engine, "hello world");

        let record = SessionRecord::from_attempt(&user(), &drill, &engine, "hello world", 30.0, Utc::now());
        assert_eq!(record.user_id, UserId(3));
        assert_eq!(record.drill_id, DrillId(21));
        assert_eq!(record.tier.get(), 2);
        assert_eq!(record.wpm, 4.0);
        assert_eq!(record.accuracy, 100.0);
        assert_eq!(record.strict_accuracy, 100.0);
        assert_eq!(record.typed_chars, 11);
        assert_eq!(record.score, 400.0);
    }

    #[test]
    fn test_live_and_strict_accuracy_can_diverge() {
        let drill = drill("abcd");
        let mut engine = MetricsEngine::new(&drill.body);
        apply_input(&mut engine, "x");
        apply_input(&mut engine, "");
        apply_input(&mut engine, "abcd");

        let record = SessionRecord::from_attempt(&user(), &drill, &engine, "abcd", 60.0, Utc::now());
        assert!((record.accuracy - 80.0).abs() < f64::EPSILON);
        assert_eq!(record.strict_accuracy, 100.0);
    }

    #[test]
    fn test_record_serde_defaults_missing_strict_accuracy() {
        let json = r#"{
            "user_id": 1, "drill_id": 11, "tier": 1, "wpm": 30.0, "accuracy": 95.0,
            "typed_chars": 25, "duration_seconds": 12.5,
            "started_at": "2025-09-18T10:00:00Z", "score": 2850.0
        }"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.strict_accuracy, 0.0);
        assert_eq!(record.tier, Tier::FIRST);
    }
}
