//! Test fixtures shared by the aggregation tests.

use candle_client::{Candle, Position};

/// A candle carrying just an emotion.
pub fn candle_with_emotion(emotion: &str) -> Candle {
    Candle {
        id: format!("test-{}", emotion),
        position: Position::new(0.0, 0.0).unwrap(),
        emotion: Some(emotion.to_string()),
        created_at: None,
        user_timestamp: None,
        user_id: None,
    }
}

/// A candle with an emotion and a creator-local timestamp.
pub fn candle_at(emotion: &str, user_timestamp: &str) -> Candle {
    let mut candle = candle_with_emotion(emotion);
    candle.user_timestamp = Some(user_timestamp.to_string());
    candle
}
