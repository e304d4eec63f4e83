//! Score and countdown state for one play session

use crate::config::GameConfig;

/// Score keeping and the game clock
///
/// The clock counts down from the configured start time. Deliveries push it
/// back up; running out ends the session as a loss.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    score: f32,
    time_remaining: f32,
    elapsed: f64,
    game_over: bool,
    time_bonus_per_second: f32,
}

impl GameSession {
    /// Start a session with a full clock
    pub fn new(config: &GameConfig) -> Self {
        Self {
            score: 0.0,
            time_remaining: config.start_time,
            elapsed: 0.0,
            game_over: false,
            time_bonus_per_second: config.time_bonus_per_second,
        }
    }

    /// Add points to the running score
    pub fn report_score(&mut self, points: f32) {
        self.score += points;
    }

    /// Put seconds back on the clock
    pub fn increase_time(&mut self, seconds: f32) {
        self.time_remaining += seconds;
    }

    /// Take seconds off the clock; ends the session when it runs out
    pub fn decrease_time(&mut self, seconds: f32) {
        self.time_remaining -= seconds;
        if self.time_remaining <= 0.0 {
            self.time_remaining = 0.0;
            self.game_over = true;
        }
    }

    /// Advance the session clock by one frame
    pub fn advance(&mut self, delta_time: f32) {
        if self.game_over {
            return;
        }
        self.elapsed += f64::from(delta_time);
        self.decrease_time(delta_time);
    }

    /// End the session early, e.g. after the last delivery
    pub fn finish(&mut self) {
        self.game_over = true;
    }

    /// Points earned so far
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Seconds left on the clock
    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    /// Seconds simulated so far
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Whether the session has ended
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Ended with time to spare
    pub fn is_won(&self) -> bool {
        self.game_over && self.time_remaining > 0.0
    }

    /// Score including the bonus for unused time on a win
    pub fn final_score(&self) -> f32 {
        if self.is_won() {
            self.score + self.time_remaining * self.time_bonus_per_second
        } else {
            self.score
        }
    }
}
