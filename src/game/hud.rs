/// Label of the pause button while the game is running
pub const PAUSE_LABEL: &str = "Pause";
/// Label of the pause button while the game is paused
pub const RESUME_LABEL: &str = "Resume";

/// Text the game keeps up to date for display next to the board
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hud {
    pub score: u32,
    pub high_score: u32,
    pub game_over_visible: bool,
    pub final_score: u32,
    pub new_record: bool,
    pub paused: bool,
}

impl Hud {
    pub fn new(high_score: u32) -> Self {
        Self {
            high_score,
            ..Default::default()
        }
    }

    pub fn pause_label(&self) -> &'static str {
        if self.paused {
            RESUME_LABEL
        } else {
            PAUSE_LABEL
        }
    }

    /// Clear everything tied to a single round, keeping the high score
    pub fn clear_round(&mut self) {
        *self = Self::new(self.high_score);
    }

    /// Show the game-over panel and settle the high score.
    ///
    /// Returns true if `final_score` beat the previous high score.
    pub fn on_game_over(&mut self, final_score: u32) -> bool {
        self.paused = false;
        self.final_score = final_score;
        self.game_over_visible = true;
        self.new_record = final_score > self.high_score;
        if self.new_record {
            self.high_score = final_score;
        }
        self.new_record
    }
}
