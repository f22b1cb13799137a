//! Frame-accurate video length from the question count.

use serde::Serialize;

pub const FPS: u32 = 30;

/// Phase lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConstants {
    pub intro: u32,
    pub question_display: u32,
    pub options_timer: u32,
    pub answer_reveal: u32,
    pub logo_transition: u32,
    pub outro: u32,
}

pub const TIMING: TimingConstants = TimingConstants {
    intro: 4,
    question_display: 5,
    options_timer: 8,
    answer_reveal: 2,
    logo_transition: 1,
    outro: 5,
};

impl TimingConstants {
    pub const fn per_item_seconds(&self) -> u32 {
        self.question_display + self.options_timer + self.answer_reveal + self.logo_transition
    }
}

const fn frames(seconds: u32) -> u64 {
    seconds as u64 * FPS as u64
}

/// Frames each question adds to the video.
pub const fn per_item_frames() -> u64 {
    frames(TIMING.per_item_seconds())
}

pub fn total_frames(item_count: usize) -> u64 {
    frames(TIMING.intro) + item_count as u64 * per_item_frames() + frames(TIMING.outro)
}

/// Derived length of one job's video. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePlan {
    pub item_count: usize,
    pub fps: u32,
    pub intro_frames: u64,
    pub display_frames: u64,
    pub timer_frames: u64,
    pub reveal_frames: u64,
    pub transition_frames: u64,
    pub outro_frames: u64,
    pub total_frames: u64,
}

impl TimelinePlan {
    pub fn for_items(item_count: usize) -> Self {
        let count = item_count as u64;
        Self {
            item_count,
            fps: FPS,
            intro_frames: frames(TIMING.intro),
            display_frames: count * frames(TIMING.question_display),
            timer_frames: count * frames(TIMING.options_timer),
            reveal_frames: count * frames(TIMING.answer_reveal),
            transition_frames: count * frames(TIMING.logo_transition),
            outro_frames: frames(TIMING.outro),
            total_frames: total_frames(item_count),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_frames as f64 / f64::from(self.fps)
    }
}
