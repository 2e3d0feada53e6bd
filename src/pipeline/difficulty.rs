use crate::model::Difficulty;

/// Totals above this many minutes are `Hard`
pub const HARD_ABOVE_MINUTES: i64 = 60;
/// Totals below this many minutes are `Easy`
pub const EASY_BELOW_MINUTES: i64 = 30;

/// Map a total preparation time in minutes to a difficulty tier.
///
/// `30..=60` is `Medium`, both ends included. Negative totals cannot come out
/// of the duration parser and fall through to `Unknown`.
pub fn classify(total_minutes: i64) -> Difficulty {
    match total_minutes {
        t if t > HARD_ABOVE_MINUTES => Difficulty::Hard,
        t if t >= EASY_BELOW_MINUTES => Difficulty::Medium,
        t if t >= 0 => Difficulty::Easy,
        _ => Difficulty::Unknown,
    }
}
