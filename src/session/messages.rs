use rand::seq::SliceRandom;
use rand::Rng;

pub const GREETING: &str = "Hello! If you feel panic, press 's' to start.";

pub const CALMING_MESSAGES: [&str; 12] = [
    "This feeling is temporary.",
    "You are safe right now.",
    "Focus on your breathing.",
    "You are not alone.",
    "This too shall pass.",
    "You are stronger than you think.",
    "Take it one moment at a time.",
    "You are doing great.",
    "Breathe in... Breathe out...",
    "You are in control.",
    "You can handle this.",
    "Take a deep breath, it will pass.",
];

/// Uniformly pick one calming message.
pub fn pick_message<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CALMING_MESSAGES
        .choose(rng)
        .copied()
        .unwrap_or(CALMING_MESSAGES[0])
}
