//! Static instructional content shown from the home and counter screens.

pub const GUIDE_TITLE: &str = "Steps to count fetal kicks";

pub const GUIDE_STEPS: &[&str] = &[
    "Choose a time when you are least distracted or when you typically feel the fetus move.",
    "Get comfortable. Lie on your left side or sit with your feet propped up.",
    "Place your hands on your belly.",
    "Start a timer or watch the clock.",
    "Count each kick. Keep counting until you get to 10 kicks / flutters / swishes / rolls.",
    "Once you reach 10 kicks, jot down how many minutes it took.",
];

pub const LOW_KICKS_TITLE: &str = "Not Getting Enough Kicks?";

pub const LOW_KICKS_TIPS: &[&str] = &[
    "Having a cold drink or snack",
    "Lying on your left side",
    "Gently poking your belly",
    "Playing music",
];

pub const LOW_KICKS_CLOSING: &str =
    "If you're still concerned, contact your healthcare provider immediately.";

/// The numbered steps as plain lines.
pub fn steps() -> Vec<String> {
    GUIDE_STEPS
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect()
}

/// Advice for when movements feel sparse.
pub fn low_kicks_advice() -> Vec<String> {
    let mut lines = vec!["If you're not feeling enough movements, try:".to_string()];
    lines.extend(LOW_KICKS_TIPS.iter().map(|tip| format!("  • {}", tip)));
    lines.push(String::new());
    lines.push(LOW_KICKS_CLOSING.to_string());
    lines
}

/// Full guide text for the `guide` command.
pub fn render() -> String {
    let mut out = String::new();
    out.push_str(GUIDE_TITLE);
    out.push('\n');
    for line in steps() {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str("What if I am not getting enough kicks?\n");
    for line in low_kicks_advice() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
