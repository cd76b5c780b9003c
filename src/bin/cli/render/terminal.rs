/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";
    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const BLUE: &'static str = "\x1b[34m";
    pub const MAGENTA: &'static str = "\x1b[35m";
    pub const CYAN: &'static str = "\x1b[36m";
}

const SUBJECT_PALETTE: [&str; 6] = [
    Color::CYAN,
    Color::GREEN,
    Color::YELLOW,
    Color::MAGENTA,
    Color::BLUE,
    Color::RED,
];

/// Wrap `text` in `color` when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Stable color per subject label, so a label looks the same on every line
pub fn subject_color(label: &str) -> &'static str {
    let sum: usize = label.bytes().map(usize::from).sum();
    SUBJECT_PALETTE[sum % SUBJECT_PALETTE.len()]
}

/// `[Subject]` tag, colored per subject
pub fn subject_tag(label: &str, use_color: bool) -> String {
    paint(&format!("[{}]", label), subject_color(label), use_color)
}
