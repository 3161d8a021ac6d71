//! Status lines around the result table
//!
//! Notices go to stdout, warnings to stderr so that `--json` output stays
//! parseable. `NO_COLOR` switches to plain labels.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Done,
    Note,
    Caution,
}

impl Tone {
    fn plain_label(self) -> &'static str {
        match self {
            Tone::Done => "Done:",
            Tone::Note => "Note:",
            Tone::Caution => "Warning:",
        }
    }

    fn colored_label(self) -> &'static str {
        match self {
            Tone::Done => "\x1b[32m✓\x1b[0m",
            Tone::Note => "\x1b[36m›\x1b[0m",
            Tone::Caution => "\x1b[33m!\x1b[0m",
        }
    }
}

fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn line(tone: Tone, message: &str, color: bool) -> String {
    let label = if color {
        tone.colored_label()
    } else {
        tone.plain_label()
    };
    format!("{label} {message}")
}

pub fn print_success(message: &str) {
    println!("{}", line(Tone::Done, message, color_enabled()));
}

pub fn print_info(message: &str) {
    println!("{}", line(Tone::Note, message, color_enabled()));
}

pub fn print_warning(message: &str) {
    eprintln!("{}", line(Tone::Caution, message, color_enabled()));
}

/// One `id  name` row of a name directory listing.
pub fn print_key_value(key: &str, value: &str) {
    if color_enabled() {
        println!("\x1b[2m{key:>6}\x1b[0m  {value}");
    } else {
        println!("{key:>6}  {value}");
    }
}
