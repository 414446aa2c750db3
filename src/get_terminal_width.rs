//! Query the terminal width, for clap's help formatting.

use terminal_size::{terminal_size, Width};

/// Best guess for the current terminal width; a conservative default
/// when stdout is not a terminal.
pub fn get_terminal_width() -> usize {
    if let Some((Width(width), _height)) = terminal_size() {
        width.into()
    } else {
        100
    }
}
