/// Line matching helpers.
pub mod buf;
/// A scripted terminal provider.
pub mod terminal;

pub use buf::{LineTest, assert_lines, screen_text};
pub use terminal::ScriptedTerminal;
