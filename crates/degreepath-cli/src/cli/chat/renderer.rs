//! Terminal rendering for tutor replies.
//!
//! During streaming, fragments are printed raw as they arrive; once a
//! turn finishes the committed answer is re-rendered as formatted
//! markdown (the tutor's fallback answers lean on `**bold**` headings).

use std::io::Write;

use termimad::MadSkin;

/// Terminal markdown renderer.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    /// Print one streaming fragment without buffering.
    pub fn print_streaming_token(&self, token: &str) {
        print!("{token}");
        let _ = std::io::stdout().flush();
    }

    /// Render a committed reply as formatted markdown.
    pub fn render_final(&self, markdown: &str) -> String {
        format!("{}", self.skin.term_text(markdown))
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}
