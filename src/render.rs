//! Output rendering for the chat shell.
//!
//! This module provides a trait-based rendering abstraction so the shell
//! logic does not care whether output is styled, plain, or captured.  The
//! default implementation uses ANSI escape codes for role labels and
//! timestamp captions.

use std::io::{self, Stdout, Write};

use crate::types::{ChatMessage, Role};

/// ANSI escape code for dim text (used for captions and the thinking line).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for the banner).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for user labels).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for assistant labels).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (used for warnings).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code that erases the current line.
const ANSI_CLEAR_LINE: &str = "\x1b[2K\r";

/// Trait for rendering chat output.
pub trait Renderer {
    /// Print the title shown when the shell starts.
    fn print_banner(&mut self, title: &str, subtitle: &str);

    /// Print one transcript message with its role label and timestamp.
    fn print_message(&mut self, message: &ChatMessage);

    /// Print a finished exchange as two bubbles, user first.
    fn print_exchange(&mut self, user: &ChatMessage, assistant: &ChatMessage) {
        self.print_message(user);
        self.print_message(assistant);
    }

    /// Called right before a gateway call starts.
    fn start_thinking(&mut self);

    /// Called when the gateway call has returned.
    fn finish_thinking(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print a warning, such as the closed config gate.
    fn print_warning(&mut self, warning: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write = Stdout> {
    out: W,
    use_color: bool,
    thinking: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer on stdout with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl<W: Write> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            thinking: false,
        }
    }

    /// Consumes the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn style(&self, code: &'static str) -> &'static str {
        if self.use_color { code } else { "" }
    }

    fn write(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn line(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }

    fn label(role: Role) -> &'static str {
        match role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }

    fn role_color(&self, role: Role) -> &'static str {
        match role {
            Role::User => self.style(ANSI_CYAN),
            Role::Assistant => self.style(ANSI_GREEN),
            Role::System => self.style(ANSI_YELLOW),
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Renderer for PlainTextRenderer<W> {
    fn print_banner(&mut self, title: &str, subtitle: &str) {
        let (bold, dim, reset) = (
            self.style(ANSI_BOLD),
            self.style(ANSI_DIM),
            self.style(ANSI_RESET),
        );
        self.line(&format!("{bold}{title}{reset}"));
        self.line(&format!("{dim}{subtitle}{reset}"));
        self.line("");
    }

    fn print_message(&mut self, message: &ChatMessage) {
        let color = self.role_color(message.role);
        let (bold, dim, reset) = (
            self.style(ANSI_BOLD),
            self.style(ANSI_DIM),
            self.style(ANSI_RESET),
        );
        let label = Self::label(message.role);
        self.line(&format!("{bold}{color}[{label}]{reset}"));
        for line in message.content.lines() {
            self.line(&format!("  {line}"));
        }
        self.line(&format!("  {dim}{}{reset}", message.timestamp));
        self.line("");
    }

    fn start_thinking(&mut self) {
        let (dim, reset) = (self.style(ANSI_DIM), self.style(ANSI_RESET));
        self.write(&format!("{dim}Thinking...{reset}"));
        self.thinking = true;
    }

    fn finish_thinking(&mut self) {
        if !self.thinking {
            return;
        }
        self.thinking = false;
        if self.use_color {
            self.write(ANSI_CLEAR_LINE);
        } else {
            self.write("\n");
        }
    }

    fn print_error(&mut self, error: &str) {
        self.finish_thinking();
        let (red, reset) = (self.style(ANSI_RED), self.style(ANSI_RESET));
        self.line(&format!("{red}Error: {error}{reset}"));
    }

    fn print_warning(&mut self, warning: &str) {
        self.finish_thinking();
        let (yellow, reset) = (self.style(ANSI_YELLOW), self.style(ANSI_RESET));
        self.line(&format!("{yellow}Warning: {warning}{reset}"));
    }

    fn print_info(&mut self, info: &str) {
        self.finish_thinking();
        self.line(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> PlainTextRenderer<Vec<u8>> {
        PlainTextRenderer::with_writer(Vec::new(), false)
    }

    fn output(renderer: PlainTextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn message_bubble_has_label_and_caption() {
        let mut renderer = plain();
        renderer.print_message(&ChatMessage::assistant("Hi there!\nHow can I help?", "10:00:02"));
        assert_eq!(
            output(renderer),
            "[Assistant]\n  Hi there!\n  How can I help?\n  10:00:02\n\n"
        );
    }

    #[test]
    fn exchange_shows_both_captions() {
        let mut renderer = plain();
        renderer.print_exchange(
            &ChatMessage::user("Hello", "10:00:00"),
            &ChatMessage::assistant("Hi there!", "10:00:02"),
        );
        assert_eq!(
            output(renderer),
            "[You]\n  Hello\n  10:00:00\n\n[Assistant]\n  Hi there!\n  10:00:02\n\n"
        );
    }

    #[test]
    fn plain_output_has_no_escapes() {
        let mut renderer = plain();
        renderer.print_banner("AI Chat Assistant", "subtitle");
        renderer.print_message(&ChatMessage::user("Hello", "10:00:00"));
        renderer.print_warning("not configured");
        renderer.print_error("boom");
        assert!(!output(renderer).contains('\x1b'));
    }

    #[test]
    fn colored_labels() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), true);
        renderer.print_message(&ChatMessage::user("Hello", "10:00:00"));
        let text = output(renderer);
        assert!(text.contains(ANSI_CYAN));
        assert!(text.contains("[You]"));
    }

    #[test]
    fn thinking_line_is_closed() {
        let mut renderer = plain();
        renderer.start_thinking();
        renderer.finish_thinking();
        renderer.finish_thinking();
        assert_eq!(output(renderer), "Thinking...\n");
    }

    #[test]
    fn error_closes_thinking_line() {
        let mut renderer = plain();
        renderer.start_thinking();
        renderer.print_error("offline");
        assert_eq!(output(renderer), "Thinking...\nError: offline\n");
    }
}
