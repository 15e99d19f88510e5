use std::io::Write;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::cursor::MoveUp;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};

use super::Output;

/// Glyph set and redraw strategy, decided once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinnerStyle {
    pub charset: &'static [char],
    /// Whether the terminal understands cursor-reposition escapes. Without
    /// them frames are redrawn in place with a carriage return.
    pub cursor_escapes: bool,
}

impl SpinnerStyle {
    pub const BRAILLE: Self = Self {
        charset: &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'],
        cursor_escapes: true,
    };

    pub const ASCII: Self = Self {
        charset: &['|', '/', '-', '\\'],
        cursor_escapes: false,
    };

    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::ASCII
        } else {
            Self::BRAILLE
        }
    }
}

/// A terminal animation running on its own thread.
///
/// Stopping prints the bare message once, so the last line left on screen
/// is stable. Dropping a running spinner stops it.
pub struct Spinner {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub const INTERVAL: Duration = Duration::from_millis(200);

    pub fn start(message: impl Into<String>, style: SpinnerStyle, out: Output) -> Self {
        Self::with_interval(message, style, out, Self::INTERVAL)
    }

    pub fn with_interval(
        message: impl Into<String>,
        style: SpinnerStyle,
        out: Output,
        interval: Duration,
    ) -> Self {
        let message = message.into();
        let (tx, rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            let mut frames = style.charset.iter().cycle();
            loop {
                if let Some(glyph) = frames.next() {
                    draw_frame(&out, &message, *glyph, style.cursor_escapes);
                }
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            draw_final(&out, &message, style.cursor_escapes);
        });

        Self {
            stop: Some(tx),
            handle: Some(handle),
        }
    }

    /// Stop the animation and wait for the final message to be written.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop.take() {
            // The thread may already be gone; either way it has stopped drawing.
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Replace the last frame with the bare message, leaving no glyph behind.
fn draw_final(out: &Output, message: &str, cursor_escapes: bool) {
    let mut frame: Vec<u8> = Vec::new();
    let queued = if cursor_escapes {
        queue!(
            frame,
            Clear(ClearType::CurrentLine),
            Print(format!("\r{message}\n"))
        )
    } else {
        // No escapes: blank out "<message> <glyph>" by hand.
        let blank = " ".repeat(message.chars().count() + 2);
        queue!(frame, Print(format!("\r{blank}\r{message}\n")))
    };
    if queued.is_err() {
        return;
    }

    if let Ok(mut w) = out.lock() {
        let _ = w.write_all(&frame);
        let _ = w.flush();
    }
}

fn draw_frame(out: &Output, message: &str, glyph: char, cursor_escapes: bool) {
    let mut frame: Vec<u8> = Vec::new();
    let queued = if cursor_escapes {
        queue!(frame, Print(format!("{message} {glyph}\n")), MoveUp(1))
    } else {
        queue!(frame, Print(format!("\r{message} {glyph}")))
    };
    if queued.is_err() {
        return;
    }

    if let Ok(mut w) = out.lock() {
        let _ = w.write_all(&frame);
        let _ = w.flush();
    }
}
