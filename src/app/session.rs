use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::{
    cursor, event, execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use crate::handoff::Handoff;

use super::keys::{from_key_event, Key, KeySource};

/// How long a key wait sleeps before re-checking the signal flag.
const SIGNAL_CHECK: Duration = Duration::from_millis(250);

/// Where the console loop gets keys from and draws to.
pub trait Session: KeySource {
    type Out: Write;

    /// Terminal size as (columns, rows).
    fn size(&self) -> io::Result<(u16, u16)>;

    fn out(&mut self) -> &mut Self::Out;

    /// Run `handoff` with the terminal given back to the operator, then resume.
    fn handoff(&mut self, handoff: &Handoff) -> io::Result<()>;
}

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Raw mode + alternate screen + hidden cursor for as long as it lives.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Flags raised by signal handlers. SIGINT is kept apart from SIGTERM and
/// SIGHUP so a Ctrl-C aimed at a handed-off program can be forgotten.
#[derive(Clone, Debug, Default)]
pub struct QuitSignals {
    interrupt: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
}

impl QuitSignals {
    /// Flag for SIGINT.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Flag for SIGTERM and SIGHUP. Never cleared.
    pub fn terminate_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate)
    }

    pub fn raised(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed) || self.terminate.load(Ordering::Relaxed)
    }

    /// Drop a pending SIGINT. Termination requests stay raised.
    pub fn forgive_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }
}

/// The interactive terminal.
pub struct TtySession {
    stdout: Stdout,
    signals: QuitSignals,
}

impl TtySession {
    pub fn new(signals: QuitSignals) -> Self {
        Self { stdout: io::stdout(), signals }
    }

    /// Block until any key press (used after a handoff).
    fn wait_any_key(&mut self) -> io::Result<()> {
        loop {
            if self.signals.raised() {
                return Ok(());
            }
            if event::poll(SIGNAL_CHECK)? {
                if let event::Event::Key(k) = event::read()? {
                    if from_key_event(k).is_some() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl KeySource for TtySession {
    fn next_key(&mut self) -> io::Result<Key> {
        loop {
            if self.signals.raised() {
                return Ok(Key::Interrupted);
            }
            if !event::poll(SIGNAL_CHECK)? {
                continue;
            }
            if let event::Event::Key(k) = event::read()? {
                if let Some(key) = from_key_event(k) {
                    return Ok(key);
                }
            }
        }
    }
}

impl Session for TtySession {
    type Out = Stdout;

    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn out(&mut self) -> &mut Stdout {
        &mut self.stdout
    }

    fn handoff(&mut self, handoff: &Handoff) -> io::Result<()> {
        execute!(self.stdout, cursor::Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        let status = handoff.run();
        // A Ctrl-C typed into the handed-off program was meant for it.
        self.signals.forgive_interrupt();
        match &status {
            Ok(s) if !s.success() => tracing::warn!(command = %handoff, status = %s, "handoff exited"),
            Err(e) => tracing::warn!(command = %handoff, error = %e, "handoff failed to start"),
            Ok(_) => {}
        }
        write!(self.stdout, "\r\n-- press any key to return --")?;
        self.stdout.flush()?;

        enable_raw_mode()?;
        self.wait_any_key()?;
        execute!(self.stdout, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        status.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forgiving_an_interrupt_keeps_termination() {
        let signals = QuitSignals::default();
        signals.terminate_flag().store(true, Ordering::Relaxed);
        signals.interrupt_flag().store(true, Ordering::Relaxed);
        signals.forgive_interrupt();
        assert!(signals.raised());
    }

    #[test]
    fn forgiven_interrupt_is_cleared() {
        let signals = QuitSignals::default();
        assert!(!signals.raised());
        signals.interrupt_flag().store(true, Ordering::Relaxed);
        assert!(signals.raised());
        signals.forgive_interrupt();
        assert!(!signals.raised());
    }
}
