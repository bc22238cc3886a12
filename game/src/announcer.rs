use std::process::Command;
use std::thread;

/// Voice collaborator. Implementations must not block gameplay and must
/// swallow their own failures; the session never learns whether it spoke.
pub trait Announcer: Send + Sync {
    fn announce(&self, text: &str);
}

/// Discards announcements (headless tests, muted sessions).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnnouncer;

impl Announcer for NullAnnouncer {
    fn announce(&self, _text: &str) {}
}

/// Speaks through an external TTS command (`espeak`-style: one argument, the
/// text). The child is reaped off-thread; spawn errors are logged and
/// swallowed.
#[derive(Debug, Clone)]
pub struct CommandAnnouncer {
    program: String,
}

impl CommandAnnouncer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Announcer for CommandAnnouncer {
    fn announce(&self, text: &str) {
        match Command::new(&self.program).arg(text).spawn() {
            Ok(mut child) => {
                thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(err) => {
                tracing::warn!(program = %self.program, %err, "announcement failed");
            }
        }
    }
}
