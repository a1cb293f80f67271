//! Line-oriented config directives.
//!
//! A directive line is `<command> [args...]`; blank lines and lines whose
//! first non-whitespace character is `#` are ignored. Modules register
//! handlers for their own directives and parse their own config files
//! through the capability table; the console feeds typed lines through the
//! same dispatch.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

/// Handler invoked with the argument remainder of a directive line.
pub type DirectiveHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// What became of a dispatched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveOutcome {
    /// A registered handler ran.
    Handled,
    /// No handler is registered for the command.
    Unknown,
    /// Blank or comment line; nothing to do.
    Ignored,
}

/// Registry of named directive handlers.
#[derive(Default)]
pub struct DirectiveRegistry {
    handlers: RwLock<HashMap<String, DirectiveHandler>>,
}

impl DirectiveRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `command`. Registering the same command again
    /// replaces the previous handler.
    pub fn register(&self, command: impl Into<String>, handler: DirectiveHandler) {
        self.handlers.write().insert(command.into(), handler);
    }

    /// Parse one line and run the matching handler.
    pub fn dispatch_line(&self, line: &str) -> DirectiveOutcome {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return DirectiveOutcome::Ignored;
        }

        let (command, args) = match line.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (line, ""),
        };

        let handler = self.handlers.read().get(command).map(Arc::clone);
        match handler {
            Some(handler) => {
                handler(args);
                DirectiveOutcome::Handled
            }
            None => {
                tracing::debug!(command, "unknown directive");
                DirectiveOutcome::Unknown
            }
        }
    }

    /// Dispatch every line of the file at `path`.
    ///
    /// A missing file is not an error; config files are optional.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures other than the file not existing.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };

        for line in content.lines() {
            self.dispatch_line(line);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording(seen: &Arc<Mutex<Vec<String>>>) -> DirectiveHandler {
        let seen = Arc::clone(seen);
        Arc::new(move |args| seen.lock().push(args.to_string()))
    }

    #[test]
    fn should_pass_argument_remainder_to_handler() {
        let registry = DirectiveRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        registry.register("load_module", recording(&seen));

        let outcome = registry.dispatch_line("load_module lights");
        assert_eq!(outcome, DirectiveOutcome::Handled);
        assert_eq!(seen.lock().as_slice(), ["lights".to_string()]);
    }

    #[test]
    fn should_pass_empty_args_for_bare_command() {
        let registry = DirectiveRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        registry.register("quit", recording(&seen));

        registry.dispatch_line("quit");
        assert_eq!(seen.lock().as_slice(), [String::new()]);
    }

    #[test]
    fn should_ignore_comments_and_blank_lines() {
        let registry = DirectiveRegistry::new();
        assert_eq!(registry.dispatch_line("# a comment"), DirectiveOutcome::Ignored);
        assert_eq!(registry.dispatch_line("   "), DirectiveOutcome::Ignored);
        assert_eq!(registry.dispatch_line(""), DirectiveOutcome::Ignored);
    }

    #[test]
    fn should_report_unknown_command() {
        let registry = DirectiveRegistry::new();
        assert_eq!(registry.dispatch_line("mystery 1 2 3"), DirectiveOutcome::Unknown);
    }

    #[test]
    fn should_replace_handler_on_re_registration() {
        let registry = DirectiveRegistry::new();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        registry.register("mqtt_server", recording(&first));
        registry.register("mqtt_server", recording(&second));

        registry.dispatch_line("mqtt_server 192.168.1.10");
        assert!(first.lock().is_empty());
        assert_eq!(second.lock().as_slice(), ["192.168.1.10".to_string()]);
    }

    #[test]
    fn should_trim_whitespace_around_command_and_args() {
        let registry = DirectiveRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        registry.register("webapi_port", recording(&seen));

        registry.dispatch_line("  webapi_port   8080  ");
        assert_eq!(seen.lock().as_slice(), ["8080".to_string()]);
    }

    #[test]
    fn should_treat_missing_file_as_empty() {
        let registry = DirectiveRegistry::new();
        assert!(registry.parse_file("definitely/not/here.conf").is_ok());
    }

    #[test]
    fn should_dispatch_every_line_of_a_file() {
        let registry = DirectiveRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        registry.register("alarm_light", recording(&seen));

        let path = std::env::temp_dir().join(format!("smarthub-directives-{}.conf", std::process::id()));
        std::fs::write(&path, "# lights wired to the alarm\nalarm_light bedroom\nalarm_light hallway\n").unwrap();
        registry.parse_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            seen.lock().as_slice(),
            ["bedroom".to_string(), "hallway".to_string()]
        );
    }
}
