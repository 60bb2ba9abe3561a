use std::process::Command;

use crate::error::AppError;

// =============================================================================
// MessageChannel - the outbound text seam
// =============================================================================

/// One outbound text channel. Actual transport (iMessage, SMS gateway) is
/// an external collaborator; implementations here either print or hand the
/// message to a configured command.
pub trait MessageChannel {
    fn name(&self) -> &'static str;

    /// Deliver one message. Failures are per-recipient; callers keep going.
    fn send(&self, recipient: &str, text: &str) -> Result<(), AppError>;
}

/// Prints messages to stdout. The default, and what `--dry-run` uses.
pub struct ConsoleChannel;

impl MessageChannel for ConsoleChannel {
    fn name(&self) -> &'static str {
        "console"
    }

    fn send(&self, recipient: &str, text: &str) -> Result<(), AppError> {
        println!("-> {recipient}\n{text}\n");
        Ok(())
    }
}

/// Spawns a configured argv per message, substituting `{recipient}` and
/// `{message}` in each argument. Mirrors handing the text to an `imsg`
/// style sender.
pub struct CommandChannel {
    argv: Vec<String>,
}

impl CommandChannel {
    pub fn new(argv: Vec<String>) -> Result<Self, AppError> {
        if argv.is_empty() {
            return Err(AppError::Config("message_command cannot be empty".into()));
        }
        Ok(Self { argv })
    }
}

impl MessageChannel for CommandChannel {
    fn name(&self) -> &'static str {
        "command"
    }

    fn send(&self, recipient: &str, text: &str) -> Result<(), AppError> {
        let args: Vec<String> = self.argv[1..]
            .iter()
            .map(|a| a.replace("{recipient}", recipient).replace("{message}", text))
            .collect();

        let status = Command::new(&self.argv[0])
            .args(&args)
            .status()
            .map_err(|e| AppError::ProcessSpawn(format!("{}: {e}", self.argv[0])))?;

        if !status.success() {
            return Err(AppError::Delivery(format!(
                "{} exited with {status} for {recipient}",
                self.argv[0]
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Records sends, failing for recipients in the deny list.
    #[derive(Default)]
    pub struct RecordingChannel {
        pub sent: Mutex<Vec<(String, String)>>,
        pub fail_for: Vec<String>,
    }

    impl MessageChannel for RecordingChannel {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn send(&self, recipient: &str, text: &str) -> Result<(), AppError> {
            if self.fail_for.iter().any(|f| f == recipient) {
                return Err(AppError::Delivery(format!("refused for {recipient}")));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), text.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandChannel::new(vec![]).is_err());
    }

    #[test]
    fn test_command_channel_substitutes_and_runs() {
        // `true` ignores its arguments and exits 0 everywhere tests run
        let channel =
            CommandChannel::new(vec!["true".into(), "{recipient}".into(), "{message}".into()])
                .unwrap();
        channel.send("+15550100", "hello").unwrap();
    }

    #[test]
    fn test_command_channel_reports_failure() {
        let channel = CommandChannel::new(vec!["false".into()]).unwrap();
        let err = channel.send("+15550100", "hello").unwrap_err();
        assert_eq!(err.kind(), "delivery");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let channel =
            CommandChannel::new(vec!["homebase-definitely-missing-bin".into()]).unwrap();
        let err = channel.send("x", "y").unwrap_err();
        assert_eq!(err.kind(), "process_spawn");
    }
}
