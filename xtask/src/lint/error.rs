use thiserror::Error;

pub type Result<T> = std::result::Result<T, LintError>;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("Required command '{command}' not found. {hint}")]
    MissingCommand { command: String, hint: String },

    #[error("One or more checks failed")]
    ChecksFailed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fails unless `command --version` runs.
pub async fn require_command(command: &str, hint: &str) -> Result<()> {
    let found = tokio::process::Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false);

    if found {
        Ok(())
    } else {
        Err(LintError::MissingCommand {
            command: command.to_string(),
            hint: hint.to_string(),
        })
    }
}
