// src/cli/completion.rs
use crate::cli::args::Cli;
use clap::CommandFactory;
use clap_complete::{
    generate,
    shells::{Bash, Fish, Zsh},
};
use std::io::{self, Write};
use tracing::{debug, instrument};

/// Writes the completion script for `shell` ("bash", "zsh" or "fish") to `out`.
///
/// ```bash
/// eval "$(linkstash completion bash)"
/// ```
#[instrument(skip(out), level = "debug")]
pub fn write_completion<W: Write>(shell: &str, out: &mut W) -> io::Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    match shell.to_lowercase().as_str() {
        "bash" => {
            debug!("Generating bash completion");
            generate(Bash, &mut cmd, bin_name, out);
            Ok(())
        }
        "zsh" => {
            debug!("Generating zsh completion");
            generate(Zsh, &mut cmd, bin_name, out);
            Ok(())
        }
        "fish" => {
            debug!("Generating fish completion");
            generate(Fish, &mut cmd, bin_name, out);
            Ok(())
        }
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Unsupported shell: {}. Supported shells: bash, zsh, fish",
                shell
            ),
        )),
    }
}

/// Generates the completion script and prints it to stdout
pub fn generate_completion(shell: &str) -> io::Result<()> {
    write_completion(shell, &mut io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bash", "complete")]
    #[case("zsh", "#compdef")]
    #[case("fish", "-c linkstash")]
    #[case("BASH", "complete")]
    fn given_supported_shell_when_write_completion_then_script_generated(
        #[case] shell: &str,
        #[case] marker: &str,
    ) {
        let mut buffer = Vec::new();

        write_completion(shell, &mut buffer).unwrap();

        let content = String::from_utf8_lossy(&buffer);
        assert!(content.contains(marker), "missing {:?} in {} script", marker, shell);
    }

    #[test]
    fn given_unknown_shell_when_write_completion_then_invalid_input() {
        let err = write_completion("tcsh", &mut Vec::new()).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("Unsupported shell"));
    }
}
