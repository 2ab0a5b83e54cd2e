//! External trainer invocation.
//!
//! Training happens in a separate process. The command line is a template
//! whose arguments may contain `{config}`, `{output}`, `{train}` and
//! `{valid}` placeholders.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

const DEFAULT_COMMAND: &str =
    "doccat-textcat train {config} --output {output} --paths.train {train} --paths.dev {valid}";

/// Paths substituted into the trainer command line.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPaths {
    pub config: PathBuf,
    pub output: PathBuf,
    pub train: PathBuf,
    pub valid: PathBuf,
}

/// The external trainer command line.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for TrainerCommand {
    fn default() -> Self {
        // The default template is non-empty.
        Self::parse(DEFAULT_COMMAND).unwrap_or_else(|| Self {
            program: "doccat-textcat".into(),
            args: Vec::new(),
            working_dir: None,
        })
    }
}

impl TrainerCommand {
    /// Split a whitespace-separated command line; `None` when it is blank.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            working_dir: None,
        })
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Arguments with placeholders filled in.
    pub fn expand_args(&self, paths: &TrainingPaths) -> Vec<String> {
        let fill = |p: &Path| p.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{config}", &fill(&paths.config))
                    .replace("{output}", &fill(&paths.output))
                    .replace("{train}", &fill(&paths.train))
                    .replace("{valid}", &fill(&paths.valid))
            })
            .collect()
    }

    pub fn build(&self, paths: &TrainingPaths) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.expand_args(paths));
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run the trainer and block until it exits.
    pub fn run(&self, paths: &TrainingPaths) -> Result<()> {
        let args = self.expand_args(paths);
        info!(program = %self.program, args = ?args, "launching trainer");

        let status = self
            .build(paths)
            .status()
            .with_context(|| format!("failed to execute trainer {:?}", self.program))?;

        if !status.success() {
            bail!("trainer failed with exit code: {:?}", status.code());
        }

        info!("trainer finished");
        Ok(())
    }
}

impl std::fmt::Display for TrainerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> TrainingPaths {
        TrainingPaths {
            config: "config.cfg".into(),
            output: "out".into(),
            train: "data/train.docs".into(),
            valid: "data/valid.docs".into(),
        }
    }

    #[test]
    fn parse_splits_program_and_args() {
        let cmd = TrainerCommand::parse("  trainer  fit {config} ").unwrap();
        assert_eq!(cmd.program, "trainer");
        assert_eq!(cmd.args, vec!["fit", "{config}"]);
        assert!(TrainerCommand::parse("   ").is_none());
    }

    #[test]
    fn default_command_uses_all_placeholders() {
        let cmd = TrainerCommand::default();
        assert_eq!(cmd.to_string(), DEFAULT_COMMAND);
        let args = cmd.expand_args(&paths());
        assert_eq!(
            args,
            vec![
                "train",
                "config.cfg",
                "--output",
                "out",
                "--paths.train",
                "data/train.docs",
                "--paths.dev",
                "data/valid.docs",
            ]
        );
    }

    #[test]
    fn placeholders_expand_inside_args() {
        let cmd = TrainerCommand::parse("t --out={output}/model").unwrap();
        assert_eq!(cmd.expand_args(&paths()), vec!["--out=out/model"]);
    }

    #[test]
    fn missing_program_is_an_error() {
        let cmd = TrainerCommand::parse("definitely-not-a-real-trainer-binary").unwrap();
        let err = cmd.run(&paths()).unwrap_err();
        assert!(err.to_string().contains("failed to execute trainer"));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_an_error() {
        let cmd = TrainerCommand {
            program: "sh".into(),
            args: vec!["-c".into(), "exit 3".into()],
            working_dir: None,
        };
        let err = cmd.run(&paths()).unwrap_err();
        assert!(err.to_string().contains("Some(3)"));
    }
}
