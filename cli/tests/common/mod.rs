#![allow(dead_code)]
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn pmcuke_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pmcuke"));
    cmd.env_remove("PMCUKE_FEATURES_DIR")
        .env_remove("PMCUKE_STEPS_FILE")
        .env_remove("PMCUKE_ENV_STORE")
        .env_remove("PMCUKE_CYPRESS_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Scratch directory holding every output location of one conversion.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn features_dir(&self) -> PathBuf {
        self.path().join("features")
    }

    pub fn steps_file(&self) -> PathBuf {
        self.path().join("steps.js")
    }

    pub fn env_store(&self) -> PathBuf {
        self.path().join("cypress.env.json")
    }

    pub fn convert(
        &self,
        collection: &Path,
        environment: Option<&Path>,
        extra_args: &[String],
    ) -> io::Result<Output> {
        let mut cmd = pmcuke_cmd();
        cmd.arg(collection);
        if let Some(environment) = environment {
            cmd.arg(environment);
        }
        cmd.arg("--features-dir")
            .arg(self.features_dir())
            .arg("--steps-file")
            .arg(self.steps_file())
            .arg("--env-store")
            .arg(self.env_store())
            .args(extra_args)
            .output()
    }
}

/// Every file below `root`, keyed by its path relative to `root`.
pub fn read_tree(root: &Path) -> io::Result<BTreeMap<PathBuf, String>> {
    let mut files = BTreeMap::new();
    collect_files(root, Path::new(""), &mut files)?;
    Ok(files)
}

fn collect_files(
    base: &Path,
    relative: &Path,
    files: &mut BTreeMap<PathBuf, String>,
) -> io::Result<()> {
    let current = base.join(relative);
    if !current.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(&current)? {
        let entry = entry?;
        let rel = relative.join(entry.file_name());
        if entry.path().is_dir() {
            collect_files(base, &rel, files)?;
        } else {
            files.insert(rel, fs::read_to_string(entry.path())?);
        }
    }
    Ok(())
}

pub fn describe_failure(output: &Output) -> String {
    format!(
        "exit code {:?}\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
