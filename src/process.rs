//! Process module.
//!
//! This module contains cross platform helpers around the
//! `std::process` crate.

use log::{debug, trace};
use std::{
    env,
    io::{self, prelude::*},
    process::{Command, Stdio},
    result, thread,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot spawn process for command {1:?}")]
    SpawnProcessError(#[source] io::Error, String),
    #[error("cannot get standard input")]
    GetStdinError,
    #[error("cannot write data to standard input")]
    WriteStdinError(#[source] io::Error),
    #[error("cannot write data to standard input: writer thread panicked")]
    JoinStdinWriterError,
    #[error("cannot wait for command {1:?}")]
    WaitCmdError(#[source] io::Error, String),
    #[error("command {0:?} exited with status {1:?}: {2}")]
    ExitStatusError(String, Option<i32>, String),
}

pub type Result<T> = result::Result<T, Error>;

/// Pipes the given input through the given command, and returns the
/// raw output. Commands separated by `|` are chained.
pub fn run(cmd: &str, input: &[u8]) -> Result<Vec<u8>> {
    let mut output = input.to_owned();

    for cmd in cmd.split('|') {
        debug!("running command: {}", cmd);
        output = pipe(cmd.trim(), &output)?;
    }

    Ok(output)
}

/// Runs the given command in a pipeline and returns the raw output.
pub fn pipe(cmd: &str, input: &[u8]) -> Result<Vec<u8>> {
    trace!(">> pipe {} bytes through {:?}", input.len(), cmd);

    let windows = cfg!(target_os = "windows")
        && env::var("MSYSTEM")
            .map(|env| !env.starts_with("MINGW"))
            .unwrap_or_default();

    let mut child = if windows {
        Command::new("cmd")
            .args(&["/C", cmd])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    } else {
        Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    }
    .map_err(|err| Error::SpawnProcessError(err, cmd.to_string()))?;

    // stdin is fed from another thread so that a command writing
    // before reading all its input cannot block on a full pipe
    let mut stdin = child.stdin.take().ok_or(Error::GetStdinError)?;
    let input = input.to_owned();
    let writer = thread::spawn(move || stdin.write_all(&input));

    let output = child
        .wait_with_output()
        .map_err(|err| Error::WaitCmdError(err, cmd.to_string()))?;

    let written = writer.join().map_err(|_| Error::JoinStdinWriterError)?;

    if !output.status.success() {
        return Err(Error::ExitStatusError(
            cmd.to_string(),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        ));
    }

    written.map_err(Error::WriteStdinError)?;

    trace!("<< pipe");
    Ok(output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_chain() {
        let output = run("cat | tr a-z A-Z", b"hello").unwrap();
        assert_eq!(b"HELLO".to_vec(), output);
    }

    #[test]
    fn test_exit_status() {
        match run("exit 3", b"") {
            Err(Error::ExitStatusError(cmd, code, _)) => {
                assert_eq!("exit 3", cmd);
                assert_eq!(Some(3), code);
            }
            res => panic!("unexpected result: {:?}", res),
        }
    }
}
