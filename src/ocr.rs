pub mod card_matcher;

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::opt::{log_if, DbgFlg, ErrToStr, Res};
use card_matcher::CardMatcher;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Reads card names off the screen. Results are advisory.
pub trait Recognizer: Send + Sync {
    /// Work still running at `deadline` should be stopped.
    fn recognize(&self, candidates: &[String], deadline: Instant) -> Res<Vec<String>>;
}

/// Runs a recognizer on a worker thread, giving up after `timeout`.
pub fn recognize_with_timeout(
    recognizer: Arc<dyn Recognizer>,
    candidates: Vec<String>,
    timeout: Duration,
) -> Res<Vec<String>> {
    let deadline = Instant::now() + timeout;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(recognizer.recognize(&candidates, deadline));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(format!("recognizer timed out after {:?}", timeout))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err("recognizer stopped".to_string()),
    }
}

/// Shells out to an external OCR command and matches each line of its output to a card name.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn from_command_line(command_line: &str) -> Res<Self> {
        let mut parts = shlex::split(command_line)
            .ok_or_else(|| format!("invalid quoting in OCR command: {}", command_line))?
            .into_iter();
        let program = parts
            .next()
            .ok_or_else(|| "empty OCR command".to_string())?;

        Ok(CommandRecognizer {
            program,
            args: parts.collect(),
        })
    }
}

impl Recognizer for CommandRecognizer {
    fn recognize(&self, candidates: &[String], deadline: Instant) -> Res<Vec<String>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .err_to_str()?;

        // drain concurrently, a full pipe stalls the child
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| format!("{} has no stdout", self.program))?;
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| buf)
        });

        let status = wait_until(&mut child, deadline)
            .map_err(|err| format!("{}: {}", self.program, err))?;
        if !status.success() {
            return Err(format!("{} exited with {}", self.program, status));
        }
        let output = reader
            .join()
            .map_err(|_| format!("{} output reader panicked", self.program))?
            .err_to_str()?;

        let text = String::from_utf8_lossy(&output);
        let lines: Vec<&str> = text.lines().collect();
        let names = CardMatcher::new(candidates).find_matches(&lines);
        log_if(
            &format!("Recognized {} of {} lines", names.len(), lines.len()),
            DbgFlg::Ocr,
        );
        Ok(names)
    }
}

/// Waits for `child` until `deadline`, then kills and reaps it.
fn wait_until(child: &mut Child, deadline: Instant) -> Res<ExitStatus> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() < deadline => thread::sleep(WAIT_POLL_INTERVAL),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err("timed out, process killed".to_string());
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    impl Recognizer for Slow {
        fn recognize(&self, _candidates: &[String], _deadline: Instant) -> Res<Vec<String>> {
            thread::sleep(Duration::from_millis(500));
            Ok(vec!["late".to_string()])
        }
    }

    struct Echo;

    impl Recognizer for Echo {
        fn recognize(&self, candidates: &[String], _deadline: Instant) -> Res<Vec<String>> {
            Ok(candidates.to_vec())
        }
    }

    #[test]
    fn test_timeout() {
        let res = recognize_with_timeout(Arc::new(Slow), Vec::new(), Duration::from_millis(20));
        assert!(res.unwrap_err().contains("timed out"));

        let res = recognize_with_timeout(
            Arc::new(Echo),
            vec!["a".to_string()],
            Duration::from_secs(1),
        );
        assert_eq!(res.unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_command_line_parsing() {
        let recognizer = CommandRecognizer::from_command_line("ocr-tool --lang 'en US'").unwrap();
        assert_eq!(recognizer.program, "ocr-tool");
        assert_eq!(recognizer.args, vec!["--lang".to_string(), "en US".to_string()]);

        assert!(CommandRecognizer::from_command_line("").is_err());
        assert!(CommandRecognizer::from_command_line("ocr 'open").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_recognizer_matches_output() {
        let recognizer =
            CommandRecognizer::from_command_line("printf 'Outlaw Medlc\\n'").unwrap();
        let names = recognizer
            .recognize(
                &["Outlaw Medic".to_string(), "Slickshot Show-Off".to_string()],
                Instant::now() + Duration::from_secs(5),
            )
            .unwrap();
        assert_eq!(names, vec!["Outlaw Medic".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_command_is_killed_at_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let recognizer = CommandRecognizer::from_command_line(&format!(
            "sh -c \"sleep 1; touch '{}'\"",
            marker.display()
        ))
        .unwrap();

        let res = recognize_with_timeout(
            Arc::new(recognizer),
            vec!["Outlaw Medic".to_string()],
            Duration::from_millis(100),
        );
        assert!(res.unwrap_err().contains("timed out"));

        thread::sleep(Duration::from_millis(1500));
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command() {
        let recognizer = CommandRecognizer::from_command_line("sh -c 'exit 3'").unwrap();
        let res = recognizer.recognize(&[], Instant::now() + Duration::from_secs(5));
        assert!(res.unwrap_err().contains("exited with"));
    }
}
