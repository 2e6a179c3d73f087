//! Feeds a script to a session line by line.

use common::debug::{create_logger, Logger};
use common::{log, log_detail};
use topdown_parser::{LineStatus, Session};

/// Driver settings.
#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    /// Write each input line to the output as `# <line>` before running it.
    pub echo_input: bool,
    /// After the script, write the frozen user grammar to the output.
    pub freeze_at_end: bool,
}

/// Counts from one [`Driver::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub rejected: usize,
    /// The script asked to stop before its last line.
    pub exited: bool,
}

pub struct Driver<'s, 'a> {
    session: &'s mut Session<'a>,
    config: DriverConfig,
    log: Logger,
}

impl<'s, 'a> Driver<'s, 'a> {
    pub fn new(session: &'s mut Session<'a>, config: DriverConfig) -> Self {
        Self {
            session,
            config,
            log: create_logger("driver"),
        }
    }

    /// Run every line of `script`.
    ///
    /// A line ending in `\` is joined with the next one. Blank lines are
    /// skipped. Stops after a line that requests exit.
    pub fn run(&mut self, script: &str) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut pending = String::new();

        for raw in script.lines() {
            if let Some(head) = raw.strip_suffix('\\') {
                pending.push_str(head);
                continue;
            }
            pending.push_str(raw);
            let line = std::mem::take(&mut pending);
            if self.run_one(&line, &mut summary) {
                break;
            }
        }
        if !pending.is_empty() && !summary.exited {
            let line = std::mem::take(&mut pending);
            self.run_one(&line, &mut summary);
        }

        if self.config.freeze_at_end {
            let frozen = self.session.freeze();
            for line in frozen.lines() {
                self.session.emit(line);
            }
        }
        log!(
            self.log,
            "script done: {} executed, {} rejected",
            summary.executed,
            summary.rejected
        );
        summary
    }

    /// Returns true when the session asked to stop.
    fn run_one(&mut self, line: &str, summary: &mut RunSummary) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        if self.config.echo_input {
            self.session.emit(format!("# {}", line));
        }
        log_detail!(self.log, "line: {}", line);

        match self.session.run_line(line) {
            LineStatus::Executed => summary.executed += 1,
            LineStatus::Rejected => summary.rejected += 1,
            LineStatus::Exit => {
                summary.executed += 1;
                summary.exited = true;
            }
        }
        summary.exited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use indoc::indoc;
    use topdown_parser::SessionConfig;

    fn quiet(arena: &Bump) -> Session<'_> {
        Session::with_config(arena, SessionConfig { echo: false, ..SessionConfig::default() })
    }

    #[test]
    fn test_driver_runs_script() {
        let arena = Bump::new();
        let mut session = quiet(&arena);
        let mut driver = Driver::new(&mut session, DriverConfig::default());

        let script = indoc! {"
            <sum> ::= <integer> '+' <integer> @ add
            <show> ::= <sum> @ print

            !show
            1 + 2
            1 +
        "};
        let summary = driver.run(script);
        assert_eq!(summary, RunSummary { executed: 4, rejected: 1, exited: false });
        assert_eq!(session.take_output(), vec!["3", "1 +", "   ^- <integer> expected"]);
    }

    #[test]
    fn test_driver_joins_continued_lines() {
        let arena = Bump::new();
        let mut session = quiet(&arena);
        let mut driver = Driver::new(
            &mut session,
            DriverConfig { echo_input: true, ..DriverConfig::default() },
        );

        driver.run("<pair> ::= <integer> \\\n <integer>\n? pair");
        assert_eq!(
            session.take_output(),
            vec!["# <pair> ::= <integer>  <integer>", "# ? pair", "<pair> ::= <integer> <integer>"]
        );
    }

    #[test]
    fn test_driver_stops_on_exit() {
        let arena = Bump::new();
        let mut session = quiet(&arena);
        let mut driver = Driver::new(&mut session, DriverConfig::default());

        let summary = driver.run("!shell\n<never> ::= x");
        assert!(summary.exited);
        assert!(session.lookup("never").is_none());
    }

    #[test]
    fn test_driver_freezes_at_end() {
        let arena = Bump::new();
        let mut session = quiet(&arena);
        let mut driver = Driver::new(
            &mut session,
            DriverConfig { freeze_at_end: true, ..DriverConfig::default() },
        );

        driver.run("<g> ::= go");
        let frozen = session.freeze();
        assert_eq!(session.take_output(), frozen.lines().collect::<Vec<_>>());
    }
}
