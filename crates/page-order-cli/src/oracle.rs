use page_order_core::{FileItem, Oracle, OracleError, Verdict};
use std::collections::BTreeMap;
use std::process::Command;
use tracing::{debug, trace};

/// Oracle backed by an external program, run once per comparison as
/// `<program> [args...] <first> <second>`.
///
/// The program prints -1 (first comes first), 1 (second comes first) or 0.
/// Settings from the `oracle` config table are exported to it as
/// `PAGE_ORDER_ORACLE_<KEY>` environment variables.
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
    settings: BTreeMap<String, String>,
}

impl CommandOracle {
    /// Split `command_line` on whitespace into program and leading arguments.
    pub fn from_command_line(
        command_line: &str,
        settings: BTreeMap<String, String>,
    ) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            settings,
        })
    }
}

impl Oracle for CommandOracle {
    fn compare(&self, first: &FileItem, second: &FileItem) -> Result<Verdict, OracleError> {
        debug!("Asking {} to compare {} vs {}", self.program, first, second);

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(&first.path).arg(&second.path);
        for (key, value) in &self.settings {
            command.env(format!("PAGE_ORDER_ORACLE_{}", key.to_uppercase()), value);
        }

        let output = command.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OracleError::Unavailable(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("Oracle replied: {}", stdout.trim());
        Ok(Verdict::parse_response(&stdout))
    }
}
