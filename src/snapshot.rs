use std::fs;
use std::path::Path;

use crate::deadline::Deadline;
use crate::prelude::*;

/// One process as seen in the kernel process table at snapshot time.
///
/// Memory sizes are in pages, not bytes; the page size is a system constant
/// read once at startup (see [`crate::config::Config`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: i32,
    /// Normalized command name; kernel-truncated and may collide across
    /// unrelated binaries.
    pub name: String,
    pub parent_pid: i32,
    /// Process-group id; shared by a job's leader and its children.
    pub group_id: i32,
    pub virtual_size_pages: u64,
    pub resident_pages: u64,
}

// Positions within the whitespace-split stat record, see proc(5).
const STAT_FIELD_PID: usize = 0;
const STAT_FIELD_COMM: usize = 1;
const STAT_FIELD_PPID: usize = 3;
const STAT_FIELD_PGRP: usize = 4;
const STAT_FIELD_VSIZE: usize = 22;
const STAT_FIELD_RSS: usize = 23;

/// Strip every non-word character from a command name.
///
/// The comm field arrives wrapped in parentheses; only `[A-Za-z0-9_]`
/// survives so bucket keys stay stable across decoration.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Read the process table under `proc_root` into one record per live pid.
///
/// The proc root is an explicit parameter so tests can inject a synthetic
/// tree. A pid that disappears between enumeration and the stat read is
/// skipped, never an error; an unreadable `proc_root` itself is fatal.
pub fn read_snapshot(proc_root: &Path, deadline: &Deadline) -> Result<Vec<ProcessRecord>> {
    let entries = fs::read_dir(proc_root)
        .with_context(|| format!("failed to open process table at {}", proc_root.display()))?;

    let mut records = Vec::new();
    for entry in entries {
        deadline.check()?;
        let entry =
            entry.with_context(|| format!("failed to enumerate {}", proc_root.display()))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let stat = match fs::read_to_string(entry.path().join("stat")) {
            Ok(stat) => stat,
            Err(err) => {
                // The process exited between enumeration and this read.
                debug!("skipping pid {name}: {err}");
                continue;
            }
        };
        match parse_stat_line(&stat) {
            Some(record) => records.push(record),
            None => debug!("skipping pid {name}: malformed stat record"),
        }
    }
    Ok(records)
}

/// Positional parse of one stat record; `None` when fields are missing or
/// non-numeric.
fn parse_stat_line(line: &str) -> Option<ProcessRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() <= STAT_FIELD_RSS {
        return None;
    }
    Some(ProcessRecord {
        pid: fields[STAT_FIELD_PID].parse().ok()?,
        name: normalize_name(fields[STAT_FIELD_COMM]),
        parent_pid: fields[STAT_FIELD_PPID].parse().ok()?,
        group_id: fields[STAT_FIELD_PGRP].parse().ok()?,
        virtual_size_pages: fields[STAT_FIELD_VSIZE].parse().ok()?,
        resident_pages: fields[STAT_FIELD_RSS].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn stat_line(pid: i32, comm: &str, ppid: i32, pgrp: i32, vsize: u64, rss: u64) -> String {
        let mut fields = vec![
            pid.to_string(),
            format!("({comm})"),
            "S".to_string(),
            ppid.to_string(),
            pgrp.to_string(),
        ];
        fields.extend(std::iter::repeat_n("0".to_string(), 17));
        fields.push(vsize.to_string());
        fields.push(rss.to_string());
        fields.join(" ")
    }

    fn write_proc_entry(root: &Path, pid: i32, comm: &str, ppid: i32, pgrp: i32, rss: u64) {
        let dir = root.join(pid.to_string());
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("stat"), stat_line(pid, comm, ppid, pgrp, rss * 2, rss)).unwrap();
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(10))
    }

    #[test]
    fn reads_numeric_entries_only() {
        let root = TempDir::new().unwrap();
        write_proc_entry(root.path(), 100, "httpd", 1, 100, 50);
        fs::create_dir(root.path().join("self")).unwrap();
        fs::write(root.path().join("uptime"), "123.45 678.90").unwrap();

        let records = read_snapshot(root.path(), &deadline()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            ProcessRecord {
                pid: 100,
                name: "httpd".to_string(),
                parent_pid: 1,
                group_id: 100,
                virtual_size_pages: 100,
                resident_pages: 50,
            }
        );
    }

    #[test]
    fn skips_pid_without_stat_record() {
        // Models the exit race: the directory is seen but the stat read fails.
        let root = TempDir::new().unwrap();
        write_proc_entry(root.path(), 100, "httpd", 1, 100, 50);
        fs::create_dir(root.path().join("200")).unwrap();

        let records = read_snapshot(root.path(), &deadline()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pid, 100);
    }

    #[test]
    fn skips_malformed_stat_record() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("300");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("stat"), "300 (short) S 1 300").unwrap();

        let records = read_snapshot(root.path(), &deadline()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn unreadable_proc_root_is_fatal() {
        let err = read_snapshot(Path::new("/nonexistent-proc-root"), &deadline()).unwrap_err();
        assert!(err.to_string().contains("failed to open process table"));
    }

    #[test]
    fn expired_deadline_aborts_the_scan() {
        let root = TempDir::new().unwrap();
        write_proc_entry(root.path(), 100, "httpd", 1, 100, 50);

        let deadline = Deadline::after(Duration::ZERO);
        assert!(read_snapshot(root.path(), &deadline).is_err());
    }

    #[test]
    fn normalize_name_strips_non_word_characters() {
        assert_eq!(normalize_name("(httpd)"), "httpd");
        assert_eq!(normalize_name("avahi-daemon"), "avahidaemon");
        assert_eq!(normalize_name("web_worker2"), "web_worker2");
        assert_eq!(normalize_name("()"), "");
    }
}
