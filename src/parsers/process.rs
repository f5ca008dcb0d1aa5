// per-PID stat/statm parsing

/// One process's scheduling snapshot from `/proc/<pid>/stat`: the comm
/// field and the four CPU-time counters (utime, stime, cutime, cstime)
/// summed into jiffies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidStat {
    pub pid: i64,
    pub name: String,
    pub jiffies: i64,
}

/// Parse `/proc/<pid>/stat`. The comm field is wrapped in parentheses
/// and may itself contain spaces or parentheses, so the line is split
/// at the first `(` and the last `)` rather than on whitespace.
pub fn parse_pid_stat(text: &str) -> Option<PidStat> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close < open {
        return None;
    }

    let pid = text[..open].trim().parse().ok()?;
    let name = text[open + 1..close].to_string();

    // after ")" : state(3) ppid(4) ... utime is field 14
    let rest: Vec<&str> = text[close + 1..].split_whitespace().collect();
    let field = |one_based: usize| -> Option<i64> { rest.get(one_based - 3)?.parse().ok() };
    let jiffies = field(14)? + field(15)? + field(16)? + field(17)?;

    Some(PidStat { pid, name, jiffies })
}

/// Parse `/proc/<pid>/statm`: the second field is the resident set in
/// pages.
pub fn parse_pid_statm(text: &str) -> Option<i64> {
    text.split_whitespace().nth(1)?.parse().ok()
}
