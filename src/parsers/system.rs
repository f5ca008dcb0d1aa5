// uptime, loadavg and thermal zone parsing

use crate::models::{LoadAvgMessage, UptimeMessage};

/// Parse `/proc/uptime`: the first float is seconds since boot, broken
/// into day/hour/minute/second components. None when the field is
/// absent or not a number.
pub fn parse_uptime(text: &str) -> Option<UptimeMessage> {
    let secs = text.split_whitespace().next()?.parse::<f64>().ok()?;
    let total = secs as i64;
    Some(UptimeMessage {
        up_day: total / 86_400,
        up_hour: total % 86_400 / 3_600,
        up_min: total % 3_600 / 60,
        up_sec: total % 60,
        ..Default::default()
    })
}

/// Parse `/proc/loadavg`: three load floats, a `running/active` pair
/// and the last PID. Occupancy divides each load by the logical CPU
/// count, which the caller supplies from carried topology state. The
/// three loads are required; the scheduler fields degrade to zero.
pub fn parse_loadavg(text: &str, logical_cpus: u32) -> Option<LoadAvgMessage> {
    let mut fields = text.split_whitespace();
    let one = fields.next()?.parse::<f64>().ok()?;
    let five = fields.next()?.parse::<f64>().ok()?;
    let fifteen = fields.next()?.parse::<f64>().ok()?;

    let (running, active) = fields
        .next()
        .and_then(|pair| pair.split_once('/'))
        .map(|(r, a)| (r.parse().unwrap_or(0), a.parse().unwrap_or(0)))
        .unwrap_or((0, 0));
    let last_pid = fields.next().and_then(|v| v.parse().ok()).unwrap_or(0);

    let per_cpu = |load: f64| load / logical_cpus.max(1) as f64;
    Some(LoadAvgMessage {
        one,
        one_occupy: per_cpu(one),
        five,
        five_occupy: per_cpu(five),
        fifteen,
        fifteen_occupy: per_cpu(fifteen),
        running,
        active,
        last_pid,
        ..Default::default()
    })
}

/// Parse one thermal zone reading: an integer in millidegrees Celsius,
/// reported in whole degrees.
pub fn parse_temp_millidegrees(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok().map(|milli| milli / 1000)
}
