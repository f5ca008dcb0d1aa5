// meminfo parsing

use crate::models::MemoryMessage;

use super::scale_bytes;

/// Parse `/proc/meminfo` (`Key:  value kB` lines) into the memory
/// breakdown. Each field is looked up independently; a missing or
/// malformed key leaves that field zeroed. Occupy ratios divide by
/// MemTotal (swap fields by SwapTotal) and stay zero when the divisor
/// is zero. Origin and timestamp are left for the caller to stamp.
pub fn parse_meminfo(text: &str) -> MemoryMessage {
    let kb = |key: &str| -> f64 {
        text.lines()
            .find_map(|line| {
                let (k, rest) = line.split_once(':')?;
                if k.trim() != key {
                    return None;
                }
                rest.split_whitespace().next()?.parse::<f64>().ok()
            })
            .unwrap_or(0.0)
    };

    let total_kb = kb("MemTotal");
    let swap_total_kb = kb("SwapTotal");
    let occupy = |value_kb: f64, divisor_kb: f64| {
        if divisor_kb > 0.0 {
            value_kb / divisor_kb
        } else {
            0.0
        }
    };

    let free_kb = kb("MemFree");
    let available_kb = kb("MemAvailable");
    let buffers_kb = kb("Buffers");
    let cached_kb = kb("Cached");
    let dirty_kb = kb("Dirty");
    let swap_free_kb = kb("SwapFree");
    let swap_cached_kb = kb("SwapCached");

    let bytes = |value_kb: f64| scale_bytes(value_kb * 1024.0);

    let (total_mem, total_mem_unit) = bytes(total_kb);
    let (free_mem, free_mem_unit) = bytes(free_kb);
    let (available_mem, available_mem_unit) = bytes(available_kb);
    let (buffer, buffer_unit) = bytes(buffers_kb);
    let (cached, cached_unit) = bytes(cached_kb);
    let (dirty, dirty_unit) = bytes(dirty_kb);
    let (swap_total, swap_total_unit) = bytes(swap_total_kb);
    let (swap_free, swap_free_unit) = bytes(swap_free_kb);
    let (swap_cached, swap_cached_unit) = bytes(swap_cached_kb);

    MemoryMessage {
        total_mem,
        total_mem_unit,
        free_mem_occupy: occupy(free_kb, total_kb),
        free_mem,
        free_mem_unit,
        available_mem_occupy: occupy(available_kb, total_kb),
        available_mem,
        available_mem_unit,
        buffer_occupy: occupy(buffers_kb, total_kb),
        buffer,
        buffer_unit,
        cache_occupy: occupy(cached_kb, total_kb),
        cached,
        cached_unit,
        dirty_occupy: occupy(dirty_kb, total_kb),
        dirty,
        dirty_unit,
        swap_total,
        swap_total_unit,
        swap_free_occupy: occupy(swap_free_kb, swap_total_kb),
        swap_free,
        swap_free_unit,
        swap_cached_occupy: occupy(swap_cached_kb, swap_total_kb),
        swap_cached,
        swap_cached_unit,
        ..Default::default()
    }
}
