use std::time::{Duration, SystemTime};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short, mostly-unique id for container names: base36 of the low 40 bits of
/// `nanos ^ pid`.
pub fn create_session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_nanos();
    let mixed = nanos ^ u128::from(std::process::id());
    base36((mixed & 0xff_ffff_ffff) as u64)
}

fn base36(mut v: u64) -> String {
    if v == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while v > 0 {
        digits.push(BASE36[(v % 36) as usize]);
        v /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
