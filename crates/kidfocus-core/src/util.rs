//! Pure helpers: PIN hashing, input sanitization, validation, formatting.

/// Characters stripped from all free-text input.
const STRIPPED: [char; 4] = ['<', '>', '\'', '"'];

/// Hash a PIN with a 32-bit rolling hash, base-36 encoded.
///
/// Not cryptographic -- this only keeps the PIN out of the persisted
/// document in plaintext. The rolling step is `h = h * 31 + ch` over a
/// wrapping 32-bit signed accumulator.
pub fn hash_pin(pin: &str) -> Option<String> {
    if pin.is_empty() {
        return None;
    }
    let mut hash: i32 = 0;
    for ch in pin.chars() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(ch as i32);
    }
    Some(to_base36(hash))
}

fn to_base36(value: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let negative = value < 0;
    let mut n = (value as i64).unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if negative {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Trim, strip `< > ' "`, and clamp to `max_len` characters.
///
/// Applied to every free-text field on input and again on every load.
pub fn sanitize_input(input: &str, max_len: usize) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .take(max_len)
        .collect()
}

/// Child ages are accepted in the 3..=18 range.
pub fn validate_age(age: u32) -> bool {
    (3..=18).contains(&age)
}

/// Ad-hoc timer runs are accepted in the 1..=120 minute range.
///
/// The persisted timer settings use their own narrower per-field bounds;
/// the two layers are checked independently.
pub fn validate_timer_minutes(minutes: u32) -> bool {
    (1..=120).contains(&minutes)
}

/// Format a countdown as `MM:SS`.
pub fn format_time(minutes: u64, seconds: u64) -> String {
    format!("{minutes:02}:{seconds:02}")
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
