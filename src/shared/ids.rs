use getrandom::getrandom;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_SUFFIX_SPACE: u32 = 36 * 36 * 36 * 36;

/// Base36 digits of `value`, left-padded with zeros to at least `min_width`.
fn to_base36(mut value: u64, min_width: usize) -> String {
    let mut digits = Vec::with_capacity(min_width.max(13));
    loop {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
        if value == 0 && digits.len() >= min_width {
            break;
        }
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// `sess-<base36 millis>-<4 random base36 chars>`
pub fn generate_session_id(now_millis: i64) -> Result<String, String> {
    let timestamp = u64::try_from(now_millis)
        .map_err(|_| "session id requires a non-negative timestamp".to_string())?;
    let mut bytes = [0_u8; 4];
    getrandom(&mut bytes).map_err(|err| format!("failed to generate session id: {err}"))?;
    let sample = u32::from_le_bytes(bytes) % SESSION_SUFFIX_SPACE;
    Ok(format!(
        "sess-{}-{}",
        to_base36(timestamp, 1),
        to_base36(u64::from(sample), 4)
    ))
}
