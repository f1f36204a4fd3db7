use anyhow::{bail, Context, Result};
use firmware::SyncMessage;

/// Parse a hex byte string such as `"02 19 e2"`, `"0219E2"` or `"02:19:e2"`.
/// Whitespace, `:` and `-` between bytes are ignored, as is a leading `0x`.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>> {
    let input = input.trim();
    let input = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    let hex: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    if hex.is_empty() {
        bail!("no hex digits");
    }
    if hex.len() % 2 != 0 {
        bail!("odd number of hex characters");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid hex at position {}", i))
        })
        .collect()
}

/// Decode a sync message and describe each delta on its own line.
pub fn describe_sync_message(bytes: &[u8]) -> Result<String> {
    let message = SyncMessage::decode(bytes).context("decoding sync message")?;
    let mut out = format!("{} delta(s)\n", message.len());
    for (i, &delta) in message.deltas().iter().enumerate() {
        let action = if delta > 0 { "press" } else { "release" };
        out.push_str(&format!(
            "  [{}] {:+4}  {} position {}\n",
            i,
            delta,
            action,
            delta.unsigned_abs()
        ));
    }
    Ok(out)
}

pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
