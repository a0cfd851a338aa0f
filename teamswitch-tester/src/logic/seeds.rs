use anyhow::{Context, Result, bail};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;
const MAX_RANGE_LEN: u64 = 10_000;

/// Resolve CLI seed tokens into selection seeds.
///
/// Accepts decimal integers (negative values use their magnitude), `0x` hex
/// literals and inclusive ranges written `start..end`. Duplicates are dropped
/// keeping first-seen order.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut pending = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        if let Some((start, end)) = token.split_once("..") {
            let start = parse_seed(start)?;
            let end = parse_seed(end)?;
            if end < start {
                bail!("Seed range {token} is empty");
            }
            if end - start >= MAX_RANGE_LEN {
                bail!("Seed range {token} exceeds {MAX_RANGE_LEN} seeds");
            }
            pending.extend(start..=end);
            continue;
        }
        pending.push(parse_seed(token)?);
    }

    let mut seen = HashSet::new();
    pending.retain(|seed| seen.insert(*seed));
    if pending.is_empty() {
        pending.push(DEFAULT_SEED);
    }
    Ok(pending)
}

fn parse_seed(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .with_context(|| format!("Unrecognized seed token: {token}"));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    token
        .parse::<u64>()
        .with_context(|| format!("Unrecognized seed token: {token}"))
}
