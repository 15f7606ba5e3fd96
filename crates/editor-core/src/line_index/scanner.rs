//! The Line-Start Extractor (`spec.md` §4.1): a thin, external-collaborator
//! scan from raw bytes to an ascending array of line-start offsets. Kept
//! separate from [`super::bot::BalancedOffsetTree`] so the tree's own code
//! never has to know how lines are found in bytes, only that it is handed
//! an ascending `Vec<u64>` starting at 0.

/// Scans `bytes` with `memchr`, matching the teacher's existing line-scan
/// idiom (`editor-core`'s old B-tree builder used the same crate the same
/// way), and returns `[0, p1, p2, ...]` where each `pi` is the byte index
/// immediately after the i-th `\n`.
///
/// Returns `Err(BotError::InvalidUtf8)` if `bytes` is not valid UTF-8.
/// An empty `bytes` slice returns an empty vector (not `[0]`) — per
/// `spec.md` §4.1, callers building a tree refuse empty input themselves.
pub fn collect_line_starts(bytes: &[u8]) -> crate::errors::BotResult<Vec<u64>> {
    if std::str::from_utf8(bytes).is_err() {
        return Err(crate::errors::BotError::InvalidUtf8);
    }

    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut starts = Vec::with_capacity(8);
    starts.push(0u64);

    for pos in memchr::memchr_iter(b'\n', bytes) {
        let after: u64 = (pos + 1)
            .try_into()
            .map_err(|_| crate::errors::BotError::Overflow)?;
        starts.push(after);
    }

    // A `\n` as the final byte produces an entry equal to `bytes.len()`,
    // representing a valid, empty trailing line — spec.md S1/S3 keep it.
    Ok(starts)
}
