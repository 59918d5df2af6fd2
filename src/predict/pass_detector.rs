use crate::predict::types::{NextPass, PassInterval};

/// Indices `i` where the mask flips relative to sample `i - 1`.
fn boundaries(mask: &[bool]) -> Vec<usize> {
    mask.windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Find every complete pass (rise followed by set) in a visibility mask.
///
/// Boundaries are paired in order. A window that opens mid-pass has its
/// leading set boundary dropped, and one that closes mid-pass has its
/// trailing rise dropped, so partial passes are never reported.
pub fn find_passes(mask: &[bool]) -> Vec<PassInterval> {
    let mut edges = boundaries(mask);
    if mask.first() == Some(&true) && !edges.is_empty() {
        edges.remove(0);
    }

    edges
        .chunks_exact(2)
        .map(|pair| PassInterval {
            start: pair[0],
            end: pair[1],
        })
        .collect()
}

/// Earliest complete pass in the mask, if any
pub fn next_pass(mask: &[bool]) -> NextPass {
    match find_passes(mask).first() {
        Some(interval) => NextPass::Found(*interval),
        None => NextPass::NoPassFound,
    }
}
