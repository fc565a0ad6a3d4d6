/// Next position in a ring of `len` entries. With nothing selected yet,
/// forward starts at the first entry and backward at the last.
pub const fn cycle_index(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }

    Some(match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(index), true) => (index + 1) % len,
        (Some(index), false) if index == 0 || index >= len => len - 1,
        (Some(index), false) => index - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_both_ways_and_wraps() {
        assert_eq!(cycle_index(None, 3, true), Some(0));
        assert_eq!(cycle_index(None, 3, false), Some(2));
        assert_eq!(cycle_index(Some(2), 3, true), Some(0));
        assert_eq!(cycle_index(Some(0), 3, false), Some(2));
        assert_eq!(cycle_index(Some(1), 3, false), Some(0));
    }

    #[test]
    fn empty_ring_has_no_selection() {
        assert_eq!(cycle_index(Some(4), 0, true), None);
    }
}
