/// Outcome of reading a key back out of one of the lossy stores.
///
/// `LogOverwritten` and `OtherKey` are both misses from the caller's point
/// of view, but spec.md §7 treats them as distinguishable reasons worth
/// separate counters rather than collapsing everything into a single
/// miss/hit boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult {
    /// Key found; the caller's output buffer(s) hold the value.
    Hit,
    /// No candidate location at all — a plain index miss.
    Miss,
    /// A candidate location existed but no longer holds this entry: the
    /// circular log (or chain slot) has since been overwritten/evicted.
    LogOverwritten,
    /// A candidate location was found and its tag still matches, but the
    /// key actually stored there differs from the one requested — a
    /// `hash_tag` collision between two distinct keys.
    OtherKey,
}
