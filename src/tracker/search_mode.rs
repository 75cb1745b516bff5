/// Search mode for the marker locator, carried across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Scan the whole downscaled frame. Used for initial acquisition and
    /// after tracking loss.
    #[default]
    Full,
    /// Scan only a square window centered on the position found last tick.
    Local {
        /// Last known marker pixel in global frame coordinates.
        center: (u32, u32),
    },
}
