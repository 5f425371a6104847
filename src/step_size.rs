use crate::assert_interval;

/// Step-size strategy for incremental value updates
///
/// Replaces the common convention of overloading a learning rate of zero to
/// mean "use the sample average" with an explicit choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepSize {
    /// A constant learning rate
    Fixed(f64),
    /// `1 / N`, where N is the visit count of the entry being updated
    SampleAverage,
}

impl StepSize {
    /// The update weight to apply on the `visits`-th visit
    ///
    /// **Panics** if a fixed rate is outside `[0,1]` or `visits` is zero for
    /// the sample-average strategy
    pub fn rate(&self, visits: u32) -> f64 {
        match *self {
            StepSize::Fixed(alpha) => {
                assert_interval!(alpha, 0.0, 1.0);
                alpha
            }
            StepSize::SampleAverage => {
                assert!(visits > 0, "sample average requires at least one visit");
                1.0 / visits as f64
            }
        }
    }
}
