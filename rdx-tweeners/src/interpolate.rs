//! Values that can be interpolated between two bounds.

/// A value computed from a range and a ratio.
///
/// A ratio of `0` gives `from` and a ratio of `1` gives `to`. Ratios outside
/// of `[0, 1]`, as produced by the elastic or back curves, extrapolate.
pub trait Interpolate: Clone + Send + 'static {
    fn interpolate(from: &Self, to: &Self, ratio: f64) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(from: &Self, to: &Self, ratio: f64) -> Self {
        (*from as f64 + (*to as f64 - *from as f64) * ratio) as f32
    }
}

impl Interpolate for f64 {
    fn interpolate(from: &Self, to: &Self, ratio: f64) -> Self {
        from + (to - from) * ratio
    }
}

macro_rules! impl_integer_interpolate {
    ($($t:ty),*) => {
        $(
            /// Rounds to the nearest integer.
            impl Interpolate for $t {
                fn interpolate(from: &Self, to: &Self, ratio: f64) -> Self {
                    let from = *from as f64;
                    (from + (*to as f64 - from) * ratio).round() as $t
                }
            }
        )*
    };
}

impl_integer_interpolate!(i8, i16, i32, i64, u8, u16, u32, u64);

impl<T: Interpolate, const N: usize> Interpolate for [T; N] {
    fn interpolate(from: &Self, to: &Self, ratio: f64) -> Self {
        std::array::from_fn(|i| T::interpolate(&from[i], &to[i], ratio))
    }
}

impl<A: Interpolate, B: Interpolate> Interpolate for (A, B) {
    fn interpolate(from: &Self, to: &Self, ratio: f64) -> Self {
        (
            A::interpolate(&from.0, &to.0, ratio),
            B::interpolate(&from.1, &to.1, ratio),
        )
    }
}
