//! Row-parallel execution with a sequential fallback.
//!
//! With the `parallel` feature (default) this is rayon's prelude. Without it,
//! `into_par_iter()` becomes `into_iter()` so the IDW row loop compiles
//! unchanged and runs on the calling thread.

#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Stand-in for `rayon::prelude::IntoParallelIterator`; the rest of the
    /// chain resolves to plain `Iterator` methods.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
