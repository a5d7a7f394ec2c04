//! Derived views over the pipeline's numeric table.
//!
//! Every function here is pure: it reads borrowed [`EnrichedPosition`]s and
//! returns a fresh result. Pass a [`crate::pipeline::NumericTable`], a slice of
//! rows, or the output of [`Filter::apply`].

pub mod commonality;
pub mod concentration;
pub mod filter;
pub mod flows;
pub mod overlap;
pub mod rank;
pub mod sectors;

pub use filter::Filter;
pub use overlap::Entity;
pub use rank::{Metric, Order};
pub use sectors::{End, GroupBy};

/// Sorts items by a value, breaking ties by key.
pub(crate) fn sort_by_value<K: Ord, T>(
    items: &mut [T],
    order: Order,
    f: impl Fn(&T) -> (f64, &K),
) {
    items.sort_by(|a, b| {
        let (va, ka) = f(a);
        let (vb, kb) = f(b);
        let by_value = match order {
            Order::Descending => vb.total_cmp(&va),
            Order::Ascending => va.total_cmp(&vb),
        };
        by_value.then_with(|| ka.cmp(kb))
    });
}
