use std::cmp::Ordering;

use tariff_shared::money::round4;
use tariff_shared::ResultItem;

use crate::bounds::MarginBounds;

/// Margin descending, then price ascending, then carrier, tier and delivery.
///
/// Margins are compared at their published 4-dp precision so that two items
/// showing the same margin fall through to the cheaper price.
pub fn compare_items(a: &ResultItem, b: &ResultItem) -> Ordering {
    round4(b.breakdown.margin)
        .total_cmp(&round4(a.breakdown.margin))
        .then_with(|| a.price.total_cmp(&b.price))
        .then_with(|| a.carrier.cmp(&b.carrier))
        .then_with(|| a.tier.cmp(&b.tier))
        .then_with(|| a.delivery.as_str().cmp(b.delivery.as_str()))
}

pub fn rank(items: &mut [ResultItem]) {
    items.sort_by(compare_items);
}

/// The item whose margin lies nearest to `bounds`, ties broken by [`compare_items`].
pub fn closest_to_bounds<'a>(
    items: &'a [ResultItem],
    bounds: &MarginBounds,
) -> Option<&'a ResultItem> {
    items.iter().min_by(|a, b| {
        bounds
            .distance(a.breakdown.margin)
            .total_cmp(&bounds.distance(b.breakdown.margin))
            .then_with(|| compare_items(a, b))
    })
}
