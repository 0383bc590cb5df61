//! Revenue and volume breakdowns by month, location, product, and category.

use std::collections::BTreeMap;

use crate::domain::{COFFEE_CATEGORY, MONTH_ORDER, TOP_PRODUCTS};
use crate::filter::FilteredView;
use crate::metrics::{Entry, count_by_frequency, sort_desc, sum_by_key};

/// Revenue per month in calendar order (January..June).
///
/// Months outside that window are dropped; months without sales are absent.
pub fn monthly_sales(view: &FilteredView) -> Vec<Entry<f64>> {
    let sums = sum_by_key(view.records().map(|r| (r.month.as_str(), r.sales)));
    MONTH_ORDER
        .iter()
        .filter_map(|m| sums.iter().find(|e| e.label == *m).cloned())
        .collect()
}

/// Revenue per location, in location-name order.
pub fn location_sales(view: &FilteredView) -> Vec<Entry<f64>> {
    sum_by_key(view.records().map(|r| (r.location.as_str(), r.sales)))
}

/// Revenue per product, in product-name order.
pub fn product_sales(view: &FilteredView) -> Vec<Entry<f64>> {
    sum_by_key(view.records().map(|r| (r.product.as_str(), r.sales)))
}

/// The ten highest-grossing products, best first. Ties keep product-name order.
pub fn top_products(view: &FilteredView) -> Vec<Entry<f64>> {
    let mut products = product_sales(view);
    sort_desc(&mut products);
    products.truncate(TOP_PRODUCTS);
    products
}

/// Mean line-item sales per category, highest first.
pub fn category_aov(view: &FilteredView) -> Vec<Entry<f64>> {
    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in view.records() {
        let slot = acc.entry(r.category.as_str()).or_insert((0.0, 0));
        slot.0 += r.sales;
        slot.1 += 1;
    }
    let mut out: Vec<Entry<f64>> = acc
        .into_iter()
        .map(|(k, (sum, n))| Entry::new(k, sum / n as f64))
        .collect();
    sort_desc(&mut out);
    out
}

/// Line items per category, most popular first.
pub fn category_popularity(view: &FilteredView) -> Vec<Entry<usize>> {
    count_by_frequency(view.records().map(|r| r.category.as_str()))
}

/// Line items per product within the coffee category, most ordered first.
pub fn coffee_mix(view: &FilteredView) -> Vec<Entry<usize>> {
    count_by_frequency(
        view.records()
            .filter(|r| r.category == COFFEE_CATEGORY)
            .map(|r| r.product.as_str()),
    )
}
