//! Synthetic coffee-shop sales generation.
//!
//! Produces a plausible half-year of line items for three stores so the
//! dashboard can be explored without a real export. Output is fully determined
//! by `SampleConfig`.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::SaleRecord;
use crate::error::AppError;

pub const LOCATIONS: [&str; 3] = ["Astoria", "Hell's Kitchen", "Lower Manhattan"];

/// (category, product, list price, relative popularity)
const CATALOGUE: [(&str, &str, f64, u32); 14] = [
    ("Coffee", "Latte", 4.25, 14),
    ("Coffee", "Cappuccino", 4.00, 11),
    ("Coffee", "Espresso", 3.00, 8),
    ("Coffee", "Americano", 3.25, 9),
    ("Coffee", "Cold Brew", 4.50, 7),
    ("Coffee", "Mocha", 4.75, 5),
    ("Tea", "Brewed Chai", 3.00, 8),
    ("Tea", "Earl Grey", 2.75, 5),
    ("Tea", "Green Tea", 2.50, 4),
    ("Bakery", "Croissant", 3.50, 7),
    ("Bakery", "Scone", 3.25, 6),
    ("Bakery", "Muffin", 3.00, 5),
    ("Drinking Chocolate", "Hot Chocolate", 4.00, 4),
    ("Coffee beans", "Espresso Roast", 14.75, 2),
];

/// Opening hours and the relative order volume in each; mornings are busiest.
const HOUR_PROFILE: [(u32, u32); 15] = [
    (6, 4),
    (7, 10),
    (8, 14),
    (9, 13),
    (10, 12),
    (11, 7),
    (12, 6),
    (13, 5),
    (14, 5),
    (15, 5),
    (16, 5),
    (17, 4),
    (18, 3),
    (19, 2),
    (20, 1),
];

/// Relative frequency of 1, 2, and 3 units on a regular line item.
const QUANTITY_WEIGHTS: [u32; 3] = [70, 25, 5];

/// Relative frequency of 1, 2, and 3 line items per order.
const ITEMS_PER_ORDER_WEIGHTS: [u32; 3] = [65, 28, 7];

/// Standard deviation of the multiplicative price jitter.
const PRICE_JITTER: f64 = 0.03;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Line items to generate.
    pub rows: usize,
    pub seed: u64,
    /// Sales cover January..June of this year.
    pub year: i32,
    /// Chance that a line item is a catering-size bulk order (20-40 units).
    pub bulk_order_prob: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 5_000,
            seed: 42,
            year: 2023,
            bulk_order_prob: 0.004,
        }
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SaleRecord>, AppError> {
    if config.rows == 0 {
        return Err(AppError::usage("Sample row count must be > 0."));
    }
    if !(0.0..=1.0).contains(&config.bulk_order_prob) {
        return Err(AppError::usage("Bulk order probability must be within [0, 1]."));
    }
    let start = NaiveDate::from_ymd_opt(config.year, 1, 1)
        .ok_or_else(|| AppError::usage(format!("Invalid sample year {}.", config.year)))?;
    let end = NaiveDate::from_ymd_opt(config.year, 7, 1)
        .ok_or_else(|| AppError::usage(format!("Invalid sample year {}.", config.year)))?;
    let days = (end - start).num_days();

    let dist_err = |e: rand::distributions::WeightedError| {
        AppError::usage(format!("Sample distribution error: {e}"))
    };
    let location_dist = WeightedIndex::new([34, 33, 33]).map_err(dist_err)?;
    let product_dist = WeightedIndex::new(CATALOGUE.iter().map(|c| c.3)).map_err(dist_err)?;
    let hour_dist = WeightedIndex::new(HOUR_PROFILE.iter().map(|h| h.1)).map_err(dist_err)?;
    let qty_dist = WeightedIndex::new(QUANTITY_WEIGHTS).map_err(dist_err)?;
    let items_dist = WeightedIndex::new(ITEMS_PER_ORDER_WEIGHTS).map_err(dist_err)?;
    let jitter = Normal::new(0.0, PRICE_JITTER)
        .map_err(|e| AppError::usage(format!("Price jitter distribution error: {e}")))?;

    let mut rng = StdRng::seed_from_u64(config.seed);

    // (order index, record); ids are assigned after sorting by time.
    let mut items: Vec<(usize, SaleRecord)> = Vec::with_capacity(config.rows);
    let mut order = 0usize;
    while items.len() < config.rows {
        let date = start + Duration::days(rng.gen_range(0..days));
        let hour = HOUR_PROFILE[hour_dist.sample(&mut rng)].0;
        let time = NaiveTime::from_hms_opt(hour, rng.gen_range(0..60), rng.gen_range(0..60))
            .unwrap_or(NaiveTime::MIN);
        let location = LOCATIONS[location_dist.sample(&mut rng)];

        let n_items = (items_dist.sample(&mut rng) + 1).min(config.rows - items.len());
        for _ in 0..n_items {
            let (category, product, price, _) = CATALOGUE[product_dist.sample(&mut rng)];
            let quantity = if rng.gen_bool(config.bulk_order_prob) {
                rng.gen_range(20..=40)
            } else {
                qty_dist.sample(&mut rng) as i64 + 1
            };
            let unit = (price * (1.0 + jitter.sample(&mut rng))).max(0.5);
            let sales = (unit * quantity as f64 * 100.0).round() / 100.0;

            items.push((
                order,
                SaleRecord {
                    id: String::new(),
                    date: Some(date),
                    time: Some(time),
                    location: location.to_string(),
                    category: category.to_string(),
                    product: product.to_string(),
                    sales,
                    quantity,
                    weekday: date.format("%A").to_string(),
                    month: date.format("%B").to_string(),
                    hour: Some(hour as u8),
                },
            ));
        }
        order += 1;
    }

    items.sort_by_key(|(o, r)| (r.date, r.time, *o));

    let mut next_id = 0usize;
    let mut last_order = None;
    let records = items
        .into_iter()
        .map(|(o, mut r)| {
            if last_order != Some(o) {
                next_id += 1;
                last_order = Some(o);
            }
            r.id = next_id.to_string();
            r
        })
        .collect::<Vec<_>>();

    tracing::info!(
        rows = records.len(),
        orders = next_id,
        seed = config.seed,
        year = start.year(),
        "sample generated"
    );
    Ok(records)
}
