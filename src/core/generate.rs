//! Synthetic record generation.
//!
//! All randomness comes from one seeded `StdRng` and all dates are measured
//! back from a fixed reference time, so a seed plus a reference time fully
//! determines the generated dataset. Ids are assigned here and carried by every
//! downstream reference; nothing relies on the position of a record in a `Vec`.

use crate::{
    config::GenerationConfig,
    core::clean::{self, CleaningReport},
    entities::{
        Category, CustomerModel, OrderItemModel, OrderModel, OrderStatus, ProductModel, Region,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDateTime, TimeDelta};
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use tracing::{debug, info, instrument};

/// Regions customers are spread across.
pub const REGIONS: [Region; 6] = [
    Region::NorthAmerica,
    Region::Europe,
    Region::Asia,
    Region::LatinAmerica,
    Region::Africa,
    Region::Oceania,
];

/// Categories products are spread across.
pub const CATEGORIES: [Category; 6] = [
    Category::Electronics,
    Category::Furniture,
    Category::Accessories,
    Category::Clothing,
    Category::Books,
    Category::HomeAndGarden,
];

/// Last word of every product name.
pub const PRODUCT_TIERS: [&str; 6] = ["Pro", "Plus", "Max", "Lite", "Premium", "Standard"];

/// Order statuses with their relative draw weights.
pub const STATUS_WEIGHTS: [(OrderStatus, f64); 3] = [
    (OrderStatus::Completed, 0.80),
    (OrderStatus::Pending, 0.15),
    (OrderStatus::Cancelled, 0.05),
];

/// Cost range of a product, in dollars.
pub const COST_RANGE: RangeInclusive<f64> = 5.0..=500.0;
/// Markup factor applied to cost to get the selling price.
pub const MARKUP_RANGE: RangeInclusive<f64> = 1.2..=3.0;
/// Units per order line.
pub const QUANTITY_RANGE: RangeInclusive<i32> = 1..=5;

const SIGNUP_WINDOW_DAYS: i64 = 730;
const ORDER_WINDOW_SECONDS: i64 = 365 * 24 * 60 * 60;
const MAX_EMAIL_ATTEMPTS: usize = 64;

/// Rounds a dollar amount to whole cents, halves away from zero on the `f64`
/// value. Decimal ties that have no exact binary form can round down, e.g.
/// `1.005` becomes `1.0`.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// The four generated collections of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Generated customers
    pub customers: Vec<CustomerModel>,
    /// Generated products
    pub products: Vec<ProductModel>,
    /// Generated orders
    pub orders: Vec<OrderModel>,
    /// Generated order lines
    pub order_items: Vec<OrderItemModel>,
}

impl Dataset {
    /// Sum of `quantity * unit_price` over lines whose order is `Completed`.
    #[must_use]
    pub fn completed_revenue(&self) -> f64 {
        let completed: HashSet<i64> = self
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .map(|o| o.id)
            .collect();
        self.order_items
            .iter()
            .filter(|item| completed.contains(&item.order_id))
            .map(OrderItemModel::line_total)
            .sum()
    }
}

/// Seeded source of customers, products and orders.
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    rng: StdRng,
    reference: NaiveDateTime,
}

impl DatasetGenerator {
    /// Creates a generator; `reference` is "now" for every date it produces.
    #[must_use]
    pub fn new(seed: u64, reference: NaiveDateTime) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            reference,
        }
    }

    /// Generates `count` customers with ids `1..=count` and pairwise distinct emails.
    ///
    /// # Errors
    /// Returns `Error::Generation` if no unused email turns up after a bounded
    /// number of resamples.
    pub fn generate_customers(&mut self, count: usize) -> Result<Vec<CustomerModel>> {
        let mut seen_emails = HashSet::with_capacity(count);
        let today = self.reference.date();
        let mut customers = Vec::with_capacity(count);

        for id in 1..=count {
            let email = self.unique_email(&mut seen_emails)?;
            let days_ago = self.rng.random_range(0..=SIGNUP_WINDOW_DAYS);
            customers.push(CustomerModel {
                id: to_id(id),
                name: Name().fake_with_rng(&mut self.rng),
                email,
                region: REGIONS[self.rng.random_range(0..REGIONS.len())],
                signup_date: today - TimeDelta::days(days_ago),
            });
        }

        debug!("Generated {} customers", customers.len());
        Ok(customers)
    }

    fn unique_email(&mut self, seen: &mut HashSet<String>) -> Result<String> {
        for _ in 0..MAX_EMAIL_ATTEMPTS {
            let email: String = SafeEmail().fake_with_rng(&mut self.rng);
            if seen.insert(email.clone()) {
                return Ok(email);
            }
        }
        Err(Error::Generation {
            message: format!(
                "no unused email found after {MAX_EMAIL_ATTEMPTS} attempts ({} already taken)",
                seen.len()
            ),
        })
    }

    /// Generates `count` products with ids `1..=count`; price is cost times a
    /// random markup, rounded to cents.
    pub fn generate_products(&mut self, count: usize) -> Vec<ProductModel> {
        let products: Vec<ProductModel> = (1..=count)
            .map(|id| {
                let cost = round_cents(self.rng.random_range(COST_RANGE));
                let markup = self.rng.random_range(MARKUP_RANGE);
                ProductModel {
                    id: to_id(id),
                    name: self.product_name(),
                    category: CATEGORIES[self.rng.random_range(0..CATEGORIES.len())],
                    cost,
                    price: round_cents(cost * markup),
                }
            })
            .collect();

        debug!("Generated {} products", products.len());
        products
    }

    fn product_name(&mut self) -> String {
        let first: String = Word().fake_with_rng(&mut self.rng);
        let second: String = Word().fake_with_rng(&mut self.rng);
        let tier = PRODUCT_TIERS[self.rng.random_range(0..PRODUCT_TIERS.len())];
        format!("{} {} {tier}", capitalize(&first), capitalize(&second))
    }

    /// Generates `count` orders with ids `1..=count` and their lines.
    ///
    /// Each order references a customer drawn uniformly from `customers` and
    /// carries between `items_per_order.start()` and
    /// `min(items_per_order.end(), products.len())` distinct products.
    ///
    /// # Errors
    /// Returns `Error::Generation` if orders are requested but there are no
    /// customers or products to reference, or if the item range is empty or
    /// starts at zero.
    pub fn generate_orders(
        &mut self,
        count: usize,
        customers: &[CustomerModel],
        products: &[ProductModel],
        items_per_order: RangeInclusive<usize>,
    ) -> Result<(Vec<OrderModel>, Vec<OrderItemModel>)> {
        if count == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        if customers.is_empty() || products.is_empty() {
            return Err(Error::Generation {
                message: format!(
                    "cannot generate orders from {} customers and {} products",
                    customers.len(),
                    products.len()
                ),
            });
        }

        let min_items = *items_per_order.start();
        let max_items = (*items_per_order.end()).min(products.len());
        if min_items == 0 || min_items > max_items {
            return Err(Error::Generation {
                message: format!(
                    "cannot put {min_items}..={} distinct products on an order with {} products available",
                    items_per_order.end(),
                    products.len()
                ),
            });
        }

        let statuses = WeightedIndex::new(STATUS_WEIGHTS.iter().map(|(_, w)| *w)).map_err(
            |e| Error::Generation {
                message: format!("invalid status weights: {e}"),
            },
        )?;

        let mut orders = Vec::with_capacity(count);
        let mut order_items = Vec::with_capacity(count * max_items);

        for id in 1..=count {
            let order_id = to_id(id);
            let customer = &customers[self.rng.random_range(0..customers.len())];
            let seconds_ago = self.rng.random_range(0..=ORDER_WINDOW_SECONDS);
            orders.push(OrderModel {
                id: order_id,
                customer_id: customer.id,
                status: STATUS_WEIGHTS[statuses.sample(&mut self.rng)].0,
                created_at: self.reference - TimeDelta::seconds(seconds_ago),
            });

            let item_count = self.rng.random_range(min_items..=max_items);
            let picked: Vec<&ProductModel> =
                products.choose_multiple(&mut self.rng, item_count).collect();
            for product in picked {
                order_items.push(OrderItemModel {
                    order_id,
                    product_id: product.id,
                    quantity: self.rng.random_range(QUANTITY_RANGE),
                    unit_price: product.price,
                });
            }
        }

        debug!(
            "Generated {} orders with {} order items",
            orders.len(),
            order_items.len()
        );
        Ok((orders, order_items))
    }
}

/// Generates and cleans a whole dataset.
///
/// Customers and products are cleaned before any order references them, so
/// every `customer_id` and `product_id` in the result resolves. Order lines
/// are cleaned last.
#[instrument(skip(config))]
pub fn generate_dataset(
    config: &GenerationConfig,
    seed: u64,
    reference: NaiveDateTime,
) -> Result<(Dataset, CleaningReport)> {
    let mut generator = DatasetGenerator::new(seed, reference);
    let mut report = CleaningReport::default();

    let mut customers = generator.generate_customers(config.customers)?;
    report.customers_removed = clean::clean_customers(&mut customers);

    let mut products = generator.generate_products(config.products);
    report.products_removed = clean::clean_products(&mut products);

    let (orders, mut order_items) = generator.generate_orders(
        config.orders,
        &customers,
        &products,
        config.min_items_per_order..=config.max_items_per_order,
    )?;
    report.order_items_removed = clean::clean_order_items(&mut order_items);

    info!(
        "Generated dataset: {} customers, {} products, {} orders, {} order items",
        customers.len(),
        products.len(),
        orders.len(),
        order_items.len()
    );

    Ok((
        Dataset {
            customers,
            products,
            orders,
            order_items,
        },
        report,
    ))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// Generated counts are bounded by memory, far below i64::MAX.
#[allow(clippy::cast_possible_wrap)]
const fn to_id(position: usize) -> i64 {
    position as i64
}
