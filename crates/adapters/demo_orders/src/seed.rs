//! Fixed demo data, dated relative to the moment the book is seeded.

use chrono::TimeDelta;

use ordercron_domain::time::Timestamp;

use crate::order::DemoOrder;

// (hours before seeding, financial status, fulfillment status, tags)
const SEED: [(i64, &str, Option<&str>, &[&str]); 10] = [
    (2, "pending", None, &[]),
    (5, "paid", None, &["vip"]),
    (20, "paid", Some("fulfilled"), &[]),
    (30, "authorized", None, &["wholesale"]),
    (52, "pending", None, &[]),
    (75, "refunded", Some("fulfilled"), &["returned"]),
    (150, "partially_paid", Some("partial"), &[]),
    (400, "paid", Some("fulfilled"), &["vip"]),
    (900, "voided", None, &[]),
    (4000, "paid", Some("fulfilled"), &[]),
];

const CUSTOMERS: [&str; 4] = [
    "ada@example.com",
    "grace@example.com",
    "linus@example.com",
    "barbara@example.com",
];

pub(crate) fn orders(now: Timestamp) -> Vec<DemoOrder> {
    SEED.iter()
        .zip(1001_u64..)
        .zip(CUSTOMERS.iter().cycle())
        .map(|((&(hours, financial, fulfillment, tags), id), email)| DemoOrder {
            id,
            name: format!("#{id}"),
            email: (*email).to_string(),
            created_at: now - TimeDelta::hours(hours),
            financial_status: financial.to_string(),
            fulfillment_status: fulfillment.map(str::to_string),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        })
        .collect()
}
