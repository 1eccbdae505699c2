//! FILENAME: tests/common/mod.rs
//! Shared record fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use group_engine::impl_record;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub a: i32,
}

impl_record!(Item { a });

pub fn items(values: &[i32]) -> Vec<Item> {
    values.iter().map(|&a| Item { a }).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub name: String,
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sale {
    pub id: u32,
    pub region: String,
    pub amount: Decimal,
    pub sold_at: NaiveDateTime,
    pub customer: Customer,
}

impl_record!(Address { city, country });
impl_record!(Customer { name, address => ?Address });
impl_record!(Sale {
    id,
    region,
    amount,
    sold_at,
    customer => Customer,
});

pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid fixture date")
}

fn sale(id: u32, region: &str, amount: i64, sold_at: NaiveDateTime, city: Option<&str>) -> Sale {
    Sale {
        id,
        region: region.to_string(),
        amount: Decimal::from(amount),
        sold_at,
        customer: Customer {
            name: format!("customer-{}", id),
            address: city.map(|c| Address {
                city: c.to_string(),
                country: "NO".to_string(),
            }),
        },
    }
}

/// Six sales over two regions and two years.
pub fn sales() -> Vec<Sale> {
    vec![
        sale(1, "North", 120, date(2022, 3, 4), Some("Oslo")),
        sale(2, "South", 75, date(2023, 3, 9), Some("Bergen")),
        sale(3, "North", 310, date(2023, 7, 1), None),
        sale(4, "North", 45, date(2022, 11, 20), Some("Oslo")),
        sale(5, "South", 199, date(2022, 1, 15), Some("Oslo")),
        sale(6, "North", 88, date(2023, 12, 31), Some("Bergen")),
    ]
}

pub fn ids(records: &[&Sale]) -> Vec<u32> {
    records.iter().map(|s| s.id).collect()
}
