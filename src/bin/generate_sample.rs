//! Writes a synthetic Superstore-style sales file for trying the dashboard.
//!
//! `generate_sample --rows 2000 --out-dir data` produces `Superstore.csv`
//! and `Superstore.parquet`. The CSV mixes ISO and US-style order dates.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;

#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Number of order lines to generate
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory the sample files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// region -> state -> cities
const GEOGRAPHY: &[(&str, &[(&str, &[&str])])] = &[
    ("East", &[
        ("New York", &["New York City", "Buffalo", "Rochester"]),
        ("Pennsylvania", &["Philadelphia", "Pittsburgh"]),
        ("Ohio", &["Columbus", "Cleveland"]),
    ]),
    ("West", &[
        ("California", &["Los Angeles", "San Francisco", "San Diego"]),
        ("Washington", &["Seattle", "Spokane"]),
    ]),
    ("Central", &[
        ("Texas", &["Houston", "Dallas", "Austin"]),
        ("Illinois", &["Chicago", "Naperville"]),
    ]),
    ("South", &[
        ("Florida", &["Miami", "Jacksonville"]),
        ("Georgia", &["Atlanta"]),
    ]),
];

// category -> (sub-category, typical unit price)
const CATALOG: &[(&str, &[(&str, f64)])] = &[
    ("Furniture", &[("Chairs", 180.0), ("Tables", 320.0), ("Bookcases", 240.0), ("Furnishings", 45.0)]),
    ("Office Supplies", &[("Paper", 12.0), ("Binders", 18.0), ("Storage", 70.0), ("Art", 9.0)]),
    ("Technology", &[("Phones", 210.0), ("Accessories", 55.0), ("Machines", 480.0), ("Copiers", 900.0)]),
];

const SEGMENTS: &[&str] = &["Consumer", "Corporate", "Home Office"];

struct Order {
    date: String,
    region: &'static str,
    state: &'static str,
    city: &'static str,
    category: &'static str,
    sub_category: &'static str,
    segment: &'static str,
    sales: f64,
    profit: f64,
    quantity: i64,
}

fn generate(rng: &mut SimpleRng, rows: usize) -> Vec<Order> {
    let first_day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
    let span_days = 4 * 365;

    (0..rows)
        .map(|_| {
            let date = first_day + Duration::days(rng.below(span_days) as i64);
            let date = if rng.next_f64() < 0.5 {
                date.format("%Y-%m-%d").to_string()
            } else {
                date.format("%m/%d/%Y").to_string()
            };

            let (region, states) = *rng.pick(GEOGRAPHY);
            let (state, cities) = *rng.pick(states);
            let city = *rng.pick(cities);
            let (category, subs) = *rng.pick(CATALOG);
            let (sub_category, price) = *rng.pick(subs);

            let quantity = 1 + rng.below(9) as i64;
            let unit = (price * rng.gauss(1.0, 0.2)).max(1.0);
            let sales = (unit * quantity as f64 * 100.0).round() / 100.0;
            let margin = rng.gauss(0.12, 0.15);
            let profit = (sales * margin * 100.0).round() / 100.0;

            Order {
                date,
                region,
                state,
                city,
                category,
                sub_category,
                segment: *rng.pick(SEGMENTS),
                sales,
                profit,
                quantity,
            }
        })
        .collect()
}

const HEADER: [&str; 10] = [
    "Order Date",
    "Region",
    "State",
    "City",
    "Category",
    "Sub-Category",
    "Segment",
    "Sales",
    "Profit",
    "Quantity",
];

fn write_csv(path: &Path, orders: &[Order]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(HEADER)?;
    for o in orders {
        let sales = format!("{:.2}", o.sales);
        let profit = format!("{:.2}", o.profit);
        let quantity = o.quantity.to_string();
        writer.write_record([
            o.date.as_str(),
            o.region,
            o.state,
            o.city,
            o.category,
            o.sub_category,
            o.segment,
            sales.as_str(),
            profit.as_str(),
            quantity.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn text_column(orders: &[Order], field: fn(&Order) -> &str) -> StringArray {
    StringArray::from(orders.iter().map(field).collect::<Vec<_>>())
}

fn write_parquet(path: &Path, orders: &[Order]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        HEADER[..7]
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .chain([
                Field::new("Sales", DataType::Float64, false),
                Field::new("Profit", DataType::Float64, false),
                Field::new("Quantity", DataType::Int64, false),
            ])
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text_column(orders, |o| o.date.as_str())),
            Arc::new(text_column(orders, |o| o.region)),
            Arc::new(text_column(orders, |o| o.state)),
            Arc::new(text_column(orders, |o| o.city)),
            Arc::new(text_column(orders, |o| o.category)),
            Arc::new(text_column(orders, |o| o.sub_category)),
            Arc::new(text_column(orders, |o| o.segment)),
            Arc::new(Float64Array::from(orders.iter().map(|o| o.sales).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(orders.iter().map(|o| o.profit).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(orders.iter().map(|o| o.quantity).collect::<Vec<_>>())),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let orders = generate(&mut rng, args.rows);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let csv_path = args.out_dir.join("Superstore.csv");
    write_csv(&csv_path, &orders)?;
    log::info!("wrote {}", csv_path.display());

    let parquet_path = args.out_dir.join("Superstore.parquet");
    write_parquet(&parquet_path, &orders)?;
    log::info!("wrote {}", parquet_path.display());

    println!("Wrote {} orders to {}", orders.len(), args.out_dir.display());
    Ok(())
}
