//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use tablebook_entity::reservation::Reservation;
use tablebook_service::BucketOccupancy;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Reservation display row
#[derive(Debug, Serialize, Tabled)]
pub struct ReservationRow {
    /// Reservation ID
    pub id: i64,
    /// Date
    pub date: String,
    /// Time
    pub time: String,
    /// Party size
    pub people: i32,
    /// Area
    pub area: String,
    /// Owner
    pub user_id: i64,
}

impl From<&Reservation> for ReservationRow {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id.get(),
            date: r.reservation_date.to_string(),
            time: r.reservation_time.format("%H:%M").to_string(),
            people: r.party_size,
            area: r.area.to_string(),
            user_id: r.user_id.get(),
        }
    }
}

/// Occupancy display row
#[derive(Debug, Serialize, Tabled)]
pub struct OccupancyRow {
    /// Area
    pub area: String,
    /// Date
    pub date: String,
    /// Seat ceiling
    pub capacity: u32,
    /// Seats taken
    pub reserved: i64,
    /// Seats free
    pub remaining: i64,
}

impl From<&BucketOccupancy> for OccupancyRow {
    fn from(o: &BucketOccupancy) -> Self {
        Self {
            area: o.area.to_string(),
            date: o.date.to_string(),
            capacity: o.capacity,
            reserved: o.reserved,
            remaining: o.remaining,
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single reservation in the selected format
pub fn print_reservation(reservation: &Reservation, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("ID", &reservation.id.to_string());
            print_kv("Date", &reservation.reservation_date.to_string());
            print_kv("Time", &reservation.reservation_time.format("%H:%M").to_string());
            print_kv("People", &reservation.party_size.to_string());
            print_kv("Area", reservation.area.as_str());
            print_kv("User", &reservation.user_id.to_string());
            print_kv("Created", &reservation.created_at.format("%Y-%m-%d %H:%M").to_string());
            print_kv("Updated", &reservation.updated_at.format("%Y-%m-%d %H:%M").to_string());
        }
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(reservation).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<12} {}", format!("{key}:"), value);
}
