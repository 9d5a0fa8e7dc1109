//! Sample data set for the mock backend.

use chrono::{DateTime, TimeZone, Utc};
use lattice_commons::{Customer, CustomerStatus};

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .expect("hard-coded seed timestamp is valid")
}

/// The three-customer development data set.
///
/// Identifiers are stable ("1".."3") so demos and tests can reference them
/// directly.
pub fn sample_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "1".into(),
            name: "Acme Corporation".to_string(),
            email: "contact@acme.com".to_string(),
            phone: Some("+1 (555) 123-4567".to_string()),
            company: Some("Acme Corporation".to_string()),
            status: CustomerStatus::Active,
            total_value: 45000.0,
            last_contact: Some(ts(2024, 1, 18, 9, 15, 0)),
            created_at: ts(2024, 1, 15, 10, 0, 0),
            updated_at: ts(2024, 1, 20, 15, 30, 0),
        },
        Customer {
            id: "2".into(),
            name: "TechStart Inc.".to_string(),
            email: "hello@techstart.io".to_string(),
            phone: Some("+1 (555) 987-6543".to_string()),
            company: Some("TechStart Inc.".to_string()),
            status: CustomerStatus::Prospect,
            total_value: 12000.0,
            last_contact: Some(ts(2024, 1, 17, 16, 20, 0)),
            created_at: ts(2024, 1, 10, 14, 20, 0),
            updated_at: ts(2024, 1, 19, 11, 45, 0),
        },
        Customer {
            id: "3".into(),
            name: "Global Solutions Ltd.".to_string(),
            email: "info@globalsolutions.com".to_string(),
            phone: Some("+1 (555) 456-7890".to_string()),
            company: Some("Global Solutions Ltd.".to_string()),
            status: CustomerStatus::Active,
            total_value: 78500.0,
            last_contact: Some(ts(2024, 1, 19, 10, 30, 0)),
            created_at: ts(2024, 1, 5, 8, 30, 0),
            updated_at: ts(2024, 1, 21, 13, 10, 0),
        },
    ]
}
