//! Parser for ISC dhclient lease files.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lease {
    pub interface: Option<String>,
    pub fixed_address: Option<String>,
    pub expire: Option<DateTime<Utc>>,
}

/// All `lease { ... }` blocks in file order.
pub fn parse_leases(text: &str) -> Vec<Lease> {
    let mut leases = Vec::new();
    let mut current: Option<Lease> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("lease") && line.ends_with('{') {
            current = Some(Lease::default());
            continue;
        }
        if line == "}" {
            if let Some(lease) = current.take() {
                leases.push(lease);
            }
            continue;
        }
        let Some(lease) = current.as_mut() else {
            continue;
        };
        let statement = line.trim_end_matches(';');
        if let Some(rest) = statement.strip_prefix("interface ") {
            lease.interface = Some(rest.trim().trim_matches('"').to_string());
        } else if let Some(rest) = statement.strip_prefix("fixed-address ") {
            lease.fixed_address = Some(rest.trim().to_string());
        } else if let Some(rest) = statement.strip_prefix("expire ") {
            lease.expire = parse_lease_time(rest);
        }
    }

    leases
}

/// The last lease per interface that carries an address; later blocks
/// supersede earlier ones.
pub fn latest_by_interface(leases: Vec<Lease>) -> HashMap<String, Lease> {
    let mut latest = HashMap::new();
    for lease in leases {
        if lease.fixed_address.is_none() {
            continue;
        }
        if let Some(iface) = lease.interface.clone() {
            latest.insert(iface, lease);
        }
    }
    latest
}

/// `2 2016/03/08 21:01:02` (weekday, date, time in UTC). `never` has no expiry.
fn parse_lease_time(value: &str) -> Option<DateTime<Utc>> {
    let mut parts = value.split_whitespace();
    let _weekday = parts.next()?;
    let date = parts.next()?;
    let time = parts.next()?;
    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y/%m/%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
