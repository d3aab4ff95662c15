// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A submission that passes validation.
pub fn valid_submission() -> Value {
    json!({
        "name": "Alice",
        "email": "alice@example.com",
        "message": "Hi\nthere",
    })
}

/// Submissions lacking at least one required field.
pub fn incomplete_submissions() -> Vec<Value> {
    vec![
        json!({}),
        json!({ "email": "alice@example.com", "message": "Hi" }),
        json!({ "name": "Alice", "message": "Hi" }),
        json!({ "name": "Alice", "email": "alice@example.com" }),
        json!({ "name": "", "email": "alice@example.com", "message": "Hi" }),
        json!({ "name": "Alice", "email": "", "message": "Hi" }),
        json!({ "name": "Alice", "email": "alice@example.com", "message": "" }),
        json!({ "name": null, "email": "alice@example.com", "message": "Hi" }),
    ]
}

/// Email values that must fail the shape check.
pub fn malformed_emails() -> Vec<&'static str> {
    vec![
        "not-an-email",
        "a@b",
        "@b.com",
        "alice@",
        "alice@example.",
        "alice smith@example.com",
        "alice@exa mple.com",
        "alice@@example.com",
    ]
}

/// Email values that must pass the shape check.
pub fn acceptable_emails() -> Vec<&'static str> {
    vec![
        "a@b.co",
        "alice@example.com",
        "first.last+tag@mail.example.org",
        "UPPER@EXAMPLE.COM",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }
}
