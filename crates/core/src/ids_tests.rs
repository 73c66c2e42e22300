// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn load_balancer_id_displays_as_str() {
    let id = LoadBalancerId::new("lb-1");
    assert_eq!(id.to_string(), "lb-1");
    assert_eq!(id.as_str(), "lb-1");
}

#[test]
fn ip_address_accepts_dotted_quad() {
    let ip = IpAddress::parse("1.1.1.1").unwrap();
    assert_eq!(ip.as_str(), "1.1.1.1");
}

#[test]
fn ip_address_rejects_missing_octet() {
    assert!(IpAddress::parse("1.1.1").is_err());
}

#[test]
fn ip_address_rejects_non_numeric_octet() {
    assert!(IpAddress::parse("1.1.1.x").is_err());
}

#[test]
fn ip_address_rejects_empty_octet() {
    assert!(IpAddress::parse("1..1.1").is_err());
}

#[test]
fn ids_are_usable_as_hashmap_keys_with_str_lookup() {
    use std::collections::HashMap;
    let mut map: HashMap<JobId, u32> = HashMap::new();
    map.insert(JobId::new("job-1"), 42);
    assert_eq!(map.get("job-1"), Some(&42));
}
