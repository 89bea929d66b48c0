use std::{
    net::{IpAddr, Ipv4Addr},
    sync::LazyLock,
};

use chrono::{DateTime, TimeZone, Utc};

pub mod contact;

pub const CLIENT_IP_1: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
pub const CLIENT_IP_2: IpAddr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 42));

/// Monday, January 6, 2025 at 02:30 PM UTC
pub static NOW: LazyLock<DateTime<Utc>> =
    LazyLock::new(|| Utc.with_ymd_and_hms(2025, 1, 6, 14, 30, 0).unwrap());
