//! Built-in currency defaults used before (or instead of) upstream data.

/// Default base currency when none is supplied or the supplied one is invalid.
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Default target currencies shown when none are requested.
pub const DEFAULT_TARGET_CURRENCIES: [&str; 5] = ["EUR", "GBP", "JPY", "CAD", "AUD"];

/// Static whitelist of common currency codes, used until the upstream list
/// has been fetched and kept if that fetch fails.
pub const DEFAULT_CURRENCIES: [&str; 15] = [
    "USD", // United States Dollar
    "EUR", // Euro
    "GBP", // British Pound
    "JPY", // Japanese Yen
    "CAD", // Canadian Dollar
    "AUD", // Australian Dollar
    "CHF", // Swiss Franc
    "CNY", // Chinese Yuan
    "HKD", // Hong Kong Dollar
    "NZD", // New Zealand Dollar
    "SEK", // Swedish Krona
    "NOK", // Norwegian Krone
    "SGD", // Singapore Dollar
    "KRW", // South Korean Won
    "INR", // Indian Rupee
];
