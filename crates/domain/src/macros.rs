//! Macro for implementing Display and FromStr for phase and policy enums
//!
//! Session phases and configuration policies travel through logs,
//! environment variables and config files as lowercase strings. This macro
//! gives every such enum the same case-insensitive round trip.
//!
//! # Example
//!
//! ```rust
//! use taskflow_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Transport {
//!     Cookie,
//!     Body,
//! }
//!
//! impl_domain_status_conversions!(Transport {
//!     Cookie => "cookie",
//!     Body => "body",
//! });
//!
//! assert_eq!(Transport::Body.to_string(), "body");
//! assert_eq!("COOKIE".parse::<Transport>(), Ok(Transport::Cookie));
//! ```

/// Implements Display and FromStr traits for string-backed enums
///
/// This macro generates:
/// - Display trait: converts enum variants to their canonical strings
/// - FromStr trait: parses case-insensitive strings to enum variants
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
