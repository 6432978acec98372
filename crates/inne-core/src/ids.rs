//! Typed ID wrappers providing compile-time safety for entity identifiers.
//!
//! Each ID type is a newtype over the store-generated `i64` surrogate key,
//! preventing accidental misuse (e.g., passing a `RoomId` where a
//! `TherapistId` is expected).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Generate a newtype ID wrapper over `i64`.
///
/// The macro produces a struct with:
/// - `get()` returning the raw surrogate key
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`, `Serialize`, `Deserialize`
/// - `Display` and `FromStr` delegating to the inner integer
/// - `From<i64>` and `Into<i64>` conversions
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(i64);

            impl $name {
                /// Return the raw surrogate key.
                #[must_use]
                pub fn get(&self) -> i64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = ParseIntError;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    s.parse::<i64>().map(Self)
                }
            }

            impl From<i64> for $name {
                fn from(id: i64) -> Self {
                    Self(id)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Surrogate key of a clinic location.
    LocationId,
    /// Surrogate key of a therapist.
    TherapistId,
    /// Surrogate key of a customer.
    CustomerId,
    /// Surrogate key of a treatment room.
    RoomId,
    /// Surrogate key of a payment type.
    PaymentTypeId,
    /// Surrogate key of a therapy option.
    TherapyOptionId,
    /// Surrogate key of a booked session.
    SessionId,
}
