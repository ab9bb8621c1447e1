//! Shared primitive types and the closed enumerations of the data model.
//!
//! RULE: enumerated record fields use these types, never free strings.
//! Display text matches the labels written to JSON and CSV.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type AccountId = u64;
pub type CustomerId = u64;
pub type TransactionId = u64;
pub type FraudId = u64;
pub type RiskId = u64;

/// A 10-digit account number, unique within a dataset.
pub type AccountNumber = String;

/// Implements `Display` from the serde label and exposes the full variant list.
macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum!(AccountType {
    Savings => "Savings",
    Checking => "Checking",
    Business => "Business",
    Investment => "Investment",
    Credit => "Credit",
    Mortgage => "Mortgage",
});

labelled_enum!(AccountStatus {
    Active => "Active",
    Suspended => "Suspended",
    Limited => "Limited",
    Premium => "Premium",
    Vip => "VIP",
});

labelled_enum!(TransactionType {
    Deposit => "Deposit",
    Withdrawal => "Withdrawal",
    Transfer => "Transfer",
    Payment => "Payment",
    Refund => "Refund",
    Fee => "Fee",
    Interest => "Interest",
});

impl TransactionType {
    /// Debit types carry a negative amount.
    pub fn is_debit(&self) -> bool {
        matches!(self, Self::Withdrawal | Self::Payment | Self::Fee)
    }
}

labelled_enum!(TransactionStatus {
    Completed => "Completed",
    Pending => "Pending",
    Failed => "Failed",
    Reversed => "Reversed",
    Cancelled => "Cancelled",
});

labelled_enum!(IncomeLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    VeryHigh => "Very High",
});

labelled_enum!(RiskLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    VeryHigh => "Very High",
});

impl RiskLevel {
    /// Level for a score in [0, 100].
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            Self::Low
        } else if score < 50.0 {
            Self::Medium
        } else if score < 75.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }
}

labelled_enum!(Severity {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

labelled_enum!(FraudStatus {
    Detected => "Detected",
    Investigating => "Investigating",
    Resolved => "Resolved",
    FalsePositive => "False Positive",
});

/// Round to two fraction digits (cents).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
