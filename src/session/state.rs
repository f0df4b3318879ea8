//! Conversation state and step validation.
//!
//! Each user is in exactly one `SessionState` at a time. Transitions are
//! strictly forward within a flow; input that does not match the current
//! step's expected shape leaves the state untouched and yields a
//! validation error for re-prompting.

use crate::accounts::AccountAddress;

/// Flow families. One active flow per user; beginning a different
/// family while one is in progress is a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Send,
    Swap,
}

impl FlowKind {
    pub fn name(&self) -> &'static str {
        match self {
            FlowKind::Send => "send",
            FlowKind::Swap => "swap",
        }
    }
}

/// Per-user conversation position. Exactly one branch active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingRecipient,
    AwaitingAmount {
        recipient: AccountAddress,
    },
    SwapSelectFrom,
    SwapSelectTo {
        from_token: String,
    },
    SwapAwaitingAmount {
        from_token: String,
        to_token: String,
    },
}

impl SessionState {
    /// The flow family this state belongs to, if any.
    pub fn flow(&self) -> Option<FlowKind> {
        match self {
            SessionState::Idle => None,
            SessionState::AwaitingRecipient | SessionState::AwaitingAmount { .. } => {
                Some(FlowKind::Send)
            }
            SessionState::SwapSelectFrom
            | SessionState::SwapSelectTo { .. }
            | SessionState::SwapAwaitingAmount { .. } => Some(FlowKind::Swap),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

/// The data a completed flow hands to execution. Amounts are already
/// scaled to integer subunits of the relevant token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowPayload {
    Send {
        recipient: AccountAddress,
        amount: u64,
    },
    Swap {
        from_token: String,
        to_token: String,
        amount: u64,
    },
}

/// Parse a user-supplied decimal amount into integer subunits.
///
/// String arithmetic only; no floats near money. Rejects zero,
/// negatives, malformed text, and more fractional digits than the
/// token carries.
pub fn parse_amount(text: &str, decimals: u8) -> Result<u64, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("expected a positive decimal amount".to_string());
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err("expected a positive decimal amount".to_string());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(format!("'{text}' is not a positive decimal amount"));
    }
    if frac_part.len() > decimals as usize {
        return Err(format!(
            "at most {decimals} decimal places are supported for this token"
        ));
    }

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| format!("{decimals} decimal places are not representable"))?;
    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| format!("'{text}' is too large"))?
    };

    let frac_value: u128 = if frac_part.is_empty() {
        0
    } else {
        let parsed: u128 = frac_part.parse().map_err(|_| format!("'{text}' is too large"))?;
        parsed * 10u128.pow((decimals as usize - frac_part.len()) as u32)
    };

    let total = int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| format!("'{text}' is too large"))?;

    if total == 0 {
        return Err("amount must be greater than zero".to_string());
    }
    u64::try_from(total).map_err(|_| format!("'{text}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_and_fractional_amounts_scale() {
        assert_eq!(parse_amount("5", 8).unwrap(), 500_000_000);
        assert_eq!(parse_amount("0.5", 8).unwrap(), 50_000_000);
        assert_eq!(parse_amount("1.25", 6).unwrap(), 1_250_000);
        assert_eq!(parse_amount(".5", 2).unwrap(), 50);
        assert_eq!(parse_amount("3.", 2).unwrap(), 300);
        assert_eq!(parse_amount(" 42 ", 0).unwrap(), 42);
    }

    #[test]
    fn zero_and_negative_are_rejected() {
        assert!(parse_amount("0", 8).is_err());
        assert!(parse_amount("0.000", 8).is_err());
        assert!(parse_amount("-1", 8).is_err());
    }

    #[test]
    fn malformed_amounts_are_rejected() {
        for bad in ["", ".", "abc", "1.2.3", "1e5", "NaN", "1,5"] {
            assert!(parse_amount(bad, 8).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn excess_precision_is_rejected() {
        assert!(parse_amount("1.234567", 6).is_ok());
        assert!(parse_amount("1.2345678", 6).is_err());
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(parse_amount("999999999999999999999", 18).is_err());
    }

    #[test]
    fn unrepresentable_decimal_scales_are_an_error() {
        // 10^40 does not fit in u128; the parser must refuse, not panic.
        assert!(parse_amount("1", 40).is_err());
        assert!(parse_amount("1", u8::MAX).is_err());
    }

    #[test]
    fn states_map_to_flows() {
        assert_eq!(SessionState::Idle.flow(), None);
        assert_eq!(
            SessionState::AwaitingRecipient.flow(),
            Some(FlowKind::Send)
        );
        assert_eq!(
            SessionState::SwapSelectTo {
                from_token: "tUSDC".to_string()
            }
            .flow(),
            Some(FlowKind::Swap)
        );
    }
}
