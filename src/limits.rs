//! Daily usage limits and the upgrade-prompt gating derived from them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{ClientError, CourseApi};
use crate::credentials::Credentials;

/// Share of the limit at which the usage meter is shown to paid users.
pub const NEAR_LIMIT_RATIO: f64 = 0.8;

/// Daily generation usage reported by the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UsageLimits {
    pub used: u64,
    pub limit: u64,
}

impl UsageLimits {
    pub fn percentage(&self) -> u8 {
        get_percentage(self.used, self.limit)
    }

    /// At least 80% of the limit is consumed.
    pub fn is_near_limit(&self) -> bool {
        self.used as f64 >= self.limit as f64 * NEAR_LIMIT_RATIO
    }
}

/// Subscription status. Anything other than `none` is a paid plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingStatus {
    None,
    Active,
    PastDue,
    Canceled,
    Other(String),
}

impl BillingStatus {
    pub fn is_paid(&self) -> bool {
        !matches!(self, BillingStatus::None)
    }
}

impl From<String> for BillingStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "none" => BillingStatus::None,
            "active" => BillingStatus::Active,
            "past_due" => BillingStatus::PastDue,
            "canceled" => BillingStatus::Canceled,
            _ => BillingStatus::Other(s),
        }
    }
}

impl From<BillingStatus> for String {
    fn from(status: BillingStatus) -> Self {
        match status {
            BillingStatus::None => "none".to_string(),
            BillingStatus::Active => "active".to_string(),
            BillingStatus::PastDue => "past_due".to_string(),
            BillingStatus::Canceled => "canceled".to_string(),
            BillingStatus::Other(s) => s,
        }
    }
}

/// Billing details of the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BillingDetails {
    pub status: BillingStatus,
}

/// Which usage and upgrade affordances to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsellDecision {
    pub usage_percentage: u8,
    /// Show the "N% of the daily limit used" meter
    pub show_usage_meter: bool,
    /// Show the upgrade button
    pub show_upgrade_prompt: bool,
}

impl UpsellDecision {
    pub fn evaluate(limits: &UsageLimits, billing: &BillingDetails) -> Self {
        let paid = billing.status.is_paid();
        Self {
            usage_percentage: limits.percentage(),
            show_usage_meter: !paid || limits.is_near_limit(),
            show_upgrade_prompt: !paid,
        }
    }
}

/// Fetch limits and billing details together and decide what to show.
pub async fn fetch_upsell<A: CourseApi + ?Sized>(
    api: &A,
    credentials: &Credentials,
) -> Result<UpsellDecision, ClientError> {
    let (limits, billing) = tokio::try_join!(
        api.course_limits(credentials),
        api.billing_details(credentials)
    )?;
    let decision = UpsellDecision::evaluate(&limits, &billing);
    debug!(
        "Usage {}/{} ({}%), billing {:?}: {:?}",
        limits.used, limits.limit, decision.usage_percentage, billing.status, decision
    );
    Ok(decision)
}

/// Rounded percentage of `portion` in `total`, clamped to `0..=100`.
///
/// # Example
/// ```
/// use lessonstream::limits::get_percentage;
///
/// assert_eq!(get_percentage(1, 3), 33);
/// assert_eq!(get_percentage(5, 0), 0);
/// assert_eq!(get_percentage(12, 10), 100);
/// ```
pub fn get_percentage(portion: u64, total: u64) -> u8 {
    if portion == 0 || total == 0 {
        return 0;
    }
    if portion >= total {
        return 100;
    }
    ((portion as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billing(status: &str) -> BillingDetails {
        serde_json::from_value(serde_json::json!({ "status": status })).unwrap()
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(get_percentage(0, 10), 0);
        assert_eq!(get_percentage(2, 3), 67);
        assert_eq!(get_percentage(1, 200), 1);
        assert_eq!(get_percentage(10, 10), 100);
    }

    #[test]
    fn test_near_limit_threshold() {
        assert!(!UsageLimits { used: 7, limit: 10 }.is_near_limit());
        assert!(UsageLimits { used: 8, limit: 10 }.is_near_limit());
        assert!(UsageLimits { used: 0, limit: 0 }.is_near_limit());
    }

    #[test]
    fn test_free_user_always_sees_meter_and_upgrade() {
        let decision = UpsellDecision::evaluate(&UsageLimits { used: 1, limit: 10 }, &billing("none"));
        assert!(decision.show_usage_meter);
        assert!(decision.show_upgrade_prompt);
        assert_eq!(decision.usage_percentage, 10);
    }

    #[test]
    fn test_paid_user_sees_meter_only_near_limit() {
        let paid = billing("active");

        let low = UpsellDecision::evaluate(&UsageLimits { used: 3, limit: 10 }, &paid);
        assert!(!low.show_usage_meter);
        assert!(!low.show_upgrade_prompt);

        let high = UpsellDecision::evaluate(&UsageLimits { used: 9, limit: 10 }, &paid);
        assert!(high.show_usage_meter);
        assert!(!high.show_upgrade_prompt);
    }

    #[test]
    fn test_unknown_status_counts_as_paid() {
        let details = billing("trialing");
        assert_eq!(details.status, BillingStatus::Other("trialing".to_string()));
        assert!(details.status.is_paid());
        assert_eq!(serde_json::to_value(&details).unwrap()["status"], "trialing");
    }
}
