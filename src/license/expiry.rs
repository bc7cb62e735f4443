//! Expiry policy for self-generated licenses.

use crate::license::model::LicenseType;
use crate::LicenseError;
use chrono::{DateTime, Duration, Utc};

/// Lifetime of a self-generated basic license.
pub const BASIC_LICENSE_DURATION: Duration = Duration::days(365);

/// Lifetime of a self-generated trial license.
pub const TRIAL_LICENSE_DURATION: Duration = Duration::days(30);

/// Lifetime used for any other type when no expiry was requested.
pub const DEFAULT_LICENSE_DURATION: Duration = Duration::days(365);

/// Expiry value meaning "use the policy default", not "never expires".
pub const DEFAULT_EXPIRY_SENTINEL: i64 = -1;

/// Default lifetime for a license type.
pub fn default_duration(license_type: LicenseType, basic_duration: Duration) -> Duration {
    match license_type {
        LicenseType::Basic => basic_duration,
        LicenseType::Trial => TRIAL_LICENSE_DURATION,
        _ => DEFAULT_LICENSE_DURATION,
    }
}

/// `issue_date + default_duration`, or `MalformedLicense` if that is not a
/// representable instant.
pub fn default_expiry(
    license_type: LicenseType,
    issue_date: DateTime<Utc>,
    basic_duration: Duration,
) -> Result<DateTime<Utc>, LicenseError> {
    checked_expiry(issue_date, default_duration(license_type, basic_duration))
}

/// `issue_date + lifetime` without overflowing.
pub fn checked_expiry(
    issue_date: DateTime<Utc>,
    lifetime: Duration,
) -> Result<DateTime<Utc>, LicenseError> {
    issue_date.checked_add_signed(lifetime).ok_or_else(|| {
        LicenseError::MalformedLicense(format!(
            "expiry out of range: {} + {}",
            issue_date, lifetime
        ))
    })
}

/// Resolve a requested expiry (epoch millis) into an instant.
///
/// [`DEFAULT_EXPIRY_SENTINEL`] resolves to [`default_expiry`].
pub fn resolve_expiry(
    license_type: LicenseType,
    issue_date: DateTime<Utc>,
    requested_millis: i64,
    basic_duration: Duration,
) -> Result<DateTime<Utc>, LicenseError> {
    if requested_millis == DEFAULT_EXPIRY_SENTINEL {
        return default_expiry(license_type, issue_date, basic_duration);
    }
    DateTime::from_timestamp_millis(requested_millis).ok_or_else(|| {
        LicenseError::MalformedLicense(format!("expiry out of range: {}", requested_millis))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sentinel_resolves_to_type_default() {
        let issued = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let basic = resolve_expiry(
            LicenseType::Basic,
            issued,
            DEFAULT_EXPIRY_SENTINEL,
            BASIC_LICENSE_DURATION,
        )
        .unwrap();
        assert_eq!(basic, issued + BASIC_LICENSE_DURATION);

        let trial = resolve_expiry(
            LicenseType::Trial,
            issued,
            DEFAULT_EXPIRY_SENTINEL,
            BASIC_LICENSE_DURATION,
        )
        .unwrap();
        assert_eq!(trial, issued + TRIAL_LICENSE_DURATION);
    }

    #[test]
    fn configured_basic_duration_is_honored() {
        let issued = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let expiry = resolve_expiry(
            LicenseType::Basic,
            issued,
            DEFAULT_EXPIRY_SENTINEL,
            Duration::days(7),
        )
        .unwrap();
        assert_eq!(expiry, issued + Duration::days(7));
    }

    #[test]
    fn literal_expiry_is_kept() {
        let issued = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let wanted = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let expiry = resolve_expiry(
            LicenseType::Gold,
            issued,
            wanted.timestamp_millis(),
            BASIC_LICENSE_DURATION,
        )
        .unwrap();
        assert_eq!(expiry, wanted);
    }

    #[test]
    fn default_expiry_overflow_is_malformed() {
        let result = default_expiry(LicenseType::Basic, DateTime::<Utc>::MAX_UTC, Duration::days(1));
        assert!(matches!(result, Err(LicenseError::MalformedLicense(_))));

        let issued = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let result = resolve_expiry(
            LicenseType::Basic,
            issued,
            DEFAULT_EXPIRY_SENTINEL,
            Duration::MAX,
        );
        assert!(matches!(result, Err(LicenseError::MalformedLicense(_))));
    }

    #[test]
    fn out_of_range_expiry_is_malformed() {
        let issued = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let result = resolve_expiry(LicenseType::Gold, issued, i64::MAX, BASIC_LICENSE_DURATION);
        assert!(matches!(result, Err(LicenseError::MalformedLicense(_))));
    }
}
