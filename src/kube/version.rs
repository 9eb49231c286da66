//! CronJob reached `batch/v1` in Kubernetes 1.21. Older servers only serve
//! `batch/v1beta1`.

const CRONJOB_GA_MINOR: u32 = 21;

/// Whether a server reporting `major`/`minor` serves `batch/v1` CronJobs.
///
/// Vendor suffixes such as `21+` are ignored. A version that cannot be parsed
/// is assumed to be recent.
pub fn is_cronjob_ga(major: &str, minor: &str) -> bool {
    match (leading_number(major), leading_number(minor)) {
        (Some(major), _) if major > 1 => true,
        (Some(1), Some(minor)) => minor >= CRONJOB_GA_MINOR,
        (Some(_), _) => false,
        (None, _) => true,
    }
}

fn leading_number(raw: &str) -> Option<u32> {
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cronjob_ga_versions() {
        assert!(is_cronjob_ga("1", "21"));
        assert!(is_cronjob_ga("1", "30"));
        assert!(is_cronjob_ga("1", "27+"));
        assert!(is_cronjob_ga("2", "0"));
        assert!(!is_cronjob_ga("1", "20"));
        assert!(!is_cronjob_ga("1", "9"));
        assert!(!is_cronjob_ga("1", "19+"));
        assert!(!is_cronjob_ga("0", "99"));
    }

    #[test]
    fn unparseable_version_is_assumed_recent() {
        assert!(is_cronjob_ga("", ""));
        assert!(is_cronjob_ga("v", "x"));
        assert!(!is_cronjob_ga("1", ""));
    }
}
