//! Overall authentication score

use crate::authentication::CheckStatus;

pub const SPF_WEIGHT: u32 = 30;
pub const DMARC_WEIGHT: u32 = 30;
pub const DKIM_WEIGHT: u32 = 25;
pub const BIMI_WEIGHT: u32 = 10;
pub const MTA_STS_WEIGHT: u32 = 5;

/// Points earned for one check, in half points
fn half_points(status: CheckStatus, weight: u32) -> u32 {
    match status {
        CheckStatus::Pass => weight * 2,
        CheckStatus::Warn => weight,
        CheckStatus::Fail => 0,
    }
}

/// Weighted score in `[0, 100]`
///
/// A warn earns half the weight of its check; the sum is rounded half up.
pub fn overall_score(
    spf: CheckStatus,
    dmarc: CheckStatus,
    dkim: CheckStatus,
    bimi: CheckStatus,
    mta_sts: CheckStatus,
) -> u8 {
    let half = half_points(spf, SPF_WEIGHT)
        + half_points(dmarc, DMARC_WEIGHT)
        + half_points(dkim, DKIM_WEIGHT)
        + half_points(bimi, BIMI_WEIGHT)
        + half_points(mta_sts, MTA_STS_WEIGHT);

    ((half + 1) / 2).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use CheckStatus::{Fail, Pass, Warn};

    #[test]
    fn test_weights_sum_to_100() {
        assert_eq!(
            SPF_WEIGHT + DMARC_WEIGHT + DKIM_WEIGHT + BIMI_WEIGHT + MTA_STS_WEIGHT,
            100
        );
    }

    #[test]
    fn test_bounds() {
        assert_eq!(overall_score(Pass, Pass, Pass, Pass, Pass), 100);
        assert_eq!(overall_score(Fail, Fail, Fail, Fail, Fail), 0);
    }

    #[test]
    fn test_warn_earns_half() {
        assert_eq!(overall_score(Warn, Fail, Fail, Fail, Fail), 15);
        // 12.5 rounds up
        assert_eq!(overall_score(Fail, Fail, Warn, Fail, Fail), 13);
        // 30 + 30 + 25 + 5 + 2.5
        assert_eq!(overall_score(Pass, Pass, Pass, Warn, Warn), 93);
        // 12.5 + 2.5
        assert_eq!(overall_score(Fail, Fail, Warn, Fail, Warn), 15);
    }

    #[test]
    fn test_all_combinations_in_range() {
        let statuses = [Pass, Warn, Fail];
        for spf in statuses {
            for dmarc in statuses {
                for dkim in statuses {
                    for bimi in statuses {
                        for mta_sts in statuses {
                            assert!(overall_score(spf, dmarc, dkim, bimi, mta_sts) <= 100);
                        }
                    }
                }
            }
        }
    }
}
