//! Static segment descriptions for the pre-trained model's clusters
//!
//! The table must be kept in sync with the model artifact by hand: cluster
//! ids are only meaningful for the centroids they were fitted with. Adding a
//! segment is a new `SEGMENTS` entry.

use crate::model::ClusterId;
use serde::Serialize;

/// Business meaning of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentProfile {
    pub cluster: ClusterId,
    pub name: &'static str,
    pub characteristics: &'static str,
    pub retention: &'static [&'static str],
    pub campaign: &'static [&'static str],
    /// RGB accent used when rendering the segment card
    #[serde(skip)]
    pub accent: (u8, u8, u8),
}

/// Segments of the current three-cluster RFM model
pub const SEGMENTS: &[SegmentProfile] = &[
    SegmentProfile {
        cluster: 0,
        name: "Satisfied & Low-Spend Buyers",
        characteristics: "Customers with small transaction values, low product prices and little \
            use of installments, but high review scores. Purchases are dominated by home \
            essentials.",
        retention: &[
            "Loyalty points for repeat purchases.",
            "Free shipping above a low-to-mid minimum spend.",
            "Reminder campaigns to drive repeat purchases.",
        ],
        campaign: &[
            "Bundles of home-essential products.",
            "Cross-selling of complementary household products.",
            "Light flash sales to encourage impulse buying.",
        ],
        accent: (79, 172, 254),
    },
    SegmentProfile {
        cluster: 1,
        name: "High-Spend At-Risk Buyers",
        characteristics: "High spenders with low purchase frequency and low review scores, \
            concentrated in office furniture. A high-value segment with elevated churn risk.",
        retention: &[
            "Priority customer service.",
            "Proactive follow-up after large purchases.",
            "Service recovery for low reviews.",
        ],
        campaign: &[
            "Exclusive office furniture offers.",
            "Extended warranty or free installation.",
            "Compensation vouchers after negative experiences.",
        ],
        accent: (255, 75, 75),
    },
    SegmentProfile {
        cluster: 2,
        name: "Premium Installment Buyers",
        characteristics: "Buyers of premium, high-priced products who rely heavily on \
            installments. Low frequency and large transaction values, with fairly high but \
            variable review scores.",
        retention: &[
            "VIP customer program.",
            "Dedicated customer support.",
            "Reminders for upgrades and premium products.",
        ],
        campaign: &[
            "0% or extended installment promotions.",
            "Early access to premium products and gift editions.",
            "Personalized premium recommendations.",
        ],
        accent: (250, 202, 46),
    },
];

/// Result of a segment lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Known(&'static SegmentProfile),
    /// The model produced a cluster the table does not describe
    Unknown(ClusterId),
}

impl Segment {
    pub fn name(&self) -> &'static str {
        match self {
            Segment::Known(profile) => profile.name,
            Segment::Unknown(_) => "Unknown segment",
        }
    }
}

/// Look up the segment description of a cluster id
pub fn describe(cluster: ClusterId) -> Segment {
    SEGMENTS
        .iter()
        .find(|profile| profile.cluster == cluster)
        .map(Segment::Known)
        .unwrap_or(Segment::Unknown(cluster))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_clusters_are_distinct() {
        let profiles: Vec<&SegmentProfile> = (0..3)
            .map(|id| match describe(id) {
                Segment::Known(profile) => profile,
                Segment::Unknown(id) => panic!("cluster {} should be known", id),
            })
            .collect();

        for profile in &profiles {
            assert!(!profile.name.is_empty());
            assert!(!profile.characteristics.is_empty());
            assert!(!profile.retention.is_empty());
            assert!(!profile.campaign.is_empty());
        }
        assert_ne!(profiles[0].name, profiles[1].name);
        assert_ne!(profiles[1].name, profiles[2].name);
        assert_ne!(profiles[0].name, profiles[2].name);
    }

    #[test]
    fn test_unknown_cluster_is_not_an_error() {
        assert_eq!(describe(99), Segment::Unknown(99));
        assert_eq!(describe(3).name(), "Unknown segment");
    }

    #[test]
    fn test_table_ids_match_positions() {
        for (idx, profile) in SEGMENTS.iter().enumerate() {
            assert_eq!(profile.cluster, idx);
        }
    }
}
