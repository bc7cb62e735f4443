//! Warning messages shown before a downgrade that disables features.

use crate::license::LicenseType;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// First message of every acknowledgement request.
pub const ACKNOWLEDGEMENT_HEADER: &str = "This license update requires acknowledgement. To acknowledge the license, please read the following messages and call /start_basic again, this time with the \"acknowledge=true\" parameter:";

/// Messages for one feature that changes behavior after the downgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureAcknowledgement {
    /// Feature name, e.g. `security`.
    pub feature: &'static str,
    /// What the caller loses, in display order.
    pub messages: Vec<String>,
}

/// Everything the caller must read before acknowledging a downgrade.
///
/// Serializes as `{"message": <header>, "<feature>": [..], ...}` with
/// features in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcknowledgeMessages {
    /// Leading explanation.
    pub header: String,
    /// Per-feature messages.
    pub features: Vec<FeatureAcknowledgement>,
}

impl AcknowledgeMessages {
    /// Header first, then every feature message in order.
    pub fn flatten(&self) -> Vec<String> {
        std::iter::once(self.header.clone())
            .chain(
                self.features
                    .iter()
                    .flat_map(|f| f.messages.iter().cloned()),
            )
            .collect()
    }
}

impl Serialize for AcknowledgeMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.features.len() + 1))?;
        map.serialize_entry("message", &self.header)?;
        for feature in &self.features {
            map.serialize_entry(feature.feature, &feature.messages)?;
        }
        map.end()
    }
}

/// Acknowledgement messages for replacing `from` with `to`.
///
/// Returns `None` when nothing the caller relies on gets disabled.
pub fn downgrade_messages(from: LicenseType, to: LicenseType) -> Option<AcknowledgeMessages> {
    let features: Vec<FeatureAcknowledgement> = [
        ("security", security_messages(from, to)),
        ("watcher", watcher_messages(from, to)),
        ("monitoring", monitoring_messages(from, to)),
        ("graph", graph_messages(from, to)),
        ("ml", machine_learning_messages(from, to)),
        ("logstash", logstash_messages(from, to)),
    ]
    .into_iter()
    .filter(|(_, messages)| !messages.is_empty())
    .map(|(feature, messages)| FeatureAcknowledgement { feature, messages })
    .collect();

    if features.is_empty() {
        return None;
    }

    Some(AcknowledgeMessages {
        header: ACKNOWLEDGEMENT_HEADER.to_string(),
        features,
    })
}

fn has_paid_features(t: LicenseType) -> bool {
    !matches!(t, LicenseType::Basic)
}

fn has_platinum_features(t: LicenseType) -> bool {
    matches!(t, LicenseType::Trial | LicenseType::Platinum)
}

fn security_messages(from: LicenseType, to: LicenseType) -> Vec<String> {
    if has_paid_features(from) && to == LicenseType::Basic {
        vec![
            "Security will be disabled: authentication, authorization, IP filtering and auditing stop being enforced.".to_string(),
            "Restart every node after the license change for security settings to take effect.".to_string(),
        ]
    } else {
        Vec::new()
    }
}

fn watcher_messages(from: LicenseType, to: LicenseType) -> Vec<String> {
    if has_paid_features(from) && to == LicenseType::Basic {
        vec!["Watches will no longer execute and the watcher APIs will be disabled.".to_string()]
    } else {
        Vec::new()
    }
}

fn monitoring_messages(from: LicenseType, to: LicenseType) -> Vec<String> {
    if has_paid_features(from) && to == LicenseType::Basic {
        vec![
            "Multi-cluster monitoring is not available on a [basic] license; only the local cluster will be shown.".to_string(),
            "Retention of monitoring indices is fixed to 7 days.".to_string(),
        ]
    } else {
        Vec::new()
    }
}

fn graph_messages(from: LicenseType, to: LicenseType) -> Vec<String> {
    if has_platinum_features(from) && !has_platinum_features(to) {
        vec!["Graph exploration APIs will be disabled.".to_string()]
    } else {
        Vec::new()
    }
}

fn machine_learning_messages(from: LicenseType, to: LicenseType) -> Vec<String> {
    if has_platinum_features(from) && !has_platinum_features(to) {
        vec!["Machine learning jobs will be closed and datafeeds stopped.".to_string()]
    } else {
        Vec::new()
    }
}

fn logstash_messages(from: LicenseType, to: LicenseType) -> Vec<String> {
    if has_paid_features(from) && to == LicenseType::Basic {
        vec!["Logstash will stop polling for centrally-managed pipelines.".to_string()]
    } else {
        Vec::new()
    }
}
