//! Data-quality inspection, independent of classification

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    DataQualityIssue, DateRange, IssueKind, IssueSeverity, NormalizedTransaction,
};

/// Inspector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Absolute amounts above this are flagged as suspicious
    pub high_value_threshold: BigDecimal,
    /// The run's declared coverage window; dates outside it are anomalous
    pub coverage: Option<DateRange>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: BigDecimal::from(10_000),
            coverage: None,
        }
    }
}

/// Evaluates each transaction for anomalies before classification
///
/// Issues are advisory: they are always recorded, and only a missing amount
/// makes posting impossible.
#[derive(Debug)]
pub struct DataQualityInspector {
    config: InspectorConfig,
}

impl DataQualityInspector {
    pub fn new(config: InspectorConfig) -> Self {
        Self { config }
    }

    /// Inspect one transaction, returning zero or more issues
    pub fn inspect(&self, txn: &NormalizedTransaction) -> Vec<DataQualityIssue> {
        let mut issues = Vec::new();

        match &txn.amount {
            None => issues.push(DataQualityIssue {
                transaction_ref: txn.reference.clone(),
                kind: IssueKind::MissingAmount,
                severity: IssueSeverity::Blocking,
                detail: format!("source '{}' produced no parseable amount", txn.source),
            }),
            Some(amount) => {
                if amount.abs() > self.config.high_value_threshold {
                    issues.push(DataQualityIssue {
                        transaction_ref: txn.reference.clone(),
                        kind: IssueKind::SuspiciousAmount,
                        severity: IssueSeverity::Warning,
                        detail: format!(
                            "amount {} exceeds the high-value threshold {}",
                            amount, self.config.high_value_threshold
                        ),
                    });
                }
            }
        }

        if let Some(coverage) = &self.config.coverage {
            if !coverage.contains(txn.date) {
                issues.push(DataQualityIssue {
                    transaction_ref: txn.reference.clone(),
                    kind: IssueKind::DateAnomaly,
                    severity: IssueSeverity::Info,
                    detail: format!(
                        "date {} falls outside the coverage window {} to {}",
                        txn.date, coverage.start, coverage.end
                    ),
                });
            }
        }

        issues
    }
}
