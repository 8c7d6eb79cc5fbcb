use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

/// One harvesting event: area covered, the machine that cut it, tonnage
/// collected and tonnage lost on the ground, with the loss percentage
/// derived from the last two. The percentage is always recomputed here,
/// never accepted from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestRecord {
    pub date: NaiveDate,
    pub area_hectares: Decimal,
    pub harvester_id: String,
    pub total_tons: Decimal,
    pub lost_tons: Decimal,
    pub loss_percentage: Decimal,
}

impl HarvestRecord {
    /// Builds a record dated today.
    pub fn new(
        area_hectares: Decimal,
        harvester_id: &str,
        total_tons: Decimal,
        lost_tons: Decimal,
    ) -> Result<Self, HarvestError> {
        Self::with_date(
            Utc::now().date_naive(),
            area_hectares,
            harvester_id,
            total_tons,
            lost_tons,
        )
    }

    /// Builds a record for an explicit date (bulk import path).
    pub fn with_date(
        date: NaiveDate,
        area_hectares: Decimal,
        harvester_id: &str,
        total_tons: Decimal,
        lost_tons: Decimal,
    ) -> Result<Self, HarvestError> {
        if lost_tons < Decimal::ZERO {
            return Err(HarvestError::NegativeLoss);
        }
        if lost_tons > total_tons {
            return Err(HarvestError::LossExceedsTotal {
                total: total_tons,
                lost: lost_tons,
            });
        }

        Ok(Self {
            date,
            area_hectares,
            harvester_id: harvester_id.to_string(),
            total_tons,
            lost_tons,
            loss_percentage: loss_percentage(total_tons, lost_tons),
        })
    }
}

/// Lost tonnage as a percentage of the harvested total, rounded to the two
/// decimal places the stored column keeps. A zero-ton harvest has zero loss.
pub fn loss_percentage(total_tons: Decimal, lost_tons: Decimal) -> Decimal {
    if total_tons.is_zero() {
        return Decimal::ZERO;
    }
    (lost_tons / total_tons * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Aggregate loss figures across all persisted records.
#[derive(Debug, Clone, PartialEq)]
pub struct LossSummary {
    pub total_lost_tons: Decimal,
    pub average_loss_percentage: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percentage_is_lost_over_total() {
        assert_eq!(loss_percentage(dec!(100), dec!(5)), dec!(5.00));
        assert_eq!(loss_percentage(dec!(200), dec!(30)), dec!(15.00));
        assert_eq!(loss_percentage(dec!(3), dec!(1)), dec!(33.33));
    }

    #[test]
    fn zero_total_yields_zero_percentage() {
        assert_eq!(loss_percentage(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn construction_recomputes_percentage() {
        let record = HarvestRecord::new(dec!(10.0), "C1", dec!(100.0), dec!(5.0)).unwrap();
        assert_eq!(record.loss_percentage, dec!(5.00));
        assert_eq!(record.date, Utc::now().date_naive());
    }

    #[test]
    fn construction_rejects_loss_above_total() {
        let result = HarvestRecord::new(dec!(10.0), "C1", dec!(50.0), dec!(60.0));
        assert!(matches!(result, Err(HarvestError::LossExceedsTotal { .. })));

        let result = HarvestRecord::new(dec!(10.0), "C1", Decimal::ZERO, dec!(0.1));
        assert!(matches!(result, Err(HarvestError::LossExceedsTotal { .. })));
    }

    #[test]
    fn construction_rejects_negative_loss() {
        let result = HarvestRecord::new(dec!(10.0), "C1", dec!(50.0), dec!(-1.0));
        assert!(matches!(result, Err(HarvestError::NegativeLoss)));
    }

    #[test]
    fn loss_equal_to_total_is_accepted() {
        let record = HarvestRecord::new(dec!(1.0), "C2", dec!(40.0), dec!(40.0)).unwrap();
        assert_eq!(record.loss_percentage, dec!(100.00));
    }
}
