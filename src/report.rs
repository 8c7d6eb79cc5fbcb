use std::fmt::Write;

use rust_decimal::Decimal;

use crate::models::{HarvestRecord, LossSummary};

/// Total lost tonnage and the unweighted mean loss percentage across the
/// given records. Both figures are zero when there are no records.
pub fn loss_summary(records: &[HarvestRecord]) -> LossSummary {
    if records.is_empty() {
        return LossSummary {
            total_lost_tons: Decimal::ZERO,
            average_loss_percentage: Decimal::ZERO,
        };
    }

    let mut total_lost = Decimal::ZERO;
    let mut percentage_sum = Decimal::ZERO;
    for record in records {
        total_lost += record.lost_tons;
        percentage_sum += record.loss_percentage;
    }

    LossSummary {
        total_lost_tons: total_lost,
        average_loss_percentage: (percentage_sum / Decimal::from(records.len())).round_dp(2),
    }
}

pub fn build_report(records: &[HarvestRecord]) -> String {
    let summary = loss_summary(records);
    let mut output = String::new();

    let _ = writeln!(output, "# Sugarcane Harvest Loss Report");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Loss Summary");
    let _ = writeln!(
        output,
        "- Total lost: {:.2} t across {} harvests",
        summary.total_lost_tons,
        records.len()
    );
    let _ = writeln!(
        output,
        "- Average loss: {:.2}%",
        summary.average_loss_percentage
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Harvests");

    if records.is_empty() {
        let _ = writeln!(output, "No harvests recorded.");
    } else {
        for record in records {
            let _ = writeln!(
                output,
                "- {} harvester {}: {:.2} ha, {:.2} t collected, {:.2} t lost ({:.2}%)",
                record.date,
                record.harvester_id,
                record.area_hectares,
                record.total_tons,
                record.lost_tons,
                record.loss_percentage
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(total: Decimal, lost: Decimal) -> HarvestRecord {
        HarvestRecord::with_date(
            NaiveDate::from_ymd_opt(2026, 7, 14).unwrap(),
            dec!(12.5),
            "C1",
            total,
            lost,
        )
        .unwrap()
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = loss_summary(&[]);
        assert_eq!(summary.total_lost_tons, Decimal::ZERO);
        assert_eq!(summary.average_loss_percentage, Decimal::ZERO);
    }

    #[test]
    fn summary_sums_losses_and_averages_percentages() {
        // 10 t of 200 t -> 5%, 20 t of 133.33 t -> 15%
        let records = vec![record(dec!(200), dec!(10)), record(dec!(133.33), dec!(20))];
        let summary = loss_summary(&records);
        assert_eq!(summary.total_lost_tons, dec!(30));
        assert_eq!(summary.average_loss_percentage, dec!(10.00));
    }

    #[test]
    fn report_lists_summary_and_each_harvest() {
        let records = vec![record(dec!(100), dec!(5))];
        let report = build_report(&records);
        assert!(report.contains("Total lost: 5.00 t across 1 harvests"));
        assert!(report.contains("Average loss: 5.00%"));
        assert!(report.contains("harvester C1"));
    }

    #[test]
    fn report_on_no_records_has_fallback_line() {
        let report = build_report(&[]);
        assert!(report.contains("No harvests recorded."));
    }
}
