use crate::config::RentalConfig;
use crate::error::{RentalError, RentalResult};
use crate::loan::LoanPeriod;
use chrono::NaiveDate;
use log::{debug, trace};
use std::fmt;

/// Income and costs for one loan period. Period 0 is an all-zero record
/// standing for the time before the first payment.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CashflowRecord {
    pub period_number: usize,
    pub date: Option<NaiveDate>,
    pub rent: f64,
    pub hoa: f64,
    pub utilities: f64,
    pub management_fee: f64,
    pub tax: f64,
    pub home_insurance: f64,
    pub flood_insurance: f64,
    pub interest: f64,
    pub principal: f64,
}

impl CashflowRecord {
    pub fn total_costs(&self) -> f64 {
        self.hoa
            + self.utilities
            + self.management_fee
            + self.tax
            + self.home_insurance
            + self.flood_insurance
            + self.interest
            + self.principal
    }

    pub fn net_cashflow(&self) -> f64 {
        self.rent - self.total_costs()
    }
}

impl fmt::Display for CashflowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "period {}", self.period_number)?;
        if let Some(date) = self.date {
            write!(f, ", date {}", date)?;
        }
        write!(
            f,
            ", rent {:.2}, interest {:.2}, principal {:.2}, other costs {:.2}, net {:.2}",
            self.rent,
            self.interest,
            self.principal,
            self.total_costs() - self.interest - self.principal,
            self.net_cashflow()
        )
    }
}

/// Cash-flow records in period order, `records[n].period_number == n`.
#[derive(Clone, PartialEq, Debug)]
pub struct Schedule {
    records: Vec<CashflowRecord>,
}

impl Schedule {
    /// Record for `period_number`; 0 is the sentinel.
    pub fn get(&self, period_number: usize) -> Option<&CashflowRecord> {
        self.records.get(period_number)
    }

    /// The first real payment.
    pub fn first_payment(&self) -> RentalResult<&CashflowRecord> {
        self.records.get(1).ok_or_else(|| {
            RentalError::InvalidScheduleInput("schedule has no payment periods".to_string())
        })
    }

    /// Number of payment periods, not counting the sentinel.
    pub fn period_count(&self) -> usize {
        self.records.len() - 1
    }

    pub fn records(&self) -> &[CashflowRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CashflowRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a CashflowRecord;
    type IntoIter = std::slice::Iter<'a, CashflowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Pairs each loan period with the config's constant monthly figures.
///
/// The periods must be numbered 1, 2, 3, ... without gaps.
pub fn build<I>(config: &RentalConfig, periods: I) -> RentalResult<Schedule>
where
    I: IntoIterator<Item = LoanPeriod>,
{
    let management_fee = config.management_fee();
    let tax = config.monthly_tax();
    let home_insurance = config.monthly_home_insurance();
    let flood_insurance = config.monthly_flood_insurance();

    let periods = periods.into_iter();
    let mut records = Vec::with_capacity(periods.size_hint().0 + 1);
    records.push(CashflowRecord::default());

    for period in periods {
        let expected = records.len();
        if period.number != expected {
            return Err(RentalError::InvalidScheduleInput(format!(
                "expected period {}, got {}",
                expected, period.number
            )));
        }
        trace!(
            "period {}: interest {}, principal {}",
            period.number,
            period.interest,
            period.principal
        );
        records.push(CashflowRecord {
            period_number: period.number,
            date: period.date,
            rent: config.monthly_rent,
            hoa: config.monthly_hoa,
            utilities: config.monthly_utilities,
            management_fee,
            tax,
            home_insurance,
            flood_insurance,
            interest: period.interest,
            principal: period.principal,
        });
    }

    if records.len() == 1 {
        return Err(RentalError::InvalidScheduleInput(
            "loan produced no payment periods".to_string(),
        ));
    }
    debug!("built schedule of {} periods", records.len() - 1);
    Ok(Schedule { records })
}
