use chrono::{Months, NaiveDate};
use log::{debug, trace};
use std::fmt;

/// Payments are always monthly; compounding may be less frequent.
const PMTS_PER_YEAR: u32 = 12;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compounding {
    #[default]
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compounding::Monthly => "monthly",
            Compounding::Quarterly => "quarterly",
            Compounding::SemiAnnually => "semi-annually",
            Compounding::Annually => "annually",
        };
        write!(f, "{}", name)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct LoanPayment {
    pub pmt_number: usize,
    pub pmt_date: Option<NaiveDate>,
    pub pmt_amount: f64,
    pub pmt_interest_paid: f64,
    pub pmt_principal_paid: f64,
    pub pmt_end_balance: f64,
}

impl fmt::Display for LoanPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pmt number {}", self.pmt_number)?;
        if let Some(date) = self.pmt_date {
            write!(f, ", date {}", date)?;
        }
        write!(
            f,
            ", payment {:.4}, interest paid {:.4}, principal paid {:.4}, ending balance {:.4}",
            self.pmt_amount, self.pmt_interest_paid, self.pmt_principal_paid, self.pmt_end_balance
        )
    }
}

/// One amortization period as seen by the cash-flow schedule.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LoanPeriod {
    pub number: usize,
    pub date: Option<NaiveDate>,
    pub interest: f64,
    pub principal: f64,
}

impl From<&LoanPayment> for LoanPeriod {
    fn from(pmt: &LoanPayment) -> Self {
        Self {
            number: pmt.pmt_number,
            date: pmt.pmt_date,
            interest: pmt.pmt_interest_paid,
            principal: pmt.pmt_principal_paid,
        }
    }
}

/// Loan-wide figures handed to the report.
#[derive(Clone, PartialEq, Debug)]
pub struct LoanTotals {
    pub principal: f64,
    pub monthly_payment: f64,
    pub currency: String,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Loan {
    pub principal: f64,
    pub term: u32,
    pub annual_rate: f64,
    pub compound_type: Compounding,
    pub first_pmt_date: Option<NaiveDate>,
    pub dec_places: u32,
    currency: String,
    pmt_amount: f64,
    scheduled_pmts: Vec<LoanPayment>,
}

impl Loan {
    /// `term` is in years and `annual_rate` a fraction (0.06 for 6%).
    pub fn new(
        principal: f64,
        term: u32,
        annual_rate: f64,
        compound_type: Compounding,
        first_pmt_date: Option<NaiveDate>,
        dec_places: u32,
    ) -> Self {
        // the schedule amortizes the amount to the cent, so report that amount too
        let principal = round(principal, dec_places);
        let pmt_amount = get_pmt_amount(principal, term, annual_rate, compound_type, dec_places);
        debug!(
            "loan of {:.2} over {} years at {} compounded {}: payment {:.2}",
            principal, term, annual_rate, compound_type, pmt_amount
        );
        Self {
            principal,
            term,
            annual_rate,
            compound_type,
            first_pmt_date,
            dec_places,
            currency: String::from("$"),
            pmt_amount,
            scheduled_pmts: add_scheduled_pmts(
                principal,
                term,
                annual_rate,
                compound_type,
                first_pmt_date,
                dec_places,
                pmt_amount,
            ),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn get_pmt_amount(&self) -> f64 {
        self.pmt_amount
    }

    pub fn get_pmt_count(&self) -> usize {
        self.scheduled_pmts.len()
    }

    /// Payments are numbered from 1.
    pub fn get_pmt_detail(&self, pmt_number: usize) -> Option<&LoanPayment> {
        self.scheduled_pmts.get(pmt_number.checked_sub(1)?)
    }

    pub fn periods(&self) -> impl Iterator<Item = LoanPeriod> + '_ {
        self.scheduled_pmts.iter().map(LoanPeriod::from)
    }

    pub fn totals(&self) -> LoanTotals {
        LoanTotals {
            principal: self.principal,
            monthly_payment: self.pmt_amount,
            currency: self.currency.clone(),
        }
    }
}

fn round(amt: f64, dec: u32) -> f64 {
    if amt == 0. {
        0.
    } else {
        let scale = 10_f64.powi(dec as i32);
        (amt * scale).round() / scale
    }
}

fn get_compounding_periods(compound_type: Compounding) -> f64 {
    match compound_type {
        Compounding::Monthly => 12.,
        Compounding::Quarterly => 4.,
        Compounding::SemiAnnually => 2.,
        Compounding::Annually => 1.,
    }
}

fn get_total_pmts(term: u32) -> usize {
    term as usize * PMTS_PER_YEAR as usize
}

// effective rate applied to the balance each monthly payment
fn get_period_rate(annual_rate: f64, compound_type: Compounding) -> f64 {
    let compounding_periods = get_compounding_periods(compound_type);
    let nominal = annual_rate / compounding_periods;
    if compounding_periods == PMTS_PER_YEAR as f64 {
        nominal
    } else {
        (1. + nominal).powf(compounding_periods / PMTS_PER_YEAR as f64) - 1.
    }
}

fn get_pmt_amount(
    principal: f64,              // loan principal
    term: u32,                   // term of loan in years
    annual_rate: f64,            // annual interest rate as a fraction
    compound_type: Compounding,  // interest compounding frequency
    dec_places: u32,             // calculate to dec_places
) -> f64 {
    let total_pmts = get_total_pmts(term);
    if total_pmts == 0 {
        return 0.;
    }

    let pmt_rate = get_period_rate(annual_rate, compound_type);
    if pmt_rate == 0. {
        return round(principal / total_pmts as f64, dec_places);
    }

    let factor = (1. + pmt_rate).powf(total_pmts as f64);
    round((principal * pmt_rate * factor) / (factor - 1.), dec_places)
}

// every figure is rounded to dec_places and the rounded balance is carried forward;
// the final payment settles whatever balance is left
fn add_scheduled_pmts(
    principal: f64,
    term: u32,
    annual_rate: f64,
    compound_type: Compounding,
    first_pmt_date: Option<NaiveDate>,
    dec_places: u32,
    pmt_amount: f64,
) -> Vec<LoanPayment> {
    let total_pmts = get_total_pmts(term);
    let period_rate = get_period_rate(annual_rate, compound_type);
    let mut sched_pmt = Vec::with_capacity(total_pmts);
    let mut balance = round(principal, dec_places);

    for pmt_number in 1..=total_pmts {
        let interest = round(balance * period_rate, dec_places);
        let mut principal_paid = round(pmt_amount - interest, dec_places);

        if pmt_number == total_pmts || principal_paid > balance {
            principal_paid = balance;
        }
        let pmt_amt = round(principal_paid + interest, dec_places);
        balance = round(balance - principal_paid, dec_places);

        let pmt_date = first_pmt_date.and_then(|first| {
            let offset = u32::try_from(pmt_number - 1).ok()?;
            first.checked_add_months(Months::new(offset))
        });

        trace!(
            "Pmt # {}, date {:?}, interest {}, principal {}, end bal {}",
            pmt_number,
            pmt_date,
            interest,
            principal_paid,
            balance
        );

        sched_pmt.push(LoanPayment {
            pmt_number,
            pmt_date,
            pmt_amount: pmt_amt,
            pmt_interest_paid: interest,
            pmt_principal_paid: principal_paid,
            pmt_end_balance: balance,
        });
    }
    sched_pmt
}

#[cfg(test)]
mod tests {
    use super::{get_period_rate, get_pmt_amount, get_total_pmts, Compounding, Loan};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use test_log::test;

    #[test]
    fn test_get_pmt_amount() {
        let principal = 200000.;
        let term = 15;
        let annual_rate = 0.07;

        assert_eq!(
            get_pmt_amount(principal, term, annual_rate, Compounding::Monthly, 2),
            1797.66
        );
        assert_eq!(
            get_pmt_amount(principal, term, annual_rate, Compounding::Quarterly, 2),
            1793.14
        );
        assert_eq!(
            get_pmt_amount(principal, term, annual_rate, Compounding::SemiAnnually, 2),
            1786.50
        );
        assert_eq!(
            get_pmt_amount(principal, term, annual_rate, Compounding::Annually, 2),
            1773.70
        );

        // zero rate and zero term
        assert_eq!(
            get_pmt_amount(180000., 15, 0., Compounding::Monthly, 2),
            1000.
        );
        assert_eq!(
            get_pmt_amount(principal, 0, annual_rate, Compounding::Monthly, 2),
            0.
        );
    }

    #[test]
    fn test_total_pmts_does_not_overflow() {
        assert_eq!(get_total_pmts(30), 360);
        assert_eq!(get_total_pmts(u32::MAX), u32::MAX as usize * 12);
    }

    #[test]
    fn test_period_rate() {
        assert_eq!(get_period_rate(0.06, Compounding::Monthly), 0.06 / 12.);
        // a quarterly compounded rate is worth less per month than its nominal twelfth
        assert!(get_period_rate(0.06, Compounding::Quarterly) < 0.005);
        assert!(get_period_rate(0.06, Compounding::Annually) < 0.005);
    }

    #[test]
    fn test_monthly_compound_loan() {
        let loan = Loan::new(
            200000.,
            15,
            0.07,
            Compounding::Monthly,
            NaiveDate::from_ymd_opt(2024, 4, 1),
            4,
        );

        assert_eq!(loan.get_pmt_amount(), 1797.6565);
        assert_eq!(loan.get_pmt_count(), 180);
        assert_eq!(
            loan.get_pmt_detail(1).unwrap().to_string(),
            "pmt number 1, date 2024-04-01, payment 1797.6565, interest paid 1166.6667, principal paid 630.9898, ending balance 199369.0102"
        );
        assert_eq!(
            loan.get_pmt_detail(2).unwrap().pmt_date,
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(
            loan.get_pmt_detail(180).unwrap().pmt_date,
            NaiveDate::from_ymd_opt(2039, 3, 1)
        );
        assert_eq!(loan.get_pmt_detail(180).unwrap().pmt_end_balance, 0.);
        assert!(loan.get_pmt_detail(0).is_none());
        assert!(loan.get_pmt_detail(181).is_none());

        let paid: f64 = loan.periods().map(|p| p.principal).sum();
        assert_relative_eq!(paid, 200000., epsilon = 1e-6);
    }

    #[test]
    fn test_quarter_compound_loan() {
        let loan = Loan::new(200000., 15, 0.07, Compounding::Quarterly, None, 4);

        assert_eq!(loan.get_pmt_amount(), 1793.1377);
        assert_eq!(loan.get_pmt_count(), 180);
        assert!(loan.periods().all(|p| p.date.is_none()));

        let paid: f64 = loan.periods().map(|p| p.principal).sum();
        assert_relative_eq!(paid, 200000., epsilon = 1e-6);
    }

    #[test]
    fn test_periods_are_numbered_from_one() {
        let loan = Loan::new(255000., 15, 0.06, Compounding::Monthly, None, 2);
        let numbers: Vec<usize> = loan.periods().map(|p| p.number).collect();
        assert_eq!(numbers, (1..=180).collect::<Vec<_>>());

        let first = loan.periods().next().unwrap();
        assert_eq!(first.interest, 1275.);
        assert_relative_eq!(first.interest + first.principal, loan.get_pmt_amount(), epsilon = 1e-9);
    }

    #[test]
    fn test_principal_rounded_to_cents() {
        let loan = Loan::new(258999.741, 15, 0.06, Compounding::Monthly, None, 2);
        assert_eq!(loan.principal, 258999.74);
        assert_eq!(loan.totals().principal, 258999.74);

        let paid: f64 = loan.periods().map(|p| p.principal).sum();
        assert_relative_eq!(paid, loan.totals().principal, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_principal_loan() {
        let loan = Loan::new(0., 15, 0.06, Compounding::Monthly, None, 2);
        assert_eq!(loan.get_pmt_amount(), 0.);
        assert_eq!(loan.get_pmt_count(), 180);
        assert!(loan.periods().all(|p| p.interest == 0. && p.principal == 0.));
    }

    #[test]
    fn test_totals_carry_currency() {
        let loan = Loan::new(100000., 30, 0.05, Compounding::Monthly, None, 2).with_currency("€");
        let totals = loan.totals();
        assert_eq!(totals.principal, 100000.);
        assert_eq!(totals.monthly_payment, loan.get_pmt_amount());
        assert_eq!(totals.currency, "€");
        assert_eq!(loan.get_pmt_count(), 360);
    }
}
