use crate::config::{LoanTerms, RentalConfig};
use crate::error::RentalResult;
use crate::loan::{Loan, LoanTotals};
use crate::report::{self, ReportFormat, SummaryMetrics};
use crate::schedule::{self, CashflowRecord, Schedule};
use log::info;

/// Loan figures are kept to the cent.
const DEC_PLACES: u32 = 2;

/// A rental property with its financing and monthly cash-flow schedule.
#[derive(Clone, Debug)]
pub struct Rental {
    config: RentalConfig,
    loan_terms: LoanTerms,
    loan_totals: LoanTotals,
    schedule: Schedule,
}

impl Rental {
    pub fn new(config: RentalConfig) -> RentalResult<Self> {
        config.validate()?;

        let loan_terms = config.loan_terms();
        let loan = Loan::new(
            loan_terms.principal_financed,
            config.loan_term,
            config.loan_rate,
            config.compounding,
            config.first_payment_date,
            DEC_PLACES,
        )
        .with_currency(config.currency.clone());
        let schedule = schedule::build(&config, loan.periods())?;

        info!(
            "rental priced {:.0} financed {:.0} over {} payments of {:.2}",
            config.price,
            loan_terms.principal_financed,
            schedule.period_count(),
            loan.get_pmt_amount()
        );

        Ok(Self {
            loan_totals: loan.totals(),
            config,
            loan_terms,
            schedule,
        })
    }

    pub fn config(&self) -> &RentalConfig {
        &self.config
    }

    pub fn loan_terms(&self) -> LoanTerms {
        self.loan_terms
    }

    pub fn loan_totals(&self) -> &LoanTotals {
        &self.loan_totals
    }

    /// The full schedule, sentinel period 0 included.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// One period of the schedule; 0 is the all-zero sentinel.
    pub fn payment(&self, period_number: usize) -> Option<&CashflowRecord> {
        self.schedule.get(period_number)
    }

    pub fn metrics(&self) -> RentalResult<SummaryMetrics> {
        SummaryMetrics::compute(&self.config, &self.schedule, &self.loan_totals)
    }

    /// Summary report, plain text unless a format is given.
    pub fn summarize(&self, format: Option<ReportFormat>) -> RentalResult<String> {
        report::summarize(
            &self.config,
            &self.schedule,
            &self.loan_totals,
            format.unwrap_or_default(),
        )
    }

    pub fn show_schedule(&self) {
        for record in self.schedule.iter().skip(1) {
            println!("{}", record);
        }
    }
}
