use crate::config::RentalConfig;
use crate::error::{RentalError, RentalResult};
use crate::loan::LoanTotals;
use crate::schedule::Schedule;
use log::debug;
use std::{fmt, str::FromStr};

const LABEL_WIDTH: usize = 26;
const RATIO_LABEL_WIDTH: usize = 28;
const AMOUNT_WIDTH: usize = 11;
const RATIO_WIDTH: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportFormat {
    #[default]
    Text,
    Html,
}

impl ReportFormat {
    fn new_line(self) -> &'static str {
        match self {
            ReportFormat::Text => "\n",
            ReportFormat::Html => "<br>",
        }
    }

    fn tab(self) -> &'static str {
        match self {
            ReportFormat::Text => "\t",
            ReportFormat::Html => "    ",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" | "plain" => Ok(ReportFormat::Text),
            "html" => Ok(ReportFormat::Html),
            _ => Err(RentalError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "txt"),
            ReportFormat::Html => write!(f, "html"),
        }
    }
}

/// Tax and return figures derived from the first payment period.
/// Amounts are monthly unless prefixed with `annual_`.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummaryMetrics {
    pub original_investment: f64,
    pub tax_deductible_monthly_costs: f64,
    pub non_deductible_monthly_costs: f64,
    pub taxable_income_monthly: f64,
    pub annual_income_after_tax: f64,
    pub annual_cashflow: f64,
    pub net_roi: f64,
    pub loan_leverage: f64,
}

impl SummaryMetrics {
    pub fn compute(
        config: &RentalConfig,
        schedule: &Schedule,
        totals: &LoanTotals,
    ) -> RentalResult<Self> {
        let first = schedule.first_payment()?;

        let original_investment = config.price + config.additional_investment - totals.principal;
        let tax_deductible_monthly_costs = first.interest
            + first.home_insurance
            + first.flood_insurance
            + first.management_fee
            + first.hoa
            + first.tax
            + first.utilities;
        let non_deductible_monthly_costs = first.principal;
        let taxable_income_monthly = config.monthly_rent - tax_deductible_monthly_costs;
        let annual_income_after_tax = taxable_income_monthly * 12. * (1. - config.income_tax_rate);
        let annual_cashflow = annual_income_after_tax - non_deductible_monthly_costs * 12.;

        if original_investment == 0. {
            return Err(RentalError::DivisionByZero("net ROI and loan leverage"));
        }
        let net_roi =
            (taxable_income_monthly * 12.) * (1. - config.income_tax_rate) / original_investment;
        let loan_leverage = 1. + totals.principal / original_investment;

        debug!(
            "initial investment {:.2}, net ROI {:.4}, leverage {:.2}",
            original_investment, net_roi, loan_leverage
        );

        Ok(Self {
            original_investment,
            tax_deductible_monthly_costs,
            non_deductible_monthly_costs,
            taxable_income_monthly,
            annual_income_after_tax,
            annual_cashflow,
            net_roi,
            loan_leverage,
        })
    }
}

/// Renders the summary report. Values are identical in both formats,
/// only line separators, indentation and the html `<pre>` wrapper differ.
pub fn summarize(
    config: &RentalConfig,
    schedule: &Schedule,
    totals: &LoanTotals,
    format: ReportFormat,
) -> RentalResult<String> {
    let metrics = SummaryMetrics::compute(config, schedule, totals)?;
    let first = schedule.first_payment()?;
    let mut report = ReportWriter::new(format, &totals.currency);

    report.title("Key Info");
    report.amount("Property Purchase Price:", config.price);
    report.amount("Additional Setup Cost:", config.additional_investment);
    report.blank();

    report.heading("Loan");
    report.amount("Initial Investment:", metrics.original_investment);
    report.amount("Loan Principal:", totals.principal);
    report.blank();

    report.heading("Rent & Costs");
    report.amount("Monthly Rent:", config.monthly_rent);
    report.amount(
        "Monthly Costs:",
        metrics.tax_deductible_monthly_costs + metrics.non_deductible_monthly_costs,
    );
    report.amount(" - Loan Payment:", totals.monthly_payment);
    report.amount("   * Principal:", first.principal);
    report.amount("   * Interest:", first.interest);
    report.amount(" - HOA:", first.hoa);
    report.amount(" - Utilities:", first.utilities);
    report.amount(" - Management Fees:", first.management_fee);
    report.amount(" - Tax:", first.tax);
    report.amount(" - Insurance:", first.home_insurance + first.flood_insurance);
    report.amount("   * Home Insurance:", first.home_insurance);
    report.amount("   * Flood Insurance:", first.flood_insurance);
    report.blank();

    report.heading("Income & Tax");
    report.annual("Total Rent:", config.monthly_rent * 12.);
    report.annual("Tax Deductibles:", metrics.tax_deductible_monthly_costs * 12.);
    report.annual("Taxable Income:", metrics.taxable_income_monthly * 12.);
    report.annual("Income After Tax:", metrics.annual_income_after_tax);
    report.annual("Cashflow:", metrics.annual_cashflow);
    report.blank();

    report.heading("ROI");
    report.ratio(
        "Net ROI:",
        format!("{}%", group_thousands(metrics.net_roi * 100., 0)),
        " p.a.",
    );
    report.ratio("Loan Leverage:", group_thousands(metrics.loan_leverage, 1), "");

    Ok(report.finish())
}

struct ReportWriter<'a> {
    format: ReportFormat,
    currency: &'a str,
    out: String,
}

impl<'a> ReportWriter<'a> {
    fn new(format: ReportFormat, currency: &'a str) -> Self {
        let mut out = String::new();
        if format == ReportFormat::Html {
            out.push_str("<pre>");
        }
        Self {
            format,
            currency,
            out,
        }
    }

    fn title(&mut self, title: &str) {
        self.out.push_str(title);
    }

    fn heading(&mut self, heading: &str) {
        self.out.push_str(self.format.new_line());
        self.out.push(' ');
        self.out.push_str(heading);
    }

    fn blank(&mut self) {
        self.out.push_str(self.format.new_line());
    }

    fn line(&mut self, label: &str, label_width: usize, value: &str) {
        self.out.push_str(&format!(
            "{}{}{:<label_width$}{}",
            self.format.new_line(),
            self.format.tab(),
            label,
            value,
            label_width = label_width
        ));
    }

    fn amount(&mut self, label: &str, value: f64) {
        let value = format!(
            "{}{:>width$}",
            self.currency,
            group_thousands(value, 0),
            width = AMOUNT_WIDTH
        );
        self.line(label, LABEL_WIDTH, &value);
    }

    fn annual(&mut self, label: &str, value: f64) {
        self.amount(label, value);
        self.out.push_str(" p.a.");
    }

    fn ratio(&mut self, label: &str, value: String, suffix: &str) {
        let value = format!("{:>width$}{}", value, suffix, width = RATIO_WIDTH);
        self.line(label, RATIO_LABEL_WIDTH, &value);
    }

    fn finish(mut self) -> String {
        if self.format == ReportFormat::Html {
            self.out.push_str("</pre>");
        }
        self.out
    }
}

/// Formats `value` to `decimals` places with a comma every three integer digits.
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }

    if value < 0. {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
