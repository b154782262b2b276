//! Mortgage payment, amortization and affordability calculators.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Share of gross monthly income that housing may take
pub const FRONT_END_RATIO: f64 = 0.28;
/// Share of gross monthly income that housing plus other debt may take
pub const BACK_END_RATIO: f64 = 0.36;
pub const MAX_TERM_YEARS: u32 = 50;

#[derive(Debug, Error, PartialEq)]
pub enum MortgageError {
    #[error("{0} must not be negative")]
    Negative(&'static str),

    #[error("Down payment {down_payment} exceeds price {price}")]
    DownPaymentTooLarge { down_payment: f64, price: f64 },

    #[error("Loan term must be at least one year")]
    ZeroTerm,

    #[error("Loan term of {0} years exceeds {} years", MAX_TERM_YEARS)]
    TermTooLong(u32),
}

fn validate_term(term_years: u32) -> Result<(), MortgageError> {
    match term_years {
        0 => Err(MortgageError::ZeroTerm),
        years if years > MAX_TERM_YEARS => Err(MortgageError::TermTooLong(years)),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MortgageInput {
    pub price: f64,
    pub down_payment: f64,
    /// Yearly interest, in percent (6.5 means 6.5%)
    pub annual_rate_percent: f64,
    pub term_years: u32,
}

impl MortgageInput {
    fn validate(&self) -> Result<(), MortgageError> {
        if self.price < 0.0 {
            return Err(MortgageError::Negative("Price"));
        }
        if self.down_payment < 0.0 {
            return Err(MortgageError::Negative("Down payment"));
        }
        if self.annual_rate_percent < 0.0 {
            return Err(MortgageError::Negative("Interest rate"));
        }
        if self.down_payment > self.price {
            return Err(MortgageError::DownPaymentTooLarge {
                down_payment: self.down_payment,
                price: self.price,
            });
        }
        validate_term(self.term_years)
    }

    pub fn loan_amount(&self) -> f64 {
        self.price - self.down_payment
    }

    fn months(&self) -> u32 {
        self.term_years * 12
    }

    fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }
}

/// Present value of one unit paid monthly: `(1 - (1 + r)^-n) / r`.
///
/// Computed through `ln_1p`/`exp_m1` so rates too small to move `1 + r`
/// still give `n` instead of dividing by zero.
fn annuity_factor(monthly_rate: f64, months: u32) -> f64 {
    let n = f64::from(months);
    if monthly_rate == 0.0 {
        return n;
    }
    let factor = -(-n * monthly_rate.ln_1p()).exp_m1() / monthly_rate;
    if factor.is_finite() && factor > 0.0 {
        factor
    } else {
        n
    }
}

fn amortized_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    principal / annuity_factor(monthly_rate, months)
}

pub fn monthly_payment(input: &MortgageInput) -> Result<f64, MortgageError> {
    input.validate()?;
    Ok(amortized_payment(input.loan_amount(), input.monthly_rate(), input.months()))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MortgageSummary {
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub down_payment_percent: f64,
}

pub fn summarize(input: &MortgageInput) -> Result<MortgageSummary, MortgageError> {
    let payment = monthly_payment(input)?;
    let total_paid = payment * f64::from(input.months());
    let down_payment_percent = if input.price > 0.0 {
        input.down_payment / input.price * 100.0
    } else {
        0.0
    };

    Ok(MortgageSummary {
        loan_amount: input.loan_amount(),
        monthly_payment: payment,
        total_paid,
        total_interest: total_paid - input.loan_amount(),
        down_payment_percent,
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

/// One row per month; the last row pays off whatever balance remains
pub fn amortization_schedule(input: &MortgageInput) -> Result<Vec<AmortizationRow>, MortgageError> {
    let payment = monthly_payment(input)?;
    let rate = input.monthly_rate();
    let months = input.months();
    let mut balance = input.loan_amount();
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let interest = balance * rate;
        let mut principal = payment - interest;
        if month == months || principal > balance {
            principal = balance;
        }
        balance -= principal;
        rows.push(AmortizationRow {
            month,
            payment: principal + interest,
            principal,
            interest,
            balance,
        });
    }

    Ok(rows)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AffordabilityInput {
    pub monthly_income: f64,
    pub monthly_debts: f64,
    pub down_payment: f64,
    pub annual_rate_percent: f64,
    pub term_years: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Affordability {
    /// Highest monthly housing payment allowed by both ratios
    pub max_monthly_payment: f64,
    pub max_loan: f64,
    pub max_price: f64,
}

/// Maximum price under the 28/36 debt-to-income rule
pub fn affordability(input: &AffordabilityInput) -> Result<Affordability, MortgageError> {
    if input.monthly_income < 0.0 {
        return Err(MortgageError::Negative("Monthly income"));
    }
    if input.monthly_debts < 0.0 {
        return Err(MortgageError::Negative("Monthly debts"));
    }
    if input.down_payment < 0.0 {
        return Err(MortgageError::Negative("Down payment"));
    }
    if input.annual_rate_percent < 0.0 {
        return Err(MortgageError::Negative("Interest rate"));
    }
    validate_term(input.term_years)?;

    let front = input.monthly_income * FRONT_END_RATIO;
    let back = input.monthly_income * BACK_END_RATIO - input.monthly_debts;
    let max_monthly_payment = front.min(back).max(0.0);

    let rate = input.annual_rate_percent / 100.0 / 12.0;
    let max_loan = max_monthly_payment * annuity_factor(rate, input.term_years * 12);

    Ok(Affordability {
        max_monthly_payment,
        max_loan,
        max_price: max_loan + input.down_payment,
    })
}
