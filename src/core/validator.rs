use crate::domain::model::CardPayload;
use crate::utils::error::ValidationError;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 驗證規則中可替換的部分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    pub allowed_cvvs: BTreeSet<u32>,
    pub allowed_email_domains: BTreeSet<String>,
    pub max_years_ahead: i32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            allowed_cvvs: [123, 4532].into_iter().collect(),
            allowed_email_domains: ["gmail.com", "hotmail.com", "yahoo.es"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_years_ahead: 5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    policy: ValidationPolicy,
}

impl Validator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn validate(&self, payload: &CardPayload) -> Result<(), ValidationError> {
        self.validate_at(payload, Utc::now().year())
    }

    /// 依序檢查，遇到第一個失敗的規則就返回
    pub fn validate_at(
        &self,
        payload: &CardPayload,
        current_year: i32,
    ) -> Result<(), ValidationError> {
        if !luhn_check(&payload.card_number.to_string()) {
            return Err(ValidationError::CardNumber);
        }
        if !self.policy.allowed_cvvs.contains(&payload.cvv) {
            return Err(ValidationError::Cvv);
        }
        if !is_valid_month(&payload.expiration_month) {
            return Err(ValidationError::ExpirationMonth);
        }
        if !self.is_valid_year(&payload.expiration_year, current_year) {
            return Err(ValidationError::ExpirationYear);
        }
        if !self.is_valid_email(&payload.email) {
            return Err(ValidationError::Email);
        }
        Ok(())
    }

    fn is_valid_year(&self, expiration_year: &str, current_year: i32) -> bool {
        let first = i64::from(current_year);
        let last = first + i64::from(self.policy.max_years_ahead);
        parse_int_prefix(expiration_year).is_some_and(|year| (first..=last).contains(&year))
    }

    fn is_valid_email(&self, email: &str) -> bool {
        email
            .split('@')
            .nth(1)
            .is_some_and(|domain| self.policy.allowed_email_domains.contains(domain))
    }
}

fn is_valid_month(expiration_month: &str) -> bool {
    parse_int_prefix(expiration_month).is_some_and(|month| (1..=12).contains(&month))
}

/// 取字串開頭的十進位整數：略過前導空白，可帶正負號，數字之後的內容忽略。
/// 沒有任何數字時回傳 `None`；超出範圍時飽和到 `i64` 上下限。
pub fn parse_int_prefix(value: &str) -> Option<i64> {
    let rest = value.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut magnitude: Option<i64> = None;
    for digit in digits {
        let digit = i64::from(digit - b'0');
        magnitude = Some(
            magnitude
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(digit),
        );
    }

    magnitude.map(|m| if negative { -m } else { m })
}

/// Luhn algorithm check for card numbers.
pub fn luhn_check(number: &str) -> bool {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = number
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}
