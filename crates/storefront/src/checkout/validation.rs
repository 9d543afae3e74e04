//! Checkout form validation.
//!
//! [`validate`] maps the current form values to a [`ValidationReport`]: for
//! each field, the rules it violates. The report is recomputed from scratch
//! on every call and never stored on the form.
//!
//! Rule semantics:
//! - `Required` fails only on an empty value or missing selection.
//! - `MinLength` and `Pattern` pass on empty values (`Required` covers those).
//! - `NotOnlyWhitespace` fails when the trimmed value is empty, so an empty
//!   field violates both `Required` and `NotOnlyWhitespace`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::form::{CheckoutForm, FieldPath};

static CARD_NUMBER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").ok());
static SECURITY_CODE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}$").ok());

/// Shapes a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// See [`meme_shop_core::email::EMAIL_PATTERN`].
    Email,
    /// Exactly 16 digits.
    CardNumber,
    /// Exactly 3 digits.
    SecurityCode,
}

impl Pattern {
    fn matches(self, value: &str) -> bool {
        let re: &Option<Regex> = match self {
            Self::Email => return meme_shop_core::email::matches_pattern(value),
            Self::CardNumber => &CARD_NUMBER_RE,
            Self::SecurityCode => &SECURITY_CODE_RE,
        };
        re.as_ref().is_some_and(|re| re.is_match(value))
    }
}

/// A validation rule attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Required,
    MinLength(usize),
    NotOnlyWhitespace,
    Pattern(Pattern),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::MinLength(min) => write!(f, "must be at least {min} characters long"),
            Self::NotOnlyWhitespace => f.write_str("must not be only whitespace"),
            Self::Pattern(Pattern::Email) => f.write_str("must be a valid email address format"),
            Self::Pattern(Pattern::CardNumber) => f.write_str("must be 16 digits long"),
            Self::Pattern(Pattern::SecurityCode) => f.write_str("must be 3 digits long"),
        }
    }
}

const NAME_RULES: &[Rule] = &[Rule::Required, Rule::MinLength(2), Rule::NotOnlyWhitespace];
const EMAIL_RULES: &[Rule] = &[
    Rule::Required,
    Rule::Pattern(Pattern::Email),
    Rule::NotOnlyWhitespace,
];
const SELECTION_RULES: &[Rule] = &[Rule::Required];
const CARD_NUMBER_RULES: &[Rule] = &[Rule::Required, Rule::Pattern(Pattern::CardNumber)];
const SECURITY_CODE_RULES: &[Rule] = &[Rule::Required, Rule::Pattern(Pattern::SecurityCode)];

/// The rules checked for `field`.
#[must_use]
pub const fn rules_for(field: FieldPath) -> &'static [Rule] {
    match field {
        FieldPath::FirstName
        | FieldPath::LastName
        | FieldPath::BillingStreet
        | FieldPath::BillingCity
        | FieldPath::BillingZipCode
        | FieldPath::NameOnCard => NAME_RULES,
        FieldPath::Email => EMAIL_RULES,
        FieldPath::BillingState | FieldPath::BillingCountry | FieldPath::CardType => {
            SELECTION_RULES
        }
        FieldPath::CardNumber => CARD_NUMBER_RULES,
        FieldPath::SecurityCode => SECURITY_CODE_RULES,
        FieldPath::ExpirationMonth | FieldPath::ExpirationYear => &[],
    }
}

/// A field's value as the rules see it.
enum FieldValue<'a> {
    Text(&'a str),
    Selection(bool),
}

fn field_value(form: &CheckoutForm, field: FieldPath) -> FieldValue<'_> {
    match field {
        FieldPath::FirstName => FieldValue::Text(&form.customer.first_name),
        FieldPath::LastName => FieldValue::Text(&form.customer.last_name),
        FieldPath::Email => FieldValue::Text(&form.customer.email),
        FieldPath::BillingStreet => FieldValue::Text(&form.billing_address.street),
        FieldPath::BillingCity => FieldValue::Text(&form.billing_address.city),
        FieldPath::BillingState => FieldValue::Selection(form.billing_address.state.is_some()),
        FieldPath::BillingCountry => FieldValue::Selection(form.billing_address.country.is_some()),
        FieldPath::BillingZipCode => FieldValue::Text(&form.billing_address.zip_code),
        FieldPath::CardType => FieldValue::Text(&form.credit_card.card_type),
        FieldPath::NameOnCard => FieldValue::Text(&form.credit_card.name_on_card),
        FieldPath::CardNumber => FieldValue::Text(&form.credit_card.card_number),
        FieldPath::SecurityCode => FieldValue::Text(&form.credit_card.security_code),
        FieldPath::ExpirationMonth => {
            FieldValue::Selection(form.credit_card.expiration_month.is_some())
        }
        FieldPath::ExpirationYear => {
            FieldValue::Selection(form.credit_card.expiration_year.is_some())
        }
    }
}

/// Whether `value` violates `rule`.
fn violates(rule: Rule, value: &FieldValue<'_>) -> bool {
    match (rule, value) {
        (Rule::Required, FieldValue::Text(text)) => text.is_empty(),
        (Rule::Required, FieldValue::Selection(selected)) => !selected,
        (Rule::MinLength(min), FieldValue::Text(text)) => {
            !text.is_empty() && text.chars().count() < min
        }
        (Rule::NotOnlyWhitespace, FieldValue::Text(text)) => text.trim().is_empty(),
        (Rule::Pattern(pattern), FieldValue::Text(text)) => {
            !text.is_empty() && !pattern.matches(text)
        }
        (_, FieldValue::Selection(_)) => false,
    }
}

/// Violated rules per field. Fields without violations are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<FieldPath, Vec<Rule>>,
}

impl ValidationReport {
    /// True when no field violates any rule.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Rules violated by `field` (empty when it is valid).
    #[must_use]
    pub fn errors_for(&self, field: FieldPath) -> &[Rule] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Fields with at least one violation, in form order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = FieldPath> + '_ {
        self.errors.keys().copied()
    }

    /// Keep only the fields accepted by `keep`.
    #[must_use]
    pub fn filtered(&self, keep: impl Fn(FieldPath) -> bool) -> Self {
        Self {
            errors: self
                .errors
                .iter()
                .filter(|(field, _)| keep(**field))
                .map(|(field, rules)| (*field, rules.clone()))
                .collect(),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, rules) in &self.errors {
            for rule in rules {
                writeln!(f, "{field}: {rule}")?;
            }
        }
        Ok(())
    }
}

/// Check every field of `form` against its rules.
#[must_use]
pub fn validate(form: &CheckoutForm) -> ValidationReport {
    let errors = FieldPath::ALL
        .into_iter()
        .filter_map(|field| {
            let value = field_value(form, field);
            let violated: Vec<Rule> = rules_for(field)
                .iter()
                .copied()
                .filter(|rule| violates(*rule, &value))
                .collect();
            (!violated.is_empty()).then_some((field, violated))
        })
        .collect();

    ValidationReport { errors }
}
