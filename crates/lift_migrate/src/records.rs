use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

// ---------------------------------------------------------------------------
// Value pools
// ---------------------------------------------------------------------------

const FIRST_NAMES: [&str; 10] = [
    "John", "Sarah", "Michael", "Emma", "David", "Lisa", "Robert", "Jennifer", "William", "Ashley",
];
const LAST_NAMES: [&str; 10] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez",
];
const COMPANIES: [&str; 5] = [
    "Tech Solutions Inc",
    "Global Services LLC",
    "Innovation Corp",
    "Digital Partners",
    "Business Plus",
];
const STREETS: [&str; 5] = ["Main St", "Oak Ave", "Park Blvd", "First St", "Second Ave"];
const CITIES: [&str; 5] = ["New York", "Los Angeles", "Chicago", "Houston", "Phoenix"];
const STATES: [&str; 5] = ["NY", "CA", "IL", "TX", "AZ"];

/// Share of customers that are businesses rather than individuals.
const COMPANY_PROBABILITY: f64 = 0.7;
const CUSTOMER_HISTORY_DAYS: i64 = 365;
const INVOICE_HISTORY_DAYS: i64 = 180;
/// Base invoice amount range, in cents (100.00 up to 5100.00).
const AMOUNT_CENTS: std::ops::Range<i64> = 10_000..510_000;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A customer row. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    #[serde(rename = "Customer ID")]
    pub customer_id: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Contact Name")]
    pub contact_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "ZIP")]
    pub zip: u32,
    #[serde(rename = "Created Date")]
    pub created_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvoiceStatus {
    Paid,
    Pending,
    Overdue,
    Draft,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 4] = [
        InvoiceStatus::Paid,
        InvoiceStatus::Pending,
        InvoiceStatus::Overdue,
        InvoiceStatus::Draft,
    ];
}

/// A dollar amount held in whole cents. Serialized as `$1234.56`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(i64);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    /// `self × factor`, rounded half away from zero to the nearest cent.
    pub fn scale(self, factor: f64) -> Self {
        Self((self.0 as f64 * factor).round() as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An invoice row. `customer_id` always names a customer from the set the
/// invoice was generated against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    #[serde(rename = "Invoice Number")]
    pub invoice_number: String,
    #[serde(rename = "Customer ID")]
    pub customer_id: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Invoice Date")]
    pub invoice_date: NaiveDate,
    #[serde(rename = "Due Date")]
    pub due_date: NaiveDate,
    #[serde(rename = "Amount")]
    pub amount: Money,
    #[serde(rename = "Tax Amount")]
    pub tax_amount: Money,
    #[serde(rename = "Total Amount")]
    pub total_amount: Money,
    #[serde(rename = "Status")]
    pub status: InvoiceStatus,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Terms")]
    pub terms: String,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Produces synthetic accounting records from fixed pools.
///
/// Both the random source and the reference date are injected, so a seeded
/// RNG and a fixed date give reproducible output.
pub struct RecordGenerator<R: Rng> {
    rng: R,
    today: NaiveDate,
    tax_rate: f64,
    payment_terms_days: u32,
    fallback_customer_count: usize,
}

impl<R: Rng> RecordGenerator<R> {
    pub fn new(rng: R, today: NaiveDate) -> Self {
        Self {
            rng,
            today,
            tax_rate: 0.08,
            payment_terms_days: 30,
            fallback_customer_count: 25,
        }
    }

    pub fn with_tax_rate(mut self, tax_rate: f64) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    pub fn with_payment_terms(mut self, days: u32) -> Self {
        self.payment_terms_days = days;
        self
    }

    /// Size of the private customer set drawn when invoices are requested
    /// without customers. Never below 1.
    pub fn with_fallback_customers(mut self, count: usize) -> Self {
        self.fallback_customer_count = count.max(1);
        self
    }

    /// Generate `count` customers with ids `CUST-0001` onward.
    pub fn generate_customers(&mut self, count: usize) -> Vec<Customer> {
        (1..=count).map(|i| self.customer(i)).collect()
    }

    /// Generate `count` invoices, each referencing a customer drawn uniformly
    /// from `customers`. An empty slice is replaced by a freshly generated
    /// private customer set that is discarded afterwards.
    pub fn generate_invoices(&mut self, count: usize, customers: &[Customer]) -> Vec<Invoice> {
        let fallback;
        let pool = if customers.is_empty() {
            debug!(
                count = self.fallback_customer_count,
                "no customers supplied, generating a private set for invoice references"
            );
            fallback = self.generate_customers(self.fallback_customer_count);
            fallback.as_slice()
        } else {
            customers
        };

        (1..=count)
            .map(|i| {
                let customer = &pool[self.rng.random_range(0..pool.len())];
                self.invoice(i, customer)
            })
            .collect()
    }

    fn customer(&mut self, sequence: usize) -> Customer {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let company = if self.rng.random_bool(COMPANY_PROBABILITY) {
            Some(self.pick(&COMPANIES))
        } else {
            None
        };

        let contact_name = format!("{first} {last}");
        let email_domain = company.map_or_else(|| "email".to_string(), email_domain);
        let email = format!(
            "{}.{}@{email_domain}.com",
            first.to_lowercase(),
            last.to_lowercase()
        );

        let phone = format!(
            "({}) {}-{}",
            self.rng.random_range(100..=999),
            self.rng.random_range(100..=999),
            self.rng.random_range(1000..=9999)
        );
        let address = format!(
            "{} {}",
            self.rng.random_range(1..=9999),
            self.pick(&STREETS)
        );

        Customer {
            customer_id: format!("CUST-{sequence:04}"),
            customer_name: company.map_or_else(|| contact_name.clone(), str::to_string),
            contact_name,
            email,
            phone,
            address,
            city: self.pick(&CITIES).to_string(),
            state: self.pick(&STATES).to_string(),
            zip: self.rng.random_range(10_000..=99_999),
            created_date: self.days_ago(CUSTOMER_HISTORY_DAYS),
        }
    }

    fn invoice(&mut self, sequence: usize, customer: &Customer) -> Invoice {
        let amount = Money::from_cents(self.rng.random_range(AMOUNT_CENTS));
        let invoice_date = self.days_ago(INVOICE_HISTORY_DAYS);

        Invoice {
            invoice_number: format!("INV-{sequence:04}"),
            customer_id: customer.customer_id.clone(),
            customer_name: customer.customer_name.clone(),
            invoice_date,
            due_date: invoice_date + Duration::days(i64::from(self.payment_terms_days)),
            amount,
            tax_amount: amount.scale(self.tax_rate),
            total_amount: amount.scale(1.0 + self.tax_rate),
            status: InvoiceStatus::ALL[self.rng.random_range(0..InvoiceStatus::ALL.len())],
            description: format!("Professional services for {}", customer.customer_name),
            terms: format!("Net {}", self.payment_terms_days),
        }
    }

    fn pick(&mut self, pool: &[&'static str]) -> &'static str {
        pool[self.rng.random_range(0..pool.len())]
    }

    fn days_ago(&mut self, window: i64) -> NaiveDate {
        self.today - Duration::days(self.rng.random_range(0..window))
    }
}

/// `Tech Solutions Inc` -> `techsolutionsinc`
fn email_domain(company: &str) -> String {
    company
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn generator(seed: u64) -> RecordGenerator<StdRng> {
        RecordGenerator::new(StdRng::seed_from_u64(seed), today())
    }

    #[test]
    fn test_customer_ids_are_sequential_and_unique() {
        let customers = generator(1).generate_customers(12);
        assert_eq!(customers.len(), 12);

        let ids: HashSet<&str> = customers.iter().map(|c| c.customer_id.as_str()).collect();
        assert_eq!(ids.len(), 12);
        for (i, customer) in customers.iter().enumerate() {
            assert_eq!(customer.customer_id, format!("CUST-{:04}", i + 1));
        }
    }

    #[test]
    fn test_zero_customers() {
        assert!(generator(1).generate_customers(0).is_empty());
    }

    #[test]
    fn test_customer_fields_come_from_pools() {
        for customer in generator(7).generate_customers(40) {
            let (first, last) = customer.contact_name.split_once(' ').unwrap();
            assert!(FIRST_NAMES.contains(&first));
            assert!(LAST_NAMES.contains(&last));
            assert!(
                COMPANIES.contains(&customer.customer_name.as_str())
                    || customer.customer_name == customer.contact_name
            );
            assert!(CITIES.contains(&customer.city.as_str()));
            assert!(STATES.contains(&customer.state.as_str()));
            assert!((10_000..=99_999).contains(&customer.zip));
            assert!(customer.created_date <= today());
            assert!(customer.created_date > today() - Duration::days(365));
            assert!(customer.email.starts_with(&first.to_lowercase()));
            assert!(customer.email.ends_with(".com"));
        }
    }

    #[test]
    fn test_phone_format() {
        for customer in generator(3).generate_customers(20) {
            let phone = customer.phone.as_bytes();
            assert_eq!(phone.len(), 14, "{}", customer.phone);
            assert_eq!(phone[0], b'(');
            assert_eq!(phone[4], b')');
            assert_eq!(phone[9], b'-');
        }
    }

    #[test]
    fn test_email_domain_strips_spaces_and_punctuation() {
        assert_eq!(email_domain("Tech Solutions Inc"), "techsolutionsinc");
        assert_eq!(email_domain("Global Services LLC"), "globalservicesllc");
        assert_eq!(email_domain("A-1 Plumbing, Co."), "aplumbingco");
    }

    #[test]
    fn test_invoices_reference_supplied_customers() {
        let mut generator = generator(11);
        let customers = generator.generate_customers(5);
        let ids: HashSet<&str> = customers.iter().map(|c| c.customer_id.as_str()).collect();

        let invoices = generator.generate_invoices(50, &customers);
        assert_eq!(invoices.len(), 50);
        for invoice in &invoices {
            assert!(ids.contains(invoice.customer_id.as_str()));
            let owner = customers
                .iter()
                .find(|c| c.customer_id == invoice.customer_id)
                .unwrap();
            assert_eq!(invoice.customer_name, owner.customer_name);
            assert_eq!(
                invoice.description,
                format!("Professional services for {}", owner.customer_name)
            );
        }
    }

    #[test]
    fn test_invoices_without_customers_use_private_set() {
        let invoices = generator(5)
            .with_fallback_customers(3)
            .generate_invoices(20, &[]);
        assert_eq!(invoices.len(), 20);
        for invoice in &invoices {
            assert!(
                ["CUST-0001", "CUST-0002", "CUST-0003"].contains(&invoice.customer_id.as_str())
            );
        }
    }

    #[test]
    fn test_invoice_dates_and_terms() {
        let invoices = generator(9)
            .with_payment_terms(45)
            .generate_invoices(30, &[]);
        for (i, invoice) in invoices.iter().enumerate() {
            assert_eq!(invoice.invoice_number, format!("INV-{:04}", i + 1));
            assert!(invoice.invoice_date <= today());
            assert!(invoice.invoice_date > today() - Duration::days(180));
            assert_eq!(invoice.due_date - invoice.invoice_date, Duration::days(45));
            assert_eq!(invoice.terms, "Net 45");
        }
    }

    #[test]
    fn test_invoice_amounts_are_derived() {
        let invoices = generator(2).generate_invoices(50, &[]);
        for invoice in &invoices {
            let base = invoice.amount.cents();
            assert!(AMOUNT_CENTS.contains(&base));
            assert_eq!(invoice.tax_amount, invoice.amount.scale(0.08));
            assert_eq!(invoice.total_amount, invoice.amount.scale(1.08));
            let drift = invoice.total_amount.cents() - base - invoice.tax_amount.cents();
            assert!(drift.abs() <= 1);
        }
    }

    #[test]
    fn test_same_seed_same_records() {
        let a = generator(42).generate_customers(10);
        let b = generator(42).generate_customers(10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(123_456).to_string(), "$1234.56");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
        assert_eq!(Money::from_cents(10_000).scale(0.08), Money::from_cents(800));
    }
}
