//! Named value providers.
//!
//! A provider produces a realistic value for a semantic field ("email",
//! "city", "flight_code", ...). Providers are looked up by name in a
//! [`ProviderRegistry`]; names are matched ignoring case and underscores,
//! so `first_name` and `firstName` resolve to the same provider.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::HashMap;
use workload_core::Value;

/// Uniform provider signature.
pub type ProviderFn = fn(&mut dyn RngCore) -> Value;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Carlos", "Aiko", "Priya", "Mateo", "Olga", "Kwame",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Wilson", "Anderson", "Taylor", "Moore", "Nakamura", "Singh",
    "Okafor", "Ivanova",
];

pub(crate) const CITIES: &[&str] = &[
    "New York", "London", "Paris", "Tokyo", "Sydney", "Toronto", "Berlin", "Madrid", "Rome",
    "Chicago", "Dubai", "Singapore", "Mumbai", "Sao Paulo", "Mexico City", "Seoul", "Amsterdam",
    "Lisbon", "Cairo", "Nairobi", "Denver", "Seattle", "Boston", "Miami",
];

const COUNTRIES: &[&str] = &[
    "United States", "United Kingdom", "France", "Japan", "Australia", "Canada", "Germany", "Spain",
    "Italy", "Brazil", "India", "Mexico", "South Korea", "Portugal", "Egypt", "Kenya",
];

const STATES: &[&str] = &[
    "California", "Texas", "New York", "Florida", "Illinois", "Ohio", "Georgia", "Washington",
    "Colorado", "Oregon", "Arizona", "Nevada",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Boulevard", "Drive"];

const COMPANIES: &[&str] = &[
    "Acme Corp", "Globex", "Initech", "Umbrella", "Stark Industries", "Wayne Enterprises",
    "Hooli", "Vandelay Industries", "Soylent", "Tyrell",
];

const JOB_TITLES: &[&str] = &[
    "Engineer", "Manager", "Analyst", "Designer", "Consultant", "Director", "Technician",
    "Accountant", "Pilot", "Flight Attendant",
];

const WORDS: &[&str] = &[
    "alpha", "bravo", "cloud", "delta", "ember", "falcon", "granite", "harbor", "iris", "jade",
    "kernel", "lumen", "meadow", "nova", "orbit", "prism", "quartz", "river", "summit", "tundra",
];

const COLORS: &[&str] = &[
    "red", "green", "blue", "yellow", "purple", "orange", "black", "white", "silver", "teal",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "mail.test", "inbox.dev", "corp.example"];

const AIRLINES: &[&str] = &[
    "Skyline Air", "Northwind Airways", "Pacific Jet", "Atlas Airlines", "Aurora Air",
];

fn pick(rng: &mut dyn RngCore, items: &[&str]) -> String {
    items.choose(rng).map(|s| s.to_string()).unwrap_or_default()
}

fn first_name(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, FIRST_NAMES))
}

fn last_name(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, LAST_NAMES))
}

/// "First Last"
pub(crate) fn full_name(rng: &mut dyn RngCore) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

fn name(rng: &mut dyn RngCore) -> Value {
    Value::String(full_name(rng))
}

fn email(rng: &mut dyn RngCore) -> Value {
    let first = pick(rng, FIRST_NAMES).to_lowercase();
    let last = pick(rng, LAST_NAMES).to_lowercase();
    let n = rng.gen_range(1..1000);
    let domain = pick(rng, EMAIL_DOMAINS);
    Value::String(format!("{first}.{last}{n}@{domain}"))
}

fn username(rng: &mut dyn RngCore) -> Value {
    let word = pick(rng, WORDS);
    Value::String(format!("{word}{}", rng.gen_range(10..10_000)))
}

fn phone(rng: &mut dyn RngCore) -> Value {
    Value::String(format!(
        "+1-{:03}-{:03}-{:04}",
        rng.gen_range(200..1000),
        rng.gen_range(200..1000),
        rng.gen_range(0..10_000)
    ))
}

fn city(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, CITIES))
}

fn country(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, COUNTRIES))
}

fn state(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, STATES))
}

fn street(rng: &mut dyn RngCore) -> Value {
    let number = rng.gen_range(1..10_000);
    let word = pick(rng, WORDS);
    let suffix = pick(rng, STREET_SUFFIXES);
    let mut chars = word.chars();
    let word = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => word,
    };
    Value::String(format!("{number} {word} {suffix}"))
}

fn zip(rng: &mut dyn RngCore) -> Value {
    Value::String(format!("{:05}", rng.gen_range(0..100_000)))
}

fn company(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, COMPANIES))
}

fn job_title(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, JOB_TITLES))
}

fn word(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, WORDS))
}

fn sentence(rng: &mut dyn RngCore) -> Value {
    let len = rng.gen_range(4..10);
    let words: Vec<String> = (0..len).map(|_| pick(rng, WORDS)).collect();
    let mut text = words.join(" ");
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    text.push('.');
    Value::String(text)
}

fn color(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, COLORS))
}

fn url(rng: &mut dyn RngCore) -> Value {
    let host = pick(rng, WORDS);
    let path = pick(rng, WORDS);
    Value::String(format!("https://{host}.example.com/{path}"))
}

fn ipv4(rng: &mut dyn RngCore) -> Value {
    Value::String(format!(
        "{}.{}.{}.{}",
        rng.gen_range(1..=254),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(1..=254)
    ))
}

fn ssn(rng: &mut dyn RngCore) -> Value {
    Value::String(format!(
        "{:03}-{:02}-{:04}",
        rng.gen_range(1..900),
        rng.gen_range(1..100),
        rng.gen_range(1..10_000)
    ))
}

fn uuid_string(rng: &mut dyn RngCore) -> Value {
    match crate::generators::uuid::generate_uuid_v4(rng) {
        Value::Uuid(u) => Value::String(u.to_string()),
        other => other,
    }
}

fn airline(rng: &mut dyn RngCore) -> Value {
    Value::String(pick(rng, AIRLINES))
}

/// Two uppercase letters followed by 100..=999, e.g. `KX512`.
fn flight_code(rng: &mut dyn RngCore) -> Value {
    let a = char::from(b'A' + rng.gen_range(0..26u8));
    let b = char::from(b'A' + rng.gen_range(0..26u8));
    Value::String(format!("{a}{b}{}", rng.gen_range(100..=999)))
}

/// Gate letter A-F followed by 1..=50, e.g. `C17`.
fn gate(rng: &mut dyn RngCore) -> Value {
    let letter = char::from(b'A' + rng.gen_range(0..6u8));
    Value::String(format!("{letter}{}", rng.gen_range(1..=50)))
}

/// Name-to-generator lookup table.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderFn>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// The registry with every built-in provider.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        let builtins: &[(&str, ProviderFn)] = &[
            ("first_name", first_name),
            ("last_name", last_name),
            ("name", name),
            ("email", email),
            ("username", username),
            ("phone", phone),
            ("city", city),
            ("country", country),
            ("state", state),
            ("street", street),
            ("zip", zip),
            ("company", company),
            ("job_title", job_title),
            ("word", word),
            ("sentence", sentence),
            ("color", color),
            ("url", url),
            ("ipv4", ipv4),
            ("ssn", ssn),
            ("uuid", uuid_string),
            ("airline", airline),
            ("flight_code", flight_code),
            ("gate", gate),
        ];
        for (name, provider) in builtins {
            registry.register(name, *provider);
        }
        registry
    }

    /// Register (or replace) a provider.
    pub fn register(&mut self, name: &str, provider: ProviderFn) {
        self.providers.insert(normalize_name(name), provider);
    }

    pub fn get(&self, name: &str) -> Option<ProviderFn> {
        self.providers.get(&normalize_name(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.providers.keys().collect();
        names.sort();
        f.debug_struct("ProviderRegistry").field("providers", &names).finish()
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
