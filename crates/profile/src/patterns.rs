// Fixed pattern library for string columns

use std::sync::OnceLock;

use regex::Regex;

/// Share of sampled values that must match for a pattern to be reported.
pub const DETECTION_RATIO: f64 = 0.8;

const SOURCES: &[(&str, &str)] = &[
    ("email", r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$"),
    ("phone", r"^\+?\d{0,3}[\s.-]?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}$"),
    ("iso_date", r"^\d{4}-\d{2}-\d{2}$"),
    (
        "iso_datetime",
        r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?$",
    ),
    (
        "uuid",
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
    ),
    ("url", r"(?i)^(https?|ftp)://[^\s/$.?#][^\s]*$"),
    (
        "ipv4",
        r"^((25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$",
    ),
    ("us_zip", r"^\d{5}(-\d{4})?$"),
    ("currency", r"^[$€£¥]\s?-?[\d,]+(\.\d{2})?$"),
    ("percentage", r"^-?\d+(\.\d+)?\s?%$"),
];

pub struct Pattern {
    pub name: &'static str,
    regex: Regex,
}

impl Pattern {
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

static LIBRARY: OnceLock<Vec<Pattern>> = OnceLock::new();

pub fn library() -> &'static [Pattern] {
    LIBRARY.get_or_init(|| {
        SOURCES
            .iter()
            .map(|&(name, src)| Pattern {
                name,
                regex: Regex::new(src).expect("pattern library regex is valid"),
            })
            .collect()
    })
}

/// Names of the patterns matched by at least [`DETECTION_RATIO`] of `sample`,
/// in library order.
pub fn detect(sample: &[&str]) -> Vec<String> {
    if sample.is_empty() {
        return Vec::new();
    }
    let needed = sample.len() as f64 * DETECTION_RATIO;
    library()
        .iter()
        .filter(|p| {
            let hits = sample.iter().filter(|v| p.is_match(v.trim())).count();
            hits as f64 >= needed
        })
        .map(|p| p.name.to_string())
        .collect()
}
