//! Field extraction
//!
//! Pure parsers turning the semi-structured text columns of a listing into
//! typed values. CPU, memory and resolution descriptions degrade to absent
//! values when their pattern is missing; RAM and weight have no fallback and
//! fail with [`Error::Parse`].

use lazy_static::lazy_static;
use regex::Regex;

use super::columns;
use super::MemoryType;
use crate::error::{Error, Result};

lazy_static! {
    static ref CLOCK_RE: Regex = Regex::new(r"([\d.]+)GHz").expect("valid clock pattern");
    static ref PREFIXED_MODEL_RE: Regex =
        Regex::new(r"^[A-Za-z]{1,2}(\d{3,}[A-Za-z0-9]*)$").expect("valid model pattern");
    static ref RESOLUTION_RE: Regex =
        Regex::new(r"\b(\d+)x(\d+)\b").expect("valid resolution pattern");
    static ref CAPACITY_RE: Regex =
        Regex::new(r"\d+(?:\.\d+)?\s?\w+").expect("valid capacity pattern");
    static ref MEMORY_TYPE_RE: Regex =
        Regex::new(r"SSD|HDD|Flash Storage|Hybrid").expect("valid memory type pattern");
}

/// Parsed CPU description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuInfo {
    pub manufacturer: Option<String>,
    pub series: Option<String>,
    pub model: Option<String>,
    pub clock_ghz: Option<f64>,
}

/// Screen resolution in pixels. Width and height only exist together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Parsed storage description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryInfo {
    pub capacity: Option<String>,
    pub memory_type: Option<MemoryType>,
}

/// Parse a CPU description such as `"Intel Core i7 7200U 2.5GHz"`.
///
/// * manufacturer: first whitespace token
/// * series: first two tokens joined by a space
/// * model: first alphanumeric run that starts with a digit, the clock
///   excluded (`m3-7Y30` gives `7Y30`); failing that, the digits of a run
///   like `N3350` (short letter prefix, at least three digits)
/// * clock: digits and dots directly followed by `GHz`
pub fn extract_cpu(text: &str) -> CpuInfo {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let manufacturer = tokens.first().map(|t| t.to_string());
    let series = if tokens.is_empty() {
        None
    } else {
        Some(tokens.iter().take(2).copied().collect::<Vec<_>>().join(" "))
    };

    let model = extract_model(text);

    let clock_ghz = CLOCK_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite());

    CpuInfo {
        manufacturer,
        series,
        model,
        clock_ghz,
    }
}

fn extract_model(text: &str) -> Option<String> {
    let without_clock = CLOCK_RE.replace_all(text, " ");
    let runs: Vec<&str> = without_clock
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|run| !run.is_empty())
        .collect();

    if let Some(run) = runs.iter().find(|r| r.starts_with(|c: char| c.is_ascii_digit())) {
        return Some(run.to_string());
    }
    runs.iter()
        .find_map(|run| PREFIXED_MODEL_RE.captures(run))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find the first `WxH` token. Returns `None` unless both sides parse.
pub fn extract_resolution(text: &str) -> Option<Resolution> {
    let caps = RESOLUTION_RE.captures(text)?;
    let width = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let height = caps.get(2)?.as_str().parse::<u32>().ok()?;
    Some(Resolution { width, height })
}

/// Parse `"8GB"` into 8. The unit is required.
pub fn extract_ram(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_suffix("GB")
        .ok_or_else(|| Error::parse(columns::RAM, text, "missing 'GB' unit"))?;
    digits
        .parse::<u32>()
        .map_err(|e| Error::parse(columns::RAM, text, e.to_string()))
}

/// Capacity and storage type are matched independently of each other.
pub fn extract_memory(text: &str) -> MemoryInfo {
    let capacity = CAPACITY_RE.find(text).map(|m| m.as_str().to_string());
    let memory_type = MEMORY_TYPE_RE
        .find(text)
        .and_then(|m| MemoryType::from_label(m.as_str()));
    MemoryInfo {
        capacity,
        memory_type,
    }
}

/// Parse `"1.37kg"` into 1.37. The unit is required.
pub fn extract_weight(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let number = trimmed
        .strip_suffix("kg")
        .ok_or_else(|| Error::parse(columns::WEIGHT, text, "missing 'kg' unit"))?;
    let value = number
        .parse::<f64>()
        .map_err(|e| Error::parse(columns::WEIGHT, text, e.to_string()))?;
    if !value.is_finite() {
        return Err(Error::parse(columns::WEIGHT, text, "not a finite number"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_full_description() {
        let cpu = extract_cpu("Intel Core i7 7200U 2.5GHz");
        assert_eq!(cpu.manufacturer.as_deref(), Some("Intel"));
        assert_eq!(cpu.series.as_deref(), Some("Intel Core"));
        assert_eq!(cpu.model.as_deref(), Some("7200U"));
        assert_eq!(cpu.clock_ghz, Some(2.5));
    }

    #[test]
    fn cpu_without_model_number() {
        let cpu = extract_cpu("Intel Core i5 2.3GHz");
        assert_eq!(cpu.model, None);
        assert_eq!(cpu.clock_ghz, Some(2.3));
    }

    #[test]
    fn cpu_mixed_model_token() {
        let cpu = extract_cpu("Intel Core M 6Y75 1.2GHz");
        assert_eq!(cpu.series.as_deref(), Some("Intel Core"));
        assert_eq!(cpu.model.as_deref(), Some("6Y75"));
        assert_eq!(cpu.clock_ghz, Some(1.2));
    }

    #[test]
    fn cpu_hyphenated_model_runs() {
        let core_m = extract_cpu("Intel Core M m3-7Y30 2.2GHz");
        assert_eq!(core_m.model.as_deref(), Some("7Y30"));
        assert_eq!(core_m.clock_ghz, Some(2.2));

        let xeon = extract_cpu("Intel Xeon E3-1505M V6 3GHz");
        assert_eq!(xeon.model.as_deref(), Some("1505M"));
        assert_eq!(xeon.clock_ghz, Some(3.0));

        let amd = extract_cpu("AMD A9-Series 9420 3GHz");
        assert_eq!(amd.model.as_deref(), Some("9420"));
    }

    #[test]
    fn cpu_letter_prefixed_model() {
        let celeron = extract_cpu("Intel Celeron Dual Core N3350 1.1GHz");
        assert_eq!(celeron.series.as_deref(), Some("Intel Celeron"));
        assert_eq!(celeron.model.as_deref(), Some("3350"));
        assert_eq!(celeron.clock_ghz, Some(1.1));

        let atom = extract_cpu("Intel Atom x5-Z8350 1.44GHz");
        assert_eq!(atom.model.as_deref(), Some("8350"));
    }

    #[test]
    fn cpu_clock_is_never_the_model() {
        let cpu = extract_cpu("Intel Core i7 2.7GHz");
        assert_eq!(cpu.model, None);
        assert_eq!(cpu.clock_ghz, Some(2.7));
    }

    #[test]
    fn cpu_without_clock() {
        let cpu = extract_cpu("Samsung Cortex A72&A53");
        assert_eq!(cpu.manufacturer.as_deref(), Some("Samsung"));
        assert_eq!(cpu.series.as_deref(), Some("Samsung Cortex"));
        assert_eq!(cpu.model, None);
        assert_eq!(cpu.clock_ghz, None);
    }

    #[test]
    fn cpu_single_token_and_empty() {
        let cpu = extract_cpu("AMD");
        assert_eq!(cpu.series.as_deref(), Some("AMD"));

        let empty = extract_cpu("   ");
        assert_eq!(empty, CpuInfo::default());
    }

    #[test]
    fn cpu_malformed_clock_is_absent() {
        let cpu = extract_cpu("Intel Core i3 ..GHz");
        assert_eq!(cpu.clock_ghz, None);
    }

    #[test]
    fn resolution_embedded_in_description() {
        let res = extract_resolution("IPS Panel Retina Display 2560x1600").unwrap();
        assert_eq!(res, Resolution { width: 2560, height: 1600 });
    }

    #[test]
    fn resolution_requires_whole_token() {
        assert_eq!(extract_resolution("Full HD"), None);
        assert_eq!(extract_resolution("a1920x1080"), None);
    }

    #[test]
    fn resolution_overflow_drops_both_sides() {
        assert_eq!(extract_resolution("1920x99999999999"), None);
    }

    #[test]
    fn ram_parsing() {
        assert_eq!(extract_ram("8GB").unwrap(), 8);
        assert_eq!(extract_ram("16GB").unwrap(), 16);
        assert!(matches!(extract_ram("8"), Err(Error::Parse { .. })));
        assert!(matches!(extract_ram("8gb"), Err(Error::Parse { .. })));
        assert!(matches!(extract_ram("eightGB"), Err(Error::Parse { .. })));
    }

    #[test]
    fn memory_parsing() {
        let m = extract_memory("128GB SSD +  1TB HDD");
        assert_eq!(m.capacity.as_deref(), Some("128GB"));
        assert_eq!(m.memory_type, Some(MemoryType::Ssd));

        let flash = extract_memory("64GB Flash Storage");
        assert_eq!(flash.memory_type, Some(MemoryType::FlashStorage));

        let hybrid = extract_memory("1.0TB Hybrid");
        assert_eq!(hybrid.capacity.as_deref(), Some("1.0TB"));
        assert_eq!(hybrid.memory_type, Some(MemoryType::Hybrid));
    }

    #[test]
    fn memory_fields_are_independent() {
        let only_type = extract_memory("SSD");
        assert_eq!(only_type.capacity, None);
        assert_eq!(only_type.memory_type, Some(MemoryType::Ssd));

        let only_capacity = extract_memory("512GB eMMC");
        assert_eq!(only_capacity.capacity.as_deref(), Some("512GB"));
        assert_eq!(only_capacity.memory_type, None);
    }

    #[test]
    fn weight_parsing() {
        assert_eq!(extract_weight("1.37kg").unwrap(), 1.37);
        assert_eq!(extract_weight("2kg").unwrap(), 2.0);
        assert!(matches!(extract_weight("1.37"), Err(Error::Parse { .. })));
        assert!(matches!(extract_weight("NaNkg"), Err(Error::Parse { .. })));
    }
}
