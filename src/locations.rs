//! Normalization of heterogeneous location tokens.
//!
//! The World Bank APIs accept ISO 3166 alpha-2 and alpha-3 country codes,
//! a handful of non-ISO entity codes (aggregates and historical territories
//! the Bank defines itself), and numeric basin IDs. This module converts any
//! of them to a requested canonical form, and is deliberately total: a token
//! with no known mapping comes back unchanged, so basin IDs and unknown
//! codes flow through URL construction and result keys without special
//! casing at every call site.

/// The requested canonical representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alpha {
    Two,
    Three,
}

/// One non-ISO World Bank entity: `(alpha-3-style key, alpha-2 id, name)`.
///
/// Built offline from the upstream country listing with all genuinely-ISO
/// entries removed, mirroring what the Indicators API itself reports.
pub type Region = (&'static str, &'static str, &'static str);

/// Non-ISO codes the Indicators API uses for aggregates, groups and
/// territories outside ISO 3166.
pub static NON_ISO_REGIONS: &[Region] = &[
    ("ARB", "1A", "Arab World"),
    ("CSS", "S3", "Caribbean small states"),
    ("CHI", "JG", "Channel Islands"),
    ("EAS", "Z4", "East Asia & Pacific"),
    ("EAP", "4E", "East Asia & Pacific (developing only)"),
    ("EMU", "XC", "Euro area"),
    ("ECS", "Z7", "Europe & Central Asia"),
    ("ECA", "7E", "Europe & Central Asia (developing only)"),
    ("EUU", "EU", "European Union"),
    ("HPC", "XE", "Heavily indebted poor countries (HIPC)"),
    ("HIC", "XD", "High income"),
    ("KSV", "KV", "Kosovo"),
    ("LCN", "ZJ", "Latin America & Caribbean"),
    ("LAC", "XJ", "Latin America & Caribbean (developing only)"),
    ("LDC", "XL", "Least developed countries: UN classification"),
    ("LIC", "XM", "Low income"),
    ("LMY", "XO", "Low & middle income"),
    ("LMC", "XN", "Lower middle income"),
    ("MEA", "ZQ", "Middle East & North Africa"),
    ("MNA", "XQ", "Middle East & North Africa (developing only)"),
    ("MIC", "XP", "Middle income"),
    ("NAC", "XU", "North America"),
    ("OED", "OE", "OECD members"),
    ("OSS", "S4", "Other small states"),
    ("PSS", "S2", "Pacific island small states"),
    ("SST", "S1", "Small states"),
    ("SAS", "8S", "South Asia"),
    ("SSF", "ZG", "Sub-Saharan Africa"),
    ("SSA", "ZF", "Sub-Saharan Africa (developing only)"),
    ("UMC", "XT", "Upper middle income"),
    ("WLD", "1W", "World"),
];

/// True if the token is a numeric basin identifier rather than a country
/// code. Basins never resolve through ISO tables.
pub fn is_basin(code: &str) -> bool {
    code.parse::<i64>().is_ok()
}

/// Converts a location token to the requested alpha representation.
///
/// Lookup order: numeric basin test (identity), ISO 3166 by token length,
/// then the [`NON_ISO_REGIONS`] table. A miss returns the input unchanged,
/// so this function is total and idempotent.
pub fn normalize(code: &str, target: Alpha) -> String {
    normalize_with(code, target, NON_ISO_REGIONS)
}

/// [`normalize`] against a caller-supplied non-ISO table.
pub fn normalize_with(code: &str, target: Alpha, regions: &[Region]) -> String {
    if is_basin(code) {
        return code.to_string();
    }

    let upper = code.to_uppercase();
    let country = match upper.len() {
        2 => rust_iso3166::from_alpha2(&upper),
        3 => rust_iso3166::from_alpha3(&upper),
        _ => None,
    };
    if let Some(country) = country {
        return match target {
            Alpha::Two => country.alpha2.to_string(),
            Alpha::Three => country.alpha3.to_string(),
        };
    }

    match target {
        Alpha::Two => {
            for (key, id, _) in regions {
                if *key == upper {
                    return (*id).to_string();
                }
            }
        }
        Alpha::Three => {
            for (key, id, _) in regions {
                if *id == upper {
                    return (*key).to_string();
                }
            }
        }
    }

    code.to_string()
}

/// A display name for a location token, when one is known.
pub fn location_name(code: &str) -> Option<&'static str> {
    if is_basin(code) {
        return None;
    }
    let upper = code.to_uppercase();
    let country = match upper.len() {
        2 => rust_iso3166::from_alpha2(&upper),
        3 => rust_iso3166::from_alpha3(&upper),
        _ => None,
    };
    if let Some(country) = country {
        return Some(country.name);
    }
    NON_ISO_REGIONS
        .iter()
        .find(|(key, id, _)| *key == upper || *id == upper)
        .map(|(_, _, name)| *name)
}
