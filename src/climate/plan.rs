//! Fan-out planning for modelled climate requests.
//!
//! A single logical request (locations, data type, variable) maps to many
//! physical URLs, because the upstream partitions data by fixed time window
//! and serves direct-model and ensemble data from different endpoints. The
//! planner enumerates that set up front: it is a pure cross product of
//! `locations x windows x variants`, performs no I/O, and is deterministic,
//! which is what lets the merge step accept fragments in any order.

use crate::locations::{self, Alpha};

/// A closed year range the upstream serves as one unit.
///
/// Windows are fixed upstream contract data, not computed; a request fetches
/// every window in the applicable table and the merger assembles whatever
/// coverage comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start: i32,
    pub end: i32,
}

impl TimeWindow {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }
}

/// Windows for the modelled base variables (pr, tas). Note the gap between
/// 1999 and 2020.
pub static MODELLED_WINDOWS: [TimeWindow; 8] = [
    TimeWindow::new(1920, 1939),
    TimeWindow::new(1940, 1959),
    TimeWindow::new(1960, 1979),
    TimeWindow::new(1980, 1999),
    TimeWindow::new(2020, 2039),
    TimeWindow::new(2040, 2059),
    TimeWindow::new(2060, 2079),
    TimeWindow::new(2080, 2099),
];

/// Windows for derived ensemble statistics.
pub static STAT_WINDOWS: [TimeWindow; 3] = [
    TimeWindow::new(1961, 2000),
    TimeWindow::new(2046, 2065),
    TimeWindow::new(2081, 2100),
];

/// The window tables a planner draws from. Injectable so tests can plan
/// against substitute tables.
#[derive(Debug, Clone, Copy)]
pub struct Windows {
    pub modelled: &'static [TimeWindow],
    pub stat: &'static [TimeWindow],
}

impl Default for Windows {
    fn default() -> Self {
        Self {
            modelled: &MODELLED_WINDOWS,
            stat: &STAT_WINDOWS,
        }
    }
}

/// What is being measured: a base physical variable, or a statistic derived
/// from the cross-model ensemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variable {
    Precipitation,
    Temperature,
    /// A derived-statistic code such as `tmin_means`; see
    /// [`crate::climate::definitions::STATS`].
    Stat(String),
}

impl Variable {
    /// The code embedded in request URLs.
    pub fn code(&self) -> &str {
        match self {
            Variable::Precipitation => "pr",
            Variable::Temperature => "tas",
            Variable::Stat(code) => code,
        }
    }

    /// Base variables get both direct and ensemble calls over the modelled
    /// window table; derived stats are ensemble-only over the stat table.
    pub fn is_base(&self) -> bool {
        matches!(self, Variable::Precipitation | Variable::Temperature)
    }
}

/// Aggregation type of a modelled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    MonthlyAverage,
    AnnualAverage,
    MonthlyAnomaly,
    AnnualAnomaly,
}

impl DataType {
    /// The code embedded in request URLs. The short `aavg`/`aanom` aliases
    /// expand to the `annual*` forms the API actually accepts.
    pub fn code(&self) -> &'static str {
        match self {
            DataType::MonthlyAverage => "mavg",
            DataType::AnnualAverage => "annualavg",
            DataType::MonthlyAnomaly => "manom",
            DataType::AnnualAnomaly => "annualanom",
        }
    }

    /// The short code used in the definitions table.
    pub fn short_code(&self) -> &'static str {
        match self {
            DataType::MonthlyAverage => "mavg",
            DataType::AnnualAverage => "aavg",
            DataType::MonthlyAnomaly => "manom",
            DataType::AnnualAnomaly => "aanom",
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, DataType::MonthlyAnomaly | DataType::AnnualAnomaly)
    }
}

/// Whether a physical call hits the direct-model endpoint or the ensemble
/// (percentile) endpoint. The two have different URL shapes and response
/// row shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Direct,
    Ensemble,
}

/// Country or basin, decided by the numeric-token test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Country,
    Basin,
}

impl LocationKind {
    fn path_segment(&self) -> &'static str {
        match self {
            LocationKind::Country => "country",
            LocationKind::Basin => "basin",
        }
    }
}

/// One planned physical call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalRequest {
    /// Path-ready location token: alpha-3 for countries, the numeric ID for
    /// basins.
    pub location: String,
    pub kind: LocationKind,
    pub window: TimeWindow,
    pub variant: Variant,
}

impl PhysicalRequest {
    /// Renders the request URL. Byte-identical output for identical inputs;
    /// the cache keys on the URL string, so this must stay deterministic.
    pub fn url(&self, base_url: &str, data_type: DataType, variable: &Variable) -> String {
        match self.variant {
            Variant::Direct => format!(
                "{base_url}v1/{}/{}/{}/{}/{}/{}.json",
                self.kind.path_segment(),
                data_type.code(),
                variable.code(),
                self.window.start,
                self.window.end,
                self.location,
            ),
            Variant::Ensemble => format!(
                "{base_url}v1/{}/{}/ensemble/{}/{}/{}/{}.json",
                self.kind.path_segment(),
                data_type.code(),
                variable.code(),
                self.window.start,
                self.window.end,
                self.location,
            ),
        }
    }
}

/// Enumerates every physical request a logical modelled call needs.
pub fn plan(locations: &[String], variable: &Variable, windows: Windows) -> Vec<PhysicalRequest> {
    let (table, variants): (&[TimeWindow], &[Variant]) = if variable.is_base() {
        (windows.modelled, &[Variant::Direct, Variant::Ensemble])
    } else {
        (windows.stat, &[Variant::Ensemble])
    };

    let mut requests = Vec::with_capacity(table.len() * locations.len() * variants.len());
    for window in table {
        for location in locations {
            let (token, kind) = if locations::is_basin(location) {
                (location.clone(), LocationKind::Basin)
            } else {
                (locations::normalize(location, Alpha::Three), LocationKind::Country)
            };
            for variant in variants {
                requests.push(PhysicalRequest {
                    location: token.clone(),
                    kind,
                    window: *window,
                    variant: *variant,
                });
            }
        }
    }
    requests
}
