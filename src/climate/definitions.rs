//! Static Climate API contract data.
//!
//! Unlike the Indicators API, the Climate API publishes no machine-readable
//! catalogue, so these tables are copied from the upstream developer
//! documentation. They are plain immutable data handed to whoever needs
//! them, never mutated at runtime.

/// Aggregation types: `(api code, description)`.
pub static DATA_TYPES: &[(&str, &str)] = &[
    ("mavg", "Monthly average"),
    ("aavg", "Annual average"),
    ("manom", "Average monthly change (anomaly)."),
    ("aanom", "Average annual change (anomaly)."),
];

/// Derived ensemble statistics: `(api code, description)`.
pub static STATS: &[(&str, &str)] = &[
    ("tmin_means", "Average daily minimum temperature, Celsius"),
    ("tmax_means", "Average daily maximum temperature, Celsius"),
    (
        "tmax_days90th",
        "Number of days with max temperature above the control period's 90th percentile (hot days)",
    ),
    (
        "tmin_days90th",
        "Number of days with min temperature above the control period's 90th percentile (warm nights)",
    ),
    (
        "tmax_days10th",
        "Number of days with max temperature below the control period's 10th percentile (cool days)",
    ),
    (
        "tmin_days10th",
        "Number of days with min temperature below the control period's 10th percentile (cold nights)",
    ),
    (
        "tmin_days0",
        "Number of days with min temperature below 0 degrees Celsius",
    ),
    ("ppt_days", "Number of days with precipitation > 0.2mm"),
    ("ppt_days2", "Number of days with precipitation > 2mm"),
    ("ppt_days10", "Number of days with precipitation > 10mm"),
    (
        "ppt_days90th",
        "Number of days with precipitation > the control period's 90th percentile",
    ),
    (
        "ppt_dryspell",
        "Average number of days between precipitation events",
    ),
    ("ppt_means", "Average daily precipitation"),
];

/// Global circulation models and the synthetic ensemble keys:
/// `(api code, description)`.
pub static GCMS: &[(&str, &str)] = &[
    ("bccr_bcm2_0", "BCM 2.0"),
    ("csiro_mk3_5", "CSIRO Mark 3.5"),
    ("ingv_echam4", "ECHAM 4.6"),
    ("cccma_cgcm3_1", "CGCM 3.1 (T47)"),
    ("cnrm_cm3", "CNRM CM3"),
    ("gfdl_cm2_0", "GFDL CM2.0"),
    ("gfdl_cm2_1", "GFDL CM2.1"),
    ("ipsl_cm4", "IPSL-CM4"),
    ("microc3_2_medres", "MIROC 3.2 (medres)"),
    ("miub_echo_g", "ECHO-G"),
    ("mpi_echam5", "ECHAM5/MPI-OM"),
    ("mri_cgcm2_3_2a", "MRI-CGCM2.3.2"),
    ("inmcm3_0", "INMCM3.0"),
    ("ukmo_hadcm3", "UKMO HadCM3"),
    ("ukmo_hadgem1", "UKMO HadGEM1"),
    ("ensemble", "All percentile values of all models together"),
    ("ensemble_10", "10th percentile values of all models together"),
    ("ensemble_50", "50th percentile values of all models together"),
    ("ensemble_90", "90th percentile values of all models together"),
];

/// SRES emissions scenarios: `(api code, description)`.
pub static SRES: &[(&str, &str)] = &[("a2", "A2 Scenario"), ("b1", "B1 Scenario")];

/// Descriptions for the two base physical variables.
pub static VARIABLES: &[(&str, &str)] = &[
    (
        "pr",
        "Precipitation (rainfall and assumed water equivalent), in millimeters",
    ),
    ("tas", "Temperature, in degrees Celsius"),
];

/// Anomaly values for pr/tas are relative to this baseline.
pub const CONTROL_PERIOD_VARIABLE: &str = "The control period is 1961 - 1999.";
/// Derived statistics use a slightly different baseline.
pub const CONTROL_PERIOD_STAT: &str = "The control period is 1961 - 2000.";

/// Looks a code up in one of the definition tables.
pub fn describe(
    table: &'static [(&'static str, &'static str)],
    code: &str,
) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(code))
        .map(|(_, description)| *description)
}
