//! Column layout: the named ordering of variables in an assembled jet row.

use crate::error::{Error, Result};

/// Number of columns spliced into each raw jet line: the event weight,
/// the five Z-frame components, and the two gluon flags.
pub const SPLICED_COLS: usize = 8;

/// Ordered column layout for assembled jet rows.
///
/// Raw jet lines carry only the per-jet detector variables; the event
/// weight, the five-component Z-frame vector, and the two gluon-origin
/// flags are spliced in at the offsets resolved here by name. Immutable
/// once built.
#[derive(Debug, Clone)]
pub struct Format {
    vars: Vec<String>,
    weight_insert: usize,
    z_insert: usize,
    flag_insert: usize,
}

fn index_of(vars: &[String], name: &str) -> Result<usize> {
    vars.iter()
        .position(|v| v == name)
        .ok_or_else(|| Error::UnknownVariable(name.to_string()))
}

impl Format {
    /// Build a layout from an ordered variable list, resolving the three
    /// insertion offsets (`VAR_WEIGHT`, `Z_PX`, `GLUON_FLAG_1`) by name.
    pub fn from_vars(vars: Vec<String>) -> Result<Self> {
        let weight_insert = index_of(&vars, "VAR_WEIGHT")?;
        let z_insert = index_of(&vars, "Z_PX")?;
        let flag_insert = index_of(&vars, "GLUON_FLAG_1")?;
        Ok(Self { vars, weight_insert, z_insert, flag_insert })
    }

    /// The 16-column layout used by newer simulation output.
    pub fn newer() -> Self {
        Self::of_names(&[
            "VAR_NUM",
            "VAR_WEIGHT",
            "VAR_PT",
            "VAR_PSEUDORAP",
            "VAR_PHI",
            "VAR_M",
            "VAR_CONST",
            "VAR_RAP",
            "Z_PX",
            "Z_PY",
            "Z_PZ",
            "Z_E",
            "Z_RAP",
            "GLUON_FLAG_1",
            "GLUON_FLAG_2",
            "VAR_CONST_SD",
        ])
    }

    /// The 23-column layout that additionally carries the correlation and
    /// angularity variables plus their soft-drop counterparts.
    pub fn with_angularities() -> Self {
        Self::of_names(&[
            "VAR_NUM",
            "VAR_WEIGHT",
            "VAR_PT",
            "VAR_PSEUDORAP",
            "VAR_PHI",
            "VAR_M",
            "VAR_CONST",
            "VAR_RAP",
            "Z_PX",
            "Z_PY",
            "Z_PZ",
            "Z_E",
            "Z_RAP",
            "GLUON_FLAG_1",
            "GLUON_FLAG_2",
            "VAR_C11",
            "VAR_C10",
            "VAR_ANG1",
            "VAR_ANG05",
            "VAR_CONST_SD",
            "VAR_C11_SD",
            "VAR_C10_SD",
            "VAR_ANG1_SD",
        ])
    }

    fn of_names(names: &[&str]) -> Self {
        let vars = names.iter().map(|s| s.to_string()).collect();
        match Self::from_vars(vars) {
            Ok(format) => format,
            // Built-in layouts always contain the three insertion names.
            Err(_) => unreachable!("built-in layout resolves"),
        }
    }

    /// Total number of columns in an assembled jet row.
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Number of values expected on a raw jet line, before splicing.
    pub fn num_raw_vars(&self) -> usize {
        self.vars.len().saturating_sub(SPLICED_COLS)
    }

    /// Resolve a variable name to its column index.
    pub fn var(&self, name: &str) -> Result<usize> {
        index_of(&self.vars, name)
    }

    /// Column index where the event weight is spliced in.
    pub fn weight_insert(&self) -> usize {
        self.weight_insert
    }

    /// Column index where the five Z-frame components are spliced in.
    pub fn z_insert(&self) -> usize {
        self.z_insert
    }

    /// Column index where the two gluon flags are spliced in.
    pub fn flag_insert(&self) -> usize {
        self.flag_insert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_layout_insert_points() {
        let f = Format::newer();
        assert_eq!(f.num_vars(), 16);
        assert_eq!(f.num_raw_vars(), 8);
        assert_eq!(f.weight_insert(), 1);
        assert_eq!(f.z_insert(), 8);
        assert_eq!(f.flag_insert(), 13);
    }

    #[test]
    fn angularities_layout() {
        let f = Format::with_angularities();
        assert_eq!(f.num_vars(), 23);
        assert_eq!(f.var("VAR_ANG05").unwrap(), 18);
    }

    #[test]
    fn var_lookup() {
        let f = Format::newer();
        assert_eq!(f.var("VAR_PT").unwrap(), 2);
        assert_eq!(f.var("GLUON_FLAG_2").unwrap(), 14);
    }

    #[test]
    fn unknown_variable_is_an_error() {
        let f = Format::newer();
        let err = f.var("VAR_BOGUS").unwrap_err();
        assert!(err.to_string().contains("VAR_BOGUS"));
    }

    #[test]
    fn missing_insert_name_is_an_error() {
        let vars = vec!["VAR_A".to_string(), "VAR_WEIGHT".to_string()];
        assert!(Format::from_vars(vars).is_err());
    }
}
