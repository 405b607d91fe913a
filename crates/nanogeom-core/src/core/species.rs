use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Crystal packing of a species' bulk phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Packing {
    Fcc,
    Bcc,
    Hcp,
    /// Two-dimensional hexagonal sheet (graphene).
    Honeycomb,
}

impl fmt::Display for Packing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Packing::Fcc => "FCC",
            Packing::Bcc => "BCC",
            Packing::Hcp => "HCP",
            Packing::Honeycomb => "honeycomb",
        };
        f.write_str(name)
    }
}

/// Crystallographic parameters of a single species.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SpeciesParams {
    /// Lattice constant `a` in Angstroms.
    pub lattice_constant: f64,
    /// Lattice constant `c` in Angstroms, for hexagonal packings.
    #[serde(default)]
    pub lattice_c: Option<f64>,
    /// Nearest-neighbor distance in Angstroms. Used as the default merge cutoff.
    pub nearest_neighbor: f64,
    pub packing: Packing,
}

const fn fcc(a: f64, nn: f64) -> SpeciesParams {
    SpeciesParams {
        lattice_constant: a,
        lattice_c: None,
        nearest_neighbor: nn,
        packing: Packing::Fcc,
    }
}

const fn bcc(a: f64, nn: f64) -> SpeciesParams {
    SpeciesParams {
        lattice_constant: a,
        lattice_c: None,
        nearest_neighbor: nn,
        packing: Packing::Bcc,
    }
}

const fn hcp(a: f64, c: f64) -> SpeciesParams {
    SpeciesParams {
        lattice_constant: a,
        lattice_c: Some(c),
        nearest_neighbor: a,
        packing: Packing::Hcp,
    }
}

#[rustfmt::skip]
static BUILTIN_SPECIES: Map<&'static str, SpeciesParams> = phf_map! {
    // --- FCC metals ---
    "ag" => fcc(4.09, 2.88),    "au" => fcc(4.09, 2.88),
    "al" => fcc(4.05, 2.86378), "ni" => fcc(3.52, 2.48902),
    "cu" => fcc(3.61, 2.55266), "pd" => fcc(3.89, 2.75065),
    "pt" => fcc(3.92, 2.77186), "pb" => fcc(4.95, 3.50018),
    "th" => fcc(5.08, 3.59210), "ce" => fcc(3.68, 2.60215),
    "yb" => fcc(5.49, 3.88202),

    // --- BCC metals ---
    "na" => bcc(4.225, 3.65),   "fe" => bcc(2.87, 2.48549),
    "mo" => bcc(3.15, 2.72798), "w"  => bcc(3.16, 2.73664),
    "v"  => bcc(3.02, 2.61540), "nb" => bcc(3.30, 2.85788),
    "ta" => bcc(3.31, 2.86654), "eu" => bcc(4.61, 3.99238),
    "ba" => bcc(5.02, 4.34745), "ra" => bcc(5.15, 4.46003),
    "cr" => bcc(2.88, 2.49415), "li" => bcc(3.49, 3.02243),
    "k"  => bcc(5.23, 4.52931), "rb" => bcc(5.59, 4.84108),
    "cs" => bcc(6.05, 5.23945), "fr" => bcc(5.70, 4.93634),

    // --- HCP metals (a, c) ---
    "mg" => hcp(3.21, 5.21), "ti" => hcp(2.95, 4.68),
    "zn" => hcp(2.66, 4.95), "os" => hcp(2.73, 4.32),
    "sc" => hcp(3.31, 5.27), "zr" => hcp(3.23, 5.15),
    "hf" => hcp(3.20, 5.08), "gd" => hcp(3.63, 5.78),
    "tb" => hcp(3.62, 5.69), "dy" => hcp(3.61, 5.65),
    "ho" => hcp(3.60, 5.61), "er" => hcp(3.59, 5.60),
    "tm" => hcp(3.58, 5.57), "be" => hcp(2.29, 3.58),
    "re" => hcp(2.76, 4.46), "co" => hcp(3.54, 4.52),
    "ru" => hcp(2.71, 4.28),
    "lu" => SpeciesParams { lattice_constant: 3.51, lattice_c: None, nearest_neighbor: 3.51, packing: Packing::Hcp },

    // --- Graphene ---
    "c" => SpeciesParams { lattice_constant: 2.46, lattice_c: None, nearest_neighbor: 1.42, packing: Packing::Honeycomb },
};

#[derive(Debug, Error)]
pub enum SpeciesLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid parameters for species '{species}': {reason}")]
    InvalidParams { species: String, reason: String },
}

/// Lookup table from species symbol to crystallographic parameters.
///
/// Backed by a compiled-in table of common metals and graphene carbon, optionally
/// extended or overridden by user-supplied entries. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    overrides: HashMap<String, SpeciesParams>,
}

impl SpeciesTable {
    /// The compiled-in table with no overrides.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Loads override entries from a TOML file keyed by species symbol.
    ///
    /// ```toml
    /// [ag]
    /// lattice-constant = 4.086
    /// nearest-neighbor = 2.889
    /// packing = "fcc"
    /// ```
    pub fn load_overrides(path: &Path) -> Result<Self, SpeciesLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| SpeciesLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let entries: HashMap<String, SpeciesParams> =
            toml::from_str(&content).map_err(|e| SpeciesLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;

        let mut table = Self::builtin();
        for (symbol, params) in entries {
            table.insert(&symbol, params)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, symbol: &str, params: SpeciesParams) -> Result<(), SpeciesLoadError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(params.lattice_constant) || !positive(params.nearest_neighbor) {
            return Err(SpeciesLoadError::InvalidParams {
                species: symbol.to_string(),
                reason: "lattice constant and nearest-neighbor distance must be positive"
                    .to_string(),
            });
        }
        self.overrides.insert(symbol.to_lowercase(), params);
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<SpeciesParams> {
        let key = symbol.to_lowercase();
        self.overrides
            .get(&key)
            .copied()
            .or_else(|| BUILTIN_SPECIES.get(key.as_str()).copied())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }
}

/// Formats a species label the way structure files print it: `au` becomes `Au`.
pub fn display_symbol(symbol: &str) -> String {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn builtin_lookup_is_case_insensitive() {
        let table = SpeciesTable::builtin();
        let au = table.get("Au").unwrap();
        assert_eq!(au.lattice_constant, 4.09);
        assert_eq!(au.nearest_neighbor, 2.88);
        assert_eq!(au.packing, Packing::Fcc);
        assert_eq!(table.get("FE").unwrap().packing, Packing::Bcc);
        assert!(table.get("xx").is_none());
    }

    #[test]
    fn hcp_entries_carry_c_parameter() {
        let mg = SpeciesTable::builtin().get("mg").unwrap();
        assert_eq!(mg.packing, Packing::Hcp);
        assert_eq!(mg.lattice_c, Some(5.21));
        assert_eq!(mg.nearest_neighbor, mg.lattice_constant);
    }

    #[test]
    fn graphene_carbon_uses_honeycomb_packing() {
        let c = SpeciesTable::builtin().get("C").unwrap();
        assert_eq!(c.packing, Packing::Honeycomb);
        assert_eq!(c.nearest_neighbor, 1.42);
    }

    #[test]
    fn load_overrides_replaces_and_extends_builtin_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("species.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            [Ag]
            lattice-constant = 4.086
            nearest-neighbor = 2.889
            packing = "fcc"

            [xx]
            lattice-constant = 3.0
            nearest-neighbor = 2.1
            packing = "bcc"
            "#
        )
        .unwrap();

        let table = SpeciesTable::load_overrides(&path).unwrap();
        assert_eq!(table.get("ag").unwrap().lattice_constant, 4.086);
        assert_eq!(table.get("xx").unwrap().packing, Packing::Bcc);
        assert_eq!(table.get("au").unwrap().lattice_constant, 4.09);
    }

    #[test]
    fn load_overrides_rejects_non_positive_parameters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("species.toml");
        std::fs::write(
            &path,
            "[ag]\nlattice-constant = 0.0\nnearest-neighbor = 2.9\npacking = \"fcc\"\n",
        )
        .unwrap();

        let result = SpeciesTable::load_overrides(&path);
        assert!(matches!(
            result,
            Err(SpeciesLoadError::InvalidParams { .. })
        ));
    }

    #[test]
    fn load_overrides_reports_missing_file() {
        let result = SpeciesTable::load_overrides(Path::new("/nonexistent/species.toml"));
        assert!(matches!(result, Err(SpeciesLoadError::Io { .. })));
    }

    #[test]
    fn display_symbol_capitalizes_first_letter() {
        assert_eq!(display_symbol("au"), "Au");
        assert_eq!(display_symbol("W"), "W");
        assert_eq!(display_symbol("CU"), "Cu");
        assert_eq!(display_symbol(""), "");
    }
}
