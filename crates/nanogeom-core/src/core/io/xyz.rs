use crate::core::io::traits::StructureFile;
use crate::core::models::cloud::PointCloud;
use crate::core::species::display_symbol;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

pub const DEFAULT_COMMENT: &str = "Generated with nanogeom";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XyzMetadata {
    pub comment: String,
}

impl Default for XyzMetadata {
    fn default() -> Self {
        Self {
            comment: DEFAULT_COMMENT.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Header declares {declared} atoms but {found} atom records were found")]
    CountMismatch { declared: usize, found: usize },
    #[error("Missing required record: {0}")]
    MissingRecord(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count '{0}'")]
    InvalidCount(String),
    #[error("Atom count must be greater than zero")]
    ZeroAtoms,
    #[error("Invalid coordinate '{value}' in column {column}")]
    InvalidFloat { column: usize, value: String },
    #[error("Atom record needs a species and three coordinates")]
    MissingField,
}

pub struct XyzFile;

impl XyzFile {
    fn parse_atom(line: &str, line_num: usize) -> Result<(String, Point3<f64>), XyzError> {
        let mut fields = line.split_whitespace();
        let species = fields.next().ok_or(XyzError::Parse {
            line: line_num,
            kind: XyzParseErrorKind::MissingField,
        })?;

        let mut coords = [0.0; 3];
        for (column, slot) in coords.iter_mut().enumerate() {
            let raw = fields.next().ok_or(XyzError::Parse {
                line: line_num,
                kind: XyzParseErrorKind::MissingField,
            })?;
            *slot = raw.parse().map_err(|_| XyzError::Parse {
                line: line_num,
                kind: XyzParseErrorKind::InvalidFloat {
                    column: column + 2,
                    value: raw.to_string(),
                },
            })?;
        }

        Ok((species.to_lowercase(), Point3::from(coords)))
    }
}

/// Upper bound on storage reserved from the header count, which is untrusted.
const MAX_PREALLOCATED_ATOMS: usize = 4096;

impl StructureFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<(PointCloud, Self::Metadata), Self::Error> {
        let mut lines = reader.lines().enumerate();

        let (_, count_line) = lines.next().ok_or(XyzError::MissingRecord("atom count"))?;
        let count_line = count_line?;
        let declared: usize = count_line.trim().parse().map_err(|_| XyzError::Parse {
            line: 1,
            kind: XyzParseErrorKind::InvalidCount(count_line.trim().to_string()),
        })?;
        if declared == 0 {
            return Err(XyzError::Parse {
                line: 1,
                kind: XyzParseErrorKind::ZeroAtoms,
            });
        }

        let (_, comment) = lines.next().ok_or(XyzError::MissingRecord("comment line"))?;
        let metadata = XyzMetadata {
            comment: comment?.trim_end().to_string(),
        };

        let capacity = declared.min(MAX_PREALLOCATED_ATOMS);
        let mut species = Vec::with_capacity(capacity);
        let mut positions = Vec::with_capacity(capacity);
        for (idx, line_res) in lines {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }
            let (s, p) = Self::parse_atom(&line, idx + 1)?;
            species.push(s);
            positions.push(p);
        }

        if positions.len() != declared {
            return Err(XyzError::CountMismatch {
                declared,
                found: positions.len(),
            });
        }

        let cloud = PointCloud::new(species, positions)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok((cloud, metadata))
    }

    fn write_to(
        cloud: &PointCloud,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", cloud.len())?;
        writeln!(writer, "{}", metadata.comment.replace('\n', " "))?;
        for (species, p) in cloud.atoms() {
            writeln!(
                writer,
                "{:<2} {:>20.8} {:>20.8} {:>20.8}",
                display_symbol(species),
                p.x,
                p.y,
                p.z
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn read(content: &str) -> Result<(PointCloud, XyzMetadata), XyzError> {
        XyzFile::read_from(&mut Cursor::new(content))
    }

    #[test]
    fn reads_valid_file_with_case_insensitive_species() {
        let (cloud, meta) = read("2\nsome comment\nAU 0.0 1.0 2.0\nag -1.5 0 3e-1\n").unwrap();
        assert_eq!(meta.comment, "some comment");
        assert_eq!(cloud.species(), &["au", "ag"]);
        assert_eq!(cloud.positions()[1], Point3::new(-1.5, 0.0, 0.3));
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let (cloud, _) = read("1\n\nCu 0 0 0\n\n\n").unwrap();
        assert_eq!(cloud.len(), 1);
    }

    #[test]
    fn zero_count_is_rejected() {
        let err = read("0\ncomment\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                line: 1,
                kind: XyzParseErrorKind::ZeroAtoms
            }
        ));
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        let err = read("many\ncomment\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::InvalidCount(_),
                ..
            }
        ));
    }

    #[test]
    fn extra_atom_records_are_rejected() {
        let err = read("1\nc\nAu 0 0 0\nAu 1 1 1\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::CountMismatch {
                declared: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn missing_atom_records_are_rejected() {
        let err = read("3\nc\nAu 0 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::CountMismatch {
                declared: 3,
                found: 1
            }
        ));
    }

    #[test]
    fn huge_declared_count_is_a_mismatch_not_an_allocation() {
        let err = read("99999999999999999\ncomment\nAu 0 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::CountMismatch {
                declared: 99999999999999999,
                found: 1
            }
        ));
    }

    #[test]
    fn bad_coordinate_reports_line_and_column() {
        let err = read("1\nc\nAu 0 abc 0\n").unwrap_err();
        match err {
            XyzError::Parse { line, kind } => {
                assert_eq!(line, 3);
                assert_eq!(
                    kind,
                    XyzParseErrorKind::InvalidFloat {
                        column: 3,
                        value: "abc".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncated_atom_record_is_rejected() {
        let err = read("1\nc\nAu 0 0\n").unwrap_err();
        assert!(matches!(
            err,
            XyzError::Parse {
                kind: XyzParseErrorKind::MissingField,
                ..
            }
        ));
    }

    #[test]
    fn missing_comment_line_is_reported() {
        let err = read("1").unwrap_err();
        assert!(matches!(err, XyzError::MissingRecord("comment line")));
    }

    #[test]
    fn writes_capitalized_species_with_fixed_width_columns() {
        let cloud = PointCloud::uniform("au", vec![Point3::new(1.0, -2.5, 0.125)]);
        let mut out = Vec::new();
        XyzFile::write_to(&cloud, &XyzMetadata::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1");
        assert_eq!(lines[1], DEFAULT_COMMENT);
        assert_eq!(
            lines[2],
            format!("Au {:>20.8} {:>20.8} {:>20.8}", 1.0, -2.5, 0.125)
        );
    }

    #[test]
    fn path_helpers_preserve_structure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xyz");
        let cloud = PointCloud::new(
            vec!["pt".into(), "w".into()],
            vec![Point3::new(0.1, 0.2, 0.3), Point3::new(-4.0, 5.0, 6.0)],
        )
        .unwrap();
        let meta = XyzMetadata {
            comment: "pair".to_string(),
        };
        XyzFile::write_to_path(&cloud, &meta, &path).unwrap();
        let (loaded, loaded_meta) = XyzFile::read_from_path(&path).unwrap();
        assert_eq!(loaded_meta, meta);
        assert_eq!(loaded.species(), cloud.species());
        for (a, b) in loaded.positions().iter().zip(cloud.positions()) {
            assert!((a - b).norm() < 1e-8);
        }
    }
}
