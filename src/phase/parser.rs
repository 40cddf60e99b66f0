/*
MIT License with FEFF10 Attribution

Copyright (c) 2025 Ameyanagi

Based on or developed using Distribution: FEFF10.0
Copyright (c) 2020 FEFF Project, University of Washington and SLAC National Accelerator Laboratory.
All rights reserved.
*/

//! Reader for phase shift files
//!
//! Layout:
//!
//! ```text
//! # optional comment lines
//! <n_energies> <l_max> [eV|Ry|H]
//! <energy>
//! <δ_0> <δ_1> ... <δ_lmax>      (may continue over several lines)
//! ...
//! ```
//!
//! Phase-shift lines written with fixed Fortran formats often have no blank
//! between a number and a following negative number (`0.12-0.34`); the
//! tokenizer splits those apart.
//!
//! The header must announce at least one energy, and the energies must be
//! strictly ascending. A file listing them out of order is rejected as
//! malformed rather than sorted.

use super::errors::{PhaseError, Result};
use crate::utils::constants::{EV_TO_HARTREE, RYDBERG_TO_HARTREE};
use log::{debug, warn};
use std::io::BufRead;
use std::path::Path;

/// Raw contents of a phase shift file, energies already in Hartree
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseShiftTable {
    pub l_max: usize,
    pub energies: Vec<f64>,
    pub shifts: Vec<Vec<f64>>,
}

/// Scale factor from the header unit to Hartree
fn energy_scale(unit: Option<&str>) -> f64 {
    let prefix = unit.and_then(|u| u.get(..2)).map(|p| p.to_ascii_lowercase());
    match prefix.as_deref() {
        Some("ev") => EV_TO_HARTREE,
        Some("ry") => RYDBERG_TO_HARTREE,
        _ => 1.0,
    }
}

/// Split a line into numeric tokens, separating numbers glued by a minus sign
///
/// A `-` starts a new token unless it opens the current token or follows an
/// exponent marker. Fortran `D` exponents are rewritten as `E`.
pub fn tokenize_legacy(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in line.split_whitespace() {
        let mut current = String::new();
        for ch in word.chars() {
            let after_exponent = matches!(current.chars().last(), Some('e' | 'E' | 'd' | 'D'));
            if ch == '-' && !current.is_empty() && !after_exponent {
                tokens.push(std::mem::take(&mut current));
            }
            current.push(match ch {
                'd' | 'D' => 'E',
                other => other,
            });
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }
    tokens
}

/// Iterator over significant lines with their 1-based line numbers
struct DataLines<R> {
    reader: R,
    line_no: usize,
    path: std::path::PathBuf,
}

impl<R: BufRead> DataLines<R> {
    fn next_line(&mut self) -> Result<Option<(usize, String)>> {
        loop {
            let mut buffer = String::new();
            let read = self
                .reader
                .read_line(&mut buffer)
                .map_err(|source| PhaseError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = buffer.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some((self.line_no, trimmed.to_string())));
        }
    }
}

fn parse_number(token: &str, path: &Path, line: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|_| PhaseError::MalformedLine {
        path: path.to_path_buf(),
        line,
        message: format!("cannot parse '{}' as a number", token),
    })
}

/// Parse a phase shift file
///
/// # Arguments
///
/// * `reader` - Buffered source of the file contents
/// * `path` - Path used in diagnostics
///
/// # Returns
///
/// The table of energies (Hartree) and phase shifts (radians). A file that
/// ends early is truncated with a warning when at least two energies were
/// read.
pub fn parse_phase_shifts<R: BufRead>(reader: R, path: &Path) -> Result<PhaseShiftTable> {
    let mut lines = DataLines {
        reader,
        line_no: 0,
        path: path.to_path_buf(),
    };

    let (header_line, header) = lines.next_line()?.ok_or_else(|| PhaseError::UnexpectedEndOfFile {
        path: path.to_path_buf(),
        expected: "header line".to_string(),
        found: "empty file".to_string(),
    })?;

    let fields: Vec<&str> = header.split_whitespace().collect();
    let malformed = || PhaseError::MalformedHeader {
        path: path.to_path_buf(),
        line: header_line,
        content: header.clone(),
    };
    if fields.len() < 2 {
        return Err(malformed());
    }
    let n_energies: usize = fields[0].parse().map_err(|_| malformed())?;
    if n_energies == 0 {
        return Err(malformed());
    }
    let l_max: usize = fields[1].parse().map_err(|_| malformed())?;
    let scale = energy_scale(fields.get(2).copied());
    let n_l = l_max + 1;

    let mut energies = Vec::with_capacity(n_energies);
    let mut shifts = Vec::with_capacity(n_energies);

    'energies: while energies.len() < n_energies {
        let Some((line_no, energy_line)) = lines.next_line()? else {
            break;
        };
        let first = energy_line.split_whitespace().next().unwrap_or_default();
        let energy = parse_number(&first.replace(['d', 'D'], "E"), path, line_no)? * scale;

        let mut deltas = Vec::with_capacity(n_l);
        while deltas.len() < n_l {
            let Some((line_no, data)) = lines.next_line()? else {
                break 'energies;
            };
            for token in tokenize_legacy(&data) {
                if deltas.len() == n_l {
                    break;
                }
                deltas.push(parse_number(&token, path, line_no)?);
            }
        }

        if let Some(&last) = energies.last() {
            if energy <= last {
                return Err(PhaseError::MalformedLine {
                    path: path.to_path_buf(),
                    line: line_no,
                    message: format!(
                        "energies must increase, {} follows {}",
                        energy, last
                    ),
                });
            }
        }
        energies.push(energy);
        shifts.push(deltas);
    }

    if energies.len() < n_energies {
        if energies.len() < 2 {
            return Err(PhaseError::UnexpectedEndOfFile {
                path: path.to_path_buf(),
                expected: format!("{} energies", n_energies),
                found: format!("{} energies", energies.len()),
            });
        }
        warn!(
            "end of file {} after {} of {} energies; using the energies read",
            path.display(),
            energies.len(),
            n_energies
        );
    }

    debug!(
        "read {} energies with l_max = {} from {}",
        energies.len(),
        l_max,
        path.display()
    );
    Ok(PhaseShiftTable {
        l_max,
        energies,
        shifts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<PhaseShiftTable> {
        parse_phase_shifts(Cursor::new(text), Path::new("test.phs"))
    }

    #[test]
    fn test_tokenizer_splits_glued_negatives() {
        assert_eq!(tokenize_legacy("0.12-0.34 -1.5"), vec!["0.12", "-0.34", "-1.5"]);
        assert_eq!(tokenize_legacy("1.0e-3-2.0D-01"), vec!["1.0e-3", "-2.0E-01"]);
        assert!(tokenize_legacy("   ").is_empty());
    }

    #[test]
    fn test_parse_with_units_and_comments() {
        let table = parse(
            "# Cu phase shifts\n\n2 1 eV\n27.2114\n0.5 -0.25\n54.4228\n0.4-0.2\n",
        )
        .unwrap();
        assert_eq!(table.l_max, 1);
        assert_relative_eq!(table.energies[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(table.energies[1], 2.0, epsilon = 1e-12);
        assert_eq!(table.shifts[1], vec![0.4, -0.2]);
    }

    #[test]
    fn test_rydberg_and_continuation_lines() {
        let table = parse("2 3 Ry\n1.0\n0.1 0.2\n0.3 0.4\n2.0\n0.1 0.2 0.3 0.4\n").unwrap();
        assert_relative_eq!(table.energies[0], 0.5, epsilon = 1e-12);
        assert_eq!(table.shifts[0], vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(table.shifts.len(), 2);
    }

    #[test]
    fn test_truncated_file() {
        let table = parse("5 0\n1.0\n0.1\n2.0\n0.2\n3.0\n").unwrap();
        assert_eq!(table.energies.len(), 2);

        assert!(matches!(
            parse("5 0\n1.0\n0.1\n"),
            Err(PhaseError::UnexpectedEndOfFile { .. })
        ));
        assert!(matches!(
            parse("# only a comment\n"),
            Err(PhaseError::UnexpectedEndOfFile { .. })
        ));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            parse("abc 3\n"),
            Err(PhaseError::MalformedHeader { line: 1, .. })
        ));
        assert!(matches!(parse("12\n"), Err(PhaseError::MalformedHeader { .. })));
    }

    #[test]
    fn test_header_without_energies_rejected() {
        assert!(matches!(
            parse("0 3\n"),
            Err(PhaseError::MalformedHeader { line: 1, .. })
        ));
        assert!(matches!(
            parse("# empty table\n0 3 eV\n1.0\n0.1 0.2 0.3 0.4\n"),
            Err(PhaseError::MalformedHeader { line: 2, .. })
        ));
    }

    #[test]
    fn test_single_energy_table() {
        let table = parse("1 1\n2.5\n0.3 -0.1\n").unwrap();
        assert_eq!(table.energies, vec![2.5]);
        assert_eq!(table.shifts, vec![vec![0.3, -0.1]]);
    }

    #[test]
    fn test_descending_energies_rejected() {
        assert!(matches!(
            parse("2 0\n2.0\n0.1\n1.0\n0.2\n"),
            Err(PhaseError::MalformedLine { .. })
        ));
    }
}
