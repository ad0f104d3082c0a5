//! CSV export of the density and potential on the radial grid

use crate::error::{AvAtomError, Result};
use crate::scf_impl::{Density, Potential};
use nalgebra::DVector;
use std::fs;
use std::path::{Path, PathBuf};

pub const DENSITY_FILE: &str = "density.csv";
pub const POTENTIAL_FILE: &str = "potential.csv";

fn write_columns(path: &Path, headers: &[&str], columns: &[Vec<f64>]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(headers)?;

    let rows = columns.first().map_or(0, Vec::len);
    for i in 0..rows {
        wtr.write_record(columns.iter().map(|c| format!("{:.6e}", c[i])))?;
    }

    wtr.flush().map_err(|source| AvAtomError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn column(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values.into_iter().collect()
}

/// Write `r, n_b, n_ub` (or the up/down pairs when spin polarized).
pub fn density_to_csv(dir: &Path, r: &DVector<f64>, density: &Density) -> Result<PathBuf> {
    let path = dir.join(DENSITY_FILE);
    let mut columns = vec![column(r.iter().copied())];
    let headers: &[&str] = if density.bound.nrows() == 2 {
        &["r", "n^up_b", "n^up_ub", "n^dw_b", "n^dw_ub"]
    } else {
        &["r", "n_b", "n_ub"]
    };
    for s in 0..density.bound.nrows() {
        columns.push(column(density.bound.row(s).iter().copied()));
        columns.push(column(density.unbound.row(s).iter().copied()));
    }
    write_columns(&path, headers, &columns)?;
    Ok(path)
}

/// Write `r, v_en, v_ha, v_xc` (or both xc channels when spin polarized).
pub fn potential_to_csv(dir: &Path, r: &DVector<f64>, potential: &Potential) -> Result<PathBuf> {
    let path = dir.join(POTENTIAL_FILE);
    let headers: &[&str] = if potential.v_xc.nrows() == 2 {
        &["r", "v_en", "v_ha", "v^up_xc", "v^dw_xc"]
    } else {
        &["r", "v_en", "v_ha", "v_xc"]
    };
    let mut columns = vec![
        column(r.iter().copied()),
        column(potential.v_en.iter().copied()),
        column(potential.v_ha.iter().copied()),
    ];
    for s in 0..potential.v_xc.nrows() {
        columns.push(column(potential.v_xc.row(s).iter().copied()));
    }
    write_columns(&path, headers, &columns)?;
    Ok(path)
}

/// Write both tables into `dir`, creating it if needed.
pub fn write_fields(
    dir: &Path,
    r: &DVector<f64>,
    density: &Density,
    potential: &Potential,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| AvAtomError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(vec![
        density_to_csv(dir, r, density)?,
        potential_to_csv(dir, r, potential)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("avatom-csv-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_unpolarized_tables() {
        let dir = scratch_dir("unpolarized");
        let r = DVector::from_vec(vec![0.5, 1.0, 2.0]);
        let density = Density {
            bound: DMatrix::from_row_slice(1, 3, &[1.0, 0.5, 0.25]),
            unbound: DMatrix::from_element(1, 3, 0.01),
        };
        let potential = Potential {
            v_en: r.map(|r| -1.0 / r),
            v_ha: DVector::from_element(3, 0.3),
            v_xc: DMatrix::from_element(1, 3, -0.2),
        };

        let paths = write_fields(&dir, &r, &density, &potential).unwrap();
        assert_eq!(paths.len(), 2);

        let mut reader = csv::Reader::from_path(dir.join(DENSITY_FILE)).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["r", "n_b", "n_ub"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1].parse::<f64>().unwrap(), 0.5);

        let mut reader = csv::Reader::from_path(dir.join(POTENTIAL_FILE)).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 4);
        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(first[1].parse::<f64>().unwrap(), -2.0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_polarized_tables_keep_both_channels() {
        let dir = scratch_dir("polarized");
        let r = DVector::from_vec(vec![1.0, 2.0]);
        let potential = Potential {
            v_en: DVector::from_element(2, -1.0),
            v_ha: DVector::zeros(2),
            v_xc: DMatrix::from_row_slice(2, 2, &[-0.3, -0.2, -0.1, -0.05]),
        };
        potential_to_csv(&dir, &r, &potential).unwrap();

        let mut reader = csv::Reader::from_path(dir.join(POTENTIAL_FILE)).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            vec!["r", "v_en", "v_ha", "v^up_xc", "v^dw_xc"]
        );
        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(first[3].parse::<f64>().unwrap(), -0.3);
        assert_eq!(first[4].parse::<f64>().unwrap(), -0.1);

        fs::remove_dir_all(&dir).ok();
    }
}
