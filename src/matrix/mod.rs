//! Precomputed kernel matrix storage and submatrix extraction
//!
//! Supports loading a symmetric N x N similarity matrix from a text file:
//! the first line holds N, followed by N lines of N whitespace-separated
//! values.
//!
//! Example for N = 3:
//! 3
//! 1.0 0.5 0.2
//! 0.5 1.0 0.4
//! 0.2 0.4 1.0

use crate::core::{ExperimentError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Largest |K(i,j) - K(j,i)| tolerated by the load-time symmetry check
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Symmetric matrix of pairwise kernel values for the whole corpus.
///
/// Stored row-major as a flat vector; immutable after load. Symmetry is
/// verified once at construction, not on every access.
#[derive(Debug, Clone)]
pub struct KernelMatrix {
    values: Vec<f64>,
    size: usize,
}

impl KernelMatrix {
    /// Load a kernel matrix from a text file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(ExperimentError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a kernel matrix from a reader (for testing and flexibility)
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let declared = loop {
            match lines.next() {
                Some(line) => {
                    let line = line.map_err(ExperimentError::IoError)?;
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    break line.parse::<usize>().map_err(|_| {
                        ExperimentError::ParseError(format!("invalid item count: {line}"))
                    })?;
                }
                None => {
                    return Err(ExperimentError::CorruptInput(
                        "kernel matrix file is empty".to_string(),
                    ))
                }
            }
        };

        let mut values = Vec::with_capacity(declared * declared);
        let mut rows_read = 0;

        for (line_num, line) in lines.enumerate() {
            let line = line.map_err(ExperimentError::IoError)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut row_len = 0;
            for token in line.split_whitespace() {
                let value = token.parse::<f64>().map_err(|_| {
                    ExperimentError::ParseError(format!(
                        "invalid kernel value on line {}: {}",
                        line_num + 2,
                        token
                    ))
                })?;
                values.push(value);
                row_len += 1;
            }

            if row_len != declared {
                return Err(ExperimentError::CorruptInput(format!(
                    "row {rows_read} has {row_len} values, expected {declared}"
                )));
            }
            rows_read += 1;
        }

        if rows_read != declared {
            return Err(ExperimentError::CorruptInput(format!(
                "declared {declared} items but found {rows_read} rows"
            )));
        }

        let matrix = Self {
            values,
            size: declared,
        };
        matrix.check_symmetry()?;
        Ok(matrix)
    }

    /// Build a kernel matrix from in-memory rows, with the same
    /// squareness and symmetry validation as the file loader
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(ExperimentError::CorruptInput(format!(
                    "row {i} has {} values, expected {size}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }

        let matrix = Self { values, size };
        matrix.check_symmetry()?;
        Ok(matrix)
    }

    fn check_symmetry(&self) -> Result<()> {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                let upper = self.values[i * self.size + j];
                let lower = self.values[j * self.size + i];
                if (upper - lower).abs() > SYMMETRY_TOLERANCE {
                    return Err(ExperimentError::CorruptInput(format!(
                        "asymmetric entry at ({i}, {j}): {upper} vs {lower}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Number of items in the corpus
    pub fn size(&self) -> usize {
        self.size
    }

    /// Kernel value K(i, j)
    ///
    /// # Panics
    /// Panics if i or j is out of [0, size()); bounds are debug-asserted.
    pub fn value_at(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.size, "row index {i} out of bounds {}", self.size);
        debug_assert!(j < self.size, "col index {j} out of bounds {}", self.size);
        self.values[i * self.size + j]
    }

    /// Extract the dense block with entry (a, b) = K(rows[a], cols[b]).
    ///
    /// The caller's ordering is preserved exactly; indices may repeat.
    pub fn submatrix(&self, rows: &[usize], cols: &[usize]) -> GramBlock {
        let mut values = Vec::with_capacity(rows.len() * cols.len());
        for &i in rows {
            let offset = i * self.size;
            for &j in cols {
                debug_assert!(i < self.size && j < self.size);
                values.push(self.values[offset + j]);
            }
        }
        GramBlock {
            values,
            num_rows: rows.len(),
            num_cols: cols.len(),
        }
    }
}

/// Dense rectangular block of kernel values extracted from a [`KernelMatrix`]
#[derive(Debug, Clone)]
pub struct GramBlock {
    values: Vec<f64>,
    num_rows: usize,
    num_cols: usize,
}

impl GramBlock {
    /// Entry at block position (row, col)
    pub fn at(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.num_rows && col < self.num_cols);
        self.values[row * self.num_cols + col]
    }

    /// One full row of the block
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.num_cols;
        &self.values[start..start + self.num_cols]
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_matrix() -> KernelMatrix {
        KernelMatrix::from_rows(vec![
            vec![1.0, 0.5, 0.2, 0.1],
            vec![0.5, 1.0, 0.4, 0.3],
            vec![0.2, 0.4, 1.0, 0.6],
            vec![0.1, 0.3, 0.6, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_reader_basic() {
        let data = "3\n1.0 0.5 0.2\n0.5 1.0 0.4\n0.2 0.4 1.0\n";
        let matrix = KernelMatrix::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(matrix.size(), 3);
        assert_eq!(matrix.value_at(0, 0), 1.0);
        assert_eq!(matrix.value_at(2, 1), 0.4);
    }

    #[test]
    fn test_from_reader_comments_and_blank_lines() {
        let data = "# pairwise scores\n2\n\n1.0 0.5\n# second row\n0.5 1.0\n";
        let matrix = KernelMatrix::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(matrix.size(), 2);
    }

    #[test]
    fn test_from_reader_empty_file() {
        let result = KernelMatrix::from_reader(Cursor::new(""));
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_from_reader_missing_rows() {
        let data = "3\n1.0 0.5 0.2\n0.5 1.0 0.4\n";
        let result = KernelMatrix::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_from_reader_jagged_row() {
        let data = "3\n1.0 0.5 0.2\n0.5 1.0\n0.2 0.4 1.0\n";
        let result = KernelMatrix::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_from_reader_extra_rows() {
        let data = "2\n1.0 0.5\n0.5 1.0\n0.5 1.0\n";
        let result = KernelMatrix::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_from_reader_bad_value() {
        let data = "2\n1.0 abc\n0.5 1.0\n";
        let result = KernelMatrix::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(ExperimentError::ParseError(_))));
    }

    #[test]
    fn test_from_reader_bad_count() {
        let data = "two\n1.0 0.5\n0.5 1.0\n";
        let result = KernelMatrix::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(ExperimentError::ParseError(_))));
    }

    #[test]
    fn test_asymmetric_matrix_rejected() {
        let result = KernelMatrix::from_rows(vec![
            vec![1.0, 0.5, 0.2],
            vec![0.5, 1.0, 0.4],
            vec![0.2, 0.9, 1.0],
        ]);
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_from_rows_non_square() {
        let result = KernelMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5]]);
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_symmetry_holds_post_load() {
        let matrix = sample_matrix();
        for i in 0..matrix.size() {
            for j in 0..matrix.size() {
                assert_eq!(matrix.value_at(i, j), matrix.value_at(j, i));
            }
        }
    }

    #[test]
    fn test_submatrix_matches_value_at() {
        let matrix = sample_matrix();
        let rows = vec![2, 0, 3];
        let cols = vec![1, 1, 0, 2];

        let block = matrix.submatrix(&rows, &cols);
        assert_eq!(block.num_rows(), 3);
        assert_eq!(block.num_cols(), 4);

        for (a, &i) in rows.iter().enumerate() {
            for (b, &j) in cols.iter().enumerate() {
                assert_eq!(block.at(a, b), matrix.value_at(i, j));
            }
        }
    }

    #[test]
    fn test_submatrix_preserves_duplicate_ordering() {
        let matrix = sample_matrix();
        let block = matrix.submatrix(&[1, 1], &[3]);

        assert_eq!(block.at(0, 0), matrix.value_at(1, 3));
        assert_eq!(block.at(1, 0), matrix.value_at(1, 3));
    }

    #[test]
    fn test_submatrix_single_row() {
        let matrix = sample_matrix();
        let block = matrix.submatrix(&[2], &[0, 1, 3]);

        assert_eq!(block.num_rows(), 1);
        assert_eq!(block.row(0), &[0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "2").expect("Failed to write");
        writeln!(temp_file, "1.0 0.5").expect("Failed to write");
        writeln!(temp_file, "0.5 1.0").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        let matrix = KernelMatrix::from_file(temp_file.path()).unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.value_at(0, 1), 0.5);
    }

    #[test]
    fn test_from_file_io_error() {
        let result = KernelMatrix::from_file("/non/existent/file.kern");
        assert!(matches!(result, Err(ExperimentError::IoError(_))));
    }
}
