//! Label list loading
//!
//! Label files are whitespace-separated integers: the first value declares
//! the item count, followed by exactly that many class labels, one per
//! item in matrix index order.
//!
//! Example:
//! 4
//! 0 0 1 1

use crate::core::{ExperimentError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Load the label list from a file
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let file = File::open(path).map_err(ExperimentError::IoError)?;
    labels_from_reader(BufReader::new(file))
}

/// Load the label list from a reader (for testing and flexibility)
pub fn labels_from_reader<R: Read>(mut reader: R) -> Result<Vec<usize>> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(ExperimentError::IoError)?;

    let mut tokens = content.split_whitespace();

    let declared = match tokens.next() {
        Some(token) => token.parse::<usize>().map_err(|_| {
            ExperimentError::ParseError(format!("invalid label count: {token}"))
        })?,
        None => {
            return Err(ExperimentError::CorruptInput(
                "label file is empty".to_string(),
            ))
        }
    };

    let mut labels = Vec::with_capacity(declared);
    for token in tokens {
        if labels.len() == declared {
            return Err(ExperimentError::CorruptInput(format!(
                "label file declares {declared} items but holds more"
            )));
        }
        let label = token
            .parse::<usize>()
            .map_err(|_| ExperimentError::ParseError(format!("invalid label: {token}")))?;
        labels.push(label);
    }

    if labels.len() != declared {
        return Err(ExperimentError::CorruptInput(format!(
            "label file declares {declared} items but holds {}",
            labels.len()
        )));
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_labels_basic() {
        let labels = labels_from_reader(Cursor::new("4\n0 0 1 1\n")).unwrap();
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_labels_any_whitespace() {
        let labels = labels_from_reader(Cursor::new("3 2\n1\t0")).unwrap();
        assert_eq!(labels, vec![2, 1, 0]);
    }

    #[test]
    fn test_labels_empty_file() {
        let result = labels_from_reader(Cursor::new(""));
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_labels_too_few() {
        let result = labels_from_reader(Cursor::new("4\n0 0 1\n"));
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_labels_too_many() {
        let result = labels_from_reader(Cursor::new("2\n0 0 1\n"));
        assert!(matches!(result, Err(ExperimentError::CorruptInput(_))));
    }

    #[test]
    fn test_labels_negative_rejected() {
        let result = labels_from_reader(Cursor::new("2\n0 -1\n"));
        assert!(matches!(result, Err(ExperimentError::ParseError(_))));
    }

    #[test]
    fn test_labels_non_integer_rejected() {
        let result = labels_from_reader(Cursor::new("2\n0 cat\n"));
        assert!(matches!(result, Err(ExperimentError::ParseError(_))));
    }

    #[test]
    fn test_read_labels_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "3").expect("Failed to write");
        writeln!(temp_file, "1 0 2").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        let labels = read_labels(temp_file.path()).unwrap();
        assert_eq!(labels, vec![1, 0, 2]);
    }

    #[test]
    fn test_read_labels_io_error() {
        let result = read_labels("/non/existent/labels.txt");
        assert!(matches!(result, Err(ExperimentError::IoError(_))));
    }
}
