//! Expression matrix files.
//!
//! Tab-separated. The first line is the header: a label for the gene column
//! followed by the sample names. Every other line is a gene id followed by
//! one value per sample. Blank lines and lines starting with `#` are ignored.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use morphyx_common::{ExpressionMatrix, GeneId, MorphyxError, Result};

pub(crate) fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub(crate) fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Prefix parse errors with the file they came from.
pub(crate) fn in_file(path: &Path, error: MorphyxError) -> MorphyxError {
    match error {
        MorphyxError::Parse(msg) => MorphyxError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    }
}

/// Parse a tab-separated expression matrix.
pub fn parse_expression_matrix<R: Read>(reader: R) -> Result<ExpressionMatrix> {
    let mut reader = tsv_reader(reader);
    let mut records = reader.records();

    let header = records
        .next()
        .ok_or_else(|| MorphyxError::Parse("expression matrix is empty".into()))??;
    if header.len() < 2 {
        return Err(MorphyxError::Parse(format!(
            "line {}: expression matrix header needs a gene column and at least one sample",
            line_of(&header)
        )));
    }
    let samples: Vec<String> = header.iter().skip(1).map(str::to_string).collect();

    let mut genes: Vec<GeneId> = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut seen: HashSet<GeneId> = HashSet::new();

    for result in records {
        let record = result?;
        let line = line_of(&record);
        if record.len() != header.len() {
            return Err(MorphyxError::Parse(format!(
                "line {line}: expected {} columns, got {}",
                header.len(),
                record.len()
            )));
        }

        let gene = record.get(0).unwrap_or_default().to_string();
        if !seen.insert(gene.clone()) {
            return Err(MorphyxError::Parse(format!("line {line}: duplicate gene '{gene}'")));
        }

        let values = record
            .iter()
            .skip(1)
            .map(|cell| {
                cell.parse::<f64>().map_err(|_| {
                    MorphyxError::Parse(format!("line {line}: '{cell}' is not a number"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        genes.push(gene);
        rows.push(values);
    }

    debug!("Parsed expression matrix: {} genes x {} samples", genes.len(), samples.len());
    ExpressionMatrix::new(genes, samples, rows)
}

/// Read an expression matrix file.
pub fn load_expression_matrix(path: &Path) -> Result<ExpressionMatrix> {
    info!("Loading expression matrix {:?}", path);
    let file = std::fs::File::open(path)?;
    parse_expression_matrix(std::io::BufReader::new(file)).map_err(|e| in_file(path, e))
}
