//! CSV question export.
//!
//! Output is UTF-8 with a leading byte-order mark so spreadsheet tools pick
//! the right encoding, comma-delimited, `\n`-terminated, and quoted only where
//! a field needs it. Column names match the English synonyms accepted by
//! [`crate::import`], so an export can be re-imported unchanged.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::types::{Discipline, Question};

const BOM: &str = "\u{feff}";

/// Errors that can occur while producing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there are no questions to export")]
    NoQuestions,

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A rendered CSV file ready to be served or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub filename: String,
    pub content: String,
}

#[derive(Serialize)]
struct DisciplineRow<'a> {
    number: &'a str,
    question: &'a str,
    answer: &'a str,
    comment: &'a str,
}

#[derive(Serialize)]
struct GlobalRow<'a> {
    discipline_name: &'a str,
    number: &'a str,
    question: &'a str,
    answer: &'a str,
    comment: &'a str,
}

impl<'a> From<&'a Question> for DisciplineRow<'a> {
    fn from(q: &'a Question) -> Self {
        Self {
            number: &q.number,
            question: &q.question,
            answer: &q.answer,
            comment: &q.comment,
        }
    }
}

/// Export one discipline's questions.
///
/// # Errors
///
/// [`ExportError::NoQuestions`] when the discipline is empty.
pub fn export_discipline(discipline: &Discipline) -> Result<CsvFile, ExportError> {
    if discipline.questions.is_empty() {
        return Err(ExportError::NoQuestions);
    }

    let content = write_rows(discipline.questions.iter().map(DisciplineRow::from))?;
    Ok(CsvFile {
        filename: discipline_filename(&discipline.name),
        content,
    })
}

/// Export every question of every discipline, prefixed with the discipline name.
///
/// # Errors
///
/// [`ExportError::NoQuestions`] when no discipline has questions.
pub fn export_all(disciplines: &[Discipline], date: NaiveDate) -> Result<CsvFile, ExportError> {
    let rows: Vec<GlobalRow<'_>> = disciplines
        .iter()
        .flat_map(|d| {
            d.questions.iter().map(|q| GlobalRow {
                discipline_name: &d.name,
                number: &q.number,
                question: &q.question,
                answer: &q.answer,
                comment: &q.comment,
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(ExportError::NoQuestions);
    }

    Ok(CsvFile {
        filename: global_filename(date),
        content: write_rows(rows)?,
    })
}

/// Lowercase the name and replace everything outside `[a-z0-9]` with `_`.
#[must_use]
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[must_use]
pub fn discipline_filename(name: &str) -> String {
    format!("{}_questoes.csv", slug(name))
}

#[must_use]
pub fn global_filename(date: NaiveDate) -> String {
    format!("quiz_export_completo_{}.csv", date.format("%Y-%m-%d"))
}

fn write_rows<T, I>(rows: I) -> Result<String, ExportError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(BOM.as_bytes().to_vec());

    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8(bytes)?)
}
