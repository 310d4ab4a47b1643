//! CSV question import.
//!
//! Two flavours share one validation pipeline:
//!
//! - **global**: every row names its discipline; rows are routed to existing
//!   disciplines by case-insensitive name and **appended**.
//! - **single discipline**: rows carry no discipline column and **replace**
//!   the target discipline's whole question set.
//!
//! Validation runs in a fixed order and structural failures abort before any
//! row is looked at:
//!
//! 1. reader errors ([`ImportError::Parse`])
//! 2. no data rows or a single-column header ([`ImportError::Malformed`])
//! 3. required logical columns absent from the header ([`ImportError::MissingColumns`])
//! 4. per-row checks: a row with any blank required field is skipped and its
//!    source line reported (the header is line 1)
//!
//! Merges never mutate their input; they return a new discipline list for the
//! caller to store as a whole.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::types::{Discipline, DisciplineId, Question};

/// Logical columns understood by the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Discipline,
    Number,
    Question,
    Answer,
    Comment,
}

impl Field {
    /// Accepted header spellings after trimming and lowercasing, in priority order.
    #[must_use]
    pub const fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Discipline => &["discipline_name", "disciplina"],
            Self::Number => &["number", "numero", "nº", "número"],
            Self::Question => &["question", "pergunta", "questão"],
            Self::Answer => &["answer", "resposta"],
            Self::Comment => &["comment", "comentario", "comentário"],
        }
    }

    /// Name shown to admins when the column is missing.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Discipline => "disciplina",
            Self::Number => "numero",
            Self::Question => "pergunta",
            Self::Answer => "resposta",
            Self::Comment => "comentario",
        }
    }
}

const GLOBAL_FIELDS: &[Field] = &[
    Field::Discipline,
    Field::Number,
    Field::Question,
    Field::Answer,
    Field::Comment,
];

const DISCIPLINE_FIELDS: &[Field] = &[
    Field::Number,
    Field::Question,
    Field::Answer,
    Field::Comment,
];

/// Errors that abort an import without touching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("could not read the CSV file: {}", .0.join(", "))]
    Parse(Vec<String>),

    #[error("the CSV file is empty or malformed")]
    Malformed,

    #[error(
        "the file must contain all of these columns: {}; missing: {}",
        quoted(required),
        quoted(missing)
    )]
    MissingColumns {
        required: Vec<&'static str>,
        missing: Vec<&'static str>,
    },

    #[error("no valid question found; check that every required column is filled in")]
    NoValidRows { skipped_lines: Vec<usize> },

    #[error("no discipline in the file matches an existing discipline")]
    NoMatchingDiscipline {
        unmatched: Vec<String>,
        skipped_lines: Vec<usize>,
    },

    #[error("discipline {0} not found")]
    UnknownDiscipline(DisciplineId),
}

fn quoted(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated row from a global import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedQuestion {
    pub discipline: String,
    pub question: Question,
}

/// Rows that passed validation plus the source lines that did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRows<T> {
    pub rows: Vec<T>,
    pub skipped_lines: Vec<usize>,
}

/// Result of a global import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalImportSummary {
    /// Rows appended to matched disciplines.
    pub imported: usize,
    /// Distinct existing disciplines that received rows.
    pub matched_disciplines: usize,
    /// Discipline names in the file with no existing counterpart.
    pub unmatched: Vec<String>,
    pub skipped_lines: Vec<usize>,
}

/// Result of a single-discipline import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisciplineImportSummary {
    pub discipline_id: DisciplineId,
    pub discipline_name: String,
    pub imported: usize,
    pub skipped_lines: Vec<usize>,
}

/// Trim and case-fold a header cell.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Parse a global import payload.
///
/// # Errors
///
/// Returns the structural [`ImportError`]s described in the module docs.
pub fn parse_global(payload: &str) -> Result<ParsedRows<RoutedQuestion>, ImportError> {
    let table = parse_table(payload, GLOBAL_FIELDS)?;
    let rows = table
        .rows
        .into_iter()
        .map(|mut fields| RoutedQuestion {
            discipline: fields.take(Field::Discipline),
            question: fields.into_question(),
        })
        .collect();
    Ok(ParsedRows {
        rows,
        skipped_lines: table.skipped_lines,
    })
}

/// Parse a payload destined for one discipline.
///
/// # Errors
///
/// Returns the structural [`ImportError`]s described in the module docs.
pub fn parse_for_discipline(payload: &str) -> Result<ParsedRows<Question>, ImportError> {
    let table = parse_table(payload, DISCIPLINE_FIELDS)?;
    Ok(ParsedRows {
        rows: table
            .rows
            .into_iter()
            .map(RowFields::into_question)
            .collect(),
        skipped_lines: table.skipped_lines,
    })
}

/// Append routed rows to matching disciplines.
///
/// Discipline names are grouped and matched case-insensitively; names with no
/// existing discipline are skipped, never created.
///
/// # Errors
///
/// [`ImportError::NoValidRows`] when nothing passed validation and
/// [`ImportError::NoMatchingDiscipline`] when no group matched.
pub fn merge_global(
    disciplines: &[Discipline],
    parsed: ParsedRows<RoutedQuestion>,
) -> Result<(Vec<Discipline>, GlobalImportSummary), ImportError> {
    if parsed.rows.is_empty() {
        return Err(ImportError::NoValidRows {
            skipped_lines: parsed.skipped_lines,
        });
    }

    // Group by lowercased name, keeping first-seen order and spelling.
    let mut groups: Vec<(String, Vec<Question>)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    for row in parsed.rows {
        let key = row.discipline.to_lowercase();
        if let Some(&i) = group_index.get(&key) {
            if let Some((_, questions)) = groups.get_mut(i) {
                questions.push(row.question);
            }
        } else {
            group_index.insert(key, groups.len());
            groups.push((row.discipline, vec![row.question]));
        }
    }

    let mut updated = disciplines.to_vec();
    let mut imported = 0;
    let mut matched_disciplines = 0;
    let mut unmatched = Vec::new();

    for (name, questions) in groups {
        match updated.iter_mut().find(|d| d.has_name(&name)) {
            Some(discipline) => {
                imported += questions.len();
                matched_disciplines += 1;
                discipline.questions.extend(questions);
            }
            None => unmatched.push(name),
        }
    }

    if matched_disciplines == 0 {
        return Err(ImportError::NoMatchingDiscipline {
            unmatched,
            skipped_lines: parsed.skipped_lines,
        });
    }

    Ok((
        updated,
        GlobalImportSummary {
            imported,
            matched_disciplines,
            unmatched,
            skipped_lines: parsed.skipped_lines,
        },
    ))
}

/// Replace one discipline's questions with the parsed rows.
///
/// # Errors
///
/// [`ImportError::UnknownDiscipline`] when `id` is not in the list and
/// [`ImportError::NoValidRows`] when nothing passed validation.
pub fn replace_questions(
    disciplines: &[Discipline],
    id: &DisciplineId,
    parsed: ParsedRows<Question>,
) -> Result<(Vec<Discipline>, DisciplineImportSummary), ImportError> {
    let Some(target) = disciplines.iter().find(|d| &d.id == id) else {
        return Err(ImportError::UnknownDiscipline(id.clone()));
    };
    if parsed.rows.is_empty() {
        return Err(ImportError::NoValidRows {
            skipped_lines: parsed.skipped_lines,
        });
    }

    let summary = DisciplineImportSummary {
        discipline_id: id.clone(),
        discipline_name: target.name.clone(),
        imported: parsed.rows.len(),
        skipped_lines: parsed.skipped_lines,
    };

    let mut questions = Some(parsed.rows);
    let updated = disciplines
        .iter()
        .map(|d| {
            if &d.id == id {
                Discipline {
                    questions: questions.take().unwrap_or_default(),
                    ..d.clone()
                }
            } else {
                d.clone()
            }
        })
        .collect();

    Ok((updated, summary))
}

/// Parse and append in one step.
///
/// # Errors
///
/// See [`parse_global`] and [`merge_global`].
pub fn import_global(
    disciplines: &[Discipline],
    payload: &str,
) -> Result<(Vec<Discipline>, GlobalImportSummary), ImportError> {
    merge_global(disciplines, parse_global(payload)?)
}

/// Parse and replace in one step.
///
/// # Errors
///
/// See [`parse_for_discipline`] and [`replace_questions`].
pub fn import_into_discipline(
    disciplines: &[Discipline],
    id: &DisciplineId,
    payload: &str,
) -> Result<(Vec<Discipline>, DisciplineImportSummary), ImportError> {
    if !disciplines.iter().any(|d| &d.id == id) {
        return Err(ImportError::UnknownDiscipline(id.clone()));
    }
    replace_questions(disciplines, id, parse_for_discipline(payload)?)
}

// =============================================================================
// Table parsing
// =============================================================================

struct Table {
    rows: Vec<RowFields>,
    skipped_lines: Vec<usize>,
}

struct RowFields(HashMap<Field, String>);

impl RowFields {
    fn take(&mut self, field: Field) -> String {
        self.0.remove(&field).unwrap_or_default()
    }

    fn into_question(mut self) -> Question {
        Question {
            number: self.take(Field::Number),
            question: self.take(Field::Question),
            answer: self.take(Field::Answer),
            comment: self.take(Field::Comment),
        }
    }
}

fn parse_table(payload: &str, required: &[Field]) -> Result<Table, ImportError> {
    let payload = payload.strip_prefix('\u{feff}').unwrap_or(payload);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(payload.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::Parse(vec![e.to_string()]))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut records = Vec::new();
    let mut errors = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .and_then(|p| usize::try_from(p.line()).ok())
                    .unwrap_or(index + 2);
                records.push((line, record));
            }
            Err(e) => {
                let fatal = !matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. });
                errors.push(e.to_string());
                if fatal {
                    break;
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(ImportError::Parse(errors));
    }
    if records.is_empty() || headers.len() <= 1 {
        return Err(ImportError::Malformed);
    }

    let columns: HashMap<Field, usize> = required
        .iter()
        .filter_map(|&field| {
            field
                .synonyms()
                .iter()
                .find_map(|alias| headers.iter().position(|h| h == alias))
                .map(|column| (field, column))
        })
        .collect();

    let missing: Vec<&'static str> = required
        .iter()
        .filter(|field| !columns.contains_key(field))
        .map(|field| field.label())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            required: required.iter().map(|f| f.label()).collect(),
            missing,
        });
    }

    let mut rows = Vec::with_capacity(records.len());
    let mut skipped_lines = Vec::new();
    for (line, record) in records {
        let fields: HashMap<Field, String> = columns
            .iter()
            .map(|(&field, &column)| {
                let value = record.get(column).map(str::trim).unwrap_or_default();
                (field, value.to_owned())
            })
            .collect();

        if fields.values().any(String::is_empty) {
            skipped_lines.push(line);
        } else {
            rows.push(RowFields(fields));
        }
    }

    Ok(Table {
        rows,
        skipped_lines,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn with_questions(name: &str, count: usize) -> Discipline {
        let mut d = Discipline::new(name, "senha");
        d.questions = (1..=count)
            .map(|n| Question::new(n.to_string(), "q", "a", "c"))
            .collect();
        d
    }

    #[test]
    fn test_missing_comment_column_rejected() {
        let d = with_questions("POO", 2);
        let payload = "numero,pergunta,resposta\n1,O que é?,Isso\n";

        let err = import_into_discipline(&[d], &DisciplineId::new("x"), payload);
        assert!(matches!(err, Err(ImportError::UnknownDiscipline(_))));

        let disciplines = vec![with_questions("POO", 2)];
        let id = disciplines[0].id.clone();
        let err = import_into_discipline(&disciplines, &id, payload).unwrap_err();
        match err {
            ImportError::MissingColumns { missing, required } => {
                assert_eq!(missing, vec!["comentario"]);
                assert_eq!(required.len(), 4);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(disciplines[0].questions.len(), 2);
    }

    #[test]
    fn test_global_import_matches_case_insensitively() {
        let disciplines = vec![with_questions("matemática", 1), with_questions("Física", 0)];
        let payload = "disciplina,numero,pergunta,resposta,comentario\n\
                       Matemática,Q1,Quanto é 5*5?,25,Cálculo simples.\n";

        let (updated, summary) = import_global(&disciplines, payload).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.matched_disciplines, 1);
        assert!(summary.unmatched.is_empty());

        let math = &updated[0];
        assert_eq!(math.questions.len(), 2);
        assert_eq!(
            math.questions[1],
            Question::new("Q1", "Quanto é 5*5?", "25", "Cálculo simples.")
        );
        // input untouched
        assert_eq!(disciplines[0].questions.len(), 1);
    }

    #[test]
    fn test_global_import_skips_unknown_disciplines() {
        let disciplines = vec![with_questions("POO", 0)];
        let payload = "discipline_name,number,question,answer,comment\n\
                       poo,1,a,b,c\n\
                       Química,2,a,b,c\n\
                       POO,3,a,b,c\n";

        let (updated, summary) = import_global(&disciplines, payload).unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.matched_disciplines, 1);
        assert_eq!(summary.unmatched, vec!["Química".to_string()]);
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].questions.len(), 2);
    }

    #[test]
    fn test_global_import_without_match_fails() {
        let disciplines = vec![with_questions("POO", 0)];
        let payload = "disciplina,numero,pergunta,resposta,comentario\nArtes,1,a,b,c\n";

        let err = import_global(&disciplines, payload).unwrap_err();
        assert!(matches!(err, ImportError::NoMatchingDiscipline { .. }));
    }

    #[test]
    fn test_single_discipline_import_replaces() {
        let disciplines = vec![with_questions("POO", 10), with_questions("GP", 4)];
        let id = disciplines[0].id.clone();
        let payload = "Número,Pergunta,Resposta,Comentário\n\
                       1,a,b,c\n2,d,e,f\n3,g,h,i\n";

        let (updated, summary) = import_into_discipline(&disciplines, &id, payload).unwrap();
        assert_eq!(updated[0].questions.len(), 3);
        assert_eq!(updated[1].questions.len(), 4);
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.discipline_name, "POO");
    }

    #[test]
    fn test_blank_rows_reported_by_line() {
        let payload = "numero,pergunta,resposta,comentario\n\
                       1,a,b,c\n\
                       2,,b,c\n\
                       3,a,b,   \n\
                       4,a,b,c\n";

        let parsed = parse_for_discipline(payload).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.skipped_lines, vec![3, 4]);
    }

    #[test]
    fn test_all_rows_blank_is_no_valid_rows() {
        let disciplines = vec![with_questions("POO", 5)];
        let id = disciplines[0].id.clone();
        let payload = "numero,pergunta,resposta,comentario\n1,,b,c\n";

        let err = import_into_discipline(&disciplines, &id, payload).unwrap_err();
        assert_eq!(
            err,
            ImportError::NoValidRows {
                skipped_lines: vec![2]
            }
        );
    }

    #[test]
    fn test_headers_are_trimmed_and_folded() {
        let payload = "\u{feff}  NUMERO , Questão,ANSWER,comment\n1,q,a,c\n";
        let parsed = parse_for_discipline(payload).unwrap();
        assert_eq!(parsed.rows, vec![Question::new("1", "q", "a", "c")]);
    }

    #[test]
    fn test_quoted_fields_keep_commas_and_newlines() {
        let payload = "numero,pergunta,resposta,comentario\n\
                       1,\"Quanto é 1,5 + 1,5?\",3,\"Linha 1\nLinha 2\"\n";
        let parsed = parse_for_discipline(payload).unwrap();
        assert_eq!(parsed.rows[0].question, "Quanto é 1,5 + 1,5?");
        assert_eq!(parsed.rows[0].comment, "Linha 1\nLinha 2");
    }

    #[test]
    fn test_header_only_is_malformed() {
        let err = parse_for_discipline("numero,pergunta,resposta,comentario\n").unwrap_err();
        assert_eq!(err, ImportError::Malformed);
        assert_eq!(parse_for_discipline("").unwrap_err(), ImportError::Malformed);
    }

    #[test]
    fn test_single_column_is_malformed() {
        let err = parse_for_discipline("pergunta\nO que é?\n").unwrap_err();
        assert_eq!(err, ImportError::Malformed);
    }

    #[test]
    fn test_ragged_rows_are_parse_errors() {
        let payload = "numero,pergunta,resposta,comentario\n1,a,b\n2,a,b,c\n";
        let err = parse_for_discipline(payload).unwrap_err();
        assert!(matches!(err, ImportError::Parse(ref messages) if messages.len() == 1));
    }

    #[test]
    fn test_global_requires_discipline_column() {
        let payload = "numero,pergunta,resposta,comentario\n1,a,b,c\n";
        let err = parse_global(payload).unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingColumns { ref missing, .. } if missing == &vec!["disciplina"]
        ));
    }

    #[test]
    fn test_missing_columns_message_lists_labels() {
        let err = ImportError::MissingColumns {
            required: vec!["numero", "comentario"],
            missing: vec!["comentario"],
        };
        assert_eq!(
            err.to_string(),
            "the file must contain all of these columns: 'numero', 'comentario'; missing: 'comentario'"
        );
    }
}
