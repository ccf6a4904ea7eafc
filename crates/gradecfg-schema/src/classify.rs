//! # Testcase Kind Disambiguation
//!
//! A testcase entry carries no type tag saying whether it is a
//! submission limit, a file check, or a regular testcase. The kind is
//! decided by which schema it satisfies: candidates are tried in a fixed
//! priority order and the first one the entry matches wins. An entry
//! matching none of them is a regular testcase.
//!
//! An absent (`null`) entry is vacuously valid against any schema, so the
//! first candidate claims it. The whole-document pass still rejects it.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ConstraintViolation, MatchError, ViolationReport};
use crate::matcher::Matcher;

/// The mutually exclusive shapes of a testcase entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestcaseKind {
    /// Caps the number of submissions.
    SubmissionLimit,
    /// Checks that required files were submitted.
    Filecheck,
    /// Everything else: containers, validation rules, points.
    Regular,
}

impl TestcaseKind {
    /// The `definitions` key holding this kind's schema.
    pub fn definition_key(self) -> &'static str {
        match self {
            Self::SubmissionLimit => "submission_limit",
            Self::Filecheck => "filecheck",
            Self::Regular => "testcase",
        }
    }
}

impl std::fmt::Display for TestcaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubmissionLimit => f.write_str("submission_limit"),
            Self::Filecheck => f.write_str("filecheck"),
            Self::Regular => f.write_str("regular"),
        }
    }
}

/// One candidate shape and the schema that recognises it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'s> {
    /// Kind assigned on a successful match.
    pub kind: TestcaseKind,
    /// Schema the entry must satisfy.
    pub schema: &'s Value,
}

/// Why a candidate did not claim an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// The candidate that was tried.
    pub candidate: TestcaseKind,
    /// The first violation the candidate's schema reported.
    pub violation: ConstraintViolation,
}

/// The tagged result of classifying one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<'a> {
    /// The winning kind.
    pub kind: TestcaseKind,
    /// The classified entry.
    pub entry: &'a Value,
    /// Candidates tried before the winner, in priority order. For a
    /// `Regular` entry this holds every candidate's failure reason.
    pub rejections: Vec<Rejection>,
}

/// Ordered first-match-wins classifier.
#[derive(Debug, Clone)]
pub struct Disambiguator<'s> {
    candidates: Vec<Candidate<'s>>,
}

impl<'s> Disambiguator<'s> {
    /// Build from an explicit priority list.
    pub fn new(candidates: Vec<Candidate<'s>>) -> Self {
        Self { candidates }
    }

    /// The standard order: submission limit, then file check.
    pub fn standard(submission_limit: &'s Value, filecheck: &'s Value) -> Self {
        Self::new(vec![
            Candidate {
                kind: TestcaseKind::SubmissionLimit,
                schema: submission_limit,
            },
            Candidate {
                kind: TestcaseKind::Filecheck,
                schema: filecheck,
            },
        ])
    }

    /// Classify `entry`. `title` labels schema defects.
    ///
    /// # Errors
    ///
    /// Only a candidate schema that cannot be compiled is an error (a
    /// schema defect). Mismatches are recorded as rejections.
    pub fn classify<'a, M: Matcher>(
        &self,
        entry: &'a Value,
        matcher: &M,
        title: &str,
    ) -> Result<Classification<'a>, ViolationReport> {
        let mut rejections = Vec::new();

        for candidate in &self.candidates {
            if entry.is_null() {
                tracing::debug!(candidate = %candidate.kind, "{title} is absent; vacuously a {}", candidate.kind);
                return Ok(Classification {
                    kind: candidate.kind,
                    entry,
                    rejections,
                });
            }
            match matcher.check(entry, candidate.schema) {
                Ok(()) => {
                    return Ok(Classification {
                        kind: candidate.kind,
                        entry,
                        rejections,
                    });
                }
                Err(MatchError::Mismatch(violation)) => {
                    rejections.push(Rejection {
                        candidate: candidate.kind,
                        violation,
                    });
                }
                Err(MatchError::InvalidSchema { reason }) => {
                    let title = format!("{title} {}", candidate.kind.definition_key());
                    return Err(ViolationReport::invalid_schema(title, candidate.schema, &reason));
                }
            }
        }

        for rejection in &rejections {
            tracing::debug!(
                candidate = %rejection.candidate,
                "{title} is not a {}: {}",
                rejection.candidate,
                rejection.violation
            );
        }

        Ok(Classification {
            kind: TestcaseKind::Regular,
            entry,
            rejections,
        })
    }
}
