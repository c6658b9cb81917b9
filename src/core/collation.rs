//! Name collation used to order tag listings

use std::cmp::Ordering;
use std::str::FromStr;

/// How strictly names are distinguished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strength {
    CaseSensitive,
    #[default]
    CaseInsensitive,
}

impl FromStr for Strength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "case-sensitive" => Ok(Strength::CaseSensitive),
            "case-insensitive" => Ok(Strength::CaseInsensitive),
            other => Err(format!("unknown collation '{}'", other)),
        }
    }
}

pub trait Collation {
    fn compare(&self, strength: Strength, a: &str, b: &str) -> Ordering;
}

/// Unicode lowercase comparison; no locale tailoring
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleCollation;

impl Collation for SimpleCollation {
    fn compare(&self, strength: Strength, a: &str, b: &str) -> Ordering {
        match strength {
            Strength::CaseSensitive => a.cmp(b),
            Strength::CaseInsensitive => a
                .chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase)),
        }
    }
}
