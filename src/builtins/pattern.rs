use std::{fmt, ops};

use arrow::{
    array::{Array, AsArray, BooleanArray, Datum},
    datatypes::DataType,
};
use once_cell::sync::{Lazy, OnceCell};
use regex::{Regex, RegexBuilder};

use crate::{
    combinator::Condition,
    completion::{Comparable, Definition},
    error::{Error, Result},
    observability::log_debug,
    operator::CompareOp,
};

/// Regular-expression flags for [`Match`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MatchFlags(u8);

impl MatchFlags {
    /// No flags.
    pub const EMPTY: Self = Self(0);
    /// Case-insensitive matching.
    pub const IGNORECASE: Self = Self(1);
    /// `^` and `$` match at line boundaries.
    pub const MULTILINE: Self = Self(1 << 1);
    /// `.` matches newlines.
    pub const DOTALL: Self = Self(1 << 2);
    /// Whitespace and `#` comments in the pattern are ignored.
    pub const VERBOSE: Self = Self(1 << 3);

    /// True when every flag of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl ops::BitOr for MatchFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for MatchFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for MatchFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::IGNORECASE, "IGNORECASE"),
            (Self::MULTILINE, "MULTILINE"),
            (Self::DOTALL, "DOTALL"),
            (Self::VERBOSE, "VERBOSE"),
        ];
        let mut set = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .peekable();
        if set.peek().is_none() {
            return f.write_str("EMPTY");
        }
        for (i, name) in set.enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

/// Options of a [`Match`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOptions {
    /// Case-sensitive matching. `false` implies [`MatchFlags::IGNORECASE`].
    pub case: bool,
    /// Additional regular-expression flags.
    pub flags: MatchFlags,
    /// Result for null elements; `None` keeps them null.
    pub fill: Option<bool>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case: true,
            flags: MatchFlags::EMPTY,
            fill: None,
        }
    }
}

static DEFINITION: Lazy<Definition> = Lazy::new(|| {
    Definition::total_equality("Match")
        .define(CompareOp::Eq)
        .build()
        .expect("eq is defined")
});

/// Full-match of every string element against a regular expression.
///
/// The pattern is compiled on first comparison and reused afterwards.
#[derive(Clone)]
pub struct Match {
    pattern: String,
    options: MatchOptions,
    compiled: OnceCell<Regex>,
}

impl Match {
    /// Case-sensitive match without flags; nulls stay null.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self::with_options(pattern, MatchOptions::default())
    }

    /// Match with explicit options.
    pub fn with_options(pattern: impl Into<String>, options: MatchOptions) -> Self {
        Self {
            pattern: pattern.into(),
            options,
            compiled: OnceCell::new(),
        }
    }

    /// Sets case sensitivity.
    #[must_use]
    pub fn case(mut self, case: bool) -> Self {
        self.options.case = case;
        self.compiled = OnceCell::new();
        self
    }

    /// Replaces the flags.
    #[must_use]
    pub fn flags(mut self, flags: MatchFlags) -> Self {
        self.options.flags = flags;
        self.compiled = OnceCell::new();
        self
    }

    /// Sets the result for null elements.
    #[must_use]
    pub fn fill(mut self, fill: Option<bool>) -> Self {
        self.options.fill = fill;
        self
    }

    /// Pattern as given, without anchors.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Current options.
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    fn regex(&self) -> Result<&Regex> {
        self.compiled.get_or_try_init(|| {
            let flags = self.options.flags;
            let regex = RegexBuilder::new(&format!(r"\A(?:{})\z", self.pattern))
                .case_insensitive(!self.options.case || flags.contains(MatchFlags::IGNORECASE))
                .multi_line(flags.contains(MatchFlags::MULTILINE))
                .dot_matches_new_line(flags.contains(MatchFlags::DOTALL))
                .ignore_whitespace(flags.contains(MatchFlags::VERBOSE))
                .build()?;
            log_debug!(
                component = "pattern",
                event = "pattern_compiled",
                pattern = %self.pattern,
                flags = ?flags,
                case = self.options.case
            );
            Ok(regex)
        })
    }

    /// Full-match result per element of `array`.
    pub fn full_match(&self, array: &dyn Array) -> Result<BooleanArray> {
        let regex = self.regex()?;
        let fill = self.options.fill;
        let matched = |value: Option<&str>| value.map_or(fill, |value| Some(regex.is_match(value)));
        let result: BooleanArray = match array.data_type() {
            DataType::Utf8 => array.as_string::<i32>().iter().map(matched).collect(),
            DataType::LargeUtf8 => array.as_string::<i64>().iter().map(matched).collect(),
            DataType::Utf8View => array.as_string_view().iter().map(matched).collect(),
            other => return Err(Error::UnsupportedArray(other.clone())),
        };
        Ok(result)
    }
}

impl Comparable for Match {
    fn definition(&self) -> &Definition {
        &DEFINITION
    }

    fn evaluate(&self, op: CompareOp, right: &dyn Datum) -> Result<BooleanArray> {
        match op {
            CompareOp::Eq => {
                let (array, _) = right.get();
                self.full_match(array)
            }
            op => Err(Error::MissingOperator {
                op,
                operand: format!("{self:?}"),
            }),
        }
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match({:?}, case={}, flags={:?}, fill={:?})",
            self.pattern, self.options.case, self.options.flags, self.options.fill
        )
    }
}

impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.options == other.options
    }
}

impl From<Match> for Condition {
    fn from(pattern: Match) -> Self {
        Condition::comparable(pattern)
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::{Int64Array, LargeStringArray, StringArray, StringViewArray};

    use super::*;
    use crate::capability::{dispatch, HostOp};

    #[test]
    fn whole_string_must_match() {
        let data = StringArray::from(vec!["a", "aa", "ab", "ba"]);
        let result = dispatch(&data, HostOp::Equal, &Match::new("a+")).unwrap();
        assert_eq!(result, BooleanArray::from(vec![true, true, false, false]));
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        let data = StringArray::from(vec!["a", "b", "ab"]);
        let result = dispatch(&data, HostOp::Equal, &Match::new("a|b")).unwrap();
        assert_eq!(result, BooleanArray::from(vec![true, true, false]));
    }

    #[test]
    fn case_and_flags() {
        let data = StringArray::from(vec!["A", "a"]);
        let insensitive = Match::new("a").case(false);
        assert_eq!(
            dispatch(&data, HostOp::Equal, &insensitive).unwrap(),
            BooleanArray::from(vec![true, true])
        );

        let flagged = Match::new("a").flags(MatchFlags::IGNORECASE | MatchFlags::VERBOSE);
        assert_eq!(
            dispatch(&data, HostOp::Equal, &flagged).unwrap(),
            BooleanArray::from(vec![true, true])
        );

        let multiline = StringArray::from(vec!["a\nb"]);
        assert_eq!(
            dispatch(&multiline, HostOp::Equal, &Match::new("a.b")).unwrap(),
            BooleanArray::from(vec![false])
        );
        assert_eq!(
            dispatch(&multiline, HostOp::Equal, &Match::new("a.b").flags(MatchFlags::DOTALL))
                .unwrap(),
            BooleanArray::from(vec![true])
        );
    }

    #[test]
    fn nulls_take_the_fill_value() {
        let data = StringArray::from(vec![Some("a"), None]);
        assert_eq!(
            dispatch(&data, HostOp::Equal, &Match::new("a")).unwrap(),
            BooleanArray::from(vec![Some(true), None])
        );
        assert_eq!(
            dispatch(&data, HostOp::Equal, &Match::new("a").fill(Some(false))).unwrap(),
            BooleanArray::from(vec![Some(true), Some(false)])
        );
        assert_eq!(
            dispatch(&data, HostOp::NotEqual, &Match::new("a").fill(Some(false))).unwrap(),
            BooleanArray::from(vec![Some(false), Some(true)])
        );
    }

    #[test]
    fn large_and_view_strings() {
        let large = LargeStringArray::from(vec!["ab", "b"]);
        let view = StringViewArray::from(vec!["ab", "b"]);
        let pattern = Match::new("a?b");
        let expected = BooleanArray::from(vec![true, true]);
        assert_eq!(dispatch(&large, HostOp::Equal, &pattern).unwrap(), expected);
        assert_eq!(dispatch(&view, HostOp::Equal, &pattern).unwrap(), expected);
    }

    #[test]
    fn failures() {
        let numbers = Int64Array::from(vec![1]);
        assert!(matches!(
            dispatch(&numbers, HostOp::Equal, &Match::new("1")),
            Err(Error::UnsupportedArray(DataType::Int64))
        ));

        let strings = StringArray::from(vec!["a"]);
        assert!(matches!(
            dispatch(&strings, HostOp::Equal, &Match::new("(")),
            Err(Error::Pattern(_))
        ));
    }

    #[test]
    fn flags_debug_lists_names() {
        assert_eq!(format!("{:?}", MatchFlags::EMPTY), "EMPTY");
        assert_eq!(
            format!("{:?}", MatchFlags::IGNORECASE | MatchFlags::DOTALL),
            "IGNORECASE | DOTALL"
        );
    }
}
