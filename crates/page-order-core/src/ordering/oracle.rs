use super::verdict::Verdict;
use crate::error::OracleError;
use crate::model::FileItem;
use std::cmp::Ordering;

/// External judge of relative order for two items.
///
/// Calls may block for seconds. Implementations are expected, but not
/// required, to answer consistently for the same unordered pair within a
/// session.
pub trait Oracle {
    fn compare(&self, first: &FileItem, second: &FileItem) -> Result<Verdict, OracleError>;
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn compare(&self, first: &FileItem, second: &FileItem) -> Result<Verdict, OracleError> {
        (**self).compare(first, second)
    }
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn compare(&self, first: &FileItem, second: &FileItem) -> Result<Verdict, OracleError> {
        (**self).compare(first, second)
    }
}

/// Oracle backed by a closure.
pub struct FnOracle<F> {
    f: F,
}

pub fn oracle_fn<F>(f: F) -> FnOracle<F>
where
    F: Fn(&FileItem, &FileItem) -> Result<Verdict, OracleError>,
{
    FnOracle { f }
}

impl<F> Oracle for FnOracle<F>
where
    F: Fn(&FileItem, &FileItem) -> Result<Verdict, OracleError>,
{
    fn compare(&self, first: &FileItem, second: &FileItem) -> Result<Verdict, OracleError> {
        (self.f)(first, second)
    }
}

/// Orders by the number embedded in the file name, then by lowercase name.
/// Used when no content oracle is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilenameOracle;

impl Oracle for FilenameOracle {
    fn compare(&self, first: &FileItem, second: &FileItem) -> Result<Verdict, OracleError> {
        let by_number = match (first.number, second.number) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ordering = by_number.then_with(|| {
            first
                .file_name()
                .to_lowercase()
                .cmp(&second.file_name().to_lowercase())
        });
        Ok(match ordering {
            Ordering::Less => Verdict::First,
            Ordering::Greater => Verdict::Second,
            Ordering::Equal => Verdict::Unknown,
        })
    }
}
