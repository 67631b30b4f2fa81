//! Text-to-bytes encoding change.

use crate::error::{Result, ResultExt};
use crate::sampling::{SamplingMode, select_column_indices};
use crate::types::{CorruptionLevel, TypeFilter};
use crate::utils::series_to_strings;
use polars::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Byte encoding written into a contaminated text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// 7-bit ASCII; other characters become `?`.
    Ascii,
    /// UTF-16 little endian, prefixed with the `FF FE` byte order mark.
    Utf16,
}

impl TextEncoding {
    /// Highest level that still encodes as ASCII.
    const ASCII_MAX_LEVEL: u8 = 8;

    pub fn for_level(level: CorruptionLevel) -> Self {
        if level.get() <= Self::ASCII_MAX_LEVEL {
            Self::Ascii
        } else {
            Self::Utf16
        }
    }

    pub fn encode(self, value: &str) -> Vec<u8> {
        match self {
            Self::Ascii => value
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Self::Utf16 => {
                let mut bytes = vec![0xFF, 0xFE];
                bytes.extend(value.encode_utf16().flat_map(u16::to_le_bytes));
                bytes
            }
        }
    }
}

/// Replace a level-scaled number of text columns with their encoded bytes.
///
/// Columns are picked with replacement, so fewer distinct columns than the
/// target count may change.
pub fn change_str_encoding<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    rng: &mut R,
) -> Result<DataFrame>
where
    R: Rng + ?Sized,
{
    change_str_encoding_counted(df, level, rng).map(|(out, _)| out)
}

/// [`change_str_encoding`] plus the number of encoded columns.
pub(crate) fn change_str_encoding_counted<R>(
    df: &DataFrame,
    level: CorruptionLevel,
    rng: &mut R,
) -> Result<(DataFrame, usize)>
where
    R: Rng + ?Sized,
{
    let picks: BTreeSet<usize> =
        select_column_indices(df, TypeFilter::Text, level, SamplingMode::WithReplacement, rng)?
            .into_iter()
            .collect();

    let encoding = TextEncoding::for_level(level);
    let mut out = df.clone();
    for &col_idx in &picks {
        let series = df.get_columns()[col_idx].as_materialized_series();
        let name = series.name().to_string();
        let encoded = encode_series(series, encoding)
            .context(format!("Failed to change encoding of '{}'", name))?;
        out.replace(&name, encoded)?;
    }

    debug!("Encoded {} text columns as {:?}", picks.len(), encoding);
    Ok((out, picks.len()))
}

fn encode_series(series: &Series, encoding: TextEncoding) -> PolarsResult<Series> {
    let values = series_to_strings(series)?;
    let bytes = BinaryChunked::from_iter_options(
        series.name().clone(),
        values
            .iter()
            .map(|v| v.as_deref().map(|s| encoding.encode(s))),
    );
    Ok(bytes.into_series())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_data() -> DataFrame {
        df![
            "num" => [1.0, 2.0, 3.0],
            "s1" => ["a", "b", "c"],
            "s2" => ["x", "y", "z"],
        ]
        .unwrap()
    }

    fn level(value: u8) -> CorruptionLevel {
        CorruptionLevel::new(value).unwrap()
    }

    #[test]
    fn test_encoding_for_level() {
        assert_eq!(TextEncoding::for_level(level(1)), TextEncoding::Ascii);
        assert_eq!(TextEncoding::for_level(level(8)), TextEncoding::Ascii);
        assert_eq!(TextEncoding::for_level(level(9)), TextEncoding::Utf16);
        assert_eq!(TextEncoding::for_level(level(10)), TextEncoding::Utf16);
    }

    #[test]
    fn test_encode_ascii() {
        assert_eq!(TextEncoding::Ascii.encode("abc"), b"abc".to_vec());
        assert_eq!(TextEncoding::Ascii.encode("café"), b"caf?".to_vec());
    }

    #[test]
    fn test_encode_utf16() {
        assert_eq!(
            TextEncoding::Utf16.encode("ab"),
            vec![0xFF, 0xFE, b'a', 0x00, b'b', 0x00]
        );
    }

    #[test]
    fn test_level_zero_is_identity() {
        let df = sample_data();
        let mut rng = StdRng::seed_from_u64(1);
        let result = change_str_encoding(&df, level(0), &mut rng).unwrap();
        assert_eq!(result, df);
    }

    #[test]
    fn test_text_columns_become_binary() {
        let df = sample_data();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = change_str_encoding(&df, level(10), &mut rng).unwrap();
            assert_eq!(result.shape(), df.shape());
            assert_eq!(result.column("num").unwrap().dtype(), &DataType::Float64);

            let binary: Vec<_> = result
                .get_columns()
                .iter()
                .filter(|c| c.dtype() == &DataType::Binary)
                .collect();
            assert_eq!(binary.len(), 1);

            let first = binary[0]
                .as_materialized_series()
                .binary()
                .unwrap()
                .get(0)
                .unwrap();
            assert_eq!(&first[..2], &[0xFF, 0xFE]);
        }
    }

    #[test]
    fn test_nulls_stay_null() {
        let series = Series::new("s".into(), &[Some("a"), None]);
        let encoded = encode_series(&series, TextEncoding::Ascii).unwrap();
        assert_eq!(encoded.dtype(), &DataType::Binary);
        assert_eq!(encoded.null_count(), 1);
    }
}
