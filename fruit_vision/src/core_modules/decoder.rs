// THEORY:
// The decoder is the last step before display. It receives the model's confidence
// vector, picks the winning class and renders a per-class report.
//
// Arg-max policy: a linear scan with the running maximum seeded at 0.0, replaced
// only by a strictly greater score. Ties therefore go to the lowest index, and a
// vector with no positive score reports index 0. NaN scores never win because every
// comparison against them is false.
//
// The report lists every class in table order as "<label>: <percent>%" with one
// decimal, newline terminated. Exact halfway percentages round up (away from zero),
// so 0.25% prints as 0.3%, not the 0.2% that round-half-to-even formatting gives.
// It is built fresh for every image and not stored.

use crate::error::{ClassifierError, Result};
use log::info;
use serde::Serialize;
use std::fmt;
use std::fmt::Write as _;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// One class and its raw model score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassScore {
    pub label: String,
    pub confidence: f32,
}

/// The decoded outcome for a single image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub predicted_index: usize,
    pub predicted_label: String,
    pub scores: Vec<ClassScore>,
    pub report: String,
}

impl ClassificationResult {
    /// Score of the winning class.
    pub fn confidence(&self) -> f32 {
        self.scores[self.predicted_index].confidence
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.predicted_label)?;
        write!(f, "{}", self.report)
    }
}

/// Maps confidence vectors onto a fixed label table.
#[derive(Debug, Clone)]
pub struct ResultDecoder {
    labels: Vec<String>,
}

impl ResultDecoder {
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(ClassifierError::EmptyLabelTable);
        }
        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn decode(&self, confidences: &[f32]) -> Result<ClassificationResult> {
        if confidences.len() != self.labels.len() {
            return Err(ClassifierError::LengthMismatch {
                expected: self.labels.len(),
                actual: confidences.len(),
            });
        }

        let predicted_index = arg_max(confidences);
        let predicted_label = self.labels[predicted_index].clone();

        let mut report = String::new();
        let mut scores = Vec::with_capacity(self.labels.len());
        for (label, &confidence) in self.labels.iter().zip(confidences) {
            // Writing into a String cannot fail.
            let _ = writeln!(report, "{}: {}%", label, format_percent(confidence * 100.0));
            scores.push(ClassScore {
                label: label.clone(),
                confidence,
            });
        }

        info!(
            "predicted '{}' (index {}, confidence {:.3})",
            predicted_label, predicted_index, confidences[predicted_index]
        );

        Ok(ClassificationResult {
            predicted_index,
            predicted_label,
            scores,
            report,
        })
    }
}

/// Index of the first strictly greatest score above 0.0; 0 when none is positive.
pub fn arg_max(confidences: &[f32]) -> usize {
    let mut max_index = 0;
    let mut max_confidence = 0.0f32;
    for (index, &confidence) in confidences.iter().enumerate() {
        if confidence > max_confidence {
            max_confidence = confidence;
            max_index = index;
        }
    }
    max_index
}

/// Renders a percentage with one decimal, rounding exact halves away from zero.
pub fn format_percent(percent: f32) -> String {
    // An f32 times ten is exact in f64, so `round` sees the true tie.
    let tenths = (f64::from(percent) * 10.0).round();
    format!("{:.1}", tenths / 10.0)
}

/// Reads a confidence vector serialized as native-endian f32 words.
pub fn confidences_from_ne_bytes(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % F32_BYTES != 0 {
        return Err(ClassifierError::MalformedBuffer { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(F32_BYTES)
        .map(|word| f32::from_ne_bytes([word[0], word[1], word[2], word[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CLASS_LABELS;

    fn decoder() -> ResultDecoder {
        ResultDecoder::new(CLASS_LABELS).expect("non-empty table")
    }

    #[test]
    fn clear_winner_is_reported() {
        let result = decoder().decode(&[0.1, 0.7, 0.05, 0.05, 0.1]).expect("five scores");

        assert_eq!(result.predicted_index, 1);
        assert_eq!(result.predicted_label, "Manzana");
        assert!(result.report.lines().any(|line| line == "Manzana: 70.0%"));
        assert_eq!(
            result.report,
            "Pera: 10.0%\nManzana: 70.0%\nKiwi: 5.0%\nFresa: 5.0%\nBanana: 10.0%\n"
        );
        assert_eq!(result.confidence(), 0.7);
    }

    #[test]
    fn halfway_percentages_round_up() {
        let result = decoder()
            .decode(&[0.0025, 0.9925, 0.0025, 0.0025, 0.0])
            .expect("five scores");
        assert_eq!(
            result.report,
            "Pera: 0.3%\nManzana: 99.3%\nKiwi: 0.3%\nFresa: 0.3%\nBanana: 0.0%\n"
        );
    }

    #[test]
    fn percent_formatting_rounds_to_one_decimal() {
        assert_eq!(format_percent(0.12345 * 100.0), "12.3");
        assert_eq!(format_percent(99.9), "99.9");
        assert_eq!(format_percent(100.0), "100.0");
        assert_eq!(format_percent(0.0), "0.0");
    }

    #[test]
    fn exact_halves_round_away_from_zero() {
        assert_eq!(format_percent(37.25), "37.3");
        assert_eq!(format_percent(12.25), "12.3");
        assert_eq!(format_percent(0.25), "0.3");
        assert_eq!(format_percent(99.75), "99.8");
        assert_eq!(format_percent(-0.25), "-0.3");
    }

    #[test]
    fn non_tie_report_line_uses_one_decimal() {
        let result = decoder()
            .decode(&[0.12345, 0.0, 0.0, 0.0, 0.0])
            .expect("five scores");
        assert!(result.report.starts_with("Pera: 12.3%\n"));
    }

    #[test]
    fn tie_goes_to_lowest_index() {
        let result = decoder().decode(&[0.5, 0.5, 0.0, 0.0, 0.0]).expect("five scores");
        assert_eq!(result.predicted_label, "Pera");
    }

    #[test]
    fn later_tie_does_not_displace_earlier_winner() {
        let result = decoder().decode(&[0.1, 0.4, 0.1, 0.4, 0.0]).expect("five scores");
        assert_eq!(result.predicted_label, "Manzana");
    }

    #[test]
    fn all_zero_scores_report_first_label() {
        let result = decoder().decode(&[0.0; 5]).expect("five scores");
        assert_eq!(result.predicted_index, 0);
        assert_eq!(result.predicted_label, "Pera");
        assert_eq!(
            result.report,
            "Pera: 0.0%\nManzana: 0.0%\nKiwi: 0.0%\nFresa: 0.0%\nBanana: 0.0%\n"
        );
    }

    #[test]
    fn negative_scores_never_beat_the_zero_seed() {
        let result = decoder().decode(&[-0.5, -0.1, -0.2, -0.3, -0.9]).expect("five scores");
        assert_eq!(result.predicted_label, "Pera");
    }

    #[test]
    fn nan_scores_are_skipped() {
        let result = decoder().decode(&[f32::NAN, 0.2, f32::NAN, 0.6, 0.1]).expect("five scores");
        assert_eq!(result.predicted_label, "Fresa");
    }

    #[test]
    fn short_vector_is_a_length_mismatch() {
        let err = decoder().decode(&[0.25, 0.25, 0.25, 0.25]).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::LengthMismatch {
                expected: 5,
                actual: 4
            }
        ));
    }

    #[test]
    fn empty_label_table_is_rejected() {
        let err = ResultDecoder::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ClassifierError::EmptyLabelTable));
    }

    #[test]
    fn display_puts_label_above_report() {
        let result = decoder().decode(&[0.0, 0.0, 0.0, 0.0, 1.0]).expect("five scores");
        assert_eq!(
            result.to_string(),
            "Banana\nPera: 0.0%\nManzana: 0.0%\nKiwi: 0.0%\nFresa: 0.0%\nBanana: 100.0%\n"
        );
    }

    #[test]
    fn scores_decode_from_native_bytes() {
        let mut bytes = Vec::new();
        for value in [0.1f32, 0.7, 0.05, 0.05, 0.1] {
            bytes.extend_from_slice(&value.to_ne_bytes());
        }
        let confidences = confidences_from_ne_bytes(&bytes).expect("whole words");
        assert_eq!(confidences, vec![0.1f32, 0.7, 0.05, 0.05, 0.1]);

        let err = confidences_from_ne_bytes(&bytes[..19]).unwrap_err();
        assert!(matches!(err, ClassifierError::MalformedBuffer { len: 19 }));
    }
}
