use std::str::FromStr;
use thiserror::Error;

pub const MAX_ANSWERS: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz is not active")]
    Inactive,
    #[error("answers must contain between 1 and {} entries", MAX_ANSWERS)]
    AnswerCount,
    #[error("answer index must not be negative")]
    NegativeAnswer,
    #[error("invalid answer key entry '{0}'")]
    InvalidKey(String),
}

/// Correct option index per question, in question order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizKey(Vec<i32>);

impl QuizKey {
    pub fn new(correct: Vec<i32>) -> Self {
        Self(correct)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One point per answer matching the key at the same position; answers
    /// beyond the key are ignored.
    pub fn score(&self, answers: &[i32]) -> i32 {
        self.0
            .iter()
            .zip(answers)
            .filter(|(correct, given)| correct == given)
            .count() as i32
    }
}

impl FromStr for QuizKey {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i32>()
                    .ok()
                    .filter(|v| *v >= 0)
                    .ok_or_else(|| QuizError::InvalidKey(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(QuizKey)
    }
}

pub fn validate_answers(answers: &[i32]) -> Result<(), QuizError> {
    if answers.is_empty() || answers.len() > MAX_ANSWERS {
        return Err(QuizError::AnswerCount);
    }
    if answers.iter().any(|a| *a < 0) {
        return Err(QuizError::NegativeAnswer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        let key: QuizKey = "1, 0,2,3".parse().unwrap();
        assert_eq!(key, QuizKey::new(vec![1, 0, 2, 3]));
        assert_eq!(
            "1,x".parse::<QuizKey>(),
            Err(QuizError::InvalidKey("x".to_string()))
        );
        assert!("1,-2".parse::<QuizKey>().is_err());
    }

    #[test]
    fn test_score() {
        let key = QuizKey::new(vec![1, 0, 2, 3]);
        assert_eq!(key.score(&[1, 0, 2, 3]), 4);
        assert_eq!(key.score(&[1, 1, 1]), 1);
        assert_eq!(key.score(&[1, 0, 2, 3, 9, 9]), 4);
        assert_eq!(key.score(&[]), 0);
    }

    #[test]
    fn test_validate_answers() {
        assert!(validate_answers(&[0, 1]).is_ok());
        assert_eq!(validate_answers(&[]), Err(QuizError::AnswerCount));
        assert_eq!(validate_answers(&[0; 51]), Err(QuizError::AnswerCount));
        assert_eq!(validate_answers(&[0, -1]), Err(QuizError::NegativeAnswer));
    }
}
