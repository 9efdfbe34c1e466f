use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The reflective "who / what / why" questions asked of every finished piece.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BigQuestions {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub who: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub what: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub why: String,
}

/// Opaque handle to a photo held by an external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoHandle(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPiece {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clay_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firing_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glaze: Option<String>,
    #[serde(default)]
    pub big_questions: BigQuestions,
    /// 1 (missed) to 5 (exactly what was intended).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<NaiveDate>,
}

impl PortfolioPiece {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            clay_body: None,
            firing_schedule: None,
            glaze: None,
            big_questions: BigQuestions::default(),
            success_rating: None,
            photo: None,
            started_on: None,
            completed_on: None,
        }
    }

    pub fn with_materials(
        mut self,
        clay_body: impl Into<String>,
        firing_schedule: impl Into<String>,
        glaze: impl Into<String>,
    ) -> Self {
        self.clay_body = Some(clay_body.into());
        self.firing_schedule = Some(firing_schedule.into());
        self.glaze = Some(glaze.into());
        self
    }

    pub fn with_questions(
        mut self,
        who: impl Into<String>,
        what: impl Into<String>,
        why: impl Into<String>,
    ) -> Self {
        self.big_questions = BigQuestions {
            who: who.into(),
            what: what.into(),
            why: why.into(),
        };
        self
    }

    pub fn rated(mut self, rating: u8) -> Self {
        self.success_rating = Some(rating);
        self
    }

    pub(crate) fn validate(&self, violations: &mut Vec<String>) {
        if self.title.trim().is_empty() {
            violations.push("title is required".into());
        }
        if let Some(rating) = self.success_rating {
            if !(1..=5).contains(&rating) {
                violations.push(format!("success rating must be 1-5, got {rating}"));
            }
        }
        if let (Some(started), Some(completed)) = (self.started_on, self.completed_on) {
            if completed < started {
                violations.push("completion date is before start date".into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_serde_roundtrip() {
        let piece = PortfolioPiece::new("Celadon bowl")
            .with_materials("B-Mix", "Cone 6 slow cool", "Celadon")
            .with_questions("Tea drinkers", "A bowl that holds warmth", "Quiet mornings")
            .rated(4);
        let json = serde_json::to_string(&piece).unwrap();
        let parsed: PortfolioPiece = serde_json::from_str(&json).unwrap();
        assert_eq!(piece, parsed);
    }

    #[test]
    fn test_rating_and_dates_validated() {
        let mut piece = PortfolioPiece::new("Vase").rated(7);
        piece.started_on = NaiveDate::from_ymd_opt(2025, 5, 2);
        piece.completed_on = NaiveDate::from_ymd_opt(2025, 5, 1);
        let mut violations = Vec::new();
        piece.validate(&mut violations);
        assert_eq!(violations.len(), 2);
    }
}
